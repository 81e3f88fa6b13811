use serde::{Deserialize, Serialize};

use crate::model::directive::Directive;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveOutcome {
    Applied,
    Rejected { reason: String },
    Deferred { reason: String },
}

impl DirectiveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DirectiveOutcome::Applied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveApplication {
    pub directive: Directive,
    pub outcome: DirectiveOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveReport {
    pub applications: Vec<DirectiveApplication>,
}

impl DirectiveReport {
    pub fn summary_lines(&self) -> Vec<String> {
        self.applications
            .iter()
            .map(|a| match &a.outcome {
                DirectiveOutcome::Applied => format!("✔ Applied: {}", a.directive.short_name()),
                DirectiveOutcome::Rejected { reason } => {
                    format!("❌ Rejected: {} ({})", a.directive.short_name(), reason)
                }
                DirectiveOutcome::Deferred { reason } => {
                    format!("⚠ Deferred: {} ({})", a.directive.short_name(), reason)
                }
            })
            .collect()
    }
}
