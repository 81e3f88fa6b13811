use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the shared conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,

    /// Speaker name for user turns (a player name, or `SYSTEM` for rolls)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub content: String,
}

impl ChatTurn {
    pub fn narrator(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            name: None,
            content: content.into(),
        }
    }

    pub fn player(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            name: Some(name.into()),
            content: content.into(),
        }
    }

    pub fn system_event(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            name: Some("SYSTEM".into()),
            content: content.into(),
        }
    }

    /// Text as the narrator sees it: named turns carry their speaker inline.
    pub fn prompt_content(&self) -> String {
        match &self.name {
            Some(name) => format!("**{}**: {}", name, self.content),
            None => self.content.clone(),
        }
    }
}
