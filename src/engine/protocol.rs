use std::path::PathBuf;

use crate::model::event_result::DirectiveReport;

pub enum EngineCommand {
    SubmitAction { player: String, text: String },
    RollDice { player: String },
    Join { name: String, class: String },
    /// Renames a seated player, keeping their stats.
    Rename { from: String, to: String, class: String },
    Leave { name: String },
    SetApiKey(String),
    TestConnection,
    Reset,
    Save(PathBuf),
    Load(PathBuf),
}

#[derive(Debug)]
pub enum EngineResponse {
    /// The narrator is being asked; the UI shows a spinner until the turn ends.
    TurnStarted,
    TurnFinished { report: DirectiveReport },
    /// The roster of a loaded save, as `(name, class)` pairs.
    PartyLoaded { players: Vec<(String, String)> },
    Notice(String),
    Error(String),
}
