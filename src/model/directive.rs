use serde::{Deserialize, Serialize};

/// A state mutation scraped out of narrator prose.
/// Parsing never touches state; see `engine::apply_directive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    SpawnMonster {
        name: String,
        hp: i32,
    },

    MonsterHp {
        delta: i32,
    },

    PlayerHp {
        player: String,
        delta: i32,
    },

    Gold {
        player: String,
        delta: i32,
    },

    GrantItem {
        player: String,
        item: String,
    },

    /// Known keyword, unusable body
    Malformed {
        raw: String,
    },
}

impl Directive {
    pub fn short_name(&self) -> &'static str {
        match self {
            Directive::SpawnMonster { .. } => "SpawnMonster",
            Directive::MonsterHp { .. } => "MonsterHp",
            Directive::PlayerHp { .. } => "PlayerHp",
            Directive::Gold { .. } => "Gold",
            Directive::GrantItem { .. } => "GrantItem",
            Directive::Malformed { .. } => "Malformed",
        }
    }
}
