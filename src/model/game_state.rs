use serde::{Deserialize, Serialize};

use crate::model::message::ChatTurn;

pub const MAX_PLAYER_HP: i32 = 10;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional Dungeon Master. \
When a player rolls a die, you MUST interpret the result: 1 is a hilarious/terrible failure, \
20 is a legendary success. React to the specific number rolled. Keep responses under 80 words.";

pub const DEFAULT_OPENING: &str =
    "The party stands before the heavy stone doors of the Crypt. What do you do?";

pub const RESET_OPENING: &str = "The timeline resets...";

/// The whole shared game, as seen by every seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Bumped on every committed mutation
    pub revision: u64,

    pub system_prompt: String,
    pub history: Vec<ChatTurn>,

    /// Insertion-ordered roster
    pub players: Vec<Player>,

    pub monster: Option<Monster>,
    pub battle_log: Vec<BattleLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub class: String,
    pub hp: i32,
    pub gold: i32,
    pub inventory: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLogEntry {
    /// Revision of the state when the entry was written
    pub turn: u64,
    pub text: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_opening(DEFAULT_OPENING)
    }
}

impl GameState {
    pub fn with_opening(opening: &str) -> Self {
        Self {
            revision: 0,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history: vec![ChatTurn::narrator(opening)],
            players: Vec::new(),
            monster: None,
            battle_log: Vec::new(),
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        let name = name.trim();
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn player_mut(&mut self, name: &str) -> Option<&mut Player> {
        let name = name.trim();
        self.players
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn active_monster(&self) -> Option<&Monster> {
        self.monster.as_ref().filter(|m| m.active)
    }

    pub fn log(&mut self, text: impl Into<String>) {
        self.battle_log.push(BattleLogEntry {
            turn: self.revision,
            text: text.into(),
        });
    }
}

impl Player {
    pub fn new(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: class.into(),
            hp: MAX_PLAYER_HP,
            gold: 0,
            inventory: Vec::new(),
        }
    }

    /// Applies an HP delta, clamped to `0..=MAX_PLAYER_HP`.
    pub fn adjust_hp(&mut self, delta: i32) {
        self.hp = self.hp.saturating_add(delta).clamp(0, MAX_PLAYER_HP);
    }

    pub fn adjust_gold(&mut self, delta: i32) {
        self.gold = self.gold.saturating_add(delta).max(0);
    }

    pub fn is_down(&self) -> bool {
        self.hp == 0
    }

    pub fn status_line(&self) -> String {
        let items = if self.inventory.is_empty() {
            "none".to_string()
        } else {
            self.inventory.join(", ")
        };
        format!(
            "{} ({}): HP {}/{}, Gold {}, Items [{}]",
            self.name, self.class, self.hp, MAX_PLAYER_HP, self.gold, items
        )
    }
}

impl Monster {
    pub fn spawn(name: impl Into<String>, hp: i32) -> Self {
        let max_hp = hp.max(1);
        Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            active: true,
        }
    }

    /// Applies an HP delta, clamped to `0..=max_hp`. A monster at 0 is no longer active.
    pub fn adjust_hp(&mut self, delta: i32) {
        self.hp = self.hp.saturating_add(delta).clamp(0, self.max_hp);
        if self.hp == 0 {
            self.active = false;
        }
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp <= 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }
}
