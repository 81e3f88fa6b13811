use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

use crate::model::game_state::{GameState, Player};
use crate::model::message::ChatTurn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("{0} is already in the party")]
    NameTaken(String),
}

/// Process-wide game state shared by the UI and the engine thread.
///
/// Every write goes through [`SharedStore::update`], which holds the lock for
/// the whole mutation and bumps the revision.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<GameState>>,
}

impl SharedStore {
    pub fn new(state: GameState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn snapshot(&self) -> GameState {
        self.inner.lock().clone()
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        let mut state = self.inner.lock();
        state.revision += 1;
        f(&mut state)
    }

    pub fn push_turn(&self, turn: ChatTurn) {
        self.update(|s| s.history.push(turn));
    }

    /// Adds a player, or changes the class of one who is already seated.
    pub fn join(&self, name: &str, class: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        self.update(|s| match s.player_mut(name) {
            Some(existing) => existing.class = class.to_string(),
            None => {
                s.players.push(Player::new(name, class));
                s.log(format!("{} the {} joins the party.", name, class));
                info!(player = name, class, "player joined");
            }
        });
        Ok(())
    }

    /// Moves a seated player to a new name. A player who was never seated
    /// simply joins under the new name.
    pub fn rename(&self, from: &str, to: &str, class: &str) -> Result<(), StoreError> {
        let (from, to) = (from.trim(), to.trim());
        if to.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if from.eq_ignore_ascii_case(to) {
            return self.join(to, class);
        }

        self.update(|s| {
            if s.player(to).is_some() {
                return Err(StoreError::NameTaken(to.to_string()));
            }
            match s.player_mut(from) {
                Some(player) => {
                    player.name = to.to_string();
                    player.class = class.to_string();
                    s.log(format!("{} is now known as {}.", from, to));
                    info!(from, to, "player renamed");
                }
                None => {
                    s.players.push(Player::new(to, class));
                    s.log(format!("{} the {} joins the party.", to, class));
                }
            }
            Ok(())
        })
    }

    pub fn leave(&self, name: &str) -> bool {
        self.update(|s| {
            let before = s.players.len();
            s.players.retain(|p| !p.name.eq_ignore_ascii_case(name.trim()));
            let left = s.players.len() != before;
            if left {
                s.log(format!("{} leaves the party.", name.trim()));
            }
            left
        })
    }

    /// Admin reset: a fresh state with one opening turn. Seated players keep
    /// their seats with starting stats.
    pub fn reset(&self, opening: &str) {
        self.update(|s| {
            let mut fresh = GameState::with_opening(opening);
            fresh.revision = s.revision;
            fresh.system_prompt = std::mem::take(&mut s.system_prompt);
            fresh.players = s
                .players
                .iter()
                .map(|p| Player::new(p.name.clone(), p.class.clone()))
                .collect();
            *s = fresh;
        });
        info!("game reset");
    }

    pub fn replace(&self, state: GameState) {
        self.update(|s| {
            let revision = s.revision;
            *s = state;
            s.revision = s.revision.max(revision);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::game_state::{Monster, RESET_OPENING};
    use std::thread;

    #[test]
    fn join_rejects_blank_names() {
        let store = SharedStore::default();
        assert_eq!(store.join("   ", "Mage"), Err(StoreError::EmptyName));
    }

    #[test]
    fn rejoining_keeps_stats() {
        let store = SharedStore::default();
        store.join("Ana", "Rogue").unwrap();
        store.update(|s| s.player_mut("Ana").unwrap().gold = 9);
        store.join("ana", "Mage").unwrap();

        let state = store.snapshot();
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.players[0].class, "Mage");
        assert_eq!(state.players[0].gold, 9);
    }

    #[test]
    fn leave_removes_player() {
        let store = SharedStore::default();
        store.join("Ana", "Rogue").unwrap();
        assert!(store.leave("ANA"));
        assert!(!store.leave("Ana"));
        assert!(store.snapshot().players.is_empty());
    }

    #[test]
    fn rename_keeps_stats_under_the_new_name() {
        let store = SharedStore::default();
        store.join("Adventurer", "Warrior").unwrap();
        store.update(|s| s.player_mut("Adventurer").unwrap().gold = 7);

        store.rename("Adventurer", "Ana", "Rogue").unwrap();

        let state = store.snapshot();
        assert_eq!(state.players.len(), 1);
        let ana = state.player("Ana").unwrap();
        assert_eq!((ana.class.as_str(), ana.gold), ("Rogue", 7));
        assert!(state.player("Adventurer").is_none());
    }

    #[test]
    fn rename_onto_a_seated_name_is_refused() {
        let store = SharedStore::default();
        store.join("Ana", "Rogue").unwrap();
        store.join("Bram", "Paladin").unwrap();

        assert_eq!(
            store.rename("Ana", "bram", "Rogue"),
            Err(StoreError::NameTaken("bram".into()))
        );
        assert!(store.snapshot().player("Ana").is_some());
    }

    #[test]
    fn every_update_bumps_revision() {
        let store = SharedStore::default();
        let start = store.revision();
        store.push_turn(ChatTurn::player("Ana", "I open the door"));
        store.push_turn(ChatTurn::narrator("It creaks."));
        assert_eq!(store.revision(), start + 2);
    }

    #[test]
    fn reset_replaces_history_and_stats() {
        let store = SharedStore::default();
        store.join("Ana", "Rogue").unwrap();
        store.update(|s| {
            s.monster = Some(Monster::spawn("Ghoul", 5));
            let ana = s.player_mut("Ana").unwrap();
            ana.gold = 40;
            ana.adjust_hp(-4);
        });
        store.push_turn(ChatTurn::player("Ana", "attack"));
        let before = store.revision();

        store.reset(RESET_OPENING);

        let state = store.snapshot();
        assert_eq!(state.history, vec![ChatTurn::narrator(RESET_OPENING)]);
        assert!(state.monster.is_none());
        assert!(state.battle_log.is_empty());
        assert_eq!(state.players, vec![Player::new("Ana", "Rogue")]);
        assert!(state.revision > before);
    }

    #[test]
    fn replace_never_moves_revision_backwards() {
        let store = SharedStore::default();
        for _ in 0..5 {
            store.push_turn(ChatTurn::narrator("..."));
        }
        store.replace(GameState::default());
        assert!(store.revision() >= 5);
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let store = SharedStore::default();
        store.join("Ana", "Rogue").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.update(|s| s.player_mut("Ana").unwrap().adjust_gold(1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.snapshot().player("Ana").unwrap().gold, 800);
    }
}
