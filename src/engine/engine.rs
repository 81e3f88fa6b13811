use std::sync::mpsc::{Receiver, Sender};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::engine::apply_directive::apply_directives;
use crate::engine::dice;
use crate::engine::directive_parser::parse_directives;
use crate::engine::llm_client::Narrator;
use crate::engine::prompt_builder::PromptBuilder;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::store::SharedStore;
use crate::model::event_result::DirectiveReport;
use crate::model::game_save::GameSave;
use crate::model::game_state::RESET_OPENING;
use crate::model::message::ChatTurn;

/// Single writer for the shared store. Commands are handled one at a time,
/// so turns from different seats never interleave.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    store: SharedStore,
    narrator: Box<dyn Narrator + Send>,
    config: AppConfig,
    api_key: Option<String>,
    rng: StdRng,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        store: SharedStore,
        narrator: Box<dyn Narrator + Send>,
        config: AppConfig,
    ) -> Self {
        let api_key = config.narrator.api_key.clone().filter(|k| !k.trim().is_empty());
        Self {
            rx,
            tx,
            store,
            narrator,
            config,
            api_key,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            self.handle(cmd);
        }
        debug!("engine channel closed");
    }

    pub fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::SubmitAction { player, text } => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                let Some((name, class)) = self.seated(&player) else {
                    return;
                };
                self.run_turn(ChatTurn::player(name, format!("({}) {}", class, text)));
            }

            EngineCommand::RollDice { player } => {
                if self.api_key.is_none() {
                    self.send(EngineResponse::Error("Enter API key first!".into()));
                    return;
                }
                let Some((name, class)) = self.seated(&player) else {
                    return;
                };

                let sides = self.config.game.dice_sides;
                let value = dice::roll(&mut self.rng, sides);
                let line = dice::roll_line(&name, &class, value, sides);
                info!(player = %name, value, sides, "dice rolled");

                self.store.update(|s| s.log(line.clone()));
                self.run_turn(ChatTurn::system_event(line));
            }

            EngineCommand::Join { name, class } => match self.store.join(&name, &class) {
                Ok(()) => {}
                Err(e) => self.send(EngineResponse::Error(e.to_string())),
            },

            EngineCommand::Rename { from, to, class } => {
                if let Err(e) = self.store.rename(&from, &to, &class) {
                    self.send(EngineResponse::Error(e.to_string()));
                }
            }

            EngineCommand::Leave { name } => {
                if self.store.leave(&name) {
                    info!(player = name.trim(), "player left");
                }
            }

            EngineCommand::SetApiKey(key) => {
                let key = key.trim().to_string();
                self.api_key = (!key.is_empty()).then_some(key);
            }

            EngineCommand::TestConnection => {
                let key = self.api_key.clone().unwrap_or_default();
                match self.narrator.check(&key) {
                    Ok(msg) => self.send(EngineResponse::Notice(msg)),
                    Err(e) => self.send(EngineResponse::Error(e.to_string())),
                }
            }

            EngineCommand::Reset => {
                self.store.reset(RESET_OPENING);
                self.send(EngineResponse::Notice("The timeline resets.".into()));
            }

            EngineCommand::Save(path) => {
                match GameSave::new(self.store.snapshot()).write_to(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), "game saved");
                        self.send(EngineResponse::Notice(format!("Saved to {}", path.display())));
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "save failed");
                        self.send(EngineResponse::Error(e.to_string()));
                    }
                }
            }

            EngineCommand::Load(path) => match GameSave::read_from(&path) {
                Ok(save) => {
                    let players = save
                        .state
                        .players
                        .iter()
                        .map(|p| (p.name.clone(), p.class.clone()))
                        .collect();
                    self.store.replace(save.state);
                    info!(path = %path.display(), "game loaded");
                    self.send(EngineResponse::PartyLoaded { players });
                    self.send(EngineResponse::Notice(format!("Loaded {}", path.display())));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "load failed");
                    self.send(EngineResponse::Error(e.to_string()));
                }
            },
        }
    }

    /// Records the player's turn, asks the narrator, then reconciles the
    /// scraped directives and the cleaned narration in one store update.
    fn run_turn(&mut self, turn: ChatTurn) {
        let Some(api_key) = self.api_key.clone() else {
            self.send(EngineResponse::Error("Enter API key first!".into()));
            return;
        };

        self.store.push_turn(turn);
        self.send(EngineResponse::TurnStarted);

        let messages = PromptBuilder::build(
            &self.store.snapshot(),
            self.config.narrator.history_window,
        );
        debug!(messages = messages.len(), "prompt built");

        match self.narrator.narrate(&api_key, &messages) {
            Ok(text) => {
                let parsed = parse_directives(&text);
                debug!(directives = ?parsed.directives, "parsed narration");

                let report: DirectiveReport = self.store.update(|s| {
                    let report = apply_directives(s, &parsed.directives);
                    if !parsed.display_text.is_empty() {
                        s.history.push(ChatTurn::narrator(parsed.display_text.clone()));
                    }
                    report
                });

                let applied = report
                    .applications
                    .iter()
                    .filter(|a| a.outcome.is_applied())
                    .count();
                info!(directives = report.applications.len(), applied, "turn finished");
                self.send(EngineResponse::TurnFinished { report });
            }
            Err(e) => {
                warn!(error = %e, "narrator call failed");
                self.store.push_turn(ChatTurn::narrator(format!(
                    "The DM is speechless (Error: {})",
                    e
                )));
                self.send(EngineResponse::Error(e.to_string()));
            }
        }
    }

    /// Seated name and class, or an error to the UI.
    fn seated(&self, player: &str) -> Option<(String, String)> {
        let seat = self
            .store
            .snapshot()
            .player(player)
            .map(|p| (p.name.clone(), p.class.clone()));
        if seat.is_none() {
            self.send(EngineResponse::Error(format!(
                "{} has not joined the party",
                player.trim()
            )));
        }
        seat
    }

    fn send(&self, resp: EngineResponse) {
        let _ = self.tx.send(resp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::llm_client::{ChatMessage, NarratorError};
    use crate::model::event_result::DirectiveOutcome;
    use crate::model::message::Role;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::sync::Arc;

    /// Replays canned replies and remembers every prompt it saw.
    #[derive(Clone, Default)]
    struct Scripted {
        replies: Arc<Mutex<VecDeque<Result<String, NarratorError>>>>,
        prompts: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    }

    impl Scripted {
        fn reply(self, r: Result<String, NarratorError>) -> Self {
            self.replies.lock().push_back(r);
            self
        }
    }

    impl Narrator for Scripted {
        fn narrate(&self, _api_key: &str, messages: &[ChatMessage]) -> Result<String, NarratorError> {
            self.prompts.lock().push(messages.to_vec());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok("Nothing happens.".into()))
        }
    }

    fn engine(narrator: Scripted) -> (Engine, SharedStore, mpsc::Receiver<EngineResponse>) {
        let (_cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let store = SharedStore::default();
        let mut config = AppConfig::default();
        config.narrator.api_key = Some("test-key".into());
        let engine = Engine::new(cmd_rx, resp_tx, store.clone(), Box::new(narrator), config);
        (engine, store, resp_rx)
    }

    fn join(engine: &mut Engine, name: &str, class: &str) {
        engine.handle(EngineCommand::Join {
            name: name.into(),
            class: class.into(),
        });
    }

    #[test]
    fn action_turn_applies_directives_and_hides_tags() {
        let narrator = Scripted::default().reply(Ok(
            "A ghoul bursts out! [MONSTER: Ghoul, HP: 12] It rakes Ana. [HP: Ana, -3]".into(),
        ));
        let (mut engine, store, resp) = engine(narrator);
        join(&mut engine, "Ana", "Rogue");

        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "I open the coffin".into(),
        });

        let state = store.snapshot();
        let n = state.history.len();
        assert_eq!(
            state.history[n - 2],
            ChatTurn::player("Ana", "(Rogue) I open the coffin")
        );
        assert_eq!(
            state.history[n - 1],
            ChatTurn::narrator("A ghoul bursts out! It rakes Ana.")
        );
        assert_eq!(state.player("Ana").unwrap().hp, 7);
        assert_eq!(state.active_monster().unwrap().name, "Ghoul");

        assert!(matches!(resp.try_recv(), Ok(EngineResponse::TurnStarted)));
        match resp.try_recv() {
            Ok(EngineResponse::TurnFinished { report }) => {
                assert_eq!(report.applications.len(), 2);
                assert!(report.applications.iter().all(|a| a.outcome == DirectiveOutcome::Applied));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn narrator_failure_speaks_in_character() {
        let narrator = Scripted::default().reply(Err(NarratorError::Unauthorized));
        let (mut engine, store, resp) = engine(narrator);
        join(&mut engine, "Ana", "Rogue");

        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "hello?".into(),
        });

        let state = store.snapshot();
        let speechless: Vec<_> = state
            .history
            .iter()
            .filter(|t| t.content.contains("The DM is speechless"))
            .collect();
        assert_eq!(speechless.len(), 1);
        assert_eq!(speechless[0].role, Role::Assistant);
        assert!(speechless[0].content.contains("API key rejected"));

        let responses: Vec<_> = resp.try_iter().collect();
        assert!(matches!(responses.last(), Some(EngineResponse::Error(_))));
    }

    #[test]
    fn missing_key_blocks_the_turn() {
        let (mut engine, store, resp) = engine(Scripted::default());
        join(&mut engine, "Ana", "Rogue");
        engine.handle(EngineCommand::SetApiKey("   ".into()));
        let before = store.snapshot().history.len();

        engine.handle(EngineCommand::RollDice {
            player: "Ana".into(),
        });

        assert_eq!(store.snapshot().history.len(), before);
        match resp.try_recv() {
            Ok(EngineResponse::Error(msg)) => assert_eq!(msg, "Enter API key first!"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn roll_is_logged_before_the_narrator_reacts() {
        let narrator = Scripted::default();
        let prompts = narrator.prompts.clone();
        let (mut engine, store, _resp) = engine(narrator);
        join(&mut engine, "Bram", "Paladin");

        engine.handle(EngineCommand::RollDice {
            player: "bram".into(),
        });

        let state = store.snapshot();
        let roll = &state.history[state.history.len() - 2];
        assert_eq!(roll.name.as_deref(), Some("SYSTEM"));
        assert!(roll.content.starts_with("🎲 Bram (Paladin) rolled a "));

        let seen = prompts.lock();
        let last = seen[0].last().unwrap();
        assert!(last.content.starts_with("**SYSTEM**: 🎲"));
        assert!(state.battle_log.iter().any(|e| e.text.starts_with("🎲")));
    }

    #[test]
    fn unseated_player_cannot_act() {
        let (mut engine, store, resp) = engine(Scripted::default());
        engine.handle(EngineCommand::SubmitAction {
            player: "Ghost".into(),
            text: "boo".into(),
        });
        assert_eq!(store.snapshot().history.len(), 1);
        assert!(matches!(resp.try_recv(), Ok(EngineResponse::Error(_))));
    }

    #[test]
    fn blank_actions_are_ignored() {
        let narrator = Scripted::default();
        let prompts = narrator.prompts.clone();
        let (mut engine, _store, _resp) = engine(narrator);
        join(&mut engine, "Ana", "Rogue");
        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "  ".into(),
        });
        assert!(prompts.lock().is_empty());
    }

    #[test]
    fn tag_only_reply_adds_no_empty_turn() {
        let narrator = Scripted::default().reply(Ok("[GOLD: Ana, 5]".into()));
        let (mut engine, store, _resp) = engine(narrator);
        join(&mut engine, "Ana", "Rogue");
        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "search".into(),
        });

        let state = store.snapshot();
        assert_eq!(state.player("Ana").unwrap().gold, 5);
        assert_eq!(state.history.last().unwrap().role, Role::User);
    }

    #[test]
    fn reset_then_turns_continue() {
        let (mut engine, store, _resp) = engine(Scripted::default());
        join(&mut engine, "Ana", "Rogue");
        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "look".into(),
        });
        engine.handle(EngineCommand::Reset);
        assert_eq!(
            store.snapshot().history,
            vec![ChatTurn::narrator(RESET_OPENING)]
        );

        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "look again".into(),
        });
        assert_eq!(store.snapshot().history.len(), 3);
    }

    #[test]
    fn save_and_load_round_trip_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("party.json");
        let (mut engine, store, resp) = engine(Scripted::default());
        join(&mut engine, "Ana", "Rogue");

        engine.handle(EngineCommand::Save(path.clone()));
        engine.handle(EngineCommand::Leave { name: "Ana".into() });
        assert!(store.snapshot().players.is_empty());

        engine.handle(EngineCommand::Load(path));
        assert!(store.snapshot().player("Ana").is_some());

        let loaded = resp.try_iter().find_map(|r| match r {
            EngineResponse::PartyLoaded { players } => Some(players),
            _ => None,
        });
        assert_eq!(loaded, Some(vec![("Ana".to_string(), "Rogue".to_string())]));
    }

    #[test]
    fn renamed_seat_leaves_no_stale_player() {
        let narrator = Scripted::default();
        let prompts = narrator.prompts.clone();
        let (mut engine, store, resp) = engine(narrator);
        join(&mut engine, "Adventurer", "Warrior");

        engine.handle(EngineCommand::Rename {
            from: "Adventurer".into(),
            to: "Ana".into(),
            class: "Rogue".into(),
        });
        engine.handle(EngineCommand::SubmitAction {
            player: "Ana".into(),
            text: "look around".into(),
        });
        engine.handle(EngineCommand::Leave { name: "Ana".into() });

        assert!(store.snapshot().players.is_empty());
        assert!(!resp.try_iter().any(|r| matches!(r, EngineResponse::Error(_))));

        let seen = prompts.lock();
        let status = &seen[0][1].content;
        assert!(status.contains("- Ana (Rogue)"));
        assert!(!status.contains("Adventurer"));
        drop(seen);

        let next = PromptBuilder::build(&store.snapshot(), 12);
        assert!(next[1].content.contains("No adventurers have joined yet."));
    }
}
