use eframe::egui;
use egui::Layout;
use std::sync::mpsc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::engine::dice;
use crate::engine::engine::Engine;
use crate::engine::llm_client::Narrator;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::store::SharedStore;
use crate::model::game_state::GameState;
use crate::model::message::{ChatTurn, Role};
use crate::ui::center_panel::draw_center_panel;
use crate::ui::left_panel::draw_left_panel;
use crate::ui::right_panel::draw_right_panel;
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::load_settings;

pub const CLASSES: [&str; 4] = ["Warrior", "Mage", "Rogue", "Paladin"];

/// While a turn is in flight, poll the engine more often than the refresh timer.
const BUSY_REPAINT: Duration = Duration::from_millis(200);

/* =========================
   Seats
   ========================= */

/// A local player slot. Seats join the shared party under their name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub name: String,
    pub class: String,
    /// Name the party roster knows this seat by, once it has joined.
    pub joined_as: Option<String>,
}

impl Default for Seat {
    fn default() -> Self {
        Self {
            name: "Adventurer".into(),
            class: CLASSES[0].into(),
            joined_as: None,
        }
    }
}

impl Seat {
    /// A seat for a player who is already on the roster.
    pub fn seated(name: impl Into<String>, class: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            joined_as: Some(name.clone()),
            name,
            class: class.into(),
        }
    }

    /// The name actions and rolls are sent under.
    pub fn party_name(&self) -> &str {
        self.joined_as.as_deref().unwrap_or(&self.name)
    }

    /// Brings the roster in line with the edited name and class. A changed
    /// name renames the seated player instead of seating a second one.
    pub fn join_command(&mut self) -> EngineCommand {
        let name = self.name.trim().to_string();
        let cmd = match self.joined_as.take() {
            Some(old) if !old.eq_ignore_ascii_case(&name) => EngineCommand::Rename {
                from: old,
                to: name.clone(),
                class: self.class.clone(),
            },
            _ => EngineCommand::Join {
                name: name.clone(),
                class: self.class.clone(),
            },
        };
        self.joined_as = Some(name);
        cmd
    }

    pub fn leave_command(&self) -> Option<EngineCommand> {
        self.joined_as
            .clone()
            .map(|name| EngineCommand::Leave { name })
    }
}

/* =========================
   Tabs
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeftTab {
    #[default]
    Party,
    Settings,
}

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub struct UiState {
    pub input_text: String,
    pub api_key_input: String,

    pub seats: Vec<Seat>,
    pub active_seat: usize,
    pub new_seat_name: String,

    /// Last engine notice; `true` marks an error
    pub status: Option<(String, bool)>,
    pub busy: bool,

    pub snapshot: GameState,
    pub last_revision: Option<u64>,
    pub should_auto_scroll: bool,

    pub left_tab: LeftTab,
    pub settings: UiSettings,
    pub dice_sides: u32,
}

impl UiState {
    pub fn active_seat(&self) -> Option<&Seat> {
        self.seats.get(self.active_seat)
    }

    /// Whether `name` is on the roster under a seat other than `seat`.
    pub fn name_taken(&self, seat: usize, name: &str) -> bool {
        let own = self.seats.get(seat).and_then(|s| s.joined_as.as_deref());
        let name = name.trim();
        if own.is_some_and(|own| own.eq_ignore_ascii_case(name)) {
            return false;
        }
        self.snapshot.player(name).is_some()
            || self
                .seats
                .iter()
                .enumerate()
                .any(|(i, s)| i != seat && s.party_name().eq_ignore_ascii_case(name))
    }

    /// Replaces the local seats with one per loaded player.
    pub fn reseat(&mut self, players: Vec<(String, String)>) {
        self.seats = players
            .into_iter()
            .map(|(name, class)| Seat::seated(name, class))
            .collect();
        self.active_seat = 0;
    }
}

/* =========================
   App
   ========================= */

pub struct DungeonApp {
    ui: UiState,
    store: SharedStore,
    refresh: Duration,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl DungeonApp {
    pub fn new(config: AppConfig, narrator: Box<dyn Narrator + Send>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let store = SharedStore::new(GameState::with_opening(&config.game.opening_message));
        let refresh = config.game.refresh_interval();
        let api_key_input = config.narrator.api_key.clone().unwrap_or_default();

        let configured_dice_sides = config.game.dice_sides;

        let engine_store = store.clone();
        std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, engine_store, narrator, config);
            engine.run();
        });

        let mut seat = Seat::default();
        let _ = cmd_tx.send(seat.join_command());
        let dice_sides = dice::die_sides(configured_dice_sides);

        Self {
            ui: UiState {
                api_key_input,
                seats: vec![seat],
                dice_sides,
                settings: load_settings(),
                ..Default::default()
            },
            store,
            refresh,
            cmd_tx,
            resp_rx,
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::TurnStarted => {
                    self.ui.busy = true;
                }
                EngineResponse::TurnFinished { report } => {
                    self.ui.busy = false;
                    let lines = report.summary_lines();
                    self.ui.status = (!lines.is_empty()).then(|| (lines.join("\n"), false));
                }
                EngineResponse::PartyLoaded { players } => {
                    self.ui.reseat(players);
                }
                EngineResponse::Notice(text) => {
                    self.ui.status = Some((text, false));
                }
                EngineResponse::Error(text) => {
                    self.ui.busy = false;
                    self.ui.status = Some((text, true));
                }
            }
        }
    }

    /// Re-reads the shared store when another writer has moved it on.
    fn sync_snapshot(&mut self) {
        let revision = self.store.revision();
        if self.ui.last_revision != Some(revision) {
            self.ui.snapshot = self.store.snapshot();
            self.ui.last_revision = Some(self.ui.snapshot.revision);
            self.ui.should_auto_scroll = true;
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for DungeonApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.settings.ui_scale);

        self.drain_responses();
        self.sync_snapshot();

        draw_left_panel(ctx, &mut self.ui, &self.cmd_tx);
        draw_right_panel(ctx, &self.ui);
        draw_center_panel(ctx, &mut self.ui, &self.cmd_tx);

        self.ui.should_auto_scroll = false;

        let wait = if self.ui.busy { BUSY_REPAINT } else { self.refresh };
        ctx.request_repaint_after(wait);
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn draw_message(ui: &mut egui::Ui, settings: &UiSettings, turn: &ChatTurn) {
    let (key, right, label) = match (turn.role, turn.name.as_deref()) {
        (Role::Assistant, _) => ("DungeonMaster", false, "🧙 Dungeon Master".to_string()),
        (_, Some("SYSTEM")) | (Role::System, _) => ("System", false, "⚙ System".to_string()),
        (Role::User, name) => ("Player", true, format!("👤 {}", name.unwrap_or("Player"))),
    };

    ui.add_space(6.0);

    if right {
        ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
            bubble(ui, settings.color(key), &label, &turn.content);
        });
    } else {
        bubble(ui, settings.color(key), &label, &turn.content);
    }
}

fn bubble(ui: &mut egui::Ui, color: egui::Color32, speaker: &str, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(speaker)
                        .color(egui::Color32::LIGHT_GRAY)
                        .small(),
                );
                ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
            });
        });
}
