use eframe::egui;
use std::sync::mpsc::Sender;

use crate::engine::dice;
use crate::engine::protocol::EngineCommand;
use crate::ui::app::{LeftTab, Seat, UiState, CLASSES};
use crate::ui::settings_io::save_settings;

pub fn draw_left_panel(ctx: &egui::Context, ui_state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(240.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut ui_state.left_tab, LeftTab::Party, "Party");
                ui.selectable_value(&mut ui_state.left_tab, LeftTab::Settings, "Settings");
            });

            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match ui_state.left_tab {
                LeftTab::Party => draw_party_controls(ui, ui_state, cmd_tx),
                LeftTab::Settings => draw_settings(ui, ui_state),
            });
        });
}

/* =========================
   Party Controls
   ========================= */

fn draw_party_controls(ui: &mut egui::Ui, state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    ui.heading("🛡 Party Controls");

    ui.label("API Key");
    let key_edit = ui.add(
        egui::TextEdit::singleline(&mut state.api_key_input)
            .password(true)
            .hint_text("Paste your API key"),
    );
    if key_edit.changed() {
        let _ = cmd_tx.send(EngineCommand::SetApiKey(state.api_key_input.clone()));
    }
    if ui.button("Test connection").clicked() {
        let _ = cmd_tx.send(EngineCommand::TestConnection);
    }

    ui.separator();
    draw_seats(ui, state, cmd_tx);

    ui.separator();
    ui.label(egui::RichText::new("🎲 Roll the Dice").strong());
    let can_roll = !state.busy && state.active_seat().is_some();
    let label = format!("Roll D{}", dice::die_sides(state.dice_sides));
    if ui.add_enabled(can_roll, egui::Button::new(label)).clicked() {
        if let Some(seat) = state.active_seat() {
            let _ = cmd_tx.send(EngineCommand::RollDice {
                player: seat.party_name().to_string(),
            });
        }
    }

    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("💾 Save").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Dungeon save", &["json"])
                .set_file_name("dungeon.json")
                .save_file()
            {
                let _ = cmd_tx.send(EngineCommand::Save(path));
            }
        }
        if ui.button("📂 Load").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Dungeon save", &["json"])
                .pick_file()
            {
                let _ = cmd_tx.send(EngineCommand::Load(path));
            }
        }
    });

    if ui.button("🔥 Reset Game").clicked() {
        let _ = cmd_tx.send(EngineCommand::Reset);
    }

    if let Some((text, is_error)) = &state.status {
        ui.separator();
        let color = if *is_error {
            egui::Color32::LIGHT_RED
        } else {
            egui::Color32::LIGHT_GREEN
        };
        ui.label(egui::RichText::new(text).color(color));
    }
}

fn draw_seats(ui: &mut egui::Ui, state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    ui.label("Seats");

    let mut remove_index: Option<usize> = None;
    let mut sync_index: Option<usize> = None;

    for (i, seat) in state.seats.iter_mut().enumerate() {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.radio_value(&mut state.active_seat, i, "Active");
                if ui.small_button("❌").clicked() {
                    remove_index = Some(i);
                }
            });

            ui.label("Character Name");
            ui.text_edit_singleline(&mut seat.name);

            egui::ComboBox::from_id_salt(("seat_class", i))
                .selected_text(seat.class.clone())
                .show_ui(ui, |ui| {
                    for class in CLASSES {
                        ui.selectable_value(&mut seat.class, class.to_string(), class);
                    }
                });

            if ui.button("Join / Update").clicked() {
                sync_index = Some(i);
            }
        });
    }

    if let Some(i) = sync_index {
        let name = state.seats[i].name.trim().to_string();
        if name.is_empty() {
            state.status = Some(("Character name must not be empty".into(), true));
        } else if state.name_taken(i, &name) {
            state.status = Some((format!("{name} is already in the party"), true));
        } else {
            let cmd = state.seats[i].join_command();
            let _ = cmd_tx.send(cmd);
        }
    }

    if let Some(i) = remove_index {
        let seat = state.seats.remove(i);
        if let Some(cmd) = seat.leave_command() {
            let _ = cmd_tx.send(cmd);
        }
        if state.active_seat >= state.seats.len() {
            state.active_seat = state.seats.len().saturating_sub(1);
        }
    }

    ui.horizontal(|ui| {
        ui.add_sized(
            [150.0, 20.0],
            egui::TextEdit::singleline(&mut state.new_seat_name).hint_text("New player"),
        );

        let name = state.new_seat_name.trim().to_string();
        if ui.button("Add").clicked() && !name.is_empty() {
            if state.name_taken(state.seats.len(), &name) {
                state.status = Some((format!("{name} is already in the party"), true));
                return;
            }
            let mut seat = Seat {
                name,
                ..Seat::default()
            };
            let _ = cmd_tx.send(seat.join_command());
            state.seats.push(seat);
            state.active_seat = state.seats.len() - 1;
            state.new_seat_name.clear();
        }
    });
}

/* =========================
   Settings
   ========================= */

fn draw_settings(ui: &mut egui::Ui, state: &mut UiState) {
    ui.label("UI Scale");
    ui.add(egui::Slider::new(&mut state.settings.ui_scale, 0.75..=2.0));

    ui.separator();
    ui.label("Speaker colors");
    for key in ["Player", "DungeonMaster", "System"] {
        let mut color = state.settings.color(key);
        ui.horizontal(|ui| {
            if ui.color_edit_button_srgba(&mut color).changed() {
                state.settings.set_color(key, color);
            }
            ui.label(key);
        });
    }

    ui.separator();
    if ui.button("Save settings").clicked() {
        save_settings(&state.settings);
    }
}
