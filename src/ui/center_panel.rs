use eframe::egui;
use std::sync::mpsc::Sender;

use crate::engine::protocol::EngineCommand;
use crate::ui::app::{draw_message, UiState};

pub fn draw_center_panel(ctx: &egui::Context, state: &mut UiState, cmd_tx: &Sender<EngineCommand>) {
    let input_id = egui::Id::new("chat_input_box");

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        let mut send_now = false;

        ui.horizontal(|ui| {
            let speaker = state
                .active_seat()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Nobody".into());
            ui.label(format!("{speaker}:"));

            let response = ui.add_sized(
                [ui.available_width() - 60.0, 28.0],
                egui::TextEdit::singleline(&mut state.input_text)
                    .id(input_id)
                    .hint_text("Describe your action..."),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            if ui
                .add_enabled(!state.busy, egui::Button::new("Send"))
                .clicked()
            {
                send_now = true;
            }
        });

        if send_now && !state.busy {
            let text = state.input_text.trim().to_string();

            if let (false, Some(seat)) = (text.is_empty(), state.active_seat()) {
                let _ = cmd_tx.send(EngineCommand::SubmitAction {
                    player: seat.party_name().to_string(),
                    text,
                });
                state.input_text.clear();
            }

            // Keep cursor focused
            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Chat history ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("⚔ The AI Dungeon");
        ui.separator();

        egui::ScrollArea::vertical()
            .stick_to_bottom(state.should_auto_scroll)
            .show(ui, |ui| {
                for turn in &state.snapshot.history {
                    draw_message(ui, &state.settings, turn);
                }

                if state.busy {
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("The DM watches...");
                    });
                }
            });
    });
}
