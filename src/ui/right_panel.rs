use eframe::egui;

use crate::model::game_state::{Monster, Player, MAX_PLAYER_HP};
use crate::ui::app::UiState;

const BATTLE_LOG_LINES: usize = 40;

pub fn draw_right_panel(ctx: &egui::Context, ui_state: &UiState) {
    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(300.0)
        .min_width(240.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let state = &ui_state.snapshot;

                ui.heading("👹 Monster");
                match &state.monster {
                    Some(monster) => draw_monster(ui, monster),
                    None => {
                        ui.label("The coast is clear.");
                    }
                }

                ui.separator();
                ui.heading("🧝 Party");
                if state.players.is_empty() {
                    ui.label("Nobody has joined yet.");
                }
                for player in &state.players {
                    draw_player(ui, player);
                }

                ui.separator();
                ui.collapsing("📜 Battle Log", |ui| {
                    let skip = state.battle_log.len().saturating_sub(BATTLE_LOG_LINES);
                    for entry in state.battle_log.iter().skip(skip) {
                        ui.label(format!("[{}] {}", entry.turn, entry.text));
                    }
                });
            });
        });
}

fn draw_monster(ui: &mut egui::Ui, monster: &Monster) {
    let title = if monster.active {
        egui::RichText::new(&monster.name).strong()
    } else {
        egui::RichText::new(format!("{} (defeated)", monster.name)).weak()
    };
    ui.label(title);
    ui.add(
        egui::ProgressBar::new(monster.hp_fraction())
            .fill(egui::Color32::from_rgb(150, 30, 30))
            .text(format!("HP {}/{}", monster.hp, monster.max_hp)),
    );
}

fn draw_player(ui: &mut egui::Ui, player: &Player) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&player.name).strong());
            ui.label(format!("({})", player.class));
            if player.is_down() {
                ui.label(egui::RichText::new("FALLEN").color(egui::Color32::LIGHT_RED));
            }
        });

        ui.add(
            egui::ProgressBar::new(player.hp as f32 / MAX_PLAYER_HP as f32)
                .fill(egui::Color32::from_rgb(40, 140, 60))
                .text(format!("HP {}/{}", player.hp, MAX_PLAYER_HP)),
        );
        ui.label(format!("💰 {} gold", player.gold));

        egui::CollapsingHeader::new(format!("🎒 Inventory ({})", player.inventory.len()))
            .id_salt(("inventory", &player.name))
            .show(ui, |ui| {
                if player.inventory.is_empty() {
                    ui.label("Empty");
                } else {
                    for item in &player.inventory {
                        ui.label(format!("• {item}"));
                    }
                }
            });
    });
}
