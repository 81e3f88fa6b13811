mod config;
mod engine;
mod model;
mod ui;

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::engine::llm_client::ChatCompletionClient;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load();
    let narrator = ChatCompletionClient::new(&config.narrator)?;
    tracing::info!(model = %config.narrator.model, base_url = %config.narrator.base_url, "starting");

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "AI RPG: Dungeon Table",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::app::DungeonApp::new(config, Box::new(narrator))))),
    )
    .map_err(|e| anyhow!("UI failed: {e}"))
}
