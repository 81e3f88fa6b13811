use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::config_dir;
use crate::ui::settings::UiSettings;

fn settings_path() -> PathBuf {
    let path = config_dir();
    fs::create_dir_all(&path).ok();
    path.join("ui_settings.json")
}

pub fn load_settings() -> UiSettings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &UiSettings) {
    if let Err(e) = save_settings_to(&settings_path(), settings) {
        warn!(error = %e, "could not save UI settings");
    }
}

fn load_settings_from(path: &Path) -> UiSettings {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn save_settings_to(path: &Path, settings: &UiSettings) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
