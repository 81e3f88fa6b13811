//! Application configuration, loaded from `config.toml` in the app config dir.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::model::game_state::DEFAULT_OPENING;

pub const APP_DIR: &str = "dungeon_table";

const API_KEY_VARS: [&str; 2] = ["DUNGEON_TABLE_API_KEY", "GROQ_API_KEY"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub narrator: NarratorConfig,
    #[serde(default)]
    pub game: GameConfig,
}

/// Chat-completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarratorConfig {
    /// OpenAI-compatible base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How many trailing history turns go into each prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_opening")]
    pub opening_message: String,
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "default_dice_sides")]
    pub dice_sides: u32,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_temperature() -> f32 {
    0.8
}
fn default_max_tokens() -> u32 {
    400
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_history_window() -> usize {
    12
}
fn default_opening() -> String {
    DEFAULT_OPENING.into()
}
fn default_refresh_interval_ms() -> u64 {
    5000
}
fn default_dice_sides() -> u32 {
    20
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            history_window: default_history_window(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            opening_message: default_opening(),
            refresh_interval_ms: default_refresh_interval_ms(),
            dice_sides: default_dice_sides(),
        }
    }
}

impl NarratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl GameConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(100))
    }
}

impl AppConfig {
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads the user config from the app config dir.
    pub fn load() -> Self {
        Self::load_from(&config_path(), api_key_from_env())
    }

    /// Reads `path`, falling back to defaults when the file is missing or
    /// broken. `env_key` wins over any key in the file.
    pub fn load_from(path: &Path, env_key: Option<String>) -> Self {
        let mut config = if path.exists() {
            match Self::from_file(path) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if let Some(key) = env_key {
            config.narrator.api_key = Some(key);
        }
        config
    }
}

pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
