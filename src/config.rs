use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_DATABASE_PATH: &str = "data/client.db";

pub const API_BASE_URL_ENV: &str = "CHAT_API_BASE_URL";
pub const DATABASE_PATH_ENV: &str = "CHAT_DATABASE_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    /// SQLite file for the persisted session; empty keeps it in memory.
    pub database_path: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Load the config file, falling back to defaults, then apply environment
/// overrides.
pub fn load_config(path: &str) -> AppConfig {
    let mut config = read_config_file(path);
    apply_overrides(&mut config, |key| env::var(key).ok());
    config
}

fn read_config_file(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

fn apply_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_BASE_URL_ENV).filter(|url| !url.is_empty()) {
        config.api_base_url = url;
    }
    if let Some(path) = lookup(DATABASE_PATH_ENV) {
        config.database_path = path;
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
