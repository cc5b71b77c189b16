use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use core_types::{
    DEFAULT_SPLIT_PERCENT, EditorTheme, MAX_SPLIT_PERCENT, MIN_SPLIT_PERCENT, ViewMode,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const DEFAULT_STORAGE_KEY: &str = "notes-store-v1";
const DEFAULT_DEBOUNCE_MS: u64 = 200;
const DEFAULT_LOG_FILTER: &str = "info,marknote=debug";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub default_view_mode: ViewMode,
    #[serde(default = "default_split_percent")]
    pub split_percent: f32,
    #[serde(default)]
    pub theme: EditorTheme,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

const fn default_split_percent() -> f32 {
    DEFAULT_SPLIT_PERCENT
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            storage_key: default_storage_key(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            default_view_mode: ViewMode::Both,
            split_percent: DEFAULT_SPLIT_PERCENT,
            theme: EditorTheme::Light,
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Brings hand-edited values back into range.
    fn normalize(&mut self) {
        if !self.split_percent.is_finite() {
            self.split_percent = DEFAULT_SPLIT_PERCENT;
        }
        self.split_percent = self
            .split_percent
            .clamp(MIN_SPLIT_PERCENT, MAX_SPLIT_PERCENT);
        if self.debounce_ms == 0 {
            self.debounce_ms = DEFAULT_DEBOUNCE_MS;
        }
        if self.storage_key.trim().is_empty() {
            self.storage_key = default_storage_key();
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
        dir.push("marknote");
        Ok(Self::from_dir(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            let config = AppConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).context("failed to parse app config json")?;
        self.migrate(&mut config);
        config.normalize();
        self.save(&config)?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let text = serde_json::to_string_pretty(config).context("failed to serialize config")?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn migrate(&self, config: &mut AppConfig) {
        if config.schema_version >= CURRENT_SCHEMA_VERSION {
            return;
        }

        warn!(
            from = config.schema_version,
            to = CURRENT_SCHEMA_VERSION,
            "migrating app config schema"
        );
        config.schema_version = CURRENT_SCHEMA_VERSION;
    }
}

/// Directory for the database and logs, e.g. `~/.local/share/marknote`.
pub fn default_data_dir() -> PathBuf {
    let mut dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push("marknote");
    dir
}

pub fn database_path(data_dir: &Path) -> PathBuf {
    data_dir.join("marknote.db")
}
