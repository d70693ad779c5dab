use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::scroll::ScrollConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Rows taken by the keyboard panel at the bottom of the terminal.
    #[serde(default = "default_overlay_height")]
    pub overlay_height: u16,
    #[serde(default = "default_scroll_padding")]
    pub scroll_padding: u16,
    #[serde(default = "default_top_padding")]
    pub top_padding: u16,
    #[serde(default = "default_focus_settle_ms")]
    pub focus_settle_ms: u64,
    #[serde(default = "default_smooth_scroll_ms")]
    pub smooth_scroll_ms: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// Synthesized key-up delay for terminals that never report releases.
    #[serde(default = "default_release_fallback_ms")]
    pub release_fallback_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_overlay_height() -> u16 {
    10
}
fn default_scroll_padding() -> u16 {
    1
}
fn default_top_padding() -> u16 {
    1
}
fn default_focus_settle_ms() -> u64 {
    50
}
fn default_smooth_scroll_ms() -> u64 {
    120
}
fn default_tick_rate_ms() -> u64 {
    16
}
fn default_release_fallback_ms() -> u64 {
    150
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_file() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyviz")
        .join("keyviz.log")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overlay_height: default_overlay_height(),
            scroll_padding: default_scroll_padding(),
            top_padding: default_top_padding(),
            focus_settle_ms: default_focus_settle_ms(),
            smooth_scroll_ms: default_smooth_scroll_ms(),
            tick_rate_ms: default_tick_rate_ms(),
            release_fallback_ms: default_release_fallback_ms(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyviz")
            .join("config.toml")
    }

    /// Clamp values that would make the overlay unusable.
    pub fn validate(&mut self) {
        self.overlay_height = self.overlay_height.clamp(8, 40);
        self.tick_rate_ms = self.tick_rate_ms.clamp(1, 250);
        self.focus_settle_ms = self.focus_settle_ms.min(2000);
        self.smooth_scroll_ms = self.smooth_scroll_ms.min(2000);
        self.release_fallback_ms = self.release_fallback_ms.clamp(50, 5000);
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            self.log_level = default_log_level();
        }
    }

    /// Focus heuristic geometry in terminal rows.
    pub fn scroll_config(&self) -> ScrollConfig {
        ScrollConfig {
            overlay_height: f64::from(self.overlay_height),
            bottom_padding: f64::from(self.scroll_padding),
            top_padding: f64::from(self.top_padding),
            settle_delay: Duration::from_millis(self.focus_settle_ms),
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn release_fallback(&self) -> Duration {
        Duration::from_millis(self.release_fallback_ms)
    }

    pub fn smooth_scroll(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }
}
