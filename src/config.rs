//! Runtime configuration.
//!
//! Read once at startup from the optional localStorage key
//! `office_escape_config` (JSON). Every field has a default, so a partial
//! object is valid. Game progress is never written back.

use serde::Deserialize;
use thiserror::Error;

use crate::games::escape::room::RoomId;

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "office_escape_config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    pub volume: f64,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_room: RoomId,
    pub countdown_minutes: u32,
    /// `EnvFilter` directive string, e.g. `"info,office_escape=debug"`.
    pub log_filter: String,
    pub sound: SoundConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_room: RoomId::West,
            countdown_minutes: 60,
            log_filter: "info".to_string(),
            sound: SoundConfig::default(),
        }
    }
}

pub const MAX_COUNTDOWN_MINUTES: u32 = 180;

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        config.sound.volume = config.sound.volume.clamp(0.0, 1.0);
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_COUNTDOWN_MINUTES).contains(&self.countdown_minutes) {
            return Err(ConfigError::Invalid(format!(
                "countdown_minutes must be 1..={}, got {}",
                MAX_COUNTDOWN_MINUTES, self.countdown_minutes
            )));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter is empty".to_string()));
        }
        Ok(())
    }

    pub fn countdown_ms(&self) -> u64 {
        self.countdown_minutes as u64 * 60_000
    }

    /// Load from localStorage, falling back to defaults.
    ///
    /// Runs before the subscriber exists, so problems are returned as a
    /// message for the caller to log once logging is up.
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> (Self, Option<String>) {
        let storage = match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            Some(s) => s,
            None => return (Self::default(), None),
        };
        match storage.get_item(STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => (config, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("{STORAGE_KEY}: {e}; using defaults")),
                ),
            },
            _ => (Self::default(), None),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> (Self, Option<String>) {
        (Self::default(), None)
    }
}
