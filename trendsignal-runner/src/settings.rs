//! Confirmation settings: where the signal log lives, when the market
//! closes and how many entries each security keeps.
//!
//! Loaded from TOML; every field is optional and falls back to its default.
//!
//! ```toml
//! history_file = "results/signal_history.json"
//! market_close = "22:00"
//! retention_days = 30
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_HISTORY_FILE: &str = "results/signal_history.json";
pub const DEFAULT_RETENTION_DAYS: usize = 30;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("retention_days must be at least 1")]
    ZeroRetention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationSettings {
    pub history_file: PathBuf,
    /// Time of day from which an evaluation counts as official.
    #[serde(with = "hh_mm")]
    pub market_close: NaiveTime,
    /// Entries kept per security; older entries are dropped on append.
    pub retention_days: usize,
}

impl Default for ConfirmationSettings {
    fn default() -> Self {
        Self {
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            market_close: default_market_close(),
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

/// 22:00, the close of the 08:00-22:00 exchange session.
pub fn default_market_close() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN)
}

impl ConfirmationSettings {
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.retention_days == 0 {
            return Err(SettingsError::ZeroRetention);
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// `HH:MM` (seconds optional on input).
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(|e| de::Error::custom(format!("invalid market_close {s:?}: {e}")))
    }
}
