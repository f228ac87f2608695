//! Settings type definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use lexdrift_core::constants::DEFAULT_SESSION_TTL_SECS;
use lexdrift_core::types::TrainingSettings;

/// Settings loading errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file or merged value is not valid JSON for the schema.
    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// HTTP server settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

/// Session arbitration settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session time-to-live in seconds.
    pub ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// HTTP server.
    pub server: ServerSettings,
    /// Session lifecycle.
    pub session: SessionSettings,
    /// Defaults applied when a training request omits hyperparameters.
    pub training: TrainingSettings,
}
