//! # lexdrift-settings
//!
//! Application settings: compiled defaults, deep-merged overrides from an
//! optional JSON settings file, and `LEXDRIFT_*` environment variables on
//! top.

#![deny(unsafe_code)]

mod loader;
mod types;

pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::{AppSettings, ServerSettings, SessionSettings, SettingsError};
