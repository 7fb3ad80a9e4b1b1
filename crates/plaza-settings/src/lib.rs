//! # plaza-settings
//!
//! Configuration for the Plaza backend, loaded in layers:
//!
//! 1. Compiled defaults ([`PlazaSettings::default`])
//! 2. `~/.plaza/settings.json`, deep-merged over the defaults
//! 3. `PLAZA_*` environment variables (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::SettingsError;
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{AuthSettings, HubSettings, LoggingSettings, PlazaSettings, ServerSettings};
