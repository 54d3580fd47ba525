//! # reef-settings
//!
//! Layered configuration for the reefwatch backend.
//!
//! Loading flow: compiled defaults → optional JSON settings file
//! (deep-merged) → `REEF_*` environment variable overrides.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{DatabaseSettings, FeedSettings, ReefSettings, ServerSettings, TrainingSettings};
