//! millsim Settings Crate
//!
//! Handles application configuration: loading, saving and validating the
//! simulation and logging settings.

pub mod config;
pub mod error;

pub use config::{Config, ConfigOrigin, LoggingSettings, SimulationSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
