//! Configuration management for millsim
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats, with a default file in the platform config directory.
//!
//! Configuration is organized into sections:
//! - Simulation settings (grid sizing, pacing, tool cutting length)
//! - Logging preferences

use millsim_core::GridSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Directory name under the platform config directory
const APP_DIR: &str = "millsim";

/// Default config file name
const CONFIG_FILE: &str = "config.toml";

/// Stock grid and runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Grid cells per model unit
    pub pixels_per_unit: u32,
    /// Stock size in model units (x, z)
    pub mesh_size: (u32, u32),
    /// Initial stock height
    pub default_depth: f32,
    /// Pause before each stamp, in milliseconds
    pub step_delay_ms: u64,
    /// Skip the per-stamp pause
    pub fast: bool,
    /// Deepest single-pass cut; the tool diameter when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutting_length: Option<f32>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let grid = GridSpec::default();
        Self {
            pixels_per_unit: grid.pixels_per_unit,
            mesh_size: grid.mesh_size,
            default_depth: grid.default_depth,
            step_delay_ms: 0,
            fast: false,
            cutting_length: None,
        }
    }
}

impl SimulationSettings {
    /// Grid sizing described by these settings
    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            mesh_size: self.mesh_size,
            pixels_per_unit: self.pixels_per_unit,
            default_depth: self.default_depth,
        }
    }

    /// Per-stamp pause as a duration
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

/// Log output preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulation settings
    pub simulation: SimulationSettings,
    /// Logging preferences
    pub logging: LoggingSettings,
}

/// Where [`Config::load_or_default`] got its values from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from this file
    File(PathBuf),
    /// Nothing at this path; defaults used
    Missing(PathBuf),
    /// The platform has no config directory; defaults used
    NoConfigDir,
}

impl ConfigOrigin {
    /// True when the defaults were used
    pub fn is_default(&self) -> bool {
        !matches!(self, ConfigOrigin::File(_))
    }
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "config {}", path.display()),
            Self::Missing(path) => write!(f, "defaults ({} not found)", path.display()),
            Self::NoConfigDir => write!(f, "defaults (no config directory)"),
        }
    }
}

#[derive(Clone, Copy)]
enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match ConfigFormat::from_path(path)? {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| {
                ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()).into()
            })
    }

    /// Load `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// parsed or validated is an error. The returned origin is for the caller
    /// to report, since this usually runs before logging is set up.
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<(Self, ConfigOrigin)> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Ok(path) => path,
                Err(_) => return Ok((Self::default(), ConfigOrigin::NoConfigDir)),
            },
        };

        if !path.exists() {
            return Ok((Self::default(), ConfigOrigin::Missing(path)));
        }
        let config = Self::load_from_file(&path)?;
        Ok((config, ConfigOrigin::File(path)))
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let sim = &self.simulation;

        if sim.pixels_per_unit == 0 {
            return Err(SettingsError::invalid(
                "simulation.pixels_per_unit",
                "must be > 0",
            ));
        }

        if sim.mesh_size.0 == 0 || sim.mesh_size.1 == 0 {
            return Err(SettingsError::invalid(
                "simulation.mesh_size",
                "both dimensions must be > 0",
            ));
        }

        if !sim.default_depth.is_finite() || sim.default_depth < 0.0 {
            return Err(SettingsError::invalid(
                "simulation.default_depth",
                "must be finite and >= 0",
            ));
        }

        if let Some(length) = sim.cutting_length {
            if !length.is_finite() || length <= 0.0 {
                return Err(SettingsError::invalid(
                    "simulation.cutting_length",
                    "must be finite and > 0",
                ));
            }
        }

        Ok(())
    }
}
