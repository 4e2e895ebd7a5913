//! Configuration loading for Disha
//!
//! A single TOML file with one table per component. Every field has a
//! default, so an empty file is a valid configuration.
//!
//! ```toml
//! [estimator]
//! process_noise = 0.01
//! measurement_noise = 0.1
//! filter = "decoupled"
//!
//! [service]
//! channel_capacity = 1024
//!
//! [simulation]
//! motion = "circle"
//! seed = 42
//!
//! [trajectory]
//! min_spacing = 0.01
//!
//! [logging]
//! level = "info"
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::error::{DishaError, Result};
use crate::estimator::EstimatorConfig;
use crate::io::SimulationConfig;
use crate::service::{ServiceConfig, TrajectoryConfig};

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DishaConfig {
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub trajectory: TrajectoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default filter for env_logger when RUST_LOG is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DishaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DishaConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or use defaults if the file doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Check every section for values the components cannot run with
    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        self.service.validate()?;
        self.simulation.validate()?;
        self.trajectory.validate()?;
        if self.logging.level.trim().is_empty() {
            return Err(DishaError::Config("logging.level must not be empty".into()));
        }
        Ok(())
    }
}
