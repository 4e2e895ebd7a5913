//! Estimator tuning constants.
//!
//! All values are fixed for the lifetime of an [`InertialEstimator`]; they are
//! read from the `[estimator]` table of the configuration file.
//!
//! [`InertialEstimator`]: super::InertialEstimator

use serde::{Deserialize, Serialize};

use super::clock::NOMINAL_SAMPLE_PERIOD_S;
use super::filter::FilterKind;
use crate::error::{DishaError, Result};

/// Configuration for the inertial estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Gain applied to the yaw rate before integration.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    /// Unit conversion from sensor acceleration to world position units.
    #[serde(default = "default_position_scale")]
    pub position_scale: f32,

    /// Variance added to each position axis on every filter update.
    ///
    /// Small values relative to `measurement_noise` give a smooth but slow
    /// trajectory; large values make it follow dead reckoning closely.
    #[serde(default = "default_process_noise")]
    pub process_noise: f32,

    /// Variance of the dead-reckoned position treated as a measurement.
    #[serde(default = "default_measurement_noise")]
    pub measurement_noise: f32,

    /// Nominal sensor period in seconds, used when no previous timestamp exists.
    #[serde(default = "default_sample_period_s")]
    pub sample_period_s: f32,

    /// Scale of the identity covariance at creation and after reset.
    #[serde(default = "default_initial_uncertainty")]
    pub initial_uncertainty: f32,

    /// Which Kalman formulation smooths the position.
    #[serde(default)]
    pub filter: FilterKind,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            position_scale: default_position_scale(),
            process_noise: default_process_noise(),
            measurement_noise: default_measurement_noise(),
            sample_period_s: default_sample_period_s(),
            initial_uncertainty: default_initial_uncertainty(),
            filter: FilterKind::default(),
        }
    }
}

impl EstimatorConfig {
    /// Check that every constant is usable by the integrators and filter.
    pub fn validate(&self) -> Result<()> {
        check_finite("sensitivity", self.sensitivity)?;
        check_finite("position_scale", self.position_scale)?;
        check_non_negative("process_noise", self.process_noise)?;
        check_non_negative("measurement_noise", self.measurement_noise)?;
        check_non_negative("initial_uncertainty", self.initial_uncertainty)?;
        check_finite("sample_period_s", self.sample_period_s)?;
        if self.sample_period_s <= 0.0 {
            return Err(DishaError::Config(format!(
                "sample_period_s must be positive, got {}",
                self.sample_period_s
            )));
        }
        Ok(())
    }

    /// Nominal sample rate in Hz.
    pub fn sample_rate_hz(&self) -> f32 {
        1.0 / self.sample_period_s
    }
}

fn check_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DishaError::Config(format!("{} must be finite, got {}", name, value)))
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(DishaError::Config(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

// Default value functions
fn default_sensitivity() -> f32 {
    1.0
}
fn default_position_scale() -> f32 {
    1.0
}
fn default_process_noise() -> f32 {
    0.01
}
fn default_measurement_noise() -> f32 {
    0.1
}
fn default_sample_period_s() -> f32 {
    NOMINAL_SAMPLE_PERIOD_S
}
fn default_initial_uncertainty() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = EstimatorConfig::default();
        assert_eq!(config.sensitivity, 1.0);
        assert_eq!(config.position_scale, 1.0);
        assert_eq!(config.filter, FilterKind::Decoupled);
        assert_relative_eq!(config.sample_rate_hz(), 60.0, epsilon = 1e-3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EstimatorConfig = toml::from_str(
            r#"
process_noise = 0.5
filter = "covariant"
"#,
        )
        .unwrap();
        assert_eq!(config.process_noise, 0.5);
        assert_eq!(config.measurement_noise, 0.1);
        assert_eq!(config.filter, FilterKind::Covariant);
    }

    #[test]
    fn test_rejects_negative_noise() {
        let config = EstimatorConfig {
            measurement_noise: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DishaError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_period() {
        let config = EstimatorConfig {
            sample_period_s: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_nan_sensitivity() {
        let config = EstimatorConfig {
            sensitivity: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
