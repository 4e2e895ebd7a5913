//! Complete estimator state as seen by readers.

use nalgebra::{Matrix2, Vector2, Vector3};

use crate::core::math::normalize_angle;

/// Full estimator state at one instant.
///
/// Produced as a value by [`InertialEstimator::state`] so readers always get
/// a consistent copy taken between two sample updates.
///
/// [`InertialEstimator::state`]: super::InertialEstimator::state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorState {
    /// Filtered world-frame position.
    pub position: Vector2<f32>,
    /// Dead-reckoning velocity (diagnostic, not a filtered quantity).
    pub velocity: Vector2<f32>,
    /// Most recent raw accelerometer sample.
    pub raw_acceleration: Vector3<f64>,
    /// Most recent raw gyroscope sample.
    pub raw_angular_rate: Vector3<f64>,
    /// Integrated heading in radians, within (−2π, 2π).
    pub heading: f32,
    /// Covariance of the filtered position.
    pub position_uncertainty: Matrix2<f32>,
    /// Timestamp of the last accelerometer sample, `None` after reset.
    pub last_acceleration_us: Option<u64>,
    /// Timestamp of the last gyroscope sample, `None` after reset.
    pub last_angular_rate_us: Option<u64>,
}

impl EstimatorState {
    /// State at creation: everything zero, covariance `initial_uncertainty · I`.
    pub fn initial(initial_uncertainty: f32) -> Self {
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            raw_acceleration: Vector3::zeros(),
            raw_angular_rate: Vector3::zeros(),
            heading: 0.0,
            position_uncertainty: Matrix2::identity() * initial_uncertainty,
            last_acceleration_us: None,
            last_angular_rate_us: None,
        }
    }

    /// Heading in degrees within [-180, 180], for display.
    pub fn heading_degrees(&self) -> f32 {
        normalize_angle(self.heading).to_degrees()
    }

    /// True until the first sample of either stream arrives.
    pub fn is_pristine(&self) -> bool {
        self.last_acceleration_us.is_none() && self.last_angular_rate_us.is_none()
    }
}

impl Default for EstimatorState {
    fn default() -> Self {
        Self::initial(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn test_initial_state() {
        let s = EstimatorState::default();
        assert_eq!(s.position, Vector2::zeros());
        assert_eq!(s.heading, 0.0);
        assert_eq!(s.position_uncertainty, Matrix2::identity());
        assert!(s.is_pristine());
    }

    #[test]
    fn test_heading_degrees_display_window() {
        let s = EstimatorState {
            heading: 1.5 * PI,
            ..Default::default()
        };
        assert_relative_eq!(s.heading_degrees(), -90.0, epsilon = 1e-3);
    }
}
