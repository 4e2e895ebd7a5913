//! Displayed path built from position change notifications.

use nalgebra::Vector2;
use serde::Deserialize;
use std::collections::VecDeque;

use super::shared::PositionUpdate;
use crate::error::{DishaError, Result};

/// Trajectory recorder configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct TrajectoryConfig {
    /// Minimum distance between consecutive points (default: 0.01)
    #[serde(default = "default_min_spacing")]
    pub min_spacing: f32,

    /// Points kept before the oldest are dropped (default: 4096)
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self {
            min_spacing: default_min_spacing(),
            max_points: default_max_points(),
        }
    }
}

impl TrajectoryConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_spacing.is_finite() && self.min_spacing >= 0.0) {
            return Err(DishaError::Config(
                "trajectory.min_spacing must be non-negative".into(),
            ));
        }
        if self.max_points == 0 {
            return Err(DishaError::Config(
                "trajectory.max_points must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_min_spacing() -> f32 {
    0.01
}
fn default_max_points() -> usize {
    4096
}

/// Bounded in-memory path of filtered positions.
#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    config: TrajectoryConfig,
    points: VecDeque<Vector2<f32>>,
    /// Total distance along the recorded points (not reduced by eviction).
    path_length: f32,
}

impl TrajectoryRecorder {
    pub fn new(config: TrajectoryConfig) -> Self {
        Self {
            config,
            points: VecDeque::with_capacity(config.max_points.min(1024)),
            path_length: 0.0,
        }
    }

    /// Apply a watcher update. A reset starts a new path.
    ///
    /// Returns true if a point was appended.
    pub fn apply(&mut self, update: &PositionUpdate) -> bool {
        if update.reset {
            self.clear();
        }
        self.record(update.state.position)
    }

    /// Append `position` if it is far enough from the last point.
    pub fn record(&mut self, position: Vector2<f32>) -> bool {
        if let Some(last) = self.points.back() {
            let step = (position - last).norm();
            if step < self.config.min_spacing {
                return false;
            }
            self.path_length += step;
        }

        // A zero bound still keeps the newest point
        while self.points.len() >= self.config.max_points.max(1) {
            self.points.pop_front();
        }
        self.points.push_back(position);
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.path_length = 0.0;
    }

    pub fn points(&self) -> &VecDeque<Vector2<f32>> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<Vector2<f32>> {
        self.points.back().copied()
    }

    /// Distance travelled since the last reset.
    pub fn path_length(&self) -> f32 {
        self.path_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::EstimatorState;
    use approx::assert_relative_eq;

    fn recorder(min_spacing: f32, max_points: usize) -> TrajectoryRecorder {
        TrajectoryRecorder::new(TrajectoryConfig {
            min_spacing,
            max_points,
        })
    }

    #[test]
    fn test_min_spacing() {
        let mut rec = recorder(0.1, 100);
        assert!(rec.record(Vector2::new(0.0, 0.0)));
        assert!(!rec.record(Vector2::new(0.05, 0.0)));
        assert!(rec.record(Vector2::new(0.15, 0.0)));
        assert_eq!(rec.len(), 2);
        assert_relative_eq!(rec.path_length(), 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_oldest_points_dropped() {
        let mut rec = recorder(0.0, 3);
        for i in 0..5 {
            rec.record(Vector2::new(i as f32, 0.0));
        }
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.points()[0], Vector2::new(2.0, 0.0));
        assert_eq!(rec.last(), Some(Vector2::new(4.0, 0.0)));
        assert_relative_eq!(rec.path_length(), 4.0);
    }

    #[test]
    fn test_single_point_bound() {
        let mut rec = recorder(0.0, 1);
        for i in 0..4 {
            assert!(rec.record(Vector2::new(i as f32, 0.0)));
            assert_eq!(rec.len(), 1);
        }
        assert_eq!(rec.last(), Some(Vector2::new(3.0, 0.0)));
        assert_relative_eq!(rec.path_length(), 3.0);
    }

    #[test]
    fn test_zero_bound_stays_bounded() {
        let mut rec = recorder(0.0, 0);
        for i in 0..10 {
            rec.record(Vector2::new(i as f32, 0.0));
        }
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.last(), Some(Vector2::new(9.0, 0.0)));
    }

    #[test]
    fn test_validate() {
        assert!(TrajectoryConfig::default().validate().is_ok());
        assert!(recorder(0.0, 1).config.validate().is_ok());
        assert!(matches!(
            recorder(0.01, 0).config.validate(),
            Err(DishaError::Config(_))
        ));
        assert!(recorder(-1.0, 10).config.validate().is_err());
        assert!(recorder(f32::NAN, 10).config.validate().is_err());
    }

    #[test]
    fn test_reset_update_starts_new_path() {
        let mut rec = recorder(0.0, 10);
        rec.record(Vector2::new(1.0, 1.0));
        rec.record(Vector2::new(2.0, 1.0));

        let update = PositionUpdate {
            state: EstimatorState::default(),
            revision: 3,
            reset: true,
        };
        assert!(rec.apply(&update));
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.last(), Some(Vector2::zeros()));
        assert_eq!(rec.path_length(), 0.0);
    }
}
