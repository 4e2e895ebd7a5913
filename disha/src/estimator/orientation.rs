//! Yaw-rate integration into heading.
//!
//! First-order Euler integration with no bias estimation or filtering:
//!
//! ```text
//! heading ← (heading + ω_z · dt · sensitivity) mod 2π
//! ```
//!
//! Gyro bias therefore accumulates into heading drift without bound. Only the
//! position is filtered downstream.

use crate::core::math::wrap_heading;

/// Integrates angular rate about the z axis into a wrapped heading.
#[derive(Debug, Clone)]
pub struct OrientationIntegrator {
    sensitivity: f32,
    heading: f32,
}

impl OrientationIntegrator {
    /// Create an integrator at heading zero.
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            heading: 0.0,
        }
    }

    /// Advance heading by one yaw-rate sample and return the wrapped result.
    ///
    /// A step that overflows to a non-finite heading is refused: the previous
    /// heading is kept and `None` is returned.
    pub fn integrate(&mut self, yaw_rate: f32, dt: f32) -> Option<f32> {
        let heading = wrap_heading(self.heading + yaw_rate * dt * self.sensitivity);
        if !heading.is_finite() {
            return None;
        }
        self.heading = heading;
        Some(heading)
    }

    /// Current wrapped heading in radians.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Return heading to zero.
    pub fn reset(&mut self) {
        self.heading = 0.0;
    }
}
