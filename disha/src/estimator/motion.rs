//! Dead reckoning from world-frame acceleration.
//!
//! ```text
//! v' = v + a_world · dt · position_scale
//! p̂  = p + v' · dt
//! ```
//!
//! `p̂` is only a measurement for the position filter. Velocity is committed
//! separately so a rejected filter update leaves the integrator untouched.

use nalgebra::Vector2;

/// Result of one integration step, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    /// Velocity after this step.
    pub velocity: Vector2<f32>,
    /// Dead-reckoned position handed to the filter as its measurement.
    pub predicted_position: Vector2<f32>,
}

/// Velocity integrator producing predicted positions.
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    position_scale: f32,
    velocity: Vector2<f32>,
}

impl MotionIntegrator {
    /// Create an integrator at rest.
    pub fn new(position_scale: f32) -> Self {
        Self {
            position_scale,
            velocity: Vector2::zeros(),
        }
    }

    /// Compute the next velocity and predicted position without mutating.
    pub fn predict(
        &self,
        world_acceleration: Vector2<f32>,
        position: Vector2<f32>,
        dt: f32,
    ) -> MotionStep {
        let velocity = self.velocity + world_acceleration * (dt * self.position_scale);
        MotionStep {
            velocity,
            predicted_position: position + velocity * dt,
        }
    }

    /// Accept a step produced by [`predict`](Self::predict).
    pub fn commit(&mut self, step: &MotionStep) {
        self.velocity = step.velocity;
    }

    /// Current velocity.
    pub fn velocity(&self) -> Vector2<f32> {
        self.velocity
    }

    /// Bring velocity back to zero.
    pub fn reset(&mut self) {
        self.velocity = Vector2::zeros();
    }
}
