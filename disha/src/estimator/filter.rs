//! Kalman smoothing of the dead-reckoned position.
//!
//! The motion integrator's predicted position is treated as a noisy
//! measurement `z` of the true position. Two formulations are available:
//!
//! | Kind                         | Covariance            | Gain                  |
//! |------------------------------|-----------------------|-----------------------|
//! | [`FilterKind::Decoupled`]    | two scalar variances  | per-axis scalar       |
//! | [`FilterKind::Covariant`]    | full 2×2 matrix       | `P · S⁻¹` (inverse)   |
//!
//! # Decoupled (default)
//!
//! Each axis runs an independent 1-D filter:
//!
//! ```text
//! P⁻ = P + q
//! K  = P⁻ / max(P⁻ + r, ε)
//! x  = x + K · (z − x)
//! P  = P⁻ · (1 − K)
//! ```
//!
//! The covariance stays diagonal forever; this is what the live estimator
//! runs and what recorded trajectories depend on.
//!
//! # Covariant
//!
//! The textbook filter with identity state transition and observation:
//!
//! ```text
//! P⁻ = P + qI
//! S  = P⁻ + rI
//! K  = P⁻ · S⁻¹
//! x  = x + K · (z − x)
//! P  = (I − K) · P⁻        (then symmetrized)
//! ```
//!
//! With isotropic noise and a diagonal starting covariance both variants
//! produce the same numbers. They diverge once the covariance carries
//! cross-axis terms, which only the covariant variant can represent.
//!
//! # Numerical Guards
//!
//! The innovation variance is clamped to [`MIN_INNOVATION_VARIANCE`] before
//! dividing or inverting. A candidate update whose position or covariance is
//! not finite is discarded: the filter keeps its prior estimate and
//! [`PositionFilter::update`] returns `None`.

use clap::ValueEnum;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use super::EstimatorConfig;

/// Lower bound on the innovation variance (`P⁻ + r`).
pub const MIN_INNOVATION_VARIANCE: f32 = 1e-9;

/// Available position filter formulations.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Two independent scalar filters, one per axis.
    #[default]
    Decoupled,

    /// Full 2×2 filter with matrix inverse.
    Covariant,
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterKind::Decoupled => write!(f, "Decoupled"),
            FilterKind::Covariant => write!(f, "Covariant"),
        }
    }
}

/// Outcome of an accepted filter update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterUpdate {
    /// Filtered position after the update.
    pub position: Vector2<f32>,
    /// Posterior covariance.
    pub uncertainty: Matrix2<f32>,
    /// Kalman gain used for this update (diagonal for the decoupled filter).
    pub gain: Matrix2<f32>,
}

// ============================================================================
// Decoupled filter
// ============================================================================

/// Per-axis scalar Kalman filter.
#[derive(Debug, Clone)]
pub struct DecoupledKalman {
    process_noise: f32,
    measurement_noise: f32,
    initial_uncertainty: f32,
    position: Vector2<f32>,
    /// Variance per axis.
    variance: Vector2<f32>,
}

impl DecoupledKalman {
    /// Create at the origin with `initial_uncertainty` on each axis.
    pub fn new(process_noise: f32, measurement_noise: f32, initial_uncertainty: f32) -> Self {
        Self {
            process_noise,
            measurement_noise,
            initial_uncertainty,
            position: Vector2::zeros(),
            variance: Vector2::repeat(initial_uncertainty),
        }
    }

    /// Fuse one measurement.
    pub fn update(&mut self, measurement: Vector2<f32>) -> Option<FilterUpdate> {
        let prior = self.variance.add_scalar(self.process_noise);
        let innovation_variance = prior
            .add_scalar(self.measurement_noise)
            .map(|s| s.max(MIN_INNOVATION_VARIANCE));
        let gain = prior.component_div(&innovation_variance);

        let innovation = measurement - self.position;
        let position = self.position + gain.component_mul(&innovation);
        let variance = prior.component_mul(&gain.map(|k| 1.0 - k));

        if !all_finite(position.iter()) || !all_finite(variance.iter()) {
            return None;
        }

        self.position = position;
        self.variance = variance;

        Some(FilterUpdate {
            position,
            uncertainty: Matrix2::from_diagonal(&variance),
            gain: Matrix2::from_diagonal(&gain),
        })
    }

    /// Filtered position.
    pub fn position(&self) -> Vector2<f32> {
        self.position
    }

    /// Per-axis variance.
    pub fn variance(&self) -> Vector2<f32> {
        self.variance
    }

    /// Covariance as a diagonal matrix.
    pub fn uncertainty(&self) -> Matrix2<f32> {
        Matrix2::from_diagonal(&self.variance)
    }

    /// Back to the origin with the initial variance.
    pub fn reset(&mut self) {
        self.position = Vector2::zeros();
        self.variance = Vector2::repeat(self.initial_uncertainty);
    }
}

// ============================================================================
// Covariant filter
// ============================================================================

/// Full 2×2 Kalman filter over position.
#[derive(Debug, Clone)]
pub struct CovariantKalman {
    process_noise: Matrix2<f32>,
    measurement_noise: Matrix2<f32>,
    initial_uncertainty: f32,
    position: Vector2<f32>,
    covariance: Matrix2<f32>,
}

impl CovariantKalman {
    /// Create at the origin with covariance `initial_uncertainty · I`.
    pub fn new(process_noise: f32, measurement_noise: f32, initial_uncertainty: f32) -> Self {
        Self {
            process_noise: Matrix2::identity() * process_noise,
            measurement_noise: Matrix2::identity() * measurement_noise,
            initial_uncertainty,
            position: Vector2::zeros(),
            covariance: Matrix2::identity() * initial_uncertainty,
        }
    }

    /// Start from an arbitrary position and covariance.
    pub fn with_covariance(mut self, position: Vector2<f32>, covariance: Matrix2<f32>) -> Self {
        self.position = position;
        self.covariance = covariance;
        self
    }

    /// Fuse one measurement.
    pub fn update(&mut self, measurement: Vector2<f32>) -> Option<FilterUpdate> {
        let prior = self.covariance + self.process_noise;
        let innovation_covariance = prior + self.measurement_noise;
        let s_inv = innovation_covariance
            .try_inverse()
            .or_else(|| clamp_diagonal(innovation_covariance).try_inverse())?;

        let gain = prior * s_inv;
        let innovation = measurement - self.position;
        let position = self.position + gain * innovation;

        let posterior = (Matrix2::identity() - gain) * prior;
        let covariance = (posterior + posterior.transpose()) * 0.5;

        if !all_finite(position.iter()) || !all_finite(covariance.iter()) {
            return None;
        }

        self.position = position;
        self.covariance = covariance;

        Some(FilterUpdate {
            position,
            uncertainty: covariance,
            gain,
        })
    }

    /// Filtered position.
    pub fn position(&self) -> Vector2<f32> {
        self.position
    }

    /// Full covariance.
    pub fn uncertainty(&self) -> Matrix2<f32> {
        self.covariance
    }

    /// Back to the origin with the initial covariance.
    pub fn reset(&mut self) {
        self.position = Vector2::zeros();
        self.covariance = Matrix2::identity() * self.initial_uncertainty;
    }
}

// ============================================================================
// Runtime selection
// ============================================================================

/// Position filter selected by [`FilterKind`].
#[derive(Debug, Clone)]
pub enum PositionFilter {
    /// Per-axis scalar filter.
    Decoupled(DecoupledKalman),
    /// Full 2×2 filter.
    Covariant(CovariantKalman),
}

impl PositionFilter {
    /// Build the filter named by `config.filter`.
    pub fn new(config: &EstimatorConfig) -> Self {
        match config.filter {
            FilterKind::Decoupled => PositionFilter::Decoupled(DecoupledKalman::new(
                config.process_noise,
                config.measurement_noise,
                config.initial_uncertainty,
            )),
            FilterKind::Covariant => PositionFilter::Covariant(CovariantKalman::new(
                config.process_noise,
                config.measurement_noise,
                config.initial_uncertainty,
            )),
        }
    }

    /// Which formulation is running.
    pub fn kind(&self) -> FilterKind {
        match self {
            PositionFilter::Decoupled(_) => FilterKind::Decoupled,
            PositionFilter::Covariant(_) => FilterKind::Covariant,
        }
    }

    /// Fuse one measurement; `None` when the update was discarded.
    pub fn update(&mut self, measurement: Vector2<f32>) -> Option<FilterUpdate> {
        match self {
            PositionFilter::Decoupled(f) => f.update(measurement),
            PositionFilter::Covariant(f) => f.update(measurement),
        }
    }

    /// Filtered position.
    pub fn position(&self) -> Vector2<f32> {
        match self {
            PositionFilter::Decoupled(f) => f.position(),
            PositionFilter::Covariant(f) => f.position(),
        }
    }

    /// Current covariance.
    pub fn uncertainty(&self) -> Matrix2<f32> {
        match self {
            PositionFilter::Decoupled(f) => f.uncertainty(),
            PositionFilter::Covariant(f) => f.uncertainty(),
        }
    }

    /// Back to the origin with the initial covariance.
    pub fn reset(&mut self) {
        match self {
            PositionFilter::Decoupled(f) => f.reset(),
            PositionFilter::Covariant(f) => f.reset(),
        }
    }
}

fn clamp_diagonal(mut m: Matrix2<f32>) -> Matrix2<f32> {
    for i in 0..2 {
        m[(i, i)] = m[(i, i)].max(MIN_INNOVATION_VARIANCE);
    }
    m
}

fn all_finite<'a>(mut values: impl Iterator<Item = &'a f32>) -> bool {
    values.all(|v| v.is_finite())
}
