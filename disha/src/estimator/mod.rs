//! Inertial state estimation.
//!
//! Turns two independent raw sample streams into a filtered world-frame
//! position and an integrated heading.
//!
//! # Data Flow
//!
//! ```text
//!  angular rate ──▶ SampleClock ──▶ OrientationIntegrator ──┐ heading
//!                                                            ▼
//!  acceleration ──▶ SampleClock ──▶ rotate_to_world ──▶ MotionIntegrator
//!                                                            │ predicted position
//!                                                            ▼
//!                                                     PositionFilter ──▶ position
//! ```
//!
//! # Components
//!
//! - [`SampleClock`]: Per-stream elapsed time with a nominal fallback step
//! - [`OrientationIntegrator`]: Euler integration of yaw rate into heading
//! - [`rotate_to_world`]: Device-frame to world-frame rotation
//! - [`MotionIntegrator`]: Dead reckoning of velocity and predicted position
//! - [`PositionFilter`]: Kalman smoothing of the dead-reckoned position
//! - [`InertialEstimator`]: Owns all of the above and the published state
//!
//! # Example
//!
//! ```
//! use disha::estimator::{EstimatorConfig, InertialEstimator};
//! use disha::core::types::RawSample;
//!
//! let mut estimator = InertialEstimator::new(EstimatorConfig::default());
//!
//! estimator.on_angular_rate_sample(&RawSample::from_components(0.0, 0.0, 0.2, 0));
//! estimator.on_acceleration_sample(&RawSample::from_components(1.0, 0.0, 0.0, 0));
//!
//! let state = estimator.state();
//! assert!(state.position.x > 0.0);
//! ```

mod clock;
mod config;
mod filter;
mod inertial;
mod motion;
mod orientation;
mod rotator;
mod state;

pub use clock::{NOMINAL_SAMPLE_PERIOD_S, SampleClock};
pub use config::EstimatorConfig;
pub use filter::{
    CovariantKalman, DecoupledKalman, FilterKind, FilterUpdate, MIN_INNOVATION_VARIANCE,
    PositionFilter,
};
pub use inertial::{AccelerationStep, InertialEstimator, RotationStep, SampleOutcome};
pub use motion::{MotionIntegrator, MotionStep};
pub use orientation::OrientationIntegrator;
pub use rotator::rotate_to_world;
pub use state::EstimatorState;
