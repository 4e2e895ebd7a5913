//! Disha - Inertial state estimation from accelerometer and gyroscope streams
//!
//! Dead reckoning of a planar body: the gyroscope yaw rate is integrated
//! into a heading, device-frame acceleration is rotated into the world frame
//! and integrated into velocity and a predicted position, and a Kalman filter
//! smooths that prediction into the published position.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      main                           │  ← Demo binary
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                       io/                           │  ← Sample sources
//! │               (simulator, noise)                    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    service/                         │  ← Concurrency
//! │     (worker thread, shared state, trajectory)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   estimator/                        │  ← Estimation
//! │   (clocks, integrators, rotator, Kalman filter)     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use disha::{EstimatorConfig, EstimatorService, ServiceConfig};
//!
//! let service = EstimatorService::spawn(EstimatorConfig::default(), &ServiceConfig::default())?;
//! let handle = service.handle();
//!
//! handle.on_angular_rate_sample(0.0, 0.0, 0.5, 0)?;
//! handle.on_acceleration_sample(1.0, 0.0, 9.81, 0)?;
//! handle.sync()?;
//!
//! let state = handle.snapshot();
//! assert!(state.position.x > 0.0);
//!
//! service.shutdown()?;
//! # Ok::<(), disha::DishaError>(())
//! ```

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Estimation (depends on core)
// ============================================================================
pub mod estimator;

// ============================================================================
// Layer 3: Serialized service (depends on estimator)
// ============================================================================
pub mod service;

// ============================================================================
// Layer 4: Sample sources (depends on core)
// ============================================================================
pub mod io;

pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

pub use config::{DishaConfig, LoggingConfig};
pub use core::types::{RawSample, SensorStream, Timestamped};
pub use error::{DishaError, Result};
pub use estimator::{
    EstimatorConfig, EstimatorState, FilterKind, InertialEstimator, SampleOutcome,
};
pub use io::{MotionScript, SimulationConfig, StreamSimulator};
pub use service::{
    DiagnosticsSnapshot, EstimatorHandle, EstimatorService, PositionUpdate, PositionWatcher,
    ServiceConfig, TrajectoryConfig, TrajectoryRecorder,
};
