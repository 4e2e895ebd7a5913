//! Serialized multi-producer front end for the estimator.
//!
//! - [`EstimatorService`]: Owns the worker thread
//! - [`EstimatorHandle`]: Cloneable sample intake and state reader
//! - [`SharedEstimate`] / [`PositionWatcher`]: Published state and change notification
//! - [`ServiceDiagnostics`]: Lock-free counters
//! - [`TrajectoryRecorder`]: Consumer-side displayed path

mod commands;
mod diagnostics;
mod shared;
mod trajectory;
mod worker;

pub use commands::{CommandReceiver, CommandSender, EstimatorCommand, create_command_channel};
pub use diagnostics::{DiagnosticsSnapshot, ServiceDiagnostics};
pub use shared::{PositionUpdate, PositionWatcher, SharedEstimate, SharedEstimateHandle};
pub use trajectory::{TrajectoryConfig, TrajectoryRecorder};
pub use worker::{EstimatorHandle, EstimatorService, EstimatorThread, ServiceConfig};
