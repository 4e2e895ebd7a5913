//! Commands accepted by the estimator worker.
//!
//! Samples and control commands share one bounded channel so that a control
//! command is always applied after every sample queued before it.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::core::types::RawSample;

/// Work item for the estimator thread.
#[derive(Debug)]
pub enum EstimatorCommand {
    /// Accelerometer sample.
    Acceleration(RawSample),

    /// Gyroscope sample.
    AngularRate(RawSample),

    /// Reset the estimator; `ack` fires after the reset state is published.
    Reset {
        /// Completion signal.
        ack: Sender<()>,
    },

    /// Barrier; `ack` fires once everything queued before it is processed.
    Sync {
        /// Completion signal.
        ack: Sender<()>,
    },

    /// Stop the worker loop.
    Shutdown,
}

/// Sender end of the intake channel (held by every handle).
pub type CommandSender = Sender<EstimatorCommand>;

/// Receiver end of the intake channel (held by the estimator thread).
pub type CommandReceiver = Receiver<EstimatorCommand>;

/// Create the intake channel with room for `capacity` queued commands.
pub fn create_command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    bounded(capacity)
}

/// One-shot completion channel for acknowledged commands.
pub(crate) fn ack_channel() -> (Sender<()>, Receiver<()>) {
    bounded(1)
}
