//! Estimator thread and the handles used to feed it.
//!
//! ```text
//!  accel thread ─┐ try_send                          ┌─▶ snapshot()
//!                ├──▶ [bounded channel] ──▶ worker ──┤
//!  gyro thread ──┘                           │       └─▶ PositionWatcher
//!  reset/sync ── send (blocking) ────────────┘
//! ```
//!
//! The worker owns the [`InertialEstimator`] outright, so every mutation is
//! serialized by construction. Samples never block their producer: when the
//! intake is full the sample is dropped and counted. Control commands block
//! until there is room, so they are never lost and stay ordered after the
//! samples queued before them.

use serde::Deserialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::TrySendError;

use super::commands::{
    CommandReceiver, CommandSender, EstimatorCommand, ack_channel, create_command_channel,
};
use super::diagnostics::{DiagnosticsSnapshot, ServiceDiagnostics};
use super::shared::{PositionWatcher, SharedEstimate, SharedEstimateHandle};
use crate::core::types::{RawSample, SensorStream};
use crate::error::{DishaError, Result};
use crate::estimator::{EstimatorConfig, EstimatorState, InertialEstimator, SampleOutcome};

/// Intake configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceConfig {
    /// Commands that can be queued before samples start being dropped (default: 1024)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(DishaError::Config(
                "service.channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_channel_capacity() -> usize {
    1024
}

/// Estimator thread handle.
pub struct EstimatorThread {
    handle: JoinHandle<()>,
}

impl EstimatorThread {
    /// Spawn the worker that owns `estimator`.
    pub fn spawn(
        estimator: InertialEstimator,
        shared: SharedEstimateHandle,
        diagnostics: Arc<ServiceDiagnostics>,
        command_rx: CommandReceiver,
    ) -> Result<Self> {
        let handle = thread::Builder::new()
            .name("estimator".into())
            .spawn(move || run_worker_loop(estimator, &shared, &diagnostics, command_rx))?;

        Ok(Self { handle })
    }

    /// Wait for thread to finish.
    pub fn join(self) -> thread::Result<()> {
        self.handle.join()
    }
}

fn run_worker_loop(
    mut estimator: InertialEstimator,
    shared: &SharedEstimate,
    diagnostics: &ServiceDiagnostics,
    command_rx: CommandReceiver,
) {
    log::debug!("Estimator thread starting");

    // Ends on Shutdown or when every sender is gone
    for command in command_rx.iter() {
        match command {
            EstimatorCommand::Acceleration(sample) => {
                let outcome = estimator.on_acceleration_sample(&sample);
                record_outcome(
                    &estimator,
                    outcome,
                    SensorStream::Acceleration,
                    shared,
                    diagnostics,
                );
            }
            EstimatorCommand::AngularRate(sample) => {
                let outcome = estimator.on_angular_rate_sample(&sample);
                record_outcome(
                    &estimator,
                    outcome,
                    SensorStream::AngularRate,
                    shared,
                    diagnostics,
                );
            }
            EstimatorCommand::Reset { ack } => {
                estimator.reset();
                shared.publish_reset(estimator.state());
                diagnostics.record_reset();
                ack.send(()).ok();
            }
            EstimatorCommand::Sync { ack } => {
                ack.send(()).ok();
            }
            EstimatorCommand::Shutdown => break,
        }
    }

    log::debug!("Estimator thread stopped");
}

fn record_outcome(
    estimator: &InertialEstimator,
    outcome: SampleOutcome,
    stream: SensorStream,
    shared: &SharedEstimate,
    diagnostics: &ServiceDiagnostics,
) {
    match outcome {
        SampleOutcome::Acceleration(_) | SampleOutcome::AngularRate(_) => {
            diagnostics.record_processed(stream);
            shared.publish(estimator.state());
        }
        SampleOutcome::Discarded(_) => {
            diagnostics.record_discarded();
            // Clock and raw vector still moved
            shared.publish(estimator.state());
        }
        SampleOutcome::Rejected(_) => diagnostics.record_rejected(),
    }
}

/// Cloneable front end used by sensor callbacks and consumers.
#[derive(Clone, Debug)]
pub struct EstimatorHandle {
    command_tx: CommandSender,
    shared: SharedEstimateHandle,
    diagnostics: Arc<ServiceDiagnostics>,
}

impl EstimatorHandle {
    /// Queue an accelerometer sample without blocking.
    ///
    /// Returns `Ok(false)` if the intake was full and the sample was dropped.
    pub fn on_acceleration_sample(
        &self,
        x: f64,
        y: f64,
        z: f64,
        timestamp_us: u64,
    ) -> Result<bool> {
        self.submit(
            SensorStream::Acceleration,
            RawSample::from_components(x, y, z, timestamp_us),
        )
    }

    /// Queue a gyroscope sample without blocking.
    ///
    /// Returns `Ok(false)` if the intake was full and the sample was dropped.
    pub fn on_angular_rate_sample(
        &self,
        x: f64,
        y: f64,
        z: f64,
        timestamp_us: u64,
    ) -> Result<bool> {
        self.submit(
            SensorStream::AngularRate,
            RawSample::from_components(x, y, z, timestamp_us),
        )
    }

    /// Queue a sample for `stream` without blocking.
    pub fn submit(&self, stream: SensorStream, sample: RawSample) -> Result<bool> {
        let command = match stream {
            SensorStream::Acceleration => EstimatorCommand::Acceleration(sample),
            SensorStream::AngularRate => EstimatorCommand::AngularRate(sample),
        };

        match self.command_tx.try_send(command) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                self.diagnostics.record_dropped();
                let dropped = self.diagnostics.snapshot().dropped_samples;
                if dropped.is_power_of_two() {
                    log::warn!(
                        "Estimator intake full, dropped {} sample ({} dropped so far)",
                        stream,
                        dropped
                    );
                }
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(DishaError::ServiceStopped),
        }
    }

    /// Reset the estimator.
    ///
    /// Returns once the reset has been applied and its state published;
    /// samples queued before the call are processed first.
    pub fn reset(&self) -> Result<()> {
        let (ack, done) = ack_channel();
        self.command_tx
            .send(EstimatorCommand::Reset { ack })
            .map_err(|_| DishaError::ServiceStopped)?;
        done.recv().map_err(|_| DishaError::ServiceStopped)
    }

    /// Wait until every command queued before this call has been processed.
    pub fn sync(&self) -> Result<()> {
        let (ack, done) = ack_channel();
        self.command_tx
            .send(EstimatorCommand::Sync { ack })
            .map_err(|_| DishaError::ServiceStopped)?;
        done.recv().map_err(|_| DishaError::ServiceStopped)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> EstimatorState {
        self.shared.snapshot()
    }

    /// New position watcher starting at the current revision.
    pub fn watcher(&self) -> PositionWatcher {
        self.shared.watcher()
    }

    /// Current service counters.
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }
}

/// Running estimator: worker thread plus the handle that feeds it.
///
/// Dropping the service shuts the worker down.
pub struct EstimatorService {
    handle: EstimatorHandle,
    thread: Option<EstimatorThread>,
}

impl EstimatorService {
    /// Validate the configuration and start the worker.
    pub fn spawn(config: EstimatorConfig, service: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        service.validate()?;

        let estimator = InertialEstimator::new(config);
        let shared = Arc::new(SharedEstimate::new(estimator.state()));
        let diagnostics = Arc::new(ServiceDiagnostics::default());
        let (command_tx, command_rx) = create_command_channel(service.channel_capacity);

        let thread =
            EstimatorThread::spawn(estimator, shared.clone(), diagnostics.clone(), command_rx)?;

        log::info!(
            "Estimator service started ({} filter, intake capacity {})",
            config.filter,
            service.channel_capacity
        );

        Ok(Self {
            handle: EstimatorHandle {
                command_tx,
                shared,
                diagnostics,
            },
            thread: Some(thread),
        })
    }

    /// Handle for producers and consumers.
    pub fn handle(&self) -> EstimatorHandle {
        self.handle.clone()
    }

    /// Shared published state.
    pub fn shared(&self) -> SharedEstimateHandle {
        self.handle.shared.clone()
    }

    /// Stop the worker after it drains the commands queued so far.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // Fails only if the worker already exited
        self.handle.command_tx.send(EstimatorCommand::Shutdown).ok();
        thread.join().map_err(|_| {
            log::error!("Estimator thread panicked");
            DishaError::ServiceStopped
        })?;
        log::info!("Estimator service stopped");
        Ok(())
    }
}

impl Drop for EstimatorService {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Estimator service shutdown: {}", e);
        }
    }
}
