//! Service counters (lock-free atomics).

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::types::SensorStream;

/// Counters updated by the estimator thread and by sample producers.
#[derive(Debug, Default)]
pub struct ServiceDiagnostics {
    /// Accelerometer samples integrated
    pub acceleration_samples: AtomicU64,
    /// Gyroscope samples integrated
    pub angular_rate_samples: AtomicU64,
    /// Samples dropped because the intake was full
    pub dropped_samples: AtomicU64,
    /// Samples with NaN or infinite components
    pub rejected_samples: AtomicU64,
    /// Filter updates discarded as non-finite
    pub discarded_updates: AtomicU64,
    /// Resets applied
    pub resets: AtomicU64,
}

/// Plain copy of [`ServiceDiagnostics`] for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub acceleration_samples: u64,
    pub angular_rate_samples: u64,
    pub dropped_samples: u64,
    pub rejected_samples: u64,
    pub discarded_updates: u64,
    pub resets: u64,
}

impl ServiceDiagnostics {
    pub(crate) fn record_processed(&self, stream: SensorStream) {
        match stream {
            SensorStream::Acceleration => &self.acceleration_samples,
            SensorStream::AngularRate => &self.angular_rate_samples,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            acceleration_samples: self.acceleration_samples.load(Ordering::Relaxed),
            angular_rate_samples: self.angular_rate_samples.load(Ordering::Relaxed),
            dropped_samples: self.dropped_samples.load(Ordering::Relaxed),
            rejected_samples: self.rejected_samples.load(Ordering::Relaxed),
            discarded_updates: self.discarded_updates.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

impl DiagnosticsSnapshot {
    /// Samples that reached the estimator and changed it.
    pub fn processed_samples(&self) -> u64 {
        self.acceleration_samples + self.angular_rate_samples
    }
}
