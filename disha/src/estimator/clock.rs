//! Per-stream sample clock.
//!
//! Converts absolute microsecond timestamps into integration steps.
//!
//! | Situation                         | Returned `dt`            |
//! |-----------------------------------|--------------------------|
//! | First sample (or after reset)     | nominal sample period    |
//! | Timestamp after previous          | elapsed seconds          |
//! | Timestamp equal to previous       | 0.0                      |
//! | Timestamp before previous         | nominal sample period    |
//!
//! The last case is a contract violation by the sensor source. The step is
//! clamped to the nominal period so integration never runs backwards, and
//! the event is logged.

use crate::core::types::SensorStream;

/// Nominal sample period (60 Hz), also the fallback for unusable configured periods.
pub const NOMINAL_SAMPLE_PERIOD_S: f32 = 1.0 / 60.0;

/// Elapsed-time tracker for one sensor stream.
#[derive(Debug, Clone)]
pub struct SampleClock {
    stream: SensorStream,
    default_step_s: f32,
    last_timestamp_us: Option<u64>,
}

impl SampleClock {
    /// Create a clock with no previous timestamp.
    ///
    /// A step that is not finite and positive is replaced by
    /// [`NOMINAL_SAMPLE_PERIOD_S`], so `tick` never returns a negative `dt`.
    pub fn new(stream: SensorStream, default_step_s: f32) -> Self {
        let default_step_s = if default_step_s.is_finite() && default_step_s > 0.0 {
            default_step_s
        } else {
            log::warn!(
                "SampleClock: {} nominal step {} is unusable, using {:.4}s",
                stream,
                default_step_s,
                NOMINAL_SAMPLE_PERIOD_S
            );
            NOMINAL_SAMPLE_PERIOD_S
        };
        Self {
            stream,
            default_step_s,
            last_timestamp_us: None,
        }
    }

    /// Compute the step to the given timestamp and remember it.
    pub fn tick(&mut self, timestamp_us: u64) -> f32 {
        let dt = match self.last_timestamp_us {
            None => self.default_step_s,
            Some(last) if timestamp_us >= last => (timestamp_us - last) as f32 / 1_000_000.0,
            Some(last) => {
                log::warn!(
                    "SampleClock: {} timestamp went backwards ({}us -> {}us), using nominal step",
                    self.stream,
                    last,
                    timestamp_us
                );
                self.default_step_s
            }
        };
        self.last_timestamp_us = Some(timestamp_us);
        dt
    }

    /// Timestamp of the most recent sample, if any.
    pub fn last_timestamp_us(&self) -> Option<u64> {
        self.last_timestamp_us
    }

    /// Forget the previous timestamp.
    pub fn reset(&mut self) {
        self.last_timestamp_us = None;
    }
}
