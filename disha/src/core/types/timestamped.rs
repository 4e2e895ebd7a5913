//! Timestamp wrapper shared by both sample streams.

/// Value stamped with the sensor source's clock.
///
/// Only differences between timestamps of the same stream are meaningful;
/// the two streams may use unrelated epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestamped<T> {
    pub data: T,
    /// Microseconds
    pub timestamp_us: u64,
}

impl<T> Timestamped<T> {
    #[inline]
    pub fn new(data: T, timestamp_us: u64) -> Self {
        Self { data, timestamp_us }
    }
}
