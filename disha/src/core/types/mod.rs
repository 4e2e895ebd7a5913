//! Core data types for inertial estimation.
//!
//! - [`Timestamped<T>`]: Generic microsecond timestamp wrapper
//! - [`RawSample`]: Timestamped three-axis sensor reading
//! - [`SensorStream`]: Which sensor stream a sample belongs to

mod sample;
mod timestamped;

pub use sample::{RawSample, SensorStream};
pub use timestamped::Timestamped;
