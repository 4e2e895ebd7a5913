//! Sample sources.
//!
//! - [`StreamSimulator`]: Scripted IMU stream with Gaussian noise
//! - [`SensorNoise`]: Per-stream bias and white noise

mod noise;
mod simulator;

pub use noise::SensorNoise;
pub use simulator::{BodyMotion, GRAVITY, MotionScript, SimulationConfig, StreamSimulator};
