//! Scripted IMU simulator.
//!
//! Produces device-frame accelerometer and gyroscope samples for a planar
//! body following a scripted motion, with Gaussian noise.
//!
//! ## Frame
//!
//! - **X = forward**, **Y = left**, **Z = up**
//! - Yaw rate is counter-clockwise positive around Z
//! - Accelerometer Z reads +1g when level
//!
//! ## Scripts
//!
//! Every script starts at rest and ramps linearly to `cruise_speed` over
//! `ramp_s`, so the body-frame forward acceleration is constant during the
//! ramp and zero afterwards. Turning adds a centripetal `speed · yaw_rate`
//! on Y.

use clap::ValueEnum;
use nalgebra::Vector3;
use serde::Deserialize;
use std::f64::consts::TAU;
use std::fmt;

use super::noise::SensorNoise;
use crate::core::types::{RawSample, SensorStream};
use crate::error::{DishaError, Result};

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.80665;

/// Motion followed by the simulated body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MotionScript {
    /// Accelerate forward, then cruise.
    Straight,
    /// Constant yaw rate.
    #[default]
    Circle,
    /// Yaw rate oscillating with `figure_eight_period_s`.
    FigureEight,
}

impl fmt::Display for MotionScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionScript::Straight => write!(f, "straight"),
            MotionScript::Circle => write!(f, "circle"),
            MotionScript::FigureEight => write!(f, "figure-eight"),
        }
    }
}

/// Simulation configuration
#[derive(Clone, Debug, Deserialize)]
pub struct SimulationConfig {
    /// Accelerometer output rate in Hz (default: 100)
    #[serde(default = "default_rate_hz")]
    pub acceleration_rate_hz: f64,

    /// Gyroscope output rate in Hz (default: 100)
    #[serde(default = "default_rate_hz")]
    pub angular_rate_hz: f64,

    /// Length of the run in seconds (default: 20)
    #[serde(default = "default_duration_s")]
    pub duration_s: f64,

    /// Scripted motion (default: circle)
    #[serde(default)]
    pub motion: MotionScript,

    /// Forward speed after the ramp in m/s (default: 0.3)
    #[serde(default = "default_cruise_speed")]
    pub cruise_speed: f64,

    /// Time to reach cruise speed in seconds (default: 2.0)
    #[serde(default = "default_ramp_s")]
    pub ramp_s: f64,

    /// Peak yaw rate in rad/s (default: 0.4)
    #[serde(default = "default_turn_rate")]
    pub turn_rate: f64,

    /// Period of the figure-eight yaw oscillation in seconds (default: 16)
    #[serde(default = "default_figure_eight_period_s")]
    pub figure_eight_period_s: f64,

    /// Accelerometer noise stddev in m/s² (default: 0.02)
    #[serde(default = "default_acceleration_noise")]
    pub acceleration_noise: f64,

    /// Gyroscope noise stddev in rad/s (default: 0.002)
    #[serde(default = "default_angular_rate_noise")]
    pub angular_rate_noise: f64,

    /// Constant gyroscope Z bias in rad/s (default: 0)
    #[serde(default)]
    pub angular_rate_bias: f64,

    /// Random seed, 0 for entropy (default: 42)
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Pace samples in wall-clock time (default: true)
    #[serde(default = "default_realtime")]
    pub realtime: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            acceleration_rate_hz: default_rate_hz(),
            angular_rate_hz: default_rate_hz(),
            duration_s: default_duration_s(),
            motion: MotionScript::default(),
            cruise_speed: default_cruise_speed(),
            ramp_s: default_ramp_s(),
            turn_rate: default_turn_rate(),
            figure_eight_period_s: default_figure_eight_period_s(),
            acceleration_noise: default_acceleration_noise(),
            angular_rate_noise: default_angular_rate_noise(),
            angular_rate_bias: 0.0,
            seed: default_seed(),
            realtime: default_realtime(),
        }
    }
}

fn default_rate_hz() -> f64 {
    100.0
}
fn default_duration_s() -> f64 {
    20.0
}
fn default_cruise_speed() -> f64 {
    0.3
}
fn default_ramp_s() -> f64 {
    2.0
}
fn default_turn_rate() -> f64 {
    0.4
}
fn default_figure_eight_period_s() -> f64 {
    16.0
}
fn default_acceleration_noise() -> f64 {
    0.02
}
fn default_angular_rate_noise() -> f64 {
    0.002
}
fn default_seed() -> u64 {
    42
}
fn default_realtime() -> bool {
    true
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("acceleration_rate_hz", self.acceleration_rate_hz),
            ("angular_rate_hz", self.angular_rate_hz),
            ("ramp_s", self.ramp_s),
            ("figure_eight_period_s", self.figure_eight_period_s),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DishaError::Config(format!(
                    "simulation.{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("duration_s", self.duration_s),
            ("acceleration_noise", self.acceleration_noise),
            ("angular_rate_noise", self.angular_rate_noise),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DishaError::Config(format!(
                    "simulation.{} must be non-negative, got {}",
                    name, value
                )));
            }
        }

        if !(self.cruise_speed.is_finite()
            && self.turn_rate.is_finite()
            && self.angular_rate_bias.is_finite())
        {
            return Err(DishaError::Config(
                "simulation motion parameters must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Output rate of `stream` in Hz.
    pub fn rate_hz(&self, stream: SensorStream) -> f64 {
        match stream {
            SensorStream::Acceleration => self.acceleration_rate_hz,
            SensorStream::AngularRate => self.angular_rate_hz,
        }
    }
}

/// Noise-free body motion at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyMotion {
    /// Forward speed (m/s).
    pub speed: f64,
    /// Body-frame forward acceleration (m/s²).
    pub forward_acceleration: f64,
    /// Body-frame lateral (centripetal) acceleration (m/s²).
    pub lateral_acceleration: f64,
    /// Yaw rate (rad/s, CCW positive).
    pub yaw_rate: f64,
}

impl MotionScript {
    /// Ideal motion at `t` seconds into the run.
    pub fn motion_at(&self, config: &SimulationConfig, t: f64) -> BodyMotion {
        let (speed, forward_acceleration) = if t < config.ramp_s {
            (
                config.cruise_speed * t / config.ramp_s,
                config.cruise_speed / config.ramp_s,
            )
        } else {
            (config.cruise_speed, 0.0)
        };

        let yaw_rate = match self {
            MotionScript::Straight => 0.0,
            MotionScript::Circle => config.turn_rate,
            MotionScript::FigureEight => {
                config.turn_rate * (TAU * t / config.figure_eight_period_s).sin()
            }
        };

        BodyMotion {
            speed,
            forward_acceleration,
            lateral_acceleration: speed * yaw_rate,
            yaw_rate,
        }
    }

    /// True heading at `t` seconds (integral of the ideal yaw rate).
    pub fn heading_at(&self, config: &SimulationConfig, t: f64) -> f64 {
        match self {
            MotionScript::Straight => 0.0,
            MotionScript::Circle => config.turn_rate * t,
            MotionScript::FigureEight => {
                let period = config.figure_eight_period_s;
                config.turn_rate * period / TAU * (1.0 - (TAU * t / period).cos())
            }
        }
    }
}

/// Sample source for one stream.
///
/// Yields `duration_s · rate` samples stamped from 0 at the stream's period.
#[derive(Clone, Debug)]
pub struct StreamSimulator {
    stream: SensorStream,
    config: SimulationConfig,
    noise: SensorNoise,
    period_us: u64,
    index: u64,
    total: u64,
}

impl StreamSimulator {
    pub fn new(stream: SensorStream, config: &SimulationConfig) -> Result<Self> {
        let rate = config.rate_hz(stream);
        if !(rate.is_finite() && rate > 0.0) {
            return Err(DishaError::Simulation(format!(
                "{} rate must be positive, got {}",
                stream, rate
            )));
        }
        let period_us = (1e6 / rate).round().max(1.0) as u64;
        let total = (config.duration_s.max(0.0) * rate).floor() as u64;

        let noise = match stream {
            SensorStream::Acceleration => SensorNoise::for_stream(
                stream,
                config.seed,
                config.acceleration_noise,
                Vector3::zeros(),
            ),
            SensorStream::AngularRate => SensorNoise::for_stream(
                stream,
                config.seed,
                config.angular_rate_noise,
                Vector3::new(0.0, 0.0, config.angular_rate_bias),
            ),
        };

        Ok(Self {
            stream,
            config: config.clone(),
            noise,
            period_us,
            index: 0,
            total,
        })
    }

    pub fn stream(&self) -> SensorStream {
        self.stream
    }

    /// Spacing between sample timestamps.
    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Samples left to produce.
    pub fn remaining(&self) -> u64 {
        self.total - self.index
    }

    fn sample_at(&mut self, timestamp_us: u64) -> RawSample {
        let t = timestamp_us as f64 / 1e6;
        let motion = self.config.motion.motion_at(&self.config, t);

        let truth = match self.stream {
            SensorStream::Acceleration => Vector3::new(
                motion.forward_acceleration,
                motion.lateral_acceleration,
                GRAVITY,
            ),
            SensorStream::AngularRate => Vector3::new(0.0, 0.0, motion.yaw_rate),
        };
        RawSample::new(self.noise.corrupt(truth), timestamp_us)
    }
}

impl Iterator for StreamSimulator {
    type Item = RawSample;

    fn next(&mut self) -> Option<RawSample> {
        if self.index >= self.total {
            return None;
        }
        let timestamp_us = self.index * self.period_us;
        self.index += 1;
        Some(self.sample_at(timestamp_us))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining() as usize;
        (n, Some(n))
    }
}
