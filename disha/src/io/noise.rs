//! Sensor error model for simulated streams.
//!
//! Each stream gets its own random source so accelerometer and gyroscope
//! noise stay independent while both follow from one configured seed.

use nalgebra::Vector3;
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

use crate::core::types::SensorStream;

/// Additive white noise plus a constant bias on every axis of one stream.
#[derive(Clone, Debug)]
pub struct SensorNoise {
    rng: SmallRng,
    stddev: f64,
    bias: Vector3<f64>,
}

impl SensorNoise {
    /// Noise for `stream` derived from a shared `seed`.
    ///
    /// Seed 0 draws from entropy. Any other seed is reproducible, and the two
    /// streams receive different generators from the same seed.
    pub fn for_stream(stream: SensorStream, seed: u64, stddev: f64, bias: Vector3<f64>) -> Self {
        let rng = match (seed, stream) {
            (0, _) => SmallRng::from_entropy(),
            (s, SensorStream::Acceleration) => SmallRng::seed_from_u64(s),
            (s, SensorStream::AngularRate) => SmallRng::seed_from_u64(s.wrapping_add(1).max(1)),
        };
        Self { rng, stddev, bias }
    }

    pub fn stddev(&self) -> f64 {
        self.stddev
    }

    pub fn bias(&self) -> Vector3<f64> {
        self.bias
    }

    /// Turn a true reading into what the sensor reports.
    ///
    /// Axes draw in x, y, z order.
    pub fn corrupt(&mut self, truth: Vector3<f64>) -> Vector3<f64> {
        if self.stddev == 0.0 {
            return truth + self.bias;
        }
        let stddev = self.stddev;
        let mut draw = || -> f64 { self.rng.sample::<f64, _>(StandardNormal) * stddev };
        let error = Vector3::new(draw(), draw(), draw());
        truth + self.bias + error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gyro_noise(seed: u64, stddev: f64) -> SensorNoise {
        SensorNoise::for_stream(SensorStream::AngularRate, seed, stddev, Vector3::zeros())
    }

    #[test]
    fn test_same_seed_same_stream_repeats() {
        let mut a = gyro_noise(42, 1.0);
        let mut b = gyro_noise(42, 1.0);
        for _ in 0..50 {
            assert_eq!(a.corrupt(Vector3::zeros()), b.corrupt(Vector3::zeros()));
        }
    }

    #[test]
    fn test_streams_get_independent_noise() {
        let mut accel =
            SensorNoise::for_stream(SensorStream::Acceleration, 42, 1.0, Vector3::zeros());
        let mut gyro = gyro_noise(42, 1.0);
        assert_ne!(accel.corrupt(Vector3::zeros()), gyro.corrupt(Vector3::zeros()));

        // u64::MAX wraps to 0 for the second stream, which must not mean entropy
        let mut a = gyro_noise(u64::MAX, 1.0);
        let mut b = gyro_noise(u64::MAX, 1.0);
        assert_eq!(a.corrupt(Vector3::zeros()), b.corrupt(Vector3::zeros()));
    }

    #[test]
    fn test_noiseless_adds_only_bias() {
        let bias = Vector3::new(0.0, 0.0, 0.25);
        let mut noise = SensorNoise::for_stream(SensorStream::AngularRate, 9, 0.0, bias);
        let truth = Vector3::new(1.0, -2.0, 0.5);
        for _ in 0..5 {
            assert_eq!(noise.corrupt(truth), Vector3::new(1.0, -2.0, 0.75));
        }
    }

    #[test]
    fn test_error_statistics() {
        let bias = Vector3::new(0.1, 0.0, -0.1);
        let mut noise = SensorNoise::for_stream(SensorStream::Acceleration, 7, 0.5, bias);
        let n = 10_000;
        let errors: Vec<Vector3<f64>> = (0..n).map(|_| noise.corrupt(Vector3::zeros())).collect();

        let mean = errors.iter().sum::<Vector3<f64>>() / n as f64;
        assert!((mean - bias).amax() < 0.03, "mean={:?}", mean);

        let var = errors
            .iter()
            .map(|e| (e - mean).component_mul(&(e - mean)))
            .sum::<Vector3<f64>>()
            / n as f64;
        for axis in 0..3 {
            let sd = var[axis].sqrt();
            assert!((sd - 0.5).abs() < 0.03, "axis {} stddev={}", axis, sd);
        }
    }
}
