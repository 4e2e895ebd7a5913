//! The inertial estimator: sample clocks, integrators and position filter.
//!
//! Every public operation is infallible. Degenerate input is handled
//! locally:
//!
//! - Non-finite sample components: sample rejected, nothing changes
//! - Timestamp earlier than the previous one: nominal step used
//! - Filter update that would be non-finite: update discarded, prior kept
//!
//! The estimator itself is single-threaded; see [`crate::service`] for the
//! serialized multi-producer front end.

use nalgebra::{Matrix2, Vector2, Vector3};

use super::{
    EstimatorConfig, EstimatorState, MotionIntegrator, OrientationIntegrator, PositionFilter,
    SampleClock, rotate_to_world,
};
use crate::core::types::{RawSample, SensorStream};

/// Details of an applied accelerometer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelerationStep {
    /// Integration step in seconds.
    pub dt: f32,
    /// Heading used for the rotation.
    pub heading: f32,
    /// Acceleration after rotation into the world frame.
    pub world_acceleration: Vector2<f32>,
    /// Velocity after this step.
    pub velocity: Vector2<f32>,
    /// Dead-reckoned position fed to the filter.
    pub predicted_position: Vector2<f32>,
    /// Filtered position after this step.
    pub position: Vector2<f32>,
    /// Kalman gain applied.
    pub gain: Matrix2<f32>,
}

/// Details of an applied gyroscope sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationStep {
    /// Integration step in seconds.
    pub dt: f32,
    /// Heading after this step.
    pub heading: f32,
}

/// What happened to a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Accelerometer sample integrated and filtered.
    Acceleration(AccelerationStep),
    /// Gyroscope sample integrated.
    AngularRate(RotationStep),
    /// Sample had non-finite components and was ignored.
    Rejected(SensorStream),
    /// Sample would have produced a non-finite estimate; the prior estimate is kept.
    Discarded(SensorStream),
}

impl SampleOutcome {
    /// True when the sample changed the estimate.
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            SampleOutcome::Acceleration(_) | SampleOutcome::AngularRate(_)
        )
    }
}

/// Dead-reckoning estimator with Kalman-smoothed position.
#[derive(Debug, Clone)]
pub struct InertialEstimator {
    config: EstimatorConfig,
    acceleration_clock: SampleClock,
    angular_rate_clock: SampleClock,
    orientation: OrientationIntegrator,
    motion: MotionIntegrator,
    filter: PositionFilter,
    raw_acceleration: Vector3<f64>,
    raw_angular_rate: Vector3<f64>,
}

impl InertialEstimator {
    /// Create an estimator in its initial state.
    ///
    /// An invalid configuration is logged rather than refused; the sample
    /// clocks fall back to the nominal period when the configured one is unusable.
    pub fn new(config: EstimatorConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("InertialEstimator: {}", e);
        }
        log::debug!(
            "InertialEstimator: {} filter, q={}, r={}, period={:.4}s",
            config.filter,
            config.process_noise,
            config.measurement_noise,
            config.sample_period_s
        );

        Self {
            acceleration_clock: SampleClock::new(
                SensorStream::Acceleration,
                config.sample_period_s,
            ),
            angular_rate_clock: SampleClock::new(SensorStream::AngularRate, config.sample_period_s),
            orientation: OrientationIntegrator::new(config.sensitivity),
            motion: MotionIntegrator::new(config.position_scale),
            filter: PositionFilter::new(&config),
            raw_acceleration: Vector3::zeros(),
            raw_angular_rate: Vector3::zeros(),
            config,
        }
    }

    /// Process one accelerometer sample.
    ///
    /// Uses whatever heading is current at the moment of the call.
    pub fn on_acceleration_sample(&mut self, sample: &RawSample) -> SampleOutcome {
        if !sample.is_finite() {
            log::warn!(
                "InertialEstimator: rejecting non-finite acceleration sample at {}us",
                sample.timestamp_us
            );
            return SampleOutcome::Rejected(SensorStream::Acceleration);
        }

        let dt = self.acceleration_clock.tick(sample.timestamp_us);
        self.raw_acceleration = sample.data;

        let heading = self.orientation.heading();
        let world_acceleration = rotate_to_world(sample.planar(), heading);
        let step = self
            .motion
            .predict(world_acceleration, self.filter.position(), dt);

        let Some(update) = self.filter.update(step.predicted_position) else {
            log::error!(
                "InertialEstimator: discarding non-finite filter update at {}us (predicted={:?})",
                sample.timestamp_us,
                step.predicted_position
            );
            return SampleOutcome::Discarded(SensorStream::Acceleration);
        };
        self.motion.commit(&step);

        SampleOutcome::Acceleration(AccelerationStep {
            dt,
            heading,
            world_acceleration,
            velocity: step.velocity,
            predicted_position: step.predicted_position,
            position: update.position,
            gain: update.gain,
        })
    }

    /// Process one gyroscope sample.
    pub fn on_angular_rate_sample(&mut self, sample: &RawSample) -> SampleOutcome {
        if !sample.is_finite() {
            log::warn!(
                "InertialEstimator: rejecting non-finite angular-rate sample at {}us",
                sample.timestamp_us
            );
            return SampleOutcome::Rejected(SensorStream::AngularRate);
        }

        let dt = self.angular_rate_clock.tick(sample.timestamp_us);
        self.raw_angular_rate = sample.data;
        let Some(heading) = self.orientation.integrate(sample.yaw(), dt) else {
            log::error!(
                "InertialEstimator: discarding angular-rate sample at {}us (non-finite heading)",
                sample.timestamp_us
            );
            return SampleOutcome::Discarded(SensorStream::AngularRate);
        };

        SampleOutcome::AngularRate(RotationStep { dt, heading })
    }

    /// Return to the creation state.
    ///
    /// The next sample on either stream integrates with the nominal step.
    pub fn reset(&mut self) {
        self.acceleration_clock.reset();
        self.angular_rate_clock.reset();
        self.orientation.reset();
        self.motion.reset();
        self.filter.reset();
        self.raw_acceleration = Vector3::zeros();
        self.raw_angular_rate = Vector3::zeros();
        log::debug!("InertialEstimator: reset");
    }

    /// Consistent copy of the full state.
    pub fn state(&self) -> EstimatorState {
        EstimatorState {
            position: self.filter.position(),
            velocity: self.motion.velocity(),
            raw_acceleration: self.raw_acceleration,
            raw_angular_rate: self.raw_angular_rate,
            heading: self.orientation.heading(),
            position_uncertainty: self.filter.uncertainty(),
            last_acceleration_us: self.acceleration_clock.last_timestamp_us(),
            last_angular_rate_us: self.angular_rate_clock.last_timestamp_us(),
        }
    }

    /// Filtered position.
    pub fn position(&self) -> Vector2<f32> {
        self.filter.position()
    }

    /// Current heading in radians.
    pub fn heading(&self) -> f32 {
        self.orientation.heading()
    }

    /// Configuration this estimator was built with.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::FilterKind;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn accel(x: f64, y: f64, t: u64) -> RawSample {
        RawSample::from_components(x, y, 0.0, t)
    }

    fn gyro(z: f64, t: u64) -> RawSample {
        RawSample::from_components(0.0, 0.0, z, t)
    }

    #[test]
    fn test_first_acceleration_uses_nominal_step() {
        let config = EstimatorConfig::default();
        let mut est = InertialEstimator::new(config);

        let SampleOutcome::Acceleration(step) = est.on_acceleration_sample(&accel(1.0, 0.0, 42))
        else {
            panic!("expected applied acceleration");
        };
        assert_relative_eq!(step.dt, config.sample_period_s);
        assert_relative_eq!(step.velocity.x, config.sample_period_s);
        assert_eq!(est.state().last_acceleration_us, Some(42));
    }

    #[test]
    fn test_heading_feeds_rotation() {
        let mut est = InertialEstimator::new(EstimatorConfig::default());

        // 1 rad/s for 1s after a first sample that uses the nominal step
        est.on_angular_rate_sample(&gyro(0.0, 0));
        est.on_angular_rate_sample(&gyro(FRAC_PI_2 as f64, 1_000_000));
        assert_relative_eq!(est.heading(), FRAC_PI_2, epsilon = 1e-6);

        let SampleOutcome::Acceleration(step) = est.on_acceleration_sample(&accel(1.0, 0.0, 0))
        else {
            panic!("expected applied acceleration");
        };
        assert_relative_eq!(step.world_acceleration.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(step.world_acceleration.y, 1.0, epsilon = 1e-6);
        assert!(est.position().y > 0.0);
        assert_relative_eq!(est.position().x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_angular_rate_publishes_raw_vector() {
        let mut est = InertialEstimator::new(EstimatorConfig::default());
        est.on_angular_rate_sample(&RawSample::from_components(0.1, 0.2, 0.3, 7));
        let state = est.state();
        assert_eq!(state.raw_angular_rate, Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(state.raw_acceleration, Vector3::zeros());
        assert_eq!(state.last_angular_rate_us, Some(7));
        assert_eq!(state.last_acceleration_us, None);
    }

    #[test]
    fn test_non_finite_samples_rejected() {
        let mut est = InertialEstimator::new(EstimatorConfig::default());
        est.on_acceleration_sample(&accel(1.0, 0.0, 0));
        let before = est.state();

        let outcome = est.on_acceleration_sample(&accel(f64::NAN, 0.0, 10_000));
        assert_eq!(outcome, SampleOutcome::Rejected(SensorStream::Acceleration));
        let outcome = est.on_angular_rate_sample(&gyro(f64::INFINITY, 10_000));
        assert_eq!(outcome, SampleOutcome::Rejected(SensorStream::AngularRate));
        assert!(!outcome.is_applied());

        assert_eq!(est.state(), before);
    }

    #[test]
    fn test_overflowing_sample_discarded() {
        let mut est = InertialEstimator::new(EstimatorConfig::default());
        est.on_acceleration_sample(&accel(1.0, 0.0, 0));
        let before = est.state();

        // Finite but large enough that v·dt overflows f32
        let outcome = est.on_acceleration_sample(&accel(1e35, 0.0, 1_000_000_000));
        assert_eq!(outcome, SampleOutcome::Discarded(SensorStream::Acceleration));

        let after = est.state();
        assert_eq!(after.position, before.position);
        assert_eq!(after.velocity, before.velocity);
        assert_eq!(after.position_uncertainty, before.position_uncertainty);
        assert!(after.position.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_overflowing_yaw_rate_keeps_heading() {
        let mut est = InertialEstimator::new(EstimatorConfig::default());
        est.on_angular_rate_sample(&gyro(0.5, 0));
        let heading = est.heading();

        // Finite as f64 but infinite once narrowed to f32
        let outcome = est.on_angular_rate_sample(&gyro(1e300, 10_000));
        assert_eq!(outcome, SampleOutcome::Discarded(SensorStream::AngularRate));
        assert!(!outcome.is_applied());
        assert_eq!(est.heading(), heading);
        assert!(crate::core::math::heading_in_window(est.heading()));

        // Acceleration keeps integrating afterwards
        for i in 0..5u64 {
            let outcome = est.on_acceleration_sample(&accel(1.0, 0.0, i * 10_000));
            assert!(outcome.is_applied());
        }
        assert!(est.position().iter().all(|v| v.is_finite()));
        assert!(est.position().norm() > 0.0);

        // Clock advanced: the next step is measured from the discarded sample
        match est.on_angular_rate_sample(&gyro(0.0, 20_000)) {
            SampleOutcome::AngularRate(step) => assert_relative_eq!(step.dt, 0.01),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_negative_period_never_integrates_backwards() {
        let config = EstimatorConfig {
            sample_period_s: -0.1,
            ..EstimatorConfig::default()
        };
        let mut est = InertialEstimator::new(config);

        match est.on_acceleration_sample(&accel(1.0, 0.0, 0)) {
            SampleOutcome::Acceleration(step) => {
                assert!(step.dt > 0.0);
                assert!(step.position.x > 0.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        match est.on_angular_rate_sample(&gyro(1.0, 0)) {
            SampleOutcome::AngularRate(step) => assert!(step.heading > 0.0),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_reset_restores_creation_state() {
        let config = EstimatorConfig::default();
        let mut est = InertialEstimator::new(config);
        est.on_angular_rate_sample(&gyro(1.0, 0));
        est.on_acceleration_sample(&accel(2.0, 1.0, 0));
        est.on_acceleration_sample(&accel(2.0, 1.0, 20_000));

        est.reset();
        assert_eq!(est.state(), EstimatorState::initial(config.initial_uncertainty));

        // Next sample behaves like the very first one
        let SampleOutcome::Acceleration(step) = est.on_acceleration_sample(&accel(1.0, 0.0, 30_000))
        else {
            panic!("expected applied acceleration");
        };
        assert_relative_eq!(step.dt, config.sample_period_s);
    }

    #[test]
    fn test_covariant_estimator_runs() {
        let config = EstimatorConfig {
            filter: FilterKind::Covariant,
            ..Default::default()
        };
        let mut est = InertialEstimator::new(config);
        for i in 0..60u64 {
            est.on_acceleration_sample(&accel(1.0, 0.5, i * 16_667));
        }
        let state = est.state();
        assert!(state.position.x > 0.0);
        assert!(state.position.y > 0.0);
        assert!(state.position_uncertainty.iter().all(|v| v.is_finite()));
    }
}
