//! Raw inertial sample types.

use nalgebra::{Vector2, Vector3};

use super::Timestamped;

/// Timestamped three-axis reading exactly as the sensor source delivered it.
pub type RawSample = Timestamped<Vector3<f64>>;

/// The two independent sample streams feeding the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorStream {
    /// Linear acceleration in the device frame.
    Acceleration,
    /// Angular rate in the device frame (z = yaw).
    AngularRate,
}

impl std::fmt::Display for SensorStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorStream::Acceleration => write!(f, "acceleration"),
            SensorStream::AngularRate => write!(f, "angular-rate"),
        }
    }
}

impl RawSample {
    /// Build a sample from its components.
    #[inline]
    pub fn from_components(x: f64, y: f64, z: f64, timestamp_us: u64) -> Self {
        Self::new(Vector3::new(x, y, z), timestamp_us)
    }

    /// True when every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Planar (x, y) part in single precision, the estimator's working type.
    #[inline]
    pub fn planar(&self) -> Vector2<f32> {
        Vector2::new(self.data.x as f32, self.data.y as f32)
    }

    /// Yaw component (z axis) in single precision.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.data.z as f32
    }
}
