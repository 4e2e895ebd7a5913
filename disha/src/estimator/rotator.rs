//! Device-frame to world-frame rotation.

use nalgebra::Vector2;

/// Rotate a device-frame planar vector into the world frame.
///
/// `heading` is passed explicitly: the caller decides which heading sample
/// applies to which acceleration sample.
///
/// ```text
/// | cos h  -sin h | | x |
/// | sin h   cos h | | y |
/// ```
#[inline]
pub fn rotate_to_world(device: Vector2<f32>, heading: f32) -> Vector2<f32> {
    let (sin_h, cos_h) = heading.sin_cos();
    Vector2::new(
        device.x * cos_h - device.y * sin_h,
        device.x * sin_h + device.y * cos_h,
    )
}
