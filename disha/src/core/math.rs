//! Angle primitives for heading integration.
//!
//! Two different windows are used in this crate:
//!
//! | Function             | Range        | Used by                        |
//! |----------------------|--------------|--------------------------------|
//! | [`wrap_heading`]     | (−2π, 2π)    | Orientation integrator state   |
//! | [`normalize_angle`]  | [−π, π]      | Display and logging only       |
//!
//! The integrator keeps the floating-point remainder so that the sign of the
//! accumulated heading is preserved; rotations are periodic in 2π so either
//! window produces the same world-frame vector.

use std::f32::consts::{PI, TAU};

/// Modulus applied to the integrated heading.
pub const HEADING_MODULUS: f32 = TAU;

/// Wrap an accumulated heading into (−2π, 2π) using floating-point remainder.
///
/// # Example
/// ```
/// use disha::core::math::wrap_heading;
/// use std::f32::consts::{PI, TAU};
///
/// assert!((wrap_heading(TAU + 0.5) - 0.5).abs() < 1e-5);
/// assert!((wrap_heading(-3.0 * PI) + PI).abs() < 1e-5);
/// ```
#[inline]
pub fn wrap_heading(heading: f32) -> f32 {
    heading % HEADING_MODULUS
}

/// Check that a heading lies in the integrator window.
#[inline]
pub fn heading_in_window(heading: f32) -> bool {
    heading > -HEADING_MODULUS && heading <= HEADING_MODULUS
}

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use disha::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}
