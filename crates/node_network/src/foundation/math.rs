//! Math utilities and types
//!
//! Thin aliases over `nalgebra` plus the handful of scalar helpers the
//! simulation needs every frame.

pub use nalgebra::{Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// Hermite smoothstep on `[0, 1]`; inputs outside the range are clamped.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Unit vector pointing from `from` to `to` in the XY plane.
///
/// Coincident points have no direction; `fallback` is returned instead so
/// callers never divide by zero.
pub fn direction_2d(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let delta = to - from;
    let length = delta.norm();
    if length > 1e-6 {
        delta / length
    } else {
        fallback
    }
}
