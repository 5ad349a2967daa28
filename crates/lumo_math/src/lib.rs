//! Lumo math types.
//!
//! Double-precision vectors come from glam; everything else here is the
//! small set of geometric primitives the path tracer and baker share.

pub use glam::{DVec2 as Vec2, DVec3 as Vec3};

mod aabb;
pub mod color;
mod interval;
mod onb;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;

/// Squared-length window inside which a vector already counts as unit length.
pub const UNIT_TOLERANCE: f64 = 1e-12;

/// Normalize `v`, returning it untouched when it is already unit length.
///
/// Zero-length input yields NaN components, so callers guard that case.
#[inline]
pub fn unit_vector(v: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if (len_sq - 1.0).abs() <= UNIT_TOLERANCE {
        v
    } else {
        v / len_sq.sqrt()
    }
}

/// Average of the three components, used to collapse a color to a scalar.
#[inline]
pub fn average(v: Vec3) -> f64 {
    (v.x + v.y + v.z) / 3.0
}
