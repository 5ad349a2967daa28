use crate::{unit_vector, Vec3};

/// Orthonormal basis built around a single axis `w`.
///
/// Maps hemisphere samples expressed in local `(u, v, w)` coordinates into
/// world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    /// Build a basis whose `w` axis points along `n`.
    pub fn from_w(n: Vec3) -> Self {
        let w = unit_vector(n);
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = unit_vector(w.cross(a));
        let u = w.cross(v);
        Self { u, v, w }
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// World-space vector for local coordinates `(a, b, c)`.
    #[inline]
    pub fn local(&self, a: f64, b: f64, c: f64) -> Vec3 {
        a * self.u + b * self.v + c * self.w
    }

    #[inline]
    pub fn local_vec(&self, p: Vec3) -> Vec3 {
        self.local(p.x, p.y, p.z)
    }
}
