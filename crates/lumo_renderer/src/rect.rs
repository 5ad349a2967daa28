//! Axis-aligned rectangles.

use std::sync::Arc;

use lumo_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{area_pdf_value, HitRecord, Hittable, BOX_PADDING};
use crate::material::Material;
use crate::random::gen_range;

/// Plane a rectangle lies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectPlane {
    /// Constant z, spans x and y.
    Xy,
    /// Constant y, spans x and z.
    Xz,
    /// Constant x, spans y and z.
    Yz,
}

impl RectPlane {
    /// `(first span axis, second span axis, normal axis)`.
    fn axes(self) -> (usize, usize, usize) {
        match self {
            RectPlane::Xy => (0, 1, 2),
            RectPlane::Xz => (0, 2, 1),
            RectPlane::Yz => (1, 2, 0),
        }
    }
}

/// Rectangle `[a0, a1] x [b0, b1]` in the plane `normal axis = k`.
///
/// The outward normal is the positive normal axis unless the rectangle is
/// flipped.
#[derive(Clone)]
pub struct AxisRect {
    plane: RectPlane,
    a0: f64,
    a1: f64,
    b0: f64,
    b1: f64,
    k: f64,
    flipped: bool,
    material: Arc<dyn Material>,
}

impl AxisRect {
    pub fn new(
        plane: RectPlane,
        (a0, a1): (f64, f64),
        (b0, b1): (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
    ) -> Self {
        Self {
            plane,
            a0: a0.min(a1),
            a1: a0.max(a1),
            b0: b0.min(b1),
            b1: b0.max(b1),
            k,
            flipped: false,
            material,
        }
    }

    /// Rectangle at `z = k`.
    pub fn xy(x: (f64, f64), y: (f64, f64), k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Xy, x, y, k, material)
    }

    /// Rectangle at `y = k`.
    pub fn xz(x: (f64, f64), z: (f64, f64), k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Xz, x, z, k, material)
    }

    /// Rectangle at `x = k`.
    pub fn yz(y: (f64, f64), z: (f64, f64), k: f64, material: Arc<dyn Material>) -> Self {
        Self::new(RectPlane::Yz, y, z, k, material)
    }

    /// Point the outward normal along the negative normal axis.
    pub fn flipped(mut self) -> Self {
        self.flipped = !self.flipped;
        self
    }

    pub fn plane(&self) -> RectPlane {
        self.plane
    }

    pub fn area(&self) -> f64 {
        (self.a1 - self.a0) * (self.b1 - self.b0)
    }

    fn outward_normal(&self) -> Vec3 {
        let (_, _, n) = self.plane.axes();
        let mut normal = Vec3::ZERO;
        normal[n] = if self.flipped { -1.0 } else { 1.0 };
        normal
    }

    fn point(&self, a: f64, b: f64) -> Vec3 {
        let (ia, ib, n) = self.plane.axes();
        let mut p = Vec3::ZERO;
        p[ia] = a;
        p[ib] = b;
        p[n] = self.k;
        p
    }
}

impl Hittable for AxisRect {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let (ia, ib, n) = self.plane.axes();
        let t = (self.k - ray.origin[n]) / ray.direction[n];
        // Parallel rays give an infinite or NaN t, which contains() rejects
        if !ray_t.contains(t) {
            return false;
        }

        let a = ray.origin[ia] + t * ray.direction[ia];
        let b = ray.origin[ib] + t * ray.direction[ib];
        if a < self.a0 || a > self.a1 || b < self.b0 || b > self.b1 {
            return false;
        }

        rec.u = (a - self.a0) / (self.a1 - self.a0);
        rec.v = (b - self.b0) / (self.b1 - self.b0);
        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.outward_normal());
        rec.material = self.material.as_ref();
        true
    }

    fn bounding_box(&self) -> Aabb {
        let lo = self.point(self.a0, self.b0);
        let hi = self.point(self.a1, self.b1);
        Aabb::from_points(lo, hi).pad_to_minimums(2.0 * BOX_PADDING)
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        area_pdf_value(self, origin, direction, self.area())
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let a = gen_range(rng, self.a0, self.a1);
        let b = gen_range(rng, self.b0, self.b1);
        self.point(a, b) - origin
    }
}
