//! Closed set of scene primitives.
//!
//! The world BVH stores `Primitive` values directly so traversal dispatches
//! with a `match` rather than through a vtable.

use lumo_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::cuboid::Cuboid;
use crate::hittable::{HitRecord, Hittable};
use crate::rect::AxisRect;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

#[derive(Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Rect(AxisRect),
    Triangle(Triangle),
    Cuboid(Cuboid),
}

impl Hittable for Primitive {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            Primitive::Sphere(s) => s.hit(ray, ray_t, rec),
            Primitive::Rect(r) => r.hit(ray, ray_t, rec),
            Primitive::Triangle(t) => t.hit(ray, ray_t, rec),
            Primitive::Cuboid(c) => c.hit(ray, ray_t, rec),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Rect(r) => r.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
            Primitive::Cuboid(c) => c.bounding_box(),
        }
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        match self {
            Primitive::Sphere(s) => s.pdf_value(origin, direction),
            Primitive::Rect(r) => r.pdf_value(origin, direction),
            Primitive::Triangle(t) => t.pdf_value(origin, direction),
            Primitive::Cuboid(c) => c.pdf_value(origin, direction),
        }
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Primitive::Sphere(s) => s.random(origin, rng),
            Primitive::Rect(r) => r.random(origin, rng),
            Primitive::Triangle(t) => t.random(origin, rng),
            Primitive::Cuboid(c) => c.random(origin, rng),
        }
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}

impl From<AxisRect> for Primitive {
    fn from(rect: AxisRect) -> Self {
        Primitive::Rect(rect)
    }
}

impl From<Triangle> for Primitive {
    fn from(triangle: Triangle) -> Self {
        Primitive::Triangle(triangle)
    }
}

impl From<Cuboid> for Primitive {
    fn from(cuboid: Cuboid) -> Self {
        Primitive::Cuboid(cuboid)
    }
}
