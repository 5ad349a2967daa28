//! Axis-aligned box built from six rectangles.

use std::sync::Arc;

use lumo_math::{Aabb, Interval, Ray, Vec3};
use rand::{Rng, RngCore};

use crate::bvh::Bvh;
use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use crate::rect::AxisRect;

/// Box spanning two opposite corners, faces pointing outward.
#[derive(Clone)]
pub struct Cuboid {
    sides: Bvh<AxisRect>,
    bbox: Aabb,
}

impl Cuboid {
    pub fn new(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> Self {
        let bbox = Aabb::from_points(a, b);
        let (p0, p1) = (bbox.min, bbox.max);
        let (x, y, z) = ((p0.x, p1.x), (p0.y, p1.y), (p0.z, p1.z));

        let sides = vec![
            AxisRect::xy(x, y, p1.z, material.clone()),
            AxisRect::xy(x, y, p0.z, material.clone()).flipped(),
            AxisRect::xz(x, z, p1.y, material.clone()),
            AxisRect::xz(x, z, p0.y, material.clone()).flipped(),
            AxisRect::yz(y, z, p1.x, material.clone()),
            AxisRect::yz(y, z, p0.x, material).flipped(),
        ];

        Self {
            sides: Bvh::new(sides),
            bbox,
        }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        self.sides.hit(ray, ray_t, rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Equal-weight mixture of the six faces.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        let faces = self.sides.objects();
        let sum: f64 = faces
            .iter()
            .map(|face| face.pdf_value(origin, direction))
            .sum();
        sum / faces.len() as f64
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let faces = self.sides.objects();
        faces[rng.gen_range(0..faces.len())].random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_cube() -> Cuboid {
        let material: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::ONE));
        Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0), material)
    }

    #[test]
    fn test_every_face_is_front_from_outside() {
        let cube = unit_cube();
        let interval = Interval::new(0.001, f64::INFINITY);
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, -Vec3::X, -Vec3::Y, -Vec3::Z] {
            let ray = Ray::new(axis * 5.0, -axis);
            let mut rec = HitRecord::default();
            assert!(cube.hit(&ray, interval, &mut rec));
            assert!((rec.t - 4.0).abs() < 1e-12);
            assert!(rec.front_face);
            assert_eq!(rec.normal, axis);
        }
    }

    #[test]
    fn test_random_directions_reach_cube() {
        let cube = unit_cube();
        let origin = Vec3::new(0.0, 6.0, 0.0);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..32 {
            let direction = cube.random(origin, &mut rng);
            let mut rec = HitRecord::default();
            let ray = Ray::new(origin, direction);
            assert!(cube.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec));
        }
    }
}
