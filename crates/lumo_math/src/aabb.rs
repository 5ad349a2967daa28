use crate::{Interval, Ray, Vec3};

/// Axis-aligned bounding box used by the BVH.
///
/// Stored as min/max corners. Boxes built with [`Aabb::from_points`] always
/// satisfy `min <= max` componentwise; [`Aabb::EMPTY`] is the identity of
/// [`Aabb::surrounding`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Contains nothing; every ray misses it.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f64::INFINITY),
        max: Vec3::splat(f64::NEG_INFINITY),
    };

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box enclosing both `box0` and `box1`.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Pad every axis thinner than `delta` out to `delta` total width.
    ///
    /// Flat primitives (rectangles, axis-aligned triangles) use this so the
    /// slab test never sees a zero-width box.
    pub fn pad_to_minimums(mut self, delta: f64) -> Self {
        for axis in 0..3 {
            if self.max[axis] - self.min[axis] < delta {
                let padded = self.axis_interval(axis).expand(delta);
                self.min[axis] = padded.min;
                self.max[axis] = padded.max;
            }
        }
        self
    }

    /// Extent of the box along axis `n` (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab test: does `ray` pass through the box within `ray_t`?
    pub fn hit(&self, ray: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let adinv = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * adinv;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 5.0), Vec3::new(0.0, 10.0, -5.0));
        assert_eq!(aabb.min, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(aabb.max, Vec3::new(10.0, 10.0, 5.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::splat(5.0));
        let box2 = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);
        assert_eq!(surrounding.min, Vec3::ZERO);
        assert_eq!(surrounding.max, Vec3::splat(10.0));
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_aabb_hit() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(aabb.hit(&ray, Interval::new(0.0, 100.0)));

        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 100.0)));

        // Box lies beyond the allowed range.
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_empty_aabb_is_never_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0));
        assert!(!Aabb::EMPTY.hit(&ray, Interval::new(f64::NEG_INFINITY, f64::INFINITY)));
    }

    #[test]
    fn test_pad_flat_axis() {
        let flat = Aabb::from_points(Vec3::new(0.0, 0.0, 1.0), Vec3::new(2.0, 2.0, 1.0))
            .pad_to_minimums(0.0002);
        assert!((flat.min.z - 0.9999).abs() < 1e-12);
        assert!((flat.max.z - 1.0001).abs() < 1e-12);
        assert_eq!(flat.min.x, 0.0);

        // A ray travelling inside the plane's slab still registers.
        let ray = Ray::new(Vec3::new(1.0, 1.0, 5.0), -Vec3::Z);
        assert!(flat.hit(&ray, Interval::new(0.0, 10.0)));
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (
            prop::array::uniform3(-100.0f64..100.0),
            prop::array::uniform3(-100.0f64..100.0),
        )
            .prop_map(|(a, b)| Aabb::from_points(Vec3::from_array(a), Vec3::from_array(b)))
    }

    proptest! {
        #[test]
        fn test_union_is_smallest_enclosing_box(a in arb_box(), b in arb_box()) {
            let union = Aabb::surrounding(&a, &b);
            for inner in [&a, &b] {
                prop_assert!(union.min.cmple(inner.min).all());
                prop_assert!(union.max.cmpge(inner.max).all());
            }
            // Every face of the union is a face of one of the inputs, so no
            // smaller box can contain both.
            for axis in 0..3 {
                prop_assert!(union.min[axis] == a.min[axis] || union.min[axis] == b.min[axis]);
                prop_assert!(union.max[axis] == a.max[axis] || union.max[axis] == b.max[axis]);
            }
        }
    }
}
