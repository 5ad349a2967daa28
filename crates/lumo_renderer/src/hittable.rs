//! Hittable trait and HitRecord for ray-object intersection.

use lumo_math::{Aabb, Interval, Ray, Vec3};
use rand::{Rng, RngCore};

use crate::material::{Material, ScatterRecord};

/// Padding applied to the thin axis of flat primitives' boxes.
pub const BOX_PADDING: f64 = 1e-4;

/// Grazing cosines below this make an area sample worthless.
const GRAZING_COSINE: f64 = 1e-8;

/// A dummy material used for HitRecord::default().
/// Always absorbs light (returns None from scatter).
struct DummyMaterial;

impl Material for DummyMaterial {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _branch: usize,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }
}

/// Static dummy material instance for Default impl.
static DUMMY_MATERIAL: DummyMaterial = DummyMaterial;

/// Record of a ray-object intersection.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Surface normal at intersection (always points against ray)
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Surface parameterization
    pub u: f64,
    pub v: f64,
    /// Ray parameter of the intersection
    pub t: f64,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: &DUMMY_MATERIAL,
            u: 0.0,
            v: 0.0,
            t: 0.0,
            front_face: false,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The normal is always stored pointing against the ray direction,
    /// so we need to track whether we hit the front or back face.
    pub fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction().dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Trait for objects that can be hit by rays.
///
/// Objects used as importance targets also report a solid-angle density
/// and a sampling routine. The defaults are neutral (density 1, direction
/// +X) and only make sense for objects never used as targets.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Density, with respect to solid angle at `origin`, of sampling `direction`.
    fn pdf_value(&self, _origin: Vec3, _direction: Vec3) -> f64 {
        1.0
    }

    /// Direction from `origin` toward a random point on this object.
    fn random(&self, _origin: Vec3, _rng: &mut dyn RngCore) -> Vec3 {
        Vec3::X
    }
}

/// Solid-angle density of uniform area sampling on a flat surface.
///
/// Converts the area density `1 / area` through the hit distance and the
/// cosine between `direction` and the surface normal.
pub fn area_pdf_value<H: Hittable + ?Sized>(
    surface: &H,
    origin: Vec3,
    direction: Vec3,
    area: f64,
) -> f64 {
    let mut rec = HitRecord::default();
    let ray = Ray::new(origin, direction);
    if !surface.hit(&ray, Interval::new(0.001, f64::INFINITY), &mut rec) {
        return 0.0;
    }

    let length_squared = direction.length_squared();
    let distance_squared = rec.t * rec.t * length_squared;
    let cosine = direction.dot(rec.normal).abs() / length_squared.sqrt();
    if cosine < GRAZING_COSINE || area <= 0.0 {
        return 0.0;
    }
    distance_squared / (cosine * area)
}

/// A list of hittable objects.
///
/// As an importance target the list is an equal-weight mixture of its
/// members.
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
    bbox: Aabb,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for HittableList {
    fn default() -> Self {
        Self::new()
    }
}

impl Hittable for HittableList {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if object.hit(ray, interval, rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        if self.objects.is_empty() {
            return 1.0;
        }
        let sum: f64 = self
            .objects
            .iter()
            .map(|object| object.pdf_value(origin, direction))
            .sum();
        sum / self.objects.len() as f64
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.objects.is_empty() {
            return Vec3::Y;
        }
        let index = rng.gen_range(0..self.objects.len());
        self.objects[index].random(origin, rng)
    }
}
