//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Vertices wind counter-clockwise around the outward normal
//! `(v1 - v0) x (v2 - v0)`.

use std::sync::Arc;

use lumo_math::{unit_vector, Aabb, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::bake::BakeUv;
use crate::hittable::{area_pdf_value, HitRecord, Hittable, BOX_PADDING};
use crate::material::Material;
use crate::random::gen_f64;

/// Determinants below this count as a miss.
const EPSILON: f64 = 1e-8;

/// Barycentric weights of the three vertices. Always sums to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    pub w0: f64,
    pub w1: f64,
    pub w2: f64,
}

impl Barycentric {
    /// Weights from the Möller-Trumbore `(u, v)` pair.
    pub fn from_uv(u: f64, v: f64) -> Self {
        Self {
            w0: 1.0 - u - v,
            w1: u,
            w2: v,
        }
    }

    /// Weights selecting vertex `index` alone.
    pub fn vertex(index: usize) -> Self {
        let mut w = [0.0; 3];
        w[index] = 1.0;
        Self {
            w0: w[0],
            w1: w[1],
            w2: w[2],
        }
    }

    pub fn blend(&self, values: &[Vec3; 3]) -> Vec3 {
        self.w0 * values[0] + self.w1 * values[1] + self.w2 * values[2]
    }

    pub fn blend_uv(&self, values: &[Vec2; 3]) -> Vec2 {
        self.w0 * values[0] + self.w1 * values[1] + self.w2 * values[2]
    }
}

/// A triangle primitive.
#[derive(Clone)]
pub struct Triangle {
    vertices: [Vec3; 3],
    edge1: Vec3,
    edge2: Vec3,
    /// Unit geometric normal
    face_normal: Vec3,
    /// Per-vertex shading normals
    normals: Option<[Vec3; 3]>,
    uvs: [Vec2; 3],
    area: f64,
    culling: bool,
    bake: Option<BakeUv>,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a flat-shaded triangle with zero texture coordinates.
    pub fn new(vertices: [Vec3; 3], material: Arc<dyn Material>) -> Self {
        let [v0, v1, v2] = vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let cross = edge1.cross(edge2);

        let bbox = Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
            .pad_to_minimums(2.0 * BOX_PADDING);

        Self {
            vertices,
            edge1,
            edge2,
            face_normal: cross.normalize_or_zero(),
            normals: None,
            uvs: [Vec2::ZERO; 3],
            area: cross.length() * 0.5,
            culling: false,
            bake: None,
            material,
            bbox,
        }
    }

    /// Interpolate these per-vertex normals instead of the face normal.
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = Some(normals.map(unit_vector));
        self
    }

    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    /// Reject hits on the back face.
    pub fn with_culling(mut self, culling: bool) -> Self {
        self.culling = culling;
        self
    }

    /// Attach the lightmap coordinates used by the baker.
    pub fn with_bake_uvs(mut self, bake_uvs: [Vec2; 3]) -> Self {
        self.bake = Some(BakeUv::new(bake_uvs));
        self
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn face_normal(&self) -> Vec3 {
        self.face_normal
    }

    pub fn bake_uv(&self) -> Option<&BakeUv> {
        self.bake.as_ref()
    }

    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    /// World position at the given weights.
    pub fn position_at(&self, bary: Barycentric) -> Vec3 {
        bary.blend(&self.vertices)
    }

    /// Unit outward shading normal at the given weights.
    pub fn normal_at(&self, bary: Barycentric) -> Vec3 {
        match &self.normals {
            Some(normals) => bary.blend(normals).normalize_or_zero(),
            None => self.face_normal,
        }
    }

    /// Texture coordinates at the given weights.
    pub fn uv_at(&self, bary: Barycentric) -> Vec2 {
        bary.blend_uv(&self.uvs)
    }
}

impl Hittable for Triangle {
    /// Möller-Trumbore ray-triangle intersection algorithm.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let h = ray.direction().cross(self.edge2);
        let det = self.edge1.dot(h);

        // Back faces have negative determinant
        if self.culling {
            if det < EPSILON {
                return false;
            }
        } else if det.abs() < EPSILON {
            return false;
        }

        let f = 1.0 / det;
        let s = ray.origin() - self.vertices[0];
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.edge1);
        let v = f * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * self.edge2.dot(q);
        if !ray_t.contains(t) {
            return false;
        }

        let bary = Barycentric::from_uv(u, v);
        let uv = self.uv_at(bary);
        rec.t = t;
        rec.p = ray.at(t);
        rec.set_face_normal(ray, self.normal_at(bary));
        rec.u = uv.x;
        rec.v = uv.y;
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f64 {
        area_pdf_value(self, origin, direction, self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let mut r1 = gen_f64(rng);
        let mut r2 = gen_f64(rng);
        // Fold the far half of the parallelogram back onto the triangle
        if r1 + r2 > 1.0 {
            r1 = 1.0 - r1;
            r2 = 1.0 - r2;
        }
        self.vertices[0] + r1 * self.edge1 + r2 * self.edge2 - origin
    }
}
