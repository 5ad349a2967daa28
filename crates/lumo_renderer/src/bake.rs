//! Lightmap-space queries for baking.
//!
//! Every bakeable triangle carries a second set of coordinates placing it
//! in the unit lightmap atlas. A texel `(u, v)` is mapped back onto the
//! surface by finding the closest atlas triangle, allowing texels up to a
//! padding distance outside a triangle so seams do not bleed black.
//!
//! The atlas lives in 3D as the plane `y = 0`, with `u` on X and `v` on Z.
//! A query is a ray starting at `(u, 0, v)` pointing down -Y, and a
//! triangle reports the 2D distance to its closest point as the hit `t`.
//! The BVH's nearest-hit search then finds the closest triangle. The query
//! ray only crosses the thin y slab, so a subtree is skipped exactly when
//! `(u, v)` lies outside its padded x/z footprint.

use lumo_math::{Aabb, Interval, Ray, Vec2, Vec3};

use crate::bvh::Bvh;
use crate::hittable::{HitRecord, Hittable, BOX_PADDING};
use crate::triangle::{Barycentric, Triangle};

/// Padding used when a scene does not set one.
pub const DEFAULT_BAKE_PADDING: f64 = 0.1;

/// Atlas triangles with a smaller determinant cannot be inverted.
const DEGENERATE_DETERMINANT: f64 = 1e-15;

/// Vertex pairs of the three edges, in storage order.
const EDGE_VERTICES: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// A triangle's coordinates in the lightmap atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BakeUv {
    uvs: [Vec2; 3],
    /// `uv1 - uv0`, `uv2 - uv0`, `uv2 - uv1`
    edges: [Vec2; 3],
    directions: [Vec2; 3],
    determinant: f64,
}

impl BakeUv {
    pub fn new(uvs: [Vec2; 3]) -> Self {
        let edges = EDGE_VERTICES.map(|(i, j)| uvs[j] - uvs[i]);
        Self {
            uvs,
            edges,
            directions: edges.map(Vec2::normalize_or_zero),
            determinant: edges[0].perp_dot(edges[1]),
        }
    }

    pub fn uvs(&self) -> &[Vec2; 3] {
        &self.uvs
    }

    pub fn is_degenerate(&self) -> bool {
        self.determinant.abs() < DEGENERATE_DETERMINANT
    }

    /// Weights of `p`, which may be negative outside the triangle.
    pub fn barycentric(&self, p: Vec2) -> Option<Barycentric> {
        if self.is_degenerate() {
            return None;
        }
        let d = p - self.uvs[0];
        let w1 = d.perp_dot(self.edges[1]) / self.determinant;
        let w2 = self.edges[0].perp_dot(d) / self.determinant;
        Some(Barycentric {
            w0: 1.0 - w1 - w2,
            w1,
            w2,
        })
    }

    /// Weights and distance of the closest point on edge `index` to `p`.
    fn project_on_edge(&self, p: Vec2, index: usize) -> (Barycentric, f64) {
        let (i, j) = EDGE_VERTICES[index];
        let start = self.uvs[i];
        let length = self.edges[index].length();
        let along = self.directions[index].dot(p - start).clamp(0.0, length);
        let t = if length > 0.0 { along / length } else { 0.0 };

        let mut weights = [0.0; 3];
        weights[i] = 1.0 - t;
        weights[j] = t;
        let closest = start + self.directions[index] * along;

        let bary = Barycentric {
            w0: weights[0],
            w1: weights[1],
            w2: weights[2],
        };
        (bary, (p - closest).length())
    }

    /// Nearer of the projections onto two edges.
    fn nearer_edge(&self, p: Vec2, first: usize, second: usize) -> (Barycentric, f64) {
        let a = self.project_on_edge(p, first);
        let b = self.project_on_edge(p, second);
        if b.1 < a.1 {
            b
        } else {
            a
        }
    }

    /// Closest point of the triangle to `p`, with its 2D distance.
    ///
    /// Returns `None` for degenerate atlas triangles.
    pub fn closest(&self, p: Vec2) -> Option<(Barycentric, f64)> {
        let bary = self.barycentric(p)?;
        let closest = match (bary.w0 < 0.0, bary.w1 < 0.0, bary.w2 < 0.0) {
            (false, false, false) => (bary, 0.0),
            // Beyond one edge: the edge opposite the negative weight
            (true, false, false) => self.project_on_edge(p, 2),
            (false, true, false) => self.project_on_edge(p, 1),
            (false, false, true) => self.project_on_edge(p, 0),
            // Vertex region: one of the two edges meeting at the vertex
            (false, true, true) => self.nearer_edge(p, 0, 1),
            (true, false, true) => self.nearer_edge(p, 0, 2),
            (true, true, false) => self.nearer_edge(p, 1, 2),
            // Weights sum to one, so they cannot all be negative
            (true, true, true) => return None,
        };
        Some(closest)
    }
}

/// A bakeable triangle placed in the atlas plane.
#[derive(Clone)]
pub struct BakeTriangle {
    source: Triangle,
    bake: BakeUv,
    padding: f64,
    bbox: Aabb,
}

impl BakeTriangle {
    /// Wrap `source`, which must carry lightmap coordinates.
    pub fn new(source: Triangle, padding: f64) -> Option<Self> {
        let bake = *source.bake_uv()?;
        let padding = padding.max(0.0);

        let [a, b, c] = bake.uvs;
        let min = a.min(b).min(c) - Vec2::splat(padding);
        let max = a.max(b).max(c) + Vec2::splat(padding);
        let thickness = padding.max(BOX_PADDING);
        let bbox = Aabb::from_points(
            Vec3::new(min.x, -thickness, min.y),
            Vec3::new(max.x, thickness, max.y),
        );

        Some(Self {
            source,
            bake,
            padding,
            bbox,
        })
    }

    pub fn source(&self) -> &Triangle {
        &self.source
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }
}

impl Hittable for BakeTriangle {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let p = Vec2::new(ray.origin.x, ray.origin.z);
        let Some((bary, distance)) = self.bake.closest(p) else {
            return false;
        };
        if distance > self.padding || !ray_t.contains(distance) {
            return false;
        }

        let uv = self.source.uv_at(bary);
        rec.t = distance;
        rec.p = self.source.position_at(bary);
        rec.normal = self.source.normal_at(bary);
        rec.front_face = true;
        rec.u = uv.x;
        rec.v = uv.y;
        rec.material = self.source.material();
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// BVH over every bakeable triangle of a scene.
pub struct BakeAtlas {
    bvh: Bvh<BakeTriangle>,
}

impl BakeAtlas {
    pub fn new(triangles: Vec<BakeTriangle>) -> Self {
        Self {
            bvh: Bvh::new(triangles),
        }
    }

    pub fn len(&self) -> usize {
        self.bvh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bvh.is_empty()
    }

    /// Query ray for the atlas point `(u, v)`.
    pub fn probe(u: f64, v: f64) -> Ray {
        Ray::new(Vec3::new(u, 0.0, v), Vec3::NEG_Y)
    }

    /// Surface point for the texel position `(u, v)`, if any triangle's
    /// padded footprint covers it.
    pub fn query(&self, u: f64, v: f64) -> Option<HitRecord<'_>> {
        let mut rec = HitRecord::default();
        let hit = self
            .bvh
            .hit(&Self::probe(u, v), Interval::new(0.0, f64::INFINITY), &mut rec);
        hit.then_some(rec)
    }
}
