//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over a flat list of primitives. Each split partitions a
//! node's primitives about the mean of their box centroids, on whichever
//! axis gives the most even split. Leaves hold exactly one primitive.

use lumo_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};

/// BVH node - either a branch with two children or a leaf with one primitive.
#[derive(Debug, Clone)]
enum BvhNode {
    /// Internal node with two non-empty children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Index into the owning [`Bvh`]'s primitive list.
    Leaf { index: usize, bbox: Aabb },
    /// No primitives at all.
    Empty,
}

impl BvhNode {
    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// BVH owning its primitives.
#[derive(Debug, Clone)]
pub struct Bvh<T> {
    objects: Vec<T>,
    root: BvhNode,
}

impl<T: Hittable> Bvh<T> {
    /// Build a hierarchy over `objects`. Never fails; an empty list gives
    /// a BVH that is never hit.
    pub fn new(objects: Vec<T>) -> Self {
        let boxes: Vec<Aabb> = objects.iter().map(Hittable::bounding_box).collect();
        let indices: Vec<usize> = (0..objects.len()).collect();
        let root = build(indices, &boxes);

        log::debug!(
            "Built BVH over {} primitives, depth {}",
            objects.len(),
            root.depth()
        );

        Self { objects, root }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[T] {
        &self.objects
    }

    /// Longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    fn hit_node<'a>(
        &'a self,
        node: &'a BvhNode,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        match node {
            BvhNode::Empty => false,

            BvhNode::Leaf { index, bbox } => {
                bbox.hit(ray, ray_t) && self.objects[*index].hit(ray, ray_t, rec)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return false;
                }

                let hit_left = self.hit_node(left, ray, ray_t, rec);

                // Only check right up to closest hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = self.hit_node(right, ray, ray_t.with_max(right_max), rec);

                hit_left || hit_right
            }
        }
    }
}

fn centroid_mean(indices: &[usize], boxes: &[Aabb]) -> Vec3 {
    let sum: Vec3 = indices.iter().map(|&i| boxes[i].centroid()).sum();
    sum / indices.len() as f64
}

/// Recursive construction over primitive `indices`.
fn build(indices: Vec<usize>, boxes: &[Aabb]) -> BvhNode {
    match indices.len() {
        0 => return BvhNode::Empty,
        1 => {
            let index = indices[0];
            return BvhNode::Leaf {
                index,
                bbox: boxes[index],
            };
        }
        _ => {}
    }

    let mean = centroid_mean(&indices, boxes);

    // Candidate partition per axis; keep the most balanced, X first on ties
    let mut best: Option<(Vec<usize>, Vec<usize>)> = None;
    for axis in 0..3 {
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| boxes[i].centroid()[axis] < mean[axis]);

        let imbalance = left.len().abs_diff(right.len());
        let better = match &best {
            Some((l, r)) => imbalance < l.len().abs_diff(r.len()),
            None => true,
        };
        if better {
            best = Some((left, right));
        }
    }
    let (mut left, mut right) = best.unwrap_or_default();

    // Identical centroids put everything on one side; move one across
    if left.is_empty() {
        left.extend(right.pop());
    } else if right.is_empty() {
        right.extend(left.pop());
    }

    let left = build(left, boxes);
    let right = build(right, boxes);
    let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());

    BvhNode::Branch {
        left: Box::new(left),
        right: Box::new(right),
        bbox,
    }
}

impl<T: Hittable> Hittable for Bvh<T> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        self.hit_node(&self.root, ray, ray_t, rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.root.bbox()
    }
}
