//! Polygon mesh ingestion.
//!
//! Meshes arrive as triangle soup: three vertices per triangle, with optional
//! per-vertex normals, UVs and a secondary "bake" UV layer. Optional layers
//! whose length does not match the vertex count are dropped with a warning
//! instead of failing the scene build.

use lumo_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors that reject a mesh outright.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("Vertex count {0} is not a multiple of 3")]
    NotTriangles(usize),

    #[error("Flat {layer} buffer of length {len} is not a multiple of {stride}")]
    FlatLength {
        layer: &'static str,
        len: usize,
        stride: usize,
    },
}

/// One triangle pulled out of a [`PolygonMesh`], with only the layers that
/// passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleData {
    pub positions: [Vec3; 3],
    pub normals: Option<[Vec3; 3]>,
    pub uvs: Option<[Vec2; 3]>,
    pub bake_uvs: Option<[Vec2; 3]>,
}

/// Triangle soup with optional attribute layers.
#[derive(Clone, Debug, Default)]
pub struct PolygonMesh {
    /// Vertex positions, every 3 form a triangle
    pub positions: Vec<Vec3>,
    /// Vertex normals (empty = flat shading)
    pub normals: Vec<Vec3>,
    /// Primary UVs (empty = all zero)
    pub uvs: Vec<Vec2>,
    /// Secondary UVs addressing the lightmap atlas
    pub bake_uvs: Vec<Vec2>,
}

impl PolygonMesh {
    pub fn new(positions: Vec<Vec3>) -> Result<Self, MeshError> {
        if positions.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(positions.len()));
        }
        Ok(Self {
            positions,
            ..Default::default()
        })
    }

    /// Build from flat `x, y, z` floats, nine per triangle.
    pub fn from_flat(positions: &[f64]) -> Result<Self, MeshError> {
        if positions.len() % 9 != 0 {
            return Err(MeshError::FlatLength {
                layer: "position",
                len: positions.len(),
                stride: 9,
            });
        }
        Self::new(unflatten3(positions))
    }

    /// Attach flat `x, y, z` normals.
    pub fn with_flat_normals(self, normals: &[f64]) -> Result<Self, MeshError> {
        if normals.len() % 3 != 0 {
            return Err(MeshError::FlatLength {
                layer: "normal",
                len: normals.len(),
                stride: 3,
            });
        }
        Ok(self.with_normals(unflatten3(normals)))
    }

    /// Attach flat `u, v` pairs as the primary UV layer.
    pub fn with_flat_uvs(self, uvs: &[f64]) -> Result<Self, MeshError> {
        Ok(self.with_uvs(unflatten2("uv", uvs)?))
    }

    /// Attach flat `u, v` pairs as the lightmap UV layer.
    pub fn with_flat_bake_uvs(self, uvs: &[f64]) -> Result<Self, MeshError> {
        Ok(self.with_bake_uvs(unflatten2("bake uv", uvs)?))
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_bake_uvs(mut self, bake_uvs: Vec<Vec2>) -> Self {
        self.bake_uvs = bake_uvs;
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        self.layer_usable(self.normals.len())
    }

    pub fn has_uvs(&self) -> bool {
        self.layer_usable(self.uvs.len())
    }

    pub fn has_bake_uvs(&self) -> bool {
        self.layer_usable(self.bake_uvs.len())
    }

    fn layer_usable(&self, len: usize) -> bool {
        len != 0 && len == self.positions.len()
    }

    /// Split into per-triangle records, dropping mismatched layers.
    ///
    /// `name` only labels the log output.
    pub fn triangles(&self, name: &str) -> Vec<TriangleData> {
        let use_normals = self.check_layer(name, "normals", self.normals.len());
        let use_uvs = self.check_layer(name, "uvs", self.uvs.len());
        let use_bake_uvs = self.check_layer(name, "bake uvs", self.bake_uvs.len());

        (0..self.triangle_count())
            .map(|i| {
                let range = 3 * i..3 * i + 3;
                TriangleData {
                    positions: to_array(&self.positions[range.clone()]),
                    normals: use_normals.then(|| to_array(&self.normals[range.clone()])),
                    uvs: use_uvs.then(|| to_array(&self.uvs[range.clone()])),
                    bake_uvs: use_bake_uvs.then(|| to_array(&self.bake_uvs[range])),
                }
            })
            .collect()
    }

    fn check_layer(&self, name: &str, layer: &str, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        if len != self.positions.len() {
            log::warn!(
                "Mesh {}: {} length ({}) doesn't match vertex count ({}), ignoring layer",
                name,
                layer,
                len,
                self.positions.len()
            );
            return false;
        }
        true
    }
}

fn unflatten3(values: &[f64]) -> Vec<Vec3> {
    values
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect()
}

fn unflatten2(layer: &'static str, values: &[f64]) -> Result<Vec<Vec2>, MeshError> {
    if values.len() % 2 != 0 {
        return Err(MeshError::FlatLength {
            layer,
            len: values.len(),
            stride: 2,
        });
    }
    Ok(values.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect())
}

fn to_array<T: Copy>(slice: &[T]) -> [T; 3] {
    [slice[0], slice[1], slice[2]]
}
