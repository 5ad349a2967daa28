//! Lumo Core - renderer-agnostic scene data.
//!
//! This crate provides:
//!
//! - **Textures**: constant, checker (3D and UV), Perlin noise, gradient,
//!   UV visualization and nearest-sample LDR/HDR images
//! - **Meshes**: triangle-soup ingestion with per-layer validation

pub mod mesh;
pub mod perlin;
pub mod texture;

// Re-export commonly used types
pub use mesh::{MeshError, PolygonMesh, TriangleData};
pub use perlin::Perlin;
pub use texture::{
    CheckerTexture, CheckerTexture2d, Color, GradientTexture, ImageTexture, ImageTextureHdr,
    NoiseTexture, NoiseTexture2d, SolidColor, Texture, TextureError, TextureResult, UvTexture,
};
