//! Lumo Renderer - CPU path tracing and lightmap baking.
//!
//! A Monte Carlo path tracer over a BVH of spheres, rectangles, boxes and
//! triangles. Direct light comes from explicit shadow rays toward analytic
//! lights; indirect light is importance-sampled toward registered target
//! surfaces. The same integrator can shade a mesh's lightmap atlas instead
//! of camera pixels.

mod bake;
mod bvh;
mod camera;
mod config;
mod cuboid;
mod hittable;
mod integrator;
mod light;
mod material;
mod pdf;
mod primitive;
pub mod random;
mod rect;
mod renderer;
mod scene;
mod sphere;
mod triangle;

pub use bake::{BakeAtlas, BakeTriangle, BakeUv, DEFAULT_BAKE_PADDING};
pub use bvh::Bvh;
pub use camera::Camera;
pub use config::{ConfigError, RenderConfig};
pub use cuboid::Cuboid;
pub use hittable::{area_pdf_value, HitRecord, Hittable, HittableList};
pub use integrator::{Integrator, T_MIN};
pub use light::Light;
pub use material::{
    reflect, refract, Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterRecord,
    SimpleCombined,
};
pub use pdf::Pdf;
pub use primitive::Primitive;
pub use rect::{AxisRect, RectPlane};
pub use renderer::{bake, bake_texel, render, render_pixel, ImageBuffer, NoopObserver, RenderObserver};
pub use scene::{MeshOptions, Scene};
pub use sphere::Sphere;
pub use triangle::{Barycentric, Triangle};

/// Re-export common math and scene-data types
pub use lumo_core::{Color, Texture};
pub use lumo_math::{Aabb, Interval, Ray, Vec2, Vec3};
