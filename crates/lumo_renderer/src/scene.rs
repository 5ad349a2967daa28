//! Scene builder.
//!
//! Collects primitives, lights, importance targets and bakeable triangles,
//! plus the image, camera and background settings a render needs. The
//! render and bake drivers build their BVHs from a finished scene.

use std::sync::Arc;

use lumo_core::{Color, PolygonMesh, SolidColor, Texture};
use lumo_math::Vec3;

use crate::bake::{BakeTriangle, DEFAULT_BAKE_PADDING};
use crate::camera::Camera;
use crate::cuboid::Cuboid;
use crate::hittable::HittableList;
use crate::light::Light;
use crate::material::Material;
use crate::primitive::Primitive;
use crate::rect::AxisRect;
use crate::sphere::Sphere;
use crate::triangle::Triangle;

/// Per-mesh switches for [`Scene::add_polygon_mesh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshOptions {
    /// Reject hits on back faces.
    pub culling: bool,
    /// Register every triangle as an importance target.
    pub attractor: bool,
    /// Add the triangles to the lightmap atlas.
    pub bake: bool,
}

/// Camera placement; the aspect ratio comes from the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraSettings {
    look_from: Vec3,
    look_at: Vec3,
    vfov: f64,
    aperture: f64,
}

pub struct Scene {
    objects: Vec<Primitive>,
    lights: Vec<Light>,
    targets: HittableList,
    bake_triangles: Vec<BakeTriangle>,
    background: Arc<dyn Texture>,
    image_width: u32,
    image_height: u32,
    camera: CameraSettings,
    bake_padding: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            targets: HittableList::new(),
            bake_triangles: Vec::new(),
            background: Arc::new(SolidColor::mono(0.0)),
            image_width: 256,
            image_height: 256,
            camera: CameraSettings {
                look_from: Vec3::ZERO,
                look_at: Vec3::NEG_Z,
                vfov: 90.0,
                aperture: 0.0,
            },
            bake_padding: DEFAULT_BAKE_PADDING,
        }
    }

    fn push(&mut self, primitive: Primitive, is_attractor: bool) {
        if is_attractor {
            self.targets.add(Box::new(primitive.clone()));
        }
        self.objects.push(primitive);
    }

    pub fn add_sphere(&mut self, center: Vec3, radius: f64, material: Arc<dyn Material>, is_attractor: bool) {
        self.push(Sphere::new(center, radius, material).into(), is_attractor);
    }

    /// Rectangle at `x = k` spanning `y` and `z`.
    pub fn add_x_plane(
        &mut self,
        y: (f64, f64),
        z: (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
        is_attractor: bool,
    ) {
        self.push(AxisRect::yz(y, z, k, material).into(), is_attractor);
    }

    /// Rectangle at `y = k` spanning `x` and `z`.
    pub fn add_y_plane(
        &mut self,
        x: (f64, f64),
        z: (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
        is_attractor: bool,
    ) {
        self.push(AxisRect::xz(x, z, k, material).into(), is_attractor);
    }

    /// Rectangle at `z = k` spanning `x` and `y`.
    pub fn add_z_plane(
        &mut self,
        x: (f64, f64),
        y: (f64, f64),
        k: f64,
        material: Arc<dyn Material>,
        is_attractor: bool,
    ) {
        self.push(AxisRect::xy(x, y, k, material).into(), is_attractor);
    }

    /// Register an already-built rectangle, e.g. a flipped one.
    pub fn add_rect(&mut self, rect: AxisRect, is_attractor: bool) {
        self.push(rect.into(), is_attractor);
    }

    pub fn add_cube(&mut self, min: Vec3, max: Vec3, material: Arc<dyn Material>, is_attractor: bool) {
        self.push(Cuboid::new(min, max, material).into(), is_attractor);
    }

    /// Add every triangle of `mesh`; returns how many were added.
    ///
    /// Baking needs the mesh's lightmap UV layer; without it the mesh is
    /// still rendered but left out of the atlas.
    pub fn add_polygon_mesh(
        &mut self,
        name: &str,
        mesh: &PolygonMesh,
        material: Arc<dyn Material>,
        options: MeshOptions,
    ) -> usize {
        let bake = options.bake && mesh.has_bake_uvs();
        if options.bake && !bake {
            log::warn!("Mesh {}: no usable bake uvs, excluding it from baking", name);
        }

        let triangles = mesh.triangles(name);
        for data in &triangles {
            let mut triangle = Triangle::new(data.positions, material.clone()).with_culling(options.culling);
            if let Some(normals) = data.normals {
                triangle = triangle.with_normals(normals);
            }
            if let Some(uvs) = data.uvs {
                triangle = triangle.with_uvs(uvs);
            }

            if let (true, Some(bake_uvs)) = (bake, data.bake_uvs) {
                triangle = triangle.with_bake_uvs(bake_uvs);
                if let Some(bake_triangle) = BakeTriangle::new(triangle.clone(), self.bake_padding) {
                    self.bake_triangles.push(bake_triangle);
                }
            }

            self.push(triangle.into(), options.attractor);
        }

        log::debug!(
            "Mesh {}: added {} triangles (bake: {})",
            name,
            triangles.len(),
            bake
        );
        triangles.len()
    }

    pub fn add_point_light(&mut self, color: Color, position: Vec3) {
        self.lights.push(Light::point(color, position));
    }

    pub fn add_directional_light(&mut self, color: Color, direction: Vec3) {
        self.lights.push(Light::directional(color, direction));
    }

    /// Texture looked up in spherical coordinates for rays that escape.
    pub fn set_background(&mut self, background: Arc<dyn Texture>) {
        self.background = background;
    }

    /// Image or lightmap resolution, at least 1x1.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
    }

    /// Focus lies on `look_at`; `vfov` is in degrees.
    pub fn set_camera(&mut self, look_from: Vec3, look_at: Vec3, vfov: f64, aperture: f64) {
        self.camera = CameraSettings {
            look_from,
            look_at,
            vfov,
            aperture,
        };
    }

    /// Atlas padding applied to meshes added after this call.
    pub fn set_bake_padding(&mut self, padding: f64) {
        self.bake_padding = padding.max(0.0);
    }

    pub fn objects(&self) -> &[Primitive] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn targets(&self) -> &HittableList {
        &self.targets
    }

    pub fn bake_triangles(&self) -> &[BakeTriangle] {
        &self.bake_triangles
    }

    pub fn background(&self) -> &dyn Texture {
        self.background.as_ref()
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    pub fn bake_padding(&self) -> f64 {
        self.bake_padding
    }

    /// Camera for the current settings and image aspect ratio.
    pub fn camera(&self) -> Camera {
        let aspect = self.image_width as f64 / self.image_height as f64;
        Camera::new(
            self.camera.look_from,
            self.camera.look_at,
            Vec3::Y,
            self.camera.vfov,
            aspect,
            self.camera.aperture,
        )
    }
}
