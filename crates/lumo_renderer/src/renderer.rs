//! Render and bake drivers.
//!
//! Both drivers walk the output from the top row down, average
//! `samples_per_pixel` jittered samples per pixel and report progress
//! through a [`RenderObserver`]. Each pixel draws from its own seeded
//! generator, so a row can be evaluated on the rayon pool without changing
//! the result.

use std::time::Instant;

use image::RgbImage;
use lumo_core::Color;
use lumo_math::color::linear_to_srgb_color;
use lumo_math::Ray;
use rand::RngCore;
use rayon::prelude::*;

use crate::bake::BakeAtlas;
use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::integrator::Integrator;
use crate::random::{gen_f64, pixel_rng};
use crate::scene::Scene;

/// Progress callbacks, invoked in order on the calling thread.
///
/// Every method defaults to doing nothing.
pub trait RenderObserver {
    fn start_prepare(&mut self) {}
    fn finish_prepare(&mut self) {}
    fn start_render(&mut self) {}
    /// One finished row of linear RGB triples; row 0 is the top of the image.
    fn scanline(&mut self, _row: usize, _rgb: &[f64]) {}
    fn finish_render(&mut self) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RenderObserver for NoopObserver {}

/// Linear RGB image, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y), y counted from the top.
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// All channels as one flat `r, g, b, r, g, b, ...` slice.
    pub fn as_flat(&self) -> &[f64] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy with every pixel sRGB-encoded.
    pub fn to_srgb(&self) -> ImageBuffer {
        ImageBuffer {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&c| linear_to_srgb_color(c)).collect(),
        }
    }

    /// Quantize to 8 bits per channel without any transfer curve.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.as_flat().iter().map(|&v| to_byte(v)).collect()
    }

    /// sRGB-encoded 8-bit image, ready to be written by the caller.
    pub fn to_image(&self) -> RgbImage {
        let bytes = self.to_srgb().to_rgb8();
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let i = 3 * self.index(x, y);
            image::Rgb([bytes[i], bytes[i + 1], bytes[i + 2]])
        })
    }
}

/// `[0, 1)` to `0..=255`, saturating outside.
#[inline]
fn to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 0.99) * 256.0) as u8
}

/// Average of `samples` camera rays through pixel `(i, j)`, j counted from
/// the bottom.
#[allow(clippy::too_many_arguments)]
pub fn render_pixel(
    camera: &Camera,
    integrator: &Integrator,
    i: u32,
    j: u32,
    width: u32,
    height: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let s_scale = 1.0 / width.saturating_sub(1).max(1) as f64;
    let t_scale = 1.0 / height.saturating_sub(1).max(1) as f64;
    let mut pixel_color = Color::ZERO;

    for _ in 0..samples {
        let s = (i as f64 + gen_f64(rng)) * s_scale;
        let t = (j as f64 + gen_f64(rng)) * t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += integrator.ray_color(&ray, config.max_depth(), rng);
    }

    pixel_color / samples as f64
}

/// Average of `samples` atlas queries inside texel `(i, j)`, j counted from
/// the bottom. Samples landing outside every triangle's padding count as
/// black.
#[allow(clippy::too_many_arguments)]
pub fn bake_texel(
    atlas: &BakeAtlas,
    integrator: &Integrator,
    i: u32,
    j: u32,
    width: u32,
    height: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.samples_per_pixel.max(1);
    let mut texel_color = Color::ZERO;

    for _ in 0..samples {
        let u = (i as f64 + gen_f64(rng)) / width as f64;
        let v = (j as f64 + gen_f64(rng)) / height as f64;
        if let Some(rec) = atlas.query(u, v) {
            // Viewed head-on from just above the surface
            let incoming = Ray::new(rec.p + rec.normal, -rec.normal);
            texel_color += integrator.shade_first_hit(
                &rec,
                &incoming,
                config.max_depth(),
                config.ignore_direct,
                rng,
            );
        }
    }

    texel_color / samples as f64
}

/// Evaluate one row, in parallel when configured.
fn trace_row<F>(width: u32, j: u32, config: &RenderConfig, pixel: F) -> Vec<Color>
where
    F: Fn(u32, &mut dyn RngCore) -> Color + Sync,
{
    let eval = |i: u32| {
        let mut rng = pixel_rng(config.seed, j, i);
        pixel(i, &mut rng)
    };
    if config.parallel {
        (0..width).into_par_iter().map(eval).collect()
    } else {
        (0..width).map(eval).collect()
    }
}

/// Path trace the scene through its camera.
pub fn render(scene: &Scene, config: &RenderConfig, observer: &mut dyn RenderObserver) -> ImageBuffer {
    let (width, height) = scene.image_size();
    log::info!(
        "Rendering {}x{} at {} spp, {} bounces",
        width,
        height,
        config.samples_per_pixel,
        config.bounces
    );

    observer.start_prepare();
    let prepare_start = Instant::now();
    let world = Bvh::new(scene.objects().to_vec());
    let camera = scene.camera();
    log::info!(
        "World BVH: {} primitives, depth {}, built in {:.2?}",
        world.len(),
        world.depth(),
        prepare_start.elapsed()
    );
    observer.finish_prepare();

    let integrator = Integrator::new(&world, scene.lights(), scene.targets(), scene.background());

    observer.start_render();
    let render_start = Instant::now();
    let mut image = ImageBuffer::new(width, height);

    for (row, j) in (0..height).rev().enumerate() {
        let colors = trace_row(width, j, config, |i, rng| {
            render_pixel(&camera, &integrator, i, j, width, height, config, rng)
        });
        observer.scanline(row, bytemuck::cast_slice(&colors));
        for (i, color) in colors.into_iter().enumerate() {
            image.set(i as u32, row as u32, color);
        }
    }

    log::info!("Render finished in {:.2?}", render_start.elapsed());
    observer.finish_render();
    image
}

/// Bake the scene's lighting into its lightmap atlas.
///
/// The output has the scene's image size; texel `(i, j)` covers atlas
/// coordinates `[i/w, (i+1)/w) x [j/h, (j+1)/h)`, stored top row first.
pub fn bake(scene: &Scene, config: &RenderConfig, observer: &mut dyn RenderObserver) -> ImageBuffer {
    let (width, height) = scene.image_size();
    log::info!(
        "Baking {}x{} lightmap at {} spp, {} bounces",
        width,
        height,
        config.samples_per_pixel,
        config.bounces
    );

    observer.start_prepare();
    let prepare_start = Instant::now();
    let atlas = BakeAtlas::new(scene.bake_triangles().to_vec());
    let world = Bvh::new(scene.objects().to_vec());
    if atlas.is_empty() {
        log::warn!("Scene has no bakeable triangles, the lightmap will be black");
    }
    log::info!(
        "Atlas: {} triangles, world: {} primitives, built in {:.2?}",
        atlas.len(),
        world.len(),
        prepare_start.elapsed()
    );
    observer.finish_prepare();

    let integrator = Integrator::new(&world, scene.lights(), scene.targets(), scene.background());

    observer.start_render();
    let bake_start = Instant::now();
    let mut image = ImageBuffer::new(width, height);

    for (row, j) in (0..height).rev().enumerate() {
        let colors = trace_row(width, j, config, |i, rng| {
            bake_texel(&atlas, &integrator, i, j, width, height, config, rng)
        });
        for (i, color) in colors.into_iter().enumerate() {
            image.set(i as u32, row as u32, color);
        }
    }

    log::info!("Bake finished in {:.2?}", bake_start.elapsed());
    observer.finish_render();
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{DiffuseLight, Lambertian, Material};
    use crate::scene::MeshOptions;
    use lumo_core::{PolygonMesh, SolidColor};
    use lumo_math::{Vec2, Vec3};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        rows: Vec<usize>,
    }

    impl RenderObserver for Recorder {
        fn start_prepare(&mut self) {
            self.events.push("start_prepare".into());
        }
        fn finish_prepare(&mut self) {
            self.events.push("finish_prepare".into());
        }
        fn start_render(&mut self) {
            self.events.push("start_render".into());
        }
        fn scanline(&mut self, row: usize, rgb: &[f64]) {
            assert_eq!(rgb.len() % 3, 0);
            self.rows.push(row);
        }
        fn finish_render(&mut self) {
            self.events.push("finish_render".into());
        }
    }

    fn small_config(parallel: bool) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: 2,
            bounces: 1,
            seed: 7,
            ignore_direct: false,
            parallel,
        }
    }

    fn lit_scene() -> Scene {
        let mut scene = Scene::new();
        scene.set_image_size(6, 4);
        scene.set_camera(Vec3::new(0.0, 1.0, 3.0), Vec3::ZERO, 60.0, 0.0);
        scene.set_background(Arc::new(SolidColor::mono(0.1)));
        let floor: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::splat(0.7)));
        scene.add_y_plane((-5.0, 5.0), (-5.0, 5.0), 0.0, floor, false);
        scene.add_sphere(Vec3::new(0.0, 0.5, 0.0), 0.5, Arc::new(Lambertian::from_color(Vec3::ONE)), false);
        scene.add_directional_light(Vec3::ONE, Vec3::new(-0.3, -1.0, -0.2));
        scene
    }

    /// Quad in the xz plane facing +Y, atlas covering the whole unit square.
    fn atlas_quad() -> PolygonMesh {
        PolygonMesh::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
        ])
        .unwrap()
        .with_bake_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
        ])
    }

    fn bake_options() -> MeshOptions {
        MeshOptions {
            bake: true,
            ..MeshOptions::default()
        }
    }

    #[test]
    fn test_render_observer_sequence() {
        let scene = lit_scene();
        let mut recorder = Recorder::default();
        let image = render(&scene, &small_config(false), &mut recorder);

        assert_eq!(
            recorder.events,
            vec!["start_prepare", "finish_prepare", "start_render", "finish_render"]
        );
        assert_eq!(recorder.rows, vec![0, 1, 2, 3]);
        assert_eq!(image.pixels.len(), 24);
        assert!(image.pixels.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let scene = lit_scene();
        let serial = render(&scene, &small_config(false), &mut NoopObserver);
        let parallel = render(&scene, &small_config(true), &mut NoopObserver);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_empty_scene_shows_background() {
        let mut scene = Scene::new();
        scene.set_image_size(3, 2);
        scene.set_background(Arc::new(SolidColor::rgb(0.2, 0.4, 0.6)));
        let image = render(&scene, &small_config(false), &mut NoopObserver);
        for c in &image.pixels {
            assert!((*c - Vec3::new(0.2, 0.4, 0.6)).length() < 1e-12);
        }
    }

    #[test]
    fn test_bake_emissive_quad_fills_atlas() {
        let mut scene = Scene::new();
        scene.set_image_size(4, 4);
        let glow: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Vec3::splat(2.0)));
        scene.add_polygon_mesh("glow", &atlas_quad(), glow, bake_options());

        let mut recorder = Recorder::default();
        let image = bake(&scene, &small_config(true), &mut recorder);
        assert!(recorder.rows.is_empty());
        for c in &image.pixels {
            assert!((*c - Vec3::splat(2.0)).length() < 1e-12);
        }
    }

    #[test]
    fn test_bake_indirect_only_keeps_bounced_point_light() {
        let mut scene = Scene::new();
        scene.set_image_size(2, 2);
        let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::ONE));
        scene.add_polygon_mesh("floor", &atlas_quad(), white.clone(), bake_options());
        scene.add_y_plane((-50.0, 50.0), (-50.0, 50.0), 1.0, white, false);
        scene.add_point_light(Vec3::ONE, Vec3::new(0.5, 0.5, 0.5));

        let config = RenderConfig {
            samples_per_pixel: 16,
            ..small_config(false)
        };
        let full = bake(&scene, &config, &mut NoopObserver);
        let indirect = bake(
            &scene,
            &RenderConfig {
                ignore_direct: true,
                ..config
            },
            &mut NoopObserver,
        );

        let mean = |image: &ImageBuffer| image.pixels.iter().map(|c| c.x).sum::<f64>() / 4.0;
        assert!(mean(&indirect) > 0.0);
        assert!(mean(&indirect) < mean(&full));
    }

    #[test]
    fn test_bake_without_atlas_is_black() {
        let mut scene = lit_scene();
        scene.set_image_size(2, 2);
        let image = bake(&scene, &small_config(false), &mut NoopObserver);
        assert!(image.pixels.iter().all(|c| *c == Vec3::ZERO));
    }

    #[test]
    fn test_byte_conversion() {
        let mut image = ImageBuffer::new(2, 1);
        image.set(0, 0, Vec3::new(0.0, 0.5, 1.0));
        image.set(1, 0, Vec3::new(-1.0, 2.0, 0.25));
        assert_eq!(image.as_flat().len(), 6);
        assert_eq!(image.to_rgb8(), vec![0, 128, 253, 0, 253, 64]);

        let png = image.to_image();
        assert_eq!(png.dimensions(), (2, 1));
        assert_eq!(png.get_pixel(0, 0)[2], 253);
    }
}
