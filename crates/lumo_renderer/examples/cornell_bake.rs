//! Render a small Cornell box and bake its floor lightmap.
//!
//! Usage: `cargo run --release --example cornell_bake [config.json]`
//!
//! Writes `cornell.png` and `cornell_floor_lightmap.png` to the working
//! directory.

use std::sync::Arc;

use anyhow::Context;
use lumo_core::{CheckerTexture2d, GradientTexture, PolygonMesh, SolidColor, Texture};
use lumo_renderer::{
    bake, render, AxisRect, Dielectric, DiffuseLight, Lambertian, Material, MeshOptions, Metal,
    RenderConfig, RenderObserver, Scene, Vec3,
};

/// Logs progress every tenth of the image.
struct ProgressLog {
    rows: usize,
    done: usize,
}

impl RenderObserver for ProgressLog {
    fn finish_prepare(&mut self) {
        log::info!("Scene prepared");
    }

    fn scanline(&mut self, _row: usize, _rgb: &[f64]) {
        self.done += 1;
        let step = (self.rows / 10).max(1);
        if self.done % step == 0 {
            log::info!("{}% ({} / {} rows)", 100 * self.done / self.rows, self.done, self.rows);
        }
    }
}

fn solid(r: f64, g: f64, b: f64) -> Arc<dyn Texture> {
    Arc::new(SolidColor::rgb(r, g, b))
}

fn floor_mesh() -> anyhow::Result<PolygonMesh> {
    // Two triangles covering y = 0, the atlas spanning the unit square
    let positions = [
        0.0, 0.0, 0.0, 0.0, 0.0, 555.0, 555.0, 0.0, 0.0, //
        555.0, 0.0, 0.0, 0.0, 0.0, 555.0, 555.0, 0.0, 555.0,
    ];
    let uvs = [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
    let mesh = PolygonMesh::from_flat(&positions)?
        .with_flat_uvs(&uvs)?
        .with_flat_bake_uvs(&uvs)?;
    Ok(mesh)
}

fn build_scene() -> anyhow::Result<Scene> {
    let mut scene = Scene::new();
    scene.set_camera(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), 40.0, 0.0);
    scene.set_background(Arc::new(GradientTexture::new(solid(0.0, 0.0, 0.0), solid(0.05, 0.05, 0.08))));

    let red: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::new(0.12, 0.45, 0.15)));
    let checker: Arc<dyn Material> = Arc::new(Lambertian::new(Arc::new(CheckerTexture2d::new(
        solid(0.8, 0.8, 0.8),
        solid(0.2, 0.2, 0.2),
        8.0,
        8.0,
    ))));
    let lamp: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Vec3::splat(15.0)));

    scene.add_x_plane((0.0, 555.0), (0.0, 555.0), 555.0, green, false);
    scene.add_x_plane((0.0, 555.0), (0.0, 555.0), 0.0, red, false);
    scene.add_y_plane((0.0, 555.0), (0.0, 555.0), 555.0, white.clone(), false);
    scene.add_z_plane((0.0, 555.0), (0.0, 555.0), 555.0, white.clone(), false);
    // Ceiling lamp facing down
    scene.add_rect(AxisRect::xz((213.0, 343.0), (227.0, 332.0), 554.0, lamp).flipped(), true);

    scene.add_cube(Vec3::new(265.0, 0.0, 295.0), Vec3::new(430.0, 330.0, 460.0), white, false);
    scene.add_sphere(Vec3::new(190.0, 90.0, 190.0), 90.0, Arc::new(Dielectric::new(1.5)), true);
    scene.add_sphere(
        Vec3::new(400.0, 420.0, 150.0),
        60.0,
        Arc::new(Metal::from_color(Vec3::new(0.8, 0.85, 0.88), 0.05)),
        false,
    );

    scene.add_point_light(Vec3::splat(20_000.0), Vec3::new(278.0, 500.0, 278.0));

    let options = MeshOptions {
        bake: true,
        ..MeshOptions::default()
    };
    scene.add_polygon_mesh("floor", &floor_mesh()?, checker, options);

    Ok(scene)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            RenderConfig::from_json_str(&json)?
        }
        None => RenderConfig::default(),
    };

    let mut scene = build_scene()?;
    scene.set_image_size(300, 300);

    let mut progress = ProgressLog { rows: 300, done: 0 };
    let image = render(&scene, &config, &mut progress);
    image.to_image().save("cornell.png").context("writing cornell.png")?;
    log::info!("Saved cornell.png");

    scene.set_image_size(128, 128);
    let lightmap = bake(&scene, &config, &mut progress);
    lightmap
        .to_image()
        .save("cornell_floor_lightmap.png")
        .context("writing cornell_floor_lightmap.png")?;
    log::info!("Saved cornell_floor_lightmap.png");

    Ok(())
}
