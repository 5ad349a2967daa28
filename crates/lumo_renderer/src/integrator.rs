//! Recursive Monte Carlo path integrator.
//!
//! Direct light from analytic lights is gathered with explicit shadow rays
//! at every scattering hit. Indirect light follows one sampled direction per
//! branch, drawn from a 50/50 mixture of the material's density and a
//! density aimed at the registered importance targets.

use lumo_core::{Color, Texture};
use lumo_math::{unit_vector, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::light::Light;
use crate::material::ScatterRecord;
use crate::pdf::Pdf;
use crate::sphere::Sphere;

/// Offset that keeps secondary rays from re-hitting their origin surface.
pub const T_MIN: f64 = 0.001;

/// Branches weighted below this are skipped.
const BRANCH_THRESHOLD: f64 = 1e-6;

/// Read-only view of everything a path needs.
#[derive(Clone, Copy)]
pub struct Integrator<'s> {
    world: &'s dyn Hittable,
    lights: &'s [Light],
    targets: &'s HittableList,
    background: &'s dyn Texture,
}

impl<'s> Integrator<'s> {
    pub fn new(
        world: &'s dyn Hittable,
        lights: &'s [Light],
        targets: &'s HittableList,
        background: &'s dyn Texture,
    ) -> Self {
        Self {
            world,
            lights,
            targets,
            background,
        }
    }

    /// Radiance arriving along `ray`, following at most `depth` segments.
    pub fn ray_color(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        if depth == 0 {
            return Color::ZERO;
        }

        let mut rec = HitRecord::default();
        if !self.world.hit(ray, Interval::new(T_MIN, f64::INFINITY), &mut rec) {
            return self.background_color(ray.direction());
        }

        self.shade(&rec, ray, depth, rng)
    }

    /// Background seen along `direction`, looked up in spherical coordinates.
    pub fn background_color(&self, direction: Vec3) -> Color {
        let (u, v) = Sphere::uv(unit_vector(direction));
        self.background.value(u, v, Vec3::ZERO)
    }

    /// Outgoing radiance at a hit: the coefficient-weighted sum of every
    /// branch of its material.
    pub fn shade(&self, rec: &HitRecord, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        self.shade_first_hit(rec, ray, depth, false, rng)
    }

    /// Like [`Integrator::shade`], optionally without the shadow-ray term at
    /// this hit. Deeper bounces always gather direct light, so light that
    /// reaches the hit off other surfaces is kept.
    pub fn shade_first_hit(
        &self,
        rec: &HitRecord,
        ray: &Ray,
        depth: u32,
        ignore_direct: bool,
        rng: &mut dyn RngCore,
    ) -> Color {
        let material = rec.material;
        let mut color = Color::ZERO;

        for branch in 0..material.branch_count() {
            let coefficient = material.branch_coefficient(rec.u, rec.v, rec.p, branch);
            if coefficient <= BRANCH_THRESHOLD {
                continue;
            }
            color += coefficient * self.shade_branch(rec, ray, branch, depth, ignore_direct, rng);
        }

        color
    }

    fn shade_branch(
        &self,
        rec: &HitRecord,
        ray: &Ray,
        branch: usize,
        depth: u32,
        ignore_direct: bool,
        rng: &mut dyn RngCore,
    ) -> Color {
        let material = rec.material;
        let emitted = material.emitted(rec, branch);

        let Some(srec) = material.scatter(ray, rec, branch, rng) else {
            return emitted;
        };

        let direct = if ignore_direct {
            Color::ZERO
        } else {
            srec.attenuation() * self.direct_lighting(rec)
        };

        let next_depth = depth.saturating_sub(1);
        let indirect = match srec {
            ScatterRecord::Specular { ray: specular, attenuation } => {
                attenuation * self.ray_color(&specular, next_depth, rng)
            }
            ScatterRecord::Diffuse { pdf, attenuation } => {
                let pdf = if self.targets.is_empty() {
                    pdf
                } else {
                    Pdf::mixture(Pdf::toward(self.targets, rec.p), pdf)
                };

                let scattered = Ray::new(rec.p, pdf.generate(rng));
                let density = pdf.value(scattered.direction());
                let scattering_pdf = material.scattering_pdf(ray, rec, &scattered, branch);

                if density <= 0.0 || scattering_pdf <= 0.0 {
                    Color::ZERO
                } else {
                    attenuation * scattering_pdf * self.ray_color(&scattered, next_depth, rng)
                        / density
                }
            }
        };

        emitted + direct + indirect
    }

    /// Sum of the analytic lights visible from the hit.
    pub fn direct_lighting(&self, rec: &HitRecord) -> Color {
        self.lights
            .iter()
            .filter(|light| self.is_visible(light, rec.p))
            .map(|light| light.attenuation(rec.normal, rec.p) * light.color())
            .sum()
    }

    fn is_visible(&self, light: &Light, p: Vec3) -> bool {
        let shadow_ray = Ray::new(p, light.to_light(p));
        let mut shadow_rec = HitRecord::default();
        !self.world.hit(
            &shadow_ray,
            Interval::new(T_MIN, light.distance(p)),
            &mut shadow_rec,
        )
    }
}
