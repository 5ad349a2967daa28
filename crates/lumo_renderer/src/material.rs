//! Material trait for surface scattering.
//!
//! A material exposes one or more weighted branches. Simple materials have
//! a single branch with coefficient 1; [`SimpleCombined`] splits a surface
//! into diffuse, metallic and emissive parts driven by mask textures. The
//! integrator evaluates each branch independently and blends the results
//! by coefficient.

use std::sync::Arc;

use lumo_core::{Color, SolidColor, Texture};
use lumo_math::{average, unit_vector, Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::pdf::Pdf;
use crate::random::{gen_f64, random_in_hemisphere};

/// How a scattered path continues.
pub enum ScatterRecord {
    /// Deterministic continuation; no density weighting.
    Specular { ray: Ray, attenuation: Color },
    /// Stochastic continuation sampled from `pdf`.
    Diffuse {
        pdf: Pdf<'static>,
        attenuation: Color,
    },
}

impl ScatterRecord {
    pub fn attenuation(&self) -> Color {
        match self {
            ScatterRecord::Specular { attenuation, .. }
            | ScatterRecord::Diffuse { attenuation, .. } => *attenuation,
        }
    }

    pub fn is_specular(&self) -> bool {
        matches!(self, ScatterRecord::Specular { .. })
    }
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    fn branch_count(&self) -> usize {
        1
    }

    /// Weight of `branch` at a surface point, in `[0, 1]`.
    fn branch_coefficient(&self, _u: f64, _v: f64, _p: Vec3, _branch: usize) -> f64 {
        1.0
    }

    /// Scatter an incoming ray, or `None` if the branch absorbs it.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        branch: usize,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord>;

    /// Density the material itself assigns to `scattered`.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray, _branch: usize) -> f64 {
        0.0
    }

    /// Radiance emitted at the hit. Most materials return black.
    fn emitted(&self, _rec: &HitRecord, _branch: usize) -> Color {
        Color::ZERO
    }
}

fn solid(color: Color) -> Arc<dyn Texture> {
    Arc::new(SolidColor::new(color))
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(solid(albedo))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _branch: usize,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord::Diffuse {
            pdf: Pdf::cosine(rec.normal),
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray, _branch: usize) -> f64 {
        let cosine = rec.normal.dot(unit_vector(scattered.direction()));
        cosine.max(0.0) / std::f64::consts::PI
    }
}

/// Metal (specular) material.
///
/// Fuzz is sampled per hit and averaged to a scalar; 0 is a perfect mirror.
#[derive(Clone)]
pub struct Metal {
    albedo: Arc<dyn Texture>,
    fuzz: Arc<dyn Texture>,
}

impl Metal {
    pub fn new(albedo: Arc<dyn Texture>, fuzz: Arc<dyn Texture>) -> Self {
        Self { albedo, fuzz }
    }

    pub fn from_color(albedo: Color, fuzz: f64) -> Self {
        Self::new(solid(albedo), solid(Color::splat(fuzz)))
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        _branch: usize,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let reflected = reflect(unit_vector(ray_in.direction()), rec.normal);
        let fuzz = average(self.fuzz.value(rec.u, rec.v, rec.p));
        let direction = reflected + fuzz * random_in_hemisphere(rec.normal, rng);

        Some(ScatterRecord::Specular {
            ray: Ray::new(rec.p, direction),
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy)]
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, ior: f64) -> f64 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        _branch: usize,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = unit_vector(ray_in.direction());
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f64(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterRecord::Specular {
            ray: Ray::new(rec.p, direction),
            attenuation: Color::ONE,
        })
    }
}

/// Diffuse light emitter. Emits from its front face only.
#[derive(Clone)]
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    pub fn from_color(emit: Color) -> Self {
        Self::new(solid(emit))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _branch: usize,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }

    fn emitted(&self, rec: &HitRecord, _branch: usize) -> Color {
        if rec.front_face {
            self.emit.value(rec.u, rec.v, rec.p)
        } else {
            Color::ZERO
        }
    }
}

/// Diffuse, metallic and emissive parts of one surface, weighted by masks.
///
/// With `e = avg(emission_mask)` and `m = avg(metal_mask)`, both clamped to
/// `[0, 1]`, the branch weights are `(1 - e)(1 - m)`, `m(1 - e)` and `e`.
pub struct SimpleCombined {
    diffuse: Lambertian,
    metal: Metal,
    emissive: DiffuseLight,
    emission_mask: Arc<dyn Texture>,
    metal_mask: Arc<dyn Texture>,
}

impl SimpleCombined {
    pub const DIFFUSE_BRANCH: usize = 0;
    pub const METAL_BRANCH: usize = 1;
    pub const EMISSIVE_BRANCH: usize = 2;

    /// `roughness` drives the metal branch's fuzz.
    pub fn new(
        albedo: Arc<dyn Texture>,
        roughness: Arc<dyn Texture>,
        emission: Arc<dyn Texture>,
        emission_mask: Arc<dyn Texture>,
        metal_mask: Arc<dyn Texture>,
    ) -> Self {
        Self {
            diffuse: Lambertian::new(albedo.clone()),
            metal: Metal::new(albedo, roughness),
            emissive: DiffuseLight::new(emission),
            emission_mask,
            metal_mask,
        }
    }

    /// Diffuse, metal and emissive weights at a point. Sums to one.
    pub fn coefficients(&self, u: f64, v: f64, p: Vec3) -> [f64; 3] {
        let emissive = average(self.emission_mask.value(u, v, p)).clamp(0.0, 1.0);
        let metal = average(self.metal_mask.value(u, v, p)).clamp(0.0, 1.0);
        [
            (1.0 - emissive) * (1.0 - metal),
            metal * (1.0 - emissive),
            emissive,
        ]
    }

    fn branch(&self, branch: usize) -> Option<&dyn Material> {
        match branch {
            Self::DIFFUSE_BRANCH => Some(&self.diffuse),
            Self::METAL_BRANCH => Some(&self.metal),
            Self::EMISSIVE_BRANCH => Some(&self.emissive),
            _ => None,
        }
    }
}

impl Material for SimpleCombined {
    fn branch_count(&self) -> usize {
        3
    }

    fn branch_coefficient(&self, u: f64, v: f64, p: Vec3, branch: usize) -> f64 {
        self.coefficients(u, v, p).get(branch).copied().unwrap_or(0.0)
    }

    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        branch: usize,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        self.branch(branch)?.scatter(ray_in, rec, branch, rng)
    }

    fn scattering_pdf(&self, ray_in: &Ray, rec: &HitRecord, scattered: &Ray, branch: usize) -> f64 {
        self.branch(branch)
            .map_or(0.0, |m| m.scattering_pdf(ray_in, rec, scattered, branch))
    }

    fn emitted(&self, rec: &HitRecord, branch: usize) -> Color {
        self.branch(branch)
            .map_or(Color::ZERO, |m| m.emitted(rec, branch))
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumo_core::CheckerTexture2d;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn upward_hit<'a>(material: &'a dyn Material, front_face: bool) -> HitRecord<'a> {
        HitRecord {
            p: Vec3::ZERO,
            normal: Vec3::Y,
            material,
            u: 0.5,
            v: 0.5,
            t: 1.0,
            front_face,
        }
    }

    #[test]
    fn test_lambertian_is_diffuse() {
        let material = Lambertian::from_color(Vec3::new(0.2, 0.4, 0.6));
        let rec = upward_hit(&material, true);
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(1);

        let srec = material.scatter(&ray, &rec, 0, &mut rng).unwrap();
        assert!(!srec.is_specular());
        assert_eq!(srec.attenuation(), Vec3::new(0.2, 0.4, 0.6));

        let up = Ray::new(Vec3::ZERO, Vec3::Y);
        let down = Ray::new(Vec3::ZERO, Vec3::NEG_Y);
        assert!((material.scattering_pdf(&ray, &rec, &up, 0) - 1.0 / std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(material.scattering_pdf(&ray, &rec, &down, 0), 0.0);
    }

    #[test]
    fn test_polished_metal_mirrors() {
        let material = Metal::from_color(Vec3::ONE, 0.0);
        let rec = upward_hit(&material, true);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(2);

        match material.scatter(&ray, &rec, 0, &mut rng) {
            Some(ScatterRecord::Specular { ray, .. }) => {
                let expected = unit_vector(Vec3::new(1.0, 1.0, 0.0));
                assert!((ray.direction() - expected).length() < 1e-12);
            }
            _ => panic!("metal must scatter specularly"),
        }
    }

    #[test]
    fn test_dielectric_is_specular_and_clear() {
        let material = Dielectric::new(1.5);
        let rec = upward_hit(&material, true);
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..16 {
            let srec = material.scatter(&ray, &rec, 0, &mut rng).unwrap();
            assert!(srec.is_specular());
            assert_eq!(srec.attenuation(), Color::ONE);
        }
    }

    #[test]
    fn test_total_internal_reflection() {
        let material = Dielectric::new(1.5);
        let rec = upward_hit(&material, false);
        // Grazing ray leaving the dense medium
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, -0.1, 0.0));
        let mut rng = StdRng::seed_from_u64(4);
        match material.scatter(&ray, &rec, 0, &mut rng) {
            Some(ScatterRecord::Specular { ray: out, .. }) => assert!(out.direction().y > 0.0),
            _ => panic!("dielectric must scatter specularly"),
        }
    }

    #[test]
    fn test_light_emits_front_face_only() {
        let material = DiffuseLight::from_color(Vec3::splat(4.0));
        let mut rng = StdRng::seed_from_u64(5);
        let front = upward_hit(&material, true);
        let back = upward_hit(&material, false);
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);

        assert!(material.scatter(&ray, &front, 0, &mut rng).is_none());
        assert_eq!(material.emitted(&front, 0), Vec3::splat(4.0));
        assert_eq!(material.emitted(&back, 0), Vec3::ZERO);
    }

    #[test]
    fn test_combined_branches_delegate() {
        let material = SimpleCombined::new(
            solid(Vec3::splat(0.5)),
            solid(Vec3::ZERO),
            solid(Vec3::splat(3.0)),
            solid(Vec3::splat(0.25)),
            solid(Vec3::splat(0.5)),
        );
        let rec = upward_hit(&material, true);
        let [diffuse, metal, emissive] = material.coefficients(rec.u, rec.v, rec.p);
        assert!((diffuse - 0.375).abs() < 1e-12);
        assert!((metal - 0.375).abs() < 1e-12);
        assert!((emissive - 0.25).abs() < 1e-12);

        assert_eq!(material.emitted(&rec, SimpleCombined::EMISSIVE_BRANCH), Vec3::splat(3.0));
        assert_eq!(material.emitted(&rec, SimpleCombined::DIFFUSE_BRANCH), Vec3::ZERO);
        assert_eq!(material.branch_coefficient(rec.u, rec.v, rec.p, 7), 0.0);

        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        let mut rng = StdRng::seed_from_u64(6);
        let metal_scatter = material.scatter(&ray, &rec, SimpleCombined::METAL_BRANCH, &mut rng);
        assert!(metal_scatter.is_some_and(|s| s.is_specular()));
    }

    proptest! {
        #[test]
        fn test_combined_coefficients_sum_to_one(
            emission in (-0.5f64..1.5, -0.5f64..1.5, -0.5f64..1.5),
            metal in (-0.5f64..1.5, -0.5f64..1.5, -0.5f64..1.5),
            u in 0.0f64..1.0,
            v in 0.0f64..1.0,
        ) {
            let emission_mask: Arc<dyn Texture> = Arc::new(CheckerTexture2d::new(
                solid(Vec3::new(emission.0, emission.1, emission.2)),
                solid(Vec3::ZERO),
                4.0,
                4.0,
            ));
            let material = SimpleCombined::new(
                solid(Vec3::ONE),
                solid(Vec3::ZERO),
                solid(Vec3::ONE),
                emission_mask,
                solid(Vec3::new(metal.0, metal.1, metal.2)),
            );

            let coefficients = material.coefficients(u, v, Vec3::ZERO);
            for c in coefficients {
                prop_assert!((0.0..=1.0).contains(&c));
            }
            prop_assert!((coefficients.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }
}
