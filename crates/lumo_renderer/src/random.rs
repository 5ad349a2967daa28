//! Sampling helpers shared by materials, PDFs and primitives.
//!
//! Every helper draws from a caller-supplied `&mut dyn RngCore` so a render
//! is reproducible from its seed.

use std::f64::consts::PI;

use lumo_math::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform sample in `[0, 1)`.
#[inline]
pub fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Uniform sample in `[min, max)`.
#[inline]
pub fn gen_range(rng: &mut dyn RngCore, min: f64, max: f64) -> f64 {
    min + (max - min) * gen_f64(rng)
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling inside the unit ball, then project
    loop {
        let v = Vec3::new(
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
            gen_range(rng, -1.0, 1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-12 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Uniform unit direction in the hemisphere around `normal`.
pub fn random_in_hemisphere(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let v = random_unit_vector(rng);
    if v.dot(normal) > 0.0 {
        v
    } else {
        -v
    }
}

/// Cosine-weighted direction around local +Z.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);
    let phi = 2.0 * PI * r1;
    let r2_sqrt = r2.sqrt();

    Vec3::new(
        phi.cos() * r2_sqrt,
        phi.sin() * r2_sqrt,
        (1.0 - r2).sqrt(),
    )
}

/// Direction around local +Z, uniform over the cone subtended by a sphere
/// of `radius` whose center lies `distance_squared` away.
pub fn random_to_sphere(radius: f64, distance_squared: f64, rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f64(rng);
    let r2 = gen_f64(rng);
    let cos_theta_max = (1.0 - radius * radius / distance_squared).max(0.0).sqrt();
    let z = 1.0 + r2 * (cos_theta_max - 1.0);

    let phi = 2.0 * PI * r1;
    let sin_theta = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(phi.cos() * sin_theta, phi.sin() * sin_theta, z)
}

/// Uniform point in the unit disk, used for depth-of-field lens samples.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    loop {
        let p = Vec2::new(gen_range(rng, -1.0, 1.0), gen_range(rng, -1.0, 1.0));
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Deterministic generator for one pixel of a seeded render.
///
/// Pixels draw from independent streams so results do not depend on how
/// rows are scheduled across threads.
pub fn pixel_rng(seed: u64, row: u32, column: u32) -> StdRng {
    let pixel = ((row as u64) << 32) | column as u64;
    StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ pixel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_unit_vector_is_unit() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let v = random_unit_vector(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hemisphere_faces_normal() {
        let mut rng = StdRng::seed_from_u64(4);
        let normal = Vec3::new(0.0, -1.0, 0.0);
        for _ in 0..100 {
            assert!(random_in_hemisphere(normal, &mut rng).dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_cosine_direction_upper_hemisphere() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let d = random_cosine_direction(&mut rng);
            assert!(d.z >= 0.0);
            assert!((d.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_to_sphere_stays_inside_cone() {
        let mut rng = StdRng::seed_from_u64(6);
        // radius 1 at distance 2: half-angle 30 degrees
        let cos_theta_max = (1.0f64 - 0.25).sqrt();
        for _ in 0..100 {
            let d = random_to_sphere(1.0, 4.0, &mut rng);
            assert!(d.z >= cos_theta_max - 1e-12);
        }
    }

    #[test]
    fn test_pixel_rng_is_deterministic() {
        let a = pixel_rng(7, 10, 20).gen::<u64>();
        let b = pixel_rng(7, 10, 20).gen::<u64>();
        let c = pixel_rng(7, 20, 10).gen::<u64>();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
