//! Gradient (Perlin) noise with turbulence.

use lumo_math::Vec3;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

const POINT_COUNT: usize = 256;

/// Lattice gradient noise. Built once from an RNG and immutable afterwards,
/// so textures holding it can be shared across render threads.
#[derive(Clone, Debug)]
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    /// Octave count used by the noise textures.
    pub const DEFAULT_OCTAVES: u32 = 7;

    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();

        Self {
            gradients,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Smoothly interpolated noise in roughly [-1, 1].
    pub fn noise(&self, p: Vec3) -> f64 {
        let floor = p.floor();
        let frac = p - floor;
        let (i, j, k) = (floor.x as i64, floor.y as i64, floor.z as i64);

        let mut corners = [Vec3::ZERO; 8];
        for di in 0..2 {
            for dj in 0..2 {
                for dk in 0..2 {
                    let index = self.perm_x[((i + di) & 255) as usize]
                        ^ self.perm_y[((j + dj) & 255) as usize]
                        ^ self.perm_z[((k + dk) & 255) as usize];
                    corners[(4 * di + 2 * dj + dk) as usize] = self.gradients[index];
                }
            }
        }

        interpolate(&corners, frac)
    }

    /// Sum of `depth` octaves of noise with halving weights, absolute value.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    perm.shuffle(rng);
    perm
}

/// Trilinear blend of corner gradients with Hermite smoothing.
fn interpolate(corners: &[Vec3; 8], frac: Vec3) -> f64 {
    let smooth = frac * frac * (Vec3::splat(3.0) - 2.0 * frac);
    let mut accum = 0.0;

    for i in 0..2 {
        for j in 0..2 {
            for k in 0..2 {
                let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                let weight = frac - Vec3::new(fi, fj, fk);
                accum += (fi * smooth.x + (1.0 - fi) * (1.0 - smooth.x))
                    * (fj * smooth.y + (1.0 - fj) * (1.0 - smooth.y))
                    * (fk * smooth.z + (1.0 - fk) * (1.0 - smooth.z))
                    * corners[4 * i + 2 * j + k].dot(weight);
            }
        }
    }

    accum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(1));
        // At integer points the fractional offset is zero, so the gradient
        // dot product vanishes.
        assert_eq!(perlin.noise(Vec3::new(3.0, -2.0, 5.0)), 0.0);
    }

    #[test]
    fn test_noise_is_deterministic_per_seed() {
        let a = Perlin::new(&mut StdRng::seed_from_u64(11));
        let b = Perlin::new(&mut StdRng::seed_from_u64(11));
        let p = Vec3::new(0.3, 1.7, -4.2);
        assert_eq!(a.noise(p), b.noise(p));
    }

    #[test]
    fn test_turbulence_is_non_negative() {
        let perlin = Perlin::new(&mut StdRng::seed_from_u64(5));
        for i in 0..50 {
            let p = Vec3::new(i as f64 * 0.13, i as f64 * -0.31, 0.77);
            assert!(perlin.turbulence(p, Perlin::DEFAULT_OCTAVES) >= 0.0);
        }
    }
}
