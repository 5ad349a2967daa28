//! Analytic lights sampled with explicit shadow rays.

use lumo_core::Color;
use lumo_math::{unit_vector, Vec3};

/// A light with no surface; found only through shadow rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Parallel light travelling along unit `direction`.
    Directional { color: Color, direction: Vec3 },
    /// Light radiating from `position` with inverse-square falloff.
    Point { color: Color, position: Vec3 },
}

impl Light {
    /// Zero-length directions fall back to straight down.
    pub fn directional(color: Color, direction: Vec3) -> Self {
        let direction = direction.try_normalize().unwrap_or_else(|| {
            log::warn!("Directional light has zero direction, pointing it down -Y");
            Vec3::NEG_Y
        });
        Light::Directional { color, direction }
    }

    pub fn point(color: Color, position: Vec3) -> Self {
        Light::Point { color, position }
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Directional { color, .. } | Light::Point { color, .. } => *color,
        }
    }

    /// Unit direction from `p` toward the light.
    pub fn to_light(&self, p: Vec3) -> Vec3 {
        match self {
            Light::Directional { direction, .. } => -*direction,
            Light::Point { position, .. } => unit_vector(*position - p),
        }
    }

    /// Distance a shadow ray from `p` must travel to reach the light.
    pub fn distance(&self, p: Vec3) -> f64 {
        match self {
            Light::Directional { .. } => f64::INFINITY,
            Light::Point { position, .. } => (*position - p).length(),
        }
    }

    /// Fraction of the light's color arriving at `p` on a surface with
    /// unit normal `normal`.
    pub fn attenuation(&self, normal: Vec3, p: Vec3) -> f64 {
        match self {
            Light::Directional { direction, .. } => (-normal.dot(*direction)).clamp(0.0, 1.0),
            Light::Point { position, .. } => {
                let offset = p - *position;
                let distance_squared = offset.length_squared();
                if distance_squared <= 0.0 {
                    return 0.0;
                }
                (-normal.dot(unit_vector(offset))).clamp(0.0, 1.0) / distance_squared
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_overhead() {
        let light = Light::directional(Vec3::ONE, Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(light.to_light(Vec3::ZERO), Vec3::Y);
        assert_eq!(light.distance(Vec3::ZERO), f64::INFINITY);
        assert_eq!(light.attenuation(Vec3::Y, Vec3::ZERO), 1.0);
        assert_eq!(light.attenuation(Vec3::NEG_Y, Vec3::ZERO), 0.0);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let light = Light::directional(Vec3::ONE, Vec3::ZERO);
        assert_eq!(light.to_light(Vec3::ZERO), Vec3::Y);
    }

    #[test]
    fn test_point_inverse_square() {
        let light = Light::point(Vec3::ONE, Vec3::new(0.0, 2.0, 0.0));
        let p = Vec3::ZERO;
        assert_eq!(light.to_light(p), Vec3::Y);
        assert!((light.distance(p) - 2.0).abs() < 1e-12);
        assert!((light.attenuation(Vec3::Y, p) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_point_behind_surface() {
        let light = Light::point(Vec3::ONE, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(light.attenuation(Vec3::Y, Vec3::ZERO), 0.0);
    }
}
