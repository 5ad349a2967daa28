//! Thin-lens camera for ray generation.

use lumo_math::{Ray, Vec3};
use rand::RngCore;

use crate::random::random_in_unit_disk;

/// Camera mapping normalized film coordinates to rays.
///
/// `(s, t) = (0, 0)` is the lower-left corner of the image, `(1, 1)` the
/// upper right. The focal plane passes through `look_at`.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// - `vfov`: vertical field of view in degrees
    /// - `aperture`: lens diameter, 0 for a pinhole
    pub fn new(look_from: Vec3, look_at: Vec3, vup: Vec3, vfov: f64, aspect: f64, aperture: f64) -> Self {
        let theta = vfov.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = aspect * viewport_height;

        let offset = look_from - look_at;
        let focus_dist = offset.length();
        let (w, focus_dist) = if focus_dist > 0.0 {
            (offset / focus_dist, focus_dist)
        } else {
            log::warn!("Camera looks at its own position, facing -Z");
            (Vec3::Z, 1.0)
        };
        let u = vup.cross(w).try_normalize().unwrap_or(Vec3::X);
        let v = w.cross(u);

        let horizontal = focus_dist * viewport_width * u;
        let vertical = focus_dist * viewport_height * v;
        let lower_left_corner = look_from - horizontal / 2.0 - vertical / 2.0 - focus_dist * w;

        Self {
            origin: look_from,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: aperture.max(0.0) / 2.0,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Generate a ray through film position `(s, t)`.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let origin = self.origin + offset;
        let target = self.lower_left_corner + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y, 90.0, 1.0, 0.0)
    }
}
