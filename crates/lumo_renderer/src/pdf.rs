//! Probability densities over directions.
//!
//! A [`Pdf`] both evaluates the density of a direction and draws one. The
//! integrator mixes a material's own density with one aimed at importance
//! targets so light-carrying surfaces are found more often.

use std::f64::consts::PI;

use lumo_math::{unit_vector, Onb, Vec3};
use rand::RngCore;

use crate::hittable::Hittable;
use crate::random::{gen_f64, random_cosine_direction};

pub enum Pdf<'a> {
    /// Cosine-weighted hemisphere around the basis' `w` axis.
    Cosine(Onb),
    /// Directions from `origin` toward points on `target`.
    Toward {
        target: &'a dyn Hittable,
        origin: Vec3,
    },
    /// Equal-weight blend of two densities.
    Mixture(Box<[Pdf<'a>; 2]>),
}

impl<'a> Pdf<'a> {
    pub fn cosine(normal: Vec3) -> Self {
        Pdf::Cosine(Onb::from_w(normal))
    }

    pub fn toward(target: &'a dyn Hittable, origin: Vec3) -> Self {
        Pdf::Toward { target, origin }
    }

    pub fn mixture(first: Pdf<'a>, second: Pdf<'a>) -> Self {
        Pdf::Mixture(Box::new([first, second]))
    }

    /// Density of sampling `direction`. Never negative.
    pub fn value(&self, direction: Vec3) -> f64 {
        match self {
            Pdf::Cosine(basis) => {
                let cosine = unit_vector(direction).dot(basis.w());
                cosine.max(0.0) / PI
            }
            Pdf::Toward { target, origin } => target.pdf_value(*origin, direction),
            Pdf::Mixture(parts) => 0.5 * parts[0].value(direction) + 0.5 * parts[1].value(direction),
        }
    }

    /// Draw a direction distributed according to [`Pdf::value`].
    pub fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            Pdf::Cosine(basis) => basis.local_vec(random_cosine_direction(rng)),
            Pdf::Toward { target, origin } => target.random(*origin, rng),
            Pdf::Mixture(parts) => {
                if gen_f64(rng) < 0.5 {
                    parts[0].generate(rng)
                } else {
                    parts[1].generate(rng)
                }
            }
        }
    }
}
