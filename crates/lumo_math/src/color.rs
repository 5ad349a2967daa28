//! Linear <-> sRGB transfer functions.
//!
//! Render buffers are linear; encoding happens only when a caller asks for
//! display-ready values.

use crate::Vec3;

/// Encode one linear channel. Negative input encodes to 0.
#[inline]
pub fn linear_to_srgb(value: f64) -> f64 {
    if value < 0.0031308 {
        if value < 0.0 {
            0.0
        } else {
            value * 12.92
        }
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode one sRGB channel back to linear. Negative input decodes to 0.
#[inline]
pub fn srgb_to_linear(value: f64) -> f64 {
    if value < 0.04045 {
        if value < 0.0 {
            0.0
        } else {
            value / 12.92
        }
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb_color(color: Vec3) -> Vec3 {
    Vec3::new(
        linear_to_srgb(color.x),
        linear_to_srgb(color.y),
        linear_to_srgb(color.z),
    )
}

pub fn srgb_to_linear_color(color: Vec3) -> Vec3 {
    Vec3::new(
        srgb_to_linear(color.x),
        srgb_to_linear(color.y),
        srgb_to_linear(color.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_values() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-12);
        assert_eq!(linear_to_srgb(-0.5), 0.0);
        // Mid-gray is brighter once encoded.
        assert!(linear_to_srgb(0.18) > 0.4);
    }

    #[test]
    fn test_color_round_trip() {
        let c = Vec3::new(0.001, 0.2, 0.9);
        let back = srgb_to_linear_color(linear_to_srgb_color(c));
        assert!((back - c).abs().max_element() < 1e-6);
    }

    proptest! {
        #[test]
        fn test_srgb_round_trip(x in 0.0f64..=1.0) {
            prop_assert!((srgb_to_linear(linear_to_srgb(x)) - x).abs() < 1e-6);
        }
    }
}
