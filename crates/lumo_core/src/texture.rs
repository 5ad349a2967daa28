//! Texture library.
//!
//! A texture maps a surface parameterization `(u, v)` and a world point `p`
//! to a linear RGB color. Textures compose: checkers, gradients and noise
//! blend two child textures, so everything is shared through `Arc`.

use std::f64::consts::PI;
use std::sync::Arc;

use lumo_math::Vec3;
use rand::RngCore;
use thiserror::Error;

use crate::perlin::Perlin;

/// Color type alias (linear RGB, typically 0-1).
pub type Color = Vec3;

/// Placeholder returned by image textures that carry no pixels.
pub const MISSING_TEXTURE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// Errors that can occur while wrapping raw pixel buffers.
#[derive(Error, Debug, PartialEq)]
pub enum TextureError {
    #[error("Texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("Pixel buffer of length {len} does not divide into {width}x{height} pixels")]
    BufferMismatch { len: usize, width: u32, height: u32 },

    #[error("Texture needs at least 3 channels per pixel, got {0}")]
    TooFewChannels(usize),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A function of surface parameters and world position to color.
pub trait Texture: Send + Sync {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color;
}

/// Constant color.
#[derive(Debug, Clone, Copy)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(Color::new(r, g, b))
    }

    /// Gray level `v` on all three channels.
    pub fn mono(v: f64) -> Self {
        Self::new(Color::splat(v))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f64, _v: f64, _p: Vec3) -> Color {
        self.color
    }
}

/// Solid 3D checker driven by the sign of `sin(sx*x) * sin(sy*y) * sin(sz*z)`.
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    scale: Vec3,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>, scale: Vec3) -> Self {
        Self { even, odd, scale }
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        let sines = (self.scale.x * p.x).sin() * (self.scale.y * p.y).sin() * (self.scale.z * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Checker in UV space. `squares_u`/`squares_v` count cells per UV tile.
pub struct CheckerTexture2d {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    squares_u: f64,
    squares_v: f64,
}

impl CheckerTexture2d {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>, squares_u: f64, squares_v: f64) -> Self {
        Self {
            even,
            odd,
            squares_u,
            squares_v,
        }
    }
}

impl Texture for CheckerTexture2d {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        let sines = (self.squares_u * PI * u).sin() * (self.squares_v * PI * v).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Perlin turbulence evaluated at the scaled world point, blending two textures.
pub struct NoiseTexture {
    noise: Perlin,
    low: Arc<dyn Texture>,
    high: Arc<dyn Texture>,
    scale: Vec3,
}

impl NoiseTexture {
    pub fn new(low: Arc<dyn Texture>, high: Arc<dyn Texture>, scale: Vec3, rng: &mut dyn RngCore) -> Self {
        Self {
            noise: Perlin::new(rng),
            low,
            high,
            scale,
        }
    }
}

impl Texture for NoiseTexture {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        let t = self.noise.turbulence(self.scale * p, Perlin::DEFAULT_OCTAVES);
        (1.0 - t) * self.low.value(u, v, p) + t * self.high.value(u, v, p)
    }
}

/// Perlin turbulence on the `(u, v, z_slice)` plane, blending two textures.
pub struct NoiseTexture2d {
    noise: Perlin,
    low: Arc<dyn Texture>,
    high: Arc<dyn Texture>,
    scale: Vec3,
    z_slice: f64,
}

impl NoiseTexture2d {
    pub fn new(
        low: Arc<dyn Texture>,
        high: Arc<dyn Texture>,
        scale: Vec3,
        z_slice: f64,
        rng: &mut dyn RngCore,
    ) -> Self {
        Self {
            noise: Perlin::new(rng),
            low,
            high,
            scale,
            z_slice,
        }
    }
}

impl Texture for NoiseTexture2d {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        let q = self.scale * Vec3::new(u, v, self.z_slice);
        let t = self.noise.turbulence(q, Perlin::DEFAULT_OCTAVES);
        (1.0 - t) * self.low.value(u, v, p) + t * self.high.value(u, v, p)
    }
}

/// Linear blend from `bottom` at `v = 0` to `top` at `v = 1`.
pub struct GradientTexture {
    bottom: Arc<dyn Texture>,
    top: Arc<dyn Texture>,
}

impl GradientTexture {
    pub fn new(bottom: Arc<dyn Texture>, top: Arc<dyn Texture>) -> Self {
        Self { bottom, top }
    }
}

impl Texture for GradientTexture {
    fn value(&self, u: f64, v: f64, p: Vec3) -> Color {
        (1.0 - v) * self.bottom.value(u, v, p) + v * self.top.value(u, v, p)
    }
}

/// Visualizes the parameterization itself as `(u, v, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UvTexture;

impl Texture for UvTexture {
    fn value(&self, u: f64, v: f64, _p: Vec3) -> Color {
        Color::new(u, v, 0.0)
    }
}

/// Nearest-sample lookup shared by the LDR and HDR image textures.
///
/// Returns the index of the first channel of the texel under `(u, v)`.
/// UV is clamped to [0, 1] and `v` is flipped so row 0 is the top of the image.
fn texel_index(u: f64, v: f64, width: u32, height: u32, channels: usize) -> usize {
    let u = u.clamp(0.0, 1.0);
    let v = 1.0 - v.clamp(0.0, 1.0);

    let i = ((u * width as f64) as usize).min(width as usize - 1);
    let j = ((v * height as f64) as usize).min(height as usize - 1);

    (j * width as usize + i) * channels
}

/// Check a raw buffer against its declared size and return channels per pixel.
fn channels_per_pixel(len: usize, width: u32, height: u32) -> TextureResult<usize> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    let pixel_count = width as usize * height as usize;
    if len % pixel_count != 0 {
        return Err(TextureError::BufferMismatch { len, width, height });
    }
    let channels = len / pixel_count;
    if channels < 3 {
        return Err(TextureError::TooFewChannels(channels));
    }
    Ok(channels)
}

/// 8-bit image texture. Bytes are treated as already-linear values / 255.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: usize,
}

impl ImageTexture {
    /// Wrap a row-major buffer of `width * height` pixels with 3 or more
    /// channels each. An empty buffer is accepted and samples as magenta.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> TextureResult<Self> {
        if data.is_empty() {
            log::warn!("Image texture created without pixels, it will render as magenta");
            return Ok(Self {
                data,
                width: 0,
                height: 0,
                channels: 0,
            });
        }
        let channels = channels_per_pixel(data.len(), width, height)?;
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Copy an already-decoded RGB image.
    pub fn from_rgb8(image: &image::RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.as_raw().clone(),
            width,
            height,
            channels: 3,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f64, v: f64, _p: Vec3) -> Color {
        if self.data.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }
        let index = texel_index(u, v, self.width, self.height, self.channels);
        let scale = 1.0 / 255.0;
        Color::new(
            scale * self.data[index] as f64,
            scale * self.data[index + 1] as f64,
            scale * self.data[index + 2] as f64,
        )
    }
}

/// Floating-point (HDR) image texture, typically an environment map.
#[derive(Clone, Debug)]
pub struct ImageTextureHdr {
    data: Vec<f64>,
    width: u32,
    height: u32,
    channels: usize,
}

impl ImageTextureHdr {
    /// Wrap a row-major float buffer. An empty buffer samples as magenta.
    pub fn new(data: Vec<f64>, width: u32, height: u32) -> TextureResult<Self> {
        if data.is_empty() {
            log::warn!("HDR texture created without pixels, it will render as magenta");
            return Ok(Self {
                data,
                width: 0,
                height: 0,
                channels: 0,
            });
        }
        let channels = channels_per_pixel(data.len(), width, height)?;
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Copy an already-decoded 32-bit float RGB image.
    pub fn from_rgb32f(image: &image::Rgb32FImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            data: image.as_raw().iter().map(|&c| c as f64).collect(),
            width,
            height,
            channels: 3,
        }
    }
}

impl Texture for ImageTextureHdr {
    fn value(&self, u: f64, v: f64, _p: Vec3) -> Color {
        if self.data.is_empty() {
            return MISSING_TEXTURE_COLOR;
        }
        let index = texel_index(u, v, self.width, self.height, self.channels);
        Color::new(self.data[index], self.data[index + 1], self.data[index + 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn solid(v: f64) -> Arc<dyn Texture> {
        Arc::new(SolidColor::mono(v))
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = SolidColor::rgb(1.0, 0.5, 0.0);
        assert_eq!(tex.value(0.3, 0.7, Vec3::ONE), Color::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_alternates_in_space() {
        let checker = CheckerTexture::new(solid(0.2), solid(0.8), Vec3::ONE);
        let even = checker.value(0.0, 0.0, Vec3::new(1.0, 1.0, 1.0));
        let odd = checker.value(0.0, 0.0, Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(even, Color::splat(0.2));
        assert_eq!(odd, Color::splat(0.8));
    }

    #[test]
    fn test_checker_2d_cells() {
        let checker = CheckerTexture2d::new(solid(0.0), solid(1.0), 2.0, 2.0);
        // Two cells per tile: (0.25, 0.25) and (0.75, 0.25) sit in different cells.
        assert_eq!(checker.value(0.25, 0.25, Vec3::ZERO), Color::ZERO);
        assert_eq!(checker.value(0.75, 0.25, Vec3::ZERO), Color::ONE);
    }

    #[test]
    fn test_gradient_endpoints() {
        let gradient = GradientTexture::new(solid(0.0), solid(1.0));
        assert_eq!(gradient.value(0.5, 0.0, Vec3::ZERO), Color::ZERO);
        assert_eq!(gradient.value(0.5, 1.0, Vec3::ZERO), Color::ONE);
        assert_eq!(gradient.value(0.5, 0.25, Vec3::ZERO), Color::splat(0.25));
    }

    #[test]
    fn test_uv_texture() {
        assert_eq!(UvTexture.value(0.1, 0.9, Vec3::ONE), Color::new(0.1, 0.9, 0.0));
    }

    #[test]
    fn test_noise_texture_blends_between_children() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = NoiseTexture::new(solid(0.0), solid(1.0), Vec3::splat(4.0), &mut rng);
        for i in 0..20 {
            let p = Vec3::new(i as f64 * 0.37, 0.5, -0.2 * i as f64);
            let c = noise.value(0.0, 0.0, p);
            // Channels stay equal because both children are gray.
            assert_eq!(c.x, c.y);
            assert!(c.x.is_finite());
        }
    }

    #[test]
    fn test_image_texture_nearest_sample() {
        // 2x1 image: left red, right blue.
        let data = vec![255, 0, 0, 0, 0, 255];
        let tex = ImageTexture::new(data, 2, 1).unwrap();
        assert_eq!(tex.value(0.1, 0.5, Vec3::ZERO), Color::new(1.0, 0.0, 0.0));
        assert_eq!(tex.value(0.9, 0.5, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
        // Out-of-range UV clamps to the edge.
        assert_eq!(tex.value(7.0, -3.0, Vec3::ZERO), Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_image_texture_v_is_flipped() {
        // 1x2 image: top row white, bottom row black.
        let data = vec![255, 255, 255, 0, 0, 0];
        let tex = ImageTexture::new(data, 1, 2).unwrap();
        assert_eq!(tex.value(0.5, 0.9, Vec3::ZERO), Color::ONE);
        assert_eq!(tex.value(0.5, 0.1, Vec3::ZERO), Color::ZERO);
    }

    #[test]
    fn test_image_texture_rejects_bad_buffers() {
        assert_eq!(
            ImageTexture::new(vec![0; 7], 2, 1).unwrap_err(),
            TextureError::BufferMismatch { len: 7, width: 2, height: 1 }
        );
        assert_eq!(
            ImageTexture::new(vec![0; 4], 2, 1).unwrap_err(),
            TextureError::TooFewChannels(2)
        );
        assert_eq!(
            ImageTexture::new(vec![0; 3], 0, 1).unwrap_err(),
            TextureError::ZeroDimensions { width: 0, height: 1 }
        );
    }

    #[test]
    fn test_empty_image_is_magenta() {
        let tex = ImageTexture::new(Vec::new(), 4, 4).unwrap();
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);
        let hdr = ImageTextureHdr::new(Vec::new(), 4, 4).unwrap();
        assert_eq!(hdr.value(0.5, 0.5, Vec3::ZERO), MISSING_TEXTURE_COLOR);
    }

    #[test]
    fn test_hdr_texture_keeps_range() {
        let tex = ImageTextureHdr::new(vec![4.0, 2.0, 0.5, 1.0], 1, 1).unwrap();
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(4.0, 2.0, 0.5));
    }

    #[test]
    fn test_from_rgb8_adapter() {
        let image = image::RgbImage::from_pixel(2, 2, image::Rgb([0, 255, 0]));
        let tex = ImageTexture::from_rgb8(&image);
        assert_eq!(tex.dimensions(), (2, 2));
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), Color::new(0.0, 1.0, 0.0));
    }
}
