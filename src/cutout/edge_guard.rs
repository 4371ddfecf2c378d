//! Luminance gradient map that protects detailed regions from region growing.

use image::{GrayImage, Luma, Pixel, RgbaImage};
use imageproc::definitions::Image;
use imageproc::gradients::sobel_gradients;
use imageproc::map::map_colors;

/// Perceptual luminance of every pixel. Alpha is ignored.
pub fn luminance_map(image: &RgbaImage) -> GrayImage {
    map_colors(image, |pixel| pixel.to_rgb().to_luma())
}

/// Sobel gradient magnitude of the luminance map.
///
/// Only interior pixels carry a value; the one-pixel border is zero so
/// growth starting at the border is never held back by the edge check.
pub fn gradient_map(luminance: &GrayImage) -> Image<Luma<u16>> {
    let (width, height) = luminance.dimensions();
    let mut gradients = sobel_gradients(luminance);
    if width == 0 || height == 0 {
        return gradients;
    }

    for x in 0..width {
        gradients.put_pixel(x, 0, Luma([0]));
        gradients.put_pixel(x, height - 1, Luma([0]));
    }
    for y in 0..height {
        gradients.put_pixel(0, y, Luma([0]));
        gradients.put_pixel(width - 1, y, Luma([0]));
    }
    gradients
}

/// Gradient magnitudes as a dense row-major array, ready for lookups during growth
#[derive(Debug, Clone)]
pub struct EdgeGuard {
    width: u32,
    magnitudes: Vec<u16>,
}

impl EdgeGuard {
    pub fn from_image(image: &RgbaImage) -> Self {
        let gradients = gradient_map(&luminance_map(image));
        Self {
            width: gradients.width(),
            magnitudes: gradients.into_raw(),
        }
    }

    /// Gradient magnitude at a row-major pixel index
    #[inline]
    pub fn magnitude_at_index(&self, index: usize) -> f32 {
        f32::from(self.magnitudes[index])
    }

    #[inline]
    pub fn magnitude(&self, x: u32, y: u32) -> f32 {
        self.magnitude_at_index((y * self.width + x) as usize)
    }
}
