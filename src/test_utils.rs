//! Test utilities for backdrop-cutout
//!
//! Synthetic images with known backgrounds. Only compiled for tests.

use image::{Rgba, RgbaImage};

/// Creates a test RGBA image with predefined pixel values for testing.
///
/// - (0,0): [200, 150, 100, 255] (opaque)
/// - (1,0): [100, 200, 150, 128] (semi-transparent)
/// - (0,1): [150, 100, 200, 64]  (more transparent)
/// - (1,1): [50, 75, 25, 0]      (fully transparent)
pub fn create_test_rgba_image() -> RgbaImage {
    let mut image = RgbaImage::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Opaque image of a single color.
pub fn create_solid_image(width: u32, height: u32, color: [u8; 3]) -> RgbaImage {
    let [r, g, b] = color;
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
}

/// Checkerboard of `tile`-sized squares with a centered disk on top.
///
/// Tile `(0, 0)` uses `light`. A pixel belongs to the disk when its center
/// lies within `radius` of the image center.
pub fn create_checkerboard_with_disk(
    width: u32,
    height: u32,
    tile: u32,
    light: [u8; 3],
    dark: [u8; 3],
    disk: [u8; 3],
    radius: f32,
) -> RgbaImage {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    RgbaImage::from_fn(width, height, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let [r, g, b] = if dx * dx + dy * dy <= radius * radius {
            disk
        } else if (x / tile + y / tile) % 2 == 0 {
            light
        } else {
            dark
        };
        Rgba([r, g, b, 255])
    })
}

fn noise_hash(index: u32) -> u32 {
    let mut x = index.wrapping_mul(2_654_435_761);
    x ^= x >> 13;
    x = x.wrapping_mul(0x5bd1_e995);
    x ^ (x >> 15)
}

/// Deterministic per-pixel noise with no dominant color.
pub fn create_noise_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let i = (y * width + x) * 3;
        let channel = |offset: u32| (noise_hash(i + offset) & 0xff) as u8;
        Rgba([channel(0), channel(1), channel(2), 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_checkerboard_with_disk_places_disk_at_center() {
        let image = create_checkerboard_with_disk(16, 16, 4, [255; 3], [0; 3], [9, 9, 9], 3.0);
        assert_eq!(image.get_pixel(8, 8), &Rgba([9, 9, 9, 255]));
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(4, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn create_noise_image_is_deterministic() {
        assert_eq!(create_noise_image(9, 7), create_noise_image(9, 7));
    }
}
