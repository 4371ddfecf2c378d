use image::{ImageBuffer, Luma};
use imageproc::definitions::Image;

use crate::cutout::region_grower::Region;

/// Background mask: 1.0 is background, 0.0 is foreground
pub type Mask = Image<Luma<f32>>;

/// Converts a grown region into a binary mask.
pub fn region_to_mask(region: &Region) -> Mask {
    let (width, height) = region.dimensions();
    let data = region
        .as_slice()
        .iter()
        .map(|&visited| if visited { 1.0 } else { 0.0 })
        .collect();
    ImageBuffer::from_raw(width, height, data).unwrap_or_else(|| ImageBuffer::new(width, height))
}

/// Trait providing separable box-blur feathering of a mask
///
/// Each output value is the mean of a `2 * radius + 1` window, first along
/// rows and then along columns. Samples beyond the image edge repeat the
/// nearest edge pixel, so the divisor is always the full window size.
/// Window sums come from per-line prefix sums, so the cost per pixel does
/// not depend on the radius.
pub trait Feather {
    /// Returns a feathered copy. A radius of 0 returns the mask unchanged.
    fn feather(&self, radius: u32) -> Self;

    /// Feathers in place.
    fn feather_mut(&mut self, radius: u32) -> &mut Self;
}

impl Feather for Mask {
    fn feather(&self, radius: u32) -> Self {
        let mut mask = self.clone();
        mask.feather_mut(radius);
        mask
    }

    fn feather_mut(&mut self, radius: u32) -> &mut Self {
        let (width, height) = self.dimensions();
        if radius == 0 || width == 0 || height == 0 {
            return self;
        }

        let (width, height) = (width as usize, height as usize);
        let radius = radius as usize;
        let mut prefix = Vec::with_capacity(width.max(height) + 1);

        // Horizontal pass into a temporary buffer
        let source: &[f32] = self.as_raw();
        let mut horizontal = vec![0.0f32; width * height];
        for (row, out) in source
            .chunks_exact(width)
            .zip(horizontal.chunks_exact_mut(width))
        {
            box_mean_line(width, radius, &mut prefix, |x| row[x], |x, mean| out[x] = mean);
        }

        // Vertical pass back into the mask
        let mask: &mut [f32] = &mut **self;
        for x in 0..width {
            box_mean_line(
                height,
                radius,
                &mut prefix,
                |y| horizontal[y * width + x],
                |y, mean| mask[y * width + x] = mean.clamp(0.0, 1.0),
            );
        }

        self
    }
}

/// Clamped box mean along one line of `len` samples.
///
/// `prefix` is scratch space. Sums are accumulated in `f64`, which keeps
/// them exact for mask values, so a window of ones averages to exactly 1.
fn box_mean_line(
    len: usize,
    radius: usize,
    prefix: &mut Vec<f64>,
    read: impl Fn(usize) -> f32,
    mut write: impl FnMut(usize, f32),
) {
    prefix.clear();
    prefix.push(0.0);
    let mut running = 0.0f64;
    for i in 0..len {
        running += f64::from(read(i));
        prefix.push(running);
    }

    let first = f64::from(read(0));
    let last = f64::from(read(len - 1));
    let window = (2 * radius + 1) as f64;
    for i in 0..len {
        let start = i.saturating_sub(radius);
        let end = (i + radius).min(len - 1);
        // Samples past either end repeat the edge value
        let clamped_before = (radius - (i - start)) as f64;
        let clamped_after = (radius - (end - i)) as f64;
        let sum = prefix[end + 1] - prefix[start] + clamped_before * first + clamped_after * last;
        write(i, (sum / window) as f32);
    }
}
