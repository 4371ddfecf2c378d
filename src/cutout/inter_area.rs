use image::{GenericImageView, ImageBuffer, Pixel, Primitive};
use imageproc::definitions::{Clamp, Image};

use crate::error::ResizeError;
use crate::utils::{clamp_f32_to_primitive, is_empty_image};

/// Element of the weight table for area interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct InterpolationWeight {
    /// Destination index
    pub destination_index: u32,
    /// Source index
    pub source_index: u32,
    /// Weight value
    pub weight: f32,
}

/// Area-averaging (INTER_AREA) downscaler.
///
/// Every destination pixel is the coverage-weighted mean of the source
/// pixels under its footprint, which avoids the aliasing of point sampling
/// on fine backdrop patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterAreaResize {
    /// New width
    pub new_width: u32,
    /// New height
    pub new_height: u32,
}

/// Dimensions of the working image for a given size limit.
///
/// When the longer side exceeds `max_dimension` the image is scaled
/// uniformly so the longer side equals `max_dimension` and the shorter side
/// is rounded, never below 1. Smaller images keep their size.
pub fn working_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_dimension || max_dimension == 0 {
        return (width, height);
    }
    let scale = f64::from(max_dimension) / f64::from(longer);
    let shrink = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_dimension);
    if width >= height {
        (max_dimension, shrink(height))
    } else {
        (shrink(width), max_dimension)
    }
}

impl InterAreaResize {
    /// Create a new INTER_AREA resizer.
    pub const fn new(new_width: u32, new_height: u32) -> Result<Self, ResizeError> {
        if new_width == 0 || new_height == 0 {
            return Err(ResizeError::InvalidTargetDimensions {
                width: new_width,
                height: new_height,
            });
        }
        Ok(Self {
            new_width,
            new_height,
        })
    }

    /// Resize image using INTER_AREA interpolation.
    ///
    /// # Errors
    ///
    /// * `ResizeError::EmptyImage` - the source has a zero dimension
    /// * `ResizeError::UpscalingNotSupported` - the target is larger than the source
    pub fn resize<I, P>(&self, src: &I) -> Result<Image<P>, ResizeError>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel,
        P::Subpixel: Clamp<f32> + Into<f32> + Primitive,
    {
        let (src_width, src_height) = src.dimensions();

        if is_empty_image(src_width, src_height) {
            return Err(ResizeError::EmptyImage {
                width: src_width,
                height: src_height,
            });
        }

        if self.new_width > src_width || self.new_height > src_height {
            return Err(ResizeError::UpscalingNotSupported {
                src_width,
                src_height,
                target_width: self.new_width,
                target_height: self.new_height,
            });
        }

        Ok(resize_area_impl(src, self.new_width, self.new_height))
    }
}

/// Compute the area decimation table for one axis.
///
/// Destination cell `d` covers source span `[d * scale, (d + 1) * scale)`.
/// Each overlapped source index gets its share of that span, so the
/// weights of a destination index sum to 1.
fn compute_interpolation_weights_impl(src_size: u32, dst_size: u32) -> Vec<InterpolationWeight> {
    let scale = f64::from(src_size) / f64::from(dst_size);
    let mut tab = Vec::new();

    for dx in 0..dst_size {
        let start = f64::from(dx) * scale;
        let end = (start + scale).min(f64::from(src_size));
        let span = end - start;

        let first = start.floor() as u32;
        let last = (end.ceil() as u32).min(src_size);
        for sx in first..last {
            let overlap = end.min(f64::from(sx + 1)) - start.max(f64::from(sx));
            if overlap > 1e-6 {
                tab.push(InterpolationWeight {
                    destination_index: dx,
                    source_index: sx,
                    weight: (overlap / span) as f32,
                });
            }
        }
    }

    tab
}

/// Separable area resize: rows first into a float buffer, then columns.
fn resize_area_impl<I, P>(src: &I, dst_width: u32, dst_height: u32) -> Image<P>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Clamp<f32> + Into<f32> + Primitive,
{
    let (_, src_height) = src.dimensions();
    let channels = usize::from(P::CHANNEL_COUNT);
    let x_weights = compute_interpolation_weights_impl(src.width(), dst_width);
    let y_weights = compute_interpolation_weights_impl(src_height, dst_height);

    // Horizontal pass: src_height x dst_width
    let row_len = dst_width as usize * channels;
    let mut rows = vec![0.0f32; src_height as usize * row_len];
    for sy in 0..src_height {
        let row = &mut rows[sy as usize * row_len..(sy as usize + 1) * row_len];
        for entry in &x_weights {
            let pixel = src.get_pixel(entry.source_index, sy);
            let offset = entry.destination_index as usize * channels;
            for (c, &value) in pixel.channels().iter().enumerate() {
                row[offset + c] += value.into() * entry.weight;
            }
        }
    }

    // Vertical pass: dst_height x dst_width
    let mut sums = vec![0.0f32; dst_height as usize * row_len];
    for entry in &y_weights {
        let source = &rows[entry.source_index as usize * row_len..][..row_len];
        let target = &mut sums[entry.destination_index as usize * row_len..][..row_len];
        for (sum, value) in target.iter_mut().zip(source) {
            *sum += value * entry.weight;
        }
    }

    let mut output = ImageBuffer::new(dst_width, dst_height);
    for (subpixel, sum) in output.iter_mut().zip(sums) {
        *subpixel = clamp_f32_to_primitive(sum);
    }
    output
}

/// Extension trait for ImageBuffer to provide INTER_AREA resize methods.
pub trait InterAreaResizeExt<P>
where
    P: Pixel,
{
    /// Resize image using INTER_AREA interpolation.
    fn resize_area(&self, new_width: u32, new_height: u32) -> Result<Image<P>, ResizeError>;
}

impl<P> InterAreaResizeExt<P> for Image<P>
where
    P: Pixel,
    P::Subpixel: Clamp<f32> + Into<f32> + Primitive,
{
    fn resize_area(&self, new_width: u32, new_height: u32) -> Result<Image<P>, ResizeError> {
        let resizer = InterAreaResize::new(new_width, new_height)?;
        resizer.resize(self)
    }
}
