//! Background removal pipeline.
//!
//! A call runs these stages in order, all on the working-resolution image:
//!
//! 1. downscale so the longer side fits `max_dimension`
//! 2. per-pixel L*a*b* planes
//! 3. background sampling and clustering
//! 4. luminance gradient map
//! 5. region growing from the border and/or seeds
//! 6. mask feathering
//! 7. alpha write-back
//!
//! Everything allocated here lives for one call only.

use image::RgbaImage;
use tracing::{debug, debug_span, warn};

use crate::cutout::alpha_mask::ApplyBackgroundMask;
use crate::cutout::background_sampler::{
    border_positions, sampling_stride, BackgroundEstimate, BackgroundSampler,
};
use crate::cutout::color_model::LabPlanes;
use crate::cutout::decode::Decode;
use crate::cutout::edge_guard::EdgeGuard;
use crate::cutout::inter_area::{working_dimensions, InterAreaResize};
use crate::cutout::mask_refiner::{region_to_mask, Feather, Mask};
use crate::cutout::options::{Options, Seed};
use crate::cutout::region_grower::{derive_tolerance, RegionGrower};
use crate::error::{DecodeError, OptionsError, SegmentError, SegmentFailure};

/// Fewest pixels an image needs for a background to be told apart
pub const MIN_SEGMENT_PIXELS: u64 = 2;

/// Result of a successful segmentation call
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Working-resolution image with the computed alpha channel
    pub image: RgbaImage,
    /// Feathered background mask the alpha was derived from
    pub mask: Mask,
    /// Background reference colors used for growth
    pub background: BackgroundEstimate,
    /// Admission tolerance derived for this call
    pub tolerance: f32,
}

/// Background remover with validated options
#[derive(Debug, Clone)]
pub struct Segmenter {
    options: Options,
}

impl Segmenter {
    /// # Errors
    ///
    /// Returns the first problem found by [`Options::validate`].
    pub fn new(options: Options) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Removes the background, or returns `image` unchanged if that fails.
    pub fn segment(&self, image: RgbaImage) -> RgbaImage {
        match self.try_segment(image) {
            Ok(segmentation) => segmentation.image,
            Err(failure) => {
                warn!(error = %failure.error(), "background removal skipped");
                failure.into_image()
            }
        }
    }

    /// Decodes `bytes`, then removes the background.
    ///
    /// # Errors
    ///
    /// Only decoding errors are returned; segmentation failures pass the
    /// decoded image through.
    pub fn segment_bytes<D>(&self, decoder: &D, bytes: &[u8]) -> Result<RgbaImage, DecodeError>
    where
        D: Decode + ?Sized,
    {
        let image = decoder.decode(bytes)?;
        Ok(self.segment(image))
    }

    /// Removes the background and reports the intermediate results.
    ///
    /// # Errors
    ///
    /// On failure the input image is handed back inside [`SegmentFailure`]
    /// untouched.
    pub fn try_segment(&self, image: RgbaImage) -> Result<Segmentation, SegmentFailure> {
        let _span = debug_span!(
            "segment",
            width = image.width(),
            height = image.height(),
            mode = %self.options.mode
        )
        .entered();

        let working = match self.prepare(&image) {
            Ok(working) => working,
            Err(error) => return Err(SegmentFailure::new(error, image)),
        };
        let target = working.as_ref().unwrap_or(&image);

        let (mask, background, tolerance) = match self.compute_mask(target, image.dimensions()) {
            Ok(result) => result,
            Err(error) => return Err(SegmentFailure::new(error, image)),
        };

        let output = Self::write_alpha(working, image, &mask)?;

        Ok(Segmentation {
            image: output,
            mask,
            background,
            tolerance,
        })
    }

    /// Writes the mask into the working image's alpha.
    ///
    /// A downscaled working copy is written on its own, so a failure can
    /// still hand back the original input. Without one the input is written
    /// in place, which checks the mask before changing any pixel.
    fn write_alpha(
        working: Option<RgbaImage>,
        image: RgbaImage,
        mask: &Mask,
    ) -> Result<RgbaImage, SegmentFailure> {
        let (mut output, fallback) = match working {
            Some(resized) => (resized, Some(image)),
            None => (image, None),
        };
        let written = output.apply_background_mask_mut(mask).map(|_| ());
        match written {
            Ok(()) => Ok(output),
            Err(error) => Err(SegmentFailure::new(error.into(), fallback.unwrap_or(output))),
        }
    }

    /// Downscaled copy of `image`, or `None` when it already fits.
    fn prepare(&self, image: &RgbaImage) -> Result<Option<RgbaImage>, SegmentError> {
        let (width, height) = image.dimensions();
        let (working_width, working_height) =
            working_dimensions(width, height, self.options.max_dimension);
        if (working_width, working_height) == (width, height) {
            return Ok(None);
        }

        let _span = debug_span!("resize", working_width, working_height).entered();
        let resized = InterAreaResize::new(working_width, working_height)?.resize(image)?;
        Ok(Some(resized))
    }

    /// Seeds mapped from input coordinates onto the working image.
    fn working_seeds(&self, input: (u32, u32), working: (u32, u32)) -> Vec<Seed> {
        let (input_width, input_height) = input;
        let (working_width, working_height) = working;
        let scale = |value: u32, from: u32, to: u32| {
            ((u64::from(value) * u64::from(to)) / u64::from(from)).min(u64::from(to - 1)) as u32
        };

        self.options
            .seed_points
            .iter()
            .filter_map(|seed| {
                if seed.x >= input_width || seed.y >= input_height {
                    warn!(x = seed.x, y = seed.y, "seed outside image skipped");
                    return None;
                }
                Some(Seed {
                    x: scale(seed.x, input_width, working_width),
                    y: scale(seed.y, input_height, working_height),
                    force: seed.force,
                })
            })
            .collect()
    }

    fn compute_mask(
        &self,
        image: &RgbaImage,
        input_dimensions: (u32, u32),
    ) -> Result<(Mask, BackgroundEstimate, f32), SegmentError> {
        let options = &self.options;
        let (width, height) = image.dimensions();
        if u64::from(width) * u64::from(height) < MIN_SEGMENT_PIXELS {
            return Err(SegmentError::ImageTooSmall { width, height });
        }

        let seeds = self.working_seeds(input_dimensions, (width, height));
        let stride = sampling_stride(width, height, options.tile_guess);

        let lab = {
            let _span = debug_span!("lab").entered();
            LabPlanes::from_image(image)
        };

        let background = {
            let _span = debug_span!("sample", stride).entered();
            BackgroundSampler::new(options.mode, stride, options.color_tol)
                .estimate(image, &lab, &seeds)?
        };
        let tolerance = derive_tolerance(options.color_tol, &background);
        debug!(
            distinct = background.is_distinct(),
            spread = background.spread(),
            tolerance,
            "background estimated"
        );

        let edges = {
            let _span = debug_span!("edge_guard").entered();
            EdgeGuard::from_image(image)
        };

        let region = {
            let _span = debug_span!("grow").entered();
            let mut grower =
                RegionGrower::new(&lab, &edges, &background, tolerance, options.grad_keep);
            if options.mode.uses_border() {
                for (x, y) in border_positions(width, height, stride) {
                    grower.admit(x, y, true);
                }
            }
            if options.mode.uses_seeds() {
                for seed in &seeds {
                    grower.admit(seed.x, seed.y, seed.force);
                }
            }
            grower.grow()
        };

        let mut mask = region_to_mask(&region);
        {
            let _span = debug_span!("feather", radius = options.feather).entered();
            mask.feather_mut(options.feather);
        }

        Ok((mask, background, tolerance))
    }
}

/// Extension trait removing the background of an RGBA image
pub trait RemoveBackground {
    /// Removes the background, returning the image unchanged if that fails.
    ///
    /// # Errors
    ///
    /// * `OptionsError` - the options are malformed
    ///
    /// # Examples
    ///
    /// ```
    /// use backdrop_cutout::{Options, RemoveBackground};
    /// use image::{Rgba, RgbaImage};
    ///
    /// let image = RgbaImage::from_pixel(32, 32, Rgba([0, 177, 64, 255]));
    /// let cut = image.remove_background(&Options::default())?;
    /// assert!(cut.pixels().all(|p| p[3] == 0));
    /// # Ok::<(), backdrop_cutout::OptionsError>(())
    /// ```
    fn remove_background(self, options: &Options) -> Result<Self, OptionsError>
    where
        Self: Sized;

    /// In-place variant. The image may be replaced by its downscaled
    /// working copy.
    ///
    /// # Errors
    ///
    /// * `OptionsError` - the options are malformed
    fn remove_background_mut(&mut self, options: &Options) -> Result<&mut Self, OptionsError>;
}

impl RemoveBackground for RgbaImage {
    fn remove_background(self, options: &Options) -> Result<Self, OptionsError> {
        let segmenter = Segmenter::new(options.clone())?;
        Ok(segmenter.segment(self))
    }

    fn remove_background_mut(&mut self, options: &Options) -> Result<&mut Self, OptionsError> {
        let segmenter = Segmenter::new(options.clone())?;
        let image = std::mem::take(self);
        *self = segmenter.segment(image);
        Ok(self)
    }
}
