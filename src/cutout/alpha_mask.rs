use image::{GenericImageView, Luma, Rgba, RgbaImage};
use imageproc::definitions::Image;
use imageproc::map::map_colors2;

use crate::error::AlphaMaskError;
use crate::utils::{dimensions_match, mask_to_alpha};

/// Trait for writing a background mask into the alpha channel of an RGBA image
///
/// Mask values are background weights: 1.0 becomes alpha 0 (transparent) and
/// 0.0 becomes alpha 255. Each alpha is `round((1 - mask) * 255)` with the
/// mask clamped to [0, 1]. Color channels are left untouched.
pub trait ApplyBackgroundMask {
    /// Replaces the alpha channel, consuming the image
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask dimensions don't match
    ///
    /// # Examples
    ///
    /// ```
    /// use backdrop_cutout::ApplyBackgroundMask;
    /// use image::{ImageBuffer, Luma, Rgba, RgbaImage};
    ///
    /// let image = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
    /// let mask = ImageBuffer::from_raw(2, 1, vec![1.0f32, 0.0]).unwrap();
    ///
    /// let cut = image.apply_background_mask(&mask)?;
    /// assert_eq!(cut.get_pixel(0, 0), &Rgba([10, 20, 30, 0]));
    /// assert_eq!(cut.get_pixel(1, 0), &Rgba([10, 20, 30, 255]));
    /// # Ok::<(), backdrop_cutout::AlphaMaskError>(())
    /// ```
    fn apply_background_mask(self, mask: &Image<Luma<f32>>) -> Result<Self, AlphaMaskError>
    where
        Self: Sized;

    /// Replaces the alpha channel in-place
    ///
    /// # Errors
    ///
    /// * `AlphaMaskError::DimensionMismatch` - When image and mask dimensions don't match
    fn apply_background_mask_mut(
        &mut self,
        mask: &Image<Luma<f32>>,
    ) -> Result<&mut Self, AlphaMaskError>;
}

impl ApplyBackgroundMask for RgbaImage {
    fn apply_background_mask(self, mask: &Image<Luma<f32>>) -> Result<Self, AlphaMaskError> {
        validate_dimensions(&self, mask)?;

        let result = map_colors2(&self, mask, |Rgba([red, green, blue, _]), Luma([weight])| {
            Rgba([red, green, blue, mask_to_alpha(weight)])
        });

        Ok(result)
    }

    fn apply_background_mask_mut(
        &mut self,
        mask: &Image<Luma<f32>>,
    ) -> Result<&mut Self, AlphaMaskError> {
        validate_dimensions(self, mask)?;

        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, Luma([weight]))| {
                pixel[3] = mask_to_alpha(*weight);
            });

        Ok(self)
    }
}

#[inline]
fn validate_dimensions<I1, I2>(image: &I1, mask: &I2) -> Result<(), AlphaMaskError>
where
    I1: GenericImageView,
    I2: GenericImageView,
{
    if dimensions_match(image, mask) {
        Ok(())
    } else {
        Err(AlphaMaskError::DimensionMismatch {
            expected: image.dimensions(),
            actual: mask.dimensions(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgba_image;
    use image::ImageBuffer;

    fn test_mask() -> Image<Luma<f32>> {
        ImageBuffer::from_raw(2, 2, vec![1.0, 0.5, 0.25, 0.0]).unwrap()
    }

    #[test]
    fn test_validate_dimensions() {
        let image = RgbaImage::new(10, 10);
        let mask: Image<Luma<f32>> = ImageBuffer::new(10, 10);
        assert!(validate_dimensions(&image, &mask).is_ok());

        let mask_wrong_size: Image<Luma<f32>> = ImageBuffer::new(5, 5);
        assert_eq!(
            validate_dimensions(&image, &mask_wrong_size),
            Err(AlphaMaskError::DimensionMismatch {
                expected: (10, 10),
                actual: (5, 5)
            })
        );
    }

    #[test]
    fn apply_background_mask_replaces_alpha_only() {
        let result = create_test_rgba_image()
            .apply_background_mask(&test_mask())
            .unwrap();

        assert_eq!(result.get_pixel(0, 0), &Rgba([200, 150, 100, 0]));
        assert_eq!(result.get_pixel(1, 0), &Rgba([100, 200, 150, 128]));
        assert_eq!(result.get_pixel(0, 1), &Rgba([150, 100, 200, 191]));
        assert_eq!(result.get_pixel(1, 1), &Rgba([50, 75, 25, 255]));
    }

    #[test]
    fn apply_background_mask_mut_matches_consuming_variant() {
        let mut in_place = create_test_rgba_image();
        in_place.apply_background_mask_mut(&test_mask()).unwrap();

        let consumed = create_test_rgba_image()
            .apply_background_mask(&test_mask())
            .unwrap();
        assert_eq!(in_place, consumed);
    }

    #[test]
    fn apply_background_mask_mut_with_wrong_size_leaves_image_untouched() {
        let mut image = create_test_rgba_image();
        let mask: Image<Luma<f32>> = ImageBuffer::new(3, 2);

        assert!(image.apply_background_mask_mut(&mask).is_err());
        assert_eq!(image, create_test_rgba_image());
    }
}
