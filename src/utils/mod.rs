//! Internal utility functions for backdrop-cutout.
//!
//! This module contains validation and numeric helpers shared by the pipeline stages.

use image::{GenericImageView, Primitive};
use imageproc::definitions::Clamp;

/// Clamps a floating-point value to the range of a primitive type.
///
/// The value is rounded to the nearest integer first, so averaging
/// stages do not drift downwards through truncation.
///
/// # Arguments
///
/// * `value` - The floating-point value to clamp
///
/// # Returns
///
/// The rounded and clamped value as the target primitive type
#[inline]
pub fn clamp_f32_to_primitive<T: Primitive + Clamp<f32>>(value: f32) -> T {
    T::clamp(value.round())
}

/// Converts a background-mask value to an 8-bit alpha value.
///
/// A mask of 1 is fully background and becomes fully transparent.
/// Mask values outside [0, 1] are clamped first.
#[inline]
pub fn mask_to_alpha(mask: f32) -> u8 {
    let mask = mask.clamp(0.0, 1.0);
    clamp_f32_to_primitive((1.0 - mask) * 255.0)
}

/// Whether an image has no pixels at all.
#[inline]
pub const fn is_empty_image(width: u32, height: u32) -> bool {
    width == 0 || height == 0
}

/// Whether two images can be walked pixel by pixel in lockstep.
#[inline]
pub fn dimensions_match<A, B>(first: &A, second: &B) -> bool
where
    A: GenericImageView,
    B: GenericImageView,
{
    first.dimensions() == second.dimensions()
}
