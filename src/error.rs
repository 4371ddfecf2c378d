use image::RgbaImage;
use thiserror::Error;

/// Error type for malformed segmentation options
///
/// These indicate a bug in the calling code rather than adverse image
/// content, so they are reported instead of being absorbed by the
/// best-effort pass-through of the segmenter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    /// Color tolerance is negative, NaN or infinite
    #[error("Color tolerance must be a finite, non-negative number, got {0}")]
    InvalidColorTolerance(f32),

    /// Edge protection threshold is NaN or infinite
    #[error("Edge protection threshold must be finite, got {0}")]
    InvalidEdgeThreshold(f32),

    /// Maximum working dimension is zero
    #[error("Maximum working dimension must be greater than zero")]
    ZeroMaxDimension,

    /// A mode string did not name a known segmentation mode
    #[error("Unknown segmentation mode {0:?}, expected \"auto\", \"seed\" or \"auto+seed\"")]
    UnknownMode(String),

    /// A JSON configuration document could not be parsed
    #[cfg(feature = "serde")]
    #[error("Invalid options document: {0}")]
    Parse(String),
}

/// Error type for turning encoded bytes into a pixel buffer
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes were empty
    #[error("Cannot decode an empty byte buffer")]
    Empty,

    /// The underlying codec rejected the data
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Error type for producing the working-resolution image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResizeError {
    /// The source image has a zero dimension
    #[error("Source image is empty: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// The requested target has a zero dimension
    #[error("Invalid target dimensions: {width}x{height}")]
    InvalidTargetDimensions { width: u32, height: u32 },

    /// Area resampling only reduces an image
    #[error("Upscaling from {src_width}x{src_height} to {target_width}x{target_height} is not supported")]
    UpscalingNotSupported {
        src_width: u32,
        src_height: u32,
        target_width: u32,
        target_height: u32,
    },
}

/// Error type for alpha write-back
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphaMaskError {
    /// Image and mask dimensions do not match
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Internal failures of a segmentation call
///
/// All of these are recovered by [`Segmenter::segment`](crate::Segmenter::segment),
/// which hands back the input image unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    /// The image has fewer than two pixels, so no backdrop can be told apart
    #[error("Image too small to segment: {width}x{height}")]
    ImageTooSmall { width: u32, height: u32 },

    /// Sampling produced no usable background color
    #[error("No background color could be estimated")]
    NoBackgroundEstimate,

    /// The working-resolution image could not be produced
    #[error("Failed to prepare working image: {0}")]
    Resize(#[from] ResizeError),

    /// The computed mask could not be written back as alpha
    #[error("Failed to write alpha channel: {0}")]
    AlphaMask(#[from] AlphaMaskError),
}

/// A failed segmentation call, carrying the untouched input image
///
/// Returned by [`Segmenter::try_segment`](crate::Segmenter::try_segment).
/// The input is moved back to the caller so passing it through costs no copy.
#[derive(Debug, Error)]
#[error("Background removal failed, input returned unchanged")]
pub struct SegmentFailure {
    #[source]
    error: SegmentError,
    image: RgbaImage,
}

impl SegmentFailure {
    pub(crate) const fn new(error: SegmentError, image: RgbaImage) -> Self {
        Self { error, image }
    }

    /// The reason the call failed
    pub const fn error(&self) -> &SegmentError {
        &self.error
    }

    /// Recovers the input image, unchanged
    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}
