//! Decoding encoded image bytes into an RGBA pixel buffer.

use image::RgbaImage;
use tracing::debug;

use crate::error::DecodeError;

/// Turns encoded bytes into an RGBA8 pixel buffer
///
/// This is the only I/O boundary of the engine. Hosts that already hold a
/// decoded buffer skip it entirely; hosts with their own codecs implement it.
pub trait Decode {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, DecodeError>;
}

/// [`Decode`] backed by `image::load_from_memory`
///
/// Recognizes whatever formats the `image` crate was built with
/// (enable the `png` feature for PNG).
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl Decode for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let image = image::load_from_memory(bytes)?.into_rgba8();
        debug!(width = image.width(), height = image.height(), "decoded image");
        Ok(image)
    }
}

impl<F> Decode for F
where
    F: Fn(&[u8]) -> Result<RgbaImage, DecodeError>,
{
    fn decode(&self, bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
        self(bytes)
    }
}
