//! sRGB to CIE L*a*b* conversion and perceptual distance.
//!
//! Conversion goes through `palette`: 8-bit sRGB is normalized, decoded to
//! linear RGB and converted to L*a*b* relative to the D65 white point.

use image::{Rgb, RgbaImage};
use palette::white_point::D65;
use palette::{FromColor, LinSrgb, Srgb};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

type PaletteLab = palette::Lab<D65, f32>;

/// A color in CIE L*a*b* (D65)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    pub const fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Euclidean distance to another color (CIE76 ΔE)
    #[inline]
    pub fn distance(&self, other: &Self) -> f32 {
        lab_distance(*self, *other)
    }
}

impl From<PaletteLab> for Lab {
    fn from(lab: PaletteLab) -> Self {
        Self::new(lab.l, lab.a, lab.b)
    }
}

impl From<Rgb<u8>> for Lab {
    fn from(Rgb([r, g, b]): Rgb<u8>) -> Self {
        to_lab(r, g, b)
    }
}

#[inline]
fn linear_channel(channel: u8) -> f32 {
    let srgb: Srgb<f32> = Srgb::new(channel, channel, channel).into_format();
    let linear: LinSrgb<f32> = srgb.into_linear();
    linear.red
}

#[inline]
fn linear_to_lab(red: f32, green: f32, blue: f32) -> Lab {
    PaletteLab::from_color(LinSrgb::new(red, green, blue)).into()
}

/// Converts gamma-corrected 8-bit sRGB to CIE L*a*b* (D65).
pub fn to_lab(r: u8, g: u8, b: u8) -> Lab {
    let srgb: Srgb<f32> = Srgb::new(r, g, b).into_format();
    PaletteLab::from_color(srgb).into()
}

/// Euclidean distance in (L, a, b)
#[inline]
pub fn lab_distance(p: Lab, q: Lab) -> f32 {
    let dl = p.l - q.l;
    let da = p.a - q.a;
    let db = p.b - q.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Per-pixel L*a*b* values stored as three parallel planes
///
/// Built once per segmentation call and read-only afterwards.
#[derive(Debug, Clone)]
pub struct LabPlanes {
    width: u32,
    height: u32,
    l: Vec<f32>,
    a: Vec<f32>,
    b: Vec<f32>,
}

impl LabPlanes {
    /// Converts every pixel of `image`. Alpha is ignored.
    pub fn from_image(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let linear: [f32; 256] = std::array::from_fn(|value| linear_channel(value as u8));
        let convert = |pixel: &image::Rgba<u8>| {
            let [r, g, b, _] = pixel.0;
            linear_to_lab(
                linear[usize::from(r)],
                linear[usize::from(g)],
                linear[usize::from(b)],
            )
        };

        #[cfg(feature = "rayon")]
        let colors: Vec<Lab> = image.par_pixels().map(convert).collect();
        #[cfg(not(feature = "rayon"))]
        let colors: Vec<Lab> = image.pixels().map(convert).collect();

        let mut planes = Self {
            width,
            height,
            l: Vec::with_capacity(colors.len()),
            a: Vec::with_capacity(colors.len()),
            b: Vec::with_capacity(colors.len()),
        };
        for color in colors {
            planes.l.push(color.l);
            planes.a.push(color.a);
            planes.b.push(color.b);
        }
        planes
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.l.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l.is_empty()
    }

    /// Color at a row-major pixel index
    #[inline]
    pub fn at_index(&self, index: usize) -> Lab {
        Lab::new(self.l[index], self.a[index], self.b[index])
    }

    /// Color at pixel coordinates
    #[inline]
    pub fn at(&self, x: u32, y: u32) -> Lab {
        self.at_index((y * self.width + x) as usize)
    }
}
