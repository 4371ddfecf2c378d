//! Per-call configuration for background removal.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Where region growing starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Grow from the image border only
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "auto"))]
    Auto,
    /// Grow from user seed points only
    #[cfg_attr(feature = "serde", serde(rename = "seed"))]
    Seed,
    /// Grow from both, used to refine an automatic pass
    #[cfg_attr(feature = "serde", serde(rename = "auto+seed"))]
    AutoAndSeed,
}

impl Mode {
    /// Whether the border is sampled and used as a growth frontier
    pub const fn uses_border(self) -> bool {
        matches!(self, Self::Auto | Self::AutoAndSeed)
    }

    /// Whether seed points are sampled and used as a growth frontier
    pub const fn uses_seeds(self) -> bool {
        matches!(self, Self::Seed | Self::AutoAndSeed)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Seed => "seed",
            Self::AutoAndSeed => "auto+seed",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "seed" => Ok(Self::Seed),
            "auto+seed" => Ok(Self::AutoAndSeed),
            other => Err(OptionsError::UnknownMode(other.to_string())),
        }
    }
}

/// A user-picked pixel that should be background
///
/// Coordinates are in the input image. A forced seed is admitted with a
/// wider tolerance and biases background estimation towards its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Seed {
    pub x: u32,
    pub y: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub force: bool,
}

impl Seed {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y, force: false }
    }

    pub const fn forced(x: u32, y: u32) -> Self {
        Self { x, y, force: true }
    }
}

/// Options for one segmentation call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Options {
    /// Base ΔE tolerance for admitting a pixel as background
    pub color_tol: f32,
    /// Expected backdrop tile size in pixels, sets the border sampling stride
    pub tile_guess: u32,
    /// Sobel magnitude above which a pixel counts as an edge
    pub grad_keep: f32,
    /// Box-blur radius applied to the mask, 0 disables feathering
    pub feather: u32,
    pub seed_points: Vec<Seed>,
    pub mode: Mode,
    /// Longest side of the working image, larger inputs are downscaled
    pub max_dimension: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            color_tol: 10.0,
            tile_guess: 16,
            grad_keep: 10.0,
            feather: 2,
            seed_points: Vec::new(),
            mode: Mode::Auto,
            max_dimension: 512,
        }
    }
}

impl Options {
    pub fn with_color_tol(mut self, color_tol: f32) -> Self {
        self.color_tol = color_tol;
        self
    }

    pub fn with_tile_guess(mut self, tile_guess: u32) -> Self {
        self.tile_guess = tile_guess;
        self
    }

    pub fn with_grad_keep(mut self, grad_keep: f32) -> Self {
        self.grad_keep = grad_keep;
        self
    }

    pub fn with_feather(mut self, feather: u32) -> Self {
        self.feather = feather;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed_points.push(seed);
        self
    }

    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = Seed>) -> Self {
        self.seed_points.extend(seeds);
        self
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Checks the options for values no image could make sense of.
    ///
    /// # Errors
    ///
    /// * `OptionsError::InvalidColorTolerance` - negative or non-finite tolerance
    /// * `OptionsError::InvalidEdgeThreshold` - non-finite edge threshold
    /// * `OptionsError::ZeroMaxDimension` - zero working dimension
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !self.color_tol.is_finite() || self.color_tol < 0.0 {
            return Err(OptionsError::InvalidColorTolerance(self.color_tol));
        }
        if !self.grad_keep.is_finite() {
            return Err(OptionsError::InvalidEdgeThreshold(self.grad_keep));
        }
        if self.max_dimension == 0 {
            return Err(OptionsError::ZeroMaxDimension);
        }
        Ok(())
    }

    /// Parses and validates options from a JSON document.
    ///
    /// Field names follow the camelCase form (`colorTol`, `seedPoints`, ...)
    /// and missing fields take their defaults.
    ///
    /// ```
    /// use backdrop_cutout::{Mode, Options};
    ///
    /// let options = Options::from_json_str(r#"{ "colorTol": 18, "mode": "auto+seed" }"#)?;
    /// assert_eq!(options.mode, Mode::AutoAndSeed);
    /// assert_eq!(options.feather, 2);
    /// # Ok::<(), backdrop_cutout::OptionsError>(())
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        let options: Self =
            serde_json::from_str(json).map_err(|err| OptionsError::Parse(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}
