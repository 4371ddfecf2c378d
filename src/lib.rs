//! Background segmentation and alpha matting for product photos.
//!
//! The engine estimates the backdrop colors from the image border (and/or
//! user seed points), grows the background region across similar, low-gradient
//! pixels and writes a feathered alpha channel. See [`Segmenter`].

mod cutout;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use cutout::alpha_mask::ApplyBackgroundMask;
pub use cutout::background_sampler::{
    border_positions, cluster_samples, sampling_stride, BackgroundEstimate, BackgroundSampler,
    Cluster, Sample, FORCED_SEED_WEIGHT, MERGE_TOLERANCE_FACTOR, MIN_CLUSTER_SHARE,
    MIN_MERGE_DISTANCE, SEED_DEDUP_DISTANCE,
};
pub use cutout::color_model::{lab_distance, to_lab, Lab, LabPlanes};
pub use cutout::decode::{Decode, ImageDecoder};
pub use cutout::edge_guard::{gradient_map, luminance_map, EdgeGuard};
pub use cutout::inter_area::{working_dimensions, InterAreaResize, InterAreaResizeExt};
pub use cutout::mask_refiner::{region_to_mask, Feather, Mask};
pub use cutout::options::{Mode, Options, Seed};
pub use cutout::region_grower::{
    derive_tolerance, Region, RegionGrower, EDGE_MATCH_FACTOR, FORCE_FACTOR,
    MAX_ADAPTIVE_TOLERANCE, MIN_TOLERANCE, SPREAD_TOLERANCE_FACTOR,
};
pub use cutout::segmenter::{RemoveBackground, Segmentation, Segmenter, MIN_SEGMENT_PIXELS};
pub use error::{
    AlphaMaskError, DecodeError, OptionsError, ResizeError, SegmentError, SegmentFailure,
};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
