//! Background color estimation from border and seed samples.
//!
//! Samples are clustered greedily in L*a*b* and the two best supported
//! clusters become the background references. Two references cover both
//! solid backdrops and two-tone patterns such as checkerboards.

use image::{Rgb, RgbaImage};
use itertools::Itertools;
use tracing::debug;

use crate::cutout::color_model::{lab_distance, Lab, LabPlanes};
use crate::cutout::options::{Mode, Seed};
use crate::error::SegmentError;

/// Extra samples contributed by each forced seed
pub const FORCED_SEED_WEIGHT: usize = 4;

/// Smallest merge distance for clustering, in ΔE
pub const MIN_MERGE_DISTANCE: f32 = 4.0;

/// Fraction of the color tolerance used as the merge distance
pub const MERGE_TOLERANCE_FACTOR: f32 = 0.6;

/// Synthetic seed clusters closer than this to an existing reference are dropped
pub const SEED_DEDUP_DISTANCE: f32 = 2.0;

/// Share of border samples a cluster needs before it counts as background
pub const MIN_CLUSTER_SHARE: f32 = 0.05;

/// Stride used to walk the border, in pixels.
///
/// `max(1, floor(min(W, H) / max(8, tile_guess)))`
pub fn sampling_stride(width: u32, height: u32, tile_guess: u32) -> u32 {
    (width.min(height) / tile_guess.max(8)).max(1)
}

/// Border pixels visited at `stride`, plus the four corners.
///
/// Positions are unique and come in a fixed order: top and bottom rows,
/// then left and right columns, then corners.
pub fn border_positions(width: u32, height: u32, stride: u32) -> Vec<(u32, u32)> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let (right, bottom) = (width - 1, height - 1);
    let stride = stride.max(1) as usize;

    let rows = (0..width)
        .step_by(stride)
        .flat_map(|x| [(x, 0), (x, bottom)]);
    let columns = (0..height)
        .step_by(stride)
        .flat_map(|y| [(0, y), (right, y)]);
    let corners = [(0, 0), (right, 0), (0, bottom), (right, bottom)];

    rows.chain(columns).chain(corners).unique().collect()
}

/// A color read from one pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub rgb: Rgb<u8>,
    pub lab: Lab,
    /// Contributed by a forced seed
    pub seeded: bool,
}

impl Sample {
    fn read(image: &RgbaImage, lab: &LabPlanes, x: u32, y: u32, seeded: bool) -> Self {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        Self {
            rgb: Rgb([r, g, b]),
            lab: lab.at(x, y),
            seeded,
        }
    }
}

/// Running mean of the samples merged into it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    lab: Lab,
    rgb: [f32; 3],
    count: u32,
    seeded: bool,
}

impl Cluster {
    pub fn new(sample: &Sample) -> Self {
        let Rgb([r, g, b]) = sample.rgb;
        Self {
            lab: sample.lab,
            rgb: [f32::from(r), f32::from(g), f32::from(b)],
            count: 1,
            seeded: sample.seeded,
        }
    }

    /// Folds a sample into the running means.
    pub fn merge(&mut self, sample: &Sample) {
        self.count += 1;
        let n = self.count as f32;
        self.lab.l += (sample.lab.l - self.lab.l) / n;
        self.lab.a += (sample.lab.a - self.lab.a) / n;
        self.lab.b += (sample.lab.b - self.lab.b) / n;
        for (mean, channel) in self.rgb.iter_mut().zip(sample.rgb.0) {
            *mean += (f32::from(channel) - *mean) / n;
        }
        self.seeded |= sample.seeded;
    }

    pub const fn lab(&self) -> Lab {
        self.lab
    }

    pub fn rgb(&self) -> Rgb<u8> {
        Rgb(self.rgb.map(|channel| channel.round().clamp(0.0, 255.0) as u8))
    }

    pub const fn count(&self) -> u32 {
        self.count
    }

    pub const fn is_seeded(&self) -> bool {
        self.seeded
    }
}

/// Greedy single-pass clustering.
///
/// Each sample joins the nearest cluster when closer than `merge_distance`,
/// otherwise it starts a new one. The result is sorted by sample count,
/// largest first; ties keep creation order.
pub fn cluster_samples(samples: &[Sample], merge_distance: f32) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for sample in samples {
        let nearest = clusters
            .iter()
            .enumerate()
            .map(|(index, cluster)| (lab_distance(cluster.lab, sample.lab), index))
            .min_by(|(a, _), (b, _)| a.total_cmp(b));
        match nearest {
            Some((distance, index)) if distance < merge_distance => clusters[index].merge(sample),
            _ => clusters.push(Cluster::new(sample)),
        }
    }
    clusters.sort_by(|a, b| b.count.cmp(&a.count));
    clusters
}

/// The pair of background reference colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundEstimate {
    references: [Cluster; 2],
    distinct: bool,
}

impl BackgroundEstimate {
    /// Builds the pair from one or two clusters, duplicating a single one.
    fn from_clusters(clusters: &[Cluster]) -> Option<Self> {
        match clusters {
            [] => None,
            [only] => Some(Self {
                references: [*only, *only],
                distinct: false,
            }),
            [first, second, ..] => Some(Self {
                references: [*first, *second],
                distinct: true,
            }),
        }
    }

    pub const fn references(&self) -> &[Cluster; 2] {
        &self.references
    }

    /// Reference colors in L*a*b*
    pub const fn labs(&self) -> [Lab; 2] {
        [self.references[0].lab, self.references[1].lab]
    }

    /// Reference colors in sRGB
    pub fn colors(&self) -> [Rgb<u8>; 2] {
        [self.references[0].rgb(), self.references[1].rgb()]
    }

    /// Whether the two references come from different clusters
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// Distance from `color` to the nearest reference
    #[inline]
    pub fn distance(&self, color: Lab) -> f32 {
        let [first, second] = self.labs();
        lab_distance(color, first).min(lab_distance(color, second))
    }

    /// Distance between the two references
    pub fn spread(&self) -> f32 {
        let [first, second] = self.labs();
        lab_distance(first, second)
    }
}

/// Collects background evidence and reduces it to two reference colors
#[derive(Debug, Clone, Copy)]
pub struct BackgroundSampler {
    pub mode: Mode,
    pub stride: u32,
    pub color_tol: f32,
}

impl BackgroundSampler {
    pub const fn new(mode: Mode, stride: u32, color_tol: f32) -> Self {
        Self {
            mode,
            stride,
            color_tol,
        }
    }

    pub fn merge_distance(&self) -> f32 {
        MIN_MERGE_DISTANCE.max(self.color_tol * MERGE_TOLERANCE_FACTOR)
    }

    /// Estimates the background colors.
    ///
    /// `seeds` must already lie inside `image`.
    ///
    /// # Errors
    ///
    /// * `SegmentError::NoBackgroundEstimate` - no usable cluster and no seed to fall back on
    pub fn estimate(
        &self,
        image: &RgbaImage,
        lab: &LabPlanes,
        seeds: &[Seed],
    ) -> Result<BackgroundEstimate, SegmentError> {
        let (width, height) = image.dimensions();
        let seeds: &[Seed] = if self.mode.uses_seeds() { seeds } else { &[] };

        let border: Vec<Sample> = if self.mode.uses_border() {
            border_positions(width, height, self.stride)
                .into_iter()
                .map(|(x, y)| Sample::read(image, lab, x, y, false))
                .collect()
        } else {
            Vec::new()
        };
        let min_support = ((border.len() as f32 * MIN_CLUSTER_SHARE).ceil() as u32).max(2);

        let forced = seeds.iter().filter(|seed| seed.force).flat_map(|seed| {
            itertools::repeat_n(
                Sample::read(image, lab, seed.x, seed.y, true),
                FORCED_SEED_WEIGHT,
            )
        });
        let samples: Vec<Sample> = border.iter().copied().chain(forced).collect();

        let clusters = cluster_samples(&samples, self.merge_distance());
        let mut references: Vec<Cluster> = clusters
            .iter()
            .filter(|cluster| cluster.seeded || cluster.count >= min_support)
            .take(2)
            .copied()
            .collect();

        debug!(
            samples = samples.len(),
            clusters = clusters.len(),
            usable = references.len(),
            min_support,
            "clustered background samples"
        );

        for seed in seeds {
            if references.len() >= 2 {
                break;
            }
            let sample = Sample::read(image, lab, seed.x, seed.y, true);
            let duplicate = references
                .iter()
                .any(|cluster| lab_distance(cluster.lab, sample.lab) <= SEED_DEDUP_DISTANCE);
            if !duplicate {
                references.push(Cluster::new(&sample));
            }
        }

        BackgroundEstimate::from_clusters(&references).ok_or(SegmentError::NoBackgroundEstimate)
    }
}
