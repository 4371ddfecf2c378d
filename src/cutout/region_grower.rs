//! Breadth-first flood fill that labels connected background pixels.

use tracing::debug;

use crate::cutout::background_sampler::BackgroundEstimate;
use crate::cutout::color_model::LabPlanes;
use crate::cutout::edge_guard::EdgeGuard;

/// Floor applied to the user color tolerance
pub const MIN_TOLERANCE: f32 = 12.0;

/// Ceiling on the tolerance derived from the background spread
pub const MAX_ADAPTIVE_TOLERANCE: f32 = 45.0;

/// Share of the background spread adopted as tolerance
pub const SPREAD_TOLERANCE_FACTOR: f32 = 0.45;

/// Tolerance multiplier for forced frontier pixels
pub const FORCE_FACTOR: f32 = 1.35;

/// Edge pixels must match at least this closely (as a share of tolerance)
pub const EDGE_MATCH_FACTOR: f32 = 0.4;

/// Admission tolerance for one call.
///
/// Starts at `max(color_tol, 12)`. With two distinct references it widens
/// to 45% of their distance, capped at 45, so high-contrast patterns are
/// not split apart.
pub fn derive_tolerance(color_tol: f32, background: &BackgroundEstimate) -> f32 {
    let tolerance = color_tol.max(MIN_TOLERANCE);
    if background.is_distinct() {
        MAX_ADAPTIVE_TOLERANCE.min(tolerance.max(background.spread() * SPREAD_TOLERANCE_FACTOR))
    } else {
        tolerance
    }
}

/// Visited set of a finished fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    width: u32,
    height: u32,
    visited: Vec<bool>,
    count: usize,
}

impl Region {
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.visited[(y * self.width + x) as usize]
    }

    /// Number of background pixels
    pub const fn len(&self) -> usize {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Row-major visited flags
    pub fn as_slice(&self) -> &[bool] {
        &self.visited
    }
}

/// Region growing state for one call.
///
/// The queue and visited set are allocated at full image size up front.
/// A pixel enters the queue only when it is admitted, and it is admitted
/// at most once, so the queue never grows past `width * height`.
pub struct RegionGrower<'a> {
    lab: &'a LabPlanes,
    edges: &'a EdgeGuard,
    background: &'a BackgroundEstimate,
    tolerance: f32,
    grad_keep: f32,
    width: u32,
    height: u32,
    visited: Vec<bool>,
    queue: Vec<u32>,
    head: usize,
}

impl<'a> RegionGrower<'a> {
    pub fn new(
        lab: &'a LabPlanes,
        edges: &'a EdgeGuard,
        background: &'a BackgroundEstimate,
        tolerance: f32,
        grad_keep: f32,
    ) -> Self {
        let (width, height) = (lab.width(), lab.height());
        let len = lab.len();
        Self {
            lab,
            edges,
            background,
            tolerance,
            grad_keep,
            width,
            height,
            visited: vec![false; len],
            queue: Vec::with_capacity(len),
            head: 0,
        }
    }

    /// Tests a pixel and, when it passes, marks it and queues it.
    ///
    /// Returns whether the pixel is background after the call.
    pub fn admit(&mut self, x: u32, y: u32, force: bool) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.admit_index((y * self.width + x) as usize, force)
    }

    fn admit_index(&mut self, index: usize, force: bool) -> bool {
        if self.visited[index] {
            return true;
        }

        let distance = self.background.distance(self.lab.at_index(index));
        let threshold = if force {
            self.tolerance * FORCE_FACTOR
        } else {
            self.tolerance
        };
        if distance > threshold {
            return false;
        }
        if !force
            && self.edges.magnitude_at_index(index) > self.grad_keep
            && distance > self.tolerance * EDGE_MATCH_FACTOR
        {
            return false;
        }

        self.visited[index] = true;
        self.queue.push(index as u32);
        true
    }

    /// Expands from every admitted pixel over 4-connected neighbors until
    /// the frontier is empty.
    pub fn grow(mut self) -> Region {
        let width = self.width as usize;
        let height = self.height as usize;

        while self.head < self.queue.len() {
            let index = self.queue[self.head] as usize;
            self.head += 1;

            let (x, y) = (index % width, index / width);
            if x > 0 {
                self.admit_index(index - 1, false);
            }
            if x + 1 < width {
                self.admit_index(index + 1, false);
            }
            if y > 0 {
                self.admit_index(index - width, false);
            }
            if y + 1 < height {
                self.admit_index(index + width, false);
            }
        }

        let count = self.queue.len();
        debug!(
            visited = count,
            total = self.visited.len(),
            tolerance = self.tolerance,
            "region growth finished"
        );
        Region {
            width: self.width,
            height: self.height,
            visited: self.visited,
            count,
        }
    }
}
