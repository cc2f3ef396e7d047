//! Flatness scanner: scores every footprint-sized window of a heightmap by
//! its mean gradient magnitude and picks the flattest water-free one.
//!
//! Windows are enumerated exhaustively in row-major order (z outer, x inner).
//! Scoring may run on the rayon pool; the reduction over scores is always
//! sequential so ties resolve to the first window in scan order.

use rayon::prelude::*;

use crate::core::{Error, Result};
use crate::mask::ObstructionMask;
use crate::math::{GridRect, RegionBounds};
use crate::terrain::ElevationMap;
use super::config::SiteConfig;

/// Per-cell gradient magnitude of a heightmap.
///
/// Central differences at interior cells, one-sided differences at the
/// borders, zero along an axis with a single cell.
#[derive(Clone, Debug)]
pub struct GradientField {
    width: usize,
    depth: usize,
    magnitude: Vec<f64>,
}

impl GradientField {
    pub fn compute(map: &ElevationMap) -> Self {
        let (width, depth) = map.dimensions();
        let mut magnitude = Vec::with_capacity(width * depth);
        for z in 0..depth {
            for x in 0..width {
                let gx = axis_difference(width, x, |i| map.get(i, z));
                let gz = axis_difference(depth, z, |i| map.get(x, i));
                magnitude.push((gx * gx + gz * gz).sqrt());
            }
        }
        Self { width, depth, magnitude }
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f64 {
        self.magnitude[z * self.width + x]
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    /// Mean magnitude over `rect`, summed in row-major order.
    pub fn mean_in(&self, rect: GridRect) -> f64 {
        if rect.is_empty() {
            return 0.0;
        }
        let mut sum = 0.0;
        for z in rect.z..rect.end_z() {
            let row = &self.magnitude[z * self.width + rect.x..z * self.width + rect.end_x()];
            sum += row.iter().sum::<f64>();
        }
        sum / (rect.width * rect.depth) as f64
    }
}

/// Finite difference of `h` along one axis of length `len` at index `i`.
fn axis_difference(len: usize, i: usize, h: impl Fn(usize) -> i32) -> f64 {
    if len < 2 {
        0.0
    } else if i == 0 {
        h(1) as f64 - h(0) as f64
    } else if i == len - 1 {
        h(i) as f64 - h(i - 1) as f64
    } else {
        (h(i + 1) as f64 - h(i - 1) as f64) / 2.0
    }
}

/// Why a candidate window cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// At least one water column lies inside the window.
    Water,
    /// Mean height falls outside the configured range.
    HeightRange,
}

/// A footprint-sized window with its flatness score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub rect: GridRect,
    /// Mean gradient magnitude; lower is flatter.
    pub score: f64,
    pub rejection: Option<Rejection>,
}

impl Candidate {
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Exhaustive windowed flatness scan.
#[derive(Clone, Debug)]
pub struct FlatnessScanner {
    width: usize,
    depth: usize,
    height_range: Option<[i32; 2]>,
    parallel: bool,
}

impl FlatnessScanner {
    pub fn new(width: usize, depth: usize) -> Self {
        Self { width, depth, height_range: None, parallel: false }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            width: config.footprint_width as usize,
            depth: config.footprint_depth as usize,
            height_range: config.height_range,
            parallel: config.parallel,
        }
    }

    pub fn with_height_range(mut self, range: Option<[i32; 2]>) -> Self {
        self.height_range = range;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn footprint(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    /// Number of windows that fit: `(A-W+1) x (B-D+1)`, or zero.
    pub fn candidate_count(&self, map: &ElevationMap) -> usize {
        let (w, d) = map.dimensions();
        if self.width == 0 || self.depth == 0 || self.width > w || self.depth > d {
            return 0;
        }
        (w - self.width + 1) * (d - self.depth + 1)
    }

    /// Score every window, in row-major order of their origin.
    pub fn candidates(&self, map: &ElevationMap, water: &ObstructionMask) -> Result<Vec<Candidate>> {
        if map.dimensions() != (water.width(), water.depth()) {
            return Err(Error::DataShape(format!(
                "heightmap is {}x{} but water mask is {}x{}",
                map.width(), map.depth(), water.width(), water.depth()
            )));
        }

        let count = self.candidate_count(map);
        if count == 0 {
            return Ok(Vec::new());
        }

        let field = GradientField::compute(map);
        let per_row = map.width() - self.width + 1;
        let evaluate = |i: usize| {
            let rect = GridRect::new(i % per_row, i / per_row, self.width, self.depth);
            self.evaluate(map, &field, water, rect)
        };

        let candidates: Vec<Candidate> = if self.parallel {
            (0..count).into_par_iter().map(evaluate).collect()
        } else {
            (0..count).map(evaluate).collect()
        };
        Ok(candidates)
    }

    fn evaluate(
        &self,
        map: &ElevationMap,
        field: &GradientField,
        water: &ObstructionMask,
        rect: GridRect,
    ) -> Candidate {
        let rejection = if water.any_in(rect) {
            Some(Rejection::Water)
        } else if let Some([min, max]) = self.height_range {
            let mean = map.mean_in(rect).unwrap_or(0.0);
            (mean < min as f64 || mean > max as f64).then_some(Rejection::HeightRange)
        } else {
            None
        };

        Candidate { rect, score: field.mean_in(rect), rejection }
    }

    /// Flattest valid window; ties go to the first in row-major order.
    ///
    /// Fails with `Error::NoSuitableArea` when nothing qualifies.
    pub fn select(
        &self,
        map: &ElevationMap,
        water: &ObstructionMask,
        bounds: &RegionBounds,
    ) -> Result<Candidate> {
        let candidates = self.candidates(map, water)?;

        let mut best: Option<Candidate> = None;
        for c in candidates.iter().filter(|c| c.is_valid()) {
            if best.is_none_or(|b| c.score < b.score) {
                best = Some(*c);
            }
        }

        if let Some(best) = best {
            log::debug!(
                "Flattest {}x{} window at ({}, {}) scores {:.4} ({} candidates)",
                self.width, self.depth, best.rect.x, best.rect.z, best.score, candidates.len()
            );
            return Ok(best);
        }

        let reason = if candidates.is_empty() {
            format!("footprint does not fit in a {}x{} area", map.width(), map.depth())
        } else if candidates.iter().all(|c| c.rejection == Some(Rejection::Water)) {
            format!("all {} candidate windows contain water", candidates.len())
        } else {
            let [min, max] = self.height_range.unwrap_or([i32::MIN, i32::MAX]);
            format!("no water-free window has a mean height within [{}, {}]", min, max)
        };
        Err(Error::NoSuitableArea {
            bounds: *bounds,
            width: self.width as u32,
            depth: self.depth as u32,
            reason,
        })
    }
}
