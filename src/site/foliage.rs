//! Foliage smoother: suppresses vertical obstructions (trunks, canopies)
//! by replacing local height outliers with their neighborhood median.
//!
//! Genuine slopes do not produce sharp local outliers and pass through
//! unchanged. A neighborhood with zero spread never flags anything.

use rayon::prelude::*;

use crate::math::{GridRect, RegionBounds};
use crate::terrain::ElevationMap;
use crate::world::EditOp;
use super::config::SiteConfig;

/// Median and population standard deviation of a neighborhood
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NeighborhoodStats {
    pub median: f64,
    pub std_dev: f64,
}

/// Output of a smoothing pass.
#[derive(Clone, Debug)]
pub struct SmoothedTerrain {
    /// Input grid with outliers inside `region` replaced by their median
    pub corrected: ElevationMap,
    /// Cells that were examined
    pub region: GridRect,
    /// Number of cells replaced
    pub outliers: usize,
}

/// Local outlier rejection over a square window.
#[derive(Clone, Debug)]
pub struct FoliageSmoother {
    window: usize,
    sigma: f64,
    margin: usize,
    clear_height: i32,
    parallel: bool,
}

impl Default for FoliageSmoother {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

impl FoliageSmoother {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            window: config.smoothing_window as usize,
            sigma: config.outlier_sigma,
            margin: config.smoothing_margin as usize,
            clear_height: config.clear_height,
            parallel: config.parallel,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Footprint grown by the smoothing margin, clipped to the grid
    pub fn region_for(&self, footprint: GridRect, map: &ElevationMap) -> GridRect {
        footprint.expanded(self.margin, map.width(), map.depth())
    }

    /// Statistics of the window centred on (x, z), clipped at the grid edges.
    pub fn neighborhood_stats(&self, map: &ElevationMap, x: usize, z: usize) -> NeighborhoodStats {
        let half = self.window / 2;
        let rect = GridRect::new(x.saturating_sub(half), z.saturating_sub(half), 0, 0);
        let rect = GridRect::new(
            rect.x,
            rect.z,
            (x + half + 1).min(map.width()) - rect.x,
            (z + half + 1).min(map.depth()) - rect.z,
        );

        let mut values: Vec<i32> = rect.cells().map(|(cx, cz)| map.get(cx, cz)).collect();
        values.sort_unstable();

        let n = values.len();
        let median = if n % 2 == 1 {
            values[n / 2] as f64
        } else {
            (values[n / 2 - 1] as f64 + values[n / 2] as f64) / 2.0
        };

        let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
        let variance = values
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;

        NeighborhoodStats { median, std_dev: variance.sqrt() }
    }

    /// Corrected height of one cell, or `None` if it is not an outlier.
    pub fn correction(&self, map: &ElevationMap, x: usize, z: usize) -> Option<i32> {
        let stats = self.neighborhood_stats(map, x, z);
        let h = map.get(x, z) as f64;
        if (h - stats.median).abs() > self.sigma * stats.std_dev {
            Some(stats.median.round() as i32)
        } else {
            None
        }
    }

    /// Smooth every cell of `region`. Neighborhoods read the unmodified input.
    pub fn smooth(&self, map: &ElevationMap, region: GridRect) -> SmoothedTerrain {
        let cells: Vec<(usize, usize)> = region.cells().collect();
        let corrections: Vec<Option<i32>> = if self.parallel {
            cells.par_iter().map(|&(x, z)| self.correction(map, x, z)).collect()
        } else {
            cells.iter().map(|&(x, z)| self.correction(map, x, z)).collect()
        };

        let outliers = corrections.iter().filter(|c| c.is_some()).count();
        let corrected = map.with_cells(region, |x, z, h| {
            corrections[(z - region.z) * region.width + (x - region.x)].unwrap_or(h)
        });

        log::debug!(
            "Smoothed {}x{} cells at ({}, {}): {} outliers",
            region.width, region.depth, region.x, region.z, outliers
        );
        SmoothedTerrain { corrected, region, outliers }
    }

    /// Clear instructions for every column in `region` standing above its
    /// corrected height: `(corrected, corrected + clear_height]`.
    pub fn clear_ops(
        &self,
        original: &ElevationMap,
        corrected: &ElevationMap,
        region: GridRect,
        bounds: &RegionBounds,
    ) -> Vec<EditOp> {
        region
            .cells()
            .filter(|&(x, z)| original.get(x, z) > corrected.get(x, z))
            .map(|(x, z)| {
                let world = bounds.to_world(x, z);
                let base = corrected.get(x, z);
                let top = base.saturating_add(self.clear_height);
                if original.get(x, z) > top {
                    log::warn!(
                        "Obstruction at ({}, {}) reaches {}, above the clear span ({}, {}]",
                        world.x, world.y, original.get(x, z), base, top
                    );
                }
                EditOp::ClearColumn {
                    x: world.x,
                    z: world.y,
                    from_exclusive: base,
                    to_inclusive: top,
                }
            })
            .collect()
    }

    /// Heights the world has once the clears in `region` are applied.
    ///
    /// Clearing only ever lowers a column, so upward corrections (pits) keep
    /// their original height. A column reaching above the clear span keeps
    /// its top as well.
    pub fn working_elevation(
        &self,
        original: &ElevationMap,
        corrected: &ElevationMap,
        region: GridRect,
    ) -> ElevationMap {
        original.with_cells(region, |x, z, h| {
            let base = corrected.get(x, z);
            if h > base && h <= base.saturating_add(self.clear_height) {
                base
            } else {
                h
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IVec2, UVec2};

    fn smoother() -> FoliageSmoother {
        FoliageSmoother::default().with_parallel(false)
    }

    #[test]
    fn test_single_spike_replaced_by_median() {
        let map = ElevationMap::from_fn(9, 9, |x, z| if (x, z) == (4, 4) { 74 } else { 64 });
        let result = smoother().smooth(&map, map.rect());
        assert_eq!(result.corrected.get(4, 4), 64);
        assert_eq!(result.outliers, 1);
        assert_eq!(result.corrected, ElevationMap::filled(9, 9, 64));
    }

    #[test]
    fn test_zero_variance_flags_nothing() {
        let map = ElevationMap::filled(10, 10, 80);
        let stats = smoother().neighborhood_stats(&map, 5, 5);
        assert_eq!(stats, NeighborhoodStats { median: 80.0, std_dev: 0.0 });
        let result = smoother().smooth(&map, map.rect());
        assert_eq!(result.outliers, 0);
        assert_eq!(result.corrected, map);
    }

    #[test]
    fn test_slope_left_intact() {
        let map = ElevationMap::from_fn(12, 12, |x, z| (60 + x + z) as i32);
        let result = smoother().smooth(&map, map.rect());
        assert_eq!(result.outliers, 0);
        assert_eq!(result.corrected, map);
    }

    #[test]
    fn test_neighborhood_clipped_at_edges() {
        let map = ElevationMap::from_fn(5, 5, |x, z| (x + 5 * z) as i32);
        let stats = smoother().neighborhood_stats(&map, 0, 0);
        // 4x4 corner block: values {0..3, 5..8, 10..13, 15..18}, median (8 + 10) / 2
        assert_eq!(stats.median, 9.0);
    }

    #[test]
    fn test_region_limits_changes() {
        let map = ElevationMap::from_fn(20, 20, |x, z| {
            if (x, z) == (3, 3) || (x, z) == (16, 16) { 75 } else { 64 }
        });
        let result = smoother().smooth(&map, GridRect::new(0, 0, 8, 8));
        assert_eq!(result.corrected.get(3, 3), 64);
        assert_eq!(result.corrected.get(16, 16), 75);
    }

    #[test]
    fn test_region_for_adds_margin() {
        let map = ElevationMap::filled(30, 30, 0);
        let region = smoother().region_for(GridRect::new(10, 2, 6, 6), &map);
        assert_eq!(region, GridRect::new(7, 0, 12, 11));
    }

    #[test]
    fn test_clear_ops_span() {
        let bounds = RegionBounds::new(IVec2::new(100, 50), UVec2::new(9, 9));
        let map = ElevationMap::from_fn(9, 9, |x, z| if (x, z) == (4, 4) { 74 } else { 64 });
        let s = smoother();
        let result = s.smooth(&map, map.rect());
        let ops = s.clear_ops(&map, &result.corrected, result.region, &bounds);
        assert_eq!(
            ops,
            vec![EditOp::ClearColumn { x: 104, z: 54, from_exclusive: 64, to_inclusive: 84 }]
        );
    }

    #[test]
    fn test_pit_not_raised_in_working_elevation() {
        let map = ElevationMap::from_fn(9, 9, |x, z| if (x, z) == (4, 4) { 50 } else { 64 });
        let s = smoother();
        let result = s.smooth(&map, map.rect());
        assert_eq!(result.corrected.get(4, 4), 64);
        assert!(s.clear_ops(&map, &result.corrected, result.region, &RegionBounds::new(IVec2::ZERO, UVec2::new(9, 9))).is_empty());

        let working = s.working_elevation(&map, &result.corrected, result.region);
        assert_eq!(working.get(4, 4), 50);
    }

    #[test]
    fn test_column_taller_than_clear_span_keeps_top() {
        let bounds = RegionBounds::new(IVec2::ZERO, UVec2::new(9, 9));
        let map = ElevationMap::from_fn(9, 9, |x, z| match (x, z) {
            (4, 4) => 100,
            (2, 2) => 80,
            _ => 64,
        });
        let s = smoother();
        let result = s.smooth(&map, map.rect());
        assert_eq!(result.corrected.get(4, 4), 64);
        assert_eq!(result.corrected.get(2, 2), 64);

        let ops = s.clear_ops(&map, &result.corrected, result.region, &bounds);
        let working = s.working_elevation(&map, &result.corrected, result.region);
        assert_eq!(working.get(4, 4), 100);
        assert_eq!(working.get(2, 2), 64);
        assert_eq!(working, map.with_edits(&bounds, &ops));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let map = ElevationMap::from_fn(24, 24, |x, z| {
            let base = 64 + (x / 6) as i32;
            if (x * 7 + z * 3) % 23 == 0 { base + 9 } else { base }
        });
        let seq = smoother().smooth(&map, map.rect());
        let par = FoliageSmoother::default().with_parallel(true).smooth(&map, map.rect());
        assert_eq!(seq.corrected, par.corrected);
        assert_eq!(seq.outliers, par.outliers);
    }
}
