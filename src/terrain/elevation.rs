//! Heightmap grids and the aligned three-variant elevation model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::math::{GridRect, RegionBounds};
use crate::world::edit::EditOp;

/// Which surface a heightmap describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightmapKind {
    /// Topmost solid or liquid block, foliage included.
    SurfaceWithWater,
    /// Topmost solid block that is not foliage.
    SurfaceExcludingFoliage,
    /// Topmost fully solid block, ignoring passable liquids.
    SolidFloor,
}

impl HeightmapKind {
    pub const ALL: [HeightmapKind; 3] = [
        HeightmapKind::SurfaceWithWater,
        HeightmapKind::SurfaceExcludingFoliage,
        HeightmapKind::SolidFloor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HeightmapKind::SurfaceWithWater => "surface_with_water",
            HeightmapKind::SurfaceExcludingFoliage => "surface_excluding_foliage",
            HeightmapKind::SolidFloor => "solid_floor",
        }
    }
}

impl fmt::Display for HeightmapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable grid of integer surface heights, indexed by (x, z).
///
/// Stored row-major with z as the row: `heights[z * width + x]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElevationMap {
    width: usize,
    depth: usize,
    heights: Vec<i32>,
}

impl ElevationMap {
    /// Create from a flat row-major buffer.
    pub fn new(width: usize, depth: usize, heights: Vec<i32>) -> Result<Self> {
        if heights.len() != width * depth {
            return Err(Error::DataShape(format!(
                "expected {} heights for a {}x{} grid, got {}",
                width * depth, width, depth, heights.len()
            )));
        }
        Ok(Self { width, depth, heights })
    }

    /// Grid of constant height
    pub fn filled(width: usize, depth: usize, height: i32) -> Self {
        Self { width, depth, heights: vec![height; width * depth] }
    }

    /// Build by evaluating `f(x, z)` for every cell.
    pub fn from_fn(width: usize, depth: usize, mut f: impl FnMut(usize, usize) -> i32) -> Self {
        let mut heights = Vec::with_capacity(width * depth);
        for z in 0..depth {
            for x in 0..width {
                heights.push(f(x, z));
            }
        }
        Self { width, depth, heights }
    }

    /// Build from rows indexed by z, each holding one height per x.
    pub fn from_rows(rows: &[Vec<i32>]) -> Result<Self> {
        let depth = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut heights = Vec::with_capacity(width * depth);
        for (z, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::DataShape(format!(
                    "row {} has {} columns, expected {}", z, row.len(), width
                )));
            }
            heights.extend_from_slice(row);
        }
        Ok(Self { width, depth, heights })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.depth)
    }

    #[inline]
    fn index(&self, x: usize, z: usize) -> usize {
        z * self.width + x
    }

    /// Height at (x, z). Panics if out of range.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> i32 {
        self.heights[self.index(x, z)]
    }

    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Rows indexed by z
    pub fn to_rows(&self) -> Vec<Vec<i32>> {
        self.heights.chunks(self.width.max(1)).map(|r| r.to_vec()).collect()
    }

    /// Full-grid rectangle
    pub fn rect(&self) -> GridRect {
        GridRect::new(0, 0, self.width, self.depth)
    }

    /// Copy with `delta` added to every cell
    pub fn shifted(&self, delta: i32) -> Self {
        Self {
            width: self.width,
            depth: self.depth,
            heights: self.heights.iter().map(|h| h + delta).collect(),
        }
    }

    /// Copy with cells inside `rect` replaced by `f(x, z, old)`.
    pub fn with_cells(&self, rect: GridRect, mut f: impl FnMut(usize, usize, i32) -> i32) -> Self {
        let mut heights = self.heights.clone();
        for (x, z) in rect.cells() {
            let i = self.index(x, z);
            heights[i] = f(x, z, heights[i]);
        }
        Self { width: self.width, depth: self.depth, heights }
    }

    /// Maximum height inside `rect`, `None` if the rect is empty
    pub fn max_in(&self, rect: GridRect) -> Option<i32> {
        rect.cells().map(|(x, z)| self.get(x, z)).max()
    }

    /// Minimum height inside `rect`, `None` if the rect is empty
    pub fn min_in(&self, rect: GridRect) -> Option<i32> {
        rect.cells().map(|(x, z)| self.get(x, z)).min()
    }

    /// Arithmetic mean height inside `rect`
    pub fn mean_in(&self, rect: GridRect) -> Option<f64> {
        if rect.is_empty() {
            return None;
        }
        let sum: i64 = rect.cells().map(|(x, z)| self.get(x, z) as i64).sum();
        Some(sum as f64 / (rect.width * rect.depth) as f64)
    }

    /// Grid as the world would report it after `edits` are applied.
    ///
    /// A fill raises the column top to its upper bound. A clear lowers the top
    /// to the span's lower bound when the current top lies inside the span;
    /// blocks above the span keep the top where it was.
    pub fn with_edits(&self, bounds: &RegionBounds, edits: &[EditOp]) -> Self {
        let mut heights = self.heights.clone();
        for op in edits {
            let column = op.column();
            if !bounds.contains_column(column) {
                continue;
            }
            let local = column - bounds.origin;
            let (x, z) = (local.x as usize, local.y as usize);
            if x >= self.width || z >= self.depth {
                continue;
            }
            let i = self.index(x, z);
            match op {
                EditOp::FillColumn { to_inclusive, .. } => {
                    heights[i] = heights[i].max(*to_inclusive);
                }
                EditOp::ClearColumn { from_exclusive, to_inclusive, .. } => {
                    if heights[i] > *from_exclusive && heights[i] <= *to_inclusive {
                        heights[i] = *from_exclusive;
                    }
                }
            }
        }
        Self { width: self.width, depth: self.depth, heights }
    }
}

/// Raw per-cell readings for the three surface variants, as delivered by a
/// snapshot source. Rows are indexed by z, columns by x.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawElevation {
    pub bounds: RegionBounds,
    pub surface_with_water: Vec<Vec<i32>>,
    pub surface_excluding_foliage: Vec<Vec<i32>>,
    pub solid_floor: Vec<Vec<i32>>,
}

/// The three aligned heightmaps of one region snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationModel {
    bounds: RegionBounds,
    surface_with_water: ElevationMap,
    surface_excluding_foliage: ElevationMap,
    solid_floor: ElevationMap,
}

impl ElevationModel {
    /// Assemble from already-built grids, checking they agree with the bounds.
    pub fn new(
        bounds: RegionBounds,
        surface_with_water: ElevationMap,
        surface_excluding_foliage: ElevationMap,
        solid_floor: ElevationMap,
    ) -> Result<Self> {
        let expected = (bounds.width(), bounds.depth());
        for (kind, map) in [
            (HeightmapKind::SurfaceWithWater, &surface_with_water),
            (HeightmapKind::SurfaceExcludingFoliage, &surface_excluding_foliage),
            (HeightmapKind::SolidFloor, &solid_floor),
        ] {
            if map.dimensions() != expected {
                return Err(Error::DataShape(format!(
                    "{} is {}x{}, region {} expects {}x{}",
                    kind, map.width(), map.depth(), bounds, expected.0, expected.1
                )));
            }
        }
        if bounds.cell_count() == 0 {
            return Err(Error::DataShape(format!("region {} has no cells", bounds)));
        }
        Ok(Self { bounds, surface_with_water, surface_excluding_foliage, solid_floor })
    }

    /// Normalize raw snapshot readings into aligned grids.
    pub fn from_raw(raw: &RawElevation) -> Result<Self> {
        Self::new(
            raw.bounds,
            ElevationMap::from_rows(&raw.surface_with_water)?,
            ElevationMap::from_rows(&raw.surface_excluding_foliage)?,
            ElevationMap::from_rows(&raw.solid_floor)?,
        )
    }

    /// Inverse of [`ElevationModel::from_raw`].
    pub fn to_raw(&self) -> RawElevation {
        RawElevation {
            bounds: self.bounds,
            surface_with_water: self.surface_with_water.to_rows(),
            surface_excluding_foliage: self.surface_excluding_foliage.to_rows(),
            solid_floor: self.solid_floor.to_rows(),
        }
    }

    pub fn bounds(&self) -> &RegionBounds {
        &self.bounds
    }

    pub fn width(&self) -> usize {
        self.bounds.width()
    }

    pub fn depth(&self) -> usize {
        self.bounds.depth()
    }

    pub fn map(&self, kind: HeightmapKind) -> &ElevationMap {
        match kind {
            HeightmapKind::SurfaceWithWater => &self.surface_with_water,
            HeightmapKind::SurfaceExcludingFoliage => &self.surface_excluding_foliage,
            HeightmapKind::SolidFloor => &self.solid_floor,
        }
    }

    pub fn surface_with_water(&self) -> &ElevationMap {
        &self.surface_with_water
    }

    pub fn surface_excluding_foliage(&self) -> &ElevationMap {
        &self.surface_excluding_foliage
    }

    pub fn solid_floor(&self) -> &ElevationMap {
        &self.solid_floor
    }

    /// Sub-region snapshot, used when a cached or file snapshot covers more
    /// than the requested bounds.
    pub fn crop(&self, bounds: &RegionBounds) -> Option<Self> {
        let (ox, oz) = self.bounds.offset_of(bounds)?;
        let crop = |map: &ElevationMap| {
            ElevationMap::from_fn(bounds.width(), bounds.depth(), |x, z| map.get(ox + x, oz + z))
        };
        Some(Self {
            bounds: *bounds,
            surface_with_water: crop(&self.surface_with_water),
            surface_excluding_foliage: crop(&self.surface_excluding_foliage),
            solid_floor: crop(&self.solid_floor),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IVec2, UVec2};

    fn bounds(w: u32, d: u32) -> RegionBounds {
        RegionBounds::new(IVec2::new(100, 200), UVec2::new(w, d))
    }

    #[test]
    fn test_from_rows_indexing() {
        let map = ElevationMap::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(map.dimensions(), (3, 2));
        assert_eq!(map.get(2, 0), 3);
        assert_eq!(map.get(0, 1), 4);
        assert_eq!(map.to_rows(), vec![vec![1, 2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = ElevationMap::from_rows(&[vec![1, 2, 3], vec![4, 5]]).unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }

    #[test]
    fn test_flat_buffer_length_checked() {
        assert!(ElevationMap::new(3, 3, vec![0; 8]).is_err());
        assert!(ElevationMap::new(3, 3, vec![0; 9]).is_ok());
    }

    #[test]
    fn test_model_rejects_mismatched_variants() {
        let raw = RawElevation {
            bounds: bounds(2, 2),
            surface_with_water: vec![vec![1, 1], vec![1, 1]],
            surface_excluding_foliage: vec![vec![1, 1], vec![1, 1]],
            solid_floor: vec![vec![1, 1, 1], vec![1, 1, 1]],
        };
        let err = ElevationModel::from_raw(&raw).unwrap_err();
        match err {
            Error::DataShape(msg) => assert!(msg.contains("solid_floor")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_model_rejects_bounds_mismatch() {
        let raw = RawElevation {
            bounds: bounds(3, 2),
            surface_with_water: vec![vec![1, 1], vec![1, 1]],
            surface_excluding_foliage: vec![vec![1, 1], vec![1, 1]],
            solid_floor: vec![vec![1, 1], vec![1, 1]],
        };
        assert!(matches!(ElevationModel::from_raw(&raw), Err(Error::DataShape(_))));
    }

    #[test]
    fn test_raw_round_trip_and_crop() {
        let map = ElevationMap::from_fn(4, 3, |x, z| (x + 10 * z) as i32);
        let model = ElevationModel::new(bounds(4, 3), map.clone(), map.clone(), map).unwrap();
        assert_eq!(ElevationModel::from_raw(&model.to_raw()).unwrap(), model);

        let sub = RegionBounds::new(IVec2::new(101, 201), UVec2::new(2, 2));
        let cropped = model.crop(&sub).unwrap();
        assert_eq!(cropped.surface_with_water().get(0, 0), 11);
        assert_eq!(cropped.solid_floor().get(1, 1), 22);

        let outside = RegionBounds::new(IVec2::new(103, 201), UVec2::new(2, 2));
        assert!(model.crop(&outside).is_none());
    }

    #[test]
    fn test_window_statistics() {
        let map = ElevationMap::from_fn(4, 4, |x, z| (x * z) as i32);
        let rect = GridRect::new(1, 1, 2, 2);
        assert_eq!(map.max_in(rect), Some(4));
        assert_eq!(map.min_in(rect), Some(1));
        assert_eq!(map.mean_in(rect), Some(2.25));
        assert_eq!(map.max_in(GridRect::new(0, 0, 0, 3)), None);
    }

    #[test]
    fn test_with_edits_fill_and_clear() {
        let b = bounds(2, 1);
        let map = ElevationMap::from_rows(&[vec![60, 75]]).unwrap();
        let edits = vec![
            EditOp::FillColumn { x: 100, z: 200, from_exclusive: 60, to_inclusive: 64, material: "dirt".into() },
            EditOp::ClearColumn { x: 101, z: 200, from_exclusive: 64, to_inclusive: 84 },
            // Outside the region: ignored
            EditOp::FillColumn { x: 50, z: 200, from_exclusive: 0, to_inclusive: 99, material: "dirt".into() },
        ];
        let after = map.with_edits(&b, &edits);
        assert_eq!(after.get(0, 0), 64);
        assert_eq!(after.get(1, 0), 64);
    }

    #[test]
    fn test_clear_below_top_keeps_top() {
        let b = bounds(1, 1);
        let map = ElevationMap::filled(1, 1, 100);
        let edits = vec![EditOp::ClearColumn { x: 100, z: 200, from_exclusive: 64, to_inclusive: 84 }];
        assert_eq!(map.with_edits(&b, &edits).get(0, 0), 100);
    }
}
