//! Region bounds in world space and rectangles in grid space

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec2, UVec2};

/// Horizontal extent of a world region, in block columns.
///
/// `origin` is the world (x, z) of the first column, `size` the number of
/// columns along x and z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionBounds {
    pub origin: IVec2,
    pub size: UVec2,
}

impl RegionBounds {
    /// Create bounds from origin and size
    pub fn new(origin: IVec2, size: UVec2) -> Self {
        Self { origin, size }
    }

    /// Columns along x
    pub fn width(&self) -> usize {
        self.size.x as usize
    }

    /// Columns along z
    pub fn depth(&self) -> usize {
        self.size.y as usize
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.depth()
    }

    /// World (x, z) of the last column, inclusive
    pub fn last(&self) -> IVec2 {
        self.origin + self.size.as_ivec2() - IVec2::ONE
    }

    /// World column of a grid offset
    pub fn to_world(&self, x: usize, z: usize) -> IVec2 {
        self.origin + IVec2::new(x as i32, z as i32)
    }

    /// Check if a world column lies inside the region
    pub fn contains_column(&self, column: IVec2) -> bool {
        let end = self.origin + self.size.as_ivec2();
        column.x >= self.origin.x && column.x < end.x &&
        column.y >= self.origin.y && column.y < end.y
    }

    /// Check if `other` lies entirely inside this region
    pub fn contains_bounds(&self, other: &RegionBounds) -> bool {
        if other.size.x == 0 || other.size.y == 0 {
            return self.contains_column(other.origin);
        }
        self.contains_column(other.origin) && self.contains_column(other.last())
    }

    /// Grid offset of `other`'s origin within this region, if contained
    pub fn offset_of(&self, other: &RegionBounds) -> Option<(usize, usize)> {
        if !self.contains_bounds(other) {
            return None;
        }
        let d = other.origin - self.origin;
        Some((d.x as usize, d.y as usize))
    }
}

impl fmt::Display for RegionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) size {}x{}",
            self.origin.x, self.origin.y, self.size.x, self.size.y
        )
    }
}

/// Axis-aligned rectangle of grid cells, relative to a region's first column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: usize,
    pub z: usize,
    pub width: usize,
    pub depth: usize,
}

impl GridRect {
    pub fn new(x: usize, z: usize, width: usize, depth: usize) -> Self {
        Self { x, z, width, depth }
    }

    /// Exclusive end along x
    pub fn end_x(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive end along z
    pub fn end_z(&self) -> usize {
        self.z + self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.depth == 0
    }

    pub fn contains(&self, x: usize, z: usize) -> bool {
        x >= self.x && x < self.end_x() && z >= self.z && z < self.end_z()
    }

    /// Grow by `margin` on every side, clipped to a `grid_width` x `grid_depth` grid
    pub fn expanded(&self, margin: usize, grid_width: usize, grid_depth: usize) -> GridRect {
        let x0 = self.x.saturating_sub(margin);
        let z0 = self.z.saturating_sub(margin);
        let x1 = (self.end_x() + margin).min(grid_width);
        let z1 = (self.end_z() + margin).min(grid_depth);
        GridRect::new(x0, z0, x1.saturating_sub(x0), z1.saturating_sub(z0))
    }

    /// Cells in row-major order (z outer, x inner)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let rect = *self;
        (rect.z..rect.end_z()).flat_map(move |z| (rect.x..rect.end_x()).map(move |x| (x, z)))
    }
}
