//! Boolean grid with constant-time window queries.

use crate::core::{Error, Result};
use crate::math::GridRect;
use crate::terrain::ElevationMap;

/// Boolean grid aligned with an [`ElevationMap`].
///
/// Keeps a summed-area table next to the cells so window counts are O(1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstructionMask {
    width: usize,
    depth: usize,
    cells: Vec<bool>,
    /// (width + 1) x (depth + 1) prefix counts; row 0 and column 0 are zero
    integral: Vec<u32>,
}

impl ObstructionMask {
    /// Build from a row-major cell buffer
    pub fn new(width: usize, depth: usize, cells: Vec<bool>) -> Result<Self> {
        if cells.len() != width * depth {
            return Err(Error::DataShape(format!(
                "expected {} mask cells for a {}x{} grid, got {}",
                width * depth, width, depth, cells.len()
            )));
        }
        let integral = build_integral(width, depth, &cells);
        Ok(Self { width, depth, cells, integral })
    }

    /// Mask with no cell set
    pub fn empty(width: usize, depth: usize) -> Self {
        let cells = vec![false; width * depth];
        let integral = vec![0; (width + 1) * (depth + 1)];
        Self { width, depth, cells, integral }
    }

    /// True where the grids differ. Grids must share dimensions.
    pub fn from_difference(a: &ElevationMap, b: &ElevationMap) -> Result<Self> {
        if a.dimensions() != b.dimensions() {
            return Err(Error::DataShape(format!(
                "cannot compare {}x{} and {}x{} heightmaps",
                a.width(), a.depth(), b.width(), b.depth()
            )));
        }
        let cells = a.heights().iter().zip(b.heights()).map(|(x, y)| x != y).collect();
        Self::new(a.width(), a.depth(), cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> bool {
        self.cells[z * self.width + x]
    }

    /// Number of set cells in the whole grid
    pub fn count(&self) -> usize {
        self.count_in(GridRect::new(0, 0, self.width, self.depth))
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Number of set cells inside `rect` (clipped to the grid)
    pub fn count_in(&self, rect: GridRect) -> usize {
        let x0 = rect.x.min(self.width);
        let z0 = rect.z.min(self.depth);
        let x1 = rect.end_x().min(self.width);
        let z1 = rect.end_z().min(self.depth);
        let stride = self.width + 1;
        let at = |x: usize, z: usize| self.integral[z * stride + x] as i64;
        (at(x1, z1) - at(x0, z1) - at(x1, z0) + at(x0, z0)) as usize
    }

    /// True if any cell inside `rect` is set
    pub fn any_in(&self, rect: GridRect) -> bool {
        self.count_in(rect) > 0
    }
}

fn build_integral(width: usize, depth: usize, cells: &[bool]) -> Vec<u32> {
    let stride = width + 1;
    let mut integral = vec![0u32; stride * (depth + 1)];
    for z in 0..depth {
        let mut row_sum = 0u32;
        for x in 0..width {
            row_sum += cells[z * width + x] as u32;
            integral[(z + 1) * stride + x + 1] = integral[z * stride + x + 1] + row_sum;
        }
    }
    integral
}
