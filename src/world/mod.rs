//! Boundary with the voxel world: elevation snapshots in, column edits out.
//!
//! The engine never talks to a world directly. Snapshots come from an
//! [`ElevationSource`]; clear and fill instructions go to a [`WorldEditor`].

pub mod edit;
pub mod log;
pub mod cache;
pub mod snapshot_file;
pub mod synthetic;

pub use edit::EditOp;
pub use log::EditLog;
pub use cache::SnapshotCache;
pub use snapshot_file::SnapshotFile;
pub use synthetic::{SyntheticParams, SyntheticRegion};

use crate::core::Result;
use crate::math::RegionBounds;
use crate::terrain::ElevationModel;

/// Supplies read-only elevation snapshots for a region.
pub trait ElevationSource {
    /// Load the three heightmap variants covering `bounds`.
    ///
    /// Fails with `Error::RegionUnavailable` when the data cannot be loaded.
    fn elevation_snapshot(&self, bounds: &RegionBounds) -> Result<ElevationModel>;
}

/// Write-capable world accessor.
///
/// Calls are best-effort: a returned error means the instruction was
/// rejected, and nothing already applied is rolled back.
pub trait WorldEditor {
    /// Remove blocks in `(from_exclusive, to_inclusive]` of column (x, z).
    fn clear_column(&mut self, x: i32, z: i32, from_exclusive: i32, to_inclusive: i32) -> Result<()>;

    /// Place `material` in `(from_exclusive, to_inclusive]` of column (x, z).
    fn fill_column(
        &mut self,
        x: i32,
        z: i32,
        from_exclusive: i32,
        to_inclusive: i32,
        material: &str,
    ) -> Result<()>;

    /// Dispatch a recorded edit.
    fn apply(&mut self, op: &EditOp) -> Result<()> {
        match op {
            EditOp::ClearColumn { x, z, from_exclusive, to_inclusive } => {
                self.clear_column(*x, *z, *from_exclusive, *to_inclusive)
            }
            EditOp::FillColumn { x, z, from_exclusive, to_inclusive, material } => {
                self.fill_column(*x, *z, *from_exclusive, *to_inclusive, material)
            }
        }
    }
}
