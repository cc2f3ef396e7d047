//! Obstruction masks: boolean grids marking water and foliage columns.
//!
//! Masks are derived from pairs of heightmaps and never mutated. When the
//! elevation data changes they are rebuilt from the new grids.

pub mod obstruction;
pub mod detector;

pub use obstruction::ObstructionMask;
pub use detector::{ObstructionDetector, ObstructionMasks};
