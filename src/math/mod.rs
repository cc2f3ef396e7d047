//! Region and grid rectangle primitives

pub mod bounds;

pub use bounds::{GridRect, RegionBounds};
