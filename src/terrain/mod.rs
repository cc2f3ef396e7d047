//! Elevation model: the three aligned heightmaps of a region snapshot

pub mod elevation;
pub use elevation::{ElevationMap, ElevationModel, HeightmapKind, RawElevation};
