//! Error types for site preparation

use thiserror::Error;

use crate::math::RegionBounds;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// Input grids are malformed or disagree in shape.
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// No water-free candidate window exists for the requested footprint.
    ///
    /// This is an expected outcome: the caller may shrink the footprint,
    /// pick another region, or skip site generation here.
    #[error("No suitable {width}x{depth} area in region {bounds}: {reason}")]
    NoSuitableArea {
        bounds: RegionBounds,
        width: u32,
        depth: u32,
        reason: String,
    },

    /// Elevation data for the region could not be loaded.
    #[error("Region {bounds} unavailable: {reason}")]
    RegionUnavailable {
        bounds: RegionBounds,
        reason: String,
    },

    /// The world accessor rejected a clear or fill instruction.
    #[error("World write rejected: {0}")]
    WorldWrite(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// True for outcomes the caller is expected to handle as a normal result
    /// rather than a failure of the engine itself.
    pub fn is_no_suitable_area(&self) -> bool {
        matches!(self, Error::NoSuitableArea { .. })
    }
}
