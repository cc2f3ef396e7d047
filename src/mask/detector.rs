//! Water and foliage detection by comparing heightmap pairs.

use crate::core::Result;
use crate::terrain::ElevationModel;
use super::ObstructionMask;

/// Water and foliage masks for one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObstructionMasks {
    pub water: ObstructionMask,
    pub foliage: ObstructionMask,
}

/// Derives obstruction masks from an [`ElevationModel`].
pub struct ObstructionDetector;

impl ObstructionDetector {
    /// A column is water where the topmost block differs from the topmost
    /// fully solid block: something passable sits above the ground.
    pub fn water_mask(model: &ElevationModel) -> Result<ObstructionMask> {
        ObstructionMask::from_difference(model.surface_with_water(), model.solid_floor())
    }

    /// A column has foliage where the all-inclusive surface differs from the
    /// foliage-excluded surface.
    pub fn foliage_mask(model: &ElevationModel) -> Result<ObstructionMask> {
        ObstructionMask::from_difference(model.surface_with_water(), model.surface_excluding_foliage())
    }

    /// Both masks at once
    pub fn detect(model: &ElevationModel) -> Result<ObstructionMasks> {
        let water = Self::water_mask(model)?;
        let foliage = Self::foliage_mask(model)?;
        log::debug!(
            "Obstructions in {}: {} water, {} foliage columns",
            model.bounds(),
            water.count(),
            foliage.count()
        );
        Ok(ObstructionMasks { water, foliage })
    }
}
