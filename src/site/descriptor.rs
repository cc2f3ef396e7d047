//! The prepared-site contract handed to structure generators.

use serde::{Deserialize, Serialize};

use crate::core::types::{IVec2, UVec2};
use crate::math::{GridRect, RegionBounds};

/// A leveled building pad, in world coordinates.
///
/// The pad covers columns `origin_x..origin_x + width` by
/// `origin_z..origin_z + depth`, and its top block sits at `floor_height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub origin_x: i32,
    pub origin_z: i32,
    pub width: u32,
    pub depth: u32,
    pub floor_height: i32,
}

impl SiteDescriptor {
    /// Descriptor for a footprint of `bounds`
    pub fn from_footprint(bounds: &RegionBounds, footprint: GridRect, floor_height: i32) -> Self {
        let origin = bounds.to_world(footprint.x, footprint.z);
        Self {
            origin_x: origin.x,
            origin_z: origin.y,
            width: footprint.width as u32,
            depth: footprint.depth as u32,
            floor_height,
        }
    }

    /// Footprint relative to `bounds`, if the pad lies inside it
    pub fn footprint_in(&self, bounds: &RegionBounds) -> Option<GridRect> {
        let pad = RegionBounds::new(
            IVec2::new(self.origin_x, self.origin_z),
            UVec2::new(self.width, self.depth),
        );
        let (x, z) = bounds.offset_of(&pad)?;
        Some(GridRect::new(x, z, self.width as usize, self.depth as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_round_trip() {
        let bounds = RegionBounds::new(IVec2::new(-40, 300), UVec2::new(64, 64));
        let rect = GridRect::new(12, 7, 10, 8);
        let site = SiteDescriptor::from_footprint(&bounds, rect, 71);
        assert_eq!((site.origin_x, site.origin_z), (-28, 307));
        assert_eq!(site.footprint_in(&bounds), Some(rect));

        let elsewhere = RegionBounds::new(IVec2::new(1000, 0), UVec2::new(16, 16));
        assert_eq!(site.footprint_in(&elsewhere), None);
    }

    #[test]
    fn test_json_field_names() {
        let site = SiteDescriptor { origin_x: 1, origin_z: 2, width: 10, depth: 10, floor_height: 64 };
        let json = serde_json::to_value(site).unwrap();
        assert_eq!(json["floor_height"], 64);
        assert_eq!(json["origin_z"], 2);
    }
}
