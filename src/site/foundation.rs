//! Foundation leveler: raises a footprint to its highest column.
//!
//! Only adds material. Running it again on the leveled terrain issues nothing.

use crate::core::{Error, Result};
use crate::math::{GridRect, RegionBounds};
use crate::terrain::ElevationMap;
use crate::world::EditOp;
use super::descriptor::SiteDescriptor;

/// Fill instructions and the resulting pad.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelPlan {
    pub site: SiteDescriptor,
    pub fills: Vec<EditOp>,
}

impl LevelPlan {
    /// Blocks placed by all fills
    pub fn block_count(&self) -> u32 {
        self.fills.iter().map(EditOp::block_count).sum()
    }
}

#[derive(Clone, Debug)]
pub struct FoundationLeveler {
    material: String,
}

impl FoundationLeveler {
    pub fn new(material: impl Into<String>) -> Self {
        Self { material: material.into() }
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    /// Plan fills bringing every column of `footprint` up to the footprint's
    /// maximum height.
    pub fn plan(&self, map: &ElevationMap, footprint: GridRect, bounds: &RegionBounds) -> Result<LevelPlan> {
        if footprint.is_empty()
            || footprint.end_x() > map.width()
            || footprint.end_z() > map.depth()
        {
            return Err(Error::DataShape(format!(
                "footprint {:?} does not fit a {}x{} heightmap",
                footprint, map.width(), map.depth()
            )));
        }

        let target = map.max_in(footprint).ok_or_else(|| {
            Error::DataShape("empty footprint".into())
        })?;

        let fills: Vec<EditOp> = footprint
            .cells()
            .filter(|&(x, z)| map.get(x, z) < target)
            .map(|(x, z)| {
                let world = bounds.to_world(x, z);
                EditOp::FillColumn {
                    x: world.x,
                    z: world.y,
                    from_exclusive: map.get(x, z),
                    to_inclusive: target,
                    material: self.material.clone(),
                }
            })
            .collect();

        Ok(LevelPlan {
            site: SiteDescriptor::from_footprint(bounds, footprint, target),
            fills,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IVec2, UVec2};

    fn bounds(w: usize, d: usize) -> RegionBounds {
        RegionBounds::new(IVec2::new(20, -8), UVec2::new(w as u32, d as u32))
    }

    fn rough() -> ElevationMap {
        ElevationMap::from_fn(8, 8, |x, z| 60 + ((x * 3 + z * 5) % 4) as i32)
    }

    #[test]
    fn test_target_is_footprint_max() {
        let plan = FoundationLeveler::new("cobblestone")
            .plan(&rough(), GridRect::new(1, 1, 5, 5), &bounds(8, 8))
            .unwrap();
        assert_eq!(plan.site.floor_height, 63);
        assert_eq!((plan.site.origin_x, plan.site.origin_z), (21, -7));
        assert_eq!((plan.site.width, plan.site.depth), (5, 5));
    }

    #[test]
    fn test_never_removes_and_levels_uniformly() {
        let map = rough();
        let b = bounds(8, 8);
        let rect = GridRect::new(2, 0, 6, 7);
        let plan = FoundationLeveler::new("cobblestone").plan(&map, rect, &b).unwrap();

        assert!(plan.fills.iter().all(|op| !op.is_removal()));
        let leveled = map.with_edits(&b, &plan.fills);
        for (x, z) in rect.cells() {
            assert_eq!(leveled.get(x, z), plan.site.floor_height);
        }
        // Outside the footprint nothing changes
        assert_eq!(leveled.get(0, 0), map.get(0, 0));
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let map = rough();
        let b = bounds(8, 8);
        let rect = GridRect::new(0, 0, 8, 8);
        let leveler = FoundationLeveler::new("dirt");

        let first = leveler.plan(&map, rect, &b).unwrap();
        assert!(!first.fills.is_empty());
        let leveled = map.with_edits(&b, &first.fills);

        let second = leveler.plan(&leveled, rect, &b).unwrap();
        assert!(second.fills.is_empty());
        assert_eq!(second.site, first.site);
    }

    #[test]
    fn test_fill_spans_start_at_current_height() {
        let map = ElevationMap::from_rows(&[vec![60, 64]]).unwrap();
        let plan = FoundationLeveler::new("cobblestone")
            .plan(&map, GridRect::new(0, 0, 2, 1), &bounds(2, 1))
            .unwrap();
        assert_eq!(
            plan.fills,
            vec![EditOp::FillColumn {
                x: 20,
                z: -8,
                from_exclusive: 60,
                to_inclusive: 64,
                material: "cobblestone".into(),
            }]
        );
        assert_eq!(plan.block_count(), 4);
    }

    #[test]
    fn test_footprint_outside_map_rejected() {
        let err = FoundationLeveler::new("dirt")
            .plan(&rough(), GridRect::new(5, 5, 4, 4), &bounds(8, 8))
            .unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }
}
