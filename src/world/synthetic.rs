//! Procedural stand-in for a real world: fBm terrain, a sea level and
//! scattered trees. Produces snapshots with all three heightmap variants.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::math::RegionBounds;
use crate::terrain::{ElevationMap, ElevationModel};
use super::ElevationSource;

/// Parameters controlling synthetic terrain
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub height_scale: f32, // Vertical relief above base_height
    pub base_height: i32,
    pub octaves: u32,      // FBM octaves (detail levels)
    pub persistence: f32,  // FBM persistence (0.5 typical)
    pub lacunarity: f32,   // FBM lacunarity (2.0 typical)
    pub sea_level: i32,    // Columns with ground below this are under water
    /// Probability that a dry column holds a tree trunk
    pub tree_density: f32,
    /// Trunk height in blocks; leaves sit one block above
    pub tree_height: i32,
    /// Canopy radius around the trunk (Manhattan distance)
    pub canopy_radius: i32,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            seed: 12345,
            scale: 60.0,
            height_scale: 24.0,
            base_height: 56,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            sea_level: 62,
            tree_density: 0.015,
            tree_height: 5,
            canopy_radius: 2,
        }
    }
}

/// Noise-driven snapshot source
pub struct SyntheticRegion {
    params: SyntheticParams,
    noise: Fbm<Perlin>,
}

impl SyntheticRegion {
    pub fn new(params: SyntheticParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self { params, noise }
    }

    pub fn params(&self) -> &SyntheticParams {
        &self.params
    }

    /// Ground (topmost natural solid block) at a world column
    pub fn ground_at(&self, x: i32, z: i32) -> i32 {
        let nx = (x as f32 / self.params.scale) as f64;
        let nz = (z as f32 / self.params.scale) as f64;
        let normalized = (self.noise.get([nx, nz]) + 1.0) / 2.0;
        self.params.base_height + (normalized * self.params.height_scale as f64).floor() as i32
    }

    /// Integer hash producing a value in [0, 1].
    fn hash_2d(ix: i32, iz: i32, seed: u32) -> f32 {
        let mut h = (ix as u32).wrapping_mul(374761393)
            .wrapping_add((iz as u32).wrapping_mul(668265263))
            .wrapping_add(seed.wrapping_mul(1274126177));
        h = (h ^ (h >> 13)).wrapping_mul(1103515245);
        h = h ^ (h >> 16);
        (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
    }

    /// True if a trunk stands at this world column
    pub fn has_tree(&self, x: i32, z: i32) -> bool {
        self.ground_at(x, z) >= self.params.sea_level
            && Self::hash_2d(x, z, self.params.seed) < self.params.tree_density
    }

    /// (with water, excluding foliage, solid floor) at one column
    fn column(&self, x: i32, z: i32) -> (i32, i32, i32) {
        let ground = self.ground_at(x, z);
        if ground < self.params.sea_level {
            // Water column: the liquid surface counts for both surface maps
            let sea = self.params.sea_level;
            return (sea, sea, ground);
        }

        let r = self.params.canopy_radius;
        let mut top = ground;
        let mut solid_non_leaf = ground;
        for dz in -r..=r {
            for dx in -r..=r {
                if dx.abs() + dz.abs() > r || !self.has_tree(x + dx, z + dz) {
                    continue;
                }
                let trunk_top = self.ground_at(x + dx, z + dz) + self.params.tree_height;
                top = top.max(trunk_top + 1);
                if dx == 0 && dz == 0 {
                    solid_non_leaf = solid_non_leaf.max(trunk_top);
                }
            }
        }
        (top, solid_non_leaf, top)
    }
}

impl ElevationSource for SyntheticRegion {
    fn elevation_snapshot(&self, bounds: &RegionBounds) -> Result<ElevationModel> {
        let (w, d) = (bounds.width(), bounds.depth());
        let mut columns = Vec::with_capacity(w * d);
        for z in 0..d {
            for x in 0..w {
                let world = bounds.to_world(x, z);
                columns.push(self.column(world.x, world.y));
            }
        }
        let pick = |f: fn(&(i32, i32, i32)) -> i32| {
            ElevationMap::new(w, d, columns.iter().map(f).collect())
        };
        ElevationModel::new(
            *bounds,
            pick(|c| c.0)?,
            pick(|c| c.1)?,
            pick(|c| c.2)?,
        )
    }
}
