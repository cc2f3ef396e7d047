//! Site preparation pipeline: selects a flat, dry building site and
//! prepares its terrain.
//!
//! The pipeline orchestrates:
//! 1. Obstruction masks (water, foliage) from the elevation snapshot
//! 2. Flatness scan over the surface heightmap
//! 3. Foliage smoothing and clearing when the footprint holds vegetation
//! 4. Foundation leveling on the cleared terrain
//!
//! Each call works on its own snapshot; nothing is kept between calls.

pub mod config;
pub mod descriptor;
pub mod flatness;
pub mod foliage;
pub mod foundation;

pub use config::SiteConfig;
pub use descriptor::SiteDescriptor;
pub use flatness::{Candidate, FlatnessScanner, GradientField, Rejection};
pub use foliage::{FoliageSmoother, NeighborhoodStats, SmoothedTerrain};
pub use foundation::{FoundationLeveler, LevelPlan};

use crate::core::{Error, Result};
use crate::mask::{ObstructionDetector, ObstructionMasks};
use crate::math::{GridRect, RegionBounds};
use crate::terrain::{ElevationMap, ElevationModel, HeightmapKind};
use crate::world::{EditOp, ElevationSource, WorldEditor};

/// Everything a preparation run decided and issued.
#[derive(Clone, Debug)]
pub struct SitePreparation {
    /// The leveled pad
    pub site: SiteDescriptor,
    /// Footprint relative to the snapshot's first column
    pub footprint: GridRect,
    /// Flatness of the footprint on the authoritative (possibly smoothed) terrain
    pub score: f64,
    /// Whether the foliage smoother ran
    pub smoothed: bool,
    /// Cells replaced by their neighborhood median
    pub outliers: usize,
    /// Clear and fill instructions, in issue order
    pub edits: Vec<EditOp>,
    /// Instructions the world accessor rejected
    pub write_failures: usize,
    /// Terrain as it stands after all edits
    pub final_elevation: ElevationMap,
}

impl SitePreparation {
    pub fn clears_issued(&self) -> usize {
        self.edits.iter().filter(|op| op.is_removal()).count()
    }

    pub fn fills_issued(&self) -> usize {
        self.edits.iter().filter(|op| !op.is_removal()).count()
    }
}

/// Best candidate per heightmap variant, for comparing surfaces.
#[derive(Debug)]
pub struct VariantScan {
    pub kind: HeightmapKind,
    pub result: Result<Candidate>,
}

/// Runs site selection and terrain preparation with one configuration.
pub struct SitePreparer {
    config: SiteConfig,
    scanner: FlatnessScanner,
    smoother: FoliageSmoother,
    leveler: FoundationLeveler,
}

impl SitePreparer {
    /// Create a preparer; fails on an invalid configuration.
    pub fn new(config: SiteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scanner: FlatnessScanner::from_config(&config),
            smoother: FoliageSmoother::from_config(&config),
            leveler: FoundationLeveler::new(config.fill_material.clone()),
            config,
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Load a snapshot for `bounds` and prepare a site in it.
    pub fn prepare_region(
        &self,
        source: &dyn ElevationSource,
        bounds: &RegionBounds,
        editor: &mut dyn WorldEditor,
    ) -> Result<SitePreparation> {
        let model = source.elevation_snapshot(bounds)?;
        self.prepare(&model, editor)
    }

    /// Select and prepare a site in an already-loaded snapshot.
    ///
    /// `NoSuitableArea` is returned before any instruction is issued. World
    /// write rejections are logged and counted, never retried.
    pub fn prepare(&self, model: &ElevationModel, editor: &mut dyn WorldEditor) -> Result<SitePreparation> {
        let bounds = *model.bounds();
        let surface = model.surface_with_water();
        let masks = ObstructionDetector::detect(model)?;

        log::info!(
            "Scanning {} for a {}x{} site",
            bounds, self.config.footprint_width, self.config.footprint_depth
        );
        let mut candidate = self.scanner.select(surface, &masks.water, &bounds)?;

        let mut clears = Vec::new();
        let mut outliers = 0;
        let mut smoothed = false;
        let mut working = surface.clone();
        let mut score = candidate.score;

        if masks.foliage.any_in(candidate.rect) {
            smoothed = true;
            let terrain = if self.config.rescan_after_smoothing {
                let terrain = self.smoother.smooth(surface, surface.rect());
                candidate = self.scanner.select(&terrain.corrected, &masks.water, &bounds)?;
                terrain
            } else {
                self.smoother.smooth(surface, self.smoother.region_for(candidate.rect, surface))
            };
            outliers = terrain.outliers;

            let clear_region = self.smoother.region_for(candidate.rect, surface);
            clears = self.smoother.clear_ops(surface, &terrain.corrected, clear_region, &bounds);
            working = self.smoother.working_elevation(surface, &terrain.corrected, clear_region);
            score = GradientField::compute(&terrain.corrected).mean_in(candidate.rect);
        }

        self.check_irregularity(&bounds, score)?;

        let mut write_failures = issue(editor, &clears);
        let plan = self.leveler.plan(&working, candidate.rect, &bounds)?;
        write_failures += issue(editor, &plan.fills);

        let final_elevation = working.with_edits(&bounds, &plan.fills);
        let mut edits = clears;
        edits.extend(plan.fills);

        log::info!(
            "Prepared site at ({}, {}) floor {}: score {:.4}, {} clears, {} fills, {} rejected",
            plan.site.origin_x,
            plan.site.origin_z,
            plan.site.floor_height,
            score,
            edits.iter().filter(|op| op.is_removal()).count(),
            edits.iter().filter(|op| !op.is_removal()).count(),
            write_failures
        );

        Ok(SitePreparation {
            site: plan.site,
            footprint: candidate.rect,
            score,
            smoothed,
            outliers,
            edits,
            write_failures,
            final_elevation,
        })
    }

    /// Scan every heightmap variant with the same footprint and water mask.
    pub fn compare_heightmaps(&self, model: &ElevationModel) -> Result<Vec<VariantScan>> {
        let masks = ObstructionDetector::detect(model)?;
        Ok(HeightmapKind::ALL
            .iter()
            .map(|&kind| VariantScan {
                kind,
                result: self.scanner.select(model.map(kind), &masks.water, model.bounds()),
            })
            .collect())
    }

    /// Masks for a snapshot, exposed for previews and diagnostics.
    pub fn masks(&self, model: &ElevationModel) -> Result<ObstructionMasks> {
        ObstructionDetector::detect(model)
    }

    fn check_irregularity(&self, bounds: &RegionBounds, score: f64) -> Result<()> {
        match self.config.max_flatness_score {
            Some(limit) if score > limit => {
                log::warn!("Flattest site in {} scores {:.4}, limit is {:.4}", bounds, score, limit);
                Err(Error::NoSuitableArea {
                    bounds: *bounds,
                    width: self.config.footprint_width,
                    depth: self.config.footprint_depth,
                    reason: format!("flattest window scores {:.4}, above the limit of {:.4}", score, limit),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Send edits to the world; returns how many were rejected.
fn issue(editor: &mut dyn WorldEditor, ops: &[EditOp]) -> usize {
    let mut failures = 0;
    for op in ops {
        if let Err(e) = editor.apply(op) {
            log::warn!("Edit {:?} rejected: {}", op, e);
            failures += 1;
        }
    }
    failures
}
