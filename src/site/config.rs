//! Site preparation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Configuration for site selection and terrain preparation.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Footprint extent along x, in columns.
    pub footprint_width: u32,
    /// Footprint extent along z, in columns.
    pub footprint_depth: u32,
    /// Side of the square neighborhood used for outlier detection. Must be odd.
    pub smoothing_window: u32,
    /// A cell is an outlier when it lies further than this many standard
    /// deviations from its neighborhood median.
    pub outlier_sigma: f64,
    /// Columns smoothed around the footprint on each side.
    pub smoothing_margin: u32,
    /// Blocks cleared above the corrected height of an obstructed column.
    pub clear_height: i32,
    /// Block placed by foundation fills.
    pub fill_material: String,
    /// Reject the selection when its flatness score, measured on the smoothed
    /// terrain, is above this limit.
    pub max_flatness_score: Option<f64>,
    /// Skip candidates whose mean height lies outside `[min, max]`.
    pub height_range: Option<[i32; 2]>,
    /// After smoothing, score the whole area again on corrected heights.
    pub rescan_after_smoothing: bool,
    /// Evaluate candidates and smoothed cells on the rayon pool.
    pub parallel: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            footprint_width: 10,
            footprint_depth: 10,
            smoothing_window: 7,
            outlier_sigma: 2.0,
            smoothing_margin: 3,
            clear_height: 20,
            fill_material: "cobblestone".to_string(),
            max_flatness_score: None,
            height_range: None,
            rescan_after_smoothing: false,
            parallel: true,
        }
    }
}

impl SiteConfig {
    /// Default config with a different footprint
    pub fn with_footprint(width: u32, depth: u32) -> Self {
        Self {
            footprint_width: width,
            footprint_depth: depth,
            ..Default::default()
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.footprint_width == 0 || self.footprint_depth == 0 {
            return Err(Error::Config(format!(
                "footprint must be non-empty, got {}x{}",
                self.footprint_width, self.footprint_depth
            )));
        }
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(Error::Config(format!(
                "smoothing window must be odd, got {}",
                self.smoothing_window
            )));
        }
        if self.outlier_sigma.is_nan() || self.outlier_sigma < 0.0 {
            return Err(Error::Config(format!(
                "outlier sigma must be non-negative, got {}",
                self.outlier_sigma
            )));
        }
        if self.clear_height <= 0 {
            return Err(Error::Config(format!(
                "clear height must be positive, got {}",
                self.clear_height
            )));
        }
        if let Some([min, max]) = self.height_range {
            if min > max {
                return Err(Error::Config(format!("height range [{}, {}] is inverted", min, max)));
            }
        }
        Ok(())
    }

    /// Load from a JSON file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = SiteConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.smoothing_window, 7);
        assert_eq!(cfg.clear_height, 20);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            SiteConfig { footprint_width: 0, ..Default::default() },
            SiteConfig { smoothing_window: 6, ..Default::default() },
            SiteConfig { outlier_sigma: -1.0, ..Default::default() },
            SiteConfig { outlier_sigma: f64::NAN, ..Default::default() },
            SiteConfig { clear_height: 0, ..Default::default() },
            SiteConfig { height_range: Some([90, 60]), ..Default::default() },
        ];
        for cfg in cases {
            assert!(matches!(cfg.validate(), Err(Error::Config(_))), "{cfg:?}");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: SiteConfig =
            serde_json::from_str(r#"{ "footprint_width": 8, "height_range": [60, 100] }"#).unwrap();
        assert_eq!(cfg.footprint_width, 8);
        assert_eq!(cfg.footprint_depth, 10);
        assert_eq!(cfg.height_range, Some([60, 100]));
        assert_eq!(cfg.fill_material, "cobblestone");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let cfg = SiteConfig {
            max_flatness_score: Some(0.4),
            rescan_after_smoothing: true,
            ..SiteConfig::with_footprint(12, 8)
        };
        cfg.save(&path).unwrap();
        assert_eq!(SiteConfig::load(&path).unwrap(), cfg);
    }
}
