//! Elevation snapshots stored as JSON files.
//!
//! File layout is a serialized [`RawElevation`]: region bounds plus the three
//! heightmap variants as rows indexed by z.

use std::path::{Path, PathBuf};

use crate::core::{Error, Result};
use crate::math::RegionBounds;
use crate::terrain::{ElevationModel, RawElevation};
use super::ElevationSource;

/// Snapshot source backed by one JSON file.
///
/// The file is read on every request; wrap it in a
/// [`SnapshotCache`](super::SnapshotCache) to avoid repeated parsing.
#[derive(Clone, Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the whole file.
    pub fn load(&self) -> Result<ElevationModel> {
        let json = std::fs::read_to_string(&self.path)?;
        let raw: RawElevation = serde_json::from_str(&json)?;
        ElevationModel::from_raw(&raw)
    }

    /// Write `model` to `path`, creating parent directories.
    pub fn save(model: &ElevationModel, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(&model.to_raw())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl ElevationSource for SnapshotFile {
    fn elevation_snapshot(&self, bounds: &RegionBounds) -> Result<ElevationModel> {
        let model = self.load().map_err(|e| match e {
            Error::DataShape(_) => e,
            other => Error::RegionUnavailable {
                bounds: *bounds,
                reason: format!("{}: {}", self.path.display(), other),
            },
        })?;

        model.crop(bounds).ok_or_else(|| Error::RegionUnavailable {
            bounds: *bounds,
            reason: format!(
                "{} only covers {}",
                self.path.display(),
                model.bounds()
            ),
        })
    }
}
