//! Append-only log of column edits.

use std::path::Path;

use crate::core::Result;
use crate::math::RegionBounds;
use crate::terrain::ElevationMap;
use super::edit::EditOp;
use super::WorldEditor;

/// Records every instruction it receives instead of touching a world.
///
/// Useful as a dry run, as a replay source for a real accessor, and in tests.
#[derive(Clone, Debug, Default)]
pub struct EditLog {
    edits: Vec<EditOp>,
}

impl EditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an edit
    pub fn append(&mut self, op: EditOp) {
        self.edits.push(op);
    }

    /// All edits in issue order
    pub fn edits(&self) -> &[EditOp] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    pub fn clears(&self) -> impl Iterator<Item = &EditOp> {
        self.edits.iter().filter(|op| op.is_removal())
    }

    pub fn fills(&self) -> impl Iterator<Item = &EditOp> {
        self.edits.iter().filter(|op| !op.is_removal())
    }

    /// Heightmap after replaying the log over `map`
    pub fn apply_to(&self, map: &ElevationMap, bounds: &RegionBounds) -> ElevationMap {
        map.with_edits(bounds, &self.edits)
    }

    /// Replay every edit against another accessor, stopping at the first rejection.
    pub fn replay(&self, editor: &mut dyn WorldEditor) -> Result<usize> {
        for op in &self.edits {
            editor.apply(op)?;
        }
        Ok(self.edits.len())
    }

    /// Save as a JSON array
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.edits)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a log written by [`EditLog::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let edits = serde_json::from_str(&json)?;
        Ok(Self { edits })
    }
}

impl WorldEditor for EditLog {
    fn clear_column(&mut self, x: i32, z: i32, from_exclusive: i32, to_inclusive: i32) -> Result<()> {
        self.append(EditOp::ClearColumn { x, z, from_exclusive, to_inclusive });
        Ok(())
    }

    fn fill_column(
        &mut self,
        x: i32,
        z: i32,
        from_exclusive: i32,
        to_inclusive: i32,
        material: &str,
    ) -> Result<()> {
        self.append(EditOp::FillColumn {
            x,
            z,
            from_exclusive,
            to_inclusive,
            material: material.to_string(),
        });
        Ok(())
    }
}
