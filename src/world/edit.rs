//! Column edit instructions issued against the world.

use serde::{Deserialize, Serialize};

use crate::core::types::IVec2;

/// A single column edit, in world coordinates.
///
/// Spans are `(from_exclusive, to_inclusive]` along y.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOp {
    /// Remove every block in the span (replace with air)
    ClearColumn {
        x: i32,
        z: i32,
        from_exclusive: i32,
        to_inclusive: i32,
    },
    /// Place `material` in every cell of the span
    FillColumn {
        x: i32,
        z: i32,
        from_exclusive: i32,
        to_inclusive: i32,
        material: String,
    },
}

impl EditOp {
    /// World column this edit touches
    pub fn column(&self) -> IVec2 {
        match self {
            EditOp::ClearColumn { x, z, .. } | EditOp::FillColumn { x, z, .. } => IVec2::new(*x, *z),
        }
    }

    /// Number of blocks in the span
    pub fn block_count(&self) -> u32 {
        match self {
            EditOp::ClearColumn { from_exclusive, to_inclusive, .. }
            | EditOp::FillColumn { from_exclusive, to_inclusive, .. } => {
                (*to_inclusive as i64 - *from_exclusive as i64).max(0) as u32
            }
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, EditOp::ClearColumn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count() {
        let op = EditOp::ClearColumn { x: 0, z: 0, from_exclusive: 64, to_inclusive: 84 };
        assert_eq!(op.block_count(), 20);
        assert!(op.is_removal());

        let empty = EditOp::FillColumn {
            x: 0, z: 0, from_exclusive: 70, to_inclusive: 70, material: "dirt".into(),
        };
        assert_eq!(empty.block_count(), 0);
        assert!(!empty.is_removal());
    }

    #[test]
    fn test_block_count_full_height_span() {
        let op = EditOp::ClearColumn { x: 0, z: 0, from_exclusive: i32::MIN, to_inclusive: i32::MAX };
        assert_eq!(op.block_count(), u32::MAX);
    }

    #[test]
    fn test_json_shape() {
        let op = EditOp::FillColumn {
            x: 3, z: -4, from_exclusive: 60, to_inclusive: 62, material: "cobblestone".into(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "fill_column");
        assert_eq!(json["z"], -4);
        assert_eq!(op.column(), IVec2::new(3, -4));
        let back: EditOp = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }
}
