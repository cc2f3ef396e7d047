//! Image previews of elevation snapshots

pub mod preview;

pub use preview::{HeightRamp, PreviewRenderer};
