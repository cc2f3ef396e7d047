//! Siteprep - terrain suitability analysis and site preparation for voxel worlds

pub mod core;
pub mod math;
pub mod terrain;
pub mod mask;
pub mod world;
pub mod site;
pub mod render;
