//! Region generator binary: writes a synthetic elevation snapshot to disk.
//!
//! Usage: cargo run --release --bin generate_region -- [OPTIONS]
//!
//! Options:
//!   --size <N>          Region edge length in columns (default: 64)
//!   --origin <X,Z>      World column of the first cell (default: 0,0)
//!   --seed <SEED>       Random seed (default: 12345)
//!   --scale <SCALE>     Terrain noise scale (default: 60.0)
//!   --height <H>        Terrain relief in blocks (default: 24.0)
//!   --trees <P>         Tree probability per dry column (default: 0.015)
//!   --out <PATH>        Output file (default: region.json)

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use glam::{IVec2, UVec2};

use siteprep::mask::ObstructionDetector;
use siteprep::math::RegionBounds;
use siteprep::world::{ElevationSource, SnapshotFile, SyntheticParams, SyntheticRegion};

fn main() -> ExitCode {
    siteprep::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let size = parse_u32_arg(&args, "--size").unwrap_or(64);
    let origin = parse_pair_arg(&args, "--origin").unwrap_or(IVec2::ZERO);
    let defaults = SyntheticParams::default();
    let params = SyntheticParams {
        seed: parse_u32_arg(&args, "--seed").unwrap_or(defaults.seed),
        scale: parse_f32_arg(&args, "--scale").unwrap_or(defaults.scale),
        height_scale: parse_f32_arg(&args, "--height").unwrap_or(defaults.height_scale),
        tree_density: parse_f32_arg(&args, "--trees").unwrap_or(defaults.tree_density),
        ..defaults
    };
    let out = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "region.json".to_string()));

    println!("=== Siteprep Region Generator ===");
    println!("Region: {} x {} columns at ({}, {})", size, size, origin.x, origin.y);
    println!("Seed:   {}", params.seed);
    println!("Scale:  {}, Height: {}, Trees: {}", params.scale, params.height_scale, params.tree_density);
    println!("Output: {}", out.display());
    println!();

    let bounds = RegionBounds::new(origin, UVec2::splat(size));
    let start = Instant::now();
    let region = SyntheticRegion::new(params);

    let model = match region.elevation_snapshot(&bounds) {
        Ok(model) => model,
        Err(e) => {
            log::error!("Snapshot failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = SnapshotFile::save(&model, &out) {
        log::error!("Failed to write {}: {}", out.display(), e);
        return ExitCode::FAILURE;
    }

    let masks = match ObstructionDetector::detect(&model) {
        Ok(masks) => masks,
        Err(e) => {
            log::error!("Mask detection failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let surface = model.surface_with_water();

    println!("=== Generation Complete ===");
    println!("Cells:   {} in {:.1}ms", bounds.cell_count(), start.elapsed().as_secs_f64() * 1000.0);
    println!(
        "Heights: {}..{}",
        surface.min_in(surface.rect()).unwrap_or(0),
        surface.max_in(surface.rect()).unwrap_or(0)
    );
    println!("Water:   {} columns", masks.water.count());
    println!("Foliage: {} columns", masks.foliage.count());
    println!();
    println!("To pick a site in this region:");
    println!("  cargo run --release --bin prepare_site -- --snapshot {}", out.display());
    ExitCode::SUCCESS
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_pair_arg(args: &[String], flag: &str) -> Option<IVec2> {
    let s = parse_str_arg(args, flag)?;
    let (x, z) = s.split_once(',')?;
    Some(IVec2::new(x.trim().parse().ok()?, z.trim().parse().ok()?))
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
