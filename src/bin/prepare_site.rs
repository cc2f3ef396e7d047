//! Site preparation binary: picks a building site in a snapshot and records
//! the clear and fill instructions needed to level it.
//!
//! Usage: cargo run --release --bin prepare_site -- [OPTIONS]
//!
//! Options:
//!   --snapshot <PATH>   Snapshot JSON to load (default: generate one)
//!   --seed <SEED>       Seed for a generated snapshot (default: 12345)
//!   --size <N>          Edge length of a generated snapshot (default: 64)
//!   --origin <X,Z>      Origin of a generated snapshot (default: 0,0)
//!   --config <PATH>     Site configuration JSON (default: built-in defaults)
//!   --footprint <W,D>   Override the footprint size
//!   --edits-out <PATH>  Write the edit log as JSON
//!   --site-out <PATH>   Write the site descriptor as JSON
//!   --preview <PATH>    Write a PNG of the prepared terrain
//!   --compare           Scan every heightmap variant and report the best site of each

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use glam::{IVec2, UVec2};

use siteprep::core::{Error, Result};
use siteprep::math::RegionBounds;
use siteprep::render::PreviewRenderer;
use siteprep::site::{SiteConfig, SitePreparation, SitePreparer};
use siteprep::terrain::ElevationModel;
use siteprep::world::{EditLog, ElevationSource, SnapshotFile, SyntheticParams, SyntheticRegion};

fn main() -> ExitCode {
    siteprep::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ Error::NoSuitableArea { .. }) => {
            println!("No site: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut config = match parse_str_arg(args, "--config") {
        Some(path) => SiteConfig::load(Path::new(&path))?,
        None => SiteConfig::default(),
    };
    if let Some(fp) = parse_pair_arg(args, "--footprint") {
        config.footprint_width = fp.x.max(0) as u32;
        config.footprint_depth = fp.y.max(0) as u32;
    }

    let model = load_model(args)?;
    let preparer = SitePreparer::new(config)?;
    let cfg = preparer.config();

    println!("=== Siteprep Site Preparation ===");
    println!("Region:    {}", model.bounds());
    println!("Footprint: {} x {}", cfg.footprint_width, cfg.footprint_depth);
    println!("Smoothing: window {}, sigma {}, margin {}", cfg.smoothing_window, cfg.outlier_sigma, cfg.smoothing_margin);
    println!();

    if args.iter().any(|a| a == "--compare") {
        println!("Heightmap comparison:");
        for scan in preparer.compare_heightmaps(&model)? {
            match scan.result {
                Ok(c) => println!(
                    "  {:<28} ({}, {}) score {:.4}",
                    scan.kind.name(), c.rect.x, c.rect.z, c.score
                ),
                Err(e) => println!("  {:<28} none: {}", scan.kind.name(), e),
            }
        }
        println!();
    }

    let start = Instant::now();
    let mut log = EditLog::new();
    let prep = preparer.prepare(&model, &mut log)?;
    report(&prep, start.elapsed().as_secs_f64());

    if let Some(path) = parse_str_arg(args, "--edits-out") {
        log.save(Path::new(&path))?;
        println!("Edits:   {}", path);
    }
    if let Some(path) = parse_str_arg(args, "--site-out") {
        std::fs::write(&path, serde_json::to_string_pretty(&prep.site)?)?;
        println!("Site:    {}", path);
    }
    if let Some(path) = parse_str_arg(args, "--preview") {
        let masks = preparer.masks(&model)?;
        PreviewRenderer::default().save(
            Path::new(&path),
            &prep.final_elevation,
            Some(&masks),
            Some(prep.footprint),
        )?;
        println!("Preview: {}", path);
    }
    Ok(())
}

fn load_model(args: &[String]) -> Result<ElevationModel> {
    if let Some(path) = parse_str_arg(args, "--snapshot") {
        let file = SnapshotFile::new(PathBuf::from(path));
        return file.load();
    }

    let size = parse_u32_arg(args, "--size").unwrap_or(64);
    let origin = parse_pair_arg(args, "--origin").unwrap_or(IVec2::ZERO);
    let params = SyntheticParams {
        seed: parse_u32_arg(args, "--seed").unwrap_or(12345),
        ..Default::default()
    };
    log::info!("No snapshot given, generating seed {}", params.seed);
    SyntheticRegion::new(params).elevation_snapshot(&RegionBounds::new(origin, UVec2::splat(size)))
}

fn report(prep: &SitePreparation, seconds: f64) {
    let site = &prep.site;
    println!("=== Site Prepared ===");
    println!("Origin:   ({}, {})", site.origin_x, site.origin_z);
    println!("Size:     {} x {}", site.width, site.depth);
    println!("Floor:    y = {}", site.floor_height);
    println!("Score:    {:.4}", prep.score);
    if prep.smoothed {
        println!("Foliage:  {} outliers smoothed", prep.outliers);
    }
    println!("Clears:   {}", prep.clears_issued());
    println!("Fills:    {}", prep.fills_issued());
    if prep.write_failures > 0 {
        println!("Rejected: {}", prep.write_failures);
    }
    println!("Time:     {:.1}ms", seconds * 1000.0);
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_pair_arg(args: &[String], flag: &str) -> Option<IVec2> {
    let s = parse_str_arg(args, flag)?;
    let (a, b) = s.split_once(',')?;
    Some(IVec2::new(a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
