use criterion::{criterion_group, criterion_main, Criterion, black_box};

use siteprep::mask::ObstructionDetector;
use siteprep::math::RegionBounds;
use siteprep::site::{FlatnessScanner, FoliageSmoother, GradientField, SiteConfig, SitePreparer};
use siteprep::terrain::ElevationModel;
use siteprep::world::{EditLog, ElevationSource, SyntheticParams, SyntheticRegion};

use glam::{IVec2, UVec2};

fn region(size: u32) -> ElevationModel {
    let params = SyntheticParams { tree_density: 0.03, ..Default::default() };
    SyntheticRegion::new(params)
        .elevation_snapshot(&RegionBounds::new(IVec2::new(-512, 256), UVec2::splat(size)))
        .expect("synthetic snapshot")
}

fn bench_gradient_128(c: &mut Criterion) {
    let model = region(128);

    c.bench_function("gradient_128", |b| {
        b.iter(|| GradientField::compute(black_box(model.surface_with_water())));
    });
}

fn bench_scan(c: &mut Criterion, size: u32, parallel: bool) {
    let model = region(size);
    let water = ObstructionDetector::water_mask(&model).expect("water mask");
    let scanner = FlatnessScanner::new(10, 10).with_parallel(parallel);
    let name = format!("scan_{}_{}", size, if parallel { "par" } else { "seq" });

    c.bench_function(&name, |b| {
        b.iter(|| scanner.select(black_box(model.surface_with_water()), &water, model.bounds()));
    });
}

fn bench_scan_64_seq(c: &mut Criterion) {
    bench_scan(c, 64, false);
}

fn bench_scan_128_seq(c: &mut Criterion) {
    bench_scan(c, 128, false);
}

fn bench_scan_128_par(c: &mut Criterion) {
    bench_scan(c, 128, true);
}

fn bench_smooth_region(c: &mut Criterion) {
    let model = region(64);
    let map = model.surface_with_water();
    let smoother = FoliageSmoother::default().with_parallel(false);

    c.bench_function("smooth_64_full", |b| {
        b.iter(|| smoother.smooth(black_box(map), map.rect()));
    });
}

fn bench_prepare(c: &mut Criterion) {
    let model = region(96);
    let preparer = SitePreparer::new(SiteConfig::default()).expect("default config");

    c.bench_function("prepare_96", |b| {
        b.iter(|| {
            let mut log = EditLog::new();
            let _ = preparer.prepare(black_box(&model), &mut log);
            black_box(log.len());
        });
    });
}

criterion_group!(
    benches,
    bench_gradient_128,
    bench_scan_64_seq,
    bench_scan_128_seq,
    bench_scan_128_par,
    bench_smooth_region,
    bench_prepare,
);
criterion_main!(benches);
