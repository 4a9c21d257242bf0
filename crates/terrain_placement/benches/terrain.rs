mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;
use terrain_placement::grid::Grid;
use terrain_placement::terrain::analyzer::TerrainAnalyzer;

const SUB_SAMPLES: [usize; 3] = [1, 3, 5];

fn terrain_analyze_benches(c: &mut Criterion) {
    let source = common::hills();

    for &sub_samples in &SUB_SAMPLES {
        let mut group = c.benchmark_group(format!("terrain/analyze/sub_samples_{sub_samples}"));
        let analyzer = TerrainAnalyzer::new(sub_samples);

        for &grid_size in &common::GRID_SIZES {
            group.throughput(common::elements_throughput(grid_size * grid_size));
            group.bench_with_input(
                BenchmarkId::from_parameter(grid_size),
                &grid_size,
                |b, &size| {
                    b.iter(|| {
                        let mut grid =
                            Grid::try_new(Vec2::splat(common::MAP_EXTENT), size).expect("grid");
                        let report = analyzer.analyze(&mut grid, &source).expect("analysis");
                        black_box(report.peaks);
                    });
                },
            );
        }

        group.finish();
    }
}

fn terrain_radius_query_benches(c: &mut Criterion) {
    let grid = common::analyzed_grid(256);
    let center = Vec2::splat(common::MAP_EXTENT * 0.5);
    let mut group = c.benchmark_group("terrain/cells_in_radius");

    for &radius in &[4.0_f32, 16.0, 64.0] {
        let expected = grid.indices_in_radius(center, radius).len();
        group.throughput(common::elements_throughput(expected));
        group.bench_with_input(BenchmarkId::from_parameter(radius), &radius, |b, &r| {
            b.iter(|| black_box(grid.cells_in_radius(center, r).len()));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = terrain_analyze_benches, terrain_radius_query_benches
}
criterion_main!(benches);
