#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec2;
use terrain_placement::grid::Grid;
use terrain_placement::terrain::analyzer::TerrainAnalyzer;
use terrain_placement::terrain::height::{FnHeightSource, HeightSource};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub const MAP_EXTENT: f32 = 512.0;
pub const GRID_SIZES: [usize; 3] = [64, 128, 256];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Rolling hills with a lake in the middle, heights in `[0, 1]`.
pub fn hills() -> impl HeightSource {
    FnHeightSource::new(|p: Vec2| {
        let u = p / MAP_EXTENT;
        let waves = 0.25 * (u.x * 12.0).sin() * (u.y * 9.0).cos();
        let bowl = (u - Vec2::splat(0.5)).length() * 1.2;
        (0.35 + waves + bowl * 0.5).clamp(0.0, 1.0)
    })
}

pub fn analyzed_grid(grid_size: usize) -> Grid {
    let mut grid = Grid::try_new(Vec2::splat(MAP_EXTENT), grid_size).expect("valid grid");
    TerrainAnalyzer::default()
        .analyze(&mut grid, &hills())
        .expect("analysis");
    grid
}
