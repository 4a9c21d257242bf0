use glam::Vec2;
use terrain_placement::prelude::*;
use terrain_placement_examples::{
    init_tracing, island_heights, render_result_to_png, MaskStyle, RenderConfig,
};

const RULES: &str = r#"{
    "reeds": (
        constraints: (max_height: 0.2, requires_water: true),
        default_distribution: Water,
        subtypes: { "marsh": (rules: (require_water_edge: true)) },
    ),
    "village": (
        constraints: (max_slope: 0.15, min_height: 0.12, max_height: 0.5, avoid_water: true),
        priority: -1,
        default_distribution: Clustered,
        subtypes: { "hamlet": (rules: (require_flat_area: true, require_water_access: true)) },
    ),
    "pines": (
        constraints: (max_slope: 0.6, min_height: 0.3),
        priority: 5,
        default_distribution: Natural,
        subtypes: { "alpine": (scale_range: (0.7, 1.1), rules: (prefer_higher_elevation: true)) },
    ),
}"#;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let rules = RuleTable::from_ron_str(RULES)?;
    let map_extent = Vec2::splat(200.0);
    let heights = island_heights(map_extent, 200, 3)?;

    let requests = [
        ObjectRequest::new("pines")
            .with_subtype("alpine")
            .with_density(0.8)
            .with_terrain(TerrainAffinity::Hills),
        // Unknown strategy name: falls back to the definition default.
        ObjectRequest::new("village")
            .with_subtype("hamlet")
            .with_anchor(map_extent * 0.5, 40.0)
            .with_distribution("poisson"),
        ObjectRequest::new("reeds").with_subtype("marsh").with_density(0.7),
        // Not in the table: reported as skipped.
        ObjectRequest::new("lighthouse"),
    ];

    let config = PipelineConfig::new(map_extent)
        .with_grid_size(100)
        .with_seed(3);
    let runner = PlacementRunner::try_new(config, &rules)?;
    let (grid, report) = runner.analyze(&heights)?;
    println!(
        "terrain: {} peaks, {} valleys, {} ridges",
        report.peaks, report.valleys, report.ridges
    );

    let result = runner.run_on_grid(&grid, &requests, &mut ());
    for d in &result.diagnostics {
        println!("diagnostic: {d:?}");
    }

    let render = RenderConfig::new(5)
        .with_style("pines", MaskStyle::solid([25, 80, 40]))
        .with_style("village", MaskStyle::solid([200, 60, 40]))
        .with_style("reeds", MaskStyle { color: [170, 200, 90], opacity: 0.8 });
    render_result_to_png(&grid, &result, &render, "placement-rules-from-ron.png")
}
