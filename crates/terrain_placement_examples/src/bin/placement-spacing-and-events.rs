use glam::Vec2;
use terrain_placement::prelude::*;
use terrain_placement_examples::{init_tracing, render_height_to_png, render_mask_to_png};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let map_extent = Vec2::splat(128.0);
    let heights = FnHeightSource::new(move |p: Vec2| {
        let u = p / map_extent;
        (0.3 + 0.2 * (u.x * 7.0).sin() * (u.y * 5.0).cos()).clamp(0.0, 1.0)
    });

    let rules = RuleTable::new().with(
        "houses",
        ObjectDefinition::new(PlacementConstraints {
            max_slope: 0.3,
            min_distance_to_same_type: 6.0,
            can_overlap: false,
            ..Default::default()
        }),
    );
    let requests = [ObjectRequest::new("houses")
        .with_density(0.6)
        .with_anchor(map_extent * 0.5, 48.0)];

    for enforce_spacing in [false, true] {
        let config = PipelineConfig::new(map_extent)
            .with_grid_size(64)
            .with_seed(11)
            .with_enforce_spacing(enforce_spacing);

        let mut sink = FnSink::new(|event| match event {
            PlacementEvent::MaskGenerated {
                object_type,
                cells_set,
                mean_suitability,
                ..
            } => println!(
                "spacing={enforce_spacing}: {object_type} -> {cells_set} cells (mean suitability {mean_suitability:.3})"
            ),
            PlacementEvent::TerrainAnalyzed { report } => {
                println!("analyzed {} cells, {} samples", report.cells, report.samples)
            }
            _ => {}
        });
        let result = run_pipeline_with_events(&config, &rules, &heights, &requests, &mut sink)?;

        if let Some(mask) = result.mask("houses") {
            render_mask_to_png(mask, format!("placement-houses-spacing-{enforce_spacing}.png"))?;
        }
    }

    let runner = PlacementRunner::try_new(
        PipelineConfig::new(map_extent).with_grid_size(64),
        &rules,
    )?;
    let (grid, _) = runner.analyze(&heights)?;
    render_height_to_png(&grid, "placement-houses-heights.png")
}
