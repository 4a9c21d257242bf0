use glam::Vec2;
use terrain_placement::prelude::*;
use terrain_placement_examples::{
    init_tracing, island_heights, render_mask_to_png, render_result_to_png, MaskStyle,
    RenderConfig,
};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let map_extent = Vec2::splat(256.0);
    let heights = island_heights(map_extent, 256, 7)?;

    let rules = rules();
    let config = PipelineConfig::new(map_extent)
        .with_grid_size(128)
        .with_seed(7);
    let runner = PlacementRunner::try_new(config, &rules)?;
    let (grid, _) = runner.analyze(&heights)?;

    let requests = [
        ObjectRequest::new("grass").with_density(0.35),
        ObjectRequest::new("forest")
            .with_subtype("pine")
            .with_density(0.9)
            .with_terrain(TerrainAffinity::Forest),
        ObjectRequest::new("boulders")
            .with_density(1.0)
            .with_terrain(TerrainAffinity::Mountains),
        ObjectRequest::new("kelp").with_subtype("shore").with_density(0.6),
    ];
    let result = runner.run_on_grid(&grid, &requests, &mut ());

    for (object_type, mask) in &result.masks {
        println!("{object_type:>10}: {:>6} cells", mask.count_set());
        render_mask_to_png(mask, format!("placement-island-{object_type}.png"))?;
    }

    let render = RenderConfig::new(4)
        .with_style("grass", MaskStyle { color: [160, 220, 90], opacity: 0.35 })
        .with_style("forest", MaskStyle::solid([20, 90, 30]))
        .with_style("boulders", MaskStyle::solid([70, 60, 55]))
        .with_style("kelp", MaskStyle::solid([40, 200, 170]));
    render_result_to_png(&grid, &result, &render, "placement-island-all-strategies.png")
}

fn rules() -> RuleTable {
    RuleTable::new()
        .with(
            "grass",
            ObjectDefinition::new(PlacementConstraints {
                max_slope: 0.4,
                min_height: 0.1,
                max_height: 0.6,
                avoid_water: true,
                ..Default::default()
            })
            .with_priority(3),
        )
        .with(
            "forest",
            ObjectDefinition::new(PlacementConstraints {
                max_slope: 0.5,
                min_height: 0.15,
                max_height: 0.75,
                avoid_water: true,
                ..Default::default()
            })
            .with_priority(2)
            .with_default_distribution(DistributionStrategy::Natural)
            .with_subtype(
                "pine",
                SubtypeDefinition::new(CustomRules {
                    prefer_higher_elevation: true,
                    ..Default::default()
                })
                .with_scale_range(0.8, 1.4),
            ),
        )
        .with(
            "boulders",
            ObjectDefinition::new(PlacementConstraints {
                min_height: 0.5,
                ..Default::default()
            })
            .with_priority(1)
            .with_default_distribution(DistributionStrategy::Clustered),
        )
        .with(
            "kelp",
            ObjectDefinition::new(PlacementConstraints {
                requires_water: true,
                ..Default::default()
            })
            .with_default_distribution(DistributionStrategy::Water)
            .with_subtype(
                "shore",
                SubtypeDefinition::new(CustomRules {
                    require_water_edge: true,
                    ..Default::default()
                }),
            ),
        )
}
