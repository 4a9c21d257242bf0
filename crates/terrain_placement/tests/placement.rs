use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use terrain_placement::prelude::*;

const EXTENT: f32 = 32.0;
const GRID: usize = 32;

fn config(seed: u64) -> PipelineConfig {
    PipelineConfig::new(Vec2::splat(EXTENT))
        .with_grid_size(GRID)
        .with_seed(seed)
}

/// Valley running along x with a lake at the bottom and a ridge of hills on both sides.
fn valley() -> impl HeightSource {
    FnHeightSource::new(|p: Vec2| {
        let u = p / EXTENT;
        let across = (u.y - 0.5).abs() * 2.0;
        let ripple = 0.1 * (u.x * 14.0).sin();
        (0.02 + 0.8 * across + ripple * across).clamp(0.0, 1.0)
    })
}

fn gated() -> PlacementConstraints {
    PlacementConstraints {
        max_slope: 0.2,
        min_height: 0.3,
        max_height: 0.7,
        ..Default::default()
    }
}

fn table() -> RuleTable {
    let mut table = RuleTable::new();
    for strategy in DistributionStrategy::ALL {
        table.insert(
            strategy.name(),
            ObjectDefinition::new(gated()).with_default_distribution(strategy),
        );
    }
    table
        .with(
            "tree",
            ObjectDefinition::default()
                .with_priority(1)
                .with_default_distribution(DistributionStrategy::Natural),
        )
        .with(
            "boulder",
            ObjectDefinition::default()
                .with_priority(0)
                .with_default_distribution(DistributionStrategy::Clustered),
        )
        .with(
            "fish",
            ObjectDefinition::default()
                .with_default_distribution(DistributionStrategy::Water)
                .with_subtype(
                    "deep",
                    SubtypeDefinition::new(CustomRules {
                        require_deep_water: true,
                        ..Default::default()
                    }),
                ),
        )
}

fn mixed_requests() -> Vec<ObjectRequest> {
    vec![
        ObjectRequest::new("tree").with_density(0.7),
        ObjectRequest::new("boulder").with_terrain(TerrainAffinity::Hills),
        ObjectRequest::new("fish").with_density(0.5),
        ObjectRequest::new("random").with_density(0.4),
    ]
}

#[test]
fn same_seed_reproduces_every_mask() {
    let rules = table();
    let a = run_pipeline(&config(9), &rules, &valley(), &mixed_requests()).unwrap();
    let b = run_pipeline(&config(9), &rules, &valley(), &mixed_requests()).unwrap();
    assert_eq!(a.masks, b.masks);
    assert_eq!(a.masks.len(), 4);

    let c = run_pipeline(&config(10), &rules, &valley(), &mixed_requests()).unwrap();
    assert_ne!(a.masks, c.masks);
}

#[test]
fn masks_have_grid_shape_and_binary_values() {
    let result = run_pipeline(&config(1), &table(), &valley(), &mixed_requests()).unwrap();
    for (object_type, mask) in &result.masks {
        assert_eq!(&mask.object_type, object_type);
        assert_eq!(mask.len(), GRID * GRID);
        assert_eq!(mask.grid_size, GRID);
        assert_eq!(mask.map_extent, Vec2::splat(EXTENT));
        assert!(mask.as_slice().iter().all(|&v| v <= 1));
    }
}

#[test]
fn hard_gate_holds_for_every_strategy() {
    let rules = table();
    let runner = PlacementRunner::try_new(config(3), &rules).unwrap();
    let (grid, _) = runner.analyze(&valley()).unwrap();
    let requests: Vec<_> = DistributionStrategy::ALL
        .iter()
        .map(|s| ObjectRequest::new(s.name()))
        .collect();
    let result = runner.run_on_grid(&grid, &requests, &mut ());
    assert_eq!(result.masks.len(), DistributionStrategy::ALL.len());

    let c = gated();
    for (object_type, mask) in &result.masks {
        let definition = rules.get(object_type).unwrap();
        let request = ObjectRequest::new(object_type.clone());
        let suitability = score_request(&grid, &request, definition).unwrap();
        for (idx, cell) in grid.cells().iter().enumerate() {
            let t = &cell.terrain;
            let fails = t.slope > c.max_slope || t.height < c.min_height || t.height > c.max_height;
            if fails {
                assert_eq!(suitability.values()[idx], 0.0);
                assert!(!mask.is_set_index(idx), "{object_type} set gated cell {idx}");
            }
        }
    }
}

#[test]
fn suitability_is_clamped() {
    let mut grid = Grid::try_new(Vec2::splat(EXTENT), GRID).unwrap();
    TerrainAnalyzer::default().analyze(&mut grid, &valley()).unwrap();
    let definition = ObjectDefinition::default().with_subtype(
        "tall",
        SubtypeDefinition::new(CustomRules {
            prefer_higher_elevation: true,
            prefer_steep_slopes: true,
            ..Default::default()
        }),
    );
    for location in [
        LocationDescriptor::Anywhere,
        LocationDescriptor::Terrain(TerrainAffinity::Flatlands),
        LocationDescriptor::Anchor {
            point: Vec2::splat(5.0),
            radius: 8.0,
        },
    ] {
        let request = ObjectRequest::new("x")
            .with_subtype("tall")
            .with_density(5.0)
            .with_location(location);
        let map = score_request(&grid, &request, &definition).unwrap();
        assert!(map.values().iter().all(|&s| (0.0..=1.0).contains(&s)));
    }
}

#[test]
fn natural_masks_never_keep_low_suitability_cells() {
    let rules = table();
    let runner = PlacementRunner::try_new(config(5), &rules).unwrap();
    let (grid, _) = runner.analyze(&valley()).unwrap();
    let request = ObjectRequest::new("tree").with_density(0.7);
    let result = runner.run_on_grid(&grid, std::slice::from_ref(&request), &mut ());
    let suitability = score_request(&grid, &request, rules.get("tree").unwrap()).unwrap();
    let mask = result.mask("tree").unwrap();
    assert!(mask.count_set() > 0);
    for idx in mask.set_indices() {
        assert!(suitability.values()[idx] > 0.21);
    }
}

#[test]
fn uniform_height_passes_every_cell() {
    let rules = RuleTable::new().with(
        "rock",
        ObjectDefinition::new(PlacementConstraints {
            max_slope: 0.3,
            ..Default::default()
        }),
    );
    let result = run_pipeline(
        &config(0),
        &rules,
        &ConstantHeight(0.5),
        &[ObjectRequest::new("rock")],
    )
    .unwrap();
    assert_eq!(result.mask("rock").unwrap().count_set(), GRID * GRID);
}

#[test]
fn river_affinity_on_dry_land_stays_sparse() {
    let mut grid = Grid::try_new(Vec2::splat(EXTENT), GRID).unwrap();
    let source = FnHeightSource::new(|p: Vec2| 0.2 + 0.5 * p.x / EXTENT);
    TerrainAnalyzer::default().analyze(&mut grid, &source).unwrap();
    let request = ObjectRequest::new("reed")
        .with_density(0.5)
        .with_terrain(TerrainAffinity::River);
    let map = score_request(&grid, &request, &ObjectDefinition::default()).unwrap();
    assert!(map.values().iter().all(|&s| s <= 0.05 + 1e-6));
}

#[test]
fn deep_water_subtype_only_uses_deep_cells() {
    // A single deep cell at (3, 2); everything else is dry land.
    let source = FnHeightSource::new(|p: Vec2| {
        if (3.0..4.0).contains(&p.x) && (2.0..3.0).contains(&p.y) {
            0.03
        } else {
            0.5
        }
    });
    let cfg = PipelineConfig::new(Vec2::splat(8.0)).with_grid_size(8);
    let requests = [ObjectRequest::new("fish").with_subtype("deep")];
    let result = run_pipeline(&cfg, &table(), &source, &requests).unwrap();
    let mask = result.mask("fish").unwrap();
    assert_eq!(mask.set_indices().collect::<Vec<_>>(), vec![2 * 8 + 3]);
    assert!(mask.sample_domain(Vec2::new(3.5, 2.5)));
}

#[test]
fn request_order_does_not_change_masks() {
    let rules = table();
    let forward = mixed_requests();
    let mut reversed = mixed_requests();
    reversed.reverse();
    let a = run_pipeline(&config(21), &rules, &valley(), &forward).unwrap();
    let b = run_pipeline(&config(21), &rules, &valley(), &reversed).unwrap();
    assert_eq!(a.masks, b.masks);
}

/// Rebuilds each mask one request at a time and compares with the runner, which
/// processes requests concurrently when the `parallel` feature is on.
#[test]
fn runner_matches_masks_built_one_request_at_a_time() {
    let rules = table();
    let cfg = config(33);
    let runner = PlacementRunner::try_new(cfg.clone(), &rules).unwrap();
    let (grid, _) = runner.analyze(&valley()).unwrap();
    let requests = mixed_requests();
    let result = runner.run_on_grid(&grid, &requests, &mut ());
    assert_eq!(result.masks.len(), requests.len());

    for request in &requests {
        let definition = rules.get(&request.object_type).unwrap();
        let suitability = score_request(&grid, request, definition).unwrap();
        let mut rng = StdRng::seed_from_u64(seed_for_request(cfg.seed, &request.object_type));
        let expected = definition
            .default_distribution
            .build(&cfg.distribution, &CustomRules::default())
            .distribute(&DistributionInput::try_new(&grid, &suitability).unwrap(), &mut rng);
        let actual = result.mask(&request.object_type).unwrap();
        assert_eq!(actual.as_slice(), expected.as_slice(), "{}", request.object_type);
    }
}

#[test]
fn single_cell_grid_runs_every_strategy() {
    let cfg = PipelineConfig::new(Vec2::ONE).with_grid_size(1);
    let requests: Vec<_> = DistributionStrategy::ALL
        .iter()
        .map(|s| ObjectRequest::new(s.name()))
        .collect();
    let source = FnHeightSource::new(|p: Vec2| 0.4 + 0.1 * p.x);
    let result = run_pipeline(&cfg, &table(), &source, &requests).unwrap();
    assert_eq!(result.report.cells, 1);
    assert_eq!((result.report.peaks, result.report.valleys), (0, 0));
    assert_eq!(result.masks.len(), requests.len());
    assert!(result.masks.values().all(|m| m.len() == 1));
}

#[test]
fn unknown_types_are_reported_and_skipped() {
    let requests = [
        ObjectRequest::new("dragon"),
        ObjectRequest::new("tree"),
    ];
    let mut sink = VecSink::filtered([PlacementEventKind::RequestSkipped]);
    let result =
        run_pipeline_with_events(&config(2), &table(), &valley(), &requests, &mut sink).unwrap();
    assert!(result.mask("dragon").is_none());
    assert!(result.mask("tree").is_some());
    let skipped: Vec<_> = result.skipped().collect();
    assert_eq!(skipped.len(), 1);
    match skipped[0] {
        Diagnostic::RequestSkipped {
            index,
            object_type,
            reason,
        } => {
            assert_eq!(*index, 0);
            assert_eq!(object_type, "dragon");
            assert!(matches!(reason, Error::UnknownObjectType { id } if id == "dragon"));
        }
        other => panic!("unexpected diagnostic {other:?}"),
    }
    assert_eq!(sink.len(), 1);
}

#[test]
fn corrupted_heights_fail_each_request_without_masks() {
    let source = FnHeightSource::new(|p: Vec2| if p.y > 20.0 { 1.5 } else { 0.4 });
    let requests = mixed_requests();
    let mut sink = VecSink::filtered([
        PlacementEventKind::RequestFailed,
        PlacementEventKind::RunFinished,
    ]);
    let result =
        run_pipeline_with_events(&config(4), &table(), &source, &requests, &mut sink).unwrap();
    assert!(result.masks.is_empty());
    assert_eq!(result.failures().count(), requests.len());
    let fault = result.report.first_fault.expect("fault recorded");
    assert_eq!(fault.value, 1.5);

    let finished = sink
        .into_inner()
        .into_iter()
        .find_map(|e| match e {
            PlacementEvent::RunFinished {
                requests_failed, ..
            } => Some(requests_failed),
            _ => None,
        })
        .expect("run finished");
    assert_eq!(finished, requests.len());
}
