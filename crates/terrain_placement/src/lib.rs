#![forbid(unsafe_code)]
//! terrain_placement: Terrain-aware placement masks for procedural maps.
//!
//! Modules:
//! - grid: uniform cell lattice with neighbor and radius queries
//! - terrain: height sources and per-cell terrain analysis (slopes, features, elevation classes)
//! - rules: declarative per-object-type placement rules
//! - suitability: per-request scoring of the analyzed grid
//! - distribution: strategies turning suitability into binary placement masks
//! - pipeline: requests, runner, events, post-processing
//!
//! The pipeline produces one permission bitmap per object type. Placing concrete
//! instances inside permitted cells is left to a later stage.
pub mod distribution;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod rules;
pub mod suitability;
pub mod terrain;

/// Convenient re-exports for common types. Import with `use terrain_placement::prelude::*;`.
pub mod prelude {
    pub use crate::distribution::{
        ClusteredDistribution, ClusteredParams, DistributionInput, DistributionStrategy,
        MaskDistribution, NaturalDistribution, NaturalParams, PlacementMask, RandomDistribution,
        WaterDistribution, WaterRequirement,
    };
    pub use crate::error::{Error, HeightFault, Result};
    pub use crate::grid::{Cell, CellCoord, Direction, Grid};
    pub use crate::pipeline::events::{
        EventSink, FnSink, MultiSink, PlacementEvent, PlacementEventKind, VecSink,
    };
    pub use crate::pipeline::postprocess::{MaskPostProcess, SpacingThinning};
    pub use crate::pipeline::request::{LocationDescriptor, ObjectRequest};
    pub use crate::pipeline::runner::{
        run_pipeline, run_pipeline_with_events, Diagnostic, PipelineConfig, PlacementResult,
        PlacementRunner,
    };
    pub use crate::pipeline::seed::seed_for_request;
    pub use crate::rules::{
        CustomRules, ObjectDefinition, ObjectTypeId, PlacementConstraints, RuleTable,
        SubtypeDefinition,
    };
    pub use crate::suitability::{score_request, SuitabilityMap, TerrainAffinity};
    pub use crate::terrain::analyzer::{AnalysisReport, TerrainAnalyzer};
    pub use crate::terrain::height::{ConstantHeight, FnHeightSource, HeightRaster, HeightSource};
    pub use crate::terrain::{ElevationClass, TerrainFeatures, TerrainProperties};
}
