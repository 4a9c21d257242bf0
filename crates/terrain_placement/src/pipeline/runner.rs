//! High-level runner: grid construction, terrain analysis and per-request mask synthesis.
use std::collections::{BTreeMap, HashMap};

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::distribution::{
    ClusteredParams, DistributionInput, DistributionParams, DistributionStrategy, NaturalParams,
    PlacementMask,
};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::pipeline::events::{EventSink, PlacementEvent, PlacementEventKind};
use crate::pipeline::postprocess::{MaskPostProcess, SpacingThinning};
use crate::pipeline::request::ObjectRequest;
use crate::pipeline::seed::seed_for_request;
use crate::rules::{CustomRules, ObjectDefinition, ObjectTypeId, RuleTable};
use crate::suitability::score_request;
use crate::terrain::analyzer::{AnalysisReport, TerrainAnalyzer, DEFAULT_SUB_SAMPLES};
use crate::terrain::height::HeightSource;

/// Default number of cells per grid axis.
pub const DEFAULT_GRID_SIZE: usize = 1024;

/// Configuration for a placement run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Size of the map in world units; the map covers `[0, x) x [0, y)`.
    pub map_extent: Vec2,
    /// Cells per axis.
    pub grid_size: usize,
    /// Height sub-samples per cell axis.
    pub sub_samples: usize,
    /// Natural and clustered strategy parameters.
    pub distribution: DistributionParams,
    /// Base seed; each request derives its own stream from it.
    pub seed: u64,
    /// Run [`SpacingThinning`] on every mask.
    pub enforce_spacing: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            map_extent: Vec2::ZERO,
            grid_size: DEFAULT_GRID_SIZE,
            sub_samples: DEFAULT_SUB_SAMPLES,
            distribution: DistributionParams::default(),
            seed: 0,
            enforce_spacing: false,
        }
    }
}

impl PipelineConfig {
    /// Creates a new [`PipelineConfig`] with the specified map extent.
    pub fn new(map_extent: Vec2) -> Self {
        Self {
            map_extent,
            ..Default::default()
        }
    }

    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_sub_samples(mut self, sub_samples: usize) -> Self {
        self.sub_samples = sub_samples;
        self
    }

    pub fn with_natural(mut self, natural: NaturalParams) -> Self {
        self.distribution.natural = natural;
        self
    }

    pub fn with_clustered(mut self, clustered: ClusteredParams) -> Self {
        self.distribution.clustered = clustered;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_enforce_spacing(mut self, enforce_spacing: bool) -> Self {
        self.enforce_spacing = enforce_spacing;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        let e = self.map_extent;
        if !e.is_finite() || e.x <= 0.0 || e.y <= 0.0 {
            return Err(Error::InvalidConfig(
                "map_extent must be finite and > 0 in both components".into(),
            ));
        }
        if self.grid_size == 0 {
            return Err(Error::InvalidConfig("grid_size must be > 0".into()));
        }
        if self.sub_samples == 0 {
            return Err(Error::InvalidConfig("sub_samples must be > 0".into()));
        }
        self.distribution.validate()
    }
}

/// Non-fatal outcome recorded while running requests.
#[derive(Debug)]
pub enum Diagnostic {
    /// The request was not processed and produced no mask.
    RequestSkipped {
        index: usize,
        object_type: ObjectTypeId,
        reason: Error,
    },
    /// The request was processed but failed; it produced no mask.
    RequestFailed {
        index: usize,
        object_type: ObjectTypeId,
        error: Error,
    },
    /// A fallback was taken, or the run itself looked degenerate.
    Warning { context: String, message: String },
}

/// Result of a placement run.
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct PlacementResult {
    /// One mask per successfully processed object type.
    pub masks: BTreeMap<ObjectTypeId, PlacementMask>,
    pub diagnostics: Vec<Diagnostic>,
    /// Terrain analysis summary.
    pub report: AnalysisReport,
}

impl PlacementResult {
    pub fn mask(&self, object_type: &str) -> Option<&PlacementMask> {
        self.masks.get(object_type)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::RequestSkipped { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::RequestFailed { .. }))
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::Warning { .. }))
    }
}

/// Runs requests against one rule table.
pub struct PlacementRunner<'a> {
    /// Run configuration applied to this runner.
    pub config: PipelineConfig,
    /// Rule table used to resolve object types.
    pub rules: &'a RuleTable,
    post_processes: Vec<Box<dyn MaskPostProcess>>,
}

impl<'a> PlacementRunner<'a> {
    pub fn try_new(config: PipelineConfig, rules: &'a RuleTable) -> Result<Self> {
        config.validate()?;
        rules.validate()?;
        let mut post_processes: Vec<Box<dyn MaskPostProcess>> = Vec::new();
        if config.enforce_spacing {
            post_processes.push(Box::new(SpacingThinning));
        }
        Ok(Self {
            config,
            rules,
            post_processes,
        })
    }

    /// Appends a post-process pass; passes run in insertion order on every mask.
    pub fn with_post_process(mut self, pass: Box<dyn MaskPostProcess>) -> Self {
        self.post_processes.push(pass);
        self
    }

    /// Builds the grid and analyzes the height source over it.
    pub fn analyze(&self, height: &dyn HeightSource) -> Result<(Grid, AnalysisReport)> {
        let mut grid = Grid::try_new(self.config.map_extent, self.config.grid_size)?;
        let report = TerrainAnalyzer::new(self.config.sub_samples).analyze(&mut grid, height)?;
        Ok((grid, report))
    }

    pub fn run(
        &self,
        height: &dyn HeightSource,
        requests: &[ObjectRequest],
    ) -> Result<PlacementResult> {
        self.run_with_events(height, requests, &mut ())
    }

    pub fn run_with_events(
        &self,
        height: &dyn HeightSource,
        requests: &[ObjectRequest],
        sink: &mut dyn EventSink,
    ) -> Result<PlacementResult> {
        if sink.wants(PlacementEventKind::RunStarted) {
            sink.send(PlacementEvent::RunStarted {
                config: self.config.clone(),
                request_count: requests.len(),
            });
        }
        info!(
            "Placement run: {} requests | grid {}x{} over {}x{}.",
            requests.len(),
            self.config.grid_size,
            self.config.grid_size,
            self.config.map_extent.x,
            self.config.map_extent.y,
        );

        let (grid, report) = self.analyze(height)?;
        if report.faulted_cells > 0 {
            warn!(
                "Height source returned invalid samples in {} cells; every request will fail.",
                report.faulted_cells
            );
        }
        if sink.wants(PlacementEventKind::TerrainAnalyzed) {
            sink.send(PlacementEvent::TerrainAnalyzed {
                report: report.clone(),
            });
        }

        let mut result = self.run_on_grid(&grid, requests, sink);
        result.report = report;
        Ok(result)
    }

    /// Processes requests against an already analyzed grid.
    pub fn run_on_grid(
        &self,
        grid: &Grid,
        requests: &[ObjectRequest],
        sink: &mut dyn EventSink,
    ) -> PlacementResult {
        let mut result = PlacementResult::default();

        if requests.is_empty() {
            warn!("Placement run has no requests.");
            warning(&mut result, sink, "run".into(), "no requests".into());
        }

        let jobs = self.plan(requests, &mut result, sink);
        let skipped = result.skipped().count();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<Result<(PlacementMask, f32)>> =
            jobs.par_iter().map(|job| self.execute(grid, job)).collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<Result<(PlacementMask, f32)>> =
            jobs.iter().map(|job| self.execute(grid, job)).collect();

        let mut failed = 0;
        for (job, outcome) in jobs.iter().zip(outcomes) {
            let object_type = job.request.object_type.clone();
            if sink.wants(PlacementEventKind::RequestStarted) {
                sink.send(PlacementEvent::RequestStarted {
                    index: job.index,
                    object_type: object_type.clone(),
                    strategy: job.strategy,
                });
            }
            match outcome {
                Ok((mask, mean_suitability)) => {
                    let cells_set = mask.count_set();
                    info!(
                        "Request {}: '{}' ({}) | {} cells permitted.",
                        job.index, object_type, job.strategy, cells_set
                    );
                    if sink.wants(PlacementEventKind::MaskGenerated) {
                        sink.send(PlacementEvent::MaskGenerated {
                            index: job.index,
                            object_type: object_type.clone(),
                            cells_set,
                            mean_suitability,
                        });
                    }
                    result.masks.insert(object_type, mask);
                }
                Err(error) => {
                    warn!("Request {} ('{}') failed: {}", job.index, object_type, error);
                    failed += 1;
                    if sink.wants(PlacementEventKind::RequestFailed) {
                        sink.send(PlacementEvent::RequestFailed {
                            index: job.index,
                            object_type: object_type.clone(),
                            error: error.to_string(),
                        });
                    }
                    result.diagnostics.push(Diagnostic::RequestFailed {
                        index: job.index,
                        object_type,
                        error,
                    });
                }
            }
        }

        debug!(
            "Placement run finished: {} masks, {} skipped, {} failed.",
            result.masks.len(),
            skipped,
            failed
        );
        if sink.wants(PlacementEventKind::RunFinished) {
            sink.send(PlacementEvent::RunFinished {
                masks_generated: result.masks.len(),
                requests_skipped: skipped,
                requests_failed: failed,
            });
        }
        result
    }

    /// Resolves requests into jobs in ascending priority order.
    ///
    /// Unknown types and repeated types are skipped; only the first request per type
    /// (in priority order) runs. Unknown subtypes and strategy names fall back with
    /// a warning.
    fn plan<'r>(
        &self,
        requests: &'r [ObjectRequest],
        result: &mut PlacementResult,
        sink: &mut dyn EventSink,
    ) -> Vec<Job<'r>>
    where
        'a: 'r,
    {
        let mut resolved: Vec<(usize, &'r ObjectRequest, &'r ObjectDefinition)> = Vec::new();
        for (index, request) in requests.iter().enumerate() {
            match self.rules.resolve(&request.object_type) {
                Ok(definition) => resolved.push((index, request, definition)),
                Err(reason) => skip(result, sink, index, request, reason),
            }
        }
        resolved.sort_by_key(|(_, _, definition)| definition.priority);

        let mut first_index: HashMap<&str, usize> = HashMap::new();
        let mut jobs = Vec::with_capacity(resolved.len());
        for (index, request, definition) in resolved {
            if let Some(&first) = first_index.get(request.object_type.as_str()) {
                let reason = Error::Other(format!(
                    "duplicate request for '{}'; request {first} takes precedence",
                    request.object_type
                ));
                skip(result, sink, index, request, reason);
                continue;
            }
            first_index.insert(&request.object_type, index);

            let context = format!("request:{index}:{}", request.object_type);
            let rules = match request.subtype.as_deref() {
                None => CustomRules::default(),
                Some(name) => match definition.subtype(name) {
                    Some(subtype) => subtype.rules,
                    None => {
                        warn!(
                            "Unknown subtype '{}' for '{}'; no custom rules applied.",
                            name, request.object_type
                        );
                        warning(
                            result,
                            sink,
                            context.clone(),
                            format!("unknown subtype '{name}'; no custom rules applied"),
                        );
                        CustomRules::default()
                    }
                },
            };

            let strategy = match request.distribution.as_deref() {
                None => definition.default_distribution,
                Some(name) => match name.parse::<DistributionStrategy>() {
                    Ok(strategy) => strategy,
                    Err(_) => {
                        let fallback = definition.default_distribution;
                        warn!(
                            "Unknown distribution '{}' for '{}'; using '{}'.",
                            name, request.object_type, fallback
                        );
                        warning(
                            result,
                            sink,
                            context,
                            format!("unknown distribution '{name}'; using '{fallback}'"),
                        );
                        fallback
                    }
                },
            };

            jobs.push(Job {
                index,
                request,
                definition,
                rules,
                strategy,
            });
        }
        jobs
    }

    /// Scores, distributes and post-processes one job with its own RNG stream.
    fn execute(&self, grid: &Grid, job: &Job<'_>) -> Result<(PlacementMask, f32)> {
        let suitability = score_request(grid, job.request, job.definition)?;
        let distribution = job
            .strategy
            .build(&self.config.distribution, &job.rules);
        let mut rng = StdRng::seed_from_u64(seed_for_request(
            self.config.seed,
            &job.request.object_type,
        ));
        let mut mask = distribution
            .distribute(&DistributionInput::try_new(grid, &suitability)?, &mut rng)
            .with_object_type(job.request.object_type.clone());
        for pass in &self.post_processes {
            pass.apply(grid, job.definition, &mut mask);
        }
        let mean = suitability.mean();
        debug!(
            "'{}': mean suitability {:.3}, {} cells after {} post-process passes.",
            job.request.object_type,
            mean,
            mask.count_set(),
            self.post_processes.len()
        );
        Ok((mask, mean))
    }
}

struct Job<'r> {
    index: usize,
    request: &'r ObjectRequest,
    definition: &'r ObjectDefinition,
    rules: CustomRules,
    strategy: DistributionStrategy,
}

fn skip(
    result: &mut PlacementResult,
    sink: &mut dyn EventSink,
    index: usize,
    request: &ObjectRequest,
    reason: Error,
) {
    warn!("Skipping request {} ('{}'): {}", index, request.object_type, reason);
    if sink.wants(PlacementEventKind::RequestSkipped) {
        sink.send(PlacementEvent::RequestSkipped {
            index,
            object_type: request.object_type.clone(),
            reason: reason.to_string(),
        });
    }
    result.diagnostics.push(Diagnostic::RequestSkipped {
        index,
        object_type: request.object_type.clone(),
        reason,
    });
}

fn warning(result: &mut PlacementResult, sink: &mut dyn EventSink, context: String, message: String) {
    if sink.wants(PlacementEventKind::Warning) {
        sink.send(PlacementEvent::Warning {
            context: context.clone(),
            message: message.clone(),
        });
    }
    result.diagnostics.push(Diagnostic::Warning { context, message });
}

/// Runs `requests` over `height` with a fresh runner.
///
/// Returns `Err` only for invalid configuration or rule tables; per-request problems
/// are reported through [`PlacementResult::diagnostics`].
pub fn run_pipeline(
    config: &PipelineConfig,
    rules: &RuleTable,
    height: &dyn HeightSource,
    requests: &[ObjectRequest],
) -> Result<PlacementResult> {
    run_pipeline_with_events(config, rules, height, requests, &mut ())
}

pub fn run_pipeline_with_events(
    config: &PipelineConfig,
    rules: &RuleTable,
    height: &dyn HeightSource,
    requests: &[ObjectRequest],
    sink: &mut dyn EventSink,
) -> Result<PlacementResult> {
    PlacementRunner::try_new(config.clone(), rules)?.run_with_events(height, requests, sink)
}
