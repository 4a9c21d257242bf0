//! Event types and sinks for observing placement runs.
//!
//! This module defines [`PlacementEvent`] and a set of sinks to emit, collect, or
//! forward events while executing requests via
//! [`crate::pipeline::runner::PlacementRunner`] or
//! [`crate::pipeline::runner::run_pipeline_with_events`].
use crate::distribution::DistributionStrategy;
use crate::pipeline::runner::PipelineConfig;
use crate::rules::ObjectTypeId;
use crate::terrain::analyzer::AnalysisReport;

/// Describes events emitted by placement runs.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlacementEvent {
    /// Emitted when a run starts.
    RunStarted {
        /// The run configuration used.
        config: PipelineConfig,
        /// Number of requests passed to the run.
        request_count: usize,
    },

    /// Emitted once the grid has been analyzed.
    TerrainAnalyzed { report: AnalysisReport },

    /// Emitted for each processed request in priority order, before its outcome.
    RequestStarted {
        /// Position of the request in the caller's list.
        index: usize,
        object_type: ObjectTypeId,
        /// Strategy the request resolved to.
        strategy: DistributionStrategy,
    },

    /// Emitted when a mask was produced for a request.
    MaskGenerated {
        index: usize,
        object_type: ObjectTypeId,
        /// Number of permitted cells in the final mask.
        cells_set: usize,
        /// Mean suitability over the grid.
        mean_suitability: f32,
    },

    /// Emitted when a request was not processed.
    RequestSkipped {
        index: usize,
        object_type: ObjectTypeId,
        reason: String,
    },

    /// Emitted when a request failed, e.g. on corrupted terrain.
    RequestFailed {
        index: usize,
        object_type: ObjectTypeId,
        error: String,
    },

    /// Non-fatal warning generated during the run.
    Warning {
        /// Context string (e.g. request index, object type).
        context: String,
        /// Human-readable message.
        message: String,
    },

    /// Emitted when the run finishes.
    RunFinished {
        masks_generated: usize,
        requests_skipped: usize,
        requests_failed: usize,
    },
}

/// Discriminant of a [`PlacementEvent`], used for sink filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementEventKind {
    RunStarted,
    TerrainAnalyzed,
    RequestStarted,
    MaskGenerated,
    RequestSkipped,
    RequestFailed,
    Warning,
    RunFinished,
}

impl PlacementEvent {
    pub fn kind(&self) -> PlacementEventKind {
        match self {
            PlacementEvent::RunStarted { .. } => PlacementEventKind::RunStarted,
            PlacementEvent::TerrainAnalyzed { .. } => PlacementEventKind::TerrainAnalyzed,
            PlacementEvent::RequestStarted { .. } => PlacementEventKind::RequestStarted,
            PlacementEvent::MaskGenerated { .. } => PlacementEventKind::MaskGenerated,
            PlacementEvent::RequestSkipped { .. } => PlacementEventKind::RequestSkipped,
            PlacementEvent::RequestFailed { .. } => PlacementEventKind::RequestFailed,
            PlacementEvent::Warning { .. } => PlacementEventKind::Warning,
            PlacementEvent::RunFinished { .. } => PlacementEventKind::RunFinished,
        }
    }
}

/// A generic event sink that accepts [`PlacementEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlacementEvent);

    /// Whether the sink cares about events of `kind`. Callers skip building
    /// events the sink does not want.
    #[inline]
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PlacementEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlacementEvent) {}

    #[inline]
    fn wants(&self, _kind: PlacementEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlacementEvent),
{
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlacementEvent>,
    only: Option<Vec<PlacementEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the listed kinds.
    pub fn filtered(kinds: impl IntoIterator<Item = PlacementEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<PlacementEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlacementEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlacementEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PlacementEventKind) -> bool {
        self.only.as_ref().is_none_or(|only| only.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: PlacementEvent) {
        let kind = event.kind();
        let mut targets: Vec<&mut S> = self.sinks.iter_mut().filter(|s| s.wants(kind)).collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for sink in targets {
            sink.send(event.clone());
        }
        last.send(event);
    }

    fn wants(&self, kind: PlacementEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
