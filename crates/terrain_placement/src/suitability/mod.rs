//! Per-request suitability scoring.
//!
//! A score in `[0, 1]` is computed for every grid cell from the object definition's
//! hard constraints, the request's location descriptor, the subtype's custom rules and
//! the request density. Each request gets its own [`SuitabilityMap`]; nothing is shared
//! between requests.
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::pipeline::request::ObjectRequest;
use crate::rules::{CustomRules, ObjectDefinition};

pub mod affinity;
pub mod preferences;

pub use affinity::{location_factor, TerrainAffinity};
pub use preferences::{has_water_access, preference_factor, water_requirement_factor};

/// Row-major suitability buffer aligned with a [`Grid`].
#[derive(Clone, Debug, PartialEq)]
pub struct SuitabilityMap {
    grid_size: usize,
    values: Vec<f32>,
}

impl SuitabilityMap {
    /// Wraps raw values, clamping each into `[0, 1]` (non-finite values become 0).
    ///
    /// Fails if `values` does not hold exactly one entry per grid cell.
    pub fn try_from_values(grid: &Grid, mut values: Vec<f32>) -> Result<Self> {
        if values.len() != grid.len() {
            return Err(Error::InvalidConfig(format!(
                "suitability expects {} values, got {}",
                grid.len(),
                values.len()
            )));
        }
        for v in values.iter_mut() {
            *v = clamp_score(*v);
        }
        Ok(Self {
            grid_size: grid.grid_size(),
            values,
        })
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Mean score over all cells; 0 for an empty map.
    pub fn mean(&self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }
}

#[inline]
fn clamp_score(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Scores every cell of an analyzed grid for one request.
///
/// Fails with [`Error::DataIntegrity`] if any cell recorded an invalid height sample;
/// no partial map is produced in that case. An unknown subtype contributes no custom
/// rules.
pub fn score_request(
    grid: &Grid,
    request: &ObjectRequest,
    definition: &ObjectDefinition,
) -> Result<SuitabilityMap> {
    if let Some(fault) = grid.cells().iter().find_map(|c| c.fault) {
        return Err(Error::DataIntegrity(fault));
    }

    let rules = request
        .subtype
        .as_deref()
        .and_then(|name| definition.subtype(name))
        .map(|s| s.rules)
        .unwrap_or_default();

    #[cfg(feature = "parallel")]
    let values: Vec<f32> = (0..grid.len())
        .into_par_iter()
        .map(|idx| score_cell(grid, idx, request, definition, &rules))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let values: Vec<f32> = (0..grid.len())
        .map(|idx| score_cell(grid, idx, request, definition, &rules))
        .collect();

    SuitabilityMap::try_from_values(grid, values)
}

/// Score of a single cell, already clamped into `[0, 1]`.
pub fn score_cell(
    grid: &Grid,
    index: usize,
    request: &ObjectRequest,
    definition: &ObjectDefinition,
    rules: &CustomRules,
) -> f32 {
    let Some(cell) = grid.cells().get(index) else {
        return 0.0;
    };
    let t = &cell.terrain;
    let c = &definition.constraints;

    if t.slope > c.max_slope || t.height < c.min_height || t.height > c.max_height {
        return 0.0;
    }
    if c.avoid_water && t.is_water() {
        return 0.0;
    }

    let water_access = || has_water_access(grid, cell.coord);
    let score = location_factor(&request.location, cell.center(), t)
        * preference_factor(rules, c.max_slope, t, water_access)
        * water_requirement_factor(c, t, water_access)
        * request.density.clamp(0.0, 1.0);
    clamp_score(score)
}
