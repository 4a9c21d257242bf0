//! Soft preference multipliers from subtype custom rules and definition water flags.
use crate::grid::{CellCoord, Grid};
use crate::rules::{CustomRules, PlacementConstraints};
use crate::terrain::TerrainProperties;

/// Penalty applied when a "require" rule is not met.
pub const UNMET_REQUIREMENT: f32 = 0.1;

/// Whether any Moore neighbor of `coord` is low-lying water.
pub fn has_water_access(grid: &Grid, coord: CellCoord) -> bool {
    let cells = grid.cells();
    grid.neighbor_indices(coord)
        .any(|n| cells[n].terrain.is_low_lying_water())
}

/// Product of every flagged subtype preference for one cell.
pub fn preference_factor(
    rules: &CustomRules,
    max_slope: f32,
    t: &TerrainProperties,
    water_access: impl Fn() -> bool,
) -> f32 {
    let mut factor = 1.0;
    if rules.prefer_higher_elevation {
        factor *= 0.5 + 0.5 * t.height;
    }
    if rules.prefer_lower_elevation {
        factor *= 1.0 - 0.5 * t.height;
    }
    if rules.prefer_steep_slopes && max_slope > 0.0 {
        factor *= 0.5 + 0.5 * (t.slope / max_slope);
    }
    if rules.require_flat_area && !t.features.is_flat {
        factor *= UNMET_REQUIREMENT;
    }
    if rules.require_water_access && !water_access() {
        factor *= UNMET_REQUIREMENT;
    }
    factor
}

/// Multiplier for the definition-level `requires_water` flag.
pub fn water_requirement_factor(
    constraints: &PlacementConstraints,
    t: &TerrainProperties,
    water_access: impl Fn() -> bool,
) -> f32 {
    if constraints.requires_water && !t.is_water() && !water_access() {
        UNMET_REQUIREMENT
    } else {
        1.0
    }
}
