//! Mask post-processing hooks run after distribution.
use crate::distribution::PlacementMask;
use crate::grid::Grid;
use crate::rules::ObjectDefinition;

/// Transforms a freshly distributed mask before it is returned.
///
/// Passes only see the request's own mask; they must not depend on other requests.
pub trait MaskPostProcess: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, grid: &Grid, definition: &ObjectDefinition, mask: &mut PlacementMask);
}

/// Greedy spacing pass for `min_distance_to_same_type`.
///
/// Visits set cells in row-major order and clears any whose center lies strictly
/// closer than the minimum distance to an earlier kept cell. Types that allow overlap
/// or have no minimum distance are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacingThinning;

impl MaskPostProcess for SpacingThinning {
    fn name(&self) -> &str {
        "spacing"
    }

    fn apply(&self, grid: &Grid, definition: &ObjectDefinition, mask: &mut PlacementMask) {
        let c = &definition.constraints;
        let min_distance = c.min_distance_to_same_type;
        if c.can_overlap || min_distance.is_nan() || min_distance <= 0.0 {
            return;
        }
        // Masks built for another grid are left as they are.
        if mask.len() != grid.len() {
            return;
        }

        let cells = grid.cells();
        let min_distance_sq = min_distance * min_distance;
        let set: Vec<usize> = mask.set_indices().collect();
        for idx in set {
            let center = cells[idx].center();
            let crowded = grid
                .indices_in_radius(center, min_distance)
                .into_iter()
                .filter(|&n| n < idx && mask.is_set_index(n))
                .any(|n| cells[n].center().distance_squared(center) < min_distance_sq);
            if crowded {
                mask.clear_index(idx);
            }
        }
    }
}
