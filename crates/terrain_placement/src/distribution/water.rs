//! Water-bound distribution.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::{bernoulli, DistributionInput, MaskDistribution, PlacementMask};
use crate::grid::{CellCoord, Grid};
use crate::rules::CustomRules;

/// Which water cells a subtype may occupy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaterRequirement {
    /// Any water cell (height below 0.1).
    #[default]
    Water,
    /// Deep water only (height below 0.05).
    DeepWater,
    /// Dry cells with at least one water neighbor.
    WaterEdge,
}

impl WaterRequirement {
    /// Deep water wins over water edge when both flags are set.
    pub fn from_rules(rules: &CustomRules) -> Self {
        if rules.require_deep_water {
            WaterRequirement::DeepWater
        } else if rules.require_water_edge {
            WaterRequirement::WaterEdge
        } else {
            WaterRequirement::Water
        }
    }
}

/// Draws only on cells matching the [`WaterRequirement`]; other cells stay empty
/// without consuming a draw.
#[derive(Debug, Clone, Default)]
pub struct WaterDistribution {
    pub requirement: WaterRequirement,
}

impl WaterDistribution {
    pub fn new(requirement: WaterRequirement) -> Self {
        Self { requirement }
    }

    pub fn is_eligible(&self, grid: &Grid, coord: CellCoord) -> bool {
        let Some(cell) = grid.cell_at(coord) else {
            return false;
        };
        let terrain = &cell.terrain;
        match self.requirement {
            WaterRequirement::Water => terrain.is_water(),
            WaterRequirement::DeepWater => terrain.is_deep_water(),
            WaterRequirement::WaterEdge => {
                !terrain.is_water()
                    && grid
                        .neighbor_indices(coord)
                        .any(|n| grid.cells()[n].terrain.is_water())
            }
        }
    }
}

impl MaskDistribution for WaterDistribution {
    fn distribute(&self, input: &DistributionInput<'_>, rng: &mut dyn RngCore) -> PlacementMask {
        let mut mask = PlacementMask::for_grid(input.grid);
        for (idx, &s) in input.suitability.values().iter().enumerate() {
            let coord = input.grid.coord_of(idx);
            if self.is_eligible(input.grid, coord) && bernoulli(rng, s) {
                mask.set_index(idx);
            }
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::test_support::{uniform_map, unit_grid, FixedRng};

    fn grid_with_heights(size: usize, heights: &[f32]) -> Grid {
        let mut grid = unit_grid(size);
        for (cell, &h) in grid.cells_mut().iter_mut().zip(heights) {
            cell.terrain.height = h;
        }
        grid
    }

    #[test]
    fn requirement_from_rules_prefers_deep_water() {
        let rules = CustomRules {
            require_deep_water: true,
            require_water_edge: true,
            ..Default::default()
        };
        assert_eq!(WaterRequirement::from_rules(&rules), WaterRequirement::DeepWater);
        let rules = CustomRules {
            require_water_edge: true,
            ..Default::default()
        };
        assert_eq!(WaterRequirement::from_rules(&rules), WaterRequirement::WaterEdge);
        assert_eq!(
            WaterRequirement::from_rules(&CustomRules::default()),
            WaterRequirement::Water
        );
    }

    #[test]
    fn eligibility_by_requirement() {
        // Row 0: deep, shallow, dry; rows 1-2 dry.
        let grid = grid_with_heights(3, &[0.03, 0.08, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let deep = WaterDistribution::new(WaterRequirement::DeepWater);
        let water = WaterDistribution::new(WaterRequirement::Water);
        let edge = WaterDistribution::new(WaterRequirement::WaterEdge);

        assert!(deep.is_eligible(&grid, CellCoord::new(0, 0)));
        assert!(!deep.is_eligible(&grid, CellCoord::new(1, 0)));
        assert!(water.is_eligible(&grid, CellCoord::new(1, 0)));
        assert!(!water.is_eligible(&grid, CellCoord::new(2, 0)));
        assert!(edge.is_eligible(&grid, CellCoord::new(2, 0)));
        assert!(edge.is_eligible(&grid, CellCoord::new(1, 1)));
        assert!(!edge.is_eligible(&grid, CellCoord::new(0, 0)));
        assert!(!edge.is_eligible(&grid, CellCoord::new(2, 2)));
    }

    #[test]
    fn only_eligible_cells_are_set() {
        let mut heights = vec![0.4; 16];
        heights[6] = 0.03;
        let grid = grid_with_heights(4, &heights);
        let map = uniform_map(&grid, 1.0);
        let mut rng = FixedRng { value: 0 };
        let mask = WaterDistribution::new(WaterRequirement::DeepWater)
            .distribute(&DistributionInput::try_new(&grid, &map).unwrap(), &mut rng);
        assert_eq!(mask.set_indices().collect::<Vec<_>>(), vec![6]);
    }
}
