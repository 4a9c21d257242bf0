//! Independent per-cell Bernoulli distribution.
use rand::RngCore;

use crate::distribution::{bernoulli, DistributionInput, MaskDistribution, PlacementMask};

/// Sets each cell with probability equal to its suitability, in row-major draw order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDistribution;

impl MaskDistribution for RandomDistribution {
    fn distribute(&self, input: &DistributionInput<'_>, rng: &mut dyn RngCore) -> PlacementMask {
        let mut mask = PlacementMask::for_grid(input.grid);
        for (idx, &s) in input.suitability.values().iter().enumerate() {
            if bernoulli(rng, s) {
                mask.set_index(idx);
            }
        }
        mask
    }
}
