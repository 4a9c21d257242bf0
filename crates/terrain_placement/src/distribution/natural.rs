//! "Natural" distribution: thresholded seeding refined by a cellular automaton.
//!
//! Seed phase: cells with suitability above `seed_threshold` draw once with their
//! suitability as probability; all other cells start inactive without consuming a draw.
//!
//! Refinement: `iterations` synchronous steps over the 8-cell Moore neighborhood.
//! An active cell survives iff its active-neighbor count is in `[2, 6]`; an inactive
//! cell is born iff its count is in `[3, 4]` and its suitability exceeds
//! `birth_factor * seed_threshold`. Each step reads only the previous generation.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::{bernoulli, DistributionInput, MaskDistribution, PlacementMask};
use crate::error::{Error, Result};
use crate::grid::Grid;

const SURVIVE_MIN: u8 = 2;
const SURVIVE_MAX: u8 = 6;
const BIRTH_MIN: u8 = 3;
const BIRTH_MAX: u8 = 4;

/// Parameters of the natural distribution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalParams {
    /// Minimum suitability for a cell to be seeded.
    pub seed_threshold: f32,
    /// Births require suitability above `birth_factor * seed_threshold`.
    pub birth_factor: f32,
    /// Number of automaton steps.
    pub iterations: usize,
}

impl Default for NaturalParams {
    fn default() -> Self {
        Self {
            seed_threshold: 0.3,
            birth_factor: 0.7,
            iterations: 2,
        }
    }
}

impl NaturalParams {
    /// Suitability a cell must exceed to be born during refinement.
    pub fn birth_threshold(&self) -> f32 {
        self.birth_factor * self.seed_threshold
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.seed_threshold) {
            return Err(Error::InvalidConfig(
                "natural.seed_threshold must be in [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.birth_factor) {
            return Err(Error::InvalidConfig(
                "natural.birth_factor must be in [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Natural distribution strategy.
#[derive(Debug, Clone, Default)]
pub struct NaturalDistribution {
    pub params: NaturalParams,
}

impl NaturalDistribution {
    pub fn new(params: NaturalParams) -> Self {
        Self { params }
    }
}

impl MaskDistribution for NaturalDistribution {
    fn distribute(&self, input: &DistributionInput<'_>, rng: &mut dyn RngCore) -> PlacementMask {
        let suitability = input.suitability.values();
        let seed_threshold = self.params.seed_threshold;

        let mut active: Vec<bool> = suitability
            .iter()
            .map(|&s| s > seed_threshold && bernoulli(rng, s))
            .collect();

        let birth_threshold = self.params.birth_threshold();
        let mut next = vec![false; active.len()];
        for _ in 0..self.params.iterations {
            step(input.grid, &active, &mut next, suitability, birth_threshold);
            std::mem::swap(&mut active, &mut next);
        }

        let mut mask = PlacementMask::for_grid(input.grid);
        for (idx, _) in active.iter().enumerate().filter(|(_, a)| **a) {
            mask.set_index(idx);
        }
        mask
    }
}

/// Computes one generation from `current` into `next`.
fn step(grid: &Grid, current: &[bool], next: &mut [bool], suitability: &[f32], birth: f32) {
    for (idx, out) in next.iter_mut().enumerate() {
        let coord = grid.coord_of(idx);
        let count = grid
            .neighbor_indices(coord)
            .filter(|&n| current[n])
            .count() as u8;

        *out = if current[idx] {
            (SURVIVE_MIN..=SURVIVE_MAX).contains(&count)
        } else {
            (BIRTH_MIN..=BIRTH_MAX).contains(&count) && suitability[idx] > birth
        };
    }
}
