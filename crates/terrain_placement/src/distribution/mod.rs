//! Distribution strategies turning per-cell suitability into binary placement masks.
//!
//! Every strategy reads a clamped [`SuitabilityMap`] (interpreted as a Bernoulli
//! probability per cell) and writes a [`PlacementMask`] of the same shape. Randomness
//! comes exclusively from the RNG passed by the caller, so identical inputs and seed
//! always reproduce the identical mask.
//!
//! Strategies:
//! - [`RandomDistribution`]: independent draw per cell
//! - [`NaturalDistribution`]: thresholded seeding refined by a short cellular automaton
//! - [`ClusteredDistribution`]: radial falloff around the most suitable cells
//! - [`WaterDistribution`]: draws restricted to water, deep water or shoreline cells
use std::fmt;
use std::str::FromStr;

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rules::CustomRules;
use crate::suitability::SuitabilityMap;

pub mod clustered;
pub mod mask;
pub mod natural;
pub mod random;
pub mod water;

pub use clustered::{ClusteredDistribution, ClusteredParams};
pub use mask::PlacementMask;
pub use natural::{NaturalDistribution, NaturalParams};
pub use random::RandomDistribution;
pub use water::{WaterDistribution, WaterRequirement};

/// Inputs shared by all strategies.
#[derive(Clone, Copy)]
pub struct DistributionInput<'a> {
    /// Analyzed grid; read-only.
    pub(crate) grid: &'a Grid,
    /// Clamped suitability for the request being distributed.
    pub(crate) suitability: &'a SuitabilityMap,
}

impl<'a> DistributionInput<'a> {
    /// Pairs a grid with a suitability map; fails if their shapes differ.
    pub fn try_new(grid: &'a Grid, suitability: &'a SuitabilityMap) -> Result<Self> {
        if suitability.grid_size() != grid.grid_size() || suitability.len() != grid.len() {
            return Err(Error::InvalidConfig(format!(
                "suitability map of size {} does not match grid of size {}",
                suitability.grid_size(),
                grid.grid_size()
            )));
        }
        Ok(Self { grid, suitability })
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn suitability(&self) -> &'a SuitabilityMap {
        self.suitability
    }
}

/// Trait for mask distribution strategies.
pub trait MaskDistribution: Send + Sync {
    fn distribute(&self, input: &DistributionInput<'_>, rng: &mut dyn RngCore) -> PlacementMask;
}

/// Named distribution strategy, as carried by requests and rule tables.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DistributionStrategy {
    #[default]
    Random,
    Natural,
    Clustered,
    Water,
}

impl DistributionStrategy {
    pub const ALL: [DistributionStrategy; 4] = [
        DistributionStrategy::Random,
        DistributionStrategy::Natural,
        DistributionStrategy::Clustered,
        DistributionStrategy::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistributionStrategy::Random => "random",
            DistributionStrategy::Natural => "natural",
            DistributionStrategy::Clustered => "clustered",
            DistributionStrategy::Water => "water",
        }
    }

    /// Instantiates the strategy with the given parameters.
    pub fn build(
        self,
        params: &DistributionParams,
        rules: &CustomRules,
    ) -> Box<dyn MaskDistribution> {
        match self {
            DistributionStrategy::Random => Box::new(RandomDistribution),
            DistributionStrategy::Natural => Box::new(NaturalDistribution::new(params.natural)),
            DistributionStrategy::Clustered => {
                Box::new(ClusteredDistribution::new(params.clustered))
            }
            DistributionStrategy::Water => {
                Box::new(WaterDistribution::new(WaterRequirement::from_rules(rules)))
            }
        }
    }
}

impl fmt::Display for DistributionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        DistributionStrategy::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown distribution strategy '{s}'")))
    }
}

/// Tunable parameters of the natural and clustered strategies.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DistributionParams {
    pub natural: NaturalParams,
    pub clustered: ClusteredParams,
}

impl DistributionParams {
    pub fn validate(&self) -> Result<()> {
        self.natural.validate()?;
        self.clustered.validate()
    }
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Bernoulli draw: `true` with probability `p`.
#[inline]
pub(crate) fn bernoulli(rng: &mut dyn RngCore, p: f32) -> bool {
    rand01(rng) < p
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec2;
    use rand::RngCore;

    use crate::grid::Grid;
    use crate::suitability::SuitabilityMap;

    /// Always yields the same value.
    pub struct FixedRng {
        pub value: u32,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value
        }

        fn next_u64(&mut self) -> u64 {
            self.value as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 4];
            }
        }
    }

    /// A `size x size` grid over a `size x size` map with unit cells.
    pub fn unit_grid(size: usize) -> Grid {
        Grid::try_new(Vec2::splat(size as f32), size).expect("valid grid")
    }

    pub fn uniform_map(grid: &Grid, value: f32) -> SuitabilityMap {
        SuitabilityMap::try_from_values(grid, vec![value; grid.len()]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{uniform_map, unit_grid, FixedRng};
    use super::*;

    #[test]
    fn input_rejects_mismatched_shapes() {
        let small = unit_grid(4);
        let large = unit_grid(6);
        let map = uniform_map(&small, 0.5);
        assert!(DistributionInput::try_new(&small, &map).is_ok());
        let err = DistributionInput::try_new(&large, &map).err().expect("shape mismatch");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn strategy_names_parse_case_insensitively() {
        for s in DistributionStrategy::ALL {
            assert_eq!(s.name().parse::<DistributionStrategy>().unwrap(), s);
        }
        assert_eq!(
            " Natural ".parse::<DistributionStrategy>().unwrap(),
            DistributionStrategy::Natural
        );
        assert!("poisson".parse::<DistributionStrategy>().is_err());
    }

    #[test]
    fn rand01_stays_below_one() {
        let mut rng = FixedRng { value: u32::MAX };
        let v = rand01(&mut rng);
        assert!(v < 1.0);
        assert!(bernoulli(&mut rng, 1.0));

        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
        assert!(!bernoulli(&mut rng, 0.0));
    }

    #[test]
    fn default_params_match_documented_values() {
        let p = DistributionParams::default();
        assert_eq!(p.natural.seed_threshold, 0.3);
        assert_eq!(p.natural.birth_factor, 0.7);
        assert_eq!(p.natural.iterations, 2);
        assert_eq!(p.clustered.max_clusters, 5);
        assert_eq!(p.clustered.center_threshold, 0.6);
        assert_eq!(p.clustered.radius_fraction, 0.1);
        assert!(p.validate().is_ok());
    }
}
