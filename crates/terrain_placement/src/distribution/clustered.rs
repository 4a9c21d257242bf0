//! Clustered distribution around the most suitable cells.
use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::{bernoulli, DistributionInput, MaskDistribution, PlacementMask};
use crate::error::{Error, Result};

/// Parameters of the clustered distribution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteredParams {
    /// Maximum number of cluster centers.
    pub max_clusters: usize,
    /// Centers must have suitability strictly above this.
    pub center_threshold: f32,
    /// Cluster radius as a fraction of the map width.
    pub radius_fraction: f32,
}

impl Default for ClusteredParams {
    fn default() -> Self {
        Self {
            max_clusters: 5,
            center_threshold: 0.6,
            radius_fraction: 0.1,
        }
    }
}

impl ClusteredParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.center_threshold) {
            return Err(Error::InvalidConfig(
                "clustered.center_threshold must be in [0, 1]".into(),
            ));
        }
        if !self.radius_fraction.is_finite() || self.radius_fraction < 0.0 {
            return Err(Error::InvalidConfig(
                "clustered.radius_fraction must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

/// Clustered distribution strategy.
///
/// Picks up to `max_clusters` centers among cells above `center_threshold`, most
/// suitable first (ties broken by row-major order). Every cell whose center lies within
/// the cluster radius draws with probability `(1 - distance / radius) * suitability`.
/// Clusters only ever add cells; overlapping clusters never clear earlier results.
#[derive(Debug, Clone, Default)]
pub struct ClusteredDistribution {
    pub params: ClusteredParams,
}

impl ClusteredDistribution {
    pub fn new(params: ClusteredParams) -> Self {
        Self { params }
    }

    /// Row-major indices of the selected cluster centers, best first.
    pub fn centers(&self, input: &DistributionInput<'_>) -> Vec<usize> {
        let values = input.suitability.values();
        let mut candidates: Vec<usize> = (0..values.len())
            .filter(|&i| values[i] > self.params.center_threshold)
            .collect();
        // Stable sort keeps row-major order among equal scores.
        candidates.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
        candidates.truncate(self.params.max_clusters);
        candidates
    }
}

impl MaskDistribution for ClusteredDistribution {
    fn distribute(&self, input: &DistributionInput<'_>, rng: &mut dyn RngCore) -> PlacementMask {
        let mut mask = PlacementMask::for_grid(input.grid);
        let radius = self.params.radius_fraction * input.grid.map_extent().x;
        if radius <= 0.0 {
            return mask;
        }

        let values = input.suitability.values();
        let cells = input.grid.cells();
        for center_idx in self.centers(input) {
            let center = cells[center_idx].center();
            for idx in input.grid.indices_in_radius(center, radius) {
                let distance = cells[idx].center().distance(center);
                let distance_factor = (1.0 - distance / radius).max(0.0);
                if bernoulli(rng, distance_factor * values[idx]) {
                    mask.set_index(idx);
                }
            }
        }
        mask
    }
}
