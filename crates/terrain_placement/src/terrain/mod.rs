//! Terrain properties derived per cell from a continuous height source.
//!
//! - [`height`]: the [`height::HeightSource`] contract and stock implementations
//! - [`analyzer`]: two-pass sampling and feature classification over a [`crate::grid::Grid`]
use crate::grid::Direction;

pub mod analyzer;
pub mod height;

/// Scalar slope below which a cell counts as flat.
pub const FLAT_SLOPE: f32 = 0.05;
/// Scalar slope above which a cell counts as steep.
pub const STEEP_SLOPE: f32 = 0.3;
/// Upper bound (exclusive) of the lowland elevation class.
pub const LOWLAND_MAX: f32 = 0.2;
/// Upper bound (exclusive) of the midland elevation class.
pub const MIDLAND_MAX: f32 = 0.6;
/// Heights below this are water.
pub const WATER_HEIGHT: f32 = 0.1;
/// Heights below this are deep water.
pub const DEEP_WATER_HEIGHT: f32 = 0.05;

/// Coarse height bucket.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElevationClass {
    #[default]
    Lowland,
    Midland,
    Highland,
}

impl ElevationClass {
    pub fn from_height(height: f32) -> Self {
        if height < LOWLAND_MAX {
            ElevationClass::Lowland
        } else if height < MIDLAND_MAX {
            ElevationClass::Midland
        } else {
            ElevationClass::Highland
        }
    }
}

/// Neighborhood-based classification of a cell.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainFeatures {
    /// Strictly higher than every existing neighbor.
    pub is_peak: bool,
    /// Strictly lower than every existing neighbor.
    pub is_valley: bool,
    /// Opposing directional slopes of some axis have opposite sign.
    pub is_ridge: bool,
    pub is_flat: bool,
    pub is_steep: bool,
    pub elevation: ElevationClass,
}

/// Signed slopes towards each Moore neighbor; positive means uphill.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DirectionalSlopes([f32; 8]);

impl DirectionalSlopes {
    #[inline]
    pub fn get(&self, direction: Direction) -> f32 {
        self.0[direction.index()]
    }

    #[inline]
    pub fn set(&mut self, direction: Direction, slope: f32) {
        self.0[direction.index()] = slope;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, f32)> + '_ {
        Direction::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

/// Analyzed terrain of a single cell. Written once by the analyzer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TerrainProperties {
    /// Mean of the cell's sub-samples, in `[0, 1]`.
    pub height: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// `(max_height - min_height) / cell_width`.
    pub slope: f32,
    pub directional_slopes: DirectionalSlopes,
    pub features: TerrainFeatures,
}

impl TerrainProperties {
    /// Cell lies below the water line.
    #[inline]
    pub fn is_water(&self) -> bool {
        self.height < WATER_HEIGHT
    }

    #[inline]
    pub fn is_deep_water(&self) -> bool {
        self.height < DEEP_WATER_HEIGHT
    }

    /// Water low enough to count as reachable water for neighbors.
    #[inline]
    pub fn is_low_lying_water(&self) -> bool {
        self.is_water() && self.features.elevation == ElevationClass::Lowland
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elevation_class_boundaries() {
        assert_eq!(ElevationClass::from_height(0.0), ElevationClass::Lowland);
        assert_eq!(ElevationClass::from_height(0.199), ElevationClass::Lowland);
        assert_eq!(ElevationClass::from_height(0.2), ElevationClass::Midland);
        assert_eq!(ElevationClass::from_height(0.599), ElevationClass::Midland);
        assert_eq!(ElevationClass::from_height(0.6), ElevationClass::Highland);
        assert_eq!(ElevationClass::from_height(1.0), ElevationClass::Highland);
    }

    #[test]
    fn directional_slopes_store_by_direction() {
        let mut slopes = DirectionalSlopes::default();
        slopes.set(Direction::SouthWest, -0.25);
        assert_eq!(slopes.get(Direction::SouthWest), -0.25);
        assert_eq!(slopes.get(Direction::North), 0.0);
        assert_eq!(slopes.iter().filter(|(_, s)| *s != 0.0).count(), 1);
    }

    #[test]
    fn water_predicates() {
        let t = TerrainProperties {
            height: 0.04,
            ..Default::default()
        };
        assert!(t.is_water() && t.is_deep_water() && t.is_low_lying_water());
        let t = TerrainProperties {
            height: 0.07,
            ..Default::default()
        };
        assert!(t.is_water() && !t.is_deep_water());
    }
}
