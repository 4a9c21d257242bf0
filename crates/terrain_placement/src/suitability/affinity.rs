//! Location affinity: terrain tags and anchor falloff.
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::request::LocationDescriptor;
use crate::terrain::{ElevationClass, TerrainProperties, WATER_HEIGHT};

pub const AFFINITY_MATCH: f32 = 1.5;
pub const AFFINITY_MISS: f32 = 0.1;
pub const OUTSIDE_ANCHOR_PENALTY: f32 = 0.2;

/// Terrain tag a request can ask its objects to favor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainAffinity {
    Mountains,
    Hills,
    Flatlands,
    River,
    Lake,
    Forest,
}

impl TerrainAffinity {
    pub const ALL: [TerrainAffinity; 6] = [
        TerrainAffinity::Mountains,
        TerrainAffinity::Hills,
        TerrainAffinity::Flatlands,
        TerrainAffinity::River,
        TerrainAffinity::Lake,
        TerrainAffinity::Forest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TerrainAffinity::Mountains => "mountains",
            TerrainAffinity::Hills => "hills",
            TerrainAffinity::Flatlands => "flatlands",
            TerrainAffinity::River => "river",
            TerrainAffinity::Lake => "lake",
            TerrainAffinity::Forest => "forest",
        }
    }

    /// Whether a cell's terrain satisfies this tag.
    pub fn matches(self, t: &TerrainProperties) -> bool {
        let elevation = t.features.elevation;
        match self {
            TerrainAffinity::Mountains => elevation == ElevationClass::Highland && t.slope > 0.2,
            TerrainAffinity::Hills => elevation == ElevationClass::Midland && t.slope > 0.1,
            TerrainAffinity::Flatlands => t.features.is_flat,
            TerrainAffinity::River | TerrainAffinity::Lake => t.height < WATER_HEIGHT,
            TerrainAffinity::Forest => {
                (0.05..=0.3).contains(&t.slope) && (0.2..0.6).contains(&t.height)
            }
        }
    }
}

impl fmt::Display for TerrainAffinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TerrainAffinity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        TerrainAffinity::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::InvalidConfig(format!("unknown terrain affinity '{s}'")))
    }
}

/// Multiplier contributed by the request's location descriptor for a cell.
pub fn location_factor(location: &LocationDescriptor, center: Vec2, t: &TerrainProperties) -> f32 {
    match *location {
        LocationDescriptor::Anywhere => 1.0,
        LocationDescriptor::Terrain(tag) => {
            if tag.matches(t) {
                AFFINITY_MATCH
            } else {
                AFFINITY_MISS
            }
        }
        LocationDescriptor::Anchor { point, radius } => anchor_falloff(point, radius, center),
    }
}

/// Linear falloff from 1.0 at the anchor to 0.5 at the radius; a flat penalty beyond.
fn anchor_falloff(anchor: Vec2, radius: f32, center: Vec2) -> f32 {
    let distance = center.distance(anchor);
    if !radius.is_finite() || radius <= 0.0 {
        return if distance == 0.0 {
            1.0
        } else {
            OUTSIDE_ANCHOR_PENALTY
        };
    }
    let normalized = distance / radius;
    if normalized <= 1.0 {
        1.0 - 0.5 * normalized
    } else {
        OUTSIDE_ANCHOR_PENALTY
    }
}
