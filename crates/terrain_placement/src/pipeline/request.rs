//! Normalized placement requests.
use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rules::ObjectTypeId;
use crate::suitability::TerrainAffinity;

/// Where a request wants its objects.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LocationDescriptor {
    /// No location preference.
    #[default]
    Anywhere,
    /// Favor cells near `point`; beyond `radius` a flat penalty applies.
    Anchor { point: Vec2, radius: f32 },
    /// Favor cells matching a terrain tag.
    Terrain(TerrainAffinity),
}

/// One object type to place, as produced by an upstream request parser.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectRequest {
    pub object_type: ObjectTypeId,
    pub subtype: Option<String>,
    /// Density in `[0, 1]`; values outside are clamped when scoring.
    pub density: f32,
    pub location: LocationDescriptor,
    /// Strategy name; `None` uses the definition default.
    pub distribution: Option<String>,
}

impl Default for ObjectRequest {
    fn default() -> Self {
        Self {
            object_type: ObjectTypeId::new(),
            subtype: None,
            density: 1.0,
            location: LocationDescriptor::Anywhere,
            distribution: None,
        }
    }
}

impl ObjectRequest {
    pub fn new(object_type: impl Into<ObjectTypeId>) -> Self {
        Self {
            object_type: object_type.into(),
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_location(mut self, location: LocationDescriptor) -> Self {
        self.location = location;
        self
    }

    pub fn with_anchor(self, point: Vec2, radius: f32) -> Self {
        self.with_location(LocationDescriptor::Anchor { point, radius })
    }

    pub fn with_terrain(self, affinity: TerrainAffinity) -> Self {
        self.with_location(LocationDescriptor::Terrain(affinity))
    }

    pub fn with_distribution(mut self, name: impl Into<String>) -> Self {
        self.distribution = Some(name.into());
        self
    }
}
