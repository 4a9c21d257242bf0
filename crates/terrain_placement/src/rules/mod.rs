//! Declarative placement rules per object type.
//!
//! A [`RuleTable`] maps an [`ObjectTypeId`] to an [`ObjectDefinition`]: hard constraints,
//! a priority, a default distribution strategy and named subtypes with custom rule flags.
//! The table is plain data; the scoring engine consumes it through lookups only.
use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::DistributionStrategy;
use crate::error::{Error, Result};

pub type ObjectTypeId = String;

/// Hard placement constraints of an object type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementConstraints {
    /// Cells with a steeper scalar slope are rejected.
    pub max_slope: f32,
    /// Inclusive height range.
    pub min_height: f32,
    pub max_height: f32,
    /// Reject water cells outright.
    pub avoid_water: bool,
    /// Penalize cells that are neither water nor next to water.
    pub requires_water: bool,
    /// Minimum spacing between placed cells of this type, in map units.
    ///
    /// Not enforced by the distribution strategies; see
    /// [`crate::pipeline::postprocess::SpacingThinning`].
    pub min_distance_to_same_type: f32,
    /// Whether instances of this type may overlap each other.
    pub can_overlap: bool,
}

impl Default for PlacementConstraints {
    fn default() -> Self {
        Self {
            max_slope: 1.0,
            min_height: 0.0,
            max_height: 1.0,
            avoid_water: false,
            requires_water: false,
            min_distance_to_same_type: 0.0,
            can_overlap: true,
        }
    }
}

/// Custom rule flags attached to a subtype.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CustomRules {
    pub prefer_higher_elevation: bool,
    pub prefer_lower_elevation: bool,
    pub prefer_steep_slopes: bool,
    pub require_flat_area: bool,
    pub require_water_access: bool,
    pub require_deep_water: bool,
    pub require_water_edge: bool,
}

/// A named variant of an object type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct SubtypeDefinition {
    /// Scale range `(min, max)` for instances; informational for later stages.
    pub scale_range: (f32, f32),
    pub rules: CustomRules,
}

impl Default for SubtypeDefinition {
    fn default() -> Self {
        Self {
            scale_range: (1.0, 1.0),
            rules: CustomRules::default(),
        }
    }
}

impl SubtypeDefinition {
    pub fn new(rules: CustomRules) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn with_scale_range(mut self, min: f32, max: f32) -> Self {
        self.scale_range = (min, max);
        self
    }
}

/// Static rules for one object type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDefinition {
    pub constraints: PlacementConstraints,
    /// Lower values are processed first.
    pub priority: i32,
    /// Strategy used when a request names none (or an unknown one).
    pub default_distribution: DistributionStrategy,
    pub subtypes: BTreeMap<String, SubtypeDefinition>,
}

impl Default for ObjectDefinition {
    fn default() -> Self {
        Self {
            constraints: PlacementConstraints::default(),
            priority: 0,
            default_distribution: DistributionStrategy::Random,
            subtypes: BTreeMap::new(),
        }
    }
}

impl ObjectDefinition {
    pub fn new(constraints: PlacementConstraints) -> Self {
        Self {
            constraints,
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_default_distribution(mut self, strategy: DistributionStrategy) -> Self {
        self.default_distribution = strategy;
        self
    }

    pub fn with_subtype(mut self, name: impl Into<String>, subtype: SubtypeDefinition) -> Self {
        self.subtypes.insert(name.into(), subtype);
        self
    }

    pub fn subtype(&self, name: &str) -> Option<&SubtypeDefinition> {
        self.subtypes.get(name)
    }

    /// Checks the definition for values the scoring engine cannot work with.
    pub fn validate(&self, id: &str) -> Result<()> {
        let c = &self.constraints;
        let invalid = |msg: String| Err(Error::InvalidConfig(format!("object '{id}': {msg}")));

        if !c.max_slope.is_finite() || c.max_slope < 0.0 {
            return invalid(format!("max_slope must be finite and >= 0, got {}", c.max_slope));
        }
        if !c.min_height.is_finite() || !c.max_height.is_finite() || c.min_height > c.max_height {
            return invalid(format!(
                "height range [{}, {}] is not a valid interval",
                c.min_height, c.max_height
            ));
        }
        if !c.min_distance_to_same_type.is_finite() || c.min_distance_to_same_type < 0.0 {
            return invalid(format!(
                "min_distance_to_same_type must be finite and >= 0, got {}",
                c.min_distance_to_same_type
            ));
        }
        for (name, subtype) in &self.subtypes {
            let (lo, hi) = subtype.scale_range;
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return invalid(format!("subtype '{name}' has an invalid scale range"));
            }
        }
        Ok(())
    }
}

/// Rule table keyed by object type.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Debug, Default)]
pub struct RuleTable {
    definitions: HashMap<ObjectTypeId, ObjectDefinition>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Add a definition, builder-style.
    pub fn with(mut self, id: impl Into<ObjectTypeId>, definition: ObjectDefinition) -> Self {
        self.insert(id, definition);
        self
    }

    pub fn insert(&mut self, id: impl Into<ObjectTypeId>, definition: ObjectDefinition) {
        self.definitions.insert(id.into(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&ObjectDefinition> {
        self.definitions.get(id)
    }

    /// Lookup that reports a missing type as [`Error::UnknownObjectType`].
    pub fn resolve(&self, id: &str) -> Result<&ObjectDefinition> {
        self.get(id)
            .ok_or_else(|| Error::UnknownObjectType { id: id.to_owned() })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectTypeId, &ObjectDefinition)> {
        self.definitions.iter()
    }

    /// Validates every definition; the first malformed one is reported.
    pub fn validate(&self) -> Result<()> {
        let mut ids: Vec<_> = self.definitions.keys().collect();
        ids.sort();
        for id in ids {
            self.definitions[id].validate(id)?;
        }
        Ok(())
    }

    /// Parses and validates a table from RON text: a map of type id to definition.
    #[cfg(feature = "ron")]
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let table: RuleTable = ron::de::from_str(text)?;
        table.validate()?;
        Ok(table)
    }
}
