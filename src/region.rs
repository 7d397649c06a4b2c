//! Region labels and generated regions
//!
//! A generated world consists of [`PlacedRegion`]s (presets with a fixed
//! gameplay purpose) and [`OpenRegion`]s (everything else, tagged with a biome
//! label). Both are plain values produced fresh on every generation run.

use std::fmt;

use crate::geometry::Rect;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Label attached to a region
///
/// Presets use the built-in variants; biome labels and any future preset
/// kinds use [`RegionType::Named`]. Serialized as a plain string so it can
/// key maps in any format.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RegionType {
    /// No particular purpose
    #[default]
    None,
    /// Start area of a player faction
    PlayerStart,
    /// Start area of an enemy faction
    EnemyStart,
    /// Any other label, e.g. a biome name
    Named(String),
}

impl RegionType {
    /// Shorthand for [`RegionType::Named`]
    pub fn named(name: impl Into<String>) -> Self {
        RegionType::Named(name.into())
    }

    /// Human-readable name of this label
    pub fn name(&self) -> &str {
        match self {
            RegionType::None => "None",
            RegionType::PlayerStart => "PlayerStart",
            RegionType::EnemyStart => "EnemyStart",
            RegionType::Named(name) => name,
        }
    }
}

impl From<String> for RegionType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "None" => RegionType::None,
            "PlayerStart" => RegionType::PlayerStart,
            "EnemyStart" => RegionType::EnemyStart,
            _ => RegionType::Named(name),
        }
    }
}

impl From<RegionType> for String {
    fn from(region_type: RegionType) -> Self {
        match region_type {
            RegionType::Named(name) => name,
            other => other.name().to_string(),
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A preset region that was successfully placed
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRegion {
    /// World-space bounds, aligned to the placement grid
    pub rect: Rect,
    /// Purpose of the region
    pub region_type: RegionType,
    /// Extra tag configured for this preset type, if any
    pub tag: Option<String>,
}

impl PlacedRegion {
    pub fn new(rect: Rect, region_type: RegionType) -> Self {
        Self {
            rect,
            region_type,
            tag: None,
        }
    }
}

/// A region left over after preset placement
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRegion {
    /// World-space bounds
    pub rect: Rect,
    /// Biome label, set exactly once during tag assignment
    pub tag: Option<RegionType>,
}

impl OpenRegion {
    /// Create an untagged region
    pub fn vacant(rect: Rect) -> Self {
        Self { rect, tag: None }
    }

    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.tag.is_none()
    }

    /// Whether this region carries `label`
    pub fn has_tag(&self, label: &RegionType) -> bool {
        self.tag.as_ref() == Some(label)
    }
}
