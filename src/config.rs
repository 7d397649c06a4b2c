//! Partition Generation Configuration and Builder
//!
//! This module provides the configuration types for deterministic region
//! partitioning: the world size, the preset regions and their spacing rules,
//! how the open space is subdivided and how biome labels are distributed.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PartitionError, Result};
use crate::generation::PlacementOptions;
use crate::geometry::Rect;
use crate::region::RegionType;
use crate::resources::StartResourceParameters;

/// Upper bound on `(world size / grid step)²`
///
/// The first preset's candidate positions are held in memory, one `Vec2` per
/// grid position.
pub const MAX_GRID_POSITIONS: u64 = 1 << 22;

/// Inclusive `min..=max` range of a region dimension in world units
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range containing exactly one value
    pub fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    fn check(&self, what: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(PartitionError::InvalidConfig(format!(
                "{what} must be finite (got {}..{})",
                self.min, self.max
            )));
        }
        if self.min < 0.0 {
            return Err(PartitionError::InvalidConfig(format!(
                "{what} must not be negative (got min {})",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(PartitionError::InvalidConfig(format!(
                "{what} is inverted (min {} > max {})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Size constraints and purpose of one preset region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PresetRegionSpec {
    /// Allowed width of the region
    pub width: SizeRange,
    /// Allowed height of the region
    pub height: SizeRange,
    /// Purpose of the region
    pub region_type: RegionType,
}

impl PresetRegionSpec {
    pub fn new(region_type: RegionType, width: SizeRange, height: SizeRange) -> Self {
        Self {
            width,
            height,
            region_type,
        }
    }

    /// A preset with a fixed `width × height` size
    pub fn fixed(region_type: RegionType, width: f32, height: f32) -> Self {
        Self::new(region_type, SizeRange::fixed(width), SizeRange::fixed(height))
    }
}

/// Minimum gap required between preset regions, keyed by region type
///
/// The table is queried from the point of view of the region being placed:
/// `get(current, placed)` is the distance `current` must keep from an already
/// placed region of type `placed`. Pairs that were never set require no gap.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MinDistanceTable {
    rows: BTreeMap<RegionType, BTreeMap<RegionType, f32>>,
}

impl MinDistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the distance `from` has to keep from `to`
    pub fn set(&mut self, from: RegionType, to: RegionType, distance: f32) {
        self.rows.entry(from).or_default().insert(to, distance);
    }

    /// Set the same distance in both directions
    pub fn set_symmetric(&mut self, a: RegionType, b: RegionType, distance: f32) {
        self.set(a.clone(), b.clone(), distance);
        self.set(b, a, distance);
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, from: RegionType, to: RegionType, distance: f32) -> Self {
        self.set(from, to, distance);
        self
    }

    /// Required distance, `0.0` for unspecified pairs
    pub fn get(&self, from: &RegionType, to: &RegionType) -> f32 {
        self.rows
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0.0)
    }

    /// Gap two regions of these types must keep, whichever was placed first
    ///
    /// The larger of the two directed entries.
    pub fn required_between(&self, a: &RegionType, b: &RegionType) -> f32 {
        self.get(a, b).max(self.get(b, a))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(BTreeMap::is_empty)
    }

    fn check(&self) -> Result<()> {
        for (from, row) in &self.rows {
            for (to, &distance) in row {
                if !distance.is_finite() || distance < 0.0 {
                    return Err(PartitionError::InvalidConfig(format!(
                        "min distance {from} -> {to} must be finite and >= 0 (got {distance})"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Which vacant region a biome distribution claims
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First vacant region for guaranteed minimums, a random one otherwise
    #[default]
    Any,
    /// The vacant region with the largest area
    PreferLargest,
    /// The vacant region with the smallest area
    PreferSmallest,
}

/// How often a biome label should appear among the open regions
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeDistribution {
    /// Label written onto the chosen regions
    pub label: RegionType,
    /// Number of regions guaranteed to receive this label
    pub minimal_count: usize,
    /// Relative chance of winning each remaining region
    pub weight: f32,
    /// Which vacant region this label claims
    pub selection: SelectionPolicy,
}

impl BiomeDistribution {
    pub fn new(label: RegionType, minimal_count: usize, weight: f32) -> Self {
        Self {
            label,
            minimal_count,
            weight,
            selection: SelectionPolicy::Any,
        }
    }

    /// A distribution without a guaranteed minimum
    pub fn weighted(label: RegionType, weight: f32) -> Self {
        Self::new(label, 0, weight)
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }
}

/// Configuration for one partition generation run
///
/// The world is the square `[-world_extent, world_extent]²`. The same
/// configuration and seed always produce the same partition.
///
/// # Example
///
/// ```rust
/// use region_partition::*;
///
/// let config = GenerationConfigBuilder::new()
///     .world_extent(5_000.0).unwrap()
///     .grid_step(500.0).unwrap()
///     .preset(PresetRegionSpec::fixed(RegionType::PlayerStart, 1_000.0, 1_000.0))
///     .target_open_regions(6)
///     .biome(BiomeDistribution::weighted(RegionType::named("Forest"), 1.0))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.player_start_count(), 1);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Half the side length of the square world
    pub world_extent: f32,

    /// Grid spacing preset regions are snapped to
    pub grid_step: f32,

    /// Preset regions, placed in this order
    pub presets: Vec<PresetRegionSpec>,

    /// Minimum gaps between preset regions
    pub min_distances: MinDistanceTable,

    /// Extra tag attached to every placed preset of a type
    pub preset_tags: BTreeMap<RegionType, String>,

    /// Number of open regions the remaining space is split into
    ///
    /// The result can contain more regions when subtracting the presets
    /// already yields more pieces, and fewer when the space cannot be split
    /// further.
    pub target_open_regions: usize,

    /// Offset range for cuts across the x axis
    pub split_width: SizeRange,

    /// Offset range for cuts across the y axis
    pub split_height: SizeRange,

    /// Biome labels for the open regions, in priority order
    pub biomes: Vec<BiomeDistribution>,

    /// Search limits for preset placement
    pub placement: PlacementOptions,

    /// Content counts for player start areas
    pub start_resources: StartResourceParameters,
}

impl GenerationConfig {
    /// The full square world area
    #[inline]
    pub fn full_area(&self) -> Rect {
        Rect::centered_square(self.world_extent)
    }

    /// Side length of the world
    #[inline]
    pub fn world_size(&self) -> f32 {
        self.world_extent * 2.0
    }

    /// Number of presets of type [`RegionType::PlayerStart`]
    pub fn player_start_count(&self) -> usize {
        self.presets
            .iter()
            .filter(|p| p.region_type == RegionType::PlayerStart)
            .count()
    }

    /// Check every value that would make generation meaningless
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        check_positive("world extent", self.world_extent)?;
        check_positive("grid step", self.grid_step)?;

        let world_size = self.world_size();
        let grid_positions = (world_size / self.grid_step).powi(2);
        if grid_positions > MAX_GRID_POSITIONS as f32 {
            return Err(PartitionError::InvalidConfig(format!(
                "grid step {} is too fine for world size {} ({grid_positions:.0} positions, limit {MAX_GRID_POSITIONS})",
                self.grid_step, world_size
            )));
        }

        for (i, preset) in self.presets.iter().enumerate() {
            preset.width.check(&format!("preset {i} ({}) width", preset.region_type))?;
            preset.height.check(&format!("preset {i} ({}) height", preset.region_type))?;
            if preset.width.max > world_size {
                return Err(PartitionError::InvalidConfig(format!(
                    "preset {i} ({}) width max {} exceeds world size {}",
                    preset.region_type, preset.width.max, world_size
                )));
            }
            if preset.height.max > world_size {
                return Err(PartitionError::InvalidConfig(format!(
                    "preset {i} ({}) height max {} exceeds world size {}",
                    preset.region_type, preset.height.max, world_size
                )));
            }
        }

        self.min_distances.check()?;

        self.split_width.check("split width")?;
        self.split_height.check("split height")?;
        if self.split_width.min <= 0.0 || self.split_height.min <= 0.0 {
            return Err(PartitionError::InvalidConfig(format!(
                "split minimums must be positive (got {} and {})",
                self.split_width.min, self.split_height.min
            )));
        }

        for biome in &self.biomes {
            if !biome.weight.is_finite() || biome.weight < 0.0 {
                return Err(PartitionError::InvalidConfig(format!(
                    "biome {} weight must be finite and >= 0 (got {})",
                    biome.label, biome.weight
                )));
            }
        }

        if self.placement.max_dimension_attempts == 0 {
            return Err(PartitionError::InvalidConfig(
                "placement needs at least one dimension attempt".to_string(),
            ));
        }

        Ok(())
    }
}

fn check_positive(what: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PartitionError::InvalidConfig(format!(
            "{what} must be positive (got {value})"
        )));
    }
    Ok(())
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            world_extent: 50_000.0,
            grid_step: 1_000.0,
            presets: Vec::new(),
            min_distances: MinDistanceTable::new(),
            preset_tags: BTreeMap::new(),
            target_open_regions: 12,
            split_width: SizeRange::new(10_000.0, 40_000.0),
            split_height: SizeRange::new(10_000.0, 40_000.0),
            biomes: vec![BiomeDistribution::weighted(RegionType::None, 1.0)],
            placement: PlacementOptions::default(),
            start_resources: StartResourceParameters::default(),
        }
    }
}

/// Builder for creating a [`GenerationConfig`] with validation
///
/// Setters for values that can be checked in isolation fail early; the
/// remaining checks run in [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use region_partition::*;
///
/// let config = GenerationConfigBuilder::new()
///     .world_extent(10_000.0).unwrap()
///     .preset(PresetRegionSpec::fixed(RegionType::PlayerStart, 2_000.0, 2_000.0))
///     .preset(PresetRegionSpec::fixed(RegionType::EnemyStart, 2_000.0, 2_000.0))
///     .min_distance(RegionType::EnemyStart, RegionType::PlayerStart, 8_000.0).unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(config.presets.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
    custom_biomes: bool,
}

impl GenerationConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - world_extent: 50,000 (a 100,000 × 100,000 world)
    /// - grid_step: 1,000
    /// - no presets, no distance constraints
    /// - target_open_regions: 12
    /// - split ranges: 10,000..=40,000 on both axes
    /// - a single `RegionType::None` biome with weight 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Set half the side length of the world
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the extent is not positive
    pub fn world_extent(mut self, extent: f32) -> Result<Self> {
        check_positive("world extent", extent)?;
        self.config.world_extent = extent;
        Ok(self)
    }

    /// Set the placement grid step
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the step is not positive
    pub fn grid_step(mut self, step: f32) -> Result<Self> {
        check_positive("grid step", step)?;
        self.config.grid_step = step;
        Ok(self)
    }

    /// Append a preset region
    pub fn preset(mut self, preset: PresetRegionSpec) -> Self {
        self.config.presets.push(preset);
        self
    }

    /// Require `from` regions to keep `distance` from placed `to` regions
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the distance is negative or not finite
    pub fn min_distance(mut self, from: RegionType, to: RegionType, distance: f32) -> Result<Self> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(PartitionError::InvalidConfig(format!(
                "min distance must be finite and >= 0 (got {distance})"
            )));
        }
        self.config.min_distances.set(from, to, distance);
        Ok(self)
    }

    /// Replace the whole distance table
    pub fn min_distances(mut self, table: MinDistanceTable) -> Self {
        self.config.min_distances = table;
        self
    }

    /// Attach `tag` to every placed preset of `region_type`
    pub fn preset_tag(mut self, region_type: RegionType, tag: impl Into<String>) -> Self {
        self.config.preset_tags.insert(region_type, tag.into());
        self
    }

    pub fn target_open_regions(mut self, count: usize) -> Self {
        self.config.target_open_regions = count;
        self
    }

    /// Set the offset ranges used when splitting open space
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a range is inverted or its minimum is not positive
    pub fn split_ranges(mut self, width: SizeRange, height: SizeRange) -> Result<Self> {
        width.check("split width")?;
        height.check("split height")?;
        if width.min <= 0.0 || height.min <= 0.0 {
            return Err(PartitionError::InvalidConfig(format!(
                "split minimums must be positive (got {} and {})",
                width.min, height.min
            )));
        }
        self.config.split_width = width;
        self.config.split_height = height;
        Ok(self)
    }

    /// Append a biome distribution
    ///
    /// The first call replaces the default `RegionType::None` biome.
    pub fn biome(mut self, biome: BiomeDistribution) -> Self {
        if !self.custom_biomes {
            self.config.biomes.clear();
            self.custom_biomes = true;
        }
        self.config.biomes.push(biome);
        self
    }

    /// Replace all biome distributions
    pub fn biomes(mut self, biomes: Vec<BiomeDistribution>) -> Self {
        self.config.biomes = biomes;
        self.custom_biomes = true;
        self
    }

    pub fn placement(mut self, options: PlacementOptions) -> Self {
        self.config.placement = options;
        self
    }

    pub fn start_resources(mut self, resources: StartResourceParameters) -> Self {
        self.config.start_resources = resources;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<GenerationConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
