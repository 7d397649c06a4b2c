//! Partition generation and the generated world layout

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::error::{PartitionError, Result};
use crate::generation::{apply_preset_tags, assign_tags, place_presets, subdivide};
use crate::geometry::Rect;
use crate::region::{OpenRegion, PlacedRegion, RegionType};
use crate::resources::StartResourceParameters;
use crate::seed::SeedSource;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Generate a partition of the world described by `config`
///
/// Validates the configuration, initializes `source` with `seed`, then places
/// the presets, subdivides the open space and tags it. The partition itself is
/// drawn from a private stream seeded with the same seed, so later draws on
/// `source` never change it.
///
/// # Arguments
///
/// * `config` - World layout to generate
/// * `seed` - Seed for both the partition and the shared source
/// * `source` - Shared source consumers keep drawing from afterwards
///
/// # Errors
///
/// `InvalidConfig` (before `source` is touched), `Infeasible` or
/// `NoDistributions`.
///
/// # Example
///
/// ```
/// use region_partition::*;
///
/// let config = GenerationConfigBuilder::new()
///     .world_extent(10_000.0).unwrap()
///     .grid_step(500.0).unwrap()
///     .preset(PresetRegionSpec::fixed(RegionType::PlayerStart, 2_000.0, 2_000.0))
///     .target_open_regions(8)
///     .split_ranges(SizeRange::new(1_000.0, 6_000.0), SizeRange::new(1_000.0, 6_000.0)).unwrap()
///     .build()
///     .unwrap();
///
/// let source = SeedSource::new();
/// let result = generate_partition(&config, 7, &source).unwrap();
///
/// assert_eq!(result.player_start_count(), 1);
/// assert!(source.is_ready());
/// ```
pub fn generate_partition(
    config: &GenerationConfig,
    seed: u64,
    source: &SeedSource,
) -> Result<PartitionResult> {
    config.validate()?;
    source.initialize(seed);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let full_area = config.full_area();

    let mut presets = place_presets(
        &config.presets,
        &full_area,
        &config.min_distances,
        config.grid_step,
        &config.placement,
        &mut rng,
    )?;
    apply_preset_tags(&mut presets, &config.preset_tags);

    let rects = subdivide(
        &full_area,
        &presets,
        config.target_open_regions,
        &config.split_width,
        &config.split_height,
        &mut rng,
    );
    let open_regions = assign_tags(&rects, &config.biomes, &mut rng)?;

    let mut start_resources = config.start_resources;
    let repairs = start_resources.make_consistent();
    if !repairs.is_empty() {
        debug!(
            target: "region_partition",
            "repaired {} start resource values",
            repairs.len()
        );
    }

    info!(
        target: "region_partition",
        "generated partition for seed {}: {} presets, {} open regions",
        seed,
        presets.len(),
        open_regions.len()
    );

    Ok(PartitionResult {
        seed,
        full_area,
        target_open_regions: config.target_open_regions,
        presets,
        open_regions,
        start_resources,
    })
}

/// A region found by [`PartitionResult::region_at`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionRef<'a> {
    Preset(&'a PlacedRegion),
    Open(&'a OpenRegion),
}

impl RegionRef<'_> {
    /// Bounds of the referenced region
    pub fn rect(&self) -> Rect {
        match self {
            RegionRef::Preset(region) => region.rect,
            RegionRef::Open(region) => region.rect,
        }
    }
}

/// A generated world layout
///
/// Presets and open regions together tile the full area without overlap.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionResult {
    /// Seed the layout was generated from
    seed: u64,

    /// The full square world area
    full_area: Rect,

    /// Number of open regions that was asked for
    target_open_regions: usize,

    /// Placed presets, in configuration order
    presets: Vec<PlacedRegion>,

    /// Tagged open regions
    open_regions: Vec<OpenRegion>,

    /// Consistent start area content counts
    start_resources: StartResourceParameters,
}

impl PartitionResult {
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn full_area(&self) -> Rect {
        self.full_area
    }

    /// Placed presets, in configuration order
    #[inline]
    pub fn presets(&self) -> &[PlacedRegion] {
        &self.presets
    }

    /// Open regions, all tagged
    #[inline]
    pub fn open_regions(&self) -> &[OpenRegion] {
        &self.open_regions
    }

    /// Number of presets plus open regions
    #[inline]
    pub fn region_count(&self) -> usize {
        self.presets.len() + self.open_regions.len()
    }

    /// Placed presets of one type
    pub fn presets_of_type(&self, region_type: &RegionType) -> impl Iterator<Item = &PlacedRegion> + '_ {
        let region_type = region_type.clone();
        self.presets
            .iter()
            .filter(move |p| p.region_type == region_type)
    }

    /// Number of player start regions that were placed
    pub fn player_start_count(&self) -> usize {
        self.presets_of_type(&RegionType::PlayerStart).count()
    }

    /// Open regions carrying one biome label
    pub fn regions_tagged(&self, label: &RegionType) -> impl Iterator<Item = &OpenRegion> + '_ {
        let label = label.clone();
        self.open_regions.iter().filter(move |r| r.has_tag(&label))
    }

    /// Find the region containing a world position
    ///
    /// Points on a shared edge belong to more than one region; presets win,
    /// then the first open region in order. Returns `None` outside the world.
    ///
    /// # Example
    ///
    /// ```
    /// # use region_partition::*;
    /// # let result = generate_partition(&GenerationConfig::default(), 1, &SeedSource::new()).unwrap();
    /// let center = result.region_at(Vec2::ZERO).unwrap();
    /// assert!(center.rect().contains_point(Vec2::ZERO));
    /// assert!(result.region_at(Vec2::splat(1e9)).is_none());
    /// ```
    pub fn region_at(&self, point: Vec2) -> Option<RegionRef<'_>> {
        if let Some(preset) = self.presets.iter().find(|p| p.rect.contains_point(point)) {
            return Some(RegionRef::Preset(preset));
        }
        self.open_regions
            .iter()
            .find(|r| r.rect.contains_point(point))
            .map(RegionRef::Open)
    }

    /// Summed area of every region
    ///
    /// Equal to the full area up to float rounding.
    pub fn total_area(&self) -> f32 {
        self.presets.iter().map(|p| p.rect.area()).sum::<f32>()
            + self.open_regions.iter().map(|r| r.rect.area()).sum::<f32>()
    }

    /// Whether fewer open regions than requested could be produced
    #[inline]
    pub fn is_underfilled(&self) -> bool {
        self.open_regions.len() < self.target_open_regions
    }

    /// Start area content counts, already made consistent
    #[inline]
    pub fn start_resources(&self) -> &StartResourceParameters {
        &self.start_resources
    }
}

/// Owner of the shared seed source and the current layout
///
/// Keeps the last successful layout and configuration. A failed run leaves
/// both untouched.
///
/// # Example
///
/// ```
/// use region_partition::*;
///
/// let mut generator = PartitionGenerator::new();
/// let source = generator.seed_source().clone();
///
/// generator.generate(GenerationConfig::default(), 42).unwrap();
/// assert_eq!(source.seed(), Some(42));
///
/// let first = generator.current().unwrap().clone();
/// let again = generator.regenerate(42).unwrap();
/// assert_eq!(&first, again);
/// ```
#[derive(Debug, Default)]
pub struct PartitionGenerator {
    source: SeedSource,
    config: Option<GenerationConfig>,
    current: Option<PartitionResult>,
}

impl PartitionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that initializes an existing shared source
    pub fn with_source(source: SeedSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    /// The shared seed source, initialized by every successful run
    #[inline]
    pub fn seed_source(&self) -> &SeedSource {
        &self.source
    }

    /// The layout of the last successful run
    #[inline]
    pub fn current(&self) -> Option<&PartitionResult> {
        self.current.as_ref()
    }

    /// The configuration of the last successful run
    #[inline]
    pub fn config(&self) -> Option<&GenerationConfig> {
        self.config.as_ref()
    }

    /// Generate a new layout, replacing the current one on success
    pub fn generate(&mut self, config: GenerationConfig, seed: u64) -> Result<&PartitionResult> {
        match generate_partition(&config, seed, &self.source) {
            Ok(result) => {
                self.config = Some(config);
                Ok(&*self.current.insert(result))
            }
            Err(err) => {
                warn!(
                    target: "region_partition",
                    "generation with seed {} failed, keeping previous layout: {}",
                    seed,
                    err
                );
                Err(err)
            }
        }
    }

    /// Generate again from the last successful configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when nothing was generated yet, otherwise as
    /// [`generate`](Self::generate).
    pub fn regenerate(&mut self, seed: u64) -> Result<&PartitionResult> {
        let config = self.config.clone().ok_or_else(|| {
            PartitionError::InvalidConfig("no previous configuration to regenerate".to_string())
        })?;
        self.generate(config, seed)
    }
}
