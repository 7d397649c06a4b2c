//! Seeded region partitioning for procedural maps
//!
//! Divides a square world into preset regions (player and enemy start areas
//! placed under pairwise distance constraints) and open regions tagged with
//! biome labels. The same configuration and seed always give the same layout,
//! and a shared [`SeedSource`] lets late-created systems keep drawing seeded
//! values after generation.
//!
//! # Quick Start
//!
//! ```rust
//! use region_partition::*;
//!
//! let config = GenerationConfigBuilder::new()
//!     .world_extent(20_000.0).unwrap()
//!     .grid_step(1_000.0).unwrap()
//!     .preset(PresetRegionSpec::fixed(RegionType::PlayerStart, 4_000.0, 4_000.0))
//!     .preset(PresetRegionSpec::fixed(RegionType::EnemyStart, 3_000.0, 3_000.0))
//!     .min_distance(RegionType::EnemyStart, RegionType::PlayerStart, 10_000.0).unwrap()
//!     .target_open_regions(10)
//!     .split_ranges(SizeRange::new(2_000.0, 10_000.0), SizeRange::new(2_000.0, 10_000.0)).unwrap()
//!     .biome(BiomeDistribution::new(RegionType::named("Forest"), 2, 1.0))
//!     .biome(BiomeDistribution::weighted(RegionType::named("Desert"), 1.0))
//!     .build().unwrap();
//!
//! let mut generator = PartitionGenerator::new();
//! let layout = generator.generate(config, 42).unwrap();
//! println!(
//!     "{} presets, {} open regions",
//!     layout.presets().len(),
//!     layout.open_regions().len()
//! );
//!
//! // Systems created later draw from the same seeded stream
//! let spawn = pick_seeded(generator.seed_source(), 4, &RetryPolicy::default());
//! assert!(spawn.unwrap().deterministic);
//! ```
//!
//! # Features
//!
//! - `serde`: Enables serialization support for configuration and results
//!
//! Diagnostics are emitted through `tracing` under the `region_partition`
//! target; no subscriber is installed by this crate.

// Modules
pub mod error;
pub mod geometry;
pub mod seed;
pub mod region;
pub mod config;
pub mod resources;
pub mod generation;
pub mod partition;

// Re-export core types for convenience
pub use error::{PartitionError, Result};
pub use geometry::Rect;
pub use seed::{pick_seeded, RetryPolicy, SeedNotReady, SeedSource, SeededPick};
pub use region::{OpenRegion, PlacedRegion, RegionType};
pub use config::{
    BiomeDistribution, GenerationConfig, GenerationConfigBuilder, MinDistanceTable,
    PresetRegionSpec, SelectionPolicy, SizeRange, MAX_GRID_POSITIONS,
};
pub use resources::StartResourceParameters;
pub use generation::PlacementOptions;
pub use partition::{generate_partition, PartitionGenerator, PartitionResult, RegionRef};

// Re-export glam::Vec2 for convenience
pub use glam::Vec2;
