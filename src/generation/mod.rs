//! Core partition algorithms
//!
//! Three stages run in order: preset regions are placed on a grid under
//! pairwise distance constraints, the space around them is subdivided into
//! open regions, and the open regions are tagged with biome labels.

mod placement;
mod subdivision;
mod tagging;

pub use placement::{
    apply_preset_tags, candidate_positions, grid_positions, place_presets, sample_dimension,
    PlacementOptions,
};
pub use subdivision::{open_space, split_rect, subdivide};
pub use tagging::assign_tags;
