//! Error types for region partitioning

use thiserror::Error;

use crate::seed::SeedNotReady;

/// Errors that can occur while generating a partition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PartitionError {
    /// Configuration validation failed before any search started
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No arrangement of preset regions satisfies the distance constraints
    /// within the search limits
    #[error("preset placement infeasible: best attempt placed {placed} of {total} regions")]
    Infeasible {
        /// Deepest number of presets placed simultaneously during the search
        placed: usize,
        /// Number of presets requested
        total: usize,
    },
    /// Vacant regions remain but there are no biome distributions to tag them with
    #[error("no biome distributions to tag {vacant} vacant regions")]
    NoDistributions {
        /// Number of regions left untagged
        vacant: usize,
    },
    /// The shared seed source has not been initialized yet
    #[error(transparent)]
    SeedNotReady(#[from] SeedNotReady),
}

/// Result type alias for partition operations
pub type Result<T> = std::result::Result<T, PartitionError>;
