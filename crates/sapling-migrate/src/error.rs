//! Error types for migration runs.

use std::fmt;

/// Which way a migration step was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Applying (`up`).
    Up,
    /// Rolling back (`down`).
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "apply"),
            Self::Down => write!(f, "roll back"),
        }
    }
}

/// Errors that can occur during a migration run.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Listing the migration state failed.
    #[error("Failed to list migration state: {0}")]
    State(#[source] sapling_core::Error),

    /// A step failed; the steps after it were not attempted.
    #[error("Failed to {direction} migration '{name}': {source}")]
    Step {
        /// Migration name.
        name: String,
        /// Direction of the failed step.
        direction: Direction,
        /// The backend error, unchanged.
        #[source]
        source: sapling_core::Error,
    },
}

impl MigrateError {
    /// Returns the backend error behind this failure.
    #[must_use]
    pub const fn backend_error(&self) -> &sapling_core::Error {
        match self {
            Self::State(source) | Self::Step { source, .. } => source,
        }
    }
}

/// Result type for migration runs.
pub type Result<T> = std::result::Result<T, MigrateError>;
