//! Error and report types for input-file generation.

use std::fmt;

use mbscene_ir::{EntityKey, RegistryError};
use thiserror::Error;

/// Errors that stop generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// An entity could not be rendered (abort policy only).
    #[error("cannot write {entity}: {message}")]
    Entity {
        /// The failing entity.
        entity: EntityKey,
        /// What went wrong.
        message: String,
    },

    /// The configured simulation run does not exist.
    #[error("simulation run: {0}")]
    Simulation(#[from] RegistryError),

    /// Writing the output failed.
    #[error("failed to write input file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for generation.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// An entity replaced by an error comment under the best-effort policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    /// The failing entity.
    pub entity: EntityKey,
    /// What went wrong.
    pub message: String,
}

impl fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entity, self.message)
    }
}

/// Summary of one generation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationReport {
    /// Reference frames written.
    pub frames: usize,
    /// Structural nodes written.
    pub nodes: usize,
    /// Elements written.
    pub elements: usize,
    /// Entities replaced by error comments.
    pub failures: Vec<EntityFailure>,
    /// Recovered topology anomalies.
    pub warnings: Vec<String>,
}

impl GenerationReport {
    /// True when every entity was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
