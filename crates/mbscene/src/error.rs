use mbscene_ir::RegistryError;
use mbscene_resolve::ResolveError;
use mbscene_snapshot::SnapshotError;
use mbscene_writer::GenerationError;
use thiserror::Error;

/// Errors returned by document operations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// No document is open.
    #[error("no document is open")]
    NoDocument,

    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Saving or loading a snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Node classification or frame ordering failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Writing the input file failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The build configuration could not be read.
    #[error("invalid build configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// True when a snapshot was refused for security reasons.
    pub fn is_security(&self) -> bool {
        matches!(self, ModelError::Snapshot(e) if e.is_security())
    }
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, ModelError>;
