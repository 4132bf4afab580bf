//! Error types for snapshot encoding and decoding.

use mbscene_ir::RegistryError;
use thiserror::Error;

/// Errors that can occur while encoding or decoding a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The payload is not a well-formed snapshot.
    #[error("malformed snapshot: {0}")]
    Serialization(String),

    /// The payload names a record class or type outside the allow-list,
    /// or a denied capability.
    #[error("refused snapshot content: {0}")]
    Security(String),

    /// An object reference does not match `objects["<id>"]`.
    #[error("malformed object path: {0}")]
    MalformedPath(String),

    /// No live scene object carries the referenced stable identifier.
    #[error("no scene object with stable id {id:?} (captured as {captured:?})")]
    MissingObject {
        /// Stable identifier from the path.
        id: String,
        /// Display name captured at encode time, if recorded.
        captured: Option<String>,
    },

    /// An entity references an object that is no longer in the scene.
    #[error("entity {0} references an object that is not in the scene")]
    DanglingObject(String),

    /// Decoded entities violate registry invariants (e.g. duplicate names).
    #[error("snapshot entities are inconsistent: {0}")]
    Registry(#[from] RegistryError),

    /// JSON encoding or decoding failed.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The text blob is not valid base64.
    #[error("snapshot text is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl SnapshotError {
    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a security error.
    pub fn security(msg: impl Into<String>) -> Self {
        Self::Security(msg.into())
    }

    /// True for refusals that must be audited separately.
    pub fn is_security(&self) -> bool {
        matches!(self, Self::Security(_))
    }
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
