//! Error and warning types for dependency resolution.

use std::fmt;

use mbscene_ir::EntityKey;
use thiserror::Error;

/// Errors that abort resolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// An entity references an object that is not in the scene.
    #[error("{0} references an object that is not in the scene")]
    MissingObject(EntityKey),
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Topology anomalies that resolution recovers from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// A frame names a parent that is not among the frames being ordered.
    /// The frame is treated as parentless.
    DanglingParent {
        /// Frame with the dangling parent.
        frame: String,
        /// Missing parent name.
        parent: String,
    },
    /// Frames whose parent chain is cyclic. They are appended in name
    /// order and treated as parentless.
    FrameCycle(Vec<String>),
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::DanglingParent { frame, parent } => {
                write!(f, "frame {frame} has unknown parent {parent}; treated as global")
            }
            ResolveWarning::FrameCycle(frames) => {
                write!(f, "reference frame cycle among {}", frames.join(", "))
            }
        }
    }
}
