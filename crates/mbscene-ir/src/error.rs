//! Error types for the entity registry and the in-memory scene.

use thiserror::Error;

use crate::entity::Category;

/// Errors raised by [`Registry`](crate::Registry) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// A name lookup failed.
    #[error("{category} entity not found: {name}")]
    NotFound {
        /// Category that was searched.
        category: Category,
        /// Name that was looked up.
        name: String,
    },

    /// An entity with the same name already exists in the category.
    #[error("duplicate {category} name: {name}")]
    DuplicateName {
        /// Category of the rejected entity.
        category: Category,
        /// Conflicting name.
        name: String,
    },

    /// The reserved "no selection" name was used as an entity name.
    #[error("\"{0}\" is reserved and cannot name an entity")]
    ReservedName(String),

    /// A required link still holds the "no selection" sentinel.
    #[error("{category} reference is not assigned")]
    Unassigned {
        /// Category the link points into.
        category: Category,
    },
}

impl RegistryError {
    /// Create a not-found error.
    pub fn not_found(category: Category, name: impl Into<String>) -> Self {
        Self::NotFound {
            category,
            name: name.into(),
        }
    }
}

/// Errors raised when editing the in-memory [`Scene`](crate::Scene).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Object display names are unique within a scene.
    #[error("scene already has an object named {0}")]
    DuplicateObject(String),

    /// The object key does not belong to this scene.
    #[error("unknown scene object")]
    UnknownObject,

    /// Re-parenting would make an object its own ancestor.
    #[error("parenting {0} would create a cycle")]
    ParentCycle(String),
}
