//! Entity identity: categories, keys and the reference table trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scene::ObjectKey;

/// Reserved entity name meaning "no selection yet".
///
/// Looking this name up is not an error; it yields no entity.
pub const UNASSIGNED: &str = "none";

/// Registry category an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Elements (bodies, joints, forces, ...).
    Elements,
    /// Drive callers.
    Drives,
    /// File drivers.
    Drivers,
    /// Constitutive laws.
    ConstLaws,
    /// Reference frames.
    Frames,
    /// Structural node definitions.
    Nodes,
    /// Simulation run definitions.
    Simulations,
}

impl Category {
    /// All categories in registry scan order.
    pub const ALL: [Category; 7] = [
        Category::Elements,
        Category::Drives,
        Category::Drivers,
        Category::ConstLaws,
        Category::Frames,
        Category::Nodes,
        Category::Simulations,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Elements => "elements",
            Category::Drives => "drives",
            Category::Drivers => "drivers",
            Category::ConstLaws => "const_laws",
            Category::Frames => "frames",
            Category::Nodes => "nodes",
            Category::Simulations => "simulations",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name-based, non-owning reference to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    /// Category the entity belongs to.
    pub category: Category,
    /// Entity name, unique within its category.
    pub name: String,
}

impl EntityKey {
    /// Create a key.
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// Key for a link field, or `None` for the unassigned sentinel.
    pub fn link(category: Category, name: &str) -> Option<Self> {
        if name == UNASSIGNED || name.is_empty() {
            None
        } else {
            Some(Self::new(category, name))
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.name)
    }
}

/// Common surface of every registry entity.
///
/// Each entity type declares its reference-typed fields here: the scene
/// objects it uses and the entities it links to by name. Reverse lookups
/// only ever look at these two tables.
pub trait Entity {
    /// Category this entity type is stored under.
    const CATEGORY: Category;

    /// User-visible name, unique within the category.
    fn name(&self) -> &str;

    /// Type tag (e.g. `"Revolute hinge"`).
    fn type_name(&self) -> &'static str;

    /// Scene objects referenced by this entity.
    fn objects(&self) -> &[ObjectKey];

    /// Entities referenced by name (unassigned links are skipped).
    fn links(&self) -> Vec<EntityKey>;

    /// Key identifying this entity.
    fn key(&self) -> EntityKey {
        EntityKey::new(Self::CATEGORY, self.name())
    }
}
