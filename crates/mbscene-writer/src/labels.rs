//! Solver labels for every node and entity of one input file.
//!
//! Sanitizing names can map two distinct names onto one label
//! (`Cube.001` and `Cube_001`). Labels are therefore claimed once, in
//! emission order, and a later claimant of a taken label gets the first
//! free `_2`, `_3`, ... suffix.

use std::collections::{HashMap, HashSet};

use mbscene_ir::{Category, Entity, EntityKey, ObjectKey, Registry, SceneGraph};
use mbscene_resolve::Resolution;

use crate::format;

/// Label prefix of each category.
fn prefix(category: Category) -> &'static str {
    match category {
        Category::Elements => "Elem_",
        Category::Drives => "Drive_",
        Category::Drivers => "Driver_",
        Category::ConstLaws => "Law_",
        Category::Frames => "Frame_",
        Category::Nodes => "Node_",
        Category::Simulations => "Sim_",
    }
}

#[derive(Debug, Default)]
pub(crate) struct Labels {
    nodes: HashMap<ObjectKey, String>,
    entities: HashMap<EntityKey, String>,
    taken: HashSet<String>,
    /// One message per label that had to be suffixed.
    pub renamed: Vec<String>,
}

impl Labels {
    pub fn new<S: SceneGraph>(registry: &Registry, scene: &S, resolution: &Resolution) -> Self {
        let mut labels = Labels::default();

        for name in &resolution.frames {
            labels.claim_entity(EntityKey::new(Category::Frames, name.as_str()));
        }
        for object in &resolution.nodes.order {
            let name = scene.display_name(*object).unwrap_or_default();
            let label = labels.claim(Category::Nodes, name);
            labels.nodes.insert(*object, label);
        }
        for driver in registry.drivers() {
            labels.claim_entity(driver.key());
        }
        for law in registry.const_laws() {
            labels.claim_entity(law.key());
        }
        for drive in registry.drives() {
            labels.claim_entity(drive.key());
        }
        for element in registry.elements() {
            labels.claim_entity(element.key());
        }
        labels
    }

    fn claim_entity(&mut self, key: EntityKey) {
        let label = self.claim(key.category, &key.name);
        self.entities.insert(key, label);
    }

    fn claim(&mut self, category: Category, name: &str) -> String {
        let base = format::label(prefix(category), name);
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.taken.insert(candidate.clone()) {
                tracing::warn!(%category, name, label = %candidate, "solver label taken; suffixed");
                self.renamed.push(format!(
                    "{category}/{name} written as {candidate}, {base} is taken"
                ));
                return candidate;
            }
            n += 1;
        }
    }

    /// Label of a structural node object.
    pub fn node(&self, object: ObjectKey) -> Option<&str> {
        self.nodes.get(&object).map(String::as_str)
    }

    /// Label of a named entity. Names outside the registry get the plain
    /// sanitized label.
    pub fn entity(&self, category: Category, name: &str) -> String {
        self.entities
            .get(&EntityKey::new(category, name))
            .cloned()
            .unwrap_or_else(|| format::label(prefix(category), name))
    }
}
