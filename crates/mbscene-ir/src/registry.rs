//! The entity registry: every entity of the open document, by category.

use std::collections::HashSet;

use crate::drive::{Drive, Driver};
use crate::element::Element;
use crate::entity::{Category, Entity, EntityKey, UNASSIGNED};
use crate::error::RegistryError;
use crate::frame::{Frame, NodeDef};
use crate::law::ConstLaw;
use crate::scene::ObjectKey;
use crate::simulation::Simulation;

/// Entity types the registry can store, with access to their collection.
pub trait Stored: Entity + Sized {
    /// The category's collection.
    fn items(registry: &Registry) -> &Vec<Self>;

    /// The category's collection, mutably.
    fn items_mut(registry: &mut Registry) -> &mut Vec<Self>;
}

macro_rules! stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn items(registry: &Registry) -> &Vec<Self> {
                &registry.$field
            }

            fn items_mut(registry: &mut Registry) -> &mut Vec<Self> {
                &mut registry.$field
            }
        }
    };
}

stored!(Element, elements);
stored!(Drive, drives);
stored!(Driver, drivers);
stored!(ConstLaw, const_laws);
stored!(Frame, frames);
stored!(NodeDef, nodes);
stored!(Simulation, simulations);

/// Ordered collections of entities keyed by category.
///
/// The registry exclusively owns its entities. Names are unique within a
/// category; insertion order is preserved and is the order every query and
/// the writer see.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    elements: Vec<Element>,
    drives: Vec<Drive>,
    drivers: Vec<Driver>,
    const_laws: Vec<ConstLaw>,
    frames: Vec<Frame>,
    nodes: Vec<NodeDef>,
    simulations: Vec<Simulation>,
}

/// One entity's reference tables, as seen by the reverse lookups.
struct Entry<'a> {
    key: EntityKey,
    objects: &'a [ObjectKey],
    links: Vec<EntityKey>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to its category.
    pub fn add<E: Stored>(&mut self, entity: E) -> Result<(), RegistryError> {
        let name = entity.name();
        if name.is_empty() || name == UNASSIGNED {
            return Err(RegistryError::ReservedName(name.to_string()));
        }
        if self.position::<E>(name).is_some() {
            return Err(RegistryError::DuplicateName {
                category: E::CATEGORY,
                name: name.to_string(),
            });
        }
        E::items_mut(self).push(entity);
        Ok(())
    }

    /// Look an entity up by name.
    ///
    /// The unassigned sentinel yields `Ok(None)`; any other missing name is
    /// an error.
    pub fn get<E: Stored>(&self, name: &str) -> Result<Option<&E>, RegistryError> {
        if name == UNASSIGNED {
            return Ok(None);
        }
        match self.position::<E>(name) {
            Some(i) => Ok(Some(&E::items(self)[i])),
            None => Err(RegistryError::not_found(E::CATEGORY, name)),
        }
    }

    /// Look an entity up by name, treating the sentinel as an error too.
    pub fn require<E: Stored>(&self, name: &str) -> Result<&E, RegistryError> {
        self.get::<E>(name)?
            .ok_or(RegistryError::Unassigned { category: E::CATEGORY })
    }

    /// Replace the entity with the same name, returning the old one.
    pub fn replace<E: Stored>(&mut self, entity: E) -> Result<E, RegistryError> {
        let i = self
            .position::<E>(entity.name())
            .ok_or_else(|| RegistryError::not_found(E::CATEGORY, entity.name()))?;
        Ok(std::mem::replace(&mut E::items_mut(self)[i], entity))
    }

    /// Remove an entity by name.
    pub fn remove<E: Stored>(&mut self, name: &str) -> Result<E, RegistryError> {
        let i = self
            .position::<E>(name)
            .ok_or_else(|| RegistryError::not_found(E::CATEGORY, name))?;
        Ok(E::items_mut(self).remove(i))
    }

    /// Remove the entity a key names, whatever its category.
    pub fn remove_key(&mut self, key: &EntityKey) -> Result<(), RegistryError> {
        fn take<E: Stored>(registry: &mut Registry, name: &str) -> Result<(), RegistryError> {
            registry.remove::<E>(name).map(drop)
        }
        match key.category {
            Category::Elements => take::<Element>(self, &key.name),
            Category::Drives => take::<Drive>(self, &key.name),
            Category::Drivers => take::<Driver>(self, &key.name),
            Category::ConstLaws => take::<ConstLaw>(self, &key.name),
            Category::Frames => take::<Frame>(self, &key.name),
            Category::Nodes => take::<NodeDef>(self, &key.name),
            Category::Simulations => take::<Simulation>(self, &key.name),
        }
    }

    /// Every entity of a category, in insertion order.
    pub fn all<E: Stored>(&self) -> &[E] {
        E::items(self)
    }

    /// Names of a category's entities, in insertion order.
    pub fn names<'a, E: Stored + 'a>(&'a self) -> Vec<&'a str> {
        E::items(self).iter().map(|e| e.name()).collect()
    }

    /// Entities of a given type, optionally restricted to those whose
    /// primary object is `owner`.
    pub fn filter<E: Stored>(&self, type_name: &str, owner: Option<ObjectKey>) -> Vec<&E> {
        E::items(self)
            .iter()
            .filter(|e| e.type_name() == type_name)
            .filter(|e| match owner {
                Some(o) => e.objects().first() == Some(&o),
                None => true,
            })
            .collect()
    }

    /// True when the key names an existing entity.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries().iter().any(|e| &e.key == key)
    }

    /// Entities using any of `objects`, plus every entity that links
    /// (directly or through other matches) to one of them.
    pub fn entities_referencing(&self, objects: &HashSet<ObjectKey>) -> Vec<EntityKey> {
        let entries = self.entries();
        let mut matched: HashSet<EntityKey> = entries
            .iter()
            .filter(|e| e.objects.iter().any(|o| objects.contains(o)))
            .map(|e| e.key.clone())
            .collect();

        loop {
            let wrappers: Vec<EntityKey> = entries
                .iter()
                .filter(|e| !matched.contains(&e.key))
                .filter(|e| e.links.iter().any(|l| matched.contains(l)))
                .map(|e| e.key.clone())
                .collect();
            if wrappers.is_empty() {
                break;
            }
            matched.extend(wrappers);
        }

        entries
            .into_iter()
            .filter(|e| matched.contains(&e.key))
            .map(|e| e.key)
            .collect()
    }

    /// Entities holding a link to `key`.
    pub fn users_of(&self, key: &EntityKey) -> Vec<EntityKey> {
        self.entries()
            .into_iter()
            .filter(|e| e.links.contains(key))
            .map(|e| e.key)
            .collect()
    }

    /// Empty every category.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Total number of entities.
    pub fn len(&self) -> usize {
        self.elements.len()
            + self.drives.len()
            + self.drivers.len()
            + self.const_laws.len()
            + self.frames.len()
            + self.nodes.len()
            + self.simulations.len()
    }

    /// True when no category holds an entity.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Drives in insertion order.
    pub fn drives(&self) -> &[Drive] {
        &self.drives
    }

    /// Drivers in insertion order.
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Constitutive laws in insertion order.
    pub fn const_laws(&self) -> &[ConstLaw] {
        &self.const_laws
    }

    /// Reference frames in insertion order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Node definitions in insertion order.
    pub fn nodes(&self) -> &[NodeDef] {
        &self.nodes
    }

    /// Simulation runs in insertion order.
    pub fn simulations(&self) -> &[Simulation] {
        &self.simulations
    }

    fn position<E: Stored>(&self, name: &str) -> Option<usize> {
        E::items(self).iter().position(|e| e.name() == name)
    }

    fn entries(&self) -> Vec<Entry<'_>> {
        fn collect<'a, E: Entity>(items: &'a [E], out: &mut Vec<Entry<'a>>) {
            out.extend(items.iter().map(|e| Entry {
                key: e.key(),
                objects: e.objects(),
                links: e.links(),
            }));
        }

        let mut out = Vec::with_capacity(self.len());
        for category in Category::ALL {
            match category {
                Category::Elements => collect(&self.elements, &mut out),
                Category::Drives => collect(&self.drives, &mut out),
                Category::Drivers => collect(&self.drivers, &mut out),
                Category::ConstLaws => collect(&self.const_laws, &mut out),
                Category::Frames => collect(&self.frames, &mut out),
                Category::Nodes => collect(&self.nodes, &mut out),
                Category::Simulations => collect(&self.simulations, &mut out),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DriveKind, ElementKind, Scene, Vec3};

    fn hinge(name: &str, a: ObjectKey, b: ObjectKey) -> Element {
        Element::new(name, ElementKind::RevoluteHinge, vec![a, b])
    }

    fn two_objects() -> (Scene, ObjectKey, ObjectKey) {
        let mut scene = Scene::new("Scene");
        let a = scene.add("a", Vec3::zeros()).unwrap();
        let b = scene.add("b", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        (scene, a, b)
    }

    #[test]
    fn add_rejects_duplicates_and_reserved_names() {
        let (_, a, b) = two_objects();
        let mut reg = Registry::new();
        reg.add(hinge("j", a, b)).unwrap();
        assert_eq!(
            reg.add(hinge("j", b, a)),
            Err(RegistryError::DuplicateName {
                category: Category::Elements,
                name: "j".into()
            })
        );
        assert_eq!(
            reg.add(hinge(UNASSIGNED, a, b)),
            Err(RegistryError::ReservedName(UNASSIGNED.into()))
        );
        // Same name in another category is fine.
        reg.add(Drive::constant("j", 1.0)).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn lookup_distinguishes_sentinel_from_missing() {
        let mut reg = Registry::new();
        reg.add(Drive::constant("g", 9.81)).unwrap();

        assert_eq!(reg.get::<Drive>("g").unwrap().unwrap().name, "g");
        assert_eq!(reg.get::<Drive>(UNASSIGNED).unwrap(), None);
        assert_eq!(
            reg.get::<Drive>("missing"),
            Err(RegistryError::not_found(Category::Drives, "missing"))
        );
        assert_eq!(
            reg.require::<Drive>(UNASSIGNED),
            Err(RegistryError::Unassigned {
                category: Category::Drives
            })
        );
    }

    #[test]
    fn filter_by_type_and_owner() {
        let (_, a, b) = two_objects();
        let mut reg = Registry::new();
        reg.add(hinge("j1", a, b)).unwrap();
        reg.add(hinge("j2", b, a)).unwrap();
        reg.add(Element::new("c", ElementKind::Clamp, vec![a])).unwrap();

        let hinges = reg.filter::<Element>("Revolute hinge", None);
        assert_eq!(hinges.len(), 2);
        let owned = reg.filter::<Element>("Revolute hinge", Some(b));
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "j2");
        assert!(reg.filter::<Element>("Body", None).is_empty());
    }

    #[test]
    fn entities_referencing_includes_wrappers_transitively() {
        let (_, a, b) = two_objects();
        let mut reg = Registry::new();
        reg.add(Element::new("clamp", ElementKind::Clamp, vec![a])).unwrap();
        reg.add(Element::new("other", ElementKind::Clamp, vec![b])).unwrap();
        reg.add(Drive::constant("on", 1.0)).unwrap();
        reg.add(Element::new(
            "driven",
            ElementKind::Driven {
                element: "clamp".into(),
                drive: "on".into(),
            },
            vec![],
        ))
        .unwrap();
        reg.add(Element::new(
            "driven2",
            ElementKind::Driven {
                element: "driven".into(),
                drive: "on".into(),
            },
            vec![],
        ))
        .unwrap();

        let hits = reg.entities_referencing(&HashSet::from([a]));
        let names: Vec<&str> = hits.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["clamp", "driven", "driven2"]);
    }

    #[test]
    fn users_of_scans_links() {
        let (_, a, _) = two_objects();
        let mut reg = Registry::new();
        reg.add(Drive::constant("g", 9.81)).unwrap();
        reg.add(Element::new(
            "gravity",
            ElementKind::Gravity {
                direction: Vec3::new(0.0, 0.0, -1.0),
                drive: "g".into(),
            },
            vec![],
        ))
        .unwrap();
        reg.add(Element::new(
            "push",
            ElementKind::StructuralForce {
                follower: false,
                direction: Vec3::new(1.0, 0.0, 0.0),
                drive: "g".into(),
            },
            vec![a],
        ))
        .unwrap();

        let users = reg.users_of(&EntityKey::new(Category::Drives, "g"));
        assert_eq!(
            users,
            vec![
                EntityKey::new(Category::Elements, "gravity"),
                EntityKey::new(Category::Elements, "push"),
            ]
        );
        assert!(reg
            .users_of(&EntityKey::new(Category::Drives, "other"))
            .is_empty());
    }

    #[test]
    fn replace_remove_and_clear() {
        let mut reg = Registry::new();
        reg.add(Drive::constant("d", 1.0)).unwrap();
        let old = reg.replace(Drive::constant("d", 2.0)).unwrap();
        assert_eq!(old.kind, DriveKind::Constant { value: 1.0 });
        assert!(reg.replace(Drive::constant("x", 2.0)).is_err());

        assert_eq!(reg.names::<Drive>(), vec!["d"]);
        reg.remove::<Drive>("d").unwrap();
        assert!(reg.remove::<Drive>("d").is_err());

        reg.add(Drive::constant("d", 1.0)).unwrap();
        reg.add(Simulation::new("run")).unwrap();
        reg.remove_key(&EntityKey::new(Category::Simulations, "run"))
            .unwrap();
        assert!(reg.simulations().is_empty());
        assert!(reg
            .remove_key(&EntityKey::new(Category::Frames, "run"))
            .is_err());
        reg.clear();
        assert!(reg.is_empty());
    }
}
