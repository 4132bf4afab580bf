//! Scene objects: the host-owned positioned objects entities refer to.
//!
//! The host application owns its scene graph. The core only needs the
//! narrow [`SceneGraph`] interface: names, world transforms, parenting and
//! a stable identifier tag that survives renames. [`Scene`] is a small
//! in-memory implementation used by the CLI and by tests.

use nalgebra::{Matrix3, Vector3};
use slotmap::SlotMap;

use crate::error::SceneError;
use crate::{Mat3, Vec3};

slotmap::new_key_type! {
    /// Handle to a scene object. Entities store these, never the object.
    pub struct ObjectKey;
}

/// Interface the host scene graph presents to the core.
pub trait SceneGraph {
    /// Name of the scene (the active scene of the document).
    fn name(&self) -> &str;

    /// Every object currently in the scene.
    fn object_keys(&self) -> Vec<ObjectKey>;

    /// Current display name of an object.
    fn display_name(&self, key: ObjectKey) -> Option<&str>;

    /// World-space translation of an object.
    fn world_translation(&self, key: ObjectKey) -> Option<Vec3>;

    /// World-space rotation matrix of an object.
    fn world_rotation(&self, key: ObjectKey) -> Option<Mat3>;

    /// Parent object, if any.
    fn parent(&self, key: ObjectKey) -> Option<ObjectKey>;

    /// Stable identifier attached at the last snapshot, if any.
    fn stable_id(&self, key: ObjectKey) -> Option<&str>;

    /// Attach a stable identifier. Returns false for unknown keys.
    fn set_stable_id(&mut self, key: ObjectKey, id: &str) -> bool;

    /// Find the object carrying a stable identifier.
    fn find_by_stable_id(&self, id: &str) -> Option<ObjectKey>;

    /// True when the key refers to a live object.
    fn contains(&self, key: ObjectKey) -> bool {
        self.display_name(key).is_some()
    }
}

/// A positioned object with a transform local to its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Display name, unique within the scene.
    pub name: String,
    /// Translation relative to the parent (or the world).
    pub translation: Vec3,
    /// Rotation relative to the parent (or the world).
    pub rotation: Mat3,
    /// Parent object.
    pub parent: Option<ObjectKey>,
    /// Stable identifier tag.
    pub stable_id: Option<String>,
}

impl SceneObject {
    /// Object at a translation with identity rotation and no parent.
    pub fn new(name: impl Into<String>, translation: Vec3) -> Self {
        Self {
            name: name.into(),
            translation,
            rotation: Mat3::identity(),
            parent: None,
            stable_id: None,
        }
    }

    /// Set the local rotation.
    pub fn with_rotation(mut self, rotation: Mat3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the parent.
    pub fn with_parent(mut self, parent: ObjectKey) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the stable identifier tag.
    pub fn with_stable_id(mut self, id: impl Into<String>) -> Self {
        self.stable_id = Some(id.into());
        self
    }
}

/// In-memory scene graph.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    name: String,
    objects: SlotMap<ObjectKey, SceneObject>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: SlotMap::with_key(),
        }
    }

    /// Add an unparented object at a world translation.
    pub fn add(&mut self, name: impl Into<String>, translation: Vec3) -> Result<ObjectKey, SceneError> {
        self.insert(SceneObject::new(name, translation))
    }

    /// Insert a fully specified object.
    pub fn insert(&mut self, object: SceneObject) -> Result<ObjectKey, SceneError> {
        if self.find(&object.name).is_some() {
            return Err(SceneError::DuplicateObject(object.name));
        }
        if let Some(parent) = object.parent {
            if !self.objects.contains_key(parent) {
                return Err(SceneError::UnknownObject);
            }
        }
        Ok(self.objects.insert(object))
    }

    /// Look up an object.
    pub fn get(&self, key: ObjectKey) -> Option<&SceneObject> {
        self.objects.get(key)
    }

    /// Find an object by display name.
    pub fn find(&self, name: &str) -> Option<ObjectKey> {
        self.objects
            .iter()
            .find(|(_, o)| o.name == name)
            .map(|(k, _)| k)
    }

    /// Rename an object. The stable identifier is left untouched.
    pub fn rename(&mut self, key: ObjectKey, name: impl Into<String>) -> Result<(), SceneError> {
        let name = name.into();
        if let Some(other) = self.find(&name) {
            if other != key {
                return Err(SceneError::DuplicateObject(name));
            }
        }
        let object = self.objects.get_mut(key).ok_or(SceneError::UnknownObject)?;
        object.name = name;
        Ok(())
    }

    /// Change an object's parent.
    pub fn set_parent(&mut self, key: ObjectKey, parent: Option<ObjectKey>) -> Result<(), SceneError> {
        if !self.objects.contains_key(key) {
            return Err(SceneError::UnknownObject);
        }
        if let Some(p) = parent {
            if !self.objects.contains_key(p) {
                return Err(SceneError::UnknownObject);
            }
            if self.ancestors(p).contains(&key) || p == key {
                return Err(SceneError::ParentCycle(self.objects[key].name.clone()));
            }
        }
        self.objects[key].parent = parent;
        Ok(())
    }

    /// Set an object's local transform.
    pub fn set_local_transform(
        &mut self,
        key: ObjectKey,
        translation: Vec3,
        rotation: Mat3,
    ) -> Result<(), SceneError> {
        let object = self.objects.get_mut(key).ok_or(SceneError::UnknownObject)?;
        object.translation = translation;
        object.rotation = rotation;
        Ok(())
    }

    /// Remove an object. Its children become unparented.
    pub fn remove(&mut self, key: ObjectKey) -> Option<SceneObject> {
        let removed = self.objects.remove(key)?;
        for (_, object) in self.objects.iter_mut() {
            if object.parent == Some(key) {
                object.parent = None;
            }
        }
        Some(removed)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ancestor chain, nearest first. Bounded by the object count.
    fn ancestors(&self, key: ObjectKey) -> Vec<ObjectKey> {
        let mut chain = Vec::new();
        let mut current = self.objects.get(key).and_then(|o| o.parent);
        while let Some(k) = current {
            if chain.len() >= self.objects.len() || chain.contains(&k) {
                break;
            }
            chain.push(k);
            current = self.objects.get(k).and_then(|o| o.parent);
        }
        chain
    }

    fn world_transform(&self, key: ObjectKey) -> Option<(Vector3<f64>, Matrix3<f64>)> {
        let object = self.objects.get(key)?;
        let mut translation: Vector3<f64> = object.translation.into();
        let mut rotation: Matrix3<f64> = object.rotation.into();
        for ancestor in self.ancestors(key) {
            let parent = &self.objects[ancestor];
            let parent_rotation: Matrix3<f64> = parent.rotation.into();
            translation = Vector3::from(parent.translation) + parent_rotation * translation;
            rotation = parent_rotation * rotation;
        }
        Some((translation, rotation))
    }
}

impl SceneGraph for Scene {
    fn name(&self) -> &str {
        &self.name
    }

    fn object_keys(&self) -> Vec<ObjectKey> {
        self.objects.keys().collect()
    }

    fn display_name(&self, key: ObjectKey) -> Option<&str> {
        self.objects.get(key).map(|o| o.name.as_str())
    }

    fn world_translation(&self, key: ObjectKey) -> Option<Vec3> {
        self.world_transform(key).map(|(t, _)| t.into())
    }

    fn world_rotation(&self, key: ObjectKey) -> Option<Mat3> {
        self.world_transform(key).map(|(_, r)| r.into())
    }

    fn parent(&self, key: ObjectKey) -> Option<ObjectKey> {
        self.objects.get(key).and_then(|o| o.parent)
    }

    fn stable_id(&self, key: ObjectKey) -> Option<&str> {
        self.objects.get(key).and_then(|o| o.stable_id.as_deref())
    }

    fn set_stable_id(&mut self, key: ObjectKey, id: &str) -> bool {
        match self.objects.get_mut(key) {
            Some(object) => {
                object.stable_id = Some(id.to_string());
                true
            }
            None => false,
        }
    }

    fn find_by_stable_id(&self, id: &str) -> Option<ObjectKey> {
        self.objects
            .iter()
            .find(|(_, o)| o.stable_id.as_deref() == Some(id))
            .map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rot_z_90() -> Mat3 {
        Mat3([[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let mut scene = Scene::new("Scene");
        let base = scene
            .insert(SceneObject::new("base", Vec3::new(1.0, 0.0, 0.0)).with_rotation(rot_z_90()))
            .unwrap();
        let arm = scene
            .insert(SceneObject::new("arm", Vec3::new(2.0, 0.0, 0.0)).with_parent(base))
            .unwrap();

        let t = scene.world_translation(arm).unwrap();
        assert_relative_eq!(t.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(t.y, 2.0, epsilon = 1e-12);
        assert_eq!(scene.world_rotation(arm).unwrap(), rot_z_90());
        assert_eq!(scene.parent(arm), Some(base));
    }

    #[test]
    fn names_are_unique() {
        let mut scene = Scene::new("Scene");
        let a = scene.add("a", Vec3::zeros()).unwrap();
        scene.add("b", Vec3::zeros()).unwrap();
        assert_eq!(
            scene.add("a", Vec3::zeros()),
            Err(SceneError::DuplicateObject("a".into()))
        );
        assert!(scene.rename(a, "b").is_err());
        scene.rename(a, "a2").unwrap();
        assert_eq!(scene.find("a2"), Some(a));
    }

    #[test]
    fn parent_cycles_are_rejected() {
        let mut scene = Scene::new("Scene");
        let a = scene.add("a", Vec3::zeros()).unwrap();
        let b = scene
            .insert(SceneObject::new("b", Vec3::zeros()).with_parent(a))
            .unwrap();
        assert!(matches!(
            scene.set_parent(a, Some(b)),
            Err(SceneError::ParentCycle(_))
        ));
        assert!(scene.set_parent(a, Some(a)).is_err());
    }

    #[test]
    fn stable_id_survives_rename() {
        let mut scene = Scene::new("Scene");
        let a = scene.add("Cube", Vec3::zeros()).unwrap();
        assert!(scene.set_stable_id(a, "Cube"));
        scene.rename(a, "Cube.001").unwrap();
        assert_eq!(scene.find_by_stable_id("Cube"), Some(a));
        assert_eq!(scene.display_name(a), Some("Cube.001"));
    }

    #[test]
    fn removing_parent_unparents_children() {
        let mut scene = Scene::new("Scene");
        let a = scene.add("a", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let b = scene
            .insert(SceneObject::new("b", Vec3::new(1.0, 0.0, 0.0)).with_parent(a))
            .unwrap();
        scene.remove(a);
        assert_eq!(scene.parent(b), None);
        assert!(!scene.contains(a));
        assert_eq!(scene.world_translation(b), Some(Vec3::new(1.0, 0.0, 0.0)));
    }
}
