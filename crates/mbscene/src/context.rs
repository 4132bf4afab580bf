//! Document lifecycle around one registry.

use std::collections::HashSet;
use std::io;

use mbscene_ir::{EntityKey, ObjectKey, Registry, SceneGraph, Stored};
use mbscene_resolve::Resolution;
use mbscene_writer::GenerationReport;

use crate::config::BuildConfig;
use crate::error::{ModelError, Result};

/// An open document: the scene it belongs to and its entities.
#[derive(Debug, Clone, PartialEq)]
struct Document {
    scene: String,
    registry: Registry,
}

/// Owns the registry of the open document and exposes the query surface
/// and the two build-time entry points ([`resolve`](Self::resolve) and
/// [`generate`](Self::generate)).
///
/// Every operation except [`open_document`](Self::open_document) fails
/// with [`ModelError::NoDocument`] while no document is open.
#[derive(Debug, Default)]
pub struct ModelContext {
    document: Option<Document>,
}

impl ModelContext {
    /// A context with no open document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty document bound to a scene, discarding any open one.
    pub fn open_document(&mut self, scene: impl Into<String>) {
        let scene = scene.into();
        tracing::debug!(%scene, "opened document");
        self.document = Some(Document {
            scene,
            registry: Registry::new(),
        });
    }

    /// Close the open document, dropping its entities.
    pub fn close_document(&mut self) -> Result<()> {
        let document = self.document.take().ok_or(ModelError::NoDocument)?;
        tracing::debug!(scene = %document.scene, entities = document.registry.len(), "closed document");
        Ok(())
    }

    /// True while a document is open.
    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    /// Scene the open document belongs to.
    pub fn scene_name(&self) -> Result<&str> {
        Ok(&self.document()?.scene)
    }

    /// The open document's registry.
    pub fn registry(&self) -> Result<&Registry> {
        Ok(&self.document()?.registry)
    }

    /// The open document's registry, mutably.
    pub fn registry_mut(&mut self) -> Result<&mut Registry> {
        Ok(&mut self.document_mut()?.registry)
    }

    /// Add an entity.
    pub fn add<E: Stored>(&mut self, entity: E) -> Result<()> {
        Ok(self.registry_mut()?.add(entity)?)
    }

    /// Look up an entity by name. The unassigned sentinel yields `None`.
    pub fn get<E: Stored>(&self, name: &str) -> Result<Option<&E>> {
        Ok(self.registry()?.get(name)?)
    }

    /// Entities of a type, optionally restricted to a primary object.
    pub fn filter<E: Stored>(&self, type_name: &str, owner: Option<ObjectKey>) -> Result<Vec<&E>> {
        Ok(self.registry()?.filter(type_name, owner))
    }

    /// Remove an entity by name.
    pub fn remove<E: Stored>(&mut self, name: &str) -> Result<E> {
        Ok(self.registry_mut()?.remove(name)?)
    }

    /// Remove every entity that uses one of `objects`, including wrappers
    /// of removed entities. Returns what was removed.
    pub fn remove_objects(&mut self, objects: &HashSet<ObjectKey>) -> Result<Vec<EntityKey>> {
        let registry = self.registry_mut()?;
        let removed = registry.entities_referencing(objects);
        for key in &removed {
            registry.remove_key(key)?;
        }
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "removed entities of deleted objects");
        }
        Ok(removed)
    }

    /// Encode the registry into a text blob for the host document. Tags
    /// every scene object with its current name first.
    pub fn save<S: SceneGraph>(&self, scene: &mut S) -> Result<String> {
        let blob = mbscene_snapshot::encode_text(self.registry()?, scene)?;
        tracing::debug!(bytes = blob.len(), "saved snapshot");
        Ok(blob)
    }

    /// Replace the registry with a decoded blob. On any failure the
    /// current registry is left untouched.
    pub fn load<S: SceneGraph>(&mut self, blob: &str, scene: &S) -> Result<()> {
        let document = self.document_mut()?;
        let registry = mbscene_snapshot::decode_text(blob, scene)?;
        tracing::debug!(entities = registry.len(), "loaded snapshot");
        document.registry = registry;
        Ok(())
    }

    /// Recompute node classification and frame order.
    pub fn resolve<S: SceneGraph>(&self, scene: &S) -> Result<Resolution> {
        Ok(mbscene_resolve::resolve(self.registry()?, scene)?)
    }

    /// Generate the solver input file into `out`.
    pub fn generate<S: SceneGraph>(
        &self,
        scene: &S,
        config: &BuildConfig,
        out: &mut impl io::Write,
    ) -> Result<GenerationReport> {
        let registry = self.registry()?;
        let resolution = mbscene_resolve::resolve(registry, scene)?;
        let report =
            mbscene_writer::write_input_file(registry, scene, &resolution, &config.writer, out)?;
        if !report.is_complete() {
            tracing::warn!(
                failures = report.failures.len(),
                "input file generated with errors"
            );
        }
        Ok(report)
    }

    fn document(&self) -> Result<&Document> {
        self.document.as_ref().ok_or(ModelError::NoDocument)
    }

    fn document_mut(&mut self) -> Result<&mut Document> {
        self.document.as_mut().ok_or(ModelError::NoDocument)
    }
}
