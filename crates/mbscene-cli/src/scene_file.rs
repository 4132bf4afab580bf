//! JSON scene description read by the CLI in place of a host application.
//!
//! ```json
//! {
//!   "name": "Scene",
//!   "objects": [
//!     { "name": "Ground" },
//!     { "name": "Arm", "translation": [1, 0, 0], "parent": "Ground" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mbscene::{Mat3, Scene, SceneGraph, SceneObject, Vec3};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SceneFile {
    #[serde(default = "default_scene_name")]
    name: String,
    #[serde(default)]
    objects: Vec<ObjectSpec>,
}

fn default_scene_name() -> String {
    "Scene".to_string()
}

#[derive(Debug, Deserialize)]
struct ObjectSpec {
    name: String,
    /// Defaults to the object name.
    stable_id: Option<String>,
    #[serde(default)]
    translation: [f64; 3],
    /// Row-major local rotation; identity when absent.
    rotation: Option<[[f64; 3]; 3]>,
    /// Must be listed earlier in the file.
    parent: Option<String>,
}

/// Parse a scene description.
pub fn parse(json: &str) -> Result<Scene> {
    let file: SceneFile = serde_json::from_str(json).context("invalid scene file")?;
    let mut scene = Scene::new(file.name);
    let mut stable_ids = HashSet::new();

    for entry in file.objects {
        let [x, y, z] = entry.translation;
        let stable_id = entry.stable_id.unwrap_or_else(|| entry.name.clone());
        if !stable_ids.insert(stable_id.clone()) {
            bail!("object {}: stable id {stable_id} is already used", entry.name);
        }
        let mut object = SceneObject::new(entry.name.as_str(), Vec3::new(x, y, z))
            .with_stable_id(stable_id);
        if let Some(rows) = entry.rotation {
            object = object.with_rotation(Mat3(rows));
        }
        if let Some(parent) = &entry.parent {
            let Some(key) = scene.find(parent) else {
                bail!("object {}: parent {parent} is not defined before it", entry.name);
            };
            object = object.with_parent(key);
        }
        scene
            .insert(object)
            .with_context(|| format!("object {}", entry.name))?;
    }

    tracing::debug!(scene = %scene.name(), objects = scene.len(), "loaded scene");
    Ok(scene)
}

/// Read a scene description file.
pub fn load(path: &Path) -> Result<Scene> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&json).with_context(|| format!("in {}", path.display()))
}
