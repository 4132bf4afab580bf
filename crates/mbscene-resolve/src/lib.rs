#![warn(missing_docs)]

//! Dependency resolution for mbscene models.
//!
//! Turns a registry into the numbering the input-file writer needs:
//!
//! - [`classify_nodes`]: static / dynamic / dummy structural nodes, with
//!   rigid offsets reduced to their target node
//! - [`frame_dependencies`] and [`order_frames`]: reference frames in
//!   parent-first order
//! - [`resolve`]: both of the above plus integer labels and the governing
//!   frame of every object

use std::collections::{HashMap, HashSet};

use mbscene_ir::{ObjectKey, Registry, SceneGraph};

mod error;
mod frames;
mod nodes;

pub use error::{ResolveError, ResolveWarning, Result};
pub use frames::{frame_dependencies, order_frames, FrameDeps, FrameOrder};
pub use nodes::{classify_nodes, NodeClass, NodeClassification};

/// Everything the writer needs to number and place entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Structural node sets and their order.
    pub nodes: NodeClassification,
    /// Frame names in emission order.
    pub frames: Vec<String>,
    /// Recovered topology anomalies.
    pub warnings: Vec<ResolveWarning>,
    node_labels: HashMap<ObjectKey, u32>,
    frame_labels: HashMap<String, u32>,
    governing: HashMap<ObjectKey, String>,
}

impl Resolution {
    /// Label of a structural node, after following its rigid offset.
    pub fn node_label(&self, object: ObjectKey) -> Option<u32> {
        self.node_labels.get(&self.nodes.resolve(object)).copied()
    }

    /// Label of a reference frame.
    pub fn frame_label(&self, frame: &str) -> Option<u32> {
        self.frame_labels.get(frame).copied()
    }

    /// First frame in emission order whose child objects contain `object`.
    pub fn governing_frame(&self, object: ObjectKey) -> Option<&str> {
        self.governing.get(&object).map(String::as_str)
    }
}

/// Recompute node classification and frame order.
pub fn resolve<S: SceneGraph>(registry: &Registry, scene: &S) -> Result<Resolution> {
    for frame in registry.frames() {
        nodes::check_objects(frame, scene)?;
    }
    for node in registry.nodes() {
        nodes::check_objects(node, scene)?;
    }

    let nodes = classify_nodes(registry, scene)?;
    let FrameOrder { order, warnings } = order_frames(&frame_dependencies(registry));

    let node_labels = nodes
        .order
        .iter()
        .zip(1..)
        .map(|(k, label)| (*k, label))
        .collect();
    let frame_labels = order.iter().cloned().zip(1..).collect();

    // Frames left in a cycle are placed globally and govern nothing.
    let cyclic: HashSet<&str> = warnings
        .iter()
        .filter_map(|w| match w {
            ResolveWarning::FrameCycle(frames) => Some(frames),
            ResolveWarning::DanglingParent { .. } => None,
        })
        .flatten()
        .map(String::as_str)
        .collect();

    let mut governing = HashMap::new();
    for name in order.iter().filter(|n| !cyclic.contains(n.as_str())) {
        let Some(frame) = registry.frames().iter().find(|f| &f.name == name) else {
            continue;
        };
        for child in frame.children() {
            governing.entry(*child).or_insert_with(|| name.clone());
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        frames = order.len(),
        warnings = warnings.len(),
        "resolved model"
    );

    Ok(Resolution {
        nodes,
        frames: order,
        warnings,
        node_labels,
        frame_labels,
        governing,
    })
}
