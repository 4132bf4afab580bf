//! Reference-frame parent chains and their topological order.

use std::collections::{BTreeSet, HashMap};

use mbscene_ir::Registry;

use crate::error::ResolveWarning;

/// A frame and the frames it is parented to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDeps {
    /// Frame name.
    pub name: String,
    /// Parent frame names.
    pub parents: Vec<String>,
}

impl FrameDeps {
    /// Create a dependency record.
    pub fn new(name: impl Into<String>, parents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            parents: parents.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parents of every frame: frame A is a parent of frame B when A's child
/// objects contain B's origin.
pub fn frame_dependencies(registry: &Registry) -> Vec<FrameDeps> {
    let frames = registry.frames();
    frames
        .iter()
        .map(|frame| {
            let parents = match frame.origin() {
                Some(origin) => frames
                    .iter()
                    .filter(|other| other.name != frame.name)
                    .filter(|other| other.children().contains(origin))
                    .map(|other| other.name.clone())
                    .collect(),
                None => Vec::new(),
            };
            FrameDeps {
                name: frame.name.clone(),
                parents,
            }
        })
        .collect()
}

/// Frames in dependency order, with the anomalies met on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOrder {
    /// Frame names, every frame after all of its parents.
    pub order: Vec<String>,
    /// Dangling parents and cycles.
    pub warnings: Vec<ResolveWarning>,
}

/// Order frames so that every frame follows its parents.
///
/// Kahn's algorithm with a name-ordered ready set, so independent frames
/// come out alphabetically. Parents outside the input are ignored with a
/// warning. Frames caught in a cycle never become ready; they are appended
/// in name order with a warning, so the function always terminates.
pub fn order_frames(frames: &[FrameDeps]) -> FrameOrder {
    let index: HashMap<&str, usize> = frames
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.as_str(), i))
        .collect();

    let mut warnings = Vec::new();
    let mut pending = vec![0usize; frames.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); frames.len()];

    for (i, frame) in frames.iter().enumerate() {
        let parents: BTreeSet<&str> = frame.parents.iter().map(String::as_str).collect();
        for parent in parents {
            match index.get(parent) {
                Some(&p) => {
                    pending[i] += 1;
                    dependents[p].push(i);
                }
                None => {
                    tracing::warn!(frame = %frame.name, parent, "dangling reference frame parent");
                    warnings.push(ResolveWarning::DanglingParent {
                        frame: frame.name.clone(),
                        parent: parent.to_string(),
                    });
                }
            }
        }
    }

    let mut ready: BTreeSet<(&str, usize)> = frames
        .iter()
        .enumerate()
        .filter(|(i, _)| pending[*i] == 0)
        .map(|(i, f)| (f.name.as_str(), i))
        .collect();
    let mut emitted = vec![false; frames.len()];
    let mut order = Vec::with_capacity(frames.len());

    while let Some((name, i)) = ready.pop_first() {
        emitted[i] = true;
        order.push(name.to_string());
        for &d in &dependents[i] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.insert((frames[d].name.as_str(), d));
            }
        }
    }

    if order.len() < frames.len() {
        let mut leftover: Vec<&str> = frames
            .iter()
            .enumerate()
            .filter(|(i, _)| !emitted[*i])
            .map(|(_, f)| f.name.as_str())
            .collect();
        leftover.sort_unstable();
        tracing::warn!(frames = ?leftover, "reference frame cycle; treating frames as global");
        let leftover: Vec<String> = leftover.into_iter().map(str::to_string).collect();
        order.extend(leftover.iter().cloned());
        warnings.push(ResolveWarning::FrameCycle(leftover));
    }

    FrameOrder { order, warnings }
}
