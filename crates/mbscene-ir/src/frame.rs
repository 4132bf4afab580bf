//! Reference frames and structural node definitions.

use serde::{Deserialize, Serialize};

use crate::entity::{Category, Entity, EntityKey};
use crate::scene::ObjectKey;
use crate::Vec3;

/// Type tag of reference frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameKind {
    /// The only frame type.
    #[default]
    #[serde(rename = "Reference frame")]
    ReferenceFrame,
}

impl FrameKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &["Reference frame"];
}

/// A named local coordinate system.
///
/// `objects[0]` is the origin object; the remaining objects inherit the
/// frame. A frame whose origin is another frame's child is parented to
/// that frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame<O = ObjectKey> {
    /// Frame name, unique among frames.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type", default)]
    pub kind: FrameKind,
    /// Linear velocity of the frame.
    #[serde(default)]
    pub velocity: Vec3,
    /// Angular velocity of the frame.
    #[serde(default)]
    pub angular_velocity: Vec3,
    /// Origin object followed by child objects.
    #[serde(default)]
    pub objects: Vec<O>,
}

impl<O> Frame<O> {
    /// Create a frame at rest.
    pub fn new(name: impl Into<String>, origin: O, children: Vec<O>) -> Self {
        let mut objects = Vec::with_capacity(children.len() + 1);
        objects.push(origin);
        objects.extend(children);
        Self {
            name: name.into(),
            kind: FrameKind::ReferenceFrame,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            objects,
        }
    }

    /// Origin object.
    pub fn origin(&self) -> Option<&O> {
        self.objects.first()
    }

    /// Objects inheriting the frame.
    pub fn children(&self) -> &[O] {
        self.objects.get(1..).unwrap_or(&[])
    }

    /// Convert the object references, failing on the first error.
    pub fn try_map_objects<P, E>(self, f: impl FnMut(O) -> Result<P, E>) -> Result<Frame<P>, E> {
        Ok(Frame {
            name: self.name,
            kind: self.kind,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            objects: self.objects.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }
}

impl Entity for Frame {
    const CATEGORY: Category = Category::Frames;

    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Reference frame"
    }

    fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    fn links(&self) -> Vec<EntityKey> {
        Vec::new()
    }
}

/// Type tag of node definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The only node definition type.
    #[default]
    #[serde(rename = "Structural node")]
    Structural,
}

impl NodeKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &["Structural node"];
}

/// Per-node options for the structural node on `objects[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef<O = ObjectKey> {
    /// Definition name, unique among node definitions.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Whether the solver writes output for this node.
    #[serde(default = "default_output")]
    pub output: bool,
    /// Initial linear velocity.
    #[serde(default)]
    pub velocity: Vec3,
    /// Initial angular velocity.
    #[serde(default)]
    pub angular_velocity: Vec3,
    /// The node object.
    #[serde(default)]
    pub objects: Vec<O>,
}

fn default_output() -> bool {
    true
}

impl<O> NodeDef<O> {
    /// Definition with default options for a node object.
    pub fn new(name: impl Into<String>, object: O) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Structural,
            output: true,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            objects: vec![object],
        }
    }

    /// The node object.
    pub fn object(&self) -> Option<&O> {
        self.objects.first()
    }

    /// Convert the object references, failing on the first error.
    pub fn try_map_objects<P, E>(self, f: impl FnMut(O) -> Result<P, E>) -> Result<NodeDef<P>, E> {
        Ok(NodeDef {
            name: self.name,
            kind: self.kind,
            output: self.output,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            objects: self.objects.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }
}

impl Entity for NodeDef {
    const CATEGORY: Category = Category::Nodes;

    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Structural node"
    }

    fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    fn links(&self) -> Vec<EntityKey> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_and_children() {
        let frame = Frame::new("F", "o", vec!["a", "b"]);
        assert_eq!(frame.origin(), Some(&"o"));
        assert_eq!(frame.children(), &["a", "b"]);

        let empty: Frame<&str> = Frame {
            objects: Vec::new(),
            ..Frame::new("E", "x", Vec::new())
        };
        assert!(empty.origin().is_none());
        assert!(empty.children().is_empty());
    }

    #[test]
    fn frame_type_tag_defaults() {
        let frame: Frame<String> =
            serde_json::from_str(r#"{"name":"F","objects":["objects[\"o\"]"]}"#).unwrap();
        assert_eq!(frame.kind, FrameKind::ReferenceFrame);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "Reference frame");
    }

    #[test]
    fn node_output_defaults_on() {
        let node: NodeDef<String> = serde_json::from_str(r#"{"name":"n"}"#).unwrap();
        assert!(node.output);
        assert!(node.object().is_none());
    }
}
