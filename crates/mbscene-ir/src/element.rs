//! Elements: bodies, joints, forces, beams and the other solver elements.

use serde::{Deserialize, Serialize};

use crate::entity::{Category, Entity, EntityKey};
use crate::scene::ObjectKey;
use crate::{Mat3, Vec3};

/// A solver element attached to one or more scene objects.
///
/// `O` is the object reference representation: live [`ObjectKey`]s in the
/// registry, symbolic paths inside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element<O = ObjectKey> {
    /// Element name, unique among elements.
    pub name: String,
    /// Type tag and type-specific parameters.
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Referenced scene objects. Node slots come first (see
    /// [`ElementKind::node_slots`]).
    #[serde(default)]
    pub objects: Vec<O>,
}

/// Element type and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    /// Lifting surface attached to a node.
    #[serde(rename = "Aerodynamic body")]
    AerodynamicBody {
        /// Surface span.
        span: f64,
        /// Chord length.
        chord: f64,
        /// Aerodynamic centre offset along the chord.
        aero_center: f64,
        /// Boundary-condition point offset along the chord.
        bc_point: f64,
        /// Twist angle (radians).
        twist: f64,
        /// Gauss integration points.
        integration_points: u32,
    },
    /// Two-node beam segment with a 6-D constitutive law.
    #[serde(rename = "Beam segment")]
    BeamSegment {
        /// Constitutive law link.
        law: String,
    },
    /// Rigid body on a dynamic node.
    #[serde(rename = "Body")]
    Body {
        /// Mass.
        mass: f64,
        /// Centre of mass relative to the node.
        center_of_mass: Vec3,
        /// Inertia tensor about the centre of mass.
        inertia: Mat3,
    },
    /// Force applied at a node.
    #[serde(rename = "Structural force")]
    StructuralForce {
        /// Follows the node orientation instead of the global frame.
        follower: bool,
        /// Force direction.
        direction: Vec3,
        /// Drive scaling the force magnitude.
        drive: String,
    },
    /// Couple applied at a node.
    #[serde(rename = "Structural couple")]
    StructuralCouple {
        /// Follows the node orientation instead of the global frame.
        follower: bool,
        /// Couple axis.
        direction: Vec3,
        /// Drive scaling the couple magnitude.
        drive: String,
    },
    /// Generic element clamping one node degree of freedom to a drive.
    #[serde(rename = "Genel clamp")]
    GenelClamp {
        /// Degree of freedom, 1..=6.
        dof: u8,
        /// Prescribed value drive.
        drive: String,
    },
    /// Grounds a node completely.
    #[serde(rename = "Clamp")]
    Clamp,
    /// Hinge allowing rotation about the local z axis.
    #[serde(rename = "Revolute hinge")]
    RevoluteHinge,
    /// Ball joint.
    #[serde(rename = "Spherical hinge")]
    SphericalHinge,
    /// Locks relative rotation between two nodes.
    #[serde(rename = "Prismatic")]
    Prismatic,
    /// Deformable connection with a 3-D constitutive law.
    #[serde(rename = "Deformable displacement joint")]
    DeformableDisplacementJoint {
        /// Constitutive law link.
        law: String,
    },
    /// Rotor between a craft node and a rotor node.
    #[serde(rename = "Rotor")]
    Rotor,
    /// Uniform gravity field.
    #[serde(rename = "Gravity")]
    Gravity {
        /// Acceleration direction.
        direction: Vec3,
        /// Magnitude drive.
        drive: String,
    },
    /// Air properties for aerodynamic elements.
    #[serde(rename = "Air properties")]
    AirProperties {
        /// Air density.
        density: f64,
        /// Speed of sound.
        sound_speed: f64,
        /// Free-stream velocity direction.
        velocity: Vec3,
        /// Free-stream speed drive.
        drive: String,
    },
    /// Wraps another element with an activation drive.
    #[serde(rename = "Driven")]
    Driven {
        /// Wrapped element link.
        element: String,
        /// Activation drive link.
        drive: String,
    },
    /// Redirects the first object to the node of the second.
    #[serde(rename = "Rigid offset")]
    RigidOffset,
    /// Dummy node on the first object, carried by the node of the second.
    #[serde(rename = "Dummy node")]
    DummyNode,
}

/// Emission groups, in the order the writer emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementGroup {
    /// Aerodynamic elements.
    Aerodynamic,
    /// Beams.
    Beam,
    /// Rigid bodies.
    RigidBody,
    /// Forces and couples.
    Force,
    /// Generic elements.
    Genel,
    /// Joints.
    Joint,
    /// Rotors.
    Rotor,
    /// Gravity and air properties.
    Environment,
    /// Driven wrappers.
    Driven,
}

impl ElementGroup {
    /// Fixed emission order.
    pub const ORDER: [ElementGroup; 9] = [
        ElementGroup::Aerodynamic,
        ElementGroup::Beam,
        ElementGroup::RigidBody,
        ElementGroup::Force,
        ElementGroup::Genel,
        ElementGroup::Joint,
        ElementGroup::Rotor,
        ElementGroup::Environment,
        ElementGroup::Driven,
    ];
}

/// How an element's node objects take part in node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// No structural nodes.
    None,
    /// Node objects become static nodes unless classified otherwise.
    Static,
    /// Node objects become dynamic nodes.
    Dynamic,
    /// First object is a dummy node, second its static base.
    Dummy,
    /// First object is redirected to the second.
    Offset,
}

impl ElementKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "Aerodynamic body",
        "Beam segment",
        "Body",
        "Structural force",
        "Structural couple",
        "Genel clamp",
        "Clamp",
        "Revolute hinge",
        "Spherical hinge",
        "Prismatic",
        "Deformable displacement joint",
        "Rotor",
        "Gravity",
        "Air properties",
        "Driven",
        "Rigid offset",
        "Dummy node",
    ];

    /// Type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::AerodynamicBody { .. } => "Aerodynamic body",
            ElementKind::BeamSegment { .. } => "Beam segment",
            ElementKind::Body { .. } => "Body",
            ElementKind::StructuralForce { .. } => "Structural force",
            ElementKind::StructuralCouple { .. } => "Structural couple",
            ElementKind::GenelClamp { .. } => "Genel clamp",
            ElementKind::Clamp => "Clamp",
            ElementKind::RevoluteHinge => "Revolute hinge",
            ElementKind::SphericalHinge => "Spherical hinge",
            ElementKind::Prismatic => "Prismatic",
            ElementKind::DeformableDisplacementJoint { .. } => "Deformable displacement joint",
            ElementKind::Rotor => "Rotor",
            ElementKind::Gravity { .. } => "Gravity",
            ElementKind::AirProperties { .. } => "Air properties",
            ElementKind::Driven { .. } => "Driven",
            ElementKind::RigidOffset => "Rigid offset",
            ElementKind::DummyNode => "Dummy node",
        }
    }

    /// Emission group, or `None` for node modifiers that never reach the
    /// element block.
    pub fn group(&self) -> Option<ElementGroup> {
        let group = match self {
            ElementKind::AerodynamicBody { .. } => ElementGroup::Aerodynamic,
            ElementKind::BeamSegment { .. } => ElementGroup::Beam,
            ElementKind::Body { .. } => ElementGroup::RigidBody,
            ElementKind::StructuralForce { .. } | ElementKind::StructuralCouple { .. } => {
                ElementGroup::Force
            }
            ElementKind::GenelClamp { .. } => ElementGroup::Genel,
            ElementKind::Clamp
            | ElementKind::RevoluteHinge
            | ElementKind::SphericalHinge
            | ElementKind::Prismatic
            | ElementKind::DeformableDisplacementJoint { .. } => ElementGroup::Joint,
            ElementKind::Rotor => ElementGroup::Rotor,
            ElementKind::Gravity { .. } | ElementKind::AirProperties { .. } => {
                ElementGroup::Environment
            }
            ElementKind::Driven { .. } => ElementGroup::Driven,
            ElementKind::RigidOffset | ElementKind::DummyNode => return None,
        };
        Some(group)
    }

    /// Role in node classification.
    pub fn node_role(&self) -> NodeRole {
        match self {
            ElementKind::Body { .. } => NodeRole::Dynamic,
            ElementKind::DummyNode => NodeRole::Dummy,
            ElementKind::RigidOffset => NodeRole::Offset,
            ElementKind::Gravity { .. }
            | ElementKind::AirProperties { .. }
            | ElementKind::Driven { .. } => NodeRole::None,
            _ => NodeRole::Static,
        }
    }

    /// Number of leading objects that are structural node locations.
    pub fn node_slots(&self) -> usize {
        match self {
            ElementKind::AerodynamicBody { .. }
            | ElementKind::Body { .. }
            | ElementKind::StructuralForce { .. }
            | ElementKind::StructuralCouple { .. }
            | ElementKind::GenelClamp { .. }
            | ElementKind::Clamp => 1,
            ElementKind::BeamSegment { .. }
            | ElementKind::RevoluteHinge
            | ElementKind::SphericalHinge
            | ElementKind::Prismatic
            | ElementKind::DeformableDisplacementJoint { .. }
            | ElementKind::Rotor
            | ElementKind::RigidOffset
            | ElementKind::DummyNode => 2,
            ElementKind::Gravity { .. }
            | ElementKind::AirProperties { .. }
            | ElementKind::Driven { .. } => 0,
        }
    }

    /// Solver statement keyword (`joint`, `body`, ...).
    pub fn keyword(&self) -> &'static str {
        match self {
            ElementKind::AerodynamicBody { .. } => "aerodynamic body",
            ElementKind::BeamSegment { .. } => "beam2",
            ElementKind::Body { .. } => "body",
            ElementKind::StructuralForce { .. } => "force",
            ElementKind::StructuralCouple { .. } => "couple",
            ElementKind::GenelClamp { .. } => "genel",
            ElementKind::Clamp
            | ElementKind::RevoluteHinge
            | ElementKind::SphericalHinge
            | ElementKind::Prismatic
            | ElementKind::DeformableDisplacementJoint { .. } => "joint",
            ElementKind::Rotor => "rotor",
            ElementKind::Gravity { .. } => "gravity",
            ElementKind::AirProperties { .. } => "air properties",
            ElementKind::Driven { .. } => "driven",
            ElementKind::RigidOffset | ElementKind::DummyNode => "structural",
        }
    }
}

impl<O> Element<O> {
    /// Create an element.
    pub fn new(name: impl Into<String>, kind: ElementKind, objects: Vec<O>) -> Self {
        Self {
            name: name.into(),
            kind,
            objects,
        }
    }

    /// Objects occupying node slots.
    pub fn node_objects(&self) -> &[O] {
        let n = self.kind.node_slots().min(self.objects.len());
        &self.objects[..n]
    }

    /// Convert the object references, failing on the first error.
    pub fn try_map_objects<P, E>(
        self,
        f: impl FnMut(O) -> Result<P, E>,
    ) -> Result<Element<P>, E> {
        Ok(Element {
            name: self.name,
            kind: self.kind,
            objects: self.objects.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }
}

impl Entity for Element {
    const CATEGORY: Category = Category::Elements;

    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn objects(&self) -> &[ObjectKey] {
        &self.objects
    }

    fn links(&self) -> Vec<EntityKey> {
        let links = match &self.kind {
            ElementKind::BeamSegment { law } | ElementKind::DeformableDisplacementJoint { law } => {
                vec![EntityKey::link(Category::ConstLaws, law)]
            }
            ElementKind::StructuralForce { drive, .. }
            | ElementKind::StructuralCouple { drive, .. }
            | ElementKind::GenelClamp { drive, .. }
            | ElementKind::Gravity { drive, .. }
            | ElementKind::AirProperties { drive, .. } => {
                vec![EntityKey::link(Category::Drives, drive)]
            }
            ElementKind::Driven { element, drive } => vec![
                EntityKey::link(Category::Elements, element),
                EntityKey::link(Category::Drives, drive),
            ],
            _ => Vec::new(),
        };
        links.into_iter().flatten().collect()
    }
}
