//! Structural node classification.

use std::collections::{BTreeMap, BTreeSet};

use mbscene_ir::{Entity, NodeRole, ObjectKey, Registry, SceneGraph};

use crate::error::{ResolveError, Result};

/// Class of a structural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeClass {
    /// Grounded or kinematically driven node without inertia.
    Static,
    /// Node carrying a rigid body.
    Dynamic,
    /// Node rigidly attached to another node.
    Dummy,
}

impl NodeClass {
    /// Emission order of the classes.
    pub const ORDER: [NodeClass; 3] = [NodeClass::Static, NodeClass::Dynamic, NodeClass::Dummy];

    /// Solver keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            NodeClass::Static => "static",
            NodeClass::Dynamic => "dynamic",
            NodeClass::Dummy => "dummy",
        }
    }
}

/// Node sets derived from the registry.
///
/// The three sets are pairwise disjoint. `order` lists static, dynamic and
/// dummy nodes in that order, each group sorted by display name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeClassification {
    /// Static nodes.
    pub statics: BTreeSet<ObjectKey>,
    /// Dynamic nodes.
    pub dynamics: BTreeSet<ObjectKey>,
    /// Dummy nodes.
    pub dummies: BTreeSet<ObjectKey>,
    /// Rigid offset indirections, anchor to target.
    pub offsets: BTreeMap<ObjectKey, ObjectKey>,
    /// Base node of every dummy node.
    pub dummy_bases: BTreeMap<ObjectKey, ObjectKey>,
    /// Deterministic node order.
    pub order: Vec<ObjectKey>,
}

impl NodeClassification {
    /// Follow a rigid offset one hop. Objects without an offset map to
    /// themselves.
    pub fn resolve(&self, object: ObjectKey) -> ObjectKey {
        self.offsets.get(&object).copied().unwrap_or(object)
    }

    /// Class of a node object, if it is one.
    pub fn class_of(&self, object: ObjectKey) -> Option<NodeClass> {
        if self.dynamics.contains(&object) {
            Some(NodeClass::Dynamic)
        } else if self.dummies.contains(&object) {
            Some(NodeClass::Dummy)
        } else if self.statics.contains(&object) {
            Some(NodeClass::Static)
        } else {
            None
        }
    }

    /// Nodes of one class, in emission order.
    pub fn of_class(&self, class: NodeClass) -> impl Iterator<Item = ObjectKey> + '_ {
        self.order
            .iter()
            .copied()
            .filter(move |k| self.class_of(*k) == Some(class))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no node was classified.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Classify every structural node of the registry.
///
/// Rigid offsets redirect an object to its target node (one hop, never
/// chained). Every node slot of an element is classified by the element's
/// role; node drives contribute static nodes. Dynamic wins over dummy and
/// both win over static.
pub fn classify_nodes<S: SceneGraph>(registry: &Registry, scene: &S) -> Result<NodeClassification> {
    let mut nodes = NodeClassification::default();

    for element in registry.elements() {
        check_objects(element, scene)?;
        if element.kind.node_role() == NodeRole::Offset {
            if let [anchor, target, ..] = element.objects[..] {
                nodes.offsets.insert(anchor, target);
            }
        }
    }

    for element in registry.elements() {
        let slots = element.node_objects();
        let resolved: Vec<ObjectKey> = slots.iter().map(|o| nodes.resolve(*o)).collect();
        match element.kind.node_role() {
            NodeRole::Static => nodes.statics.extend(resolved),
            NodeRole::Dynamic => nodes.dynamics.extend(resolved),
            NodeRole::Dummy => {
                if let [dummy, base] = resolved[..] {
                    nodes.dummies.insert(dummy);
                    nodes.statics.insert(base);
                    nodes.dummy_bases.insert(dummy, base);
                }
            }
            NodeRole::Offset | NodeRole::None => {}
        }
    }

    for drive in registry.drives() {
        check_objects(drive, scene)?;
        for object in drive.node_objects() {
            let resolved = nodes.resolve(*object);
            nodes.statics.insert(resolved);
        }
    }

    let NodeClassification {
        statics,
        dynamics,
        dummies,
        dummy_bases,
        ..
    } = &mut nodes;
    dummies.retain(|k| !dynamics.contains(k));
    dummy_bases.retain(|k, _| dummies.contains(k));
    statics.retain(|k| !dynamics.contains(k) && !dummies.contains(k));

    let mut order = Vec::with_capacity(statics.len() + dynamics.len() + dummies.len());
    for set in [&*statics, &*dynamics, &*dummies] {
        let mut group: Vec<ObjectKey> = set.iter().copied().collect();
        group.sort_by(|a, b| {
            scene
                .display_name(*a)
                .cmp(&scene.display_name(*b))
                .then(a.cmp(b))
        });
        order.extend(group);
    }
    nodes.order = order;

    tracing::debug!(
        statics = nodes.statics.len(),
        dynamics = nodes.dynamics.len(),
        dummies = nodes.dummies.len(),
        offsets = nodes.offsets.len(),
        "classified structural nodes"
    );
    Ok(nodes)
}

/// Fail when an entity references an object the scene no longer has.
pub(crate) fn check_objects<E: Entity, S: SceneGraph>(entity: &E, scene: &S) -> Result<()> {
    if entity.objects().iter().all(|k| scene.contains(*k)) {
        Ok(())
    } else {
        Err(ResolveError::MissingObject(entity.key()))
    }
}
