//! Snapshot records and the allow-list / deny-list checks.

use mbscene_ir::{
    ConstLaw, Drive, DriveKind, Driver, DriverKind, Element, ElementKind, Frame, FrameKind,
    LawKind, NodeDef, NodeKind, Simulation, SimulationKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SnapshotError};

/// One serialized entity. Object references are symbolic paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum Record {
    /// An element.
    Element(Element<String>),
    /// A drive caller.
    Drive(Drive<String>),
    /// An input driver.
    Driver(Driver),
    /// A constitutive law.
    ConstLaw(ConstLaw),
    /// A reference frame.
    Frame(Frame<String>),
    /// A structural node definition.
    Node(NodeDef<String>),
    /// A simulation run.
    Simulation(Simulation),
}

/// Capability names refused anywhere in a `class` or `type` position.
pub const DENIED: [&str; 2] = ["eval", "exec"];

/// Record classes and the entity types each may carry.
pub const ALLOWED: [(&str, &[&str]); 7] = [
    ("Element", ElementKind::TYPE_NAMES),
    ("Drive", DriveKind::TYPE_NAMES),
    ("Driver", DriverKind::TYPE_NAMES),
    ("ConstLaw", LawKind::TYPE_NAMES),
    ("Frame", FrameKind::TYPE_NAMES),
    ("Node", NodeKind::TYPE_NAMES),
    ("Simulation", SimulationKind::TYPE_NAMES),
];

/// Classes whose type tag may be omitted (single-type categories).
const TYPE_OPTIONAL: [&str; 3] = ["Frame", "Node", "Simulation"];

/// True when `name`, or its last dotted component, is a denied capability.
pub fn is_denied(name: &str) -> bool {
    let last = name.rsplit('.').next().unwrap_or(name);
    DENIED.iter().any(|d| last.trim().eq_ignore_ascii_case(d))
}

/// Refuse denied capability names anywhere in the document, then check
/// every record's class and type against the allow-list.
pub fn check(document: &Value) -> Result<()> {
    scan_denied(document)?;

    let Some(records) = document.get("records").and_then(Value::as_array) else {
        return Ok(());
    };
    for (i, record) in records.iter().enumerate() {
        check_record(i, record)?;
    }
    Ok(())
}

fn scan_denied(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "class" || key == "type" {
                    if let Some(name) = child.as_str().filter(|n| is_denied(n)) {
                        return Err(SnapshotError::security(format!(
                            "denied capability {name:?} in {key} position"
                        )));
                    }
                }
                scan_denied(child)?;
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(scan_denied),
        _ => Ok(()),
    }
}

fn check_record(index: usize, record: &Value) -> Result<()> {
    let class = match record.get("class") {
        Some(Value::String(class)) => class.as_str(),
        Some(other) => {
            return Err(SnapshotError::security(format!(
                "record {index} has a non-string class {other}"
            )))
        }
        None => {
            return Err(SnapshotError::serialization(format!(
                "record {index} has no class"
            )))
        }
    };

    let Some((_, types)) = ALLOWED.iter().find(|(c, _)| *c == class) else {
        return Err(SnapshotError::security(format!(
            "record {index} has class {class:?}, which is not allow-listed"
        )));
    };

    match record.get("type") {
        Some(Value::String(ty)) if types.contains(&ty.as_str()) => Ok(()),
        Some(other) => Err(SnapshotError::security(format!(
            "record {index} ({class}) has type {other}, which is not allow-listed"
        ))),
        None if TYPE_OPTIONAL.contains(&class) => Ok(()),
        None => Err(SnapshotError::serialization(format!(
            "record {index} ({class}) has no type"
        ))),
    }
}
