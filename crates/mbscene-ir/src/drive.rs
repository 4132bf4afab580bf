//! Drive callers and the file drivers that feed them.

use serde::{Deserialize, Serialize};

use crate::entity::{Category, Entity, EntityKey};
use crate::scene::ObjectKey;

/// A drive caller: a scalar function of time (or of the model state).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive<O = ObjectKey> {
    /// Drive name, unique among drives.
    pub name: String,
    /// Type tag and parameters.
    #[serde(flatten)]
    pub kind: DriveKind,
    /// Referenced scene objects (the sampled node for node drives).
    #[serde(default)]
    pub objects: Vec<O>,
}

/// Drive type and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DriveKind {
    /// Constant value.
    #[serde(rename = "Constant drive")]
    Constant {
        /// Value.
        value: f64,
    },
    /// Linear ramp between two times.
    #[serde(rename = "Ramp drive")]
    Ramp {
        /// Slope.
        slope: f64,
        /// Ramp start time.
        initial_time: f64,
        /// Ramp end time.
        final_time: f64,
        /// Value before the ramp.
        initial_value: f64,
    },
    /// Sine wave.
    #[serde(rename = "Sine drive")]
    Sine {
        /// Start time.
        initial_time: f64,
        /// Angular frequency.
        omega: f64,
        /// Amplitude.
        amplitude: f64,
        /// Number of cycles; `None` runs forever.
        #[serde(default)]
        cycles: Option<u32>,
        /// Offset value.
        initial_value: f64,
    },
    /// Step at a given time.
    #[serde(rename = "Step drive")]
    Step {
        /// Step time.
        initial_time: f64,
        /// Value after the step.
        step_value: f64,
        /// Value before the step.
        initial_value: f64,
    },
    /// Channel of a file driver.
    #[serde(rename = "File drive")]
    File {
        /// Driver link.
        driver: String,
        /// Channel, 1-based.
        column: u32,
        /// Scale factor.
        amplitude: f64,
    },
    /// Value sampled from a structural node.
    #[serde(rename = "Node drive")]
    Node {
        /// Private data string (e.g. `"X[3]"`).
        dof: String,
    },
}

impl DriveKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "Constant drive",
        "Ramp drive",
        "Sine drive",
        "Step drive",
        "File drive",
        "Node drive",
    ];

    /// Type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            DriveKind::Constant { .. } => "Constant drive",
            DriveKind::Ramp { .. } => "Ramp drive",
            DriveKind::Sine { .. } => "Sine drive",
            DriveKind::Step { .. } => "Step drive",
            DriveKind::File { .. } => "File drive",
            DriveKind::Node { .. } => "Node drive",
        }
    }
}

impl<O> Drive<O> {
    /// Create a drive.
    pub fn new(name: impl Into<String>, kind: DriveKind, objects: Vec<O>) -> Self {
        Self {
            name: name.into(),
            kind,
            objects,
        }
    }

    /// Objects that are structural node locations.
    pub fn node_objects(&self) -> &[O] {
        match self.kind {
            DriveKind::Node { .. } => &self.objects[..self.objects.len().min(1)],
            _ => &[],
        }
    }

    /// Convert the object references, failing on the first error.
    pub fn try_map_objects<P, E>(self, f: impl FnMut(O) -> Result<P, E>) -> Result<Drive<P>, E> {
        Ok(Drive {
            name: self.name,
            kind: self.kind,
            objects: self.objects.into_iter().map(f).collect::<Result<_, _>>()?,
        })
    }
}

impl Drive {
    /// Constant drive shorthand.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, DriveKind::Constant { value }, Vec::new())
    }
}

impl Entity for Drive {
    const CATEGORY: Category = Category::Drives;

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
        match &self.kind {
            DriveKind::File { driver, .. } => EntityKey::link(Category::Drivers, driver)
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// An input driver feeding external data into drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Driver name, unique among drivers.
    pub name: String,
    /// Type tag and parameters.
    #[serde(flatten)]
    pub kind: DriverKind,
}

/// Driver type and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DriverKind {
    /// Socket stream.
    #[serde(rename = "Stream driver")]
    Stream {
        /// Stream name known to the peer.
        stream_name: String,
        /// Host to connect to.
        host: String,
        /// TCP port.
        port: u16,
        /// Number of channels.
        channels: u32,
    },
    /// Fixed-step table read from a file.
    #[serde(rename = "Fixed step driver")]
    FixedStep {
        /// Path of the data file.
        path: String,
        /// Number of samples.
        steps: u32,
        /// Number of channels.
        channels: u32,
        /// Time of the first sample.
        initial_time: f64,
        /// Sample spacing.
        time_step: f64,
    },
}

impl DriverKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &["Stream driver", "Fixed step driver"];

    /// Type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            DriverKind::Stream { .. } => "Stream driver",
            DriverKind::FixedStep { .. } => "Fixed step driver",
        }
    }

    /// Number of channels the driver provides.
    pub fn channels(&self) -> u32 {
        match self {
            DriverKind::Stream { channels, .. } | DriverKind::FixedStep { channels, .. } => *channels,
        }
    }
}

impl Entity for Driver {
    const CATEGORY: Category = Category::Drivers;

    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn objects(&self) -> &[ObjectKey] {
        &[]
    }

    fn links(&self) -> Vec<EntityKey> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_tags_are_allow_listed() {
        let kinds = [
            DriveKind::Constant { value: 1.0 },
            DriveKind::Ramp {
                slope: 1.0,
                initial_time: 0.0,
                final_time: 1.0,
                initial_value: 0.0,
            },
            DriveKind::Sine {
                initial_time: 0.0,
                omega: 1.0,
                amplitude: 1.0,
                cycles: None,
                initial_value: 0.0,
            },
            DriveKind::Step {
                initial_time: 0.5,
                step_value: 1.0,
                initial_value: 0.0,
            },
            DriveKind::File {
                driver: "d".into(),
                column: 1,
                amplitude: 1.0,
            },
            DriveKind::Node { dof: "X[1]".into() },
        ];
        for kind in kinds {
            let json = serde_json::to_value(&kind).unwrap();
            assert_eq!(json["type"], kind.type_name());
            assert!(DriveKind::TYPE_NAMES.contains(&kind.type_name()));
        }
    }

    #[test]
    fn sine_cycles_default_to_forever() {
        let json = r#"{"name":"s","type":"Sine drive","initial_time":0,"omega":2,"amplitude":1,"initial_value":0}"#;
        let drive: Drive<String> = serde_json::from_str(json).unwrap();
        match drive.kind {
            DriveKind::Sine { cycles, omega, .. } => {
                assert_eq!(cycles, None);
                assert_eq!(omega, 2.0);
            }
            _ => panic!("expected Sine"),
        }
        assert!(drive.objects.is_empty());
    }

    #[test]
    fn file_drive_links_its_driver() {
        let drive = Drive::new(
            "f",
            DriveKind::File {
                driver: "stream".into(),
                column: 2,
                amplitude: 1.0,
            },
            Vec::new(),
        );
        assert_eq!(drive.links(), vec![EntityKey::new(Category::Drivers, "stream")]);
        assert!(drive.node_objects().is_empty());
    }

    #[test]
    fn driver_channels() {
        let kind = DriverKind::Stream {
            stream_name: "MBXINP".into(),
            host: "127.0.0.1".into(),
            port: 9011,
            channels: 4,
        };
        assert_eq!(kind.channels(), 4);
    }
}
