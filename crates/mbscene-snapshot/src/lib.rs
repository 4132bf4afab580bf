#![warn(missing_docs)]

//! Persistent snapshots of the mbscene entity registry.
//!
//! A snapshot is a JSON document that stores every registry entity as a
//! tagged record. Scene objects are never embedded: each reference is a
//! symbolic path `objects["<stable id>"]`, and decoding resolves it against
//! the live scene through [`SceneGraph::find_by_stable_id`].
//!
//! Decoding is restricted. Only the allow-listed record classes and entity
//! types are accepted, the capability names `eval` / `exec` are refused
//! anywhere they appear as a class or type, and the decoded registry is
//! only installed once every record has been validated and re-linked.
//!
//! # Example
//!
//! ```
//! use mbscene_ir::{Element, ElementKind, Registry, Scene, Vec3};
//!
//! let mut scene = Scene::new("Scene");
//! let ground = scene.add("Ground", Vec3::zeros()).unwrap();
//! let mut registry = Registry::new();
//! registry
//!     .add(Element::new("clamp", ElementKind::Clamp, vec![ground]))
//!     .unwrap();
//!
//! let blob = mbscene_snapshot::encode_text(&registry, &mut scene).unwrap();
//! scene.rename(ground, "Floor").unwrap();
//!
//! let restored = mbscene_snapshot::decode_text(&blob, &scene).unwrap();
//! assert_eq!(restored, registry);
//! ```

use std::collections::BTreeMap;

use base64::Engine as _;
use mbscene_ir::{ObjectKey, Registry, SceneGraph};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod error;
mod path;
mod record;

pub use error::{Result, SnapshotError};
pub use path::{format_path, parse_path};
pub use record::{is_denied, Record, ALLOWED, DENIED};

/// Format marker of the snapshot envelope.
pub const FORMAT: &str = "mbscene-snapshot";

/// Current snapshot version.
pub const VERSION: u32 = 1;

/// The snapshot envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format marker, always [`FORMAT`].
    pub format: String,
    /// Envelope version, always [`VERSION`].
    pub version: u32,
    /// Name of the active scene at encode time.
    pub scene: String,
    /// Display name of every scene object, keyed by stable identifier.
    #[serde(default)]
    pub object_names: BTreeMap<String, String>,
    /// Entity records in registry order.
    #[serde(default)]
    pub records: Vec<Record>,
}

/// Build the snapshot of a registry.
///
/// Tags every scene object with its current display name as stable
/// identifier first, so the snapshot can still find it after a rename.
pub fn snapshot<S: SceneGraph>(registry: &Registry, scene: &mut S) -> Result<Snapshot> {
    let mut object_names = BTreeMap::new();
    for key in scene.object_keys() {
        let Some(name) = scene.display_name(key).map(str::to_string) else {
            continue;
        };
        scene.set_stable_id(key, &name);
        object_names.insert(name.clone(), name);
    }

    let scene: &S = scene;
    let mut records = Vec::with_capacity(registry.len());
    for e in registry.elements() {
        records.push(Record::Element(e.clone().try_map_objects(path_mapper(scene, &e.name))?));
    }
    for d in registry.drives() {
        records.push(Record::Drive(d.clone().try_map_objects(path_mapper(scene, &d.name))?));
    }
    records.extend(registry.drivers().iter().cloned().map(Record::Driver));
    records.extend(registry.const_laws().iter().cloned().map(Record::ConstLaw));
    for f in registry.frames() {
        records.push(Record::Frame(f.clone().try_map_objects(path_mapper(scene, &f.name))?));
    }
    for n in registry.nodes() {
        records.push(Record::Node(n.clone().try_map_objects(path_mapper(scene, &n.name))?));
    }
    records.extend(registry.simulations().iter().cloned().map(Record::Simulation));

    tracing::debug!(
        records = records.len(),
        objects = object_names.len(),
        "encoded snapshot"
    );

    Ok(Snapshot {
        format: FORMAT.to_string(),
        version: VERSION,
        scene: scene.name().to_string(),
        object_names,
        records,
    })
}

fn path_mapper<'a, S: SceneGraph>(
    scene: &'a S,
    entity: &'a str,
) -> impl Fn(ObjectKey) -> Result<String> + 'a {
    move |key| {
        scene
            .stable_id(key)
            .map(format_path)
            .ok_or_else(|| SnapshotError::DanglingObject(entity.to_string()))
    }
}

/// Encode a registry as snapshot bytes.
pub fn encode<S: SceneGraph>(registry: &Registry, scene: &mut S) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&snapshot(registry, scene)?)?)
}

/// Encode a registry as a base64 text blob.
pub fn encode_text<S: SceneGraph>(registry: &Registry, scene: &mut S) -> Result<String> {
    let bytes = encode(registry, scene)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(bytes))
}

/// Parse and validate snapshot bytes without touching any scene.
///
/// Runs the deny-list and allow-list checks before any record is
/// instantiated.
pub fn parse(bytes: &[u8]) -> Result<Snapshot> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| SnapshotError::serialization(e.to_string()))?;

    if let Err(err) = record::check(&document) {
        if err.is_security() {
            tracing::error!(target: "mbscene::security", error = %err, "snapshot refused");
        }
        return Err(err);
    }

    match document.get("format").and_then(Value::as_str) {
        Some(FORMAT) => {}
        other => {
            return Err(SnapshotError::serialization(format!(
                "unexpected format marker {other:?}"
            )))
        }
    }
    match document.get("version").and_then(Value::as_u64) {
        Some(v) if v == u64::from(VERSION) => {}
        other => {
            return Err(SnapshotError::serialization(format!(
                "unsupported snapshot version {other:?}"
            )))
        }
    }

    serde_json::from_value(document).map_err(|e| SnapshotError::serialization(e.to_string()))
}

/// Re-link a parsed snapshot against the live scene.
pub fn restore<S: SceneGraph>(snapshot: Snapshot, scene: &S) -> Result<Registry> {
    if snapshot.scene != scene.name() {
        tracing::warn!(
            expected = %snapshot.scene,
            actual = %scene.name(),
            "snapshot was taken from a different scene"
        );
    }

    let names = &snapshot.object_names;
    let resolve = |path: String| -> Result<ObjectKey> {
        let id = parse_path(&path)?;
        scene
            .find_by_stable_id(&id)
            .ok_or_else(|| SnapshotError::MissingObject {
                captured: names.get(&id).cloned(),
                id,
            })
    };

    let mut registry = Registry::new();
    for record in snapshot.records.iter().cloned() {
        match record {
            Record::Element(e) => registry.add(e.try_map_objects(&resolve)?)?,
            Record::Drive(d) => registry.add(d.try_map_objects(&resolve)?)?,
            Record::Driver(d) => registry.add(d)?,
            Record::ConstLaw(l) => registry.add(l)?,
            Record::Frame(f) => registry.add(f.try_map_objects(&resolve)?)?,
            Record::Node(n) => registry.add(n.try_map_objects(&resolve)?)?,
            Record::Simulation(s) => registry.add(s)?,
        }
    }

    tracing::debug!(entities = registry.len(), "decoded snapshot");
    Ok(registry)
}

/// Decode snapshot bytes into a fresh registry.
pub fn decode<S: SceneGraph>(bytes: &[u8], scene: &S) -> Result<Registry> {
    restore(parse(bytes)?, scene)
}

/// Decode a base64 text blob into a fresh registry.
pub fn decode_text<S: SceneGraph>(text: &str, scene: &S) -> Result<Registry> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(text.trim())?;
    decode(&bytes, scene)
}

/// Decode snapshot bytes and replace `registry` with the result.
///
/// On any error `registry` is left exactly as it was.
pub fn decode_into<S: SceneGraph>(bytes: &[u8], scene: &S, registry: &mut Registry) -> Result<()> {
    *registry = decode(bytes, scene)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbscene_ir::{
        ConstLaw, Drive, DriveKind, Driver, DriverKind, Element, ElementKind, Frame,
        IntegrationMethod, LawDimension, LawKind, Mat3, Mat6, NodeDef, Scene, Simulation,
        Stiffness, Vec3,
    };
    use proptest::prelude::*;

    fn sample() -> (Scene, Registry) {
        let mut scene = Scene::new("Scene");
        let ground = scene.add("Ground", Vec3::zeros()).unwrap();
        let arm = scene.add("Arm", Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let tip = scene.add("Tip", Vec3::new(2.0, 0.0, 0.0)).unwrap();

        let mut reg = Registry::new();
        reg.add(Element::new("clamp", ElementKind::Clamp, vec![ground]))
            .unwrap();
        reg.add(Element::new("hinge", ElementKind::RevoluteHinge, vec![ground, arm]))
            .unwrap();
        reg.add(Element::new(
            "spring",
            ElementKind::DeformableDisplacementJoint { law: "k".into() },
            vec![arm, tip],
        ))
        .unwrap();
        reg.add(Drive::new("sensor", DriveKind::Node { dof: "X[3]".into() }, vec![tip]))
            .unwrap();
        reg.add(Drive::new(
            "table",
            DriveKind::File {
                driver: "input".into(),
                column: 1,
                amplitude: 0.5,
            },
            vec![],
        ))
        .unwrap();
        reg.add(Driver {
            name: "input".into(),
            kind: DriverKind::Stream {
                stream_name: "MBXINP".into(),
                host: "127.0.0.1".into(),
                port: 9011,
                channels: 2,
            },
        })
        .unwrap();
        reg.add(ConstLaw::new(
            "k",
            LawKind::LinearElastic {
                dimension: LawDimension::Three,
                stiffness: 1.0e5,
            },
        ))
        .unwrap();
        reg.add(Frame::new("F", arm, vec![tip])).unwrap();
        reg.add(NodeDef::new("tip options", tip)).unwrap();
        reg.add(Simulation::new("run")).unwrap();
        (scene, reg)
    }

    #[test]
    fn roundtrip_preserves_registry() {
        let (mut scene, reg) = sample();
        let bytes = encode(&reg, &mut scene).unwrap();
        assert_eq!(decode(&bytes, &scene).unwrap(), reg);
    }

    #[test]
    fn references_survive_rename() {
        let (mut scene, reg) = sample();
        let blob = encode_text(&reg, &mut scene).unwrap();

        let arm = scene.find("Arm").unwrap();
        scene.rename(arm, "Renamed arm").unwrap();

        let restored = decode_text(&blob, &scene).unwrap();
        let hinge = restored.require::<Element>("hinge").unwrap();
        assert_eq!(hinge.objects[1], arm);
    }

    #[test]
    fn envelope_uses_symbolic_paths() {
        let (mut scene, reg) = sample();
        let snap = snapshot(&reg, &mut scene).unwrap();
        assert_eq!(snap.scene, "Scene");
        assert_eq!(snap.object_names["Arm"], "Arm");
        match &snap.records[1] {
            Record::Element(e) => assert_eq!(
                e.objects,
                vec![r#"objects["Ground"]"#.to_string(), r#"objects["Arm"]"#.to_string()]
            ),
            other => panic!("unexpected record {other:?}"),
        }

        let json: Value = serde_json::from_slice(&encode(&reg, &mut scene).unwrap()).unwrap();
        assert_eq!(json["format"], FORMAT);
        assert_eq!(json["records"][0]["class"], "Element");
        assert_eq!(json["records"][0]["type"], "Clamp");
    }

    #[test]
    fn missing_object_fails_whole_decode() {
        let (mut scene, reg) = sample();
        let bytes = encode(&reg, &mut scene).unwrap();
        let tip = scene.find("Tip").unwrap();
        scene.remove(tip);

        match decode(&bytes, &scene) {
            Err(SnapshotError::MissingObject { id, captured }) => {
                assert_eq!(id, "Tip");
                assert_eq!(captured.as_deref(), Some("Tip"));
            }
            other => panic!("expected MissingObject, got {other:?}"),
        }
    }

    #[test]
    fn dangling_key_fails_encode() {
        let (mut scene, mut reg) = sample();
        let tip = scene.find("Tip").unwrap();
        scene.remove(tip);
        reg.remove::<Drive>("sensor").unwrap();
        assert!(matches!(
            encode(&reg, &mut scene),
            Err(SnapshotError::DanglingObject(name)) if name == "spring"
        ));
    }

    fn tamper(bytes: &[u8], f: impl FnOnce(&mut Value)) -> Vec<u8> {
        let mut json: Value = serde_json::from_slice(bytes).unwrap();
        f(&mut json);
        serde_json::to_vec(&json).unwrap()
    }

    #[test]
    fn refused_content_leaves_registry_untouched() {
        let (mut scene, reg) = sample();
        let bytes = encode(&reg, &mut scene).unwrap();
        let mut current = reg.clone();

        let denied = tamper(&bytes, |j| j["records"][0]["class"] = "builtins.eval".into());
        let err = decode_into(&denied, &scene, &mut current).unwrap_err();
        assert!(err.is_security());

        let unknown = tamper(&bytes, |j| j["records"][3]["type"] = "Shell command".into());
        let err = decode_into(&unknown, &scene, &mut current).unwrap_err();
        assert!(err.is_security());

        let exec = tamper(&bytes, |j| j["records"][2]["type"] = "exec".into());
        assert!(decode_into(&exec, &scene, &mut current).unwrap_err().is_security());

        assert_eq!(current, reg);
    }

    #[test]
    fn malformed_payloads_are_serialization_errors() {
        let (mut scene, reg) = sample();
        let bytes = encode(&reg, &mut scene).unwrap();
        let mut current = Registry::new();

        let bad_path = tamper(&bytes, |j| {
            j["records"][0]["objects"][0] = r#"scenes["Scene"]"#.into()
        });
        assert!(matches!(
            decode_into(&bad_path, &scene, &mut current),
            Err(SnapshotError::MalformedPath(_))
        ));

        let bad_version = tamper(&bytes, |j| j["version"] = 99.into());
        assert!(matches!(
            decode(&bad_version, &scene),
            Err(SnapshotError::Serialization(_))
        ));

        let bad_field = tamper(&bytes, |j| j["records"][0]["objects"] = 5.into());
        assert!(matches!(
            decode(&bad_field, &scene),
            Err(SnapshotError::Serialization(_))
        ));

        assert!(matches!(
            decode(b"not json", &scene),
            Err(SnapshotError::Serialization(_))
        ));
        assert!(matches!(
            decode_text("%%%", &scene),
            Err(SnapshotError::Base64(_))
        ));
        assert!(current.is_empty());
    }

    #[test]
    fn duplicate_records_are_rejected() {
        let (mut scene, reg) = sample();
        let bytes = encode(&reg, &mut scene).unwrap();
        let dup = tamper(&bytes, |j| {
            let first = j["records"][0].clone();
            j["records"].as_array_mut().unwrap().push(first);
        });
        assert!(matches!(
            decode(&dup, &scene),
            Err(SnapshotError::Registry(_))
        ));
    }

    fn real() -> impl Strategy<Value = f64> {
        -1e6f64..1e6
    }

    fn vec3() -> impl Strategy<Value = Vec3> {
        (real(), real(), real()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn link() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    fn arb_element_kind() -> impl Strategy<Value = ElementKind> {
        let plain = prop_oneof![
            Just(ElementKind::Clamp),
            Just(ElementKind::RevoluteHinge),
            Just(ElementKind::SphericalHinge),
            Just(ElementKind::Prismatic),
            Just(ElementKind::Rotor),
            Just(ElementKind::RigidOffset),
            Just(ElementKind::DummyNode),
            link().prop_map(|law| ElementKind::BeamSegment { law }),
            link().prop_map(|law| ElementKind::DeformableDisplacementJoint { law }),
            (link(), link()).prop_map(|(element, drive)| ElementKind::Driven { element, drive }),
        ];
        let parametric = prop_oneof![
            (real(), real(), real(), real(), real(), 1u32..10).prop_map(
                |(span, chord, aero_center, bc_point, twist, integration_points)| {
                    ElementKind::AerodynamicBody {
                        span,
                        chord,
                        aero_center,
                        bc_point,
                        twist,
                        integration_points,
                    }
                }
            ),
            (0.1f64..1e3, vec3(), mat3()).prop_map(|(mass, center_of_mass, inertia)| {
                ElementKind::Body {
                    mass,
                    center_of_mass,
                    inertia,
                }
            }),
            (any::<bool>(), vec3(), link()).prop_map(|(follower, direction, drive)| {
                ElementKind::StructuralForce {
                    follower,
                    direction,
                    drive,
                }
            }),
            (any::<bool>(), vec3(), link()).prop_map(|(follower, direction, drive)| {
                ElementKind::StructuralCouple {
                    follower,
                    direction,
                    drive,
                }
            }),
            (1u8..=6, link()).prop_map(|(dof, drive)| ElementKind::GenelClamp { dof, drive }),
            (vec3(), link()).prop_map(|(direction, drive)| ElementKind::Gravity { direction, drive }),
            (0.1f64..2.0, 100.0f64..400.0, vec3(), link()).prop_map(
                |(density, sound_speed, velocity, drive)| ElementKind::AirProperties {
                    density,
                    sound_speed,
                    velocity,
                    drive,
                }
            ),
        ];
        prop_oneof![plain, parametric]
    }

    fn arb_drive_kind() -> impl Strategy<Value = DriveKind> {
        prop_oneof![
            real().prop_map(|value| DriveKind::Constant { value }),
            (real(), real(), real(), real()).prop_map(
                |(slope, initial_time, final_time, initial_value)| DriveKind::Ramp {
                    slope,
                    initial_time,
                    final_time,
                    initial_value,
                }
            ),
            (real(), real(), real(), prop::option::of(1u32..100), real()).prop_map(
                |(initial_time, omega, amplitude, cycles, initial_value)| DriveKind::Sine {
                    initial_time,
                    omega,
                    amplitude,
                    cycles,
                    initial_value,
                }
            ),
            (real(), real(), real()).prop_map(|(initial_time, step_value, initial_value)| {
                DriveKind::Step {
                    initial_time,
                    step_value,
                    initial_value,
                }
            }),
            (link(), 1u32..8, real()).prop_map(|(driver, column, amplitude)| DriveKind::File {
                driver,
                column,
                amplitude,
            }),
            "X\\[[1-3]\\]".prop_map(|dof| DriveKind::Node { dof }),
        ]
    }

    fn arb_driver_kind() -> impl Strategy<Value = DriverKind> {
        prop_oneof![
            ("[A-Z]{3,8}", "[a-z0-9.]{1,12}", any::<u16>(), 1u32..16).prop_map(
                |(stream_name, host, port, channels)| DriverKind::Stream {
                    stream_name,
                    host,
                    port,
                    channels,
                }
            ),
            ("[a-z/]{1,12}", 1u32..1000, 1u32..16, real(), 1e-6f64..1.0).prop_map(
                |(path, steps, channels, initial_time, time_step)| DriverKind::FixedStep {
                    path,
                    steps,
                    channels,
                    initial_time,
                    time_step,
                }
            ),
        ]
    }

    fn mat3() -> impl Strategy<Value = Mat3> {
        prop::array::uniform3(prop::array::uniform3(real())).prop_map(Mat3)
    }

    fn dimension() -> impl Strategy<Value = LawDimension> {
        prop_oneof![
            Just(LawDimension::One),
            Just(LawDimension::Three),
            Just(LawDimension::Six),
        ]
    }

    fn arb_law_kind() -> impl Strategy<Value = LawKind> {
        let stiffness = prop_oneof![
            real().prop_map(Stiffness::Scalar),
            mat3().prop_map(Stiffness::Matrix3),
            prop::array::uniform6(prop::array::uniform6(real()))
                .prop_map(|rows| Stiffness::Matrix6(Mat6(rows))),
        ];
        prop_oneof![
            (dimension(), real()).prop_map(|(dimension, stiffness)| {
                LawKind::LinearElastic {
                    dimension,
                    stiffness,
                }
            }),
            stiffness.prop_map(|stiffness| LawKind::LinearElasticGeneric { stiffness }),
            (dimension(), real(), real()).prop_map(|(dimension, stiffness, viscosity)| {
                LawKind::LinearViscoelastic {
                    dimension,
                    stiffness,
                    viscosity,
                }
            }),
        ]
    }

    fn arb_method() -> impl Strategy<Value = IntegrationMethod> {
        prop_oneof![
            Just(IntegrationMethod::CrankNicolson),
            (0.0f64..1.0).prop_map(|rho| IntegrationMethod::Ms { rho }),
            (0.0f64..1.0).prop_map(|rho| IntegrationMethod::Hope { rho }),
        ]
    }

    /// Objects picked by index from the scene.
    type Picks = Vec<prop::sample::Index>;

    fn picks(max: usize) -> impl Strategy<Value = Picks> {
        prop::collection::vec(any::<prop::sample::Index>(), 1..=max)
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_registries(
            objects in 1usize..6,
            elements in prop::collection::vec((arb_element_kind(), picks(3)), 0..8),
            drives in prop::collection::vec((arb_drive_kind(), picks(1)), 0..6),
            drivers in prop::collection::vec(arb_driver_kind(), 0..3),
            laws in prop::collection::vec(arb_law_kind(), 0..4),
            frames in prop::collection::vec((picks(4), vec3(), vec3()), 0..4),
            nodes in prop::collection::vec((picks(1), any::<bool>(), vec3(), vec3()), 0..3),
            runs in prop::collection::vec(
                (0.0f64..10.0, 1e-6f64..1.0, 1u32..100, 1e-12f64..1e-2, arb_method(), 1u32..100),
                0..3,
            ),
        ) {
            let mut scene = Scene::new("Scene");
            let keys: Vec<_> = (0..objects)
                .map(|i| scene.add(format!("o{i}"), Vec3::new(i as f64, 0.0, 0.0)).unwrap())
                .collect();
            let pick = |picks: &Picks| -> Vec<_> {
                picks.iter().map(|p| keys[p.index(keys.len())]).collect()
            };

            let mut reg = Registry::new();
            for (i, (kind, objs)) in elements.into_iter().enumerate() {
                reg.add(Element::new(format!("e{i}"), kind, pick(&objs))).unwrap();
            }
            for (i, (kind, objs)) in drives.into_iter().enumerate() {
                let objs = match kind {
                    DriveKind::Node { .. } => pick(&objs),
                    _ => Vec::new(),
                };
                reg.add(Drive::new(format!("d{i}"), kind, objs)).unwrap();
            }
            for (i, kind) in drivers.into_iter().enumerate() {
                reg.add(Driver { name: format!("in{i}"), kind }).unwrap();
            }
            for (i, kind) in laws.into_iter().enumerate() {
                reg.add(ConstLaw::new(format!("k{i}"), kind)).unwrap();
            }
            for (i, (objs, velocity, angular_velocity)) in frames.into_iter().enumerate() {
                let objs = pick(&objs);
                let mut frame = Frame::new(format!("f{i}"), objs[0], objs[1..].to_vec());
                frame.velocity = velocity;
                frame.angular_velocity = angular_velocity;
                reg.add(frame).unwrap();
            }
            for (i, (objs, output, velocity, angular_velocity)) in nodes.into_iter().enumerate() {
                let mut node = NodeDef::new(format!("n{i}"), pick(&objs)[0]);
                node.output = output;
                node.velocity = velocity;
                node.angular_velocity = angular_velocity;
                reg.add(node).unwrap();
            }
            for (i, (final_time, time_step, max_iterations, tolerance, method, output_frequency))
                in runs.into_iter().enumerate()
            {
                let mut run = Simulation::new(format!("run{i}"));
                run.final_time = final_time;
                run.time_step = time_step;
                run.max_iterations = max_iterations;
                run.tolerance = tolerance;
                run.derivatives_tolerance = tolerance * 1e-3;
                run.method = method;
                run.output_frequency = output_frequency;
                reg.add(run).unwrap();
            }

            let bytes = encode(&reg, &mut scene).unwrap();
            prop_assert_eq!(decode(&bytes, &scene).unwrap(), reg);
        }
    }
}
