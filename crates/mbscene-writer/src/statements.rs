//! Rendering of individual solver statements.
//!
//! Every renderer returns the statement text without block indentation, or
//! a message describing why the entity cannot be written.

use std::fmt::Write as FmtWrite;

use mbscene_ir::{
    Category, ConstLaw, Drive, DriveKind, Driver, DriverKind, Element, ElementKind, Frame,
    LawDimension, LawKind, NodeDef, ObjectKey, Registry, SceneGraph, Stiffness, Vec3, UNASSIGNED,
};
use mbscene_resolve::{NodeClass, Resolution};
use nalgebra::{Matrix3, Vector3};

use crate::format;
use crate::labels::Labels;

/// Statement text or the reason it could not be produced.
pub(crate) type Rendered = std::result::Result<String, String>;

/// World pose of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pose {
    pub t: Vector3<f64>,
    pub r: Matrix3<f64>,
}

impl Pose {
    /// This pose expressed in `parent`'s coordinates.
    pub fn relative_to(&self, parent: &Pose) -> Pose {
        let rt = parent.r.transpose();
        Pose {
            t: rt * (self.t - parent.t),
            r: rt * self.r,
        }
    }
}

/// Everything a renderer reads.
pub(crate) struct Ctx<'a, S> {
    pub registry: &'a Registry,
    pub scene: &'a S,
    pub resolution: &'a Resolution,
    pub labels: Labels,
    pub precision: u32,
}

impl<'a, S: SceneGraph> Ctx<'a, S> {
    pub fn new(
        registry: &'a Registry,
        scene: &'a S,
        resolution: &'a Resolution,
        precision: u32,
    ) -> Self {
        Self {
            registry,
            scene,
            resolution,
            labels: Labels::new(registry, scene, resolution),
            precision,
        }
    }

    fn num(&self, v: f64) -> String {
        format::num(v, self.precision)
    }

    fn vec(&self, v: &Vector3<f64>) -> String {
        format::vec3(v, self.precision)
    }

    /// `null` for the zero vector, the components otherwise.
    fn vec_or_null(&self, v: Vec3) -> String {
        if v.is_zero() {
            "null".to_string()
        } else {
            self.vec(&v.into())
        }
    }

    fn mat(&self, m: &Matrix3<f64>, indent: &str) -> String {
        format::mat3(m, self.precision, indent)
    }

    fn name(&self, key: ObjectKey) -> std::result::Result<&'a str, String> {
        self.scene
            .display_name(key)
            .ok_or_else(|| "references an object that is not in the scene".to_string())
    }

    pub fn pose(&self, key: ObjectKey) -> std::result::Result<Pose, String> {
        match (
            self.scene.world_translation(key),
            self.scene.world_rotation(key),
        ) {
            (Some(t), Some(r)) => Ok(Pose {
                t: t.into(),
                r: r.into(),
            }),
            _ => Err("references an object that is not in the scene".to_string()),
        }
    }

    /// Label of the structural node an object stands for.
    pub fn node_label(&self, object: ObjectKey) -> std::result::Result<String, String> {
        let node = self.resolution.nodes.resolve(object);
        let name = self.name(node)?;
        self.labels
            .node(node)
            .map(str::to_string)
            .ok_or_else(|| format!("object {name} is not a structural node"))
    }

    /// Node of an object and the object's offset from it, in node axes.
    fn node_offset(&self, object: ObjectKey) -> std::result::Result<(String, Pose), String> {
        let label = self.node_label(object)?;
        let node = self.resolution.nodes.resolve(object);
        let offset = self.pose(object)?.relative_to(&self.pose(node)?);
        Ok((label, offset))
    }

    fn drive(&self, name: &str) -> std::result::Result<String, String> {
        self.registry
            .require::<Drive>(name)
            .map_err(|e| e.to_string())?;
        Ok(self.labels.entity(Category::Drives, name))
    }

    fn law(&self, name: &str, dimension: LawDimension) -> std::result::Result<String, String> {
        let law = self
            .registry
            .require::<ConstLaw>(name)
            .map_err(|e| e.to_string())?;
        if law.kind.dimension() != dimension {
            return Err(format!(
                "constitutive law {name} is {}-D, expected {}-D",
                law.kind.dimension().size(),
                dimension.size()
            ));
        }
        Ok(self.labels.entity(Category::ConstLaws, name))
    }

    fn frame_pose(&self, frame: &str) -> std::result::Result<Pose, String> {
        let frame = self
            .registry
            .require::<Frame>(frame)
            .map_err(|e| e.to_string())?;
        let origin = frame
            .origin()
            .ok_or_else(|| format!("frame {} has no origin object", frame.name))?;
        self.pose(*origin)
    }

    /// Reference name and relative pose of an object with respect to its
    /// governing frame (or the global frame).
    fn placed(
        &self,
        object: ObjectKey,
        skip_frame: Option<&str>,
    ) -> std::result::Result<(String, Pose), String> {
        let pose = self.pose(object)?;
        match self
            .resolution
            .governing_frame(object)
            .filter(|f| Some(*f) != skip_frame)
        {
            Some(frame) => Ok((
                self.labels.entity(Category::Frames, frame),
                pose.relative_to(&self.frame_pose(frame)?),
            )),
            None => Ok(("global".to_string(), pose)),
        }
    }
}

/// The first `N` objects of an entity.
fn objects<const N: usize>(objects: &[ObjectKey]) -> std::result::Result<[ObjectKey; N], String> {
    objects
        .get(..N)
        .and_then(|head| head.try_into().ok())
        .ok_or_else(|| format!("needs {N} objects, has {}", objects.len()))
}

/// `reference:` statement of a frame.
pub(crate) fn reference<S: SceneGraph>(ctx: &Ctx<'_, S>, frame: &Frame) -> Rendered {
    let origin = *frame.origin().ok_or("frame has no origin object")?;
    let (parent, rel) = ctx.placed(origin, Some(frame.name.as_str()))?;

    let mut out = String::new();
    let label = ctx.labels.entity(Category::Frames, &frame.name);
    writeln!(out, "reference: {label},").unwrap();
    writeln!(out, "\treference, {parent}, {},", ctx.vec(&rel.t)).unwrap();
    writeln!(out, "\treference, {parent}, matr,").unwrap();
    writeln!(out, "\t\t{},", ctx.mat(&rel.r, "\t\t")).unwrap();
    writeln!(out, "\treference, {parent}, {},", ctx.vec_or_null(frame.velocity)).unwrap();
    write!(
        out,
        "\treference, {parent}, {};",
        ctx.vec_or_null(frame.angular_velocity)
    )
    .unwrap();
    Ok(out)
}

/// `structural:` statement of a node.
pub(crate) fn structural<S: SceneGraph>(
    ctx: &Ctx<'_, S>,
    object: ObjectKey,
    class: NodeClass,
) -> Rendered {
    let label = ctx.labels.node(object).ok_or("object is not a structural node")?;
    let mut out = String::new();

    if class == NodeClass::Dummy {
        let base = *ctx
            .resolution
            .nodes
            .dummy_bases
            .get(&object)
            .ok_or("dummy node has no base node")?;
        let base_label = ctx.labels.node(base).ok_or("base object is not a structural node")?;
        let rel = ctx.pose(object)?.relative_to(&ctx.pose(base)?);
        writeln!(out, "structural: {label}, dummy,").unwrap();
        writeln!(out, "\t{base_label}, offset,").unwrap();
        writeln!(out, "\t\treference, node, {},", ctx.vec(&rel.t)).unwrap();
        writeln!(out, "\t\treference, node, matr,").unwrap();
        write!(out, "\t\t\t{};", ctx.mat(&rel.r, "\t\t\t")).unwrap();
        return Ok(out);
    }

    let options = ctx
        .registry
        .nodes()
        .iter()
        .find(|n: &&NodeDef| n.object() == Some(&object));
    let (velocity, angular_velocity, output) = options
        .map(|n| (n.velocity, n.angular_velocity, n.output))
        .unwrap_or((Vec3::zeros(), Vec3::zeros(), true));

    let (frame, rel) = ctx.placed(object, None)?;
    writeln!(out, "structural: {label}, {},", class.keyword()).unwrap();
    writeln!(out, "\treference, {frame}, {},", ctx.vec(&rel.t)).unwrap();
    writeln!(out, "\treference, {frame}, matr,").unwrap();
    writeln!(out, "\t\t{},", ctx.mat(&rel.r, "\t\t")).unwrap();
    writeln!(out, "\treference, {frame}, {},", ctx.vec_or_null(velocity)).unwrap();
    write!(out, "\treference, {frame}, {}", ctx.vec_or_null(angular_velocity)).unwrap();
    if !output {
        write!(out, ",\n\toutput, no").unwrap();
    }
    out.push(';');
    Ok(out)
}

/// `file:` statement of a driver.
pub(crate) fn driver<S: SceneGraph>(ctx: &Ctx<'_, S>, driver: &Driver) -> Rendered {
    if driver.kind.channels() == 0 {
        return Err("driver has no channels".to_string());
    }
    let label = ctx.labels.entity(Category::Drivers, &driver.name);
    let num = |v| ctx.num(v);
    let mut out = String::new();
    match &driver.kind {
        DriverKind::Stream {
            stream_name,
            host,
            port,
            channels,
        } => {
            writeln!(out, "file: {label}, stream,").unwrap();
            writeln!(out, "\tstream drive name, {},", format::quoted(stream_name)).unwrap();
            writeln!(out, "\tcreate, no,").unwrap();
            writeln!(out, "\thost, {},", format::quoted(host)).unwrap();
            writeln!(out, "\tport, {port},").unwrap();
            write!(out, "\t{channels};").unwrap();
        }
        DriverKind::FixedStep {
            path,
            steps,
            channels,
            initial_time,
            time_step,
        } => {
            if *time_step <= 0.0 {
                return Err("time step must be positive".to_string());
            }
            writeln!(out, "file: {label}, fixed step,").unwrap();
            writeln!(out, "\t{steps}, {channels},").unwrap();
            writeln!(out, "\tinitial time, {},", num(*initial_time)).unwrap();
            writeln!(out, "\ttime step, {},", num(*time_step)).unwrap();
            write!(out, "\t{};", format::quoted(path)).unwrap();
        }
    }
    Ok(out)
}

/// `constitutive law:` statement.
pub(crate) fn const_law<S: SceneGraph>(ctx: &Ctx<'_, S>, law: &ConstLaw) -> Rendered {
    let label = ctx.labels.entity(Category::ConstLaws, &law.name);
    let num = |v| ctx.num(v);
    let dim = law.kind.dimension().size();
    let body = match &law.kind {
        LawKind::LinearElastic { stiffness, .. } => {
            format!("linear elastic, {}", num(*stiffness))
        }
        LawKind::LinearElasticGeneric { stiffness } => match stiffness {
            Stiffness::Scalar(k) => format!("linear elastic generic, {}", num(*k)),
            Stiffness::Matrix3(m) => format!(
                "linear elastic generic, matr,\n\t{}",
                format::rows(m.rows(), ctx.precision, "\t")
            ),
            Stiffness::Matrix6(m) => format!(
                "linear elastic generic, matr,\n\t{}",
                format::rows(m.rows(), ctx.precision, "\t")
            ),
        },
        LawKind::LinearViscoelastic {
            stiffness,
            viscosity,
            ..
        } => format!(
            "linear viscoelastic, {}, {}",
            num(*stiffness),
            num(*viscosity)
        ),
    };
    Ok(format!("constitutive law: {label}, {dim}, {body};"))
}

/// `drive caller:` statement.
pub(crate) fn drive_caller<S: SceneGraph>(ctx: &Ctx<'_, S>, drive: &Drive) -> Rendered {
    let label = ctx.labels.entity(Category::Drives, &drive.name);
    let n = |v: f64| ctx.num(v);
    let body = match &drive.kind {
        DriveKind::Constant { value } => format!("const, {}", n(*value)),
        DriveKind::Ramp {
            slope,
            initial_time,
            final_time,
            initial_value,
        } => {
            if final_time < initial_time {
                return Err("ramp ends before it starts".to_string());
            }
            format!(
                "ramp, {}, {}, {}, {}",
                n(*slope),
                n(*initial_time),
                n(*final_time),
                n(*initial_value)
            )
        }
        DriveKind::Sine {
            initial_time,
            omega,
            amplitude,
            cycles,
            initial_value,
        } => {
            let cycles = match cycles {
                None => "forever".to_string(),
                Some(1) => "one".to_string(),
                Some(n) => n.to_string(),
            };
            format!(
                "sine, {}, {}, {}, {cycles}, {}",
                n(*initial_time),
                n(*omega),
                n(*amplitude),
                n(*initial_value)
            )
        }
        DriveKind::Step {
            initial_time,
            step_value,
            initial_value,
        } => format!(
            "step, {}, {}, {}",
            n(*initial_time),
            n(*step_value),
            n(*initial_value)
        ),
        DriveKind::File {
            driver,
            column,
            amplitude,
        } => {
            let source = ctx
                .registry
                .require::<Driver>(driver)
                .map_err(|e| e.to_string())?;
            let channels = source.kind.channels();
            if *column == 0 || *column > channels {
                return Err(format!(
                    "column {column} is outside driver {driver}'s {channels} channels"
                ));
            }
            format!(
                "file, {}, {column}, amplitude, {}",
                ctx.labels.entity(Category::Drivers, driver),
                n(*amplitude)
            )
        }
        DriveKind::Node { dof } => {
            let [node] = objects::<1>(&drive.objects)?;
            format!(
                "node, {}, structural, string, {}, direct",
                ctx.node_label(node)?,
                format::quoted(dof)
            )
        }
    };
    Ok(format!("drive caller: {label}, {body};"))
}

/// Element statement (inside `begin: elements;`).
pub(crate) fn element<S: SceneGraph>(ctx: &Ctx<'_, S>, element: &Element) -> Rendered {
    let label = ctx.labels.entity(Category::Elements, &element.name);
    let mut out = String::new();

    match &element.kind {
        ElementKind::AerodynamicBody {
            span,
            chord,
            aero_center,
            bc_point,
            twist,
            integration_points,
        } => {
            if *span <= 0.0 || *chord <= 0.0 {
                return Err("span and chord must be positive".to_string());
            }
            if *integration_points == 0 {
                return Err("needs at least one integration point".to_string());
            }
            let [object] = objects::<1>(&element.objects)?;
            let (node, off) = ctx.node_offset(object)?;
            writeln!(out, "aerodynamic body: {label}, {node},").unwrap();
            writeln!(out, "\treference, node, {},", ctx.vec(&off.t)).unwrap();
            writeln!(out, "\treference, node, matr,").unwrap();
            writeln!(out, "\t\t{},", ctx.mat(&off.r, "\t\t")).unwrap();
            writeln!(out, "\t{},", ctx.num(*span)).unwrap();
            writeln!(out, "\tconst, {},", ctx.num(*chord)).unwrap();
            writeln!(out, "\tconst, {},", ctx.num(*aero_center)).unwrap();
            writeln!(out, "\tconst, {},", ctx.num(*bc_point)).unwrap();
            writeln!(out, "\tconst, {},", ctx.num(*twist)).unwrap();
            write!(out, "\t{integration_points};").unwrap();
        }
        ElementKind::BeamSegment { law } => {
            let [a, b] = objects::<2>(&element.objects)?;
            let law = ctx.law(law, LawDimension::Six)?;
            let (node_a, off_a) = ctx.node_offset(a)?;
            let (node_b, off_b) = ctx.node_offset(b)?;
            writeln!(out, "beam2: {label},").unwrap();
            writeln!(out, "\t{node_a}, reference, node, {},", ctx.vec(&off_a.t)).unwrap();
            writeln!(out, "\t{node_b}, reference, node, {},", ctx.vec(&off_b.t)).unwrap();
            writeln!(out, "\tfrom nodes,").unwrap();
            write!(out, "\treference, {law};").unwrap();
        }
        ElementKind::Body {
            mass,
            center_of_mass,
            inertia,
        } => {
            if *mass <= 0.0 {
                return Err(format!("mass must be positive, got {}", ctx.num(*mass)));
            }
            let [object] = objects::<1>(&element.objects)?;
            let (node, off) = ctx.node_offset(object)?;
            let com = off.t + off.r * Vector3::from(*center_of_mass);
            let inertia = off.r * Matrix3::from(*inertia) * off.r.transpose();
            writeln!(out, "body: {label}, {node},").unwrap();
            writeln!(out, "\t{},", ctx.num(*mass)).unwrap();
            writeln!(out, "\treference, node, {},", ctx.vec(&com)).unwrap();
            writeln!(out, "\tmatr,").unwrap();
            write!(out, "\t\t{};", ctx.mat(&inertia, "\t\t")).unwrap();
        }
        ElementKind::StructuralForce {
            follower,
            direction,
            drive,
        }
        | ElementKind::StructuralCouple {
            follower,
            direction,
            drive,
        } => {
            if direction.is_zero() {
                return Err("direction is the zero vector".to_string());
            }
            let [object] = objects::<1>(&element.objects)?;
            let drive = ctx.drive(drive)?;
            let (node, off) = ctx.node_offset(object)?;
            let mode = if *follower { "follower" } else { "absolute" };
            writeln!(out, "{}: {label}, {mode},", element.kind.keyword()).unwrap();
            writeln!(out, "\t{node},").unwrap();
            writeln!(out, "\tposition, reference, node, {},", ctx.vec(&off.t)).unwrap();
            write!(
                out,
                "\tsingle, {}, reference, {drive};",
                ctx.vec(&(*direction).into())
            )
            .unwrap();
        }
        ElementKind::GenelClamp { dof, drive } => {
            if !(1..=6).contains(dof) {
                return Err(format!("degree of freedom {dof} is outside 1..6"));
            }
            let [object] = objects::<1>(&element.objects)?;
            let drive = ctx.drive(drive)?;
            let node = ctx.node_label(object)?;
            writeln!(out, "genel: {label}, clamp,").unwrap();
            writeln!(out, "\t{node}, structural, {dof}, algebraic,").unwrap();
            write!(out, "\treference, {drive};").unwrap();
        }
        ElementKind::Clamp => {
            let [object] = objects::<1>(&element.objects)?;
            let node = ctx.node_label(object)?;
            write!(out, "joint: {label}, clamp, {node}, node, node;").unwrap();
        }
        ElementKind::RevoluteHinge
        | ElementKind::SphericalHinge
        | ElementKind::Prismatic
        | ElementKind::DeformableDisplacementJoint { .. } => {
            let [a, b] = objects::<2>(&element.objects)?;
            let law = match &element.kind {
                ElementKind::DeformableDisplacementJoint { law } => {
                    Some(ctx.law(law, LawDimension::Three)?)
                }
                _ => None,
            };
            let (position, orientation, name) = match element.kind {
                ElementKind::RevoluteHinge => (true, true, "revolute hinge"),
                ElementKind::SphericalHinge => (true, false, "spherical hinge"),
                ElementKind::Prismatic => (false, true, "prismatic"),
                _ => (true, true, "deformable displacement joint"),
            };
            if ctx.resolution.nodes.resolve(a) == ctx.resolution.nodes.resolve(b) {
                return Err("both ends resolve to the same node".to_string());
            }

            let location = ctx.pose(b)?;
            write!(out, "joint: {label}, {name}").unwrap();
            for object in [a, b] {
                let node = ctx.resolution.nodes.resolve(object);
                let rel = location.relative_to(&ctx.pose(node)?);
                write!(out, ",\n\t{}", ctx.node_label(object)?).unwrap();
                if position {
                    write!(out, ",\n\t\tposition, reference, node, {}", ctx.vec(&rel.t)).unwrap();
                }
                if orientation {
                    write!(
                        out,
                        ",\n\t\torientation, reference, node, matr,\n\t\t\t{}",
                        ctx.mat(&rel.r, "\t\t\t")
                    )
                    .unwrap();
                }
            }
            if let Some(law) = law {
                write!(out, ",\n\treference, {law}").unwrap();
            }
            out.push(';');
        }
        ElementKind::Rotor => {
            let [craft, rotor] = objects::<2>(&element.objects)?;
            let craft = ctx.node_label(craft)?;
            let rotor = ctx.node_label(rotor)?;
            writeln!(out, "rotor: {label}, {craft}, {rotor},").unwrap();
            write!(out, "\tinduced velocity, no;").unwrap();
        }
        ElementKind::Gravity { direction, drive } => {
            if direction.is_zero() {
                return Err("direction is the zero vector".to_string());
            }
            let drive = ctx.drive(drive)?;
            write!(
                out,
                "gravity: uniform, single, {}, reference, {drive};",
                ctx.vec(&(*direction).into())
            )
            .unwrap();
        }
        ElementKind::AirProperties {
            density,
            sound_speed,
            velocity,
            drive,
        } => {
            if *density <= 0.0 || *sound_speed <= 0.0 {
                return Err("density and sound speed must be positive".to_string());
            }
            let drive = ctx.drive(drive)?;
            writeln!(
                out,
                "air properties: {}, {},",
                ctx.num(*density),
                ctx.num(*sound_speed)
            )
            .unwrap();
            write!(
                out,
                "\tsingle, {}, reference, {drive};",
                ctx.vec(&(*velocity).into())
            )
            .unwrap();
        }
        ElementKind::Driven {
            element: wrapped,
            drive,
        } => {
            if wrapped == UNASSIGNED {
                return Err("no element selected".to_string());
            }
            let target = ctx
                .registry
                .require::<Element>(wrapped)
                .map_err(|e| e.to_string())?;
            match target.kind {
                ElementKind::Driven { .. } => {
                    return Err(format!("{wrapped} is already a driven wrapper"))
                }
                ElementKind::RigidOffset | ElementKind::DummyNode => {
                    return Err(format!("{wrapped} is not an element statement"))
                }
                _ => {}
            }
            let drive = ctx.drive(drive)?;
            let wrapped_label = ctx.labels.entity(Category::Elements, wrapped);
            write!(
                out,
                "driven: {wrapped_label}, reference, {drive},\n\texisting: {}, {wrapped_label};",
                target.kind.keyword()
            )
            .unwrap();
        }
        ElementKind::RigidOffset | ElementKind::DummyNode => {
            return Err("node modifiers have no element statement".to_string());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mbscene_ir::{Mat3, Scene};
    use mbscene_resolve::resolve;

    fn rot_z_90() -> Mat3 {
        Mat3([[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
    }

    #[test]
    fn relative_pose_inverts_parent() {
        let parent = Pose {
            t: Vector3::new(1.0, 0.0, 0.0),
            r: rot_z_90().into(),
        };
        let child = Pose {
            t: Vector3::new(1.0, 2.0, 0.0),
            r: rot_z_90().into(),
        };
        let rel = child.relative_to(&parent);
        assert_relative_eq!(rel.t, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(rel.r, Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn sine_cycles_keywords() {
        let scene = Scene::new("Scene");
        let registry = Registry::new();
        let resolution = resolve(&registry, &scene).unwrap();
        let ctx = Ctx::new(&registry, &scene, &resolution, 6);
        let sine = |cycles| {
            Drive::new(
                "s",
                DriveKind::Sine {
                    initial_time: 0.0,
                    omega: 6.283185307,
                    amplitude: 1.0,
                    cycles,
                    initial_value: 0.0,
                },
                vec![],
            )
        };
        assert_eq!(
            drive_caller(&ctx, &sine(None)).unwrap(),
            "drive caller: Drive_s, sine, 0, 6.283185, 1, forever, 0;"
        );
        assert!(drive_caller(&ctx, &sine(Some(1))).unwrap().contains(", one, "));
        assert!(drive_caller(&ctx, &sine(Some(4))).unwrap().contains(", 4, "));
    }

    #[test]
    fn laws_render_dimension_and_parameters() {
        let scene = Scene::new("Scene");
        let registry = Registry::new();
        let resolution = resolve(&registry, &scene).unwrap();
        let ctx = Ctx::new(&registry, &scene, &resolution, 6);
        let law = ConstLaw::new(
            "axial spring",
            LawKind::LinearElastic {
                dimension: LawDimension::One,
                stiffness: 1.5e3,
            },
        );
        assert_eq!(
            const_law(&ctx, &law).unwrap(),
            "constitutive law: Law_axial_spring, 1, linear elastic, 1500;"
        );
        let law = ConstLaw::new(
            "k3",
            LawKind::LinearElasticGeneric {
                stiffness: Stiffness::Matrix3(Mat3::diagonal(1.0, 2.0, 3.0)),
            },
        );
        assert_eq!(
            const_law(&ctx, &law).unwrap(),
            "constitutive law: Law_k3, 3, linear elastic generic, matr,\n\t1, 0, 0,\n\t0, 2, 0,\n\t0, 0, 3;"
        );
    }

    #[test]
    fn drivers_validate_channels() {
        let scene = Scene::new("Scene");
        let registry = Registry::new();
        let resolution = resolve(&registry, &scene).unwrap();
        let ctx = Ctx::new(&registry, &scene, &resolution, 6);
        let stream = Driver {
            name: "in".into(),
            kind: DriverKind::Stream {
                stream_name: "MBXINP".into(),
                host: "localhost".into(),
                port: 9011,
                channels: 0,
            },
        };
        assert!(driver(&ctx, &stream).is_err());

        let table = Driver {
            name: "table".into(),
            kind: DriverKind::FixedStep {
                path: "data.txt".into(),
                steps: 100,
                channels: 2,
                initial_time: 0.0,
                time_step: 0.01,
            },
        };
        assert_eq!(
            driver(&ctx, &table).unwrap(),
            "file: Driver_table, fixed step,\n\t100, 2,\n\tinitial time, 0,\n\ttime step, 0.01,\n\t\"data.txt\";"
        );
    }
}
