//! Input-file assembly: fixed block order, label declarations, error policy.

use std::fmt::Write as FmtWrite;

use mbscene_ir::{
    Category, ElementGroup, ElementKind, Entity, EntityKey, IntegrationMethod, Registry,
    SceneGraph, Simulation,
};
use mbscene_resolve::{NodeClass, Resolution};

use crate::error::{EntityFailure, GenerationError, GenerationReport, Result};
use crate::format;
use crate::labels::Labels;
use crate::settings::{ErrorPolicy, WriterSettings};
use crate::statements::{self, Ctx, Rendered};

/// Element counts for the control data block.
#[derive(Debug, Default)]
struct Counts {
    bodies: usize,
    joints: usize,
    forces: usize,
    beams: usize,
    genels: usize,
    aerodynamic: usize,
    rotors: usize,
    gravity: bool,
    air: bool,
}

impl Counts {
    fn record(&mut self, kind: &ElementKind) {
        match kind.group() {
            Some(ElementGroup::Aerodynamic) => self.aerodynamic += 1,
            Some(ElementGroup::Beam) => self.beams += 1,
            Some(ElementGroup::RigidBody) => self.bodies += 1,
            Some(ElementGroup::Force) => self.forces += 1,
            Some(ElementGroup::Genel) => self.genels += 1,
            Some(ElementGroup::Joint) => self.joints += 1,
            Some(ElementGroup::Rotor) => self.rotors += 1,
            Some(ElementGroup::Environment) => match kind {
                ElementKind::Gravity { .. } => self.gravity = true,
                _ => self.air = true,
            },
            Some(ElementGroup::Driven) | None => {}
        }
    }
}

/// Writes one input file from a resolved registry.
pub struct InputFileWriter<'a, S> {
    ctx: Ctx<'a, S>,
    settings: &'a WriterSettings,
    report: GenerationReport,
}

impl<'a, S: SceneGraph> InputFileWriter<'a, S> {
    /// Prepare a writer. `resolution` must come from the same registry and
    /// scene.
    pub fn new(
        registry: &'a Registry,
        scene: &'a S,
        resolution: &'a Resolution,
        settings: &'a WriterSettings,
    ) -> Self {
        Self {
            ctx: Ctx::new(registry, scene, resolution, settings.precision),
            settings,
            report: GenerationReport::default(),
        }
    }

    /// Render the whole file.
    pub fn render(mut self) -> Result<(String, GenerationReport)> {
        let registry = self.ctx.registry;
        let resolution = self.ctx.resolution;
        let simulation = self.simulation()?;
        self.report.warnings = resolution.warnings.iter().map(|w| w.to_string()).collect();
        self.report
            .warnings
            .extend(self.ctx.labels.renamed.iter().cloned());

        // Entity statements first: control data counts what rendered.
        let mut references = String::new();
        for name in &resolution.frames {
            let Some(frame) = registry.frames().iter().find(|f| &f.name == name) else {
                continue;
            };
            let rendered = statements::reference(&self.ctx, frame);
            if self.emit(&mut references, frame.key(), rendered, "")? {
                self.report.frames += 1;
            }
        }

        let mut nodes = String::new();
        for class in NodeClass::ORDER {
            for object in resolution.nodes.of_class(class) {
                let rendered = statements::structural(&self.ctx, object, class);
                let key = EntityKey::new(
                    Category::Nodes,
                    self.ctx.scene.display_name(object).unwrap_or_default(),
                );
                if self.emit(&mut nodes, key, rendered, "\t")? {
                    self.report.nodes += 1;
                }
            }
        }

        let mut drivers = String::new();
        for driver in registry.drivers() {
            let rendered = statements::driver(&self.ctx, driver);
            self.emit(&mut drivers, driver.key(), rendered, "\t")?;
        }

        let mut laws = String::new();
        for law in registry.const_laws() {
            let rendered = statements::const_law(&self.ctx, law);
            self.emit(&mut laws, law.key(), rendered, "")?;
        }

        let mut drives = String::new();
        for drive in registry.drives() {
            let rendered = statements::drive_caller(&self.ctx, drive);
            self.emit(&mut drives, drive.key(), rendered, "")?;
        }

        let mut counts = Counts::default();
        let mut elements = String::new();
        let ordered: Vec<_> = ElementGroup::ORDER
            .iter()
            .flat_map(|group| {
                registry
                    .elements()
                    .iter()
                    .filter(move |e| e.kind.group() == Some(*group))
            })
            .collect();
        for element in &ordered {
            let rendered = statements::element(&self.ctx, element);
            if self.emit(&mut elements, element.key(), rendered, "\t")? {
                counts.record(&element.kind);
                self.report.elements += 1;
            }
        }

        let mut out = String::new();
        self.banner(&mut out);
        writeln!(out, "begin: data;").unwrap();
        writeln!(out, "\tproblem: initial value;").unwrap();
        writeln!(out, "end: data;").unwrap();
        writeln!(out).unwrap();
        self.initial_value(&mut out, &simulation);
        self.control_data(&mut out, &counts, &simulation);

        if !resolution.frames.is_empty() || !resolution.nodes.is_empty() {
            if !resolution.frames.is_empty() {
                writeln!(out, "# reference frames").unwrap();
                for (name, id) in resolution.frames.iter().zip(1..) {
                    let label = self.ctx.labels.entity(Category::Frames, name);
                    writeln!(out, "set: const integer {label} = {id};").unwrap();
                }
            }
            if !resolution.nodes.is_empty() {
                writeln!(out, "# structural nodes").unwrap();
                for (object, id) in resolution.nodes.order.iter().zip(1..) {
                    let label = self.ctx.labels.node(*object).unwrap_or_default();
                    writeln!(out, "set: const integer {label} = {id};").unwrap();
                }
            }
            writeln!(out).unwrap();
        }

        if !references.is_empty() {
            write!(out, "{references}").unwrap();
            writeln!(out).unwrap();
        }
        block(&mut out, "nodes", &nodes);
        block(&mut out, "drivers", &drivers);

        let labels = &self.ctx.labels;
        declare(&mut out, "constitutive laws", labels, registry.const_laws());
        declare(&mut out, "drives", labels, registry.drives());
        declare(&mut out, "elements", labels, ordered.iter().copied());
        if !laws.is_empty() || !drives.is_empty() {
            write!(out, "{laws}{drives}").unwrap();
            writeln!(out).unwrap();
        }
        block(&mut out, "elements", &elements);

        tracing::debug!(
            frames = self.report.frames,
            nodes = self.report.nodes,
            elements = self.report.elements,
            failures = self.report.failures.len(),
            "generated input file"
        );
        Ok((out, self.report))
    }

    fn simulation(&self) -> Result<Simulation> {
        let registry = self.ctx.registry;
        match &self.settings.simulation {
            Some(name) => Ok(registry
                .require::<Simulation>(name)
                .map_err(GenerationError::Simulation)?
                .clone()),
            None => Ok(registry.simulations().first().cloned().unwrap_or_default()),
        }
    }

    /// Append a rendered statement, or apply the error policy.
    /// Returns whether the statement was written.
    fn emit(
        &mut self,
        out: &mut String,
        entity: EntityKey,
        rendered: Rendered,
        indent: &str,
    ) -> Result<bool> {
        match rendered {
            Ok(text) => {
                for line in text.lines() {
                    writeln!(out, "{indent}{line}").unwrap();
                }
                Ok(true)
            }
            Err(message) => {
                if self.settings.error_policy == ErrorPolicy::Abort {
                    return Err(GenerationError::Entity { entity, message });
                }
                tracing::warn!(%entity, %message, "entity replaced by error comment");
                writeln!(out, "{indent}# error: {entity}: {message}").unwrap();
                self.report.failures.push(EntityFailure { entity, message });
                Ok(false)
            }
        }
    }

    fn banner(&self, out: &mut String) {
        writeln!(out, "# MBDyn input file generated by mbscene").unwrap();
        if let Some(title) = &self.settings.title {
            writeln!(out, "# title: {title}").unwrap();
        }
        writeln!(out, "# scene: {}", self.ctx.scene.name()).unwrap();
        for warning in &self.report.warnings {
            writeln!(out, "# warning: {warning}").unwrap();
        }
        writeln!(out).unwrap();
    }

    fn initial_value(&self, out: &mut String, sim: &Simulation) {
        let p = self.settings.precision;
        let method = match sim.method {
            IntegrationMethod::CrankNicolson => "crank nicolson".to_string(),
            IntegrationMethod::Ms { rho } => format!("ms, {}", format::num(rho, p)),
            IntegrationMethod::Hope { rho } => format!("hope, {}", format::num(rho, p)),
        };
        writeln!(out, "begin: initial value;").unwrap();
        writeln!(out, "\tinitial time: {};", format::num(sim.initial_time, p)).unwrap();
        writeln!(out, "\tfinal time: {};", format::num(sim.final_time, p)).unwrap();
        writeln!(out, "\ttime step: {};", format::num(sim.time_step, p)).unwrap();
        writeln!(out, "\tmax iterations: {};", sim.max_iterations).unwrap();
        writeln!(out, "\ttolerance: {};", format::exp(sim.tolerance, p)).unwrap();
        writeln!(
            out,
            "\tderivatives tolerance: {};",
            format::exp(sim.derivatives_tolerance, p)
        )
        .unwrap();
        writeln!(out, "\tmethod: {method};").unwrap();
        writeln!(out, "end: initial value;").unwrap();
        writeln!(out).unwrap();
    }

    fn control_data(&self, out: &mut String, counts: &Counts, sim: &Simulation) {
        let drivers = self.ctx.registry.drivers().len() - self.failed(Category::Drivers);
        let rows = [
            ("structural nodes", self.report.nodes),
            ("rigid bodies", counts.bodies),
            ("joints", counts.joints),
            ("forces", counts.forces),
            ("beams", counts.beams),
            ("genels", counts.genels),
            ("aerodynamic elements", counts.aerodynamic),
            ("rotors", counts.rotors),
            ("file drivers", drivers),
        ];

        writeln!(out, "begin: control data;").unwrap();
        for (name, count) in rows {
            if count > 0 {
                writeln!(out, "\t{name}: {count};").unwrap();
            }
        }
        if counts.gravity {
            writeln!(out, "\tgravity;").unwrap();
        }
        if counts.air {
            writeln!(out, "\tair properties;").unwrap();
        }
        if sim.output_frequency > 1 {
            writeln!(out, "\toutput frequency: {};", sim.output_frequency).unwrap();
        }
        writeln!(out, "end: control data;").unwrap();
        writeln!(out).unwrap();
    }

    fn failed(&self, category: Category) -> usize {
        self.report
            .failures
            .iter()
            .filter(|f| f.entity.category == category)
            .count()
    }
}

/// `begin: <name>; ... end: <name>;`, omitted when empty.
fn block(out: &mut String, name: &str, body: &str) {
    if body.is_empty() {
        return;
    }
    writeln!(out, "begin: {name};").unwrap();
    write!(out, "{body}").unwrap();
    writeln!(out, "end: {name};").unwrap();
    writeln!(out).unwrap();
}

/// Numbered `set: const integer` declarations for one category.
fn declare<'e, E: Entity + 'e>(
    out: &mut String,
    heading: &str,
    labels: &Labels,
    entities: impl IntoIterator<Item = &'e E>,
) {
    let mut entities = entities.into_iter().peekable();
    if entities.peek().is_none() {
        return;
    }
    writeln!(out, "# {heading}").unwrap();
    for (entity, id) in entities.zip(1..) {
        let label = labels.entity(E::CATEGORY, entity.name());
        writeln!(out, "set: const integer {label} = {id};").unwrap();
    }
    writeln!(out).unwrap();
}
