#![warn(missing_docs)]

//! MBDyn input-file writer for mbscene models.
//!
//! Takes a registry, the scene it references and a [`Resolution`] and
//! writes a solver input file in a fixed block order:
//!
//! 1. banner comments and `begin: data;`
//! 2. `begin: initial value;` from the selected simulation run
//! 3. `begin: control data;` with the counts of what was written
//! 4. integer label declarations for frames and nodes
//! 5. `reference:` statements, parents first
//! 6. `begin: nodes;` and `begin: drivers;`
//! 7. constitutive laws and drive callers
//! 8. `begin: elements;` grouped by [`ElementGroup::ORDER`]
//!
//! Empty node, driver and element blocks are omitted. An entity that cannot
//! be written is handled by the configured [`ErrorPolicy`].
//!
//! [`ElementGroup::ORDER`]: mbscene_ir::ElementGroup::ORDER

use std::io;

use mbscene_ir::{Registry, SceneGraph};
use mbscene_resolve::Resolution;

pub mod format;
mod error;
mod labels;
mod settings;
mod statements;
mod writer;

pub use error::{EntityFailure, GenerationError, GenerationReport, Result};
pub use settings::{ErrorPolicy, WriterSettings};
pub use writer::InputFileWriter;

/// Render the input file to a string.
pub fn generate<S: SceneGraph>(
    registry: &Registry,
    scene: &S,
    resolution: &Resolution,
    settings: &WriterSettings,
) -> Result<(String, GenerationReport)> {
    InputFileWriter::new(registry, scene, resolution, settings).render()
}

/// Render the input file into `out`. Nothing is written when generation
/// fails.
pub fn write_input_file<S: SceneGraph>(
    registry: &Registry,
    scene: &S,
    resolution: &Resolution,
    settings: &WriterSettings,
    out: &mut impl io::Write,
) -> Result<GenerationReport> {
    let (text, report) = generate(registry, scene, resolution, settings)?;
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbscene_ir::Scene;

    #[test]
    fn writes_into_any_sink() {
        let scene = Scene::new("Scene");
        let registry = Registry::new();
        let resolution = mbscene_resolve::resolve(&registry, &scene).unwrap();
        let mut buf = Vec::new();
        let report = write_input_file(
            &registry,
            &scene,
            &resolution,
            &WriterSettings::default(),
            &mut buf,
        )
        .unwrap();
        assert!(report.is_complete());
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# scene: Scene"));
        assert!(text.ends_with("end: control data;\n\n"));
    }
}
