#![warn(missing_docs)]

//! mbscene: multibody models on top of a host scene graph.
//!
//! Entities (joints, bodies, forces, drives, reference frames, ...) are
//! attached to objects of a host scene, persisted alongside the host
//! document as a restricted snapshot, and turned into an MBDyn input file.
//!
//! # Example
//!
//! ```
//! use mbscene::{BuildConfig, Element, ElementKind, ModelContext, Scene, Vec3};
//!
//! let mut scene = Scene::new("Scene");
//! let ground = scene.add("ground", Vec3::zeros()).unwrap();
//!
//! let mut ctx = ModelContext::new();
//! ctx.open_document("Scene");
//! ctx.add(Element::new("fixed", ElementKind::Clamp, vec![ground])).unwrap();
//!
//! let mut out = Vec::new();
//! let report = ctx.generate(&scene, &BuildConfig::default(), &mut out).unwrap();
//! assert!(report.is_complete());
//! assert!(String::from_utf8(out).unwrap().contains("joint: Elem_fixed, clamp"));
//! ```

mod config;
mod context;
mod error;

pub use config::BuildConfig;
pub use context::ModelContext;
pub use error::{ModelError, Result};

pub use mbscene_ir::*;
pub use mbscene_resolve::{NodeClass, NodeClassification, Resolution, ResolveWarning};
pub use mbscene_writer::{ErrorPolicy, GenerationReport, WriterSettings};
