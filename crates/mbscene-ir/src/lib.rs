//! Entity graph for mbscene multibody models.
//!
//! This crate defines the plain data model shared by the snapshot
//! serializer, the dependency resolver and the input-file writer:
//!
//! - small math value types ([`Vec3`], [`Mat3`], [`Mat6`])
//! - the scene-object interface the host application implements
//!   ([`SceneGraph`]) plus an in-memory [`Scene`]
//! - the modeling entities (elements, drives, drivers, constitutive laws,
//!   reference frames, node definitions, simulation runs)
//! - the [`Registry`] that owns every entity of an open document
//!
//! Entities never own scene objects. They hold [`ObjectKey`] handles and
//! refer to each other by name.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

mod drive;
mod element;
mod entity;
mod error;
mod frame;
mod law;
mod registry;
mod scene;
mod simulation;

pub use drive::{Drive, DriveKind, Driver, DriverKind};
pub use element::{Element, ElementGroup, ElementKind, NodeRole};
pub use entity::{Category, Entity, EntityKey, UNASSIGNED};
pub use error::{RegistryError, SceneError};
pub use frame::{Frame, FrameKind, NodeDef, NodeKind};
pub use law::{ConstLaw, LawDimension, LawKind, Stiffness};
pub use registry::{Registry, Stored};
pub use scene::{ObjectKey, Scene, SceneGraph, SceneObject};
pub use simulation::{IntegrationMethod, Simulation, SimulationKind};

/// 3D vector with f64 components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Components as an array.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// True when every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector3<f64>> for Vec3 {
    fn from(v: Vector3<f64>) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Row-major 3x3 matrix (rotations, inertia tensors, 3-D stiffness).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3(pub [[f64; 3]; 3]);

impl Mat3 {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self::diagonal(1.0, 1.0, 1.0)
    }

    /// The zero matrix.
    pub fn zeros() -> Self {
        Self([[0.0; 3]; 3])
    }

    /// Diagonal matrix with the given entries.
    pub fn diagonal(a: f64, b: f64, c: f64) -> Self {
        Self([[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]])
    }

    /// Rows of the matrix.
    pub fn rows(&self) -> &[[f64; 3]; 3] {
        &self.0
    }
}

impl From<Mat3> for Matrix3<f64> {
    fn from(m: Mat3) -> Self {
        let r = m.0;
        Matrix3::new(
            r[0][0], r[0][1], r[0][2], //
            r[1][0], r[1][1], r[1][2], //
            r[2][0], r[2][1], r[2][2],
        )
    }
}

impl From<Matrix3<f64>> for Mat3 {
    fn from(m: Matrix3<f64>) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = m[(i, j)];
            }
        }
        Mat3(rows)
    }
}

/// Row-major 6x6 matrix (6-D constitutive law stiffness).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat6(pub [[f64; 6]; 6]);

impl Mat6 {
    /// Diagonal matrix with the given entries.
    pub fn diagonal(d: [f64; 6]) -> Self {
        let mut rows = [[0.0; 6]; 6];
        for (i, value) in d.into_iter().enumerate() {
            rows[i][i] = value;
        }
        Self(rows)
    }

    /// Rows of the matrix.
    pub fn rows(&self) -> &[[f64; 6]; 6] {
        &self.0
    }
}
