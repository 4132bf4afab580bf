//! Constitutive laws used by beams and deformable joints.

use serde::{Deserialize, Serialize};

use crate::entity::{Category, Entity, EntityKey};
use crate::scene::ObjectKey;
use crate::{Mat3, Mat6};

/// A constitutive law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstLaw {
    /// Law name, unique among laws.
    pub name: String,
    /// Type tag and parameters.
    #[serde(flatten)]
    pub kind: LawKind,
}

/// Dimension of the strain/stress space a law acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LawDimension {
    /// Scalar.
    #[serde(rename = "1D")]
    One,
    /// Three components.
    #[serde(rename = "3D")]
    Three,
    /// Six components.
    #[serde(rename = "6D")]
    Six,
}

impl LawDimension {
    /// Numeric dimension as written to the solver.
    pub fn size(self) -> u32 {
        match self {
            LawDimension::One => 1,
            LawDimension::Three => 3,
            LawDimension::Six => 6,
        }
    }
}

/// Stiffness of a generic linear elastic law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stiffness {
    /// Scalar stiffness (1-D law).
    Scalar(f64),
    /// 3x3 stiffness matrix (3-D law).
    Matrix3(Mat3),
    /// 6x6 stiffness matrix (6-D law).
    Matrix6(Mat6),
}

/// Law type and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LawKind {
    /// Isotropic linear elastic.
    #[serde(rename = "Linear elastic")]
    LinearElastic {
        /// Law dimension.
        dimension: LawDimension,
        /// Isotropic stiffness.
        stiffness: f64,
    },
    /// Linear elastic with a full stiffness matrix.
    #[serde(rename = "Linear elastic generic")]
    LinearElasticGeneric {
        /// Stiffness; its shape sets the dimension.
        stiffness: Stiffness,
    },
    /// Isotropic linear viscoelastic.
    #[serde(rename = "Linear viscoelastic")]
    LinearViscoelastic {
        /// Law dimension.
        dimension: LawDimension,
        /// Isotropic stiffness.
        stiffness: f64,
        /// Isotropic viscosity.
        viscosity: f64,
    },
}

impl LawKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "Linear elastic",
        "Linear elastic generic",
        "Linear viscoelastic",
    ];

    /// Type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            LawKind::LinearElastic { .. } => "Linear elastic",
            LawKind::LinearElasticGeneric { .. } => "Linear elastic generic",
            LawKind::LinearViscoelastic { .. } => "Linear viscoelastic",
        }
    }

    /// Dimension of the law.
    pub fn dimension(&self) -> LawDimension {
        match self {
            LawKind::LinearElastic { dimension, .. }
            | LawKind::LinearViscoelastic { dimension, .. } => *dimension,
            LawKind::LinearElasticGeneric { stiffness } => match stiffness {
                Stiffness::Scalar(_) => LawDimension::One,
                Stiffness::Matrix3(_) => LawDimension::Three,
                Stiffness::Matrix6(_) => LawDimension::Six,
            },
        }
    }
}

impl ConstLaw {
    /// Create a law.
    pub fn new(name: impl Into<String>, kind: LawKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl Entity for ConstLaw {
    const CATEGORY: Category = Category::ConstLaws;

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
