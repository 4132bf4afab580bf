//! Simulation run definitions (the solver's initial value problem).

use serde::{Deserialize, Serialize};

use crate::entity::{Category, Entity, EntityKey};
use crate::scene::ObjectKey;

/// Type tag of simulation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationKind {
    /// Time integration from initial conditions.
    #[default]
    #[serde(rename = "Initial value")]
    InitialValue,
}

impl SimulationKind {
    /// Every type tag, used as the snapshot allow-list.
    pub const TYPE_NAMES: &'static [&'static str] = &["Initial value"];
}

/// Time integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// Trapezoidal rule.
    CrankNicolson,
    /// Multistep with asymptotic spectral radius.
    Ms {
        /// Spectral radius.
        rho: f64,
    },
    /// Hybrid Offset-Prediction-Extrapolation with spectral radius.
    Hope {
        /// Spectral radius.
        rho: f64,
    },
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    /// Run name, unique among runs.
    pub name: String,
    /// Type tag.
    #[serde(rename = "type", default)]
    pub kind: SimulationKind,
    /// Start time.
    pub initial_time: f64,
    /// End time.
    pub final_time: f64,
    /// Integration step.
    pub time_step: f64,
    /// Newton iteration cap per step.
    pub max_iterations: u32,
    /// Residual tolerance.
    pub tolerance: f64,
    /// Derivatives tolerance for the initial assembly.
    pub derivatives_tolerance: f64,
    /// Integration scheme.
    pub method: IntegrationMethod,
    /// Write output every n steps.
    #[serde(default = "default_output_frequency")]
    pub output_frequency: u32,
}

fn default_output_frequency() -> u32 {
    1
}

impl Simulation {
    /// A run with the solver's customary defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            kind: SimulationKind::InitialValue,
            initial_time: 0.0,
            final_time: 1.0,
            time_step: 1e-3,
            max_iterations: 10,
            tolerance: 1e-6,
            derivatives_tolerance: 1e-9,
            method: IntegrationMethod::Ms { rho: 0.6 },
            output_frequency: 1,
        }
    }
}

impl Entity for Simulation {
    const CATEGORY: Category = Category::Simulations;

    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Initial value"
    }

    fn objects(&self) -> &[ObjectKey] {
        &[]
    }

    fn links(&self) -> Vec<EntityKey> {
        Vec::new()
    }
}
