//! Writer settings.

use serde::{Deserialize, Serialize};

/// What to do when a single entity cannot be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Replace the statement with an `# error:` comment and continue.
    #[default]
    BestEffort,
    /// Stop at the first failing entity.
    Abort,
}

/// Settings controlling input-file generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    /// Decimal places for every floating value.
    pub precision: u32,
    /// Per-entity failure handling.
    pub error_policy: ErrorPolicy,
    /// Simulation run to write; the first run in the registry when unset.
    pub simulation: Option<String>,
    /// Title written to the banner.
    pub title: Option<String>,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            precision: 6,
            error_policy: ErrorPolicy::BestEffort,
            simulation: None,
            title: None,
        }
    }
}
