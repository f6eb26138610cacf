pub mod metropolis;
pub mod microcanonical;
pub mod sweep;

pub use metropolis::metropolis;
pub use microcanonical::{microcanonical, DEGENERATE_FIELD};
pub use sweep::{metropolis_sweep, microcanonical_sweep, SweepOutcome};

use serde::{Deserialize, Serialize};

/// Result of a single-site update attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Accepted,
    Rejected,
    /// Microcanonical move skipped because the local field vanishes.
    DegenerateField,
}

impl UpdateOutcome {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Update family applied during one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFamily {
    Metropolis,
    Microcanonical,
}

impl UpdateFamily {
    pub fn label(self) -> &'static str {
        match self {
            Self::Metropolis => "metropolis",
            Self::Microcanonical => "microcanonical",
        }
    }
}

impl std::fmt::Display for UpdateFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
