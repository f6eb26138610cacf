use serde::{Deserialize, Serialize};

use crate::config::DriveMode;
use crate::mcmc::{SweepOutcome, UpdateFamily, UpdateOutcome};

/// Acceptance bookkeeping for one update family.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FamilyTally {
    /// Sweeps (or L³-step blocks in interleaved mode) assigned to this family.
    pub sweeps: u64,
    pub attempted: u64,
    pub accepted: u64,
    /// Microcanonical moves skipped on a vanishing local field.
    pub degenerate: u64,
    /// Full sweeps recorded through [`FamilyTally::record_sweep`].
    full_sweeps: u64,
    sweep_acceptance_sum: f64,
}

impl FamilyTally {
    pub fn record_update(&mut self, outcome: UpdateOutcome) {
        self.attempted += 1;
        match outcome {
            UpdateOutcome::Accepted => self.accepted += 1,
            UpdateOutcome::Rejected => {}
            UpdateOutcome::DegenerateField => self.degenerate += 1,
        }
    }

    pub fn record_sweep(&mut self, outcome: &SweepOutcome) {
        self.attempted += outcome.attempted;
        self.accepted += outcome.accepted;
        self.degenerate += outcome.degenerate;
        self.full_sweeps += 1;
        self.sweep_acceptance_sum += outcome.acceptance();
    }

    /// accepted / attempted over the whole run.
    pub fn acceptance(&self) -> Option<f64> {
        (self.attempted > 0).then(|| self.accepted as f64 / self.attempted as f64)
    }

    /// Mean over full sweeps of the per-sweep acceptance fraction.
    pub fn mean_sweep_acceptance(&self) -> Option<f64> {
        (self.full_sweeps > 0).then(|| self.sweep_acceptance_sum / self.full_sweeps as f64)
    }
}

/// Post-warmup observable averages and autocorrelation times.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservableSummary {
    /// Number of records that entered the averages.
    pub samples: u64,
    /// ⟨E⟩, the mean energy per site.
    pub energy: Option<f64>,
    /// ⟨E²⟩.
    pub energy2: Option<f64>,
    /// ⟨|m|⟩.
    pub abs_mag: Option<f64>,
    /// ⟨|m|²⟩.
    pub abs_mag2: Option<f64>,
    /// ⟨|m|⁴⟩.
    pub abs_mag4: Option<f64>,
    /// Binder cumulant ⟨|m|⁴⟩ / ⟨|m|²⟩².
    pub binder: Option<f64>,
    /// χ′ = β L³ (⟨|m|²⟩ − ⟨|m|⟩²).
    pub susceptibility: Option<f64>,
    /// Blocked standard error of ⟨E⟩.
    pub energy_err: Option<f64>,
    /// Blocked standard error of ⟨|m|⟩.
    pub abs_mag_err: Option<f64>,
    /// Integrated autocorrelation time of E, in records.
    pub energy_tau: Option<f64>,
    /// Integrated autocorrelation time of |m|, in records.
    pub abs_mag_tau: Option<f64>,
}

/// `⟨m⁴⟩ / ⟨m²⟩²`, `None` when `⟨m²⟩` vanishes.
pub fn binder_cumulant(abs_mag2: f64, abs_mag4: f64) -> Option<f64> {
    (abs_mag2 > 0.0).then(|| abs_mag4 / (abs_mag2 * abs_mag2))
}

/// Connected susceptibility `β N (⟨m²⟩ − ⟨|m|⟩²)` on `n_sites` sites.
pub fn susceptibility(beta: f64, n_sites: usize, abs_mag: f64, abs_mag2: f64) -> f64 {
    beta * n_sites as f64 * (abs_mag2 - abs_mag * abs_mag)
}

/// Final report of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: DriveMode,
    /// Sweeps (full-sweep mode) or single-site steps (interleaved mode) performed.
    pub units: u64,
    pub metropolis: FamilyTally,
    pub microcanonical: FamilyTally,
    /// Sites that failed the post-renormalization tolerance, summed over the run.
    pub drifted_sites: u64,
    pub observables: ObservableSummary,
}

impl RunSummary {
    pub fn tally(&self, family: UpdateFamily) -> &FamilyTally {
        match family {
            UpdateFamily::Metropolis => &self.metropolis,
            UpdateFamily::Microcanonical => &self.microcanonical,
        }
    }

    pub fn total_attempted(&self) -> u64 {
        self.metropolis.attempted + self.microcanonical.attempted
    }

    pub fn total_accepted(&self) -> u64 {
        self.metropolis.accepted + self.microcanonical.accepted
    }
}
