use crate::geometry::Lattice;
use crate::random::RandomSource;
use crate::spins::Spin;

use super::metropolis::metropolis_at;
use super::microcanonical::microcanonical_at;
use super::UpdateOutcome;

/// Tally of one full sweep plus the last site it touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOutcome {
    pub attempted: u64,
    pub accepted: u64,
    pub degenerate: u64,
    /// Flat index of the last site updated (the final site in row-major order).
    pub last_site: usize,
    pub last_before: Spin,
    pub last_after: Spin,
}

impl SweepOutcome {
    pub fn acceptance(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }
}

/// Visit every site once in row-major order with a generic single-site move.
fn sweep_generic(
    lattice: &mut Lattice,
    mut update: impl FnMut(&mut Lattice, usize) -> UpdateOutcome,
) -> SweepOutcome {
    let n_sites = lattice.n_sites();
    let mut accepted = 0u64;
    let mut degenerate = 0u64;
    let mut last_before = Spin::ZERO;
    for i in 0..n_sites {
        last_before = lattice.spin(i);
        match update(lattice, i) {
            UpdateOutcome::Accepted => accepted += 1,
            UpdateOutcome::Rejected => {}
            UpdateOutcome::DegenerateField => degenerate += 1,
        }
    }
    let last_site = n_sites - 1;
    SweepOutcome {
        attempted: n_sites as u64,
        accepted,
        degenerate,
        last_site,
        last_before,
        last_after: lattice.spin(last_site),
    }
}

/// Metropolis sweep over the whole lattice.
pub fn metropolis_sweep(
    lattice: &mut Lattice,
    alpha: f64,
    beta: f64,
    rng: &mut impl RandomSource,
) -> SweepOutcome {
    sweep_generic(lattice, |lat, i| metropolis_at(lat, i, alpha, beta, rng))
}

/// Microcanonical sweep over the whole lattice.
pub fn microcanonical_sweep(lattice: &mut Lattice) -> SweepOutcome {
    sweep_generic(lattice, microcanonical_at)
}
