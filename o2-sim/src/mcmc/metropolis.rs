use crate::error::Result;
use crate::geometry::{Coords, Lattice};
use crate::random::RandomSource;

use super::UpdateOutcome;

/// Metropolis move on the site at flat index `idx`; the index must be valid.
///
/// Draws one value for the trial angle and, only when the trial does not
/// lower the energy, a second one for the Boltzmann test.
#[inline]
pub(crate) fn metropolis_at(
    lattice: &mut Lattice,
    idx: usize,
    alpha: f64,
    beta: f64,
    rng: &mut impl RandomSource,
) -> UpdateOutcome {
    let field = lattice.neighbor_sum6_at(idx);

    let t = rng.next_uniform();
    let theta = (2.0 * t - 1.0) * alpha;

    let old = lattice.spin(idx);
    let trial = old.rotated(theta);

    let eng_change = -(trial.dot(field) - old.dot(field));
    let accept = eng_change < 0.0 || rng.next_uniform() <= (-beta * eng_change).exp();

    if accept {
        lattice.set_spin(idx, trial);
        UpdateOutcome::Accepted
    } else {
        UpdateOutcome::Rejected
    }
}

/// Single-site Metropolis update with a uniform trial rotation in
/// `[−alpha, alpha)` and acceptance `min(1, exp(−beta ΔE))`.
///
/// Returns `InvalidIndex` for coordinates outside the lattice, before any
/// draw is consumed.
pub fn metropolis(
    lattice: &mut Lattice,
    coords: Coords,
    alpha: f64,
    beta: f64,
    rng: &mut impl RandomSource,
) -> Result<UpdateOutcome> {
    let idx = lattice.checked_index(coords)?;
    Ok(metropolis_at(lattice, idx, alpha, beta, rng))
}
