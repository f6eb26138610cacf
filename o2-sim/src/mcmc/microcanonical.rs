use crate::error::Result;
use crate::geometry::{Coords, Lattice};

use super::UpdateOutcome;

/// Local fields with modulus below this are treated as degenerate.
pub const DEGENERATE_FIELD: f64 = 1e-13;

#[inline]
pub(crate) fn microcanonical_at(lattice: &mut Lattice, idx: usize) -> UpdateOutcome {
    let field = lattice.neighbor_sum6_at(idx);
    if field.norm() < DEGENERATE_FIELD {
        return UpdateOutcome::DegenerateField;
    }
    let reflected = lattice.spin(idx).reflected(field);
    lattice.set_spin(idx, reflected);
    UpdateOutcome::Accepted
}

/// Over-relaxation move: reflect the spin across its local field.
///
/// Conserves both the spin modulus and the bond energy with the neighbors,
/// and consumes no random draws. A vanishing field leaves the site unchanged
/// and reports [`UpdateOutcome::DegenerateField`].
pub fn microcanonical(lattice: &mut Lattice, coords: Coords) -> Result<UpdateOutcome> {
    let idx = lattice.checked_index(coords)?;
    Ok(microcanonical_at(lattice, idx))
}
