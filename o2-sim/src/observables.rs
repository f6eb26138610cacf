use serde::{Deserialize, Serialize};

use crate::geometry::Lattice;
use crate::spins::Spin;

/// Snapshot of the lattice-wide observables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observables {
    /// ⟨s⟩, the mean spin vector.
    pub magnetization: Spin,
    /// Energy per site with J = 1.
    pub energy_per_site: f64,
}

impl Observables {
    /// |⟨s⟩|, the O(2) order parameter.
    pub fn abs_magnetization(&self) -> f64 {
        self.magnetization.norm()
    }
}

pub fn measure(lattice: &Lattice) -> Observables {
    Observables {
        magnetization: magnetization(lattice),
        energy_per_site: energy_per_site(lattice),
    }
}

/// Component-wise mean spin over all sites.
pub fn magnetization(lattice: &Lattice) -> Spin {
    let mut sum = Spin::ZERO;
    for &s in lattice.spins() {
        sum += s;
    }
    let n = lattice.n_sites() as f64;
    Spin::new(sum.sx / n, sum.sy / n)
}

/// Energy per site of H = −Σ⟨ij⟩ sᵢ·sⱼ.
///
/// Each site is paired with its three forward neighbors only, so every
/// undirected bond is counted exactly once.
pub fn energy_per_site(lattice: &Lattice) -> f64 {
    let n_sites = lattice.n_sites();
    let mut total = 0.0f64;
    for i in 0..n_sites {
        let si = lattice.spin(i);
        total -= si.dot(lattice.forward_neighbor_sum3_at(i));
    }
    total / n_sites as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::XoshiroSource;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_aligned_energy_independent_of_size() {
        for side in 2..=6 {
            for a in [1.0, 0.5, -2.0, 12.0] {
                let lat = Lattice::filled(side, Spin::new(a, 0.0)).unwrap();
                assert_eq!(energy_per_site(&lat), -3.0 * a * a, "side={side} a={a}");
            }
        }
    }

    #[test]
    fn test_energy_l10_twelve() {
        let lat = Lattice::filled(10, Spin::new(12.0, 0.0)).unwrap();
        assert_abs_diff_eq!(energy_per_site(&lat), -432.0, epsilon = 1e-11);
    }

    #[test]
    fn test_uniform_magnetization() {
        for side in 1..=5 {
            let s = Spin::new(0.75, -0.5);
            let lat = Lattice::filled(side, s).unwrap();
            assert_eq!(magnetization(&lat), s, "side={side}");
        }
    }

    #[test]
    fn test_antialigned_planes_cancel() {
        // Alternate the sign on the i axis: every bond along i is -1, the
        // rest +1, and the magnetization vanishes.
        let side = 4;
        let mut lat = Lattice::new(side).unwrap();
        for idx in 0..lat.n_sites() {
            let [i, _, _] = lat.coords(idx);
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            lat.set_spin(idx, Spin::new(sign, 0.0));
        }
        let obs = measure(&lat);
        assert_eq!(obs.magnetization, Spin::ZERO);
        assert_eq!(obs.abs_magnetization(), 0.0);
        // Per site: +1 (i bond) - 1 - 1 = -1.
        assert_eq!(obs.energy_per_site, -1.0);
    }

    #[test]
    fn test_random_energy_bounds() {
        let mut lat = Lattice::new(5).unwrap();
        lat.randomize(&mut XoshiroSource::new(3, 140));
        let e = energy_per_site(&lat);
        assert!((-3.0..=3.0).contains(&e));
        assert!(magnetization(&lat).norm() <= 1.0);
    }
}
