use std::f64::consts::TAU;

use crate::error::{Result, SimError};
use crate::random::RandomSource;
use crate::spins::Spin;

/// Number of spatial dimensions of the cubic lattice.
pub const N_DIMS: usize = 3;

/// Lattice coordinates `[i, j, k]`.
pub type Coords = [usize; N_DIMS];

/// Periodic L×L×L cubic lattice of [`Spin`]s with a precomputed neighbor table.
///
/// Sites are stored in row-major (C) order, `i` outermost and `k` innermost,
/// in one contiguous buffer owned by the lattice.
pub struct Lattice {
    /// Extent along each axis.
    side: usize,
    /// Row-major strides: `[L², L, 1]`.
    strides: [usize; N_DIMS],
    /// Total number of sites, `L³`.
    n_sites: usize,
    spins: Vec<Spin>,
    /// Precomputed neighbor table, length `n_sites * N_DIMS * 2`.
    /// Layout: `neighbors[(i * N_DIMS + d) * 2 + dir]` where `dir = 0`
    /// is forward (+1) and `dir = 1` is backward (−1).
    neighbors: Vec<usize>,
}

/// Outcome of renormalizing every site of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenormalizationReport {
    /// Sites whose modulus stayed outside tolerance after normalization.
    pub drifted: usize,
    /// Largest `| |s| − 1 |` among drifted sites.
    pub max_deviation: f64,
}

impl RenormalizationReport {
    pub fn is_clean(&self) -> bool {
        self.drifted == 0
    }
}

fn try_alloc<T: Clone>(len: usize, fill: T, side: usize, sites: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| SimError::Allocation { side, sites })?;
    buf.resize(len, fill);
    Ok(buf)
}

impl Lattice {
    /// Allocate an L×L×L lattice with every spin set to zero.
    ///
    /// Allocation is all-or-nothing: if either the spin buffer or the
    /// neighbor table cannot be reserved, whatever was already reserved is
    /// dropped before the error is returned.
    pub fn new(side: usize) -> Result<Self> {
        if side == 0 {
            return Err(SimError::InvalidLatticeSide(side));
        }
        let n_sites = side
            .checked_mul(side)
            .and_then(|s| s.checked_mul(side))
            .ok_or(SimError::Allocation {
                side,
                sites: usize::MAX,
            })?;
        let table_len = n_sites
            .checked_mul(N_DIMS * 2)
            .ok_or(SimError::Allocation {
                side,
                sites: n_sites,
            })?;

        let spins = try_alloc(n_sites, Spin::ZERO, side, n_sites)?;
        let mut neighbors = try_alloc(table_len, 0usize, side, n_sites)?;

        let strides = [side * side, side, 1];
        for idx in 0..n_sites {
            for d in 0..N_DIMS {
                let stride = strides[d];
                let coord = (idx / stride) % side;
                // Strip this axis' contribution, then add back the wrapped coordinate.
                let base = idx - coord * stride;
                let fwd = (coord + 1) % side;
                let bwd = (coord + side - 1) % side;
                neighbors[(idx * N_DIMS + d) * 2] = base + fwd * stride;
                neighbors[(idx * N_DIMS + d) * 2 + 1] = base + bwd * stride;
            }
        }

        tracing::debug!(side, n_sites, "allocated lattice");

        Ok(Self {
            side,
            strides,
            n_sites,
            spins,
            neighbors,
        })
    }

    /// Allocate a lattice with every site set to `spin`.
    pub fn filled(side: usize, spin: Spin) -> Result<Self> {
        let mut lattice = Self::new(side)?;
        lattice.fill(spin);
        Ok(lattice)
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    #[inline]
    pub fn contains(&self, [i, j, k]: Coords) -> bool {
        i < self.side && j < self.side && k < self.side
    }

    /// Return `Ok(flat index)` for in-range coordinates, `InvalidIndex` otherwise.
    pub fn checked_index(&self, coords: Coords) -> Result<usize> {
        if self.contains(coords) {
            Ok(self.flat_index(coords))
        } else {
            let [i, j, k] = coords;
            Err(SimError::InvalidIndex {
                i,
                j,
                k,
                side: self.side,
            })
        }
    }

    /// Row-major flat index. Coordinates are not validated.
    #[inline]
    pub fn flat_index(&self, [i, j, k]: Coords) -> usize {
        i * self.strides[0] + j * self.strides[1] + k * self.strides[2]
    }

    #[inline]
    pub fn coords(&self, flat_idx: usize) -> Coords {
        [
            flat_idx / self.strides[0],
            (flat_idx / self.strides[1]) % self.side,
            flat_idx % self.side,
        ]
    }

    /// Panics if `coords` lies outside the lattice.
    #[inline]
    pub fn get(&self, coords: Coords) -> Spin {
        self.spins[self.flat_index(coords)]
    }

    /// Panics if `coords` lies outside the lattice.
    #[inline]
    pub fn set(&mut self, coords: Coords, spin: Spin) {
        let idx = self.flat_index(coords);
        self.spins[idx] = spin;
    }

    #[inline]
    pub fn spin(&self, flat_idx: usize) -> Spin {
        self.spins[flat_idx]
    }

    #[inline]
    pub fn set_spin(&mut self, flat_idx: usize, spin: Spin) {
        self.spins[flat_idx] = spin;
    }

    pub fn spins(&self) -> &[Spin] {
        &self.spins
    }

    /// Return the neighbor of site `flat_idx` along axis `dim`.
    /// `forward = true` means +1, `forward = false` means −1.
    #[inline]
    pub fn neighbor(&self, flat_idx: usize, dim: usize, forward: bool) -> usize {
        self.neighbors[(flat_idx * N_DIMS + dim) * 2 + (!forward as usize)]
    }

    /// Vector sum of all six periodic neighbors of `flat_idx`.
    #[inline]
    pub fn neighbor_sum6_at(&self, flat_idx: usize) -> Spin {
        let table = &self.neighbors[flat_idx * N_DIMS * 2..(flat_idx + 1) * N_DIMS * 2];
        let mut sum = Spin::ZERO;
        for &j in table {
            sum += self.spins[j];
        }
        sum
    }

    /// Vector sum of the three forward (+1) neighbors of `flat_idx`.
    #[inline]
    pub fn forward_neighbor_sum3_at(&self, flat_idx: usize) -> Spin {
        let mut sum = Spin::ZERO;
        for d in 0..N_DIMS {
            sum += self.spins[self.neighbor(flat_idx, d, true)];
        }
        sum
    }

    pub fn neighbor_sum6(&self, coords: Coords) -> Spin {
        self.neighbor_sum6_at(self.flat_index(coords))
    }

    pub fn forward_neighbor_sum3(&self, coords: Coords) -> Spin {
        self.forward_neighbor_sum3_at(self.flat_index(coords))
    }

    pub fn fill(&mut self, spin: Spin) {
        self.spins.fill(spin);
    }

    /// Hot start: each site gets a uniformly distributed angle, one draw per
    /// site in row-major order.
    pub fn randomize(&mut self, rng: &mut impl RandomSource) {
        for s in self.spins.iter_mut() {
            *s = Spin::from_angle(TAU * rng.next_uniform());
        }
    }

    /// Project every site back onto the unit circle.
    pub fn renormalize(&mut self) -> RenormalizationReport {
        let mut report = RenormalizationReport::default();
        for s in self.spins.iter_mut() {
            if let Err(drift) = s.normalize() {
                report.drifted += 1;
                report.max_deviation = report.max_deviation.max(drift.deviation());
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::XoshiroSource;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_3d_neighbors() {
        let lat = Lattice::new(3).unwrap();
        assert_eq!(lat.n_sites(), 27);
        assert_eq!(lat.strides, [9, 3, 1]);

        // Site 0 = (0,0,0)
        assert_eq!(lat.neighbor(0, 0, true), 9); // (1,0,0)
        assert_eq!(lat.neighbor(0, 1, true), 3); // (0,1,0)
        assert_eq!(lat.neighbor(0, 2, true), 1); // (0,0,1)

        // Backward from (0,0,0) wraps to side - 1
        assert_eq!(lat.neighbor(0, 0, false), 18); // (2,0,0)
        assert_eq!(lat.neighbor(0, 1, false), 6); // (0,2,0)
        assert_eq!(lat.neighbor(0, 2, false), 2); // (0,0,2)

        // Site 26 = (2,2,2): all forward neighbors wrap
        assert_eq!(lat.neighbor(26, 0, true), 8); // (0,2,2)
        assert_eq!(lat.neighbor(26, 1, true), 20); // (2,0,2)
        assert_eq!(lat.neighbor(26, 2, true), 24); // (2,2,0)
    }

    #[test]
    fn test_coords_roundtrip() {
        let lat = Lattice::new(4).unwrap();
        for idx in 0..lat.n_sites() {
            assert_eq!(lat.flat_index(lat.coords(idx)), idx);
        }
        assert_eq!(lat.coords(27), [1, 2, 3]);
    }

    #[test]
    fn test_side_one_is_its_own_neighbor() {
        let lat = Lattice::filled(1, Spin::new(0.5, 0.25)).unwrap();
        assert_eq!(lat.neighbor_sum6([0, 0, 0]), Spin::new(3.0, 1.5));
        assert_eq!(lat.forward_neighbor_sum3([0, 0, 0]), Spin::new(1.5, 0.75));
    }

    #[test]
    fn test_zero_side_rejected() {
        assert!(matches!(
            Lattice::new(0),
            Err(SimError::InvalidLatticeSide(0))
        ));
    }

    #[test]
    fn test_overflowing_side_is_allocation_error() {
        assert!(matches!(
            Lattice::new(usize::MAX / 2),
            Err(SimError::Allocation { .. })
        ));
    }

    #[test]
    fn test_get_set() {
        let mut lat = Lattice::filled(5, Spin::new(1.0, 1.0)).unwrap();
        assert!(lat.spins().iter().all(|&s| s == Spin::new(1.0, 1.0)));
        lat.set([4, 0, 2], Spin::new(-1.0, 0.0));
        assert_eq!(lat.get([4, 0, 2]), Spin::new(-1.0, 0.0));
        assert_eq!(lat.spin(lat.flat_index([4, 0, 2])), Spin::new(-1.0, 0.0));
    }

    #[test]
    fn test_neighbor_sums() {
        let mut lat = Lattice::filled(4, Spin::ZERO).unwrap();
        // Mark the six neighbors of (0,0,0) with distinct x components.
        lat.set([1, 0, 0], Spin::new(1.0, 0.0));
        lat.set([3, 0, 0], Spin::new(2.0, 0.0));
        lat.set([0, 1, 0], Spin::new(4.0, 0.0));
        lat.set([0, 3, 0], Spin::new(8.0, 0.0));
        lat.set([0, 0, 1], Spin::new(16.0, 0.0));
        lat.set([0, 0, 3], Spin::new(32.0, 0.0));
        // Not a neighbor.
        lat.set([1, 1, 0], Spin::new(64.0, 0.0));

        assert_eq!(lat.neighbor_sum6([0, 0, 0]), Spin::new(63.0, 0.0));
        assert_eq!(lat.forward_neighbor_sum3([0, 0, 0]), Spin::new(21.0, 0.0));
    }

    #[test]
    fn test_checked_index() {
        let lat = Lattice::new(3).unwrap();
        assert_eq!(lat.checked_index([2, 2, 2]).unwrap(), 26);
        assert!(matches!(
            lat.checked_index([0, 3, 0]),
            Err(SimError::InvalidIndex {
                i: 0,
                j: 3,
                k: 0,
                side: 3
            })
        ));
    }

    #[test]
    fn test_randomize_and_renormalize() {
        let mut lat = Lattice::new(6).unwrap();
        let mut rng = XoshiroSource::new(7, 144);
        lat.randomize(&mut rng);
        for s in lat.spins() {
            assert_abs_diff_eq!(s.norm(), 1.0, epsilon = 1e-15);
        }

        let scaled: Vec<Spin> = lat.spins().iter().map(|&s| s * 3.5).collect();
        for (idx, s) in scaled.into_iter().enumerate() {
            lat.set_spin(idx, s);
        }
        let report = lat.renormalize();
        assert!(report.is_clean(), "{report:?}");
        for s in lat.spins() {
            assert!((s.norm() - 1.0).abs() < 1e-15);
        }
    }
}
