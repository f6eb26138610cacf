use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::{SplitMix64, Xoshiro256StarStar};

/// Sequential stream of uniform draws in `[0, 1)`.
///
/// The engine makes exactly one call per stochastic decision, so two sources
/// seeded identically reproduce the same Markov chain.
pub trait RandomSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        (**self).next_uniform()
    }
}

/// Default source: xoshiro256** seeded from two 64-bit seeds.
#[derive(Clone, Debug)]
pub struct XoshiroSource {
    rng: Xoshiro256StarStar,
}

impl XoshiroSource {
    /// Each seed drives its own SplitMix64 stream; the two streams are
    /// interleaved into the 256-bit xoshiro state.
    pub fn new(seed1: u64, seed2: u64) -> Self {
        let mut mix1 = SplitMix64::seed_from_u64(seed1);
        let mut mix2 = SplitMix64::seed_from_u64(seed2);
        let mut seed = [0u8; 32];
        for (w, chunk) in seed.chunks_exact_mut(8).enumerate() {
            let word = if w % 2 == 0 {
                mix1.next_u64()
            } else {
                mix2.next_u64()
            };
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Self {
            rng: Xoshiro256StarStar::from_seed(seed),
        }
    }
}

impl RandomSource for XoshiroSource {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Used to force specific trial angles and acceptance draws in tests.
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct ScriptedSource {
    values: Vec<f64>,
    pos: usize,
    calls: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "scripted source needs at least one value");
        for &v in &values {
            assert!((0.0..1.0).contains(&v), "scripted value {v} outside [0, 1)");
        }
        Self {
            values,
            pos: 0,
            calls: 0,
        }
    }

    /// Number of draws consumed so far.
    pub(crate) fn calls(&self) -> usize {
        self.calls
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        let v = self.values[self.pos];
        self.pos = (self.pos + 1) % self.values.len();
        self.calls += 1;
        v
    }
}
