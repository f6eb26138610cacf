/// Streaming autocorrelation accumulator using a ring buffer.
///
/// Computes the normalized autocorrelation function Γ(δ) of several scalar
/// time series (one per observable) without storing the full history.
/// Memory is O(max_lag × n_series).
#[derive(Debug, Clone)]
pub struct AutocorrAccum {
    max_lag: usize,
    n_series: usize,
    /// Ring buffer of the last `max_lag + 1` values, shape [n_series][max_lag + 1].
    ring: Vec<Vec<f64>>,
    /// Running sum of o, shape [n_series].
    sum_o: Vec<f64>,
    /// Running sum of o², shape [n_series].
    sum_o2: Vec<f64>,
    /// Running sum of o(t)·o(t−δ), shape [n_series][max_lag+1].
    sum_prod: Vec<Vec<f64>>,
    /// Total number of values pushed so far.
    n_recorded: usize,
    /// Current position in the ring buffer.
    ring_pos: usize,
}

impl AutocorrAccum {
    pub fn new(max_lag: usize, n_series: usize) -> Self {
        let len = max_lag + 1;
        Self {
            max_lag,
            n_series,
            ring: (0..n_series).map(|_| vec![0.0; len]).collect(),
            sum_o: vec![0.0; n_series],
            sum_o2: vec![0.0; n_series],
            sum_prod: (0..n_series).map(|_| vec![0.0; len]).collect(),
            n_recorded: 0,
            ring_pos: 0,
        }
    }

    pub fn n_recorded(&self) -> usize {
        self.n_recorded
    }

    #[allow(clippy::needless_range_loop)]
    pub fn push(&mut self, values: &[f64]) {
        let len = self.max_lag + 1;
        let pos = self.ring_pos;
        let n_back = self.n_recorded.min(self.max_lag);
        for t in 0..self.n_series {
            let o = values[t];
            self.ring[t][pos] = o;
            self.sum_o[t] += o;
            self.sum_o2[t] += o * o;

            for delta in 0..=n_back {
                let idx = (pos + len - delta) % len;
                self.sum_prod[t][delta] += o * self.ring[t][idx];
            }
        }
        self.n_recorded += 1;
        self.ring_pos = (pos + 1) % len;
    }

    /// Γ(δ) for δ = 0..=max_lag, one row per series.
    pub fn finish(&self) -> Vec<Vec<f64>> {
        let m = self.n_recorded as f64;
        (0..self.n_series)
            .map(|t| {
                let mean = self.sum_o[t] / m;
                let var = self.sum_o2[t] / m - mean * mean;
                (0..=self.max_lag)
                    .map(|delta| {
                        let count = self.n_recorded.saturating_sub(delta) as f64;
                        if count <= 0.0 || var <= 0.0 {
                            return if delta == 0 { 1.0 } else { 0.0 };
                        }
                        (self.sum_prod[t][delta] / count - mean * mean) / var
                    })
                    .collect()
            })
            .collect()
    }
}

/// Integrated autocorrelation time with Sokal's automatic window (W ≥ 5τ).
pub fn sokal_tau(gamma: &[f64]) -> f64 {
    let mut tau = 0.5;
    for (w, &g) in gamma.iter().enumerate().skip(1) {
        tau += g;
        if w as f64 >= 5.0 * tau {
            return tau;
        }
    }
    tau
}
