/// Streaming blocking analysis of one scalar series.
///
/// Values are averaged in consecutive blocks of `block_size`; only the block
/// means are kept. A trailing partial block is left out of the variance.
#[derive(Debug, Clone)]
pub struct BlockingAccum {
    block_size: usize,
    block_sum: f64,
    block_fill: usize,
    block_means: Vec<f64>,
}

impl BlockingAccum {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
            block_sum: 0.0,
            block_fill: 0,
            block_means: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.block_sum += value;
        self.block_fill += 1;
        if self.block_fill == self.block_size {
            self.block_means.push(self.block_sum / self.block_size as f64);
            self.block_sum = 0.0;
            self.block_fill = 0;
        }
    }

    pub fn n_blocks(&self) -> usize {
        self.block_means.len()
    }

    /// Variance of the mean estimated from the block means,
    /// `Σ (b − b̄)² / (n_b (n_b − 1))`. `None` with fewer than two blocks.
    pub fn variance(&self) -> Option<f64> {
        variance_of_mean(&self.block_means)
    }

    /// Square root of [`BlockingAccum::variance`].
    pub fn std_error(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

fn variance_of_mean(block_means: &[f64]) -> Option<f64> {
    let n = block_means.len();
    if n <= 1 {
        return None;
    }
    let mean = block_means.iter().sum::<f64>() / n as f64;
    let sq: f64 = block_means.iter().map(|b| (b - mean) * (b - mean)).sum();
    Some(sq / (n * (n - 1)) as f64)
}

/// Blocked variance of the mean of `data` for a single block size.
pub fn blocking_variance(data: &[f64], block_size: usize) -> Option<f64> {
    let mut acc = BlockingAccum::new(block_size);
    for &v in data {
        acc.push(v);
    }
    acc.variance()
}
