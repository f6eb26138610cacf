/// Running mean of `x^power` over a stream of scalar samples.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub count: u64,
    pub aggregate: f64,
    pub power: i32,
}

impl Statistics {
    pub fn new(power: i32) -> Self {
        Self {
            count: 0,
            aggregate: 0.0,
            power,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.count += 1;
        self.aggregate += if self.power == 1 {
            value
        } else {
            value.powi(self.power)
        };
    }

    /// Mean of the accumulated powers, `None` before the first sample.
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.aggregate / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moments() {
        let mut m1 = Statistics::new(1);
        let mut m2 = Statistics::new(2);
        assert_eq!(m1.average(), None);
        for v in [1.0, -2.0, 3.0, 4.0] {
            m1.update(v);
            m2.update(v);
        }
        assert_eq!(m1.average(), Some(1.5));
        assert_eq!(m2.average(), Some(7.5));
    }
}
