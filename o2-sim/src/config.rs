use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// How the driver organizes single-site updates into sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriveMode {
    /// Every sweep visits all sites in row-major order; `n_steps` counts sweeps.
    #[default]
    FullSweep,
    /// Every step updates one randomly chosen site; `n_steps` counts steps.
    Interleaved,
}

impl TryFrom<&str> for DriveMode {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "full-sweep" => Ok(Self::FullSweep),
            "interleaved" => Ok(Self::Interleaved),
            _ => Err(format!(
                "unknown drive mode '{s}', expected 'full-sweep' or 'interleaved'"
            )),
        }
    }
}

/// Starting configuration of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialState {
    /// Independent uniform angles (hot start).
    #[default]
    Random,
    /// Every spin along +x (cold start).
    Aligned,
}

impl TryFrom<&str> for InitialState {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "random" => Ok(Self::Random),
            "aligned" => Ok(Self::Aligned),
            _ => Err(format!(
                "unknown initial state '{s}', expected 'random' or 'aligned'"
            )),
        }
    }
}

/// Seed of the random stream: a fixed value or the wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seed {
    Fixed(u64),
    Time,
}

/// Offset between the two seeds handed to the random source.
pub const SECOND_SEED_OFFSET: u64 = 137;

impl Seed {
    /// Resolve to a concrete value; `Time` uses seconds since the Unix epoch.
    pub fn resolve(self) -> u64 {
        match self {
            Self::Fixed(seed) => seed,
            Self::Time => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
        }
    }

    /// The `(seed1, seed2)` pair used to initialize the random source.
    pub fn pair(self) -> (u64, u64) {
        let seed1 = self.resolve();
        (seed1, seed1.wrapping_add(SECOND_SEED_OFFSET))
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

impl TryFrom<&str> for Seed {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        if s == "time" {
            return Ok(Self::Time);
        }
        s.parse::<u64>()
            .map(Self::Fixed)
            .map_err(|_| format!("invalid seed '{s}', expected 'time' or a non-negative integer"))
    }
}

fn validate_sim_config(cfg: &SimConfig) -> Result<(), ValidationError> {
    if !cfg.alpha.is_finite() {
        return Err(ValidationError::new("alpha must be finite"));
    }
    if !(0.0..=1.0).contains(&cfg.epsilon) {
        return Err(ValidationError::new("epsilon must be in [0, 1]"));
    }
    if !cfg.beta.is_finite() || cfg.beta < 0.0 {
        return Err(ValidationError::new("beta must be finite and >= 0"));
    }
    if cfg.warmup > cfg.n_steps {
        return Err(ValidationError::new("warmup must be <= n_steps"));
    }
    if cfg.autocorrelation_max_lag == Some(0) {
        return Err(ValidationError::new("autocorrelation_max_lag must be >= 1"));
    }
    Ok(())
}

/// Run parameters consumed by [`crate::SweepDriver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_sim_config"))]
pub struct SimConfig {
    /// Side `L` of the cubic lattice.
    #[validate(range(min = 1))]
    pub lattice_side: usize,
    /// Total sweeps (full-sweep mode) or single-site steps (interleaved mode).
    #[validate(range(min = 1))]
    pub n_steps: u64,
    /// Emit a record every this many sweeps/steps.
    #[validate(range(min = 1))]
    pub report_interval: u64,
    /// Half-width of the Metropolis trial rotation, in radians.
    pub alpha: f64,
    /// Inverse temperature.
    pub beta: f64,
    /// Probability that a sweep uses Metropolis instead of microcanonical moves.
    #[validate(range(min = 0.0, max = 1.0))]
    pub epsilon: f64,
    #[serde(default)]
    pub seed: Seed,
    #[serde(default)]
    pub mode: DriveMode,
    #[serde(default)]
    pub initial_state: InitialState,
    /// Sweeps/steps excluded from the running statistics.
    #[serde(default)]
    pub warmup: u64,
    /// Largest lag of the streaming autocorrelation, in records.
    #[serde(default)]
    pub autocorrelation_max_lag: Option<usize>,
    /// Records per block for the blocked standard errors.
    #[serde(default = "default_block_size")]
    #[validate(range(min = 1))]
    pub block_size: usize,
}

fn default_block_size() -> usize {
    1
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            lattice_side: 8,
            n_steps: 1000,
            report_interval: 1,
            alpha: 1.0,
            beta: 0.45,
            epsilon: 0.2,
            seed: Seed::default(),
            mode: DriveMode::default(),
            initial_state: InitialState::default(),
            warmup: 0,
            autocorrelation_max_lag: None,
            block_size: default_block_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let bad = [
            SimConfig {
                lattice_side: 0,
                ..Default::default()
            },
            SimConfig {
                report_interval: 0,
                ..Default::default()
            },
            SimConfig {
                epsilon: 1.5,
                ..Default::default()
            },
            SimConfig {
                epsilon: f64::NAN,
                ..Default::default()
            },
            SimConfig {
                block_size: 0,
                ..Default::default()
            },
            SimConfig {
                beta: f64::NAN,
                ..Default::default()
            },
            SimConfig {
                beta: -0.1,
                ..Default::default()
            },
            SimConfig {
                alpha: f64::INFINITY,
                ..Default::default()
            },
            SimConfig {
                warmup: 2000,
                ..Default::default()
            },
            SimConfig {
                autocorrelation_max_lag: Some(0),
                ..Default::default()
            },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn test_epsilon_bounds_inclusive() {
        for epsilon in [0.0, 1.0] {
            let cfg = SimConfig {
                epsilon,
                ..Default::default()
            };
            assert!(cfg.validate().is_ok());
        }
    }

    #[test]
    fn test_seed_parsing() {
        assert_eq!(Seed::try_from("time"), Ok(Seed::Time));
        assert_eq!(Seed::try_from("42"), Ok(Seed::Fixed(42)));
        assert!(Seed::try_from("-3").is_err());
        assert!(Seed::try_from("soon").is_err());
        assert_eq!(Seed::Fixed(42).pair(), (42, 179));
        assert_eq!(Seed::Fixed(u64::MAX).pair(), (u64::MAX, 136));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(DriveMode::try_from("full-sweep"), Ok(DriveMode::FullSweep));
        assert_eq!(DriveMode::try_from("interleaved"), Ok(DriveMode::Interleaved));
        assert!(DriveMode::try_from("gibbs").is_err());
        assert_eq!(InitialState::try_from("aligned"), Ok(InitialState::Aligned));
        assert!(InitialState::try_from("cold").is_err());
    }

    #[test]
    fn test_json_config() {
        let json = r#"{
            "lattice_side": 6,
            "n_steps": 500,
            "report_interval": 10,
            "alpha": 0.8,
            "beta": 0.45,
            "epsilon": 0.1,
            "seed": "time",
            "mode": "interleaved"
        }"#;
        let cfg: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.seed, Seed::Time);
        assert_eq!(cfg.mode, DriveMode::Interleaved);
        assert_eq!(cfg.initial_state, InitialState::Random);
        assert_eq!(cfg.warmup, 0);
        assert_eq!(cfg.block_size, 1);
        assert!(cfg.validate().is_ok());

        let back: SimConfig = serde_json::from_str(&serde_json::to_string(&cfg).unwrap()).unwrap();
        assert_eq!(back, cfg);

        let fixed: SimConfig =
            serde_json::from_str(&json.replace(r#""time""#, r#"{"fixed": 7}"#)).unwrap();
        assert_eq!(fixed.seed, Seed::Fixed(7));
    }
}
