//! Markov-chain Monte Carlo sampler for the classical O(2) (XY) model on a
//! periodic cubic lattice.
//!
//! A [`SweepDriver`] owns the [`Lattice`] and the random stream, mixes
//! Metropolis and microcanonical (over-relaxation) sweeps, and hands periodic
//! [`Record`]s to a [`Recorder`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod observables;
pub mod random;
pub mod simulation;
pub mod spins;
pub mod statistics;

pub use config::{DriveMode, InitialState, Seed, SimConfig};
pub use error::{Result, SimError};
pub use geometry::{Coords, Lattice};
pub use mcmc::{metropolis, microcanonical, UpdateFamily, UpdateOutcome};
pub use observables::{measure, Observables};
pub use random::{RandomSource, XoshiroSource};
pub use simulation::{
    BinaryRecorder, DriverState, Record, Recorder, SweepDriver, TextLayout, TextRecorder,
};
pub use spins::Spin;
pub use statistics::{FamilyTally, ObservableSummary, RunSummary};
