//! Error types for the O(2) engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to allocate lattice of side {side} ({sites} sites)")]
    Allocation { side: usize, sites: usize },

    #[error("invalid lattice side {0}, expected a positive integer")]
    InvalidLatticeSide(usize),

    #[error("invalid lattice indices ({i}, {j}, {k}) for lattice side {side}")]
    InvalidIndex {
        i: usize,
        j: usize,
        k: usize,
        side: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] validator::ValidationErrors),

    #[error("recorder failed: {0}")]
    Recorder(#[from] std::io::Error),

    #[error("simulation already finished")]
    Finished,
}

pub type Result<T> = std::result::Result<T, SimError>;
