pub mod lattice;

pub use lattice::{Coords, Lattice, RenormalizationReport, N_DIMS};
