pub mod spin;

pub use spin::{RenormalizationDrift, Spin, NORM_TOLERANCE};
