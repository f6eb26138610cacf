pub mod autocorrelation;
pub mod blocking;
pub mod results;
mod stats;

pub use autocorrelation::{sokal_tau, AutocorrAccum};
pub use blocking::{blocking_variance, BlockingAccum};
pub use results::{binder_cumulant, susceptibility, FamilyTally, ObservableSummary, RunSummary};
pub use stats::Statistics;
