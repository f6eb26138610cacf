pub mod record;

pub use record::{
    decode_binary, BinaryRecorder, Record, Recorder, TextLayout, TextRecorder, BINARY_RECORD_LEN,
};

use tracing::{debug, info, warn};
use validator::Validate;

use crate::config::{DriveMode, InitialState, SimConfig};
use crate::error::{Result, SimError};
use crate::geometry::{Coords, Lattice};
use crate::mcmc::{self, SweepOutcome, UpdateFamily};
use crate::observables::{self, Observables};
use crate::random::{RandomSource, XoshiroSource};
use crate::spins::Spin;
use crate::statistics::{
    binder_cumulant, sokal_tau, susceptibility, AutocorrAccum, BlockingAccum, FamilyTally,
    ObservableSummary, RunSummary, Statistics,
};

/// Lifecycle of a [`SweepDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Constructed, no update performed yet.
    Idle,
    Running,
    /// All configured sweeps/steps performed.
    Finished,
}

/// Post-warmup accumulators fed from every emitted record.
struct Measurements {
    energy: Statistics,
    energy2: Statistics,
    abs_mag: Statistics,
    abs_mag2: Statistics,
    abs_mag4: Statistics,
    energy_blocks: BlockingAccum,
    abs_mag_blocks: BlockingAccum,
    /// Series 0 is E, series 1 is |m|.
    autocorr: Option<AutocorrAccum>,
}

impl Measurements {
    fn new(max_lag: Option<usize>, block_size: usize) -> Self {
        Self {
            energy: Statistics::new(1),
            energy2: Statistics::new(2),
            abs_mag: Statistics::new(1),
            abs_mag2: Statistics::new(2),
            abs_mag4: Statistics::new(4),
            energy_blocks: BlockingAccum::new(block_size),
            abs_mag_blocks: BlockingAccum::new(block_size),
            autocorr: max_lag.map(|k| AutocorrAccum::new(k, 2)),
        }
    }

    fn push(&mut self, obs: &Observables) {
        let e = obs.energy_per_site;
        let m = obs.abs_magnetization();
        self.energy.update(e);
        self.energy2.update(e);
        self.abs_mag.update(m);
        self.abs_mag2.update(m);
        self.abs_mag4.update(m);
        self.energy_blocks.push(e);
        self.abs_mag_blocks.push(m);
        if let Some(ac) = self.autocorr.as_mut() {
            ac.push(&[e, m]);
        }
    }

    /// `beta` and `n_sites` scale the susceptibility.
    fn summary(&self, beta: f64, n_sites: usize) -> ObservableSummary {
        let taus = self
            .autocorr
            .as_ref()
            .filter(|ac| ac.n_recorded() >= 2)
            .map(|ac| {
                ac.finish()
                    .iter()
                    .map(Vec::as_slice)
                    .map(sokal_tau)
                    .collect::<Vec<_>>()
            });
        let abs_mag = self.abs_mag.average();
        let abs_mag2 = self.abs_mag2.average();
        let abs_mag4 = self.abs_mag4.average();
        ObservableSummary {
            samples: self.energy.count,
            energy: self.energy.average(),
            energy2: self.energy2.average(),
            abs_mag,
            abs_mag2,
            abs_mag4,
            binder: abs_mag2.zip(abs_mag4).and_then(|(m2, m4)| binder_cumulant(m2, m4)),
            susceptibility: abs_mag
                .zip(abs_mag2)
                .map(|(m, m2)| susceptibility(beta, n_sites, m, m2)),
            energy_err: self.energy_blocks.std_error(),
            abs_mag_err: self.abs_mag_blocks.std_error(),
            energy_tau: taus.as_ref().map(|t| t[0]),
            abs_mag_tau: taus.as_ref().map(|t| t[1]),
        }
    }
}

/// Drives the Markov chain: per-sweep family choice, renormalization, the
/// single-site updates, and periodic measurements.
///
/// The driver exclusively owns the lattice and the random stream for its
/// whole lifetime. Every random draw happens in a fixed order, so a given
/// seed always reproduces the same chain.
pub struct SweepDriver<R: RandomSource = XoshiroSource> {
    config: SimConfig,
    lattice: Lattice,
    rng: R,
    state: DriverState,
    /// Completed sweeps (full-sweep mode) or steps (interleaved mode).
    units_done: u64,
    /// Family of the sweep in progress (interleaved mode).
    family: UpdateFamily,
    metropolis: FamilyTally,
    microcanonical: FamilyTally,
    drifted_sites: u64,
    measurements: Measurements,
}

impl SweepDriver<XoshiroSource> {
    /// Build a driver whose random stream is seeded from `config.seed`.
    pub fn new(config: SimConfig) -> Result<Self> {
        let (seed1, seed2) = config.seed.pair();
        info!(seed1, seed2, "seeding random source");
        Self::with_source(config, XoshiroSource::new(seed1, seed2))
    }
}

impl<R: RandomSource> SweepDriver<R> {
    /// Build a driver around an explicit random source.
    ///
    /// Validates the configuration, allocates the lattice, and initializes
    /// it. A random start consumes one draw per site.
    pub fn with_source(config: SimConfig, mut rng: R) -> Result<Self> {
        config.validate()?;

        let mut lattice = Lattice::new(config.lattice_side)?;
        match config.initial_state {
            InitialState::Random => lattice.randomize(&mut rng),
            InitialState::Aligned => lattice.fill(Spin::new(1.0, 0.0)),
        }

        info!(
            side = config.lattice_side,
            n_sites = lattice.n_sites(),
            mode = ?config.mode,
            initial_state = ?config.initial_state,
            alpha = config.alpha,
            beta = config.beta,
            epsilon = config.epsilon,
            "lattice allocated and initialized"
        );

        let measurements =
            Measurements::new(config.autocorrelation_max_lag, config.block_size);
        Ok(Self {
            config,
            lattice,
            rng,
            state: DriverState::Idle,
            units_done: 0,
            family: UpdateFamily::Microcanonical,
            metropolis: FamilyTally::default(),
            microcanonical: FamilyTally::default(),
            drifted_sites: 0,
            measurements,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Mutable access to the lattice, e.g. to prepare a custom start.
    pub fn lattice_mut(&mut self) -> &mut Lattice {
        &mut self.lattice
    }

    pub fn units_done(&self) -> u64 {
        self.units_done
    }

    pub fn measure(&self) -> Observables {
        observables::measure(&self.lattice)
    }

    /// Run every remaining sweep/step, calling `on_unit` once per unit
    /// (useful for progress bars).
    pub fn run(&mut self, recorder: &mut impl Recorder, on_unit: &dyn Fn()) -> Result<RunSummary> {
        if self.state == DriverState::Finished {
            return Err(SimError::Finished);
        }
        while self.state != DriverState::Finished {
            on_unit();
            self.advance(recorder)?;
        }
        Ok(self.summary())
    }

    /// Perform one sweep (full-sweep mode) or one single-site step
    /// (interleaved mode). Returns the record emitted by this unit, if any.
    pub fn advance(&mut self, recorder: &mut impl Recorder) -> Result<Option<Record>> {
        match self.state {
            DriverState::Finished => return Err(SimError::Finished),
            DriverState::Idle => {
                recorder.begin()?;
                self.state = DriverState::Running;
            }
            DriverState::Running => {}
        }

        let record = match self.config.mode {
            DriveMode::FullSweep => self.full_sweep(),
            DriveMode::Interleaved => self.interleaved_step()?,
        };
        if let Some(ref r) = record {
            recorder.record(r)?;
        }

        if self.units_done >= self.config.n_steps {
            self.state = DriverState::Finished;
            recorder.finish()?;
            self.log_summary();
        }
        Ok(record)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            mode: self.config.mode,
            units: self.units_done,
            metropolis: self.metropolis,
            microcanonical: self.microcanonical,
            drifted_sites: self.drifted_sites,
            observables: self
                .measurements
                .summary(self.config.beta, self.lattice.n_sites()),
        }
    }

    /// Bernoulli choice of the update family for the next sweep.
    fn choose_family(&mut self) -> UpdateFamily {
        let family = if self.rng.next_uniform() < self.config.epsilon {
            UpdateFamily::Metropolis
        } else {
            UpdateFamily::Microcanonical
        };
        debug!(unit = self.units_done, %family, "next L^3 updates");
        family
    }

    fn renormalize(&mut self) {
        let report = self.lattice.renormalize();
        if report.is_clean() {
            debug!(unit = self.units_done, "lattice renormalized");
        } else {
            self.drifted_sites += report.drifted as u64;
            warn!(
                unit = self.units_done,
                drifted = report.drifted,
                max_deviation = report.max_deviation,
                "renormalization left spins off the unit circle"
            );
        }
    }

    fn tally_mut(&mut self, family: UpdateFamily) -> &mut FamilyTally {
        match family {
            UpdateFamily::Metropolis => &mut self.metropolis,
            UpdateFamily::Microcanonical => &mut self.microcanonical,
        }
    }

    fn full_sweep(&mut self) -> Option<Record> {
        let family = self.choose_family();
        self.family = family;
        self.renormalize();

        let outcome: SweepOutcome = match family {
            UpdateFamily::Metropolis => mcmc::metropolis_sweep(
                &mut self.lattice,
                self.config.alpha,
                self.config.beta,
                &mut self.rng,
            ),
            UpdateFamily::Microcanonical => mcmc::microcanonical_sweep(&mut self.lattice),
        };
        let tally = self.tally_mut(family);
        tally.sweeps += 1;
        tally.record_sweep(&outcome);
        self.units_done += 1;

        let sweep = self.units_done;
        (sweep % self.config.report_interval == 0).then(|| {
            let site = self.lattice.coords(outcome.last_site);
            self.emit(
                sweep,
                sweep > self.config.warmup,
                site,
                outcome.last_before,
                outcome.last_after,
            )
        })
    }

    fn random_index(&mut self) -> usize {
        let side = self.lattice.side();
        ((side as f64 * self.rng.next_uniform()) as usize).min(side - 1)
    }

    fn interleaved_step(&mut self) -> Result<Option<Record>> {
        let step = self.units_done;
        if step % self.lattice.n_sites() as u64 == 0 {
            self.family = self.choose_family();
            self.tally_mut(self.family).sweeps += 1;
            self.renormalize();
        }

        let site: Coords = [
            self.random_index(),
            self.random_index(),
            self.random_index(),
        ];
        let before = self.lattice.get(site);
        let outcome = match self.family {
            UpdateFamily::Metropolis => mcmc::metropolis(
                &mut self.lattice,
                site,
                self.config.alpha,
                self.config.beta,
                &mut self.rng,
            )?,
            UpdateFamily::Microcanonical => mcmc::microcanonical(&mut self.lattice, site)?,
        };
        let family = self.family;
        self.tally_mut(family).record_update(outcome);
        self.units_done += 1;

        let after = self.lattice.get(site);
        Ok((step % self.config.report_interval == 0)
            .then(|| self.emit(step, step >= self.config.warmup, site, before, after)))
    }

    fn emit(
        &mut self,
        step: u64,
        accumulate: bool,
        site: Coords,
        spin_before: Spin,
        spin_after: Spin,
    ) -> Record {
        let obs = observables::measure(&self.lattice);
        if accumulate {
            self.measurements.push(&obs);
        }
        Record {
            step,
            site,
            spin_before,
            spin_after,
            magnetization: obs.magnetization,
            energy_per_site: obs.energy_per_site,
            family: self.family,
        }
    }

    fn log_summary(&self) {
        for (family, tally) in [
            (UpdateFamily::Metropolis, &self.metropolis),
            (UpdateFamily::Microcanonical, &self.microcanonical),
        ] {
            info!(
                %family,
                sweeps = tally.sweeps,
                attempted = tally.attempted,
                accepted = tally.accepted,
                acceptance = tally.acceptance().unwrap_or(0.0),
                mean_sweep_acceptance = tally.mean_sweep_acceptance().unwrap_or(0.0),
                "update family summary"
            );
        }
        info!(
            units = self.units_done,
            drifted_sites = self.drifted_sites,
            "simulation finished"
        );
    }
}
