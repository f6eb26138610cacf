use std::time::Instant;

use o2_sim::{DriveMode, Record, Seed, SimConfig, SweepDriver};

const L: usize = 32;
const N_SWEEPS: u64 = 200;

fn main() {
    for epsilon in [0.0, 0.2, 1.0] {
        let config = SimConfig {
            lattice_side: L,
            n_steps: N_SWEEPS,
            report_interval: 10,
            alpha: 1.0,
            beta: 0.45,
            epsilon,
            seed: Seed::Fixed(42),
            mode: DriveMode::FullSweep,
            ..Default::default()
        };

        let mut driver = SweepDriver::new(config).unwrap();
        let t0 = Instant::now();
        let summary = driver.run(&mut Vec::<Record>::new(), &|| {}).unwrap();
        let elapsed = t0.elapsed().as_secs_f64();

        let per_sweep = elapsed / N_SWEEPS as f64 * 1000.0;
        println!(
            "L={}  eps={:.1}  |  Total: {:.3} s  |  {:.3} ms/sweep  |  <E>={:.6}  <|m|>={:.6}",
            L,
            epsilon,
            elapsed,
            per_sweep,
            summary.observables.energy.unwrap_or(f64::NAN),
            summary.observables.abs_mag.unwrap_or(f64::NAN),
        );
    }
}
