//! Sequential vs. parallel particle stepping benchmark
//!
//! Runs the same sand/smoke/fire/water population through both engines for a
//! fixed number of 60 Hz frames and logs how long each one takes.

use particle_physics::{ParticleType, SimulationConfig};
use particle_simulation::{Comparison, ComparisonSettings, SimulationError, MAX_WORKERS};

const FRAME_COUNT: usize = 600;
const FRAME_DT: f32 = 1.0 / 60.0;
const REPORT_EVERY: usize = 120;

fn log_population(comparison: &Comparison) {
    let mut counts = [0usize; ParticleType::COUNT];
    for particle in comparison.sequential_buffer().particles() {
        if let Some(kind) = particle.particle_type() {
            counts[kind.index() as usize] += 1;
        }
    }

    log::info!("✓ Initialized {} particles", comparison.particle_count());
    for kind in ParticleType::ALL {
        log::info!("    {:<6} {}", kind.name(), counts[kind.index() as usize]);
    }
}

fn log_metrics(frame: usize, comparison: &Comparison) {
    let sequential = comparison.sequential_metrics();
    let parallel = comparison.parallel_metrics();
    let speedup = comparison
        .speedup()
        .map_or_else(|| "n/a".to_string(), |ratio| format!("{:.2}x", ratio));

    log::info!(
        "[frame {:>4}] sequential {:.2} ms (avg {:.2}, {} fps) | parallel x{} {:.2} ms (avg {:.2}, {} fps) | speedup {}",
        frame,
        sequential.ms,
        sequential.avg,
        sequential.fps,
        comparison.worker_count(),
        parallel.ms,
        parallel.avg,
        parallel.fps,
        speedup
    );
}

fn run() -> Result<(), SimulationError> {
    let settings = ComparisonSettings::default();
    let mut comparison = Comparison::new(settings)?;
    let config = SimulationConfig {
        num_particles: settings.particle_count,
        ..SimulationConfig::default()
    };
    log_population(&comparison);

    for frame in 1..=FRAME_COUNT {
        if frame == FRAME_COUNT / 2 {
            let workers = (comparison.worker_count() * 2).min(MAX_WORKERS);
            comparison.set_worker_count(workers)?;
        }

        comparison.frame(FRAME_DT, &config)?;

        if frame % REPORT_EVERY == 0 {
            log_metrics(frame, &comparison);
        }
    }

    log_metrics(FRAME_COUNT, &comparison);
    Ok(())
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting particle engine comparison...");

    if let Err(err) = run() {
        log::error!("Comparison aborted: {}", err);
        std::process::exit(1);
    }
}
