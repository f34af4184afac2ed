//! Engine and harness settings

use particle_physics::Bounds;
use std::time::Duration;

/// Smallest supported worker pool
pub const MIN_WORKERS: usize = 1;

/// Largest supported worker pool
pub const MAX_WORKERS: usize = 32;

/// Rolling history length, in frames
pub const HISTORY_LEN: usize = 200;

/// How often the FPS counters publish a new figure
pub const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Worker pool sizing and the bound on how long one parallel step may wait
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParallelSettings {
    pub worker_count: usize,
    /// Upper bound on waiting for every chunk of one step to come back
    pub timeout: Duration,
}

impl ParallelSettings {
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Self::default()
        }
    }

    pub fn is_valid_worker_count(count: usize) -> bool {
        (MIN_WORKERS..=MAX_WORKERS).contains(&count)
    }
}

impl Default for ParallelSettings {
    fn default() -> Self {
        // Twice the core count, kept within [4, 16]
        let worker_count = (num_cpus::get() * 2).clamp(4, 16);
        Self {
            worker_count,
            timeout: Duration::from_secs(2),
        }
    }
}

/// Everything the side-by-side harness needs to build its buffers and pool
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComparisonSettings {
    pub bounds: Bounds,
    pub particle_count: usize,
    pub parallel: ParallelSettings,
    /// Fixed seed for reproducible populations; `None` draws from the thread RNG
    pub seed: Option<u64>,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            particle_count: 8000,
            parallel: ParallelSettings::default(),
            seed: None,
        }
    }
}
