//! Side-by-side harness: the same population stepped by both engines
//!
//! Both buffers start from one master population and are timed every frame.
//! They diverge over time through the per-engine turbulence draws; only the
//! timings are meant to be compared.

use crate::error::SimulationError;
use crate::history::{FpsCounter, PerformanceHistory, PerformanceMetrics};
use crate::parallel::ParallelEngine;
use crate::params::ComparisonSettings;
use crate::sequential::step_sequential;
use particle_physics::{Bounds, ParticleBuffer, SimulationConfig, MAX_DT};
use std::time::Instant;

/// Timings for one frame, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// The clamped step actually applied
    pub dt: f32,
    pub sequential_ms: f32,
    pub parallel_ms: f32,
}

pub struct Comparison {
    settings: ComparisonSettings,
    sequential: ParticleBuffer,
    parallel: ParticleBuffer,
    engine: ParallelEngine,
    sequential_history: PerformanceHistory,
    parallel_history: PerformanceHistory,
    sequential_fps: FpsCounter,
    parallel_fps: FpsCounter,
}

/// Clamp a raw frame delta to `[0, MAX_DT]`; non-finite deltas become 0
pub fn clamp_dt(raw_dt: f32) -> f32 {
    if raw_dt.is_finite() {
        raw_dt.clamp(0.0, MAX_DT)
    } else {
        0.0
    }
}

impl Comparison {
    pub fn new(settings: ComparisonSettings) -> Result<Self, SimulationError> {
        let engine = ParallelEngine::new(settings.parallel)?;
        let now = Instant::now();

        let mut comparison = Self {
            settings,
            sequential: ParticleBuffer::default(),
            parallel: ParticleBuffer::default(),
            engine,
            sequential_history: PerformanceHistory::new(),
            parallel_history: PerformanceHistory::new(),
            sequential_fps: FpsCounter::new(now),
            parallel_fps: FpsCounter::new(now),
        };
        comparison.reset();
        Ok(comparison)
    }

    /// Draw a fresh master population into both buffers and clear all timings
    pub fn reset(&mut self) {
        let count = self.settings.particle_count;
        let bounds = self.settings.bounds;
        let master = match self.settings.seed {
            Some(seed) => ParticleBuffer::initialize_seeded(count, bounds, seed),
            None => ParticleBuffer::initialize(count, bounds, &mut rand::rng()),
        };

        self.sequential = master.clone();
        self.parallel = master;

        let now = Instant::now();
        self.sequential_history.clear();
        self.parallel_history.clear();
        self.sequential_fps.reset(now);
        self.parallel_fps.reset(now);

        log::info!("Reset {} particles in {}x{}", count, bounds.width, bounds.height);
    }

    pub fn set_particle_count(&mut self, count: usize) {
        self.settings.particle_count = count;
        self.reset();
    }

    /// Resize the worker pool; resets both populations when the pool changed
    pub fn set_worker_count(&mut self, count: usize) -> Result<bool, SimulationError> {
        let outcome = self.engine.set_worker_count(count);
        self.settings.parallel.worker_count = self.engine.worker_count();
        let changed = outcome?;
        if changed {
            self.reset();
        }
        Ok(changed)
    }

    /// New simulation area; particles outside it are pulled back on their next step
    pub fn resize(&mut self, width: f32, height: f32) {
        self.settings.bounds = Bounds::new(width, height);
    }

    /// Step both buffers once and record how long each engine took
    ///
    /// On error neither buffer nor history has moved.
    pub fn frame(&mut self, raw_dt: f32, config: &SimulationConfig) -> Result<FrameReport, SimulationError> {
        if config.num_particles != self.settings.particle_count {
            self.set_particle_count(config.num_particles);
        }

        let dt = clamp_dt(raw_dt);
        let bounds = self.settings.bounds;

        // Parallel pass first so a failed step leaves both buffers untouched
        let started = Instant::now();
        if let Err(err) = self.engine.step_parallel(&mut self.parallel, dt, bounds, config) {
            log::error!("Parallel step failed: {}", err);
            return Err(err);
        }
        let parallel_ms = started.elapsed().as_secs_f32() * 1000.0;

        let started = Instant::now();
        step_sequential(&mut self.sequential, dt, bounds, config);
        let sequential_ms = started.elapsed().as_secs_f32() * 1000.0;

        self.sequential_history.push(sequential_ms);
        self.parallel_history.push(parallel_ms);

        let now = Instant::now();
        self.sequential_fps.tick(now);
        self.parallel_fps.tick(now);

        Ok(FrameReport {
            dt,
            sequential_ms,
            parallel_ms,
        })
    }

    pub fn settings(&self) -> &ComparisonSettings {
        &self.settings
    }

    pub fn bounds(&self) -> Bounds {
        self.settings.bounds
    }

    pub fn particle_count(&self) -> usize {
        self.settings.particle_count
    }

    pub fn worker_count(&self) -> usize {
        self.engine.worker_count()
    }

    pub fn engine(&self) -> &ParallelEngine {
        &self.engine
    }

    pub fn sequential_buffer(&self) -> &ParticleBuffer {
        &self.sequential
    }

    pub fn parallel_buffer(&self) -> &ParticleBuffer {
        &self.parallel
    }

    pub fn sequential_history(&self) -> &PerformanceHistory {
        &self.sequential_history
    }

    pub fn parallel_history(&self) -> &PerformanceHistory {
        &self.parallel_history
    }

    /// Mean sequential step time over mean parallel step time
    ///
    /// `None` until the parallel history has a positive average.
    pub fn speedup(&self) -> Option<f32> {
        let parallel = self.parallel_history.average();
        (parallel > 0.0).then(|| self.sequential_history.average() / parallel)
    }

    pub fn sequential_metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics::snapshot(&self.sequential_history, &self.sequential_fps)
    }

    pub fn parallel_metrics(&self) -> PerformanceMetrics {
        PerformanceMetrics::snapshot(&self.parallel_history, &self.parallel_fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParallelSettings;
    use std::time::Duration;

    fn settings(particle_count: usize) -> ComparisonSettings {
        ComparisonSettings {
            bounds: Bounds::new(200.0, 150.0),
            particle_count,
            parallel: ParallelSettings::with_workers(4),
            seed: Some(99),
        }
    }

    fn config(num_particles: usize) -> SimulationConfig {
        SimulationConfig {
            num_particles,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_clamp_dt() {
        assert_eq!(clamp_dt(0.016), 0.016);
        assert_eq!(clamp_dt(0.5), MAX_DT);
        assert_eq!(clamp_dt(-1.0), 0.0);
        assert_eq!(clamp_dt(f32::NAN), 0.0);
        assert_eq!(clamp_dt(f32::INFINITY), 0.0);
    }

    #[test]
    fn test_reset_clones_master_population() {
        let comparison = Comparison::new(settings(300)).unwrap();
        assert_eq!(comparison.sequential_buffer().len(), 300);
        assert_eq!(comparison.sequential_buffer(), comparison.parallel_buffer());
        assert!(comparison.sequential_history().is_empty());
    }

    #[test]
    fn test_frame_records_both_timings() {
        let mut comparison = Comparison::new(settings(300)).unwrap();
        for _ in 0..10 {
            let report = comparison.frame(1.0 / 60.0, &config(300)).unwrap();
            assert!(report.sequential_ms >= 0.0);
            assert!(report.parallel_ms >= 0.0);
        }
        assert_eq!(comparison.sequential_history().len(), 10);
        assert_eq!(comparison.parallel_history().len(), 10);

        let bounds = comparison.bounds();
        for buffer in [comparison.sequential_buffer(), comparison.parallel_buffer()] {
            assert!(buffer.particles().iter().all(|p| bounds.contains(p.position())));
        }
    }

    #[test]
    fn test_deterministic_frames_stay_in_lockstep() {
        let mut comparison = Comparison::new(settings(500)).unwrap();
        let config = SimulationConfig {
            collisions_on: false,
            ..config(500)
        };
        for _ in 0..20 {
            comparison.frame(0.02, &config).unwrap();
        }
        assert_eq!(comparison.sequential_buffer(), comparison.parallel_buffer());
    }

    #[test]
    fn test_particle_count_change_resets() {
        let mut comparison = Comparison::new(settings(100)).unwrap();
        comparison.frame(0.016, &config(100)).unwrap();

        comparison.frame(0.016, &config(250)).unwrap();
        assert_eq!(comparison.particle_count(), 250);
        assert_eq!(comparison.sequential_buffer().len(), 250);
        assert_eq!(comparison.parallel_buffer().len(), 250);
        assert_eq!(comparison.sequential_history().len(), 1);
    }

    #[test]
    fn test_worker_count_change_resets() {
        let mut comparison = Comparison::new(settings(100)).unwrap();
        comparison.frame(0.016, &config(100)).unwrap();

        assert!(comparison.set_worker_count(9).unwrap());
        assert_eq!(comparison.worker_count(), 9);
        assert!(comparison.parallel_history().is_empty());
        assert_eq!(comparison.sequential_buffer(), comparison.parallel_buffer());

        assert!(!comparison.set_worker_count(40).unwrap());
        assert_eq!(comparison.worker_count(), 9);
    }

    #[test]
    fn test_failed_frame_keeps_buffers_in_lockstep() {
        let mut settings = settings(400_000);
        settings.parallel = ParallelSettings {
            worker_count: 2,
            timeout: Duration::ZERO,
        };
        let mut comparison = Comparison::new(settings).unwrap();
        let before = comparison.sequential_buffer().clone();
        let config = SimulationConfig {
            collisions_on: false,
            ..config(400_000)
        };

        match comparison.frame(0.016, &config) {
            Err(SimulationError::Timeout { .. }) => {
                assert_eq!(comparison.sequential_buffer(), &before);
                assert!(comparison.sequential_history().is_empty());
                assert!(comparison.parallel_history().is_empty());
            }
            // Both chunks can beat a zero timeout on a fast machine
            Ok(_) => assert_eq!(comparison.sequential_history().len(), 1),
            Err(other) => panic!("unexpected error: {other}"),
        }
        assert_eq!(comparison.sequential_buffer(), comparison.parallel_buffer());
    }

    #[test]
    fn test_speedup() {
        let mut comparison = Comparison::new(settings(200)).unwrap();
        assert_eq!(comparison.speedup(), None);

        comparison.sequential_history.push(6.0);
        comparison.parallel_history.push(2.0);
        assert_eq!(comparison.speedup(), Some(3.0));

        comparison.parallel_history.clear();
        comparison.parallel_history.push(0.0);
        assert_eq!(comparison.speedup(), None);
    }

    #[test]
    fn test_worker_count_tracks_engine() {
        let mut comparison = Comparison::new(settings(100)).unwrap();
        comparison.set_worker_count(6).unwrap();
        assert_eq!(comparison.settings().parallel.worker_count, 6);

        comparison.set_worker_count(0).unwrap();
        assert_eq!(comparison.settings().parallel.worker_count, 6);
        assert_eq!(comparison.worker_count(), 6);
    }

    #[test]
    fn test_resize_keeps_population() {
        let mut comparison = Comparison::new(settings(100)).unwrap();
        let before = comparison.sequential_buffer().clone();
        comparison.resize(50.0, 40.0);
        assert_eq!(comparison.bounds(), Bounds::new(50.0, 40.0));
        assert_eq!(comparison.sequential_buffer(), &before);

        comparison.frame(0.016, &config(100)).unwrap();
        let bounds = comparison.bounds();
        assert!(comparison
            .parallel_buffer()
            .particles()
            .iter()
            .all(|p| bounds.contains(p.position())));
    }
}
