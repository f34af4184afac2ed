//! Chunk-partitioned engine backed by a pool of persistent worker threads
//!
//! Each step copies `W` disjoint chunks out of the buffer, moves one to each
//! worker over a channel, waits for every chunk to come back, then writes the
//! chunks into place at their original offsets. Nothing is written until all
//! chunks are in, so a failed step leaves the buffer as it was.
//!
//! Replies carry the pool generation and a per-request sequence number.
//! Recreating the pool (resize, destroy, or recovery after a failure) starts a
//! new generation with a fresh reply channel; anything still in flight for an
//! old generation is dropped on the floor.

use crate::error::SimulationError;
use crate::params::ParallelSettings;
use crate::worker::{self, ChunkRequest, Job, JobResult};
use particle_physics::{Bounds, ParticleBuffer, PhysicsFlags, SimulationConfig};
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest single wait on the reply channel before checking worker liveness
const LIVENESS_POLL: Duration = Duration::from_millis(20);

/// Split `n` particles into `workers` contiguous chunks of `ceil(n / workers)`
///
/// Only non-empty chunks are returned, so there may be fewer than `workers`.
pub fn partition(n: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 || n == 0 {
        return Vec::new();
    }
    let chunk_size = n.div_ceil(workers);
    (0..workers)
        .map(|k| k * chunk_size..((k + 1) * chunk_size).min(n))
        .take_while(|range| range.start < n)
        .collect()
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    sequence: u64,
    start: usize,
}

struct WorkerSlot {
    id: usize,
    jobs: Sender<Job>,
    handle: Option<JoinHandle<()>>,
    in_flight: Option<InFlight>,
}

impl WorkerSlot {
    /// Close the job channel; join idle workers, detach busy ones
    fn terminate(self) {
        let WorkerSlot {
            id,
            jobs,
            handle,
            in_flight,
        } = self;
        drop(jobs);

        let Some(handle) = handle else { return };
        if in_flight.is_some() {
            log::warn!("Detaching worker {} with a chunk still in flight", id);
            return;
        }
        if handle.join().is_err() {
            log::warn!("Worker {} panicked before shutdown", id);
        }
    }
}

/// One generation of workers and the reply channel they share
struct WorkerPool {
    generation: u64,
    slots: Vec<WorkerSlot>,
    results: Receiver<JobResult>,
    next_sequence: u64,
}

impl WorkerPool {
    fn spawn(generation: u64, count: usize) -> Result<Self, SimulationError> {
        let (result_tx, results) = mpsc::channel();
        let mut slots = Vec::with_capacity(count);

        for id in 0..count {
            let (jobs, job_rx) = mpsc::channel();
            let result_tx = result_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("physics-worker-{}", id))
                .spawn(move || worker::run(id, generation, job_rx, result_tx))
                .map_err(SimulationError::Spawn)?;

            slots.push(WorkerSlot {
                id,
                jobs,
                handle: Some(handle),
                in_flight: None,
            });
        }

        Ok(Self {
            generation,
            slots,
            results,
            next_sequence: 0,
        })
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn pending_workers(&self) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|slot| slot.in_flight.is_some())
            .map(|slot| slot.id)
            .collect()
    }

    /// A worker whose thread exited while still holding a chunk
    fn dead_pending_worker(&self) -> Option<usize> {
        self.slots
            .iter()
            .filter(|slot| slot.in_flight.is_some())
            .find(|slot| slot.handle.as_ref().map_or(true, |handle| handle.is_finished()))
            .map(|slot| slot.id)
    }

    /// Hand chunk `k` to worker `k`
    fn dispatch(
        &mut self,
        buffer: &ParticleBuffer,
        ranges: &[Range<usize>],
        dt: f32,
        bounds: Bounds,
        flags: PhysicsFlags,
    ) -> Result<(), SimulationError> {
        for (slot, range) in self.slots.iter_mut().zip(ranges) {
            debug_assert!(slot.in_flight.is_none(), "worker {} already busy", slot.id);

            let sequence = self.next_sequence;
            self.next_sequence += 1;

            let request = ChunkRequest::new(buffer.copy_chunk(range.clone()), dt, bounds, flags);
            slot.jobs
                .send(Job { sequence, request })
                .map_err(|_| SimulationError::WorkerLost { worker: slot.id })?;
            slot.in_flight = Some(InFlight {
                sequence,
                start: range.start,
            });
        }
        Ok(())
    }

    /// Wait until every in-flight chunk has come back, or `timeout` elapses
    ///
    /// Returns `(start_index, chunk)` pairs in arrival order.
    fn collect(&mut self, timeout: Duration) -> Result<Vec<(usize, Vec<f32>)>, SimulationError> {
        let started = Instant::now();
        let mut pending = self.pending_workers().len();
        let mut merged = Vec::with_capacity(pending);

        while pending > 0 {
            let remaining = timeout.saturating_sub(started.elapsed());
            let reply = match self.results.recv_timeout(remaining.min(LIVENESS_POLL)) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(worker) = self.dead_pending_worker() {
                        return Err(SimulationError::WorkerLost { worker });
                    }
                    if started.elapsed() >= timeout {
                        return Err(SimulationError::Timeout {
                            pending: self.pending_workers(),
                            waited: started.elapsed(),
                        });
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let worker = self.pending_workers().first().copied().unwrap_or_default();
                    return Err(SimulationError::WorkerLost { worker });
                }
            };

            if reply.generation != self.generation {
                log::debug!(
                    "Discarding reply from worker {} of stale generation {}",
                    reply.worker,
                    reply.generation
                );
                continue;
            }

            let Some(slot) = self.slots.get_mut(reply.worker) else {
                log::debug!("Discarding reply from unknown worker {}", reply.worker);
                continue;
            };

            match slot.in_flight {
                Some(in_flight) if in_flight.sequence == reply.sequence => {
                    slot.in_flight = None;
                    merged.push((in_flight.start, reply.chunk));
                    pending -= 1;
                }
                _ => log::debug!(
                    "Discarding unexpected reply {} from worker {}",
                    reply.sequence,
                    reply.worker
                ),
            }
        }

        Ok(merged)
    }

    fn terminate(&mut self) {
        for slot in self.slots.drain(..) {
            slot.terminate();
        }
    }
}

/// Parallel stepping over a fixed pool of `1..=32` persistent workers
pub struct ParallelEngine {
    settings: ParallelSettings,
    pool: Option<WorkerPool>,
    generation: u64,
    last_chunks: Vec<Range<usize>>,
}

impl ParallelEngine {
    pub fn new(settings: ParallelSettings) -> Result<Self, SimulationError> {
        if !ParallelSettings::is_valid_worker_count(settings.worker_count) {
            return Err(SimulationError::InvalidWorkerCount(settings.worker_count));
        }

        let pool = WorkerPool::spawn(0, settings.worker_count)?;
        log::info!("✓ Initialized {} physics workers", settings.worker_count);

        Ok(Self {
            settings,
            pool: Some(pool),
            generation: 0,
            last_chunks: Vec::new(),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.settings.worker_count
    }

    pub fn settings(&self) -> &ParallelSettings {
        &self.settings
    }

    /// Pool generation; bumps every time the workers are recreated
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_destroyed(&self) -> bool {
        self.pool.is_none()
    }

    /// Index ranges dispatched by the most recent successful step
    pub fn last_chunks(&self) -> &[Range<usize>] {
        &self.last_chunks
    }

    /// Replace the pool with `count` fresh workers
    ///
    /// Counts outside `[1, 32]` or equal to the current count are ignored and
    /// return `Ok(false)`.
    pub fn set_worker_count(&mut self, count: usize) -> Result<bool, SimulationError> {
        if count == self.settings.worker_count || !ParallelSettings::is_valid_worker_count(count) {
            log::debug!("Ignoring worker count {}", count);
            return Ok(false);
        }

        log::info!("Changing workers: {} → {}", self.settings.worker_count, count);
        self.settings.worker_count = count;
        self.respawn()?;
        Ok(true)
    }

    /// Advance every particle once using the worker pool
    ///
    /// Blocks until every chunk is merged. On timeout or a lost worker the pool
    /// is rebuilt, the buffer is left untouched and that error is returned. If
    /// the rebuild itself fails the pool stays destroyed.
    pub fn step_parallel(
        &mut self,
        buffer: &mut ParticleBuffer,
        dt: f32,
        bounds: Bounds,
        config: &SimulationConfig,
    ) -> Result<(), SimulationError> {
        let timeout = self.settings.timeout;
        let pool = self.pool.as_mut().ok_or(SimulationError::PoolDestroyed)?;

        let chunks = partition(buffer.len(), pool.len());
        log::debug!(
            "Dispatching {} particles as {} chunks (generation {})",
            buffer.len(),
            chunks.len(),
            pool.generation
        );

        let outcome = pool
            .dispatch(buffer, &chunks, dt, bounds, config.flags())
            .and_then(|()| pool.collect(timeout));

        let merged = match outcome {
            Ok(merged) => merged,
            Err(err) => {
                log::warn!("Parallel step failed: {}; rebuilding worker pool", err);
                if let Err(respawn_err) = self.respawn() {
                    log::error!("Could not rebuild worker pool after '{}': {}", err, respawn_err);
                }
                return Err(err);
            }
        };

        for (start, chunk) in merged {
            buffer.write_chunk(start, &chunk)?;
        }
        self.last_chunks = chunks;
        Ok(())
    }

    /// Terminate every worker; safe to call repeatedly
    pub fn destroy(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.terminate();
            log::info!("Destroyed worker pool (generation {})", self.generation);
        }
    }

    fn respawn(&mut self) -> Result<(), SimulationError> {
        self.destroy();
        self.generation += 1;
        self.pool = Some(WorkerPool::spawn(self.generation, self.settings.worker_count)?);
        log::info!(
            "✓ Initialized {} physics workers (generation {})",
            self.settings.worker_count,
            self.generation
        );
        Ok(())
    }
}

impl Drop for ParallelEngine {
    fn drop(&mut self) {
        self.destroy();
    }
}
