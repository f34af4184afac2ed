//! Worker unit: one thread that steps whatever chunk it is handed
//!
//! A worker owns nothing between messages. Each request moves a chunk in,
//! the worker advances it in place and moves it back out on the shared reply
//! channel of its pool generation.

use particle_physics::{advance_slice, Bounds, Particle, PhysicsFlags, STRIDE};
use rand::Rng;
use std::sync::mpsc::{Receiver, Sender};

/// One chunk of work, with local (zero-based) indices
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub chunk: Vec<f32>,
    pub dt: f32,
    pub bounds: Bounds,
    pub flags: PhysicsFlags,
    pub start_index: usize,
    pub end_index: usize,
}

impl ChunkRequest {
    /// Request covering the whole chunk
    pub fn new(chunk: Vec<f32>, dt: f32, bounds: Bounds, flags: PhysicsFlags) -> Self {
        let end_index = chunk.len() / STRIDE;
        Self {
            chunk,
            dt,
            bounds,
            flags,
            start_index: 0,
            end_index,
        }
    }

    /// Advance particles `[start_index, end_index)` and hand the chunk back
    ///
    /// Panics if the chunk length is not a multiple of [`STRIDE`]; that is a
    /// caller bug, not a recoverable condition.
    pub fn process<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<f32> {
        let ChunkRequest {
            mut chunk,
            dt,
            bounds,
            flags,
            start_index,
            end_index,
        } = self;

        assert!(
            chunk.len() % STRIDE == 0,
            "chunk of {} floats is not a whole number of particles",
            chunk.len()
        );
        let particles: &mut [Particle] = bytemuck::cast_slice_mut(&mut chunk);
        advance_slice(&mut particles[start_index..end_index], dt, bounds, &flags, rng);
        chunk
    }
}

/// A request tagged with the sequence number the engine expects back
pub(crate) struct Job {
    pub sequence: u64,
    pub request: ChunkRequest,
}

pub(crate) struct JobResult {
    pub worker: usize,
    pub generation: u64,
    pub sequence: u64,
    pub chunk: Vec<f32>,
}

/// Worker thread body; returns once the job channel closes or the pool
/// generation it replies to is gone
pub(crate) fn run(id: usize, generation: u64, jobs: Receiver<Job>, results: Sender<JobResult>) {
    let mut rng = rand::rng();
    log::debug!("worker {} (generation {}) started", id, generation);

    while let Ok(Job { sequence, request }) = jobs.recv() {
        let chunk = request.process(&mut rng);
        let reply = JobResult {
            worker: id,
            generation,
            sequence,
            chunk,
        };
        if results.send(reply).is_err() {
            break;
        }
    }

    log::debug!("worker {} (generation {}) stopped", id, generation);
}
