//! Errors raised by the execution engines

use particle_physics::BufferError;
use std::time::Duration;

#[derive(Debug)]
pub enum SimulationError {
    /// Worker count outside the supported range
    InvalidWorkerCount(usize),
    /// The pool was destroyed and has not been recreated
    PoolDestroyed,
    /// A worker stopped accepting work or its reply channel closed
    WorkerLost { worker: usize },
    /// Not every chunk came back within the step timeout
    Timeout { pending: Vec<usize>, waited: Duration },
    /// The OS refused to start a worker thread
    Spawn(std::io::Error),
    /// A chunk did not fit back into the buffer
    Buffer(BufferError),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidWorkerCount(count) => write!(
                f,
                "worker count {} outside [{}, {}]",
                count,
                crate::MIN_WORKERS,
                crate::MAX_WORKERS
            ),
            SimulationError::PoolDestroyed => write!(f, "worker pool has been destroyed"),
            SimulationError::WorkerLost { worker } => write!(f, "worker {} is gone", worker),
            SimulationError::Timeout { pending, waited } => write!(
                f,
                "workers {:?} did not reply within {:?}",
                pending, waited
            ),
            SimulationError::Spawn(e) => write!(f, "failed to spawn worker thread: {}", e),
            SimulationError::Buffer(e) => write!(f, "chunk merge failed: {}", e),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Spawn(e) => Some(e),
            SimulationError::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BufferError> for SimulationError {
    fn from(e: BufferError) -> Self {
        SimulationError::Buffer(e)
    }
}
