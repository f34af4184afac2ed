//! Flat particle storage
//!
//! All particle state lives in one `Vec<f32>` at a fixed stride of
//! [`STRIDE`] slots per particle. Typed access goes through `bytemuck` casts,
//! so no per-particle allocation ever happens.

use crate::config::Bounds;
use crate::constants::{INITIAL_SPEED, STRIDE};
use crate::particle::{Particle, ParticleType};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Errors raised when adopting or patching raw particle data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Raw data length is not a multiple of the particle stride
    InvalidLength(usize),
    /// A chunk write would land outside the buffer
    OutOfRange { start: usize, len: usize, count: usize },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::InvalidLength(len) => {
                write!(f, "buffer length {} is not a multiple of {}", len, STRIDE)
            }
            BufferError::OutOfRange { start, len, count } => write!(
                f,
                "chunk of {} particles at {} does not fit in {} particles",
                len, start, count
            ),
        }
    }
}

impl std::error::Error for BufferError {}

/// Contiguous `count * STRIDE` floats; particle `i` occupies `[STRIDE*i, STRIDE*i + STRIDE)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleBuffer {
    data: Vec<f32>,
}

impl ParticleBuffer {
    /// Allocate `count` particles with random position inside `bounds`,
    /// velocity in ±[`INITIAL_SPEED`] per axis and a random declared type
    pub fn initialize<R: Rng + ?Sized>(count: usize, bounds: Bounds, rng: &mut R) -> Self {
        let mut data = Vec::with_capacity(count * STRIDE);
        for _ in 0..count {
            let position = Vec2::new(
                rng.random::<f32>() * bounds.width,
                rng.random::<f32>() * bounds.height,
            );
            let velocity = Vec2::new(
                (rng.random::<f32>() - 0.5) * INITIAL_SPEED * 2.0,
                (rng.random::<f32>() - 0.5) * INITIAL_SPEED * 2.0,
            );
            let kind = ParticleType::ALL[rng.random_range(0..ParticleType::COUNT)];
            let particle = Particle::new(position, velocity, kind);
            data.extend_from_slice(bytemuck::cast_slice(std::slice::from_ref(&particle)));
        }

        log::debug!("Initialized {} particles in {:?}", count, bounds);
        Self { data }
    }

    /// Same as [`ParticleBuffer::initialize`] but reproducible from `seed`
    pub fn initialize_seeded(count: usize, bounds: Bounds, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::initialize(count, bounds, &mut rng)
    }

    /// Adopt existing flat data
    pub fn from_raw(data: Vec<f32>) -> Result<Self, BufferError> {
        if data.len() % STRIDE != 0 {
            return Err(BufferError::InvalidLength(data.len()));
        }
        Ok(Self { data })
    }

    pub fn from_particles(particles: &[Particle]) -> Self {
        Self {
            data: bytemuck::cast_slice(particles).to_vec(),
        }
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.data.len() / STRIDE
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw floats, read-only
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<f32> {
        self.data
    }

    pub fn particles(&self) -> &[Particle] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    /// Copy the particles in `range` out as a standalone flat chunk
    pub fn copy_chunk(&self, range: Range<usize>) -> Vec<f32> {
        self.data[range.start * STRIDE..range.end * STRIDE].to_vec()
    }

    /// Overwrite particles starting at index `start` with a flat chunk
    pub fn write_chunk(&mut self, start: usize, chunk: &[f32]) -> Result<(), BufferError> {
        if chunk.len() % STRIDE != 0 {
            return Err(BufferError::InvalidLength(chunk.len()));
        }
        let len = chunk.len() / STRIDE;
        if start + len > self.len() {
            return Err(BufferError::OutOfRange {
                start,
                len,
                count: self.len(),
            });
        }
        self.data[start * STRIDE..(start + len) * STRIDE].copy_from_slice(chunk);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_layout_and_ranges() {
        let bounds = Bounds::new(200.0, 100.0);
        let buffer = ParticleBuffer::initialize_seeded(500, bounds, 42);

        assert_eq!(buffer.len(), 500);
        assert_eq!(buffer.as_slice().len(), 500 * STRIDE);
        for p in buffer.particles() {
            assert!(bounds.contains(p.position()));
            assert!(p.vx.abs() <= INITIAL_SPEED && p.vy.abs() <= INITIAL_SPEED);
            assert!(p.particle_type().is_some());
        }
    }

    #[test]
    fn test_initialize_zero() {
        let buffer = ParticleBuffer::initialize_seeded(0, Bounds::default(), 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.particles().is_empty());
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let a = ParticleBuffer::initialize_seeded(64, Bounds::default(), 9);
        let b = ParticleBuffer::initialize_seeded(64, Bounds::default(), 9);
        let c = ParticleBuffer::initialize_seeded(64, Bounds::default(), 10);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_from_raw_rejects_bad_length() {
        assert_eq!(
            ParticleBuffer::from_raw(vec![0.0; 7]),
            Err(BufferError::InvalidLength(7))
        );
        let ok = ParticleBuffer::from_raw(vec![0.0; 10]).unwrap();
        assert_eq!(ok.len(), 2);
    }

    #[test]
    fn test_chunk_copy_and_write_back() {
        let mut buffer = ParticleBuffer::initialize_seeded(10, Bounds::default(), 3);
        let mut chunk = buffer.copy_chunk(4..7);
        assert_eq!(chunk.len(), 3 * STRIDE);
        assert_eq!(&chunk[..], &buffer.as_slice()[4 * STRIDE..7 * STRIDE]);

        for value in chunk.iter_mut() {
            *value = -1.0;
        }
        buffer.write_chunk(4, &chunk).unwrap();

        assert!(buffer.particles()[4..7].iter().all(|p| p.x == -1.0));
        assert!(buffer.particles()[3].x >= 0.0);
        assert!(buffer.particles()[7].x >= 0.0);
    }

    #[test]
    fn test_write_chunk_out_of_range() {
        let mut buffer = ParticleBuffer::initialize_seeded(4, Bounds::default(), 3);
        let chunk = vec![0.0; 2 * STRIDE];
        assert_eq!(
            buffer.write_chunk(3, &chunk),
            Err(BufferError::OutOfRange {
                start: 3,
                len: 2,
                count: 4
            })
        );
        assert_eq!(
            buffer.write_chunk(0, &[0.0; 3]),
            Err(BufferError::InvalidLength(3))
        );
    }

    #[test]
    fn test_typed_view_mutation() {
        let mut buffer = ParticleBuffer::initialize_seeded(2, Bounds::default(), 5);
        buffer.particles_mut()[1].vx = 12.0;
        assert_eq!(buffer.as_slice()[STRIDE + 2], 12.0);
    }
}
