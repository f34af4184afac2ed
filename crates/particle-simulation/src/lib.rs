//! # Particle Simulation Engines
//!
//! Sequential and thread-pool parallel stepping of a [`ParticleBuffer`], plus a
//! harness that runs both on the same population and keeps their timings.
//!
//! [`ParticleBuffer`]: particle_physics::ParticleBuffer

pub mod comparison;
pub mod error;
pub mod history;
pub mod parallel;
pub mod params;
pub mod sequential;
pub mod worker;

pub use comparison::*;
pub use error::*;
pub use history::*;
pub use parallel::*;
pub use params::*;
pub use sequential::*;
pub use worker::ChunkRequest;
