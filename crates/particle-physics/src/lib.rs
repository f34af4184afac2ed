//! # Particle Physics Kernel
//!
//! Flat particle storage and the per-particle update law (gravity, wind,
//! inelastic wall bounces, position-seeded turbulence) shared by every
//! execution engine.

pub mod config;
pub mod constants;
pub mod kinematics;
pub mod particle;
pub mod store;

pub use config::*;
pub use constants::*;
pub use kinematics::*;
pub use particle::*;
pub use store::*;
