//! Per-particle update law shared by every execution engine
//!
//! Order of operations: type filter, gravity, wind, explicit Euler integration,
//! wall bounces, turbulence. Both engines call [`advance_slice`], so any change
//! here applies to sequential and parallel stepping alike.

use crate::config::{Bounds, PhysicsFlags};
use crate::constants::*;
use crate::particle::Particle;
use glam::Vec2;
use rand::Rng;

/// Position-seeded turbulence magnitude, bounded to (-0.1, 0.1)
///
/// `%` on floats is a truncated remainder that keeps the sign of the dividend.
pub fn turbulence(position: Vec2) -> f32 {
    ((position.x * TURBULENCE_FREQ_X + position.y * TURBULENCE_FREQ_Y).sin() * TURBULENCE_GAIN)
        % TURBULENCE_MODULUS
}

/// Advance one particle by `dt` seconds
///
/// Particles filtered out by `flags.active_type` are returned unchanged. The
/// random source is only consulted when collisions are on.
pub fn advance<R: Rng + ?Sized>(
    particle: Particle,
    dt: f32,
    bounds: Bounds,
    flags: &PhysicsFlags,
    rng: &mut R,
) -> Particle {
    if let Some(active) = flags.active_type {
        if !particle.is_kind(active) {
            return particle;
        }
    }

    let mut position = particle.position();
    let mut velocity = particle.velocity();

    if flags.gravity_on {
        velocity.y += G * dt * GRAVITY_SCALE;
    }

    if flags.wind_on {
        velocity.x += (position.y * WIND_FREQUENCY).sin() * dt * WIND_STRENGTH;
    }

    position += velocity * dt;

    if position.x < 0.0 {
        position.x = 0.0;
        velocity.x = -velocity.x * RESTITUTION;
    }
    if position.x > bounds.width {
        position.x = bounds.width;
        velocity.x = -velocity.x * RESTITUTION;
    }
    if position.y < 0.0 {
        position.y = 0.0;
        velocity.y = -velocity.y * RESTITUTION;
    }
    // The floor always sends particles back up, even if already moving up
    if position.y > bounds.height {
        position.y = bounds.height;
        velocity.y = -velocity.y.abs() * RESTITUTION;
    }

    if flags.collisions_on {
        let t = turbulence(position);
        velocity.x += (rng.random::<f32>() - 0.5) * t;
        velocity.y += (rng.random::<f32>() - 0.5) * t;
    }

    Particle {
        x: position.x,
        y: position.y,
        vx: velocity.x,
        vy: velocity.y,
        kind: particle.kind,
    }
}

/// Advance every particle of `particles` in index order, in place
pub fn advance_slice<R: Rng + ?Sized>(
    particles: &mut [Particle],
    dt: f32,
    bounds: Bounds,
    flags: &PhysicsFlags,
    rng: &mut R,
) {
    for particle in particles.iter_mut() {
        *particle = advance(*particle, dt, bounds, flags, rng);
    }
}
