//! Single-threaded reference engine

use particle_physics::{advance_slice, Bounds, ParticleBuffer, SimulationConfig};
use rand::Rng;

/// Step every particle once, in index order, on the calling thread
pub fn step_sequential(buffer: &mut ParticleBuffer, dt: f32, bounds: Bounds, config: &SimulationConfig) {
    step_sequential_with(buffer, dt, bounds, config, &mut rand::rng());
}

/// [`step_sequential`] with an explicit turbulence source
pub fn step_sequential_with<R: Rng + ?Sized>(
    buffer: &mut ParticleBuffer,
    dt: f32,
    bounds: Bounds,
    config: &SimulationConfig,
    rng: &mut R,
) {
    advance_slice(buffer.particles_mut(), dt, bounds, &config.flags(), rng);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gravity_only(num_particles: usize) -> SimulationConfig {
        SimulationConfig {
            gravity_on: true,
            collisions_on: false,
            wind_on: false,
            active_type: None,
            num_particles,
        }
    }

    #[test]
    fn test_gravity_scenario() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut buffer = ParticleBuffer::initialize_seeded(4, bounds, 2024);
        let before = buffer.particles().to_vec();
        assert!(before.iter().all(|p| p.kind >= 0.0 && p.kind <= 3.0));

        let dt = 0.016;
        step_sequential(&mut buffer, dt, bounds, &gravity_only(4));

        let dv = 9.81 * dt * 15.0;
        for (old, new) in before.iter().zip(buffer.particles()) {
            let vy = old.vy + dv;
            let y = old.y + vy * dt;
            if y > 0.0 && y < 100.0 {
                assert!((new.vy - vy).abs() < 1e-4);
                assert!((new.y - y).abs() < 1e-4);
            } else {
                assert!(new.y == 0.0 || new.y == 100.0);
            }
            assert!((0.0..=100.0).contains(&new.y));
            assert_eq!(new.kind, old.kind);
        }
    }

    #[test]
    fn test_type_filter() {
        let bounds = Bounds::new(300.0, 300.0);
        let mut buffer = ParticleBuffer::initialize_seeded(200, bounds, 5);
        let before = buffer.particles().to_vec();
        let config = SimulationConfig {
            active_type: Some(1),
            ..SimulationConfig::default()
        };

        step_sequential(&mut buffer, 0.05, bounds, &config);

        for (old, new) in before.iter().zip(buffer.particles()) {
            if old.kind != 1.0 {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_all_stay_in_bounds() {
        let bounds = Bounds::new(64.0, 48.0);
        let mut buffer = ParticleBuffer::initialize_seeded(500, bounds, 8);
        let config = SimulationConfig::default();
        for _ in 0..100 {
            step_sequential(&mut buffer, 0.05, bounds, &config);
        }
        assert!(buffer.particles().iter().all(|p| bounds.contains(p.position())));
    }
}
