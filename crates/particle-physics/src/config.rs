//! Per-frame simulation configuration

use glam::Vec2;

/// World extent; particles are kept inside `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn contains(&self, position: Vec2) -> bool {
        (0.0..=self.width).contains(&position.x) && (0.0..=self.height).contains(&position.y)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Force toggles and type filter, refreshed every frame from user controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub gravity_on: bool,
    pub collisions_on: bool,
    pub wind_on: bool,
    /// `None` updates every particle; `Some(t)` only updates particles of type `t`
    pub active_type: Option<u32>,
    pub num_particles: usize,
}

impl SimulationConfig {
    /// The part of the configuration the kinematics step needs
    pub fn flags(&self) -> PhysicsFlags {
        PhysicsFlags {
            gravity_on: self.gravity_on,
            collisions_on: self.collisions_on,
            wind_on: self.wind_on,
            active_type: self.active_type,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity_on: true,
            collisions_on: true,
            wind_on: true,
            active_type: None,
            num_particles: 8000,
        }
    }
}

/// Configuration without the particle count, as shipped alongside a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhysicsFlags {
    pub gravity_on: bool,
    pub collisions_on: bool,
    pub wind_on: bool,
    pub active_type: Option<u32>,
}

impl PhysicsFlags {
    /// True when no random source is consulted, so results are reproducible bit for bit
    pub fn is_deterministic(&self) -> bool {
        !self.collisions_on
    }
}
