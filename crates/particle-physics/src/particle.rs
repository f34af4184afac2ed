//! Particle record and category definitions

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Particle categories
///
/// Only used for filtering and colouring; physics never changes a particle's type.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleType {
    Sand = 0,
    Smoke = 1,
    Fire = 2,
    Water = 3,
}

impl ParticleType {
    /// Every declared category, in index order
    pub const ALL: [ParticleType; 4] = [
        ParticleType::Sand,
        ParticleType::Smoke,
        ParticleType::Fire,
        ParticleType::Water,
    ];

    /// Number of declared categories
    pub const COUNT: usize = Self::ALL.len();

    /// Look up a category by its numeric index
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Display label
    pub fn name(self) -> &'static str {
        match self {
            Self::Sand => "Sand",
            Self::Smoke => "Smoke",
            Self::Fire => "Fire",
            Self::Water => "Water",
        }
    }

    /// Colour for rendering this category [r, g, b, a]
    pub fn color(self) -> [f32; 4] {
        match self {
            Self::Sand => [0.761, 0.698, 0.502, 1.0], // #C2B280
            Self::Smoke => [0.533, 0.533, 0.533, 1.0], // #888888
            Self::Fire => [1.0, 1.0, 0.0, 1.0],
            Self::Water => [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// One particle as laid out in the flat buffer
///
/// `repr(C)` with five `f32` fields, so a `&[f32]` whose length is a multiple of
/// [`crate::STRIDE`] can be viewed as `&[Particle]` without copying.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Category index stored as a float (see [`ParticleType`])
    pub kind: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, kind: ParticleType) -> Self {
        Self {
            x: position.x,
            y: position.y,
            vx: velocity.x,
            vy: velocity.y,
            kind: kind.index() as f32,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.vx, self.vy)
    }

    /// Category, if the stored index names a declared one
    pub fn particle_type(&self) -> Option<ParticleType> {
        if self.kind < 0.0 || self.kind.fract() != 0.0 {
            return None;
        }
        ParticleType::from_index(self.kind as u32)
    }

    /// Whether this particle belongs to category index `kind`
    pub fn is_kind(&self, kind: u32) -> bool {
        self.kind == kind as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_five_floats() {
        assert_eq!(std::mem::size_of::<Particle>(), crate::STRIDE * 4);
        assert_eq!(std::mem::align_of::<Particle>(), std::mem::align_of::<f32>());
    }

    #[test]
    fn test_type_round_trip() {
        for kind in ParticleType::ALL {
            let p = Particle::new(Vec2::ZERO, Vec2::ZERO, kind);
            assert_eq!(p.particle_type(), Some(kind));
            assert!(p.is_kind(kind.index()));
        }
        assert_eq!(ParticleType::from_index(4), None);
    }

    #[test]
    fn test_unknown_kind() {
        let p = Particle {
            kind: 1.5,
            ..Default::default()
        };
        assert_eq!(p.particle_type(), None);
    }
}
