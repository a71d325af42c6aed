//! Components and events exchanged between bodies and the water.

use glam::DVec2;
use hecs::Entity;

/// Coarse kind of body, decides how the water treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyCategory {
    /// Crates, logs, anything that just floats.
    Floating,
    /// Loses control while submerged.
    Player,
    /// Rubbish: stops colliding once it settles and raises pollution.
    Debris,
}

/// Marker: the player is currently inside the water volume.
pub struct Submerged;

/// Marker: debris that already settled and reported its pollution.
pub struct Settled;

/// Forces and torque requested for the next physics step. Cleared after
/// integration.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BodyForces {
    pub force: DVec2,
    pub torque: f64,
}

impl BodyForces {
    pub fn add_force(&mut self, force: DVec2) {
        self.force += force;
    }

    pub fn add_torque(&mut self, torque: f64) {
        self.torque += torque;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactKind {
    /// First step of overlap, with the body's velocity at that moment.
    Enter { vertical_velocity: f64, x: f64 },
    Stay,
    Exit,
}

/// A body crossing the water volume boundary, as reported by the trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub entity: Entity,
    pub category: BodyCategory,
    pub kind: ContactKind,
}
