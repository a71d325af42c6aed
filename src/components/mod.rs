mod body;

pub use body::*;

use glam::DVec2;

/// Position and rotation (radians, counter-clockwise) in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
    pub position: DVec2,
    pub rotation: f64,
}

impl Transform2d {
    pub fn new(position: DVec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }
}

/// Position at the start of the last fixed step, for render interpolation.
pub struct PreviousPosition(pub DVec2);

/// Linear velocity in world units per second.
#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub DVec2);

/// Counter-clockwise angular velocity in radians per second.
#[derive(Debug, Clone, Copy)]
pub struct AngularVelocity(pub f64);

/// Body mass in kilograms.
#[derive(Debug, Clone, Copy)]
pub struct Mass(pub f64);

/// Half extents of the body's axis-aligned box.
#[derive(Debug, Clone, Copy)]
pub struct Bounds(pub DVec2);

impl Bounds {
    pub fn min(&self, center: DVec2) -> DVec2 {
        center - self.0
    }

    pub fn max(&self, center: DVec2) -> DVec2 {
        center + self.0
    }

    /// Moment of inertia of a solid box of this size.
    pub fn inertia(&self, mass: f64) -> f64 {
        let size = self.0 * 2.0;
        mass * (size.x * size.x + size.y * size.y) / 12.0
    }
}

/// Marker: entity is pulled down by gravity.
pub struct GravityAffected;

/// Linear damping. Applied as `vel *= 1 - drag * dt` each step.
pub struct Drag(pub f64);

/// Angular damping, same form as [`Drag`].
pub struct AngularDrag(pub f64);

/// Marker: immovable, infinite mass in contact resolution.
pub struct Static;

/// Marker: the body blocks other solid bodies. Bodies without it pass
/// through everything (trigger-style).
pub struct Solid;

/// Bounciness on contact. 0.0 = no bounce.
pub struct Restitution(pub f64);

/// Marker: standing on something (set each physics step).
pub struct Grounded;

/// Render colour as linear RGB.
#[derive(Debug, Clone, Copy)]
pub struct Tint(pub [f32; 3]);

/// Movement request for the player, filled by the host's input layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerIntent {
    /// -1.0 (left) ..= 1.0 (right).
    pub move_x: f64,
    pub jump: bool,
}

/// Player movement tuning.
#[derive(Debug, Clone, Copy)]
pub struct PlayerStats {
    pub speed: f64,
    pub jump_speed: f64,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed: 5.0,
            jump_speed: 7.5,
        }
    }
}
