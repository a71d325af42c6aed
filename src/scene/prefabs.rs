use glam::DVec2;
use hecs::{Entity, World};

use crate::components::*;

const CRATE_MASS: f64 = 1.0;
const CRATE_DRAG: f64 = 0.1;
const CRATE_ANGULAR_DRAG: f64 = 0.5;
const DEBRIS_HALF_EXTENTS: DVec2 = DVec2::new(0.2, 0.1);
const DEBRIS_MASS: f64 = 0.3;
const PLAYER_HALF_EXTENTS: DVec2 = DVec2::new(0.3, 0.5);

// ---------------------------------------------------------------------------
// Static geometry
// ---------------------------------------------------------------------------

/// Immovable box: the pond floor, the banks, platforms.
pub fn spawn_ground(world: &mut World, center: DVec2, half_extents: DVec2) -> Entity {
    world.spawn((
        Transform2d::new(center),
        Bounds(half_extents),
        Static,
        Solid,
        Restitution(0.0),
        Tint([0.35, 0.28, 0.2]),
    ))
}

// ---------------------------------------------------------------------------
// Dynamic bodies
// ---------------------------------------------------------------------------

pub fn spawn_player(world: &mut World, position: DVec2) -> Entity {
    world.spawn((
        Transform2d::new(position),
        Velocity(DVec2::ZERO),
        Mass(1.0),
        Bounds(PLAYER_HALF_EXTENTS),
        GravityAffected,
        BodyForces::default(),
        Solid,
        Restitution(0.0),
        BodyCategory::Player,
        PlayerIntent::default(),
        PlayerStats::default(),
        Tint([0.85, 0.3, 0.2]),
    ))
}

/// A wooden crate that floats and tumbles.
pub fn spawn_crate(world: &mut World, position: DVec2, half_extents: DVec2, velocity: DVec2) -> Entity {
    world.spawn((
        Transform2d::new(position),
        Velocity(velocity),
        AngularVelocity(0.0),
        Mass(CRATE_MASS),
        Bounds(half_extents),
        GravityAffected,
        Drag(CRATE_DRAG),
        AngularDrag(CRATE_ANGULAR_DRAG),
        BodyForces::default(),
        Solid,
        BodyCategory::Floating,
        Tint([0.6, 0.45, 0.25]),
    ))
}

/// Rubbish that stops colliding once it settles in the water.
pub fn spawn_debris(world: &mut World, position: DVec2, velocity: DVec2) -> Entity {
    world.spawn((
        Transform2d::new(position),
        Velocity(velocity),
        AngularVelocity(0.0),
        Mass(DEBRIS_MASS),
        Bounds(DEBRIS_HALF_EXTENTS),
        GravityAffected,
        Drag(CRATE_DRAG),
        AngularDrag(CRATE_ANGULAR_DRAG),
        BodyForces::default(),
        Solid,
        BodyCategory::Debris,
        Tint([0.3, 0.55, 0.3]),
    ))
}
