use glam::DVec2;
use hecs::World;

use crate::components::{Grounded, PlayerIntent, PlayerStats, Submerged, Velocity};
use super::collision::CollisionEvent;

/// Minimum upward component of a contact normal that counts as standing.
const GROUND_NORMAL_THRESHOLD: f64 = 0.7;

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Turn each player's [`PlayerIntent`] into velocity.
///
/// A submerged player has no control at all: horizontal velocity is left to
/// the water and jumps are dropped. The jump request is consumed either way.
pub fn player_movement_system(world: &mut World) {
    for (_entity, (intent, stats, vel, grounded, submerged)) in world.query_mut::<(
        &mut PlayerIntent,
        &PlayerStats,
        &mut Velocity,
        Option<&Grounded>,
        Option<&Submerged>,
    )>() {
        let jump = std::mem::take(&mut intent.jump);
        if submerged.is_some() {
            continue;
        }
        vel.0.x = intent.move_x.clamp(-1.0, 1.0) * stats.speed;
        if jump && grounded.is_some() {
            vel.0.y = stats.jump_speed;
        }
    }
}

/// Rebuild [`Grounded`] for players from this fixed step's contacts.
pub fn grounded_system(world: &mut World, events: &[CollisionEvent]) {
    let players: Vec<_> = world
        .query_mut::<(&PlayerIntent, &Grounded)>()
        .into_iter()
        .map(|(e, _)| e)
        .collect();
    for entity in players {
        let _ = world.remove_one::<Grounded>(entity);
    }

    for event in events {
        let a_is_player = world.get::<&PlayerIntent>(event.entity_a).is_ok();
        let b_is_player = world.get::<&PlayerIntent>(event.entity_b).is_ok();

        if a_is_player && (-event.contact_normal).dot(DVec2::Y) > GROUND_NORMAL_THRESHOLD {
            let _ = world.insert_one(event.entity_a, Grounded);
        }
        if b_is_player && event.contact_normal.dot(DVec2::Y) > GROUND_NORMAL_THRESHOLD {
            let _ = world.insert_one(event.entity_b, Grounded);
        }
    }
}
