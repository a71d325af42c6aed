use glam::DVec2;
use hecs::{Entity, World};

use crate::components::{Bounds, Restitution, Solid, Static, Transform2d, Velocity};

const REST_VELOCITY_THRESHOLD: f64 = 0.5;
const DEFAULT_RESTITUTION: f64 = 0.2;

/// Overlap between two solid boxes.
/// `contact_normal` always points from `entity_a` toward `entity_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub entity_a: Entity,
    pub entity_b: Entity,
    pub contact_normal: DVec2,
    pub penetration_depth: f64,
}

struct BoxEntry {
    entity: Entity,
    center: DVec2,
    half: DVec2,
    fixed: bool,
}

/// Separating axis test on two axis-aligned boxes. The normal is the axis of
/// least penetration.
fn test_pair(a: &BoxEntry, b: &BoxEntry) -> Option<CollisionEvent> {
    let delta = b.center - a.center;
    let overlap = a.half + b.half - delta.abs();
    if overlap.x <= 0.0 || overlap.y <= 0.0 {
        return None;
    }
    let (contact_normal, penetration_depth) = if overlap.x < overlap.y {
        (DVec2::new(sign_or_one(delta.x), 0.0), overlap.x)
    } else {
        (DVec2::new(0.0, sign_or_one(delta.y)), overlap.y)
    };
    Some(CollisionEvent {
        entity_a: a.entity,
        entity_b: b.entity,
        contact_normal,
        penetration_depth,
    })
}

fn sign_or_one(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Remove the approaching part of `vel` along `n`, bouncing when fast.
fn reflect(vel: &mut DVec2, n: DVec2, restitution: f64) {
    let along = vel.dot(n);
    if along >= 0.0 {
        return;
    }
    if along.abs() < REST_VELOCITY_THRESHOLD {
        *vel -= along * n;
    } else {
        *vel -= (1.0 + restitution) * along * n;
    }
}

/// Detect overlaps between [`Solid`] boxes and push them apart.
/// Bodies that lost `Solid` (settled debris) pass through everything.
pub fn collision_system(world: &mut World) -> Vec<CollisionEvent> {
    let entries: Vec<BoxEntry> = world
        .query::<(&Transform2d, &Bounds, Option<&Static>)>()
        .with::<&Solid>()
        .iter()
        .map(|(entity, (transform, bounds, fixed))| BoxEntry {
            entity,
            center: transform.position,
            half: bounds.0,
            fixed: fixed.is_some(),
        })
        .collect();

    // Broadphase: brute force O(n²)
    let mut events = Vec::new();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if entries[i].fixed && entries[j].fixed {
                continue;
            }
            if let Some(event) = test_pair(&entries[i], &entries[j]) {
                events.push(event);
            }
        }
    }

    for event in &events {
        let a_static = world.get::<&Static>(event.entity_a).is_ok();
        let b_static = world.get::<&Static>(event.entity_b).is_ok();
        let restitution = |e: Entity| {
            world
                .get::<&Restitution>(e)
                .map(|r| r.0)
                .unwrap_or(DEFAULT_RESTITUTION)
        };
        let e = (restitution(event.entity_a) + restitution(event.entity_b)) * 0.5;
        let n = event.contact_normal;
        let depth = event.penetration_depth;

        if a_static {
            push_out(world, event.entity_b, n * depth);
            if let Ok(mut vel) = world.get::<&mut Velocity>(event.entity_b) {
                reflect(&mut vel.0, n, e);
            }
        } else if b_static {
            push_out(world, event.entity_a, -n * depth);
            if let Ok(mut vel) = world.get::<&mut Velocity>(event.entity_a) {
                reflect(&mut vel.0, -n, e);
            }
        } else {
            // Both dynamic: split the push 50/50.
            push_out(world, event.entity_a, -n * (depth * 0.5));
            push_out(world, event.entity_b, n * (depth * 0.5));

            let vel_a = velocity_of(world, event.entity_a);
            let vel_b = velocity_of(world, event.entity_b);
            let approaching = (vel_a - vel_b).dot(n);
            if approaching > 0.0 {
                let impulse = if approaching < REST_VELOCITY_THRESHOLD {
                    approaching * 0.5
                } else {
                    (1.0 + e) * approaching * 0.5
                };
                if let Ok(mut vel) = world.get::<&mut Velocity>(event.entity_a) {
                    vel.0 -= impulse * n;
                }
                if let Ok(mut vel) = world.get::<&mut Velocity>(event.entity_b) {
                    vel.0 += impulse * n;
                }
            }
        }
    }

    events
}

fn push_out(world: &World, entity: Entity, offset: DVec2) {
    if let Ok(mut transform) = world.get::<&mut Transform2d>(entity) {
        transform.position += offset;
    }
}

fn velocity_of(world: &World, entity: Entity) -> DVec2 {
    world
        .get::<&Velocity>(entity)
        .map(|v| v.0)
        .unwrap_or(DVec2::ZERO)
}
