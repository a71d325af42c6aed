use glam::DVec2;
use hecs::{Entity, World};

use crate::components::{
    AngularDrag, AngularVelocity, BodyForces, Bounds, Drag, GravityAffected, Mass,
    PreviousPosition, Static, Transform2d, Velocity,
};

/// Fixed physics rate shared by the water and the bodies.
pub const FIXED_DT: f64 = 1.0 / 50.0;
pub const GRAVITY: DVec2 = DVec2::new(0.0, -9.81);

/// One semi-implicit Euler step for every dynamic body. Requested
/// [`BodyForces`] are consumed and cleared.
pub fn physics_step(world: &mut World, dt: f64) {
    // Snapshot previous positions for render interpolation.
    // Collect first (drops the borrow), then insert/update.
    let prev_snapshots: Vec<(Entity, DVec2)> = world
        .query::<&Transform2d>()
        .with::<&Velocity>()
        .without::<&Static>()
        .iter()
        .map(|(e, t)| (e, t.position))
        .collect();
    for (entity, pos) in prev_snapshots {
        let _ = world.insert_one(entity, PreviousPosition(pos));
    }

    for (_entity, (transform, vel, mass, gravity, drag, forces)) in world
        .query_mut::<(
            &mut Transform2d,
            &mut Velocity,
            Option<&Mass>,
            Option<&GravityAffected>,
            Option<&Drag>,
            Option<&BodyForces>,
        )>()
        .without::<&Static>()
    {
        if gravity.is_some() {
            vel.0 += GRAVITY * dt;
        }
        if let Some(forces) = forces {
            let mass = mass.map(|m| m.0).unwrap_or(1.0);
            if mass > 0.0 {
                vel.0 += forces.force / mass * dt;
            }
        }
        // vel *= (1 - drag * dt)
        if let Some(drag) = drag {
            vel.0 *= (1.0 - drag.0 * dt).max(0.0);
        }
        transform.position += vel.0 * dt;
    }

    for (_entity, (transform, spin, mass, bounds, drag, forces)) in world
        .query_mut::<(
            &mut Transform2d,
            &mut AngularVelocity,
            Option<&Mass>,
            Option<&Bounds>,
            Option<&AngularDrag>,
            Option<&BodyForces>,
        )>()
        .without::<&Static>()
    {
        if let Some(forces) = forces {
            let mass = mass.map(|m| m.0).unwrap_or(1.0);
            let inertia = bounds.map(|b| b.inertia(mass)).unwrap_or(mass);
            if inertia > 0.0 {
                spin.0 += forces.torque / inertia * dt;
            }
        }
        if let Some(drag) = drag {
            spin.0 *= (1.0 - drag.0 * dt).max(0.0);
        }
        transform.rotation += spin.0 * dt;
    }

    for (_entity, forces) in world.query_mut::<&mut BodyForces>() {
        forces.clear();
    }
}
