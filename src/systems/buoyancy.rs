use std::collections::HashSet;

use glam::DVec2;
use hecs::{Entity, World};

use crate::components::{BodyForces, Submerged, Transform2d, Velocity};
use crate::config::BuoyancyParams;

/// Depth below which a body gets no lift.
const MIN_FLOAT_DEPTH: f64 = 0.1;
/// Buoyancy never exceeds `strength * BUOYANCY_CEILING`.
const BUOYANCY_CEILING: f64 = 10.0;
const BOB_FREQUENCY: f64 = 3.0;
const BOB_PHASE_PER_UNIT_X: f64 = 0.5;

/// Upward lift for a body `depth` below the water line.
pub fn buoyant_force(depth: f64, strength: f64) -> f64 {
    if depth > MIN_FLOAT_DEPTH {
        (depth * strength).clamp(0.0, strength * BUOYANCY_CEILING)
    } else {
        0.0
    }
}

/// Vertical bobbing force, phase-shifted along the surface.
pub fn bob_force(time: f64, x: f64, bob_strength: f64) -> f64 {
    (time * BOB_FREQUENCY + x * BOB_PHASE_PER_UNIT_X).sin() * bob_strength
}

/// Bodies currently inside the water volume. Handles are not owned: the
/// host may despawn a body at any time and it is dropped on the next tick.
#[derive(Debug, Default)]
pub struct BuoyancyTracker {
    tracked: HashSet<Entity>,
}

impl BuoyancyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the body was not tracked yet.
    pub fn track(&mut self, entity: Entity) -> bool {
        let added = self.tracked.insert(entity);
        if added {
            log::debug!("tracking {entity:?}");
        }
        added
    }

    /// Returns true if the body was tracked.
    pub fn untrack(&mut self, entity: Entity) -> bool {
        let removed = self.tracked.remove(&entity);
        if removed {
            log::debug!("untracked {entity:?}");
        }
        removed
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.tracked.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.tracked.iter().copied()
    }

    /// Accumulate buoyancy, drag and bobbing into each tracked body's
    /// [`BodyForces`]. Bodies that no longer exist are removed afterwards.
    pub fn tick(
        &mut self,
        world: &mut World,
        params: &BuoyancyParams,
        water_surface_y: f64,
        simulation_time: f64,
    ) {
        // Sorted so any component inserts happen in the same order every run.
        let mut snapshot: Vec<Entity> = self.tracked.iter().copied().collect();
        snapshot.sort_unstable_by_key(|e| e.to_bits());
        let mut stale = Vec::new();

        for entity in snapshot {
            let Ok((transform, velocity)) =
                world.query_one_mut::<(&Transform2d, Option<&Velocity>)>(entity)
            else {
                stale.push(entity);
                continue;
            };
            let position = transform.position;
            let velocity = velocity.map(|v| v.0).unwrap_or(DVec2::ZERO);

            let depth = water_surface_y - position.y;
            let lift = buoyant_force(depth, params.strength);
            let drag = -velocity * params.drag_coefficient;
            let bob = bob_force(simulation_time, position.x, params.bob_strength);
            let total = DVec2::new(0.0, lift + bob) + drag;

            if let Ok(forces) = world.query_one_mut::<&mut BodyForces>(entity) {
                forces.add_force(total);
            } else {
                let _ = world.insert_one(
                    entity,
                    BodyForces {
                        force: total,
                        torque: 0.0,
                    },
                );
            }
        }

        for entity in stale {
            self.tracked.remove(&entity);
            log::debug!("dropped stale body {entity:?} from buoyancy set");
        }
    }
}

/// Flag the player as in or out of the water. Returns true when the flag
/// actually changed.
pub fn set_submerged(world: &mut World, entity: Entity, submerged: bool) -> bool {
    let was = world.get::<&Submerged>(entity).is_ok();
    if was == submerged || !world.contains(entity) {
        return false;
    }
    if submerged {
        let _ = world.insert_one(entity, Submerged);
    } else {
        let _ = world.remove_one::<Submerged>(entity);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> BuoyancyParams {
        BuoyancyParams {
            strength: 100.0,
            drag_coefficient: 2.5,
            bob_strength: 0.0,
        }
    }

    fn spawn_body(world: &mut World, position: DVec2, velocity: DVec2) -> Entity {
        world.spawn((Transform2d::new(position), Velocity(velocity)))
    }

    fn force_on(world: &World, entity: Entity) -> BodyForces {
        *world.get::<&BodyForces>(entity).unwrap()
    }

    #[test]
    fn no_lift_at_or_above_threshold() {
        assert_eq!(buoyant_force(-1.0, 100.0), 0.0);
        assert_eq!(buoyant_force(0.0, 100.0), 0.0);
        assert_eq!(buoyant_force(0.1, 100.0), 0.0);
        assert!(buoyant_force(0.11, 100.0) > 0.0);
    }

    #[test]
    fn lift_is_capped() {
        assert_eq!(buoyant_force(5.0, 100.0), 500.0);
        assert_eq!(buoyant_force(10.0, 100.0), 1000.0);
        assert_eq!(buoyant_force(50.0, 100.0), 1000.0);
    }

    #[test]
    fn track_is_idempotent() {
        let mut world = World::new();
        let body = world.spawn(());
        let mut tracker = BuoyancyTracker::new();
        assert!(tracker.track(body));
        assert!(!tracker.track(body));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.untrack(body));
        assert!(!tracker.untrack(body));
        assert!(tracker.is_empty());
    }

    #[test]
    fn submerged_body_gets_lift_and_drag() {
        let mut world = World::new();
        let body = spawn_body(&mut world, DVec2::new(0.0, -2.0), DVec2::new(1.0, -4.0));
        let mut tracker = BuoyancyTracker::new();
        tracker.track(body);
        tracker.tick(&mut world, &params(), 0.0, 0.0);

        let forces = force_on(&world, body);
        assert_eq!(forces.force.x, -2.5);
        assert_eq!(forces.force.y, 200.0 + 10.0);
        assert_eq!(forces.torque, 0.0);
    }

    #[test]
    fn body_above_water_still_feels_drag() {
        let mut world = World::new();
        let body = spawn_body(&mut world, DVec2::new(0.0, 1.0), DVec2::new(0.0, 2.0));
        let mut tracker = BuoyancyTracker::new();
        tracker.track(body);
        tracker.tick(&mut world, &params(), 0.0, 0.0);
        assert_eq!(force_on(&world, body).force, DVec2::new(0.0, -5.0));
    }

    #[test]
    fn bobbing_follows_time_and_position() {
        let mut world = World::new();
        let body = spawn_body(&mut world, DVec2::new(1.0, 5.0), DVec2::ZERO);
        let mut tracker = BuoyancyTracker::new();
        tracker.track(body);
        let params = BuoyancyParams {
            bob_strength: 0.5,
            ..params()
        };
        tracker.tick(&mut world, &params, 0.0, 2.0);
        let expected = (2.0_f64 * 3.0 + 0.5).sin() * 0.5;
        assert!((force_on(&world, body).force.y - expected).abs() < 1e-12);
    }

    #[test]
    fn forces_accumulate_onto_existing_requests() {
        let mut world = World::new();
        let body = spawn_body(&mut world, DVec2::new(0.0, -1.0), DVec2::ZERO);
        world
            .insert_one(
                body,
                BodyForces {
                    force: DVec2::new(3.0, 0.0),
                    torque: 1.0,
                },
            )
            .unwrap();
        let mut tracker = BuoyancyTracker::new();
        tracker.track(body);
        tracker.tick(&mut world, &params(), 0.0, 0.0);
        let forces = force_on(&world, body);
        assert_eq!(forces.force, DVec2::new(3.0, 100.0));
        assert_eq!(forces.torque, 1.0);
    }

    #[test]
    fn despawned_bodies_are_dropped() {
        let mut world = World::new();
        let gone = spawn_body(&mut world, DVec2::ZERO, DVec2::ZERO);
        let kept = spawn_body(&mut world, DVec2::new(0.0, -1.0), DVec2::ZERO);
        let mut tracker = BuoyancyTracker::new();
        tracker.track(gone);
        tracker.track(kept);
        world.despawn(gone).unwrap();

        tracker.tick(&mut world, &params(), 0.0, 0.0);
        assert!(!tracker.contains(gone));
        assert!(tracker.contains(kept));
        assert_eq!(force_on(&world, kept).force.y, 100.0);
    }

    #[test]
    fn submerged_flag_toggles() {
        let mut world = World::new();
        let player = world.spawn(());
        assert!(set_submerged(&mut world, player, true));
        assert!(!set_submerged(&mut world, player, true));
        assert!(world.get::<&Submerged>(player).is_ok());
        assert!(set_submerged(&mut world, player, false));
        assert!(world.get::<&Submerged>(player).is_err());
        assert!(!set_submerged(&mut world, player, false));
    }
}
