use std::collections::HashMap;

use glam::DVec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{
    AngularVelocity, BodyCategory, BodyForces, Bounds, ContactEvent, ContactKind, Settled, Solid,
    Transform2d, Velocity,
};
use crate::config::{ImpactConfig, TorqueConfig};
use crate::fsm::StateMachine;
use crate::water::WaterSurface;

/// Where a body is relative to the water volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Outside,
    /// The fixed step in which the body crossed in.
    Entering,
    Inside,
}

/// Result of a body hitting the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splash {
    pub entity: Entity,
    /// Point on the body's edge facing the water.
    pub origin: DVec2,
    /// Clamped velocity written into the surface points.
    pub velocity: f64,
    /// Number of surface points disturbed.
    pub points: usize,
}

struct Contact {
    fsm: StateMachine<ContactPhase>,
    /// +1.0 counter-clockwise, -1.0 clockwise, 0.0 no spin.
    spin: f64,
}

/// Turns bodies crossing the surface into splashes and spin.
pub struct CollisionCoupler {
    impact: ImpactConfig,
    torque: TorqueConfig,
    contacts: HashMap<Entity, Contact>,
    /// Debris waiting to stop colliding, with the step it becomes due.
    pending_debris: Vec<(Entity, u64)>,
    rng: StdRng,
}

impl CollisionCoupler {
    pub fn new(impact: ImpactConfig, torque: TorqueConfig, seed: u64) -> Self {
        Self {
            impact,
            torque,
            contacts: HashMap::new(),
            pending_debris: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn set_config(&mut self, impact: ImpactConfig, torque: TorqueConfig) {
        self.impact = impact;
        self.torque = torque;
    }

    /// `sign(v) * min(|v * force_multiplier|, max_force)`.
    pub fn clamp_impulse(&self, vertical_velocity: f64) -> f64 {
        let magnitude = (vertical_velocity * self.impact.force_multiplier)
            .abs()
            .clamp(0.0, self.impact.max_force);
        if vertical_velocity < 0.0 {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn phase(&self, entity: Entity) -> ContactPhase {
        self.contacts
            .get(&entity)
            .map(|c| c.fsm.state)
            .unwrap_or(ContactPhase::Outside)
    }

    pub fn is_debris_pending(&self, entity: Entity) -> bool {
        self.pending_debris.iter().any(|(e, _)| *e == entity)
    }

    /// A body crossed into the water during fixed step `step`. Contacts
    /// other than [`ContactKind::Enter`] are ignored.
    pub fn on_enter(
        &mut self,
        world: &mut World,
        surface: &mut WaterSurface,
        contact: &ContactEvent,
        step: u64,
    ) -> Option<Splash> {
        let ContactKind::Enter {
            vertical_velocity,
            x,
        } = contact.kind
        else {
            return None;
        };
        let entity = contact.entity;
        let category = contact.category;
        let half_extents = world
            .get::<&Bounds>(entity)
            .map(|b| b.0)
            .unwrap_or(DVec2::ZERO);
        let position = world
            .get::<&Transform2d>(entity)
            .map(|t| t.position)
            .unwrap_or(DVec2::new(x, surface.surface_level()));

        let velocity = self.clamp_impulse(vertical_velocity);
        let radius = half_extents.x * self.impact.radius_multiplier;
        let indices = surface.points_near(x, radius);
        surface.splash(&indices, velocity);

        let origin = if position.y >= surface.surface_level() {
            DVec2::new(x, position.y - half_extents.y)
        } else {
            DVec2::new(x, position.y + half_extents.y)
        };
        log::debug!(
            "{entity:?} splashed at ({:.2}, {:.2}) with {velocity:.2} over {} points",
            origin.x,
            origin.y,
            indices.len()
        );

        let spin = self.pick_spin(world, entity);
        let state = self.contacts.entry(entity).or_insert_with(|| Contact {
            fsm: StateMachine::new(ContactPhase::Outside),
            spin,
        });
        state.spin = spin;
        state.fsm.go(ContactPhase::Entering);

        if self.torque.rotation_strength > 0.0 && spin != 0.0 {
            let torque = self.torque.rotation_strength
                * self.torque.impact_multiplier
                * velocity.abs()
                * spin;
            add_torque(world, entity, torque);
        }

        if category == BodyCategory::Debris
            && world.get::<&Solid>(entity).is_ok()
            && world.get::<&Settled>(entity).is_err()
            && !self.is_debris_pending(entity)
        {
            self.pending_debris.push((entity, step + 1));
        }

        Some(Splash {
            entity,
            origin,
            velocity,
            points: indices.len(),
        })
    }

    /// The body is still overlapping the water. Once past its entering step
    /// and below the spin ceiling, it keeps getting a depth-scaled torque.
    pub fn on_stay(&mut self, world: &mut World, water_surface_y: f64, entity: Entity) {
        let Some(contact) = self.contacts.get(&entity) else {
            return;
        };
        if !contact.fsm.is(&ContactPhase::Inside)
            || self.torque.rotation_strength <= 0.0
            || contact.spin == 0.0
        {
            return;
        }
        let Ok(transform) = world.get::<&Transform2d>(entity).map(|t| *t) else {
            return;
        };
        let depth = water_surface_y - transform.position.y;
        if depth <= 0.0 {
            return;
        }
        let angular = world
            .get::<&AngularVelocity>(entity)
            .map(|w| w.0)
            .unwrap_or(0.0);
        if angular.abs() >= self.torque.max_rotation_force {
            return;
        }
        add_torque(world, entity, self.torque.rotation_strength * depth * contact.spin);
    }

    pub fn on_exit(&mut self, entity: Entity) {
        if let Some(contact) = self.contacts.remove(&entity) {
            log::debug!(
                "{entity:?} left the water after {} steps {:?}",
                contact.fsm.steps,
                contact.fsm.state
            );
        }
    }

    /// Stop due debris from colliding. Returns the bodies that settled in
    /// this step; each body appears here at most once in its lifetime.
    pub fn settle_due_debris(&mut self, world: &mut World, step: u64) -> Vec<Entity> {
        let mut settled = Vec::new();
        self.pending_debris.retain(|&(entity, due)| {
            if due > step {
                return true;
            }
            if !world.contains(entity) || world.get::<&Settled>(entity).is_ok() {
                return false;
            }
            let _ = world.remove_one::<Solid>(entity);
            let _ = world.insert_one(entity, Settled);
            settled.push(entity);
            false
        });
        settled
    }

    /// Close out a fixed step: bodies that entered this step count as inside
    /// from the next one. Contacts of despawned bodies are forgotten.
    pub fn end_step(&mut self, world: &World) {
        self.contacts.retain(|entity, _| world.contains(*entity));
        for contact in self.contacts.values_mut() {
            contact.fsm.tick();
            if contact.fsm.is(&ContactPhase::Entering) {
                contact.fsm.go(ContactPhase::Inside);
            }
        }
    }

    fn pick_spin(&mut self, world: &World, entity: Entity) -> f64 {
        if self.torque.randomize_rotation {
            return if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        }
        let vx = world.get::<&Velocity>(entity).map(|v| v.0.x).unwrap_or(0.0);
        // Roll into the direction of travel: moving right spins clockwise.
        if vx > 0.0 {
            -1.0
        } else if vx < 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

fn add_torque(world: &mut World, entity: Entity, torque: f64) {
    if let Ok(forces) = world.query_one_mut::<&mut BodyForces>(entity) {
        forces.add_torque(torque);
        return;
    }
    let _ = world.insert_one(
        entity,
        BodyForces {
            force: DVec2::ZERO,
            torque,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurfaceConfig;

    fn water() -> WaterSurface {
        WaterSurface::new(&SurfaceConfig {
            points: 11,
            width: 10.0,
            height: 4.0,
            origin: (0.0, 0.0),
        })
        .unwrap()
    }

    fn coupler(torque: TorqueConfig) -> CollisionCoupler {
        CollisionCoupler::new(ImpactConfig::default(), torque, 7)
    }

    fn no_spin() -> TorqueConfig {
        TorqueConfig {
            rotation_strength: 0.0,
            ..TorqueConfig::default()
        }
    }

    fn steady_spin() -> TorqueConfig {
        TorqueConfig {
            rotation_strength: 1.0,
            max_rotation_force: 4.0,
            impact_multiplier: 3.0,
            randomize_rotation: false,
        }
    }

    fn spawn_box(world: &mut World, position: DVec2, velocity: DVec2) -> Entity {
        world.spawn((
            Transform2d::new(position),
            Velocity(velocity),
            Bounds(DVec2::splat(0.25)),
        ))
    }

    fn enter(entity: Entity, category: BodyCategory, vertical_velocity: f64, x: f64) -> ContactEvent {
        ContactEvent {
            entity,
            category,
            kind: ContactKind::Enter {
                vertical_velocity,
                x,
            },
        }
    }

    fn torque_on(world: &World, entity: Entity) -> f64 {
        world.get::<&BodyForces>(entity).map(|f| f.torque).unwrap_or(0.0)
    }

    #[test]
    fn clamp_keeps_sign_and_ceiling() {
        let c = coupler(no_spin());
        assert_eq!(c.clamp_impulse(10.0), 2.0);
        assert_eq!(c.clamp_impulse(-10.0), -2.0);
        assert_eq!(c.clamp_impulse(-100.0), -5.0);
        assert_eq!(c.clamp_impulse(100.0), 5.0);
        assert_eq!(c.clamp_impulse(0.0), 0.0);
    }

    #[test]
    fn enter_splashes_points_within_radius() {
        let mut world = World::new();
        let mut surface = water();
        let body = spawn_box(&mut world, DVec2::new(0.0, 2.5), DVec2::new(0.0, -10.0));
        let mut c = coupler(no_spin());

        let splash = c.on_enter(&mut world, &mut surface, &enter(body, BodyCategory::Floating, -10.0, 0.0), 0).unwrap();
        // radius = 0.25 * 4.15 ~ 1.04, points sit 1 unit apart around x = 0.
        assert_eq!(splash.points, 3);
        assert_eq!(splash.velocity, -2.0);
        assert_eq!(splash.origin, DVec2::new(0.0, 2.25));
        for i in 4..=6 {
            assert_eq!(surface.wave().velocity(i), -2.0);
        }
        assert_eq!(surface.wave().velocity(3), 0.0);
        assert_eq!(c.phase(body), ContactPhase::Entering);
    }

    #[test]
    fn splash_origin_uses_top_edge_from_below() {
        let mut world = World::new();
        let mut surface = water();
        let body = spawn_box(&mut world, DVec2::new(0.0, 1.0), DVec2::new(0.0, 3.0));
        let mut c = coupler(no_spin());
        let splash = c.on_enter(&mut world, &mut surface, &enter(body, BodyCategory::Floating, 3.0, 0.0), 0).unwrap();
        assert_eq!(splash.origin, DVec2::new(0.0, 1.25));
        assert!(splash.velocity > 0.0);
    }

    #[test]
    fn stay_and_exit_do_not_splash() {
        let mut world = World::new();
        let mut surface = water();
        let body = spawn_box(&mut world, DVec2::new(0.0, 1.0), DVec2::ZERO);
        let mut c = coupler(no_spin());
        let stay = ContactEvent {
            entity: body,
            category: BodyCategory::Floating,
            kind: ContactKind::Stay,
        };
        assert!(c.on_enter(&mut world, &mut surface, &stay, 0).is_none());
        assert_eq!(surface.wave().displacement_energy(), 0.0);
        assert_eq!(c.phase(body), ContactPhase::Outside);
    }

    #[test]
    fn phases_walk_outside_entering_inside_outside() {
        let mut world = World::new();
        let mut surface = water();
        let body = spawn_box(&mut world, DVec2::new(0.0, 2.0), DVec2::ZERO);
        let mut c = coupler(no_spin());

        assert_eq!(c.phase(body), ContactPhase::Outside);
        c.on_enter(&mut world, &mut surface, &enter(body, BodyCategory::Floating, -1.0, 0.0), 0).unwrap();
        assert_eq!(c.phase(body), ContactPhase::Entering);
        c.end_step(&world);
        assert_eq!(c.phase(body), ContactPhase::Inside);
        c.end_step(&world);
        assert_eq!(c.phase(body), ContactPhase::Inside);
        c.on_exit(body);
        assert_eq!(c.phase(body), ContactPhase::Outside);
    }

    #[test]
    fn impact_torque_opposes_horizontal_travel() {
        let mut world = World::new();
        let mut surface = water();
        let right = spawn_box(&mut world, DVec2::new(-2.0, 2.5), DVec2::new(1.0, -10.0));
        let left = spawn_box(&mut world, DVec2::new(2.0, 2.5), DVec2::new(-1.0, -10.0));
        let still = spawn_box(&mut world, DVec2::new(0.0, 2.5), DVec2::new(0.0, -10.0));
        let mut c = coupler(steady_spin());

        c.on_enter(&mut world, &mut surface, &enter(right, BodyCategory::Floating, -10.0, -2.0), 0).unwrap();
        c.on_enter(&mut world, &mut surface, &enter(left, BodyCategory::Floating, -10.0, 2.0), 0).unwrap();
        c.on_enter(&mut world, &mut surface, &enter(still, BodyCategory::Floating, -10.0, 0.0), 0).unwrap();

        assert_eq!(torque_on(&world, right), -6.0);
        assert_eq!(torque_on(&world, left), 6.0);
        assert_eq!(torque_on(&world, still), 0.0);
    }

    #[test]
    fn random_spin_is_seeded() {
        let spins = |seed| {
            let mut world = World::new();
            let mut surface = water();
            let mut c = CollisionCoupler::new(
                ImpactConfig::default(),
                TorqueConfig {
                    randomize_rotation: true,
                    ..steady_spin()
                },
                seed,
            );
            (0..8)
                .map(|_| {
                    let body = spawn_box(&mut world, DVec2::new(0.0, 2.5), DVec2::ZERO);
                    c.on_enter(&mut world, &mut surface, &enter(body, BodyCategory::Floating, -10.0, 0.0), 0).unwrap();
                    torque_on(&world, body)
                })
                .collect::<Vec<_>>()
        };
        let first = spins(42);
        assert_eq!(first, spins(42));
        assert!(first.iter().all(|t| t.abs() == 6.0));
    }

    #[test]
    fn continuous_torque_scales_with_depth_once_inside() {
        let mut world = World::new();
        let mut surface = water();
        let body = spawn_box(&mut world, DVec2::new(0.0, 1.5), DVec2::new(-1.0, 0.0));
        let mut c = coupler(TorqueConfig {
            impact_multiplier: 0.0,
            ..steady_spin()
        });
        c.on_enter(&mut world, &mut surface, &enter(body, BodyCategory::Floating, 0.0, 0.0), 0).unwrap();

        // Entering step: no continuous torque yet.
        c.on_stay(&mut world, 2.0, body);
        assert_eq!(torque_on(&world, body), 0.0);

        c.end_step(&world);
        c.on_stay(&mut world, 2.0, body);
        assert_eq!(torque_on(&world, body), 0.5);
    }

    #[test]
    fn continuous_torque_stops_at_ceiling_and_above_water() {
        let mut world = World::new();
        let mut surface = water();
        let spinning = spawn_box(&mut world, DVec2::new(0.0, 1.0), DVec2::new(-1.0, 0.0));
        world.insert_one(spinning, AngularVelocity(5.0)).unwrap();
        let floating_high = spawn_box(&mut world, DVec2::new(3.0, 2.5), DVec2::new(-1.0, 0.0));
        let mut c = coupler(TorqueConfig {
            impact_multiplier: 0.0,
            ..steady_spin()
        });
        c.on_enter(&mut world, &mut surface, &enter(spinning, BodyCategory::Floating, 0.0, 0.0), 0).unwrap();
        c.on_enter(&mut world, &mut surface, &enter(floating_high, BodyCategory::Floating, 0.0, 3.0), 0).unwrap();
        c.end_step(&world);

        c.on_stay(&mut world, 2.0, spinning);
        c.on_stay(&mut world, 2.0, floating_high);
        assert_eq!(torque_on(&world, spinning), 0.0);
        assert_eq!(torque_on(&world, floating_high), 0.0);
    }

    #[test]
    fn solid_debris_settles_exactly_one_step_later() {
        let mut world = World::new();
        let mut surface = water();
        let debris = spawn_box(&mut world, DVec2::new(0.0, 2.5), DVec2::ZERO);
        world.insert_one(debris, Solid).unwrap();
        let mut c = coupler(no_spin());

        c.on_enter(&mut world, &mut surface, &enter(debris, BodyCategory::Debris, -3.0, 0.0), 10).unwrap();
        assert!(c.settle_due_debris(&mut world, 10).is_empty());
        assert!(world.get::<&Solid>(debris).is_ok());

        assert_eq!(c.settle_due_debris(&mut world, 11), vec![debris]);
        assert!(world.get::<&Solid>(debris).is_err());
        assert!(world.get::<&Settled>(debris).is_ok());

        // Bobbing back in and out never reports twice.
        c.on_exit(debris);
        c.on_enter(&mut world, &mut surface, &enter(debris, BodyCategory::Debris, -3.0, 0.0), 12).unwrap();
        assert!(c.settle_due_debris(&mut world, 13).is_empty());
    }

    #[test]
    fn non_solid_or_non_debris_never_settles() {
        let mut world = World::new();
        let mut surface = water();
        let ghost = spawn_box(&mut world, DVec2::new(0.0, 2.5), DVec2::ZERO);
        let crate_body = spawn_box(&mut world, DVec2::new(2.0, 2.5), DVec2::ZERO);
        world.insert_one(crate_body, Solid).unwrap();
        let mut c = coupler(no_spin());

        c.on_enter(&mut world, &mut surface, &enter(ghost, BodyCategory::Debris, -3.0, 0.0), 0).unwrap();
        c.on_enter(&mut world, &mut surface, &enter(crate_body, BodyCategory::Floating, -3.0, 2.0), 0).unwrap();
        assert!(c.settle_due_debris(&mut world, 1).is_empty());
        assert!(world.get::<&Solid>(crate_body).is_ok());
    }

    #[test]
    fn despawned_debris_is_forgotten() {
        let mut world = World::new();
        let mut surface = water();
        let debris = spawn_box(&mut world, DVec2::new(0.0, 2.5), DVec2::ZERO);
        world.insert_one(debris, Solid).unwrap();
        let mut c = coupler(no_spin());
        c.on_enter(&mut world, &mut surface, &enter(debris, BodyCategory::Debris, -3.0, 0.0), 0).unwrap();
        world.despawn(debris).unwrap();
        c.end_step(&world);
        assert!(c.settle_due_debris(&mut world, 1).is_empty());
        assert!(!c.is_debris_pending(debris));
        assert_eq!(c.phase(debris), ContactPhase::Outside);
    }
}
