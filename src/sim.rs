//! Fixed-step driver tying the water to the bodies in a [`hecs::World`].
//!
//! One fixed step runs, in order: debris settling due from the previous step,
//! player control, trigger diffing and contact dispatch, buoyancy, the spring
//! chain, then rigid-body integration and contact resolution.

use hecs::{Entity, World};

use crate::components::{BodyCategory, ContactEvent, ContactKind, Submerged};
use crate::config::WaterConfig;
use crate::error::SimResult;
use crate::pollution::PollutionMeter;
use crate::systems::{
    collision_system, grounded_system, physics_step, player_movement_system, set_submerged,
    BuoyancyTracker, CollisionCoupler, TriggerVolume, FIXED_DT,
};
use crate::water::WaterSurface;

/// Something observable that happened during a fixed step.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    Splash {
        entity: Entity,
        x: f64,
        y: f64,
        velocity: f64,
        points: usize,
    },
    /// Settled debris dirtied the water.
    Pollution { entity: Entity, amount: u32 },
    /// The pollution meter filled up. Reported once until reset.
    PollutionOverflow,
    SubmergedChanged { entity: Entity, submerged: bool },
}

pub struct WaterSimulation {
    config: WaterConfig,
    surface: WaterSurface,
    trigger: TriggerVolume,
    coupler: CollisionCoupler,
    buoyancy: BuoyancyTracker,
    pollution: PollutionMeter,
    step: u64,
    time: f64,
    accumulator: f64,
}

impl WaterSimulation {
    pub fn new(config: WaterConfig, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let surface = WaterSurface::new(&config.surface)?;
        let coupler = CollisionCoupler::new(config.impact, config.torque, seed);
        let pollution = PollutionMeter::new(&config.pollution);
        log::info!(
            "water simulation ready: {} points, {:.2} x {:.2}, seed {seed}",
            config.surface.points,
            config.surface.width,
            config.surface.height
        );
        Ok(Self {
            config,
            surface,
            trigger: TriggerVolume::new(),
            coupler,
            buoyancy: BuoyancyTracker::new(),
            pollution,
            step: 0,
            time: 0.0,
            accumulator: 0.0,
        })
    }

    /// Run as many fixed steps as `frame_dt` covers, then the per-frame
    /// update. Returns every event of those steps and the interpolation
    /// alpha (0..1) of this frame between the last two fixed steps.
    pub fn advance(&mut self, world: &mut World, frame_dt: f64) -> (Vec<SimEvent>, f64) {
        self.accumulator += frame_dt;
        let mut events = Vec::new();
        while self.accumulator >= FIXED_DT {
            events.extend(self.fixed_step(world));
            self.accumulator -= FIXED_DT;
        }
        self.frame_update(world, frame_dt);
        (events, self.accumulator / FIXED_DT)
    }

    pub fn fixed_step(&mut self, world: &mut World) -> Vec<SimEvent> {
        let mut events = Vec::new();

        for entity in self.coupler.settle_due_debris(world, self.step) {
            log::debug!("{entity:?} settled, polluting the water");
            events.push(SimEvent::Pollution { entity, amount: 1 });
            if self.pollution.add(1.0) {
                events.push(SimEvent::PollutionOverflow);
            }
        }

        player_movement_system(world);

        for contact in self.trigger.update(world, &self.surface) {
            self.handle_contact(world, &contact, &mut events);
        }

        self.buoyancy.tick(
            world,
            &self.config.buoyancy,
            self.surface.surface_level(),
            self.time,
        );
        self.surface.fixed_tick(FIXED_DT, &self.config.springs);

        physics_step(world, FIXED_DT);
        let collisions = collision_system(world);
        grounded_system(world, &collisions);

        self.coupler.end_step(world);
        self.step += 1;
        self.time += FIXED_DT;
        events
    }

    /// Route one trigger contact to the coupler and the buoyancy set.
    pub fn handle_contact(
        &mut self,
        world: &mut World,
        contact: &ContactEvent,
        events: &mut Vec<SimEvent>,
    ) {
        let entity = contact.entity;
        match contact.kind {
            ContactKind::Enter { .. } => {
                if let Some(splash) =
                    self.coupler
                        .on_enter(world, &mut self.surface, contact, self.step)
                {
                    events.push(SimEvent::Splash {
                        entity,
                        x: splash.origin.x,
                        y: splash.origin.y,
                        velocity: splash.velocity,
                        points: splash.points,
                    });
                }
                self.buoyancy.track(entity);
            }
            ContactKind::Stay => {
                self.buoyancy.track(entity);
                self.coupler
                    .on_stay(world, self.surface.surface_level(), entity);
            }
            ContactKind::Exit => {
                self.buoyancy.untrack(entity);
                self.coupler.on_exit(entity);
            }
        }

        if contact.category == BodyCategory::Player {
            let submerged = !matches!(contact.kind, ContactKind::Exit);
            if set_submerged(world, entity, submerged) {
                log::debug!("player {entity:?} submerged: {submerged}");
                events.push(SimEvent::SubmergedChanged { entity, submerged });
            }
        }
    }

    /// Variable-rate hook: the water rises while no player is in it, and the
    /// pollution gauge animates.
    pub fn frame_update(&mut self, world: &World, dt: f64) {
        let player_submerged = world
            .query::<&BodyCategory>()
            .with::<&Submerged>()
            .iter()
            .any(|(_, category)| *category == BodyCategory::Player);
        if !player_submerged {
            self.surface.raise(self.config.rising.speed * dt);
        }
        self.pollution.animate(dt);
    }

    /// Resize the water. Motion on the surface is discarded; bodies inside
    /// keep their contacts.
    pub fn regenerate(&mut self, points: usize, width: f64, height: f64) -> SimResult<()> {
        self.surface.regenerate(points, width, height)?;
        self.config.surface.points = points;
        self.config.surface.width = width;
        self.config.surface.height = height;
        Ok(())
    }

    pub fn surface(&self) -> &WaterSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut WaterSurface {
        &mut self.surface
    }

    pub fn config(&self) -> &WaterConfig {
        &self.config
    }

    pub fn buoyancy(&self) -> &BuoyancyTracker {
        &self.buoyancy
    }

    pub fn coupler(&self) -> &CollisionCoupler {
        &self.coupler
    }

    pub fn pollution(&self) -> &PollutionMeter {
        &self.pollution
    }

    pub fn pollution_mut(&mut self) -> &mut PollutionMeter {
        &mut self.pollution
    }

    /// Fixed steps run so far.
    pub fn step_count(&self) -> u64 {
        self.step
    }

    /// Simulated seconds, advanced only by fixed steps.
    pub fn time(&self) -> f64 {
        self.time
    }
}
