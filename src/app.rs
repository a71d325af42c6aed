use anyhow::{anyhow, Result};
use hecs::{Entity, World};
use rand::rngs::StdRng;
use sdl2::keyboard::Scancode;
use sdl2::Sdl;

use crate::engine::input::InputState;
use crate::engine::time::FrameTimer;
use crate::engine::window::GameWindow;
use crate::renderer::Renderer;
use tidepool::components::PlayerIntent;
use tidepool::config::MIN_POINTS;
use tidepool::scene::pond::{drop_body, DropKind};
use tidepool::sim::{SimEvent, WaterSimulation};

const RESOLUTION_STEP: usize = 10;

/// Interactive window around a [`WaterSimulation`].
///
/// A/D walk, Space jumps, C drops a crate, X drops rubbish, Up/Down change
/// the surface resolution, R drains the pollution meter.
pub struct ViewerApp {
    world: World,
    sim: WaterSimulation,
    player: Entity,
    rng: StdRng,
    renderer: Renderer,
}

impl ViewerApp {
    pub fn new(world: World, sim: WaterSimulation, player: Entity, rng: StdRng) -> Result<Self> {
        Ok(Self {
            world,
            sim,
            player,
            rng,
            renderer: Renderer::init().map_err(|e| anyhow!(e))?,
        })
    }

    pub fn run(&mut self, sdl: &Sdl, window: &GameWindow) -> Result<()> {
        let mut event_pump = sdl.event_pump().map_err(|e| anyhow!(e))?;
        let mut input = InputState::new();
        let mut timer = FrameTimer::new();

        loop {
            timer.tick();
            input.update(&mut event_pump);
            if input.quit {
                break;
            }

            self.handle_input(&input);
            let (events, alpha) = self.sim.advance(&mut self.world, timer.dt);
            for event in &events {
                report(event);
            }

            let (w, h) = window.size();
            self.renderer.resize(w, h);
            self.renderer
                .draw_scene(&self.world, self.sim.surface(), window.aspect_ratio(), alpha);
            window.swap();
        }
        Ok(())
    }

    fn handle_input(&mut self, input: &InputState) {
        if let Ok(mut intent) = self.world.get::<&mut PlayerIntent>(self.player) {
            intent.move_x = input.axis(Scancode::A, Scancode::D);
            intent.jump |= input.was_pressed(Scancode::Space);
        }

        // Drop relative to where the water is now, not where it started.
        let mut surface = self.sim.config().surface.clone();
        let origin = self.sim.surface().origin();
        surface.origin = (origin.x, origin.y);
        if input.was_pressed(Scancode::C) {
            drop_body(&mut self.world, &surface, &mut self.rng, DropKind::Crate);
        }
        if input.was_pressed(Scancode::X) {
            drop_body(&mut self.world, &surface, &mut self.rng, DropKind::Debris);
        }
        if input.was_pressed(Scancode::R) {
            self.sim.pollution_mut().reset();
            log::info!("pollution reset");
        }

        let points = if input.was_pressed(Scancode::Up) {
            Some(surface.points + RESOLUTION_STEP)
        } else if input.was_pressed(Scancode::Down) {
            Some(surface.points.saturating_sub(RESOLUTION_STEP).max(MIN_POINTS))
        } else {
            None
        };
        if let Some(points) = points {
            if let Err(e) = self.sim.regenerate(points, surface.width, surface.height) {
                log::warn!("could not regenerate water: {e}");
            }
        }
    }
}

fn report(event: &SimEvent) {
    match event {
        SimEvent::Splash { velocity, points, .. } => {
            log::debug!("splash {velocity:.2} over {points} points")
        }
        SimEvent::Pollution { amount, .. } => log::info!("rubbish settled (+{amount})"),
        SimEvent::PollutionOverflow => log::warn!("the pond is too polluted"),
        SimEvent::SubmergedChanged { submerged, .. } => {
            log::info!("player {}", if *submerged { "fell in" } else { "climbed out" })
        }
    }
}
