#[cfg(feature = "viewer")]
mod app;
#[cfg(feature = "viewer")]
mod engine;
#[cfg(feature = "viewer")]
mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tidepool::components::{BodyCategory, Submerged, Transform2d};
use tidepool::scene::pond::load_pond;
use tidepool::sim::{SimEvent, WaterSimulation};
use tidepool::WaterConfig;

#[derive(Parser)]
#[command(name = "tidepool", about = "Interactive 2D water surface simulation")]
struct Args {
    /// RON file with water tuning. Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed steps to run headless.
    #[arg(long, default_value_t = 500)]
    ticks: u64,

    /// Seed for scene layout and splash spin.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print the effective configuration as RON and exit.
    #[arg(long)]
    dump_config: bool,

    /// Open a window instead of running headless (needs the `viewer` feature).
    #[arg(long)]
    view: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => WaterConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => WaterConfig::default(),
    };

    if args.dump_config {
        println!("{}", config.to_ron().context("serializing config")?);
        return Ok(());
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut world = World::new();
    let player = load_pond(&mut world, &config.surface, &mut rng);
    let sim = WaterSimulation::new(config, args.seed).context("building simulation")?;

    log::debug!("player is {player:?}");

    if args.view {
        #[cfg(feature = "viewer")]
        return run_viewer(world, sim, player, rng);
        #[cfg(not(feature = "viewer"))]
        log::warn!("built without the viewer feature, running headless");
    }

    run_headless(&mut world, sim, args.ticks);
    Ok(())
}

/// Step the pond without a window and log what happens.
fn run_headless(world: &mut World, mut sim: WaterSimulation, ticks: u64) {
    let mut splashes = 0usize;
    let mut pollution = 0u32;

    for _ in 0..ticks {
        let events = sim.fixed_step(world);
        for event in &events {
            match event {
                SimEvent::Splash { entity, x, y, velocity, points } => {
                    splashes += 1;
                    log::info!(
                        "step {}: {entity:?} splashed at ({x:.2}, {y:.2}), {velocity:.2} over {points} points",
                        sim.step_count()
                    );
                }
                SimEvent::Pollution { amount, .. } => pollution += amount,
                SimEvent::PollutionOverflow => {
                    log::warn!("step {}: pond overflowed with rubbish", sim.step_count())
                }
                SimEvent::SubmergedChanged { submerged, .. } => {
                    log::info!("step {}: player submerged = {submerged}", sim.step_count())
                }
            }
        }
        sim.frame_update(world, tidepool::systems::FIXED_DT);

        log::debug!(
            "step {}: level {:.3}, energy {:.4}, floating {}",
            sim.step_count(),
            sim.surface().surface_level(),
            sim.surface().wave().displacement_energy(),
            sim.buoyancy().len()
        );
    }

    let submerged_players = world
        .query::<&BodyCategory>()
        .with::<&Submerged>()
        .iter()
        .filter(|(_, c)| **c == BodyCategory::Player)
        .count();
    let lowest = world
        .query::<&Transform2d>()
        .iter()
        .map(|(_, t)| t.position.y)
        .fold(f64::INFINITY, f64::min);

    log::info!(
        "ran {} steps ({:.1}s): {splashes} splashes, {pollution} rubbish settled, pollution {:.0}%, water line {:.3}, lowest body {lowest:.2}, players in water {submerged_players}",
        sim.step_count(),
        sim.time(),
        sim.pollution().target() * 100.0,
        sim.surface().surface_level(),
    );
}

#[cfg(feature = "viewer")]
fn run_viewer(
    world: World,
    sim: WaterSimulation,
    player: hecs::Entity,
    rng: StdRng,
) -> Result<()> {
    let sdl = sdl2::init().map_err(anyhow::Error::msg).context("initialising SDL2")?;
    let window = engine::window::GameWindow::new(&sdl, "tidepool", 1280, 720)
        .map_err(anyhow::Error::msg)
        .context("opening window")?;
    let mut app = app::ViewerApp::new(world, sim, player, rng)?;
    app.run(&sdl, &window)
}
