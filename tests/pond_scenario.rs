//! End-to-end runs of bodies falling into the pond.

use glam::DVec2;
use hecs::World;
use rand::rngs::StdRng;
use rand::SeedableRng;

use tidepool::components::{Settled, Solid, Submerged, Transform2d};
use tidepool::scene::pond::load_pond;
use tidepool::scene::prefabs::{spawn_crate, spawn_debris, spawn_ground, spawn_player};
use tidepool::systems::FIXED_DT;
use tidepool::{SimEvent, WaterConfig, WaterSimulation};

fn run(sim: &mut WaterSimulation, world: &mut World, steps: usize) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..steps {
        let (step_events, _) = sim.advance(world, FIXED_DT);
        events.extend(step_events);
    }
    events
}

#[test]
fn dropped_crate_splashes_then_floats_at_the_water_line() {
    let mut world = World::new();
    let mut sim = WaterSimulation::new(WaterConfig::default(), 11).unwrap();
    let crate_body = spawn_crate(&mut world, DVec2::new(0.5, 6.0), DVec2::splat(0.3), DVec2::ZERO);

    let events = run(&mut sim, &mut world, 500);

    let splashes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Splash { entity, velocity, points, .. } if *entity == crate_body => {
                Some((*velocity, *points))
            }
            _ => None,
        })
        .collect();
    let (velocity, points) = splashes[0];
    assert!(velocity < 0.0);
    assert!(velocity >= -WaterConfig::default().impact.max_force);
    assert!(points > 0);

    let y = world.get::<&Transform2d>(crate_body).unwrap().position.y;
    let level = sim.surface().surface_level();
    assert!((y - level).abs() < 0.6, "crate at {y}, water line at {level}");
    assert!(sim.buoyancy().contains(crate_body));

    let wave = sim.surface().wave();
    let rest = wave.points()[0].rest_height();
    assert_eq!(wave.height(0), rest);
    assert_eq!(wave.height(wave.len() - 1), rest);
}

#[test]
fn each_piece_of_debris_pollutes_exactly_once() {
    let mut world = World::new();
    let mut sim = WaterSimulation::new(WaterConfig::default(), 5).unwrap();
    let debris: Vec<_> = [-4.0, -2.0, 0.0, 2.0, 4.0]
        .into_iter()
        .map(|x| spawn_debris(&mut world, DVec2::new(x, 4.0), DVec2::ZERO))
        .collect();

    let events = run(&mut sim, &mut world, 400);

    let polluted: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Pollution { entity, amount } => Some((*entity, *amount)),
            _ => None,
        })
        .collect();
    assert_eq!(polluted.len(), debris.len());
    for piece in &debris {
        assert!(polluted.contains(&(*piece, 1)));
        assert!(world.get::<&Solid>(*piece).is_err());
        assert!(world.get::<&Settled>(*piece).is_ok());
    }

    let overflows = events
        .iter()
        .filter(|e| matches!(e, SimEvent::PollutionOverflow))
        .count();
    assert_eq!(overflows, 1);
    assert!(sim.pollution().is_overflowing());
}

#[test]
fn water_stops_rising_once_the_player_falls_in() {
    let mut world = World::new();
    let mut sim = WaterSimulation::new(WaterConfig::default(), 2).unwrap();
    // Left bank, flush with the water line.
    spawn_ground(&mut world, DVec2::new(-6.5, 0.0), DVec2::new(1.5, 2.0));
    let player = spawn_player(&mut world, DVec2::new(-6.5, 2.5));
    world
        .get::<&mut tidepool::components::PlayerIntent>(player)
        .unwrap()
        .move_x = 1.0;

    let mut fell_in = false;
    for _ in 0..300 {
        let (events, _) = sim.advance(&mut world, FIXED_DT);
        if events.contains(&SimEvent::SubmergedChanged {
            entity: player,
            submerged: true,
        }) {
            fell_in = true;
            break;
        }
    }
    assert!(fell_in, "player never reached the water");
    assert!(sim.surface().surface_level() > 2.0);

    let level = sim.surface().surface_level();
    for _ in 0..50 {
        sim.advance(&mut world, FIXED_DT);
        if world.get::<&Submerged>(player).is_ok() {
            assert_eq!(sim.surface().surface_level(), level);
        } else {
            break;
        }
    }
}

#[test]
fn same_seed_replays_identically() {
    let replay = |seed| {
        let config = WaterConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = World::new();
        load_pond(&mut world, &config.surface, &mut rng);
        let mut sim = WaterSimulation::new(config, seed).unwrap();
        let events = run(&mut sim, &mut world, 300);
        let heights: Vec<u64> = sim.surface().top_heights().map(f64::to_bits).collect();
        (events, heights)
    };
    assert_eq!(replay(21), replay(21));
}
