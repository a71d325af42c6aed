use glam::DVec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::config::SurfaceConfig;
use crate::scene::prefabs::{spawn_crate, spawn_debris, spawn_ground, spawn_player};

const BANK_WIDTH: f64 = 3.0;
const FLOOR_THICKNESS: f64 = 1.0;
const DROP_HEIGHT: f64 = 3.0;

/// What [`drop_body`] spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Crate,
    Debris,
}

/// A basin fitted around the water box with a bank on each side, the player
/// on the left bank and a few crates and pieces of rubbish falling in.
/// Returns the player.
pub fn load_pond(world: &mut World, surface: &SurfaceConfig, rng: &mut impl Rng) -> Entity {
    let (cx, cy) = surface.origin;
    let half_w = surface.width / 2.0;
    let half_h = surface.height / 2.0;

    // Floor under the water, spanning both banks.
    spawn_ground(
        world,
        DVec2::new(cx, cy - half_h - FLOOR_THICKNESS / 2.0),
        DVec2::new(half_w + BANK_WIDTH, FLOOR_THICKNESS / 2.0),
    );
    for side in [-1.0, 1.0] {
        spawn_ground(
            world,
            DVec2::new(cx + side * (half_w + BANK_WIDTH / 2.0), cy),
            DVec2::new(BANK_WIDTH / 2.0, half_h),
        );
    }

    let player = spawn_player(
        world,
        DVec2::new(cx - half_w - BANK_WIDTH / 2.0, cy + half_h + 1.0),
    );

    for _ in 0..3 {
        drop_body(world, surface, rng, DropKind::Crate);
    }
    for _ in 0..2 {
        drop_body(world, surface, rng, DropKind::Debris);
    }

    log::info!("pond loaded: {} entities", world.len());
    player
}

/// Spawn a body somewhere above the water with a small random push.
pub fn drop_body(
    world: &mut World,
    surface: &SurfaceConfig,
    rng: &mut impl Rng,
    kind: DropKind,
) -> Entity {
    let (cx, cy) = surface.origin;
    let half_w = surface.width / 2.0 * 0.8;
    let position = DVec2::new(
        cx + rng.gen_range(-half_w..=half_w),
        cy + surface.height / 2.0 + DROP_HEIGHT + rng.gen_range(0.0..2.0),
    );
    let velocity = DVec2::new(rng.gen_range(-1.0..=1.0), 0.0);
    match kind {
        DropKind::Crate => {
            let size = rng.gen_range(0.25..0.5);
            spawn_crate(world, position, DVec2::splat(size), velocity)
        }
        DropKind::Debris => spawn_debris(world, position, velocity),
    }
}
