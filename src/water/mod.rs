//! The water body: a spring chain along its top edge plus the strip that
//! renders it.

pub mod geometry;
pub mod wave;

use glam::DVec2;

pub use geometry::SurfaceGeometry;
pub use wave::{SurfacePoint, WaveField};

use crate::config::{SpringParams, SurfaceConfig};
use crate::error::SimResult;

/// Wave field and geometry kept in lockstep, positioned in the world.
#[derive(Debug, Clone)]
pub struct WaterSurface {
    origin: DVec2,
    wave: WaveField,
    geometry: SurfaceGeometry,
}

impl WaterSurface {
    pub fn new(config: &SurfaceConfig) -> SimResult<Self> {
        let geometry = SurfaceGeometry::regenerate(config.points, config.width, config.height)?;
        let rest = geometry.top_rest_height();
        let wave = WaveField::build(config.points, config.width, |_| rest)?;
        Ok(Self {
            origin: DVec2::new(config.origin.0, config.origin.1),
            wave,
            geometry,
        })
    }

    /// Rebuild both the geometry and the spring chain for new dimensions.
    /// Any motion on the surface is discarded. Nothing changes on error.
    pub fn regenerate(&mut self, points: usize, width: f64, height: f64) -> SimResult<()> {
        let mut geometry = self.geometry.clone();
        geometry.rebuild(points, width, height)?;
        let rest = geometry.top_rest_height();
        self.wave = WaveField::build(points, width, |_| rest)?;
        self.geometry = geometry;
        log::info!("water regenerated: {points} points, {width:.2} x {height:.2}");
        Ok(())
    }

    /// One fixed step of the springs, then copy heights into the strip.
    pub fn fixed_tick(&mut self, dt: f64, springs: &SpringParams) {
        self.wave.tick(dt, springs);
        self.geometry.sync_top_row(&self.wave);
    }

    /// Indices of the interior points whose top vertex lies within `radius`
    /// of world coordinate `x`.
    pub fn points_near(&self, x: f64, radius: f64) -> Vec<usize> {
        (0..self.wave.len())
            .filter(|&i| !self.wave.is_pinned(i))
            .filter(|&i| (self.point_world_x(i) - x).abs() <= radius)
            .collect()
    }

    pub fn point_world_x(&self, index: usize) -> f64 {
        self.origin.x + self.wave.position_x(index)
    }

    /// Set the same velocity on every listed point.
    pub fn splash(&mut self, indices: &[usize], velocity: f64) {
        for &i in indices {
            self.wave.apply_impulse(i, velocity);
        }
    }

    /// World y of the resting water line (top of the water volume).
    pub fn surface_level(&self) -> f64 {
        self.origin.y + self.geometry.top_rest_height()
    }

    /// World y of the bottom of the water volume.
    pub fn bottom_level(&self) -> f64 {
        self.origin.y - self.geometry.height() / 2.0
    }

    /// Move the whole body of water vertically.
    pub fn raise(&mut self, dy: f64) {
        self.origin.y += dy;
    }

    pub fn edge_endpoints(&self) -> (DVec2, DVec2) {
        self.geometry.edge_endpoints(self.origin)
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn wave(&self) -> &WaveField {
        &self.wave
    }

    pub fn wave_mut(&mut self) -> &mut WaveField {
        &mut self.wave
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn top_heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.geometry.top_heights()
    }
}
