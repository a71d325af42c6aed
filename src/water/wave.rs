use crate::config::{validate_surface, SpringParams};
use crate::error::SimResult;

/// One oscillator of the surface chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub height: f64,
    pub velocity: f64,
    pub acceleration: f64,
    rest_height: f64,
}

impl SurfacePoint {
    fn at_rest(rest_height: f64) -> Self {
        Self {
            height: rest_height,
            velocity: 0.0,
            acceleration: 0.0,
            rest_height,
        }
    }

    pub fn rest_height(&self) -> f64 {
        self.rest_height
    }

    pub fn displacement(&self) -> f64 {
        self.height - self.rest_height
    }
}

/// Chain of spring points spanning the surface width. The first and last
/// points are pinned and never move.
///
/// Inputs are assumed finite; NaN or infinite parameters propagate as-is.
#[derive(Debug, Clone)]
pub struct WaveField {
    points: Vec<SurfacePoint>,
    width: f64,
}

impl WaveField {
    /// Lay out `point_count` points evenly across `width`, each starting at
    /// rest at `rest_height(index)`.
    pub fn build(
        point_count: usize,
        width: f64,
        rest_height: impl Fn(usize) -> f64,
    ) -> SimResult<Self> {
        // Height only matters to the geometry; any positive value passes here.
        validate_surface(point_count, width, 1.0)?;
        let points = (0..point_count)
            .map(|i| SurfacePoint::at_rest(rest_height(i)))
            .collect();
        Ok(Self { points, width })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn points(&self) -> &[SurfacePoint] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Option<&SurfacePoint> {
        self.points.get(index)
    }

    pub fn height(&self, index: usize) -> f64 {
        self.points[index].height
    }

    pub fn velocity(&self, index: usize) -> f64 {
        self.points[index].velocity
    }

    pub fn heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.height)
    }

    /// Horizontal coordinate of a point relative to the surface centre.
    pub fn position_x(&self, index: usize) -> f64 {
        let last = (self.points.len() - 1) as f64;
        (index as f64 / last) * self.width - self.width / 2.0
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        index == 0 || index + 1 >= self.points.len()
    }

    /// Overwrite (not add to) the velocity of an interior point. Pinned or
    /// out-of-range indices are ignored.
    pub fn apply_impulse(&mut self, index: usize, magnitude: f64) {
        if self.is_pinned(index) {
            return;
        }
        self.points[index].velocity = magnitude;
    }

    /// Advance one fixed step: spring relaxation, then neighbour propagation.
    pub fn tick(&mut self, dt: f64, params: &SpringParams) {
        let step = params.speed_multiplier * dt;
        let last = self.points.len() - 1;

        for point in &mut self.points[1..last] {
            let x = point.height - point.rest_height;
            point.acceleration = -params.spring_constant * x - params.damping * point.velocity;
            // Position moves with the old velocity before the velocity update.
            point.height += point.velocity * step;
            point.velocity += point.acceleration * step;
        }

        for _ in 0..params.propagation_iterations {
            for i in 1..last {
                let here = self.points[i].height;
                let left_delta = params.spread * (here - self.points[i - 1].height) * step;
                let right_delta = params.spread * (here - self.points[i + 1].height) * step;
                if i - 1 != 0 {
                    self.points[i - 1].velocity += left_delta;
                }
                if i + 1 != last {
                    self.points[i + 1].velocity += right_delta;
                }
            }
        }
    }

    /// Sum of squared displacement and squared velocity over all points.
    /// Zero exactly when the surface is flat and still.
    pub fn displacement_energy(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.displacement().powi(2) + p.velocity.powi(2))
            .sum()
    }
}
