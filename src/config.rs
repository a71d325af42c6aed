//! Tuning for the water surface and everything that touches it.
//!
//! Every section derives serde with `#[serde(default)]`, so a RON file only
//! needs to list the values it changes:
//!
//! ```text
//! (
//!     surface: (points: 120, width: 14.0),
//!     springs: (spread: 4.0),
//! )
//! ```

use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Fewest points a surface can have and still propagate anything.
pub const MIN_POINTS: usize = 3;
pub const MAX_PROPAGATION_ITERATIONS: u32 = 10;

/// Dimensions of the water body and its spring resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Number of spring points across the top edge.
    pub points: usize,
    pub width: f64,
    pub height: f64,
    /// World position of the centre of the water box.
    pub origin: (f64, f64),
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            points: 70,
            width: 10.0,
            height: 4.0,
            origin: (0.0, 0.0),
        }
    }
}

/// Spring relaxation and wave propagation constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpringParams {
    pub spring_constant: f64,
    pub damping: f64,
    /// Fraction of a height difference pushed into a neighbour per pass.
    pub spread: f64,
    /// Propagation passes per fixed step, 1..=10.
    pub propagation_iterations: u32,
    pub speed_multiplier: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            spring_constant: 1.4,
            damping: 1.1,
            spread: 6.5,
            propagation_iterations: 8,
            speed_multiplier: 5.5,
        }
    }
}

/// How hard an entering body hits the surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImpactConfig {
    pub force_multiplier: f64,
    /// Ceiling on the magnitude of a single splash.
    pub max_force: f64,
    /// Splash radius as a multiple of the body's horizontal half extent.
    pub radius_multiplier: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            force_multiplier: 0.2,
            max_force: 5.0,
            radius_multiplier: 4.15,
        }
    }
}

/// Reactive spin given to bodies by the water. `rotation_strength == 0`
/// turns it off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TorqueConfig {
    /// Continuous torque per unit of depth while submerged.
    pub rotation_strength: f64,
    /// Angular speed above which no more continuous torque is applied.
    pub max_rotation_force: f64,
    /// Multiple of the clamped impact velocity used for the first hit.
    pub impact_multiplier: f64,
    pub randomize_rotation: bool,
}

impl Default for TorqueConfig {
    fn default() -> Self {
        Self {
            rotation_strength: 0.6,
            max_rotation_force: 4.0,
            impact_multiplier: 3.0,
            randomize_rotation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuoyancyParams {
    pub strength: f64,
    pub drag_coefficient: f64,
    pub bob_strength: f64,
}

impl Default for BuoyancyParams {
    fn default() -> Self {
        Self {
            strength: 100.0,
            drag_coefficient: 2.5,
            bob_strength: 0.5,
        }
    }
}

/// The level creeps upward while the player stays dry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RisingConfig {
    /// World units per second.
    pub speed: f64,
}

impl Default for RisingConfig {
    fn default() -> Self {
        Self { speed: 0.03 }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollutionConfig {
    /// Debris count that fills the meter.
    pub max: f64,
    /// Meter units per second the displayed value moves.
    pub animation_speed: f64,
}

impl Default for PollutionConfig {
    fn default() -> Self {
        Self {
            max: 5.0,
            animation_speed: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    pub surface: SurfaceConfig,
    pub springs: SpringParams,
    pub impact: ImpactConfig,
    pub torque: TorqueConfig,
    pub buoyancy: BuoyancyParams,
    pub rising: RisingConfig,
    pub pollution: PollutionConfig,
}

impl WaterConfig {
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SimError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_ron(&contents)?;
        log::info!("loaded water config from {}", path.display());
        Ok(config)
    }

    pub fn from_ron(contents: &str) -> SimResult<Self> {
        let config: WaterConfig = ron::de::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> SimResult<String> {
        let pretty = PrettyConfig::new().with_depth_limit(3);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn validate(&self) -> SimResult<()> {
        validate_surface(self.surface.points, self.surface.width, self.surface.height)?;
        let iterations = self.springs.propagation_iterations;
        if !(1..=MAX_PROPAGATION_ITERATIONS).contains(&iterations) {
            return Err(SimError::invalid(format!(
                "propagation iterations must be in 1..={MAX_PROPAGATION_ITERATIONS}, got {iterations}"
            )));
        }
        if self.impact.max_force < 0.0 {
            return Err(SimError::invalid("max force cannot be negative"));
        }
        if self.pollution.max <= 0.0 {
            return Err(SimError::invalid("pollution max must be positive"));
        }
        Ok(())
    }
}

/// Shared by config validation, wave building and geometry regeneration.
pub(crate) fn validate_surface(points: usize, width: f64, height: f64) -> SimResult<()> {
    if points < MIN_POINTS {
        return Err(SimError::invalid(format!(
            "surface needs at least {MIN_POINTS} points, got {points}"
        )));
    }
    if !(width > 0.0) {
        return Err(SimError::invalid(format!("surface width must be positive, got {width}")));
    }
    if !(height > 0.0) {
        return Err(SimError::invalid(format!(
            "surface height must be positive, got {height}"
        )));
    }
    Ok(())
}
