use crate::config::PollutionConfig;

/// How dirty the water is, as a fraction where 1.0 means overflowing.
/// `displayed` trails `target` so a gauge can animate toward it.
#[derive(Debug, Clone)]
pub struct PollutionMeter {
    /// Raw amount in `0..=max`.
    level: f64,
    displayed: f64,
    max: f64,
    animation_speed: f64,
    overflowed: bool,
}

impl PollutionMeter {
    pub fn new(config: &PollutionConfig) -> Self {
        Self {
            level: 0.0,
            displayed: 0.0,
            max: config.max,
            animation_speed: config.animation_speed,
            overflowed: false,
        }
    }

    /// Raise the level by `amount`. Returns true the first time the meter
    /// overflows.
    pub fn add(&mut self, amount: f64) -> bool {
        self.level = (self.level + amount).clamp(0.0, self.max);
        if self.is_overflowing() && !self.overflowed {
            self.overflowed = true;
            log::warn!("pollution overflowed at {:.1}/{:.1}", self.level, self.max);
            return true;
        }
        false
    }

    pub fn is_overflowing(&self) -> bool {
        self.level >= self.max
    }

    /// Move the displayed level toward the target at `animation_speed` per second.
    pub fn animate(&mut self, dt: f64) {
        let max_step = self.animation_speed * dt;
        let target = self.target();
        let diff = target - self.displayed;
        if diff.abs() <= max_step {
            self.displayed = target;
        } else {
            self.displayed += max_step.copysign(diff);
        }
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.overflowed = false;
    }

    /// Level as a fraction of `max`.
    pub fn target(&self) -> f64 {
        self.level / self.max
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }
}
