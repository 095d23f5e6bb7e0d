//! Time system for Shapeshift
//!
//! Handles game time, the fixed physics step, and the global time scale that
//! the shape selector slows down while a selection is open.

use serde::{Deserialize, Serialize};

/// Configuration for game time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Fixed timestep for physics at time scale 1.0 (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
    /// Time scale used while the shape selection is open
    pub slow_time_scale: f32,
    /// How fast the time scale recovers toward 1.0, per unscaled second
    pub recovery_speed: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 0.02,
            max_delta_time: 0.25,
            slow_time_scale: 0.05,
            recovery_speed: 2.0,
        }
    }
}

/// Global time scale with a slow-motion mode and a ramped recovery
///
/// `slow` drops the scale at once, `release` lets it ramp back to 1.0 over the
/// following frames, `restore_immediate` snaps it back regardless of the lock.
#[derive(Debug, Clone)]
pub struct TimeScale {
    value: f32,
    slowed: bool,
    can_change: bool,
    /// A release that arrived while locked, applied on unlock
    release_pending: bool,
    slow_value: f32,
    recovery_speed: f32,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(&TimeConfig::default())
    }
}

impl TimeScale {
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            value: 1.0,
            slowed: false,
            can_change: true,
            release_pending: false,
            slow_value: config.slow_time_scale.clamp(0.001, 1.0),
            recovery_speed: config.recovery_speed.max(0.0),
        }
    }

    /// Current time scale
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether slow motion is currently held
    pub fn is_slowed(&self) -> bool {
        self.slowed
    }

    pub fn can_change(&self) -> bool {
        self.can_change
    }

    /// Allow or forbid slow-motion changes (scripted sequences, death)
    ///
    /// Unlocking applies a release that was requested while locked.
    pub fn set_can_change(&mut self, can_change: bool) {
        self.can_change = can_change;
        if can_change && self.release_pending {
            self.release_pending = false;
            self.slowed = false;
        }
    }

    /// Enter slow motion; ignored while locked or already slowed
    pub fn slow(&mut self) -> bool {
        if !self.can_change || self.slowed {
            return false;
        }
        self.slowed = true;
        self.value = self.slow_value;
        true
    }

    /// Leave slow motion; the value ramps back in [`TimeScale::tick`]
    pub fn release(&mut self) {
        if !self.can_change {
            self.release_pending = self.slowed;
            return;
        }
        self.slowed = false;
    }

    /// Snap back to 1.0 right now, even while locked
    pub fn restore_immediate(&mut self) {
        self.slowed = false;
        self.release_pending = false;
        self.value = 1.0;
    }

    /// Advance the recovery ramp by one frame of unscaled time
    pub fn tick(&mut self, unscaled_delta: f32) {
        if self.slowed {
            return;
        }
        if self.value < 1.0 {
            self.value = (self.value + self.recovery_speed * unscaled_delta).min(1.0);
        } else {
            self.value = 1.0;
        }
    }
}

/// Game time tracking
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Time since game start in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped and scaled)
    pub delta_time: f32,
    /// Unscaled delta time
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether the game is paused
    pub paused: bool,
    /// Current time scale applied to `delta_time` and the fixed step
    time_scale: f32,
    /// Accumulated unscaled time for fixed timestep
    fixed_accumulator: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TimeConfig::default())
    }
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            total_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            paused: false,
            time_scale: 1.0,
            fixed_accumulator: 0.0,
        }
    }

    /// Update the game time with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.min(self.config.max_delta_time);
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.unscaled_delta_time;
    }

    /// Get the number of fixed timesteps to process this frame
    ///
    /// Steps run at the unscaled cadence; each one advances
    /// [`GameTime::fixed_delta`] seconds of game time.
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        steps
    }

    /// Game time covered by one fixed step at the current time scale
    pub fn fixed_delta(&self) -> f32 {
        self.config.fixed_timestep * self.time_scale
    }

    /// Get the interpolation factor for rendering between physics steps
    pub fn fixed_interpolation(&self) -> f32 {
        self.fixed_accumulator / self.config.fixed_timestep
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale (0.0 = frozen, 1.0 = normal)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Pause the game
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the game
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}
