//! Coyote time, jump buffering and the ramped fall gravity

use serde::{Deserialize, Serialize};

/// Jump and gravity configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    /// Upward speed set by a jump; also the upper vertical clamp
    pub max_jump_speed: f32,
    /// Fastest fall speed
    pub max_down_speed: f32,
    /// Deceleration while rising from a jump
    pub jump_deceleration: f32,
    /// How fast the fall gravity ramps up
    pub gravity_acceleration: f32,
    /// Ceiling for the ramped fall gravity
    pub max_gravity: f32,
    /// Coyote time - grace period after leaving ground where you can still jump
    pub coyote_time: f32,
    /// Jump buffer - how long a jump input is remembered before landing
    pub jump_buffer: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            max_jump_speed: 12.0,
            max_down_speed: 20.0,
            jump_deceleration: 30.0,
            gravity_acceleration: 120.0,
            max_gravity: 60.0,
            coyote_time: 0.1,
            jump_buffer: 0.1,
        }
    }
}

/// Jump timers and the rising/falling phase
#[derive(Debug, Clone)]
pub struct JumpState {
    coyote_counter: f32,
    buffer_counter: f32,
    jumping: bool,
    short_hop: bool,
    current_gravity: f32,
    rise_deceleration: f32,
}

impl JumpState {
    pub fn new(config: &JumpConfig) -> Self {
        Self {
            coyote_counter: 0.0,
            buffer_counter: 0.0,
            jumping: false,
            short_hop: false,
            current_gravity: config.jump_deceleration,
            rise_deceleration: config.jump_deceleration,
        }
    }

    /// Back to idle: no buffered jump, no rise, gravity restarts its ramp
    pub fn reset(&mut self, config: &JumpConfig) {
        *self = Self::new(config);
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn buffer_counter(&self) -> f32 {
        self.buffer_counter
    }

    pub fn coyote_counter(&self) -> f32 {
        self.coyote_counter
    }

    /// Jump pressed: buffer it
    pub fn press(&mut self, config: &JumpConfig) {
        self.buffer_counter = config.jump_buffer;
        self.short_hop = false;
    }

    /// Jump released: end the rise, and shorten a jump that has not fired yet
    pub fn release(&mut self) {
        self.jumping = false;
        if self.buffer_counter > 0.0 {
            self.short_hop = true;
        }
    }

    /// Frame-time countdowns
    pub fn tick_timers(&mut self, config: &JumpConfig, grounded: bool, dt: f32) {
        self.buffer_counter -= dt;
        if self.buffer_counter < 0.0 {
            self.short_hop = false;
        }
        if grounded {
            self.coyote_counter = config.coyote_time;
        } else {
            self.coyote_counter -= dt;
        }
    }

    /// Fire a buffered jump if coyote time allows; returns the new vertical speed
    pub fn try_jump(&mut self, config: &JumpConfig) -> Option<f32> {
        if self.buffer_counter <= 0.0 || self.coyote_counter <= 0.0 {
            return None;
        }
        self.buffer_counter = 0.0;
        self.coyote_counter = 0.0;
        self.rise_deceleration = config.jump_deceleration;
        self.jumping = !self.short_hop;
        Some(config.max_jump_speed)
    }

    /// Consume the buffered jump for a wall jump
    pub fn take_buffered(&mut self) -> bool {
        if self.buffer_counter > 0.0 {
            self.buffer_counter = 0.0;
            true
        } else {
            false
        }
    }

    /// Enter the rising phase without a buffered press
    pub fn start_rise(&mut self, deceleration: f32) {
        self.jumping = true;
        self.rise_deceleration = deceleration;
    }

    /// Drop out of the rising phase without touching the timers
    pub fn cancel_rise(&mut self) {
        self.jumping = false;
    }

    /// End the rise at the apex
    pub fn on_ground_check(&mut self, config: &JumpConfig, vy: f32) {
        if self.jumping && vy <= 0.0 {
            self.jumping = false;
            self.current_gravity = config.jump_deceleration;
            self.rise_deceleration = config.jump_deceleration;
        }
    }

    /// Apply one tick of gravity to `vy`
    ///
    /// `wall_slide` caps the fall speed while touching a wall.
    pub fn apply_gravity(
        &mut self,
        config: &JumpConfig,
        vy: f32,
        wall_slide: Option<f32>,
        dt: f32,
    ) -> f32 {
        let mut new_y = if self.jumping {
            vy - self.rise_deceleration * dt
        } else {
            self.current_gravity =
                (self.current_gravity + config.gravity_acceleration * dt).min(config.max_gravity);
            vy - self.current_gravity * dt
        };

        if let Some(max_slide) = wall_slide {
            new_y = new_y.max(-max_slide);
        }

        new_y.clamp(-config.max_down_speed, config.max_jump_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_jump_needs_coyote_time() {
        let config = JumpConfig::default();
        let mut jump = JumpState::new(&config);

        jump.press(&config);
        assert_eq!(jump.try_jump(&config), None);

        jump.tick_timers(&config, true, 0.01);
        assert_eq!(jump.try_jump(&config), Some(config.max_jump_speed));
        assert!(jump.is_jumping());

        // Consumed
        assert_eq!(jump.try_jump(&config), None);
    }

    #[test]
    fn test_coyote_time_expires() {
        let config = JumpConfig::default();
        let mut jump = JumpState::new(&config);
        jump.tick_timers(&config, true, 0.01);
        jump.tick_timers(&config, false, config.coyote_time + 0.01);

        jump.press(&config);
        assert_eq!(jump.try_jump(&config), None);
    }

    #[test]
    fn test_release_before_jump_gives_short_hop() {
        let config = JumpConfig::default();
        let mut jump = JumpState::new(&config);
        jump.tick_timers(&config, true, 0.01);

        jump.press(&config);
        jump.release();
        assert!(jump.try_jump(&config).is_some());
        assert!(!jump.is_jumping());
    }

    #[test]
    fn test_gravity_ramps_and_clamps() {
        let config = JumpConfig::default();
        let mut jump = JumpState::new(&config);

        let first = jump.apply_gravity(&config, 0.0, None, 0.02);
        let second = jump.apply_gravity(&config, first, None, 0.02);
        assert!(second - first < first);

        let mut vy = 0.0;
        for _ in 0..200 {
            vy = jump.apply_gravity(&config, vy, None, 0.02);
        }
        assert_eq!(vy, -config.max_down_speed);

        let slide = jump.apply_gravity(&config, -10.0, Some(3.0), 0.02);
        assert_eq!(slide, -3.0);
    }
}
