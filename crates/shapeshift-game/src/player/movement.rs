//! Horizontal run model shared by every shape

use serde::{Deserialize, Serialize};

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Top horizontal speed in units per second
    pub max_speed: f32,
    /// Ground acceleration toward the input direction
    pub ground_acceleration: f32,
    /// Ground deceleration with no input
    pub ground_deceleration: f32,
    /// Ground acceleration when input opposes the current velocity
    pub ground_turn_speed: f32,
    /// Air acceleration (reduced control in air)
    pub air_acceleration: f32,
    /// Air deceleration
    pub air_deceleration: f32,
    /// Air turn speed
    pub air_turn_speed: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_speed: 10.0,
            ground_acceleration: 52.0,
            ground_deceleration: 52.0,
            ground_turn_speed: 80.0,
            air_acceleration: 30.0,
            air_deceleration: 20.0,
            air_turn_speed: 80.0,
        }
    }
}

impl RunConfig {
    /// Get the acceleration based on grounded state
    pub fn acceleration(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_acceleration
        } else {
            self.air_acceleration
        }
    }

    /// Get the deceleration based on grounded state
    pub fn deceleration(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_deceleration
        } else {
            self.air_deceleration
        }
    }

    /// Get the turn speed based on grounded state
    pub fn turn_speed(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_turn_speed
        } else {
            self.air_turn_speed
        }
    }

    /// Advance `vx` one step toward `input_x * max_speed`
    pub fn step(&self, vx: f32, input_x: f32, grounded: bool, dt: f32) -> f32 {
        self.step_scaled(vx, input_x, grounded, 1.0, 1.0, dt)
    }

    /// Same as [`RunConfig::step`] with the rates scaled (air or wall-jump assist)
    pub fn step_scaled(
        &self,
        vx: f32,
        input_x: f32,
        grounded: bool,
        accel_scale: f32,
        decel_scale: f32,
        dt: f32,
    ) -> f32 {
        accelerate_x(
            vx,
            input_x,
            self.max_speed,
            RunRates {
                acceleration: self.acceleration(grounded) * accel_scale,
                deceleration: self.deceleration(grounded) * decel_scale,
                turn_speed: self.turn_speed(grounded) * accel_scale,
            },
            dt,
        )
    }
}

/// Rates for a single run step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRates {
    pub acceleration: f32,
    pub deceleration: f32,
    pub turn_speed: f32,
}

/// Move `vx` toward `input_x * max_speed` by at most one rate step
///
/// Input against the current velocity uses the turn speed; a zero velocity
/// counts as moving along the input.
pub fn accelerate_x(vx: f32, input_x: f32, max_speed: f32, rates: RunRates, dt: f32) -> f32 {
    let desired = input_x * max_speed;
    let max_change = if input_x != 0.0 {
        let same_direction = vx == 0.0 || input_x.signum() == vx.signum();
        if same_direction {
            rates.acceleration * dt
        } else {
            rates.turn_speed * dt
        }
    } else {
        rates.deceleration * dt
    };
    move_towards(vx, desired, max_change)
}

/// Step `current` toward `target` by at most `max_delta`
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
