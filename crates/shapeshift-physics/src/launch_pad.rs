//! Launch pad parameters attached to pad surfaces

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Launch settings carried by a surface tagged as a launch pad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchPadData {
    /// Launch direction (normalized on read)
    pub direction: Vec2,
    /// Speed held while launched
    pub force: f32,
    /// How long the launch speed is held (seconds)
    pub duration: f32,
    /// Gravity scale applied while launched (0 = none)
    pub gravity_scale: f32,
    /// Continuous time on the pad required before a launch can arm (seconds)
    pub min_dwell_time: f32,
}

impl Default for LaunchPadData {
    fn default() -> Self {
        Self {
            direction: Vec2::Y,
            force: 50.0,
            duration: 1.0,
            gravity_scale: 0.0,
            min_dwell_time: 1.0,
        }
    }
}

impl LaunchPadData {
    /// Normalized launch direction, straight up when unset
    pub fn direction(&self) -> Vec2 {
        let dir = self.direction.normalize_or_zero();
        if dir == Vec2::ZERO {
            Vec2::Y
        } else {
            dir
        }
    }

    /// Velocity held for the whole launch
    pub fn launch_velocity(&self) -> Vec2 {
        self.direction() * self.force
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_velocity_normalizes_direction() {
        let pad = LaunchPadData {
            direction: Vec2::new(3.0, 4.0),
            force: 10.0,
            ..Default::default()
        };
        let v = pad.launch_velocity();
        assert!((v - Vec2::new(6.0, 8.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_direction_falls_back_to_up() {
        let pad = LaunchPadData {
            direction: Vec2::ZERO,
            ..Default::default()
        };
        assert_eq!(pad.direction(), Vec2::Y);
    }
}
