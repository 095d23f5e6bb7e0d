//! Camera configuration

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// SmoothDamp time when the player leaves the soft zone
    pub smooth_time: f32,
    /// Half size of the zone where the camera barely drifts
    pub dead_zone: Vec2,
    /// Width of the band beyond the dead zone with proportional follow
    pub soft_zone: Vec2,
    /// Per-frame follow fraction inside the dead zone (at 60 fps)
    pub dead_follow: f32,
    /// Per-frame follow fraction at the outer edge of the soft zone (at 60 fps)
    pub soft_follow: f32,
    /// Furthest the camera center may trail the player, per axis
    pub max_lag: Vec2,
    /// Viewport width over height
    pub aspect: f32,
    /// Half view height for maps wider than the view
    pub default_zoom: f32,
    /// Half view height for maps narrower than the view
    pub tight_zoom: f32,
    /// Zoom interpolation rate per second
    pub zoom_speed: f32,
    /// Rate at which the clamp bounds move to a new stage's bounds
    pub bounds_switch_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            smooth_time: 0.2,
            dead_zone: Vec2::new(7.0, 2.0),
            soft_zone: Vec2::new(4.0, 1.0),
            dead_follow: 0.05,
            soft_follow: 0.1,
            max_lag: Vec2::new(8.0, 5.0),
            aspect: 16.0 / 9.0,
            default_zoom: 9.0,
            tight_zoom: 6.0,
            zoom_speed: 1.0,
            bounds_switch_speed: 5.0,
        }
    }
}
