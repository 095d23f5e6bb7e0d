//! Dual-ray ground detection

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_physics::{ColliderId, LaunchPadData, LayerMask, PhysicsQuery, RayHit};

/// Where the two downward rays start and how far they reach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSensorConfig {
    /// Horizontal offset of each ray from the body center
    pub ray_offset_x: f32,
    /// Vertical offset of the ray origins from the body center
    pub origin_offset_y: f32,
    /// Ray length
    pub ray_length: f32,
    /// Layers that count as ground
    pub ground_layers: LayerMask,
}

impl Default for GroundSensorConfig {
    fn default() -> Self {
        Self {
            ray_offset_x: 0.2,
            origin_offset_y: 0.0,
            ray_length: 0.6,
            ground_layers: LayerMask::GROUND | LayerMask::BREAKABLE,
        }
    }
}

impl GroundSensorConfig {
    /// Rays from just inside the bottom corners of a box
    pub fn box_corners(half_extents: Vec2, inset: f32, reach: f32) -> Self {
        Self {
            ray_offset_x: half_extents.x - inset,
            origin_offset_y: -half_extents.y + 0.02,
            ray_length: reach + 0.02,
            ..Self::default()
        }
    }
}

/// Result of one ground probe
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundReading {
    pub right: Option<RayHit>,
    pub left: Option<RayHit>,
}

impl GroundReading {
    pub fn grounded(&self) -> bool {
        self.right.is_some() || self.left.is_some()
    }

    /// Normal of the first hit, right ray first
    pub fn normal(&self) -> Option<Vec2> {
        self.right.or(self.left).map(|hit| hit.normal)
    }
}

/// Dual-ray ground sensor
#[derive(Debug, Clone)]
pub struct GroundSensor {
    pub config: GroundSensorConfig,
    last: GroundReading,
}

impl GroundSensor {
    pub fn new(config: GroundSensorConfig) -> Self {
        Self {
            config,
            last: GroundReading::default(),
        }
    }

    /// Cast both rays from `position` and remember the result
    pub fn sense<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, position: Vec2) -> GroundReading {
        let cfg = &self.config;
        let cast = |dx: f32| {
            let origin = position + Vec2::new(dx, cfg.origin_offset_y);
            world.raycast(origin, Vec2::NEG_Y, cfg.ray_length, cfg.ground_layers)
        };
        self.last = GroundReading {
            right: cast(cfg.ray_offset_x),
            left: cast(-cfg.ray_offset_x),
        };
        self.last
    }

    pub fn reading(&self) -> GroundReading {
        self.last
    }

    pub fn is_grounded(&self) -> bool {
        self.last.grounded()
    }

    /// Force the sensor to read "airborne" until the next probe
    pub fn clear(&mut self) {
        self.last = GroundReading::default();
    }

    /// Launch pad under the last probe, checking the right ray first
    pub fn launch_pad<Q: PhysicsQuery + ?Sized>(
        &self,
        world: &Q,
    ) -> Option<(ColliderId, LaunchPadData)> {
        [self.last.right, self.last.left]
            .into_iter()
            .flatten()
            .find_map(|hit| {
                world
                    .surface(hit.collider)
                    .and_then(|surface| surface.launch_pad)
                    .map(|pad| (hit.collider, pad))
            })
    }
}
