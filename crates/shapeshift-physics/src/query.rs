//! Engine-agnostic query surface consumed by the player controllers

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::Aabb;

use crate::{LaunchPadData, LayerMask};

/// Opaque identifier of a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderId(pub u64);

/// Gameplay tag attached to a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceTag {
    #[default]
    Plain,
    /// Fires a launch when left while armed (see [`LaunchPadData`])
    LaunchPad,
    /// Ropes never attach here
    CantSwing,
    /// Breaks when a rope attaches or a dash passes through
    Breakable,
}

/// Per-collider gameplay data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceInfo {
    pub tag: SurfaceTag,
    pub launch_pad: Option<LaunchPadData>,
}

impl SurfaceInfo {
    pub fn tagged(tag: SurfaceTag) -> Self {
        Self {
            tag,
            launch_pad: None,
        }
    }

    pub fn launch_pad(data: LaunchPadData) -> Self {
        Self {
            tag: SurfaceTag::LaunchPad,
            launch_pad: Some(data),
        }
    }
}

/// Raycast hit information
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The collider that was hit
    pub collider: ColliderId,
    /// Distance along the ray to the hit point
    pub distance: f32,
    /// World-space hit point
    pub point: Vec2,
    /// Surface normal at hit point
    pub normal: Vec2,
}

/// A contact reported while moving a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub collider: ColliderId,
    /// Surface normal pointing from the obstacle toward the body
    pub normal: Vec2,
}

/// Read-only queries against the collision world
pub trait PhysicsQuery {
    /// Cast a ray and return the first enabled collider on `mask`
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, mask: LayerMask)
        -> Option<RayHit>;

    /// Check whether any enabled collider on `mask` overlaps `bounds`
    fn overlaps(&self, bounds: Aabb, mask: LayerMask) -> bool;

    /// Gameplay data attached to a collider
    fn surface(&self, collider: ColliderId) -> Option<SurfaceInfo>;

    /// World-space bounds of a collider
    fn collider_bounds(&self, collider: ColliderId) -> Option<Aabb>;

    /// Whether the collider still exists and is enabled
    fn is_collider_enabled(&self, collider: ColliderId) -> bool;

    /// Tag of a collider, [`SurfaceTag::Plain`] when it carries none
    fn surface_tag(&self, collider: ColliderId) -> SurfaceTag {
        self.surface(collider).map(|s| s.tag).unwrap_or_default()
    }
}

/// Mutation of level geometry at runtime (breakable platforms)
pub trait ColliderControl {
    /// Enable or disable a collider; returns false when it no longer exists
    fn set_collider_enabled(&mut self, collider: ColliderId, enabled: bool) -> bool;
}
