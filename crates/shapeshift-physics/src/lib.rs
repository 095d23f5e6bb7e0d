//! Shapeshift Physics - 2D collision world using rapier2d
//!
//! Provides raycasts, overlap tests, tagged surfaces, and kinematic movement
//! for the player body. Gameplay code talks to the world through the
//! [`PhysicsQuery`] and [`BodyMover`] traits.

mod body;
mod launch_pad;
mod layers;
mod mover;
mod query;

pub use body::{Body, BodyMover, BodyShape, MoveOutcome};
pub use launch_pad::LaunchPadData;
pub use layers::LayerMask;
pub use mover::MoverConfig;
pub use query::{
    ColliderControl, ColliderId, Contact, PhysicsQuery, RayHit, SurfaceInfo, SurfaceTag,
};

use std::collections::HashMap;

use glam::Vec2;
use nalgebra::Unit;
use rapier2d::control::KinematicCharacterController;
use rapier2d::parry::shape::Cuboid;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};
use shapeshift_core::Aabb;

/// Physics world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec2,
    /// Kinematic mover settings
    pub mover: MoverConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            mover: MoverConfig::default(),
        }
    }
}

/// The collision world holding all level geometry
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage (level geometry is parentless, kept for rapier APIs)
    rigid_body_set: RigidBodySet,
    /// Collider storage
    collider_set: ColliderSet,
    /// Island manager, needed for collider removal
    island_manager: IslandManager,
    /// Query pipeline for raycasts and shape queries
    query_pipeline: QueryPipeline,
    /// Kinematic controller used to move player bodies
    controller: KinematicCharacterController,
    /// Gameplay data per collider
    surfaces: HashMap<ColliderHandle, SurfaceInfo>,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let controller = config.mover.build_controller();
        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            query_pipeline: QueryPipeline::new(),
            controller,
            surfaces: HashMap::new(),
        }
    }

    /// Rebuild the query acceleration structure after geometry changes
    pub fn refresh(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Insert a static collider on `layers` with optional gameplay data
    pub fn add_static_collider(
        &mut self,
        collider: Collider,
        layers: LayerMask,
        surface: Option<SurfaceInfo>,
    ) -> ColliderId {
        let mut collider = collider;
        collider.set_collision_groups(layers.membership());
        let handle = self.collider_set.insert(collider);
        if let Some(surface) = surface {
            self.surfaces.insert(handle, surface);
        }
        self.refresh();
        to_id(handle)
    }

    /// Create a static box collider
    pub fn add_static_box(
        &mut self,
        half_extents: Vec2,
        position: Vec2,
        layers: LayerMask,
        surface: Option<SurfaceInfo>,
    ) -> ColliderId {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .translation(vector![position.x, position.y])
            .friction(0.0)
            .build();
        self.add_static_collider(collider, layers, surface)
    }

    /// Create a ground plane collider
    pub fn create_ground(&mut self, y: f32) -> ColliderId {
        let normal = Unit::new_normalize(vector![0.0, 1.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y])
            .friction(0.0)
            .restitution(0.0)
            .build();
        self.add_static_collider(ground, LayerMask::GROUND, None)
    }

    /// Remove a collider and its gameplay data
    pub fn remove_collider(&mut self, id: ColliderId) {
        let handle = from_id(id);
        self.collider_set
            .remove(handle, &mut self.island_manager, &mut self.rigid_body_set, true);
        self.surfaces.remove(&handle);
        self.refresh();
    }

    /// Number of colliders in the world
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    fn filter_groups(mask: LayerMask) -> InteractionGroups {
        mask.query_filter()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsQuery for PhysicsWorld {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        let ray = Ray::new(point![origin.x, origin.y], vector![direction.x, direction.y]);
        let enabled = |_: ColliderHandle, c: &Collider| c.is_enabled();
        let filter = QueryFilter::new()
            .groups(Self::filter_groups(mask))
            .predicate(&enabled);

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, intersection)| RayHit {
                collider: to_id(handle),
                distance: intersection.time_of_impact,
                point: origin + direction * intersection.time_of_impact,
                normal: Vec2::new(intersection.normal.x, intersection.normal.y),
            })
    }

    fn overlaps(&self, bounds: Aabb, mask: LayerMask) -> bool {
        let half = bounds.half_extents();
        let center = bounds.center();
        let shape = Cuboid::new(vector![half.x.max(1e-4), half.y.max(1e-4)]);
        let pos = Isometry::translation(center.x, center.y);
        let enabled = |_: ColliderHandle, c: &Collider| c.is_enabled();
        let filter = QueryFilter::new()
            .groups(Self::filter_groups(mask))
            .predicate(&enabled);

        self.query_pipeline
            .intersection_with_shape(&self.rigid_body_set, &self.collider_set, &pos, &shape, filter)
            .is_some()
    }

    fn surface(&self, collider: ColliderId) -> Option<SurfaceInfo> {
        self.surfaces.get(&from_id(collider)).cloned()
    }

    fn collider_bounds(&self, collider: ColliderId) -> Option<Aabb> {
        self.collider_set.get(from_id(collider)).map(|c| {
            let aabb = c.compute_aabb();
            Aabb::new(
                Vec2::new(aabb.mins.x, aabb.mins.y),
                Vec2::new(aabb.maxs.x, aabb.maxs.y),
            )
        })
    }

    fn is_collider_enabled(&self, collider: ColliderId) -> bool {
        self.collider_set
            .get(from_id(collider))
            .is_some_and(|c| c.is_enabled())
    }
}

impl ColliderControl for PhysicsWorld {
    fn set_collider_enabled(&mut self, id: ColliderId, enabled: bool) -> bool {
        let Some(collider) = self.collider_set.get_mut(from_id(id)) else {
            return false;
        };
        collider.set_enabled(enabled);
        self.refresh();
        true
    }
}

pub(crate) fn to_id(handle: ColliderHandle) -> ColliderId {
    let (index, generation) = handle.into_raw_parts();
    ColliderId(((generation as u64) << 32) | index as u64)
}

pub(crate) fn from_id(id: ColliderId) -> ColliderHandle {
    ColliderHandle::from_raw_parts(id.0 as u32, (id.0 >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new();
        assert_eq!(world.config.gravity, Vec2::new(0.0, -9.81));
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn test_raycast_hits_ground() {
        let mut world = PhysicsWorld::new();
        let ground = world.create_ground(0.0);

        let hit = world
            .raycast(Vec2::new(0.0, 10.0), Vec2::NEG_Y, 100.0, LayerMask::GROUND)
            .expect("ray should hit the ground");
        assert_eq!(hit.collider, ground);
        assert!((hit.distance - 10.0).abs() < 1e-3);
        assert!(hit.normal.y > 0.99);
    }

    #[test]
    fn test_raycast_respects_mask_and_enabled() {
        let mut world = PhysicsWorld::new();
        let block = world.add_static_box(
            Vec2::new(1.0, 0.5),
            Vec2::new(0.0, 5.0),
            LayerMask::SWINGABLE,
            None,
        );

        assert!(world
            .raycast(Vec2::ZERO, Vec2::Y, 10.0, LayerMask::GROUND)
            .is_none());
        assert!(world
            .raycast(Vec2::ZERO, Vec2::Y, 10.0, LayerMask::SWINGABLE)
            .is_some());

        assert!(world.set_collider_enabled(block, false));
        assert!(!world.is_collider_enabled(block));
        assert!(world
            .raycast(Vec2::ZERO, Vec2::Y, 10.0, LayerMask::SWINGABLE)
            .is_none());
    }

    #[test]
    fn test_surface_lookup() {
        let mut world = PhysicsWorld::new();
        let pad = world.add_static_box(
            Vec2::new(1.0, 0.25),
            Vec2::ZERO,
            LayerMask::GROUND,
            Some(SurfaceInfo::launch_pad(LaunchPadData::default())),
        );
        let plain = world.add_static_box(Vec2::ONE, Vec2::new(5.0, 0.0), LayerMask::GROUND, None);

        assert_eq!(world.surface_tag(pad), SurfaceTag::LaunchPad);
        assert!(world.surface(pad).and_then(|s| s.launch_pad).is_some());
        assert_eq!(world.surface_tag(plain), SurfaceTag::Plain);

        world.remove_collider(pad);
        assert!(world.surface(pad).is_none());
        assert!(world.collider_bounds(pad).is_none());
    }

    #[test]
    fn test_overlaps_and_bounds() {
        let mut world = PhysicsWorld::new();
        let block = world.add_static_box(Vec2::ONE, Vec2::new(3.0, 0.0), LayerMask::HAZARD, None);

        let bounds = world.collider_bounds(block).expect("bounds");
        assert!((bounds.min - Vec2::new(2.0, -1.0)).length() < 1e-4);

        let probe = Aabb::from_center(Vec2::new(2.5, 0.0), Vec2::splat(0.5));
        assert!(world.overlaps(probe, LayerMask::HAZARD));
        assert!(!world.overlaps(probe, LayerMask::GROUND));
        assert!(!world.overlaps(probe.translated(Vec2::new(-5.0, 0.0)), LayerMask::HAZARD));
    }
}
