//! Kinematic body movement using rapier2d's character controller

use glam::Vec2;
use rapier2d::control::{CharacterCollision, CharacterLength, KinematicCharacterController};
use rapier2d::parry::shape::{Ball, Cuboid, Shape};
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{to_id, Body, BodyMover, BodyShape, Contact, LayerMask, MoveOutcome, PhysicsWorld};

/// Kinematic mover configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// Maximum slope angle the body walks up, in degrees
    pub max_slope_angle: f32,
    /// Gap kept between the body and obstacles
    pub skin_width: f32,
    /// Normal Y above which a contact counts as ground
    pub ground_normal_threshold: f32,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            max_slope_angle: 50.0,
            skin_width: 0.01,
            ground_normal_threshold: 0.7,
        }
    }
}

impl MoverConfig {
    pub(crate) fn build_controller(&self) -> KinematicCharacterController {
        let mut controller = KinematicCharacterController::default();
        controller.max_slope_climb_angle = self.max_slope_angle.to_radians();
        controller.min_slope_slide_angle = self.max_slope_angle.to_radians();
        // Platforming bodies leave the ground freely; no step or snap.
        controller.autostep = None;
        controller.snap_to_ground = None;
        controller.offset = CharacterLength::Absolute(self.skin_width);
        controller
    }
}

fn with_shape<R>(shape: BodyShape, f: impl FnOnce(&dyn Shape) -> R) -> R {
    match shape {
        BodyShape::Box { half_extents } => {
            f(&Cuboid::new(vector![half_extents.x, half_extents.y]))
        }
        BodyShape::Circle { radius } => f(&Ball::new(radius)),
    }
}

impl BodyMover for PhysicsWorld {
    fn gravity(&self) -> Vec2 {
        self.config.gravity
    }

    fn move_body(&mut self, body: &mut Body, dt: f32) -> MoveOutcome {
        if !body.enabled {
            return MoveOutcome::default();
        }

        let desired = body.velocity * dt;
        let pos = Isometry::translation(body.position.x, body.position.y);
        let groups = LayerMask::ALL.without(body.excluded_layers).query_filter();
        let enabled = |_: ColliderHandle, c: &Collider| c.is_enabled();
        let filter = QueryFilter::new().groups(groups).predicate(&enabled);

        let mut contacts = Vec::new();
        let movement = with_shape(body.shape, |shape| {
            self.controller.move_shape(
                dt,
                &self.rigid_body_set,
                &self.collider_set,
                &self.query_pipeline,
                shape,
                &pos,
                vector![desired.x, desired.y],
                filter,
                |collision: CharacterCollision| {
                    let normal = -collision.hit.normal1;
                    contacts.push(Contact {
                        collider: to_id(collision.handle),
                        normal: Vec2::new(normal.x, normal.y).normalize_or_zero(),
                    });
                },
            )
        });

        body.position += Vec2::new(movement.translation.x, movement.translation.y);

        let threshold = self.config.mover.ground_normal_threshold;
        let mut grounded = movement.grounded;
        for contact in &contacts {
            body.resolve_contact(contact.normal);
            if contact.normal.y > threshold {
                grounded = true;
            }
        }

        if !contacts.is_empty() {
            trace!(count = contacts.len(), grounded, "Body contacts");
        }

        MoveOutcome { grounded, contacts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn falling_box() -> Body {
        let mut body = Body::new(BodyShape::Box {
            half_extents: Vec2::splat(0.5),
        });
        body.enabled = true;
        body.position = Vec2::new(0.0, 1.0);
        body
    }

    #[test]
    fn test_move_body_lands_on_ground() {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);
        let mut body = falling_box();
        body.velocity = Vec2::new(0.0, -20.0);

        let mut grounded = false;
        for _ in 0..10 {
            let outcome = world.move_body(&mut body, 0.02);
            grounded |= outcome.grounded;
        }

        assert!(grounded);
        assert!(body.position.y >= 0.49, "body sank: {}", body.position.y);
        assert!(body.velocity.y.abs() < 1e-3);
    }

    #[test]
    fn test_excluded_layers_pass_through() {
        let mut world = PhysicsWorld::new();
        world.add_static_box(
            Vec2::new(2.0, 0.1),
            Vec2::new(0.0, 0.0),
            LayerMask::BREAKABLE,
            None,
        );
        let mut body = falling_box();
        body.excluded_layers = LayerMask::BREAKABLE;
        body.velocity = Vec2::new(0.0, -50.0);

        let outcome = world.move_body(&mut body, 0.1);
        assert!(outcome.contacts.is_empty());
        assert!(body.position.y < -3.0);
    }

    #[test]
    fn test_disabled_body_does_not_move() {
        let mut world = PhysicsWorld::new();
        let mut body = falling_box();
        body.enabled = false;
        body.velocity = Vec2::X;

        world.move_body(&mut body, 1.0);
        assert_eq!(body.position, Vec2::new(0.0, 1.0));
    }
}
