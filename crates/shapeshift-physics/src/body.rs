//! Player body state and the mover seam that resolves its motion

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::Aabb;

use crate::{Contact, LayerMask};

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BodyShape {
    Box { half_extents: Vec2 },
    Circle { radius: f32 },
}

impl BodyShape {
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            BodyShape::Box { half_extents } => half_extents,
            BodyShape::Circle { radius } => Vec2::splat(radius),
        }
    }
}

/// A simulated player body
///
/// Velocity is integrated by [`Body::integrate`]; position is advanced by a
/// [`BodyMover`] that resolves collisions.
#[derive(Debug, Clone)]
pub struct Body {
    /// Current position (shape center)
    pub position: Vec2,
    /// Current linear velocity
    pub velocity: Vec2,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Mass used for force and impulse application
    pub mass: f32,
    /// Current collision shape
    pub shape: BodyShape,
    /// Layers the body passes through
    pub excluded_layers: LayerMask,
    /// Whether the body takes part in simulation
    pub enabled: bool,
    /// Forces accumulated since the last integration
    force: Vec2,
}

impl Body {
    /// Create a disabled body with the given shape
    pub fn new(shape: BodyShape) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
            mass: 1.0,
            shape,
            excluded_layers: LayerMask::NONE,
            enabled: false,
            force: Vec2::ZERO,
        }
    }

    /// World-space bounds of the current shape
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position, self.shape.half_extents())
    }

    /// Add a continuous force for the next integration
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Apply an instantaneous impulse
    pub fn add_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse / self.mass.max(f32::EPSILON);
    }

    /// Pending force accumulated this step
    pub fn pending_force(&self) -> Vec2 {
        self.force
    }

    /// Drop forces and velocity (respawn, deactivation)
    pub fn reset_motion(&mut self) {
        self.velocity = Vec2::ZERO;
        self.force = Vec2::ZERO;
    }

    /// Apply gravity and accumulated forces to the velocity
    pub fn integrate(&mut self, gravity: Vec2, dt: f32) {
        let acceleration = gravity * self.gravity_scale + self.force / self.mass.max(f32::EPSILON);
        self.velocity += acceleration * dt;
        self.force = Vec2::ZERO;
    }

    /// Remove velocity pointing into a contact surface
    pub fn resolve_contact(&mut self, normal: Vec2) {
        let into = self.velocity.dot(normal);
        if into < 0.0 {
            self.velocity -= normal * into;
        }
    }
}

/// Result of moving a body for one step
#[derive(Debug, Clone, Default)]
pub struct MoveOutcome {
    /// Whether the body ended the step standing on something
    pub grounded: bool,
    /// Surfaces touched during the move
    pub contacts: Vec<Contact>,
}

/// Advances a body's position through the collision world
pub trait BodyMover {
    /// World gravity
    fn gravity(&self) -> Vec2;

    /// Move `body` by `velocity * dt`, resolving collisions
    fn move_body(&mut self, body: &mut Body, dt: f32) -> MoveOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_applies_gravity_scale_and_force() {
        let mut body = Body::new(BodyShape::Box {
            half_extents: Vec2::splat(0.5),
        });
        body.gravity_scale = 2.0;
        body.mass = 2.0;
        body.add_force(Vec2::new(4.0, 0.0));
        body.integrate(Vec2::new(0.0, -10.0), 0.5);

        assert!((body.velocity - Vec2::new(1.0, -10.0)).length() < 1e-5);
        assert_eq!(body.pending_force(), Vec2::ZERO);
    }

    #[test]
    fn test_resolve_contact_keeps_tangential_velocity() {
        let mut body = Body::new(BodyShape::Circle { radius: 0.5 });
        body.velocity = Vec2::new(3.0, -4.0);
        body.resolve_contact(Vec2::Y);
        assert_eq!(body.velocity, Vec2::new(3.0, 0.0));

        // Moving away from the surface is untouched
        body.velocity = Vec2::new(0.0, 2.0);
        body.resolve_contact(Vec2::Y);
        assert_eq!(body.velocity, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_body_bounds_follow_shape() {
        let mut body = Body::new(BodyShape::Box {
            half_extents: Vec2::new(0.5, 1.0),
        });
        body.position = Vec2::new(2.0, 3.0);
        assert_eq!(body.bounds().min, Vec2::new(1.5, 2.0));

        body.shape = BodyShape::Circle { radius: 0.25 };
        assert_eq!(body.bounds().max, Vec2::new(2.25, 3.25));
    }
}
