//! The capability contract every shape controller implements

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_physics::Body;

/// State carried from the outgoing shape into the incoming one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocitySnapshot {
    pub velocity: Vec2,
    pub dash_count: u32,
    pub facing_right: bool,
}

/// Shared surface of the shape controllers
///
/// The manager only needs this much to hand momentum from one body to the
/// next; everything else is specific to a controller.
pub trait PlayerController {
    /// Remaining dash charges
    fn dash_count(&self) -> u32;

    fn max_dash_count(&self) -> u32;

    /// Set the dash charges, clamped to `[0, max_dash_count]`
    fn set_dash_count(&mut self, count: u32);

    /// Take over from another shape
    ///
    /// Called exactly once when this shape becomes active. Transient state is
    /// already idle; this installs velocity, facing and charges verbatim.
    fn on_enable_set_velocity(&mut self, snapshot: VelocitySnapshot);

    fn facing_right(&self) -> bool;

    fn body(&self) -> &Body;

    fn body_mut(&mut self) -> &mut Body;

    /// Number of times this controller has been handed control
    fn activation_count(&self) -> u32;

    /// Current velocity, charges and facing
    fn snapshot(&self) -> VelocitySnapshot {
        VelocitySnapshot {
            velocity: self.body().velocity,
            dash_count: self.dash_count(),
            facing_right: self.facing_right(),
        }
    }
}
