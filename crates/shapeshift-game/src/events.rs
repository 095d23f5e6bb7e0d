//! Fire-and-forget gameplay events
//!
//! Controllers and managers push events while they update; the session drains
//! them once per frame and forwards them to telemetry and the breakable set.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::ShapeVariant;
use shapeshift_physics::ColliderId;

/// How a shape change was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchKind {
    /// Direct select key with no selection open
    Quick,
    /// Confirmed from the slow-motion selection, or forced by a stage
    Mode,
}

/// Something that happened to the player this frame
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The active shape used its ability (turbo on, dash, rope)
    AbilityUsed,
    ShapeChanged {
        from: ShapeVariant,
        to: ShapeVariant,
        kind: SwitchKind,
    },
    /// A swap was refused because the target is locked
    SwapRejected { requested: ShapeVariant },
    Died,
    Respawned { position: Vec2 },
    StageEntered { name: String },
    CheckpointReached { id: u32 },
    /// A rope attached to a breakable surface
    BreakRequested { collider: ColliderId },
}

/// Per-frame event buffer
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<PlayerEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: PlayerEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerEvent> {
        self.events.iter()
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }
}
