//! Shapeshift Game - Shape-switching platformer logic
//!
//! This crate provides:
//! - Action-based input with winit bindings
//! - The roll, dash and swing movement controllers
//! - Shape unlocks, slow-motion selection and the swap coordinator
//! - Stages, checkpoints and respawn
//! - Follow camera, breakable platforms and play telemetry
//!
//! [`GameSession`] wires all of it to a physics world implementing the
//! `shapeshift_physics` traits.

pub mod breakable;
pub mod camera;
pub mod error;
pub mod events;
pub mod input;
pub mod player;
pub mod respawn;
pub mod session;
pub mod shape;
pub mod stage;
pub mod stats;

#[cfg(test)]
mod test_support;

pub use breakable::{BreakState, BreakableConfig, BreakableSet};
pub use camera::{CameraConfig, CameraRig};
pub use error::{GameError, StageError};
pub use events::{EventQueue, PlayerEvent, SwitchKind};
pub use input::{ControlInput, InputAction, InputBindings, InputHandler, InputState};
pub use player::{PlayerController, VelocitySnapshot};
pub use respawn::{RespawnConfig, RespawnManager, RespawnState};
pub use session::{GameSession, HazardConfig, SessionConfig};
pub use shape::{PlayerManager, RosterConfig, SelectorConfig, SelectorMode, ShapeController};
pub use stage::{BoundaryDirection, StageBoundary, StageDef, StageManager};
pub use stats::{LogStats, PlayerDataLog, ShapeLogDetail, StageLogData};
