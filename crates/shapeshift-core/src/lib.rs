//! Shapeshift Core - Core types and utilities shared by every Shapeshift crate
//!
//! This crate provides the foundational types used throughout the game:
//! - Mathematical primitives (re-exported from glam)
//! - Shape tags and the fixed per-shape map
//! - Axis-aligned bounds and facing direction
//! - Game clock with fixed timestep and the slow-motion time scale

pub mod shape;
pub mod time;
pub mod types;

pub use glam::Vec2;
pub use shape::{ShapeMap, ShapeMapError, ShapeVariant};
pub use time::{GameTime, TimeConfig, TimeScale};
pub use types::{Aabb, Color, Facing};
