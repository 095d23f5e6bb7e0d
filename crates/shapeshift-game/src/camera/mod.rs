//! Camera system module
//!
//! Provides a 2D follow camera with dead/soft zones, stage bounds clamping and
//! zoom.

mod config;
mod rig;

pub use config::CameraConfig;
pub use rig::{smooth_damp, CameraRig};
