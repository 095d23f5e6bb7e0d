//! Per-shape movement controllers and the pieces they share

mod afterimage;
mod contract;
mod dash;
mod ground;
mod jump;
mod movement;
mod roll;
mod rope;
mod swing;

pub use afterimage::{Afterimage, AfterimageConfig, AfterimageTrail};
pub use contract::{PlayerController, VelocitySnapshot};
pub use dash::{dash_velocity, snap_to_eight_directions, DashConfig, DashController};
pub use ground::{GroundReading, GroundSensor, GroundSensorConfig};
pub use jump::{JumpConfig, JumpState};
pub use movement::{accelerate_x, move_towards, RunConfig, RunRates};
pub use roll::{RollConfig, RollController, RollState};
pub use rope::{rope_polyline, RopeConfig};
pub use swing::{SwingAnchor, SwingConfig, SwingController, SwingMode, SwingState};
