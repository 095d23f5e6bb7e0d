//! Rope polyline for the swing visual

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RopeConfig {
    /// Segments in a slack rope
    pub segments: usize,
    /// How far the slack rope sags per unit of slack
    pub sag_multiplier: f32,
    /// Fraction of the max length at which the rope is drawn straight
    pub taut_ratio: f32,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            segments: 20,
            sag_multiplier: 0.5,
            taut_ratio: 0.99,
        }
    }
}

/// Points from the player to the anchor
///
/// A taut rope is a single segment. A slack one is a quadratic Bezier whose
/// control point hangs below the midpoint by the slack times the sag factor.
pub fn rope_polyline(
    player: Vec2,
    anchor: Vec2,
    max_length: f32,
    force_taut: bool,
    config: &RopeConfig,
) -> Vec<Vec2> {
    let distance = player.distance(anchor);
    if force_taut || distance >= max_length * config.taut_ratio || config.segments < 2 {
        return vec![player, anchor];
    }

    let slack = max_length - distance;
    let control = (player + anchor) * 0.5 + Vec2::NEG_Y * slack * config.sag_multiplier;
    (0..=config.segments)
        .map(|i| {
            let t = i as f32 / config.segments as f32;
            let u = 1.0 - t;
            player * (u * u) + control * (2.0 * u * t) + anchor * (t * t)
        })
        .collect()
}
