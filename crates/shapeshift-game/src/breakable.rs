//! Breakable platforms: crack, vanish, come back

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shapeshift_physics::{ColliderControl, ColliderId, PhysicsQuery, SurfaceTag};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakableConfig {
    /// Time between the break request and the collider vanishing
    pub crack_time: f32,
    /// Time a broken tile stays gone
    pub restore_time: f32,
}

impl Default for BreakableConfig {
    fn default() -> Self {
        Self {
            crack_time: 1.0,
            restore_time: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakState {
    Cracking { remaining: f32 },
    Broken { remaining: f32 },
}

/// Tiles currently cracking or broken; intact tiles are not tracked
#[derive(Debug, Default)]
pub struct BreakableSet {
    pub config: BreakableConfig,
    tiles: BTreeMap<ColliderId, BreakState>,
}

impl BreakableSet {
    pub fn new(config: BreakableConfig) -> Self {
        Self {
            config,
            tiles: BTreeMap::new(),
        }
    }

    pub fn state(&self, collider: ColliderId) -> Option<BreakState> {
        self.tiles.get(&collider).copied()
    }

    pub fn active_count(&self) -> usize {
        self.tiles.len()
    }

    /// Start cracking a breakable tile; false if it is not breakable or already going
    pub fn request_break<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, collider: ColliderId) -> bool {
        if world.surface_tag(collider) != SurfaceTag::Breakable {
            debug!(collider = collider.0, "Break requested on a solid tile");
            return false;
        }
        if self.tiles.contains_key(&collider) {
            return false;
        }
        self.tiles.insert(
            collider,
            BreakState::Cracking {
                remaining: self.config.crack_time,
            },
        );
        true
    }

    pub fn update<W: ColliderControl + ?Sized>(&mut self, dt: f32, world: &mut W) {
        let restore_time = self.config.restore_time;
        self.tiles.retain(|&collider, state| match *state {
            BreakState::Cracking { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    *state = BreakState::Cracking { remaining };
                    return true;
                }
                if !world.set_collider_enabled(collider, false) {
                    return false;
                }
                info!(collider = collider.0, "Platform broke");
                *state = BreakState::Broken {
                    remaining: restore_time,
                };
                true
            }
            BreakState::Broken { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    *state = BreakState::Broken { remaining };
                    return true;
                }
                world.set_collider_enabled(collider, true);
                debug!(collider = collider.0, "Platform restored");
                false
            }
        });
    }

    /// Bring every tile back at once
    pub fn restore_all<W: ColliderControl + ?Sized>(&mut self, world: &mut W) {
        for (collider, state) in std::mem::take(&mut self.tiles) {
            if matches!(state, BreakState::Broken { .. }) {
                world.set_collider_enabled(collider, true);
            }
        }
    }
}
