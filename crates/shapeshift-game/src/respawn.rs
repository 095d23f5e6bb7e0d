//! Checkpoints, death and timed respawn

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::Aabb;
use shapeshift_physics::{LayerMask, PhysicsQuery};
use tracing::{debug, info, warn};

use crate::camera::CameraRig;
use crate::events::{EventQueue, PlayerEvent};
use crate::shape::PlayerManager;

/// Respawn configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Delay between death and respawn
    pub respawn_time: f32,
    /// Longest wait for an occupied spawn point to clear
    pub overlap_wait_max: f32,
    /// Layers that block a spawn point
    pub blocking_layers: LayerMask,
    /// Half size of the area checked around the spawn point
    pub probe_half_extents: Vec2,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            respawn_time: 1.0,
            overlap_wait_max: 2.0,
            blocking_layers: LayerMask::HAZARD,
            probe_half_extents: Vec2::splat(0.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RespawnState {
    Alive,
    /// Counting down to the respawn
    Dead { timer: f32 },
    /// Timer done, spawn point occupied
    Waiting { waited: f32 },
}

/// Checkpoint registry and the death/respawn cycle
pub struct RespawnManager {
    pub config: RespawnConfig,
    default_spawn: Vec2,
    checkpoints: BTreeMap<u32, Vec2>,
    current_checkpoint: u32,
    current_spawn: Vec2,
    state: RespawnState,
}

impl RespawnManager {
    /// Checkpoint 0 is the default spawn
    pub fn new(config: RespawnConfig, default_spawn: Vec2) -> Self {
        let mut checkpoints = BTreeMap::new();
        checkpoints.insert(0, default_spawn);
        Self {
            config,
            default_spawn,
            checkpoints,
            current_checkpoint: 0,
            current_spawn: default_spawn,
            state: RespawnState::Alive,
        }
    }

    pub fn state(&self) -> RespawnState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state != RespawnState::Alive
    }

    pub fn current_spawn(&self) -> Vec2 {
        self.current_spawn
    }

    pub fn current_checkpoint(&self) -> u32 {
        self.current_checkpoint
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn register_checkpoint(&mut self, id: u32, position: Vec2) {
        self.checkpoints.insert(id, position);
    }

    /// Make a registered checkpoint the spawn point; true if it changed
    pub fn activate_checkpoint(&mut self, id: u32, events: &mut EventQueue) -> bool {
        let Some(&position) = self.checkpoints.get(&id) else {
            debug!(id, "Unknown checkpoint");
            return false;
        };
        if id == self.current_checkpoint {
            return false;
        }
        self.current_checkpoint = id;
        self.current_spawn = position;
        info!(id, x = position.x, y = position.y, "Checkpoint reached");
        events.push(PlayerEvent::CheckpointReached { id });
        true
    }

    /// Back to the default spawn
    pub fn reset_checkpoints(&mut self) {
        self.current_checkpoint = 0;
        self.current_spawn = self.default_spawn;
        info!("Checkpoints reset to default");
    }

    /// Kill the player; ignored while already dead
    pub fn player_dead(&mut self, player: &mut PlayerManager, events: &mut EventQueue) -> bool {
        if self.is_dead() {
            return false;
        }
        player.on_player_dead();
        events.push(PlayerEvent::Died);
        self.state = RespawnState::Dead {
            timer: self.config.respawn_time,
        };
        info!(shape = %player.current(), "Player died");
        true
    }

    /// Advance the respawn timer
    pub fn update<Q: PhysicsQuery + ?Sized>(
        &mut self,
        dt: f32,
        world: &Q,
        player: &mut PlayerManager,
        camera: &mut CameraRig,
        events: &mut EventQueue,
    ) {
        let waited = match self.state {
            RespawnState::Alive => return,
            RespawnState::Dead { timer } => {
                let timer = timer - dt;
                if timer > 0.0 {
                    self.state = RespawnState::Dead { timer };
                    return;
                }
                0.0
            }
            RespawnState::Waiting { waited } => waited + dt,
        };

        let probe = Aabb::from_center(self.current_spawn, self.config.probe_half_extents);
        if world.overlaps(probe, self.config.blocking_layers) {
            if waited < self.config.overlap_wait_max {
                self.state = RespawnState::Waiting { waited };
                return;
            }
            warn!(waited, "Spawn point still occupied; respawning anyway");
        }

        self.respawn(player, camera, events);
    }

    fn respawn(&mut self, player: &mut PlayerManager, camera: &mut CameraRig, events: &mut EventQueue) {
        let position = self.current_spawn;
        player.respawn_at(position);
        camera.snap_to(position);
        events.push(PlayerEvent::Respawned { position });
        self.state = RespawnState::Alive;
        info!(x = position.x, y = position.y, "Player respawned");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::shape::{RosterConfig, SelectorConfig};
    use crate::test_support::BoxWorld;
    use shapeshift_core::{ShapeVariant, TimeConfig};
    use shapeshift_physics::ColliderControl;

    fn setup() -> (RespawnManager, PlayerManager, CameraRig) {
        let player = PlayerManager::new(
            RosterConfig::default().build().expect("complete roster"),
            ShapeVariant::Circle,
            Vec2::new(3.0, 0.5),
            SelectorConfig::default(),
            &TimeConfig::default(),
        );
        (
            RespawnManager::new(RespawnConfig::default(), Vec2::new(0.0, 0.5)),
            player,
            CameraRig::new(CameraConfig::default(), Vec2::ZERO),
        )
    }

    #[test]
    fn test_checkpoint_activation() {
        let (mut respawn, _, _) = setup();
        let mut events = EventQueue::new();
        respawn.register_checkpoint(1, Vec2::new(10.0, 2.0));

        assert!(!respawn.activate_checkpoint(7, &mut events));
        assert!(respawn.activate_checkpoint(1, &mut events));
        assert!(!respawn.activate_checkpoint(1, &mut events));
        assert_eq!(respawn.current_spawn(), Vec2::new(10.0, 2.0));
        assert_eq!(events.drain(), vec![PlayerEvent::CheckpointReached { id: 1 }]);

        respawn.reset_checkpoints();
        assert_eq!(respawn.current_checkpoint(), 0);
        assert_eq!(respawn.current_spawn(), Vec2::new(0.0, 0.5));
        assert_eq!(respawn.checkpoint_count(), 2);
    }

    #[test]
    fn test_death_then_timed_respawn() {
        let (mut respawn, mut player, mut camera) = setup();
        let world = BoxWorld::new();
        let mut events = EventQueue::new();

        assert!(respawn.player_dead(&mut player, &mut events));
        assert!(!respawn.player_dead(&mut player, &mut events));
        assert!(player.is_hidden());

        respawn.update(0.5, &world, &mut player, &mut camera, &mut events);
        assert!(respawn.is_dead());

        respawn.update(0.6, &world, &mut player, &mut camera, &mut events);
        assert!(!respawn.is_dead());
        assert!(!player.is_hidden());
        assert_eq!(player.position(), Vec2::new(0.0, 0.5));
        assert_eq!(
            events.drain(),
            vec![
                PlayerEvent::Died,
                PlayerEvent::Respawned {
                    position: Vec2::new(0.0, 0.5)
                }
            ]
        );
    }

    #[test]
    fn test_occupied_spawn_waits_then_forces() {
        let (mut respawn, mut player, mut camera) = setup();
        let mut world = BoxWorld::new();
        let blocker = world.add_box(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 1.0), LayerMask::HAZARD, None);
        let mut events = EventQueue::new();

        respawn.player_dead(&mut player, &mut events);
        respawn.update(1.0, &world, &mut player, &mut camera, &mut events);
        assert!(matches!(respawn.state(), RespawnState::Waiting { .. }));

        // Clears up: respawn on the next update
        world.set_collider_enabled(blocker, false);
        respawn.update(0.1, &world, &mut player, &mut camera, &mut events);
        assert!(!respawn.is_dead());

        // Never clears: forced after the bounded wait
        world.set_collider_enabled(blocker, true);
        respawn.player_dead(&mut player, &mut events);
        respawn.update(1.0, &world, &mut player, &mut camera, &mut events);
        for _ in 0..25 {
            respawn.update(0.1, &world, &mut player, &mut camera, &mut events);
        }
        assert!(!respawn.is_dead());
    }
}
