//! One running game: world, player, stages, respawn, camera and telemetry
//!
//! [`GameSession::frame`] is the whole per-frame loop. Anything with a window
//! or a renderer calls it once per frame with the current [`InputState`] and
//! reads the cosmetic state back out of the player manager and camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::{Aabb, GameTime, ShapeVariant, TimeConfig};
use shapeshift_physics::{BodyMover, ColliderControl, LayerMask, PhysicsQuery};
use tracing::{debug, info};

use crate::breakable::{BreakableConfig, BreakableSet};
use crate::camera::{CameraConfig, CameraRig};
use crate::error::GameError;
use crate::events::{EventQueue, PlayerEvent};
use crate::input::{InputAction, InputState};
use crate::respawn::{RespawnConfig, RespawnManager};
use crate::shape::{PlayerManager, RosterConfig, SelectorConfig};
use crate::stage::{StageBoundary, StageDef, StageManager};
use crate::stats::PlayerDataLog;

/// Every tunable a session is built from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub time: TimeConfig,
    pub selector: SelectorConfig,
    pub roster: RosterConfig,
    pub camera: CameraConfig,
    pub respawn: RespawnConfig,
    pub breakable: BreakableConfig,
    pub hazard: HazardConfig,
}

/// What kills the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub layers: LayerMask,
    /// Extra reach of the hazard probe around the body
    pub touch_margin: f32,
    /// Distance below the stage bounds that counts as a fall death
    pub kill_depth: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            layers: LayerMask::HAZARD,
            touch_margin: 0.05,
            kill_depth: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CheckpointZone {
    id: u32,
    trigger: Aabb,
}

pub struct GameSession<W> {
    world: W,
    config: HazardConfig,
    player: PlayerManager,
    stages: StageManager,
    respawn: RespawnManager,
    camera: CameraRig,
    stats: PlayerDataLog,
    breakables: BreakableSet,
    time: GameTime,
    events: EventQueue,
    checkpoint_zones: Vec<CheckpointZone>,
}

impl<W: PhysicsQuery + BodyMover + ColliderControl> GameSession<W> {
    /// Build the player in `start` at `spawn` and enter the first stage
    pub fn new(
        world: W,
        config: SessionConfig,
        stages: Vec<StageDef>,
        start: ShapeVariant,
        spawn: Vec2,
    ) -> Result<Self, GameError> {
        let roster = config.roster.build()?;
        let mut player = PlayerManager::new(roster, start, spawn, config.selector, &config.time);
        let mut stages = StageManager::new(stages)?;
        let mut camera = CameraRig::new(config.camera, spawn);
        let mut events = EventQueue::new();

        stages.set_stage(0, &mut player, &mut camera, &mut events)?;
        camera.snap_to(spawn);

        let mut session = Self {
            world,
            config: config.hazard,
            player,
            stages,
            respawn: RespawnManager::new(config.respawn, spawn),
            camera,
            stats: PlayerDataLog::start(start),
            breakables: BreakableSet::new(config.breakable),
            time: GameTime::new(config.time),
            events,
            checkpoint_zones: Vec::new(),
        };
        session.dispatch_events();
        info!(stage = %session.stages.current().name, shape = %start, "Session started");
        Ok(session)
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn player(&self) -> &PlayerManager {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerManager {
        &mut self.player
    }

    pub fn stages(&self) -> &StageManager {
        &self.stages
    }

    pub fn respawn(&self) -> &RespawnManager {
        &self.respawn
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn stats(&self) -> &PlayerDataLog {
        &self.stats
    }

    pub fn breakables(&self) -> &BreakableSet {
        &self.breakables
    }

    pub fn time(&self) -> &GameTime {
        &self.time
    }

    /// Register a checkpoint that activates when the player enters `trigger`
    pub fn add_checkpoint(&mut self, id: u32, spawn: Vec2, trigger: Aabb) {
        self.respawn.register_checkpoint(id, spawn);
        self.checkpoint_zones.push(CheckpointZone { id, trigger });
    }

    pub fn add_stage_boundary(&mut self, boundary: StageBoundary) {
        self.stages.add_boundary(boundary);
    }

    /// Move to the named stage (or the one before it)
    pub fn change_stage(&mut self, name: &str, go_next: bool) -> Result<(), GameError> {
        self.stages.request_stage_change(
            name,
            go_next,
            &mut self.player,
            &mut self.camera,
            &mut self.events,
        )?;
        self.dispatch_events();
        Ok(())
    }

    /// Kill the player now; false while already dead
    pub fn kill_player(&mut self) -> bool {
        let killed = self.respawn.player_dead(&mut self.player, &mut self.events);
        self.dispatch_events();
        killed
    }

    /// Telemetry as pretty JSON
    pub fn export_stats(&self) -> Result<String, GameError> {
        self.stats.to_json()
    }

    /// Run one frame and return the events it produced
    pub fn frame(&mut self, input: &InputState, raw_delta: f32) -> Vec<PlayerEvent> {
        if input.is_just_pressed(InputAction::Pause) {
            self.time.toggle_pause();
            info!(paused = self.time.paused, "Pause toggled");
        }

        self.time.set_time_scale(self.player.time_scale().value());
        self.time.update(raw_delta);
        if self.time.paused {
            return Vec::new();
        }
        let unscaled = self.time.unscaled_delta_time;
        let scaled = self.time.delta_time;

        self.player
            .update(input, unscaled, scaled, &self.world, &mut self.events);

        // Steps run at the new scale so the slowdown applies this frame
        self.time.set_time_scale(self.player.time_scale().value());
        let steps = self.time.fixed_steps();
        let fixed_delta = self.time.fixed_delta();
        for _ in 0..steps {
            self.player
                .fixed_update(&mut self.world, fixed_delta, &mut self.events);
            self.check_hazards();
        }

        let position = self.player.position();
        if !self.respawn.is_dead() {
            self.check_checkpoints(position);
            self.stages.check_boundaries(
                position,
                &mut self.player,
                &mut self.camera,
                &mut self.events,
            );
        }

        self.respawn.update(
            scaled,
            &self.world,
            &mut self.player,
            &mut self.camera,
            &mut self.events,
        );
        self.breakables.update(scaled, &mut self.world);
        self.camera.update(self.player.position(), scaled);
        self.stats.tick(unscaled);

        self.dispatch_events()
    }

    fn check_hazards(&mut self) {
        if self.respawn.is_dead() || self.player.is_hidden() {
            return;
        }
        let body = self.player.active().as_controller().body().bounds();
        let probe = Aabb::from_center(
            body.center(),
            body.half_extents() + Vec2::splat(self.config.touch_margin),
        );
        let touching = self.world.overlaps(probe, self.config.layers);
        let fell = body.max.y < self.stages.current().bounds.min.y - self.config.kill_depth;
        if touching || fell {
            debug!(touching, fell, "Player killed");
            self.respawn.player_dead(&mut self.player, &mut self.events);
        }
    }

    fn check_checkpoints(&mut self, position: Vec2) {
        let current = self.respawn.current_checkpoint();
        if let Some(zone) = self
            .checkpoint_zones
            .iter()
            .find(|zone| zone.id != current && zone.trigger.contains(position))
        {
            self.respawn.activate_checkpoint(zone.id, &mut self.events);
        }
    }

    /// Forward queued events to telemetry and the breakable set
    fn dispatch_events(&mut self) -> Vec<PlayerEvent> {
        let events = self.events.drain();
        for event in &events {
            self.stats.record(event);
            match event {
                PlayerEvent::BreakRequested { collider } => {
                    self.breakables.request_break(&self.world, *collider);
                }
                PlayerEvent::Respawned { .. } => self.breakables.restore_all(&mut self.world),
                _ => {}
            }
        }
        events
    }
}
