//! Rolling controller used by the Circle and the Star
//!
//! Normal rolling follows the shared run model. Turbo drives the body along
//! whatever surface the probe ray finds, sticks to it with a force along a
//! rotating down vector, and rebounds off walls. Launch pads fire a rolling
//! body that dwelt on them long enough.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::{Aabb, Facing};
use shapeshift_physics::{
    Body, BodyShape, ColliderId, LaunchPadData, LayerMask, MoveOutcome, PhysicsQuery,
};
use tracing::debug;

use crate::events::{EventQueue, PlayerEvent};
use crate::input::ControlInput;

use super::contract::{PlayerController, VelocitySnapshot};
use super::ground::{GroundSensor, GroundSensorConfig};
use super::movement::RunConfig;

/// Roll configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    pub run: RunConfig,
    pub ground: GroundSensorConfig,
    /// Body radius
    pub radius: f32,
    /// Top speed in turbo
    pub turbo_speed: f32,
    /// Drive force along the surface tangent in turbo
    pub turbo_force: f32,
    /// Force pressing the body onto the surface in turbo
    pub turbo_stick_force: f32,
    /// Length of the turbo probe ray along the down vector
    pub turbo_probe_distance: f32,
    /// How fast the down vector relaxes toward world down when airborne
    pub rotation_return_speed: f32,
    /// Contacts closer than this to the wall band start a bounce (degrees)
    pub max_collision_angle: f32,
    /// Gravity scale outside turbo contact
    pub normal_gravity_scale: f32,
    /// Horizontal bounce speed, away from the facing direction
    pub bounce_strength: f32,
    /// Vertical bounce speed
    pub bounce_height: f32,
    /// Time the bounce velocity is locked with input ignored
    pub bounce_duration: f32,
    /// Time spent easing from launch speed back to running speed
    pub launch_decel_duration: f32,
    /// Slack added to the body bounds when checking pad overlap
    pub pad_bounds_margin: f32,
    pub max_dash_count: u32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            ground: GroundSensorConfig::default(),
            radius: 0.5,
            turbo_speed: 20.0,
            turbo_force: 60.0,
            turbo_stick_force: 9.81 * 4.0,
            turbo_probe_distance: 1.0,
            rotation_return_speed: 5.0,
            max_collision_angle: 30.0,
            normal_gravity_scale: 4.0,
            bounce_strength: 5.0,
            bounce_height: 10.0,
            bounce_duration: 0.3,
            launch_decel_duration: 0.5,
            pad_bounds_margin: 0.05,
            max_dash_count: 1,
        }
    }
}

impl RollConfig {
    /// The Star: a little larger, faster in turbo, slower to turn
    pub fn star() -> Self {
        Self {
            run: RunConfig {
                max_speed: 9.0,
                ground_turn_speed: 60.0,
                air_turn_speed: 60.0,
                ..RunConfig::default()
            },
            radius: 0.55,
            turbo_speed: 24.0,
            turbo_force: 72.0,
            bounce_strength: 6.0,
            bounce_height: 12.0,
            ..Self::default()
        }
    }
}

/// Roll sub-state; turbo is tracked separately
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RollState {
    Normal,
    /// Rebounding off a wall; input is ignored while `lock_timer > 0`
    Bouncing { lock_timer: f32 },
    /// Velocity held at the pad's launch velocity
    Launched { timer: f32, pad: LaunchPadData },
    /// Easing from the launch speed back toward running speed
    LaunchDecelerating { timer: f32, start_speed: f32 },
}

#[derive(Debug, Clone, Copy)]
struct PadContact {
    pad: ColliderId,
    data: LaunchPadData,
    dwell: f32,
    armed: bool,
}

/// Rolling controller
pub struct RollController {
    pub config: RollConfig,
    body: Body,
    sensor: GroundSensor,
    state: RollState,
    turbo: bool,
    down: Vec2,
    facing: Facing,
    move_x: f32,
    dash_count: u32,
    pad: Option<PadContact>,
    activations: u32,
}

impl RollController {
    pub fn new(config: RollConfig) -> Self {
        let mut body = Body::new(BodyShape::Circle {
            radius: config.radius,
        });
        body.gravity_scale = config.normal_gravity_scale;
        Self {
            sensor: GroundSensor::new(config.ground.clone()),
            body,
            state: RollState::Normal,
            turbo: false,
            down: Vec2::NEG_Y,
            facing: Facing::Right,
            move_x: 0.0,
            dash_count: config.max_dash_count,
            pad: None,
            activations: 0,
            config,
        }
    }

    pub fn state(&self) -> RollState {
        self.state
    }

    pub fn is_turbo(&self) -> bool {
        self.turbo
    }

    pub fn is_grounded(&self) -> bool {
        self.sensor.is_grounded()
    }

    /// Whether a launch will fire when the body leaves its pad
    pub fn is_launch_armed(&self) -> bool {
        self.pad.is_some_and(|p| p.armed)
    }

    /// Time spent on the current pad
    pub fn pad_dwell(&self) -> f32 {
        self.pad.map_or(0.0, |p| p.dwell)
    }

    /// Direction the turbo probe points
    pub fn down_vector(&self) -> Vec2 {
        self.down
    }

    fn is_input_locked(&self) -> bool {
        matches!(self.state, RollState::Bouncing { lock_timer } if lock_timer > 0.0)
    }

    pub fn handle_input(&mut self, input: &ControlInput, events: &mut EventQueue) {
        self.move_x = input.move_axis.x;

        if !self.is_input_locked() {
            if let Some(facing) = Facing::from_axis(self.move_x) {
                self.facing = facing;
                if matches!(self.state, RollState::Bouncing { .. }) {
                    self.state = RollState::Normal;
                }
            }
        }

        if input.ability_pressed {
            self.toggle_turbo(events);
        }
    }

    fn toggle_turbo(&mut self, events: &mut EventQueue) {
        if matches!(self.state, RollState::Bouncing { .. }) {
            return;
        }
        if !self.turbo {
            events.push(PlayerEvent::AbilityUsed);
        } else if self.pad.take().is_some_and(|p| p.armed) {
            debug!("Launch arming cancelled");
        }
        self.turbo = !self.turbo;
    }

    pub fn frame_update(&mut self, dt: f32) {
        if self.sensor.is_grounded() {
            self.dash_count = self.config.max_dash_count;
        }
        if let RollState::Bouncing { lock_timer } = &mut self.state {
            *lock_timer = (*lock_timer - dt).max(0.0);
        }
    }

    pub fn fixed_update<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        if !self.body.enabled {
            return;
        }
        let grounded = self.sensor.sense(world, self.body.position).grounded();

        match self.state {
            RollState::Bouncing { lock_timer } => {
                if lock_timer <= 0.0 && grounded {
                    self.state = RollState::Normal;
                }
                return;
            }
            RollState::Launched { timer, pad } => {
                self.body.gravity_scale = pad.gravity_scale;
                self.body.velocity = pad.launch_velocity();
                let timer = timer - dt;
                self.state = if timer <= 0.0 {
                    RollState::LaunchDecelerating {
                        timer: self.config.launch_decel_duration,
                        start_speed: self.body.velocity.length(),
                    }
                } else {
                    RollState::Launched { timer, pad }
                };
                return;
            }
            RollState::LaunchDecelerating { timer, start_speed } => {
                self.body.gravity_scale = self.config.normal_gravity_scale;
                let duration = self.config.launch_decel_duration.max(f32::EPSILON);
                let target = if self.turbo {
                    self.config.turbo_speed
                } else {
                    self.config.run.max_speed
                };
                let t = (1.0 - timer / duration).clamp(0.0, 1.0);
                let speed = start_speed + (target - start_speed) * t;
                let direction = self
                    .body
                    .velocity
                    .try_normalize()
                    .unwrap_or(Vec2::new(self.facing.sign(), 0.0));
                self.body.velocity = direction * speed;

                let timer = timer - dt;
                self.state = if timer <= 0.0 {
                    RollState::Normal
                } else {
                    RollState::LaunchDecelerating { timer, start_speed }
                };
                return;
            }
            RollState::Normal => {}
        }

        if self.turbo {
            if self.track_launch_pad(world, grounded, dt) {
                return;
            }
            self.turbo_drive(world, dt);
        } else {
            self.down = Vec2::NEG_Y;
            self.body.gravity_scale = self.config.normal_gravity_scale;
            self.body.velocity.x = self
                .config
                .run
                .step(self.body.velocity.x, self.move_x, grounded, dt);
        }
    }

    /// Dwell, arm and fire; returns true when a launch fired this tick
    fn track_launch_pad<Q: PhysicsQuery + ?Sized>(
        &mut self,
        world: &Q,
        grounded: bool,
        dt: f32,
    ) -> bool {
        let on_pad = if grounded {
            self.sensor.launch_pad(world)
        } else {
            None
        };

        match (on_pad, self.pad) {
            (Some((id, data)), Some(mut contact)) if contact.pad == id => {
                contact.dwell += dt;
                if !contact.armed
                    && contact.dwell >= data.min_dwell_time
                    && self.overlaps_pad(world, id)
                {
                    contact.armed = true;
                    debug!(dwell = contact.dwell, "Launch armed");
                }
                self.pad = Some(contact);
                false
            }
            (Some((id, data)), previous) => {
                self.pad = Some(PadContact {
                    pad: id,
                    data,
                    dwell: 0.0,
                    armed: false,
                });
                match previous {
                    Some(prev) if prev.armed => {
                        self.pad = None;
                        self.launch(prev.data);
                        true
                    }
                    _ => false,
                }
            }
            (None, Some(contact)) => {
                self.pad = None;
                if contact.armed {
                    self.launch(contact.data);
                    true
                } else {
                    false
                }
            }
            (None, None) => false,
        }
    }

    fn overlaps_pad<Q: PhysicsQuery + ?Sized>(&self, world: &Q, pad: ColliderId) -> bool {
        let Some(pad_bounds) = world.collider_bounds(pad) else {
            return true;
        };
        let body_bounds = self.body.bounds();
        let expanded = Aabb::from_center(
            body_bounds.center(),
            body_bounds.half_extents() + Vec2::splat(self.config.pad_bounds_margin),
        );
        expanded.intersects(&pad_bounds)
    }

    fn launch(&mut self, pad: LaunchPadData) {
        debug!(direction = ?pad.direction(), force = pad.force, "Launch");
        self.body.gravity_scale = pad.gravity_scale;
        self.body.velocity = pad.launch_velocity();
        self.state = RollState::Launched {
            timer: pad.duration,
            pad,
        };
    }

    fn turbo_drive<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        let layers = self.config.ground.ground_layers;
        let probe = world.raycast(
            self.body.position,
            self.down,
            self.config.turbo_probe_distance,
            layers,
        );
        let mass = self.body.mass;

        let move_direction = match probe {
            Some(hit) => {
                self.body.gravity_scale = 0.0;
                self.body
                    .add_force(self.down * self.config.turbo_stick_force * mass);
                self.down = -hit.normal;
                Vec2::new(-self.down.y, self.down.x) * self.facing.sign()
            }
            None => {
                self.body.gravity_scale = self.config.normal_gravity_scale;
                let t = (self.config.rotation_return_speed * dt).min(1.0);
                self.down = self.down.lerp(Vec2::NEG_Y, t);
                Vec2::new(self.facing.sign(), 0.0)
            }
        };
        self.body
            .add_force(move_direction * self.config.turbo_force * mass);

        if self.body.velocity.length() > self.config.turbo_speed {
            self.body.velocity = self.body.velocity.normalize() * self.config.turbo_speed;
        }
    }

    /// Wall contacts while in turbo start a bounce
    pub fn after_move(&mut self, outcome: &MoveOutcome) {
        if !self.turbo || self.state != RollState::Normal {
            return;
        }
        let wall_hit = outcome.contacts.iter().any(|contact| {
            angle_degrees(self.down, contact.normal) - 90.0 < self.config.max_collision_angle
        });
        if wall_hit {
            self.start_bounce();
        }
    }

    fn start_bounce(&mut self) {
        debug!(facing = ?self.facing, "Turbo bounce");
        self.turbo = false;
        self.pad = None;
        self.down = Vec2::NEG_Y;
        self.body.gravity_scale = self.config.normal_gravity_scale;
        self.body.velocity = Vec2::new(
            -self.facing.sign() * self.config.bounce_strength,
            self.config.bounce_height,
        );
        self.state = RollState::Bouncing {
            lock_timer: self.config.bounce_duration,
        };
    }

    /// Drop every transient sub-state
    pub fn reset_transient(&mut self) {
        self.state = RollState::Normal;
        self.turbo = false;
        self.pad = None;
        self.down = Vec2::NEG_Y;
        self.move_x = 0.0;
        self.sensor.clear();
        self.body.gravity_scale = self.config.normal_gravity_scale;
    }

    pub fn deactivate(&mut self) {
        self.reset_transient();
        self.body.enabled = false;
    }
}

impl PlayerController for RollController {
    fn dash_count(&self) -> u32 {
        self.dash_count
    }

    fn max_dash_count(&self) -> u32 {
        self.config.max_dash_count
    }

    fn set_dash_count(&mut self, count: u32) {
        self.dash_count = count.min(self.config.max_dash_count);
    }

    fn on_enable_set_velocity(&mut self, snapshot: VelocitySnapshot) {
        self.reset_transient();
        self.body.enabled = true;
        self.body.velocity = snapshot.velocity;
        self.facing = Facing::from_right(snapshot.facing_right);
        self.set_dash_count(snapshot.dash_count);
        self.activations += 1;
    }

    fn facing_right(&self) -> bool {
        self.facing.is_right()
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn activation_count(&self) -> u32 {
        self.activations
    }
}

/// Unsigned angle between two directions in degrees
fn angle_degrees(a: Vec2, b: Vec2) -> f32 {
    let (Some(a), Some(b)) = (a.try_normalize(), b.try_normalize()) else {
        return 0.0;
    };
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}
