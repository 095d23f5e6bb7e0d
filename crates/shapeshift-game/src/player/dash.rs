//! Dashing controller used by the Square
//!
//! A tight platformer body: buffered and coyote jumps, ramped fall gravity,
//! wall slide and wall jump, ceiling corner correction, and an 8-way dash
//! that phases through breakable tiles.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::{Color, Facing};
use shapeshift_physics::{Body, BodyShape, LayerMask, PhysicsQuery};

use crate::events::{EventQueue, PlayerEvent};
use crate::input::ControlInput;

use super::afterimage::{AfterimageConfig, AfterimageTrail};
use super::contract::{PlayerController, VelocitySnapshot};
use super::ground::{GroundSensor, GroundSensorConfig};
use super::jump::{JumpConfig, JumpState};
use super::movement::RunConfig;

/// Dash controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub run: RunConfig,
    pub jump: JumpConfig,
    pub afterimage: AfterimageConfig,
    /// Box half extents
    pub half_extents: Vec2,
    /// Circle radius used while dashing
    pub dash_radius: f32,
    /// Ground ray reach below the box
    pub ground_check_distance: f32,
    /// Wall ray length from the body center
    pub wall_check_distance: f32,
    /// Layers counted as ground, walls and ceilings
    pub solid_layers: LayerMask,
    /// Rate multipliers while airborne
    pub air_accel_multiplier: f32,
    pub air_decel_multiplier: f32,
    pub wall_jump_enabled: bool,
    pub wall_jump_speed: Vec2,
    /// Fastest slide down a touched wall
    pub wall_slide_max_speed: f32,
    /// Length of the reduced-control window after a wall jump
    pub wall_jump_time: f32,
    pub wall_jump_accel_multiplier: f32,
    pub wall_jump_decel_multiplier: f32,
    /// Inner corner ray offset from the center
    pub corner_ray_pos_x: f32,
    /// Gap between the inner and outer corner rays
    pub corner_ray_offset_x: f32,
    pub corner_ray_length: f32,
    pub dash_speed: f32,
    pub dash_time: f32,
    pub dash_cooldown: f32,
    /// Speed multiplier for diagonal dashes
    pub diagonal_dash_factor: f32,
    /// Half width of the diagonal window, in degrees
    pub diagonal_dash_range: f32,
    pub max_speed_after_dash_x: f32,
    pub max_speed_after_dash_up: f32,
    pub max_dash_count: u32,
    pub default_color: Color,
    pub no_dash_color: Color,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            run: RunConfig {
                max_speed: 8.0,
                ground_acceleration: 70.0,
                ground_deceleration: 70.0,
                ground_turn_speed: 90.0,
                ..RunConfig::default()
            },
            jump: JumpConfig::default(),
            afterimage: AfterimageConfig::default(),
            half_extents: Vec2::splat(0.5),
            dash_radius: 0.5,
            ground_check_distance: 0.05,
            wall_check_distance: 0.6,
            solid_layers: LayerMask::GROUND | LayerMask::BREAKABLE,
            air_accel_multiplier: 0.65,
            air_decel_multiplier: 0.65,
            wall_jump_enabled: true,
            wall_jump_speed: Vec2::new(8.0, 12.0),
            wall_slide_max_speed: 3.0,
            wall_jump_time: 0.1,
            wall_jump_accel_multiplier: 0.1,
            wall_jump_decel_multiplier: 0.1,
            corner_ray_pos_x: 0.3,
            corner_ray_offset_x: 0.1,
            corner_ray_length: 0.1,
            dash_speed: 20.0,
            dash_time: 0.15,
            dash_cooldown: 0.1,
            diagonal_dash_factor: 1.2,
            diagonal_dash_range: 22.5,
            max_speed_after_dash_x: 8.0,
            max_speed_after_dash_up: 6.0,
            max_dash_count: 1,
            default_color: Color::WHITE,
            no_dash_color: Color::GRAY,
        }
    }
}

/// Dashing controller
pub struct DashController {
    pub config: DashConfig,
    body: Body,
    sensor: GroundSensor,
    jump: JumpState,
    trail: AfterimageTrail,
    grounded: bool,
    touching_wall_right: bool,
    touching_wall_left: bool,
    move_input: Vec2,
    facing: Facing,
    dash_count: u32,
    dashing: bool,
    dash_timer: f32,
    dash_cooldown: f32,
    dash_velocity: Vec2,
    wall_jump_timer: f32,
    activations: u32,
}

impl DashController {
    pub fn new(config: DashConfig) -> Self {
        let mut body = Body::new(BodyShape::Box {
            half_extents: config.half_extents,
        });
        body.gravity_scale = 0.0;
        Self {
            sensor: GroundSensor::new(GroundSensorConfig {
                ground_layers: config.solid_layers,
                ..GroundSensorConfig::box_corners(
                    config.half_extents,
                    0.0,
                    config.ground_check_distance,
                )
            }),
            jump: JumpState::new(&config.jump),
            trail: AfterimageTrail::new(config.afterimage.clone()),
            body,
            grounded: false,
            touching_wall_right: false,
            touching_wall_left: false,
            move_input: Vec2::ZERO,
            facing: Facing::Right,
            dash_count: config.max_dash_count,
            dashing: false,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            dash_velocity: Vec2::ZERO,
            wall_jump_timer: 0.0,
            activations: 0,
            config,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_dashing(&self) -> bool {
        self.dashing
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    pub fn dash_time_remaining(&self) -> f32 {
        self.dash_timer
    }

    pub fn touching_wall(&self) -> bool {
        self.touching_wall_right || self.touching_wall_left
    }

    /// Sprite tint showing whether a dash is available
    pub fn tint(&self) -> Color {
        if self.dash_count == 0 {
            self.config.no_dash_color
        } else {
            self.config.default_color
        }
    }

    pub fn afterimages(&self) -> &AfterimageTrail {
        &self.trail
    }

    pub fn handle_input(&mut self, input: &ControlInput, events: &mut EventQueue) {
        self.move_input = input.move_axis;
        if input.jump_pressed {
            self.jump.press(&self.config.jump);
        }
        if input.jump_released {
            self.jump.release();
        }
        if input.ability_pressed {
            self.dash(events);
        }
    }

    pub fn frame_update(&mut self, dt: f32) {
        self.jump.tick_timers(&self.config.jump, self.grounded, dt);
        if self.grounded && !self.dashing {
            self.dash_count = self.config.max_dash_count;
        }

        if self.dashing {
            self.dash_timer -= dt;
            if self.dash_timer < 0.0 {
                self.end_dash();
            } else {
                self.trail
                    .emit(dt, self.body.position, self.facing.is_right());
            }
        }
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
        self.wall_jump_timer = (self.wall_jump_timer - dt).max(0.0);
    }

    /// Fade afterimages; runs whether or not this shape is active
    pub fn update_cosmetics(&mut self, dt: f32) {
        self.trail.update(dt);
    }

    pub fn fixed_update<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        if !self.body.enabled {
            return;
        }
        self.wall_check(world);
        self.detect_ground(world);

        if !self.dashing {
            if self.config.wall_jump_enabled {
                self.wall_jump();
            }
            if let Some(vy) = self.jump.try_jump(&self.config.jump) {
                self.body.velocity.y = vy;
            }
            self.corner_correction(world);
            self.apply_gravity(dt);
            self.run(dt);
        } else {
            self.body.velocity = self.dash_velocity;
        }
    }

    fn wall_check<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q) {
        let origin = self.body.position;
        let reach = self.config.wall_check_distance;
        let layers = self.config.solid_layers;
        self.touching_wall_right = world.raycast(origin, Vec2::X, reach, layers).is_some();
        self.touching_wall_left = world.raycast(origin, Vec2::NEG_X, reach, layers).is_some();
    }

    fn detect_ground<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q) {
        self.grounded = self.sensor.sense(world, self.body.position).grounded();
        self.jump
            .on_ground_check(&self.config.jump, self.body.velocity.y);
    }

    fn wall_jump(&mut self) {
        if !self.touching_wall() || self.grounded {
            return;
        }
        if !self.jump.take_buffered() {
            return;
        }
        let direction = if self.touching_wall_right { -1.0 } else { 1.0 };
        self.wall_jump_timer = self.config.wall_jump_time;
        self.jump.start_rise(self.config.jump.jump_deceleration);
        self.body.velocity = self.config.wall_jump_speed * Vec2::new(direction, 1.0);
        self.facing = Facing::from_right(direction > 0.0);
    }

    fn corner_correction<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q) {
        let cfg = &self.config;
        let top = self.body.position + Vec2::new(0.0, cfg.half_extents.y - 0.02);
        let reach = cfg.corner_ray_length + 0.02;
        let hits = |dx: f32| {
            world
                .raycast(top + Vec2::new(dx, 0.0), Vec2::Y, reach, cfg.solid_layers)
                .is_some()
        };
        let inner = cfg.corner_ray_pos_x;
        let outer = cfg.corner_ray_pos_x + cfg.corner_ray_offset_x;
        let nudge = cfg.corner_ray_pos_x - cfg.corner_ray_offset_x;

        if !hits(inner) && hits(outer) && self.move_input.x <= 0.0 {
            self.body.position.x -= nudge;
        } else if !hits(-inner) && hits(-outer) && self.move_input.x >= 0.0 {
            self.body.position.x += nudge;
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        let wall_slide = self
            .touching_wall()
            .then_some(self.config.wall_slide_max_speed);
        self.body.velocity.y =
            self.jump
                .apply_gravity(&self.config.jump, self.body.velocity.y, wall_slide, dt);
    }

    fn run(&mut self, dt: f32) {
        let (accel, decel) = if self.wall_jump_timer > 0.0 {
            (
                self.config.wall_jump_accel_multiplier,
                self.config.wall_jump_decel_multiplier,
            )
        } else if !self.grounded {
            (
                self.config.air_accel_multiplier,
                self.config.air_decel_multiplier,
            )
        } else {
            (1.0, 1.0)
        };

        if let Some(facing) = Facing::from_axis(self.move_input.x) {
            self.facing = facing;
        }

        // Air control comes from the multipliers, so always start from ground rates
        self.body.velocity.x = self.config.run.step_scaled(
            self.body.velocity.x,
            self.move_input.x,
            true,
            accel,
            decel,
            dt,
        );
    }

    fn dash(&mut self, events: &mut EventQueue) {
        if self.dash_count == 0 || self.dash_cooldown > 0.0 {
            return;
        }
        self.body.shape = BodyShape::Circle {
            radius: self.config.dash_radius,
        };
        self.body.excluded_layers = LayerMask::BREAKABLE;
        self.dashing = true;
        self.dash_count -= 1;
        self.dash_timer = self.config.dash_time;
        self.dash_cooldown = self.config.dash_cooldown;
        self.dash_velocity = dash_velocity(
            self.move_input,
            self.facing,
            self.config.dash_speed,
            self.config.diagonal_dash_factor,
            self.config.diagonal_dash_range,
        );
        self.body.velocity = self.dash_velocity;
        self.trail.restart();
        events.push(PlayerEvent::AbilityUsed);
    }

    fn end_dash(&mut self) {
        self.dashing = false;
        self.dash_velocity = Vec2::ZERO;
        self.restore_collider();
        let v = self.body.velocity;
        self.body.velocity = Vec2::new(
            v.x.clamp(
                -self.config.max_speed_after_dash_x,
                self.config.max_speed_after_dash_x,
            ),
            v.y.min(self.config.max_speed_after_dash_up),
        );
    }

    fn restore_collider(&mut self) {
        self.body.shape = BodyShape::Box {
            half_extents: self.config.half_extents,
        };
        self.body.excluded_layers = LayerMask::NONE;
    }

    /// Drop every transient sub-state
    pub fn reset_transient(&mut self) {
        self.restore_collider();
        self.jump.reset(&self.config.jump);
        self.move_input = Vec2::ZERO;
        self.dashing = false;
        self.dash_timer = 0.0;
        self.dash_velocity = Vec2::ZERO;
        self.wall_jump_timer = 0.0;
        self.grounded = false;
        self.touching_wall_right = false;
        self.touching_wall_left = false;
        self.sensor.clear();
        self.body.gravity_scale = 0.0;
    }

    pub fn deactivate(&mut self) {
        self.reset_transient();
        self.body.enabled = false;
    }
}

impl PlayerController for DashController {
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

/// Snap an input direction to the nearest of eight directions
pub fn snap_to_eight_directions(input: Vec2) -> Vec2 {
    if input == Vec2::ZERO {
        return Vec2::ZERO;
    }
    let angle = input.y.atan2(input.x).to_degrees();
    if (-22.5..22.5).contains(&angle) {
        Vec2::new(1.0, 0.0)
    } else if (22.5..67.5).contains(&angle) {
        Vec2::new(1.0, 1.0)
    } else if (67.5..112.5).contains(&angle) {
        Vec2::new(0.0, 1.0)
    } else if (112.5..157.5).contains(&angle) {
        Vec2::new(-1.0, 1.0)
    } else if !(-157.5..157.5).contains(&angle) {
        Vec2::new(-1.0, 0.0)
    } else if (-157.5..-112.5).contains(&angle) {
        Vec2::new(-1.0, -1.0)
    } else if (-112.5..-67.5).contains(&angle) {
        Vec2::new(0.0, -1.0)
    } else {
        Vec2::new(1.0, -1.0)
    }
}

/// Dash velocity for an input direction; facing is used when there is no input
pub fn dash_velocity(
    input: Vec2,
    facing: Facing,
    speed: f32,
    diagonal_factor: f32,
    diagonal_range: f32,
) -> Vec2 {
    if input == Vec2::ZERO {
        return Vec2::new(facing.sign() * speed, 0.0);
    }
    let direction = snap_to_eight_directions(input).normalize();
    let diagonal = [
        Vec2::new(1.0, 1.0),
        Vec2::new(-1.0, 1.0),
        Vec2::new(1.0, -1.0),
        Vec2::new(-1.0, -1.0),
    ]
    .into_iter()
    .any(|d| {
        let cos = direction.dot(d.normalize()).clamp(-1.0, 1.0);
        cos.acos().to_degrees() <= diagonal_range
    });

    if diagonal {
        direction * speed * diagonal_factor
    } else {
        direction * speed
    }
}
