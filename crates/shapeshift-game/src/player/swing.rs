//! Swinging controller used by the Triangle
//!
//! On the ground it runs and jumps like the Square (without the dash). The
//! ability fires a rope at the best swingable surface ahead and above; the
//! body then swings under gravity with input-driven tangential thrust, held
//! within the rope length.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::Facing;
use shapeshift_physics::{
    Body, BodyShape, ColliderId, LayerMask, PhysicsQuery, RayHit, SurfaceTag,
};
use tracing::debug;

use crate::events::{EventQueue, PlayerEvent};
use crate::input::ControlInput;

use super::contract::{PlayerController, VelocitySnapshot};
use super::ground::{GroundSensor, GroundSensorConfig};
use super::jump::{JumpConfig, JumpState};
use super::movement::RunConfig;
use super::rope::{rope_polyline, RopeConfig};

/// How the ability button drives the rope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwingMode {
    /// Swing while the button is held
    #[default]
    Hold,
    /// First press attaches, second press lets go
    Toggle,
}

/// Swing controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwingConfig {
    pub run: RunConfig,
    pub jump: JumpConfig,
    pub rope: RopeConfig,
    pub mode: SwingMode,
    pub half_extents: Vec2,
    pub ground_check_distance: f32,
    /// Inset of the ground rays from the box corners
    pub ground_ray_inset: f32,
    pub wall_check_distance: f32,
    /// Wall rays start this far below the body center
    pub wall_check_center_offset: f32,
    pub wall_slide_max_speed: f32,
    pub solid_layers: LayerMask,
    pub air_accel_multiplier: f32,
    pub air_decel_multiplier: f32,
    /// Layers the rope can attach to
    pub swing_layers: LayerMask,
    pub swing_ray_distance: f32,
    pub swing_tangential_force: f32,
    /// Thrust multiplier when pushing against the current swing
    pub swing_brake_multiplier: f32,
    pub swing_gravity_scale: f32,
    /// Rise deceleration for the jump granted when letting go while rising
    pub swing_jump_deceleration: f32,
    /// Ground within this distance below the body turns the swing into a dash first
    pub ground_dash_check_distance: f32,
    pub ground_dash_force: f32,
    pub ground_dash_duration: f32,
    /// The indicator only moves when the best point shifts further than this
    pub indicator_stability_threshold: f32,
    pub swing_rotation_speed: f32,
    pub rotation_reset_speed: f32,
    pub max_dash_count: u32,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            run: RunConfig {
                max_speed: 8.0,
                ground_acceleration: 60.0,
                ground_deceleration: 60.0,
                ground_turn_speed: 80.0,
                ..RunConfig::default()
            },
            jump: JumpConfig::default(),
            rope: RopeConfig::default(),
            mode: SwingMode::Hold,
            half_extents: Vec2::splat(0.5),
            ground_check_distance: 0.05,
            ground_ray_inset: 0.05,
            wall_check_distance: 0.6,
            wall_check_center_offset: 0.3,
            wall_slide_max_speed: 3.0,
            solid_layers: LayerMask::GROUND | LayerMask::BREAKABLE,
            air_accel_multiplier: 0.65,
            air_decel_multiplier: 0.65,
            swing_layers: LayerMask::SWINGABLE | LayerMask::BREAKABLE,
            swing_ray_distance: 7.0,
            swing_tangential_force: 15.0,
            swing_brake_multiplier: 2.0,
            swing_gravity_scale: 1.0,
            swing_jump_deceleration: 12.0,
            ground_dash_check_distance: 1.0,
            ground_dash_force: 10.0,
            ground_dash_duration: 0.2,
            indicator_stability_threshold: 0.5,
            swing_rotation_speed: 15.0,
            rotation_reset_speed: 20.0,
            max_dash_count: 1,
        }
    }
}

/// Where the rope is attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingAnchor {
    pub point: Vec2,
    pub collider: ColliderId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwingState {
    Idle,
    /// Grounded start: dashing toward the anchor before the rope engages
    DashingToAnchor { anchor: SwingAnchor, timer: f32 },
    /// Rope engaged with a maximum length
    Swinging { anchor: SwingAnchor, max_length: f32 },
}

/// Ray angles tried when looking for an anchor: 45, then 50, 40, 55, 35 ... 85, 5
fn fan_angles() -> impl Iterator<Item = f32> {
    std::iter::once(45.0).chain((1..=8).flat_map(|step| {
        let delta = step as f32 * 5.0;
        [45.0 + delta, 45.0 - delta]
    }))
}

/// Swinging controller
pub struct SwingController {
    pub config: SwingConfig,
    body: Body,
    sensor: GroundSensor,
    jump: JumpState,
    state: SwingState,
    grounded: bool,
    touching_wall_right: bool,
    touching_wall_left: bool,
    move_input: Vec2,
    facing: Facing,
    dash_count: u32,
    indicator: Option<Vec2>,
    sprite_angle: f32,
    activations: u32,
}

impl SwingController {
    pub fn new(config: SwingConfig) -> Self {
        let mut body = Body::new(BodyShape::Box {
            half_extents: config.half_extents,
        });
        body.gravity_scale = 0.0;
        Self {
            sensor: GroundSensor::new(GroundSensorConfig {
                ground_layers: config.solid_layers,
                ..GroundSensorConfig::box_corners(
                    config.half_extents,
                    config.ground_ray_inset,
                    config.ground_check_distance,
                )
            }),
            jump: JumpState::new(&config.jump),
            body,
            state: SwingState::Idle,
            grounded: false,
            touching_wall_right: false,
            touching_wall_left: false,
            move_input: Vec2::ZERO,
            facing: Facing::Right,
            dash_count: config.max_dash_count,
            indicator: None,
            sprite_angle: 0.0,
            activations: 0,
            config,
        }
    }

    pub fn state(&self) -> SwingState {
        self.state
    }

    pub fn is_swinging(&self) -> bool {
        self.state != SwingState::Idle
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    pub fn anchor(&self) -> Option<SwingAnchor> {
        match self.state {
            SwingState::Idle => None,
            SwingState::DashingToAnchor { anchor, .. } | SwingState::Swinging { anchor, .. } => {
                Some(anchor)
            }
        }
    }

    /// Cached swing point shown to the player while not swinging
    pub fn indicator(&self) -> Option<Vec2> {
        self.indicator
    }

    /// Sprite rotation in degrees, leaning along the rope while swinging
    pub fn sprite_angle(&self) -> f32 {
        self.sprite_angle
    }

    /// Rope polyline from the body to the anchor, empty when not swinging
    pub fn rope_points(&self) -> Vec<Vec2> {
        let position = self.body.position;
        match self.state {
            SwingState::Idle => Vec::new(),
            SwingState::DashingToAnchor { anchor, .. } => vec![position, anchor.point],
            SwingState::Swinging { anchor, max_length } => {
                rope_polyline(position, anchor.point, max_length, false, &self.config.rope)
            }
        }
    }

    pub fn handle_input<Q: PhysicsQuery + ?Sized>(
        &mut self,
        world: &Q,
        input: &ControlInput,
        events: &mut EventQueue,
    ) {
        self.move_input = input.move_axis;

        if input.jump_pressed {
            if self.is_swinging() {
                self.release_swing();
            } else {
                self.jump.press(&self.config.jump);
            }
        }
        if input.jump_released {
            self.jump.release();
        }

        match self.config.mode {
            SwingMode::Hold => {
                if input.ability_pressed && !self.is_swinging() {
                    self.start_swing(world, events);
                }
                if input.ability_released && self.is_swinging() {
                    self.release_swing();
                }
            }
            SwingMode::Toggle => {
                if input.ability_pressed {
                    if self.is_swinging() {
                        self.release_swing();
                    } else {
                        self.start_swing(world, events);
                    }
                }
            }
        }
    }

    pub fn frame_update<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        self.jump.tick_timers(&self.config.jump, self.grounded, dt);
        if self.grounded {
            self.dash_count = self.config.max_dash_count;
        }

        self.update_rotation(dt);
        self.update_indicator(world);

        if let SwingState::DashingToAnchor { anchor, timer } = self.state {
            let timer = timer - dt;
            self.state = if timer <= 0.0 {
                SwingState::Swinging {
                    anchor,
                    max_length: self.body.position.distance(anchor.point),
                }
            } else {
                SwingState::DashingToAnchor { anchor, timer }
            };
        }

        if let Some(anchor) = self.anchor() {
            if !world.is_collider_enabled(anchor.collider) {
                debug!(collider = ?anchor.collider, "Swing anchor disabled");
                self.stop_swing();
            }
        }
    }

    pub fn fixed_update<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        if !self.body.enabled {
            return;
        }
        self.wall_check(world);
        self.detect_ground(world);

        match self.state {
            SwingState::Idle => {
                self.body.gravity_scale = 0.0;
                if let Some(vy) = self.jump.try_jump(&self.config.jump) {
                    self.body.velocity.y = vy;
                }
                self.apply_gravity(dt);
                self.run(dt);
            }
            SwingState::DashingToAnchor { .. } => {}
            SwingState::Swinging { anchor, .. } => {
                self.body.gravity_scale = self.config.swing_gravity_scale;
                self.swing_thrust(anchor.point);
            }
        }
    }

    /// Keep the body inside the rope length
    pub fn after_move(&mut self) {
        let SwingState::Swinging { anchor, max_length } = self.state else {
            return;
        };
        let offset = self.body.position - anchor.point;
        let distance = offset.length();
        if distance <= max_length || distance <= f32::EPSILON {
            return;
        }
        let outward = offset / distance;
        self.body.position = anchor.point + outward * max_length;
        let radial = self.body.velocity.dot(outward);
        if radial > 0.0 {
            self.body.velocity -= outward * radial;
        }
    }

    fn wall_check<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q) {
        let origin = self.body.position - Vec2::new(0.0, self.config.wall_check_center_offset);
        let reach = self.config.wall_check_distance;
        let layers = self.config.solid_layers;
        self.touching_wall_right = world.raycast(origin, Vec2::X, reach, layers).is_some();
        self.touching_wall_left = world.raycast(origin, Vec2::NEG_X, reach, layers).is_some();
    }

    fn detect_ground<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q) {
        let grounded = self.sensor.sense(world, self.body.position).grounded();
        let wall_sliding = (self.touching_wall_right || self.touching_wall_left)
            && self.body.velocity.y < 0.0;
        self.grounded = grounded && !wall_sliding;
        self.jump
            .on_ground_check(&self.config.jump, self.body.velocity.y);
    }

    fn apply_gravity(&mut self, dt: f32) {
        let wall_slide = (self.touching_wall_right || self.touching_wall_left)
            .then_some(self.config.wall_slide_max_speed);
        self.body.velocity.y =
            self.jump
                .apply_gravity(&self.config.jump, self.body.velocity.y, wall_slide, dt);
    }

    fn run(&mut self, dt: f32) {
        let (accel, decel) = if self.grounded {
            (1.0, 1.0)
        } else {
            (
                self.config.air_accel_multiplier,
                self.config.air_decel_multiplier,
            )
        };
        if let Some(facing) = Facing::from_axis(self.move_input.x) {
            self.facing = facing;
        }
        self.body.velocity.x = self.config.run.step_scaled(
            self.body.velocity.x,
            self.move_input.x,
            true,
            accel,
            decel,
            dt,
        );
    }

    fn swing_thrust(&mut self, anchor: Vec2) {
        let Some(facing) = Facing::from_axis(self.move_input.x) else {
            return;
        };
        self.facing = facing;

        let rope = anchor - self.body.position;
        let tangent = match facing {
            Facing::Right => Vec2::new(rope.y, -rope.x),
            Facing::Left => Vec2::new(-rope.y, rope.x),
        }
        .normalize_or_zero();

        let multiplier = if self.body.velocity.dot(tangent) < 0.0 {
            self.config.swing_brake_multiplier
        } else {
            1.0
        };
        self.body
            .add_force(tangent * self.config.swing_tangential_force * multiplier);
    }

    /// First qualifying hit of the ray fan, mirrored by facing
    pub fn find_swing_point<Q: PhysicsQuery + ?Sized>(&self, world: &Q) -> Option<RayHit> {
        let origin = self.body.position;
        fan_angles().find_map(|angle: f32| {
            let radians = angle.to_radians();
            let direction = Vec2::new(radians.cos() * self.facing.sign(), radians.sin());
            world
                .raycast(
                    origin,
                    direction,
                    self.config.swing_ray_distance,
                    self.config.swing_layers,
                )
                .filter(|hit| {
                    hit.point.y > origin.y && world.surface_tag(hit.collider) != SurfaceTag::CantSwing
                })
        })
    }

    fn update_indicator<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q) {
        if self.is_swinging() {
            self.indicator = None;
            return;
        }
        match self.find_swing_point(world) {
            Some(hit) => {
                let moved = self.indicator.map_or(true, |cached| {
                    cached.distance(hit.point) > self.config.indicator_stability_threshold
                });
                if moved {
                    self.indicator = Some(hit.point);
                }
            }
            None => self.indicator = None,
        }
    }

    fn update_rotation(&mut self, dt: f32) {
        match self.anchor() {
            Some(anchor) => {
                let rope = anchor.point - self.body.position;
                let target = rope.y.atan2(rope.x).to_degrees() - 90.0;
                let t = (dt * self.config.swing_rotation_speed).min(1.0);
                self.sprite_angle = lerp_angle(self.sprite_angle, target, t);
            }
            None => {
                let t = (dt * self.config.rotation_reset_speed).min(1.0);
                self.sprite_angle = lerp_angle(self.sprite_angle, 0.0, t);
            }
        }
    }

    fn start_swing<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, events: &mut EventQueue) {
        if matches!(self.state, SwingState::DashingToAnchor { .. }) {
            return;
        }
        let position = self.body.position;

        // Prefer the indicated point if a ray toward it still finds something
        let verified = self.indicator.and_then(|point| {
            world
                .raycast(
                    position,
                    point - position,
                    self.config.swing_ray_distance,
                    self.config.swing_layers,
                )
                .map(|hit| SwingAnchor {
                    point,
                    collider: hit.collider,
                })
        });
        let Some(anchor) = verified.or_else(|| {
            self.find_swing_point(world).map(|hit| SwingAnchor {
                point: hit.point,
                collider: hit.collider,
            })
        }) else {
            return;
        };

        if world.surface_tag(anchor.collider) == SurfaceTag::Breakable {
            events.push(PlayerEvent::BreakRequested {
                collider: anchor.collider,
            });
        }
        self.indicator = None;
        events.push(PlayerEvent::AbilityUsed);

        let ground = world.raycast(
            position,
            Vec2::NEG_Y,
            self.config.ground_dash_check_distance,
            self.config.solid_layers,
        );
        if ground.is_some() {
            let direction = (anchor.point - position).normalize_or_zero();
            self.body.velocity = Vec2::ZERO;
            self.body
                .add_impulse(direction * self.config.ground_dash_force);
            self.body.gravity_scale = self.config.swing_gravity_scale;
            self.state = SwingState::DashingToAnchor {
                anchor,
                timer: self.config.ground_dash_duration,
            };
        } else {
            self.attach(anchor);
        }
    }

    fn attach(&mut self, anchor: SwingAnchor) {
        let offset = anchor.point - self.body.position;
        let max_length = offset.length();
        if let Some(radial) = offset.try_normalize() {
            let v = self.body.velocity;
            self.body.velocity = v - radial * v.dot(radial);
        }
        self.body.gravity_scale = self.config.swing_gravity_scale;
        self.state = SwingState::Swinging { anchor, max_length };
    }

    fn stop_swing(&mut self) {
        self.state = SwingState::Idle;
    }

    /// Let go; rising bodies get a gentler jump
    fn release_swing(&mut self) {
        self.stop_swing();
        if self.body.velocity.y > 0.0 {
            self.jump.start_rise(self.config.swing_jump_deceleration);
        } else {
            self.jump.cancel_rise();
        }
    }

    /// Drop every transient sub-state
    pub fn reset_transient(&mut self) {
        self.stop_swing();
        self.jump.reset(&self.config.jump);
        self.move_input = Vec2::ZERO;
        self.grounded = false;
        self.touching_wall_right = false;
        self.touching_wall_left = false;
        self.indicator = None;
        self.sprite_angle = 0.0;
        self.sensor.clear();
        self.body.gravity_scale = 0.0;
    }

    pub fn deactivate(&mut self) {
        self.reset_transient();
        self.body.enabled = false;
    }
}

impl PlayerController for SwingController {
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

/// Interpolate between two angles in degrees along the shorter arc
fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    from + delta * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::BoxWorld;
    use shapeshift_physics::{BodyMover, ColliderControl, SurfaceInfo};

    const DT: f32 = 0.02;

    fn spawn(position: Vec2, velocity: Vec2) -> SwingController {
        let mut triangle = SwingController::new(SwingConfig::default());
        triangle.body_mut().position = position;
        triangle.on_enable_set_velocity(VelocitySnapshot {
            velocity,
            dash_count: 1,
            facing_right: true,
        });
        triangle
    }

    fn ceiling(world: &mut BoxWorld, y: f32) -> ColliderId {
        world.add_box(
            Vec2::new(-50.0, y),
            Vec2::new(50.0, y + 1.0),
            LayerMask::SWINGABLE,
            None,
        )
    }

    fn tick(world: &mut BoxWorld, triangle: &mut SwingController, input: ControlInput) -> EventQueue {
        let mut events = EventQueue::new();
        triangle.handle_input(&*world, &input, &mut events);
        triangle.frame_update(&*world, DT);
        triangle.fixed_update(&*world, DT);
        let gravity = world.gravity();
        triangle.body_mut().integrate(gravity, DT);
        world.move_body(triangle.body_mut(), DT);
        triangle.after_move();
        events
    }

    fn press_ability() -> ControlInput {
        ControlInput {
            ability_pressed: true,
            ability_held: true,
            ..ControlInput::default()
        }
    }

    fn hold_ability() -> ControlInput {
        ControlInput {
            ability_held: true,
            ..ControlInput::default()
        }
    }

    #[test]
    fn test_fan_angle_order() {
        let angles: Vec<f32> = fan_angles().collect();
        assert_eq!(angles.len(), 17);
        assert_eq!(&angles[..5], &[45.0, 50.0, 40.0, 55.0, 35.0]);
        assert_eq!(angles[16], 5.0);
    }

    #[test]
    fn test_swing_point_at_45_degrees_ahead() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let triangle = spawn(Vec2::ZERO, Vec2::ZERO);

        let hit = triangle.find_swing_point(&world).expect("ceiling in range");
        assert!((hit.point - Vec2::new(4.0, 4.0)).length() < 1e-3);
    }

    #[test]
    fn test_cant_swing_surface_is_skipped() {
        let mut world = BoxWorld::new();
        world.add_box(
            Vec2::new(2.9, 2.9),
            Vec2::new(3.1, 3.1),
            LayerMask::SWINGABLE,
            Some(SurfaceInfo::tagged(SurfaceTag::CantSwing)),
        );
        let roof = ceiling(&mut world, 4.0);
        let triangle = spawn(Vec2::ZERO, Vec2::ZERO);

        let hit = triangle.find_swing_point(&world).expect("roof in range");
        assert_eq!(hit.collider, roof);
        assert!((hit.point.y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_airborne_attach_keeps_only_tangential_velocity() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::new(3.0, 4.0));
        let mut events = EventQueue::new();

        triangle.handle_input(&world, &press_ability(), &mut events);
        let SwingState::Swinging { anchor, max_length } = triangle.state() else {
            panic!("expected an immediate attach, got {:?}", triangle.state());
        };
        assert!((max_length - 32f32.sqrt()).abs() < 1e-3);
        assert!((anchor.point - Vec2::new(4.0, 4.0)).length() < 1e-3);

        let v = triangle.body().velocity;
        assert!((v - Vec2::new(-0.5, 0.5)).length() < 1e-3, "velocity {v}");
        assert!(events.iter().any(|e| *e == PlayerEvent::AbilityUsed));
    }

    #[test]
    fn test_rope_holds_max_length() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);
        tick(&mut world, &mut triangle, press_ability());
        let SwingState::Swinging { anchor, max_length } = triangle.state() else {
            panic!("not swinging");
        };

        for _ in 0..100 {
            tick(&mut world, &mut triangle, hold_ability());
            let distance = triangle.body().position.distance(anchor.point);
            assert!(distance <= max_length + 1e-3);
        }
        assert!(triangle.is_swinging());
        assert!(triangle.sprite_angle().abs() > 1.0);
    }

    #[test]
    fn test_hold_mode_release_lets_go() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);
        tick(&mut world, &mut triangle, press_ability());
        assert!(triangle.is_swinging());

        tick(
            &mut world,
            &mut triangle,
            ControlInput {
                ability_released: true,
                ..ControlInput::default()
            },
        );
        assert!(!triangle.is_swinging());
        assert!(triangle.rope_points().is_empty());
    }

    #[test]
    fn test_toggle_mode_second_press_lets_go() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);
        triangle.config.mode = SwingMode::Toggle;

        tick(&mut world, &mut triangle, press_ability());
        tick(
            &mut world,
            &mut triangle,
            ControlInput {
                ability_released: true,
                ..ControlInput::default()
            },
        );
        assert!(triangle.is_swinging());

        tick(&mut world, &mut triangle, press_ability());
        assert!(!triangle.is_swinging());
    }

    #[test]
    fn test_jump_while_rising_grants_soft_jump() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);
        let mut events = EventQueue::new();
        triangle.handle_input(&world, &press_ability(), &mut events);
        triangle.body_mut().velocity = Vec2::new(4.0, 3.0);

        triangle.handle_input(
            &world,
            &ControlInput {
                jump_pressed: true,
                ability_held: true,
                ..ControlInput::default()
            },
            &mut events,
        );
        assert!(!triangle.is_swinging());
        assert!(triangle.is_jumping());
    }

    #[test]
    fn test_grounded_start_dashes_then_attaches() {
        let mut world = BoxWorld::new();
        world.add_floor(0.0);
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::new(0.0, 0.5), Vec2::ZERO);

        tick(&mut world, &mut triangle, press_ability());
        assert!(matches!(triangle.state(), SwingState::DashingToAnchor { .. }));
        assert_eq!(triangle.rope_points().len(), 2);

        let ticks = (triangle.config.ground_dash_duration / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            tick(&mut world, &mut triangle, hold_ability());
        }
        assert!(matches!(triangle.state(), SwingState::Swinging { .. }));
    }

    #[test]
    fn test_disabled_anchor_ends_swing() {
        let mut world = BoxWorld::new();
        let roof = ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);
        tick(&mut world, &mut triangle, press_ability());
        assert!(triangle.is_swinging());

        world.set_collider_enabled(roof, false);
        tick(&mut world, &mut triangle, hold_ability());
        assert!(!triangle.is_swinging());
    }

    #[test]
    fn test_breakable_anchor_requests_break() {
        let mut world = BoxWorld::new();
        let tile = world.add_box(
            Vec2::new(-50.0, 4.0),
            Vec2::new(50.0, 5.0),
            LayerMask::BREAKABLE,
            Some(SurfaceInfo::tagged(SurfaceTag::Breakable)),
        );
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);

        let events = tick(&mut world, &mut triangle, press_ability());
        assert!(events
            .iter()
            .any(|e| *e == PlayerEvent::BreakRequested { collider: tile }));
    }

    #[test]
    fn test_indicator_only_moves_past_threshold() {
        let mut world = BoxWorld::new();
        ceiling(&mut world, 4.0);
        let mut triangle = spawn(Vec2::ZERO, Vec2::ZERO);

        triangle.update_indicator(&world);
        let first = triangle.indicator().expect("indicator shown");

        triangle.body_mut().position.x += 0.2;
        triangle.update_indicator(&world);
        assert_eq!(triangle.indicator(), Some(first));

        triangle.body_mut().position.x += 1.0;
        triangle.update_indicator(&world);
        assert_ne!(triangle.indicator(), Some(first));
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        assert!((lerp_angle(170.0, -170.0, 0.5) - 180.0).abs() < 1e-4);
        assert!((lerp_angle(0.0, 90.0, 0.5) - 45.0).abs() < 1e-4);
    }
}
