//! 2D follow camera

use glam::Vec2;
use shapeshift_core::Aabb;

use super::CameraConfig;

/// Follow camera clamped to the current stage
pub struct CameraRig {
    /// Configuration
    pub config: CameraConfig,
    /// Camera center
    position: Vec2,
    /// SmoothDamp velocity per axis
    velocity: Vec2,
    /// Current half view height
    zoom: f32,
    target_zoom: f32,
    /// Clamp bounds, easing toward `target_bounds`
    bounds: Aabb,
    target_bounds: Aabb,
}

impl CameraRig {
    /// Create a camera centered on `position` with unbounded movement
    pub fn new(config: CameraConfig, position: Vec2) -> Self {
        let unbounded = Aabb::new(Vec2::splat(-1.0e6), Vec2::splat(1.0e6));
        Self {
            position,
            velocity: Vec2::ZERO,
            zoom: config.default_zoom,
            target_zoom: config.default_zoom,
            bounds: unbounded,
            target_bounds: unbounded,
            config,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Half extents of the visible rectangle
    pub fn view_half_extents(&self) -> Vec2 {
        Vec2::new(self.zoom * self.config.aspect, self.zoom)
    }

    /// Visible rectangle in world space
    pub fn view_rect(&self) -> Aabb {
        Aabb::from_center(self.position, self.view_half_extents())
    }

    /// Retarget the clamp to a new stage; narrow maps zoom in
    pub fn set_bounds(&mut self, bounds: Aabb) {
        self.target_bounds = bounds;
        let view_width = self.zoom * 2.0 * self.config.aspect;
        self.target_zoom = if bounds.size().x < view_width {
            self.config.tight_zoom
        } else {
            self.config.default_zoom
        };
    }

    /// Retarget and jump straight to the new bounds and zoom
    pub fn set_bounds_immediate(&mut self, bounds: Aabb) {
        self.set_bounds(bounds);
        self.bounds = bounds;
        self.zoom = self.target_zoom;
    }

    /// Jump onto the player (respawn)
    pub fn snap_to(&mut self, player: Vec2) {
        self.velocity = Vec2::ZERO;
        let target = player + Vec2::new(0.0, self.look_offset(player));
        self.position = self.clamp_to_bounds(target);
    }

    /// Per-frame follow
    pub fn update(&mut self, player: Vec2, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let t = (dt * self.config.bounds_switch_speed).min(1.0);
        self.bounds = Aabb::new(
            self.bounds.min.lerp(self.target_bounds.min, t),
            self.bounds.max.lerp(self.target_bounds.max, t),
        );

        let target = player + Vec2::new(0.0, self.look_offset(player));
        let followed = Vec2::new(
            self.follow_axis(self.position.x, target.x, 0, dt),
            self.follow_axis(self.position.y, target.y, 1, dt),
        );
        let clamped = self.clamp_to_bounds(followed);

        let lag = self.config.max_lag;
        self.position = Vec2::new(
            clamped.x.clamp(player.x - lag.x, player.x + lag.x),
            clamped.y.clamp(player.y - lag.y, player.y + lag.y),
        );

        let t = (dt * self.config.zoom_speed).min(1.0);
        self.zoom += (self.target_zoom - self.zoom) * t;
    }

    fn follow_axis(&mut self, current: f32, target: f32, axis: usize, dt: f32) -> f32 {
        let dead = self.config.dead_zone[axis];
        let soft = self.config.soft_zone[axis];
        let delta = target - current;
        let distance = delta.abs();

        if distance > dead + soft {
            let mut velocity = self.velocity[axis];
            let next = smooth_damp(current, target, &mut velocity, self.config.smooth_time, dt);
            self.velocity[axis] = velocity;
            return next;
        }
        self.velocity[axis] = 0.0;

        let fraction = if distance > dead {
            self.config.soft_follow * (distance - dead) / soft.max(f32::EPSILON)
        } else {
            self.config.dead_follow
        };
        // Per-frame fraction at 60 fps, made frame-rate independent
        let lerp = 1.0 - (1.0 - fraction).powf(dt * 60.0);
        current + delta * lerp
    }

    /// Vertical offset that keeps more of the map visible near its top or bottom
    fn look_offset(&self, player: Vec2) -> f32 {
        let quarter = self.zoom * 2.0 / 4.0;
        let bottom = player.y - self.bounds.min.y;
        let top = self.bounds.max.y - player.y;
        if top < quarter {
            -(quarter - top)
        } else if bottom < quarter {
            quarter - bottom
        } else {
            0.0
        }
    }

    fn clamp_to_bounds(&self, position: Vec2) -> Vec2 {
        let half = self.view_half_extents();
        Vec2::new(
            clamp_span(position.x, self.bounds.min.x + half.x, self.bounds.max.x - half.x),
            clamp_span(position.y, self.bounds.min.y + half.y, self.bounds.max.y - half.y),
        )
    }
}

/// Clamp into `[lo, hi]`; a map smaller than the view centers instead
fn clamp_span(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        (lo + hi) * 0.5
    } else {
        value.clamp(lo, hi)
    }
}

/// Critically damped spring toward `target`
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(1.0e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let output = target + (change + temp) * decay;

    // No overshoot
    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        return target;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn open_rig() -> CameraRig {
        let mut rig = CameraRig::new(CameraConfig::default(), Vec2::ZERO);
        rig.set_bounds_immediate(Aabb::new(Vec2::splat(-1000.0), Vec2::splat(1000.0)));
        rig
    }

    #[test]
    fn test_smooth_damp_converges_without_overshoot() {
        let mut velocity = 0.0;
        let mut value = 0.0;
        for _ in 0..120 {
            value = smooth_damp(value, 10.0, &mut velocity, 0.2, DT);
            assert!(value <= 10.0);
        }
        assert!((value - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_dead_zone_drifts_slowly() {
        let mut rig = open_rig();
        rig.update(Vec2::new(3.0, 0.0), DT);
        let x = rig.position().x;
        assert!(x > 0.0 && x < 0.5, "x = {x}");
    }

    #[test]
    fn test_far_player_is_caught_up() {
        let mut rig = open_rig();
        for _ in 0..180 {
            rig.update(Vec2::new(30.0, 0.0), DT);
        }
        assert!((rig.position().x - 30.0).abs() < rig.config.dead_zone.x + rig.config.soft_zone.x);
    }

    #[test]
    fn test_max_lag_holds_camera_near_player() {
        let mut rig = open_rig();
        rig.update(Vec2::new(50.0, 0.0), DT);
        assert!(rig.position().x >= 50.0 - rig.config.max_lag.x - 1e-3);
    }

    #[test]
    fn test_clamp_keeps_view_inside_bounds() {
        let mut rig = CameraRig::new(CameraConfig::default(), Vec2::ZERO);
        rig.set_bounds_immediate(Aabb::new(Vec2::new(-100.0, -50.0), Vec2::new(100.0, 50.0)));
        rig.snap_to(Vec2::new(-99.0, 0.0));

        let view = rig.view_rect();
        assert!(view.min.x >= -100.0 - 1e-3);
        assert!((rig.position().x - (-100.0 + rig.view_half_extents().x)).abs() < 1e-3);
    }

    #[test]
    fn test_small_map_centers_and_zooms_in() {
        let mut rig = CameraRig::new(CameraConfig::default(), Vec2::ZERO);
        let small = Aabb::new(Vec2::new(-5.0, -3.0), Vec2::new(15.0, 3.0));
        rig.set_bounds(small);
        assert_eq!(rig.target_zoom(), rig.config.tight_zoom);

        for _ in 0..600 {
            rig.update(Vec2::new(4.0, 2.0), DT);
        }
        assert!((rig.zoom() - rig.config.tight_zoom).abs() < 0.01);
        assert!((rig.bounds().min - small.min).length() < 1e-3);

        rig.snap_to(Vec2::new(4.0, 2.0));
        assert!((rig.position() - small.center()).length() < 1e-3);
    }

    #[test]
    fn test_look_offset_near_map_bottom() {
        let mut rig = CameraRig::new(CameraConfig::default(), Vec2::ZERO);
        rig.set_bounds_immediate(Aabb::new(Vec2::new(-500.0, 0.0), Vec2::new(500.0, 500.0)));
        rig.snap_to(Vec2::new(0.0, 1.0));
        // Never below the clamp, and lifted above the player
        assert!(rig.position().y >= rig.view_half_extents().y - 1e-3);
        assert!(rig.position().y > 1.0);
    }
}
