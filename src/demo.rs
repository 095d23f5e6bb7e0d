//! Demo level and scripted input for the headless driver

use glam::Vec2;
use shapeshift_core::Aabb;
use shapeshift_game::{BoundaryDirection, InputAction, InputState, StageBoundary, StageDef};
use shapeshift_physics::{LaunchPadData, LayerMask, PhysicsWorld, SurfaceInfo, SurfaceTag};

pub const SPAWN: Vec2 = Vec2::new(0.0, 0.5);

/// Two stages side by side; the gate between them sits at x = 35
pub fn stages() -> Vec<StageDef> {
    vec![
        StageDef::new("meadow", Aabb::new(Vec2::new(-10.0, -5.0), Vec2::new(35.0, 20.0)))
            .with_unlock_all(),
        StageDef::new("ridge", Aabb::new(Vec2::new(35.0, -5.0), Vec2::new(70.0, 20.0))),
    ]
}

pub fn gate() -> StageBoundary {
    StageBoundary::new(
        "ridge",
        Aabb::new(Vec2::new(33.0, 0.0), Vec2::new(37.0, 10.0)),
        BoundaryDirection::LeftAndRight,
    )
}

/// Checkpoint id, respawn point and trigger area
pub fn checkpoint() -> (u32, Vec2, Aabb) {
    (
        1,
        Vec2::new(20.0, 0.5),
        Aabb::new(Vec2::new(19.0, 0.0), Vec2::new(21.0, 3.0)),
    )
}

/// Floor, launch pad, swing ceiling with one breakable tile, spikes
pub fn build_level(world: &mut PhysicsWorld) {
    world.add_static_box(
        Vec2::new(40.0, 0.5),
        Vec2::new(30.0, -0.5),
        LayerMask::GROUND,
        None,
    );
    world.add_static_box(
        Vec2::new(1.0, 0.25),
        Vec2::new(9.0, 0.25),
        LayerMask::GROUND,
        Some(SurfaceInfo::launch_pad(LaunchPadData {
            direction: Vec2::new(0.3, 1.0),
            force: 18.0,
            duration: 0.4,
            ..LaunchPadData::default()
        })),
    );
    world.add_static_box(
        Vec2::new(6.0, 0.5),
        Vec2::new(20.0, 6.5),
        LayerMask::SWINGABLE,
        None,
    );
    world.add_static_box(
        Vec2::new(0.5, 0.5),
        Vec2::new(14.5, 6.5),
        LayerMask::BREAKABLE,
        Some(SurfaceInfo::tagged(SurfaceTag::Breakable)),
    );
    world.add_static_box(
        Vec2::new(1.0, 0.25),
        Vec2::new(48.0, 0.25),
        LayerMask::HAZARD,
        None,
    );
}

/// One scripted key hold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedPress {
    pub action: InputAction,
    pub at: f32,
    pub hold: f32,
}

impl ScriptedPress {
    const fn new(action: InputAction, at: f32, hold: f32) -> Self {
        Self { action, at, hold }
    }

    fn held_at(&self, time: f32) -> bool {
        time >= self.at && time < self.at + self.hold
    }
}

/// Plays key holds into an [`InputState`] over time
#[derive(Debug, Clone)]
pub struct InputScript {
    presses: Vec<ScriptedPress>,
    time: f32,
}

impl InputScript {
    pub fn new(presses: Vec<ScriptedPress>) -> Self {
        Self { presses, time: 0.0 }
    }

    /// Seconds until the last key is released
    pub fn duration(&self) -> f32 {
        self.presses
            .iter()
            .map(|p| p.at + p.hold)
            .fold(0.0, f32::max)
    }

    /// Advance by `dt` and press/release whatever changed
    pub fn step(&mut self, input: &mut InputState, dt: f32) {
        self.time += dt;
        for press in &self.presses {
            let held = self.presses.iter().any(|p| p.action == press.action && p.held_at(self.time));
            if held && !input.is_held(press.action) {
                input.press(press.action);
            } else if !held && input.is_held(press.action) {
                input.release(press.action);
            }
        }
    }
}

/// Roll, turbo, quick switch to the rope, swing, confirm a slow-motion pick
/// of the square, dash, then run into the spikes
pub fn tour() -> InputScript {
    use InputAction::*;
    InputScript::new(vec![
        ScriptedPress::new(MoveRight, 0.0, 2.2),
        ScriptedPress::new(Ability, 0.6, 1.2),
        ScriptedPress::new(SelectTriangle, 2.3, 0.05),
        ScriptedPress::new(MoveRight, 2.4, 3.0),
        ScriptedPress::new(Jump, 2.5, 0.2),
        ScriptedPress::new(Ability, 2.7, 1.5),
        ScriptedPress::new(SwitchModeStart, 5.6, 0.05),
        ScriptedPress::new(SelectSquare, 5.8, 0.05),
        ScriptedPress::new(SwitchModeStart, 6.0, 0.05),
        ScriptedPress::new(MoveRight, 6.2, 6.0),
        ScriptedPress::new(Ability, 6.5, 0.05),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_presses_and_releases() {
        let mut script = InputScript::new(vec![
            ScriptedPress::new(InputAction::Jump, 0.1, 0.2),
            ScriptedPress::new(InputAction::MoveLeft, 0.0, 1.0),
        ]);
        let mut input = InputState::new();
        assert!((script.duration() - 1.0).abs() < 1e-6);

        script.step(&mut input, 0.05);
        assert!(input.is_held(InputAction::MoveLeft));
        assert!(!input.is_held(InputAction::Jump));

        input.clear_frame();
        script.step(&mut input, 0.1);
        assert!(input.is_just_pressed(InputAction::Jump));

        input.clear_frame();
        script.step(&mut input, 0.2);
        assert!(input.is_just_released(InputAction::Jump));
        assert!(input.is_held(InputAction::MoveLeft));
    }

    #[test]
    fn test_overlapping_holds_stay_held() {
        let mut script = InputScript::new(vec![
            ScriptedPress::new(InputAction::MoveRight, 0.0, 1.0),
            ScriptedPress::new(InputAction::MoveRight, 0.9, 1.0),
        ]);
        let mut input = InputState::new();
        script.step(&mut input, 0.95);
        input.clear_frame();
        script.step(&mut input, 0.1);
        assert!(input.is_held(InputAction::MoveRight));
        assert!(!input.is_just_released(InputAction::MoveRight));
    }

    #[test]
    fn test_level_builds() {
        let mut world = PhysicsWorld::new();
        build_level(&mut world);
        assert_eq!(world.collider_count(), 5);
    }
}
