//! The four shape controllers behind one type

use serde::{Deserialize, Serialize};
use shapeshift_core::{ShapeMap, ShapeMapError, ShapeVariant};
use shapeshift_physics::{MoveOutcome, PhysicsQuery};

use crate::events::EventQueue;
use crate::input::ControlInput;
use crate::player::{
    DashConfig, DashController, PlayerController, RollConfig, RollController, SwingConfig,
    SwingController,
};

/// A shape's movement controller
pub enum ShapeController {
    Roll(RollController),
    Dash(DashController),
    Swing(SwingController),
}

impl ShapeController {
    pub fn as_controller(&self) -> &dyn PlayerController {
        match self {
            ShapeController::Roll(c) => c,
            ShapeController::Dash(c) => c,
            ShapeController::Swing(c) => c,
        }
    }

    pub fn as_controller_mut(&mut self) -> &mut dyn PlayerController {
        match self {
            ShapeController::Roll(c) => c,
            ShapeController::Dash(c) => c,
            ShapeController::Swing(c) => c,
        }
    }

    pub fn as_roll(&self) -> Option<&RollController> {
        match self {
            ShapeController::Roll(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_dash(&self) -> Option<&DashController> {
        match self {
            ShapeController::Dash(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_swing(&self) -> Option<&SwingController> {
        match self {
            ShapeController::Swing(c) => Some(c),
            _ => None,
        }
    }

    pub fn handle_input<Q: PhysicsQuery + ?Sized>(
        &mut self,
        world: &Q,
        input: &ControlInput,
        events: &mut EventQueue,
    ) {
        match self {
            ShapeController::Roll(c) => c.handle_input(input, events),
            ShapeController::Dash(c) => c.handle_input(input, events),
            ShapeController::Swing(c) => c.handle_input(world, input, events),
        }
    }

    pub fn frame_update<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        match self {
            ShapeController::Roll(c) => c.frame_update(dt),
            ShapeController::Dash(c) => c.frame_update(dt),
            ShapeController::Swing(c) => c.frame_update(world, dt),
        }
    }

    /// Visual-only state that keeps fading while the shape is inactive
    pub fn update_cosmetics(&mut self, dt: f32) {
        if let ShapeController::Dash(c) = self {
            c.update_cosmetics(dt);
        }
    }

    pub fn fixed_update<Q: PhysicsQuery + ?Sized>(&mut self, world: &Q, dt: f32) {
        match self {
            ShapeController::Roll(c) => c.fixed_update(world, dt),
            ShapeController::Dash(c) => c.fixed_update(world, dt),
            ShapeController::Swing(c) => c.fixed_update(world, dt),
        }
    }

    pub fn after_move(&mut self, outcome: &MoveOutcome) {
        match self {
            ShapeController::Roll(c) => c.after_move(outcome),
            ShapeController::Dash(_) => {}
            ShapeController::Swing(c) => c.after_move(),
        }
    }

    pub fn reset_transient(&mut self) {
        match self {
            ShapeController::Roll(c) => c.reset_transient(),
            ShapeController::Dash(c) => c.reset_transient(),
            ShapeController::Swing(c) => c.reset_transient(),
        }
    }

    pub fn deactivate(&mut self) {
        match self {
            ShapeController::Roll(c) => c.deactivate(),
            ShapeController::Dash(c) => c.deactivate(),
            ShapeController::Swing(c) => c.deactivate(),
        }
    }
}

/// Per-shape controller tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub circle: RollConfig,
    pub star: RollConfig,
    pub square: DashConfig,
    pub triangle: SwingConfig,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            circle: RollConfig::default(),
            star: RollConfig::star(),
            square: DashConfig::default(),
            triangle: SwingConfig::default(),
        }
    }
}

impl RosterConfig {
    /// One controller per shape
    pub fn build(&self) -> Result<ShapeMap<ShapeController>, ShapeMapError> {
        ShapeMap::try_from_entries([
            (
                ShapeVariant::Circle,
                ShapeController::Roll(RollController::new(self.circle.clone())),
            ),
            (
                ShapeVariant::Star,
                ShapeController::Roll(RollController::new(self.star.clone())),
            ),
            (
                ShapeVariant::Square,
                ShapeController::Dash(DashController::new(self.square.clone())),
            ),
            (
                ShapeVariant::Triangle,
                ShapeController::Swing(SwingController::new(self.triangle.clone())),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_roster_kinds() {
        let roster = RosterConfig::default().build().expect("complete roster");
        assert!(roster.get(ShapeVariant::Circle).as_roll().is_some());
        assert!(roster.get(ShapeVariant::Star).as_roll().is_some());
        assert!(roster.get(ShapeVariant::Square).as_dash().is_some());
        assert!(roster.get(ShapeVariant::Triangle).as_swing().is_some());

        // Every body starts suspended
        assert!(roster.iter().all(|(_, c)| !c.as_controller().body().enabled));
    }

    #[test]
    fn test_star_is_a_tuned_roll() {
        let roster = RosterConfig::default().build().expect("complete roster");
        let circle = roster.get(ShapeVariant::Circle).as_roll().map(|c| c.config.run.max_speed);
        let star = roster.get(ShapeVariant::Star).as_roll().map(|c| c.config.run.max_speed);
        assert_ne!(circle, star);
    }
}
