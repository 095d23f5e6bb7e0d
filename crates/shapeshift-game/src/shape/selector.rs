//! Shape selection input state machine
//!
//! Turns raw selection input into at most one [`SelectorCommand`] per frame.
//! The selector never touches controllers or the time scale itself; the
//! [`PlayerManager`](super::PlayerManager) acts on the commands.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::ShapeVariant;

use crate::input::{InputAction, InputState};

/// How a candidate is picked while the selection is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectorMode {
    /// Select keys pick the candidate; the switch key confirms
    #[default]
    Keyboard,
    /// Accumulated mouse motion picks the candidate; the end key confirms
    Mouse,
}

/// Selector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub mode: SelectorMode,
    /// Accumulated mouse distance needed before a direction counts
    pub mouse_dead_zone: f32,
    /// Cap on the accumulated mouse offset
    pub max_mouse_distance: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            mode: SelectorMode::Keyboard,
            mouse_dead_zone: 20.0,
            max_mouse_distance: 100.0,
        }
    }
}

/// What the manager should do after this frame's selection input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorCommand {
    /// Selection opened; slow time down
    Opened,
    /// Selection closed on this candidate; restore time and swap
    Confirmed(ShapeVariant),
    /// Selection closed without a swap; restore time
    Cancelled,
    /// Direct switch with no selection open
    QuickSwitch(ShapeVariant),
}

/// Selection session state
#[derive(Debug, Clone)]
pub struct ShapeSelector {
    pub config: SelectorConfig,
    open: bool,
    candidate: ShapeVariant,
    mouse_accumulator: Vec2,
}

impl ShapeSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self {
            config,
            open: false,
            candidate: ShapeVariant::default(),
            mouse_accumulator: Vec2::ZERO,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Shape highlighted in the open selection
    pub fn candidate(&self) -> ShapeVariant {
        self.candidate
    }

    pub fn mouse_accumulator(&self) -> Vec2 {
        self.mouse_accumulator
    }

    /// Process one frame of input
    ///
    /// `available` is false when the stage forbids selection; nothing opens
    /// and no quick switch fires, but an open session can still be closed.
    pub fn process(
        &mut self,
        input: &InputState,
        current: ShapeVariant,
        available: bool,
    ) -> Option<SelectorCommand> {
        match self.config.mode {
            SelectorMode::Keyboard => self.process_keyboard(input, current, available),
            SelectorMode::Mouse => self.process_mouse(input, current, available),
        }
    }

    fn process_keyboard(
        &mut self,
        input: &InputState,
        current: ShapeVariant,
        available: bool,
    ) -> Option<SelectorCommand> {
        let mut command = None;
        if input.is_just_pressed(InputAction::SwitchModeStart) {
            if self.open {
                self.open = false;
                return Some(SelectorCommand::Confirmed(self.candidate));
            }
            if available {
                self.open_session(current);
                command = Some(SelectorCommand::Opened);
            }
        }

        if let Some(shape) = input.pressed_selection() {
            if self.open {
                self.candidate = shape;
            } else if available {
                return Some(SelectorCommand::QuickSwitch(shape));
            }
        }
        command
    }

    fn process_mouse(
        &mut self,
        input: &InputState,
        current: ShapeVariant,
        available: bool,
    ) -> Option<SelectorCommand> {
        if input.is_just_pressed(InputAction::SwitchModeStart) {
            if self.open {
                self.open = false;
                return Some(SelectorCommand::Cancelled);
            }
            if available {
                self.open_session(current);
                return Some(SelectorCommand::Opened);
            }
        }

        if !self.open {
            return input
                .pressed_selection()
                .filter(|_| available)
                .map(SelectorCommand::QuickSwitch);
        }

        self.mouse_accumulator = (self.mouse_accumulator + input.mouse_delta)
            .clamp_length_max(self.config.max_mouse_distance);
        if let Some(shape) = classify_mouse(self.mouse_accumulator, self.config.mouse_dead_zone) {
            self.candidate = shape;
        }

        if input.is_just_pressed(InputAction::SwitchModeEnd) {
            self.open = false;
            return Some(SelectorCommand::Confirmed(self.candidate));
        }
        None
    }

    fn open_session(&mut self, current: ShapeVariant) {
        self.open = true;
        self.candidate = current;
        self.mouse_accumulator = Vec2::ZERO;
    }

    /// Close an open session from outside (death, stage lock); true if it was open
    pub fn cancel(&mut self) -> bool {
        let was_open = self.open;
        self.open = false;
        self.mouse_accumulator = Vec2::ZERO;
        was_open
    }
}

/// Map an accumulated mouse offset to a shape: up Circle, right Star,
/// down Square, left Triangle
///
/// Offsets shorter than `dead_zone` pick nothing.
pub fn classify_mouse(offset: Vec2, dead_zone: f32) -> Option<ShapeVariant> {
    if offset.length() < dead_zone || offset == Vec2::ZERO {
        return None;
    }
    // Signed angle from straight up, counter-clockwise positive
    let angle = (-offset.x).atan2(offset.y).to_degrees();
    let shape = if angle > -45.0 && angle <= 45.0 {
        ShapeVariant::Circle
    } else if angle > 45.0 && angle <= 135.0 {
        ShapeVariant::Triangle
    } else if angle > -135.0 && angle <= -45.0 {
        ShapeVariant::Star
    } else {
        ShapeVariant::Square
    };
    Some(shape)
}
