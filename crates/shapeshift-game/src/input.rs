//! Input system with action-based mapping
//!
//! Raw winit events become logical actions; controllers only ever see the
//! per-frame [`ControlInput`] view.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::ShapeVariant;
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Aim / move up (W by default)
    MoveUp,
    /// Aim / move down (S by default)
    MoveDown,
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Jump (Space by default)
    Jump,
    /// Shape ability: turbo, dash or rope (Left Shift by default)
    Ability,
    /// Open the shape selection, or cancel it (Q / right mouse by default)
    SwitchModeStart,
    /// Confirm the mouse selection (left mouse by default)
    SwitchModeEnd,
    /// Select Circle (1 by default)
    SelectCircle,
    /// Select Star (2 by default)
    SelectStar,
    /// Select Square (3 by default)
    SelectSquare,
    /// Select Triangle (4 by default)
    SelectTriangle,
    /// Pause/unpause (Escape by default)
    Pause,
}

impl InputAction {
    /// The shape a select action picks
    pub fn selected_shape(self) -> Option<ShapeVariant> {
        match self {
            InputAction::SelectCircle => Some(ShapeVariant::Circle),
            InputAction::SelectStar => Some(ShapeVariant::Star),
            InputAction::SelectSquare => Some(ShapeVariant::Square),
            InputAction::SelectTriangle => Some(ShapeVariant::Triangle),
            _ => None,
        }
    }
}

const SELECT_ACTIONS: [InputAction; 4] = [
    InputAction::SelectCircle,
    InputAction::SelectStar,
    InputAction::SelectSquare,
    InputAction::SelectTriangle,
];

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
    /// Mouse movement delta for this frame
    pub mouse_delta: Vec2,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Record a press (sets held and just-pressed)
    pub fn press(&mut self, action: InputAction) {
        if !self.held.contains(&action) {
            self.just_pressed.insert(action);
        }
        self.held.insert(action);
    }

    /// Record a release (clears held, sets just-released)
    pub fn release(&mut self, action: InputAction) {
        if self.held.remove(&action) {
            self.just_released.insert(action);
        }
    }

    /// Movement axis from the held direction actions, each component in [-1, 1]
    pub fn move_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_held(InputAction::MoveRight) {
            axis.x += 1.0;
        }
        if self.is_held(InputAction::MoveLeft) {
            axis.x -= 1.0;
        }
        if self.is_held(InputAction::MoveUp) {
            axis.y += 1.0;
        }
        if self.is_held(InputAction::MoveDown) {
            axis.y -= 1.0;
        }
        axis
    }

    /// First select action pressed this frame, in shape order
    pub fn pressed_selection(&self) -> Option<ShapeVariant> {
        SELECT_ACTIONS
            .iter()
            .find(|a| self.is_just_pressed(**a))
            .and_then(|a| a.selected_shape())
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.clear_frame();
    }
}

/// Logical per-frame input handed to the active shape controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    pub move_axis: Vec2,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub ability_pressed: bool,
    pub ability_released: bool,
    pub ability_held: bool,
}

impl ControlInput {
    pub fn from_state(state: &InputState) -> Self {
        Self {
            move_axis: state.move_axis(),
            jump_pressed: state.is_just_pressed(InputAction::Jump),
            jump_released: state.is_just_released(InputAction::Jump),
            ability_pressed: state.is_just_pressed(InputAction::Ability),
            ability_released: state.is_just_released(InputAction::Ability),
            ability_held: state.is_held(InputAction::Ability),
        }
    }

    /// View while the shape selection is open: no movement or new presses,
    /// but releases still pass so held states can end cleanly.
    pub fn neutralised(self) -> Self {
        Self {
            jump_released: self.jump_released,
            ability_released: self.ability_released,
            ..Self::default()
        }
    }
}

/// Binding of a physical key to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(u32), // 0 = left, 1 = right, 2 = middle
}

/// Maps physical inputs to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    /// Key/button to action mappings
    bindings: HashMap<InputBinding, InputAction>,
    /// Reverse lookup: action to all bindings
    reverse: HashMap<InputAction, Vec<InputBinding>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        bindings.bind(KeyCode::KeyW, InputAction::MoveUp);
        bindings.bind(KeyCode::KeyS, InputAction::MoveDown);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);

        bindings.bind(KeyCode::ArrowUp, InputAction::MoveUp);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveDown);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::Space, InputAction::Jump);
        bindings.bind(KeyCode::ShiftLeft, InputAction::Ability);
        bindings.bind(KeyCode::KeyK, InputAction::Ability);
        bindings.bind(KeyCode::Escape, InputAction::Pause);

        // Shape selection
        bindings.bind(KeyCode::KeyQ, InputAction::SwitchModeStart);
        bindings.bind_mouse(1, InputAction::SwitchModeStart);
        bindings.bind_mouse(0, InputAction::SwitchModeEnd);
        bindings.bind(KeyCode::Digit1, InputAction::SelectCircle);
        bindings.bind(KeyCode::Digit2, InputAction::SelectStar);
        bindings.bind(KeyCode::Digit3, InputAction::SelectSquare);
        bindings.bind(KeyCode::Digit4, InputAction::SelectTriangle);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        let binding = InputBinding::Key(key);
        self.bindings.insert(binding, action);
        self.reverse.entry(action).or_default().push(binding);
    }

    /// Bind a mouse button to an action
    pub fn bind_mouse(&mut self, button: u32, action: InputAction) {
        let binding = InputBinding::Mouse(button);
        self.bindings.insert(binding, action);
        self.reverse.entry(action).or_default().push(binding);
    }

    /// Rebind a key, dropping whatever it did before
    pub fn rebind(&mut self, key: KeyCode, action: InputAction) {
        let binding = InputBinding::Key(key);
        if let Some(old) = self.bindings.get(&binding).copied() {
            if let Some(list) = self.reverse.get_mut(&old) {
                list.retain(|b| *b != binding);
            }
        }
        self.bind(key, action);
    }

    /// Get the action for a binding, if any
    pub fn get_action(&self, binding: &InputBinding) -> Option<InputAction> {
        self.bindings.get(binding).copied()
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.get_action(&InputBinding::Key(key))
    }

    /// All bindings for an action
    pub fn bindings_for(&self, action: InputAction) -> &[InputBinding] {
        self.reverse.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
    /// Mouse sensitivity multiplier
    pub mouse_sensitivity: f32,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self {
            state: InputState::new(),
            bindings: InputBindings::default(),
            mouse_sensitivity: 1.0,
        }
    }

    fn apply(&mut self, action: InputAction, element_state: ElementState) {
        match element_state {
            ElementState::Pressed => self.state.press(action),
            ElementState::Released => self.state.release(action),
        }
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            if let Some(action) = self.bindings.get_key_action(key_code) {
                self.apply(action, element_state);
            }
        }
    }

    /// Handle a mouse button event
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let button_id = match button {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(id) => id as u32,
        };

        if let Some(action) = self.bindings.get_action(&InputBinding::Mouse(button_id)) {
            self.apply(action, state);
        }
    }

    /// Handle mouse movement; screen Y grows downward, the selector wants up
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64)) {
        self.state.mouse_delta += Vec2::new(
            delta.0 as f32 * self.mouse_sensitivity,
            -(delta.1 as f32) * self.mouse_sensitivity,
        );
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }
}
