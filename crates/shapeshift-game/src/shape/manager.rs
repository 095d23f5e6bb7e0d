//! Shape switching: owns the four controllers and hands momentum between them

use glam::Vec2;
use shapeshift_core::{ShapeMap, ShapeVariant, TimeConfig, TimeScale};
use shapeshift_physics::{BodyMover, MoveOutcome, PhysicsQuery};
use tracing::{debug, info, warn};

use crate::events::{EventQueue, PlayerEvent, SwitchKind};
use crate::input::{ControlInput, InputState};
use crate::player::{PlayerController, VelocitySnapshot};

use super::roster::ShapeController;
use super::selector::{SelectorCommand, SelectorConfig, ShapeSelector};
use super::unlock::UnlockRegistry;

/// A swap requested during a frame, applied at the start of the next fixed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSwap {
    pub target: ShapeVariant,
    pub kind: SwitchKind,
}

/// Coordinates the active shape, the selection session and the time scale
///
/// Exactly one controller body is enabled at any time. The other three keep
/// their last velocity, charges and facing while suspended.
pub struct PlayerManager {
    roster: ShapeMap<ShapeController>,
    current: ShapeVariant,
    unlocks: UnlockRegistry,
    selector: ShapeSelector,
    time_scale: TimeScale,
    selection_enabled: bool,
    pending: Option<PendingSwap>,
    hidden: bool,
}

impl PlayerManager {
    /// Take ownership of a roster and activate `start` at `spawn`
    ///
    /// Only `start` is unlocked and selection starts disabled; stages open
    /// both up.
    pub fn new(
        mut roster: ShapeMap<ShapeController>,
        start: ShapeVariant,
        spawn: Vec2,
        selector: SelectorConfig,
        time: &TimeConfig,
    ) -> Self {
        for (_, controller) in roster.iter_mut() {
            controller.deactivate();
        }

        let active = roster.get_mut(start).as_controller_mut();
        active.body_mut().position = spawn;
        let dash_count = active.max_dash_count();
        active.on_enable_set_velocity(VelocitySnapshot {
            velocity: Vec2::ZERO,
            dash_count,
            facing_right: true,
        });

        let mut unlocks = UnlockRegistry::new();
        unlocks.unlock(start);

        info!(shape = %start, "Player manager ready");
        Self {
            roster,
            current: start,
            unlocks,
            selector: ShapeSelector::new(selector),
            time_scale: TimeScale::new(time),
            selection_enabled: false,
            pending: None,
            hidden: false,
        }
    }

    pub fn current(&self) -> ShapeVariant {
        self.current
    }

    /// The active controller
    pub fn active(&self) -> &ShapeController {
        self.roster.get(self.current)
    }

    pub fn controller(&self, shape: ShapeVariant) -> &ShapeController {
        self.roster.get(shape)
    }

    pub fn controller_mut(&mut self, shape: ShapeVariant) -> &mut ShapeController {
        self.roster.get_mut(shape)
    }

    pub fn controllers(&self) -> impl Iterator<Item = (ShapeVariant, &ShapeController)> {
        self.roster.iter()
    }

    /// Position of the active body
    pub fn position(&self) -> Vec2 {
        self.active().as_controller().body().position
    }

    pub fn velocity(&self) -> Vec2 {
        self.active().as_controller().body().velocity
    }

    pub fn unlocks(&self) -> &UnlockRegistry {
        &self.unlocks
    }

    pub fn selector(&self) -> &ShapeSelector {
        &self.selector
    }

    pub fn is_selecting(&self) -> bool {
        self.selector.is_open()
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    /// Forbid or allow slow-motion changes (scripted sequences)
    pub fn set_time_scale_locked(&mut self, locked: bool) {
        self.time_scale.set_can_change(!locked);
    }

    /// Snap the time scale back to 1.0 no matter what holds it
    pub fn restore_time_scale_immediate(&mut self) {
        self.time_scale.restore_immediate();
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    /// Allow the selection and quick switches; disabling closes an open session
    pub fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
        if !enabled && self.selector.cancel() {
            self.time_scale.release();
            debug!("Selection closed: no longer available");
        }
    }

    pub fn pending_swap(&self) -> Option<PendingSwap> {
        self.pending
    }

    /// True while dead and waiting for a respawn
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Frame update: time scale ramp, selection input, then the active
    /// controller's input and frame timers
    pub fn update<Q: PhysicsQuery + ?Sized>(
        &mut self,
        input: &InputState,
        unscaled_dt: f32,
        scaled_dt: f32,
        world: &Q,
        events: &mut EventQueue,
    ) {
        self.time_scale.tick(unscaled_dt);
        for (_, controller) in self.roster.iter_mut() {
            controller.update_cosmetics(scaled_dt);
        }
        if self.hidden {
            return;
        }

        match self
            .selector
            .process(input, self.current, self.selection_enabled)
        {
            Some(SelectorCommand::Opened) => {
                self.time_scale.slow();
                debug!(current = %self.current, "Selection opened");
            }
            Some(SelectorCommand::Confirmed(target)) => {
                self.time_scale.release();
                self.request_shape_change(target, SwitchKind::Mode);
            }
            Some(SelectorCommand::Cancelled) => {
                self.time_scale.release();
                debug!("Selection cancelled");
            }
            Some(SelectorCommand::QuickSwitch(target)) => {
                self.request_shape_change(target, SwitchKind::Quick);
            }
            None => {}
        }

        let mut control = ControlInput::from_state(input);
        if self.selector.is_open() {
            control = control.neutralised();
        }
        let active = self.roster.get_mut(self.current);
        active.handle_input(world, &control, events);
        active.frame_update(world, scaled_dt);
    }

    /// Fixed tick: pending swap, then sense, steer, integrate and move the
    /// active body
    pub fn fixed_update<W: PhysicsQuery + BodyMover + ?Sized>(
        &mut self,
        world: &mut W,
        dt: f32,
        events: &mut EventQueue,
    ) -> MoveOutcome {
        if let Some(pending) = self.pending.take() {
            self.swap(pending.target, pending.kind, events);
        }
        if self.hidden {
            return MoveOutcome::default();
        }

        let controller = self.roster.get_mut(self.current);
        controller.fixed_update(&*world, dt);

        let gravity = world.gravity();
        let body = controller.as_controller_mut().body_mut();
        body.integrate(gravity, dt);
        let outcome = world.move_body(body, dt);
        controller.after_move(&outcome);
        outcome
    }

    /// Queue a swap for the next fixed tick
    pub fn request_shape_change(&mut self, target: ShapeVariant, kind: SwitchKind) {
        self.pending = Some(PendingSwap { target, kind });
    }

    /// Swap now, bypassing the selection; the unlock check still applies
    pub fn force_to_change_shape(&mut self, target: ShapeVariant, events: &mut EventQueue) -> bool {
        self.time_scale.release();
        self.selector.cancel();
        self.pending = None;
        self.swap(target, SwitchKind::Mode, events)
    }

    /// Hand control from the current shape to `target`
    ///
    /// Returns false for a no-op (same shape) or a rejected (locked) swap.
    pub fn swap(&mut self, target: ShapeVariant, kind: SwitchKind, events: &mut EventQueue) -> bool {
        if target == self.current {
            debug!(shape = %target, "Already in this shape");
            return false;
        }
        if !self.unlocks.is_unlocked(target) {
            warn!(shape = %target, "Shape is locked; swap rejected");
            events.push(PlayerEvent::SwapRejected { requested: target });
            return false;
        }

        let from = self.current;
        let outgoing = self.roster.get_mut(from);
        let snapshot = outgoing.as_controller().snapshot();
        let position = outgoing.as_controller().body().position;
        outgoing.deactivate();

        let incoming = self.roster.get_mut(target).as_controller_mut();
        incoming.body_mut().position = position;
        incoming.on_enable_set_velocity(snapshot);
        self.current = target;

        info!(%from, to = %target, ?kind, "Shape changed");
        events.push(PlayerEvent::ShapeChanged {
            from,
            to: target,
            kind,
        });
        true
    }

    pub fn is_unlocked(&self, shape: ShapeVariant) -> bool {
        self.unlocks.is_unlocked(shape)
    }

    /// Lock everything but `shape` and switch into it
    pub fn initialize_unlocks(&mut self, shape: ShapeVariant, events: &mut EventQueue) {
        self.unlocks.reset_to(shape);
        self.force_to_change_shape(shape, events);
    }

    pub fn unlock(&mut self, shape: ShapeVariant) -> bool {
        self.unlocks.unlock(shape)
    }

    /// Lock a shape, leaving it if it is the current one
    pub fn lock(&mut self, shape: ShapeVariant, events: &mut EventQueue) -> bool {
        let removed = self.unlocks.lock(shape);
        if removed {
            self.leave_locked_shape(events);
        }
        removed
    }

    pub fn unlock_all(&mut self) {
        self.unlocks.unlock_all();
    }

    pub fn lock_all(&mut self, events: &mut EventQueue) {
        self.unlocks.lock_all();
        self.leave_locked_shape(events);
    }

    fn leave_locked_shape(&mut self, events: &mut EventQueue) {
        if self.unlocks.is_unlocked(self.current) {
            return;
        }
        match self.unlocks.first_unlocked() {
            Some(shape) => {
                self.force_to_change_shape(shape, events);
            }
            None => warn!(shape = %self.current, "No unlocked shape left; keeping the current one"),
        }
    }

    /// Death: close the selection without swapping, restore time at once and
    /// hold it there, and park the active body
    pub fn on_player_dead(&mut self) {
        if self.selector.cancel() {
            debug!("Selection cancelled by death");
        }
        self.pending = None;
        self.time_scale.restore_immediate();
        self.time_scale.set_can_change(false);
        self.hidden = true;

        let active = self.roster.get_mut(self.current);
        active.reset_transient();
        active.as_controller_mut().body_mut().reset_motion();
    }

    /// Put the active body back into play at `position`
    pub fn respawn_at(&mut self, position: Vec2) {
        self.hidden = false;
        self.time_scale.set_can_change(true);

        let active = self.roster.get_mut(self.current);
        active.reset_transient();
        let body = active.as_controller_mut().body_mut();
        body.position = position;
        body.reset_motion();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputAction;
    use crate::shape::RosterConfig;
    use crate::test_support::BoxWorld;
    use shapeshift_physics::BodyShape;

    const DT: f32 = 0.02;

    fn manager() -> PlayerManager {
        PlayerManager::new(
            RosterConfig::default().build().expect("complete roster"),
            ShapeVariant::Circle,
            Vec2::new(0.0, 0.5),
            SelectorConfig::default(),
            &TimeConfig::default(),
        )
    }

    fn pressed(actions: &[InputAction]) -> InputState {
        let mut state = InputState::new();
        for action in actions {
            state.press(*action);
        }
        state
    }

    fn enabled_bodies(manager: &PlayerManager) -> usize {
        manager
            .controllers()
            .filter(|(_, c)| c.as_controller().body().enabled)
            .count()
    }

    #[test]
    fn test_exactly_one_body_active_across_swaps() {
        let mut manager = manager();
        manager.unlock_all();
        let mut events = EventQueue::new();
        assert_eq!(enabled_bodies(&manager), 1);

        for shape in [
            ShapeVariant::Square,
            ShapeVariant::Triangle,
            ShapeVariant::Star,
            ShapeVariant::Circle,
        ] {
            assert!(manager.swap(shape, SwitchKind::Quick, &mut events));
            assert_eq!(enabled_bodies(&manager), 1);
            assert!(manager.active().as_controller().body().enabled);
        }
    }

    #[test]
    fn test_swap_hands_over_velocity_charges_and_facing() {
        let mut manager = manager();
        manager.unlock(ShapeVariant::Square);
        manager
            .controller_mut(ShapeVariant::Circle)
            .as_controller_mut()
            .on_enable_set_velocity(VelocitySnapshot {
                velocity: Vec2::new(3.0, -2.0),
                dash_count: 0,
                facing_right: false,
            });
        let before = manager
            .controller(ShapeVariant::Square)
            .as_controller()
            .activation_count();

        let mut events = EventQueue::new();
        assert!(manager.swap(ShapeVariant::Square, SwitchKind::Mode, &mut events));

        let square = manager.controller(ShapeVariant::Square).as_controller();
        assert_eq!(square.activation_count(), before + 1);
        assert_eq!(square.body().velocity, Vec2::new(3.0, -2.0));
        assert_eq!(square.dash_count(), 0);
        assert!(!square.facing_right());
        assert!(square.body().enabled);
        assert_eq!(square.body().position, Vec2::new(0.0, 0.5));
        assert!(!manager
            .controller(ShapeVariant::Circle)
            .as_controller()
            .body()
            .enabled);
        assert_eq!(manager.current(), ShapeVariant::Square);
        assert_eq!(
            events.drain(),
            vec![PlayerEvent::ShapeChanged {
                from: ShapeVariant::Circle,
                to: ShapeVariant::Square,
                kind: SwitchKind::Mode,
            }]
        );
    }

    #[test]
    fn test_locked_target_is_rejected() {
        let mut manager = manager();
        let mut events = EventQueue::new();

        assert!(!manager.swap(ShapeVariant::Triangle, SwitchKind::Quick, &mut events));
        assert_eq!(manager.current(), ShapeVariant::Circle);
        assert_eq!(
            events.drain(),
            vec![PlayerEvent::SwapRejected {
                requested: ShapeVariant::Triangle
            }]
        );
    }

    #[test]
    fn test_same_shape_is_a_no_op() {
        let mut manager = manager();
        let mut events = EventQueue::new();
        let before = manager.active().as_controller().activation_count();

        assert!(!manager.swap(ShapeVariant::Circle, SwitchKind::Mode, &mut events));
        assert!(events.is_empty());
        assert_eq!(manager.active().as_controller().activation_count(), before);
    }

    #[test]
    fn test_reselecting_square_keeps_dash_in_progress() {
        let mut world = BoxWorld::new();
        let mut manager = manager();
        manager.unlock_all();
        let mut events = EventQueue::new();
        assert!(manager.swap(ShapeVariant::Square, SwitchKind::Mode, &mut events));
        manager
            .controller_mut(ShapeVariant::Square)
            .as_controller_mut()
            .set_dash_count(1);
        let activations = manager.active().as_controller().activation_count();

        manager.update(&pressed(&[InputAction::Ability]), 0.016, 0.016, &world, &mut events);
        let square = manager.active().as_dash().expect("square dashes");
        assert!(square.is_dashing());
        let remaining = square.dash_time_remaining();
        events.drain();

        manager.set_selection_enabled(true);
        manager.update(&pressed(&[InputAction::SelectSquare]), 0.016, 0.0, &world, &mut events);
        manager.fixed_update(&mut world, DT, &mut events);
        assert!(!manager.swap(ShapeVariant::Square, SwitchKind::Mode, &mut events));

        let square = manager.active().as_dash().expect("square dashes");
        assert!(square.is_dashing());
        assert_eq!(square.dash_time_remaining(), remaining);
        assert!(matches!(square.body().shape, BodyShape::Circle { .. }));
        assert_eq!(manager.active().as_controller().activation_count(), activations);
        assert!(!events
            .iter()
            .any(|e| matches!(e, PlayerEvent::ShapeChanged { .. })));
    }

    #[test]
    fn test_locking_current_shape_forces_first_unlocked() {
        let mut manager = manager();
        manager.unlock(ShapeVariant::Triangle);
        manager.unlock(ShapeVariant::Square);
        let mut events = EventQueue::new();

        assert!(manager.lock(ShapeVariant::Circle, &mut events));
        assert_eq!(manager.current(), ShapeVariant::Square);

        // Nothing left to go to: stay put
        manager.lock_all(&mut events);
        assert_eq!(manager.current(), ShapeVariant::Square);
        assert!(manager.unlocks().is_empty());
    }

    #[test]
    fn test_initialize_unlocks_forces_shape() {
        let mut manager = manager();
        manager.unlock_all();
        let mut events = EventQueue::new();

        manager.initialize_unlocks(ShapeVariant::Triangle, &mut events);
        assert_eq!(manager.current(), ShapeVariant::Triangle);
        assert!(!manager.is_unlocked(ShapeVariant::Circle));
        assert_eq!(manager.unlocks().len(), 1);
    }

    #[test]
    fn test_selection_slows_and_confirm_restores_time() {
        let mut world = BoxWorld::new();
        world.add_floor(0.0);
        let mut manager = manager();
        manager.unlock_all();
        manager.set_selection_enabled(true);
        let mut events = EventQueue::new();

        let toggle = pressed(&[InputAction::SwitchModeStart]);
        manager.update(&toggle, 0.016, 0.016, &world, &mut events);
        assert!(manager.is_selecting());
        assert!(manager.time_scale().value() < 1.0);

        manager.update(&pressed(&[InputAction::SelectSquare]), 0.016, 0.0008, &world, &mut events);
        manager.update(&toggle, 0.016, 0.0008, &world, &mut events);
        assert!(!manager.is_selecting());
        assert_eq!(
            manager.pending_swap(),
            Some(PendingSwap {
                target: ShapeVariant::Square,
                kind: SwitchKind::Mode
            })
        );

        manager.fixed_update(&mut world, DT, &mut events);
        assert_eq!(manager.current(), ShapeVariant::Square);

        for _ in 0..60 {
            manager.update(&InputState::new(), 0.016, 0.016, &world, &mut events);
        }
        assert_eq!(manager.time_scale().value(), 1.0);
    }

    #[test]
    fn test_selection_unavailable_without_unlock_all() {
        let world = BoxWorld::new();
        let mut manager = manager();
        let mut events = EventQueue::new();

        manager.update(&pressed(&[InputAction::SwitchModeStart]), 0.016, 0.016, &world, &mut events);
        assert!(!manager.is_selecting());
        assert_eq!(manager.time_scale().value(), 1.0);

        manager.update(&pressed(&[InputAction::SelectSquare]), 0.016, 0.016, &world, &mut events);
        assert_eq!(manager.pending_swap(), None);
    }

    #[test]
    fn test_quick_switch_applies_on_next_fixed_tick() {
        let mut world = BoxWorld::new();
        world.add_floor(0.0);
        let mut manager = manager();
        manager.unlock_all();
        manager.set_selection_enabled(true);
        let mut events = EventQueue::new();

        manager.update(&pressed(&[InputAction::SelectTriangle]), 0.016, 0.016, &world, &mut events);
        assert_eq!(manager.current(), ShapeVariant::Circle);

        manager.fixed_update(&mut world, DT, &mut events);
        assert_eq!(manager.current(), ShapeVariant::Triangle);
        assert!(events.iter().any(|e| matches!(
            e,
            PlayerEvent::ShapeChanged {
                kind: SwitchKind::Quick,
                ..
            }
        )));
    }

    #[test]
    fn test_open_selection_neutralises_movement() {
        let mut world = BoxWorld::new();
        world.add_floor(0.0);
        let mut manager = manager();
        manager.unlock_all();
        manager.set_selection_enabled(true);
        let mut events = EventQueue::new();

        let mut input = pressed(&[InputAction::SwitchModeStart, InputAction::MoveRight]);
        manager.update(&input, 0.016, 0.016, &world, &mut events);
        input.clear_frame();
        for _ in 0..10 {
            manager.update(&input, 0.016, 0.0008, &world, &mut events);
            manager.fixed_update(&mut world, DT, &mut events);
        }
        assert_eq!(manager.velocity().x, 0.0);
    }

    #[test]
    fn test_death_cancels_selection_and_restores_time() {
        let mut world = BoxWorld::new();
        world.add_floor(0.0);
        let mut manager = manager();
        manager.unlock_all();
        manager.set_selection_enabled(true);
        let mut events = EventQueue::new();

        manager.update(&pressed(&[InputAction::SwitchModeStart]), 0.016, 0.016, &world, &mut events);
        manager.update(&pressed(&[InputAction::SelectSquare]), 0.016, 0.016, &world, &mut events);
        assert!(manager.time_scale().is_slowed());

        manager.on_player_dead();
        assert!(!manager.is_selecting());
        assert_eq!(manager.time_scale().value(), 1.0);
        assert_eq!(manager.current(), ShapeVariant::Circle);

        // Parked while dead
        let parked = manager.position();
        manager.fixed_update(&mut world, DT, &mut events);
        assert_eq!(manager.position(), parked);

        manager.respawn_at(Vec2::new(5.0, 0.5));
        assert!(!manager.is_hidden());
        assert_eq!(manager.position(), Vec2::new(5.0, 0.5));
        assert_eq!(manager.velocity(), Vec2::ZERO);
        assert!(manager.time_scale().can_change());
    }

    #[test]
    fn test_disabling_selection_closes_it() {
        let world = BoxWorld::new();
        let mut manager = manager();
        manager.unlock_all();
        manager.set_selection_enabled(true);
        let mut events = EventQueue::new();

        manager.update(&pressed(&[InputAction::SwitchModeStart]), 0.016, 0.016, &world, &mut events);
        assert!(manager.is_selecting());

        manager.set_selection_enabled(false);
        assert!(!manager.is_selecting());
        assert!(!manager.time_scale().is_slowed());
    }
}
