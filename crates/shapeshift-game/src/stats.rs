//! Play telemetry: global, per-stage and per-checkpoint counters
//!
//! Fed from the drained [`PlayerEvent`] queue once per frame. Play time
//! advances with unscaled time so slow motion does not distort it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shapeshift_core::ShapeVariant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::GameError;
use crate::events::{PlayerEvent, SwitchKind};

/// Per-shape counters within one scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeLogDetail {
    pub change_count: u32,
    pub play_time: f32,
    pub ability_use_count: u32,
    pub dead_count: u32,
}

/// Counters for one scope (a stage or a checkpoint segment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStats {
    pub dead_amount: u32,
    pub ability_use_amount: u32,
    pub shape_change_amount: u32,
    pub mode_switch_amount: u32,
    pub quick_switch_amount: u32,
    pub total_play_time: f32,
    pub shape_details: BTreeMap<ShapeVariant, ShapeLogDetail>,
}

impl Default for LogStats {
    fn default() -> Self {
        Self {
            dead_amount: 0,
            ability_use_amount: 0,
            shape_change_amount: 0,
            mode_switch_amount: 0,
            quick_switch_amount: 0,
            total_play_time: 0.0,
            shape_details: ShapeVariant::ALL
                .into_iter()
                .map(|shape| (shape, ShapeLogDetail::default()))
                .collect(),
        }
    }
}

impl LogStats {
    fn detail(&mut self, shape: ShapeVariant) -> &mut ShapeLogDetail {
        self.shape_details.entry(shape).or_default()
    }

    fn record_play_time(&mut self, shape: ShapeVariant, dt: f32) {
        self.total_play_time += dt;
        self.detail(shape).play_time += dt;
    }

    fn record_change(&mut self, to: ShapeVariant, kind: SwitchKind) {
        self.shape_change_amount += 1;
        match kind {
            SwitchKind::Quick => self.quick_switch_amount += 1,
            SwitchKind::Mode => self.mode_switch_amount += 1,
        }
        self.detail(to).change_count += 1;
    }

    fn record_death(&mut self, shape: ShapeVariant) {
        self.dead_amount += 1;
        self.detail(shape).dead_count += 1;
    }

    fn record_ability(&mut self, shape: ShapeVariant) {
        self.ability_use_amount += 1;
        self.detail(shape).ability_use_count += 1;
    }
}

/// Everything recorded for one stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageLogData {
    pub stage_name: String,
    pub stage_total: LogStats,
    pub checkpoints: BTreeMap<u32, LogStats>,
}

/// Session-wide per-shape totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeTotals {
    pub play_time: f32,
    pub change_count: u32,
    pub longest_stay: f32,
    pub ability_count: u32,
}

/// Play telemetry for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDataLog {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub current_shape: ShapeVariant,
    pub shape_change_amount: u32,
    pub dead_amount: u32,
    pub mode_switch_amount: u32,
    pub quick_switch_amount: u32,
    pub shapes: BTreeMap<ShapeVariant, ShapeTotals>,
    pub stages: BTreeMap<String, StageLogData>,
    current_stage: Option<String>,
    current_checkpoint: Option<u32>,
    /// Unscaled clock driving the stay timer
    clock: f32,
    shape_started_at: f32,
}

impl PlayerDataLog {
    /// Start logging with `initial` as the first shape
    pub fn start(initial: ShapeVariant) -> Self {
        let mut shapes: BTreeMap<ShapeVariant, ShapeTotals> = ShapeVariant::ALL
            .into_iter()
            .map(|shape| (shape, ShapeTotals::default()))
            .collect();
        if let Some(totals) = shapes.get_mut(&initial) {
            totals.change_count = 1;
        }
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            current_shape: initial,
            shape_change_amount: 0,
            dead_amount: 0,
            mode_switch_amount: 0,
            quick_switch_amount: 0,
            shapes,
            stages: BTreeMap::new(),
            current_stage: None,
            current_checkpoint: None,
            clock: 0.0,
            shape_started_at: 0.0,
        }
    }

    pub fn current_stage(&self) -> Option<&StageLogData> {
        self.current_stage.as_ref().and_then(|name| self.stages.get(name))
    }

    pub fn current_checkpoint(&self) -> Option<&LogStats> {
        let checkpoint = self.current_checkpoint?;
        self.current_stage()?.checkpoints.get(&checkpoint)
    }

    /// Apply `f` to the current stage total and the current checkpoint scope
    fn for_each_scope(&mut self, mut f: impl FnMut(&mut LogStats)) {
        let Some(stage) = self
            .current_stage
            .as_ref()
            .and_then(|name| self.stages.get_mut(name))
        else {
            return;
        };
        f(&mut stage.stage_total);
        if let Some(stats) = self
            .current_checkpoint
            .and_then(|id| stage.checkpoints.get_mut(&id))
        {
            f(stats);
        }
    }

    /// Advance play time by one frame of unscaled time
    pub fn tick(&mut self, unscaled_dt: f32) {
        self.clock += unscaled_dt;
        let shape = self.current_shape;
        if let Some(totals) = self.shapes.get_mut(&shape) {
            totals.play_time += unscaled_dt;
        }
        self.for_each_scope(|stats| stats.record_play_time(shape, unscaled_dt));
    }

    pub fn on_enter_stage(&mut self, name: &str) {
        self.stages
            .entry(name.to_string())
            .or_insert_with(|| StageLogData {
                stage_name: name.to_string(),
                ..StageLogData::default()
            });
        self.current_stage = Some(name.to_string());
        self.current_checkpoint = None;
        info!(stage = name, "Stage log started");
    }

    pub fn on_reach_checkpoint(&mut self, id: u32) {
        let Some(stage) = self
            .current_stage
            .as_ref()
            .and_then(|name| self.stages.get_mut(name))
        else {
            warn!(id, "Checkpoint reached with no stage set");
            return;
        };
        stage.checkpoints.entry(id).or_default();
        self.current_checkpoint = Some(id);
    }

    pub fn on_shape_change(&mut self, to: ShapeVariant, kind: SwitchKind) {
        if to == self.current_shape {
            return;
        }
        let stay = self.clock - self.shape_started_at;
        if let Some(totals) = self.shapes.get_mut(&self.current_shape) {
            totals.longest_stay = totals.longest_stay.max(stay);
        }
        self.current_shape = to;
        self.shape_started_at = self.clock;

        self.shape_change_amount += 1;
        match kind {
            SwitchKind::Quick => self.quick_switch_amount += 1,
            SwitchKind::Mode => self.mode_switch_amount += 1,
        }
        if let Some(totals) = self.shapes.get_mut(&to) {
            totals.change_count += 1;
        }
        self.for_each_scope(|stats| stats.record_change(to, kind));
    }

    pub fn on_death(&mut self) {
        self.dead_amount += 1;
        let shape = self.current_shape;
        self.for_each_scope(|stats| stats.record_death(shape));
    }

    pub fn on_ability_used(&mut self) {
        let shape = self.current_shape;
        if let Some(totals) = self.shapes.get_mut(&shape) {
            totals.ability_count += 1;
        }
        self.for_each_scope(|stats| stats.record_ability(shape));
    }

    /// Route one gameplay event to its counter
    pub fn record(&mut self, event: &PlayerEvent) {
        match event {
            PlayerEvent::AbilityUsed => self.on_ability_used(),
            PlayerEvent::ShapeChanged { to, kind, .. } => self.on_shape_change(*to, *kind),
            PlayerEvent::Died => self.on_death(),
            PlayerEvent::StageEntered { name } => self.on_enter_stage(name),
            PlayerEvent::CheckpointReached { id } => self.on_reach_checkpoint(*id),
            PlayerEvent::SwapRejected { .. }
            | PlayerEvent::Respawned { .. }
            | PlayerEvent::BreakRequested { .. } => {}
        }
    }

    /// Pretty-printed JSON report
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_counters() {
        let mut log = PlayerDataLog::start(ShapeVariant::Circle);
        log.on_ability_used(); // no stage yet: global only
        log.record(&PlayerEvent::StageEntered { name: "open".into() });
        log.record(&PlayerEvent::AbilityUsed);
        log.record(&PlayerEvent::CheckpointReached { id: 2 });
        log.record(&PlayerEvent::ShapeChanged {
            from: ShapeVariant::Circle,
            to: ShapeVariant::Square,
            kind: SwitchKind::Quick,
        });
        log.record(&PlayerEvent::Died);

        assert_eq!(log.shapes[&ShapeVariant::Circle].ability_count, 2);
        assert_eq!(log.quick_switch_amount, 1);

        let stage = log.current_stage().expect("stage set");
        assert_eq!(stage.stage_total.ability_use_amount, 1);
        assert_eq!(stage.stage_total.shape_change_amount, 1);
        assert_eq!(stage.stage_total.shape_details[&ShapeVariant::Square].dead_count, 1);

        let checkpoint = log.current_checkpoint().expect("checkpoint set");
        assert_eq!(checkpoint.ability_use_amount, 0);
        assert_eq!(checkpoint.quick_switch_amount, 1);
        assert_eq!(checkpoint.dead_amount, 1);
    }

    #[test]
    fn test_play_time_and_longest_stay() {
        let mut log = PlayerDataLog::start(ShapeVariant::Circle);
        log.on_enter_stage("open");
        for _ in 0..10 {
            log.tick(0.1);
        }
        log.on_shape_change(ShapeVariant::Star, SwitchKind::Mode);
        log.tick(0.5);
        log.on_shape_change(ShapeVariant::Circle, SwitchKind::Mode);

        assert!((log.shapes[&ShapeVariant::Circle].longest_stay - 1.0).abs() < 1e-4);
        assert!((log.shapes[&ShapeVariant::Star].longest_stay - 0.5).abs() < 1e-4);
        assert_eq!(log.shapes[&ShapeVariant::Circle].change_count, 2);

        let stage = log.current_stage().expect("stage set");
        assert!((stage.stage_total.total_play_time - 1.5).abs() < 1e-4);
        assert!((stage.stage_total.shape_details[&ShapeVariant::Star].play_time - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_same_shape_change_ignored() {
        let mut log = PlayerDataLog::start(ShapeVariant::Triangle);
        log.on_shape_change(ShapeVariant::Triangle, SwitchKind::Mode);
        assert_eq!(log.shape_change_amount, 0);
    }

    #[test]
    fn test_json_export() {
        let mut log = PlayerDataLog::start(ShapeVariant::Circle);
        log.on_enter_stage("open");
        let json = log.to_json().expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["stages"]["open"]["stage_name"], "open");
        assert_eq!(value["dead_amount"], 0);
    }
}
