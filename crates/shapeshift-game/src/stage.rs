//! Stage list, shape rules per stage and the boundaries between stages

use glam::Vec2;
use serde::{Deserialize, Serialize};
use shapeshift_core::{Aabb, ShapeVariant};
use tracing::{debug, info, warn};

use crate::camera::CameraRig;
use crate::error::StageError;
use crate::events::{EventQueue, PlayerEvent};
use crate::shape::PlayerManager;

/// One stage of the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub name: String,
    /// Map bounds the camera is clamped to
    pub bounds: Aabb,
    /// Entering locks every shape except `initial_shape`
    #[serde(default)]
    pub shape_lock: bool,
    #[serde(default)]
    pub initial_shape: ShapeVariant,
    /// Entering unlocks every shape and enables the selection
    #[serde(default)]
    pub unlock_all: bool,
}

impl StageDef {
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
            shape_lock: false,
            initial_shape: ShapeVariant::default(),
            unlock_all: false,
        }
    }

    pub fn with_shape_lock(mut self, shape: ShapeVariant) -> Self {
        self.shape_lock = true;
        self.initial_shape = shape;
        self
    }

    pub fn with_unlock_all(mut self) -> Self {
        self.unlock_all = true;
        self
    }
}

/// Which exit side of a boundary counts as moving forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryDirection {
    /// Leaving to the right goes forward
    LeftAndRight,
    /// Leaving upward goes forward
    BottomToTop,
    /// Leaving downward goes forward
    TopToBottom,
}

/// Trigger area between two stages
///
/// `stage` names the stage ahead of the boundary; leaving backwards selects
/// the stage before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageBoundary {
    pub stage: String,
    pub area: Aabb,
    pub direction: BoundaryDirection,
}

impl StageBoundary {
    pub fn new(stage: impl Into<String>, area: Aabb, direction: BoundaryDirection) -> Self {
        Self {
            stage: stage.into(),
            area,
            direction,
        }
    }

    /// Whether leaving at `exit` moves forward
    pub fn goes_next(&self, exit: Vec2) -> bool {
        let center = self.area.center();
        match self.direction {
            BoundaryDirection::LeftAndRight => exit.x > center.x,
            BoundaryDirection::BottomToTop => exit.y > center.y,
            BoundaryDirection::TopToBottom => exit.y < center.y,
        }
    }
}

struct TrackedBoundary {
    boundary: StageBoundary,
    inside: bool,
}

/// Ordered stages and the current one
pub struct StageManager {
    stages: Vec<StageDef>,
    current: usize,
    boundaries: Vec<TrackedBoundary>,
}

impl StageManager {
    /// Validate the stage list; nothing is applied until [`StageManager::set_stage`]
    pub fn new(stages: Vec<StageDef>) -> Result<Self, StageError> {
        if stages.is_empty() {
            return Err(StageError::Empty);
        }
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].iter().any(|other| other.name == stage.name) {
                return Err(StageError::DuplicateName(stage.name.clone()));
            }
        }
        Ok(Self {
            stages,
            current: 0,
            boundaries: Vec::new(),
        })
    }

    pub fn stages(&self) -> &[StageDef] {
        &self.stages
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &StageDef {
        &self.stages[self.current]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    pub fn add_boundary(&mut self, boundary: StageBoundary) {
        self.boundaries.push(TrackedBoundary {
            boundary,
            inside: false,
        });
    }

    /// Enter a stage: camera bounds, shape rules, then the entry event
    pub fn set_stage(
        &mut self,
        index: usize,
        player: &mut PlayerManager,
        camera: &mut CameraRig,
        events: &mut EventQueue,
    ) -> Result<(), StageError> {
        let len = self.stages.len();
        let stage = self
            .stages
            .get(index)
            .ok_or(StageError::IndexOutOfRange { index, len })?;
        self.current = index;

        camera.set_bounds(stage.bounds);

        if stage.shape_lock {
            player.set_selection_enabled(false);
            player.initialize_unlocks(stage.initial_shape, events);
        } else if stage.unlock_all {
            player.unlock_all();
            player.set_selection_enabled(true);
        }

        info!(stage = %stage.name, index = index + 1, "Stage changed");
        events.push(PlayerEvent::StageEntered {
            name: stage.name.clone(),
        });
        Ok(())
    }

    /// Move to the named stage, or the one before it when going back
    pub fn request_stage_change(
        &mut self,
        name: &str,
        go_next: bool,
        player: &mut PlayerManager,
        camera: &mut CameraRig,
        events: &mut EventQueue,
    ) -> Result<(), StageError> {
        let base = self
            .index_of(name)
            .ok_or_else(|| StageError::UnknownStage(name.to_string()))?;
        let target = if go_next {
            base
        } else {
            base.checked_sub(1)
                .ok_or_else(|| StageError::NoPreviousStage(name.to_string()))?
        };
        self.set_stage(target, player, camera, events)
    }

    /// Fire a stage change for every boundary the player left since last frame
    ///
    /// A boundary that leads nowhere is logged and the current stage is kept.
    pub fn check_boundaries(
        &mut self,
        position: Vec2,
        player: &mut PlayerManager,
        camera: &mut CameraRig,
        events: &mut EventQueue,
    ) {
        let mut exits = Vec::new();
        for tracked in &mut self.boundaries {
            let inside = tracked.boundary.area.contains(position);
            if tracked.inside && !inside {
                let go_next = tracked.boundary.goes_next(position);
                debug!(stage = %tracked.boundary.stage, go_next, "Left stage boundary");
                exits.push((tracked.boundary.stage.clone(), go_next));
            }
            tracked.inside = inside;
        }
        for (stage, go_next) in exits {
            if let Err(e) = self.request_stage_change(&stage, go_next, player, camera, events) {
                warn!(error = %e, current = %self.current().name, "Ignoring stage boundary exit");
            }
        }
    }
}
