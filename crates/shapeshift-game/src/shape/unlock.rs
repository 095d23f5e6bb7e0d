//! Which shapes the player may currently turn into

use std::collections::BTreeSet;

use shapeshift_core::ShapeVariant;
use tracing::info;

/// Set of selectable shapes
///
/// Owned by the [`PlayerManager`](super::PlayerManager), which forces the
/// player out of a shape that becomes locked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnlockRegistry {
    unlocked: BTreeSet<ShapeVariant>,
}

impl UnlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shape unlocked
    pub fn all() -> Self {
        Self {
            unlocked: ShapeVariant::ALL.into_iter().collect(),
        }
    }

    pub fn is_unlocked(&self, shape: ShapeVariant) -> bool {
        self.unlocked.contains(&shape)
    }

    /// Unlock a shape; returns true if it was locked before
    pub fn unlock(&mut self, shape: ShapeVariant) -> bool {
        let added = self.unlocked.insert(shape);
        if added {
            info!(%shape, "Shape unlocked");
        }
        added
    }

    /// Lock a shape; returns true if it was unlocked before
    pub fn lock(&mut self, shape: ShapeVariant) -> bool {
        let removed = self.unlocked.remove(&shape);
        if removed {
            info!(%shape, "Shape locked");
        }
        removed
    }

    pub fn unlock_all(&mut self) {
        for shape in ShapeVariant::ALL {
            self.unlock(shape);
        }
    }

    pub fn lock_all(&mut self) {
        for shape in ShapeVariant::ALL {
            self.lock(shape);
        }
    }

    /// Lock everything except `shape`
    pub fn reset_to(&mut self, shape: ShapeVariant) {
        self.unlocked.clear();
        self.unlocked.insert(shape);
        info!(%shape, "Shape unlocks reset");
    }

    /// First unlocked shape in declaration order
    pub fn first_unlocked(&self) -> Option<ShapeVariant> {
        self.unlocked.iter().next().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ShapeVariant> + '_ {
        self.unlocked.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }
}
