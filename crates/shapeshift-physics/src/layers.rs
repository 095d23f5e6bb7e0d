//! Collision layers

use rapier2d::prelude::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

/// Bit set of collision layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Solid level geometry
    pub const GROUND: LayerMask = LayerMask(1 << 0);
    /// Platforms that break and that dashes pass through
    pub const BREAKABLE: LayerMask = LayerMask(1 << 1);
    /// Surfaces a rope may attach to
    pub const SWINGABLE: LayerMask = LayerMask(1 << 2);
    /// Hazards and anything that blocks a respawn point
    pub const HAZARD: LayerMask = LayerMask(1 << 3);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    pub fn without(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Groups for a collider that lives on these layers
    pub(crate) fn membership(self) -> InteractionGroups {
        InteractionGroups::new(Group::from_bits_truncate(self.0), Group::ALL)
    }

    /// Groups for a query that only sees these layers
    pub(crate) fn query_filter(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self.0))
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        self.union(rhs)
    }
}
