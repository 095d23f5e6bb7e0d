//! Shape tags and a fixed map keyed by them

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four playable bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeVariant {
    Circle,
    Star,
    Square,
    Triangle,
}

impl ShapeVariant {
    /// Every variant in declaration order
    pub const ALL: [ShapeVariant; 4] = [
        ShapeVariant::Circle,
        ShapeVariant::Star,
        ShapeVariant::Square,
        ShapeVariant::Triangle,
    ];

    /// Stable index of this variant (declaration order)
    pub fn index(self) -> usize {
        match self {
            ShapeVariant::Circle => 0,
            ShapeVariant::Star => 1,
            ShapeVariant::Square => 2,
            ShapeVariant::Triangle => 3,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            ShapeVariant::Circle => "Circle",
            ShapeVariant::Star => "Star",
            ShapeVariant::Square => "Square",
            ShapeVariant::Triangle => "Triangle",
        }
    }
}

impl Default for ShapeVariant {
    fn default() -> Self {
        ShapeVariant::Circle
    }
}

impl fmt::Display for ShapeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised while building a [`ShapeMap`] from loose entries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeMapError {
    #[error("no entry for shape {0}")]
    Missing(ShapeVariant),

    #[error("more than one entry for shape {0}")]
    Duplicate(ShapeVariant),
}

/// Exactly one value per [`ShapeVariant`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMap<T> {
    slots: [T; 4],
}

impl<T> ShapeMap<T> {
    /// Build a map by calling `f` once per variant
    pub fn from_fn(mut f: impl FnMut(ShapeVariant) -> T) -> Self {
        Self {
            slots: ShapeVariant::ALL.map(&mut f),
        }
    }

    /// Build a map from `(variant, value)` pairs, requiring each variant exactly once
    pub fn try_from_entries(
        entries: impl IntoIterator<Item = (ShapeVariant, T)>,
    ) -> Result<Self, ShapeMapError> {
        let mut slots: [Option<T>; 4] = [None, None, None, None];
        for (variant, value) in entries {
            let slot = &mut slots[variant.index()];
            if slot.is_some() {
                return Err(ShapeMapError::Duplicate(variant));
            }
            *slot = Some(value);
        }

        let [a, b, c, d] = slots;
        Ok(Self {
            slots: [
                a.ok_or(ShapeMapError::Missing(ShapeVariant::Circle))?,
                b.ok_or(ShapeMapError::Missing(ShapeVariant::Star))?,
                c.ok_or(ShapeMapError::Missing(ShapeVariant::Square))?,
                d.ok_or(ShapeMapError::Missing(ShapeVariant::Triangle))?,
            ],
        })
    }

    pub fn get(&self, variant: ShapeVariant) -> &T {
        &self.slots[variant.index()]
    }

    pub fn get_mut(&mut self, variant: ShapeVariant) -> &mut T {
        &mut self.slots[variant.index()]
    }

    /// Iterate `(variant, value)` in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (ShapeVariant, &T)> {
        ShapeVariant::ALL.into_iter().zip(self.slots.iter())
    }

    /// Iterate `(variant, value)` mutably in declaration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ShapeVariant, &mut T)> {
        ShapeVariant::ALL.into_iter().zip(self.slots.iter_mut())
    }
}

impl<T: Default> Default for ShapeMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> std::ops::Index<ShapeVariant> for ShapeMap<T> {
    type Output = T;

    fn index(&self, variant: ShapeVariant) -> &T {
        self.get(variant)
    }
}

impl<T> std::ops::IndexMut<ShapeVariant> for ShapeMap<T> {
    fn index_mut(&mut self, variant: ShapeVariant) -> &mut T {
        self.get_mut(variant)
    }
}
