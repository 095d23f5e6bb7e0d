//! Shape unlocks, selection and the transition coordinator

mod manager;
mod roster;
mod selector;
mod unlock;

pub use manager::{PendingSwap, PlayerManager};
pub use roster::{RosterConfig, ShapeController};
pub use selector::{classify_mouse, SelectorCommand, SelectorConfig, SelectorMode, ShapeSelector};
pub use unlock::UnlockRegistry;
