//! Views and the split tree.
//!
//! A view is a window onto a buffer: it owns an off-screen cell buffer,
//! tracks the viewport and the cursor's three offsets, and repairs itself
//! from buffer events. The tree arranges views as a binary split hierarchy
//! sharing the terminal surface.

mod tree;
mod view;

pub use tree::{NodeId, ViewTree};
pub use view::{Damage, View, ViewOptions, ViewReaction, ViewTag};
