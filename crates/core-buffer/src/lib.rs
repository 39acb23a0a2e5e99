//! The editing engine: buffers, cursors and linked undo history.
//!
//! A [`Buffer`] is the single source of truth for text content and the sole
//! mutation path. Every change is recorded as an [`Action`] inside the
//! current [`ActionGroup`] (the undo unit) and broadcast as a
//! [`BufferEvent`] to every subscribed view, which rewrites its own cursor
//! and viewport from the action metadata.

mod action;
mod buffer;
mod cursor;
mod event;
mod history;

pub use action::{Action, ActionKind};
pub use buffer::{Buffer, ListenerId};
pub use cursor::Cursor;
pub use event::BufferEvent;
pub use history::GroupId;
