//! Change notifications broadcast to views.

use crate::action::Action;

/// Emitted by the buffer on every mutation and history movement. Insert and
/// delete events carry the full action so listeners can rewrite their
/// cursors and viewports without touching the buffer.
#[derive(Debug, Clone)]
pub enum BufferEvent {
    Insert(Action),
    Delete(Action),
    Save,
    /// A motion or delete bumped into the beginning of the buffer.
    Bof,
    /// A motion or delete bumped into the end of the buffer.
    Eof,
    HistoryBack,
    HistoryForward,
    /// Undo requested with nothing left to undo.
    HistoryStart,
    /// Redo requested with nothing left to redo.
    HistoryEnd,
}
