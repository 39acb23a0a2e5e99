//! UI event schema and channel policy.
//!
//! The terminal poller thread normalizes raw terminal input into
//! [`UiEvent`]s and pushes them over a bounded channel; the main loop is
//! the single consumer. Capacities are deliberately small: the producer
//! blocking briefly under a paste storm is preferable to unbounded memory,
//! and the consume loop drains the queue before every redraw anyway.

use std::fmt;

/// Capacity of the ui-event channel fed by the input thread.
pub const UI_EVENT_CHANNEL_CAP: usize = 128;
/// Capacity of the command channel fed by modes and external agents.
pub const COMMAND_CHANNEL_CAP: usize = 64;
/// The redraw channel is a unit signal; one pending notification is enough.
pub const REDRAW_CHANNEL_CAP: usize = 1;

/// Events entering the editor's main loop.
#[derive(Debug, Clone)]
pub enum UiEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    /// Poller failure; terminates the main loop.
    Error(String),
}

/// Logical keys. Printable input arrives as `Char`; control chords arrive
/// as `Char` plus the CTRL modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Esc,
    Enter,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL  = 0b001;
        const ALT   = 0b010;
        const SHIFT = 0b100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: Modifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: Modifiers::empty(),
        }
    }

    pub fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    /// The printable rune this event carries, if it is an unmodified
    /// character key (Tab counts: it inserts).
    pub fn printable(&self) -> Option<char> {
        if self.mods.intersects(Modifiers::CTRL | Modifiers::ALT) {
            return None;
        }
        match self.code {
            KeyCode::Char(c) => Some(c),
            KeyCode::Tab => Some('\t'),
            _ => None,
        }
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.mods.contains(Modifiers::CTRL) && self.code == KeyCode::Char(c)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mods.contains(Modifiers::CTRL) {
            write!(f, "C-")?;
        }
        if self.mods.contains(Modifiers::ALT) {
            write!(f, "M-")?;
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{c}"),
            other => write!(f, "{other:?}"),
        }
    }
}
