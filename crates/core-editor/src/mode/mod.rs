//! Modal key dispatch.
//!
//! The mode set is closed, so it is a tagged sum rather than a trait
//! object. `on_key` consumes the mode and returns the next one; a mode that
//! transitions runs its own exit work at the return site, and constructors
//! carry the enter work (status text, selection setup).

mod command_line;
mod insert;
mod normal;
mod search;
mod textobject;
mod visual;
mod window;

pub use command_line::CommandLineMode;
pub use insert::InsertMode;
pub use normal::NormalMode;
pub use search::SearchMode;
pub use textobject::TextObjectMode;
pub use visual::VisualMode;
pub use window::WindowMode;

use crate::Editor;
use core_events::KeyEvent;

pub enum Mode {
    Normal(NormalMode),
    Insert(InsertMode),
    Command(CommandLineMode),
    Search(SearchMode),
    Visual(VisualMode),
    TextObject(TextObjectMode),
    Window(WindowMode),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Normal(NormalMode::default())
    }
}

/// Switch to normal mode, announcing it on the status line.
pub fn enter_normal(e: &mut Editor) -> Mode {
    e.set_status("Normal");
    Mode::Normal(NormalMode::default())
}

impl Mode {
    pub fn on_key(self, e: &mut Editor, key: KeyEvent) -> Mode {
        match self {
            Mode::Normal(m) => m.on_key(e, key),
            Mode::Insert(m) => m.on_key(e, key),
            Mode::Command(m) => m.on_key(e, key),
            Mode::Search(m) => m.on_key(e, key),
            Mode::Visual(m) => m.on_key(e, key),
            Mode::TextObject(m) => m.on_key(e, key),
            Mode::Window(m) => m.on_key(e, key),
        }
    }

    /// Text the mode wants drawn over the editor status line, when it acts
    /// as an overlay (`:`/`/` line editors).
    pub fn overlay_line(&self) -> Option<String> {
        match self {
            Mode::Command(m) => Some(m.overlay_line()),
            Mode::Search(m) => Some(m.overlay_line()),
            _ => None,
        }
    }

    /// Overlay cursor position given the surface size, when the mode owns
    /// the cursor.
    pub fn overlay_cursor(&self, height: usize) -> Option<(usize, usize)> {
        match self {
            Mode::Command(m) => Some(m.overlay_cursor(height)),
            Mode::Search(m) => Some(m.overlay_cursor(height)),
            _ => None,
        }
    }

    /// Anchor and shape of the active visual selection, if any.
    pub fn visual_state(&self) -> Option<(core_buffer::Cursor, bool)> {
        match self {
            Mode::Visual(m) => Some((m.anchor(), m.line_mode())),
            _ => None,
        }
    }
}
