//! Insert mode.
//!
//! Enter inserts `'\r'` (newline without auto-indent), Ctrl-J `'\n'` (with
//! auto-indent). On exit the last recorded action is replayed count − 1
//! times, which is how `3iab<Esc>` comes out as `ababab`.

use core_events::{KeyCode, KeyEvent};

use super::{Mode, enter_normal};
use crate::Editor;
use crate::command::Command;

pub struct InsertMode {
    count: usize,
}

impl InsertMode {
    pub fn enter(e: &mut Editor, count: usize) -> Mode {
        e.set_status("Insert");
        Mode::Insert(InsertMode { count })
    }

    pub fn on_key(self, e: &mut Editor, key: KeyEvent) -> Mode {
        if key.code == KeyCode::Esc || key.is_ctrl('c') {
            self.exit(e);
            return enter_normal(e);
        }
        match key.code {
            KeyCode::Backspace => e.enqueue(Command::DeleteRuneBackward),
            KeyCode::Delete => e.enqueue(Command::DeleteRune),
            KeyCode::Enter => e.enqueue(Command::InsertRune { rune: '\r' }),
            _ if key.is_ctrl('j') => e.enqueue(Command::InsertRune { rune: '\n' }),
            _ => {
                if let Some(c) = key.printable() {
                    e.enqueue(Command::InsertRune { rune: c });
                }
            }
        }
        Mode::Insert(self)
    }

    fn exit(self, e: &mut Editor) {
        e.replay_last_action(self.count.saturating_sub(1));
        e.finalize_active();
    }
}
