//! Visual selection, character- or line-wise.
//!
//! Motions move the cursor as in normal mode; after each motion the stored
//! selection is recomputed to span anchor..cursor in buffer order. `d`
//! deletes the effective range and drops back to normal mode.

use core_events::{KeyCode, KeyEvent};

use super::{Mode, enter_normal};
use crate::Editor;
use crate::command::{Command, Dir};
use core_buffer::Cursor;

pub struct VisualMode {
    anchor: Cursor,
    line_mode: bool,
    count: String,
}

impl VisualMode {
    pub fn enter(e: &mut Editor, line_mode: bool) -> Mode {
        let anchor = e.active_view().cursor();
        e.set_status(if line_mode { "Visual Line" } else { "Visual" });
        let mode = VisualMode {
            anchor,
            line_mode,
            count: String::new(),
        };
        e.apply_visual_selection(anchor, line_mode);
        Mode::Visual(mode)
    }

    pub fn anchor(&self) -> Cursor {
        self.anchor
    }

    pub fn line_mode(&self) -> bool {
        self.line_mode
    }

    pub fn on_key(mut self, e: &mut Editor, key: KeyEvent) -> Mode {
        if key.code == KeyCode::Esc || key.is_ctrl('c') {
            e.active_view_mut().set_selection(None);
            return enter_normal(e);
        }

        if let Some(c) = key.printable() {
            if c.is_ascii_digit() && (c != '0' || !self.count.is_empty()) {
                self.count.push(c);
                return Mode::Visual(self);
            }
        }
        let count = self.count.parse::<usize>().unwrap_or(1).max(1);
        self.count.clear();

        let KeyCode::Char(c) = key.code else {
            return Mode::Visual(self);
        };
        let motion = |cmd: Command| Command::Repeat {
            command: Box::new(cmd),
            count,
        };
        match c {
            'h' => e.enqueue(motion(Command::MoveRune {
                dir: Dir::Backward,
                wrap: false,
            })),
            'l' => e.enqueue(motion(Command::MoveRune {
                dir: Dir::Forward,
                wrap: false,
            })),
            'j' => e.enqueue(motion(Command::MoveLine { dir: Dir::Forward })),
            'k' => e.enqueue(motion(Command::MoveLine { dir: Dir::Backward })),
            'w' => e.enqueue(motion(Command::MoveWord { dir: Dir::Forward })),
            'b' => e.enqueue(motion(Command::MoveWord { dir: Dir::Backward })),
            'e' => e.enqueue(motion(Command::MoveWordEnd)),
            '0' => e.enqueue(Command::MoveBol),
            '$' => e.enqueue(Command::MoveEol),
            'd' => {
                let (from, to) = self.effective_range(e);
                e.active_view_mut().set_selection(None);
                e.enqueue(Command::DeleteRange { from, to });
                return enter_normal(e);
            }
            _ => return Mode::Visual(self),
        }
        // Extend the selection once the motion has been applied.
        e.enqueue(Command::SyncSelection);
        Mode::Visual(self)
    }

    /// The byte range `d` removes: inclusive of the rune under the far end
    /// in character mode, whole lines plus their terminators in line mode.
    fn effective_range(&self, e: &Editor) -> (Cursor, Cursor) {
        let buf = e.active_buffer();
        let arena = buf.arena();
        let cursor = e.active_view().cursor();
        let (a, mut b) = Cursor::sort(self.anchor, cursor);
        if self.line_mode {
            let mut from = a;
            from.move_bol();
            // eat the line terminator so the lines vanish entirely
            b.move_eol(arena);
            b.next_rune(arena, true);
            (from, b)
        } else {
            b.next_rune(arena, true);
            (a, b)
        }
    }
}
