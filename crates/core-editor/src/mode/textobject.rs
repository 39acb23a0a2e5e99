//! Text-object parsing after an operator key.
//!
//! Grammar: `[count] [i|a] object`. Word objects are wired up; the
//! remaining kinds parse but report themselves as unimplemented, matching
//! the operator's vocabulary as it stands.

use core_events::{KeyCode, KeyEvent};

use super::{Mode, enter_normal};
use crate::Editor;
use crate::command::Command;

pub struct TextObjectMode {
    outer_count: usize,
    count: String,
    inner: bool,
}

impl TextObjectMode {
    pub fn new(outer_count: usize) -> TextObjectMode {
        TextObjectMode {
            outer_count,
            count: String::new(),
            inner: false,
        }
    }

    pub fn on_key(mut self, e: &mut Editor, key: KeyEvent) -> Mode {
        if key.code == KeyCode::Esc || key.is_ctrl('c') {
            return enter_normal(e);
        }
        let KeyCode::Char(c) = key.code else {
            return enter_normal(e);
        };

        if c.is_ascii_digit() && (c != '0' || !self.count.is_empty()) {
            self.count.push(c);
            return Mode::TextObject(self);
        }
        if c == 'i' {
            self.inner = true;
            return Mode::TextObject(self);
        }
        if c == 'a' {
            self.inner = false;
            return Mode::TextObject(self);
        }

        let inner_count = self.count.parse::<usize>().unwrap_or(1).max(1);
        let count = self.outer_count * inner_count;
        match c {
            'w' => e.enqueue(Command::DeleteWordObject {
                count,
                inner: self.inner,
            }),
            'W' | 's' | 'p' | 'S' | '%' | 'b' | 'B' => {
                e.set_status("range conversion not implemented");
            }
            _ => e.set_status("bad text object"),
        }
        enter_normal(e)
    }
}
