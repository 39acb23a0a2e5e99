//! `/` search line.
//!
//! Enter stores the first whitespace-separated token as the editor's last
//! search term, installs it as the active view's highlight bytes and kicks
//! off a forward search.

use core_events::{KeyCode, KeyEvent};

use super::Mode;
use crate::Editor;
use crate::command::{Command, Dir};

pub struct SearchMode {
    prev: Box<Mode>,
    buffer: String,
}

impl SearchMode {
    pub fn new(prev: Mode) -> SearchMode {
        SearchMode {
            prev: Box::new(prev),
            buffer: String::new(),
        }
    }

    pub fn on_key(mut self, e: &mut Editor, key: KeyEvent) -> Mode {
        if key.code == KeyCode::Esc || key.is_ctrl('c') {
            return *self.prev;
        }
        match key.code {
            KeyCode::Backspace => {
                self.buffer.pop();
            }
            KeyCode::Enter => {
                if let Some(term) = self.buffer.split_whitespace().next() {
                    e.last_search = Some(term.to_string());
                    let bytes = term.as_bytes().to_vec();
                    e.active_view_mut().set_highlight(Some(bytes));
                    e.enqueue(Command::Search { dir: Dir::Forward });
                    e.set_status(format!("/{}", self.buffer));
                }
                return *self.prev;
            }
            _ => {
                if let Some(c) = key.printable() {
                    self.buffer.push(c);
                }
            }
        }
        Mode::Search(self)
    }

    pub fn overlay_line(&self) -> String {
        format!("/{}", self.buffer)
    }

    pub fn overlay_cursor(&self, height: usize) -> (usize, usize) {
        (self.buffer.chars().count() + 1, height.saturating_sub(1))
    }
}
