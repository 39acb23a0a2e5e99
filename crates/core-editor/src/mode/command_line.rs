//! `:` command line.
//!
//! An overlay mode: keystrokes accumulate into a line buffer drawn over
//! the editor status row, Enter parses and executes, Esc abandons. Either
//! way control returns to the mode that opened the line.

use core_events::{KeyCode, KeyEvent};

use super::Mode;
use crate::Editor;
use crate::command::exec_command_line;

pub struct CommandLineMode {
    prev: Box<Mode>,
    buffer: String,
}

impl CommandLineMode {
    pub fn new(prev: Mode) -> CommandLineMode {
        CommandLineMode {
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
                match exec_command_line(e, &self.buffer) {
                    Ok(()) => e.set_status(format!(":{}", self.buffer)),
                    Err(err) => e.set_status(format!("error: {err}")),
                }
                return *self.prev;
            }
            _ => {
                if let Some(c) = key.printable() {
                    self.buffer.push(c);
                }
            }
        }
        Mode::Command(self)
    }

    pub fn overlay_line(&self) -> String {
        format!(":{}", self.buffer)
    }

    pub fn overlay_cursor(&self, height: usize) -> (usize, usize) {
        (self.buffer.chars().count() + 1, height.saturating_sub(1))
    }
}
