//! Window mode: one key of pane management after Ctrl-W.

use core_events::{KeyCode, KeyEvent};

use super::{Mode, enter_normal};
use crate::Editor;
use crate::command::{Command, Dir};

pub struct WindowMode;

impl WindowMode {
    pub fn new(e: &mut Editor) -> WindowMode {
        e.set_status("Window");
        WindowMode
    }

    pub fn on_key(self, e: &mut Editor, key: KeyEvent) -> Mode {
        if let KeyCode::Char(c) = key.code {
            match c {
                'h' => e.enqueue(Command::NearestVSplit { dir: Dir::Backward }),
                'l' => e.enqueue(Command::NearestVSplit { dir: Dir::Forward }),
                'j' => e.enqueue(Command::NearestHSplit { dir: Dir::Forward }),
                'k' => e.enqueue(Command::NearestHSplit { dir: Dir::Backward }),
                's' => e.enqueue(Command::SplitHorizontally),
                'v' => e.enqueue(Command::SplitVertically),
                'c' => e.enqueue(Command::KillActiveView),
                _ => {}
            }
        }
        enter_normal(e)
    }
}
