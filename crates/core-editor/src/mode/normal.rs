//! Normal mode: count prefix plus one command dispatch.

use core_events::{KeyCode, KeyEvent, Modifiers};

use super::{
    CommandLineMode, InsertMode, Mode, SearchMode, TextObjectMode, VisualMode, WindowMode,
};
use crate::Editor;
use crate::command::{Command, Dir};

#[derive(Default)]
pub struct NormalMode {
    count: String,
}

impl NormalMode {
    pub fn on_key(mut self, e: &mut Editor, key: KeyEvent) -> Mode {
        // Consecutive digits accumulate into the count; zero only counts
        // when it is not the first character ('0' alone is a motion).
        if let Some(c) = key.printable() {
            if c.is_ascii_digit() && (c != '0' || !self.count.is_empty()) {
                self.count.push(c);
                let count = self.count.clone();
                e.set_status(count);
                return Mode::Normal(self);
            }
        }

        let has_count = !self.count.is_empty();
        let count = self.count.parse::<usize>().unwrap_or(1).max(1);
        self.count.clear();

        if key.mods.contains(Modifiers::CTRL) {
            if let KeyCode::Char(c) = key.code {
                match c {
                    'r' => repeat(e, Command::Redo, count),
                    'b' => e.enqueue(Command::MoveViewPage { dir: Dir::Backward }),
                    'f' => e.enqueue(Command::MoveViewPage { dir: Dir::Forward }),
                    'u' => e.enqueue(Command::MoveViewHalf { dir: Dir::Backward }),
                    'd' => e.enqueue(Command::MoveViewHalf { dir: Dir::Forward }),
                    'g' => e.enqueue(Command::FileStatus),
                    'a' => e.enqueue(Command::SearchWordUnderCursor),
                    'w' => return Mode::Window(WindowMode::new(e)),
                    _ => {}
                }
            }
            return Mode::Normal(self);
        }

        let KeyCode::Char(c) = key.code else {
            return Mode::Normal(self);
        };
        match c {
            'h' => repeat(
                e,
                Command::MoveRune {
                    dir: Dir::Backward,
                    wrap: false,
                },
                count,
            ),
            'l' => repeat(
                e,
                Command::MoveRune {
                    dir: Dir::Forward,
                    wrap: false,
                },
                count,
            ),
            'j' => repeat(e, Command::MoveLine { dir: Dir::Forward }, count),
            'k' => repeat(e, Command::MoveLine { dir: Dir::Backward }, count),
            'w' => repeat(e, Command::MoveWord { dir: Dir::Forward }, count),
            'b' => repeat(e, Command::MoveWord { dir: Dir::Backward }, count),
            'e' => repeat(e, Command::MoveWordEnd, count),
            '0' => e.enqueue(Command::MoveBol),
            '$' => e.enqueue(Command::MoveEol),
            '^' => e.enqueue(Command::MoveFirstNonSpace),
            'G' => {
                // counted G jumps to that line, bare G to the end
                if has_count {
                    e.enqueue(Command::MoveCursorToLine { line: count });
                } else {
                    e.enqueue(Command::MoveEof);
                }
            }
            'x' => repeat(e, Command::DeleteRune, count),
            'u' => repeat(e, Command::Undo, count),
            'n' => e.enqueue(Command::Search { dir: Dir::Forward }),
            'N' => e.enqueue(Command::Search { dir: Dir::Backward }),

            'i' => return InsertMode::enter(e, count),
            'a' => {
                e.enqueue(Command::MoveRune {
                    dir: Dir::Forward,
                    wrap: false,
                });
                return InsertMode::enter(e, count);
            }
            'A' => {
                e.enqueue(Command::MoveEol);
                return InsertMode::enter(e, count);
            }
            'I' => {
                e.enqueue(Command::MoveFirstNonSpace);
                return InsertMode::enter(e, count);
            }
            'o' => {
                e.enqueue(Command::MoveEol);
                e.enqueue(Command::InsertRune { rune: '\n' });
                return InsertMode::enter(e, count);
            }
            'O' => {
                e.enqueue(Command::MoveBol);
                e.enqueue(Command::InsertRune { rune: '\r' });
                e.enqueue(Command::MoveLine { dir: Dir::Backward });
                return InsertMode::enter(e, count);
            }

            'd' => return Mode::TextObject(TextObjectMode::new(count)),
            'v' => return VisualMode::enter(e, false),
            'V' => return VisualMode::enter(e, true),
            ':' => return Mode::Command(CommandLineMode::new(Mode::Normal(self))),
            '/' => return Mode::Search(SearchMode::new(Mode::Normal(self))),
            _ => {}
        }
        Mode::Normal(self)
    }
}

fn repeat(e: &mut Editor, command: Command, count: usize) {
    if count == 1 {
        e.enqueue(command);
    } else {
        e.enqueue(Command::Repeat {
            command: Box::new(command),
            count,
        });
    }
}
