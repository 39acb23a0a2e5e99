//! The command set.
//!
//! A command is one editor operation; modes translate key events into
//! commands and the editor applies them synchronously. `Repeat` composes a
//! command with a count so normal mode never loops over keys itself.

use std::path::PathBuf;

use core_buffer::Cursor;
use core_text::rune;
use thiserror::Error;
use tracing::debug;

use crate::Editor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Forward,
    Backward,
}

/// Grouping used to decide when the open undo group is finalized: a run of
/// commands of one class forms one undo unit, and any class change (or a
/// misc command) closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    Movement,
    Edit,
    History,
    Misc,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownVerb(String),
    #[error("too many arguments for :{0}")]
    TooManyArguments(&'static str),
    #[error("argument required for :{0}")]
    MissingArgument(&'static str),
}

#[derive(Debug, Clone)]
pub enum Command {
    Repeat { command: Box<Command>, count: usize },

    MoveRune { dir: Dir, wrap: bool },
    MoveLine { dir: Dir },
    MoveWord { dir: Dir },
    MoveWordEnd,
    MoveBol,
    MoveEol,
    MoveFirstNonSpace,
    MoveEof,
    MoveViewHalf { dir: Dir },
    MoveViewPage { dir: Dir },
    MoveCursorToLine { line: usize },

    InsertRune { rune: char },
    DeleteRune,
    DeleteRuneBackward,
    DeleteRange { from: Cursor, to: Cursor },
    DeleteWordObject { count: usize, inner: bool },

    Undo,
    Redo,

    Search { dir: Dir },
    SearchWordUnderCursor,
    SetHighlight { on: bool },
    /// Recompute the visual selection from the mode's anchor after a motion.
    SyncSelection,

    SaveBuffer { path: Option<PathBuf> },
    OpenFile { path: String },
    FileStatus,

    SplitHorizontally,
    SplitVertically,
    KillActiveView,
    NearestVSplit { dir: Dir },
    NearestHSplit { dir: Dir },

    Quit,
}

impl Command {
    pub fn class(&self) -> CommandClass {
        match self {
            Command::Repeat { command, .. } => command.class(),
            Command::MoveRune { .. }
            | Command::MoveLine { .. }
            | Command::MoveWord { .. }
            | Command::MoveWordEnd
            | Command::MoveBol
            | Command::MoveEol
            | Command::MoveFirstNonSpace
            | Command::MoveEof
            | Command::MoveViewHalf { .. }
            | Command::MoveViewPage { .. }
            | Command::MoveCursorToLine { .. }
            | Command::Search { .. }
            | Command::SearchWordUnderCursor => CommandClass::Movement,
            Command::InsertRune { .. }
            | Command::DeleteRune
            | Command::DeleteRuneBackward
            | Command::DeleteRange { .. }
            | Command::DeleteWordObject { .. } => CommandClass::Edit,
            Command::Undo | Command::Redo => CommandClass::History,
            _ => CommandClass::Misc,
        }
    }

    /// Whether applying this command leaves the active view's cursor
    /// already positioned, making the event-driven cursor rewrite
    /// redundant for that view.
    pub fn positions_cursor(&self) -> bool {
        match self {
            Command::Repeat { command, .. } => command.positions_cursor(),
            Command::InsertRune { .. }
            | Command::DeleteRune
            | Command::DeleteRuneBackward
            | Command::DeleteRange { .. }
            | Command::DeleteWordObject { .. } => true,
            _ => false,
        }
    }

    pub fn apply(self, e: &mut Editor) {
        match self {
            Command::Repeat { command, count } => {
                for _ in 0..count {
                    command.clone().apply(e);
                }
            }

            Command::MoveRune { dir, wrap } => {
                let (view, buf) = e.view_and_buffer();
                let mut c = view.cursor();
                let (moved, msg) = match dir {
                    Dir::Forward => (c.next_rune(buf.arena(), wrap), "End of line"),
                    Dir::Backward => (c.prev_rune(buf.arena(), wrap), "Beginning of line"),
                };
                if moved {
                    view.move_cursor_to(buf, c);
                } else {
                    e.set_status(msg);
                }
            }
            Command::MoveLine { dir } => {
                let (view, buf) = e.view_and_buffer();
                let (moved, msg) = match dir {
                    Dir::Forward => (view.move_cursor_next_line(buf), "End of file"),
                    Dir::Backward => (view.move_cursor_prev_line(buf), "Beginning of file"),
                };
                if !moved {
                    e.set_status(msg);
                }
            }
            Command::MoveWord { dir } => {
                let (view, buf) = e.view_and_buffer();
                let mut c = view.cursor();
                let (moved, msg) = match dir {
                    Dir::Forward => (c.next_word(buf.arena()), "End of file"),
                    Dir::Backward => (c.prev_word(buf.arena()), "Beginning of file"),
                };
                if moved {
                    view.move_cursor_to(buf, c);
                } else {
                    e.set_status(msg);
                }
            }
            Command::MoveWordEnd => {
                let (view, buf) = e.view_and_buffer();
                let mut c = view.cursor();
                if c.end_word(buf.arena()) {
                    view.move_cursor_to(buf, c);
                } else {
                    e.set_status("End of buffer");
                }
            }
            Command::MoveBol => {
                let (view, buf) = e.view_and_buffer();
                let mut c = view.cursor();
                c.move_bol();
                view.move_cursor_to(buf, c);
            }
            Command::MoveEol => {
                let (view, buf) = e.view_and_buffer();
                let mut c = view.cursor();
                c.move_eol(buf.arena());
                view.move_cursor_to(buf, c);
            }
            Command::MoveFirstNonSpace => {
                let (view, buf) = e.view_and_buffer();
                let mut c = view.cursor();
                c.boffset = rune::first_non_space(&buf.arena()[c.line].data);
                view.move_cursor_to(buf, c);
            }
            Command::MoveEof => {
                let (view, buf) = e.view_and_buffer();
                view.move_cursor_eof(buf);
            }
            Command::MoveViewHalf { dir } => {
                let (view, buf) = e.view_and_buffer();
                let half = (view.height() / 2) as isize;
                match dir {
                    Dir::Forward => view.maybe_move_view_lines(buf, half),
                    Dir::Backward => view.move_view_lines(buf, -half),
                }
            }
            Command::MoveViewPage { dir } => {
                let (view, buf) = e.view_and_buffer();
                let page = view.height() as isize;
                match dir {
                    Dir::Forward => view.maybe_move_view_lines(buf, page),
                    Dir::Backward => view.move_view_lines(buf, -page),
                }
            }
            Command::MoveCursorToLine { line } => {
                let (view, buf) = e.view_and_buffer();
                view.move_cursor_to_line(buf, line);
            }

            Command::InsertRune { rune } => {
                let (view, buf) = e.view_and_buffer_mut();
                let c = buf.insert_rune(view.cursor(), rune);
                view.move_cursor_to(buf, c);
            }
            Command::DeleteRune => {
                let (view, buf) = e.view_and_buffer_mut();
                let c = buf.delete_rune(view.cursor());
                view.move_cursor_to(buf, c);
            }
            Command::DeleteRuneBackward => {
                let (view, buf) = e.view_and_buffer_mut();
                let c = buf.delete_rune_backward(view.cursor());
                view.move_cursor_to(buf, c);
            }
            Command::DeleteRange { from, to } => {
                e.delete_range(from, to);
            }
            Command::DeleteWordObject { count, inner } => {
                for _ in 0..count {
                    let (view, buf) = e.view_and_buffer();
                    let arena = buf.arena();
                    let from = view.cursor();
                    let mut to = from;
                    let moved = if inner {
                        // inner word: only the class run under the cursor
                        match to.rune_under(arena) {
                            Some((r0, _)) => {
                                let class = word_class(r0);
                                while let Some((r, rlen)) = to.rune_under(arena) {
                                    if word_class(r) != class {
                                        break;
                                    }
                                    to.boffset += rlen;
                                }
                                true
                            }
                            None => false,
                        }
                    } else {
                        to.next_word(arena)
                    };
                    if !moved {
                        e.set_status("End of buffer");
                        break;
                    }
                    e.delete_range(from, to);
                }
            }

            Command::Undo => e.active_buffer_mut().undo(),
            Command::Redo => e.active_buffer_mut().redo(),

            Command::Search { dir } => search(e, dir),
            Command::SearchWordUnderCursor => {
                let (view, buf) = e.view_and_buffer();
                let Some(word) = view.cursor().word_under(buf.arena()) else {
                    e.set_status("No word under cursor");
                    return;
                };
                let term = String::from_utf8_lossy(&word).into_owned();
                e.last_search = Some(term);
                let bytes = word.clone();
                e.active_view_mut().set_highlight(Some(bytes));
                search(e, Dir::Forward);
            }
            Command::SetHighlight { on } => {
                let bytes = if on {
                    e.last_search.as_ref().map(|s| s.as_bytes().to_vec())
                } else {
                    None
                };
                e.active_view_mut().set_highlight(bytes);
            }
            Command::SyncSelection => e.sync_visual_selection(),

            Command::SaveBuffer { path } => e.save_active(path),
            Command::OpenFile { path } => {
                if let Err(err) = e.open_file(&path) {
                    e.set_status(err.to_string());
                }
            }
            Command::FileStatus => {
                let (view, buf) = e.view_and_buffer();
                let name = match &buf.path {
                    Some(p) => p.display().to_string(),
                    None => buf.name.clone(),
                };
                let lines = buf.num_lines();
                let pc = view.cursor().line_num * 100 / lines.max(1);
                e.set_status(format!("\"{name}\" {lines} lines --{pc}%--"));
            }

            Command::SplitHorizontally => e.split_horizontally(),
            Command::SplitVertically => e.split_vertically(),
            Command::KillActiveView => e.kill_active_view(),
            Command::NearestVSplit { dir } => {
                let d = if dir == Dir::Forward { 1 } else { -1 };
                e.activate_nearest_v_split(d);
            }
            Command::NearestHSplit { dir } => {
                let d = if dir == Dir::Forward { 1 } else { -1 };
                e.activate_nearest_h_split(d);
            }

            Command::Quit => e.request_quit(),
        }
    }
}

/// 0 = whitespace, 1 = word runes, 2 = other punctuation. The `w`-family
/// motions treat each as its own run.
fn word_class(r: char) -> u8 {
    if r.is_whitespace() {
        0
    } else if rune::is_word(r) {
        1
    } else {
        2
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Jump to the next or previous occurrence of the stored search term.
fn search(e: &mut Editor, dir: Dir) {
    let Some(term) = e.last_search.clone() else {
        e.set_status("Nothing to search for.");
        return;
    };
    debug!(target: "editor.search", term = %term, forward = (dir == Dir::Forward), "search");
    let word = term.as_bytes().to_vec();
    let (view, buf) = e.view_and_buffer();
    let arena = buf.arena();
    let mut c = view.cursor();
    match dir {
        Dir::Forward => {
            // Step off the current position so a match under the cursor
            // does not pin the search in place.
            c.next_rune(arena, false);
            loop {
                if let Some(i) = find(&arena[c.line].data[c.boffset..], &word) {
                    c.boffset += i;
                    break;
                }
                match arena[c.line].next {
                    Some(next) => {
                        c.line = next;
                        c.line_num += 1;
                        c.boffset = 0;
                    }
                    None => {
                        e.set_status("No more results");
                        return;
                    }
                }
            }
            view.move_cursor_to(buf, c);
            e.set_status(format!("Search forward for: {term}"));
        }
        Dir::Backward => {
            loop {
                if let Some(i) = rfind(&arena[c.line].data[..c.boffset], &word) {
                    c.boffset = i;
                    break;
                }
                match arena[c.line].prev {
                    Some(prev) => {
                        c.line = prev;
                        c.line_num -= 1;
                        c.boffset = arena[prev].data.len();
                    }
                    None => {
                        e.set_status("No previous results");
                        return;
                    }
                }
            }
            view.move_cursor_to(buf, c);
            e.set_status(format!("Search backward for: {term}"));
        }
    }
}

/// Parse a `:` command line into commands or a diagnostic.
pub fn exec_command_line(e: &mut Editor, input: &str) -> Result<(), CommandError> {
    let mut fields = input.split_whitespace();
    let Some(verb) = fields.next() else {
        return Ok(());
    };
    let args: Vec<&str> = fields.collect();
    match verb {
        "q" => e.enqueue(Command::Quit),
        "w" => match args.len() {
            0 => e.enqueue(Command::SaveBuffer { path: None }),
            1 => e.enqueue(Command::SaveBuffer {
                path: Some(PathBuf::from(args[0])),
            }),
            _ => return Err(CommandError::TooManyArguments("w")),
        },
        "e" => match args.len() {
            1 => e.enqueue(Command::OpenFile {
                path: args[0].to_string(),
            }),
            0 => return Err(CommandError::MissingArgument("e")),
            _ => return Err(CommandError::TooManyArguments("e")),
        },
        "sp" | "split" => e.enqueue(Command::SplitHorizontally),
        "vsp" | "vsplit" => e.enqueue(Command::SplitVertically),
        "hls" => e.enqueue(Command::SetHighlight { on: true }),
        "nohls" => e.enqueue(Command::SetHighlight { on: false }),
        _ => match verb.parse::<usize>() {
            Ok(line) => e.enqueue(Command::MoveCursorToLine { line }),
            Err(_) => return Err(CommandError::UnknownVerb(verb.to_string())),
        },
    }
    Ok(())
}
