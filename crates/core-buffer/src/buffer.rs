//! Buffer: the line chain, its history, and the event fan-out.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};

use tracing::{debug, trace};

use crate::action::{Action, ActionKind};
use crate::cursor::Cursor;
use crate::event::BufferEvent;
use crate::history::History;
use core_text::{LineArena, LineId, rune};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    tx: Sender<BufferEvent>,
}

pub struct Buffer {
    arena: LineArena,
    first: LineId,
    last: LineId,
    num_lines: usize,
    /// Content bytes, newlines not counted.
    num_bytes: usize,
    history: History,

    /// Absolute path of the file; `None` while the buffer has no on-disk
    /// representation.
    pub path: Option<PathBuf>,
    /// Display name, unique within the editor (uniqueness is maintained by
    /// the editor, not here).
    pub name: String,

    listeners: Vec<Listener>,
    next_listener: u64,
}

impl Buffer {
    pub fn new_empty() -> Buffer {
        let mut arena = LineArena::new();
        let line = arena.alloc(Vec::new());
        Buffer {
            arena,
            first: line,
            last: line,
            num_lines: 1,
            num_bytes: 0,
            history: History::new(),
            path: None,
            name: String::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Read newline-separated lines, stripping the terminator from each
    /// stored line. A trailing empty line is kept iff the input ended with
    /// a newline.
    pub fn from_reader<R: BufRead>(mut r: R) -> io::Result<Buffer> {
        let mut lines: Vec<Vec<u8>> = Vec::new();
        let mut ended_with_newline = true;
        loop {
            let mut data = Vec::new();
            if r.read_until(b'\n', &mut data)? == 0 {
                break;
            }
            ended_with_newline = data.last() == Some(&b'\n');
            if ended_with_newline {
                data.pop();
            }
            lines.push(data);
        }
        if ended_with_newline {
            lines.push(Vec::new());
        }

        let mut arena = LineArena::new();
        let num_bytes = lines.iter().map(Vec::len).sum();
        let ids: Vec<LineId> = lines.into_iter().map(|data| arena.alloc(data)).collect();
        for w in ids.windows(2) {
            arena[w[0]].next = Some(w[1]);
            arena[w[1]].prev = Some(w[0]);
        }
        Ok(Buffer {
            first: ids[0],
            last: ids[ids.len() - 1],
            num_lines: ids.len(),
            num_bytes,
            arena,
            history: History::new(),
            path: None,
            name: String::new(),
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    pub fn arena(&self) -> &LineArena {
        &self.arena
    }

    pub fn first_line(&self) -> LineId {
        self.first
    }

    pub fn last_line(&self) -> LineId {
        self.last
    }

    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    pub fn num_bytes(&self) -> usize {
        self.num_bytes
    }

    /// Cursor at the start of the buffer.
    pub fn start(&self) -> Cursor {
        Cursor::new(self.first, 1, 0)
    }

    /// Cursor at the very end of the buffer.
    pub fn end(&self) -> Cursor {
        Cursor::new(self.last, self.num_lines, self.arena[self.last].data.len())
    }

    // ------------------------------------------------------------------
    // listeners
    // ------------------------------------------------------------------

    pub fn add_listener(&mut self) -> (ListenerId, Receiver<BufferEvent>) {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        let (tx, rx) = channel();
        self.listeners.push(Listener { id, tx });
        (id, rx)
    }

    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|l| l.id != id);
    }

    fn emit(&self, event: BufferEvent) {
        for l in &self.listeners {
            // A dropped receiver just means the view detached mid-flight.
            let _ = l.tx.send(event.clone());
        }
    }

    // ------------------------------------------------------------------
    // chain plumbing
    // ------------------------------------------------------------------

    fn link_after(&mut self, id: LineId, after: LineId) {
        let next = self.arena[after].next;
        self.arena[id].prev = Some(after);
        self.arena[id].next = next;
        self.arena[after].next = Some(id);
        match next {
            Some(n) => self.arena[n].prev = Some(id),
            None => self.last = id,
        }
        self.num_lines += 1;
    }

    fn unlink(&mut self, id: LineId) {
        let prev = self.arena[id].prev;
        let next = self.arena[id].next;
        match prev {
            Some(p) => self.arena[p].next = next,
            None => {
                if let Some(n) = next {
                    self.first = n;
                }
            }
        }
        match next {
            Some(n) => self.arena[n].prev = prev,
            None => {
                if let Some(p) = prev {
                    self.last = p;
                }
            }
        }
        self.arena[id].prev = None;
        self.arena[id].next = None;
        self.num_lines -= 1;
    }

    // ------------------------------------------------------------------
    // action application
    // ------------------------------------------------------------------

    fn apply_insert(&mut self, a: &Action) {
        let mut tail: Option<Vec<u8>> = None;
        let mut nline = 0;
        let mut offset = a.cursor.boffset;
        let mut line = a.cursor.line;
        for chunk in rune::chunks(&a.data) {
            if chunk[0] == b'\n' {
                if offset < self.arena[line].data.len() {
                    // splitting mid-line: the remainder moves to the last
                    // inserted line once the payload is in place
                    tail = Some(self.arena[line].data.split_off(offset));
                }
                self.link_after(a.lines[nline], line);
                line = a.lines[nline];
                nline += 1;
                offset = 0;
            } else {
                self.num_bytes += chunk.len();
                self.arena[line]
                    .data
                    .splice(offset..offset, chunk.iter().copied());
                offset += chunk.len();
            }
        }
        if let Some(tail) = tail {
            self.arena[line].data.extend_from_slice(&tail);
        }
        self.emit(BufferEvent::Insert(a.clone()));
    }

    fn apply_delete(&mut self, a: &Action) {
        let mut nline = 0;
        let offset = a.cursor.boffset;
        let line = a.cursor.line;
        for chunk in rune::chunks(&a.data) {
            if chunk[0] == b'\n' {
                // The detached line must end up empty: a later re-splice
                // (revert, redo) writes its contents back from the payload.
                let merged = std::mem::take(&mut self.arena[a.lines[nline]].data);
                self.arena[line].data.extend_from_slice(&merged);
                self.unlink(a.lines[nline]);
                nline += 1;
            } else {
                self.num_bytes -= chunk.len();
                self.arena[line].data.drain(offset..offset + chunk.len());
            }
        }
        self.emit(BufferEvent::Delete(a.clone()));
    }

    fn apply_action(&mut self, a: &Action, kind: ActionKind) {
        match kind {
            ActionKind::Insert => self.apply_insert(a),
            ActionKind::Delete => self.apply_delete(a),
        }
    }

    // ------------------------------------------------------------------
    // mutation entry points
    // ------------------------------------------------------------------

    /// Insert `data` at `c`, recording the action in the open group.
    pub fn insert(&mut self, c: Cursor, data: Vec<u8>) {
        if data.is_empty() {
            return;
        }
        self.history.begin_edit(&mut self.arena);
        let a = Action::new_insert(&mut self.arena, c, data);
        self.apply_insert(&a);
        self.history.append(a);
    }

    /// Delete `nbytes` at `c`, recording the action in the open group.
    pub fn delete(&mut self, c: Cursor, nbytes: usize) {
        if nbytes == 0 {
            return;
        }
        self.history.begin_edit(&mut self.arena);
        let a = Action::new_delete(&self.arena, c, nbytes);
        self.apply_delete(&a);
        self.history.append(a);
    }

    /// Insert one rune, returning the cursor position after it. `'\n'`
    /// breaks the line and copies the leading whitespace of the former line
    /// as indent; `'\r'` breaks the line without auto-indent.
    pub fn insert_rune(&mut self, c: Cursor, r: char) -> Cursor {
        if r == '\n' || r == '\r' {
            let prev = c.line;
            self.insert(c, b"\n".to_vec());
            let Some(next) = self.arena[prev].next else {
                return c;
            };
            let mut nc = Cursor::new(next, c.line_num + 1, 0);
            if r == '\n' {
                let head = &self.arena[prev].data;
                let indent = head[..rune::first_non_space(head)].to_vec();
                if !indent.is_empty() {
                    let len = indent.len();
                    self.insert(nc, indent);
                    nc.boffset += len;
                }
            }
            return nc;
        }
        let mut encoded = [0u8; 4];
        let s = r.encode_utf8(&mut encoded);
        let mut nc = c;
        nc.boffset += s.len();
        self.insert(c, s.as_bytes().to_vec());
        nc
    }

    /// Delete the rune under the cursor; at end of line, join with the next
    /// line. At the end of the buffer an `Eof` event is emitted instead.
    pub fn delete_rune(&mut self, c: Cursor) -> Cursor {
        match c.rune_under(&self.arena) {
            Some((_, rlen)) => self.delete(c, rlen),
            None => {
                if c.last_line(&self.arena) {
                    self.emit(BufferEvent::Eof);
                    return c;
                }
                self.delete(c, 1);
            }
        }
        c
    }

    /// Delete the rune before the cursor; at beginning of line, join with
    /// the previous line. At the beginning of the buffer a `Bof` event is
    /// emitted instead.
    pub fn delete_rune_backward(&mut self, c: Cursor) -> Cursor {
        if let Some((_, rlen)) = c.rune_before(&self.arena) {
            let mut nc = c;
            nc.boffset -= rlen;
            self.delete(nc, rlen);
            return nc;
        }
        match self.arena[c.line].prev {
            Some(prev) => {
                let nc = Cursor::new(prev, c.line_num - 1, self.arena[prev].data.len());
                self.delete(nc, 1);
                nc
            }
            None => {
                self.emit(BufferEvent::Bof);
                c
            }
        }
    }

    // ------------------------------------------------------------------
    // history
    // ------------------------------------------------------------------

    /// Close the open action group if it holds anything. Called at semantic
    /// boundaries: mode switches, motions after edits, save.
    pub fn finalize_action_group(&mut self) {
        self.history.finalize();
    }

    pub fn undo(&mut self) {
        if !self.history.can_undo() {
            self.emit(BufferEvent::HistoryStart);
            return;
        }
        // Undo always finalizes: the group being reverted must be closed.
        self.history.finalize();
        let actions = self.history.actions_cloned(self.history.current());
        trace!(target: "buffer.history", actions = actions.len(), "undo");
        for a in actions.iter().rev() {
            self.apply_action(a, a.kind.inverse());
        }
        self.history.retreat();
        self.emit(BufferEvent::HistoryBack);
    }

    pub fn redo(&mut self) {
        let Some(target) = self.history.redo_target() else {
            self.emit(BufferEvent::HistoryEnd);
            return;
        };
        let actions = self.history.actions_cloned(target);
        trace!(target: "buffer.history", actions = actions.len(), "redo");
        self.history.advance();
        for a in &actions {
            self.apply_action(a, a.kind);
        }
        self.emit(BufferEvent::HistoryForward);
    }

    /// Re-record and apply a copy of the last action in the open group,
    /// `times` over. The snapshot is taken once up front: appending merges
    /// the copies into the last action, so re-reading it between rounds
    /// would compound the payload. Fresh line slots are allocated per copy;
    /// re-splicing the original ids would corrupt the chain.
    pub fn replay_last_action(&mut self, times: usize) {
        let Some(a) = self.history.last_action().cloned() else {
            return;
        };
        for _ in 0..times {
            match a.kind {
                ActionKind::Insert => self.insert(a.cursor, a.data.clone()),
                ActionKind::Delete => self.delete(a.cursor, a.data.len()),
            }
        }
    }

    pub fn synced_with_disk(&self) -> bool {
        self.history.synced()
    }

    // ------------------------------------------------------------------
    // persistence
    // ------------------------------------------------------------------

    /// Buffer contents as stored on disk: lines joined by `\n`.
    pub fn contents(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.num_bytes + self.num_lines);
        let mut line = Some(self.first);
        while let Some(id) = line {
            out.extend_from_slice(&self.arena[id].data);
            line = self.arena[id].next;
            if line.is_some() {
                out.push(b'\n');
            }
        }
        out
    }

    pub fn save(&mut self) -> io::Result<()> {
        let Some(path) = self.path.clone() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no file name"));
        };
        self.save_as(&path)
    }

    pub fn save_as(&mut self, path: &Path) -> io::Result<()> {
        self.cleanup_trailing_spaces();
        self.cleanup_trailing_newlines();
        self.ensure_trailing_eol();
        self.finalize_action_group();
        let mut f = std::fs::File::create(path)?;
        f.write_all(&self.contents())?;
        f.flush()?;
        debug!(target: "io", path = %path.display(), bytes = self.num_bytes, "buffer_saved");
        self.path = Some(path.to_path_buf());
        self.history.mark_on_disk();
        self.emit(BufferEvent::Save);
        Ok(())
    }

    /// Strip trailing spaces and tabs from every line, through the normal
    /// action path so the cleanup is undoable and views adjust.
    pub fn cleanup_trailing_spaces(&mut self) {
        let mut edits = Vec::new();
        let mut line = Some(self.first);
        let mut line_num = 1;
        while let Some(id) = line {
            let data = &self.arena[id].data;
            let keep = rune::trimmed_len(data);
            if keep < data.len() {
                edits.push((Cursor::new(id, line_num, keep), data.len() - keep));
            }
            line = self.arena[id].next;
            line_num += 1;
        }
        for (c, n) in edits {
            self.delete(c, n);
        }
    }

    /// Collapse runs of trailing empty lines down to a single one.
    pub fn cleanup_trailing_newlines(&mut self) {
        loop {
            if !self.arena[self.last].data.is_empty() {
                return;
            }
            let Some(prev) = self.arena[self.last].prev else {
                return;
            };
            if !self.arena[prev].data.is_empty() {
                return;
            }
            self.delete(Cursor::new(prev, self.num_lines - 1, 0), 1);
        }
    }

    /// Guarantee the on-disk form ends with a newline by keeping the last
    /// line empty.
    pub fn ensure_trailing_eol(&mut self) {
        if !self.arena[self.last].data.is_empty() {
            self.insert(self.end(), b"\n".to_vec());
        }
    }

    /// Emit a boundary status event on behalf of a motion command.
    pub fn notify_boundary(&self, start: bool) {
        self.emit(if start {
            BufferEvent::Bof
        } else {
            BufferEvent::Eof
        });
    }

    #[cfg(test)]
    pub(crate) fn check_chain(&self) {
        let mut n = 1;
        let mut id = self.first;
        assert!(self.arena[id].prev.is_none(), "first line has a prev link");
        while let Some(next) = self.arena[id].next {
            assert_eq!(self.arena[next].prev, Some(id), "broken back link");
            id = next;
            n += 1;
        }
        assert_eq!(id, self.last, "chain does not end at last_line");
        assert_eq!(n, self.num_lines, "line count out of sync with chain");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_str(s: &str) -> Buffer {
        Buffer::from_reader(s.as_bytes()).unwrap()
    }

    fn line_strings(b: &Buffer) -> Vec<String> {
        let mut out = Vec::new();
        let mut line = Some(b.first_line());
        while let Some(id) = line {
            out.push(String::from_utf8_lossy(&b.arena()[id].data).into_owned());
            line = b.arena()[id].next;
        }
        out
    }

    fn cursor_at(b: &Buffer, line_num: usize, boffset: usize) -> Cursor {
        let mut id = b.first_line();
        for _ in 1..line_num {
            id = b.arena()[id].next.unwrap();
        }
        Cursor::new(id, line_num, boffset)
    }

    #[test]
    fn empty_buffer_has_one_empty_line() {
        let b = Buffer::new_empty();
        assert_eq!(b.num_lines(), 1);
        assert_eq!(b.num_bytes(), 0);
        b.check_chain();
    }

    #[test]
    fn from_reader_line_splitting() {
        assert_eq!(line_strings(&from_str("foo\nbar")), vec!["foo", "bar"]);
        assert_eq!(line_strings(&from_str("foo\nbar\n")), vec!["foo", "bar", ""]);
        assert_eq!(line_strings(&from_str("")), vec![""]);
        assert_eq!(line_strings(&from_str("\n")), vec!["", ""]);
        let b = from_str("foo\nbar\n");
        assert_eq!(b.num_bytes(), 6);
        b.check_chain();
    }

    #[test]
    fn insert_within_line() {
        let mut b = from_str("held");
        b.insert(cursor_at(&b, 1, 2), b"llo wor".to_vec());
        assert_eq!(line_strings(&b), vec!["hello world"]);
        assert_eq!(b.num_bytes(), 11);
        b.check_chain();
    }

    #[test]
    fn insert_across_newline() {
        // inserting across a newline into an empty buffer
        let mut b = Buffer::new_empty();
        b.insert(b.start(), b"ab\ncd".to_vec());
        assert_eq!(line_strings(&b), vec!["ab", "cd"]);
        assert_eq!(b.num_lines(), 2);
        assert_eq!(b.num_bytes(), 4);
        b.check_chain();
    }

    #[test]
    fn insert_mid_line_carries_remainder() {
        let mut b = from_str("abcd");
        b.insert(cursor_at(&b, 1, 2), b"x\ny".to_vec());
        assert_eq!(line_strings(&b), vec!["abx", "ycd"]);
        b.check_chain();
    }

    #[test]
    fn delete_within_line() {
        let mut b = from_str("hello world");
        b.delete(cursor_at(&b, 1, 5), 6);
        assert_eq!(line_strings(&b), vec!["hello"]);
        assert_eq!(b.num_bytes(), 5);
        b.check_chain();
    }

    #[test]
    fn delete_across_newline_joins_lines() {
        let mut b = from_str("ab\ncd\nef");
        b.delete(cursor_at(&b, 1, 1), 4);
        assert_eq!(line_strings(&b), vec!["ad", "ef"]);
        assert_eq!(b.num_lines(), 2);
        b.check_chain();
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut b = from_str("one\ntwo");
        b.insert(cursor_at(&b, 1, 3), b" more\nlines".to_vec());
        let after = line_strings(&b);
        b.undo();
        assert_eq!(line_strings(&b), vec!["one", "two"]);
        b.redo();
        assert_eq!(line_strings(&b), after);
        // repeated toggles converge on the same two states
        for _ in 0..3 {
            b.undo();
            assert_eq!(line_strings(&b), vec!["one", "two"]);
            b.redo();
            assert_eq!(line_strings(&b), after);
        }
        b.check_chain();
    }

    #[test]
    fn undo_at_sentinel_emits_history_start() {
        let mut b = Buffer::new_empty();
        let (_, rx) = b.add_listener();
        b.undo();
        assert!(matches!(rx.try_recv(), Ok(BufferEvent::HistoryStart)));
        b.redo();
        assert!(matches!(rx.try_recv(), Ok(BufferEvent::HistoryEnd)));
    }

    #[test]
    fn rune_inserts_merge_into_one_undo_unit() {
        // three rune insertions in one group undo together
        let mut b = Buffer::new_empty();
        let mut c = b.start();
        c = b.insert_rune(c, 'a');
        c = b.insert_rune(c, 'b');
        b.insert_rune(c, 'c');
        assert_eq!(line_strings(&b), vec!["abc"]);
        b.undo();
        assert_eq!(line_strings(&b), vec![""]);
        b.redo();
        assert_eq!(line_strings(&b), vec!["abc"]);
    }

    #[test]
    fn new_edit_truncates_redo_chain() {
        let mut b = Buffer::new_empty();
        let c = b.insert_rune(b.start(), 'a');
        b.finalize_action_group();
        b.insert_rune(c, 'b');
        b.undo();
        assert_eq!(line_strings(&b), vec!["a"]);
        // diverge: the 'b' group is gone for good
        b.insert_rune(c, 'x');
        assert_eq!(line_strings(&b), vec!["ax"]);
        let (_, rx) = b.add_listener();
        b.redo();
        assert!(matches!(rx.try_recv(), Ok(BufferEvent::HistoryEnd)));
        assert_eq!(line_strings(&b), vec!["ax"]);
    }

    #[test]
    fn newline_insert_auto_indents() {
        let mut b = from_str("    foo");
        let c = b.insert_rune(cursor_at(&b, 1, 7), '\n');
        assert_eq!(line_strings(&b), vec!["    foo", "    "]);
        assert_eq!((c.line_num, c.boffset), (2, 4));
    }

    #[test]
    fn carriage_return_suppresses_indent() {
        let mut b = from_str("    foo");
        let c = b.insert_rune(cursor_at(&b, 1, 7), '\r');
        assert_eq!(line_strings(&b), vec!["    foo", ""]);
        assert_eq!((c.line_num, c.boffset), (2, 0));
    }

    #[test]
    fn delete_rune_joins_at_eol() {
        let mut b = from_str("ab\ncd");
        b.delete_rune(cursor_at(&b, 1, 2));
        assert_eq!(line_strings(&b), vec!["abcd"]);
        let (_, rx) = b.add_listener();
        b.delete_rune(cursor_at(&b, 1, 4));
        assert!(matches!(rx.try_recv(), Ok(BufferEvent::Eof)));
    }

    #[test]
    fn delete_rune_backward_joins_at_bol() {
        let mut b = from_str("ab\ncd");
        let c = b.delete_rune_backward(cursor_at(&b, 2, 0));
        assert_eq!(line_strings(&b), vec!["abcd"]);
        assert_eq!((c.line_num, c.boffset), (1, 2));
        let (_, rx) = b.add_listener();
        b.delete_rune_backward(cursor_at(&b, 1, 0));
        assert!(matches!(rx.try_recv(), Ok(BufferEvent::Bof)));
    }

    #[test]
    fn multibyte_rune_round_trip() {
        let mut b = Buffer::new_empty();
        let c = b.insert_rune(b.start(), 'é');
        assert_eq!(c.boffset, 2);
        let c2 = b.delete_rune_backward(c);
        assert_eq!(c2.boffset, 0);
        assert_eq!(line_strings(&b), vec![""]);
    }

    #[test]
    fn cleanup_trailing_spaces() {
        let mut b = from_str(" blah \nfoo\nbar   \n  baz\n");
        b.cleanup_trailing_spaces();
        assert_eq!(line_strings(&b), vec![" blah", "foo", "bar", "  baz", ""]);
        b.check_chain();
    }

    #[test]
    fn cleanup_trailing_newlines() {
        let mut b = from_str("\nfoo\n\nbar\n\n");
        b.cleanup_trailing_newlines();
        assert_eq!(line_strings(&b), vec!["", "foo", "", "bar", ""]);
        b.check_chain();
    }

    #[test]
    fn ensure_trailing_eol() {
        let mut b = from_str("foo");
        b.ensure_trailing_eol();
        assert_eq!(line_strings(&b), vec!["foo", ""]);
        b.check_chain();
    }

    #[test]
    fn save_round_trip_after_normalization() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.txt");
        let mut b = from_str("one  \ntwo\n\n\n");
        b.save_as(&path).unwrap();
        assert!(b.synced_with_disk());
        let reread = Buffer::from_reader(std::fs::read(&path).unwrap().as_slice()).unwrap();
        assert_eq!(line_strings(&reread), line_strings(&b));
        // any fresh edit breaks sync
        b.insert_rune(b.start(), 'x');
        assert!(!b.synced_with_disk());
    }

    #[test]
    fn save_errors_surface() {
        let mut b = Buffer::new_empty();
        assert!(b.save().is_err());
        assert!(b.save_as(Path::new("/nonexistent-dir/x/y")).is_err());
    }

    #[test]
    fn sync_state_does_not_alias_recycled_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scratch.txt");
        let mut b = Buffer::new_empty();
        let c = b.insert_rune(b.start(), 'a');
        b.save_as(&path).unwrap();
        assert!(b.synced_with_disk());
        b.undo();
        assert!(!b.synced_with_disk());
        // the saved group is truncated away by the new edit
        b.insert_rune(c, 'z');
        assert!(!b.synced_with_disk());
        b.undo();
        assert!(!b.synced_with_disk());
    }

    #[test]
    fn replay_last_action_repeats_insert() {
        let mut b = Buffer::new_empty();
        let mut c = b.start();
        c = b.insert_rune(c, 'a');
        b.insert_rune(c, 'b');
        b.replay_last_action(2);
        assert_eq!(line_strings(&b), vec!["ababab"]);
        // the replays joined the open group: one undo removes everything
        b.undo();
        assert_eq!(line_strings(&b), vec![""]);
    }

    #[test]
    fn replay_across_newline_allocates_fresh_lines() {
        let mut b = Buffer::new_empty();
        b.insert(b.start(), b"ab\ncd".to_vec());
        b.replay_last_action(1);
        // the copy splits the first line again, carrying its tail along
        assert_eq!(line_strings(&b), vec!["ab", "cdab", "cd"]);
        b.check_chain();
    }

    #[test]
    fn events_reach_all_listeners_and_detach_works() {
        let mut b = Buffer::new_empty();
        let (id1, rx1) = b.add_listener();
        let (_, rx2) = b.add_listener();
        b.insert_rune(b.start(), 'x');
        assert!(matches!(rx1.try_recv(), Ok(BufferEvent::Insert(_))));
        assert!(matches!(rx2.try_recv(), Ok(BufferEvent::Insert(_))));
        b.remove_listener(id1);
        b.insert_rune(b.start(), 'y');
        assert!(rx1.try_recv().is_err());
        assert!(matches!(rx2.try_recv(), Ok(BufferEvent::Insert(_))));
    }

    #[test]
    fn insert_event_carries_action_metadata() {
        let mut b = Buffer::new_empty();
        let (_, rx) = b.add_listener();
        b.insert(b.start(), b"ab\ncd".to_vec());
        match rx.try_recv() {
            Ok(BufferEvent::Insert(a)) => {
                assert_eq!(a.data, b"ab\ncd");
                assert_eq!(a.lines.len(), 1);
                assert_eq!((a.cursor.line_num, a.cursor.boffset), (1, 0));
            }
            other => panic!("expected insert event, got {other:?}"),
        }
    }
}
