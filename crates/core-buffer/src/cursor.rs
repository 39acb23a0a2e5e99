//! Cursor arithmetic over the line chain.
//!
//! A cursor is a plain value: a line id, a 1-based line number and a byte
//! offset within the line. It never owns anything, so commands copy it,
//! move the copy and decide afterwards whether the motion took effect.

use crate::action::Action;
use core_text::{LineArena, LineId, rune, width};

#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub line: LineId,
    /// 1-based position of `line` in the buffer.
    pub line_num: usize,
    pub boffset: usize,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.line_num == other.line_num && self.boffset == other.boffset
    }
}

impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.line_num, self.boffset).cmp(&(other.line_num, other.boffset))
    }
}

impl Cursor {
    /// Byte-offset sentinel meaning "resolve against the view's sticky
    /// visual column on the next `move_cursor_to`".
    pub const STICKY: usize = usize::MAX;

    pub fn new(line: LineId, line_num: usize, boffset: usize) -> Self {
        Self {
            line,
            line_num,
            boffset,
        }
    }

    /// Return the two cursors in buffer order.
    pub fn sort(a: Cursor, b: Cursor) -> (Cursor, Cursor) {
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn rune_under(&self, arena: &LineArena) -> Option<(char, usize)> {
        rune::decode_rune(&arena[self.line].data[self.boffset..])
    }

    pub fn rune_before(&self, arena: &LineArena) -> Option<(char, usize)> {
        rune::decode_last_rune(&arena[self.line].data[..self.boffset])
    }

    /// Rune following the one under the cursor.
    pub fn rune_after(&self, arena: &LineArena) -> Option<(char, usize)> {
        let (_, rlen) = self.rune_under(arena)?;
        rune::decode_rune(&arena[self.line].data[self.boffset + rlen..])
    }

    pub fn first_line(&self, arena: &LineArena) -> bool {
        arena[self.line].prev.is_none()
    }

    pub fn last_line(&self, arena: &LineArena) -> bool {
        arena[self.line].next.is_none()
    }

    pub fn eol(&self, arena: &LineArena) -> bool {
        self.boffset == arena[self.line].data.len()
    }

    pub fn bol(&self) -> bool {
        self.boffset == 0
    }

    /// Step one rune forward. With `wrap`, continues onto the next line
    /// after reaching the end of the current one.
    pub fn next_rune(&mut self, arena: &LineArena, wrap: bool) -> bool {
        if let Some((_, rlen)) = self.rune_under(arena) {
            self.boffset += rlen;
            return true;
        }
        if wrap {
            if let Some(next) = arena[self.line].next {
                self.line = next;
                self.line_num += 1;
                self.boffset = 0;
                return true;
            }
        }
        false
    }

    /// Step one rune backward. With `wrap`, continues onto the end of the
    /// previous line from the beginning of the current one.
    pub fn prev_rune(&mut self, arena: &LineArena, wrap: bool) -> bool {
        if let Some((_, rlen)) = self.rune_before(arena) {
            self.boffset -= rlen;
            return true;
        }
        if wrap {
            if let Some(prev) = arena[self.line].prev {
                self.line = prev;
                self.line_num -= 1;
                self.boffset = arena[prev].data.len();
                return true;
            }
        }
        false
    }

    pub fn move_bol(&mut self) {
        self.boffset = 0;
    }

    pub fn move_eol(&mut self, arena: &LineArena) {
        self.boffset = arena[self.line].data.len();
    }

    /// Move forward until the rune under the cursor satisfies `f`, crossing
    /// line boundaries. Returns false when the end of the buffer is reached
    /// first (the cursor is left parked at the final end-of-line).
    fn skip_forward_until(&mut self, arena: &LineArena, f: impl Fn(char) -> bool) -> bool {
        loop {
            match self.rune_under(arena) {
                Some((r, rlen)) => {
                    if f(r) {
                        return true;
                    }
                    self.boffset += rlen;
                }
                None => match arena[self.line].next {
                    Some(next) => {
                        self.line = next;
                        self.line_num += 1;
                        self.boffset = 0;
                    }
                    None => return false,
                },
            }
        }
    }

    /// Move to the beginning of the next word. Word runes (letters, digits,
    /// `_`) and other non-space runes form distinct word classes.
    pub fn next_word(&mut self, arena: &LineArena) -> bool {
        let start = *self;
        if let Some((r, _)) = self.rune_under(arena) {
            if !r.is_whitespace() {
                // Skip the rest of the current word class first.
                if rune::is_word(r) {
                    self.skip_forward_until(arena, |r| !rune::is_word(r) || r.is_whitespace());
                } else {
                    self.skip_forward_until(arena, |r| rune::is_word(r) || r.is_whitespace());
                }
            }
        }
        self.skip_forward_until(arena, |r| !r.is_whitespace()) && *self != start
    }

    /// Move to the beginning of the previous word.
    pub fn prev_word(&mut self, arena: &LineArena) -> bool {
        let start = *self;
        // Skip whitespace (and line boundaries) behind the cursor.
        loop {
            match self.rune_before(arena) {
                Some((r, rlen)) if r.is_whitespace() => self.boffset -= rlen,
                Some(_) => break,
                None => match arena[self.line].prev {
                    Some(prev) => {
                        self.line = prev;
                        self.line_num -= 1;
                        self.boffset = arena[prev].data.len();
                    }
                    None => return *self != start,
                },
            }
        }
        // Walk back to the start of the word class behind the cursor.
        if let Some((r, _)) = self.rune_before(arena) {
            let class_word = rune::is_word(r);
            while let Some((r, rlen)) = self.rune_before(arena) {
                if r.is_whitespace() || rune::is_word(r) != class_word {
                    break;
                }
                self.boffset -= rlen;
            }
        }
        *self != start
    }

    /// Move to the last rune of the next word (vi `e`).
    pub fn end_word(&mut self, arena: &LineArena) -> bool {
        let start = *self;
        if !self.next_rune(arena, true) {
            return false;
        }
        if !self.skip_forward_until(arena, |r| !r.is_whitespace()) {
            return *self != start;
        }
        let class_word = match self.rune_under(arena) {
            Some((r, _)) => rune::is_word(r),
            None => return *self != start,
        };
        // Stay on the last rune whose successor still continues the class.
        loop {
            let mut probe = *self;
            if !probe.next_rune(arena, false) {
                break;
            }
            match probe.rune_under(arena) {
                Some((r, _)) if !r.is_whitespace() && rune::is_word(r) == class_word => {
                    self.boffset = probe.boffset;
                }
                _ => break,
            }
        }
        true
    }

    /// The maximal word-rune run containing the cursor position, if any.
    /// At the end of a word (or of the line) the word just behind counts.
    pub fn word_under(&self, arena: &LineArena) -> Option<Vec<u8>> {
        let is_word_at = |c: &Cursor| {
            c.rune_under(arena)
                .map(|(r, _)| rune::is_word(r))
                .unwrap_or(false)
        };
        let is_word_before = |c: &Cursor| {
            c.rune_before(arena)
                .map(|(r, _)| rune::is_word(r))
                .unwrap_or(false)
        };
        if !is_word_at(self) && !is_word_before(self) {
            return None;
        }
        let mut end = *self;
        while let Some((r, rlen)) = end.rune_under(arena) {
            if !rune::is_word(r) {
                break;
            }
            end.boffset += rlen;
        }
        let mut beg = *self;
        while let Some((r, rlen)) = beg.rune_before(arena) {
            if !rune::is_word(r) {
                break;
            }
            beg.boffset -= rlen;
        }
        Some(arena[self.line].data[beg.boffset..end.boffset].to_vec())
    }

    /// Copy up to `n` bytes starting at the cursor, with `\n` standing in
    /// for each line boundary. Clamps at the end of the buffer.
    pub fn extract_bytes(&self, arena: &LineArena, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        let mut line = self.line;
        let mut offset = self.boffset;
        let mut n = n;
        while n > 0 {
            let data = &arena[line].data;
            if offset < data.len() {
                let take = n.min(data.len() - offset);
                out.extend_from_slice(&data[offset..offset + take]);
                n -= take;
                offset += take;
            } else {
                match arena[line].next {
                    Some(next) => {
                        out.push(b'\n');
                        n -= 1;
                        line = next;
                        offset = 0;
                    }
                    None => break,
                }
            }
        }
        out
    }

    /// Signed byte distance to `other`, counting each line boundary as one
    /// byte.
    pub fn distance(&self, arena: &LineArena, other: Cursor) -> isize {
        let (mut a, b, sign) = if other < *self {
            (other, *self, -1isize)
        } else {
            (*self, other, 1isize)
        };
        let mut n = 0isize;
        while a.line != b.line {
            n += (arena[a.line].data.len() - a.boffset + 1) as isize;
            match arena[a.line].next {
                Some(next) => a.line = next,
                None => break,
            }
            a.boffset = 0;
        }
        n += b.boffset as isize - a.boffset as isize;
        n * sign
    }

    /// Visual and character offsets of the cursor from the start of its
    /// line.
    pub fn voffset_coffset(&self, arena: &LineArena, tabstop: usize) -> (usize, usize) {
        let (mut vo, mut co) = (0usize, 0usize);
        let mut data = &arena[self.line].data[..self.boffset];
        while let Some((r, rlen)) = rune::decode_rune(data) {
            data = &data[rlen..];
            co += 1;
            vo += width::rune_advance(r, vo, tabstop);
        }
        (vo, co)
    }

    /// Rewrite this cursor after an insert elsewhere in the buffer. An
    /// insert strictly before the cursor shifts it; the originating view
    /// positions its own cursor from the mutation's return value instead.
    pub fn on_insert_adjust(&mut self, a: &Action) {
        if a.cursor.line_num > self.line_num {
            return;
        }
        if a.cursor.line_num < self.line_num {
            self.line_num += a.lines.len();
            return;
        }
        if a.cursor.boffset < self.boffset {
            match a.lines.last() {
                None => self.boffset += a.data.len(),
                Some(&last) => {
                    self.line = last;
                    self.line_num += a.lines.len();
                    self.boffset = a.last_line_affection_len() + self.boffset - a.cursor.boffset;
                }
            }
        }
    }

    /// Rewrite this cursor after a delete elsewhere in the buffer, clamping
    /// onto the action's cursor line when the cursor's own line was removed.
    pub fn on_delete_adjust(&mut self, a: &Action) {
        if a.cursor.line_num > self.line_num {
            return;
        }
        if a.cursor.line_num < self.line_num {
            if a.lines.is_empty() {
                return;
            }
            let (first, last) = a.deleted_lines();
            if first <= self.line_num && self.line_num <= last {
                // The cursor line was deleted; land on the action cursor,
                // carrying over whatever survived of the last deleted line.
                let n = if last == self.line_num {
                    self.boffset.saturating_sub(a.last_line_affection_len())
                } else {
                    0
                };
                *self = a.cursor;
                self.boffset += n;
            } else {
                self.line_num -= a.lines.len();
            }
            return;
        }
        if a.cursor.boffset >= self.boffset {
            return;
        }
        let n = self
            .boffset
            .saturating_sub(a.cursor.boffset + a.first_line_affection_len());
        self.boffset = a.cursor.boffset + n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    fn make_lines(arena: &mut LineArena, text: &[&str]) -> Vec<LineId> {
        let ids: Vec<LineId> = text
            .iter()
            .map(|t| arena.alloc(t.as_bytes().to_vec()))
            .collect();
        for w in ids.windows(2) {
            arena[w[0]].next = Some(w[1]);
            arena[w[1]].prev = Some(w[0]);
        }
        ids
    }

    fn at(ids: &[LineId], line: usize, boffset: usize) -> Cursor {
        Cursor::new(ids[line - 1], line, boffset)
    }

    #[test]
    fn extract_bytes_within_and_across_lines() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["// comment", "func bar(i int) {", "}"]);

        assert_eq!(at(&ids, 1, 0).extract_bytes(&arena, 10), b"// comment");
        assert_eq!(at(&ids, 1, 7).extract_bytes(&arena, 5), b"ent\nf");
        // clamps at the end of the buffer
        assert_eq!(at(&ids, 2, 16).extract_bytes(&arena, 5), b"{\n}");
    }

    #[test]
    fn next_rune_stops_at_eol_without_wrap() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["// comment", "func bar(i int) {"]);
        let mut c = at(&ids, 1, 0);
        for i in 1..10 {
            assert!(c.next_rune(&arena, false));
            assert_eq!(c.boffset, i);
        }
        assert!(c.next_rune(&arena, false));
        assert_eq!(c.boffset, 10);
        assert!(!c.next_rune(&arena, false));
        assert_eq!(c.boffset, 10);
    }

    #[test]
    fn next_rune_wraps_from_eol() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["// comment", "func bar(i int) {"]);
        // Wrapping takes one motion to reach EOL and one more to cross.
        let mut c = at(&ids, 1, 9);
        assert!(c.next_rune(&arena, true));
        assert!(c.next_rune(&arena, true));
        assert_eq!((c.line, c.line_num, c.boffset), (ids[1], 2, 0));
    }

    #[test]
    fn prev_rune_wraps_to_previous_eol() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["// comment", "func bar(i int) {"]);
        let mut c = at(&ids, 2, 0);
        assert!(c.prev_rune(&arena, true));
        assert_eq!((c.line, c.line_num, c.boffset), (ids[0], 1, 10));
        let mut c2 = at(&ids, 1, 0);
        assert!(!c2.prev_rune(&arena, false));
    }

    #[test]
    fn next_word_stop_sequence() {
        let mut arena = LineArena::new();
        let ids = make_lines(
            &mut arena,
            &["// comment", "func bar(i int) {", " return 0", "}"],
        );
        let stops = [
            (2, 5),
            (2, 8),
            (2, 9),
            (2, 11),
            (2, 14),
            (2, 16),
            (3, 1),
            (3, 8),
            (4, 0),
        ];
        let mut c = at(&ids, 2, 2);
        for &(line, boffset) in &stops {
            assert!(c.next_word(&arena));
            assert_eq!((c.line_num, c.boffset), (line, boffset));
        }
    }

    #[test]
    fn end_word_stop_sequence() {
        let mut arena = LineArena::new();
        let ids = make_lines(
            &mut arena,
            &["// comment", "func bar(i int) {", "", " return 0", "}"],
        );
        let stops = [
            (1, 9),
            (2, 3),
            (2, 7),
            (2, 8),
            (2, 9),
            (2, 13),
            (2, 14),
            (2, 16),
            (4, 6),
            (4, 8),
            (5, 0),
        ];
        let mut c = at(&ids, 1, 5);
        for &(line, boffset) in &stops {
            assert!(c.end_word(&arena));
            assert_eq!((c.line_num, c.boffset), (line, boffset));
        }
    }

    #[test]
    fn prev_word_stop_sequence() {
        let mut arena = LineArena::new();
        let ids = make_lines(
            &mut arena,
            &["// comment", "func bar(i int) {", " return 0", "}"],
        );
        let stops = [
            (3, 1),
            (2, 16),
            (2, 14),
            (2, 11),
            (2, 9),
            (2, 8),
            (2, 5),
            (2, 0),
            (1, 3),
            (1, 0),
        ];
        let mut c = at(&ids, 3, 8);
        for &(line, boffset) in &stops {
            assert!(c.prev_word(&arena));
            assert_eq!((c.line_num, c.boffset), (line, boffset));
        }
        assert!(!c.prev_word(&arena));
    }

    #[test]
    fn prev_word_over_leading_spaces() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["  foo", "  bar"]);
        let mut c = at(&ids, 2, 2);
        assert!(c.prev_word(&arena));
        assert_eq!((c.line_num, c.boffset), (1, 2));
    }

    #[test]
    fn sort_orders_by_position() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["aaaa aaaa aaaa aaaa aaaa", "bbbb"]);
        let c1 = at(&ids, 1, 10);
        let c2 = at(&ids, 1, 20);
        let c3 = at(&ids, 2, 10);
        assert_eq!(Cursor::sort(c1, c2), (c1, c2));
        assert_eq!(Cursor::sort(c2, c1), (c1, c2));
        assert_eq!(Cursor::sort(c1, c3), (c1, c3));
        assert_eq!(Cursor::sort(c3, c1), (c1, c3));
    }

    #[test]
    fn rune_after_cursor() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["this is a test line"]);
        let mut c = at(&ids, 1, 2);
        assert_eq!(c.rune_after(&arena), Some(('s', 1)));
        c.boffset = 3;
        assert_eq!(c.rune_after(&arena), Some((' ', 1)));
        c.boffset = arena[c.line].data.len();
        assert_eq!(c.rune_after(&arena), None);
    }

    #[test]
    fn word_under_cursor() {
        let mut arena = LineArena::new();
        let ids = make_lines(
            &mut arena,
            &["this is a test line", "another line      with whitespace"],
        );
        let mut c = at(&ids, 1, 2);
        assert_eq!(c.word_under(&arena).as_deref(), Some(&b"this"[..]));
        c.boffset = 5;
        assert_eq!(c.word_under(&arena).as_deref(), Some(&b"is"[..]));
        c.boffset = 0;
        assert_eq!(c.word_under(&arena).as_deref(), Some(&b"this"[..]));
        c.move_eol(&arena);
        assert_eq!(c.word_under(&arena).as_deref(), Some(&b"line"[..]));
        c.boffset = 3;
        assert_eq!(c.word_under(&arena).as_deref(), Some(&b"this"[..]));
        c.boffset = 8;
        assert_eq!(c.word_under(&arena).as_deref(), Some(&b"a"[..]));
        // on whitespace with whitespace behind: no word
        let c2 = at(&ids, 2, 14);
        assert_eq!(c2.word_under(&arena), None);
    }

    #[test]
    fn distance_counts_line_boundaries() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["abc", "defg"]);
        let a = at(&ids, 1, 1);
        let b = at(&ids, 2, 2);
        // "bc" + "\n" + "de"
        assert_eq!(a.distance(&arena, b), 5);
        assert_eq!(b.distance(&arena, a), -5);
        assert_eq!(a.distance(&arena, a), 0);
    }

    #[test]
    fn on_insert_adjust_shifts_and_rewrites() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["hello", "world"]);

        // insert above the cursor line: only the line number moves
        let nl = arena.alloc(Vec::new());
        let above = Action {
            kind: ActionKind::Insert,
            data: b"x\ny".to_vec(),
            cursor: at(&ids, 1, 0),
            lines: vec![nl],
        };
        let mut c = at(&ids, 2, 3);
        c.on_insert_adjust(&above);
        assert_eq!((c.line_num, c.boffset), (3, 3));

        // insert on the cursor line strictly before the offset
        let same = Action {
            kind: ActionKind::Insert,
            data: b"ab".to_vec(),
            cursor: at(&ids, 1, 1),
            lines: vec![],
        };
        let mut c = at(&ids, 1, 3);
        c.on_insert_adjust(&same);
        assert_eq!((c.line_num, c.boffset), (1, 5));

        // insert at or after the offset leaves the cursor alone
        let mut c = at(&ids, 1, 1);
        c.on_insert_adjust(&same);
        assert_eq!((c.line_num, c.boffset), (1, 1));

        // a newline before the cursor carries it to the new last line
        let nl2 = arena.alloc(Vec::new());
        let split = Action {
            kind: ActionKind::Insert,
            data: b"xx\nyy".to_vec(),
            cursor: at(&ids, 1, 1),
            lines: vec![nl2],
        };
        let mut c = at(&ids, 1, 3);
        c.on_insert_adjust(&split);
        assert_eq!(c.line, nl2);
        // last-line affection (2) plus what followed the insertion point
        assert_eq!((c.line_num, c.boffset), (2, 4));
    }

    #[test]
    fn on_delete_adjust_clamps_onto_survivors() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["aaaa", "bbbb", "cccc", "dddd"]);

        // delete above with no newline crossing: nothing to do
        let flat = Action {
            kind: ActionKind::Delete,
            data: b"aa".to_vec(),
            cursor: at(&ids, 1, 0),
            lines: vec![],
        };
        let mut c = at(&ids, 3, 2);
        c.on_delete_adjust(&flat);
        assert_eq!((c.line_num, c.boffset), (3, 2));

        // whole lines deleted above: line number shifts down
        let above = Action {
            kind: ActionKind::Delete,
            data: b"aaaa\nbbbb\n".to_vec(),
            cursor: at(&ids, 1, 0),
            lines: vec![ids[1], ids[2]],
        };
        let mut c = at(&ids, 4, 2);
        c.on_delete_adjust(&above);
        assert_eq!((c.line_num, c.boffset), (2, 2));

        // the cursor's own line deleted: land on the action cursor plus
        // whatever survived of the last deleted line
        let span = Action {
            kind: ActionKind::Delete,
            data: b"aa\nbb".to_vec(),
            cursor: at(&ids, 1, 2),
            lines: vec![ids[1]],
        };
        let mut c = at(&ids, 2, 3);
        c.on_delete_adjust(&span);
        // bytes 0..2 of line 2 died; offset 3 keeps one surviving byte
        assert_eq!((c.line_num, c.boffset), (1, 3));

        // deletion before the cursor on the same line clamps at its start
        let mut c = at(&ids, 1, 3);
        c.on_delete_adjust(&flat);
        assert_eq!((c.line_num, c.boffset), (1, 1));
        let mut c = at(&ids, 1, 1);
        c.on_delete_adjust(&flat);
        assert_eq!((c.line_num, c.boffset), (1, 0));
    }

    #[test]
    fn voffset_expands_tabs_and_controls() {
        let mut arena = LineArena::new();
        let ids = make_lines(&mut arena, &["\tx\u{1}y"]);
        let mut c = at(&ids, 1, 0);
        c.boffset = 1;
        assert_eq!(c.voffset_coffset(&arena, 8), (8, 1));
        c.boffset = 2;
        assert_eq!(c.voffset_coffset(&arena, 8), (9, 2));
        c.boffset = 3;
        // the control byte renders as ^A: two cells
        assert_eq!(c.voffset_coffset(&arena, 8), (11, 3));
    }
}
