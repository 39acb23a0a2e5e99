//! A window onto a buffer.
//!
//! The view keeps three cursor offsets (byte, character, visual), the first
//! visible line, and a horizontal scroll offset in cells (`line_voffset`).
//! `last_cursor_voffset` is the sticky column: vertical motion resolves the
//! target byte offset against it so the cursor slides back out on longer
//! lines.

use std::sync::mpsc::Receiver;

use core_buffer::{Buffer, BufferEvent, Cursor, ListenerId};
use core_render::{Cell, CellAttrs, CellBuffer, Color};
use core_text::{LineId, rune, width};

bitflags::bitflags! {
    /// Damage bits consumed by `draw`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Damage: u8 {
        const CONTENTS = 0b01;
        const STATUS   = 0b10;
    }
}

const HL_FG: Color = Color::Cyan;
const HL_BG: Color = Color::Blue;

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub vertical_threshold: usize,
    pub horizontal_threshold: usize,
    pub tabstop: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            vertical_threshold: 5,
            horizontal_threshold: 10,
            tabstop: width::TAB_STOP,
        }
    }
}

/// A styled byte range spanning buffer positions, used for selections and
/// external styling.
#[derive(Debug, Clone, Copy)]
pub struct ViewTag {
    pub beg_line: usize,
    pub beg_offset: usize,
    pub end_line: usize,
    pub end_offset: usize,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl ViewTag {
    pub fn selection(beg_line: usize, beg_offset: usize, end_line: usize, end_offset: usize) -> ViewTag {
        ViewTag {
            beg_line,
            beg_offset,
            end_line,
            end_offset,
            fg: Color::Reset,
            bg: Color::Reset,
            attrs: CellAttrs::REVERSE,
        }
    }

    fn includes(&self, line: usize, offset: usize) -> bool {
        if line < self.beg_line || line > self.end_line {
            return false;
        }
        if line == self.beg_line && offset < self.beg_offset {
            return false;
        }
        if line == self.end_line && offset >= self.end_offset {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct ByteRange {
    begin: usize,
    end: usize,
}

impl ByteRange {
    fn includes(&self, offset: usize) -> bool {
        self.begin <= offset && offset < self.end
    }
}

/// What a batch of buffer events asks of the editor.
#[derive(Debug, Default)]
pub struct ViewReaction {
    pub redraw: bool,
    pub status: Option<String>,
}

pub struct View {
    /// Index of the displayed buffer in the editor's buffer list.
    pub buffer: usize,

    top_line: LineId,
    top_line_num: usize,
    cursor: Cursor,
    cursor_coffset: usize,
    cursor_voffset: usize,
    line_voffset: usize,
    last_cursor_voffset: usize,

    damage: Damage,
    cells: CellBuffer,
    opts: ViewOptions,

    highlight: Vec<u8>,
    highlight_ranges: Vec<ByteRange>,
    tags: Vec<ViewTag>,
    selection: Option<ViewTag>,

    events: Receiver<BufferEvent>,
    listener: ListenerId,
}

impl View {
    pub fn new(buffer: usize, buf: &mut Buffer, opts: ViewOptions) -> View {
        let (listener, events) = buf.add_listener();
        View {
            buffer,
            top_line: buf.first_line(),
            top_line_num: 1,
            cursor: buf.start(),
            cursor_coffset: 0,
            cursor_voffset: 0,
            line_voffset: 0,
            last_cursor_voffset: 0,
            damage: Damage::all(),
            cells: CellBuffer::new(1, 1),
            opts,
            highlight: Vec::new(),
            highlight_ranges: Vec::new(),
            tags: Vec::new(),
            selection: None,
            events,
            listener,
        }
    }

    /// Re-point the view at another buffer, re-registering the listener.
    pub fn attach(&mut self, buffer: usize, old: &mut Buffer, new: &mut Buffer) {
        old.remove_listener(self.listener);
        let (listener, events) = new.add_listener();
        self.listener = listener;
        self.events = events;
        self.buffer = buffer;
        self.top_line = new.first_line();
        self.top_line_num = 1;
        self.cursor = new.start();
        self.cursor_coffset = 0;
        self.cursor_voffset = 0;
        self.line_voffset = 0;
        self.last_cursor_voffset = 0;
        self.damage = Damage::all();
    }

    /// Deregister from the buffer; called before the view is dropped.
    pub fn detach(&mut self, buf: &mut Buffer) {
        buf.remove_listener(self.listener);
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn top_line_num(&self) -> usize {
        self.top_line_num
    }

    pub fn line_voffset(&self) -> usize {
        self.line_voffset
    }

    pub fn cursor_voffset(&self) -> usize {
        self.cursor_voffset
    }

    pub fn cursor_coffset(&self) -> usize {
        self.cursor_coffset
    }

    pub fn cells(&self) -> &CellBuffer {
        &self.cells
    }

    pub fn options(&self) -> ViewOptions {
        self.opts
    }

    pub fn damage_all(&mut self) {
        self.damage = Damage::all();
    }

    pub fn set_selection(&mut self, sel: Option<ViewTag>) {
        self.selection = sel;
        self.damage = Damage::all();
    }

    pub fn selection(&self) -> Option<ViewTag> {
        self.selection
    }

    pub fn set_tags(&mut self, tags: Vec<ViewTag>) {
        self.tags = tags;
        self.damage = Damage::all();
    }

    pub fn set_highlight(&mut self, bytes: Option<Vec<u8>>) {
        self.highlight = bytes.unwrap_or_default();
        self.damage = Damage::all();
    }

    pub fn width(&self) -> usize {
        self.cells.width()
    }

    /// Text rows; the bottom row is the status bar.
    pub fn height(&self) -> usize {
        self.cells.height().saturating_sub(1)
    }

    fn vertical_threshold(&self) -> usize {
        let max = self.height().saturating_sub(1) / 2;
        self.opts.vertical_threshold.min(max)
    }

    fn horizontal_threshold(&self) -> usize {
        let max = self.width().saturating_sub(1) / 2;
        self.opts.horizontal_threshold.min(max)
    }

    pub fn resize(&mut self, buf: &Buffer, w: usize, h: usize) {
        self.cells.resize(w, h);
        self.adjust_line_voffset();
        self.adjust_top_line(buf);
        self.damage = Damage::all();
    }

    // ------------------------------------------------------------------
    // scrolling and cursor placement
    // ------------------------------------------------------------------

    /// Move the first visible line `n` lines forward or backward, clamped
    /// at the buffer edges.
    fn move_top_line(&mut self, buf: &Buffer, mut n: isize) {
        let arena = buf.arena();
        let mut top = self.top_line;
        while n < 0 {
            match arena[top].prev {
                Some(prev) => {
                    top = prev;
                    self.top_line_num -= 1;
                    n += 1;
                }
                None => break,
            }
        }
        while n > 0 {
            match arena[top].next {
                Some(next) => {
                    top = next;
                    self.top_line_num += 1;
                    n -= 1;
                }
                None => break,
            }
        }
        self.top_line = top;
    }

    /// Move the cursor line `n` lines forward or backward without touching
    /// its offsets; callers fix those up afterwards.
    fn move_cursor_line(&mut self, buf: &Buffer, mut n: isize) {
        let arena = buf.arena();
        let mut line = self.cursor.line;
        while n < 0 {
            match arena[line].prev {
                Some(prev) => {
                    line = prev;
                    self.cursor.line_num -= 1;
                    n += 1;
                }
                None => break,
            }
        }
        while n > 0 {
            match arena[line].next {
                Some(next) => {
                    line = next;
                    self.cursor.line_num += 1;
                    n -= 1;
                }
                None => break,
            }
        }
        self.cursor.line = line;
    }

    /// After the top line moved, drag the cursor back inside the vertical
    /// threshold band and resolve its offsets against the sticky column.
    fn adjust_cursor_line(&mut self, buf: &Buffer) {
        let arena = buf.arena();
        let vt = self.vertical_threshold() as isize;
        let prev_line = self.cursor.line;
        let co = self.cursor.line_num as isize - self.top_line_num as isize;
        let h = self.height() as isize;

        if arena[self.cursor.line].next.is_some() && co < vt {
            self.move_cursor_line(buf, vt - co);
        }
        if arena[self.cursor.line].prev.is_some() && co >= h - vt {
            self.move_cursor_line(buf, (h - vt) - co - 1);
        }

        if self.cursor.line != prev_line {
            let (bo, co, vo) = arena[self.cursor.line]
                .closest_offsets(self.last_cursor_voffset, self.opts.tabstop);
            self.cursor.boffset = bo;
            self.cursor_coffset = co;
            self.cursor_voffset = vo;
            self.line_voffset = 0;
            self.adjust_line_voffset();
            self.damage = Damage::all();
        }
    }

    /// After the cursor moved, scroll the top line so the cursor stays
    /// inside the vertical threshold band.
    fn adjust_top_line(&mut self, buf: &Buffer) {
        let arena = buf.arena();
        let vt = self.vertical_threshold() as isize;
        let co = self.cursor.line_num as isize - self.top_line_num as isize;
        let h = self.height() as isize;

        if arena[self.top_line].next.is_some() && co >= h - vt {
            self.move_top_line(buf, co - (h - vt) + 1);
            self.damage = Damage::all();
        }
        if arena[self.top_line].prev.is_some() && co < vt {
            self.move_top_line(buf, co - vt);
            self.damage = Damage::all();
        }
    }

    /// Keep the cursor inside the horizontal threshold band by adjusting
    /// the pane's leftmost visible cell.
    fn adjust_line_voffset(&mut self) {
        let ht = self.horizontal_threshold() as isize;
        let w = self.width() as isize;
        let mut vo = self.line_voffset as isize;
        let cvo = self.cursor_voffset as isize;
        let threshold = if vo == 0 { w - 1 } else { w - ht };

        if cvo - vo >= threshold {
            vo = (cvo + ht - w).max(0);
        }
        if vo != 0 && cvo - vo < ht {
            vo = (cvo - ht).max(0);
        }
        if self.line_voffset != vo as usize {
            self.line_voffset = vo as usize;
            self.damage = Damage::all();
        }
    }

    /// Cursor position in pane cells.
    pub fn cursor_position(&self) -> (usize, usize) {
        let y = self.cursor.line_num.saturating_sub(self.top_line_num);
        let x = self.cursor_voffset.saturating_sub(self.line_voffset);
        (x, y)
    }

    /// Move the cursor to `c`. A `Cursor::STICKY` byte offset resolves
    /// against the sticky visual column instead.
    pub fn move_cursor_to(&mut self, buf: &Buffer, c: Cursor) {
        self.damage |= Damage::STATUS;
        let arena = buf.arena();
        if c.boffset == Cursor::STICKY {
            let (bo, co, vo) =
                arena[c.line].closest_offsets(self.last_cursor_voffset, self.opts.tabstop);
            self.cursor.boffset = bo;
            self.cursor_coffset = co;
            self.cursor_voffset = vo;
        } else {
            let (vo, co) = c.voffset_coffset(arena, self.opts.tabstop);
            self.cursor.boffset = c.boffset;
            self.cursor_coffset = co;
            self.cursor_voffset = vo;
            self.last_cursor_voffset = vo;
        }
        if c.line != self.cursor.line {
            if self.line_voffset != 0 {
                self.damage = Damage::all();
            }
            self.line_voffset = 0;
        }
        self.cursor.line = c.line;
        self.cursor.line_num = c.line_num;
        self.adjust_line_voffset();
        self.adjust_top_line(buf);
    }

    pub fn move_cursor_next_line(&mut self, buf: &Buffer) -> bool {
        match buf.arena()[self.cursor.line].next {
            Some(next) => {
                let c = Cursor::new(next, self.cursor.line_num + 1, Cursor::STICKY);
                self.move_cursor_to(buf, c);
                true
            }
            None => false,
        }
    }

    pub fn move_cursor_prev_line(&mut self, buf: &Buffer) -> bool {
        match buf.arena()[self.cursor.line].prev {
            Some(prev) => {
                let c = Cursor::new(prev, self.cursor.line_num - 1, Cursor::STICKY);
                self.move_cursor_to(buf, c);
                true
            }
            None => false,
        }
    }

    pub fn move_cursor_bof(&mut self, buf: &Buffer) {
        self.move_cursor_to(buf, buf.start());
    }

    pub fn move_cursor_eof(&mut self, buf: &Buffer) {
        self.move_cursor_to(buf, buf.end());
    }

    /// Center the viewport on the cursor line.
    pub fn center_on_cursor(&mut self, buf: &Buffer) {
        self.top_line = self.cursor.line;
        self.top_line_num = self.cursor.line_num;
        let h = self.height() as isize;
        self.move_top_line(buf, -(h / 2));
        self.damage = Damage::all();
    }

    pub fn move_cursor_to_line(&mut self, buf: &Buffer, n: usize) {
        self.move_cursor_bof(buf);
        self.move_cursor_line(buf, n.saturating_sub(1) as isize);
        let c = Cursor::new(self.cursor.line, self.cursor.line_num, 0);
        self.move_cursor_to(buf, c);
        self.center_on_cursor(buf);
    }

    /// Scroll the view `n` lines, dragging the cursor along when it would
    /// leave the threshold band.
    pub fn move_view_lines(&mut self, buf: &Buffer, n: isize) {
        let prev_top = self.top_line_num;
        self.move_top_line(buf, n);
        if prev_top != self.top_line_num {
            self.adjust_cursor_line(buf);
            self.damage = Damage::all();
        }
    }

    fn can_move_top_line(&self, buf: &Buffer, mut n: isize) -> bool {
        let arena = buf.arena();
        let mut top = self.top_line;
        while n < 0 {
            match arena[top].prev {
                Some(prev) => {
                    top = prev;
                    n += 1;
                }
                None => return false,
            }
        }
        while n > 0 {
            match arena[top].next {
                Some(next) => {
                    top = next;
                    n -= 1;
                }
                None => return false,
            }
        }
        true
    }

    /// Scroll only when the full distance is available (page motions stop
    /// dead at the buffer edge instead of sliding).
    pub fn maybe_move_view_lines(&mut self, buf: &Buffer, n: isize) {
        if self.can_move_top_line(buf, n) {
            self.move_view_lines(buf, n);
        }
    }

    // ------------------------------------------------------------------
    // buffer events
    // ------------------------------------------------------------------

    /// Drain pending buffer events. With `adjust_cursor` false the cursor
    /// rewrite is skipped for inserts/deletes: the originating command has
    /// already positioned this view's cursor.
    pub fn handle_buffer_events(&mut self, buf: &Buffer, adjust_cursor: bool) -> ViewReaction {
        let mut reaction = ViewReaction::default();
        let events: Vec<BufferEvent> = self.events.try_iter().collect();
        if !events.is_empty() {
            tracing::trace!(target: "view.events", count = events.len(), adjust_cursor, "drain");
        }
        for event in events {
            reaction.redraw = true;
            match event {
                BufferEvent::Insert(a) => {
                    self.on_insert_adjust_top_line(&a);
                    if adjust_cursor {
                        let mut c = self.cursor;
                        c.on_insert_adjust(&a);
                        self.move_cursor_to(buf, c);
                    }
                    self.damage = Damage::all();
                }
                BufferEvent::Delete(a) => {
                    self.on_delete_adjust_top_line(buf, &a);
                    if adjust_cursor {
                        let mut c = self.cursor;
                        c.on_delete_adjust(&a);
                        self.move_cursor_to(buf, c);
                    }
                    self.damage = Damage::all();
                }
                BufferEvent::Bof => {
                    reaction.status = Some("Beginning of buffer".into());
                    self.damage |= Damage::STATUS;
                }
                BufferEvent::Eof => {
                    reaction.status = Some("End of buffer".into());
                    self.damage |= Damage::STATUS;
                }
                BufferEvent::HistoryBack => {
                    reaction.status = Some("Undo!".into());
                    self.damage |= Damage::STATUS;
                }
                BufferEvent::HistoryForward => {
                    reaction.status = Some("Redo!".into());
                    self.damage |= Damage::STATUS;
                }
                BufferEvent::HistoryStart => {
                    reaction.status = Some("No further undo information".into());
                    self.damage |= Damage::STATUS;
                }
                BufferEvent::HistoryEnd => {
                    reaction.status = Some("No further redo information".into());
                    self.damage |= Damage::STATUS;
                }
                BufferEvent::Save => {
                    self.damage |= Damage::STATUS;
                }
            }
        }
        // Deleting the line the cursor sat on can leave a stale line id
        // even without a cursor rewrite; resync defensively.
        if reaction.redraw && !adjust_cursor {
            self.damage = Damage::all();
        }
        reaction
    }

    fn on_insert_adjust_top_line(&mut self, a: &core_buffer::Action) {
        if a.cursor.line_num < self.top_line_num && !a.lines.is_empty() {
            // lines appeared above the viewport
            self.top_line_num += a.lines.len();
            self.damage |= Damage::STATUS;
        }
    }

    fn on_delete_adjust_top_line(&mut self, buf: &Buffer, a: &core_buffer::Action) {
        if a.cursor.line_num >= self.top_line_num || a.lines.is_empty() {
            return;
        }
        let (first, last) = a.deleted_lines();
        if first <= self.top_line_num && self.top_line_num <= last {
            // the top line itself was deleted
            match buf.arena()[a.cursor.line].next {
                Some(next) => {
                    self.top_line = next;
                    self.top_line_num = a.cursor.line_num + 1;
                }
                None => {
                    self.top_line = a.cursor.line;
                    self.top_line_num = a.cursor.line_num;
                }
            }
            self.damage = Damage::all();
        } else {
            self.top_line_num -= a.lines.len();
            self.damage |= Damage::STATUS;
        }
    }

    // ------------------------------------------------------------------
    // drawing
    // ------------------------------------------------------------------

    /// Repaint whatever the damage bits call for.
    pub fn draw(&mut self, buf: &Buffer) {
        if self.damage.contains(Damage::CONTENTS) {
            self.damage.remove(Damage::CONTENTS);
            self.draw_contents(buf);
        }
        if self.damage.contains(Damage::STATUS) {
            self.damage.remove(Damage::STATUS);
            self.draw_status(buf);
        }
    }

    fn draw_contents(&mut self, buf: &Buffer) {
        if self.highlight.is_empty() {
            self.highlight_ranges.clear();
        }
        self.cells.clear();
        if self.width() == 0 || self.cells.height() == 0 {
            return;
        }
        let mut line = Some(self.top_line);
        for y in 0..self.height() {
            let Some(id) = line else { break };
            let voffset = if id == self.cursor.line {
                self.line_voffset
            } else {
                0
            };
            self.draw_line(buf, id, self.top_line_num + y, y, voffset);
            line = buf.arena()[id].next;
        }
    }

    fn draw_line(&mut self, buf: &Buffer, id: LineId, line_num: usize, y: usize, line_voffset: usize) {
        if !self.highlight.is_empty() {
            self.find_highlight_ranges_for_line(&buf.arena()[id].data);
        }
        let w = self.width() as isize;
        let lv = line_voffset as isize;
        let tab = self.opts.tabstop as isize;
        let mut x: isize = 0;
        let mut tabstop: isize = 0;
        let mut bx: usize = 0;
        let mut data = &buf.arena()[id].data[..];

        loop {
            let rx = x - lv;
            if data.is_empty() {
                break;
            }
            if x == tabstop {
                tabstop += tab;
            }
            if rx >= w {
                // content continues past the right edge
                self.cells
                    .set(w as usize - 1, y, Cell::new('→'));
                break;
            }

            let Some((r, rlen)) = rune::decode_rune(data) else {
                break;
            };
            match r {
                '\t' => {
                    while x < tabstop {
                        let rx = x - lv;
                        if rx >= w {
                            break;
                        }
                        if rx >= 0 {
                            let cell = self.make_cell(line_num, bx, ' ');
                            self.cells.set(rx as usize, y, cell);
                        }
                        x += 1;
                    }
                }
                r if (r as u32) < 32 => {
                    if rx >= 0 {
                        self.cells
                            .set(rx as usize, y, Cell::new('^').fg(Color::Red));
                    }
                    x += 1;
                    let rx = x - lv;
                    if rx >= w {
                        // second half of the picture is clipped
                    } else {
                        if rx >= 0 {
                            let pic = width::control_picture(r as u8);
                            self.cells
                                .set(rx as usize, y, Cell::new(pic).fg(Color::Red));
                        }
                        x += 1;
                    }
                }
                _ => {
                    if rx >= 0 {
                        let cell = self.make_cell(line_num, bx, r);
                        self.cells.set(rx as usize, y, cell);
                    }
                    x += 1;
                }
            }
            data = &data[rlen..];
            bx += rlen;
        }

        if line_voffset != 0 {
            self.cells.set(0, y, Cell::new('←'));
        }
    }

    fn draw_status(&mut self, buf: &Buffer) {
        if self.cells.height() == 0 {
            return;
        }
        let y = self.height();
        let w = self.width();
        let rule = Cell::new('─').attrs(CellAttrs::REVERSE);
        for x in 0..w {
            self.cells.set(x, y, rule);
        }
        if !buf.synced_with_disk() {
            let star = Cell::new('*').attrs(CellAttrs::REVERSE);
            self.cells.set(1, y, star);
            self.cells.set(2, y, star);
        }
        let name = format!("  {}  ", buf.name);
        self.cells.draw_label(
            5,
            y,
            &name,
            Color::Reset,
            Color::Reset,
            CellAttrs::REVERSE | CellAttrs::BOLD,
        );
        let pos = format!("({}, {})  ", self.cursor.line_num, self.cursor_voffset);
        self.cells.draw_label(
            5 + name.chars().count(),
            y,
            &pos,
            Color::Reset,
            Color::Reset,
            CellAttrs::REVERSE,
        );
    }

    fn make_cell(&self, line_num: usize, offset: usize, ch: char) -> Cell {
        if let Some(sel) = &self.selection {
            if sel.includes(line_num, offset) {
                return Cell::new(ch).fg(sel.fg).bg(sel.bg).attrs(sel.attrs);
            }
        }
        for t in &self.tags {
            if t.includes(line_num, offset) {
                return Cell::new(ch).fg(t.fg).bg(t.bg).attrs(t.attrs);
            }
        }
        let mut cell = Cell::new(ch);
        if self.in_highlight_range(offset) {
            cell.fg = HL_FG;
            cell.bg = HL_BG;
        }
        cell
    }

    fn find_highlight_ranges_for_line(&mut self, data: &[u8]) {
        self.highlight_ranges.clear();
        let needle = &self.highlight;
        if needle.is_empty() || data.len() < needle.len() {
            return;
        }
        let mut offset = 0;
        while offset + needle.len() <= data.len() {
            match data[offset..]
                .windows(needle.len())
                .position(|win| win == needle.as_slice())
            {
                Some(i) => {
                    let begin = offset + i;
                    self.highlight_ranges.push(ByteRange {
                        begin,
                        end: begin + needle.len(),
                    });
                    offset = begin + needle.len();
                }
                None => break,
            }
        }
    }

    fn in_highlight_range(&self, offset: usize) -> bool {
        self.highlight_ranges.iter().any(|r| r.includes(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_str(s: &str) -> Buffer {
        Buffer::from_reader(s.as_bytes()).unwrap()
    }

    fn cursor_at(b: &Buffer, line_num: usize, boffset: usize) -> Cursor {
        let mut id = b.first_line();
        for _ in 1..line_num {
            id = b.arena()[id].next.unwrap();
        }
        Cursor::new(id, line_num, boffset)
    }

    fn opts(vt: usize, ht: usize) -> ViewOptions {
        ViewOptions {
            vertical_threshold: vt,
            horizontal_threshold: ht,
            tabstop: 8,
        }
    }

    #[test]
    fn horizontal_scroll_keeps_cursor_in_band() {
        // width 10, hthreshold 3, cursor at offset 15
        let mut buf = from_str("0123456789ABCDEF");
        let mut v = View::new(0, &mut buf, opts(5, 3));
        v.resize(&buf, 10, 2);
        v.move_cursor_to(&buf, cursor_at(&buf, 1, 15));
        assert_eq!(v.line_voffset(), 8);
        assert_eq!(v.cursor_position(), (7, 0));

        v.draw(&buf);
        let row = v.cells().row_text(0);
        assert_eq!(row.chars().next(), Some('←'));
        // nothing beyond 'F': no continuation marker
        assert!(!row.contains('→'));
    }

    #[test]
    fn truncation_marker_when_content_continues() {
        let mut buf = from_str("0123456789ABCDEFGH");
        let mut v = View::new(0, &mut buf, opts(5, 3));
        v.resize(&buf, 10, 2);
        v.draw(&buf);
        let row = v.cells().row_text(0);
        assert_eq!(row, "012345678→");
    }

    #[test]
    fn scroll_left_restores_zero_voffset() {
        let mut buf = from_str("0123456789ABCDEF");
        let mut v = View::new(0, &mut buf, opts(5, 3));
        v.resize(&buf, 10, 2);
        v.move_cursor_to(&buf, cursor_at(&buf, 1, 15));
        assert!(v.line_voffset() > 0);
        v.move_cursor_to(&buf, cursor_at(&buf, 1, 0));
        assert_eq!(v.line_voffset(), 0);
        assert_eq!(v.cursor_position(), (0, 0));
    }

    #[test]
    fn vertical_scroll_follows_cursor() {
        let text: String = (1..=30).map(|i| format!("line {i}\n")).collect();
        let mut buf = from_str(&text);
        let mut v = View::new(0, &mut buf, opts(2, 10));
        v.resize(&buf, 20, 11); // 10 text rows

        for _ in 0..10 {
            assert!(v.move_cursor_next_line(&buf));
        }
        // cursor on line 11, height 10, vt 2: top must have scrolled
        assert_eq!(v.cursor().line_num, 11);
        assert_eq!(v.top_line_num(), 4);

        v.move_cursor_to(&buf, cursor_at(&buf, 1, 0));
        assert_eq!(v.top_line_num(), 1);
    }

    #[test]
    fn sticky_column_over_short_lines() {
        let mut buf = from_str("long line here\nab\nanother long line");
        let mut v = View::new(0, &mut buf, opts(5, 10));
        v.resize(&buf, 40, 5);
        v.move_cursor_to(&buf, cursor_at(&buf, 1, 10));
        assert!(v.move_cursor_next_line(&buf));
        // clamped to the short line's end
        assert_eq!(v.cursor().boffset, 2);
        assert!(v.move_cursor_next_line(&buf));
        // slides back out to the sticky column
        assert_eq!(v.cursor().boffset, 10);
    }

    #[test]
    fn view_scroll_drags_cursor_inside_band() {
        let text: String = (1..=40).map(|i| format!("l{i}\n")).collect();
        let mut buf = from_str(&text);
        let mut v = View::new(0, &mut buf, opts(2, 10));
        v.resize(&buf, 10, 11);
        v.move_view_lines(&buf, 20);
        assert_eq!(v.top_line_num(), 21);
        assert!(v.cursor().line_num >= 21 + 2);
        // page motion stops dead when the distance is unavailable
        let top = v.top_line_num();
        v.maybe_move_view_lines(&buf, 100);
        assert_eq!(v.top_line_num(), top);
    }

    #[test]
    fn insert_above_view_adjusts_top_line() {
        let text: String = (1..=30).map(|i| format!("line {i}\n")).collect();
        let mut buf = from_str(&text);
        let mut v = View::new(0, &mut buf, opts(2, 10));
        v.resize(&buf, 20, 6);
        v.move_cursor_to(&buf, cursor_at(&buf, 20, 0));
        let top_before = v.top_line_num();
        assert!(top_before > 1);

        // another actor inserts two lines at the very top
        buf.insert(cursor_at(&buf, 1, 0), b"x\ny\n".to_vec());
        let r = v.handle_buffer_events(&buf, true);
        assert!(r.redraw);
        assert_eq!(v.top_line_num(), top_before + 2);
        assert_eq!(v.cursor().line_num, 22);
    }

    #[test]
    fn delete_above_view_adjusts_top_line() {
        let text: String = (1..=30).map(|i| format!("line {i}\n")).collect();
        let mut buf = from_str(&text);
        let mut v = View::new(0, &mut buf, opts(2, 10));
        v.resize(&buf, 20, 6);
        v.move_cursor_to(&buf, cursor_at(&buf, 20, 0));
        let top_before = v.top_line_num();

        // delete lines 1-2 entirely
        buf.delete(cursor_at(&buf, 1, 0), 14);
        let r = v.handle_buffer_events(&buf, true);
        assert!(r.redraw);
        assert_eq!(v.top_line_num(), top_before - 2);
        assert_eq!(v.cursor().line_num, 18);
    }

    #[test]
    fn boundary_events_set_status() {
        let mut buf = from_str("x");
        let mut v = View::new(0, &mut buf, ViewOptions::default());
        v.resize(&buf, 10, 3);
        buf.notify_boundary(false);
        let r = v.handle_buffer_events(&buf, true);
        assert_eq!(r.status.as_deref(), Some("End of buffer"));
        buf.undo();
        let r = v.handle_buffer_events(&buf, true);
        assert_eq!(r.status.as_deref(), Some("No further undo information"));
    }

    #[test]
    fn status_bar_shows_name_and_modified_marker() {
        let mut buf = from_str("hello");
        buf.name = "scratch".into();
        let mut v = View::new(0, &mut buf, ViewOptions::default());
        v.resize(&buf, 30, 3);
        v.draw(&buf);
        let status = v.cells().row_text(2);
        assert!(status.contains("scratch"));
        assert!(!status.contains('*'));

        buf.insert_rune(buf.start(), 'x');
        v.handle_buffer_events(&buf, true);
        v.draw(&buf);
        let status = v.cells().row_text(2);
        assert!(status.contains("**"));
    }

    #[test]
    fn control_bytes_render_as_pictures() {
        let mut buf = Buffer::new_empty();
        buf.insert(buf.start(), vec![b'a', 0x01, b'b']);
        let mut v = View::new(0, &mut buf, ViewOptions::default());
        v.resize(&buf, 10, 2);
        v.draw(&buf);
        assert_eq!(v.cells().row_text(0), "a^Ab      ");
        let caret = v.cells().get(1, 0).unwrap();
        assert_eq!(caret.fg, Color::Red);
    }

    #[test]
    fn tabs_expand_to_tab_stops() {
        let mut buf = from_str("a\tb");
        let mut v = View::new(0, &mut buf, ViewOptions::default());
        v.resize(&buf, 12, 2);
        v.draw(&buf);
        assert_eq!(v.cells().row_text(0), "a       b   ");
    }

    #[test]
    fn highlight_ranges_paint_matches() {
        let mut buf = from_str("foo bar foo");
        let mut v = View::new(0, &mut buf, ViewOptions::default());
        v.resize(&buf, 15, 2);
        v.set_highlight(Some(b"foo".to_vec()));
        v.draw(&buf);
        assert_eq!(v.cells().get(0, 0).unwrap().fg, HL_FG);
        assert_eq!(v.cells().get(4, 0).unwrap().fg, Color::Reset);
        assert_eq!(v.cells().get(8, 0).unwrap().fg, HL_FG);
    }

    #[test]
    fn selection_tag_reverses_cells() {
        let mut buf = from_str("hello world");
        let mut v = View::new(0, &mut buf, ViewOptions::default());
        v.resize(&buf, 15, 2);
        v.set_selection(Some(ViewTag::selection(1, 2, 1, 5)));
        v.draw(&buf);
        assert!(v.cells().get(2, 0).unwrap().attrs.contains(CellAttrs::REVERSE));
        assert!(v.cells().get(4, 0).unwrap().attrs.contains(CellAttrs::REVERSE));
        assert!(!v.cells().get(5, 0).unwrap().attrs.contains(CellAttrs::REVERSE));
    }
}
