//! Cell surface primitives.
//!
//! Views paint into an off-screen [`CellBuffer`]; the editor composites
//! those through the view tree into one root buffer which the terminal
//! backend flushes. Colors are crossterm's, attributes a small flag set of
//! what the status bars and highlights actually use.

pub use crossterm::style::Color;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellAttrs: u8 {
        const BOLD    = 0b01;
        const REVERSE = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub attrs: CellAttrs,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            fg: Color::Reset,
            bg: Color::Reset,
            attrs: CellAttrs::empty(),
        }
    }
}

impl Cell {
    pub fn new(ch: char) -> Cell {
        Cell {
            ch,
            ..Cell::default()
        }
    }

    pub fn fg(mut self, fg: Color) -> Cell {
        self.fg = fg;
        self
    }

    pub fn bg(mut self, bg: Color) -> Cell {
        self.bg = bg;
        self
    }

    pub fn attrs(mut self, attrs: CellAttrs) -> Cell {
        self.attrs = attrs;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

/// A dense width×height grid of cells.
#[derive(Debug, Clone)]
pub struct CellBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub fn new(width: usize, height: usize) -> CellBuffer {
        CellBuffer {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, Cell::default());
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        if x < self.width && y < self.height {
            Some(&mut self.cells[y * self.width + x])
        } else {
            None
        }
    }

    pub fn fill(&mut self, r: Rect, cell: Cell) {
        for y in r.y..(r.y + r.height).min(self.height) {
            for x in r.x..(r.x + r.width).min(self.width) {
                self.cells[y * self.width + x] = cell;
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Copy `src` into this buffer with its top-left corner at `(r.x, r.y)`,
    /// clipped to `r` and to both buffers.
    pub fn blit(&mut self, r: Rect, src: &CellBuffer) {
        let h = r.height.min(src.height);
        let w = r.width.min(src.width);
        for y in 0..h {
            if r.y + y >= self.height {
                break;
            }
            for x in 0..w {
                if r.x + x >= self.width {
                    break;
                }
                self.cells[(r.y + y) * self.width + (r.x + x)] = src.cells[y * src.width + x];
            }
        }
    }

    /// Write a text label starting at `(x, y)`, clipped to the row.
    pub fn draw_label(&mut self, x: usize, y: usize, text: &str, fg: Color, bg: Color, attrs: CellAttrs) {
        let mut cx = x;
        for ch in text.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg, bg, attrs });
            cx += 1;
        }
    }

    /// Row contents as a string, for assertions.
    pub fn row_text(&self, y: usize) -> String {
        (0..self.width)
            .map(|x| self.cells[y * self.width + x].ch)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_and_get() {
        let mut b = CellBuffer::new(4, 2);
        b.fill(Rect::new(1, 0, 2, 2), Cell::new('x'));
        assert_eq!(b.row_text(0), " xx ");
        assert_eq!(b.row_text(1), " xx ");
        assert_eq!(b.get(0, 0).unwrap().ch, ' ');
        assert!(b.get(4, 0).is_none());
    }

    #[test]
    fn blit_clips_to_destination() {
        let mut dst = CellBuffer::new(4, 2);
        let mut src = CellBuffer::new(3, 3);
        src.fill(Rect::new(0, 0, 3, 3), Cell::new('#'));
        dst.blit(Rect::new(2, 1, 3, 3), &src);
        assert_eq!(dst.row_text(0), "    ");
        assert_eq!(dst.row_text(1), "  ##");
    }

    #[test]
    fn resize_clears_content() {
        let mut b = CellBuffer::new(2, 2);
        b.set(0, 0, Cell::new('q'));
        b.resize(3, 1);
        assert_eq!(b.row_text(0), "   ");
        assert_eq!(b.width(), 3);
        assert_eq!(b.height(), 1);
    }

    #[test]
    fn labels_clip_at_the_edge() {
        let mut b = CellBuffer::new(5, 1);
        b.draw_label(3, 0, "abc", Color::Reset, Color::Reset, CellAttrs::empty());
        assert_eq!(b.row_text(0), "   ab");
    }
}
