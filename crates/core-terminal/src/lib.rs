//! Terminal backend: raw-mode lifecycle, cell-surface presentation and the
//! input poller thread.
//!
//! The terminal is a process-wide resource. It is acquired once at startup
//! and must be released on every exit path, including panics: the handle's
//! drop restores cooked mode and the main screen, and suspend re-acquires
//! on resume.

use std::io::{Write, stdout};

use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};

use core_render::{CellAttrs, CellBuffer};

mod input;
pub use input::spawn_input_thread;

pub struct Terminal {
    entered: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal {
    pub fn new() -> Terminal {
        Terminal { entered: false }
    }

    pub fn enter(&mut self) -> Result<()> {
        if !self.entered {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            self.entered = true;
        }
        Ok(())
    }

    pub fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), LeaveAlternateScreen, Show)?;
            disable_raw_mode()?;
            self.entered = false;
        }
        Ok(())
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        Ok(crossterm::terminal::size()?)
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Flush a full frame: every cell of `cells`, then the hardware cursor.
    /// Styles are batched; a new escape sequence is emitted only when the
    /// cell style changes.
    pub fn present(&mut self, cells: &CellBuffer, cursor: Option<(u16, u16)>) -> Result<()> {
        let mut out = stdout();
        queue!(out, Hide)?;
        let mut style = (Color::Reset, Color::Reset, CellAttrs::empty());
        queue!(
            out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(style.0),
            SetBackgroundColor(style.1)
        )?;
        for y in 0..cells.height() {
            queue!(out, MoveTo(0, y as u16))?;
            for x in 0..cells.width() {
                let Some(cell) = cells.get(x, y) else { continue };
                let next = (cell.fg, cell.bg, cell.attrs);
                if next != style {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                    if cell.attrs.contains(CellAttrs::BOLD) {
                        queue!(out, SetAttribute(Attribute::Bold))?;
                    }
                    if cell.attrs.contains(CellAttrs::REVERSE) {
                        queue!(out, SetAttribute(Attribute::Reverse))?;
                    }
                    queue!(out, SetForegroundColor(cell.fg), SetBackgroundColor(cell.bg))?;
                    style = next;
                }
                queue!(out, Print(cell.ch))?;
            }
        }
        if let Some((x, y)) = cursor {
            queue!(out, MoveTo(x, y), Show)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Stop the process (unix job control). Restores the terminal first and
    /// re-enters raw mode when the process resumes.
    pub fn suspend(&mut self) -> Result<()> {
        #[cfg(unix)]
        {
            self.leave()?;
            nix::sys::signal::raise(nix::sys::signal::Signal::SIGTSTP)?;
            // execution resumes here after SIGCONT
            self.enter()?;
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
