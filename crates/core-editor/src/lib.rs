//! The editor: buffer list, cut buffers, view tree, modal dispatch and the
//! cooperative main loop.
//!
//! One thread owns every buffer, view and mode. The loop selects over
//! three channels: ui events from the terminal poller, commands from modes
//! (or external agents), and redraw notifications from views reacting to
//! buffer events. After any of the three fires, queued ui events and
//! commands are drained without re-entering the select, views pump their
//! buffer-event mailboxes, and the frame is rendered.

mod command;
mod cutbuffer;
mod mode;

pub use command::{Command, CommandClass, CommandError, Dir};
pub use cutbuffer::CutBuffers;
pub use mode::Mode;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use core_buffer::{Buffer, Cursor};
use core_events::{COMMAND_CHANNEL_CAP, REDRAW_CHANNEL_CAP, KeyEvent, UiEvent};
use core_render::{Cell, CellAttrs, CellBuffer, Color, Rect};
use core_terminal::Terminal;
use core_view::{NodeId, View, ViewOptions, ViewTag, ViewTree};

/// Receiving ends of the editor's own channels, consumed by [`Editor::run`].
pub struct EditorChannels {
    pub commands: mpsc::Receiver<Command>,
    pub redraw: mpsc::Receiver<()>,
}

enum Flow {
    Continue,
    Quit,
}

pub struct Editor {
    buffers: Vec<Buffer>,
    cut_buffers: CutBuffers,
    tree: ViewTree,
    active: NodeId,
    status: String,
    mode: Option<Mode>,
    opts: ViewOptions,
    cells: CellBuffer,

    pub last_search: Option<String>,
    quit: bool,
    want_suspend: bool,
    last_cmd_class: CommandClass,
    /// Set while the applied command already positioned the active view's
    /// cursor, so the event pump must not adjust it a second time.
    self_positioned: bool,

    commands_tx: mpsc::Sender<Command>,
    redraw_tx: mpsc::Sender<()>,
}

impl Editor {
    pub fn new(files: &[PathBuf], config: &core_config::Config) -> (Editor, EditorChannels) {
        let opts = ViewOptions {
            vertical_threshold: config.scroll.vertical_threshold,
            horizontal_threshold: config.scroll.horizontal_threshold,
            tabstop: config.text.tabstop.max(1),
        };
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAP);
        let (redraw_tx, redraw_rx) = mpsc::channel(REDRAW_CHANNEL_CAP);

        let mut status = String::new();
        let mut buffers: Vec<Buffer> = Vec::new();
        for file in files {
            match load_buffer(file) {
                Ok((buf, fresh)) => {
                    if buffers
                        .iter()
                        .any(|b| b.path.is_some() && b.path == buf.path)
                    {
                        continue;
                    }
                    let mut buf = buf;
                    buf.name = unique_name(&buffers, &file.display().to_string());
                    if fresh {
                        status = "(New file)".into();
                    }
                    buffers.push(buf);
                }
                Err(err) => status = format!("{}: {err}", file.display()),
            }
        }
        if buffers.is_empty() {
            let mut buf = Buffer::new_empty();
            buf.name = "unnamed".into();
            buffers.push(buf);
        }

        let view = View::new(0, &mut buffers[0], opts);
        let tree = ViewTree::new(view);
        let active = tree.root();
        info!(target: "editor", buffers = buffers.len(), "editor_created");

        let editor = Editor {
            buffers,
            cut_buffers: CutBuffers::new(),
            tree,
            active,
            status,
            mode: Some(Mode::default()),
            opts,
            cells: CellBuffer::new(0, 0),
            last_search: None,
            quit: false,
            want_suspend: false,
            last_cmd_class: CommandClass::Misc,
            self_positioned: false,
            commands_tx,
            redraw_tx,
        };
        (
            editor,
            EditorChannels {
                commands: commands_rx,
                redraw: redraw_rx,
            },
        )
    }

    /// Sender usable by agents outside the key-dispatch path.
    pub fn command_sender(&self) -> mpsc::Sender<Command> {
        self.commands_tx.clone()
    }

    // ------------------------------------------------------------------
    // accessors
    // ------------------------------------------------------------------

    pub fn active_view(&self) -> &View {
        self.tree.view(self.active)
    }

    pub(crate) fn active_view_mut(&mut self) -> &mut View {
        self.tree.view_mut(self.active)
    }

    pub fn active_buffer(&self) -> &Buffer {
        &self.buffers[self.active_view().buffer]
    }

    pub(crate) fn active_buffer_mut(&mut self) -> &mut Buffer {
        let idx = self.tree.view(self.active).buffer;
        &mut self.buffers[idx]
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn view_count(&self) -> usize {
        self.tree.leaves().len()
    }

    /// Screen rectangle of the active pane.
    pub fn active_rect(&self) -> Rect {
        self.tree.rect(self.active)
    }

    pub(crate) fn view_and_buffer(&mut self) -> (&mut View, &Buffer) {
        let Editor {
            tree,
            buffers,
            active,
            ..
        } = self;
        let view = tree.view_mut(*active);
        let idx = view.buffer;
        (view, &buffers[idx])
    }

    pub(crate) fn view_and_buffer_mut(&mut self) -> (&mut View, &mut Buffer) {
        let Editor {
            tree,
            buffers,
            active,
            ..
        } = self;
        let view = tree.view_mut(*active);
        let idx = view.buffer;
        (view, &mut buffers[idx])
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
    }

    pub(crate) fn request_quit(&mut self) {
        self.set_status("Quit");
        self.quit = true;
    }

    pub(crate) fn finalize_active(&mut self) {
        self.active_buffer_mut().finalize_action_group();
    }

    pub(crate) fn replay_last_action(&mut self, times: usize) {
        self.active_buffer_mut().replay_last_action(times);
    }

    // ------------------------------------------------------------------
    // command plumbing
    // ------------------------------------------------------------------

    /// Queue a command for the main loop. When the queue is full the
    /// command is applied inline rather than dropped.
    pub fn enqueue(&mut self, command: Command) {
        use tokio::sync::mpsc::error::TrySendError;
        match self.commands_tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                warn!(target: "editor.loop", "command_queue_full");
                self.apply(command);
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }

    /// Apply one command, finalizing the open undo group on class changes.
    pub fn apply(&mut self, command: Command) {
        let class = command.class();
        if class != self.last_cmd_class || class == CommandClass::Misc {
            self.finalize_active();
        }
        self.last_cmd_class = class;
        if command.positions_cursor() {
            self.self_positioned = true;
        }
        command.apply(self);
    }

    /// Key entry point: reset the status line, run system chords, hand the
    /// event to the current mode.
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status.clear();
        if key.is_ctrl('q') {
            self.request_quit();
        }
        if key.is_ctrl('z') {
            self.want_suspend = true;
        }
        let mode = self.mode.take().unwrap_or_default();
        let next = mode.on_key(self, key);
        self.mode = Some(next);
    }

    fn handle_ui_event(&mut self, event: UiEvent, term: &mut Terminal) -> Result<Flow> {
        match event {
            UiEvent::Key(key) => {
                self.handle_key(key);
                if self.want_suspend {
                    self.want_suspend = false;
                    term.suspend()?;
                    term.clear()?;
                    let (w, h) = term.size()?;
                    self.resize(w as usize, h as usize);
                }
                if self.quit {
                    return Ok(Flow::Quit);
                }
            }
            UiEvent::Resize(w, h) => {
                term.clear()?;
                self.resize(w as usize, h as usize);
            }
            UiEvent::Error(msg) => anyhow::bail!("terminal error: {msg}"),
        }
        Ok(Flow::Continue)
    }

    /// Drain each view's buffer-event mailbox, collecting damage and
    /// status text, and signal a redraw when anything changed.
    pub fn pump_views(&mut self) {
        let mut redraw = false;
        let mut status = None;
        for id in self.tree.leaves() {
            let adjust = !(id == self.active && self.self_positioned);
            let Editor { tree, buffers, .. } = self;
            let view = tree.view_mut(id);
            let reaction = view.handle_buffer_events(&buffers[view.buffer], adjust);
            redraw |= reaction.redraw;
            if reaction.status.is_some() {
                status = reaction.status;
            }
        }
        self.self_positioned = false;
        if let Some(s) = status {
            self.status = s;
        }
        if redraw {
            let _ = self.redraw_tx.try_send(());
        }
    }

    // ------------------------------------------------------------------
    // buffers and files
    // ------------------------------------------------------------------

    /// Open `path` into the active view, re-using an already-open buffer
    /// with the same absolute path.
    pub(crate) fn open_file(&mut self, path: &str) -> Result<()> {
        let abs = std::path::absolute(path)?;
        let existing = self
            .buffers
            .iter()
            .position(|b| b.path.as_deref() == Some(abs.as_path()));
        let idx = match existing {
            Some(i) => i,
            None => {
                let (mut buf, fresh) = load_buffer(&abs)?;
                if fresh {
                    self.set_status("(New file)");
                }
                buf.name = unique_name(&self.buffers, path);
                self.buffers.push(buf);
                self.buffers.len() - 1
            }
        };
        let old = self.tree.view(self.active).buffer;
        if old != idx {
            let Editor {
                tree,
                buffers,
                active,
                ..
            } = self;
            let view = tree.view_mut(*active);
            let (old_buf, new_buf) = index_twice(buffers, old, idx);
            view.attach(idx, old_buf, new_buf);
        }
        debug!(target: "io", path = %abs.display(), buffer = idx, "file_opened");
        Ok(())
    }

    pub(crate) fn save_active(&mut self, path: Option<PathBuf>) {
        let idx = self.tree.view(self.active).buffer;
        let result = match &path {
            Some(p) => {
                let abs = std::path::absolute(p).unwrap_or_else(|_| p.clone());
                let r = self.buffers[idx].save_as(&abs);
                if r.is_ok() && self.buffers[idx].name == "unnamed" {
                    let name = unique_name(&self.buffers, &p.display().to_string());
                    self.buffers[idx].name = name;
                }
                r
            }
            None => self.buffers[idx].save(),
        };
        if let Err(err) = result {
            self.set_status(format!("error: {err}"));
        }
    }

    pub(crate) fn delete_range(&mut self, from: Cursor, to: Cursor) {
        let (view, buf) = self.view_and_buffer_mut();
        let (c1, c2) = Cursor::sort(from, to);
        let d = c1.distance(buf.arena(), c2);
        if d <= 0 {
            return;
        }
        let removed = c1.extract_bytes(buf.arena(), d as usize);
        buf.delete(c1, d as usize);
        view.move_cursor_to(buf, c1);
        self.cut_buffers.update_anon(removed);
    }

    pub fn cut_buffers(&self) -> &CutBuffers {
        &self.cut_buffers
    }

    // ------------------------------------------------------------------
    // visual selection
    // ------------------------------------------------------------------

    pub(crate) fn apply_visual_selection(&mut self, anchor: Cursor, line_mode: bool) {
        let (view, buf) = self.view_and_buffer();
        let cursor = view.cursor();
        let (a, b) = Cursor::sort(anchor, cursor);
        let tag = if line_mode {
            ViewTag::selection(a.line_num, 0, b.line_num, usize::MAX)
        } else {
            let end = match b.rune_under(buf.arena()) {
                Some((_, rlen)) => b.boffset + rlen,
                None => b.boffset + 1,
            };
            ViewTag::selection(a.line_num, a.boffset, b.line_num, end)
        };
        view.set_selection(Some(tag));
    }

    pub(crate) fn sync_visual_selection(&mut self) {
        let state = self.mode.as_ref().and_then(|m| m.visual_state());
        if let Some((anchor, line_mode)) = state {
            self.apply_visual_selection(anchor, line_mode);
        }
    }

    // ------------------------------------------------------------------
    // panes
    // ------------------------------------------------------------------

    pub(crate) fn split_vertically(&mut self) {
        if self.tree.rect(self.active).width == 0 {
            return;
        }
        let idx = self.tree.view(self.active).buffer;
        let view = View::new(idx, &mut self.buffers[idx], self.opts);
        self.active = self.tree.split_vertically(self.active, view);
        self.relayout();
    }

    pub(crate) fn split_horizontally(&mut self) {
        if self.tree.rect(self.active).height == 0 {
            return;
        }
        let idx = self.tree.view(self.active).buffer;
        let view = View::new(idx, &mut self.buffers[idx], self.opts);
        self.active = self.tree.split_horizontally(self.active, view);
        self.relayout();
    }

    pub(crate) fn kill_active_view(&mut self) {
        if let Some((mut view, active)) = self.tree.kill(self.active, &self.buffers) {
            view.detach(&mut self.buffers[view.buffer]);
            self.active = active;
            self.relayout();
        }
    }

    pub(crate) fn activate_nearest_v_split(&mut self, dir: i32) {
        if let Some(id) = self.tree.nearest_v_split(self.active, dir) {
            self.active = id;
        }
    }

    pub(crate) fn activate_nearest_h_split(&mut self, dir: i32) {
        if let Some(id) = self.tree.nearest_h_split(self.active, dir) {
            self.active = id;
        }
    }

    // ------------------------------------------------------------------
    // layout and rendering
    // ------------------------------------------------------------------

    pub fn resize(&mut self, w: usize, h: usize) {
        self.cells.resize(w, h);
        self.relayout();
    }

    fn relayout(&mut self) {
        let area = Rect::new(
            0,
            0,
            self.cells.width(),
            self.cells.height().saturating_sub(1),
        );
        let root = self.tree.root();
        self.tree.resize(root, area, &self.buffers);
    }

    /// Paint every view and composite the frame into the root surface.
    /// Exposed separately from `render` so tests can inspect the cells.
    pub fn render_surface(&mut self) -> &CellBuffer {
        for id in self.tree.leaves() {
            let Editor { tree, buffers, .. } = self;
            let view = tree.view_mut(id);
            view.draw(&buffers[view.buffer]);
        }
        self.cells.clear();
        self.composite();
        let h = self.cells.height();
        if h > 0 {
            let text = self
                .mode
                .as_ref()
                .and_then(|m| m.overlay_line())
                .unwrap_or_else(|| self.status.clone());
            self.cells.draw_label(
                0,
                h - 1,
                &text,
                Color::Reset,
                Color::Reset,
                CellAttrs::empty(),
            );
        }
        &self.cells
    }

    fn composite(&mut self) {
        for id in self.tree.leaves() {
            let rect = self.tree.rect(id);
            self.cells.blit(rect, self.tree.view(id).cells());
        }
        for id in self.tree.internal_nodes() {
            if let Some(col) = self.tree.splitter_column(id) {
                self.cells
                    .fill(col, Cell::new('│').attrs(CellAttrs::REVERSE));
                if col.height > 0 {
                    self.cells.set(
                        col.x,
                        col.y + col.height - 1,
                        Cell::new('┴').attrs(CellAttrs::REVERSE),
                    );
                }
            }
        }
        self.fix_edges();
    }

    /// Patch the junction glyphs where splitter columns meet status bars.
    fn fix_edges(&mut self) {
        for id in self.tree.internal_nodes() {
            let Some(col) = self.tree.splitter_column(id) else {
                continue;
            };
            if col.y > 0 {
                if let Some(cell) = self.cells.get_mut(col.x, col.y - 1) {
                    match cell.ch {
                        '─' => cell.ch = '┬',
                        '┴' => cell.ch = '┼',
                        _ => {}
                    }
                }
            }
        }
        for id in self.tree.leaves() {
            let r = self.tree.rect(id);
            if r.height == 0 {
                continue;
            }
            let y = r.y + r.height - 1;
            if r.x > 0 {
                if let Some(cell) = self.cells.get_mut(r.x - 1, y) {
                    match cell.ch {
                        '│' => cell.ch = '├',
                        '┤' => cell.ch = '┼',
                        _ => {}
                    }
                }
            }
            if let Some(cell) = self.cells.get_mut(r.x + r.width, y) {
                match cell.ch {
                    '│' => cell.ch = '┤',
                    '├' => cell.ch = '┼',
                    _ => {}
                }
            }
        }
    }

    /// Screen position of the hardware cursor: the overlay's when one is
    /// active, the active view's otherwise.
    pub fn cursor_screen_position(&self) -> (usize, usize) {
        if let Some(pos) = self
            .mode
            .as_ref()
            .and_then(|m| m.overlay_cursor(self.cells.height()))
        {
            return pos;
        }
        let rect = self.tree.rect(self.active);
        let (x, y) = self.active_view().cursor_position();
        (rect.x + x, rect.y + y)
    }

    fn render(&mut self, term: &mut Terminal) -> Result<()> {
        if self.cells.width() == 0 || self.cells.height() == 0 {
            return Ok(());
        }
        self.render_surface();
        let (x, y) = self.cursor_screen_position();
        term.present(&self.cells, Some((x as u16, y as u16)))
    }

    // ------------------------------------------------------------------
    // main loop
    // ------------------------------------------------------------------

    pub async fn run(
        &mut self,
        mut ui_rx: mpsc::Receiver<UiEvent>,
        channels: EditorChannels,
        term: &mut Terminal,
    ) -> Result<()> {
        let EditorChannels {
            commands: mut commands_rx,
            redraw: mut redraw_rx,
        } = channels;

        let (w, h) = term.size()?;
        self.resize(w as usize, h as usize);
        self.render(term)?;

        loop {
            tokio::select! {
                maybe = ui_rx.recv() => {
                    let Some(mut event) = maybe else { return Ok(()) };
                    // Consume queued ui events before redrawing so paste
                    // storms cannot starve the renderer.
                    loop {
                        if let Flow::Quit = self.handle_ui_event(event, term)? {
                            return Ok(());
                        }
                        match ui_rx.try_recv() {
                            Ok(next) => event = next,
                            Err(_) => break,
                        }
                    }
                }
                Some(command) = commands_rx.recv() => {
                    self.apply(command);
                }
                _ = redraw_rx.recv() => {}
            }
            while let Ok(command) = commands_rx.try_recv() {
                self.apply(command);
            }
            self.pump_views();
            if self.quit {
                return Ok(());
            }
            self.render(term)?;
        }
    }
}

/// Load a buffer from disk; a missing file yields an empty buffer flagged
/// as fresh. The stored path is absolute.
fn load_buffer(path: &Path) -> io::Result<(Buffer, bool)> {
    let abs = std::path::absolute(path)?;
    match std::fs::File::open(&abs) {
        Ok(f) => {
            let mut buf = Buffer::from_reader(io::BufReader::new(f))?;
            buf.path = Some(abs);
            Ok((buf, false))
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut buf = Buffer::new_empty();
            buf.path = Some(abs);
            Ok((buf, true))
        }
        Err(err) => Err(err),
    }
}

/// Display names are unique within the editor; collisions get ` <2>`,
/// ` <3>`, ... suffixes.
fn unique_name(buffers: &[Buffer], want: &str) -> String {
    let taken = |name: &str| buffers.iter().any(|b| b.name == name);
    if !taken(want) {
        return want.to_string();
    }
    for i in 2..9999 {
        let candidate = format!("{want} <{i}>");
        if !taken(&candidate) {
            return candidate;
        }
    }
    panic!("too many buffers opened with the same name");
}

fn index_twice<T>(v: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = v.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = v.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
