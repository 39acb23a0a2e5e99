//! Blocking input poller.
//!
//! One OS thread reads crossterm events and pushes normalized [`UiEvent`]s
//! into the bounded ui-event channel with `blocking_send`: under a paste
//! storm the thread parks instead of dropping keystrokes. The thread owns
//! no editor state and exits when the consumer closes the channel.

use crossterm::event::{
    Event as CEvent, KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind, KeyModifiers,
};
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use core_events::{KeyCode, KeyEvent, Modifiers, UiEvent};

pub fn spawn_input_thread(tx: Sender<UiEvent>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        debug!(target: "input.thread", "input_thread_started");
        loop {
            let event = match crossterm::event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    warn!(target: "input.thread", error = %e, "poll_error");
                    let _ = tx.blocking_send(UiEvent::Error(e.to_string()));
                    break;
                }
            };
            let Some(event) = translate(event) else {
                continue;
            };
            if tx.blocking_send(event).is_err() {
                // consumer gone; the editor is shutting down
                break;
            }
        }
        debug!(target: "input.thread", "input_thread_stopped");
    })
}

fn translate(event: CEvent) -> Option<UiEvent> {
    match event {
        CEvent::Key(key) => translate_key(key).map(UiEvent::Key),
        CEvent::Resize(w, h) => Some(UiEvent::Resize(w, h)),
        _ => None,
    }
}

fn translate_key(key: CKeyEvent) -> Option<KeyEvent> {
    // Some platforms report key releases; only presses and repeats count.
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let code = match key.code {
        CKeyCode::Char(c) => KeyCode::Char(c),
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };
    let mut mods = Modifiers::empty();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        mods |= Modifiers::CTRL;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        mods |= Modifiers::ALT;
    }
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    Some(KeyEvent::new(code, mods))
}
