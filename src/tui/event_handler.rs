use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::mpsc::Sender;
use std::thread;

/// One unit of work for the session's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    Key(KeyEvent),
    /// Typed characters or a bracketed paste.
    Text(String),
    Resize,
    /// The match engine has new results.
    Wakeup,
    /// The terminal stopped delivering input.
    InputClosed,
    /// SIGINT, SIGTERM or SIGHUP arrived.
    Terminated,
}

/// Printable keys become text; releases and mouse/focus events are dropped.
pub fn translate(event: Event) -> Option<LoopEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(match key_text(&key) {
            Some(c) => LoopEvent::Text(c.to_string()),
            None => LoopEvent::Key(key),
        }),
        Event::Paste(text) => Some(LoopEvent::Text(text)),
        Event::Resize(_, _) => Some(LoopEvent::Resize),
        _ => None,
    }
}

fn key_text(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if (key.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}

/// Forward terminal input to the loop until the receiver goes away.
pub fn spawn_input_thread(tx: Sender<LoopEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("choose-files-input".to_string())
        .spawn(move || {
            loop {
                match event::read() {
                    Ok(ev) => {
                        if let Some(ev) = translate(ev) {
                            if tx.send(ev).is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        log::error!("failed to read terminal input: {e}");
                        let _ = tx.send(LoopEvent::InputClosed);
                        break;
                    }
                }
            }
        })
        .map(|_| ())
}
