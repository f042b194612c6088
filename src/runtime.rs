use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::warn;

/// Unified event type consumed by the app
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Text committed in one go (bracketed paste or an input method)
    Paste(String),
    FocusGained,
    FocusLost,
    Resize,
    Tick,
}

fn translate(event: CtEvent) -> Option<AppEvent> {
    match event {
        // key release events would double count keystrokes on some platforms
        CtEvent::Key(key) if key.kind != KeyEventKind::Release => Some(AppEvent::Key(key)),
        CtEvent::Paste(text) => Some(AppEvent::Paste(text)),
        CtEvent::FocusGained => Some(AppEvent::FocusGained),
        CtEvent::FocusLost => Some(AppEvent::FocusLost),
        CtEvent::Resize(_, _) => Some(AppEvent::Resize),
        _ => None,
    }
}

/// Reads the terminal on a background thread and forwards what the app cares
/// about. The thread exits once the receiver is dropped or the read fails.
pub fn spawn_terminal_reader() -> Receiver<AppEvent> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || loop {
        let event = match event::read() {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "terminal read failed");
                break;
            }
        };
        if let Some(event) = translate(event) {
            if tx.send(event).is_err() {
                break;
            }
        }
    });

    rx
}

/// Hands events to the draw loop, turning quiet periods into ticks so the
/// screen still refreshes while nobody types
#[derive(Debug)]
pub struct EventPump {
    events: Receiver<AppEvent>,
    tick: Duration,
}

impl EventPump {
    pub fn new(events: Receiver<AppEvent>, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// Waits at most one tick for the next event
    pub fn next_event(&self) -> AppEvent {
        self.events.recv_timeout(self.tick).unwrap_or(AppEvent::Tick)
    }
}
