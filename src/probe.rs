use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::score::Clock;
use crate::session::SharedSession;

/// Answers whether the user is still engaged with the input surface
pub trait FocusSource: Send + Sync + 'static {
    fn is_focused(&self) -> bool;
}

/// Focus flag flipped by the UI on terminal focus events
#[derive(Clone, Debug)]
pub struct FocusFlag(Arc<AtomicBool>);

impl FocusFlag {
    pub fn new(focused: bool) -> Self {
        Self(Arc::new(AtomicBool::new(focused)))
    }

    pub fn set(&self, focused: bool) {
        self.0.store(focused, Ordering::Relaxed);
    }
}

impl Default for FocusFlag {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FocusSource for FocusFlag {
    fn is_focused(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Periodically checks a focus source and suspends scoring while unfocused.
///
/// The focus source is read while the session lock is held, so a refocus
/// followed by a keystroke can never be undone by a stale reading.
#[derive(Debug)]
pub struct FocusProbe {
    shutdown: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FocusProbe {
    pub fn spawn<C, F>(session: SharedSession<C>, focus: F, interval: Duration) -> Self
    where
        C: Clock,
        F: FocusSource,
    {
        let (shutdown, signal) = mpsc::channel();

        let handle = thread::spawn(move || {
            debug!(interval_ms = interval.as_millis() as u64, "focus probe started");
            while let Err(RecvTimeoutError::Timeout) = signal.recv_timeout(interval) {
                let mut session = session.lock();
                if !focus.is_focused() {
                    trace!("input not focused");
                    session.on_focus_lost();
                }
            }
            debug!("focus probe stopped");
        });

        Self {
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop probing and wait for the probe thread to exit
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FocusProbe {
    fn drop(&mut self) {
        self.stop();
    }
}
