//! Raw keyboard events and the sources that deliver them.
//!
//! The matching engine never talks to a platform directly. A host wires its
//! keyboard stream into a [`KeyEventSource`]; the manager attaches to it on
//! construction, drains it with `pump()`, and detaches on `clear()`.

use std::cell::Cell;
use std::time::Instant;

use serde::Deserialize;

use crate::error::{Result, ShortcutError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    Down,
    Up,
}

/// One raw key-down or key-up notification.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    /// Physical key code, e.g. `"KeyA"` or `"ControlLeft"`
    pub code: String,
    /// Logical key as typed, e.g. `"a"` or `"A"`; published to typing listeners
    pub key: String,
    /// Auto-repeat from a held key (key-down only)
    pub repeat: bool,
    pub timestamp: Instant,
    default_prevented: Cell<bool>,
}

impl KeyEvent {
    pub fn new(kind: KeyEventKind, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            kind,
            key: code.clone(),
            code,
            repeat: false,
            timestamp: Instant::now(),
            default_prevented: Cell::new(false),
        }
    }

    pub fn down(code: impl Into<String>) -> Self {
        Self::new(KeyEventKind::Down, code)
    }

    pub fn up(code: impl Into<String>) -> Self {
        Self::new(KeyEventKind::Up, code)
    }

    pub fn repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Ask the host to suppress the platform's default action for this event.
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// A stream of raw key events.
pub trait KeyEventSource {
    /// Start delivering events. Called when the manager starts listening.
    fn attach(&mut self) -> Result<()>;
    /// Stop delivering events. Must be idempotent.
    fn detach(&mut self);
    /// Next pending event, if any. Never blocks.
    fn poll_event(&mut self) -> Option<KeyEvent>;
}

/// Sending half paired with a [`ChannelEventSource`]; cheap to clone and `Send`.
#[derive(Clone)]
pub struct KeyEventSender {
    tx: async_channel::Sender<KeyEvent>,
}

impl KeyEventSender {
    /// Queue an event. Fails once the source side has been dropped.
    pub fn send(&self, event: KeyEvent) -> Result<()> {
        self.tx
            .try_send(event)
            .map_err(|e| ShortcutError::EventSource(e.to_string()))
    }

    /// Blocking send for producer threads (bounded channels wait for room).
    pub fn send_blocking(&self, event: KeyEvent) -> Result<()> {
        self.tx
            .send_blocking(event)
            .map_err(|e| ShortcutError::EventSource(e.to_string()))
    }
}

/// Event source fed through an `async_channel`.
///
/// Events queued while detached are discarded on the next poll.
pub struct ChannelEventSource {
    rx: async_channel::Receiver<KeyEvent>,
    attached: bool,
}

impl ChannelEventSource {
    pub fn unbounded() -> (KeyEventSender, Self) {
        let (tx, rx) = async_channel::unbounded();
        (KeyEventSender { tx }, Self { rx, attached: false })
    }

    /// Bounded channel; producers using `send_blocking` wait for room.
    pub fn bounded(capacity: usize) -> (KeyEventSender, Self) {
        let (tx, rx) = async_channel::bounded(capacity);
        (KeyEventSender { tx }, Self { rx, attached: false })
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl KeyEventSource for ChannelEventSource {
    fn attach(&mut self) -> Result<()> {
        if self.rx.is_closed() && self.rx.is_empty() {
            return Err(ShortcutError::EventSource(
                "event channel closed before attach".to_string(),
            ));
        }
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn poll_event(&mut self) -> Option<KeyEvent> {
        if !self.attached {
            while self.rx.try_recv().is_ok() {}
            return None;
        }
        self.rx.try_recv().ok()
    }
}
