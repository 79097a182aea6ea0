//! Shortcut Scope - scoped keyboard shortcut matching
//!
//! This library turns a stream of physical key events into shortcut
//! activations. Shortcuts are grouped into named scopes; only the scope on top
//! of the scope stack is live. Three matching styles are supported: plain
//! simultaneous combos, hold shortcuts with press/release phases, and key
//! sequences within a time window.

pub mod config;
pub mod error;
pub mod event_source;
pub mod logging;
pub mod manager;
pub mod shortcut_set;
pub mod shortcuts;

pub use error::{Result, ResultExt, ShortcutError};
pub use event_source::{ChannelEventSource, KeyEvent, KeyEventKind, KeyEventSender, KeyEventSource};
pub use manager::{ManagerMode, ManagerOptions, SharedManager, ShortcutManager};
pub use shortcut_set::{ShortcutDecl, ShortcutSet};
pub use shortcuts::{
    Binding, CheatSheetEntry, Combo, DispatchOutcome, FiredShortcut, HoldState, Key, ScopeInfo,
    ShortcutHandler, ShortcutOptions, TriggerOn, TypingEvent,
};
