//! Scoped keyboard shortcut matching.
//!
//! This module provides:
//! - Canonical key names and alias expansion (`ctrl` matches either control key)
//! - A scope stack deciding which shortcuts are live
//! - The registry and the real-time matching engine
//! - Cheat-sheet and label projections for display
//!
//! # Architecture
//!
//! Registration expands every symbolic modifier into concrete physical
//! variants, so matching is a plain membership test against the pressed-key
//! set. Only shortcuts in the active scope (top of the stack) are considered:
//! - Hold shortcuts fire `Down` when armed and `Up` on release of any member key
//! - Sequential shortcuts fire when keys arrive in order inside a time window
//! - Otherwise the longest fully-pressed simultaneous combo fires
//!
//! # Example
//!
//! ```ignore
//! use shortcut_scope::shortcuts::{MatchEngine, ShortcutHandler, ShortcutOptions};
//!
//! let mut engine = MatchEngine::default();
//! engine.registry_mut().register(
//!     &["ctrl", "s"].into(),
//!     ShortcutHandler::press(|_| Ok(())),
//!     &ShortcutOptions::new(),
//!     "global",
//!     std::time::Duration::from_millis(1000),
//! )?;
//! ```

mod aliases;
mod cheatsheet;
mod emitter;
mod engine;
mod keys;
mod label;
mod registry;
mod scope;
mod types;

pub use aliases::{alias_variants, collapse_aliases, expand_aliases, symbolic_alias};
pub use cheatsheet::{cheat_sheet, scopes_info, CheatSheetEntry, ScopeInfo, ShortcutSummary};
pub use emitter::{Emitter, Subscription};
pub use engine::{DispatchOutcome, FiredCallback, FiredShortcut, MatchEngine, TypingEvent};
pub use keys::normalize_key;
pub use label::{key_label, shortcut_label, shortcut_label_with, Platform};
pub use registry::{Shortcut, ShortcutHandler, ShortcutRegistry};
pub use scope::ScopeStack;
pub use types::{
    canonicalize_key, Binding, Combo, HoldState, Key, ShortcutKind, ShortcutOptions, TriggerOn,
};
