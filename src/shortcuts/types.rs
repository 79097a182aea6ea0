//! Core shortcut types.
//!
//! This module provides:
//! - `Key` - A canonical lowercase key name (`"ctrl (left)"`, `"a"`, `"f5"`)
//! - `Combo` - An ordered list of keys forming one concrete trigger
//! - `Binding` - One combo or a list of alternative combos sharing a handler
//! - `ShortcutOptions` - Per-registration configuration

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A canonical key name.
///
/// Equality is exact string equality after canonicalization, so `Key::new("Ctrl")`
/// and `Key::new("control")` are the same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(String);

impl Key {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(canonicalize_key(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Canonicalize a key name to the internal standard form.
///
/// Lower-cases the name and folds common spellings onto one name. Symbolic
/// modifiers stay symbolic (`"control"` becomes `"ctrl"`, not `"ctrl (left)"`).
pub fn canonicalize_key(key: &str) -> String {
    if key == " " {
        return "space".to_string();
    }
    let key_lower = key.trim().to_lowercase();
    match key_lower.as_str() {
        "control" | "ctl" => "ctrl",
        "option" | "opt" => "alt",
        "command" | "super" | "win" => "meta",
        "escape" => "esc",
        "return" => "enter",
        "spacebar" => "space",
        "del" => "delete",
        "arrowup" | "up" => "arrow up",
        "arrowdown" | "down" => "arrow down",
        "arrowleft" | "left" => "arrow left",
        "arrowright" | "right" => "arrow right",
        "pageup" | "pgup" => "page up",
        "pagedown" | "pgdn" | "pgdown" => "page down",
        "capslock" => "caps lock",
        _ => return key_lower,
    }
    .to_string()
}

/// An ordered sequence of keys that together define one concrete trigger.
///
/// Order matters for sequential shortcuts; simultaneous and hold shortcuts only
/// test membership.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Combo(SmallVec<[Key; 4]>);

impl Combo {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Key> {
        self.0.first()
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.0.contains(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Key> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// Drop repeated keys, keeping the first occurrence of each.
    pub fn deduplicated(&self) -> Combo {
        let mut out = Combo::default();
        for key in &self.0 {
            if !out.contains(key) {
                out.push(key.clone());
            }
        }
        out
    }

    /// Join the keys for display, e.g. `"CTRL + S"` or `"G → D"`.
    pub fn display_with(&self, separator: &str) -> String {
        self.0
            .iter()
            .map(|k| k.as_str().to_uppercase())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.0.iter().map(Key::as_str).collect();
        write!(f, "{}", parts.join(" + "))
    }
}

impl FromIterator<Key> for Combo {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Combo {
    type Item = &'a Key;
    type IntoIter = std::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<const N: usize> From<[&str; N]> for Combo {
    fn from(keys: [&str; N]) -> Self {
        Combo::new(keys)
    }
}

impl From<&[&str]> for Combo {
    fn from(keys: &[&str]) -> Self {
        Combo::new(keys.iter().copied())
    }
}

impl From<Vec<&str>> for Combo {
    fn from(keys: Vec<&str>) -> Self {
        Combo::new(keys)
    }
}

impl From<Vec<String>> for Combo {
    fn from(keys: Vec<String>) -> Self {
        Combo::new(keys)
    }
}

/// What a caller registers: one combo or several alternatives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    Single(Combo),
    Multiple(Vec<Combo>),
}

impl Binding {
    pub fn multiple<I, C>(combos: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Combo>,
    {
        Binding::Multiple(combos.into_iter().map(Into::into).collect())
    }

    pub fn combos(&self) -> &[Combo] {
        match self {
            Binding::Single(combo) => std::slice::from_ref(combo),
            Binding::Multiple(combos) => combos,
        }
    }

    /// True when no alternative carries any key.
    pub fn is_empty(&self) -> bool {
        self.combos().iter().all(Combo::is_empty)
    }
}

impl From<Combo> for Binding {
    fn from(combo: Combo) -> Self {
        Binding::Single(combo)
    }
}

impl From<Vec<Combo>> for Binding {
    fn from(combos: Vec<Combo>) -> Self {
        Binding::Multiple(combos)
    }
}

impl<const N: usize> From<[&str; N]> for Binding {
    fn from(keys: [&str; N]) -> Self {
        Binding::Single(keys.into())
    }
}

impl From<&[&str]> for Binding {
    fn from(keys: &[&str]) -> Self {
        Binding::Single(keys.into())
    }
}

impl From<Vec<&str>> for Binding {
    fn from(keys: Vec<&str>) -> Self {
        Binding::Single(keys.into())
    }
}

impl From<Vec<String>> for Binding {
    fn from(keys: Vec<String>) -> Self {
        Binding::Single(keys.into())
    }
}

/// Phase reported to hold handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldState {
    Down,
    Up,
}

/// Which key transition fires a simultaneous shortcut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerOn {
    #[default]
    #[serde(rename = "keydown")]
    KeyDown,
    #[serde(rename = "keyup")]
    KeyUp,
}

/// Matching algorithm used for a shortcut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShortcutKind {
    Simultaneous,
    Hold,
    Sequential,
}

/// Per-registration configuration.
///
/// Unset fields fall back to the manager defaults: the active scope,
/// key-down triggering and the configured sequence delay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShortcutOptions {
    pub scope: Option<String>,
    pub trigger_on: TriggerOn,
    pub hold: bool,
    pub sequential: bool,
    pub sequence_delay: Option<Duration>,
    pub prevent_default: bool,
    pub repeat: bool,
    /// Free-form metadata. An `"id"` entry becomes the shortcut id.
    pub data: BTreeMap<String, String>,
}

impl ShortcutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn trigger_on(mut self, trigger_on: TriggerOn) -> Self {
        self.trigger_on = trigger_on;
        self
    }

    pub fn on_key_up(self) -> Self {
        self.trigger_on(TriggerOn::KeyUp)
    }

    pub fn hold(mut self) -> Self {
        self.hold = true;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.sequential = true;
        self
    }

    pub fn sequence_delay(mut self, delay: Duration) -> Self {
        self.sequence_delay = Some(delay);
        self
    }

    pub fn prevent_default(mut self) -> Self {
        self.prevent_default = true;
        self
    }

    pub fn repeat(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Caller-supplied stable id, if any.
    pub fn id(&self) -> Option<&str> {
        self.data.get("id").map(String::as_str)
    }

    pub fn kind(&self) -> ShortcutKind {
        if self.hold {
            ShortcutKind::Hold
        } else if self.sequential {
            ShortcutKind::Sequential
        } else {
            ShortcutKind::Simultaneous
        }
    }
}
