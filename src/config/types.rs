//! Configuration type definitions
//!
//! This module contains all the struct and enum definitions for keymap files.
//!
//! ```json
//! {
//!   "sequenceDelayMs": 800,
//!   "scopes": [
//!     {
//!       "name": "editor",
//!       "shortcuts": [
//!         { "keys": ["ctrl", "s"], "action": "save", "preventDefault": true },
//!         { "keys": [["ctrl", "k"], ["meta", "k"]], "action": "palette" },
//!         { "keys": ["g", "d"], "action": "goto-definition", "sequential": true }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;
use crate::shortcuts::{Binding, Combo, ShortcutOptions, TriggerOn};

// ============================================
// ROOT CONFIG
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Suppress diagnostic output (default: false)
    #[serde(default = "default_silent")]
    pub silent: bool,
    /// Default window for sequential shortcuts in milliseconds (default: 1000)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_delay_ms: Option<u64>,
    /// Declared scopes, mounted in order
    #[serde(default)]
    pub scopes: Vec<ScopeConfig>,
}

fn default_silent() -> bool {
    DEFAULT_SILENT
}

impl Config {
    /// Returns the sequence delay, falling back to the default if not configured or zero.
    pub fn get_sequence_delay(&self) -> Duration {
        Duration::from_millis(
            self.sequence_delay_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_SEQUENCE_DELAY_MS),
        )
    }

    pub fn shortcut_count(&self) -> usize {
        self.scopes.iter().map(|s| s.shortcuts.len()).sum()
    }
}

// ============================================
// SCOPES
// ============================================

/// A named scope and the shortcuts declared for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeConfig {
    pub name: String,
    /// Register the shortcuts but keep them disabled (default: false)
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub shortcuts: Vec<ShortcutConfig>,
}

// ============================================
// SHORTCUTS
// ============================================

/// One combo (`["ctrl", "s"]`) or several alternatives (`[["ctrl", "k"], ["meta", "k"]]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeysConfig {
    Single(Vec<String>),
    Multiple(Vec<Vec<String>>),
}

impl KeysConfig {
    pub fn to_binding(&self) -> Binding {
        match self {
            KeysConfig::Single(keys) => Binding::Single(Combo::new(keys)),
            KeysConfig::Multiple(combos) => {
                Binding::Multiple(combos.iter().map(|keys| Combo::new(keys)).collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutConfig {
    pub keys: KeysConfig,
    /// Action name reported when the shortcut fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub hold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_delay_ms: Option<u64>,
    #[serde(default)]
    pub trigger_on: TriggerOn,
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub prevent_default: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl ShortcutConfig {
    /// Registration options; the scope is left to the declaring scope.
    pub fn to_options(&self) -> ShortcutOptions {
        let mut data = self.data.clone();
        if let Some(action) = &self.action {
            data.entry("action".to_string())
                .or_insert_with(|| action.clone());
        }
        ShortcutOptions {
            scope: None,
            trigger_on: self.trigger_on,
            hold: self.hold,
            sequential: self.sequential,
            sequence_delay: self.sequence_delay_ms.map(Duration::from_millis),
            prevent_default: self.prevent_default,
            repeat: self.repeat,
            data,
        }
    }
}
