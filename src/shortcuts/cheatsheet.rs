//! Read-only projections of the registry for display.
//!
//! The cheat sheet folds alias-expanded variants back into the symbolic combo
//! the caller most likely wrote; scope info lists every concrete entry.

use std::collections::BTreeMap;

use serde::Serialize;

use super::aliases::{collapse_aliases, expand_aliases};
use super::registry::{Shortcut, ShortcutRegistry};
use super::scope::ScopeStack;
use super::types::Combo;

const SIMULTANEOUS_SEPARATOR: &str = " + ";
const SEQUENCE_SEPARATOR: &str = " → ";

/// One logical shortcut as shown to a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheatSheetEntry {
    pub id: String,
    /// Display strings, e.g. `"CTRL + S"` or `"G → D"`
    pub keys: Vec<String>,
    pub data: BTreeMap<String, String>,
    pub hold: bool,
    pub sequential: bool,
    /// True while at least one variant is enabled
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutSummary {
    /// Concrete keys, upper-cased
    pub keys: Vec<String>,
    pub id: String,
    pub enabled: bool,
    pub data: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInfo {
    pub shortcuts: Vec<ShortcutSummary>,
    pub is_active: bool,
}

fn stored_form(combo: Combo, sequential: bool) -> Combo {
    if sequential {
        combo
    } else {
        combo.deduplicated()
    }
}

/// Display combos for one id group.
///
/// A concrete combo collapses to its symbolic form only when every variant
/// that form expands to is registered under the same id.
fn display_combos(group: &[&Shortcut]) -> Vec<Combo> {
    let mut out: Vec<Combo> = Vec::new();
    for shortcut in group {
        let sequential = shortcut.is_sequential();
        let symbolic = collapse_aliases(&shortcut.combo);
        let complete = expand_aliases(&symbolic)
            .into_iter()
            .map(|c| stored_form(c, sequential))
            .all(|variant| group.iter().any(|s| s.combo == variant));

        let shown = if complete {
            stored_form(symbolic, sequential)
        } else {
            shortcut.combo.clone()
        };
        if !out.contains(&shown) {
            out.push(shown);
        }
    }
    out
}

/// Summarize the shortcuts of `scope`, one entry per id, in registration order.
pub fn cheat_sheet(registry: &ShortcutRegistry, scope: &str) -> Vec<CheatSheetEntry> {
    let mut groups: Vec<(&str, Vec<&Shortcut>)> = Vec::new();
    for shortcut in registry.in_scope(scope) {
        match groups.iter_mut().find(|(id, _)| *id == shortcut.id) {
            Some((_, members)) => members.push(shortcut),
            None => groups.push((shortcut.id.as_str(), vec![shortcut])),
        }
    }

    let mut entries: Vec<CheatSheetEntry> = Vec::new();
    for (id, members) in groups {
        let Some(first) = members.first() else {
            continue;
        };
        let separator = if first.is_sequential() {
            SEQUENCE_SEPARATOR
        } else {
            SIMULTANEOUS_SEPARATOR
        };
        let entry = CheatSheetEntry {
            id: id.to_string(),
            keys: display_combos(&members)
                .iter()
                .map(|c| c.display_with(separator))
                .collect(),
            data: first.data.clone(),
            hold: first.is_hold(),
            sequential: first.is_sequential(),
            enabled: members.iter().any(|s| s.enabled),
        };
        if !entries.contains(&entry) {
            entries.push(entry);
        }
    }
    entries
}

/// Per-scope listing of every stored shortcut, optionally limited to one scope.
pub fn scopes_info(
    registry: &ShortcutRegistry,
    scopes: &ScopeStack,
    filter: Option<&str>,
) -> BTreeMap<String, ScopeInfo> {
    let mut info: BTreeMap<String, ScopeInfo> = BTreeMap::new();
    for shortcut in registry.iter() {
        if filter.is_some_and(|f| f != shortcut.scope) {
            continue;
        }
        let entry = info
            .entry(shortcut.scope.clone())
            .or_insert_with(|| ScopeInfo {
                shortcuts: Vec::new(),
                is_active: scopes.active() == shortcut.scope,
            });
        entry.shortcuts.push(ShortcutSummary {
            keys: shortcut
                .combo
                .iter()
                .map(|k| k.as_str().to_uppercase())
                .collect(),
            id: shortcut.id.clone(),
            enabled: shortcut.enabled,
            data: shortcut.data.clone(),
        });
    }
    info
}
