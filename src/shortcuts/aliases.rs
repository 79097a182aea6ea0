//! Symbolic modifier expansion.
//!
//! A binding written with `ctrl` must match either physical control key, so
//! registration expands every symbolic modifier into its concrete variants and
//! stores one combo per element of the Cartesian product.

use super::types::{Combo, Key};

/// Symbolic modifier -> concrete physical variants.
static KEY_ALIASES: &[(&str, &[&str])] = &[
    ("ctrl", &["ctrl (left)", "ctrl (right)"]),
    ("shift", &["shift (left)", "shift (right)"]),
    ("alt", &["alt (left)", "alt (right)"]),
    ("meta", &["meta (left)", "meta (right)", "cmd"]),
];

/// Concrete variants of a symbolic key, or `None` for a concrete key.
pub fn alias_variants(key: &Key) -> Option<&'static [&'static str]> {
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| key == alias)
        .map(|(_, variants)| *variants)
}

/// Symbolic name a concrete key variant belongs to, if any.
pub fn symbolic_alias(key: &Key) -> Option<&'static str> {
    KEY_ALIASES
        .iter()
        .find(|(_, variants)| variants.iter().any(|v| key == v))
        .map(|(alias, _)| *alias)
}

/// Expand every symbolic key into its variants, preserving key order.
///
/// An empty combo yields exactly one empty combo.
pub fn expand_aliases(combo: &Combo) -> Vec<Combo> {
    let mut expanded = vec![Combo::default()];

    for key in combo {
        let next = match alias_variants(key) {
            Some(variants) => expanded
                .iter()
                .flat_map(|prefix| {
                    variants.iter().map(move |variant| {
                        let mut c = prefix.clone();
                        c.push(Key::new(variant));
                        c
                    })
                })
                .collect(),
            None => expanded
                .into_iter()
                .map(|mut c| {
                    c.push(key.clone());
                    c
                })
                .collect(),
        };
        expanded = next;
    }

    expanded
}

/// Replace every concrete variant with its symbolic name.
pub fn collapse_aliases(combo: &Combo) -> Combo {
    combo
        .iter()
        .map(|key| match symbolic_alias(key) {
            Some(alias) => Key::new(alias),
            None => key.clone(),
        })
        .collect()
}
