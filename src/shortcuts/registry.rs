//! Shortcut table with Vec storage.
//!
//! Uses Vec for deterministic iteration order: registration order is the
//! tie-break order for equal-length matches, and re-registering an entry moves
//! it to the end.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use super::aliases::expand_aliases;
use super::types::{Binding, Combo, HoldState, ShortcutKind, ShortcutOptions, TriggerOn};
use crate::config::DEFAULT_SEQUENCE_DELAY_MS;
use crate::error::{Result, ShortcutError};
use crate::event_source::KeyEvent;

type PressFn = dyn FnMut(&KeyEvent) -> anyhow::Result<()>;
type HoldFn = dyn FnMut(&KeyEvent, HoldState) -> anyhow::Result<()>;

#[derive(Clone)]
enum HandlerFn {
    Press(Rc<RefCell<PressFn>>),
    Hold(Rc<RefCell<HoldFn>>),
}

/// Callback invoked when a shortcut fires.
///
/// Cloning is cheap and shares the underlying closure, which is how every
/// alias-expanded variant of one registration ends up calling the same handler.
#[derive(Clone)]
pub struct ShortcutHandler(HandlerFn);

impl ShortcutHandler {
    /// Handler that ignores the hold phase.
    ///
    /// On a hold shortcut it runs for both the down and the up transition.
    pub fn press<F>(handler: F) -> Self
    where
        F: FnMut(&KeyEvent) -> anyhow::Result<()> + 'static,
    {
        Self(HandlerFn::Press(Rc::new(RefCell::new(handler))))
    }

    /// Handler that receives the hold phase.
    ///
    /// On a non-hold shortcut it always receives [`HoldState::Down`].
    pub fn hold<F>(handler: F) -> Self
    where
        F: FnMut(&KeyEvent, HoldState) -> anyhow::Result<()> + 'static,
    {
        Self(HandlerFn::Hold(Rc::new(RefCell::new(handler))))
    }

    pub(crate) fn invoke(&self, event: &KeyEvent, state: HoldState) -> anyhow::Result<()> {
        match &self.0 {
            HandlerFn::Press(f) => {
                let mut f = f
                    .try_borrow_mut()
                    .map_err(|_| anyhow::anyhow!("handler re-entered while running"))?;
                (*f)(event)
            }
            HandlerFn::Hold(f) => {
                let mut f = f
                    .try_borrow_mut()
                    .map_err(|_| anyhow::anyhow!("handler re-entered while running"))?;
                (*f)(event, state)
            }
        }
    }
}

impl fmt::Debug for ShortcutHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            HandlerFn::Press(_) => f.write_str("ShortcutHandler::Press"),
            HandlerFn::Hold(_) => f.write_str("ShortcutHandler::Hold"),
        }
    }
}

/// One concrete registered trigger.
#[derive(Clone, Debug)]
pub struct Shortcut {
    /// Shared by every combo produced from one registration
    pub id: String,
    pub combo: Combo,
    pub scope: String,
    pub kind: ShortcutKind,
    pub trigger_on: TriggerOn,
    pub sequence_delay: Duration,
    pub prevent_default: bool,
    pub repeat: bool,
    pub data: BTreeMap<String, String>,
    pub enabled: bool,
    pub(crate) handler: ShortcutHandler,
}

impl Shortcut {
    pub fn is_hold(&self) -> bool {
        self.kind == ShortcutKind::Hold
    }

    pub fn is_sequential(&self) -> bool {
        self.kind == ShortcutKind::Sequential
    }

    pub fn is_simultaneous(&self) -> bool {
        self.kind == ShortcutKind::Simultaneous
    }
}

/// Expand a lookup combo into the concrete combos it may have been stored as.
///
/// Lookups cannot know whether the target is sequential, so both the raw and
/// the de-duplicated form of every variant are returned.
fn lookup_variants(combo: &Combo) -> Vec<Combo> {
    let mut variants = Vec::new();
    for expanded in expand_aliases(combo) {
        let deduped = expanded.deduplicated();
        if deduped != expanded {
            variants.push(deduped);
        }
        variants.push(expanded);
    }
    variants
}

/// The table of registered shortcuts.
#[derive(Debug, Default)]
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `binding` in `scope`, returning the shortcut id.
    ///
    /// Every alternative combo is alias-expanded and stored once per concrete
    /// variant. An entry with the same id, combo and scope is replaced and
    /// moves to the end of the table.
    pub fn register(
        &mut self,
        binding: &Binding,
        handler: ShortcutHandler,
        options: &ShortcutOptions,
        scope: &str,
        default_delay: Duration,
    ) -> Result<String> {
        if binding.is_empty() {
            return Err(ShortcutError::EmptyBinding);
        }

        let id = options
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let kind = options.kind();
        // A zero window could never complete a sequence; treat it as unset
        let delay = [options.sequence_delay, Some(default_delay)]
            .into_iter()
            .flatten()
            .find(|d| !d.is_zero())
            .unwrap_or(Duration::from_millis(DEFAULT_SEQUENCE_DELAY_MS));

        for combo in binding.combos().iter().filter(|c| !c.is_empty()) {
            for expanded in expand_aliases(combo) {
                let concrete = match kind {
                    ShortcutKind::Sequential => expanded,
                    _ => expanded.deduplicated(),
                };

                self.shortcuts
                    .retain(|s| !(s.id == id && s.scope == scope && s.combo == concrete));

                debug!(
                    category = "SHORTCUTS",
                    shortcut_id = %id,
                    combo = %concrete,
                    scope = %scope,
                    "Registered shortcut"
                );

                self.shortcuts.push(Shortcut {
                    id: id.clone(),
                    combo: concrete,
                    scope: scope.to_string(),
                    kind,
                    trigger_on: options.trigger_on,
                    sequence_delay: delay,
                    prevent_default: options.prevent_default,
                    repeat: options.repeat,
                    data: options.data.clone(),
                    enabled: true,
                    handler: handler.clone(),
                });
            }
        }

        Ok(id)
    }

    /// Remove every shortcut in `scope` stored under any variant of `combo`.
    pub fn unregister(&mut self, combo: &Combo, scope: &str) -> usize {
        let variants = lookup_variants(combo);
        let before = self.shortcuts.len();
        self.shortcuts
            .retain(|s| !(s.scope == scope && variants.contains(&s.combo)));
        before - self.shortcuts.len()
    }

    /// Apply `update` to the enabled flag of every shortcut in `scope` stored
    /// under any variant of `combo`, regardless of id. Returns the match count.
    pub fn update_enabled(
        &mut self,
        combo: &Combo,
        scope: &str,
        update: impl Fn(bool) -> bool,
    ) -> usize {
        let variants = lookup_variants(combo);
        let mut matched = 0;
        for shortcut in self
            .shortcuts
            .iter_mut()
            .filter(|s| s.scope == scope && variants.contains(&s.combo))
        {
            shortcut.enabled = update(shortcut.enabled);
            matched += 1;
        }
        matched
    }

    /// Set the enabled flag for every shortcut, or only those in `scope`.
    pub fn set_all_enabled(&mut self, scope: Option<&str>, enabled: bool) -> usize {
        let mut matched = 0;
        for shortcut in self
            .shortcuts
            .iter_mut()
            .filter(|s| scope.map_or(true, |scope| s.scope == scope))
        {
            shortcut.enabled = enabled;
            matched += 1;
        }
        matched
    }

    pub fn get(&self, index: usize) -> Option<&Shortcut> {
        self.shortcuts.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shortcut> {
        self.shortcuts.iter()
    }

    /// Shortcuts stored in `scope`, in registration order.
    pub fn in_scope<'a>(&'a self, scope: &'a str) -> impl Iterator<Item = &'a Shortcut> + 'a {
        self.shortcuts.iter().filter(move |s| s.scope == scope)
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }

    pub fn clear(&mut self) {
        self.shortcuts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn noop() -> ShortcutHandler {
        ShortcutHandler::press(|_| Ok(()))
    }

    fn register(
        registry: &mut ShortcutRegistry,
        binding: impl Into<Binding>,
        options: ShortcutOptions,
        scope: &str,
    ) -> String {
        registry
            .register(
                &binding.into(),
                noop(),
                &options,
                scope,
                Duration::from_millis(1000),
            )
            .unwrap()
    }

    #[test]
    fn test_register_expands_aliases_under_one_id() {
        let mut registry = ShortcutRegistry::new();
        let id = register(&mut registry, ["ctrl", "s"], ShortcutOptions::new(), "global");

        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(|s| s.id == id));
        let combos: Vec<String> = registry.iter().map(|s| s.combo.to_string()).collect();
        assert_eq!(combos, vec!["ctrl (left) + s", "ctrl (right) + s"]);
    }

    #[test]
    fn test_register_meta_expands_to_three_variants() {
        let mut registry = ShortcutRegistry::new();
        register(&mut registry, ["meta", "k"], ShortcutOptions::new(), "global");
        assert_eq!(registry.len(), 3);
        assert!(registry.iter().any(|s| s.combo == Combo::from(["cmd", "k"])));
    }

    #[test]
    fn test_reregister_same_id_replaces_entry() {
        let mut registry = ShortcutRegistry::new();
        let opts = ShortcutOptions::new().data("id", "save");
        register(&mut registry, ["ctrl", "s"], opts.clone(), "global");
        register(&mut registry, ["ctrl", "s"], opts, "global");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reregister_different_scope_keeps_both() {
        let mut registry = ShortcutRegistry::new();
        let opts = ShortcutOptions::new().data("id", "copy");
        register(&mut registry, ["c"], opts.clone(), "global");
        register(&mut registry, ["c"], opts, "editor");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.in_scope("editor").count(), 1);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let mut registry = ShortcutRegistry::new();
        let a = register(&mut registry, ["a"], ShortcutOptions::new(), "global");
        let b = register(&mut registry, ["a"], ShortcutOptions::new(), "global");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_empty_binding_is_rejected() {
        let mut registry = ShortcutRegistry::new();
        let result = registry.register(
            &Binding::Multiple(vec![]),
            noop(),
            &ShortcutOptions::new(),
            "global",
            Duration::from_millis(1000),
        );
        assert!(matches!(result, Err(ShortcutError::EmptyBinding)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sequential_combos_keep_repeated_keys() {
        let mut registry = ShortcutRegistry::new();
        register(&mut registry, ["g", "g"], ShortcutOptions::new().sequential(), "global");
        register(&mut registry, ["x", "x"], ShortcutOptions::new(), "global");

        assert_eq!(registry.get(0).unwrap().combo.len(), 2);
        assert_eq!(registry.get(1).unwrap().combo.len(), 1);
    }

    #[test]
    fn test_unregister_removes_all_variants_in_scope() {
        let mut registry = ShortcutRegistry::new();
        register(&mut registry, ["ctrl", "s"], ShortcutOptions::new(), "global");
        register(&mut registry, ["ctrl", "s"], ShortcutOptions::new(), "editor");

        assert_eq!(registry.unregister(&Combo::from(["ctrl", "s"]), "global"), 2);
        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(|s| s.scope == "editor"));
    }

    #[test]
    fn test_unregister_by_concrete_variant() {
        let mut registry = ShortcutRegistry::new();
        register(&mut registry, ["ctrl", "s"], ShortcutOptions::new(), "global");
        assert_eq!(
            registry.unregister(&Combo::from(["ctrl (left)", "s"]), "global"),
            1
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_update_enabled_ignores_id() {
        let mut registry = ShortcutRegistry::new();
        register(&mut registry, ["k"], ShortcutOptions::new(), "global");
        register(&mut registry, ["k"], ShortcutOptions::new(), "global");

        assert_eq!(registry.update_enabled(&Combo::from(["k"]), "global", |_| false), 2);
        assert!(registry.iter().all(|s| !s.enabled));
        assert_eq!(registry.update_enabled(&Combo::from(["k"]), "global", |e| !e), 2);
        assert!(registry.iter().all(|s| s.enabled));
        assert_eq!(registry.update_enabled(&Combo::from(["k"]), "other", |_| false), 0);
    }

    #[test]
    fn test_set_all_enabled_by_scope() {
        let mut registry = ShortcutRegistry::new();
        register(&mut registry, ["a"], ShortcutOptions::new(), "global");
        register(&mut registry, ["b"], ShortcutOptions::new(), "editor");

        assert_eq!(registry.set_all_enabled(Some("editor"), false), 1);
        assert!(registry.in_scope("global").all(|s| s.enabled));
        assert_eq!(registry.set_all_enabled(None, false), 2);
        assert!(registry.iter().all(|s| !s.enabled));
    }

    #[test]
    fn test_handler_invoke_passes_state() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = Rc::clone(&seen);
        let handler = ShortcutHandler::hold(move |_, state| {
            seen_clone.set(Some(state));
            Ok(())
        });
        handler
            .invoke(&KeyEvent::up("KeyA"), HoldState::Up)
            .unwrap();
        assert_eq!(seen.get(), Some(HoldState::Up));
    }

    #[test]
    fn test_options_are_applied() {
        let mut registry = ShortcutRegistry::new();
        let opts = ShortcutOptions::new()
            .on_key_up()
            .prevent_default()
            .repeat()
            .data("action", "save");
        register(&mut registry, ["s"], opts, "global");

        let s = registry.get(0).unwrap();
        assert_eq!(s.trigger_on, TriggerOn::KeyUp);
        assert!(s.prevent_default && s.repeat && s.enabled);
        assert_eq!(s.sequence_delay, Duration::from_millis(1000));
        assert_eq!(s.data.get("action").map(String::as_str), Some("save"));
        assert!(s.is_simultaneous());
    }

    #[test]
    fn test_zero_sequence_delay_falls_back() {
        let mut registry = ShortcutRegistry::new();
        let opts = ShortcutOptions::new().sequential().sequence_delay(Duration::ZERO);
        registry
            .register(
                &["g", "d"].into(),
                ShortcutHandler::press(|_| Ok(())),
                &opts,
                "global",
                Duration::from_millis(300),
            )
            .unwrap();
        registry
            .register(
                &["g", "i"].into(),
                ShortcutHandler::press(|_| Ok(())),
                &ShortcutOptions::new().sequential(),
                "global",
                Duration::ZERO,
            )
            .unwrap();

        assert_eq!(registry.get(0).unwrap().sequence_delay, Duration::from_millis(300));
        assert_eq!(registry.get(1).unwrap().sequence_delay, Duration::from_millis(1000));
    }
}
