//! Declarative shortcut sets.
//!
//! A [`ShortcutSet`] is a group of shortcuts that belong to one scope and are
//! mounted and unmounted together, the way a view registers its shortcuts when
//! it appears and removes them when it goes away.
//!
//! ```ignore
//! let mut set = ShortcutSet::new("editor")
//!     .shortcut(["ctrl", "s"], ShortcutHandler::press(|_| save()), ShortcutOptions::new())
//!     .shortcut(["g", "d"], ShortcutHandler::press(|_| goto()), ShortcutOptions::new().sequential());
//! set.mount(&mut manager)?;
//! // ...
//! set.unmount(&mut manager);
//! ```

use tracing::{debug, warn};

use crate::config::{ScopeConfig, ShortcutConfig};
use crate::error::Result;
use crate::manager::ShortcutManager;
use crate::shortcuts::{Binding, ShortcutHandler, ShortcutOptions};

/// One declared shortcut. The scope in `options` is ignored; the set's scope wins.
#[derive(Clone, Debug)]
pub struct ShortcutDecl {
    pub keys: Binding,
    pub handler: ShortcutHandler,
    pub options: ShortcutOptions,
}

impl ShortcutDecl {
    pub fn new(keys: impl Into<Binding>, handler: ShortcutHandler) -> Self {
        Self {
            keys: keys.into(),
            handler,
            options: ShortcutOptions::default(),
        }
    }

    pub fn options(mut self, options: ShortcutOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug)]
pub struct ShortcutSet {
    scope: String,
    disabled: bool,
    shortcuts: Vec<ShortcutDecl>,
    mounted: bool,
    previous_scope: Option<String>,
}

impl ShortcutSet {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            disabled: false,
            shortcuts: Vec::new(),
            mounted: false,
            previous_scope: None,
        }
    }

    /// Build a set from a keymap scope, creating each handler with `make_handler`.
    pub fn from_config(
        config: &ScopeConfig,
        mut make_handler: impl FnMut(&ShortcutConfig) -> ShortcutHandler,
    ) -> Self {
        let shortcuts = config
            .shortcuts
            .iter()
            .map(|s| ShortcutDecl::new(s.keys.to_binding(), make_handler(s)).options(s.to_options()))
            .collect();
        Self {
            disabled: config.disabled,
            shortcuts,
            ..Self::new(config.name.clone())
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn shortcut(
        mut self,
        keys: impl Into<Binding>,
        handler: ShortcutHandler,
        options: ShortcutOptions,
    ) -> Self {
        self.shortcuts
            .push(ShortcutDecl::new(keys, handler).options(options));
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn declarations(&self) -> &[ShortcutDecl] {
        &self.shortcuts
    }

    /// Activate the scope and register every declaration in it.
    ///
    /// Returns the registered ids in declaration order. Declarations without
    /// keys are skipped with a warning. A set with an empty scope name joins
    /// the scope that is active at mount time.
    pub fn mount(&mut self, manager: &mut ShortcutManager) -> Result<Vec<String>> {
        self.previous_scope = Some(manager.active_scope().to_string());
        if self.scope.is_empty() {
            self.scope = manager.active_scope().to_string();
        }
        manager.push_scope(&self.scope);
        manager.set_active_scope(&self.scope);

        let ids = self.register_all(manager)?;
        self.apply_disabled(manager);
        self.mounted = true;

        debug!(
            category = "SHORTCUTS",
            scope = %self.scope,
            shortcuts = ids.len(),
            "Mounted shortcut set"
        );
        Ok(ids)
    }

    /// Unregister every declared combo in the scope and pop the scope.
    ///
    /// The scope is popped only while it is the active one; the scope that was
    /// active before `mount` is re-activated when it is still on the stack.
    pub fn unmount(&mut self, manager: &mut ShortcutManager) {
        if !self.mounted {
            return;
        }
        self.unregister_all(manager);

        if manager.active_scope() == self.scope {
            manager.pop_scope();
        }
        if let Some(previous) = self.previous_scope.take() {
            if manager.scopes().contains(&previous) && manager.active_scope() != previous {
                manager.set_active_scope(&previous);
            }
        }
        self.mounted = false;

        debug!(category = "SHORTCUTS", scope = %self.scope, "Unmounted shortcut set");
    }

    /// Replace the declarations, re-registering them if mounted.
    ///
    /// Superseded combos are unregistered first so their handlers are dropped.
    pub fn update(
        &mut self,
        manager: &mut ShortcutManager,
        shortcuts: Vec<ShortcutDecl>,
    ) -> Result<Vec<String>> {
        if !self.mounted {
            self.shortcuts = shortcuts;
            return Ok(Vec::new());
        }
        self.unregister_all(manager);
        self.shortcuts = shortcuts;
        let ids = self.register_all(manager)?;
        self.apply_disabled(manager);
        Ok(ids)
    }

    /// Enable or disable the whole scope.
    pub fn set_disabled(&mut self, manager: &mut ShortcutManager, disabled: bool) {
        self.disabled = disabled;
        if self.mounted {
            self.apply_disabled(manager);
        }
    }

    fn register_all(&self, manager: &mut ShortcutManager) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(self.shortcuts.len());
        for decl in &self.shortcuts {
            if decl.keys.is_empty() {
                warn!(
                    category = "SHORTCUTS",
                    scope = %self.scope,
                    "Skipping shortcut declaration without keys"
                );
                continue;
            }
            let options = decl.options.clone().scope(self.scope.clone());
            ids.push(manager.register(decl.keys.clone(), decl.handler.clone(), options)?);
        }
        Ok(ids)
    }

    fn unregister_all(&self, manager: &mut ShortcutManager) {
        for decl in &self.shortcuts {
            for combo in decl.keys.combos() {
                manager.unregister(combo.clone(), Some(&self.scope));
            }
        }
    }

    fn apply_disabled(&self, manager: &mut ShortcutManager) {
        if self.disabled {
            manager.disable_all(Some(&self.scope));
        } else {
            manager.enable_all(Some(&self.scope));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::config::KeysConfig;
    use crate::event_source::KeyEvent;
    use crate::manager::ManagerOptions;
    use crate::shortcuts::Combo;

    fn manager() -> ShortcutManager {
        ShortcutManager::headless(ManagerOptions::headless().silent(true))
    }

    fn counter() -> (Rc<Cell<u32>>, ShortcutHandler) {
        let count = Rc::new(Cell::new(0));
        let count_clone = Rc::clone(&count);
        let handler = ShortcutHandler::press(move |_| {
            count_clone.set(count_clone.get() + 1);
            Ok(())
        });
        (count, handler)
    }

    fn press(manager: &mut ShortcutManager, codes: &[&str]) {
        for code in codes {
            manager.handle_event(&KeyEvent::down(*code));
        }
        for code in codes.iter().rev() {
            manager.handle_event(&KeyEvent::up(*code));
        }
    }

    #[test]
    fn test_mount_activates_scope_and_registers() {
        let mut manager = manager();
        let (count, handler) = counter();
        let mut set = ShortcutSet::new("editor").shortcut(
            ["ctrl", "s"],
            handler,
            ShortcutOptions::new().scope("ignored"),
        );

        let ids = set.mount(&mut manager).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(manager.active_scope(), "editor");
        assert!(manager.scopes_info(Some("ignored")).is_empty());

        press(&mut manager, &["ControlLeft", "KeyS"]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unmount_removes_shortcuts_and_restores_scope() {
        let mut manager = manager();
        let (count, handler) = counter();
        let mut set = ShortcutSet::new("modal").shortcut(
            Binding::multiple([vec!["esc"], vec!["ctrl", "w"]]),
            handler,
            ShortcutOptions::new(),
        );
        set.mount(&mut manager).unwrap();
        assert_eq!(manager.shortcut_count(), 3);

        set.unmount(&mut manager);
        assert!(!set.is_mounted());
        assert_eq!(manager.shortcut_count(), 0);
        assert_eq!(manager.scopes(), vec!["global"]);

        press(&mut manager, &["Escape"]);
        assert_eq!(count.get(), 0);

        // Second unmount is a no-op
        set.unmount(&mut manager);
        assert_eq!(manager.scopes(), vec!["global"]);
    }

    #[test]
    fn test_disabled_set_registers_but_does_not_fire() {
        let mut manager = manager();
        let (count, handler) = counter();
        let mut set = ShortcutSet::new("panel")
            .disabled(true)
            .shortcut(["p"], handler, ShortcutOptions::new());
        set.mount(&mut manager).unwrap();

        press(&mut manager, &["KeyP"]);
        assert_eq!(count.get(), 0);

        set.set_disabled(&mut manager, false);
        press(&mut manager, &["KeyP"]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_update_replaces_handlers_without_leaking() {
        let mut manager = manager();
        let (old, old_handler) = counter();
        let (new, new_handler) = counter();
        let mut set = ShortcutSet::new("list").shortcut(["j"], old_handler, ShortcutOptions::new());
        set.mount(&mut manager).unwrap();

        set.update(&mut manager, vec![ShortcutDecl::new(["k"], new_handler)])
            .unwrap();
        assert_eq!(manager.shortcut_count(), 1);

        press(&mut manager, &["KeyJ"]);
        press(&mut manager, &["KeyK"]);
        assert_eq!((old.get(), new.get()), (0, 1));
    }

    #[test]
    fn test_empty_declaration_is_skipped() {
        let mut manager = manager();
        let (_, handler) = counter();
        let mut set = ShortcutSet::new("global")
            .shortcut(Combo::default(), handler.clone(), ShortcutOptions::new())
            .shortcut(["a"], handler, ShortcutOptions::new());
        let ids = set.mount(&mut manager).unwrap();
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_empty_scope_joins_active_scope() {
        let mut manager = manager();
        manager.push_scope("editor");
        let (count, handler) = counter();
        let mut set = ShortcutSet::new("").shortcut(["k"], handler, ShortcutOptions::new());

        set.mount(&mut manager).unwrap();
        assert_eq!(set.scope(), "editor");
        press(&mut manager, &["KeyK"]);
        assert_eq!(count.get(), 1);

        set.unmount(&mut manager);
        assert_eq!(manager.shortcut_count(), 0);
    }

    #[test]
    fn test_from_config() {
        let config = ScopeConfig {
            name: "editor".to_string(),
            disabled: false,
            shortcuts: vec![ShortcutConfig {
                keys: KeysConfig::Single(vec!["ctrl".into(), "s".into()]),
                action: Some("save".to_string()),
                sequential: false,
                hold: false,
                sequence_delay_ms: None,
                trigger_on: Default::default(),
                repeat: false,
                prevent_default: true,
                data: Default::default(),
            }],
        };
        let seen = Rc::new(Cell::new(0));
        let seen_clone = Rc::clone(&seen);
        let set = ShortcutSet::from_config(&config, move |s| {
            assert_eq!(s.action.as_deref(), Some("save"));
            seen_clone.set(seen_clone.get() + 1);
            ShortcutHandler::press(|_| Ok(()))
        });

        assert_eq!(seen.get(), 1);
        assert_eq!(set.scope(), "editor");
        assert_eq!(set.declarations().len(), 1);
        assert!(set.declarations()[0].options.prevent_default);
    }
}
