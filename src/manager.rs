//! Public shortcut manager.
//!
//! Owns the matching engine and, unless running headless, the key event source
//! it listens to. Every operation is synchronous; events are dispatched one at
//! a time either from `pump()` or directly through `handle_event()`.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::config::{Config, DEFAULT_SCOPE, DEFAULT_SEQUENCE_DELAY_MS};
use crate::error::{Result, ShortcutError};
use crate::event_source::{KeyEvent, KeyEventSource};
use crate::logging::Logger;
use crate::shortcuts::{
    cheat_sheet, scopes_info, Binding, CheatSheetEntry, Combo, DispatchOutcome, FiredCallback,
    FiredShortcut, MatchEngine, ScopeInfo, ShortcutHandler, ShortcutOptions, Subscription,
    TypingEvent,
};

/// Whether the manager requires a live event source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManagerMode {
    /// Construction fails without an event source
    #[default]
    Attached,
    /// Events arrive only through `handle_event` (tests, replay)
    Headless,
}

/// Construction options for [`ShortcutManager`].
pub struct ManagerOptions {
    pub silent: bool,
    /// Default window for sequential shortcuts
    pub sequence_delay: Duration,
    pub mode: ManagerMode,
    pub on_shortcut_fired: Option<FiredCallback>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            silent: false,
            sequence_delay: Duration::from_millis(DEFAULT_SEQUENCE_DELAY_MS),
            mode: ManagerMode::Attached,
            on_shortcut_fired: None,
        }
    }
}

impl fmt::Debug for ManagerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerOptions")
            .field("silent", &self.silent)
            .field("sequence_delay", &self.sequence_delay)
            .field("mode", &self.mode)
            .field("on_shortcut_fired", &self.on_shortcut_fired.is_some())
            .finish()
    }
}

impl ManagerOptions {
    pub fn headless() -> Self {
        Self {
            mode: ManagerMode::Headless,
            ..Self::default()
        }
    }

    /// Silence flag and sequence delay from a keymap file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            silent: config.silent,
            sequence_delay: config.get_sequence_delay(),
            ..Self::default()
        }
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn mode(mut self, mode: ManagerMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn on_shortcut_fired(mut self, callback: impl FnMut(&FiredShortcut) + 'static) -> Self {
        self.on_shortcut_fired = Some(Box::new(callback));
        self
    }
}

pub struct ShortcutManager {
    engine: MatchEngine,
    source: Option<Box<dyn KeyEventSource>>,
    listening: bool,
    sequence_delay: Duration,
    logger: Logger,
}

impl fmt::Debug for ShortcutManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutManager")
            .field("shortcuts", &self.engine.registry().len())
            .field("scopes", &self.engine.scopes().list())
            .field("listening", &self.listening)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl ShortcutManager {
    /// Create a manager and start listening.
    ///
    /// Fails with [`ShortcutError::EventSourceUnavailable`] when `source` is
    /// `None` outside [`ManagerMode::Headless`].
    #[instrument(name = "shortcut_manager_new", skip_all, fields(mode = ?options.mode))]
    pub fn new(options: ManagerOptions, source: Option<Box<dyn KeyEventSource>>) -> Result<Self> {
        if source.is_none() && options.mode == ManagerMode::Attached {
            return Err(ShortcutError::EventSourceUnavailable);
        }

        let logger = Logger::new(options.silent);
        let mut engine = MatchEngine::new(logger);
        engine.set_on_fired(options.on_shortcut_fired);

        let mut manager = Self {
            engine,
            source,
            listening: false,
            sequence_delay: options.sequence_delay,
            logger,
        };
        manager.start()?;
        Ok(manager)
    }

    /// Manager without an event source; feed it with `handle_event`.
    pub fn headless(options: ManagerOptions) -> Self {
        let logger = Logger::new(options.silent);
        let mut engine = MatchEngine::new(logger);
        engine.set_on_fired(options.on_shortcut_fired);
        Self {
            engine,
            source: None,
            listening: true,
            sequence_delay: options.sequence_delay,
            logger,
        }
    }

    /// Attach to the event source (if any) and accept events again.
    pub fn start(&mut self) -> Result<()> {
        if let Some(source) = self.source.as_mut() {
            source.attach()?;
        }
        self.listening = true;
        debug!(category = "SHORTCUTS", "Listening for key events");
        Ok(())
    }

    /// Drain the event source, dispatching every pending event in order.
    ///
    /// While not listening, pending events are discarded.
    pub fn pump(&mut self) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        let Some(source) = self.source.as_mut() else {
            return outcomes;
        };
        while let Some(event) = source.poll_event() {
            if self.listening {
                outcomes.push(self.engine.dispatch(&event));
            }
        }
        outcomes
    }

    /// Dispatch one event. Ignored while the manager is not listening.
    pub fn handle_event(&mut self, event: &KeyEvent) -> DispatchOutcome {
        if !self.listening {
            return DispatchOutcome::default();
        }
        self.engine.dispatch(event)
    }

    /// Register `binding` and return the shortcut id.
    ///
    /// The scope defaults to the active scope (an empty name counts as unset)
    /// and is pushed onto the scope stack if it is new.
    pub fn register(
        &mut self,
        binding: impl Into<Binding>,
        handler: ShortcutHandler,
        options: ShortcutOptions,
    ) -> Result<String> {
        let binding = binding.into();
        let scope = options
            .scope
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.engine.scopes().active().to_string());

        let id = self.engine.registry_mut().register(
            &binding,
            handler,
            &options,
            &scope,
            self.sequence_delay,
        )?;
        self.engine.scopes_mut().push(&scope);
        Ok(id)
    }

    /// Remove every shortcut bound to `combo` in `scope` (default `"global"`).
    pub fn unregister(&mut self, combo: impl Into<Combo>, scope: Option<&str>) -> usize {
        let scope = scope.unwrap_or(DEFAULT_SCOPE);
        self.engine.registry_mut().unregister(&combo.into(), scope)
    }

    pub fn enable(&mut self, combo: impl Into<Combo>, scope: Option<&str>) -> bool {
        self.update_enabled(combo.into(), scope, |_| true)
    }

    pub fn disable(&mut self, combo: impl Into<Combo>, scope: Option<&str>) -> bool {
        self.update_enabled(combo.into(), scope, |_| false)
    }

    pub fn toggle(&mut self, combo: impl Into<Combo>, scope: Option<&str>) -> bool {
        self.update_enabled(combo.into(), scope, |enabled| !enabled)
    }

    fn update_enabled(
        &mut self,
        combo: Combo,
        scope: Option<&str>,
        update: impl Fn(bool) -> bool,
    ) -> bool {
        let scope = scope.unwrap_or(DEFAULT_SCOPE);
        let matched = self.engine.registry_mut().update_enabled(&combo, scope, update);
        if matched == 0 {
            self.logger.warn(&format!(
                "No matching shortcut for [{}] in scope \"{}\"",
                combo, scope
            ));
        }
        matched > 0
    }

    /// Enable every shortcut, or only those in `scope`.
    pub fn enable_all(&mut self, scope: Option<&str>) {
        self.engine.registry_mut().set_all_enabled(scope, true);
    }

    /// Disable every shortcut, or only those in `scope`.
    pub fn disable_all(&mut self, scope: Option<&str>) {
        self.engine.registry_mut().set_all_enabled(scope, false);
    }

    pub fn push_scope(&mut self, scope: &str) {
        self.engine.scopes_mut().push(scope);
    }

    pub fn pop_scope(&mut self) -> Option<String> {
        self.engine.scopes_mut().pop()
    }

    /// Make `scope` active by swapping it to the top of the stack.
    pub fn set_active_scope(&mut self, scope: &str) -> bool {
        let found = self.engine.scopes_mut().set_active(scope);
        if !found {
            self.logger
                .warn(&format!("Scope \"{}\" does not exist in the stack", scope));
        }
        found
    }

    pub fn reset_scope(&mut self) {
        self.engine.scopes_mut().reset();
    }

    pub fn active_scope(&self) -> &str {
        self.engine.scopes().active()
    }

    /// Snapshot of the scope stack, bottom first.
    pub fn scopes(&self) -> Vec<String> {
        self.engine.scopes().list()
    }

    pub fn is_scope_active(&self, scope: Option<&str>) -> bool {
        self.engine.scopes().is_active(scope)
    }

    /// Subscribe to every raw keystroke, matched or not.
    pub fn on_typing(
        &self,
        listener: impl FnMut(&TypingEvent) + 'static,
    ) -> Subscription<TypingEvent> {
        self.engine.on_typing(listener)
    }

    /// Display summary of `scope` (default: the active scope).
    pub fn cheat_sheet(&self, scope: Option<&str>) -> Vec<CheatSheetEntry> {
        let scope = scope.unwrap_or_else(|| self.engine.scopes().active());
        cheat_sheet(self.engine.registry(), scope)
    }

    pub fn scopes_info(&self, scope: Option<&str>) -> BTreeMap<String, ScopeInfo> {
        scopes_info(self.engine.registry(), self.engine.scopes(), scope)
    }

    /// Stop listening and forget pressed keys and armed holds.
    ///
    /// Registered shortcuts survive; call `start()` to listen again.
    pub fn clear(&mut self) {
        self.engine.clear_input_state();
        if let Some(source) = self.source.as_mut() {
            source.detach();
        }
        self.listening = false;
        self.logger.log("Instance cleared");
    }

    /// `clear()`, then drop every shortcut and reset the scope stack.
    pub fn destroy(&mut self) {
        self.clear();
        self.engine.reset();
        self.logger.log("Instance destroyed");
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of stored concrete shortcuts (alias variants count separately).
    pub fn shortcut_count(&self) -> usize {
        self.engine.registry().len()
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }
}

/// Cloneable handle to one manager, passed to every component that needs it.
///
/// Handlers run while the manager is mutably borrowed. Calling `with` or
/// `borrow_mut` from inside a handler panics (the panic is caught and logged
/// as a handler failure), so a handler that needs the manager must use
/// [`SharedManager::try_with`] and handle `None`, typically by queueing the
/// change for after dispatch:
///
/// ```ignore
/// let pending = Rc::new(RefCell::new(None));
/// let queued = Rc::clone(&pending);
/// let handle = shared.clone();
/// let handler = ShortcutHandler::press(move |_| {
///     if handle.try_with(|m| m.set_active_scope("modal")).is_none() {
///         *queued.borrow_mut() = Some("modal".to_string());
///     }
///     Ok(())
/// });
///
/// shared.with(|m| m.pump());
/// if let Some(scope) = pending.borrow_mut().take() {
///     shared.with(|m| m.set_active_scope(&scope));
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SharedManager(Rc<RefCell<ShortcutManager>>);

impl SharedManager {
    pub fn new(manager: ShortcutManager) -> Self {
        Self(Rc::new(RefCell::new(manager)))
    }

    pub fn borrow(&self) -> Ref<'_, ShortcutManager> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ShortcutManager> {
        self.0.borrow_mut()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ShortcutManager) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Like [`SharedManager::with`], but returns `None` when already borrowed.
    pub fn try_with<R>(&self, f: impl FnOnce(&mut ShortcutManager) -> R) -> Option<R> {
        self.0.try_borrow_mut().ok().map(|mut m| f(&mut m))
    }

    /// True when both handles point at the same manager.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
