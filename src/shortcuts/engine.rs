//! Real-time shortcut matching.
//!
//! The engine owns everything that changes while keys move: the pressed-key
//! set, the armed hold shortcuts and the in-progress sequence buffers. It
//! classifies one event at a time, synchronously, and fires at most one
//! simultaneous shortcut per event.
//!
//! # Key-down
//!
//! 1. The normalized key joins the pressed set (unless the event is an
//!    auto-repeat) and the raw keystroke is published to typing listeners.
//! 2. Every enabled shortcut in the active scope is tested: hold shortcuts arm
//!    and fire `Down`, sequential shortcuts advance their buffer and fire on
//!    a complete sequence, simultaneous shortcuts become candidates.
//! 3. If a hold or sequential shortcut fired, no candidate fires. Otherwise the
//!    longest candidate fires; among equal lengths the earliest registered wins.
//! 4. Idle sequence buffers are dropped.
//!
//! # Key-up
//!
//! Armed holds containing the released key fire `Up` and disarm. Key-up
//! triggered simultaneous shortcuts match when the released key belongs to the
//! combo and every other key is still down. The key then leaves the pressed set.

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, error};

use super::emitter::{Emitter, Subscription};
use super::keys::normalize_key;
use super::registry::{Shortcut, ShortcutRegistry};
use super::scope::ScopeStack;
use super::types::{Combo, HoldState, Key, TriggerOn};
use crate::error::ShortcutError;
use crate::event_source::{KeyEvent, KeyEventKind};
use crate::logging::Logger;

/// Snapshot of a shortcut at the moment it fired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiredShortcut {
    pub id: String,
    pub combo: Combo,
    pub scope: String,
    pub data: BTreeMap<String, String>,
}

impl From<&Shortcut> for FiredShortcut {
    fn from(shortcut: &Shortcut) -> Self {
        Self {
            id: shortcut.id.clone(),
            combo: shortcut.combo.clone(),
            scope: shortcut.scope.clone(),
            data: shortcut.data.clone(),
        }
    }
}

/// Result of dispatching one key event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// First shortcut that fired for this event
    pub fired: Option<FiredShortcut>,
    /// Whether the platform default action should be suppressed
    pub default_prevented: bool,
}

/// Raw keystroke published before matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypingEvent {
    /// Logical key as typed (`"a"`, `"A"`, `"Enter"`)
    pub key: String,
    pub code: String,
    pub repeat: bool,
}

pub type FiredCallback = Box<dyn FnMut(&FiredShortcut)>;

#[derive(Debug)]
struct SequenceBuffer {
    scope: String,
    combo: Combo,
    delay: Duration,
    entries: Vec<(Key, Instant)>,
}

impl SequenceBuffer {
    fn matches(&self) -> bool {
        self.entries.len() == self.combo.len()
            && self
                .entries
                .iter()
                .zip(self.combo.iter())
                .all(|((pressed, _), expected)| pressed == expected)
    }

    fn is_idle(&self, now: Instant) -> bool {
        match self.entries.first() {
            Some((_, started)) => now.saturating_duration_since(*started) > self.delay,
            None => true,
        }
    }
}

/// Pick the longest combo; the earliest wins among equal lengths.
fn longest<'a>(candidates: impl IntoIterator<Item = &'a Shortcut>) -> Option<&'a Shortcut> {
    candidates.into_iter().fold(None, |best, current| match best {
        Some(best) if current.combo.len() <= best.combo.len() => Some(best),
        _ => Some(current),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

pub struct MatchEngine {
    registry: ShortcutRegistry,
    scopes: ScopeStack,
    pressed: HashSet<Key>,
    /// Armed hold shortcuts, in arming order
    holds: Vec<Shortcut>,
    sequences: Vec<SequenceBuffer>,
    typing: Emitter<TypingEvent>,
    on_fired: Option<FiredCallback>,
    logger: Logger,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(Logger::default())
    }
}

impl MatchEngine {
    pub fn new(logger: Logger) -> Self {
        Self {
            registry: ShortcutRegistry::new(),
            scopes: ScopeStack::new(),
            pressed: HashSet::new(),
            holds: Vec::new(),
            sequences: Vec::new(),
            typing: Emitter::new(),
            on_fired: None,
            logger,
        }
    }

    pub fn set_on_fired(&mut self, callback: Option<FiredCallback>) {
        self.on_fired = callback;
    }

    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ShortcutRegistry {
        &mut self.registry
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeStack {
        &mut self.scopes
    }

    pub fn on_typing(&self, listener: impl FnMut(&TypingEvent) + 'static) -> Subscription<TypingEvent> {
        self.typing.subscribe(listener)
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(&Key::new(key))
    }

    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_hold_armed(&self, id: &str) -> bool {
        self.holds.iter().any(|h| h.id == id)
    }

    pub fn active_sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Dispatch by event kind.
    pub fn dispatch(&mut self, event: &KeyEvent) -> DispatchOutcome {
        match event.kind {
            KeyEventKind::Down => self.on_key_down(event),
            KeyEventKind::Up => self.on_key_up(event),
        }
    }

    pub fn on_key_down(&mut self, event: &KeyEvent) -> DispatchOutcome {
        let key = normalize_key(&event.code);
        let now = event.timestamp;

        if !event.repeat {
            self.pressed.insert(key.clone());
        }

        self.typing.publish(&TypingEvent {
            key: event.key.clone(),
            code: event.code.clone(),
            repeat: event.repeat,
        });

        let active = self.scopes.active().to_string();
        let mut immediate: Vec<Shortcut> = Vec::new();
        let mut candidates: Vec<&Shortcut> = Vec::new();
        let mut advanced: Vec<&Combo> = Vec::new();

        for shortcut in self.registry.iter() {
            if !shortcut.enabled || shortcut.scope != active {
                continue;
            }
            let repeat_blocked = event.repeat && !shortcut.repeat;

            if shortcut.is_hold() {
                let all_pressed = shortcut.combo.iter().all(|k| self.pressed.contains(k));
                let armed = self.holds.iter().any(|h| h.id == shortcut.id);
                if all_pressed && !armed && !repeat_blocked {
                    self.holds.push(shortcut.clone());
                    immediate.push(shortcut.clone());
                }
            } else if shortcut.is_sequential() {
                if event.repeat || advanced.contains(&&shortcut.combo) {
                    continue;
                }

                let position = self
                    .sequences
                    .iter()
                    .position(|b| b.scope == active && b.combo == shortcut.combo);
                let index = match position {
                    Some(index) => {
                        let buffer = &mut self.sequences[index];
                        buffer.entries.push((key.clone(), now));
                        let delay = buffer.delay;
                        buffer
                            .entries
                            .retain(|(_, t)| now.saturating_duration_since(*t) <= delay);
                        index
                    }
                    None if shortcut.combo.first() == Some(&key) => {
                        self.sequences.push(SequenceBuffer {
                            scope: active.clone(),
                            combo: shortcut.combo.clone(),
                            delay: shortcut.sequence_delay,
                            entries: vec![(key.clone(), now)],
                        });
                        self.sequences.len() - 1
                    }
                    None => continue,
                };
                advanced.push(&shortcut.combo);

                if self.sequences[index].matches() {
                    self.sequences.remove(index);
                    immediate.push(shortcut.clone());
                }
            } else if shortcut.trigger_on == TriggerOn::KeyDown
                && !repeat_blocked
                && shortcut.combo.iter().all(|k| self.pressed.contains(k))
            {
                candidates.push(shortcut);
            }
        }

        let best = if immediate.is_empty() {
            longest(candidates).cloned()
        } else {
            None
        };

        let mut outcome = DispatchOutcome::default();
        for shortcut in &immediate {
            self.fire(shortcut, event, HoldState::Down, true, &mut outcome);
        }
        if let Some(shortcut) = best {
            self.fire(&shortcut, event, HoldState::Down, true, &mut outcome);
        }

        self.sequences.retain(|b| !b.is_idle(now));

        outcome.default_prevented = event.is_default_prevented();
        outcome
    }

    pub fn on_key_up(&mut self, event: &KeyEvent) -> DispatchOutcome {
        let key = normalize_key(&event.code);
        let mut outcome = DispatchOutcome::default();

        let (released, still_armed): (Vec<Shortcut>, Vec<Shortcut>) = std::mem::take(&mut self.holds)
            .into_iter()
            .partition(|h| h.combo.contains(&key));
        self.holds = still_armed;
        for shortcut in &released {
            self.fire(shortcut, event, HoldState::Up, false, &mut outcome);
        }

        let active = self.scopes.active();
        let best = longest(self.registry.iter().filter(|s| {
            s.enabled
                && s.scope == active
                && s.is_simultaneous()
                && s.trigger_on == TriggerOn::KeyUp
                && s.combo.contains(&key)
                && s
                    .combo
                    .iter()
                    .filter(|k| **k != key)
                    .all(|k| self.pressed.contains(k))
        }))
        .cloned();
        if let Some(shortcut) = best {
            self.fire(&shortcut, event, HoldState::Down, true, &mut outcome);
        }

        self.pressed.remove(&key);

        outcome.default_prevented = event.is_default_prevented();
        outcome
    }

    fn fire(
        &mut self,
        shortcut: &Shortcut,
        event: &KeyEvent,
        state: HoldState,
        notify: bool,
        outcome: &mut DispatchOutcome,
    ) {
        if shortcut.prevent_default {
            event.prevent_default();
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| shortcut.handler.invoke(event, state)));
        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(format!("{err:#}")),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };
        if let Some(message) = failure {
            let err = ShortcutError::Handler {
                shortcut_id: shortcut.id.clone(),
                message,
            };
            if !self.logger.is_silent() {
                error!(
                    category = "SHORTCUTS",
                    shortcut_id = %shortcut.id,
                    scope = %shortcut.scope,
                    error = %err,
                    "Shortcut handler failed"
                );
            }
        }

        if !notify {
            return;
        }

        let fired = FiredShortcut::from(shortcut);
        debug!(
            category = "SHORTCUTS",
            shortcut_id = %fired.id,
            combo = %fired.combo,
            scope = %fired.scope,
            "Shortcut fired"
        );
        if let Some(callback) = self.on_fired.as_mut() {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&fired))).is_err() {
                self.logger.error("Fired-shortcut callback panicked");
            }
        }
        if outcome.fired.is_none() {
            outcome.fired = Some(fired);
        }
    }

    /// Forget pressed keys and armed holds.
    pub fn clear_input_state(&mut self) {
        self.pressed.clear();
        self.holds.clear();
    }

    /// Drop every shortcut, typing listener and all matching state, and reset
    /// the scope stack.
    pub fn reset(&mut self) {
        self.clear_input_state();
        self.sequences.clear();
        self.typing.clear();
        self.registry.clear();
        self.scopes.reset();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
