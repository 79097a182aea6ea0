//! Minimal synchronous publish/subscribe channel.
//!
//! Listeners run in subscription order on the publishing thread. A panicking
//! listener is caught and logged so the remaining listeners still run.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::error;

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

pub struct Emitter<T> {
    inner: Rc<RefCell<Listeners<T>>>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, listener: impl FnMut(&T) + 'static) -> Subscription<T> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(RefCell::new(listener))));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, event: &T) {
        // Snapshot so listeners may subscribe or unsubscribe while being notified
        let snapshot: Vec<Listener<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();

        for listener in snapshot {
            let Ok(mut callback) = listener.try_borrow_mut() else {
                continue;
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| (*callback)(event)));
            if result.is_err() {
                error!(category = "EMITTER", "Listener panicked; continuing with remaining listeners");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }
}

/// Handle returned from [`Emitter::subscribe`].
///
/// Dropping it keeps the listener registered; call [`Subscription::unsubscribe`]
/// to remove it.
pub struct Subscription<T> {
    id: u64,
    listeners: Weak<RefCell<Listeners<T>>>,
}

impl<T> Subscription<T> {
    pub fn unsubscribe(self) {
        if let Some(inner) = self.listeners.upgrade() {
            inner.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}
