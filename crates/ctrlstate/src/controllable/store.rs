#![forbid(unsafe_code)]

//! Internal value store for uncontrolled mode.
//!
//! # Design
//!
//! [`UncontrolledStore<T>`] owns a [`Slot<Option<T>>`] seeded once from the
//! default value, plus a private previous-value marker. Every evaluation
//! reads the slot and arms a transition [`Effect`] keyed on the value just
//! read. At commit, the effect compares that value with the marker; if they
//! differ the notifier is called once and the marker catches up.
//!
//! ```text
//! setter(next) ──► slot write ──► runtime.schedule()
//!                                      │
//! evaluate(on_change) ◄── next cycle ──┘
//!   ├─ read slot                    -> returned to the caller
//!   └─ arm effect(deps = value)
//! commit
//!   └─ value != marker ? on_change(value); marker = value
//! ```
//!
//! # Invariants
//!
//! 1. The default value is read exactly once, in [`UncontrolledStore::new`].
//! 2. The notifier fires at most once per committed transition, however
//!    many times the store is evaluated before the commit.
//! 3. A write equal to the current value neither schedules nor notifies.
//! 4. The notifier is only ever called with a concrete value.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::action::{OnChange, SetStateAction};
use crate::reactive::{Effect, Runtime, Slot, SlotSetter, same_value};

/// Self-owned value with commit-phase change detection.
pub struct UncontrolledStore<T> {
    runtime: Runtime,
    slot: Slot<Option<T>>,
    /// Last value the notifier was told about (or the seed).
    previous: Rc<RefCell<Option<T>>>,
    /// Notifier of the most recent evaluation; read by the queued check.
    notifier: Rc<RefCell<OnChange<T>>>,
    transition: Effect<Option<T>>,
}

impl<T: fmt::Debug> fmt::Debug for UncontrolledStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UncontrolledStore")
            .field("slot", &self.slot)
            .field("previous", &self.previous.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> UncontrolledStore<T> {
    /// Create a store seeded from `default_value` (absent if `None`).
    #[must_use]
    pub fn new(runtime: &Runtime, default_value: Option<T>) -> Self {
        Self {
            runtime: runtime.clone(),
            previous: Rc::new(RefCell::new(default_value.clone())),
            slot: Slot::new(runtime, default_value),
            notifier: Rc::new(RefCell::new(OnChange::noop())),
            transition: Effect::new(),
        }
    }

    /// Read the current value for this evaluation and arm the commit-phase
    /// transition check.
    ///
    /// The check calls whichever `on_change` the last evaluation before the
    /// commit supplied.
    pub fn evaluate(&self, on_change: &OnChange<T>) -> Option<T> {
        *self.notifier.borrow_mut() = on_change.clone();
        let current = self.slot.get();
        let previous = Rc::clone(&self.previous);
        let notifier = Rc::clone(&self.notifier);
        let seen = current.clone();
        self.transition.run(&self.runtime, current.clone(), move || {
            let notify = notifier.borrow().clone();
            notify_transition(&previous, seen, &notify);
        });
        current
    }

    /// Current slot value without arming the transition check.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.slot.get()
    }

    /// Number of value-changing writes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.slot.version()
    }

    /// Writer handle; every call returns a handle to the same slot.
    #[must_use]
    pub fn setter(&self) -> StoreSetter<T> {
        StoreSetter {
            slot: self.slot.setter(),
        }
    }

    /// Apply a write request. Returns `true` if the slot changed.
    pub fn dispatch(&self, action: SetStateAction<T>) -> bool {
        self.setter().dispatch(action)
    }

    #[cfg(test)]
    pub(crate) fn previous(&self) -> Option<T> {
        self.previous.borrow().clone()
    }
}

/// Commit-phase half of the store: compare, notify, then advance the marker.
fn notify_transition<T: Clone + PartialEq + 'static>(
    previous: &RefCell<Option<T>>,
    current: Option<T>,
    on_change: &OnChange<T>,
) {
    if same_value(&*previous.borrow(), &current) {
        return;
    }
    if let Some(value) = &current {
        on_change.call(value);
    }
    *previous.borrow_mut() = current;
}

/// Writer for an [`UncontrolledStore`].
pub struct StoreSetter<T> {
    slot: SlotSetter<Option<T>>,
}

impl<T> Clone for StoreSetter<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> fmt::Debug for StoreSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSetter").field("slot", &self.slot).finish()
    }
}

impl<T: Clone + PartialEq + 'static> StoreSetter<T> {
    /// Apply a write request. Returns `true` if the slot changed.
    ///
    /// An updater against an absent value is dropped: there is no previous
    /// value to hand it.
    pub fn dispatch(&self, action: SetStateAction<T>) -> bool {
        match action {
            SetStateAction::Value(value) => self.slot.set(Some(value)),
            SetStateAction::Update(f) => self.slot.update(|prev| match prev {
                Some(prev) => Some(f(prev)),
                None => {
                    trace!("updater dropped: uncontrolled value is absent");
                    None
                }
            }),
        }
    }

    /// Whether both setters write to the same store.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        self.slot.same_slot(&other.slot)
    }
}
