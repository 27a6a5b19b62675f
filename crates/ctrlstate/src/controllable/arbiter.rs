#![forbid(unsafe_code)]

//! Ownership arbiter: one read/write surface over both modes.
//!
//! # Design
//!
//! A [`ControllableState<T>`] lives as long as its component instance. On
//! every evaluation the caller hands it fresh [`StateProps`]; the arbiter
//!
//! 1. evaluates its [`UncontrolledStore`] (always, so the self-owned value
//!    keeps tracking while a controlled value hides it),
//! 2. decides [`Ownership`] from `props.value.is_some()`,
//! 3. returns the value of whichever side owns it plus a [`SetState`]
//!    bound to that decision.
//!
//! | Ownership      | Read            | Write                                  |
//! |----------------|-----------------|----------------------------------------|
//! | `Controlled`   | `props.value`   | resolve, compare, `on_change(next)`    |
//! | `Uncontrolled` | store slot      | forward to the store setter            |
//!
//! In controlled mode nothing is stored: the owner is expected to feed the
//! new value back through `props.value` on the next cycle.
//!
//! # Mode switching
//!
//! Ownership is decided per evaluation and never remembered. A value that
//! goes from present to absent hands ownership back to the store, which
//! still holds whatever it held before the switch. Flips are traced, never
//! warned about.

use std::cell::{Cell, OnceCell};
use std::fmt;

use tracing::trace;

use super::action::{OnChange, SetStateAction};
use super::store::{StoreSetter, UncontrolledStore};
use crate::reactive::{Runtime, same_value};

/// Who owns the value on a given evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership<T> {
    /// The caller supplied this value.
    Controlled(T),
    /// The internal store owns the value.
    Uncontrolled,
}

impl<T> Ownership<T> {
    /// Presence of an external value decides ownership.
    #[must_use]
    pub fn of(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Controlled(value),
            None => Self::Uncontrolled,
        }
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled(_))
    }

    /// The external value, when controlled.
    #[must_use]
    pub fn controlled_value(&self) -> Option<&T> {
        match self {
            Self::Controlled(value) => Some(value),
            Self::Uncontrolled => None,
        }
    }
}

/// Per-evaluation input.
///
/// `default_value` only matters on the first evaluation of a
/// [`ControllableState`]; later values are ignored.
pub struct StateProps<T> {
    pub value: Option<T>,
    pub default_value: Option<T>,
    pub on_change: OnChange<T>,
}

impl<T> Default for StateProps<T> {
    fn default() -> Self {
        Self {
            value: None,
            default_value: None,
            on_change: OnChange::noop(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateProps<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateProps")
            .field("value", &self.value)
            .field("default_value", &self.default_value)
            .field("on_change", &self.on_change)
            .finish()
    }
}

impl<T> StateProps<T> {
    /// Props with an external value.
    #[must_use]
    pub fn controlled(value: T) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Props without an external value.
    #[must_use]
    pub fn uncontrolled() -> Self {
        Self::default()
    }

    /// Set or clear the external value.
    #[must_use]
    pub fn value(mut self, value: Option<T>) -> Self {
        self.value = value;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: T) -> Self {
        self.default_value = Some(value);
        self
    }

    #[must_use]
    pub fn on_change(mut self, f: impl Fn(&T) + 'static) -> Self {
        self.on_change = OnChange::new(f);
        self
    }

    /// Use an existing notifier (keeps its identity).
    #[must_use]
    pub fn with_on_change(mut self, on_change: OnChange<T>) -> Self {
        self.on_change = on_change;
        self
    }
}

/// Controlled/uncontrolled state for one component instance.
pub struct ControllableState<T> {
    runtime: Runtime,
    /// Created by the first evaluation from its `default_value`.
    store: OnceCell<UncontrolledStore<T>>,
    /// Ownership seen by the previous evaluation. Logging only.
    last_controlled: Cell<Option<bool>>,
}

impl<T: fmt::Debug> fmt::Debug for ControllableState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllableState")
            .field("store", &self.store.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> ControllableState<T> {
    #[must_use]
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            runtime: runtime.clone(),
            store: OnceCell::new(),
            last_controlled: Cell::new(None),
        }
    }

    /// Evaluate for this cycle: returns the value to show and the setter
    /// bound to this cycle's ownership.
    pub fn evaluate(&self, props: StateProps<T>) -> (Option<T>, SetState<T>) {
        let StateProps {
            value,
            default_value,
            on_change,
        } = props;

        let store = self
            .store
            .get_or_init(|| UncontrolledStore::new(&self.runtime, default_value));
        let uncontrolled_value = store.evaluate(&on_change);

        let ownership = Ownership::of(value);
        self.trace_flip(ownership.is_controlled());

        let current = match &ownership {
            Ownership::Controlled(value) => Some(value.clone()),
            Ownership::Uncontrolled => uncontrolled_value,
        };
        let set_state = SetState {
            ownership,
            on_change,
            store: store.setter(),
        };
        (current, set_state)
    }

    /// The store's value, whether or not it is currently surfaced.
    #[must_use]
    pub fn uncontrolled_value(&self) -> Option<T> {
        self.store.get().and_then(UncontrolledStore::current)
    }

    fn trace_flip(&self, controlled: bool) {
        let previous = self.last_controlled.replace(Some(controlled));
        if previous.is_some_and(|previous| previous != controlled) {
            trace!(
                cycle = self.runtime.cycle(),
                controlled,
                "ownership changed between evaluations"
            );
        }
    }
}

/// Setter returned by [`ControllableState::evaluate`].
///
/// It is bound to the ownership decided by the evaluation that produced it.
/// In controlled mode it compares against that evaluation's external value.
pub struct SetState<T> {
    ownership: Ownership<T>,
    on_change: OnChange<T>,
    store: StoreSetter<T>,
}

impl<T: Clone> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            ownership: self.ownership.clone(),
            on_change: self.on_change.clone(),
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("ownership", &self.ownership)
            .field("on_change", &self.on_change)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> SetState<T> {
    /// Request a literal next value.
    pub fn set(&self, value: T) {
        self.dispatch(SetStateAction::Value(value));
    }

    /// Request a value derived from the previous one.
    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.dispatch(SetStateAction::update(f));
    }

    /// Route a write request to the owner of the value.
    pub fn dispatch(&self, action: SetStateAction<T>) {
        match &self.ownership {
            Ownership::Controlled(current) => {
                let next = action.resolve(current);
                if !same_value(&next, current) {
                    self.on_change.call(&next);
                } else {
                    trace!("controlled write skipped: value unchanged");
                }
            }
            Ownership::Uncontrolled => {
                self.store.dispatch(action);
            }
        }
    }

    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.ownership.is_controlled()
    }

    #[must_use]
    pub fn ownership(&self) -> &Ownership<T> {
        &self.ownership
    }
}
