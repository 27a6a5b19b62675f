#![forbid(unsafe_code)]

//! Persistent, version-tracked storage with a scheduling setter.
//!
//! # Design
//!
//! [`Slot<T>`] keeps a value of type `T` in shared, reference-counted storage
//! that outlives any single evaluation pass. Writes go through a
//! [`SlotSetter<T>`], a clonable handle whose identity is stable for the
//! slot's whole life. A write that changes the value (by `PartialEq`, with NaN
//! equal to NaN) bumps the version and schedules the owning [`Runtime`]; a
//! write equal to the current value is skipped outright.
//!
//! Writes apply immediately and in invocation order, so several writes in one
//! cycle behave as last-write-wins and each updater sees the result of the
//! write before it.
//!
//! # Performance
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `get()`        | O(1) + clone |
//! | `set()`        | O(1) + `PartialEq` |
//! | `update()`     | O(1) + clone + `PartialEq` |
//!
//! # Failure Modes
//!
//! - **Borrow inside `with`**: writing to the slot from inside the closure
//!   passed to [`Slot::with`] panics (RefCell borrow rules).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::runtime::Runtime;
use super::same_value;

struct SlotInner<T> {
    value: T,
    version: u64,
    runtime: Runtime,
}

/// Identity-stable storage that survives evaluation cycles.
///
/// Cloning a `Slot` creates a new handle to the **same** storage.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. A write equal to the current value is a no-op: no version bump, no
///    schedule.
/// 3. Every value-changing write schedules the runtime.
pub struct Slot<T> {
    inner: Rc<RefCell<SlotInner<T>>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Slot")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Slot<T> {
    /// Create a slot holding `value`, owned by `runtime`. The initial version
    /// is 0.
    #[must_use]
    pub fn new(runtime: &Runtime, value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotInner {
                value,
                version: 0,
                runtime: runtime.clone(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Current version. Increments by 1 on each value-changing write.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// The writer for this slot. Every call returns a handle to the same
    /// storage; see [`SlotSetter::same_slot`].
    #[must_use]
    pub fn setter(&self) -> SlotSetter<T> {
        SlotSetter {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Writer half of a [`Slot`].
pub struct SlotSetter<T> {
    inner: Rc<RefCell<SlotInner<T>>>,
}

impl<T> Clone for SlotSetter<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for SlotSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotSetter")
            .field("slot", &Rc::as_ptr(&self.inner))
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> SlotSetter<T> {
    /// Store `value`. Returns `true` if the slot changed.
    pub fn set(&self, value: T) -> bool {
        let runtime = {
            let mut inner = self.inner.borrow_mut();
            if same_value(&inner.value, &value) {
                if inner.runtime.trace_writes() {
                    trace!(version = inner.version, "slot write skipped: value unchanged");
                }
                return false;
            }
            inner.value = value;
            inner.version += 1;
            if inner.runtime.trace_writes() {
                trace!(version = inner.version, "slot written");
            }
            inner.runtime.clone()
        };
        runtime.schedule();
        true
    }

    /// Compute the next value from the current one and store it.
    ///
    /// `f` runs without the slot borrowed, so it may read other slots or
    /// even this one. Returns `true` if the slot changed.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let prev = self.inner.borrow().value.clone();
        self.set(f(&prev))
    }

    /// Whether `self` and `other` write to the same slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_basic() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 42);
        assert_eq!(slot.get(), 42);
        assert_eq!(slot.version(), 0);

        assert!(slot.setter().set(99));
        assert_eq!(slot.get(), 99);
        assert_eq!(slot.version(), 1);
    }

    #[test]
    fn equal_write_is_skipped() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 42);
        assert!(!slot.setter().set(42));
        assert_eq!(slot.version(), 0);
        assert!(!rt.is_scheduled());
    }

    #[test]
    fn changing_write_schedules_runtime() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, "a".to_string());
        slot.setter().set("b".to_string());
        assert!(rt.is_scheduled());
    }

    #[test]
    fn update_sees_previous_write() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 1);
        let set = slot.setter();
        set.set(5);
        set.update(|prev| prev * 10);
        assert_eq!(slot.get(), 50);
        assert_eq!(slot.version(), 2);
    }

    #[test]
    fn update_may_read_same_slot() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 3);
        let reader = slot.clone();
        slot.setter().update(move |prev| prev + reader.get());
        assert_eq!(slot.get(), 6);
    }

    #[test]
    fn last_write_wins_within_cycle() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 0);
        let set = slot.setter();
        set.set(1);
        set.set(2);
        set.set(3);
        assert_eq!(rt.render(|| slot.get()), 3);
    }

    #[test]
    fn with_access() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, vec![1, 2, 3]);
        assert_eq!(slot.with(|v| v.iter().sum::<i32>()), 6);
    }

    #[test]
    fn setter_identity_is_stable() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 0);
        let other = Slot::new(&rt, 0);
        assert!(slot.setter().same_slot(&slot.setter()));
        assert!(slot.setter().same_slot(&slot.clone().setter()));
        assert!(!slot.setter().same_slot(&other.setter()));
    }

    #[test]
    fn version_monotonic() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 0);
        let set = slot.setter();
        for i in 1..=100 {
            set.set(i);
        }
        set.set(100);
        assert_eq!(slot.version(), 100);
    }

    #[test]
    fn nan_write_over_nan_is_skipped() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, f64::NAN);
        assert!(!slot.setter().set(f64::NAN));
        assert_eq!(slot.version(), 0);
        assert!(!rt.is_scheduled());

        assert!(slot.setter().set(1.5));
        assert!(slot.setter().set(f64::NAN));
        assert_eq!(slot.version(), 2);
    }

    #[test]
    fn debug_format() {
        let rt = Runtime::new();
        let slot = Slot::new(&rt, 7);
        let dbg = format!("{slot:?}");
        assert!(dbg.contains("Slot"));
        assert!(dbg.contains('7'));
        assert!(format!("{:?}", slot.setter()).contains("SlotSetter"));
    }
}
