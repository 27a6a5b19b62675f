#![forbid(unsafe_code)]

//! Write requests and change notifiers shared by both ownership modes.

use std::fmt;
use std::rc::Rc;

/// A write request: either a literal next value or a pure updater computed
/// from the previous value.
pub enum SetStateAction<T> {
    /// Replace the value.
    Value(T),
    /// Derive the next value from the previous one.
    Update(Box<dyn FnOnce(&T) -> T>),
}

impl<T> SetStateAction<T> {
    /// Wrap an updater closure.
    pub fn update(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Self::Update(Box::new(f))
    }

    /// Turn the request into a concrete value given the previous one.
    pub fn resolve(self, prev: &T) -> T {
        match self {
            Self::Value(value) => value,
            Self::Update(f) => f(prev),
        }
    }

    /// Whether this request needs a previous value to resolve.
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(self, Self::Update(_))
    }
}

impl<T> From<T> for SetStateAction<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for SetStateAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Update(_) => f.write_str("Update(..)"),
        }
    }
}

/// Optional change notifier. The default is a no-op.
///
/// Cloning shares the same callback; [`OnChange::same_callback`] compares
/// identity.
pub struct OnChange<T> {
    callback: Option<Rc<dyn Fn(&T)>>,
}

impl<T> Clone for OnChange<T> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
        }
    }
}

impl<T> Default for OnChange<T> {
    fn default() -> Self {
        Self::noop()
    }
}

impl<T> fmt::Debug for OnChange<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.callback {
            Some(_) => f.write_str("OnChange(fn)"),
            None => f.write_str("OnChange(noop)"),
        }
    }
}

impl<T> OnChange<T> {
    /// A notifier that drops every change.
    #[must_use]
    pub fn noop() -> Self {
        Self { callback: None }
    }

    pub fn new(f: impl Fn(&T) + 'static) -> Self {
        Self {
            callback: Some(Rc::new(f)),
        }
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.callback.is_none()
    }

    /// Invoke the callback, if any.
    pub fn call(&self, value: &T) {
        if let Some(callback) = &self.callback {
            callback(value);
        }
    }

    /// Whether both notifiers wrap the same callback (two no-ops compare
    /// equal).
    #[must_use]
    pub fn same_callback(&self, other: &Self) -> bool {
        match (&self.callback, &other.callback) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn value_resolves_to_itself() {
        assert_eq!(SetStateAction::Value(3).resolve(&10), 3);
        assert_eq!(SetStateAction::from(4).resolve(&10), 4);
    }

    #[test]
    fn update_resolves_against_prev() {
        let action = SetStateAction::update(|prev: &i32| prev + 1);
        assert!(action.is_update());
        assert_eq!(action.resolve(&5), 6);
    }

    #[test]
    fn noop_ignores_calls() {
        let on_change = OnChange::<i32>::noop();
        assert!(on_change.is_noop());
        on_change.call(&1);
        assert!(OnChange::<i32>::default().is_noop());
    }

    #[test]
    fn callback_receives_value() {
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let on_change = OnChange::new(move |v: &i32| s.set(*v));
        on_change.call(&7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn identity_comparison() {
        let a = OnChange::new(|_: &i32| {});
        let b = OnChange::new(|_: &i32| {});
        assert!(a.same_callback(&a.clone()));
        assert!(!a.same_callback(&b));
        assert!(OnChange::<i32>::noop().same_callback(&OnChange::noop()));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", SetStateAction::Value(1)), "Value(1)");
        assert_eq!(
            format!("{:?}", SetStateAction::update(|v: &i32| *v)),
            "Update(..)"
        );
        assert_eq!(format!("{:?}", OnChange::<i32>::noop()), "OnChange(noop)");
    }
}
