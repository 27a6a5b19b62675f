#![forbid(unsafe_code)]

//! Post-commit side effects gated on declared dependencies.
//!
//! An [`Effect<D>`] is owned by one component instance and called once per
//! evaluation with the current dependency values. The callback is queued on
//! the [`Runtime`] for the next commit only on the first evaluation and
//! whenever the dependencies differ (by [`same_value`](super::same_value))
//! from the last queued ones.

use std::cell::RefCell;
use std::fmt;

use super::runtime::Runtime;
use super::same_value;

/// A dependency-gated post-commit callback slot.
pub struct Effect<D> {
    /// Dependencies of the last queued run (`None` before the first run).
    last: RefCell<Option<D>>,
}

impl<D> Default for Effect<D> {
    fn default() -> Self {
        Self {
            last: RefCell::new(None),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for Effect<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("last_deps", &self.last.borrow())
            .finish()
    }
}

impl<D: Clone + PartialEq + 'static> Effect<D> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `callback` for the next commit if `deps` changed.
    ///
    /// Returns `true` if the callback was queued.
    pub fn run(&self, runtime: &Runtime, deps: D, callback: impl FnOnce() + 'static) -> bool {
        {
            let mut last = self.last.borrow_mut();
            if last.as_ref().is_some_and(|last| same_value(last, &deps)) {
                return false;
            }
            *last = Some(deps);
        }
        runtime.queue_effect(callback);
        true
    }

    /// Dependencies recorded by the last queued run.
    #[must_use]
    pub fn last_deps(&self) -> Option<D> {
        self.last.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn first_run_always_queues() {
        let rt = Runtime::new();
        let effect = Effect::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);

        rt.render(|| effect.run(&rt, 1, move || h.set(h.get() + 1)));
        assert_eq!(hits.get(), 1);
        assert_eq!(effect.last_deps(), Some(1));
    }

    #[test]
    fn unchanged_deps_skip() {
        let rt = Runtime::new();
        let effect = Effect::new();
        let hits = Rc::new(Cell::new(0u32));

        for deps in [1, 1, 2, 2, 2, 3] {
            let h = Rc::clone(&hits);
            rt.render(|| effect.run(&rt, deps, move || h.set(h.get() + 1)));
        }
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn callback_waits_for_commit() {
        let rt = Runtime::new();
        let effect = Effect::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let seen_during_eval = rt.render(|| {
            effect.run(&rt, "dep", move || h.set(h.get() + 1));
            hits.get()
        });
        assert_eq!(seen_during_eval, 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn nan_deps_count_as_unchanged() {
        let rt = Runtime::new();
        let effect = Effect::new();
        let hits = Rc::new(Cell::new(0u32));
        for _ in 0..3 {
            let h = Rc::clone(&hits);
            rt.render(|| effect.run(&rt, Some(f64::NAN), move || h.set(h.get() + 1)));
        }
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn repeated_evaluation_before_commit_queues_once() {
        let rt = Runtime::new();
        let effect = Effect::new();
        let hits = Rc::new(Cell::new(0u32));
        rt.render(|| {
            for _ in 0..3 {
                let h = Rc::clone(&hits);
                effect.run(&rt, 9, move || h.set(h.get() + 1));
            }
        });
        assert_eq!(hits.get(), 1);
    }
}
