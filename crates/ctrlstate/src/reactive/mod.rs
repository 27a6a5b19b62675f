#![forbid(unsafe_code)]

//! Host reactivity engine.
//!
//! This module provides the three capabilities the controllable primitive
//! needs from its host:
//!
//! - [`Slot`]: identity-stable storage across evaluation cycles with a
//!   scheduling setter ([`SlotSetter`]).
//! - [`Effect`]: a callback run after commit, re-queued only when its
//!   declared dependencies change.
//! - `PartialEq` as the dependency comparison.
//!
//! [`Runtime`] ties them together: it owns the schedule flag and the effect
//! queue, and drives the evaluate/commit cycle.
//!
//! # Architecture
//!
//! Everything is single-threaded and uses `Rc<RefCell<..>>` for shared
//! ownership. No borrow is held while user code (evaluations, updaters,
//! effects) runs.
//!
//! # Invariants
//!
//! 1. A slot's version increments exactly once per value-changing write.
//! 2. Writing a value equal to the current one is a no-op (no version bump,
//!    no schedule).
//! 3. Effects run after the evaluation that queued them, in queue order.
//! 4. An effect is queued at most once per distinct dependency value.
//!
//! # Equality
//!
//! Every comparison goes through [`same_value`]: `PartialEq`, except that a
//! NaN float (`f32`/`f64`, bare or in an `Option`) counts as the same as
//! another NaN. Without that, a NaN would look like a fresh transition on
//! every cycle. Composite values holding a NaN keep plain `PartialEq`, so two
//! of them never compare as the same and no write is ever dropped.

pub mod effect;
pub mod runtime;
pub mod slot;

pub use effect::Effect;
pub use runtime::Runtime;
pub use slot::{Slot, SlotSetter};

use std::any::Any;

/// `PartialEq`, with NaN floats treated as equal to each other.
#[inline]
pub(crate) fn same_value<T: PartialEq + 'static>(a: &T, b: &T) -> bool {
    a == b || (is_nan(a) && is_nan(b))
}

fn is_nan(value: &dyn Any) -> bool {
    if let Some(v) = value.downcast_ref::<f64>() {
        return v.is_nan();
    }
    if let Some(v) = value.downcast_ref::<f32>() {
        return v.is_nan();
    }
    if let Some(v) = value.downcast_ref::<Option<f64>>() {
        return v.is_some_and(f64::is_nan);
    }
    if let Some(v) = value.downcast_ref::<Option<f32>>() {
        return v.is_some_and(f32::is_nan);
    }
    false
}
