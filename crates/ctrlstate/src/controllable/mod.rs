#![forbid(unsafe_code)]

//! Controlled/uncontrolled value ownership.
//!
//! - [`UncontrolledStore`]: the self-owned value, seeded once from a default,
//!   with commit-phase change notification.
//! - [`ControllableState`]: decides per evaluation whether the caller's value
//!   or the store is authoritative and routes writes accordingly.
//! - [`SetStateAction`] / [`OnChange`]: the write request and notifier types
//!   both modes share.
//!
//! # Invariants
//!
//! 1. Ownership is recomputed from the presence of the external value on
//!    every evaluation.
//! 2. The notifier fires at most once per actual transition and never for a
//!    write that reproduces the current value.
//! 3. The notifier always receives a resolved value, never an updater.
//! 4. Controlled writes never touch the store.

pub mod action;
pub mod arbiter;
pub mod store;

pub use action::{OnChange, SetStateAction};
pub use arbiter::{ControllableState, Ownership, SetState, StateProps};
pub use store::{StoreSetter, UncontrolledStore};
