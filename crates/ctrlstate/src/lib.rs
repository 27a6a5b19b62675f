#![forbid(unsafe_code)]

//! Controlled/uncontrolled state arbitration for reactive UI components.
//!
//! # Role
//! A component that exposes a value (a toggle's `checked`, a tab strip's
//! selected index, a text field's contents) usually wants to support two
//! operating modes:
//!
//! - **Controlled**: the owner passes the current value in on every cycle and
//!   receives change requests through a callback.
//! - **Uncontrolled**: the component keeps the value itself, seeded from an
//!   optional default, and still reports changes through the callback.
//!
//! [`ControllableState`] presents one read/write surface for both modes. The
//! component reads the value and calls the setter without knowing who owns
//! the value on this cycle.
//!
//! # Primary pieces
//! - [`reactive`]: a small single-threaded host engine: [`Runtime`] (the
//!   evaluate/commit cycle), [`Slot`] (persistent storage with a scheduling
//!   setter) and [`Effect`] (post-commit, dependency gated callbacks).
//! - [`controllable`]: the [`UncontrolledStore`] and the ownership arbiter
//!   [`ControllableState`] built on top of it.
//! - [`config`]: [`RuntimeConfig`] with environment overrides.
//!
//! # Example
//!
//! ```
//! use ctrlstate::{ControllableState, Runtime, StateProps};
//!
//! let rt = Runtime::new();
//! let state = ControllableState::new(&rt);
//!
//! let (value, set) = rt.render(|| state.evaluate(StateProps::uncontrolled().default_value(0)));
//! assert_eq!(value, Some(0));
//!
//! set.update(|prev| prev + 1);
//! let (value, _) = rt.render(|| state.evaluate(StateProps::uncontrolled().default_value(0)));
//! assert_eq!(value, Some(1));
//! ```

pub mod config;
pub mod controllable;
pub mod error;
pub mod reactive;

pub use config::{ConfigError, ConfigParse, RuntimeConfig};
pub use controllable::{
    ControllableState, OnChange, Ownership, SetState, SetStateAction, StateProps, StoreSetter,
    UncontrolledStore,
};
pub use error::RuntimeError;
pub use reactive::{Effect, Runtime, Slot, SlotSetter};
