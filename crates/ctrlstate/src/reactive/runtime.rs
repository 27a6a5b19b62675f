#![forbid(unsafe_code)]

//! Single-threaded evaluate/commit cycle.
//!
//! # Design
//!
//! A [`Runtime`] is a cheap handle (`Rc<RefCell<..>>`) shared by every slot
//! and effect that belongs to one component tree. One cycle is:
//!
//! ```text
//! render(f)
//!   ├─ clear `scheduled`
//!   ├─ f()                  evaluation: read slots, decide, queue effects
//!   └─ commit
//!        └─ drain effect queue FIFO (effects queued by effects run too)
//! ```
//!
//! Slot writes never re-enter the evaluation. They only set `scheduled`, and
//! the host decides when to run the next cycle ([`Runtime::flush`] loops
//! until the tree settles).
//!
//! # Failure Modes
//!
//! - **Re-entrant render**: starting a render from inside an evaluation or an
//!   effect returns [`RuntimeError::Reentrant`] from [`Runtime::try_render`];
//!   [`Runtime::render`] panics with the same message.
//! - **Non-settling tree**: an effect that writes a new value on every commit
//!   keeps the runtime scheduled forever. [`Runtime::flush`] gives up after
//!   `max_flush_cycles` passes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::RuntimeConfig;
use crate::error::RuntimeError;

type QueuedEffect = Box<dyn FnOnce()>;

struct RuntimeInner {
    config: RuntimeConfig,
    /// A slot changed since the last evaluation started.
    scheduled: bool,
    /// Completed commits.
    cycle: u64,
    /// Post-commit callbacks in queue order.
    effects: VecDeque<QueuedEffect>,
    /// Set for the duration of an evaluation and its commit.
    rendering: bool,
}

/// Handle to the host reactivity engine.
///
/// Cloning a `Runtime` creates a new handle to the **same** engine.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RefCell<RuntimeInner>>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Runtime")
            .field("cycle", &inner.cycle)
            .field("scheduled", &inner.scheduled)
            .field("pending_effects", &inner.effects.len())
            .field("rendering", &inner.rendering)
            .finish()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the `rendering` flag even if the evaluation or an effect panics.
struct RenderGuard<'a> {
    runtime: &'a Runtime,
}

impl Drop for RenderGuard<'_> {
    fn drop(&mut self) {
        self.runtime.inner.borrow_mut().rendering = false;
    }
}

impl Runtime {
    /// Create a runtime with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with an explicit configuration.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RuntimeInner {
                config,
                scheduled: false,
                cycle: 0,
                effects: VecDeque::new(),
                rendering: false,
            })),
        }
    }

    /// The configuration this runtime was built with.
    #[must_use]
    pub fn config(&self) -> RuntimeConfig {
        self.inner.borrow().config.clone()
    }

    /// Request another evaluation pass. Idempotent until the next render.
    pub fn schedule(&self) {
        let mut inner = self.inner.borrow_mut();
        if !inner.scheduled {
            inner.scheduled = true;
            trace!(cycle = inner.cycle, "re-evaluation scheduled");
        }
    }

    /// Whether a slot changed since the last evaluation started.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.inner.borrow().scheduled
    }

    /// Number of completed commits.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.inner.borrow().cycle
    }

    /// Effects queued for the next commit.
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.inner.borrow().effects.len()
    }

    /// Whether an evaluation or commit is currently running.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.inner.borrow().rendering
    }

    pub(crate) fn trace_writes(&self) -> bool {
        self.inner.borrow().config.trace_writes
    }

    /// Queue `effect` to run at the next commit, after every effect already
    /// queued.
    pub fn queue_effect(&self, effect: impl FnOnce() + 'static) {
        self.inner.borrow_mut().effects.push_back(Box::new(effect));
    }

    /// Run one evaluation pass followed by its commit.
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from an evaluation or an effect.
    pub fn render<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.try_render(f) {
            Ok(out) => out,
            Err(err) => panic!("{err}"),
        }
    }

    /// Run one evaluation pass followed by its commit, rejecting re-entrant
    /// calls.
    pub fn try_render<R>(&self, f: impl FnOnce() -> R) -> Result<R, RuntimeError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.rendering {
                return Err(RuntimeError::Reentrant);
            }
            inner.rendering = true;
            inner.scheduled = false;
        }
        let _guard = RenderGuard { runtime: self };

        let out = f();
        self.commit();
        Ok(out)
    }

    /// Render repeatedly until no slot write is pending.
    ///
    /// Returns the output of the last evaluation.
    pub fn flush<R>(&self, mut f: impl FnMut() -> R) -> Result<R, RuntimeError> {
        let limit = self.inner.borrow().config.max_flush_cycles.max(1);
        let mut out = self.try_render(&mut f)?;
        let mut passes = 1usize;
        while self.is_scheduled() {
            if passes >= limit {
                debug!(cycles = passes, "flush gave up with runtime still scheduled");
                return Err(RuntimeError::CycleLimit { cycles: passes });
            }
            out = self.try_render(&mut f)?;
            passes += 1;
        }
        Ok(out)
    }

    /// Drain the effect queue. The borrow is released before each callback
    /// so effects may queue effects, write slots, or schedule.
    fn commit(&self) {
        let mut ran = 0usize;
        loop {
            let next = self.inner.borrow_mut().effects.pop_front();
            match next {
                Some(effect) => {
                    effect();
                    ran += 1;
                }
                None => break,
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.cycle += 1;
        debug!(
            cycle = inner.cycle,
            effects = ran,
            scheduled = inner.scheduled,
            "commit"
        );
    }
}
