#![forbid(unsafe_code)]

//! Errors raised by the host [`Runtime`](crate::Runtime).
//!
//! The controllable primitive itself never fails. Only driving the
//! evaluate/commit cycle can go wrong.

use std::fmt;

/// Failures of the evaluate/commit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// [`Runtime::flush`](crate::Runtime::flush) ran the configured number of
    /// passes and the runtime was still scheduled.
    CycleLimit {
        /// Passes executed before giving up.
        cycles: usize,
    },
    /// A render was started from inside another render or its commit.
    Reentrant,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleLimit { cycles } => {
                write!(f, "runtime still scheduled after {cycles} evaluation cycles")
            }
            Self::Reentrant => write!(f, "render started while another render is in progress"),
        }
    }
}

impl std::error::Error for RuntimeError {}
