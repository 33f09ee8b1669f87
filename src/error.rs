//! Error types for the ternary ROBDD core.
//!
//! Budget exhaustion is deliberately absent from this enum: running out of
//! node budget is a sound outcome (a substitution of `unknown`), not a
//! failure. Only conditions that unwind the whole recursion live here.

use std::fmt;

/// Failure conditions that can abort a reduced operation before it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The cooperative cancellation probe observed an expired deadline.
    Timeout,
    /// Two edges passed to the same operation were built by different managers.
    DifferentManager,
    /// The node arena could not grow to satisfy a unique-table insertion.
    TooManyNodes,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Timeout => write!(f, "reduced operation exceeded its deadline"),
            CoreError::DifferentManager => {
                write!(f, "edges belong to different managers and cannot be combined")
            }
            CoreError::TooManyNodes => write!(f, "node arena exhausted its capacity"),
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
