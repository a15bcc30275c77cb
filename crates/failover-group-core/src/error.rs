//! The error returned when every backend of a group failed.
//!
//! Individual attempt errors are never returned on their own. A group either
//! succeeds on some backend or reports one [`ExhaustedError`] carrying the
//! messages of every attempt, in the order the backends were tried.
//!
//! The rendered message has a fixed shape that downstream log parsers may
//! depend on:
//!
//! ```text
//! <N> services failed, could not complete action (<msg1>, <msg2>, ...)
//! ```
//!
//! where `N` is the number of backends in the group, not the number tried.
//!
//! ```
//! use failover_group_core::ExhaustedError;
//!
//! let err = ExhaustedError::new(2, vec!["refused".into(), "timed out".into()]);
//! assert_eq!(
//!     err.to_string(),
//!     "2 services failed, could not complete action (refused, timed out)"
//! );
//! assert_eq!(err.attempts(), 2);
//! ```

/// Every backend in a group failed the action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{total} services failed, could not complete action ({})", .failures.join(", "))]
pub struct ExhaustedError {
    total: usize,
    failures: Vec<String>,
}

impl ExhaustedError {
    /// Creates an error for a group of `total` backends with the given
    /// attempt messages, in attempt order.
    pub fn new(total: usize, failures: Vec<String>) -> Self {
        Self { total, failures }
    }

    /// Number of backends in the group at the time of the call.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Messages of the failed attempts, in the order the backends were tried.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Number of backends that were actually tried.
    pub fn attempts(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if the group had no backends to try.
    pub fn is_empty_group(&self) -> bool {
        self.total == 0
    }

    /// Consumes the error, returning the attempt messages.
    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }
}
