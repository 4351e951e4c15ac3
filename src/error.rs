//! Errors reported by [`ProgressBar`](crate::ProgressBar) operations.
//!
//! Errors are only ever raised synchronously on the caller's thread. The render path
//! itself never fails: anything that goes wrong while drawing (a closed pipe, a
//! degenerate measurement) resolves to a sentinel value or a dropped frame.

use thiserror::Error;

/// Errors returned by fallible bar operations.
///
/// A call that fails leaves the bar exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BarError {
    /// The configuration cannot drive a bar (zero total tasks, zero step).
    #[error("invalid progress bar configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration.
        reason: &'static str,
    },

    /// The operation is not allowed in the bar's current state.
    #[error("invalid progress bar state: {reason}")]
    InvalidState {
        /// Which state rejected the operation.
        reason: &'static str,
    },
}

impl BarError {
    pub(crate) const fn zero_total() -> Self {
        Self::InvalidConfig {
            reason: "the number of tasks is zero",
        }
    }

    pub(crate) const fn zero_step() -> Self {
        Self::InvalidConfig {
            reason: "the step is zero",
        }
    }

    pub(crate) const fn already_finished() -> Self {
        Self::InvalidState {
            reason: "updating a finished progress bar",
        }
    }
}
