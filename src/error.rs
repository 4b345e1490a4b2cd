//! Error types used by the coordination primitives.
//!
//! - [`PoolError`]: submitting to or shutting down a [`WorkerPool`](crate::WorkerPool).
//! - [`DeadlineError`]: why a [`Deadline`](crate::Deadline) fired.
//! - [`CheckError`]: failure reported by a retried check.
//! - [`RetryError`]: terminal outcome of a [`Retry`](crate::Retry) loop.
//! - [`FanOutError`]: a fan-out collector lost one of its units.
//!
//! Every enum carries an `as_label` helper returning a stable snake_case label
//! for logs and metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a worker pool.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Submission attempted after [`WorkerPool::close`](crate::WorkerPool::close).
    ///
    /// This is a programmer error: it is surfaced, never retried.
    #[error("pool is closed")]
    Closed,

    /// Submission did not complete before its deadline fired.
    #[error("submission abandoned: {cause}")]
    Abandoned {
        /// Why the deadline fired.
        cause: DeadlineError,
    },

    /// Shutdown grace period elapsed while some workers were still running.
    #[error("shutdown grace {grace:?} exceeded; stuck workers: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Ids of the workers that had not terminated in time.
        stuck: Vec<usize>,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use corral::PoolError;
    ///
    /// assert_eq!(PoolError::Closed.as_label(), "pool_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::Closed => "pool_closed",
            PoolError::Abandoned { .. } => "pool_submit_abandoned",
            PoolError::GraceExceeded { .. } => "pool_grace_exceeded",
        }
    }
}

/// # Cause recorded by a fired deadline.
///
/// A deadline fires at most once; the first cause wins and never changes.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineError {
    /// The timeout elapsed.
    #[error("deadline exceeded after {timeout:?}")]
    Exceeded {
        /// The timeout the deadline was created with.
        timeout: Duration,
    },

    /// The owner cancelled explicitly.
    #[error("context cancelled")]
    Cancelled,
}

impl DeadlineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DeadlineError::Exceeded { .. } => "deadline_exceeded",
            DeadlineError::Cancelled => "deadline_cancelled",
        }
    }

    /// Returns `true` when the deadline fired because its timer elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeadlineError::Exceeded { .. })
    }
}

/// # Errors reported by a retried check.
///
/// [`CheckError::Fail`] is transient and retried until the deadline fires;
/// [`CheckError::Fatal`] stops the loop at once.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// Check failed but may succeed if retried.
    #[error("check failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable failure (should not be retried).
    #[error("fatal check error (no retry): {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },
}

impl CheckError {
    /// Shorthand for a retryable [`CheckError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        CheckError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for a non-retryable [`CheckError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        CheckError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CheckError::Fail { .. } => "check_failed",
            CheckError::Fatal { .. } => "check_fatal",
        }
    }

    /// Indicates whether the error type is safe to retry.
    ///
    /// # Example
    /// ```
    /// use corral::CheckError;
    ///
    /// assert!(CheckError::fail("ping error").is_retryable());
    /// assert!(!CheckError::fatal("bad credentials").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckError::Fail { .. })
    }
}

/// # Terminal outcome of a retry loop that never succeeded.
///
/// The deadline variants wrap the last check error seen; at least one attempt
/// is always made, so `last` is always present.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetryError {
    /// The deadline's timer elapsed before a check succeeded.
    #[error("deadline exceeded after {attempts} attempt(s); last error: {last}")]
    DeadlineExceeded {
        /// Number of check invocations made.
        attempts: u32,
        /// Error returned by the final check.
        last: CheckError,
    },

    /// The deadline was cancelled before a check succeeded.
    #[error("cancelled after {attempts} attempt(s); last error: {last}")]
    Cancelled {
        /// Number of check invocations made.
        attempts: u32,
        /// Error returned by the final check.
        last: CheckError,
    },

    /// A check returned [`CheckError::Fatal`].
    #[error("aborted on attempt {attempts}: {error}")]
    Fatal {
        /// Number of check invocations made.
        attempts: u32,
        /// The fatal error.
        error: CheckError,
    },
}

impl RetryError {
    pub(crate) fn from_deadline(cause: DeadlineError, attempts: u32, last: CheckError) -> Self {
        match cause {
            DeadlineError::Exceeded { .. } => RetryError::DeadlineExceeded { attempts, last },
            DeadlineError::Cancelled => RetryError::Cancelled { attempts, last },
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::DeadlineExceeded { .. } => "retry_deadline_exceeded",
            RetryError::Cancelled { .. } => "retry_cancelled",
            RetryError::Fatal { .. } => "retry_fatal",
        }
    }

    /// Number of check invocations made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::DeadlineExceeded { attempts, .. }
            | RetryError::Cancelled { attempts, .. }
            | RetryError::Fatal { attempts, .. } => *attempts,
        }
    }

    /// The last error returned by the check.
    pub fn last_error(&self) -> &CheckError {
        match self {
            RetryError::DeadlineExceeded { last, .. } | RetryError::Cancelled { last, .. } => last,
            RetryError::Fatal { error, .. } => error,
        }
    }
}

/// # Errors produced by a fan-out collector.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FanOutError {
    /// Some units terminated (panicked) without delivering a result.
    #[error("fan-out lost results: expected {expected}, received {received}")]
    Lost {
        /// Number of units spawned.
        expected: usize,
        /// Number of results actually collected.
        received: usize,
    },
}

impl FanOutError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FanOutError::Lost { .. } => "fanout_lost",
        }
    }
}
