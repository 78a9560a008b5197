//! Error types for recplay.
//!
//! All errors are strongly typed using thiserror. Configuration problems are
//! surfaced at construction and are fatal; policy failures are fatal to the
//! loop instance that observed them (sibling loops are unaffected, each owns
//! its state exclusively). Candidate exhaustion is *not* an error: it is a
//! normal terminal state reported as `Ok(None)` by the loop.

use thiserror::Error;

/// Configuration errors, surfaced at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Percentage end conditions require a percentage in (0, 1].
    #[error("Percentage {value} is out of range (0.0, 1.0]")]
    PercentageOutOfRange {
        /// The rejected percentage.
        value: f64,
    },

    /// Fixed-count end conditions require at least one iteration.
    #[error("Fixed-count end condition requires at least 1 iteration")]
    ZeroIterations,

    /// The ranking cutoff must be at least 1.
    #[error("Cutoff must be at least 1, got {value}")]
    InvalidCutoff {
        /// The rejected cutoff.
        value: usize,
    },

    /// The candidate universe is empty, nothing can be simulated.
    #[error("Candidate universe is empty: no (user, item) pair to recommend")]
    EmptyUniverse,

    /// The loop was asked to transition from the wrong phase.
    #[error("Invalid loop phase: expected {expected}, loop is {actual}")]
    InvalidPhase {
        /// Phase the operation requires.
        expected: &'static str,
        /// Phase the loop is in.
        actual: &'static str,
    },
}

/// Failure raised by a [`Policy`](crate::policy::Policy) during decision or
/// feedback.
///
/// A policy failure aborts the current iteration with the loop state exactly
/// as it was before the call. It is fatal for that run: bandit policies are
/// stateful and a partially applied update would corrupt every later
/// decision.
#[derive(Debug, Error)]
#[error("Policy failure: {message}")]
pub struct PolicyError {
    /// What went wrong, from the policy's point of view.
    pub message: String,
}

impl PolicyError {
    /// Creates a policy error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors produced while writing or reading iteration logs.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The log is structurally malformed.
    #[error("Malformed log at line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The header row is missing or unusable.
    #[error("Missing or invalid header row: {reason}")]
    InvalidHeader {
        /// What was wrong with it.
        reason: String,
    },
}

/// Top-level error type for recplay operations.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Policy failure.
    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Iteration log error.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}

impl ReplayError {
    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a policy failure.
    #[must_use]
    pub const fn is_policy(&self) -> bool {
        matches!(self, Self::Policy(_))
    }
}

/// Result type alias for recplay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;
