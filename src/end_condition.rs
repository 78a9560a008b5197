//! End conditions for the recommendation loop.
//!
//! An end condition is a small state machine fed one revealed record per
//! accepted decision. It decides when a run stops; candidate exhaustion is a
//! separate, loop-level termination signal and is never the condition's
//! business.

use crate::error::ConfigError;
use crate::record::InteractionRecord;

/// Stateful stop predicate over the stream of revealed records.
///
/// Counters are monotone and rewound only by an explicit [`reset`](EndCondition::reset).
pub trait EndCondition: Send {
    /// Returns true once the run should stop.
    fn has_ended(&self) -> bool;

    /// Feeds one revealed record into the condition's counters.
    fn advance(&mut self, revealed: &InteractionRecord);

    /// Rewinds all counters to their initial state.
    fn reset(&mut self);
}

/// Terminal once a fixed number of iterations has been seen.
#[derive(Debug, Clone)]
pub struct FixedCount {
    target: u64,
    seen: u64,
}

impl FixedCount {
    /// Creates a condition that fires exactly after `target` records.
    ///
    /// # Errors
    /// `ConfigError::ZeroIterations` if `target` is 0.
    pub fn new(target: u64) -> Result<Self, ConfigError> {
        if target == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(Self { target, seen: 0 })
    }
}

impl EndCondition for FixedCount {
    fn has_ended(&self) -> bool {
        self.seen >= self.target
    }

    fn advance(&mut self, _revealed: &InteractionRecord) {
        self.seen += 1;
    }

    fn reset(&mut self) {
        self.seen = 0;
    }
}

/// Terminal once a percentage of the universe's relevant pairs has been
/// revealed as positive.
#[derive(Debug, Clone)]
pub struct PositivePercentage {
    threshold: f64,
    target: u64,
    positives: u64,
}

impl PositivePercentage {
    /// Creates a condition that fires on the ⌈percentage · total_relevant⌉-th
    /// positive reveal (`value >= threshold`).
    ///
    /// A universe with no relevant pairs makes the condition immediately
    /// terminal: the target is already satisfied, and this doubles as the
    /// divide-by-zero guard.
    ///
    /// # Errors
    /// `ConfigError::PercentageOutOfRange` unless `percentage` ∈ (0, 1].
    pub fn new(percentage: f64, threshold: f64, total_relevant: u64) -> Result<Self, ConfigError> {
        if !(percentage > 0.0 && percentage <= 1.0) {
            return Err(ConfigError::PercentageOutOfRange { value: percentage });
        }

        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target = (percentage * total_relevant as f64).ceil() as u64;

        Ok(Self {
            threshold,
            target,
            positives: 0,
        })
    }
}

impl EndCondition for PositivePercentage {
    fn has_ended(&self) -> bool {
        self.positives >= self.target
    }

    fn advance(&mut self, revealed: &InteractionRecord) {
        if revealed.is_positive(self.threshold) {
            self.positives += 1;
        }
    }

    fn reset(&mut self) {
        self.positives = 0;
    }
}

/// Never terminal; the run stops only when the loop exhausts its candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimit;

impl EndCondition for NoLimit {
    fn has_ended(&self) -> bool {
        false
    }

    fn advance(&mut self, _revealed: &InteractionRecord) {}

    fn reset(&mut self) {}
}
