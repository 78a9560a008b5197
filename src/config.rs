//! Loop configuration.
//!
//! Serde-deserializable configuration for a single loop instance, including
//! the end-condition factory. Orchestrators typically parse this from a JSON
//! experiment description; every parameter is validated at build time and
//! problems are fatal, never silently defaulted.

use serde::{Deserialize, Serialize};

use crate::end_condition::{EndCondition, FixedCount, NoLimit, PositivePercentage};
use crate::error::ConfigError;

/// End-condition selection, tagged for JSON configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EndConditionConfig {
    /// Stop after exactly `iterations` accepted decisions.
    FixedCount {
        /// Number of iterations to run.
        iterations: u64,
    },

    /// Stop once `percentage` of the universe's relevant pairs has been
    /// revealed as positive.
    PositivePercentage {
        /// Fraction of relevant pairs to uncover, in (0, 1].
        percentage: f64,
        /// Relevance threshold a revealed value must reach to count.
        threshold: f64,
    },

    /// Run until the candidate universe is exhausted.
    NoLimit,
}

impl EndConditionConfig {
    /// Builds the configured end condition.
    ///
    /// `total_relevant` is the relevant-pair count of the full universe,
    /// computed externally once; only percentage conditions consume it.
    ///
    /// # Errors
    /// [`ConfigError`] when a parameter is out of range.
    pub fn build(&self, total_relevant: u64) -> Result<Box<dyn EndCondition>, ConfigError> {
        match *self {
            Self::FixedCount { iterations } => Ok(Box::new(FixedCount::new(iterations)?)),
            Self::PositivePercentage {
                percentage,
                threshold,
            } => Ok(Box::new(PositivePercentage::new(
                percentage,
                threshold,
                total_relevant,
            )?)),
            Self::NoLimit => Ok(Box::new(NoLimit)),
        }
    }
}

/// Configuration of one recommendation loop instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Items per decision: 1 = single-item mode, >1 = ranking mode. Fixed
    /// for the lifetime of the loop.
    #[serde(default = "default_cutoff")]
    pub cutoff: usize,

    /// Explicit RNG seed; persisted with the run so replay can reconstruct
    /// the exact stream.
    pub seed: u64,

    /// Relevance threshold used by recall-style accounting.
    #[serde(default)]
    pub threshold: f64,

    /// Contact-recommendation symmetry: revealing (u, v) also retires (v, u).
    #[serde(default)]
    pub not_reciprocal: bool,

    /// When to stop.
    pub end_condition: EndConditionConfig,
}

impl LoopConfig {
    /// Validates cross-field constraints.
    ///
    /// # Errors
    /// [`ConfigError::InvalidCutoff`] when `cutoff` is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cutoff == 0 {
            return Err(ConfigError::InvalidCutoff { value: 0 });
        }
        Ok(())
    }
}

const fn default_cutoff() -> usize {
    1
}
