//! Warmup trajectories.
//!
//! An ordered prefix of interactions consumed before live simulation starts.
//! The loop reads it, never mutates it: warmup pairs are subtracted from
//! availability, fed to every metric's `initialize`, handed to the policy,
//! and counted into the end condition.

use crate::dataset::Dataset;
use crate::record::{InteractionRecord, ItemIdx, UserIdx};

/// Read-only ordered sequence of pre-simulation interactions.
#[derive(Debug, Clone, Default)]
pub struct WarmupTrajectory {
    records: Vec<InteractionRecord>,
}

impl WarmupTrajectory {
    /// Wraps an ordered record sequence.
    #[must_use]
    pub fn from_records(records: Vec<InteractionRecord>) -> Self {
        Self { records }
    }

    /// Resolves raw (user, item) pairs against a dataset, in order.
    ///
    /// Pairs the dataset cannot reveal resolve to value 0.0; the trajectory
    /// is usable either way (replaying against a slightly different universe
    /// is a documented caveat, not a crash).
    #[must_use]
    pub fn resolve(pairs: &[(UserIdx, ItemIdx)], dataset: &dyn Dataset) -> Self {
        let records = pairs
            .iter()
            .map(|&(user, item)| {
                InteractionRecord::new(user, item, dataset.reveal(user, item).unwrap_or(0.0))
            })
            .collect();
        Self { records }
    }

    /// The records, in consumption order.
    #[must_use]
    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    /// Number of warmup records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when there is no warmup.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
