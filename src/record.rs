//! Core interaction types.
//!
//! Users and items are addressed by dense integer indices assigned by an
//! external index layer; the engine never sees raw identifiers. The
//! [`InteractionRecord`] is the atomic currency of a simulation: one revealed
//! (user, item, value) triple.

use serde::{Deserialize, Serialize};

/// Dense user index (`uidx`).
pub type UserIdx = usize;

/// Dense item index (`iidx`).
pub type ItemIdx = usize;

/// One revealed interaction: the true value the dataset holds for a
/// (user, item) pair.
///
/// Records are immutable; the loop produces them on reveal and hands copies
/// to the policy, the metric accumulators, and the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// The user the decision was made for.
    pub user: UserIdx,
    /// The recommended item.
    pub item: ItemIdx,
    /// The revealed value (rating, click indicator, edge weight).
    pub value: f64,
}

impl InteractionRecord {
    /// Creates a new record.
    #[must_use]
    pub const fn new(user: UserIdx, item: ItemIdx, value: f64) -> Self {
        Self { user, item, value }
    }

    /// Returns true if this record counts as positive under `threshold`.
    #[must_use]
    pub fn is_positive(&self, threshold: f64) -> bool {
        self.value >= threshold
    }
}
