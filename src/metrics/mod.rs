//! Cumulative metric accumulators.
//!
//! Each accumulator consumes one revealed record at a time and answers
//! [`compute`](CumulativeMetric::compute) from private running aggregates,
//! never by re-scanning history. State is owned exclusively by one loop
//! instance and is reset only by an explicit [`reset`](CumulativeMetric::reset).

pub mod basic;
pub mod epc;
pub mod gini;
pub mod ild;
pub mod recall;

pub use basic::{ClickthroughRate, CumulativeCounter, CumulativeHits};
pub use epc::CumulativeEPC;
pub use gini::CumulativeGini;
pub use ild::{CumulativeILD, ItemDistance, PairwiseDistance};
pub use recall::CumulativeRecall;

use crate::record::{InteractionRecord, ItemIdx, UserIdx};

/// Streaming statistic over the sequence of revealed records.
///
/// The contract that makes warmup and resume exact: `initialize(prefix, _)`
/// must leave the accumulator in the state that `reset` followed by one
/// `update` per prefix record would produce. The default implementation does
/// literally that; accumulators with dedicated training-prefix handling
/// (recall's denominator split) override it.
pub trait CumulativeMetric: Send {
    /// Short stable name, used as the log header for this metric's column.
    fn name(&self) -> &str;

    /// Pre-conditions the accumulator with a warmup trajectory.
    fn initialize(&mut self, warmup: &[InteractionRecord], not_reciprocal: bool) {
        let _ = not_reciprocal;
        self.reset();
        for rec in warmup {
            self.update(rec.user, rec.item, rec.value);
        }
    }

    /// Feeds one revealed (user, item, value) into the running aggregates.
    fn update(&mut self, user: UserIdx, item: ItemIdx, value: f64);

    /// Current value of the metric. O(1); never re-scans history.
    fn compute(&self) -> f64;

    /// Clears all running aggregates.
    fn reset(&mut self);
}
