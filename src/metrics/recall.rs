//! Cumulative recall.
//!
//! Fraction of the universe's relevant pairs already surfaced by the live
//! simulation. The denominator is the total relevant count supplied at
//! construction minus relevant pairs consumed by the warmup prefix; warmup
//! consumption shrinks the denominator, it never counts as a live hit.

use std::collections::HashSet;

use crate::metrics::CumulativeMetric;
use crate::record::{InteractionRecord, ItemIdx, UserIdx};

/// Running recall over the relevant-pair universe. Non-decreasing, in [0, 1].
#[derive(Debug, Clone)]
pub struct CumulativeRecall {
    threshold: f64,
    num_rel: u64,
    to_remove: u64,
    current: u64,
}

impl CumulativeRecall {
    /// Creates a recall accumulator.
    ///
    /// `num_rel` is the number of relevant pairs in the full universe,
    /// computed externally once (see
    /// [`Dataset::total_relevant`](crate::dataset::Dataset::total_relevant)).
    #[must_use]
    pub const fn new(threshold: f64, num_rel: u64) -> Self {
        Self {
            threshold,
            num_rel,
            to_remove: 0,
            current: 0,
        }
    }

    fn denominator(&self) -> u64 {
        self.num_rel.saturating_sub(self.to_remove)
    }
}

impl CumulativeMetric for CumulativeRecall {
    fn name(&self) -> &str {
        "recall"
    }

    fn initialize(&mut self, warmup: &[InteractionRecord], not_reciprocal: bool) {
        self.reset();

        if not_reciprocal {
            // Shared index space: a relevant pair and its mirror consume one
            // unordered slot of the denominator.
            let mut seen: HashSet<(UserIdx, ItemIdx)> = HashSet::new();
            for rec in warmup {
                if rec.is_positive(self.threshold) {
                    let key = (rec.user.min(rec.item), rec.user.max(rec.item));
                    if seen.insert(key) {
                        self.to_remove += 1;
                    }
                }
            }
        } else {
            self.to_remove = warmup
                .iter()
                .filter(|r| r.is_positive(self.threshold))
                .count() as u64;
        }
    }

    fn update(&mut self, _user: UserIdx, _item: ItemIdx, value: f64) {
        if value >= self.threshold {
            self.current += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self) -> f64 {
        let denom = self.denominator();
        if denom == 0 {
            return 0.0;
        }
        self.current as f64 / denom as f64
    }

    fn reset(&mut self) {
        self.to_remove = 0;
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(user: UserIdx, item: ItemIdx, value: f64) -> InteractionRecord {
        InteractionRecord::new(user, item, value)
    }

    #[test]
    fn test_recall_counts_positives_over_num_rel() {
        let mut m = CumulativeRecall::new(0.5, 4);
        m.update(0, 0, 1.0);
        m.update(0, 1, 0.0);
        m.update(1, 0, 1.0);
        assert!((m.compute() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_recall_is_monotone_and_bounded() {
        let mut m = CumulativeRecall::new(0.5, 3);
        let mut last = m.compute();
        for value in [0.0, 1.0, 0.0, 1.0, 1.0] {
            m.update(0, 0, value);
            let now = m.compute();
            assert!(now >= last, "recall must never decrease");
            assert!((0.0..=1.0).contains(&now));
            last = now;
        }
        assert!((last - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_warmup_shrinks_denominator() {
        let mut m = CumulativeRecall::new(0.5, 4);
        m.initialize(&[rec(0, 0, 1.0), rec(0, 1, 0.0)], false);

        // One relevant pair consumed by warmup: denominator is 3.
        m.update(1, 0, 1.0);
        assert!((m.compute() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_warmup_not_reciprocal_dedupes_mirrors() {
        let mut m = CumulativeRecall::new(0.5, 3);
        m.initialize(&[rec(0, 1, 1.0), rec(1, 0, 1.0)], true);

        // (0,1) and (1,0) consume one unordered slot: denominator is 2.
        m.update(2, 0, 1.0);
        assert!((m.compute() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominator_yields_zero() {
        let mut m = CumulativeRecall::new(0.5, 0);
        m.update(0, 0, 1.0);
        assert!(m.compute().abs() < f64::EPSILON);

        let mut m = CumulativeRecall::new(0.5, 1);
        m.initialize(&[rec(0, 0, 1.0)], false);
        assert!(m.compute().abs() < f64::EPSILON);
    }
}
