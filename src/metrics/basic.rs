//! Counting baselines: hits, iteration count, click-through rate.
//!
//! These are the O(1) correctness anchors for the heavier accumulators.

use crate::metrics::CumulativeMetric;
use crate::record::{ItemIdx, UserIdx};

/// Number of positive reveals (`value >= threshold`) so far.
#[derive(Debug, Clone)]
pub struct CumulativeHits {
    threshold: f64,
    hits: u64,
}

impl CumulativeHits {
    /// Creates a hit counter with the given relevance threshold.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold, hits: 0 }
    }
}

impl CumulativeMetric for CumulativeHits {
    fn name(&self) -> &str {
        "hits"
    }

    fn update(&mut self, _user: UserIdx, _item: ItemIdx, value: f64) {
        if value >= self.threshold {
            self.hits += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self) -> f64 {
        self.hits as f64
    }

    fn reset(&mut self) {
        self.hits = 0;
    }
}

/// Total number of revealed records so far.
#[derive(Debug, Clone, Default)]
pub struct CumulativeCounter {
    count: u64,
}

impl CumulativeCounter {
    /// Creates an iteration counter.
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }
}

impl CumulativeMetric for CumulativeCounter {
    fn name(&self) -> &str {
        "counter"
    }

    fn update(&mut self, _user: UserIdx, _item: ItemIdx, _value: f64) {
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self) -> f64 {
        self.count as f64
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

/// Ratio of positive reveals to total reveals. 0 while nothing was revealed.
#[derive(Debug, Clone)]
pub struct ClickthroughRate {
    threshold: f64,
    hits: u64,
    total: u64,
}

impl ClickthroughRate {
    /// Creates a click-through accumulator with the given relevance threshold.
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            threshold,
            hits: 0,
            total: 0,
        }
    }
}

impl CumulativeMetric for ClickthroughRate {
    fn name(&self) -> &str {
        "ctr"
    }

    fn update(&mut self, _user: UserIdx, _item: ItemIdx, value: f64) {
        if value >= self.threshold {
            self.hits += 1;
        }
        self.total += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total as f64
    }

    fn reset(&mut self) {
        self.hits = 0;
        self.total = 0;
    }
}
