//! Cumulative expected popularity complement (novelty).
//!
//! High when recommendations favour items few users have been shown so far.
//! The reported value deliberately lags the most recent update by one step:
//! `update` first refreshes the reported value from the popularity state of
//! the *previous* iteration, then folds the current one in. That ordering is
//! part of the contract (reference behavior downstream comparisons depend
//! on), not something to straighten out.

use crate::metrics::CumulativeMetric;
use crate::record::{ItemIdx, UserIdx};

/// Running expected popularity complement.
#[derive(Debug, Clone)]
pub struct CumulativeEPC {
    num_users: usize,
    pops: Vec<u64>,
    sum: f64,
    num_ratings: u64,
    reported: f64,
}

impl CumulativeEPC {
    /// Creates an EPC accumulator over `num_users` users and `num_items`
    /// items.
    #[must_use]
    pub fn new(num_users: usize, num_items: usize) -> Self {
        Self {
            num_users,
            pops: vec![0; num_items],
            sum: 0.0,
            num_ratings: 0,
            reported: 0.0,
        }
    }

    /// Popularity count recorded for `item` so far.
    #[must_use]
    pub fn popularity(&self, item: ItemIdx) -> u64 {
        self.pops.get(item).copied().unwrap_or(0)
    }
}

impl CumulativeMetric for CumulativeEPC {
    fn name(&self) -> &str {
        "epc"
    }

    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, _user: UserIdx, item: ItemIdx, _value: f64) {
        // Refresh the reported value from the state before this record.
        if self.num_ratings > 0 && self.num_users > 0 {
            self.reported =
                1.0 - self.sum / (self.num_users as f64 * self.num_ratings as f64);
        }

        if let Some(pop) = self.pops.get_mut(item) {
            self.sum += (2 * *pop + 1) as f64;
            *pop += 1;
        }
        self.num_ratings += 1;
    }

    fn compute(&self) -> f64 {
        self.reported
    }

    fn reset(&mut self) {
        self.pops.iter_mut().for_each(|p| *p = 0);
        self.sum = 0.0;
        self.num_ratings = 0;
        self.reported = 0.0;
    }
}
