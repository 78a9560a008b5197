//! Cumulative Gini index over recommendation frequencies.
//!
//! Measures how concentrated the recommendations are across the item
//! population: 0 when every item has been recommended equally often, tending
//! to 1 when everything piles onto one item.
//!
//! The coefficient is maintained incrementally. Conceptually the item
//! frequencies live in an array sorted ascending; the Gini numerator is
//! `Σ_k (2k - n - 1) · f_(k)` over 1-based sorted positions `k`. Items with
//! equal frequency are interchangeable, so an increment can always be applied
//! to the item sitting at the *last* position of its frequency class, which
//! keeps the array sorted and changes the numerator by exactly
//! `2·pos - n - 1`. A frequency → position-range table makes that lookup
//! O(1); nothing is ever re-sorted.

use std::collections::HashMap;

use crate::metrics::CumulativeMetric;
use crate::record::{ItemIdx, UserIdx};

/// Incrementally maintained Gini coefficient over per-item frequencies.
#[derive(Debug, Clone)]
pub struct CumulativeGini {
    num_items: usize,
    freqs: Vec<u64>,
    /// frequency -> (min, max) 1-based positions of its class in the
    /// conceptually sorted frequency array.
    ranges: HashMap<u64, (usize, usize)>,
    /// Σ (2k - n - 1) · f_(k) over sorted positions.
    main_sum: i128,
    total: u64,
}

impl CumulativeGini {
    /// Creates a Gini accumulator over a fixed population of `num_items`.
    #[must_use]
    pub fn new(num_items: usize) -> Self {
        let mut gini = Self {
            num_items,
            freqs: Vec::new(),
            ranges: HashMap::new(),
            main_sum: 0,
            total: 0,
        };
        gini.reset();
        gini
    }

    /// Frequency recorded for `item` so far.
    #[must_use]
    pub fn frequency(&self, item: ItemIdx) -> u64 {
        self.freqs.get(item).copied().unwrap_or(0)
    }
}

impl CumulativeMetric for CumulativeGini {
    fn name(&self) -> &str {
        "gini"
    }

    fn update(&mut self, _user: UserIdx, item: ItemIdx, _value: f64) {
        let Some(freq) = self.freqs.get(item).copied() else {
            return;
        };

        // The frequency class of a live item is always indexed.
        let Some(&(min_pos, max_pos)) = self.ranges.get(&freq) else {
            return;
        };

        // The incremented item takes the last slot of its class.
        let pos = max_pos;
        self.main_sum += 2 * pos as i128 - self.num_items as i128 - 1;

        // Shrink the old class, grow the next one downward onto `pos`.
        if min_pos == max_pos {
            self.ranges.remove(&freq);
        } else {
            self.ranges.insert(freq, (min_pos, max_pos - 1));
        }
        self.ranges
            .entry(freq + 1)
            .and_modify(|range| range.0 = pos)
            .or_insert((pos, pos));

        self.freqs[item] = freq + 1;
        self.total += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self) -> f64 {
        if self.total == 0 || self.num_items <= 1 {
            return 0.0;
        }
        self.main_sum as f64 / ((self.num_items - 1) as f64 * self.total as f64)
    }

    fn reset(&mut self) {
        self.freqs = vec![0; self.num_items];
        self.ranges = HashMap::new();
        if self.num_items > 0 {
            self.ranges.insert(0, (1, self.num_items));
        }
        self.main_sum = 0;
        self.total = 0;
    }
}
