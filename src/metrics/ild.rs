//! Cumulative intra-list diversity.
//!
//! Average pairwise distance between the items shown to each user, averaged
//! over all users. The distance function is an injected collaborator: the
//! engine has no opinion about item features.

use std::sync::Arc;

use crate::metrics::CumulativeMetric;
use crate::record::{ItemIdx, UserIdx};

/// Pairwise distance between items, in [0, 1] by convention.
pub trait ItemDistance: Send + Sync {
    /// Distance between items `a` and `b`. Symmetric; `distance(a, a) == 0`.
    fn distance(&self, a: ItemIdx, b: ItemIdx) -> f64;
}

/// Distance backed by a precomputed flattened `num_items × num_items` matrix
/// (row-major).
#[derive(Debug, Clone)]
pub struct PairwiseDistance {
    num_items: usize,
    matrix: Vec<f64>,
}

impl PairwiseDistance {
    /// Wraps a row-major distance matrix. Returns `None` when the matrix is
    /// not `num_items²` entries.
    #[must_use]
    pub fn new(num_items: usize, matrix: Vec<f64>) -> Option<Self> {
        (matrix.len() == num_items * num_items).then_some(Self { num_items, matrix })
    }
}

impl ItemDistance for PairwiseDistance {
    fn distance(&self, a: ItemIdx, b: ItemIdx) -> f64 {
        if a >= self.num_items || b >= self.num_items {
            return 0.0;
        }
        self.matrix[a * self.num_items + b]
    }
}

/// Running intra-list diversity.
///
/// Per user: the running sum of pairwise distances over all shown items (each
/// unordered pair contributing twice), normalized by `c·(c-1)` once the user
/// has seen at least two items. Users with fewer contribute 0. The global
/// value is the sum of per-user contributions divided by the number of users.
/// Each update costs O(items already shown to that user).
pub struct CumulativeILD {
    num_users: usize,
    distance: Arc<dyn ItemDistance>,
    shown: Vec<Vec<ItemIdx>>,
    sums: Vec<f64>,
}

impl CumulativeILD {
    /// Creates an ILD accumulator over `num_users` users.
    #[must_use]
    pub fn new(num_users: usize, distance: Arc<dyn ItemDistance>) -> Self {
        Self {
            num_users,
            distance,
            shown: vec![Vec::new(); num_users],
            sums: vec![0.0; num_users],
        }
    }

    /// Number of items shown to `user` so far.
    #[must_use]
    pub fn shown_count(&self, user: UserIdx) -> usize {
        self.shown.get(user).map_or(0, Vec::len)
    }
}

impl CumulativeMetric for CumulativeILD {
    fn name(&self) -> &str {
        "ild"
    }

    fn update(&mut self, user: UserIdx, item: ItemIdx, _value: f64) {
        let Some(list) = self.shown.get(user) else {
            return;
        };

        let delta: f64 = list
            .iter()
            .map(|&prev| self.distance.distance(item, prev))
            .sum();
        self.sums[user] += 2.0 * delta;
        self.shown[user].push(item);
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute(&self) -> f64 {
        if self.num_users == 0 {
            return 0.0;
        }

        let contributions: f64 = self
            .shown
            .iter()
            .zip(&self.sums)
            .filter(|(list, _)| list.len() >= 2)
            .map(|(list, &sum)| {
                let c = list.len() as f64;
                sum / (c * (c - 1.0))
            })
            .sum();

        contributions / self.num_users as f64
    }

    fn reset(&mut self) {
        self.shown.iter_mut().for_each(Vec::clear);
        self.sums.iter_mut().for_each(|s| *s = 0.0);
    }
}
