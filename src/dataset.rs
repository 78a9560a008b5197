//! Dataset contract and in-memory reference implementation.
//!
//! The dataset owns the ground truth of the simulation: the fixed universe of
//! (user, item) candidates and the value each pair reveals to. Index
//! assignment and on-disk storage are external concerns; the engine only
//! depends on this trait. The in-memory backend is intended for embedded
//! usage and tests.

use std::collections::HashMap;

use crate::record::{InteractionRecord, ItemIdx, UserIdx};

/// Ground-truth source for a replay simulation.
pub trait Dataset: Send + Sync {
    /// Number of users in the index space.
    fn num_users(&self) -> usize;

    /// Number of items in the index space.
    fn num_items(&self) -> usize;

    /// Reveals the true value of `(user, item)`, or `None` if the pair is
    /// not part of the universe.
    fn reveal(&self, user: UserIdx, item: ItemIdx) -> Option<f64>;

    /// The candidate items the universe holds for `user`, ascending.
    fn candidates(&self, user: UserIdx) -> Vec<ItemIdx>;

    /// Number of relevant pairs (`value >= threshold`) in the full universe.
    ///
    /// In not-reciprocal mode a relevant directed pair and its mirror count
    /// once for the unordered pair.
    fn total_relevant(&self, threshold: f64, not_reciprocal: bool) -> u64;
}

/// In-memory dataset built from (user, item, value) triples.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    num_users: usize,
    num_items: usize,
    values: HashMap<(UserIdx, ItemIdx), f64>,
    by_user: Vec<Vec<ItemIdx>>,
}

impl MemoryDataset {
    /// Builds a dataset from triples. Duplicate pairs keep the last value.
    #[must_use]
    pub fn from_triples(
        num_users: usize,
        num_items: usize,
        triples: impl IntoIterator<Item = (UserIdx, ItemIdx, f64)>,
    ) -> Self {
        let mut values = HashMap::new();
        for (u, i, v) in triples {
            values.insert((u, i), v);
        }

        let mut by_user = vec![Vec::new(); num_users];
        for &(u, i) in values.keys() {
            if let Some(items) = by_user.get_mut(u) {
                items.push(i);
            }
        }
        for items in &mut by_user {
            items.sort_unstable();
        }

        Self {
            num_users,
            num_items,
            values,
            by_user,
        }
    }

    /// Builds a dataset from records, e.g. a parsed interaction log.
    #[must_use]
    pub fn from_records(
        num_users: usize,
        num_items: usize,
        records: &[InteractionRecord],
    ) -> Self {
        Self::from_triples(
            num_users,
            num_items,
            records.iter().map(|r| (r.user, r.item, r.value)),
        )
    }

    /// Total number of (user, item) pairs in the universe.
    #[must_use]
    pub fn num_pairs(&self) -> usize {
        self.values.len()
    }
}

impl Dataset for MemoryDataset {
    fn num_users(&self) -> usize {
        self.num_users
    }

    fn num_items(&self) -> usize {
        self.num_items
    }

    fn reveal(&self, user: UserIdx, item: ItemIdx) -> Option<f64> {
        self.values.get(&(user, item)).copied()
    }

    fn candidates(&self, user: UserIdx) -> Vec<ItemIdx> {
        self.by_user.get(user).cloned().unwrap_or_default()
    }

    fn total_relevant(&self, threshold: f64, not_reciprocal: bool) -> u64 {
        let mut count = 0u64;
        for (&(u, i), &v) in &self.values {
            if v < threshold {
                continue;
            }
            if not_reciprocal {
                // Count the unordered pair once. Defer to the lower-index
                // direction only when that direction is itself relevant; a
                // mirror that exists but falls below the threshold never
                // claims the slot.
                if u < i || !self.values.get(&(i, u)).is_some_and(|&mv| mv >= threshold) {
                    count += 1;
                }
            } else {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> MemoryDataset {
        MemoryDataset::from_triples(
            2,
            3,
            vec![(0, 0, 1.0), (0, 1, 0.0), (1, 0, 1.0), (1, 2, 0.5)],
        )
    }

    #[test]
    fn test_reveal_known_and_unknown_pairs() {
        let d = dataset();
        assert_eq!(d.reveal(0, 0), Some(1.0));
        assert_eq!(d.reveal(0, 1), Some(0.0));
        assert_eq!(d.reveal(0, 2), None);
        assert_eq!(d.reveal(5, 0), None);
    }

    #[test]
    fn test_candidates_sorted_per_user() {
        let d = dataset();
        assert_eq!(d.candidates(0), vec![0, 1]);
        assert_eq!(d.candidates(1), vec![0, 2]);
        assert!(d.candidates(7).is_empty());
    }

    #[test]
    fn test_total_relevant() {
        let d = dataset();
        assert_eq!(d.total_relevant(0.5, false), 3);
        assert_eq!(d.total_relevant(1.0, false), 2);
        assert_eq!(d.total_relevant(2.0, false), 0);
    }

    #[test]
    fn test_total_relevant_not_reciprocal_counts_unordered_pairs() {
        // Shared index space: 0->1 and 1->0 are mirrors, 2->0 has no mirror.
        let d = MemoryDataset::from_triples(
            3,
            3,
            vec![(0, 1, 1.0), (1, 0, 1.0), (2, 0, 1.0)],
        );
        assert_eq!(d.total_relevant(0.5, true), 2);
        assert_eq!(d.total_relevant(0.5, false), 3);
    }

    #[test]
    fn test_total_relevant_not_reciprocal_with_irrelevant_mirror() {
        // (2,1) is relevant; its mirror (1,2) exists but is not. The
        // unordered pair {1,2} must still count, otherwise a run can reveal
        // more positives than the denominator admits.
        let d = MemoryDataset::from_triples(
            3,
            3,
            vec![(0, 1, 1.0), (1, 2, 0.0), (2, 1, 1.0)],
        );
        assert_eq!(d.total_relevant(0.5, true), 2);
    }

    #[test]
    fn test_duplicate_triples_keep_last_value() {
        let d = MemoryDataset::from_triples(1, 1, vec![(0, 0, 0.0), (0, 0, 1.0)]);
        assert_eq!(d.reveal(0, 0), Some(1.0));
        assert_eq!(d.num_pairs(), 1);
    }
}
