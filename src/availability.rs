//! Candidate availability model.
//!
//! One ordered set of still-recommendable items per user, enforcing
//! without-replacement semantics: once a pair is revealed it is permanently
//! retired. Removal is idempotent, which is what makes replaying a persisted
//! prefix safe (re-removing an already-consumed pair is a no-op).
//!
//! Each loop instance owns its model exclusively; there is no interior
//! locking.

use std::collections::BTreeSet;

use crate::record::{ItemIdx, UserIdx};

/// Per-user candidate sets that only ever shrink.
#[derive(Debug, Clone)]
pub struct Availability {
    sets: Vec<BTreeSet<ItemIdx>>,
    not_reciprocal: bool,
    remaining: u64,
}

impl Availability {
    /// Creates an empty model for `num_users` users.
    ///
    /// In not-reciprocal mode users and items share one index space (contact
    /// recommendation) and removing `(u, v)` also retires the mirror pair
    /// `(v, u)` when it is present.
    #[must_use]
    pub fn new(num_users: usize, not_reciprocal: bool) -> Self {
        Self {
            sets: vec![BTreeSet::new(); num_users],
            not_reciprocal,
            remaining: 0,
        }
    }

    /// Adds `item` to `user`'s candidate set. Used only while building the
    /// model from the dataset universe; the loop never grows a set.
    pub fn add(&mut self, user: UserIdx, item: ItemIdx) {
        if let Some(set) = self.sets.get_mut(user) {
            if set.insert(item) {
                self.remaining += 1;
            }
        }
    }

    /// Returns true if `(user, item)` is still recommendable.
    #[must_use]
    pub fn contains(&self, user: UserIdx, item: ItemIdx) -> bool {
        self.sets.get(user).is_some_and(|s| s.contains(&item))
    }

    /// Retires `(user, item)`, and its mirror in not-reciprocal mode.
    ///
    /// Removing an absent pair is a no-op, not an error.
    pub fn remove(&mut self, user: UserIdx, item: ItemIdx) {
        self.remove_one(user, item);
        if self.not_reciprocal {
            self.remove_one(item, user);
        }
    }

    fn remove_one(&mut self, user: UserIdx, item: ItemIdx) {
        if let Some(set) = self.sets.get_mut(user) {
            if set.remove(&item) {
                self.remaining -= 1;
            }
        }
    }

    /// Ordered view of `user`'s remaining candidates.
    #[must_use]
    pub fn candidates(&self, user: UserIdx) -> Vec<ItemIdx> {
        self.sets
            .get(user)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of remaining candidates for `user`.
    #[must_use]
    pub fn num_candidates(&self, user: UserIdx) -> usize {
        self.sets.get(user).map_or(0, BTreeSet::len)
    }

    /// Users that still have at least one candidate, in ascending order.
    #[must_use]
    pub fn users_with_candidates(&self) -> Vec<UserIdx> {
        self.sets
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(u, _)| u)
            .collect()
    }

    /// Total remaining (user, item) pairs.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns true when no pair is left to recommend.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns true if mirror-pair retirement is active.
    #[must_use]
    pub const fn not_reciprocal(&self) -> bool {
        self.not_reciprocal
    }
}
