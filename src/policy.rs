//! The learning-policy contract.
//!
//! Policies (epsilon-greedy, UCB, Thompson sampling, neighbourhood bandits,
//! ...) live outside this crate; the engine depends only on this trait. A
//! policy must be deterministic given the same seed and the same sequence of
//! `update` calls — that determinism, together with the loop's own explicit
//! seed, is what makes a resumed run bit-identical to an uninterrupted one.

use crate::error::PolicyError;
use crate::record::{InteractionRecord, ItemIdx, UserIdx};

/// Interactive recommender driven by the loop, one decision at a time.
///
/// The loop guarantees `update` is called exactly once per revealed pair, in
/// iteration order. Policies are expected, but not guaranteed by the loop, to
/// only propose currently available items; proposals are re-validated before
/// being accepted.
pub trait Policy: Send {
    /// Pre-conditions internal state with a warmup trajectory, in order.
    fn initialize(&mut self, warmup: &[InteractionRecord]);

    /// Picks one item for `user` from `candidates` (ascending, non-empty),
    /// or `None` to abstain for this user.
    ///
    /// # Errors
    /// A [`PolicyError`] aborts the current iteration; the loop state is left
    /// untouched and the failure is fatal for this run.
    fn decide(
        &mut self,
        user: UserIdx,
        candidates: &[ItemIdx],
    ) -> Result<Option<ItemIdx>, PolicyError>;

    /// Picks a ranked list of up to `cutoff` distinct items for `user`.
    ///
    /// The default implementation degenerates to repeated single decisions
    /// over a shrinking candidate list.
    ///
    /// # Errors
    /// Same failure contract as [`decide`](Policy::decide).
    fn decide_ranking(
        &mut self,
        user: UserIdx,
        candidates: &[ItemIdx],
        cutoff: usize,
    ) -> Result<Vec<ItemIdx>, PolicyError> {
        let mut pool = candidates.to_vec();
        let mut ranking = Vec::with_capacity(cutoff.min(pool.len()));

        while ranking.len() < cutoff && !pool.is_empty() {
            match self.decide(user, &pool)? {
                Some(item) => {
                    pool.retain(|&i| i != item);
                    ranking.push(item);
                }
                None => break,
            }
        }
        Ok(ranking)
    }

    /// Feeds one revealed (user, item, value) back into the policy.
    ///
    /// # Errors
    /// Same failure contract as [`decide`](Policy::decide).
    fn update(&mut self, user: UserIdx, item: ItemIdx, value: f64) -> Result<(), PolicyError>;
}
