//! Shared fixtures for the e2e suites: deterministic stub policies and a
//! fully populated metric set.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use recplay::{
    CumulativeCounter, CumulativeEPC, CumulativeGini, CumulativeHits, CumulativeILD,
    CumulativeMetric, CumulativeRecall, Dataset, InteractionRecord, ItemDistance, ItemIdx,
    MemoryDataset, Policy, PolicyError, UserIdx,
};

/// Always proposes the lowest-indexed candidate.
pub struct FirstAvailable;

impl Policy for FirstAvailable {
    fn initialize(&mut self, _warmup: &[InteractionRecord]) {}

    fn decide(
        &mut self,
        _user: UserIdx,
        candidates: &[ItemIdx],
    ) -> Result<Option<ItemIdx>, PolicyError> {
        Ok(candidates.first().copied())
    }

    fn update(&mut self, _user: UserIdx, _item: ItemIdx, _value: f64) -> Result<(), PolicyError> {
        Ok(())
    }
}

/// Deterministic stateful policy: proposes the candidate it has been updated
/// about least often, ties broken by lowest index. Exercises the policy
/// update path during replay.
#[derive(Default)]
pub struct LeastShown {
    counts: HashMap<ItemIdx, u64>,
}

impl Policy for LeastShown {
    fn initialize(&mut self, warmup: &[InteractionRecord]) {
        for rec in warmup {
            *self.counts.entry(rec.item).or_insert(0) += 1;
        }
    }

    fn decide(
        &mut self,
        _user: UserIdx,
        candidates: &[ItemIdx],
    ) -> Result<Option<ItemIdx>, PolicyError> {
        Ok(candidates
            .iter()
            .copied()
            .min_by_key(|item| (self.counts.get(item).copied().unwrap_or(0), *item)))
    }

    fn update(&mut self, _user: UserIdx, item: ItemIdx, _value: f64) -> Result<(), PolicyError> {
        *self.counts.entry(item).or_insert(0) += 1;
        Ok(())
    }
}

/// 0 on the diagonal, 1 everywhere else.
pub struct DiscreteDistance;

impl ItemDistance for DiscreteDistance {
    fn distance(&self, a: ItemIdx, b: ItemIdx) -> f64 {
        if a == b {
            0.0
        } else {
            1.0
        }
    }
}

/// Every accumulator the crate ships, wired for `dataset`.
pub fn full_metrics(dataset: &MemoryDataset, threshold: f64) -> Vec<Box<dyn CumulativeMetric>> {
    let num_rel = dataset.total_relevant(threshold, false);
    vec![
        Box::new(CumulativeRecall::new(threshold, num_rel)),
        Box::new(CumulativeGini::new(dataset.num_items())),
        Box::new(CumulativeEPC::new(dataset.num_users(), dataset.num_items())),
        Box::new(CumulativeILD::new(
            dataset.num_users(),
            Arc::new(DiscreteDistance),
        )),
        Box::new(CumulativeHits::new(threshold)),
        Box::new(CumulativeCounter::new()),
        Box::new(recplay::ClickthroughRate::new(threshold)),
    ]
}

/// Dense dataset: every (user, item) pair rated, value `(user + item) % 2`.
pub fn dense_dataset(num_users: usize, num_items: usize) -> MemoryDataset {
    let mut triples = Vec::new();
    for user in 0..num_users {
        for item in 0..num_items {
            #[allow(clippy::cast_precision_loss)]
            triples.push((user, item, ((user + item) % 2) as f64));
        }
    }
    MemoryDataset::from_triples(num_users, num_items, triples)
}
