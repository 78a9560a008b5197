//! # recplay — offline replay evaluation for interactive recommenders
//!
//! recplay simulates, offline, how an online learning policy would have
//! performed against a historical interaction log, one decision at a time.
//! The loop asks the policy for a (user, item) choice, reveals the true value
//! from the dataset, feeds it back to the policy and to a set of incremental
//! metric accumulators, retires the pair so it can never be recommended
//! again, and stops when an end condition fires or the candidate universe
//! runs dry. Runs can be interrupted and resumed without altering results.
//!
//! ## Core pieces
//!
//! - [`RecommendationLoop`]: the iteration state machine
//! - [`Availability`]: without-replacement candidate bookkeeping
//! - [`EndCondition`] variants: fixed count, positive percentage, no limit
//! - [`CumulativeMetric`] accumulators: recall, Gini, EPC, ILD, hits, CTR
//! - [`Policy`] / [`Dataset`]: the contracts external collaborators implement
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use recplay::{
//!     EndConditionConfig, LoopConfig, MemoryDataset, RecommendationLoop,
//! };
//!
//! let dataset = Arc::new(MemoryDataset::from_triples(n_users, n_items, triples));
//! let config = LoopConfig {
//!     cutoff: 1,
//!     seed: 42,
//!     threshold: 0.5,
//!     not_reciprocal: false,
//!     end_condition: EndConditionConfig::FixedCount { iterations: 1000 },
//! };
//! let end = config.end_condition.build(dataset.total_relevant(0.5, false))?;
//! let mut sim = RecommendationLoop::new(policy, dataset, metrics, end, config)?;
//! sim.init(None)?;
//! while let Some(outcome) = sim.next_iteration()? {
//!     // persist outcome, inspect metric snapshots, ...
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod availability;
pub mod config;
pub mod dataset;
pub mod end_condition;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod record;
pub mod report;
pub mod warmup;

// Re-export primary types at crate root for convenience
pub use availability::Availability;
pub use config::{EndConditionConfig, LoopConfig};
pub use dataset::{Dataset, MemoryDataset};
pub use end_condition::{EndCondition, FixedCount, NoLimit, PositivePercentage};
pub use engine::{IterationOutcome, LoopPhase, RecommendationLoop};
pub use error::{ConfigError, PolicyError, ReplayError, ReplayResult, ReportError};
pub use metrics::{
    ClickthroughRate, CumulativeCounter, CumulativeEPC, CumulativeGini, CumulativeHits,
    CumulativeILD, CumulativeMetric, CumulativeRecall, ItemDistance, PairwiseDistance,
};
pub use policy::Policy;
pub use record::{InteractionRecord, ItemIdx, UserIdx};
pub use report::{IterationReader, IterationWriter, LoggedIteration, TsvReader, TsvWriter};
pub use warmup::WarmupTrajectory;
