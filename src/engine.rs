//! The recommendation loop.
//!
//! Drives a learning policy through a historical interaction log one decision
//! at a time: ask the policy for a choice, reveal the true value, feed it
//! back to the policy and to every metric, retire the pair, check the end
//! condition. The loop owns its policy, availability model, metric set, and
//! RNG exclusively; parallelism in a broader experiment is achieved by
//! instantiating independent loops, never by sharing one.
//!
//! Lifecycle: `Created → Initialized → Running → Ended`. `Ended` is terminal;
//! further [`next_iteration`](RecommendationLoop::next_iteration) calls
//! return `Ok(None)` without side effects.
//!
//! Determinism: the loop consumes exactly one RNG draw per iteration (user
//! selection), in live mode and in replay alike. Replaying a persisted
//! prefix therefore leaves the RNG stream — and every collaborator fed
//! through the same update path — in the exact state an uninterrupted run
//! would have reached, which is what makes resumed runs bit-identical.

use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::availability::Availability;
use crate::config::LoopConfig;
use crate::dataset::Dataset;
use crate::end_condition::EndCondition;
use crate::error::{ConfigError, ReplayResult};
use crate::metrics::CumulativeMetric;
use crate::policy::Policy;
use crate::record::{InteractionRecord, ItemIdx, UserIdx};
use crate::warmup::WarmupTrajectory;

/// Lifecycle phase of a loop instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Constructed, not yet initialized.
    Created,
    /// Availability built, warmup consumed, no live iteration yet.
    Initialized,
    /// At least one live iteration executed.
    Running,
    /// Terminal: end condition fired or candidates exhausted.
    Ended,
}

impl LoopPhase {
    const fn name(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Ended => "ended",
        }
    }
}

/// What one accepted iteration produced.
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    /// Iteration number after this decision (1-based).
    pub iteration: u64,
    /// The user the decision was made for.
    pub user: UserIdx,
    /// Revealed (item, value) pairs, in ranking order. One entry in
    /// single-item mode, up to `cutoff` in ranking mode.
    pub choices: Vec<(ItemIdx, f64)>,
    /// `(name, compute())` snapshot of every metric after this iteration.
    pub metric_values: Vec<(String, f64)>,
    /// Wall time this iteration took, in microseconds.
    pub elapsed_micros: u64,
}

/// Replay-evaluation state machine over one policy and one dataset.
pub struct RecommendationLoop {
    policy: Box<dyn Policy>,
    dataset: Arc<dyn Dataset>,
    metrics: Vec<Box<dyn CumulativeMetric>>,
    end_condition: Box<dyn EndCondition>,
    availability: Availability,
    config: LoopConfig,
    phase: LoopPhase,
    current_iteration: u64,
    rng: StdRng,
}

impl RecommendationLoop {
    /// Creates a loop in the `Created` phase.
    ///
    /// # Errors
    /// [`ConfigError`] when the configuration is invalid (e.g. cutoff 0).
    pub fn new(
        policy: Box<dyn Policy>,
        dataset: Arc<dyn Dataset>,
        metrics: Vec<Box<dyn CumulativeMetric>>,
        end_condition: Box<dyn EndCondition>,
        config: LoopConfig,
    ) -> ReplayResult<Self> {
        config.validate()?;

        let availability = Availability::new(dataset.num_users(), config.not_reciprocal);
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            policy,
            dataset,
            metrics,
            end_condition,
            availability,
            config,
            phase: LoopPhase::Created,
            current_iteration: 0,
            rng,
        })
    }

    /// Initializes the loop, optionally consuming a warmup trajectory.
    ///
    /// Builds the availability model from the dataset universe, subtracts
    /// every warmup pair, feeds the warmup to the policy and to every
    /// metric's `initialize`, and primes the end condition with one advance
    /// per warmup record. `Created → Initialized`.
    ///
    /// # Errors
    /// [`ConfigError::InvalidPhase`] unless the loop is `Created`;
    /// [`ConfigError::EmptyUniverse`] when the dataset has no candidates.
    pub fn init(&mut self, warmup: Option<&WarmupTrajectory>) -> ReplayResult<()> {
        if self.phase != LoopPhase::Created {
            return Err(ConfigError::InvalidPhase {
                expected: LoopPhase::Created.name(),
                actual: self.phase.name(),
            }
            .into());
        }

        for user in 0..self.dataset.num_users() {
            for item in self.dataset.candidates(user) {
                self.availability.add(user, item);
            }
        }
        if self.availability.is_exhausted() {
            return Err(ConfigError::EmptyUniverse.into());
        }

        let records = warmup.map(WarmupTrajectory::records).unwrap_or_default();
        for rec in records {
            self.availability.remove(rec.user, rec.item);
        }
        for metric in &mut self.metrics {
            metric.initialize(records, self.config.not_reciprocal);
        }
        self.policy.initialize(records);
        for rec in records {
            self.end_condition.advance(rec);
        }

        self.phase = LoopPhase::Initialized;
        info!(
            warmup = records.len(),
            remaining = self.availability.remaining(),
            seed = self.config.seed,
            "loop initialized"
        );

        // A warmup prefix can already satisfy the end condition; the first
        // next_iteration call must then reveal nothing.
        if self.end_condition.has_ended() {
            self.end();
        }
        Ok(())
    }

    /// Re-applies a persisted prefix of single-item decisions, for resume.
    ///
    /// Each record is one decision; exact for loops with `cutoff == 1`. A
    /// ranking-mode log must be replayed through
    /// [`replay_decisions`](Self::replay_decisions) so decision boundaries
    /// survive. Returns the number of decisions replayed.
    ///
    /// # Errors
    /// Same contract as [`replay_decisions`](Self::replay_decisions).
    pub fn replay(&mut self, prefix: &[InteractionRecord]) -> ReplayResult<usize> {
        let decisions: Vec<Vec<InteractionRecord>> =
            prefix.iter().map(|rec| vec![*rec]).collect();
        self.replay_decisions(&decisions)
    }

    /// Re-applies a persisted prefix of decisions, for resume.
    ///
    /// Every decision goes through the live update path: one RNG draw, then
    /// per revealed record an idempotent availability removal, policy and
    /// metric updates, and an end-condition advance; the iteration counter
    /// moves by one per decision. Stops early if the end condition fires or
    /// the universe runs dry. Because availability evolves exactly as it did
    /// live, the RNG draw ranges match and the stream stays aligned — the
    /// persisted records dictate the users, the draws are discarded.
    ///
    /// # Errors
    /// [`ConfigError::InvalidPhase`] unless the loop is `Initialized`;
    /// [`PolicyError`](crate::error::PolicyError) if the policy rejects an
    /// update.
    pub fn replay_decisions(&mut self, decisions: &[Vec<InteractionRecord>]) -> ReplayResult<usize> {
        if self.phase != LoopPhase::Initialized {
            return Err(ConfigError::InvalidPhase {
                expected: LoopPhase::Initialized.name(),
                actual: self.phase.name(),
            }
            .into());
        }

        let mut replayed = 0;
        for decision in decisions {
            if decision.is_empty() {
                continue;
            }
            if self.end_condition.has_ended() || self.availability.is_exhausted() {
                self.end();
                break;
            }

            let selectable = self.availability.users_with_candidates().len();
            let _ = self.rng.gen_range(0..selectable);

            for rec in decision {
                self.policy.update(rec.user, rec.item, rec.value)?;
            }
            for rec in decision {
                self.availability.remove(rec.user, rec.item);
                for metric in &mut self.metrics {
                    metric.update(rec.user, rec.item, rec.value);
                }
                self.end_condition.advance(rec);
            }
            self.current_iteration += 1;
            replayed += 1;
        }

        if self.phase != LoopPhase::Ended
            && (self.end_condition.has_ended() || self.availability.is_exhausted())
        {
            self.end();
        }

        debug!(replayed, iteration = self.current_iteration, "prefix replayed");
        Ok(replayed)
    }

    /// Executes one live iteration.
    ///
    /// Returns `Ok(None)` exactly when no valid decision could be produced
    /// (candidates exhausted or every user abstained) — the implicit
    /// termination trigger, checked independently of the end condition. Once
    /// `Ended`, calls return `Ok(None)` immediately and without side effects.
    ///
    /// # Errors
    /// [`ConfigError::InvalidPhase`] if the loop was never initialized;
    /// [`PolicyError`](crate::error::PolicyError) if the policy fails during
    /// decision or update, in which case the loop state (iteration counter,
    /// availability, metrics, end condition) is exactly as it was before the
    /// call.
    pub fn next_iteration(&mut self) -> ReplayResult<Option<IterationOutcome>> {
        match self.phase {
            LoopPhase::Created => {
                return Err(ConfigError::InvalidPhase {
                    expected: LoopPhase::Initialized.name(),
                    actual: self.phase.name(),
                }
                .into());
            }
            LoopPhase::Ended => return Ok(None),
            LoopPhase::Initialized | LoopPhase::Running => {}
        }

        let started = Instant::now();

        let users = self.availability.users_with_candidates();
        if users.is_empty() {
            self.end();
            return Ok(None);
        }

        // One draw per iteration, live or replayed.
        let pick = self.rng.gen_range(0..users.len());

        // Try the drawn user first; if the policy abstains, fall back over
        // the remaining users in a deterministic rotation. The fallback
        // consumes no further draws, so replay alignment is unaffected.
        let mut decision: Option<(UserIdx, Vec<ItemIdx>)> = None;
        for offset in 0..users.len() {
            let user = users[(pick + offset) % users.len()];
            let candidates = self.availability.candidates(user);

            let proposed = if self.config.cutoff == 1 {
                self.policy
                    .decide(user, &candidates)?
                    .into_iter()
                    .collect()
            } else {
                self.policy
                    .decide_ranking(user, &candidates, self.config.cutoff)?
            };

            // Defensive validation: accept only pairs that are genuinely
            // still available, drop duplicates.
            let mut accepted: Vec<ItemIdx> = Vec::with_capacity(proposed.len());
            for item in proposed {
                if self.availability.contains(user, item) && !accepted.contains(&item) {
                    accepted.push(item);
                } else {
                    trace!(user, item, "discarded unavailable proposal");
                }
            }

            if !accepted.is_empty() {
                decision = Some((user, accepted));
                break;
            }
        }

        let Some((user, items)) = decision else {
            self.end();
            return Ok(None);
        };

        let choices: Vec<(ItemIdx, f64)> = items
            .iter()
            .map(|&item| {
                let value = self.dataset.reveal(user, item).unwrap_or_else(|| {
                    warn!(user, item, "pair not revealable; defaulting to 0.0");
                    0.0
                });
                (item, value)
            })
            .collect();

        // The policy's update is the only fallible step; run it for every
        // pair before mutating any loop-owned state so a failure leaves the
        // loop exactly as it was.
        for &(item, value) in &choices {
            self.policy.update(user, item, value)?;
        }

        for &(item, value) in &choices {
            self.availability.remove(user, item);
            for metric in &mut self.metrics {
                metric.update(user, item, value);
            }
            self.end_condition
                .advance(&InteractionRecord::new(user, item, value));
        }
        self.current_iteration += 1;
        self.phase = LoopPhase::Running;

        if self.end_condition.has_ended() || self.availability.is_exhausted() {
            self.end();
        }

        #[allow(clippy::cast_possible_truncation)]
        let elapsed_micros = started.elapsed().as_micros() as u64;
        trace!(
            iteration = self.current_iteration,
            user,
            choices = choices.len(),
            elapsed_micros,
            "iteration complete"
        );

        Ok(Some(IterationOutcome {
            iteration: self.current_iteration,
            user,
            choices,
            metric_values: self.metric_values(),
            elapsed_micros,
        }))
    }

    fn end(&mut self) {
        if self.phase != LoopPhase::Ended {
            debug!(iteration = self.current_iteration, "loop ended");
            self.phase = LoopPhase::Ended;
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Iterations accepted so far, warmup replay included.
    #[must_use]
    pub const fn current_iteration(&self) -> u64 {
        self.current_iteration
    }

    /// Returns true once the loop is terminal.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.phase == LoopPhase::Ended
    }

    /// The explicit seed this loop was constructed with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Names of the attached metrics, in column order.
    #[must_use]
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// `(name, compute())` snapshot of every attached metric.
    #[must_use]
    pub fn metric_values(&self) -> Vec<(String, f64)> {
        self.metrics
            .iter()
            .map(|m| (m.name().to_string(), m.compute()))
            .collect()
    }

    /// Remaining (user, item) pairs in the availability model.
    #[must_use]
    pub const fn remaining_candidates(&self) -> u64 {
        self.availability.remaining()
    }
}
