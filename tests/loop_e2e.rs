//! End-to-end checks of the recommendation loop against small, fully known
//! universes.

mod common;

use std::sync::Arc;

use common::{dense_dataset, full_metrics, FirstAvailable};
use recplay::{
    CumulativeCounter, CumulativeHits, CumulativeMetric, CumulativeRecall, Dataset,
    EndConditionConfig, LoopConfig, LoopPhase, MemoryDataset, RecommendationLoop,
    WarmupTrajectory,
};

fn config(seed: u64, end_condition: EndConditionConfig) -> LoopConfig {
    LoopConfig {
        cutoff: 1,
        seed,
        threshold: 0.5,
        not_reciprocal: false,
        end_condition,
    }
}

#[test]
fn reference_scenario_reaches_full_recall() {
    // Universe = {(u1,i1,1.0), (u1,i2,0.0), (u2,i1,1.0)}, threshold 0.5,
    // no warmup, fixed-count N=3.
    let dataset = Arc::new(MemoryDataset::from_triples(
        2,
        2,
        vec![(0, 0, 1.0), (0, 1, 0.0), (1, 0, 1.0)],
    ));
    let cfg = config(17, EndConditionConfig::FixedCount { iterations: 3 });
    let end = cfg
        .end_condition
        .build(dataset.total_relevant(cfg.threshold, false))
        .unwrap();
    let metrics = full_metrics(&dataset, cfg.threshold);

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset, metrics, end, cfg).unwrap();
    sim.init(None).unwrap();

    let mut iterations = 0;
    while sim.next_iteration().unwrap().is_some() {
        iterations += 1;
    }

    assert_eq!(iterations, 3);
    assert_eq!(sim.phase(), LoopPhase::Ended);

    let values: std::collections::HashMap<String, f64> =
        sim.metric_values().into_iter().collect();
    assert!((values["recall"] - 1.0).abs() < 1e-12, "numRel=2, both found");
    assert!((values["counter"] - 3.0).abs() < 1e-12);
    assert!((values["hits"] - 2.0).abs() < 1e-12);
    assert!((values["ctr"] - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn fixed_count_stops_exactly_at_one_hundred() {
    // 10 x 20 dense universe: 200 available decisions, far more than N.
    let dataset = Arc::new(dense_dataset(10, 20));
    let cfg = config(5, EndConditionConfig::FixedCount { iterations: 100 });
    let end = cfg.end_condition.build(0).unwrap();
    let metrics: Vec<Box<dyn CumulativeMetric>> = vec![Box::new(CumulativeCounter::new())];

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset, metrics, end, cfg).unwrap();
    sim.init(None).unwrap();

    let mut iterations = 0;
    while sim.next_iteration().unwrap().is_some() {
        iterations += 1;
        assert!(iterations <= 100, "must never run past the fixed count");
    }
    assert_eq!(iterations, 100, "must not stop early");
    assert_eq!(sim.current_iteration(), 100);
}

#[test]
fn percentage_condition_fires_on_exact_positive() {
    // One user, items 0..9 relevant, 10..19 not. FirstAvailable walks the
    // items in ascending order, so positives arrive first: with
    // total_relevant=10 and percentage=0.5 the run stops at iteration 5.
    let mut triples = Vec::new();
    for item in 0..20 {
        triples.push((0, item, if item < 10 { 1.0 } else { 0.0 }));
    }
    let dataset = Arc::new(MemoryDataset::from_triples(1, 20, triples));
    let cfg = config(
        3,
        EndConditionConfig::PositivePercentage {
            percentage: 0.5,
            threshold: 0.5,
        },
    );
    let total_relevant = dataset.total_relevant(0.5, false);
    assert_eq!(total_relevant, 10);
    let end = cfg.end_condition.build(total_relevant).unwrap();
    let metrics: Vec<Box<dyn CumulativeMetric>> = vec![Box::new(CumulativeHits::new(0.5))];

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset, metrics, end, cfg).unwrap();
    sim.init(None).unwrap();

    let mut iterations = 0;
    while sim.next_iteration().unwrap().is_some() {
        iterations += 1;
    }

    assert_eq!(iterations, 5, "terminal exactly on the 5th positive reveal");
    assert!((sim.metric_values()[0].1 - 5.0).abs() < 1e-12);
}

#[test]
fn gini_and_recall_bounds_hold_throughout_a_run() {
    let dataset = Arc::new(dense_dataset(6, 8));
    let cfg = config(23, EndConditionConfig::NoLimit);
    let end = cfg.end_condition.build(0).unwrap();
    let metrics = full_metrics(&dataset, cfg.threshold);

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset, metrics, end, cfg).unwrap();
    sim.init(None).unwrap();

    let mut last_recall = 0.0;
    while let Some(outcome) = sim.next_iteration().unwrap() {
        let values: std::collections::HashMap<&str, f64> = outcome
            .metric_values
            .iter()
            .map(|(n, v)| (n.as_str(), *v))
            .collect();

        let recall = values["recall"];
        assert!((0.0..=1.0).contains(&recall));
        assert!(recall >= last_recall, "recall must be non-decreasing");
        last_recall = recall;

        let gini = values["gini"];
        assert!((0.0..=1.0).contains(&gini), "gini {gini} out of bounds");
    }

    // NoLimit: the run ended by exhausting all 48 pairs.
    assert_eq!(sim.current_iteration(), 48);
    assert!((last_recall - 1.0).abs() < 1e-12);
}

#[test]
fn warmup_pairs_never_reappear() {
    let dataset = Arc::new(dense_dataset(2, 3));
    let cfg = config(1, EndConditionConfig::NoLimit);
    let end = cfg.end_condition.build(0).unwrap();
    let metrics: Vec<Box<dyn CumulativeMetric>> = vec![Box::new(CumulativeCounter::new())];

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset.clone(), metrics, end, cfg)
            .unwrap();

    let warmup = WarmupTrajectory::resolve(&[(0, 0), (1, 2)], dataset.as_ref());
    sim.init(Some(&warmup)).unwrap();

    let mut revealed = Vec::new();
    while let Some(outcome) = sim.next_iteration().unwrap() {
        for (item, _) in outcome.choices {
            revealed.push((outcome.user, item));
        }
    }

    assert_eq!(revealed.len(), 4, "6 pairs minus 2 warmup pairs");
    assert!(!revealed.contains(&(0, 0)));
    assert!(!revealed.contains(&(1, 2)));
}

#[test]
fn not_reciprocal_recall_stays_bounded_with_irrelevant_mirror() {
    // (2,1) is relevant while its mirror (1,2) exists but is not: the
    // unordered pair {1,2} still belongs in the recall denominator.
    let dataset = Arc::new(MemoryDataset::from_triples(
        3,
        3,
        vec![(0, 1, 1.0), (1, 2, 0.0), (2, 1, 1.0)],
    ));
    assert_eq!(dataset.total_relevant(0.5, true), 2);

    let cfg = LoopConfig {
        not_reciprocal: true,
        ..config(29, EndConditionConfig::NoLimit)
    };
    let end = cfg.end_condition.build(0).unwrap();
    let num_rel = dataset.total_relevant(cfg.threshold, true);
    let metrics: Vec<Box<dyn CumulativeMetric>> =
        vec![Box::new(CumulativeRecall::new(cfg.threshold, num_rel))];

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset, metrics, end, cfg).unwrap();
    sim.init(None).unwrap();

    while let Some(outcome) = sim.next_iteration().unwrap() {
        let recall = outcome
            .metric_values
            .iter()
            .find(|(n, _)| n == "recall")
            .unwrap()
            .1;
        assert!(
            (0.0..=1.0).contains(&recall),
            "recall {recall} out of bounds"
        );
    }
}

#[test]
fn not_reciprocal_loop_never_reveals_a_mirror() {
    // Contact recommendation: 3 nodes, every directed edge rated.
    let mut triples = Vec::new();
    for u in 0..3 {
        for v in 0..3 {
            if u != v {
                triples.push((u, v, 1.0));
            }
        }
    }
    let dataset = Arc::new(MemoryDataset::from_triples(3, 3, triples));
    let cfg = LoopConfig {
        not_reciprocal: true,
        ..config(13, EndConditionConfig::NoLimit)
    };
    let end = cfg.end_condition.build(0).unwrap();
    let metrics: Vec<Box<dyn CumulativeMetric>> = vec![Box::new(CumulativeCounter::new())];

    let mut sim =
        RecommendationLoop::new(Box::new(FirstAvailable), dataset, metrics, end, cfg).unwrap();
    sim.init(None).unwrap();

    let mut revealed = Vec::new();
    while let Some(outcome) = sim.next_iteration().unwrap() {
        for (item, _) in outcome.choices {
            revealed.push((outcome.user, item));
        }
    }

    // 6 directed edges collapse to 3 unordered pairs.
    assert_eq!(revealed.len(), 3);
    for &(u, v) in &revealed {
        assert!(
            !revealed.contains(&(v, u)),
            "mirror of ({u}, {v}) must have been retired"
        );
    }
}
