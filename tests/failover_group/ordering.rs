//! Ordering strategies for healthy backends.

use super::{endpoints, fail_named, failing_names, TestError};
use failover_group::{Backend, OrderingStrategy, ServiceGroup};
use std::collections::HashSet;

fn leader<T>(group: &mut ServiceGroup<T>) -> String {
    let mut first = String::new();
    let _ = group.try_call(|backend| {
        first = backend.name().to_string();
        Ok::<_, TestError>(())
    });
    first
}

#[test]
fn test_backends_behind_a_healthy_one_can_be_marked() {
    let mut group = endpoints(&["a", "b", "c", "d"]);
    group.set_ordering(OrderingStrategy::RoundRobin);

    fail_named(&mut group, &["b", "d"]);

    assert_eq!(failing_names(&group), vec!["b", "d"]);
    assert!(matches!(group.ordering(), OrderingStrategy::RoundRobin));
    assert_eq!(group.trial_order(), vec![0, 2, 1, 3]);
}

#[test]
fn test_shuffle_keeps_failing_backends_last() {
    let mut group = endpoints(&["a", "b", "c", "d", "e"]);
    fail_named(&mut group, &["b", "d"]);
    group.set_randomize_healthy(true);

    for _ in 0..100 {
        let order = group.trial_order();
        assert_eq!(order.len(), 5);
        assert_eq!(&order[3..], &[1, 3]);

        let healthy: HashSet<usize> = order[..3].iter().copied().collect();
        assert_eq!(healthy, HashSet::from([0, 2, 4]));
    }
}

#[test]
fn test_shuffle_eventually_changes_leader() {
    let mut group = endpoints(&["a", "b", "c", "d"]);
    group.set_randomize_healthy(true);

    let leaders: HashSet<String> = (0..200).map(|_| leader(&mut group)).collect();
    // 200 draws from 4 equally likely leaders
    assert!(leaders.len() > 1, "shuffle never moved the leader");
}

#[test]
fn test_preserve_is_default_and_deterministic() {
    let mut group = endpoints(&["a", "b", "c"]);
    assert!(!group.randomize_healthy());

    for _ in 0..10 {
        assert_eq!(leader(&mut group), "a");
    }
}

#[test]
fn test_toggle_randomization_back_off() {
    let mut group = endpoints(&["a", "b", "c"]);
    group.set_randomize_healthy(true);
    assert!(group.randomize_healthy());

    group.set_randomize_healthy(false);
    assert!(!group.randomize_healthy());
    assert_eq!(group.trial_order(), vec![0, 1, 2]);
}

#[test]
fn test_round_robin_spreads_leaders() {
    let mut group = endpoints(&["a", "b", "c"]);
    group.set_ordering(OrderingStrategy::RoundRobin);

    let leaders: Vec<String> = (0..6).map(|_| leader(&mut group)).collect();
    assert_eq!(leaders, vec!["a", "b", "c", "a", "b", "c"]);
}

#[test]
fn test_round_robin_skips_failing_backends() {
    let mut group = endpoints(&["a", "b", "c"]);
    fail_named(&mut group, &["b"]);
    group.set_ordering(OrderingStrategy::RoundRobin);

    for _ in 0..4 {
        let order = group.trial_order();
        assert_eq!(order.last(), Some(&1));
    }
}

#[test]
fn test_custom_strategy_reorders_healthy_only() {
    let mut group = endpoints(&["a", "b", "c", "d"]);
    fail_named(&mut group, &["a"]);
    group.set_ordering(OrderingStrategy::custom(|healthy: &mut [usize]| {
        healthy.reverse()
    }));

    assert_eq!(group.trial_order(), vec![3, 2, 1, 0]);
}

#[test]
fn test_builder_ordering() {
    let mut group = ServiceGroup::builder()
        .backends(["x", "y", "z"].map(|name| Backend::new(name, ())))
        .ordering(OrderingStrategy::custom(|healthy: &mut [usize]| {
            healthy.sort_by_key(|&i| std::cmp::Reverse(i))
        }))
        .build();

    assert_eq!(leader(&mut group), "z");
}

#[test]
fn test_custom_strategy_repeating_an_index_is_ignored() {
    let mut group = endpoints(&["a", "b"]);
    group.set_ordering(OrderingStrategy::custom(|healthy: &mut [usize]| {
        healthy.fill(0)
    }));

    let mut tried = Vec::new();
    let err = group
        .try_call(|backend| {
            tried.push(backend.name().to_string());
            Err::<(), _>(TestError::new(format!("{} down", backend.name())))
        })
        .unwrap_err();

    assert_eq!(tried, vec!["a", "b"]);
    assert_eq!(
        err.to_string(),
        "2 services failed, could not complete action (a down, b down)"
    );
    assert_eq!(failing_names(&group), vec!["a", "b"]);
}

#[test]
fn test_custom_strategy_out_of_range_index_is_ignored() {
    let mut group = endpoints(&["only"]);
    group.set_ordering(OrderingStrategy::custom(|healthy: &mut [usize]| {
        if let Some(first) = healthy.first_mut() {
            *first = 7;
        }
    }));

    let name = group
        .try_call(|backend| Ok::<_, TestError>(backend.name().to_string()))
        .unwrap();
    assert_eq!(name, "only");
}
