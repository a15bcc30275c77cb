//! Trial order, short-circuit on success and the aggregate error.

use super::{endpoints, failing_names, TestError};
use failover_group::{Backend, ServiceGroup};

#[test]
fn test_first_backend_success_calls_once() {
    let mut group = endpoints(&["a", "b", "c"]);
    let mut tried = Vec::new();

    let url = group
        .try_call(|backend| {
            tried.push(backend.name().to_string());
            Ok::<_, TestError>(backend.service().url.clone())
        })
        .unwrap();

    assert_eq!(url, "http://a.internal");
    assert_eq!(tried, vec!["a"]);
    assert!(failing_names(&group).is_empty());
}

#[test]
fn test_fails_over_in_group_order() {
    let mut group = endpoints(&["a", "b", "c"]);
    let mut tried = Vec::new();

    let result = group.try_call(|backend| {
        tried.push(backend.name().to_string());
        if backend.name() == "c" {
            Ok(())
        } else {
            Err(TestError::new("refused"))
        }
    });

    assert!(result.is_ok());
    assert_eq!(tried, vec!["a", "b", "c"]);
    assert_eq!(failing_names(&group), vec!["a", "b"]);
}

#[test]
fn test_all_failing_reports_total_and_marks_everything() {
    let mut group = endpoints(&["Service A", "Service B", "Service C"]);
    let mut count = 0;

    let err = group
        .try_call(|_| {
            count += 1;
            Err::<(), _>(TestError::new(format!("Error {}", count)))
        })
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "3 services failed, could not complete action (Error 1, Error 2, Error 3)"
    );
    assert_eq!(err.total(), 3);
    assert_eq!(err.attempts(), 3);
    assert_eq!(err.failures(), ["Error 1", "Error 2", "Error 3"]);

    for backend in group.backends() {
        assert!(backend.is_failing(), "{} should be failing", backend.name());
        assert!(backend.last_failure().is_some());
    }
}

#[test]
fn test_messages_follow_attempt_order_not_group_order() {
    let mut group = endpoints(&["a", "b", "c"]);

    // Mark "a" failing so the next call tries it last.
    let _ = group.try_call(|backend| {
        if backend.name() == "a" {
            Err(TestError::new("a down"))
        } else {
            Ok(())
        }
    });

    let err = group
        .try_call(|backend| Err::<(), _>(TestError::new(format!("{} down", backend.name()))))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "3 services failed, could not complete action (b down, c down, a down)"
    );
}

#[test]
fn test_failing_backend_tried_after_healthy_ones() {
    let mut group = endpoints(&["a", "b", "c"]);

    let _ = group.try_call(|backend| {
        if backend.name() == "a" {
            Err(TestError::new("down"))
        } else {
            Ok(())
        }
    });
    assert_eq!(failing_names(&group), vec!["a"]);

    let mut tried = Vec::new();
    let _ = group.try_call(|backend| {
        tried.push(backend.name().to_string());
        Err::<(), _>(TestError::new("down"))
    });
    assert_eq!(tried, vec!["b", "c", "a"]);
}

#[test]
fn test_success_clears_failing_before_recovery_delay() {
    let mut group = endpoints(&["only"]);

    let _ = group.try_call(|_| Err::<(), _>(TestError::new("down")));
    assert!(group.backends()[0].is_failing());

    // Only backend, so it is tried even though it is failing.
    group.try_call(|_| Ok::<_, TestError>(())).unwrap();
    assert!(!group.backends()[0].is_failing());
    assert_eq!(group.backends()[0].last_failure(), None);
}

#[test]
fn test_success_on_kth_leaves_earlier_backends_failing() {
    let mut group = endpoints(&["a", "b", "c", "d"]);
    let mut calls = 0;

    group
        .try_call(|_| {
            calls += 1;
            if calls == 3 {
                Ok(())
            } else {
                Err(TestError::new("down"))
            }
        })
        .unwrap();

    assert_eq!(calls, 3);
    assert_eq!(failing_names(&group), vec!["a", "b"]);
    assert!(!group.backends()[2].is_failing());
    // Never tried
    assert!(!group.backends()[3].is_failing());
}

#[test]
fn test_empty_group() {
    let mut group: ServiceGroup<()> = ServiceGroup::new(Vec::new());
    let mut calls = 0;

    let err = group
        .try_call(|_| {
            calls += 1;
            Ok::<_, TestError>(())
        })
        .unwrap_err();

    assert_eq!(calls, 0);
    assert_eq!(
        err.to_string(),
        "0 services failed, could not complete action ()"
    );
    assert!(err.is_empty_group());
}

#[test]
fn test_action_receives_selected_backend() {
    let mut group = ServiceGroup::new(vec![
        Backend::new("primary", 5432u16),
        Backend::new("replica", 5433u16),
    ]);

    let port = group
        .try_call(|backend| {
            if *backend.service() == 5432 {
                Err(TestError::new("primary in maintenance"))
            } else {
                Ok(*backend.service())
            }
        })
        .unwrap();

    assert_eq!(port, 5433);
}

#[test]
fn test_into_backends_returns_state() {
    let mut group = endpoints(&["a", "b"]);
    let _ = group.try_call(|backend| {
        if backend.name() == "a" {
            Err(TestError::new("down"))
        } else {
            Ok(())
        }
    });

    let backends = group.into_backends();
    assert_eq!(backends.len(), 2);
    assert!(backends[0].is_failing());
    assert_eq!(
        backends[1].clone().into_service().url,
        "http://b.internal"
    );
}
