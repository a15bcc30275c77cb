//! The `Failover` Tower service.

use super::TestError;
use failover_group::{Failover, ServiceGroup};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::BoxCloneService;
use tower::{Service, ServiceBuilder, ServiceExt};

type Replica = BoxCloneService<String, String, TestError>;

fn replica(name: &'static str, up: Arc<AtomicUsize>, calls: Arc<AtomicUsize>) -> Replica {
    BoxCloneService::new(tower::service_fn(move |req: String| {
        calls.fetch_add(1, Ordering::SeqCst);
        let up = up.load(Ordering::SeqCst) != 0;
        async move {
            if up {
                Ok(format!("{} -> {}", name, req))
            } else {
                Err(TestError::new(format!("{} unreachable", name)))
            }
        }
    }))
}

fn flag(up: bool) -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(up as usize))
}

#[tokio::test]
async fn test_request_reaches_first_healthy_replica() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut service = ServiceGroup::builder()
        .backend("east", replica("east", flag(false), Arc::clone(&calls)))
        .backend("west", replica("west", flag(true), Arc::clone(&calls)))
        .name("replicas")
        .build()
        .into_service();

    let response = service
        .ready()
        .await
        .unwrap()
        .call("GET /".to_string())
        .await
        .unwrap();

    assert_eq!(response, "west -> GET /");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_replica_is_retried_after_it_comes_back() {
    let east_up = flag(false);
    let calls = Arc::new(AtomicUsize::new(0));
    let mut service = ServiceGroup::builder()
        .backend("east", replica("east", Arc::clone(&east_up), Arc::clone(&calls)))
        .backend("west", replica("west", flag(false), Arc::clone(&calls)))
        .build()
        .into_service();

    let err = service.ready().await.unwrap().call("a".to_string()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "2 services failed, could not complete action (east unreachable, west unreachable)"
    );

    // Both failing: still tried in group order.
    east_up.store(1, Ordering::SeqCst);
    let response = service.ready().await.unwrap().call("b".to_string()).await.unwrap();
    assert_eq!(response, "east -> b");

    let report = service.health_report();
    assert!(!report[0].failing);
    assert!(report[1].failing);
}

#[tokio::test]
async fn test_shared_health_with_group_handle() {
    let calls = Arc::new(AtomicUsize::new(0));
    let shared = ServiceGroup::builder()
        .backend("east", replica("east", flag(false), Arc::clone(&calls)))
        .backend("west", replica("west", flag(true), Arc::clone(&calls)))
        .build()
        .into_shared();

    let mut service = Failover::from_shared(shared.clone());
    service.ready().await.unwrap().call("x".to_string()).await.unwrap();

    assert_eq!(shared.failing_count(), 1);
    assert_eq!(shared.health_report()[0].name, "east");
}

#[tokio::test]
async fn test_concurrent_requests_share_health() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = ServiceGroup::builder()
        .backend("east", replica("east", flag(false), Arc::clone(&calls)))
        .backend("west", replica("west", flag(true), Arc::clone(&calls)))
        .build()
        .into_service();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let svc = service.clone();
            tokio::spawn(async move { svc.oneshot(format!("req-{}", i)).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert!(response.starts_with("west -> req-"));
    }

    assert_eq!(service.group().failing_count(), 1);
    // At least the first request hit "east"; later ones may skip it.
    assert!(calls.load(Ordering::SeqCst) >= 9);
}

#[tokio::test]
async fn test_composes_with_service_builder() {
    let calls = Arc::new(AtomicUsize::new(0));
    let failover = ServiceGroup::builder()
        .backend("east", replica("east", flag(false), Arc::clone(&calls)))
        .backend("west", replica("west", flag(true), Arc::clone(&calls)))
        .build()
        .into_service();

    let mut service = ServiceBuilder::new()
        .map_request(|req: String| req.to_uppercase())
        .map_response(|resp: String| resp.len())
        .service(failover);

    let response = service
        .ready()
        .await
        .unwrap()
        .call("ping".to_string())
        .await
        .unwrap();
    assert_eq!(response, "west -> PING".len());
}

#[tokio::test]
async fn test_empty_service_group() {
    let mut service: Failover<Replica> = ServiceGroup::new(Vec::new()).into_service();
    let err = service
        .ready()
        .await
        .unwrap()
        .call("x".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.total(), 0);
    assert_eq!(
        err.to_string(),
        "0 services failed, could not complete action ()"
    );
}
