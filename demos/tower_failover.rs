//! Failover as a Tower service
//!
//! This example turns a group of HTTP-like replicas into a single Tower
//! service and logs failed attempts through `tracing`.
//! Run with: cargo run --example tower_failover --features tracing

use failover_group::{ServiceGroup, TracingLogger};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::util::BoxCloneService;
use tower::{Service, ServiceExt, service_fn};

#[derive(Debug, Clone)]
struct ReplicaError(String);

impl std::fmt::Display for ReplicaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

type Replica = BoxCloneService<String, String, ReplicaError>;

fn replica(name: &'static str, online: Arc<AtomicBool>) -> Replica {
    BoxCloneService::new(service_fn(move |path: String| {
        let online = online.load(Ordering::SeqCst);
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if online {
                Ok(format!("200 OK from {} for {}", name, path))
            } else {
                Err(ReplicaError(format!("{} returned 503", name)))
            }
        }
    }))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let eu_online = Arc::new(AtomicBool::new(false));
    let us_online = Arc::new(AtomicBool::new(true));

    let mut service = ServiceGroup::builder()
        .backend("eu-1", replica("eu-1", Arc::clone(&eu_online)))
        .backend("us-1", replica("us-1", Arc::clone(&us_online)))
        .name("api-replicas")
        .logger(TracingLogger)
        .on_exhausted(|attempts| {
            println!("  every replica failed ({} attempts)", attempts);
        })
        .build()
        .into_service();

    for path in ["/users", "/orders"] {
        println!("\nGET {}", path);
        match service.ready().await.unwrap().call(path.to_string()).await {
            Ok(body) => println!("  -> {}", body),
            Err(e) => println!("  -> {}", e),
        }
    }

    println!("\nus-1 goes down too");
    us_online.store(false, Ordering::SeqCst);
    match service.ready().await.unwrap().call("/health".to_string()).await {
        Ok(body) => println!("  -> {}", body),
        Err(e) => println!("  -> {}", e),
    }

    println!("\neu-1 comes back; failing replicas are still tried in order");
    eu_online.store(true, Ordering::SeqCst);
    match service.ready().await.unwrap().call("/users".to_string()).await {
        Ok(body) => println!("  -> {}", body),
        Err(e) => println!("  -> {}", e),
    }

    for health in service.health_report() {
        println!("  {}: failing={}", health.name, health.failing);
    }
}
