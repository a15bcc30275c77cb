//! Basic failover example
//!
//! This example sends a lookup to a group of mirrors. The first mirror is
//! down, so the group fails over and remembers it as failing.
//! Run with: cargo run --example basic_failover

use failover_group::ServiceGroup;
use std::fmt;
use std::time::Duration;

#[derive(Debug)]
struct Mirror {
    host: &'static str,
    online: bool,
}

#[derive(Debug)]
struct MirrorError(String);

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn fetch(mirror: &Mirror, package: &str) -> Result<String, MirrorError> {
    if mirror.online {
        Ok(format!("{}/{}.tar.gz", mirror.host, package))
    } else {
        Err(MirrorError(format!("{}: connection refused", mirror.host)))
    }
}

fn main() {
    let mut mirrors = ServiceGroup::builder()
        .backend(
            "primary",
            Mirror {
                host: "mirror-1.example.org",
                online: false,
            },
        )
        .backend(
            "secondary",
            Mirror {
                host: "mirror-2.example.org",
                online: true,
            },
        )
        .backend(
            "tertiary",
            Mirror {
                host: "mirror-3.example.org",
                online: true,
            },
        )
        .name("package-mirrors")
        .recovery_delay(Duration::from_secs(60))
        .logger(|backend: &str, message: &str| {
            println!("  [{}] failed: {}", backend, message);
        })
        .on_success(|backend, attempts| {
            println!("  {} answered after {} attempt(s)", backend, attempts);
        })
        .build();

    println!("First fetch:");
    match mirrors.try_call(|backend| fetch(backend.service(), "serde-1.0")) {
        Ok(url) => println!("  -> {}", url),
        Err(e) => println!("  -> {}", e),
    }

    println!("\nSecond fetch (primary is now tried last):");
    match mirrors.try_call(|backend| fetch(backend.service(), "tokio-1.48")) {
        Ok(url) => println!("  -> {}", url),
        Err(e) => println!("  -> {}", e),
    }

    println!("\nHealth:");
    for health in mirrors.health_report() {
        println!(
            "  {:<10} {}",
            health.name,
            if health.failing { "failing" } else { "healthy" }
        );
    }

    println!("\nEvery mirror down:");
    let result = mirrors.try_call(|backend| {
        Err::<String, _>(MirrorError(format!("{}: timeout", backend.service().host)))
    });
    if let Err(e) = result {
        println!("  -> {}", e);
        println!("  -> {} of {} backends attempted", e.attempts(), e.total());
    }
}
