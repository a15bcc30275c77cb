//! Failover dispatch across interchangeable backends.
//!
//! A [`ServiceGroup`] holds an ordered set of backends that can all serve the
//! same request: API endpoints, database replicas, mirrors. Instead of
//! writing a retry loop around them, callers hand the group an action and the
//! group runs it against one backend after another until one succeeds.
//!
//! # Failover policy
//!
//! - Backends that failed recently are tried **last**, after every backend
//!   not known to be failing.
//! - A failing backend becomes eligible again once its last failure is older
//!   than the recovery delay (5 minutes by default), or immediately when an
//!   attempt against it succeeds.
//! - Healthy backends are tried in group order, or shuffled / rotated /
//!   custom-ordered via [`OrderingStrategy`].
//! - If every backend fails, the call returns one [`ExhaustedError`] listing
//!   each attempt's error message in attempt order.
//!
//! # Flavours
//!
//! - [`ServiceGroup`]: single caller, no locking. `try_call` and
//!   `try_call_async` take `&mut self`.
//! - [`SharedServiceGroup`]: cloneable, `Mutex`-guarded handle for multiple
//!   threads.
//! - [`Failover`]: a Tower [`Service`](tower::Service) over a group of Tower
//!   services.
//!
//! # Examples
//!
//! ```rust
//! use failover_group::ServiceGroup;
//! use std::time::Duration;
//!
//! let mut group = ServiceGroup::builder()
//!     .backend("us-east", "https://us-east.example.com")
//!     .backend("eu-west", "https://eu-west.example.com")
//!     .name("geo-api")
//!     .recovery_delay(Duration::from_secs(60))
//!     .on_attempt_failed(|backend, attempt| {
//!         println!("attempt {} on {} failed", attempt, backend);
//!     })
//!     .build();
//!
//! let result = group.try_call(|backend| {
//!     if backend.name() == "us-east" {
//!         Err("connection reset")
//!     } else {
//!         Ok(backend.service().len())
//!     }
//! });
//!
//! assert!(result.is_ok());
//! assert!(group.backends()[0].is_failing());
//!
//! // The next call goes to eu-west first.
//! let first = group.try_call(|backend| Ok::<_, String>(backend.name().to_string()));
//! assert_eq!(first.unwrap(), "eu-west");
//! ```
//!
//! ## Every backend failing
//!
//! ```rust
//! use failover_group::{Backend, ServiceGroup};
//!
//! let mut group = ServiceGroup::new(vec![
//!     Backend::new("a", ()),
//!     Backend::new("b", ()),
//! ]);
//!
//! let err = group
//!     .try_call(|backend| Err::<(), _>(format!("{} refused", backend.name())))
//!     .unwrap_err();
//!
//! assert_eq!(
//!     err.to_string(),
//!     "2 services failed, could not complete action (a refused, b refused)"
//! );
//! ```
//!
//! # Features
//!
//! - `tracing`: log attempts, recoveries and exhausted calls, and provide
//!   [`TracingLogger`].
//! - `metrics`: `failover_attempts_total`, `failover_calls_total`,
//!   `failover_recoveries_total` counters and the
//!   `failover_failing_backends` gauge, all labelled with the group name.

mod backend;
mod config;
mod events;
mod group;
mod logger;
mod ordering;
mod service;
mod shared;

pub use backend::{Backend, BackendHealth, HealthState};
pub use config::{
    ServiceGroupBuilder, ServiceGroupConfig, ServiceGroupConfigBuilder, DEFAULT_RECOVERY_DELAY,
};
pub use events::FailoverEvent;
pub use failover_group_core::ExhaustedError;
pub use group::ServiceGroup;
#[cfg(feature = "tracing")]
pub use logger::TracingLogger;
pub use logger::Logger;
pub use ordering::{CustomOrderFn, OrderingStrategy};
pub use service::Failover;
pub use shared::SharedServiceGroup;
