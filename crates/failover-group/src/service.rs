//! Tower integration: a group of services behaving as one.

use crate::{BackendHealth, ServiceGroup, SharedServiceGroup};
use failover_group_core::ExhaustedError;
use futures::future::BoxFuture;
use std::fmt;
use std::task::{Context, Poll};
use tokio::time::Instant;
use tower::{Service, ServiceExt};

/// A Tower [`Service`] that sends each request to a group of backend
/// services, failing over from one to the next.
///
/// Every backend is itself a `Service`. A request is cloned for each attempt
/// and sent to the backends in the group's trial order (healthy first, failing
/// last) until one returns `Ok`. When all fail, the response is an
/// [`ExhaustedError`] built from the backends' error messages.
///
/// Health is shared between clones of the service. The lock guarding it is
/// only held while planning a request and while recording an outcome, never
/// across an `.await`, so requests against different backends proceed
/// concurrently.
///
/// # Examples
///
/// ```
/// use failover_group::{Backend, ServiceGroup};
/// use tower::{Service, ServiceExt};
///
/// # async fn example() {
/// let primary = tower::service_fn(|_req: String| async {
///     Err::<String, _>(std::io::Error::other("primary down"))
/// });
/// let replica = tower::service_fn(|req: String| async move {
///     Ok::<_, std::io::Error>(format!("replica handled {}", req))
/// });
///
/// // Both backends must have the same type, so box them.
/// let mut service = ServiceGroup::builder()
///     .backend("primary", tower::util::BoxCloneService::new(primary))
///     .backend("replica", tower::util::BoxCloneService::new(replica))
///     .name("api")
///     .build()
///     .into_service();
///
/// let response = service.ready().await.unwrap().call("ping".to_string()).await.unwrap();
/// assert_eq!(response, "replica handled ping");
/// # }
/// ```
pub struct Failover<S> {
    group: SharedServiceGroup<S>,
}

impl<S> Failover<S> {
    /// Creates a failover service over the backends of `group`.
    pub fn new(group: ServiceGroup<S>) -> Self {
        Self {
            group: SharedServiceGroup::new(group),
        }
    }

    /// Creates a failover service sharing health with an existing handle.
    pub fn from_shared(group: SharedServiceGroup<S>) -> Self {
        Self { group }
    }

    /// The shared group behind this service.
    pub fn group(&self) -> &SharedServiceGroup<S> {
        &self.group
    }

    /// Health of every backend, in group order.
    pub fn health_report(&self) -> Vec<BackendHealth> {
        self.group.health_report()
    }
}

impl<S> Clone for Failover<S> {
    fn clone(&self) -> Self {
        Self {
            group: self.group.clone(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Failover<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failover")
            .field("group", &self.group)
            .finish()
    }
}

impl<S, Req> Service<Req> for Failover<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: fmt::Display,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = ExhaustedError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Backends are readied one at a time inside `call`.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let group = self.group.clone();

        Box::pin(async move {
            let plan: Vec<(usize, S)> = {
                let mut guard = group.lock();
                let order = guard.trial_order();
                order
                    .into_iter()
                    .map(|index| (index, guard.backends()[index].service().clone()))
                    .collect()
            };

            let mut failures = Vec::with_capacity(plan.len());

            for (attempt, (index, backend)) in plan.into_iter().enumerate() {
                match backend.oneshot(req.clone()).await {
                    Ok(response) => {
                        group.lock().record_success(index, attempt + 1);
                        return Ok(response);
                    }
                    Err(error) => {
                        let message = error.to_string();
                        group
                            .lock()
                            .record_failure(index, attempt + 1, &message, Instant::now());
                        failures.push(message);
                    }
                }
            }

            let exhausted = group.lock().exhausted(failures);
            Err(exhausted)
        })
    }
}
