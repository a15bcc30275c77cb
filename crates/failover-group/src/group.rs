//! The service group and its failover loop.

use crate::config::{ServiceGroupBuilder, ServiceGroupConfig};
use crate::events::FailoverEvent;
use crate::{Backend, BackendHealth, Failover, Logger, OrderingStrategy, SharedServiceGroup};
use failover_group_core::ExhaustedError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// An ordered set of interchangeable backends tried healthy-first.
///
/// Each call to [`try_call`](Self::try_call):
///
/// 1. clears the failing mark of every backend whose last failure is older
///    than the recovery delay,
/// 2. orders the healthy backends with the configured
///    [`OrderingStrategy`], then appends the failing ones in group order,
/// 3. runs the action against each backend in that order until one succeeds.
///
/// A failed attempt marks its backend failing; a successful one clears the
/// mark immediately. If every backend fails the call returns an
/// [`ExhaustedError`].
///
/// Calls take `&mut self`: a plain group is for one caller at a time. Use
/// [`SharedServiceGroup`] or [`Failover`] to share it.
///
/// # Examples
///
/// ```rust
/// use failover_group::{Backend, ServiceGroup};
///
/// let mut group = ServiceGroup::new(vec![
///     Backend::new("primary", "db-1"),
///     Backend::new("replica", "db-2"),
/// ]);
///
/// let host = group
///     .try_call(|backend| {
///         if backend.name() == "primary" {
///             Err("connection refused")
///         } else {
///             Ok(*backend.service())
///         }
///     })
///     .unwrap();
///
/// assert_eq!(host, "db-2");
/// assert!(group.backends()[0].is_failing());
/// ```
pub struct ServiceGroup<T> {
    backends: Vec<Backend<T>>,
    config: ServiceGroupConfig,
    rotation: usize,
}

impl<T> ServiceGroup<T> {
    /// Creates a group with default configuration: 5 minute recovery delay,
    /// healthy backends tried in the given order.
    pub fn new<I>(backends: I) -> Self
    where
        I: IntoIterator<Item = Backend<T>>,
    {
        Self::with_config(backends, ServiceGroupConfig::default())
    }

    /// Creates a group with the given configuration.
    pub fn with_config<I>(backends: I, config: ServiceGroupConfig) -> Self
    where
        I: IntoIterator<Item = Backend<T>>,
    {
        Self {
            backends: backends.into_iter().collect(),
            config,
            rotation: 0,
        }
    }

    /// Create a new builder.
    pub fn builder() -> ServiceGroupBuilder<T> {
        ServiceGroupBuilder::new()
    }

    /// The group name used in events and metrics.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The backends in group order.
    pub fn backends(&self) -> &[Backend<T>] {
        &self.backends
    }

    /// Looks up a backend by name.
    pub fn backend(&self, name: &str) -> Option<&Backend<T>> {
        self.backends.iter().find(|b| b.name() == name)
    }

    /// Consumes the group, returning its backends in group order.
    pub fn into_backends(self) -> Vec<Backend<T>> {
        self.backends
    }

    /// Number of backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Returns true if the group has no backends.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Number of backends currently marked failing.
    pub fn failing_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_failing()).count()
    }

    /// Number of backends not marked failing.
    pub fn healthy_count(&self) -> usize {
        self.len() - self.failing_count()
    }

    /// Health of every backend, in group order.
    pub fn health_report(&self) -> Vec<BackendHealth> {
        self.backends.iter().map(Backend::snapshot).collect()
    }

    /// The configuration.
    pub fn config(&self) -> &ServiceGroupConfig {
        &self.config
    }

    /// How long a failing backend stays deprioritized.
    pub fn recovery_delay(&self) -> Duration {
        self.config.recovery_delay
    }

    /// Changes the recovery delay. Takes effect on the next call.
    pub fn set_recovery_delay(&mut self, delay: Duration) {
        self.config.recovery_delay = delay;
    }

    /// Returns true if healthy backends are shuffled on every call.
    pub fn randomize_healthy(&self) -> bool {
        self.config.ordering.is_randomized()
    }

    /// Turns shuffling of healthy backends on or off.
    pub fn set_randomize_healthy(&mut self, randomize: bool) {
        self.config.ordering = if randomize {
            OrderingStrategy::Shuffle
        } else {
            OrderingStrategy::Preserve
        };
    }

    /// The ordering strategy for healthy backends.
    pub fn ordering(&self) -> &OrderingStrategy {
        &self.config.ordering
    }

    /// Replaces the ordering strategy for healthy backends.
    pub fn set_ordering(&mut self, ordering: OrderingStrategy) {
        self.config.ordering = ordering;
    }

    /// Installs the hook called for every failed attempt.
    pub fn set_logger<L>(&mut self, logger: L)
    where
        L: Logger + 'static,
    {
        self.config.logger = Some(Arc::new(logger));
    }

    /// Removes the failed-attempt hook.
    pub fn clear_logger(&mut self) {
        self.config.logger = None;
    }

    /// Wraps the group for use from several threads.
    pub fn into_shared(self) -> SharedServiceGroup<T> {
        SharedServiceGroup::new(self)
    }

    /// Turns a group of Tower services into a single failover service.
    pub fn into_service(self) -> Failover<T> {
        Failover::new(self)
    }

    /// Computes the order an attempt loop uses: the first step of every
    /// [`try_call`](Self::try_call).
    ///
    /// Returns indices into [`backends`](Self::backends): healthy backends
    /// arranged by the ordering strategy, then failing backends in group
    /// order. With [`OrderingStrategy::Preserve`] and no intervening
    /// failures or elapsed recovery delay, repeated calls return the same
    /// order.
    ///
    /// This is not a read-only preview. Each call
    /// - clears the failing mark of backends past the recovery delay and
    ///   emits `Recovered` for each of them,
    /// - advances the [`OrderingStrategy::RoundRobin`] cursor,
    /// - draws a fresh shuffle under [`OrderingStrategy::Shuffle`].
    ///
    /// Use [`health_report`](Self::health_report) to inspect the group
    /// without changing it.
    pub fn trial_order(&mut self) -> Vec<usize> {
        self.recover_stale(Instant::now());

        let (mut healthy, failing) = self.partition();
        self.config
            .ordering
            .arrange(&mut healthy, &mut self.rotation);

        healthy.extend(failing);
        healthy
    }

    /// Runs `action` against backends until one succeeds.
    ///
    /// The action receives the backend selected for the attempt and is called
    /// at most once per backend. Its error is only used for its message. Calls
    /// are sequential; the group imposes no timeout on an action.
    ///
    /// # Errors
    ///
    /// [`ExhaustedError`] when every backend failed or the group is empty.
    pub fn try_call<R, E, F>(&mut self, mut action: F) -> Result<R, ExhaustedError>
    where
        F: FnMut(&Backend<T>) -> Result<R, E>,
        E: fmt::Display,
    {
        let order = self.trial_order();
        let mut failures = Vec::with_capacity(order.len());

        for (attempt, index) in order.into_iter().enumerate() {
            match action(&self.backends[index]) {
                Ok(value) => {
                    self.record_success(index, attempt + 1);
                    return Ok(value);
                }
                Err(error) => {
                    let message = error.to_string();
                    self.record_failure(index, attempt + 1, &message, Instant::now());
                    failures.push(message);
                }
            }
        }

        Err(self.exhausted(failures))
    }

    /// Async version of [`try_call`](Self::try_call).
    ///
    /// Attempts are awaited one after another. Dropping the returned future
    /// stops the loop; backends not yet tried keep their state.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use failover_group::{Backend, ServiceGroup};
    ///
    /// # async fn example() {
    /// let mut group = ServiceGroup::new(vec![
    ///     Backend::new("a", 1u32),
    ///     Backend::new("b", 2u32),
    /// ]);
    ///
    /// let doubled = group
    ///     .try_call_async(|backend| {
    ///         let value = *backend.service();
    ///         async move { Ok::<_, std::io::Error>(value * 2) }
    ///     })
    ///     .await
    ///     .unwrap();
    /// assert_eq!(doubled, 2);
    /// # }
    /// ```
    pub async fn try_call_async<R, E, F, Fut>(&mut self, mut action: F) -> Result<R, ExhaustedError>
    where
        F: FnMut(&Backend<T>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: fmt::Display,
    {
        let order = self.trial_order();
        let mut failures = Vec::with_capacity(order.len());

        for (attempt, index) in order.into_iter().enumerate() {
            match action(&self.backends[index]).await {
                Ok(value) => {
                    self.record_success(index, attempt + 1);
                    return Ok(value);
                }
                Err(error) => {
                    let message = error.to_string();
                    self.record_failure(index, attempt + 1, &message, Instant::now());
                    failures.push(message);
                }
            }
        }

        Err(self.exhausted(failures))
    }

    /// Clears the failing mark of backends whose last failure is more than
    /// the recovery delay before `now`.
    pub(crate) fn recover_stale(&mut self, now: Instant) {
        let delay = self.config.recovery_delay;

        for backend in &mut self.backends {
            let Some(since) = backend.last_failure() else {
                continue;
            };

            let failed_for = now.saturating_duration_since(since);
            if failed_for <= delay {
                continue;
            }

            backend.mark_healthy();

            #[cfg(feature = "tracing")]
            tracing::info!(
                group = %self.config.name,
                backend = backend.name(),
                ?failed_for,
                "backend recovered after delay"
            );

            #[cfg(feature = "metrics")]
            counter!("failover_recoveries_total", "group" => self.config.name.clone(), "backend" => backend.name().to_string())
                .increment(1);

            self.config
                .event_listeners
                .emit(&FailoverEvent::Recovered {
                    group_name: self.config.name.clone(),
                    timestamp: now.into_std(),
                    backend: backend.name().to_string(),
                    failed_for,
                });
        }

        #[cfg(feature = "metrics")]
        self.publish_failing_gauge();
    }

    /// Splits backend indices into (healthy, failing), each in group order.
    pub(crate) fn partition(&self) -> (Vec<usize>, Vec<usize>) {
        (0..self.backends.len()).partition(|&i| !self.backends[i].is_failing())
    }

    pub(crate) fn record_success(&mut self, index: usize, attempts: usize) {
        let backend = &mut self.backends[index];
        backend.mark_healthy();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            group = %self.config.name,
            backend = backend.name(),
            attempts,
            "backend completed action"
        );

        #[cfg(feature = "metrics")]
        {
            counter!("failover_attempts_total", "group" => self.config.name.clone(), "backend" => backend.name().to_string(), "outcome" => "success").increment(1);
            counter!("failover_calls_total", "group" => self.config.name.clone(), "outcome" => "success").increment(1);
        }

        self.config.event_listeners.emit(&FailoverEvent::Success {
            group_name: self.config.name.clone(),
            timestamp: std::time::Instant::now(),
            backend: backend.name().to_string(),
            attempts,
        });

        #[cfg(feature = "metrics")]
        self.publish_failing_gauge();
    }

    pub(crate) fn record_failure(&mut self, index: usize, attempt: usize, message: &str, at: Instant) {
        let backend = &mut self.backends[index];
        backend.mark_failing(at);

        if let Some(logger) = &self.config.logger {
            logger.log(backend.name(), message);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            group = %self.config.name,
            backend = backend.name(),
            attempt,
            error = message,
            "backend attempt failed"
        );

        #[cfg(feature = "metrics")]
        counter!("failover_attempts_total", "group" => self.config.name.clone(), "backend" => backend.name().to_string(), "outcome" => "failure").increment(1);

        self.config
            .event_listeners
            .emit(&FailoverEvent::AttemptFailed {
                group_name: self.config.name.clone(),
                timestamp: at.into_std(),
                backend: backend.name().to_string(),
                attempt,
                message: message.to_string(),
            });

        #[cfg(feature = "metrics")]
        self.publish_failing_gauge();
    }

    /// Builds the aggregate error for a call whose attempts all failed.
    pub(crate) fn exhausted(&self, failures: Vec<String>) -> ExhaustedError {
        let total = self.backends.len();
        let attempts = failures.len();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            group = %self.config.name,
            total,
            attempts,
            "all backends failed"
        );

        #[cfg(feature = "metrics")]
        counter!("failover_calls_total", "group" => self.config.name.clone(), "outcome" => "exhausted").increment(1);

        self.config.event_listeners.emit(&FailoverEvent::Exhausted {
            group_name: self.config.name.clone(),
            timestamp: std::time::Instant::now(),
            total,
            attempts,
        });

        ExhaustedError::new(total, failures)
    }

    #[cfg(feature = "metrics")]
    fn publish_failing_gauge(&self) {
        gauge!("failover_failing_backends", "group" => self.config.name.clone())
            .set(self.failing_count() as f64);
    }
}

impl<T: fmt::Debug> fmt::Debug for ServiceGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceGroup")
            .field("backends", &self.backends)
            .field("config", &self.config)
            .finish()
    }
}
