//! Configuration for service groups.

use crate::events::FailoverEvent;
use crate::{Backend, Logger, OrderingStrategy, ServiceGroup};
use failover_group_core::events::{EventListeners, FnListener};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How long a failing backend waits before it is treated as healthy again.
pub const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_secs(5 * 60);

/// Configuration for a [`ServiceGroup`].
#[derive(Clone)]
pub struct ServiceGroupConfig {
    /// Name used in events, logs and metric labels
    pub(crate) name: String,

    /// Time after the last failure before a failing backend is retried first again
    pub(crate) recovery_delay: Duration,

    /// Order of healthy backends within a call
    pub(crate) ordering: OrderingStrategy,

    /// Hook called for every failed attempt
    pub(crate) logger: Option<Arc<dyn Logger>>,

    pub(crate) event_listeners: EventListeners<FailoverEvent>,
}

impl Default for ServiceGroupConfig {
    fn default() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            recovery_delay: DEFAULT_RECOVERY_DELAY,
            ordering: OrderingStrategy::default(),
            logger: None,
            event_listeners: EventListeners::new(),
        }
    }
}

impl fmt::Debug for ServiceGroupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceGroupConfig")
            .field("name", &self.name)
            .field("recovery_delay", &self.recovery_delay)
            .field("ordering", &self.ordering)
            .field("logger", &self.logger.is_some())
            .field("event_listeners", &self.event_listeners)
            .finish()
    }
}

impl ServiceGroupConfig {
    /// Create a new builder.
    pub fn builder() -> ServiceGroupConfigBuilder {
        ServiceGroupConfigBuilder::new()
    }

    /// Get the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the recovery delay.
    pub fn recovery_delay(&self) -> Duration {
        self.recovery_delay
    }

    /// Get the ordering strategy.
    pub fn ordering(&self) -> &OrderingStrategy {
        &self.ordering
    }

    /// Builds a group over `backends` with this configuration.
    pub fn group<T, I>(self, backends: I) -> ServiceGroup<T>
    where
        I: IntoIterator<Item = Backend<T>>,
    {
        ServiceGroup::with_config(backends, self)
    }
}

/// Builder for [`ServiceGroupConfig`].
pub struct ServiceGroupConfigBuilder {
    name: String,
    recovery_delay: Duration,
    ordering: OrderingStrategy,
    logger: Option<Arc<dyn Logger>>,
    event_listeners: EventListeners<FailoverEvent>,
}

impl Default for ServiceGroupConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceGroupConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - name: `"<unnamed>"`
    /// - recovery_delay: 5 minutes
    /// - ordering: [`OrderingStrategy::Preserve`]
    /// - no logger, no listeners
    pub fn new() -> Self {
        let defaults = ServiceGroupConfig::default();
        Self {
            name: defaults.name,
            recovery_delay: defaults.recovery_delay,
            ordering: defaults.ordering,
            logger: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name for this group (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets how long a failing backend stays deprioritized after its last
    /// failure.
    ///
    /// Not validated: `Duration::ZERO` makes every failing backend eligible
    /// again on the next call.
    ///
    /// Default: 5 minutes
    pub fn recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Shuffle healthy backends on every call.
    ///
    /// `true` selects [`OrderingStrategy::Shuffle`], `false` selects
    /// [`OrderingStrategy::Preserve`].
    ///
    /// Default: false
    pub fn randomize_healthy(mut self, randomize: bool) -> Self {
        self.ordering = if randomize {
            OrderingStrategy::Shuffle
        } else {
            OrderingStrategy::Preserve
        };
        self
    }

    /// Sets the ordering strategy for healthy backends.
    ///
    /// Default: [`OrderingStrategy::Preserve`]
    pub fn ordering(mut self, ordering: OrderingStrategy) -> Self {
        self.ordering = ordering;
        self
    }

    /// Sets the hook called for every failed attempt.
    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Registers a callback when an attempt against a backend fails.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - backend name and 1-indexed attempt number.
    ///
    /// # Example
    ///
    /// ```rust
    /// use failover_group::ServiceGroupConfig;
    ///
    /// let config = ServiceGroupConfig::builder()
    ///     .name("replicas")
    ///     .on_attempt_failed(|backend, attempt| {
    ///         println!("attempt {} against {} failed", attempt, backend);
    ///     })
    ///     .build();
    /// ```
    pub fn on_attempt_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::AttemptFailed {
                backend, attempt, ..
            } = event
            {
                f(backend, *attempt);
            }
        }));
        self
    }

    /// Registers a callback when a backend completes the action.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - backend name and the number of attempts the call took.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::Success {
                backend, attempts, ..
            } = event
            {
                f(backend, *attempts);
            }
        }));
        self
    }

    /// Registers a callback when every backend failed.
    ///
    /// # Callback Signature
    /// `Fn(usize)` - the number of attempts made.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback when a failing backend recovers by time.
    ///
    /// # Callback Signature
    /// `Fn(&str, Duration)` - backend name and how long it had been failing.
    pub fn on_recovered<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FailoverEvent::Recovered {
                backend,
                failed_for,
                ..
            } = event
            {
                f(backend, *failed_for);
            }
        }));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServiceGroupConfig {
        ServiceGroupConfig {
            name: self.name,
            recovery_delay: self.recovery_delay,
            ordering: self.ordering,
            logger: self.logger,
            event_listeners: self.event_listeners,
        }
    }
}

/// Builder for [`ServiceGroup`], collecting backends and configuration.
///
/// # Examples
///
/// ```rust
/// use failover_group::ServiceGroup;
/// use std::time::Duration;
///
/// let group = ServiceGroup::builder()
///     .backend("primary", "10.0.0.1")
///     .backend("replica", "10.0.0.2")
///     .name("db")
///     .recovery_delay(Duration::from_secs(30))
///     .build();
///
/// assert_eq!(group.len(), 2);
/// assert_eq!(group.name(), "db");
/// ```
pub struct ServiceGroupBuilder<T> {
    backends: Vec<Backend<T>>,
    config: ServiceGroupConfigBuilder,
}

impl<T> Default for ServiceGroupBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ServiceGroupBuilder<T> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
            config: ServiceGroupConfigBuilder::new(),
        }
    }

    /// Add a backend. Backends are tried in the order they are added.
    pub fn backend(mut self, name: impl Into<String>, service: T) -> Self {
        self.backends.push(Backend::new(name, service));
        self
    }

    /// Add already-constructed backends.
    pub fn backends<I>(mut self, backends: I) -> Self
    where
        I: IntoIterator<Item = Backend<T>>,
    {
        self.backends.extend(backends);
        self
    }

    /// Set the group name.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config = self.config.name(name);
        self
    }

    /// Set the recovery delay.
    pub fn recovery_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.recovery_delay(delay);
        self
    }

    /// Shuffle healthy backends on every call.
    pub fn randomize_healthy(mut self, randomize: bool) -> Self {
        self.config = self.config.randomize_healthy(randomize);
        self
    }

    /// Set the ordering strategy for healthy backends.
    pub fn ordering(mut self, ordering: OrderingStrategy) -> Self {
        self.config = self.config.ordering(ordering);
        self
    }

    /// Set the hook called for every failed attempt.
    pub fn logger<L>(mut self, logger: L) -> Self
    where
        L: Logger + 'static,
    {
        self.config = self.config.logger(logger);
        self
    }

    /// Callback when an attempt fails, see
    /// [`ServiceGroupConfigBuilder::on_attempt_failed`].
    pub fn on_attempt_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.config = self.config.on_attempt_failed(f);
        self
    }

    /// Callback when a backend completes the action.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.config = self.config.on_success(f);
        self
    }

    /// Callback when every backend failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.config = self.config.on_exhausted(f);
        self
    }

    /// Callback when a failing backend recovers by time.
    pub fn on_recovered<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.config = self.config.on_recovered(f);
        self
    }

    /// Build the group.
    pub fn build(self) -> ServiceGroup<T> {
        ServiceGroup::with_config(self.backends, self.config.build())
    }
}
