//! Backends: a named handle plus the health the group tracks for it.

use tokio::time::Instant;

/// Health of a backend as last observed by its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Not known to be failing. Tried first.
    Healthy,

    /// The last attempt against this backend failed at `since`.
    /// Tried only after every healthy backend.
    Failing {
        /// When the most recent failed attempt was recorded
        since: Instant,
    },
}

impl HealthState {
    /// Returns true if the backend is marked failing.
    pub fn is_failing(&self) -> bool {
        matches!(self, HealthState::Failing { .. })
    }
}

/// A member of a [`ServiceGroup`](crate::ServiceGroup).
///
/// The group never looks inside `service`; only the action passed to
/// [`try_call`](crate::ServiceGroup::try_call) does.
///
/// # Examples
///
/// ```rust
/// use failover_group::Backend;
///
/// let backend = Backend::new("primary", "10.0.0.1:5432");
/// assert_eq!(backend.name(), "primary");
/// assert_eq!(*backend.service(), "10.0.0.1:5432");
/// assert!(!backend.is_failing());
/// ```
#[derive(Debug, Clone)]
pub struct Backend<T> {
    name: String,
    service: T,
    health: HealthState,
}

impl<T> Backend<T> {
    /// Creates a healthy backend.
    pub fn new(name: impl Into<String>, service: T) -> Self {
        Self {
            name: name.into(),
            service,
            health: HealthState::Healthy,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapped service handle.
    pub fn service(&self) -> &T {
        &self.service
    }

    /// Mutable access to the wrapped service handle.
    pub fn service_mut(&mut self) -> &mut T {
        &mut self.service
    }

    /// Consumes the backend, returning the wrapped service handle.
    pub fn into_service(self) -> T {
        self.service
    }

    /// Current health.
    pub fn health(&self) -> HealthState {
        self.health
    }

    /// Returns true if the last attempt failed and the backend has not
    /// recovered since.
    pub fn is_failing(&self) -> bool {
        self.health.is_failing()
    }

    /// Time of the last failure, only while the backend is failing.
    pub fn last_failure(&self) -> Option<Instant> {
        match self.health {
            HealthState::Failing { since } => Some(since),
            HealthState::Healthy => None,
        }
    }

    pub(crate) fn mark_failing(&mut self, at: Instant) {
        self.health = HealthState::Failing { since: at };
    }

    pub(crate) fn mark_healthy(&mut self) {
        self.health = HealthState::Healthy;
    }

    pub(crate) fn snapshot(&self) -> BackendHealth {
        BackendHealth {
            name: self.name.clone(),
            failing: self.is_failing(),
            last_failure: self.last_failure(),
        }
    }
}

/// Point-in-time health of one backend, see
/// [`ServiceGroup::health_report`](crate::ServiceGroup::health_report).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHealth {
    /// Name of the backend
    pub name: String,

    /// Whether the backend is currently marked failing
    pub failing: bool,

    /// Time of the last failure (only set while failing)
    pub last_failure: Option<Instant>,
}
