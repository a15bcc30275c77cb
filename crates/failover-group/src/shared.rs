//! A service group that can be shared between threads.

use crate::{BackendHealth, ServiceGroup};
use failover_group_core::ExhaustedError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Cloneable, thread-safe handle to a [`ServiceGroup`].
///
/// Every [`try_call`](Self::try_call) holds the group's lock for the whole
/// call, so calls from different threads run one after another and never
/// interleave their health updates. Clones share the same group.
///
/// # Examples
///
/// ```rust
/// use failover_group::{Backend, ServiceGroup};
/// use std::thread;
///
/// let shared = ServiceGroup::new(vec![
///     Backend::new("a", ()),
///     Backend::new("b", ()),
/// ])
/// .into_shared();
///
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let shared = shared.clone();
///         thread::spawn(move || shared.try_call(|_| Ok::<_, String>(())))
///     })
///     .collect();
///
/// for handle in handles {
///     assert!(handle.join().unwrap().is_ok());
/// }
/// ```
pub struct SharedServiceGroup<T> {
    inner: Arc<Mutex<ServiceGroup<T>>>,
}

impl<T> SharedServiceGroup<T> {
    /// Wraps a group.
    pub fn new(group: ServiceGroup<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(group)),
        }
    }

    /// Locks the group.
    ///
    /// A panicking action poisons the mutex; the group is still consistent
    /// (each health update is a single assignment) so the poison is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ServiceGroup<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs [`ServiceGroup::try_call`] under the lock.
    ///
    /// # Errors
    ///
    /// [`ExhaustedError`] when every backend failed or the group is empty.
    pub fn try_call<R, E, F>(&self, action: F) -> Result<R, ExhaustedError>
    where
        F: FnMut(&crate::Backend<T>) -> Result<R, E>,
        E: fmt::Display,
    {
        self.lock().try_call(action)
    }

    /// Runs `f` with exclusive access to the group.
    pub fn with_group<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ServiceGroup<T>) -> R,
    {
        f(&mut self.lock())
    }

    /// Health of every backend, in group order.
    pub fn health_report(&self) -> Vec<BackendHealth> {
        self.lock().health_report()
    }

    /// Number of backends currently marked failing.
    pub fn failing_count(&self) -> usize {
        self.lock().failing_count()
    }

    /// Number of backends.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the group has no backends.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Changes the recovery delay.
    pub fn set_recovery_delay(&self, delay: Duration) {
        self.lock().set_recovery_delay(delay);
    }

    /// Turns shuffling of healthy backends on or off.
    pub fn set_randomize_healthy(&self, randomize: bool) {
        self.lock().set_randomize_healthy(randomize);
    }

    /// Returns the group if this is the last handle to it.
    pub fn try_into_inner(self) -> Result<ServiceGroup<T>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<T> Clone for SharedServiceGroup<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> From<ServiceGroup<T>> for SharedServiceGroup<T> {
    fn from(group: ServiceGroup<T>) -> Self {
        Self::new(group)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedServiceGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedServiceGroup").field(&*self.lock()).finish()
    }
}
