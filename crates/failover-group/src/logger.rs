//! Logging hook for failed attempts.

/// Receives every failed attempt as it is recorded.
///
/// The hook observes; it has no say in which backend is tried next.
///
/// # Examples
///
/// Using a closure (via blanket impl):
///
/// ```rust
/// use failover_group::{Backend, ServiceGroup};
///
/// let mut group = ServiceGroup::new(vec![Backend::new("primary", ())]);
/// group.set_logger(|backend: &str, message: &str| {
///     eprintln!("{backend} failed: {message}");
/// });
/// ```
pub trait Logger: Send + Sync {
    /// Called once per failed attempt with the backend name and the
    /// rendered error.
    fn log(&self, backend: &str, message: &str);
}

impl<F> Logger for F
where
    F: Fn(&str, &str) + Send + Sync,
{
    fn log(&self, backend: &str, message: &str) {
        self(backend, message)
    }
}

/// Forwards failed attempts to `tracing` at WARN level.
#[cfg(feature = "tracing")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

#[cfg(feature = "tracing")]
impl Logger for TracingLogger {
    fn log(&self, backend: &str, message: &str) {
        tracing::warn!(backend, error = message, "backend attempt failed");
    }
}
