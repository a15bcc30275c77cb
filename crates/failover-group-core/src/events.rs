//! Dispatch events and the listeners that observe them.
//!
//! A failover group reports each step of a call (a backend attempt failing,
//! a backend answering, every backend failing, a failing backend aging back
//! into the healthy set) as an event. Listeners are registered when the group
//! is configured and run synchronously, in registration order, on the thread
//! that made the call.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Something that happened while a group dispatched a call to its backends.
pub trait DispatchEvent: Send + Sync + fmt::Debug {
    /// Variant name of the event, such as `"AttemptFailed"` or
    /// `"Exhausted"`. Stable across releases; suitable as a log field.
    fn event_type(&self) -> &'static str;

    /// When the group recorded the event.
    fn timestamp(&self) -> Instant;

    /// Name of the group that dispatched the call.
    fn group_name(&self) -> &str;
}

/// Observer of a group's dispatch events.
///
/// Listeners run inline with the call, while the group is being updated, so
/// they should return quickly and must not call back into the same group.
pub trait EventListener<E: DispatchEvent>: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &E);
}

/// Shared handle to a listener.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// The listeners registered on one group configuration.
///
/// Cloning a configuration clones this list; the listeners themselves are
/// shared, so two groups built from one configuration notify the same
/// observers.
#[derive(Clone)]
pub struct EventListeners<E: DispatchEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: DispatchEvent> EventListeners<E> {
    /// No listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Listeners are notified in registration order.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener.
    ///
    /// A panic in one listener is caught so the call being dispatched and
    /// the listeners registered after it are unaffected.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    /// Returns true if nothing is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: DispatchEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DispatchEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure into an [`EventListener`].
///
/// The `on_*` hooks of a group's configuration builder wrap their callbacks
/// in this type, matching on the one event variant they care about.
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: DispatchEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
