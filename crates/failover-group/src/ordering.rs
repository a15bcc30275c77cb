//! Ordering strategies for the healthy part of a trial.
//!
//! A call always tries healthy backends before failing ones. The strategy only
//! decides the order *within* the healthy set; failing backends keep the
//! group's order and always go last.

use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;

/// Type alias for a custom ordering function.
///
/// The slice holds indices into [`ServiceGroup::backends`](crate::ServiceGroup::backends),
/// in group order. Reorder it in place. If the slice afterwards is not a
/// permutation of what it held before (an index repeated, dropped or out of
/// range), the group ignores the result and keeps group order.
pub type CustomOrderFn = Arc<dyn Fn(&mut [usize]) + Send + Sync>;

/// Built-in ordering strategies.
#[derive(Clone, Default)]
pub enum OrderingStrategy {
    /// Keep the order the backends were added in.
    /// Best for: primary/secondary failover.
    #[default]
    Preserve,

    /// Uniformly shuffle the healthy backends on every call.
    /// Best for: spreading load across equivalent replicas.
    Shuffle,

    /// Start one position further along the healthy backends on every call.
    /// Best for: even distribution without randomness.
    RoundRobin,

    /// Use a custom ordering function.
    /// Best for: weighted or latency-aware ordering.
    Custom(CustomOrderFn),
}

impl OrderingStrategy {
    /// Creates a custom strategy from a closure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use failover_group::OrderingStrategy;
    ///
    /// // Prefer the most recently added backends.
    /// let newest_first = OrderingStrategy::custom(|healthy: &mut [usize]| healthy.reverse());
    /// ```
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut [usize]) + Send + Sync + 'static,
    {
        OrderingStrategy::Custom(Arc::new(f))
    }

    /// Returns true for [`OrderingStrategy::Shuffle`].
    pub fn is_randomized(&self) -> bool {
        matches!(self, OrderingStrategy::Shuffle)
    }

    /// Reorders `healthy` in place.
    ///
    /// `rotation` is the round-robin cursor owned by the group; it only moves
    /// for [`OrderingStrategy::RoundRobin`].
    pub(crate) fn arrange(&self, healthy: &mut [usize], rotation: &mut usize) {
        match self {
            OrderingStrategy::Preserve => {}

            OrderingStrategy::Shuffle => healthy.shuffle(&mut rand::rng()),

            OrderingStrategy::RoundRobin => {
                if !healthy.is_empty() {
                    let start = *rotation % healthy.len();
                    healthy.rotate_left(start);
                    *rotation = rotation.wrapping_add(1);
                }
            }

            OrderingStrategy::Custom(order) => {
                let original = healthy.to_vec();
                order(&mut *healthy);

                if !is_permutation_of(healthy, &original) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        arranged = ?healthy,
                        "custom ordering did not return a permutation, keeping group order"
                    );
                    healthy.copy_from_slice(&original);
                }
            }
        }
    }
}

fn is_permutation_of(arranged: &[usize], original: &[usize]) -> bool {
    let mut arranged = arranged.to_vec();
    let mut original = original.to_vec();
    arranged.sort_unstable();
    original.sort_unstable();
    arranged == original
}

impl fmt::Debug for OrderingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingStrategy::Preserve => f.write_str("Preserve"),
            OrderingStrategy::Shuffle => f.write_str("Shuffle"),
            OrderingStrategy::RoundRobin => f.write_str("RoundRobin"),
            OrderingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
