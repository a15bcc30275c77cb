use failover_group_core::events::DispatchEvent;
use std::time::{Duration, Instant};

/// Events emitted by a service group.
#[derive(Debug, Clone)]
pub enum FailoverEvent {
    /// An attempt against one backend failed; the group moves on.
    AttemptFailed {
        group_name: String,
        timestamp: Instant,
        backend: String,
        /// 1-indexed position in this call's trial order
        attempt: usize,
        message: String,
    },
    /// A backend completed the action.
    Success {
        group_name: String,
        timestamp: Instant,
        backend: String,
        attempts: usize,
    },
    /// Every backend failed.
    Exhausted {
        group_name: String,
        timestamp: Instant,
        total: usize,
        attempts: usize,
    },
    /// A failing backend became eligible again after the recovery delay.
    Recovered {
        group_name: String,
        timestamp: Instant,
        backend: String,
        failed_for: Duration,
    },
}

impl DispatchEvent for FailoverEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FailoverEvent::AttemptFailed { .. } => "AttemptFailed",
            FailoverEvent::Success { .. } => "Success",
            FailoverEvent::Exhausted { .. } => "Exhausted",
            FailoverEvent::Recovered { .. } => "Recovered",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FailoverEvent::AttemptFailed { timestamp, .. }
            | FailoverEvent::Success { timestamp, .. }
            | FailoverEvent::Exhausted { timestamp, .. }
            | FailoverEvent::Recovered { timestamp, .. } => *timestamp,
        }
    }

    fn group_name(&self) -> &str {
        match self {
            FailoverEvent::AttemptFailed { group_name, .. }
            | FailoverEvent::Success { group_name, .. }
            | FailoverEvent::Exhausted { group_name, .. }
            | FailoverEvent::Recovered { group_name, .. } => group_name,
        }
    }
}
