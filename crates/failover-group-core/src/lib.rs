//! Core infrastructure for failover-group.
//!
//! This crate provides the pieces shared by every group flavour:
//! - Event system for observability
//! - The aggregate [`ExhaustedError`] returned when all backends fail

pub mod error;
pub mod events;

pub use error::ExhaustedError;
pub use events::{DispatchEvent, EventListener, EventListeners, FnListener};
