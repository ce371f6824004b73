//! Network Timing Primitives
//!
//! The two timing utilities every Sluice flow shares:
//!
//! - [`retry`]: bounded attempts with fixed or exponential backoff, used by
//!   confirmation polling and activity-flag reconciliation
//! - [`Debouncer`]: cancellable last-write-wins scheduling for recomputing
//!   quotes while the user is still typing
//!
//! Both suspend on `tokio` timers only, so tests drive them with a paused
//! clock.

pub mod debounce;
pub mod retry;

pub use debounce::{Debounced, Debouncer};
pub use retry::{retry, Backoff, RetryError, RetryPolicy};
