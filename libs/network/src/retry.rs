//! Parameterized retry with fixed or exponential backoff
//!
//! Shared by confirmation polling and side-effect reconciliation. The
//! operation is attempted up to `max_attempts` times; the caller decides which
//! errors are worth another attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Delay schedule between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay after every failure
    Fixed(Duration),
    /// `base * 2^(failures - 1)`, capped at `max`
    Exponential { base: Duration, max: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Wait before the first attempt
    pub initial_delay: Duration,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, initial_delay: Duration, interval: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff: Backoff::Fixed(interval),
        }
    }

    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            backoff: Backoff::Exponential { base, max },
        }
    }

    /// Delay after the `failures`-th failed attempt (1-based)
    pub fn delay_after(&self, failures: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed(interval) => interval,
            Backoff::Exponential { base, max } => {
                let exponent = failures.saturating_sub(1).min(16);
                base.saturating_mul(2_u32.pow(exponent)).min(max)
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// A non-retryable error stopped the loop
    #[error("{0}")]
    Aborted(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted(err) => err,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}

/// Run `operation` under `policy`
///
/// `operation` receives the 1-based attempt number. Errors for which
/// `is_retryable` returns false end the loop immediately with
/// [`RetryError::Aborted`].
pub async fn retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
    is_retryable: R,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    if !policy.initial_delay.is_zero() {
        tokio::time::sleep(policy.initial_delay).await;
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if !is_retryable(&e) => {
                debug!("{} failed permanently on attempt {}: {}", label, attempt, e);
                return Err(RetryError::Aborted(e));
            }
            Err(e) => {
                if attempt >= max_attempts {
                    warn!("{} failed after {} attempts: {}", label, attempt, e);
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
                let delay = policy.delay_after(attempt);
                debug!(
                    "{} attempt {}/{} failed: {}, retrying in {:?}",
                    label, attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
