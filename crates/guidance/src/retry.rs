//! Bounded polling for a condition that becomes true asynchronously.
//!
//! [`await_until`] evaluates a probe immediately, then once per interval for
//! up to `retries` more attempts, yielding to the runtime between attempts.
//! It always terminates: found, exhausted, or cancelled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Number of retries and the delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, interval: Duration) -> Self {
        Self { retries, interval }
    }

    /// Total number of probe evaluations when the condition never holds.
    pub fn max_polls(&self) -> u32 {
        self.retries + 1
    }

    /// Time spent sleeping when the condition never holds.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.retries
    }
}

/// Why [`await_until`] gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AwaitError {
    #[error("condition not met after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("wait cancelled")]
    Cancelled,
}

/// Poll `probe` until it yields a value, the policy is exhausted, or
/// `cancel` fires.
pub async fn await_until<T, F>(
    mut probe: F,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<T, AwaitError>
where
    F: FnMut() -> Option<T>,
{
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(AwaitError::Cancelled);
        }

        attempts += 1;
        if let Some(value) = probe() {
            return Ok(value);
        }
        if attempts > policy.retries {
            return Err(AwaitError::Exhausted { attempts });
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(AwaitError::Cancelled),
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
