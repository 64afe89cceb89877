//! Retry policy, backoff state machine and the sleep seam

use std::time::Duration;
use async_trait::async_trait;
use log::debug;

/// Retry policy for transient adapter faults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy
{   pub max_retries: u32
  , pub initial_delay: Duration
  , pub max_delay: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: u32
    , initial_delay: Duration
    , max_delay: Duration
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , initial_delay
          , max_delay
        }
    }

    /// Attempts made before giving up, first call included
    pub fn total_attempts(&self) -> u32
    {   self.max_retries.saturating_add(1)
    }

    /// Delay before the retry that follows failed attempt `attempt`:
    /// `min(initial * 2^attempt, max)`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration
    {   2u32.checked_pow(attempt)
          .and_then(|factor| self.initial_delay.checked_mul(factor))
          .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Every delay the policy would insert, in order
    pub fn delays(&self) -> Vec<Duration>
    {   let mut state = RetryState::new(*self);
        std::iter::from_fn(|| state.record_failure()).collect()
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(
          3
        , Duration::from_secs(1)
        , Duration::from_secs(60)
        )
    }
}

/// Backoff state for one retry sequence.
/// Owned by a single `generate` call, never shared.
#[derive(Debug, Clone)]
pub struct RetryState
{   policy: RetryPolicy
  , attempt: u32
  , current_delay: Duration
}

impl RetryState
{   pub fn new(policy: RetryPolicy) -> Self
    {   RetryState
        {   current_delay: policy.initial_delay.min(policy.max_delay)
          , policy
          , attempt: 0
        }
    }

    /// Zero-based number of the attempt in flight
    pub fn attempt(&self) -> u32
    {   self.attempt
    }

    /// Delay the next retry would wait
    pub fn current_delay(&self) -> Duration
    {   self.current_delay
    }

    /// Record a transient failure of the current attempt.
    /// Returns the delay to wait before the next attempt, or `None` once
    /// the retry budget is spent.
    pub fn record_failure(&mut self) -> Option<Duration>
    {   if self.attempt >= self.policy.max_retries
        {   debug!(
              "Retry budget exhausted after {} attempts",
              self.attempt + 1
            );
            return None;
        }
        let delay = self.current_delay;
        self.attempt += 1;
        self.current_delay = self.current_delay
          .saturating_mul(2)
          .min(self.policy.max_delay);
        Some(delay)
    }
}

/// Non-blocking wait inserted between attempts
#[async_trait]
pub trait Sleeper: Send + Sync
{   async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper
{   async fn sleep(&self, duration: Duration)
    {   tokio::time::sleep(duration).await
    }
}
