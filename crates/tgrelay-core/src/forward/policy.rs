use std::time::Duration;

use crate::Result;

/// Retry and pacing rules applied by the worker around each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait before re-enqueueing an update that failed transiently.
    pub backoff: Duration,
    /// Wait after every attempt; keeps us under ~20 msg/s.
    pub pacing: Duration,
    /// Wait after an unexpected worker fault.
    pub fault_pause: Duration,
    /// `None` retries transient failures forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(5),
            pacing: Duration::from_millis(50),
            fault_pause: Duration::from_secs(10),
            max_attempts: None,
        }
    }
}

/// What to do with an update after a dispatch attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Delivered,
    Retry,
    Drop,
    /// Transient failure, but the attempt bound is used up.
    Exhausted,
}

impl RetryPolicy {
    /// `attempts` counts the attempt that produced `result`.
    pub fn classify(&self, result: &Result<()>, attempts: u32) -> Disposition {
        match result {
            Ok(()) => Disposition::Delivered,
            Err(e) if e.is_transient() => match self.max_attempts {
                Some(max) if attempts >= max => Disposition::Exhausted,
                _ => Disposition::Retry,
            },
            Err(_) => Disposition::Drop,
        }
    }
}
