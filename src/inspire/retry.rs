//! Rate-limit retry policy for lookup requests.
//!
//! INSPIRE signals rate limiting with HTTP 429. Only that status is retried,
//! at a fixed interval, up to a bounded count per URL; every other failure
//! abandons the URL immediately. The same fixed interval doubles as the
//! courtesy pause between successive URLs for one key.

use std::time::Duration;

use tracing::debug;

/// Default maximum attempts per URL.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default pause between attempts and between URLs (500 ms).
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Decision after receiving a 429 for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the fixed delay and try again.
    RetryAfterDelay {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which retry this will be (1-indexed).
        retry: u32,
    },
    /// Retry budget spent; abandon this URL.
    GiveUp {
        /// How many retries were consumed.
        retries: u32,
    },
}

/// Fixed-interval retry configuration.
///
/// An attempt counts against the budget only when it ends in a 429. With
/// `max_retries = 3`, three consecutive 429s exhaust the URL; a server that
/// answers 429 three times and then succeeds needs `max_retries = 4`.
#[derive(Debug, Clone, Copy)]
pub struct FetchPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_DELAY,
        }
    }
}

impl FetchPolicy {
    /// Creates a policy with an explicit retry budget and interval.
    #[must_use]
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// The pause between attempts and between URLs.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Maximum 429 retries per URL.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Decides whether another attempt is allowed after `retries_used` 429s.
    #[must_use]
    pub fn on_rate_limit(&self, retries_used: u32) -> RetryDecision {
        let next = retries_used + 1;
        if next >= self.max_retries {
            debug!(retries = next, max = self.max_retries, "retry budget spent");
            return RetryDecision::GiveUp { retries: next };
        }
        RetryDecision::RetryAfterDelay {
            delay: self.delay,
            retry: next,
        }
    }
}
