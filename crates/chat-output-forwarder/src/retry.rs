// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chat_output::event::Event;
use chat_output::flusher::Flusher;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, warn};

/// Re-delivery of a whole batch after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStrategy {
    /// Wait `attempt * delay` before each retry, up to the given count.
    LinearBackoff(u64, Duration),
}

impl RetryStrategy {
    fn max_retries(&self) -> u64 {
        match self {
            RetryStrategy::LinearBackoff(retries, _) => *retries,
        }
    }

    fn delay(&self, attempt: u64) -> Duration {
        match self {
            RetryStrategy::LinearBackoff(_, delay) => {
                delay.saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
            }
        }
    }
}

/// Writes `events`, retrying the batch while the flusher reports a retryable
/// error. Returns whether the batch was eventually accepted.
#[must_use]
pub async fn write_with_retries(
    flusher: &Flusher,
    events: &[Event],
    strategy: RetryStrategy,
) -> bool {
    if events.is_empty() {
        return true;
    }

    let mut attempt = 0;
    loop {
        match flusher.write(events).await {
            Ok(()) => {
                debug!("Flushed {} event(s) after {} retries", events.len(), attempt);
                return true;
            }
            Err(e) if attempt >= strategy.max_retries() => {
                error!(
                    error = %e,
                    "Giving up on batch of {} event(s) after {} retries. Data dropped",
                    events.len(),
                    attempt
                );
                return false;
            }
            Err(e) => {
                attempt += 1;
                let delay = strategy.delay(attempt);
                warn!(
                    error = %e,
                    "Retrying batch of {} event(s) in {:?} (attempt {})",
                    events.len(),
                    delay,
                    attempt
                );
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::{events, flusher, timeout};
    use chat_output::transport::TransportError;
    use tracing_test::traced_test;

    #[test]
    fn test_linear_backoff_delay() {
        let strategy = RetryStrategy::LinearBackoff(3, Duration::from_millis(10));
        assert_eq!(strategy.delay(1), Duration::from_millis(10));
        assert_eq!(strategy.delay(3), Duration::from_millis(30));
        assert_eq!(
            RetryStrategy::LinearBackoff(3, Duration::ZERO).delay(2),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn test_retries_until_accepted() {
        let (flusher, transport) = flusher(vec![timeout(), timeout()]);
        let strategy = RetryStrategy::LinearBackoff(3, Duration::from_millis(1));

        assert!(write_with_retries(&flusher, &events(), strategy).await);
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_gives_up_after_max_retries() {
        let (flusher, transport) = flusher(vec![timeout(), timeout(), timeout()]);
        let strategy = RetryStrategy::LinearBackoff(2, Duration::ZERO);

        assert!(!write_with_retries(&flusher, &events(), strategy).await);
        assert_eq!(transport.calls(), 3);
        assert!(logs_contain("Giving up on batch of 1 event(s) after 2 retries"));
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let (flusher, transport) =
            flusher(vec![Err(TransportError::Api("invalid_auth".to_string()))]);
        let strategy = RetryStrategy::LinearBackoff(5, Duration::ZERO);

        assert!(write_with_retries(&flusher, &events(), strategy).await);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_transport() {
        let (flusher, transport) = flusher(vec![]);
        let strategy = RetryStrategy::LinearBackoff(5, Duration::ZERO);

        assert!(write_with_retries(&flusher, &[], strategy).await);
        assert_eq!(transport.calls(), 0);
    }
}
