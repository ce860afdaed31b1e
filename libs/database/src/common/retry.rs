use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded retry policy with a flat delay between tries.
///
/// `max_attempts` counts every try including the first. The delay is waited
/// between consecutive tries only, never after the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryConfig {
    /// `max_attempts` of 0 is treated as a single attempt.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for RetryConfig {
    /// 3 attempts, 2 seconds apart
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(2))
    }
}

/// Run `operation` until it succeeds or the policy is exhausted.
///
/// The closure receives the 1-based attempt number. The last error is
/// returned once every attempt has failed.
///
/// # Example
/// ```ignore
/// use database::common::{retry_fixed, RetryConfig};
///
/// let index = retry_fixed(
///     |_attempt| database::pinecone::connect(&pinecone_config),
///     &RetryConfig::fixed(3, Duration::from_secs(2)),
/// )
/// .await?;
/// ```
pub async fn retry_fixed<F, Fut, T, E>(mut operation: F, config: &RetryConfig) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("Operation succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => {
                warn!("Operation failed after {} attempts: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                debug!(
                    "Operation failed (attempt {}/{}): {}. Retrying in {:?}...",
                    attempt, max_attempts, e, config.delay
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_fixed(
            |_| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("success")
                }
            },
            &RetryConfig::default(),
        )
        .await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_after_failures() {
        let result = retry_fixed(
            |attempt| async move {
                if attempt < 3 {
                    Err(format!("Attempt {}", attempt))
                } else {
                    Ok(attempt)
                }
            },
            &RetryConfig::fixed(5, Duration::from_millis(10)),
        )
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_exact_attempt_count_with_flat_delay() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = tokio::time::Instant::now();

        let result = retry_fixed(
            |_| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("always fails")
                }
            },
            &RetryConfig::fixed(3, Duration::from_secs(2)),
        )
        .await;

        assert_eq!(result.unwrap_err(), "always fails");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        // two waits, none after the final attempt
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_tries_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let start = tokio::time::Instant::now();

        let _ = retry_fixed(
            |_| {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("fail")
                }
            },
            &RetryConfig::fixed(0, Duration::from_secs(2)),
        )
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_retry_config_builder() {
        let config = RetryConfig::default()
            .with_max_attempts(5)
            .with_delay(Duration::from_millis(200));

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay, Duration::from_millis(200));
        assert_eq!(RetryConfig::default().with_max_attempts(0).max_attempts, 1);
    }
}
