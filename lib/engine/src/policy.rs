//! Timeout and retry wrapper for calls to external capabilities.

use shortlist_core::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl CallPolicy {
    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// attempts run out. A timed-out attempt fails with `on_timeout`, so it is
    /// indistinguishable from the capability's own failure.
    pub async fn run<T, F, Fut>(
        &self,
        label: &'static str,
        on_timeout: fn(String) -> Error,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let outcome = match tokio::time::timeout(self.timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(on_timeout(format!(
                    "{label} timed out after {:?}",
                    self.timeout
                ))),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        call = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let capped = attempt.saturating_sub(1).min(5);
        self.base_delay.saturating_mul(1u32 << capped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> CallPolicy {
        CallPolicy {
            timeout: Duration::from_millis(50),
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("embedding", Error::Embedding, || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(Error::Embedding("503".into()))
                } else {
                    Ok(7)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy(2)
            .run("embedding", Error::Embedding, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Embedding("down".into()))
            })
            .await;
        assert!(matches!(result, Err(Error::Embedding(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy(3)
            .run("embedding", Error::Embedding, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::InvalidDimension { expected: 3, actual: 2 })
            })
            .await;
        assert!(matches!(result, Err(Error::InvalidDimension { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_capability_error() {
        let result: Result<()> = policy(1)
            .run("intent extraction", Error::QueryAnalysis, || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(Error::QueryAnalysis(msg)) if msg.contains("timed out")));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let p = CallPolicy {
            timeout: Duration::from_secs(1),
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(p.backoff(1), Duration::from_millis(100));
        assert_eq!(p.backoff(2), Duration::from_millis(200));
        assert_eq!(p.backoff(3), Duration::from_millis(400));
        assert_eq!(p.backoff(9), Duration::from_millis(3200));
    }

    #[test]
    fn test_backoff_saturates_on_huge_base_delay() {
        let p = CallPolicy {
            timeout: Duration::from_secs(1),
            max_attempts: 10,
            base_delay: Duration::from_millis(u64::MAX),
        };
        assert_eq!(p.backoff(1), Duration::from_millis(u64::MAX));
        assert_eq!(p.backoff(6), Duration::MAX);
    }
}
