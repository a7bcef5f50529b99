use crate::config::RetryPolicy;
use crate::errors::Result;
use rand::Rng;
use std::future::Future;
use tracing::warn;

/// Executes a remote operation, retrying transient failures with
/// exponential backoff plus jitter.
///
/// This is the only place failure/latency policy lives: every remote read,
/// write, header check, and worksheet creation goes through here, so the
/// layers above can assume either eventual success or a terminal error.
/// Non-transient errors propagate unchanged without a retry; once attempts
/// are exhausted, the last transient error is surfaced as-is.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt + 1 < policy.max_attempts => {
                let jitter = if policy.max_jitter_ms == 0 {
                    0
                } else {
                    rand::thread_rng().gen_range(0..=policy.max_jitter_ms)
                };
                let delay =
                    policy.delay_for_attempt(attempt) + std::time::Duration::from_millis(jitter);
                warn!(
                    "Transient remote failure (attempt {}/{}), retrying in {:?}: {}",
                    attempt + 1,
                    policy.max_attempts,
                    delay,
                    err
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay_ms: 5,
            max_jitter_ms: 0,
        }
    }

    fn rate_limited() -> Error {
        Error::Remote {
            status: Some(429),
            message: "Quota exceeded for read requests".into(),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures_with_delays() {
        let calls = AtomicU32::new(0);
        let policy = fast_policy(5);
        let started = Instant::now();

        let result = with_retry(&policy, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(rate_limited())
                } else {
                    Ok("fetched")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "fetched");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoff sleeps happened: 5ms + 10ms.
        assert!(started.elapsed() >= std::time::Duration::from_millis(15));
    }

    #[tokio::test]
    async fn fatal_errors_propagate_without_retry() {
        let calls = AtomicU32::new(0);
        let policy = fast_policy(5);

        let result: Result<()> = with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::Config("missing token".into())) }
        })
        .await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_last_error() {
        let calls = AtomicU32::new(0);
        let policy = fast_policy(3);

        let result: Result<()> = with_retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited()) }
        })
        .await;

        assert!(matches!(
            result,
            Err(Error::Remote {
                status: Some(429),
                ..
            })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
