//! Retry and anti-ban control around the single-attempt fetcher.
//!
//! Challenge responses (403/429/430/503) and network-level failures are
//! retried with a growing backoff and a freshly sampled browser identity per
//! attempt. Other failures — unexpected statuses, invalid URLs — are returned
//! immediately: retrying would only reproduce the same answer.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;
use crate::fetch::{fetch_page, FetchedPage};
use crate::identity::Session;

/// Returns `true` if `err` represents a transient condition worth a fresh
/// identity and another attempt.
///
/// Retriable:
/// - [`ScraperError::Challenged`] — bot-detection response; a new identity
///   may pass.
/// - [`ScraperError::Http`] — network failure (DNS, connection reset,
///   timeout).
///
/// Not retriable:
/// - [`ScraperError::UnexpectedStatus`] — e.g. 404; the server answered
///   definitively.
/// - [`ScraperError::InvalidUrl`] — no request was ever possible.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Challenged { .. } | ScraperError::Http(_)
    )
}

/// Runs `operation` up to `max_attempts` times, sleeping between attempts on
/// transient errors.
///
/// The wait before attempt `n + 1` is `backoff_base_secs * n` seconds plus a
/// random jitter of up to `backoff_base_secs` more, so a base of 5 gives
/// roughly 5–10 s, 10–15 s, … — the schedule the marketplaces tolerate
/// without escalating. A base of 0 sleeps not at all, which keeps tests
/// instantaneous.
///
/// Exhausting the budget returns the last transient error; this function
/// never converts a failure into a success.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_attempts.max(1) {
                    return Err(err);
                }
                let base_ms = backoff_base_secs.saturating_mul(1000);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jitter_ms = (base_ms as f64 * rand::random::<f64>()) as u64;
                let delay_ms = base_ms.saturating_mul(u64::from(attempt)) + jitter_ms;
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms,
                    error = %err,
                    "transient fetch error — rotating identity and retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}

/// Fetch `url` with up to `max_attempts` total attempts, obtaining a fresh
/// [`Session`] from `new_session` before every attempt so each retry
/// presents a different identity.
///
/// # Errors
///
/// Propagates the final [`ScraperError`] once the budget is exhausted, or
/// immediately for non-retriable failures.
pub async fn fetch_with_retry<F>(
    url: &str,
    max_attempts: u32,
    backoff_base_secs: u64,
    mut new_session: F,
) -> Result<FetchedPage, ScraperError>
where
    F: FnMut() -> Result<Session, ScraperError>,
{
    retry_with_backoff(max_attempts, backoff_base_secs, || {
        let session = new_session();
        async move { fetch_page(&session?, url).await }
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn challenged() -> ScraperError {
        ScraperError::Challenged {
            status: 403,
            url: "https://www.alibaba.com/product-detail/x.html".to_owned(),
        }
    }

    #[test]
    fn challenged_is_retriable() {
        assert!(is_retriable(&challenged()));
    }

    #[test]
    fn unexpected_status_is_not_retriable() {
        assert!(!is_retriable(&ScraperError::UnexpectedStatus {
            status: 404,
            url: "https://example.com/x".to_owned(),
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn performs_exactly_max_attempts_when_always_challenged() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(challenged())
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            3,
            "max_attempts=3 means exactly 3 attempts, no more"
        );
        assert!(matches!(result, Err(ScraperError::Challenged { .. })));
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(challenged())
                } else {
                    Ok::<u32, ScraperError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_unexpected_status() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::UnexpectedStatus {
                    status: 404,
                    url: "https://example.com/x".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::UnexpectedStatus { .. })));
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(0, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(challenged())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }
}
