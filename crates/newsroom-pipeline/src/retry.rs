//! Exponential-backoff retry for a source's scrape attempt (spec §5: "A
//! source's entire scrape failure triggers retry with exponential backoff
//! (default 3 retries, base 1s)"). Grounded on `rootsignal-scout`'s
//! `ChromeScraper::run_chrome` retry loop, minus the jitter term (no
//! jitter source is in the dependency stack here) and with a plain ×2
//! backoff multiplier rather than Chrome's fork-specific ×3 — an Open
//! Question resolution, since the spec names the base delay and retry
//! count but not the growth factor.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_MAX_RETRIES: u8 = 3;
pub const DEFAULT_RETRY_BASE_MS: u64 = 1_000;

/// Retries `attempt` up to `max_retries` additional times (so
/// `max_retries + 1` attempts total) on `Err`, sleeping
/// `base_delay × 2^attempt` between attempts. Returns the last error if
/// every attempt fails.
pub async fn retry_with_backoff<T, E, F, Fut>(
    operation: &str,
    max_retries: u8,
    base_delay: Duration,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u8;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_retries {
                    return Err(err);
                }
                let backoff = base_delay * 2u32.pow(attempt as u32);
                warn!(operation, attempt = attempt + 1, backoff_ms = backoff.as_millis() as u64, error = %err, "retrying after backoff");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, &str> = retry_with_backoff("test", 3, Duration::from_millis(1), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err("transient") } else { Ok("ok") } }
        })
        .await;
        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let attempts = AtomicU32::new(0);
        let result: Result<&str, &str> = retry_with_backoff("test", 2, Duration::from_millis(1), || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err("persistent") }
        })
        .await;
        assert_eq!(result, Err("persistent"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
