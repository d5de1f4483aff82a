// Retry with exponential backoff for calls to external services

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Run `operation` up to `max_attempts` times, sleeping 1s, 2s, 4s... between
/// attempts (capped at 32s). The last error is returned unchanged.
pub async fn with_retry<F, Fut, T, E>(mut operation: F, max_attempts: u32) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                attempt += 1;
                if attempt >= max_attempts.max(1) {
                    return Err(error);
                }

                let delay = Duration::from_secs(1u64 << (attempt - 1).min(5));
                warn!(error = %error, attempt, delay_s = delay.as_secs(), "Retrying after failure");
                sleep(delay).await;
            }
        }
    }
}
