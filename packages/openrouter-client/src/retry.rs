//! Retry with a fixed backoff schedule.
//!
//! The schedule is an explicit delay table rather than a multiplier so the
//! exact timing is an inspectable constant.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;

/// Default backoff schedule: three retries at 1s, 2s, 4s.
pub const BACKOFF_SCHEDULE: [Duration; 3] = [
    Duration::from_millis(1000),
    Duration::from_millis(2000),
    Duration::from_millis(4000),
];

/// Run `op`, retrying retryable failures once per entry in `schedule`.
///
/// Sleeps for the corresponding delay before each retry. Non-retryable
/// errors and exhaustion of the schedule return the last error unchanged.
pub async fn with_retry<T, F, Fut>(schedule: &[Duration], mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delays = schedule.iter();

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => match delays.next() {
                Some(delay) => {
                    warn!(
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retryable API failure, backing off"
                    );
                    tokio::time::sleep(*delay).await;
                }
                None => return Err(err),
            },
            Err(err) => return Err(err),
        }
    }
}
