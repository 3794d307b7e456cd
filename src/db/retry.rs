use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::errors::AppError;

const MAX_RETRIES: u32 = 3;
const BACKOFF_MIN_MS: u64 = 50;
const BACKOFF_MAX_MS: u64 = 200;

/// Run a storage operation, retrying transient contention with jittered
/// backoff. Rule violations and conflicts pass through untouched.
pub async fn with_retries<T, F, Fut>(mut op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if e.is_retriable() && attempt < MAX_RETRIES => {
                attempt += 1;
                let backoff = rand::rng().random_range(BACKOFF_MIN_MS..=BACKOFF_MAX_MS);
                tracing::debug!(attempt, backoff_ms = backoff, "retrying after {}", e);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, AppError> = with_retries(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AppError::Retriable("busy".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_rule_violations() {
        let calls = AtomicU32::new(0);
        let result: Result<(), AppError> = with_retries(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Invalid("not your turn".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), AppError> = with_retries(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::Retriable("busy".to_string())) }
        })
        .await;
        assert!(matches!(result, Err(AppError::Retriable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1 + MAX_RETRIES);
    }
}
