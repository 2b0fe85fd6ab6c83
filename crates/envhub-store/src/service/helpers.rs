//! # Service Helpers
//!
//! Deadline handling for blob calls.

use std::future::Future;
use std::time::Duration;

use crate::domain::errors::{BlobError, StoreError};

/// Run one blob call under `timeout`, mapping both substrate failures and
/// deadline expiry to `StorageUnavailable`.
pub(crate) async fn with_deadline<F, O>(
    timeout: Duration,
    operation: &'static str,
    call: F,
) -> Result<O, StoreError>
where
    F: Future<Output = Result<O, BlobError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(|e| StoreError::storage(operation, e)),
        Err(_) => Err(StoreError::storage(
            operation,
            BlobError::Timeout { after: timeout },
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expiry_is_storage_unavailable() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, BlobError>(())
        };

        let err = with_deadline(Duration::from_secs(1), "list", slow)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::StorageUnavailable {
                operation: "list",
                source: BlobError::Timeout { .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_substrate_error_is_wrapped() {
        let failing = async {
            Err::<(), _>(BlobError::Unavailable {
                message: "down".to_string(),
            })
        };
        let err = with_deadline(Duration::from_secs(1), "fetch", failing)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
