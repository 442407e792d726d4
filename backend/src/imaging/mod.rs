pub mod data_uri;
pub mod normalizer;

use crate::error::ApiError;

/// Runs CPU-bound image work on the blocking pool so request tasks keep moving.
pub async fn run_blocking<F, T>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("image worker failed: {}", e)))?
}
