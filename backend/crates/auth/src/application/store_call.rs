//! Bounded store calls

use std::future::Future;
use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Await a store call for at most `limit`
///
/// Elapsed calls surface as `TransientStore`; the store call itself is
/// dropped, so a half-finished transaction rolls back.
pub(crate) async fn bounded<T>(
    limit: Duration,
    operation: &'static str,
    call: impl Future<Output = AuthResult<T>>,
) -> AuthResult<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(AuthError::TransientStore(format!("{operation} timed out")))
        }
    }
}
