//! Database transaction utilities
//!
//! Multi-row writes go through [`with_transaction`] so that they either commit
//! together or leave no trace.

use intake_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;

/// Execute a closure within a database transaction
///
/// Begins a transaction, runs the closure, and commits if it succeeds or rolls
/// back if it fails.
///
/// # Example
///
/// ```ignore
/// use intake_db::with_transaction;
///
/// async fn example(pool: &sqlx::PgPool) -> Result<(), intake_core::AppError> {
///     with_transaction(pool, |tx| {
///         Box::pin(async move {
///             sqlx::query("DELETE FROM passports").execute(&mut **tx).await?;
///             Ok::<_, intake_core::AppError>(())
///         })
///     })
///     .await
/// }
/// ```
pub async fn with_transaction<F, R>(pool: &PgPool, f: F) -> Result<R, AppError>
where
    F: for<'c> FnOnce(
        &'c mut Transaction<'static, Postgres>,
    ) -> Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'c>>,
{
    let mut tx = pool.begin().await?;

    match f(&mut tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}
