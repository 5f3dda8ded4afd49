//! Submission repository: insert and age-based purge for the `passports` table.
//!
//! Expected layout (created outside this crate):
//!
//! ```sql
//! CREATE TABLE passports (
//!     id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     created_at      TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     full_name       TEXT NOT NULL,
//!     passport_number TEXT NOT NULL,
//!     date_of_birth   TEXT NOT NULL,
//!     expiry_date     TEXT NOT NULL,
//!     country         TEXT,
//!     email           TEXT,
//!     address         TEXT,
//!     phone_number    TEXT,
//!     photo_url       TEXT NOT NULL
//! );
//! CREATE INDEX passports_created_at_idx ON passports (created_at);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use intake_core::models::{StoredSubmission, SubmissionRecord};
use intake_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::transaction::with_transaction;

const COLUMNS: &str = "id, created_at, full_name, passport_number, date_of_birth, expiry_date, \
                       country, email, address, phone_number, photo_url";

/// Row type for the passports table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub passport_number: String,
    pub date_of_birth: String,
    pub expiry_date: String,
    pub country: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub photo_url: String,
}

impl SubmissionRow {
    pub fn into_stored(self) -> StoredSubmission {
        StoredSubmission {
            id: self.id,
            created_at: self.created_at,
            record: SubmissionRecord {
                full_name: self.full_name,
                passport_number: self.passport_number,
                date_of_birth: self.date_of_birth,
                expiry_date: self.expiry_date,
                country: self.country,
                email: self.email,
                address: self.address,
                phone_number: self.phone_number,
                photo_url: self.photo_url,
            },
        }
    }
}

/// Structured persistence for submission rows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert every record or none of them.
    async fn insert(&self, records: &[SubmissionRecord]) -> Result<Vec<StoredSubmission>, AppError>;

    /// Every row with `created_at < threshold`, unordered.
    async fn select_older_than(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<StoredSubmission>, AppError>;

    /// Delete every row with `created_at < threshold` and return how many went.
    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError>;

    /// Cheap connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Repository for the passports table.
#[derive(Clone)]
pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgSubmissionRepository {
    #[tracing::instrument(skip(self, records), fields(db.table = "passports", count = records.len()))]
    async fn insert(&self, records: &[SubmissionRecord]) -> Result<Vec<StoredSubmission>, AppError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let records = records.to_vec();
        let sql = format!(
            r#"
            INSERT INTO passports (full_name, passport_number, date_of_birth, expiry_date,
                                   country, email, address, phone_number, photo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            COLUMNS
        );

        let stored = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let mut stored = Vec::with_capacity(records.len());
                for record in &records {
                    let row: SubmissionRow = sqlx::query_as::<Postgres, SubmissionRow>(&sql)
                        .bind(&record.full_name)
                        .bind(&record.passport_number)
                        .bind(&record.date_of_birth)
                        .bind(&record.expiry_date)
                        .bind(&record.country)
                        .bind(&record.email)
                        .bind(&record.address)
                        .bind(&record.phone_number)
                        .bind(&record.photo_url)
                        .fetch_one(&mut **tx)
                        .await?;
                    stored.push(row.into_stored());
                }
                Ok::<_, AppError>(stored)
            })
        })
        .await?;

        tracing::debug!(inserted = stored.len(), "Submission rows inserted");
        Ok(stored)
    }

    #[tracing::instrument(skip(self), fields(db.table = "passports"))]
    async fn select_older_than(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<StoredSubmission>, AppError> {
        let rows: Vec<SubmissionRow> = sqlx::query_as::<Postgres, SubmissionRow>(&format!(
            "SELECT {} FROM passports WHERE created_at < $1",
            COLUMNS
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SubmissionRow::into_stored).collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "passports"))]
    async fn delete_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM passports WHERE created_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
