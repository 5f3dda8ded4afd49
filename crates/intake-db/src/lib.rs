//! Passport Intake Database Library
//!
//! Record persistence for submissions: the `RecordStore` trait and its
//! PostgreSQL implementation.

pub mod db;

pub use db::submission::{PgSubmissionRepository, RecordStore, SubmissionRow};
pub use db::transaction::with_transaction;
pub use db::{connect_pool, PoolSettings};
