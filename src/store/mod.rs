//! Persistence interface shared by the PostgreSQL and in-memory adapters.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::filter::{Filter, FilterError};
use crate::models::{Application, ApplicationStatus, Job, ProfileEntry, Section, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Case-insensitive lookup
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fails with `Conflict` when the email is taken
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn update_user(&self, user: &User) -> Result<(), StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    async fn list_jobs(&self, filter: &Filter) -> Result<Vec<Job>, StoreError>;

    async fn count_jobs(&self, filter: &Filter) -> Result<i64, StoreError>;

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError>;

    /// Writes the editable fields and status; counters and applicants are left alone
    async fn update_job(&self, job: &Job) -> Result<(), StoreError>;

    /// Pending -> Approved. `None` when the job is missing or not pending.
    async fn approve_job(&self, id: Uuid, approved_by: Uuid, at: DateTime<Utc>) -> Result<Option<Job>, StoreError>;

    /// Removes the job and its applications
    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Inserts the application, bumps the job's counter and records the
    /// applicant in one step. `false` when the student already applied.
    async fn create_application(&self, application: &Application) -> Result<bool, StoreError>;

    async fn list_applications(&self, filter: &Filter) -> Result<Vec<Application>, StoreError>;

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError>;

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError>;

    /// Oldest first
    async fn list_entries(&self, section: Section, student_id: Uuid) -> Result<Vec<ProfileEntry>, StoreError>;

    async fn get_entry(&self, section: Section, id: Uuid) -> Result<Option<ProfileEntry>, StoreError>;

    async fn insert_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError>;

    async fn update_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError>;

    async fn delete_entry(&self, section: Section, id: Uuid) -> Result<bool, StoreError>;
}

fn expect_table(filter: &Filter, table: &str) -> Result<(), StoreError> {
    if filter.table() != table {
        return Err(FilterError::InvalidTableName(format!("expected {}, got {}", table, filter.table())).into());
    }
    Ok(())
}
