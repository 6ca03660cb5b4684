use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{Executor, FromRow, PgPool, Postgres, Row};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{expect_table, Store, StoreError};
use crate::config::DatabaseConfig;
use crate::filter::{Filter, FilterValue};
use crate::models::{Application, ApplicationStatus, EntryDetails, Job, ProfileEntry, Section, User};

const MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

/// PostgreSQL adapter over a shared connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config.url.as_deref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Apply the schema. Every statement is idempotent.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        (&self.pool).execute(MIGRATION).await?;
        info!("Schema is up to date");
        Ok(())
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    role: String,
    headline: Option<String>,
    about: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    linkedin: Option<String>,
    website: Option<String>,
    skills: Vec<String>,
    resume_url: Option<String>,
    resume_filename: Option<String>,
    photo_url: Option<String>,
    company_name: Option<String>,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            headline: row.headline,
            about: row.about,
            phone: row.phone,
            location: row.location,
            linkedin: row.linkedin,
            website: row.website,
            skills: row.skills,
            resume_url: row.resume_url,
            resume_filename: row.resume_filename,
            photo_url: row.photo_url,
            company_name: row.company_name,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    employer_id: Uuid,
    job_title: String,
    company: String,
    job_type: String,
    work_arrangement: String,
    location: Option<String>,
    min_pay: Option<f64>,
    max_pay: Option<f64>,
    show_pay_in_listing: bool,
    job_description: String,
    requirements: Option<String>,
    application_deadline: Option<NaiveDate>,
    status: String,
    applications: i64,
    applicants: Vec<Uuid>,
    view_count: i64,
    date_created: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            employer_id: row.employer_id,
            job_title: row.job_title,
            company: row.company,
            job_type: row.job_type,
            work_arrangement: row.work_arrangement,
            location: row.location,
            min_pay: row.min_pay,
            max_pay: row.max_pay,
            show_pay_in_listing: row.show_pay_in_listing,
            job_description: row.job_description,
            requirements: row.requirements,
            application_deadline: row.application_deadline,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            applications: row.applications,
            applicants: row.applicants,
            view_count: row.view_count,
            date_created: row.date_created,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    student_id: Uuid,
    employer_id: Uuid,
    job_title: String,
    company: String,
    student_name: Option<String>,
    student_email: String,
    status: String,
    date_applied: DateTime<Utc>,
    last_updated: Option<DateTime<Utc>>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            student_id: row.student_id,
            employer_id: row.employer_id,
            job_title: row.job_title,
            company: row.company,
            student_name: row.student_name,
            student_email: row.student_email,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            date_applied: row.date_applied,
            last_updated: row.last_updated,
        })
    }
}

#[derive(FromRow)]
struct EntryRow {
    id: Uuid,
    student_id: Uuid,
    details: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self, section: Section) -> Result<ProfileEntry, StoreError> {
        let details = EntryDetails::from_json(section, self.details)
            .map_err(|e| StoreError::Corrupt(format!("{} entry {}: {}", section, self.id, e)))?;
        Ok(ProfileEntry {
            id: self.id,
            student_id: self.student_id,
            section,
            details,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn unique_violation(err: sqlx::Error, what: String) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what),
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, display_name, role, headline, about, phone, location, linkedin, website, \
             skills, resume_url, resume_filename, photo_url, company_name, password_hash, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(&user.headline)
        .bind(&user.about)
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.linkedin)
        .bind(&user.website)
        .bind(&user.skills)
        .bind(&user.resume_url)
        .bind(&user.resume_filename)
        .bind(&user.photo_url)
        .bind(&user.company_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation(e, format!("email {} is already registered", user.email)))?;
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE users SET display_name = $2, headline = $3, about = $4, phone = $5, location = $6, \
             linkedin = $7, website = $8, skills = $9, resume_url = $10, resume_filename = $11, photo_url = $12, \
             company_name = $13, updated_at = $14 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.display_name)
        .bind(&user.headline)
        .bind(&user.about)
        .bind(&user.phone)
        .bind(&user.location)
        .bind(&user.linkedin)
        .bind(&user.website)
        .bind(&user.skills)
        .bind(&user.resume_url)
        .bind(&user.resume_filename)
        .bind(&user.photo_url)
        .bind(&user.company_name)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }

    async fn list_jobs(&self, filter: &Filter) -> Result<Vec<Job>, StoreError> {
        expect_table(filter, "jobs")?;
        let sql = filter.to_sql();
        tracing::debug!("list_jobs: {}", sql.query);
        let mut q = sqlx::query_as::<_, JobRow>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        collect(q.fetch_all(&self.pool).await?)
    }

    async fn count_jobs(&self, filter: &Filter) -> Result<i64, StoreError> {
        expect_table(filter, "jobs")?;
        let sql = filter.to_count_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO jobs (id, employer_id, job_title, company, job_type, work_arrangement, location, min_pay, \
             max_pay, show_pay_in_listing, job_description, requirements, application_deadline, status, applications, \
             applicants, view_count, date_created, approved_at, approved_by, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)",
        )
        .bind(job.id)
        .bind(job.employer_id)
        .bind(&job.job_title)
        .bind(&job.company)
        .bind(&job.job_type)
        .bind(&job.work_arrangement)
        .bind(&job.location)
        .bind(job.min_pay)
        .bind(job.max_pay)
        .bind(job.show_pay_in_listing)
        .bind(&job.job_description)
        .bind(&job.requirements)
        .bind(job.application_deadline)
        .bind(job.status.as_str())
        .bind(job.applications)
        .bind(&job.applicants)
        .bind(job.view_count)
        .bind(job.date_created)
        .bind(job.approved_at)
        .bind(job.approved_by)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_job(&self, job: &Job) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE jobs SET job_title = $2, company = $3, job_type = $4, work_arrangement = $5, location = $6, \
             min_pay = $7, max_pay = $8, show_pay_in_listing = $9, job_description = $10, requirements = $11, \
             application_deadline = $12, status = $13, approved_at = $14, approved_by = $15, updated_at = $16 \
             WHERE id = $1",
        )
        .bind(job.id)
        .bind(&job.job_title)
        .bind(&job.company)
        .bind(&job.job_type)
        .bind(&job.work_arrangement)
        .bind(&job.location)
        .bind(job.min_pay)
        .bind(job.max_pay)
        .bind(job.show_pay_in_listing)
        .bind(&job.job_description)
        .bind(&job.requirements)
        .bind(job.application_deadline)
        .bind(job.status.as_str())
        .bind(job.approved_at)
        .bind(job.approved_by)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("job {}", job.id)));
        }
        Ok(())
    }

    async fn approve_job(&self, id: Uuid, approved_by: Uuid, at: DateTime<Utc>) -> Result<Option<Job>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(
            "UPDATE jobs SET status = 'Approved', approved_at = $2, approved_by = $3, updated_at = $2 \
             WHERE id = $1 AND status = 'Pending' RETURNING *",
        )
        .bind(id)
        .bind(at)
        .bind(approved_by)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Job::try_from).transpose()
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        // applications go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_application(&self, application: &Application) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let locked = sqlx::query("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(application.job_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(StoreError::NotFound(format!("job {}", application.job_id)));
        }

        let inserted = sqlx::query(
            "INSERT INTO applications (id, job_id, student_id, employer_id, job_title, company, student_name, \
             student_email, status, date_applied, last_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (job_id, student_id) DO NOTHING",
        )
        .bind(application.id)
        .bind(application.job_id)
        .bind(application.student_id)
        .bind(application.employer_id)
        .bind(&application.job_title)
        .bind(&application.company)
        .bind(&application.student_name)
        .bind(&application.student_email)
        .bind(application.status.as_str())
        .bind(application.date_applied)
        .bind(application.last_updated)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE jobs SET applications = applications + 1, \
             applicants = CASE WHEN $2 = ANY(applicants) THEN applicants ELSE array_append(applicants, $2) END \
             WHERE id = $1",
        )
        .bind(application.job_id)
        .bind(application.student_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn list_applications(&self, filter: &Filter) -> Result<Vec<Application>, StoreError> {
        expect_table(filter, "applications")?;
        let sql = filter.to_sql();
        let mut q = sqlx::query_as::<_, ApplicationRow>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        collect(q.fetch_all(&self.pool).await?)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            "UPDATE applications SET status = $2, last_updated = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Application::try_from).transpose()
    }

    async fn list_entries(&self, section: Section, student_id: Uuid) -> Result<Vec<ProfileEntry>, StoreError> {
        let query = format!(
            "SELECT * FROM \"{}\" WHERE student_id = $1 ORDER BY created_at ASC, id ASC",
            section.table()
        );
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(|r| r.into_entry(section)).collect()
    }

    async fn get_entry(&self, section: Section, id: Uuid) -> Result<Option<ProfileEntry>, StoreError> {
        let query = format!("SELECT * FROM \"{}\" WHERE id = $1", section.table());
        let row = sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| r.into_entry(section)).transpose()
    }

    async fn insert_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError> {
        let details = entry.details.to_json().map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let query = format!(
            "INSERT INTO \"{}\" (id, student_id, details, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
            entry.section.table()
        );
        sqlx::query(&query)
            .bind(entry.id)
            .bind(entry.student_id)
            .bind(details)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError> {
        let details = entry.details.to_json().map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let query = format!(
            "UPDATE \"{}\" SET details = $2, updated_at = $3 WHERE id = $1",
            entry.section.table()
        );
        let result = sqlx::query(&query)
            .bind(entry.id)
            .bind(details)
            .bind(entry.updated_at)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("{} entry {}", entry.section, entry.id)));
        }
        Ok(())
    }

    async fn delete_entry(&self, section: Section, id: Uuid) -> Result<bool, StoreError> {
        let query = format!("DELETE FROM \"{}\" WHERE id = $1", section.table());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &FilterValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        FilterValue::Text(s) => q.bind(s.clone()),
        FilterValue::Float(f) => q.bind(*f),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Timestamp(t) => q.bind(*t),
        FilterValue::Bool(b) => q.bind(*b),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &FilterValue,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        FilterValue::Text(s) => q.bind(s.clone()),
        FilterValue::Float(f) => q.bind(*f),
        FilterValue::Uuid(u) => q.bind(*u),
        FilterValue::Timestamp(t) => q.bind(*t),
        FilterValue::Bool(b) => q.bind(*b),
    }
}
