#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use careerbridge::auth::{generate_jwt, Claims};
use careerbridge::config::AppConfig;
use careerbridge::gate::DEMO_PRINCIPAL_HEADER;
use careerbridge::filter::Filter;
use careerbridge::models::{now, Application, ApplicationStatus, Job, JobStatus, ProfileEntry, Role, Section, User};
use careerbridge::state::AppState;
use careerbridge::store::{MemoryStore, Store, StoreError};

/// Router over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn notice(&self) -> &Value {
        &self.body["notice"]
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }
}

/// How a request identifies its caller
#[derive(Clone, Copy)]
pub enum As<'a> {
    Anonymous,
    Demo(&'a User),
    Token(&'a User),
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::development();
        let router = careerbridge::app(AppState::new(store.clone(), config.clone()));
        Self { store, config, router }
    }

    /// Router over a [`FlakyStore`]; seed through `store` as usual
    pub fn flaky() -> (Self, Arc<FlakyStore>) {
        let store = Arc::new(MemoryStore::new());
        let flaky = Arc::new(FlakyStore::new(store.clone()));
        let config = AppConfig::development();
        let router = careerbridge::app(AppState::new(flaky.clone(), config.clone()));
        (Self { store, config, router }, flaky)
    }

    pub async fn user(&self, role: Role, name: &str) -> Result<User> {
        let mut user = User::new(format!("{}@example.com", name.to_lowercase().replace(' ', ".")), role);
        user.display_name = Some(name.to_string());
        self.store.insert_user(&user).await?;
        Ok(user)
    }

    /// A job created `age_minutes` ago
    pub async fn job(&self, employer: &User, title: &str, status: JobStatus, age_minutes: i64) -> Result<Job> {
        let created = now() - Duration::minutes(age_minutes);
        let job = Job {
            id: Uuid::new_v4(),
            employer_id: employer.id,
            job_title: title.to_string(),
            company: "Acme Corp".to_string(),
            job_type: "Internship".to_string(),
            work_arrangement: "Remote".to_string(),
            location: Some("Austin, TX".to_string()),
            min_pay: Some(20.0),
            max_pay: Some(30.0),
            show_pay_in_listing: true,
            job_description: "Build and ship features with the platform team.".to_string(),
            requirements: None,
            application_deadline: None,
            status,
            applications: 0,
            applicants: vec![],
            view_count: 0,
            date_created: created,
            approved_at: None,
            approved_by: None,
            updated_at: created,
        };
        self.store.insert_job(&job).await?;
        Ok(job)
    }

    pub fn token_for(&self, user: &User) -> Result<String> {
        let claims = Claims::new(user, self.config.security.jwt_expiry_hours);
        generate_jwt(&self.config.security, &claims).context("failed to sign test token")
    }

    pub async fn send(&self, method: Method, uri: &str, caller: As<'_>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        builder = match caller {
            As::Anonymous => builder,
            As::Demo(user) => builder.header(DEMO_PRINCIPAL_HEADER, user.id.to_string()),
            As::Token(user) => builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token_for(user)?)),
        };

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, uri: &str, caller: As<'_>) -> Result<TestResponse> {
        self.send(Method::GET, uri, caller, None).await
    }

    pub async fn post(&self, uri: &str, caller: As<'_>, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, caller, Some(body)).await
    }
}

/// Memory store whose user lookups can be made to fail or to come back empty
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    users_down: AtomicBool,
    /// Successful user lookups left before records read as missing
    lookups_left: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            users_down: AtomicBool::new(false),
            lookups_left: AtomicUsize::new(usize::MAX),
        }
    }

    /// Every user lookup fails as if the pool were exhausted
    pub fn take_users_down(&self) {
        self.users_down.store(true, Ordering::SeqCst);
    }

    /// After `lookups` more reads, user records read as missing
    pub fn forget_users_after(&self, lookups: usize) {
        self.lookups_left.store(lookups, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        if self.users_down.load(Ordering::SeqCst) {
            return Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        let remaining = self
            .lookups_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                usize::MAX => Some(n),
                n => Some(n - 1),
            });
        if remaining.is_err() {
            return Ok(None);
        }
        self.inner.get_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.inner.find_user_by_email(email).await
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.inner.insert_user(user).await
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        self.inner.update_user(user).await
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        self.inner.get_job(id).await
    }

    async fn list_jobs(&self, filter: &Filter) -> Result<Vec<Job>, StoreError> {
        self.inner.list_jobs(filter).await
    }

    async fn count_jobs(&self, filter: &Filter) -> Result<i64, StoreError> {
        self.inner.count_jobs(filter).await
    }

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        self.inner.insert_job(job).await
    }

    async fn update_job(&self, job: &Job) -> Result<(), StoreError> {
        self.inner.update_job(job).await
    }

    async fn approve_job(&self, id: Uuid, approved_by: Uuid, at: DateTime<Utc>) -> Result<Option<Job>, StoreError> {
        self.inner.approve_job(id, approved_by, at).await
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete_job(id).await
    }

    async fn create_application(&self, application: &Application) -> Result<bool, StoreError> {
        self.inner.create_application(application).await
    }

    async fn list_applications(&self, filter: &Filter) -> Result<Vec<Application>, StoreError> {
        self.inner.list_applications(filter).await
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        self.inner.get_application(id).await
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError> {
        self.inner.update_application_status(id, status, at).await
    }

    async fn list_entries(&self, section: Section, student_id: Uuid) -> Result<Vec<ProfileEntry>, StoreError> {
        self.inner.list_entries(section, student_id).await
    }

    async fn get_entry(&self, section: Section, id: Uuid) -> Result<Option<ProfileEntry>, StoreError> {
        self.inner.get_entry(section, id).await
    }

    async fn insert_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError> {
        self.inner.insert_entry(entry).await
    }

    async fn update_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError> {
        self.inner.update_entry(entry).await
    }

    async fn delete_entry(&self, section: Section, id: Uuid) -> Result<bool, StoreError> {
        self.inner.delete_entry(section, id).await
    }
}
