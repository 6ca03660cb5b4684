use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{expect_table, Store, StoreError};
use crate::filter::Filter;
use crate::models::{Application, ApplicationStatus, Job, JobStatus, ProfileEntry, Section, User};

/// Process-local store for demo and offline mode.
///
/// Lock order when more than one map is held: jobs, then applications.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    jobs: RwLock<HashMap<Uuid, Job>>,
    applications: RwLock<HashMap<Uuid, Application>>,
    entries: RwLock<HashMap<Uuid, ProfileEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(StoreError::Conflict(format!("email {} is already registered", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("user {}", user.id))),
        }
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn list_jobs(&self, filter: &Filter) -> Result<Vec<Job>, StoreError> {
        expect_table(filter, "jobs")?;
        Ok(filter.apply(self.jobs.read().await.values()))
    }

    async fn count_jobs(&self, filter: &Filter) -> Result<i64, StoreError> {
        expect_table(filter, "jobs")?;
        Ok(filter.count(self.jobs.read().await.values()))
    }

    async fn insert_job(&self, job: &Job) -> Result<(), StoreError> {
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn update_job(&self, job: &Job) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let stored = jobs
            .get_mut(&job.id)
            .ok_or_else(|| StoreError::NotFound(format!("job {}", job.id)))?;
        stored.job_title = job.job_title.clone();
        stored.company = job.company.clone();
        stored.job_type = job.job_type.clone();
        stored.work_arrangement = job.work_arrangement.clone();
        stored.location = job.location.clone();
        stored.min_pay = job.min_pay;
        stored.max_pay = job.max_pay;
        stored.show_pay_in_listing = job.show_pay_in_listing;
        stored.job_description = job.job_description.clone();
        stored.requirements = job.requirements.clone();
        stored.application_deadline = job.application_deadline;
        stored.status = job.status;
        stored.approved_at = job.approved_at;
        stored.approved_by = job.approved_by;
        stored.updated_at = job.updated_at;
        Ok(())
    }

    async fn approve_job(&self, id: Uuid, approved_by: Uuid, at: DateTime<Utc>) -> Result<Option<Job>, StoreError> {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(&id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Approved;
                job.approved_at = Some(at);
                job.approved_by = Some(approved_by);
                job.updated_at = at;
                Ok(Some(job.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        let mut applications = self.applications.write().await;
        if jobs.remove(&id).is_none() {
            return Ok(false);
        }
        applications.retain(|_, a| a.job_id != id);
        Ok(true)
    }

    async fn create_application(&self, application: &Application) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        let mut applications = self.applications.write().await;

        let job = jobs
            .get_mut(&application.job_id)
            .ok_or_else(|| StoreError::NotFound(format!("job {}", application.job_id)))?;
        if applications
            .values()
            .any(|a| a.job_id == application.job_id && a.student_id == application.student_id)
        {
            return Ok(false);
        }

        applications.insert(application.id, application.clone());
        job.applications += 1;
        if !job.applicants.contains(&application.student_id) {
            job.applicants.push(application.student_id);
        }
        Ok(true)
    }

    async fn list_applications(&self, filter: &Filter) -> Result<Vec<Application>, StoreError> {
        expect_table(filter, "applications")?;
        Ok(filter.apply(self.applications.read().await.values()))
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.applications.read().await.get(&id).cloned())
    }

    async fn update_application_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Application>, StoreError> {
        let mut applications = self.applications.write().await;
        Ok(applications.get_mut(&id).map(|a| {
            a.status = status;
            a.last_updated = Some(at);
            a.clone()
        }))
    }

    async fn list_entries(&self, section: Section, student_id: Uuid) -> Result<Vec<ProfileEntry>, StoreError> {
        let entries = self.entries.read().await;
        let mut out: Vec<ProfileEntry> = entries
            .values()
            .filter(|e| e.section == section && e.student_id == student_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }

    async fn get_entry(&self, section: Section, id: Uuid) -> Result<Option<ProfileEntry>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&id).filter(|e| e.section == section).cloned())
    }

    async fn insert_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError> {
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn update_entry(&self, entry: &ProfileEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(&entry.id) {
            Some(slot) if slot.section == entry.section => {
                *slot = entry.clone();
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("{} entry {}", entry.section, entry.id))),
        }
    }

    async fn delete_entry(&self, section: Section, id: Uuid) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().await;
        if entries.get(&id).is_some_and(|e| e.section == section) {
            entries.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now, Role};

    fn job(employer: Uuid) -> Job {
        let at = now();
        Job {
            id: Uuid::new_v4(),
            employer_id: employer,
            job_title: "Barista".into(),
            company: "Bean There".into(),
            job_type: "Part-time".into(),
            work_arrangement: "On-site".into(),
            location: None,
            min_pay: None,
            max_pay: None,
            show_pay_in_listing: true,
            job_description: "Pull shots and keep the counter tidy.".into(),
            requirements: None,
            application_deadline: None,
            status: JobStatus::Pending,
            applications: 0,
            applicants: vec![],
            view_count: 0,
            date_created: at,
            approved_at: None,
            approved_by: None,
            updated_at: at,
        }
    }

    fn application(job: &Job, student: Uuid) -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id: job.id,
            student_id: student,
            employer_id: job.employer_id,
            job_title: job.job_title.clone(),
            company: job.company.clone(),
            student_name: None,
            student_email: "s@example.edu".into(),
            status: ApplicationStatus::Pending,
            date_applied: now(),
            last_updated: None,
        }
    }

    #[tokio::test]
    async fn duplicate_application_is_refused() {
        let store = MemoryStore::new();
        let job = job(Uuid::new_v4());
        store.insert_job(&job).await.unwrap();
        let student = Uuid::new_v4();

        assert!(store.create_application(&application(&job, student)).await.unwrap());
        assert!(!store.create_application(&application(&job, student)).await.unwrap());

        let stored = store.get_job(job.id).await.unwrap().unwrap();
        assert_eq!(stored.applications, 1);
        assert_eq!(stored.applicants, vec![student]);
    }

    #[tokio::test]
    async fn approve_only_once() {
        let store = MemoryStore::new();
        let job = job(Uuid::new_v4());
        store.insert_job(&job).await.unwrap();
        let admin = Uuid::new_v4();

        let approved = store.approve_job(job.id, admin, now()).await.unwrap().unwrap();
        assert_eq!(approved.status, JobStatus::Approved);
        assert_eq!(approved.approved_by, Some(admin));
        assert!(store.approve_job(job.id, admin, now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_job_cascades_applications() {
        let store = MemoryStore::new();
        let job = job(Uuid::new_v4());
        store.insert_job(&job).await.unwrap();
        let app = application(&job, Uuid::new_v4());
        store.create_application(&app).await.unwrap();

        assert!(store.delete_job(job.id).await.unwrap());
        assert!(store.get_application(app.id).await.unwrap().is_none());
        assert!(!store.delete_job(job.id).await.unwrap());
    }

    #[tokio::test]
    async fn email_is_unique_ignoring_case() {
        let store = MemoryStore::new();
        store.insert_user(&User::new("Ana@Example.edu", Role::Student)).await.unwrap();
        let err = store.insert_user(&User::new("ana@example.edu", Role::Student)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.find_user_by_email("ANA@example.EDU").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn listing_rejects_foreign_table() {
        let store = MemoryStore::new();
        let filter = Filter::new("applications").unwrap();
        assert!(store.list_jobs(&filter).await.is_err());
    }
}
