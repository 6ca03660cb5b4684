// handlers/protected/employer.rs - Employer job management and applicant review

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::gate::Principal;
use crate::listing::{employer_applications, employer_listing, ManageJobQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{now, Application, ApplicationStatus, Job, JobCard, JobStatus, User};
use crate::notice::Notice;
use crate::state::AppState;
use crate::validation::{validate_job_form, JobForm, ValidJob};

#[derive(Debug, Serialize)]
pub struct EmployerJobs {
    pub jobs: Vec<JobCard>,
}

#[derive(Debug, Serialize)]
pub struct SavedJob {
    pub job: JobCard,
    pub redirect: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RemovedJob {
    pub id: Uuid,
}

/// An application with the applicant's resume reference
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub resume_url: Option<String>,
    pub resume_filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmployerApplications {
    pub applications: Vec<ApplicationView>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdatedApplication {
    pub application: Application,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLink {
    pub student_id: Uuid,
    pub student_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_filename: Option<String>,
}

/// GET /api/employer/jobs - the caller's jobs, newest first
pub async fn jobs_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ManageJobQuery>,
) -> ApiResult<EmployerJobs> {
    let jobs = state.store.list_jobs(&employer_listing(principal.id(), &query)?).await?;
    Ok(ApiResponse::success(EmployerJobs {
        jobs: jobs.into_iter().map(JobCard::internal).collect(),
    }))
}

/// GET /api/employer/jobs/:id - one of the caller's jobs, for the edit form
pub async fn job_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<JobCard> {
    let job = owned_job(&state, &principal, id).await?;
    Ok(ApiResponse::success(JobCard::internal(job)))
}

/// POST /api/employer/jobs - create a job awaiting admin review
pub async fn job_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(form): Json<JobForm>,
) -> ApiResult<SavedJob> {
    let valid = validate_job_form(form, now().date_naive())?;
    let job = new_job(principal.id(), valid);
    state.store.insert_job(&job).await?;

    tracing::info!("Employer {} created job {}", principal.id(), job.id);
    Ok(ApiResponse::created(SavedJob {
        job: JobCard::internal(job),
        redirect: "employer.html",
    })
    .saying("Job listing created successfully! It will be reviewed by an admin before being published."))
}

/// PUT /api/employer/jobs/:id - edit a job; it goes back to review
pub async fn job_put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(form): Json<JobForm>,
) -> ApiResult<SavedJob> {
    let mut job = owned_job(&state, &principal, id).await?;
    let valid = validate_job_form(form, now().date_naive())?;

    apply_form(&mut job, valid);
    job.status = JobStatus::Pending;
    job.approved_at = None;
    job.approved_by = None;
    job.updated_at = now();
    state.store.update_job(&job).await?;

    tracing::info!("Employer {} edited job {}", principal.id(), job.id);
    Ok(ApiResponse::success(SavedJob {
        job: JobCard::internal(job),
        redirect: "employer.html",
    })
    .saying("Job listing updated successfully! It will be reviewed by an admin before being published."))
}

/// DELETE /api/employer/jobs/:id - remove one of the caller's jobs and its applications
pub async fn job_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<RemovedJob> {
    owned_job(&state, &principal, id).await?;
    if !state.store.delete_job(id).await? {
        return Err(ApiError::not_found("Job listing not found."));
    }

    tracing::info!("Employer {} deleted job {}", principal.id(), id);
    Ok(ApiResponse::success(RemovedJob { id }).saying("Job listing deleted successfully!"))
}

/// GET /api/employer/applications - applications to the caller's jobs, newest first
pub async fn applications_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<EmployerApplications> {
    let applications = state.store.list_applications(&employer_applications(principal.id())?).await?;

    let mut students: HashMap<Uuid, Option<User>> = HashMap::new();
    let mut views = Vec::with_capacity(applications.len());
    for application in applications {
        if !students.contains_key(&application.student_id) {
            let student = state.store.get_user(application.student_id).await?;
            students.insert(application.student_id, student);
        }
        let student = students.get(&application.student_id).and_then(Option::as_ref);
        views.push(ApplicationView {
            resume_url: student.and_then(|s| s.resume_url.clone()),
            resume_filename: student.and_then(|s| s.resume_filename.clone()),
            application,
        });
    }

    Ok(ApiResponse::success(EmployerApplications { applications: views }))
}

/// PATCH /api/employer/applications/:id - move an application along the pipeline
pub async fn application_patch(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<UpdatedApplication> {
    if !body.status.employer_settable() {
        return Err(ApiError::validation_error(
            format!("Status '{}' cannot be set by an employer.", body.status),
            Some("status"),
        ));
    }

    let application = state
        .store
        .get_application(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found."))?;
    if application.employer_id != principal.id() {
        return Err(ApiError::forbidden("You can only update applications to your own job listings."));
    }

    let application = state
        .store
        .update_application_status(id, body.status, now())
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found."))?;

    tracing::info!("Employer {} set application {} to {}", principal.id(), id, application.status);
    Ok(ApiResponse::success(UpdatedApplication { application }).saying("Application status updated successfully!"))
}

/// GET /api/employer/students/:id/resume - a student's resume reference
pub async fn resume_get(State(state): State<AppState>, Path(student_id): Path<Uuid>) -> ApiResult<ResumeLink> {
    let student = state
        .store
        .get_user(student_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found."))?;

    let missing = student.resume_url.is_none();
    let response = ApiResponse::success(ResumeLink {
        student_id,
        student_name: student.label().to_string(),
        resume_url: student.resume_url,
        resume_filename: student.resume_filename,
    });

    Ok(if missing {
        response.with_notice(Notice::info("This student has not uploaded a resume yet."))
    } else {
        response
    })
}

async fn owned_job(state: &AppState, principal: &Principal, id: Uuid) -> Result<Job, ApiError> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job listing not found."))?;
    if job.employer_id != principal.id() {
        return Err(ApiError::forbidden("You can only manage your own job listings."));
    }
    Ok(job)
}

fn new_job(employer_id: Uuid, valid: ValidJob) -> Job {
    let created = now();
    let mut job = Job {
        id: Uuid::new_v4(),
        employer_id,
        job_title: String::new(),
        company: String::new(),
        job_type: String::new(),
        work_arrangement: String::new(),
        location: None,
        min_pay: None,
        max_pay: None,
        show_pay_in_listing: true,
        job_description: String::new(),
        requirements: None,
        application_deadline: None,
        status: JobStatus::Pending,
        applications: 0,
        applicants: vec![],
        view_count: 0,
        date_created: created,
        approved_at: None,
        approved_by: None,
        updated_at: created,
    };
    apply_form(&mut job, valid);
    job
}

fn apply_form(job: &mut Job, valid: ValidJob) {
    job.job_title = valid.job_title;
    job.company = valid.company;
    job.job_type = valid.job_type;
    job.work_arrangement = valid.work_arrangement;
    job.location = valid.location;
    job.min_pay = valid.min_pay;
    job.max_pay = valid.max_pay;
    job.show_pay_in_listing = valid.show_pay_in_listing;
    job.job_description = valid.job_description;
    job.requirements = valid.requirements;
    job.application_deadline = valid.application_deadline;
}
