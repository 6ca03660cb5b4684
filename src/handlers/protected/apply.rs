// handlers/protected/apply.rs - POST /api/jobs/:id/apply

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gate::Principal;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{now, Application, ApplicationStatus, JobStatus};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Submitted {
    pub application: Application,
}

/// POST /api/jobs/:id/apply - apply to an approved job, once
pub async fn apply_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Submitted> {
    let job = state
        .store
        .get_job(job_id)
        .await?
        .filter(|job| job.status == JobStatus::Approved)
        .ok_or_else(|| ApiError::not_found("Job listing not found."))?;

    // The principal was resolved earlier in the request; the record may be gone since
    let student = state
        .store
        .get_user(principal.id())
        .await?
        .ok_or_else(|| ApiError::profile_required("Please complete your profile before applying"))?;

    let application = Application {
        id: Uuid::new_v4(),
        job_id: job.id,
        student_id: student.id,
        employer_id: job.employer_id,
        job_title: job.job_title,
        company: job.company,
        student_name: student.display_name.clone(),
        student_email: student.email.clone(),
        status: ApplicationStatus::Pending,
        date_applied: now(),
        last_updated: None,
    };

    if !state.store.create_application(&application).await? {
        return Err(ApiError::conflict("You have already applied to this job"));
    }

    tracing::info!("Student {} applied to job {}", student.id, job_id);
    Ok(ApiResponse::created(Submitted { application }).saying("Application submitted successfully!"))
}
