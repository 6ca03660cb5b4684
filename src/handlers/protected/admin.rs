// handlers/protected/admin.rs - Pending job review
//
// Every write answers with the fresh pending count so the badge on the page
// reflects the store rather than a client-side decrement.

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gate::Principal;
use crate::listing::{pending_filter, pending_listing, ManageJobQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{now, JobCard};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PendingJobs {
    pub jobs: Vec<JobCard>,
    pub pending_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ApprovedJob {
    pub job: JobCard,
    pub pending_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedJob {
    pub id: Uuid,
    pub pending_count: i64,
}

/// GET /api/admin/jobs/pending - pending jobs, newest first
pub async fn pending_get(
    State(state): State<AppState>,
    Query(query): Query<ManageJobQuery>,
) -> ApiResult<PendingJobs> {
    let jobs = state.store.list_jobs(&pending_listing(&query)?).await?;
    let pending_count = state.store.count_jobs(&pending_filter()?).await?;

    Ok(ApiResponse::success(PendingJobs {
        jobs: jobs.into_iter().map(JobCard::internal).collect(),
        pending_count,
    }))
}

/// POST /api/admin/jobs/:id/approve - Pending -> Approved
pub async fn approve_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApprovedJob> {
    let job = match state.store.approve_job(id, principal.id(), now()).await? {
        Some(job) => job,
        None if state.store.get_job(id).await?.is_some() => {
            return Err(ApiError::conflict("This job listing has already been approved."));
        }
        None => return Err(ApiError::not_found("Job listing not found.")),
    };

    tracing::info!("Admin {} approved job {}", principal.id(), job.id);
    let pending_count = state.store.count_jobs(&pending_filter()?).await?;

    Ok(ApiResponse::success(ApprovedJob {
        job: JobCard::internal(job),
        pending_count,
    })
    .saying("Job listing approved successfully!"))
}

/// DELETE /api/admin/jobs/:id - remove any job and its applications
pub async fn job_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<DeletedJob> {
    if !state.store.delete_job(id).await? {
        return Err(ApiError::not_found("Job listing not found."));
    }

    tracing::info!("Admin {} deleted job {}", principal.id(), id);
    let pending_count = state.store.count_jobs(&pending_filter()?).await?;

    Ok(ApiResponse::success(DeletedJob {
        id,
        pending_count,
    })
    .saying("Job listing deleted successfully!"))
}
