// handlers/public/jobs.rs - GET /api/jobs

use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Serialize;

use crate::listing::{split_page, PublicJobQuery};
use crate::middleware::{ApiResponse, ApiResult, CurrentPrincipal};
use crate::models::{PublicJobCard, Role};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobPage {
    pub jobs: Vec<PublicJobCard>,
    /// Total approved jobs matching the filters, across all pages
    pub count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// GET /api/jobs - approved jobs, newest first, keyset paginated
pub async fn jobs_get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentPrincipal>,
    Query(query): Query<PublicJobQuery>,
) -> ApiResult<JobPage> {
    let page_size = state.config.page_size(query.limit()?);
    let filter = query.filter(page_size)?;

    let rows = state.store.list_jobs(&filter).await?;
    let count = state.store.count_jobs(&query.count_filter()?).await?;
    let (jobs, next_cursor) = split_page(rows, page_size);

    let viewer = current.0.as_ref().filter(|p| p.role() == Role::Student).map(|p| p.id());
    let jobs = jobs.into_iter().map(|job| PublicJobCard::new(job, viewer)).collect();

    Ok(ApiResponse::success(JobPage { jobs, count, next_cursor }))
}
