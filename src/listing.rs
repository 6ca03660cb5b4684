//! Query parameters and filters for the three job listings.
//!
//! Every filter the page offers is pushed into the store query, so a page of
//! results is always consistent with the filters that produced it.

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::filter::{Condition, Cursor, Filter, SortDirection};
use crate::models::{Job, JobStatus};

const PUBLIC_SEARCH_COLUMNS: [&str; 4] = ["job_title", "company", "job_description", "requirements"];
const MANAGE_SEARCH_COLUMNS: [&str; 2] = ["job_title", "company"];

/// `GET /api/jobs` query. Blank values count as not set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicJobQuery {
    pub search: Option<String>,
    pub job_type: Option<String>,
    pub work_arrangement: Option<String>,
    pub min_pay: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<String>,
}

impl PublicJobQuery {
    pub fn limit(&self) -> Result<Option<i64>, ApiError> {
        present(&self.limit)
            .map(|raw| raw.parse::<i64>().map_err(|_| ApiError::bad_request("limit must be a whole number")))
            .transpose()
    }

    /// Approved jobs matching the filters, without paging. Backs `count`.
    pub fn count_filter(&self) -> Result<Filter, ApiError> {
        let mut filter = Filter::new("jobs")?;
        filter.where_condition(Condition::eq("status", JobStatus::Approved.as_str()))?;

        if let Some(search) = present(&self.search) {
            filter.where_condition(Condition::contains_any(&PUBLIC_SEARCH_COLUMNS, search))?;
        }
        if let Some(job_type) = present(&self.job_type) {
            filter.where_condition(Condition::eq("job_type", job_type))?;
        }
        if let Some(arrangement) = present(&self.work_arrangement) {
            filter.where_condition(Condition::eq("work_arrangement", arrangement))?;
        }
        if let Some(raw) = present(&self.min_pay) {
            let min_pay = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ApiError::bad_request("min_pay must be a number"))?;
            filter.where_condition(Condition::Or(vec![
                Condition::gte("min_pay", min_pay),
                Condition::gte("max_pay", min_pay),
            ]))?;
        }
        Ok(filter)
    }

    /// One page of approved jobs, newest first, one row past `page_size` so
    /// the caller can tell whether another page exists
    pub fn filter(&self, page_size: i64) -> Result<Filter, ApiError> {
        let mut filter = self.count_filter()?;
        let cursor = present(&self.cursor).map(Cursor::decode).transpose()?;
        filter.keyset("date_created", cursor)?;
        filter.limit(page_size + 1)?;
        Ok(filter)
    }
}

/// Admin and employer listing query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManageJobQuery {
    pub search: Option<String>,
    pub job_type: Option<String>,
    /// Substring of the location or the work arrangement
    pub arrangement: Option<String>,
}

impl ManageJobQuery {
    fn apply(&self, filter: &mut Filter) -> Result<(), ApiError> {
        if let Some(search) = present(&self.search) {
            filter.where_condition(Condition::contains_any(&MANAGE_SEARCH_COLUMNS, search))?;
        }
        if let Some(job_type) = present(&self.job_type) {
            filter.where_condition(Condition::eq("job_type", job_type))?;
        }
        if let Some(arrangement) = present(&self.arrangement) {
            filter.where_condition(Condition::contains_any(&["location", "work_arrangement"], arrangement))?;
        }
        Ok(())
    }
}

/// Every pending job, unfiltered. Backs the admin's pending counter.
pub fn pending_filter() -> Result<Filter, ApiError> {
    let mut filter = Filter::new("jobs")?;
    filter.where_condition(Condition::eq("status", JobStatus::Pending.as_str()))?;
    Ok(filter)
}

pub fn pending_listing(query: &ManageJobQuery) -> Result<Filter, ApiError> {
    let mut filter = pending_filter()?;
    query.apply(&mut filter)?;
    filter.keyset("date_created", None)?;
    Ok(filter)
}

pub fn employer_listing(employer_id: Uuid, query: &ManageJobQuery) -> Result<Filter, ApiError> {
    let mut filter = Filter::new("jobs")?;
    filter.where_condition(Condition::eq("employer_id", employer_id))?;
    query.apply(&mut filter)?;
    filter.keyset("date_created", None)?;
    Ok(filter)
}

pub fn employer_applications(employer_id: Uuid) -> Result<Filter, ApiError> {
    let mut filter = Filter::new("applications")?;
    filter.where_condition(Condition::eq("employer_id", employer_id))?;
    filter.order("date_applied", SortDirection::Desc)?;
    filter.order("id", SortDirection::Desc)?;
    Ok(filter)
}

/// Split off the look-ahead row and build the cursor for the next page
pub fn split_page(mut rows: Vec<Job>, page_size: i64) -> (Vec<Job>, Option<String>) {
    let page_size = usize::try_from(page_size).unwrap_or(0);
    if rows.len() <= page_size {
        return (rows, None);
    }
    rows.truncate(page_size);
    let next = rows.last().map(|job| Cursor::new(job.date_created, job.id).encode());
    (rows, next)
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
