use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::filter::{FilterValue, Filterable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Approved,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Approved => "Approved",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(JobStatus::Pending),
            "Approved" => Ok(JobStatus::Approved),
            other => Err(format!("unknown job status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub job_type: String,
    pub work_arrangement: String,
    pub location: Option<String>,
    pub min_pay: Option<f64>,
    pub max_pay: Option<f64>,
    pub show_pay_in_listing: bool,
    pub job_description: String,
    pub requirements: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub status: JobStatus,
    pub applications: i64,
    #[serde(skip_serializing, default)]
    pub applicants: Vec<Uuid>,
    pub view_count: i64,
    pub date_created: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn pay_label(&self) -> String {
        format_pay_range(self.min_pay, self.max_pay)
    }
}

impl Filterable for Job {
    fn field(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(self.id.into()),
            "employer_id" => Some(self.employer_id.into()),
            "job_title" => Some(self.job_title.as_str().into()),
            "company" => Some(self.company.as_str().into()),
            "job_type" => Some(self.job_type.as_str().into()),
            "work_arrangement" => Some(self.work_arrangement.as_str().into()),
            "location" => self.location.as_deref().map(FilterValue::from),
            "min_pay" => self.min_pay.map(FilterValue::from),
            "max_pay" => self.max_pay.map(FilterValue::from),
            "job_description" => Some(self.job_description.as_str().into()),
            "requirements" => self.requirements.as_deref().map(FilterValue::from),
            "status" => Some(self.status.as_str().into()),
            "date_created" => Some(self.date_created.into()),
            _ => None,
        }
    }
}

/// A job as its owner or an admin sees it, with pay always labelled
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCard {
    #[serde(flatten)]
    pub job: Job,
    pub pay_label: String,
}

impl JobCard {
    pub fn internal(job: Job) -> Self {
        let pay_label = job.pay_label();
        Self { job, pay_label }
    }
}

/// A job on the public board. Owner, approver and review state stay
/// internal; pay appears only when the employer opted in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicJobCard {
    pub id: Uuid,
    pub job_title: String,
    pub company: String,
    pub job_type: String,
    pub work_arrangement: String,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_pay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay_label: Option<String>,
    pub job_description: String,
    pub requirements: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub applications: i64,
    pub view_count: i64,
    pub date_created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_has_applied: Option<bool>,
}

impl PublicJobCard {
    /// `viewer` is set for students, who also learn whether they applied
    pub fn new(job: Job, viewer: Option<Uuid>) -> Self {
        let show_pay = job.show_pay_in_listing;
        let pay_label = show_pay.then(|| job.pay_label());
        let user_has_applied = viewer.map(|id| job.applicants.contains(&id));
        Self {
            id: job.id,
            job_title: job.job_title,
            company: job.company,
            job_type: job.job_type,
            work_arrangement: job.work_arrangement,
            location: job.location,
            min_pay: job.min_pay.filter(|_| show_pay),
            max_pay: job.max_pay.filter(|_| show_pay),
            pay_label,
            job_description: job.job_description,
            requirements: job.requirements,
            application_deadline: job.application_deadline,
            applications: job.applications,
            view_count: job.view_count,
            date_created: job.date_created,
            user_has_applied,
        }
    }
}

/// "Unpaid", "$a - $b", "From $a" or "Up to $b". Zero counts as not set.
pub fn format_pay_range(min: Option<f64>, max: Option<f64>) -> String {
    let min = min.filter(|v| *v != 0.0);
    let max = max.filter(|v| *v != 0.0);
    match (min, max) {
        (None, None) => "Unpaid".to_string(),
        (Some(a), Some(b)) => format!("${} - ${}", group_thousands(a), group_thousands(b)),
        (Some(a), None) => format!("From ${}", group_thousands(a)),
        (None, Some(b)) => format!("Up to ${}", group_thousands(b)),
    }
}

fn group_thousands(value: f64) -> String {
    let rendered = if value.fract() == 0.0 { format!("{:.0}", value) } else { format!("{:.2}", value) };
    let (sign, rest) = rendered.strip_prefix('-').map_or(("", rendered.as_str()), |r| ("-", r));
    let (int_part, frac_part) = rest.split_once('.').map_or((rest, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
