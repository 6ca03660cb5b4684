use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::filter::{FilterValue, Filterable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Written by apply; employers move it through the rest
    Pending,
    Submitted,
    Interview,
    Offered,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Offered => "Offered",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Statuses an employer may set
    pub fn employer_settable(&self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ApplicationStatus::Pending),
            "Submitted" => Ok(ApplicationStatus::Submitted),
            "Interview" => Ok(ApplicationStatus::Interview),
            "Offered" => Ok(ApplicationStatus::Offered),
            "Rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub employer_id: Uuid,
    pub job_title: String,
    pub company: String,
    pub student_name: Option<String>,
    pub student_email: String,
    pub status: ApplicationStatus,
    pub date_applied: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Filterable for Application {
    fn field(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(self.id.into()),
            "job_id" => Some(self.job_id.into()),
            "student_id" => Some(self.student_id.into()),
            "employer_id" => Some(self.employer_id.into()),
            "status" => Some(self.status.as_str().into()),
            "date_applied" => Some(self.date_applied.into()),
            _ => None,
        }
    }
}
