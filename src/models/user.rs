use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Employer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    /// Landing page for this role when it is turned away from another page
    pub fn home_page(&self) -> &'static str {
        match self {
            Role::Student => "jobs.html",
            Role::Employer => "employer.html",
            Role::Admin => "admin.html",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "employer" => Ok(Role::Employer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub resume_filename: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub company_name: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Basic record written at sign-up
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: None,
            role,
            headline: None,
            about: None,
            phone: None,
            location: None,
            linkedin: None,
            website: None,
            skills: vec![],
            resume_url: None,
            resume_filename: None,
            photo_url: None,
            company_name: None,
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display name, falling back to the email address
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}
