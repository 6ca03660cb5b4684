//! Form rules shared by the job and profile editors.
//!
//! Every rule set runs in a fixed order and stops at the first failure, which
//! names the offending field so the page can focus it.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::profile::DEFAULT_PROJECT_ICON;
use crate::models::{EntryDetails, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub field: &'static str,
    pub message: String,
}

impl ValidationFailure {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Raw job form as posted by the create/edit pages
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobForm {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub job_type: Option<String>,
    pub work_arrangement: Option<String>,
    pub location: Option<String>,
    pub min_pay: Option<f64>,
    pub max_pay: Option<f64>,
    pub show_pay_in_listing: Option<bool>,
    pub job_description: Option<String>,
    pub requirements: Option<String>,
    pub application_deadline: Option<String>,
}

/// Job fields that passed every rule, trimmed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidJob {
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
}

const REQUIRED_JOB_FIELDS: [(&str, &str); 5] = [
    ("jobTitle", "Job Title"),
    ("company", "Company"),
    ("jobType", "Job Type"),
    ("workArrangement", "Work Arrangement"),
    ("jobDescription", "Job Description"),
];

pub fn validate_job_form(form: JobForm, today: NaiveDate) -> Result<ValidJob, ValidationFailure> {
    let job_title = clean(form.job_title);
    let company = clean(form.company);
    let job_type = clean(form.job_type);
    let work_arrangement = clean(form.work_arrangement);
    let job_description = clean(form.job_description);

    let present = [&job_title, &company, &job_type, &work_arrangement, &job_description];
    for ((field, label), value) in REQUIRED_JOB_FIELDS.iter().zip(present) {
        if value.is_none() {
            return Err(ValidationFailure::new(*field, format!("{} is required. Please make a selection.", label)));
        }
    }

    // All five are present past the loop above
    let (Some(job_title), Some(company), Some(job_type), Some(work_arrangement), Some(job_description)) =
        (job_title, company, job_type, work_arrangement, job_description)
    else {
        return Err(ValidationFailure::new("jobTitle", "Job Title is required. Please make a selection."));
    };

    if job_title.chars().count() < 3 {
        return Err(ValidationFailure::new("jobTitle", "Job Title must be at least 3 characters long."));
    }
    if company.chars().count() < 2 {
        return Err(ValidationFailure::new("company", "Company name must be at least 2 characters long."));
    }
    if job_description.chars().count() < 20 {
        return Err(ValidationFailure::new("jobDescription", "Job Description must be at least 20 characters long."));
    }

    if let (Some(min), Some(max)) = (form.min_pay, form.max_pay) {
        if min > max {
            return Err(ValidationFailure::new("minPay", "Minimum pay cannot be greater than maximum pay."));
        }
        if min < 0.0 || max < 0.0 {
            return Err(ValidationFailure::new("minPay", "Pay rates cannot be negative."));
        }
    }

    let application_deadline = match clean(form.application_deadline) {
        None => None,
        Some(raw) => {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| ValidationFailure::new("applicationDeadline", "Application deadline must be a valid date."))?;
            if date < today {
                return Err(ValidationFailure::new("applicationDeadline", "Application deadline cannot be in the past."));
            }
            Some(date)
        }
    };

    Ok(ValidJob {
        job_title,
        company,
        job_type,
        work_arrangement,
        location: clean(form.location),
        min_pay: form.min_pay,
        max_pay: form.max_pay,
        show_pay_in_listing: form.show_pay_in_listing.unwrap_or(true),
        job_description,
        requirements: clean(form.requirements),
        application_deadline,
    })
}

/// Trim and enforce the required fields of one profile entry
pub fn validate_entry(details: EntryDetails) -> Result<EntryDetails, ValidationFailure> {
    Ok(match details {
        EntryDetails::Education(mut e) => {
            e.school = required(e.school, "school", "School name is required.")?;
            e.degree = clean(e.degree);
            e.start_date = clean(e.start_date);
            e.end_date = clean(e.end_date);
            e.gpa = clean(e.gpa);
            e.description = clean(e.description);
            EntryDetails::Education(e)
        }
        EntryDetails::Experience(mut e) => {
            e.title = required(e.title, "title", "Job title is required.")?;
            e.company = required(e.company, "company", "Company is required.")?;
            e.start_date = required(e.start_date, "startDate", "Start date is required.")?;
            e.end_date = required(e.end_date, "endDate", "End date is required.")?;
            e.location = clean(e.location);
            e.description = clean(e.description);
            e.logo_url = clean(e.logo_url);
            EntryDetails::Experience(e)
        }
        EntryDetails::Project(mut p) => {
            p.name = required(p.name, "name", "Project name is required.")?;
            p.description = required(p.description, "description", "Project description is required.")?;
            p.kind = clean(p.kind);
            p.start_date = clean(p.start_date);
            p.end_date = clean(p.end_date);
            p.link = clean(p.link);
            p.icon = clean(p.icon).or_else(|| Some(DEFAULT_PROJECT_ICON.to_string()));
            EntryDetails::Project(p)
        }
        EntryDetails::Accomplishment(mut a) => {
            a.title = required(a.title, "title", "Title is required.")?;
            a.date = required(a.date, "date", "Date is required.")?;
            a.description = clean(a.description);
            EntryDetails::Accomplishment(a)
        }
    })
}

/// Inline-editable profile fields. A present but blank value clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileFields {
    pub display_name: Option<String>,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
}

impl ProfileFields {
    pub fn apply(self, user: &mut User) {
        let targets = [
            (self.display_name, &mut user.display_name),
            (self.headline, &mut user.headline),
            (self.about, &mut user.about),
            (self.phone, &mut user.phone),
            (self.location, &mut user.location),
            (self.linkedin, &mut user.linkedin),
            (self.website, &mut user.website),
        ];
        for (value, slot) in targets {
            if value.is_some() {
                *slot = clean(value);
            }
        }
    }
}

/// Skills arrive either as the raw comma-separated input or as a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    Text(String),
    List(Vec<String>),
}

pub fn parse_skills(input: SkillsInput) -> Vec<String> {
    let parts: Vec<String> = match input {
        SkillsInput::Text(raw) => raw.split(',').map(str::to_string).collect(),
        SkillsInput::List(list) => list,
    };
    parts
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

const COMPLETION_FIELDS: usize = 8;
const COMPLETION_TOTAL: usize = COMPLETION_FIELDS + 3;

/// Percentage of the 11 completion items filled: eight profile fields plus
/// having education, experience and skills.
pub fn profile_completion(user: &User, has_education: bool, has_experience: bool) -> u8 {
    let fields = [
        &user.display_name,
        &user.headline,
        &user.photo_url,
        &user.about,
        &user.phone,
        &user.location,
        &user.linkedin,
        &user.website,
    ];
    let completed = fields.iter().filter(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty())).count()
        + usize::from(has_education)
        + usize::from(has_experience)
        + usize::from(!user.skills.is_empty());
    ((completed as f64 / COMPLETION_TOTAL as f64) * 100.0).round() as u8
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required(value: String, field: &'static str, message: &str) -> Result<String, ValidationFailure> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationFailure::new(field, message));
    }
    Ok(trimmed.to_string())
}
