use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_PROJECT_ICON: &str = "fas fa-code";

/// The four per-student collections edited from the profile page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Education,
    Experience,
    Projects,
    Accomplishments,
}

impl Section {
    pub const ALL: [Section; 4] = [Section::Education, Section::Experience, Section::Projects, Section::Accomplishments];

    pub fn table(&self) -> &'static str {
        match self {
            Section::Education => "education",
            Section::Experience => "experience",
            Section::Projects => "projects",
            Section::Accomplishments => "accomplishments",
        }
    }

    /// Path segment used by the profile routes
    pub fn from_path(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.table() == segment)
    }

    pub fn removed_message(&self) -> &'static str {
        match self {
            Section::Education => "Education entry removed successfully!",
            Section::Experience => "Experience entry removed successfully!",
            Section::Projects => "Project removed successfully!",
            Section::Accomplishments => "Accomplishment removed successfully!",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub school: String,
    pub degree: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub link: Option<String>,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Accomplishment {
    pub title: String,
    pub date: String,
    pub description: Option<String>,
}

/// Section-specific fields of a profile entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntryDetails {
    Education(Education),
    Experience(Experience),
    Project(Project),
    Accomplishment(Accomplishment),
}

impl EntryDetails {
    /// Decode the fields for `section` from a JSON body or a stored JSONB column
    pub fn from_json(section: Section, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match section {
            Section::Education => EntryDetails::Education(serde_json::from_value(value)?),
            Section::Experience => EntryDetails::Experience(serde_json::from_value(value)?),
            Section::Projects => EntryDetails::Project(serde_json::from_value(value)?),
            Section::Accomplishments => EntryDetails::Accomplishment(serde_json::from_value(value)?),
        })
    }

    pub fn section(&self) -> Section {
        match self {
            EntryDetails::Education(_) => Section::Education,
            EntryDetails::Experience(_) => Section::Experience,
            EntryDetails::Project(_) => Section::Projects,
            EntryDetails::Accomplishment(_) => Section::Accomplishments,
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    pub id: Uuid,
    pub student_id: Uuid,
    #[serde(skip)]
    pub section: Section,
    #[serde(flatten)]
    pub details: EntryDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileEntry {
    pub fn new(student_id: Uuid, details: EntryDetails) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            section: details.section(),
            details,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn section_from_path() {
        assert_eq!(Section::from_path("projects"), Some(Section::Projects));
        assert_eq!(Section::from_path("hobbies"), None);
    }

    #[test]
    fn entry_flattens_section_fields() {
        let details = EntryDetails::from_json(
            Section::Projects,
            json!({ "name": "Scheduler", "type": "Personal", "description": "Course planner" }),
        )
        .unwrap();
        let entry = ProfileEntry::new(Uuid::new_v4(), details);
        let body = serde_json::to_value(&entry).unwrap();
        assert_eq!(body["name"], "Scheduler");
        assert_eq!(body["type"], "Personal");
        assert!(body.get("section").is_none());
        assert!(body.get("studentId").is_some());
    }
}
