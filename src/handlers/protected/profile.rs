// handlers/protected/profile.rs - Student profile editors
//
// Every write answers with the whole profile and its completion percentage,
// so the page redraws from stored state.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gate::Principal;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{now, EntryDetails, ProfileEntry, Section, User};
use crate::state::AppState;
use crate::validation::{parse_skills, profile_completion, validate_entry, ProfileFields, SkillsInput};

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub user: User,
    pub education: Vec<ProfileEntry>,
    pub experience: Vec<ProfileEntry>,
    pub projects: Vec<ProfileEntry>,
    pub accomplishments: Vec<ProfileEntry>,
    pub completion: u8,
}

#[derive(Debug, Serialize)]
pub struct ProfileSaved {
    pub profile: ProfileView,
}

#[derive(Debug, Deserialize)]
pub struct SkillsBody {
    pub skills: SkillsInput,
}

#[derive(Debug, Deserialize)]
pub struct PhotoBody {
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeBody {
    pub resume_url: String,
    pub resume_filename: Option<String>,
}

/// GET /api/profile - the student's record, entries and completion
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<ProfileView> {
    let user = student_record(&state, &principal).await?;
    Ok(ApiResponse::success(load_profile(&state, user).await?))
}

/// PATCH /api/profile - inline field edits
pub async fn profile_patch(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(fields): Json<ProfileFields>,
) -> ApiResult<ProfileSaved> {
    let mut user = student_record(&state, &principal).await?;
    fields.apply(&mut user);
    save_user(&state, user, "Data saved successfully!").await
}

/// PUT /api/profile/skills - comma-separated string or list
pub async fn skills_put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<SkillsBody>,
) -> ApiResult<ProfileSaved> {
    let mut user = student_record(&state, &principal).await?;
    user.skills = parse_skills(body.skills);
    save_user(&state, user, "Data saved successfully!").await
}

/// PUT /api/profile/photo - store the uploaded picture's URL
pub async fn photo_put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<PhotoBody>,
) -> ApiResult<ProfileSaved> {
    let url = non_blank(body.photo_url, "photoURL", "A picture URL is required.")?;
    let mut user = student_record(&state, &principal).await?;
    user.photo_url = Some(url);
    save_user(&state, user, "Profile picture updated successfully!").await
}

/// PUT /api/profile/resume - store the uploaded resume's URL and file name
pub async fn resume_put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<ResumeBody>,
) -> ApiResult<ProfileSaved> {
    let url = non_blank(body.resume_url, "resumeUrl", "A resume URL is required.")?;
    let mut user = student_record(&state, &principal).await?;
    user.resume_url = Some(url);
    user.resume_filename = body.resume_filename.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    save_user(&state, user, "Resume uploaded successfully!").await
}

/// POST /api/profile/:section - add an education, experience, project or accomplishment
pub async fn entry_post(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(section): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<ProfileSaved> {
    let section = parse_section(&section)?;
    let user = student_record(&state, &principal).await?;

    let entry = ProfileEntry::new(user.id, entry_details(section, body)?);
    state.store.insert_entry(&entry).await?;
    tracing::debug!("Student {} added {} entry {}", user.id, section, entry.id);

    saved(&state, user, "Data saved successfully!").await
}

/// PUT /api/profile/:section/:id - replace one of the student's entries
pub async fn entry_put(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((section, id)): Path<(String, Uuid)>,
    Json(body): Json<Value>,
) -> ApiResult<ProfileSaved> {
    let section = parse_section(&section)?;
    let user = student_record(&state, &principal).await?;
    let mut entry = owned_entry(&state, &user, section, id).await?;

    entry.details = entry_details(section, body)?;
    entry.updated_at = now();
    state.store.update_entry(&entry).await?;

    saved(&state, user, "Data saved successfully!").await
}

/// DELETE /api/profile/:section/:id - remove one of the student's entries
pub async fn entry_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((section, id)): Path<(String, Uuid)>,
) -> ApiResult<ProfileSaved> {
    let section = parse_section(&section)?;
    let user = student_record(&state, &principal).await?;
    owned_entry(&state, &user, section, id).await?;

    if !state.store.delete_entry(section, id).await? {
        return Err(ApiError::not_found("Entry not found."));
    }
    saved(&state, user, section.removed_message()).await
}

async fn student_record(state: &AppState, principal: &Principal) -> Result<User, ApiError> {
    state
        .store
        .get_user(principal.id())
        .await?
        .ok_or_else(|| ApiError::not_found("Student profile not found."))
}

async fn load_profile(state: &AppState, user: User) -> Result<ProfileView, ApiError> {
    let education = state.store.list_entries(Section::Education, user.id).await?;
    let experience = state.store.list_entries(Section::Experience, user.id).await?;
    let projects = state.store.list_entries(Section::Projects, user.id).await?;
    let accomplishments = state.store.list_entries(Section::Accomplishments, user.id).await?;
    let completion = profile_completion(&user, !education.is_empty(), !experience.is_empty());

    Ok(ProfileView {
        user,
        education,
        experience,
        projects,
        accomplishments,
        completion,
    })
}

async fn save_user(state: &AppState, mut user: User, message: &str) -> ApiResult<ProfileSaved> {
    user.updated_at = now();
    state.store.update_user(&user).await?;
    saved(state, user, message).await
}

async fn saved(state: &AppState, user: User, message: &str) -> ApiResult<ProfileSaved> {
    let profile = load_profile(state, user).await?;
    Ok(ApiResponse::success(ProfileSaved { profile }).saying(message))
}

async fn owned_entry(state: &AppState, user: &User, section: Section, id: Uuid) -> Result<ProfileEntry, ApiError> {
    match state.store.get_entry(section, id).await? {
        Some(entry) if entry.student_id == user.id => Ok(entry),
        Some(_) => Err(ApiError::forbidden("You can only edit your own profile.")),
        None => Err(ApiError::not_found("Entry not found.")),
    }
}

fn parse_section(segment: &str) -> Result<Section, ApiError> {
    Section::from_path(segment).ok_or_else(|| ApiError::not_found(format!("Unknown profile section '{}'", segment)))
}

fn entry_details(section: Section, body: Value) -> Result<EntryDetails, ApiError> {
    let details = EntryDetails::from_json(section, body).map_err(|e| {
        tracing::debug!("Rejected {} entry body: {}", section, e);
        ApiError::bad_request(format!("Invalid {} entry", section))
    })?;
    Ok(validate_entry(details)?)
}

fn non_blank(value: String, field: &str, message: &str) -> Result<String, ApiError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ApiError::validation_error(message, Some(field)));
    }
    Ok(value)
}
