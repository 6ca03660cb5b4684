mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use careerbridge::models::Role;
use common::{As, TestApp};

#[tokio::test]
async fn profile_starts_mostly_empty() -> Result<()> {
    let app = TestApp::new();
    let student = app.user(Role::Student, "Sam Student").await?;

    let res = app.get("/api/profile", As::Token(&student)).await?;

    assert_eq!(res.status, StatusCode::OK);
    // Only the display name is filled: round(1 / 11 * 100)
    assert_eq!(res.data()["completion"], 9);
    assert_eq!(res.data()["education"], json!([]));
    Ok(())
}

#[tokio::test]
async fn inline_edits_and_skills_raise_completion() -> Result<()> {
    let app = TestApp::new();
    let student = app.user(Role::Student, "Sam Student").await?;

    let res = app
        .send(
            Method::PATCH,
            "/api/profile",
            As::Token(&student),
            Some(json!({ "headline": "  CS junior  ", "phone": "555-0100" })),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["profile"]["user"]["headline"], "CS junior");
    assert_eq!(res.notice()["message"], "Data saved successfully!");

    let res = app
        .send(
            Method::PUT,
            "/api/profile/skills",
            As::Token(&student),
            Some(json!({ "skills": "Rust, , SQL ,Git" })),
        )
        .await?;
    assert_eq!(res.data()["profile"]["user"]["skills"], json!(["Rust", "SQL", "Git"]));
    // name, headline, phone and skills: round(4 / 11 * 100)
    assert_eq!(res.data()["profile"]["completion"], 36);
    Ok(())
}

#[tokio::test]
async fn photo_and_resume_references() -> Result<()> {
    let app = TestApp::new();
    let student = app.user(Role::Student, "Sam Student").await?;

    let res = app
        .send(
            Method::PUT,
            "/api/profile/photo",
            As::Token(&student),
            Some(json!({ "photoURL": "https://files.example.com/sam.png" })),
        )
        .await?;
    assert_eq!(res.notice()["message"], "Profile picture updated successfully!");
    assert_eq!(res.data()["profile"]["user"]["photoURL"], "https://files.example.com/sam.png");

    let res = app
        .send(
            Method::PUT,
            "/api/profile/resume",
            As::Token(&student),
            Some(json!({ "resumeUrl": "https://files.example.com/sam.pdf", "resumeFilename": "sam.pdf" })),
        )
        .await?;
    assert_eq!(res.notice()["message"], "Resume uploaded successfully!");
    assert_eq!(res.data()["profile"]["user"]["resumeFilename"], "sam.pdf");
    Ok(())
}

#[tokio::test]
async fn entries_are_added_edited_and_removed() -> Result<()> {
    let app = TestApp::new();
    let student = app.user(Role::Student, "Sam Student").await?;

    let res = app
        .post(
            "/api/profile/projects",
            As::Token(&student),
            json!({ "name": "Course Planner", "type": "Personal", "description": "Plans semesters" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    let project = &res.data()["profile"]["projects"][0];
    assert_eq!(project["icon"], "fas fa-code");
    let id = project["id"].as_str().unwrap_or_default().to_string();

    let res = app
        .send(
            Method::PUT,
            &format!("/api/profile/projects/{}", id),
            As::Token(&student),
            Some(json!({ "name": "Course Planner v2", "description": "Plans semesters" })),
        )
        .await?;
    assert_eq!(res.data()["profile"]["projects"][0]["name"], "Course Planner v2");

    let res = app
        .send(Method::DELETE, &format!("/api/profile/projects/{}", id), As::Token(&student), None)
        .await?;
    assert_eq!(res.notice()["message"], "Project removed successfully!");
    assert_eq!(res.data()["profile"]["projects"], json!([]));
    Ok(())
}

#[tokio::test]
async fn entry_required_fields_and_ownership() -> Result<()> {
    let app = TestApp::new();
    let student = app.user(Role::Student, "Sam Student").await?;
    let other = app.user(Role::Student, "Olly Other").await?;

    let res = app
        .post("/api/profile/experience", As::Token(&student), json!({ "title": "Intern", "company": "Acme" }))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field"], "startDate");

    let res = app
        .post("/api/profile/education", As::Token(&student), json!({ "school": "State University" }))
        .await?;
    let id = res.data()["profile"]["education"][0]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(res.data()["profile"]["education"][0]["school"], "State University");

    let res = app
        .send(Method::DELETE, &format!("/api/profile/education/{}", id), As::Token(&other), None)
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.post("/api/profile/hobbies", As::Token(&student), json!({})).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn employers_cannot_edit_student_profiles() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;

    let res = app.get("/api/profile", As::Token(&employer)).await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}
