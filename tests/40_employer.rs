mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::{json, Value};

use careerbridge::models::{now, JobStatus, Role};
use careerbridge::store::Store;
use common::{As, TestApp};

fn job_form() -> Value {
    json!({
        "jobTitle": "Frontend Intern",
        "company": "Acme Corp",
        "jobType": "Internship",
        "workArrangement": "Hybrid",
        "location": "Denver, CO",
        "minPay": 20,
        "maxPay": 28,
        "jobDescription": "Help build the careers site in a small product team."
    })
}

fn with(mut form: Value, key: &str, value: Value) -> Value {
    form[key] = value;
    form
}

#[tokio::test]
async fn create_job_goes_to_review() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;

    let res = app.post("/api/employer/jobs", As::Demo(&employer), job_form()).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.data()["job"]["status"], "Pending");
    assert_eq!(res.data()["job"]["applications"], 0);
    assert_eq!(res.data()["redirect"], "employer.html");
    assert_eq!(
        res.notice()["message"],
        "Job listing created successfully! It will be reviewed by an admin before being published."
    );

    let mine = app.get("/api/employer/jobs", As::Demo(&employer)).await?;
    assert_eq!(mine.data()["jobs"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn short_title_is_rejected_on_its_field() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;

    let res = app
        .post("/api/employer/jobs", As::Demo(&employer), with(job_form(), "jobTitle", json!("AB")))
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(res.body["field"], "jobTitle");
    assert!(res.body["message"]
        .as_str()
        .is_some_and(|m| m.starts_with("Job Title must be at least 3 characters")));
    Ok(())
}

#[tokio::test]
async fn min_pay_above_max_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;
    let form = with(with(job_form(), "minPay", json!(50)), "maxPay", json!(20));

    let res = app.post("/api/employer/jobs", As::Demo(&employer), form).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field"], "minPay");
    assert_eq!(res.body["message"], "Minimum pay cannot be greater than maximum pay.");
    Ok(())
}

#[tokio::test]
async fn past_deadline_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;
    let yesterday = (now() - Duration::days(1)).date_naive().format("%Y-%m-%d").to_string();

    let res = app
        .post("/api/employer/jobs", As::Demo(&employer), with(job_form(), "applicationDeadline", json!(yesterday)))
        .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["field"], "applicationDeadline");
    Ok(())
}

#[tokio::test]
async fn editing_an_approved_job_sends_it_back_to_review() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;
    let job = app.job(&employer, "Backend Intern", JobStatus::Approved, 1).await?;

    let res = app
        .send(Method::PUT, &format!("/api/employer/jobs/{}", job.id), As::Demo(&employer), Some(job_form()))
        .await?;

    assert_eq!(res.status, StatusCode::OK);
    let stored = app.store.get_job(job.id).await?;
    assert_eq!(stored.as_ref().map(|j| j.status), Some(JobStatus::Pending));
    assert_eq!(stored.map(|j| j.job_title), Some("Frontend Intern".to_string()));
    Ok(())
}

#[tokio::test]
async fn only_the_owner_may_edit() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Employer, "Erin Employer").await?;
    let other = app.user(Role::Employer, "Olly Other").await?;
    let job = app.job(&owner, "Backend Intern", JobStatus::Approved, 1).await?;

    let res = app
        .send(Method::PUT, &format!("/api/employer/jobs/{}", job.id), As::Demo(&other), Some(job_form()))
        .await?;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn applications_flow_to_the_employer() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;
    let mut student = app.user(Role::Student, "Sam Student").await?;
    student.resume_url = Some("https://files.example.com/sam.pdf".to_string());
    app.store.update_user(&student).await?;
    let job = app.job(&employer, "Backend Intern", JobStatus::Approved, 1).await?;

    app.post(&format!("/api/jobs/{}/apply", job.id), As::Demo(&student), json!({})).await?;

    let res = app.get("/api/employer/applications", As::Demo(&employer)).await?;
    let applications = res.data()["applications"].as_array().cloned().unwrap_or_default();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0]["studentName"], "Sam Student");
    assert_eq!(applications[0]["status"], "Pending");
    assert_eq!(applications[0]["resumeUrl"], "https://files.example.com/sam.pdf");

    let id = applications[0]["id"].as_str().unwrap_or_default().to_string();
    let uri = format!("/api/employer/applications/{}", id);

    let res = app
        .send(Method::PATCH, &uri, As::Demo(&employer), Some(json!({ "status": "Interview" })))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["application"]["status"], "Interview");
    assert_eq!(res.notice()["message"], "Application status updated successfully!");

    let res = app
        .send(Method::PATCH, &uri, As::Demo(&employer), Some(json!({ "status": "Pending" })))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let stranger = app.user(Role::Employer, "Olly Other").await?;
    let res = app
        .send(Method::PATCH, &uri, As::Demo(&stranger), Some(json!({ "status": "Rejected" })))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn resume_lookup() -> Result<()> {
    let app = TestApp::new();
    let employer = app.user(Role::Employer, "Erin Employer").await?;
    let student = app.user(Role::Student, "Sam Student").await?;

    let res = app
        .get(&format!("/api/employer/students/{}/resume", student.id), As::Demo(&employer))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.notice()["severity"], "info");
    assert_eq!(res.notice()["message"], "This student has not uploaded a resume yet.");

    let res = app
        .get(&format!("/api/employer/students/{}/resume", uuid::Uuid::new_v4()), As::Demo(&employer))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Student profile not found.");
    Ok(())
}

#[tokio::test]
async fn owner_deletes_own_job_only() -> Result<()> {
    let app = TestApp::new();
    let owner = app.user(Role::Employer, "Erin Employer").await?;
    let other = app.user(Role::Employer, "Olly Other").await?;
    let job = app.job(&owner, "Backend Intern", JobStatus::Pending, 1).await?;
    let uri = format!("/api/employer/jobs/{}", job.id);

    let res = app.send(Method::DELETE, &uri, As::Demo(&other), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.send(Method::DELETE, &uri, As::Demo(&owner), None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.notice()["message"], "Job listing deleted successfully!");
    assert!(app.store.get_job(job.id).await?.is_none());
    Ok(())
}
