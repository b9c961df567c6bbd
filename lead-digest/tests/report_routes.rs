//! Report routes driven end to end with in-memory collaborators

use std::sync::Arc;

use axum_test::TestServer;
use http::StatusCode;
use lead_digest::config::DigestConfig;
use lead_digest::db::{JobPosting, LeadActivity};
use lead_digest::handlers;
use lead_digest::pipeline::ReportPipeline;
use lead_digest::state::AppState;
use lead_digest::testing::{InMemoryReportSource, RecordingMailer};
use serde_json::Value;

fn config() -> DigestConfig {
    let mut config = DigestConfig::default();
    config.service.name = "lead-digest-test".to_string();
    config.mail.sender = "support@example.com".to_string();
    config.mail.recipient = "ops@example.com".to_string();
    config.mail.cc = vec![
        "lead@example.com".to_string(),
        "manager@example.com".to_string(),
    ];
    config
}

fn server(source: InMemoryReportSource, mailer: &RecordingMailer) -> TestServer {
    let pipeline = ReportPipeline::new(
        Arc::new(config()),
        Arc::new(source),
        Arc::new(mailer.clone()),
    );
    TestServer::new(handlers::router(AppState::new(pipeline))).unwrap()
}

fn linkedin_job(company: &str, title: &str) -> JobPosting {
    JobPosting {
        company: Some(company.to_string()),
        title: Some(title.to_string()),
        url: Some(format!("https://jobs.example/{title}")),
        company_url: Some(format!("https://companies.example/{company}")),
        poster_full_name: Some("Bea Poster".to_string()),
        posted_by_profile: Some("https://profiles.example/bea".to_string()),
        source: Some("LINKEDIN".to_string()),
    }
}

fn lead(name: &str, jobs_today: i64) -> LeadActivity {
    LeadActivity {
        lead_name: Some(name.to_string()),
        lead_email: Some(format!("{name}@example.com")),
        external_id: Some(format!("ext-{name}")),
        jobs_today,
    }
}

// Older escapers also encode `/`
fn body_text(html: Option<&str>) -> String {
    html.unwrap_or_default().replace("&#x2f;", "/")
}

#[tokio::test]
async fn test_root_reports_service_status() {
    let mailer = RecordingMailer::new();
    let server = server(InMemoryReportSource::new(), &mailer);

    let response = server.get("/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "lead-digest-test");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_empty_result_sends_no_mail() {
    let mailer = RecordingMailer::new();
    let server = server(InMemoryReportSource::new(), &mailer);

    let response = server
        .post("/reports/job-postings")
        .add_query_param("date", "2026-10-18")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["jobs_count"], 0);
    assert_eq!(body["email_sent"], false);
    assert!(body.get("email_sent_to").is_none());
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_job_postings_send_one_email() {
    let mailer = RecordingMailer::new();
    let mut other_source = linkedin_job("Initech", "Analyst");
    other_source.source = Some("INDEED".to_string());
    let mut no_profile = linkedin_job("Hooli", "Engineer");
    no_profile.posted_by_profile = Some(String::new());
    let source = InMemoryReportSource::new().with_jobs(vec![
        linkedin_job("Acme", "Engineer"),
        linkedin_job("Globex", "Designer"),
        other_source,
        no_profile,
    ]);
    let server = server(source, &mailer);

    let response = server.post("/reports/job-postings").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["jobs_count"], 2);
    assert_eq!(body["jobs"].as_array().unwrap().len(), 2);
    assert_eq!(body["email_sent"], true);
    assert_eq!(body["email_sent_to"], "ops@example.com");

    assert_eq!(mailer.sent_count(), 1);
    let email = mailer.last().unwrap();
    assert_eq!(email.to.as_deref(), Some("ops@example.com"));
    assert_eq!(email.cc, vec!["lead@example.com", "manager@example.com"]);
    assert!(email.subject.unwrap().contains("2 Job Posting(s)"));
    let html = body_text(email.html.as_deref());
    assert!(html.contains("Total job postings: 2"));
    assert!(html.contains("Acme"));
    assert!(!html.contains("Initech"));
    assert!(email.attachment.is_none());
}

#[tokio::test]
async fn test_legacy_path_is_an_alias() {
    let mailer = RecordingMailer::new();
    let source = InMemoryReportSource::new().with_jobs(vec![linkedin_job("Acme", "Engineer")]);
    let server = server(source, &mailer);

    let response = server.post("/get-linkedin-jobs").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["jobs_count"], 1);
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_missing_fields_render_placeholders() {
    let mailer = RecordingMailer::new();
    let source = InMemoryReportSource::new().with_jobs(vec![JobPosting {
        posted_by_profile: Some("https://profiles.example/anon".to_string()),
        source: Some("LINKEDIN".to_string()),
        ..JobPosting::default()
    }]);
    let server = server(source, &mailer);

    server.post("/reports/job-postings").await.assert_status_ok();

    let html = body_text(mailer.last().unwrap().html.as_deref());
    assert!(html.contains(r##"<a href="#" target="_blank">N/A</a>"##));
}

#[tokio::test]
async fn test_lead_shortfall_end_to_end() {
    let mailer = RecordingMailer::new();
    let source = InMemoryReportSource::new().with_leads(vec![
        lead("carol", 59),
        lead("alice", 10),
        lead("dave", 75),
        lead("bob", 20),
    ]);
    let server = server(source, &mailer);

    let response = server
        .post("/reports/lead-shortfall")
        .add_query_param("threshold", "60")
        .add_query_param("date", "2026-10-18")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["leads_count"], 3);
    assert_eq!(body["threshold"], 60);
    assert_eq!(body["report_date"], "2026-10-18");

    let leads = body["leads"].as_array().unwrap();
    let counts: Vec<i64> = leads.iter().map(|l| l["jobs_today"].as_i64().unwrap()).collect();
    let shortfalls: Vec<i64> = leads.iter().map(|l| l["shortfall"].as_i64().unwrap()).collect();
    assert_eq!(counts, vec![10, 20, 59]);
    assert_eq!(shortfalls, vec![50, 40, 1]);

    assert_eq!(mailer.sent_count(), 1);
    let html = body_text(mailer.last().unwrap().html.as_deref());
    assert!(html.contains("Total leads below target: 3"));
    assert!(html.find("alice").unwrap() < html.find("carol").unwrap());
}

#[tokio::test]
async fn test_configured_threshold_applies_by_default() {
    let mailer = RecordingMailer::new();
    let source = InMemoryReportSource::new().with_leads(vec![lead("alice", 59), lead("bob", 60)]);
    let server = server(source, &mailer);

    let body: Value = server.post("/reports/lead-shortfall").await.json();

    assert_eq!(body["threshold"], 60);
    assert_eq!(body["leads_count"], 1);
}

#[tokio::test]
async fn test_high_volume_posters_attach_spreadsheet() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.reports.output_dir = dir.path().to_path_buf();

    let mailer = RecordingMailer::new();
    let source = InMemoryReportSource::new().with_high_volume(vec![
        linkedin_job("Acme", "Engineer"),
        linkedin_job("Acme", "Designer"),
        linkedin_job("Globex", "Writer"),
    ]);
    let pipeline = ReportPipeline::new(Arc::new(config), Arc::new(source), Arc::new(mailer.clone()));
    let server = TestServer::new(handlers::router(AppState::new(pipeline))).unwrap();

    let response = server.post("/reports/high-volume-posters").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["posters_count"], 1);
    assert_eq!(body["jobs_count"], 3);
    assert_eq!(body["posters"][0]["distinct_titles"], 3);

    let attachment = mailer.last().unwrap().attachment.unwrap();
    assert!(attachment.name.starts_with("high_volume_posters_"));
    assert!(dir.path().join(&attachment.name).exists());
}

#[tokio::test]
async fn test_oversized_threshold_is_bad_request() {
    let mailer = RecordingMailer::new();
    let source = InMemoryReportSource::new().with_leads(vec![lead("alice", 0), lead("bob", 1)]);
    let server = server(source, &mailer);

    let response = server
        .post("/reports/lead-shortfall")
        .add_query_param("threshold", i64::MAX.to_string())
        .expect_failure()
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["stage"], "request");
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_invalid_date_is_bad_request() {
    let mailer = RecordingMailer::new();
    let server = server(InMemoryReportSource::new(), &mailer);

    let response = server
        .post("/reports/job-postings")
        .add_query_param("date", "18/10/2026")
        .expect_failure()
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["stage"], "request");
}

#[tokio::test]
async fn test_database_failure_is_reported_with_stage() {
    let mailer = RecordingMailer::new();
    let server = server(InMemoryReportSource::new().unavailable(), &mailer);

    let response = server
        .post("/reports/lead-shortfall")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["stage"], "database");
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_health_reports_database_outage() {
    let mailer = RecordingMailer::new();
    let server = server(InMemoryReportSource::new().unavailable(), &mailer);

    let response = server.get("/health").expect_failure().await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["components"]["database"]["status"], "unhealthy");
    assert_eq!(body["components"]["application"]["status"], "healthy");
}
