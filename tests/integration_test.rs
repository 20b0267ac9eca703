use fieldops::{
    config::AppConfig,
    db::{self, client_queries, job_queries, quote_queries},
    models::job::{JobListParams, LineItemInput},
    models::status::{self, JobStatus, QuoteStatus},
};
use chrono::{Duration, Utc};

/// Integration test: full CRM data flow.
///
/// Exercises:
/// 1. Database connection and schema
/// 2. Client creation
/// 3. Quote lifecycle (draft → sent → approved) through the status policy
/// 4. Job creation, listing and the schedule write with derived status
///
/// Note: requires a running PostgreSQL instance configured via
/// environment variables.
#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_full_integration() {
    let config = AppConfig::from_env().expect("Failed to load config");

    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run migrations");

    // 1. Create a client
    let client = client_queries::create_client(
        &db_pool,
        "Integration Test Client",
        Some("it@example.com"),
        Some("+5511999990000"),
        Some("Av. Paulista 1000, São Paulo"),
    )
    .await
    .expect("Failed to create client");

    // 2. Quote lifecycle
    let line_items = vec![LineItemInput {
        description: "Site survey".to_string(),
        quantity: 1.0,
        unit_price_cents: 25_000,
    }];
    let quote = quote_queries::create_quote(&db_pool, client.id, "Fence repair", &line_items)
        .await
        .expect("Failed to create quote");

    assert_eq!(quote.status, "draft");
    assert_eq!(quote.total_cents, 25_000);

    assert!(status::can_transition_quote_status(&quote.status, "sent"));
    quote_queries::update_quote_status(&db_pool, quote.id, QuoteStatus::Sent)
        .await
        .expect("Failed to send quote");

    let sent = quote_queries::get_quote(&db_pool, quote.id)
        .await
        .expect("Failed to fetch quote")
        .expect("Quote disappeared");
    assert_eq!(sent.status, "sent");
    assert!(sent.sent_at.is_some());

    // Illegal move is caught by the policy before any write happens.
    assert!(!status::can_transition_quote_status("approved", "draft"));

    quote_queries::update_quote_status(&db_pool, quote.id, QuoteStatus::Approved)
        .await
        .expect("Failed to approve quote");

    // 3. Job creation and scheduling
    let job = job_queries::create_job(
        &db_pool,
        client.id,
        "Fence repair",
        Some("Replace two posts"),
        Some("Av. Paulista 1000, São Paulo"),
        Some(120),
        &line_items,
    )
    .await
    .expect("Failed to create job");

    assert_eq!(job.status, "quote");
    assert_eq!(job.total_cents, 25_000);
    assert!(job.scheduled_at.is_none());

    let when = Utc::now() + Duration::days(2);
    let derived = status::status_for_scheduling(&job.status);
    assert_eq!(derived, JobStatus::WaitingSchedule);
    job_queries::schedule_job(&db_pool, job.id, when, derived)
        .await
        .expect("Failed to schedule job");

    let scheduled = job_queries::get_job(&db_pool, job.id)
        .await
        .expect("Failed to fetch job")
        .expect("Job disappeared");
    assert_eq!(scheduled.status, "waiting_schedule");
    assert!(scheduled.scheduled_at.is_some());

    // Scheduling again confirms the job.
    let derived = status::status_for_scheduling(&scheduled.status);
    assert_eq!(derived, JobStatus::WaitingExecution);
    job_queries::schedule_job(&db_pool, job.id, when, derived)
        .await
        .expect("Failed to reschedule job");

    // 4. Listing with a status filter
    let params = JobListParams {
        status: Some("waiting_execution".to_string()),
        order_by: Some("scheduled_at".to_string()),
        order: Some("asc".to_string()),
    };
    let listed = job_queries::list_jobs(&db_pool, &params)
        .await
        .expect("Failed to list jobs");
    assert!(listed.iter().any(|j| j.id == job.id));

    // Line items survived the round trip.
    let items = job_queries::get_line_items(&db_pool, job.id)
        .await
        .expect("Failed to fetch line items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].description, "Site survey");
}
