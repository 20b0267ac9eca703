//! End-to-end tests against a running API server.
//!
//! These tests require:
//! 1. PostgreSQL running (migrations applied at server startup)
//! 2. The API server running on the configured port
//! 3. Provider URLs configured (geocoding may fall back or fail soft)
//!
//! Run with: cargo test --test e2e_test -- --ignored --nocapture
//!
//! Set API_BASE_URL to override the default (http://localhost:3000)

mod helpers;

use helpers::*;
use serde_json::json;

#[tokio::test]
#[ignore] // Requires running API server and database
async fn test_e2e_health_check() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("health request failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("invalid health body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["database"]["status"], "ok");
}

#[tokio::test]
#[ignore] // Requires running API server and database
async fn test_e2e_job_lifecycle() {
    let client = reqwest::Client::new();
    let base = base_url();

    // Create a client record.
    let created: ClientResponse = client
        .post(format!("{}/api/v1/clients", base))
        .json(&json!({ "name": "E2E Client" }))
        .send()
        .await
        .expect("create client failed")
        .json()
        .await
        .expect("invalid client body");

    // Create a job; it starts in quote status.
    let job: JobBody = client
        .post(format!("{}/api/v1/jobs", base))
        .json(&json!({
            "client_id": created.id,
            "title": "E2E job",
            "line_items": [
                { "description": "Labor", "quantity": 2.0, "unit_price_cents": 10_000 }
            ]
        }))
        .send()
        .await
        .expect("create job failed")
        .json()
        .await
        .expect("invalid job body");

    assert_eq!(job.status, "quote");

    // Skipping straight to done is rejected by the policy with 409.
    let conflict = client
        .patch(format!("{}/api/v1/jobs/{}/status", base, job.id))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .expect("status request failed");
    assert_eq!(conflict.status(), reqwest::StatusCode::CONFLICT);

    // Scheduling derives waiting_schedule for a quote-stage job.
    let scheduled: ScheduleBody = client
        .post(format!("{}/api/v1/jobs/{}/schedule", base, job.id))
        .json(&json!({ "scheduled_at": "2030-01-15T09:00:00Z" }))
        .send()
        .await
        .expect("schedule request failed")
        .json()
        .await
        .expect("invalid schedule body");
    assert_eq!(scheduled.status, "waiting_schedule");

    // Scheduling again confirms it.
    let rescheduled: ScheduleBody = client
        .post(format!("{}/api/v1/jobs/{}/schedule", base, job.id))
        .json(&json!({ "scheduled_at": "2030-01-16T09:00:00Z" }))
        .send()
        .await
        .expect("reschedule request failed")
        .json()
        .await
        .expect("invalid schedule body");
    assert_eq!(rescheduled.status, "waiting_execution");

    // Now done is a legal transition.
    let done = client
        .patch(format!("{}/api/v1/jobs/{}/status", base, job.id))
        .json(&json!({ "status": "done" }))
        .send()
        .await
        .expect("status request failed");
    assert!(done.status().is_success());
}

#[tokio::test]
#[ignore] // Requires running API server and database
async fn test_e2e_concurrent_schedule_writes_converge() {
    let client = reqwest::Client::new();
    let base = base_url();

    let created: ClientResponse = client
        .post(format!("{}/api/v1/clients", base))
        .json(&json!({ "name": "E2E Concurrency Client" }))
        .send()
        .await
        .expect("create client failed")
        .json()
        .await
        .expect("invalid client body");

    let job: JobBody = client
        .post(format!("{}/api/v1/jobs", base))
        .json(&json!({ "client_id": created.id, "title": "Concurrent scheduling" }))
        .send()
        .await
        .expect("create job failed")
        .json()
        .await
        .expect("invalid job body");

    // Burst of parallel schedule writes, as when a dispatcher drags the
    // same job around the calendar quickly.
    let bursts = (0..8).map(|i| {
        let client = client.clone();
        let url = format!("{}/api/v1/jobs/{}/schedule", base, job.id);
        async move {
            client
                .post(&url)
                .json(&json!({ "scheduled_at": format!("2030-02-0{}T09:00:00Z", i + 1) }))
                .send()
                .await
                .expect("schedule request failed")
                .json::<ScheduleBody>()
                .await
                .expect("invalid schedule body")
        }
    });
    let results = futures::future::join_all(bursts).await;

    // The derivation never yields quote or done for an unfinished job,
    // no matter how the writes interleave.
    for result in &results {
        assert!(
            result.status == "waiting_schedule" || result.status == "waiting_execution",
            "unexpected derived status {}",
            result.status
        );
    }

    // One more schedule write reaches the fixed point.
    let settled: ScheduleBody = client
        .post(format!("{}/api/v1/jobs/{}/schedule", base, job.id))
        .json(&json!({ "scheduled_at": "2030-02-09T09:00:00Z" }))
        .send()
        .await
        .expect("schedule request failed")
        .json()
        .await
        .expect("invalid schedule body");
    assert_eq!(settled.status, "waiting_execution");
}

#[tokio::test]
#[ignore] // Requires running API server
async fn test_e2e_route_estimate() {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/v1/route", base_url()))
        .json(&json!({
            "from": { "latitude": -23.5505, "longitude": -46.6333 },
            "to":   { "latitude": -23.5630, "longitude": -46.6544 }
        }))
        .send()
        .await
        .expect("route request failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("invalid route body");
    assert!(body["duration_seconds"].as_u64().unwrap_or(0) > 0);
    assert!(body["distance_meters"].as_u64().unwrap_or(0) > 0);
}
