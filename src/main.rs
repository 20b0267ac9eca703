mod app_state;
mod config;
mod db;
mod models;
mod routes;
mod services;

use axum::http::StatusCode;
use axum::{routing::get, routing::patch, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{geocode::GeocodeClient, invoicing::InvoicingClient, routing::RoutingClient};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing fieldops server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("jobs_created_total", "Total jobs created");
    metrics::describe_counter!("jobs_scheduled_total", "Total schedule writes on jobs");
    metrics::describe_counter!("quotes_created_total", "Total quotes created");
    metrics::describe_counter!(
        "status_transitions_rejected_total",
        "Status transitions rejected by the policy"
    );
    metrics::describe_counter!("geocode_cache_hits_total", "Geocode cache hits");
    metrics::describe_counter!("geocode_cache_misses_total", "Geocode cache misses");
    metrics::describe_counter!(
        "geocode_fallbacks_total",
        "Geocode requests served by the fallback provider"
    );
    metrics::describe_counter!("route_cache_hits_total", "Route cache hits");
    metrics::describe_counter!("route_cache_misses_total", "Route cache misses");
    metrics::describe_counter!(
        "route_fallbacks_total",
        "Route requests answered with the straight-line estimate"
    );
    metrics::describe_counter!(
        "invoice_drafts_created_total",
        "Draft invoice documents created at the provider"
    );

    // Initialize database connection pool
    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run database migrations
    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // Initialize external provider clients
    tracing::info!("Initializing geocoding client");
    let geocoder = GeocodeClient::new(
        &config.geocode_url,
        &config.geocode_api_key,
        &config.geocode_fallback_url,
    )
    .expect("Failed to initialize geocoding client");

    tracing::info!("Initializing routing client");
    let router_client =
        RoutingClient::new(&config.routing_url).expect("Failed to initialize routing client");

    tracing::info!("Initializing invoicing client");
    let invoicing = InvoicingClient::new(
        &config.invoicing_url,
        &config.invoicing_client_id,
        &config.invoicing_client_secret,
    )
    .expect("Failed to initialize invoicing client");

    // Create shared application state
    let state = AppState::new(db_pool, geocoder, router_client, invoicing);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/api/v1/clients",
            post(routes::clients::create_client).get(routes::clients::list_clients),
        )
        .route("/api/v1/clients/{id}", get(routes::clients::get_client))
        .route(
            "/api/v1/jobs",
            post(routes::jobs::create_job).get(routes::jobs::list_jobs),
        )
        .route("/api/v1/jobs/{id}", get(routes::jobs::get_job))
        .route(
            "/api/v1/jobs/{id}/status",
            patch(routes::jobs::update_job_status),
        )
        .route("/api/v1/jobs/{id}/schedule", post(routes::jobs::schedule_job))
        .route(
            "/api/v1/jobs/{id}/invoice",
            post(routes::invoices::create_invoice),
        )
        .route(
            "/api/v1/quotes",
            post(routes::quotes::create_quote).get(routes::quotes::list_quotes),
        )
        .route("/api/v1/quotes/{id}", get(routes::quotes::get_quote))
        .route(
            "/api/v1/quotes/{id}/status",
            patch(routes::quotes::update_quote_status),
        )
        .route("/api/v1/geocode", post(routes::dispatch::geocode))
        .route("/api/v1/route", post(routes::dispatch::route))
        // Messaging integration is not wired up yet; the mobile app expects
        // the endpoint to exist.
        .route(
            "/api/v1/messages",
            post(|| async { StatusCode::NOT_IMPLEMENTED }),
        )
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1 MB limit

    tracing::info!("Starting fieldops on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
