// ParkPilot Sync v0.1
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use db::store::{PgStore, RecordStore};
use routes::health::HealthState;
use services::pipeline::{Pipeline, SyncContext};

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// OpenAPI document for the ParkPilot Sync API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ParkPilot Sync API",
        version = "0.1.0",
        description = "Ingests US national park reference data. Pulls parks, campgrounds \
            and alerts from the NPS API, daily forecasts from OpenWeatherMap and \
            campground map snapshots from Mapbox, deduplicates and re-encodes photos, \
            and upserts everything into Postgres.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Sync", description = "On-demand sync jobs and their status"),
        (name = "Parks", description = "Stored parks and campgrounds"),
        (name = "Alerts", description = "Stored park alerts"),
    ),
    paths(
        routes::health::health_check,
        routes::sync::sync_parks,
        routes::sync::sync_weather,
        routes::sync::sync_alerts,
        routes::sync::get_sync_status,
        routes::parks::list_parks,
        routes::parks::get_park_campgrounds,
        routes::parks::list_alerts,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::sync::SyncTriggerResponse,
            routes::parks::ParkResponse,
            routes::parks::CampgroundResponse,
            routes::parks::AlertResponse,
            db::models::WeatherDate,
            services::pipeline::SyncStatus,
            services::pipeline::JobStatus,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkpilot_sync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    config.log_missing_credentials();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    let store: Arc<dyn RecordStore> = Arc::new(PgStore::new(pool.clone()));
    let pipeline = Pipeline::new(SyncContext::from_config(&config, store));

    // Weekly park sync; the handle must outlive the server
    let _scheduler = services::scheduler::build_scheduler(pipeline.clone(), &config.park_sync_cron)
        .await
        .expect("Failed to start park sync scheduler");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    // Build router
    // Sync routes use the Pipeline; read routes only need the store.
    let sync_routes = Router::new()
        .route("/api/v1/sync/parks", post(routes::sync::sync_parks))
        .route("/api/v1/sync/weather", post(routes::sync::sync_weather))
        .route("/api/v1/sync/alerts", post(routes::sync::sync_alerts))
        .route("/api/v1/sync/status", get(routes::sync::get_sync_status))
        .with_state(pipeline.clone());

    let park_routes = Router::new()
        .route("/api/v1/parks", get(routes::parks::list_parks))
        .route(
            "/api/v1/parks/:park_code/campgrounds",
            get(routes::parks::get_park_campgrounds),
        )
        .route("/api/v1/alerts", get(routes::parks::list_alerts))
        .with_state(pipeline.store().clone());

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .with_state(HealthState { pool, pipeline });

    let app = Router::new()
        .merge(health_routes)
        .merge(sync_routes)
        .merge(park_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
