use axum::extract::State;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::services::pipeline::Pipeline;

/// State for the health endpoint.
#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub pipeline: Pipeline,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok" when healthy, "degraded" when DB is unreachable)
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether the database is reachable
    pub database: bool,
    /// Whether a park sync is in flight
    pub park_sync_running: bool,
}

/// Health check endpoint.
///
/// Verifies database connectivity with a trivial query. An unreachable DB is
/// reported as "degraded" with a 200 so load balancers can tell it apart from
/// a dead process.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();
    let park_sync_running = state.pipeline.park_sync_running();

    Json(HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_ok,
        park_sync_running,
    })
}
