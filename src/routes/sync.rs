//! On-demand sync triggers and job status.
//!
//! Each trigger runs its job to completion inside the request.
//! `POST /api/v1/sync/parks` is single-flight: a second request while a run is
//! in progress returns 200 immediately with an "already in progress" message.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::pipeline::{ParkSyncOutcome, Pipeline, SyncStatus};

/// Response body of a sync trigger.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncTriggerResponse {
    /// Human-readable result
    pub message: String,
    /// Counts for the run, absent if the run was skipped
    pub summary: Option<String>,
}

/// Run the park catalog sync (parks, photos, campgrounds, maps).
#[utoipa::path(
    post,
    path = "/api/v1/sync/parks",
    tag = "Sync",
    responses(
        (status = 200, description = "Sync finished, or already in progress", body = SyncTriggerResponse),
        (status = 500, description = "Sync failed", body = ErrorResponse),
    )
)]
pub async fn sync_parks(
    State(pipeline): State<Pipeline>,
) -> Result<Json<SyncTriggerResponse>, AppError> {
    let response = match pipeline.sync_parks().await? {
        ParkSyncOutcome::Completed(summary) => SyncTriggerResponse {
            message: "National Parks data has been stored successfully.".to_string(),
            summary: Some(summary.to_string()),
        },
        ParkSyncOutcome::AlreadyRunning => SyncTriggerResponse {
            message: "National Parks data sync is already in progress.".to_string(),
            summary: None,
        },
    };
    Ok(Json(response))
}

/// Refresh the daily forecast of every stored park.
#[utoipa::path(
    post,
    path = "/api/v1/sync/weather",
    tag = "Sync",
    responses(
        (status = 200, description = "Weather stored", body = SyncTriggerResponse),
        (status = 500, description = "Sync failed", body = ErrorResponse),
    )
)]
pub async fn sync_weather(
    State(pipeline): State<Pipeline>,
) -> Result<Json<SyncTriggerResponse>, AppError> {
    let summary = pipeline.sync_weather().await?;
    Ok(Json(SyncTriggerResponse {
        message: "Weather data has been stored successfully.".to_string(),
        summary: Some(summary.to_string()),
    }))
}

/// Replace the stored alerts with the current upstream set.
#[utoipa::path(
    post,
    path = "/api/v1/sync/alerts",
    tag = "Sync",
    responses(
        (status = 200, description = "Alerts stored", body = SyncTriggerResponse),
        (status = 500, description = "Sync failed", body = ErrorResponse),
    )
)]
pub async fn sync_alerts(
    State(pipeline): State<Pipeline>,
) -> Result<Json<SyncTriggerResponse>, AppError> {
    let summary = pipeline.refresh_alerts().await?;
    Ok(Json(SyncTriggerResponse {
        message: "Alerts data has been stored successfully.".to_string(),
        summary: Some(summary.to_string()),
    }))
}

/// Current state and last outcome of each sync job.
#[utoipa::path(
    get,
    path = "/api/v1/sync/status",
    tag = "Sync",
    responses(
        (status = 200, description = "Sync job status", body = SyncStatus),
    )
)]
pub async fn get_sync_status(State(pipeline): State<Pipeline>) -> Json<SyncStatus> {
    let status = pipeline.status();
    let s = status.read().await;
    Json(s.clone())
}
