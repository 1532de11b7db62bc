use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::{self, WeatherDate};
use crate::db::store::RecordStore;
use crate::errors::{AppError, ErrorResponse};

/// Response type for GET /api/v1/parks.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParkResponse {
    pub id: Uuid,
    /// NPS park code (e.g. "yose")
    pub park_code: String,
    pub name: String,
    pub description: String,
    /// Latitude (WGS84), absent if the catalog had none
    pub latitude: Option<f64>,
    /// Longitude (WGS84), absent if the catalog had none
    pub longitude: Option<f64>,
    /// Comma-separated state codes
    pub states: String,
    pub designation: String,
    pub directions_info: String,
    pub weather_info: String,
    /// Stored photo file names
    pub images: Vec<String>,
    pub campground_count: Option<i32>,
    /// Daily forecast from the last weather sync
    pub weather: Vec<WeatherDate>,
}

impl From<models::Park> for ParkResponse {
    fn from(p: models::Park) -> Self {
        Self {
            id: p.id,
            park_code: p.park_code,
            name: p.name,
            description: p.description,
            latitude: p.latitude.and_then(|d| d.to_f64()),
            longitude: p.longitude.and_then(|d| d.to_f64()),
            states: p.states,
            designation: p.designation,
            directions_info: p.directions_info,
            weather_info: p.weather_info,
            images: p.images,
            campground_count: p.campground_count,
            weather: p.weather.0,
        }
    }
}

/// Response type for GET /api/v1/parks/{park_code}/campgrounds.
#[derive(Debug, Serialize, ToSchema)]
pub struct CampgroundResponse {
    pub id: Uuid,
    /// NPS campground id
    pub camp_id: String,
    pub name: String,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub reservation_info: String,
    pub reservation_url: String,
    pub directions_overview: String,
    pub weather_overview: String,
    pub images: Vec<String>,
    /// Stored static map file name
    pub map_image: Option<String>,
    /// Number of reservable sites
    pub reservable: i32,
    /// Number of first-come-first-serve sites
    pub first_come_first_serve: i32,
}

impl From<models::Campground> for CampgroundResponse {
    fn from(c: models::Campground) -> Self {
        Self {
            id: c.id,
            camp_id: c.camp_id,
            name: c.name,
            description: c.description,
            latitude: c.latitude.and_then(|d| d.to_f64()),
            longitude: c.longitude.and_then(|d| d.to_f64()),
            reservation_info: c.reservation_info,
            reservation_url: c.reservation_url,
            directions_overview: c.directions_overview,
            weather_overview: c.weather_overview,
            images: c.images,
            map_image: c.map_image,
            reservable: c.reservable,
            first_come_first_serve: c.first_come_first_serve,
        }
    }
}

/// Response type for GET /api/v1/alerts.
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertResponse {
    pub id: Uuid,
    pub park_id: Uuid,
    pub title: String,
    pub description: String,
    /// NPS alert category (e.g. "Park Closure")
    pub category: String,
    pub url: String,
    /// When the alert was stored, RFC 3339
    pub created_at: String,
}

impl From<models::Alert> for AlertResponse {
    fn from(a: models::Alert) -> Self {
        Self {
            id: a.id,
            park_id: a.park_id,
            title: a.title,
            description: a.description,
            category: a.category,
            url: a.url,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// List all stored parks, ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/parks",
    tag = "Parks",
    responses(
        (status = 200, description = "List of stored parks", body = Vec<ParkResponse>),
    )
)]
pub async fn list_parks(
    State(store): State<Arc<dyn RecordStore>>,
) -> Result<Json<Vec<ParkResponse>>, AppError> {
    let parks = store.list_parks().await?;
    Ok(Json(parks.into_iter().map(ParkResponse::from).collect()))
}

/// List the campgrounds of one park.
#[utoipa::path(
    get,
    path = "/api/v1/parks/{park_code}/campgrounds",
    tag = "Parks",
    params(
        ("park_code" = String, Path, description = "NPS park code"),
    ),
    responses(
        (status = 200, description = "Campgrounds of the park", body = Vec<CampgroundResponse>),
        (status = 404, description = "Park not found", body = ErrorResponse),
    )
)]
pub async fn get_park_campgrounds(
    State(store): State<Arc<dyn RecordStore>>,
    Path(park_code): Path<String>,
) -> Result<Json<Vec<CampgroundResponse>>, AppError> {
    let park = store
        .find_park_by_code(&park_code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Park {} not found", park_code)))?;

    let campgrounds = store.list_campgrounds_for_park(park.id).await?;
    Ok(Json(
        campgrounds
            .into_iter()
            .map(CampgroundResponse::from)
            .collect(),
    ))
}

/// List all current alerts.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "Alerts",
    responses(
        (status = 200, description = "Current alerts across all parks", body = Vec<AlertResponse>),
    )
)]
pub async fn list_alerts(
    State(store): State<Arc<dyn RecordStore>>,
) -> Result<Json<Vec<AlertResponse>>, AppError> {
    let alerts = store.list_alerts().await?;
    Ok(Json(alerts.into_iter().map(AlertResponse::from).collect()))
}
