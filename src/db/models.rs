use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A national park, keyed by its NPS `park_code`.
#[derive(Debug, Clone, FromRow)]
pub struct Park {
    pub id: Uuid,
    pub park_code: String,
    pub name: String,
    pub description: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub states: String,
    pub designation: String,
    pub directions_info: String,
    pub weather_info: String,
    /// Stored file names of ingested photos, in ingestion order.
    pub images: Vec<String>,
    /// Number of campgrounds seen on the last successful campground sync.
    pub campground_count: Option<i32>,
    /// Daily forecast, overwritten as a whole on every weather sync.
    pub weather: Json<Vec<WeatherDate>>,
}

impl Park {
    /// A fresh, not-yet-persisted park for `park_code`.
    pub fn new(park_code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            park_code: park_code.to_string(),
            name: String::new(),
            description: String::new(),
            latitude: None,
            longitude: None,
            states: String::new(),
            designation: String::new(),
            directions_info: String::new(),
            weather_info: String::new(),
            images: Vec::new(),
            campground_count: None,
            weather: Json(Vec::new()),
        }
    }
}

/// A campground, keyed by its NPS `camp_id`.
#[derive(Debug, Clone, FromRow)]
pub struct Campground {
    pub id: Uuid,
    pub camp_id: String,
    pub park_id: Uuid,
    pub name: String,
    pub description: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub reservation_info: String,
    pub reservation_url: String,
    pub directions_overview: String,
    pub weather_overview: String,
    pub images: Vec<String>,
    /// Static map snapshot. Set once, never refreshed.
    pub map_image: Option<String>,
    pub reservable: i32,
    pub first_come_first_serve: i32,
}

impl Campground {
    /// A fresh, not-yet-persisted campground for `camp_id` under `park_id`.
    pub fn new(camp_id: &str, park_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            camp_id: camp_id.to_string(),
            park_id,
            name: String::new(),
            description: String::new(),
            latitude: None,
            longitude: None,
            reservation_info: String::new(),
            reservation_url: String::new(),
            directions_overview: String::new(),
            weather_overview: String::new(),
            images: Vec::new(),
            map_image: None,
            reservable: 0,
            first_come_first_serve: 0,
        }
    }
}

/// One day of a park's forecast. Stored inside `parks.weather` as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDate {
    /// Calendar date without year, e.g. "Jan 2"
    pub date: String,
    pub temperature_day_f: String,
    pub temperature_day_c: String,
    pub temperature_night_f: String,
    pub temperature_night_c: String,
    /// Icon image URL
    pub weather_icon: String,
    /// RFC 3339 timestamp of the fetch
    pub last_updated: String,
}

/// A current park alert. The whole set is rebuilt on every refresh.
#[derive(Debug, Clone, FromRow)]
pub struct Alert {
    pub id: Uuid,
    pub park_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting a new alert record.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub park_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: String,
}
