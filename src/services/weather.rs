//! Daily forecast refresh for every stored park.
//!
//! Each park's forecast is replaced wholesale. Parks without coordinates are
//! skipped; a failed fetch leaves the previous forecast in place.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::errors::SyncError;
use crate::services::pipeline::SyncContext;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct WeatherSyncSummary {
    pub parks: usize,
    pub updated: usize,
    /// Parks without coordinates
    pub skipped: usize,
    pub failures: usize,
}

impl fmt::Display for WeatherSyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} parks, {} updated, {} skipped, {} failures",
            self.parks, self.updated, self.skipped, self.failures
        )
    }
}

pub async fn sync_weather(ctx: &SyncContext) -> Result<WeatherSyncSummary, SyncError> {
    ctx.weather.require_api_key()?;

    let parks = ctx.store.list_parks().await?;
    let mut summary = WeatherSyncSummary {
        parks: parks.len(),
        ..Default::default()
    };

    for park in &parks {
        let (Some(lat), Some(lon)) = (park.latitude, park.longitude) else {
            tracing::debug!("Park {} has no coordinates, skipping weather", park.park_code);
            summary.skipped += 1;
            continue;
        };

        let forecast = match ctx.weather.fetch_forecast(lat, lon).await {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("Error fetching weather for park {}: {}", park.park_code, e);
                summary.failures += 1;
                continue;
            }
        };

        match ctx.store.update_park_weather(park.id, &forecast).await {
            Ok(()) => {
                tracing::debug!("Park {} has {} forecast days", park.park_code, forecast.len());
                summary.updated += 1;
            }
            Err(e) => {
                tracing::warn!("Error saving weather for park {}: {}", park.park_code, e);
                summary.failures += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::{Park, WeatherDate};
    use crate::db::store::RecordStore;
    use crate::services::pipeline::tests::test_context;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stale_day() -> WeatherDate {
        WeatherDate {
            date: "Dec 31".to_string(),
            temperature_day_f: "1.0".to_string(),
            temperature_day_c: "-17.2".to_string(),
            temperature_night_f: "1.0".to_string(),
            temperature_night_c: "-17.2".to_string(),
            weather_icon: String::new(),
            last_updated: "2023-12-31T00:00:00+00:00".to_string(),
        }
    }

    async fn park(store: &MemoryStore, code: &str, coords: Option<(i64, i64)>) -> Park {
        let mut park = Park::new(code);
        if let Some((lat, lon)) = coords {
            park.latitude = Some(Decimal::from(lat));
            park.longitude = Some(Decimal::from(lon));
        }
        park.weather = sqlx::types::Json(vec![stale_day(), stale_day()]);
        store.save_park(&park).await.unwrap()
    }

    #[tokio::test]
    async fn test_forecast_replaced_and_uncoordinated_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .and(query_param("lat", "44"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": [{
                    "dt": 1704196800,
                    "temp": { "day": 273.15, "night": 263.15 },
                    "weather": [{ "icon": "13d" }]
                }]
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        park(&store, "acad", Some((44, -68))).await;
        park(&store, "npsa", None).await;
        let ctx = test_context(store.clone(), &server.uri());

        let summary = sync_weather(&ctx).await.unwrap();
        assert_eq!(summary.parks, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failures, 0);

        let acad = store.find_park_by_code("acad").await.unwrap().unwrap();
        assert_eq!(acad.weather.0.len(), 1, "old forecast is fully replaced");
        assert_eq!(acad.weather.0[0].temperature_day_f, "32.0");
        assert_eq!(acad.weather.0[0].date, "Jan 2");

        let npsa = store.find_park_by_code("npsa").await.unwrap().unwrap();
        assert_eq!(npsa.weather.0, vec![stale_day(), stale_day()]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        park(&store, "acad", Some((44, -68))).await;
        let ctx = test_context(store.clone(), &server.uri());

        let summary = sync_weather(&ctx).await.unwrap();
        assert_eq!(summary.failures, 1);
        let acad = store.find_park_by_code("acad").await.unwrap().unwrap();
        assert_eq!(acad.weather.0.len(), 2);
    }

    #[tokio::test]
    async fn test_park_save_after_weather_run_keeps_new_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": [{
                    "dt": 1704196800,
                    "temp": { "day": 273.15, "night": 263.15 },
                    "weather": [{ "icon": "13d" }]
                }]
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        // Copy loaded by a park sync before the weather run finishes.
        let mut loaded = park(&store, "acad", Some((44, -68))).await;
        let ctx = test_context(store.clone(), &server.uri());
        sync_weather(&ctx).await.unwrap();

        loaded.images.push("jordan_pond_0123456789.jpg".to_string());
        let saved = store.save_park(&loaded).await.unwrap();
        assert_eq!(saved.images.len(), 1);
        assert_eq!(saved.weather.0.len(), 1);
        assert_eq!(saved.weather.0[0].date, "Jan 2");
    }
}
