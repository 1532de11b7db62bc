//! OpenWeatherMap One Call 3.0 client.
//!
//! Only the daily section is requested. Temperatures come back in Kelvin and
//! are stored as one-decimal Fahrenheit and Celsius strings.
//! See: https://openweathermap.org/api/one-call-3

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::models::WeatherDate;
use crate::errors::SyncError;

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Client for the One Call API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

// --- One Call JSON response types ---

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    #[serde(default)]
    daily: Vec<OneCallDaily>,
}

#[derive(Debug, Deserialize)]
struct OneCallDaily {
    dt: i64,
    temp: OneCallTemp,
    #[serde(default)]
    weather: Vec<OneCallCondition>,
}

#[derive(Debug, Deserialize)]
struct OneCallTemp {
    day: f64,
    night: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallCondition {
    #[serde(default)]
    icon: String,
}

/// Kelvin → Fahrenheit, one decimal place.
pub fn kelvin_to_fahrenheit(k: f64) -> String {
    format!("{:.1}", (k - 273.15) * 1.8 + 32.0)
}

/// Kelvin → Celsius, one decimal place.
pub fn kelvin_to_celsius(k: f64) -> String {
    format!("{:.1}", k - 273.15)
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn require_api_key(&self) -> Result<&str, SyncError> {
        self.api_key
            .as_deref()
            .ok_or(SyncError::MissingCredential("OWM_API_KEY"))
    }

    /// Fetch the daily forecast for a coordinate pair, in upstream order.
    pub async fn fetch_forecast(
        &self,
        lat: Decimal,
        lon: Decimal,
    ) -> Result<Vec<WeatherDate>, SyncError> {
        let api_key = self.require_api_key()?;
        let url = format!("{}/onecall", self.base_url);
        let lat = lat.to_string();
        let lon = lon.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("exclude", "minutely,hourly"),
                ("appid", api_key),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("One Call request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SyncError::Fetch(format!(
                "One Call returned HTTP {}",
                response.status()
            )));
        }

        let body: OneCallResponse = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(format!("One Call JSON parse error: {}", e)))?;

        Ok(build_forecast(&body, Utc::now()))
    }
}

/// Convert the daily section into stored forecast entries stamped with `now`.
fn build_forecast(body: &OneCallResponse, now: DateTime<Utc>) -> Vec<WeatherDate> {
    let last_updated = now.to_rfc3339();
    body.daily
        .iter()
        .map(|day| {
            let date = DateTime::<Utc>::from_timestamp(day.dt, 0)
                .map(|dt| dt.format("%b %-d").to_string())
                .unwrap_or_default();
            let weather_icon = day
                .weather
                .first()
                .filter(|w| !w.icon.is_empty())
                .map(|w| format!("{}/{}@2x.png", ICON_URL_BASE, w.icon))
                .unwrap_or_default();

            WeatherDate {
                date,
                temperature_day_f: kelvin_to_fahrenheit(day.temp.day),
                temperature_day_c: kelvin_to_celsius(day.temp.day),
                temperature_night_f: kelvin_to_fahrenheit(day.temp.night),
                temperature_night_c: kelvin_to_celsius(day.temp.night),
                weather_icon,
                last_updated: last_updated.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "lat": 37.8488,
            "lon": -119.5571,
            "daily": [
                {
                    "dt": 1704196800,
                    "temp": { "day": 283.15, "night": 273.15, "min": 270.0 },
                    "weather": [{ "id": 800, "icon": "01d" }]
                },
                {
                    "dt": 1704283200,
                    "temp": { "day": 300.0, "night": 290.5 },
                    "weather": []
                }
            ]
        })
    }

    #[test]
    fn test_freezing_point() {
        assert_eq!(kelvin_to_fahrenheit(273.15), "32.0");
        assert_eq!(kelvin_to_celsius(273.15), "0.0");
    }

    #[test]
    fn test_boiling_point() {
        assert_eq!(kelvin_to_fahrenheit(373.15), "212.0");
        assert_eq!(kelvin_to_celsius(373.15), "100.0");
    }

    #[test]
    fn test_one_decimal_rounding() {
        assert_eq!(kelvin_to_celsius(300.0), "26.9");
        assert_eq!(kelvin_to_fahrenheit(300.0), "80.3");
    }

    #[test]
    fn test_build_forecast() {
        let body: OneCallResponse = serde_json::from_value(sample_body()).unwrap();
        let now = "2024-01-02T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let days = build_forecast(&body, now);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "Jan 2");
        assert_eq!(days[0].temperature_day_c, "10.0");
        assert_eq!(days[0].temperature_day_f, "50.0");
        assert_eq!(days[0].temperature_night_c, "0.0");
        assert_eq!(days[0].temperature_night_f, "32.0");
        assert_eq!(
            days[0].weather_icon,
            "https://openweathermap.org/img/wn/01d@2x.png"
        );
        assert_eq!(days[0].last_updated, now.to_rfc3339());
        assert_eq!(days[1].date, "Jan 3");
        assert_eq!(days[1].weather_icon, "", "missing icon does not fail the day");
    }

    #[tokio::test]
    async fn test_fetch_forecast_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onecall"))
            .and(query_param("lat", "37.8488"))
            .and(query_param("lon", "-119.5571"))
            .and(query_param("exclude", "minutely,hourly"))
            .and(query_param("appid", "owm-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = WeatherClient::new(
            reqwest::Client::new(),
            &server.uri(),
            Some("owm-key".to_string()),
        );
        let days = client
            .fetch_forecast(
                Decimal::from_str("37.8488").unwrap(),
                Decimal::from_str("-119.5571").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(days.len(), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = WeatherClient::new(reqwest::Client::new(), &server.uri(), Some("bad".into()));
        let err = client
            .fetch_forecast(Decimal::ONE, Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Fetch(_)));
    }
}
