//! National Park Service developer API client.
//!
//! Parks, campgrounds and alerts. Every endpoint wraps its payload in a
//! `{ "data": [...] }` envelope.
//! See: https://www.nps.gov/subjects/developer/api-documentation.htm

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::SyncError;

/// Upper bound on catalog entries fetched in one request (single page).
const PARK_CATALOG_LIMIT: u32 = 500;

/// Client for the NPS API.
#[derive(Debug, Clone)]
pub struct NpsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

// --- NPS JSON response types ---

#[derive(Debug, Deserialize)]
struct NpsEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpsImage {
    #[serde(default)]
    pub url: String,
}

/// A park catalog entry (fields the pipeline consumes).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpsPark {
    pub park_code: String,
    pub full_name: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    pub states: String,
    pub designation: String,
    pub directions_info: String,
    pub weather_info: String,
    pub images: Vec<NpsImage>,
}

/// A campground entry. Site counts arrive as numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpsCampground {
    pub id: String,
    pub name: String,
    pub park_code: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    pub reservation_info: String,
    pub reservation_url: String,
    pub directions_overview: String,
    pub weather_overview: String,
    pub number_of_sites_reservable: String,
    pub number_of_sites_first_come_first_serve: String,
    pub images: Vec<NpsImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NpsAlert {
    pub title: String,
    pub description: String,
    pub category: String,
    pub url: String,
}

impl NpsClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// The API key, or `MissingCredential` so a job can fail before doing any work.
    pub fn require_api_key(&self) -> Result<&str, SyncError> {
        self.api_key
            .as_deref()
            .ok_or(SyncError::MissingCredential("NPS_API_KEY"))
    }

    /// Fetch the park catalog (one page of up to 500 entries).
    pub async fn fetch_parks(&self) -> Result<Vec<NpsPark>, SyncError> {
        let limit = PARK_CATALOG_LIMIT.to_string();
        self.get_data("parks", &[("limit", limit.as_str())]).await
    }

    /// Fetch all campgrounds of one park.
    pub async fn fetch_campgrounds(
        &self,
        park_code: &str,
    ) -> Result<Vec<NpsCampground>, SyncError> {
        self.get_data("campgrounds", &[("parkCode", park_code)]).await
    }

    /// Fetch the current alerts of one park.
    pub async fn fetch_alerts(&self, park_code: &str) -> Result<Vec<NpsAlert>, SyncError> {
        self.get_data("alerts", &[("parkCode", park_code)]).await
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, SyncError> {
        let api_key = self.require_api_key()?;
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|e| SyncError::Fetch(format!("NPS {} request failed: {}", endpoint, e)))?;

        if !response.status().is_success() {
            return Err(SyncError::Fetch(format!(
                "NPS {} returned HTTP {}",
                endpoint,
                response.status()
            )));
        }

        let envelope: NpsEnvelope<T> = response.json().await.map_err(|e| {
            SyncError::Decode(format!("NPS {} JSON parse error: {}", endpoint, e))
        })?;

        Ok(envelope.data)
    }
}
