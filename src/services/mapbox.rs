//! Mapbox Static Images client for campground map snapshots.
//!
//! The pin colour tells first-come-first-serve campgrounds (green) apart
//! from reservation-only ones (red).

use rust_decimal::Decimal;

use crate::errors::SyncError;
use crate::services::images::{fetch_bytes, reencode_png, TranscodedImage};

const MAP_STYLE: &str = "mapbox/outdoors-v12";
const MAP_ZOOM: &str = "15.2";
const MAP_BEARING: &str = "0";
const MAP_SIZE: &str = "768x384@2x";
const PIN_FIRST_COME: &str = "65a30d";
const PIN_RESERVABLE: &str = "e85151";

/// Client for static map snapshots.
#[derive(Debug, Clone)]
pub struct MapSnapshotClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl MapSnapshotClient {
    pub fn new(client: reqwest::Client, base_url: &str, access_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub fn require_access_token(&self) -> Result<&str, SyncError> {
        self.access_token
            .as_deref()
            .ok_or(SyncError::MissingCredential("MAPBOX_ACCESS_TOKEN"))
    }

    /// Build the static image URL for a pin at (`lat`, `lon`).
    pub fn snapshot_url(
        &self,
        lat: Decimal,
        lon: Decimal,
        first_come: bool,
    ) -> Result<String, SyncError> {
        let token = self.require_access_token()?;
        let color = if first_come {
            PIN_FIRST_COME
        } else {
            PIN_RESERVABLE
        };
        Ok(format!(
            "{base}/styles/v1/{style}/static/pin-l+{color}({lon},{lat})/{lon},{lat},{zoom},{bearing}/{size}?access_token={token}",
            base = self.base_url,
            style = MAP_STYLE,
            color = color,
            lon = lon,
            lat = lat,
            zoom = MAP_ZOOM,
            bearing = MAP_BEARING,
            size = MAP_SIZE,
            token = token,
        ))
    }

    /// Fetch the snapshot and re-encode it as PNG.
    pub async fn fetch_snapshot(
        &self,
        lat: Decimal,
        lon: Decimal,
        first_come: bool,
    ) -> Result<TranscodedImage, SyncError> {
        let url = self.snapshot_url(lat, lon, first_come)?;
        let bytes = fetch_bytes(&self.client, &url).await?;
        tokio::task::spawn_blocking(move || reencode_png(&bytes))
            .await
            .map_err(|e| SyncError::Decode(format!("map worker failed: {}", e)))?
    }
}
