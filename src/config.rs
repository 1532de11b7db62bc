/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// NPS developer API key (parks, campgrounds, alerts).
    pub nps_api_key: Option<String>,
    /// OpenWeatherMap One Call API key.
    pub owm_api_key: Option<String>,
    /// Mapbox access token for static map snapshots.
    pub mapbox_access_token: Option<String>,
    /// Cron expression (with seconds) for the scheduled park sync.
    pub park_sync_cron: String,
    /// Ingested photos wider than this are downscaled.
    pub image_max_width: u32,
    pub nps_base_url: String,
    pub owm_base_url: String,
    pub mapbox_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            nps_api_key: non_empty_var("NPS_API_KEY"),
            owm_api_key: non_empty_var("OWM_API_KEY"),
            mapbox_access_token: non_empty_var("MAPBOX_ACCESS_TOKEN"),
            park_sync_cron: std::env::var("PARK_SYNC_CRON")
                .unwrap_or_else(|_| "0 0 0 * * Sun".to_string()),
            image_max_width: std::env::var("IMAGE_MAX_WIDTH")
                .unwrap_or_else(|_| "1500".to_string())
                .parse()
                .expect("IMAGE_MAX_WIDTH must be a valid u32"),
            nps_base_url: std::env::var("NPS_BASE_URL")
                .unwrap_or_else(|_| "https://developer.nps.gov/api/v1".to_string()),
            owm_base_url: std::env::var("OWM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org/data/3.0".to_string()),
            mapbox_base_url: std::env::var("MAPBOX_BASE_URL")
                .unwrap_or_else(|_| "https://api.mapbox.com".to_string()),
        }
    }

    /// Warn about credentials that are absent; the jobs needing them will refuse to run.
    pub fn log_missing_credentials(&self) {
        let keys = [
            ("NPS_API_KEY", self.nps_api_key.is_some()),
            ("OWM_API_KEY", self.owm_api_key.is_some()),
            ("MAPBOX_ACCESS_TOKEN", self.mapbox_access_token.is_some()),
        ];
        for (name, present) in keys {
            if !present {
                tracing::warn!("{} is not set; jobs that need it will fail fast", name);
            }
        }
    }
}

/// Read an env var, treating an empty value the same as an unset one.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
