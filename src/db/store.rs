//! Record store abstraction used by the sync pipeline.
//!
//! `PgStore` is the production implementation over the sqlx queries. Tests
//! run the pipeline against `memory::MemoryStore` instead.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Alert, Campground, NewAlert, Park, WeatherDate};
use super::queries;
use crate::helpers::storage_file_name;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_park_by_code(&self, park_code: &str) -> Result<Option<Park>, sqlx::Error>;

    /// Upsert by `park_code`; returns the stored row.
    async fn save_park(&self, park: &Park) -> Result<Park, sqlx::Error>;

    async fn list_parks(&self) -> Result<Vec<Park>, sqlx::Error>;

    async fn update_park_weather(
        &self,
        park_id: Uuid,
        forecast: &[WeatherDate],
    ) -> Result<(), sqlx::Error>;

    async fn find_campground_by_camp_id(
        &self,
        camp_id: &str,
    ) -> Result<Option<Campground>, sqlx::Error>;

    /// Upsert by `camp_id`; returns the stored row.
    async fn save_campground(&self, campground: &Campground) -> Result<Campground, sqlx::Error>;

    async fn list_campgrounds_for_park(&self, park_id: Uuid)
        -> Result<Vec<Campground>, sqlx::Error>;

    /// Store a file body and return the storage-assigned name.
    async fn put_file(
        &self,
        original_name: &str,
        extension: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, sqlx::Error>;

    /// Remove a stored file that never got attached to a record.
    async fn delete_file(&self, name: &str) -> Result<(), sqlx::Error>;

    async fn delete_all_alerts(&self) -> Result<u64, sqlx::Error>;

    async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert, sqlx::Error>;

    async fn list_alerts(&self) -> Result<Vec<Alert>, sqlx::Error>;
}

/// PostgreSQL-backed record store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_park_by_code(&self, park_code: &str) -> Result<Option<Park>, sqlx::Error> {
        queries::get_park_by_code(&self.pool, park_code).await
    }

    async fn save_park(&self, park: &Park) -> Result<Park, sqlx::Error> {
        queries::upsert_park(&self.pool, park).await
    }

    async fn list_parks(&self) -> Result<Vec<Park>, sqlx::Error> {
        queries::list_parks(&self.pool).await
    }

    async fn update_park_weather(
        &self,
        park_id: Uuid,
        forecast: &[WeatherDate],
    ) -> Result<(), sqlx::Error> {
        queries::update_park_weather(&self.pool, park_id, forecast).await
    }

    async fn find_campground_by_camp_id(
        &self,
        camp_id: &str,
    ) -> Result<Option<Campground>, sqlx::Error> {
        queries::get_campground_by_camp_id(&self.pool, camp_id).await
    }

    async fn save_campground(&self, campground: &Campground) -> Result<Campground, sqlx::Error> {
        queries::upsert_campground(&self.pool, campground).await
    }

    async fn list_campgrounds_for_park(
        &self,
        park_id: Uuid,
    ) -> Result<Vec<Campground>, sqlx::Error> {
        queries::list_campgrounds_for_park(&self.pool, park_id).await
    }

    async fn put_file(
        &self,
        original_name: &str,
        extension: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, sqlx::Error> {
        let name = storage_file_name(original_name, extension);
        queries::insert_file(&self.pool, &name, content_type, data).await?;
        Ok(name)
    }

    async fn delete_file(&self, name: &str) -> Result<(), sqlx::Error> {
        queries::delete_file(&self.pool, name).await
    }

    async fn delete_all_alerts(&self) -> Result<u64, sqlx::Error> {
        queries::delete_all_alerts(&self.pool).await
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert, sqlx::Error> {
        queries::insert_alert(&self.pool, alert).await
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>, sqlx::Error> {
        queries::list_alerts(&self.pool).await
    }
}
