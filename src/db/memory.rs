//! In-memory `RecordStore` for pipeline tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::models::{Alert, Campground, NewAlert, Park, WeatherDate};
use super::store::RecordStore;
use crate::helpers::storage_file_name;

#[derive(Debug, Default)]
struct Tables {
    parks: Vec<Park>,
    campgrounds: Vec<Campground>,
    alerts: Vec<Alert>,
    files: HashMap<String, Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent park/campground save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn check_save(&self) -> Result<(), sqlx::Error> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolClosed);
        }
        Ok(())
    }

    pub fn file_count(&self) -> usize {
        self.tables.lock().unwrap().files.len()
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.tables.lock().unwrap().files.get(name).cloned()
    }

    pub fn campgrounds(&self) -> Vec<Campground> {
        self.tables.lock().unwrap().campgrounds.clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_park_by_code(&self, park_code: &str) -> Result<Option<Park>, sqlx::Error> {
        let t = self.tables.lock().unwrap();
        Ok(t.parks.iter().find(|p| p.park_code == park_code).cloned())
    }

    async fn save_park(&self, park: &Park) -> Result<Park, sqlx::Error> {
        self.check_save()?;
        let mut t = self.tables.lock().unwrap();
        match t.parks.iter_mut().find(|p| p.park_code == park.park_code) {
            Some(existing) => {
                let id = existing.id;
                let weather = existing.weather.clone();
                *existing = park.clone();
                existing.id = id;
                existing.weather = weather;
                Ok(existing.clone())
            }
            None => {
                t.parks.push(park.clone());
                Ok(park.clone())
            }
        }
    }

    async fn list_parks(&self) -> Result<Vec<Park>, sqlx::Error> {
        Ok(self.tables.lock().unwrap().parks.clone())
    }

    async fn update_park_weather(
        &self,
        park_id: Uuid,
        forecast: &[WeatherDate],
    ) -> Result<(), sqlx::Error> {
        let mut t = self.tables.lock().unwrap();
        let park = t
            .parks
            .iter_mut()
            .find(|p| p.id == park_id)
            .ok_or(sqlx::Error::RowNotFound)?;
        park.weather = sqlx::types::Json(forecast.to_vec());
        Ok(())
    }

    async fn find_campground_by_camp_id(
        &self,
        camp_id: &str,
    ) -> Result<Option<Campground>, sqlx::Error> {
        let t = self.tables.lock().unwrap();
        Ok(t.campgrounds.iter().find(|c| c.camp_id == camp_id).cloned())
    }

    async fn save_campground(&self, campground: &Campground) -> Result<Campground, sqlx::Error> {
        self.check_save()?;
        let mut t = self.tables.lock().unwrap();
        match t
            .campgrounds
            .iter_mut()
            .find(|c| c.camp_id == campground.camp_id)
        {
            Some(existing) => {
                let id = existing.id;
                let map_image = existing.map_image.clone();
                *existing = campground.clone();
                existing.id = id;
                existing.map_image = map_image.or_else(|| campground.map_image.clone());
                Ok(existing.clone())
            }
            None => {
                t.campgrounds.push(campground.clone());
                Ok(campground.clone())
            }
        }
    }

    async fn list_campgrounds_for_park(
        &self,
        park_id: Uuid,
    ) -> Result<Vec<Campground>, sqlx::Error> {
        let t = self.tables.lock().unwrap();
        Ok(t
            .campgrounds
            .iter()
            .filter(|c| c.park_id == park_id)
            .cloned()
            .collect())
    }

    async fn put_file(
        &self,
        original_name: &str,
        extension: &str,
        _content_type: &str,
        data: &[u8],
    ) -> Result<String, sqlx::Error> {
        let name = storage_file_name(original_name, extension);
        self.tables
            .lock()
            .unwrap()
            .files
            .insert(name.clone(), data.to_vec());
        Ok(name)
    }

    async fn delete_file(&self, name: &str) -> Result<(), sqlx::Error> {
        self.tables.lock().unwrap().files.remove(name);
        Ok(())
    }

    async fn delete_all_alerts(&self) -> Result<u64, sqlx::Error> {
        let mut t = self.tables.lock().unwrap();
        let removed = t.alerts.len() as u64;
        t.alerts.clear();
        Ok(removed)
    }

    async fn insert_alert(&self, alert: &NewAlert) -> Result<Alert, sqlx::Error> {
        let row = Alert {
            id: Uuid::new_v4(),
            park_id: alert.park_id,
            title: alert.title.clone(),
            description: alert.description.clone(),
            category: alert.category.clone(),
            url: alert.url.clone(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().alerts.push(row.clone());
        Ok(row)
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>, sqlx::Error> {
        Ok(self.tables.lock().unwrap().alerts.clone())
    }
}
