//! Sync job entry points and their shared run status.
//!
//! - `sync_parks`: guarded by a `SingleFlight`; a call while a run is in
//!   flight returns `ParkSyncOutcome::AlreadyRunning` immediately.
//! - `sync_weather`, `refresh_alerts`: unguarded.
//!
//! Every run is recorded in `SyncStatus` (`Arc<RwLock<_>>`), which the status
//! endpoint serves as-is.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::db::store::RecordStore;
use crate::errors::SyncError;
use crate::services::alerts::{self, AlertRefreshSummary};
use crate::services::images::ImageTranscoder;
use crate::services::mapbox::MapSnapshotClient;
use crate::services::nps::NpsClient;
use crate::services::owm::WeatherClient;
use crate::services::parks::{self, ParkSyncSummary};
use crate::services::single_flight::SingleFlight;
use crate::services::weather::{self, WeatherSyncSummary};

/// Store and upstream clients shared by every job.
pub struct SyncContext {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) nps: NpsClient,
    pub(crate) transcoder: ImageTranscoder,
    pub(crate) maps: MapSnapshotClient,
    pub(crate) weather: WeatherClient,
}

impl SyncContext {
    pub fn from_config(config: &AppConfig, store: Arc<dyn RecordStore>) -> Self {
        let client = reqwest::Client::new();
        Self {
            store,
            nps: NpsClient::new(
                client.clone(),
                &config.nps_base_url,
                config.nps_api_key.clone(),
            ),
            transcoder: ImageTranscoder::new(client.clone(), config.image_max_width),
            maps: MapSnapshotClient::new(
                client.clone(),
                &config.mapbox_base_url,
                config.mapbox_access_token.clone(),
            ),
            weather: WeatherClient::new(client, &config.owm_base_url, config.owm_api_key.clone()),
        }
    }
}

/// Last-run bookkeeping for one job kind.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct JobStatus {
    pub running: bool,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
    /// Summary line of the last run, or "error: ..." if it failed
    pub last_outcome: Option<String>,
    pub total_runs: u64,
}

/// Status of all sync jobs, exposed via the status endpoint.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SyncStatus {
    pub parks: JobStatus,
    pub weather: JobStatus,
    pub alerts: JobStatus,
}

/// Shared sync status handle.
pub type SharedSyncStatus = Arc<RwLock<SyncStatus>>;

#[derive(Debug, Clone, Copy)]
enum JobKind {
    Parks,
    Weather,
    Alerts,
}

impl JobKind {
    fn slot(self, status: &mut SyncStatus) -> &mut JobStatus {
        match self {
            JobKind::Parks => &mut status.parks,
            JobKind::Weather => &mut status.weather,
            JobKind::Alerts => &mut status.alerts,
        }
    }
}

/// Result of a guarded park sync request.
#[derive(Debug)]
pub enum ParkSyncOutcome {
    Completed(ParkSyncSummary),
    AlreadyRunning,
}

/// Entry points for the three sync jobs.
#[derive(Clone)]
pub struct Pipeline {
    ctx: Arc<SyncContext>,
    park_flight: Arc<SingleFlight>,
    status: SharedSyncStatus,
}

impl Pipeline {
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            park_flight: Arc::new(SingleFlight::new()),
            status: Arc::new(RwLock::new(SyncStatus::default())),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.ctx.store
    }

    pub fn status(&self) -> SharedSyncStatus {
        self.status.clone()
    }

    pub fn park_sync_running(&self) -> bool {
        self.park_flight.is_running()
    }

    /// Park catalog sync, at most one in flight process-wide.
    pub async fn sync_parks(&self) -> Result<ParkSyncOutcome, SyncError> {
        let ctx = &self.ctx;
        let run = self
            .park_flight
            .run(|| self.tracked(JobKind::Parks, parks::sync_parks(ctx)))
            .await;

        match run {
            Some(result) => result.map(ParkSyncOutcome::Completed),
            None => {
                tracing::info!("National Parks data is already being fetched");
                Ok(ParkSyncOutcome::AlreadyRunning)
            }
        }
    }

    /// Weather sync over all stored parks.
    pub async fn sync_weather(&self) -> Result<WeatherSyncSummary, SyncError> {
        self.tracked(JobKind::Weather, weather::sync_weather(&self.ctx))
            .await
    }

    /// Full replace of the alert set.
    pub async fn refresh_alerts(&self) -> Result<AlertRefreshSummary, SyncError> {
        self.tracked(JobKind::Alerts, alerts::refresh_alerts(&self.ctx))
            .await
    }

    /// Run `job`, recording start, finish and outcome in the shared status.
    async fn tracked<T, Fut>(&self, kind: JobKind, job: Fut) -> Result<T, SyncError>
    where
        T: Display,
        Fut: Future<Output = Result<T, SyncError>>,
    {
        let started_at = Utc::now();
        {
            let mut s = self.status.write().await;
            let slot = kind.slot(&mut s);
            slot.running = true;
            slot.last_started_at = Some(started_at);
        }
        tracing::info!("Starting {:?} sync", kind);

        let result = job.await;

        let finished_at = Utc::now();
        let outcome = match &result {
            Ok(summary) => {
                tracing::info!("{:?} sync finished: {}", kind, summary);
                summary.to_string()
            }
            Err(e) => {
                tracing::error!("{:?} sync failed: {}", kind, e);
                format!("error: {}", e)
            }
        };

        {
            let mut s = self.status.write().await;
            let slot = kind.slot(&mut s);
            slot.running = false;
            slot.last_finished_at = Some(finished_at);
            slot.last_duration_ms =
                Some((finished_at - started_at).num_milliseconds().max(0) as u64);
            slot.last_outcome = Some(outcome);
            slot.total_runs += 1;
        }

        result
    }
}
