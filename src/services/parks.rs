//! Park catalog synchronization.
//!
//! Fetches the NPS park catalog, keeps only entries whose designation is
//! exactly "National Park" or "National Park & Preserve", and upserts each by
//! park code. Text and coordinate fields are last-fetch-wins; photos are
//! appended through the dedup filter; campgrounds are synced per park.
//!
//! Catalog fetch/decode failures abort the run. Anything that goes wrong for a
//! single park is logged and the run moves on to the next park.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::db::models::Park;
use crate::errors::SyncError;
use crate::helpers::parse_coordinate;
use crate::services::campgrounds::{self, CampgroundSyncReport};
use crate::services::ingest::ingest_photos;
use crate::services::nps::NpsPark;
use crate::services::pipeline::SyncContext;

/// Designations admitted into the store. Exact, case-sensitive match.
pub const ACCEPTED_DESIGNATIONS: [&str; 2] = ["National Park", "National Park & Preserve"];

/// Counts for one park sync run.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ParkSyncSummary {
    /// Entries returned by the catalog
    pub catalog_entries: usize,
    /// Entries with an accepted designation
    pub accepted: usize,
    /// Parks fully synced (record, photos and campgrounds)
    pub synced: usize,
    /// Park photos added
    pub images_added: usize,
    pub campgrounds: usize,
    pub campground_images_added: usize,
    pub maps_added: usize,
    /// Parks whose record or campground step failed
    pub failures: usize,
    /// Campground entries that could not be saved
    pub campground_failures: usize,
}

impl fmt::Display for ParkSyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} catalog entries accepted, {} synced, {} images added, ",
            self.accepted, self.catalog_entries, self.synced, self.images_added
        )?;
        write!(
            f,
            "{} campgrounds ({} images, {} maps added), {} failures, {} campground failures",
            self.campgrounds,
            self.campground_images_added,
            self.maps_added,
            self.failures,
            self.campground_failures
        )
    }
}

pub fn is_accepted_designation(designation: &str) -> bool {
    ACCEPTED_DESIGNATIONS.contains(&designation)
}

/// Merge a catalog entry into the stored park (or a new one).
///
/// Catalog fields overwrite; identity, photos, campground count and the
/// forecast are kept from `current`.
pub fn merge_park(current: Option<Park>, incoming: &NpsPark) -> Park {
    let mut park = current.unwrap_or_else(|| Park::new(&incoming.park_code));
    park.name = incoming.full_name.clone();
    park.description = incoming.description.clone();
    park.latitude = parse_coordinate(&incoming.latitude);
    park.longitude = parse_coordinate(&incoming.longitude);
    park.states = incoming.states.clone();
    park.designation = incoming.designation.clone();
    park.directions_info = incoming.directions_info.clone();
    park.weather_info = incoming.weather_info.clone();
    park
}

/// Run one full park catalog sync.
pub async fn sync_parks(ctx: &SyncContext) -> Result<ParkSyncSummary, SyncError> {
    ctx.nps.require_api_key()?;
    ctx.maps.require_access_token()?;

    let catalog = ctx.nps.fetch_parks().await?;
    let mut summary = ParkSyncSummary {
        catalog_entries: catalog.len(),
        ..Default::default()
    };

    for entry in catalog.iter().filter(|p| is_accepted_designation(&p.designation)) {
        summary.accepted += 1;

        if entry.park_code.trim().is_empty() {
            tracing::warn!("Skipping catalog entry '{}' without a park code", entry.full_name);
            summary.failures += 1;
            continue;
        }

        match sync_park(ctx, entry).await {
            Ok(report) => {
                summary.images_added += report.images_added;
                match report.campgrounds {
                    Some(camps) => {
                        summary.campgrounds += camps.processed;
                        summary.campground_images_added += camps.images_added;
                        summary.maps_added += camps.maps_added;
                        summary.campground_failures += camps.failures;
                        summary.synced += 1;
                    }
                    None => summary.failures += 1,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to sync park {}: {}", entry.park_code, e);
                summary.failures += 1;
            }
        }
    }

    Ok(summary)
}

struct ParkReport {
    images_added: usize,
    /// `None` when the campground step failed for this run.
    campgrounds: Option<CampgroundSyncReport>,
}

async fn sync_park(ctx: &SyncContext, entry: &NpsPark) -> Result<ParkReport, SyncError> {
    let current = ctx.store.find_park_by_code(&entry.park_code).await?;
    if current.is_none() {
        tracing::info!("Creating new record for park {}", entry.park_code);
    }
    let mut park = ctx.store.save_park(&merge_park(current, entry)).await?;

    let urls: Vec<String> = entry.images.iter().map(|i| i.url.clone()).collect();
    let images_added = ingest_photos(ctx.store.as_ref(), &ctx.transcoder, &mut park, &urls).await;
    tracing::info!("Park {} has {} images", park.park_code, park.images.len());

    let campgrounds = match campgrounds::sync_campgrounds(ctx, park.id, &park.park_code).await {
        Ok(report) => {
            park.campground_count = Some(i32::try_from(report.processed).unwrap_or(i32::MAX));
            ctx.store.save_park(&park).await?;
            Some(report)
        }
        Err(e) => {
            tracing::warn!("Error fetching campgrounds for park {}: {}", park.park_code, e);
            None
        }
    };

    Ok(ParkReport {
        images_added,
        campgrounds,
    })
}
