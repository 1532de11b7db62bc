//! Campground synchronization for a single park.
//!
//! Campgrounds are upserted by their upstream id. Photos go through the same
//! dedup filter as park photos. A map snapshot is fetched once, the first time
//! a campground has coordinates and no map; it is never refreshed.

use uuid::Uuid;

use crate::db::models::Campground;
use crate::errors::SyncError;
use crate::helpers::{parse_coordinate, parse_site_count};
use crate::services::ingest::ingest_photos;
use crate::services::nps::NpsCampground;
use crate::services::pipeline::SyncContext;

const MAP_FILE_NAME: &str = "map.png";

#[derive(Debug, Clone, Default)]
pub struct CampgroundSyncReport {
    /// Entries returned upstream for the park
    pub processed: usize,
    pub images_added: usize,
    pub maps_added: usize,
    /// Entries whose record could not be saved
    pub failures: usize,
}

/// Merge an upstream entry into the stored campground (or a new one).
pub fn merge_campground(
    current: Option<Campground>,
    park_id: Uuid,
    incoming: &NpsCampground,
) -> Campground {
    let mut camp = current.unwrap_or_else(|| Campground::new(&incoming.id, park_id));
    camp.park_id = park_id;
    camp.name = incoming.name.clone();
    camp.description = incoming.description.clone();
    camp.latitude = parse_coordinate(&incoming.latitude);
    camp.longitude = parse_coordinate(&incoming.longitude);
    camp.reservation_info = incoming.reservation_info.clone();
    camp.reservation_url = incoming.reservation_url.clone();
    camp.directions_overview = incoming.directions_overview.clone();
    camp.weather_overview = incoming.weather_overview.clone();
    camp.reservable = parse_site_count(&incoming.number_of_sites_reservable);
    camp.first_come_first_serve =
        parse_site_count(&incoming.number_of_sites_first_come_first_serve);
    camp
}

/// First-come flag for the map pin. Anything but a literal "0" counts,
/// including a blank or non-numeric site count.
pub fn is_first_come(raw_site_count: &str) -> bool {
    raw_site_count.trim() != "0"
}

/// Sync every campground of `park_code`, attaching them to `park_id`.
///
/// Fails only when the campground list itself cannot be fetched or decoded.
pub async fn sync_campgrounds(
    ctx: &SyncContext,
    park_id: Uuid,
    park_code: &str,
) -> Result<CampgroundSyncReport, SyncError> {
    let entries = ctx.nps.fetch_campgrounds(park_code).await?;
    let mut report = CampgroundSyncReport {
        processed: entries.len(),
        ..Default::default()
    };

    for entry in &entries {
        if entry.id.trim().is_empty() {
            tracing::warn!("Skipping campground '{}' without an id", entry.name);
            report.failures += 1;
            continue;
        }

        let current = match ctx.store.find_campground_by_camp_id(&entry.id).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!("Error loading campground {}: {}", entry.id, e);
                report.failures += 1;
                continue;
            }
        };
        if current.is_none() {
            tracing::info!("Creating new record for campground {}", entry.id);
        }

        let mut camp = match ctx
            .store
            .save_campground(&merge_campground(current, park_id, entry))
            .await
        {
            Ok(camp) => camp,
            Err(e) => {
                tracing::warn!("Error saving campground {}: {}", entry.id, e);
                report.failures += 1;
                continue;
            }
        };

        let urls: Vec<String> = entry.images.iter().map(|i| i.url.clone()).collect();
        report.images_added +=
            ingest_photos(ctx.store.as_ref(), &ctx.transcoder, &mut camp, &urls).await;

        let first_come = is_first_come(&entry.number_of_sites_first_come_first_serve);
        if attach_map(ctx, &mut camp, first_come).await {
            report.maps_added += 1;
        }
    }

    Ok(report)
}

/// Fetch and store a map snapshot if `camp` has coordinates and no map yet.
/// Returns whether a map was added. Failures are logged, never propagated.
async fn attach_map(ctx: &SyncContext, camp: &mut Campground, first_come: bool) -> bool {
    if camp.map_image.is_some() {
        return false;
    }
    let (Some(lat), Some(lon)) = (camp.latitude, camp.longitude) else {
        return false;
    };

    let snapshot = match ctx.maps.fetch_snapshot(lat, lon, first_come).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("Error fetching map for campground {}: {}", camp.camp_id, e);
            return false;
        }
    };

    let name = match ctx
        .store
        .put_file(MAP_FILE_NAME, "png", "image/png", &snapshot.bytes)
        .await
    {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!("Error storing map for campground {}: {}", camp.camp_id, e);
            return false;
        }
    };

    camp.map_image = Some(name.clone());
    match ctx.store.save_campground(camp).await {
        Ok(saved) => {
            tracing::info!(
                "Adding map to campground {}: {:.1} kb",
                camp.camp_id,
                snapshot.size_kb()
            );
            *camp = saved;
            true
        }
        Err(e) => {
            tracing::warn!("Error saving map for campground {}: {}", camp.camp_id, e);
            camp.map_image = None;
            if let Err(e) = ctx.store.delete_file(&name).await {
                tracing::warn!("Error removing orphaned map {}: {}", name, e);
            }
            false
        }
    }
}
