//! Alert refresh: drop every stored alert, then rebuild from upstream.
//!
//! The delete and the inserts are not one transaction. If the run fails
//! midway the table holds only the alerts inserted so far until the next
//! refresh.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

use crate::db::models::NewAlert;
use crate::errors::SyncError;
use crate::services::pipeline::SyncContext;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AlertRefreshSummary {
    /// Alerts deleted before the rebuild
    pub removed: u64,
    pub parks: usize,
    pub inserted: usize,
    pub failures: usize,
}

impl fmt::Display for AlertRefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} removed, {} inserted across {} parks, {} failures",
            self.removed, self.inserted, self.parks, self.failures
        )
    }
}

pub async fn refresh_alerts(ctx: &SyncContext) -> Result<AlertRefreshSummary, SyncError> {
    ctx.nps.require_api_key()?;

    let removed = ctx.store.delete_all_alerts().await?;
    tracing::debug!("Removed {} alerts", removed);

    let parks = ctx.store.list_parks().await?;
    let mut summary = AlertRefreshSummary {
        removed,
        parks: parks.len(),
        ..Default::default()
    };

    for park in &parks {
        let alerts = match ctx.nps.fetch_alerts(&park.park_code).await {
            Ok(alerts) => alerts,
            Err(e) => {
                tracing::warn!("Error fetching alerts for park {}: {}", park.park_code, e);
                summary.failures += 1;
                continue;
            }
        };

        for alert in alerts {
            let new_alert = NewAlert {
                park_id: park.id,
                title: alert.title,
                description: alert.description,
                category: alert.category,
                url: alert.url,
            };
            match ctx.store.insert_alert(&new_alert).await {
                Ok(_) => summary.inserted += 1,
                Err(e) => {
                    tracing::warn!("Error saving alert for park {}: {}", park.park_code, e);
                    summary.failures += 1;
                }
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::models::Park;
    use crate::db::store::RecordStore;
    use crate::services::pipeline::tests::test_context;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_alerts(server: &MockServer, park_code: &str, titles: &[&str]) {
        let data: Vec<serde_json::Value> = titles
            .iter()
            .map(|t| {
                serde_json::json!({
                    "title": t,
                    "description": format!("{} details", t),
                    "category": "Park Closure",
                    "url": "https://www.nps.gov/"
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/alerts"))
            .and(query_param("parkCode", park_code))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_refresh_replaces_all_alerts() {
        let server = MockServer::start().await;
        mount_alerts(&server, "yose", &["Tioga Road closed", "Chain controls"]).await;
        mount_alerts(&server, "acad", &["Cadillac Summit Road reservations"]).await;

        let store = Arc::new(MemoryStore::new());
        let yose = store.save_park(&Park::new("yose")).await.unwrap();
        let acad = store.save_park(&Park::new("acad")).await.unwrap();
        store
            .insert_alert(&NewAlert {
                park_id: yose.id,
                title: "Old alert".to_string(),
                description: String::new(),
                category: "Information".to_string(),
                url: String::new(),
            })
            .await
            .unwrap();

        let ctx = test_context(store.clone(), &server.uri());
        let summary = refresh_alerts(&ctx).await.unwrap();
        assert_eq!(summary.removed, 1);
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.failures, 0);

        let alerts = store.list_alerts().await.unwrap();
        assert_eq!(alerts.len(), 3);
        assert!(alerts.iter().all(|a| a.title != "Old alert"));
        assert_eq!(alerts.iter().filter(|a| a.park_id == yose.id).count(), 2);
        assert_eq!(alerts.iter().filter(|a| a.park_id == acad.id).count(), 1);
    }

    #[tokio::test]
    async fn test_failing_park_does_not_stop_refresh() {
        let server = MockServer::start().await;
        mount_alerts(&server, "yose", &["Tioga Road closed"]).await;
        Mock::given(method("GET"))
            .and(path("/alerts"))
            .and(query_param("parkCode", "acad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryStore::new());
        store.save_park(&Park::new("acad")).await.unwrap();
        store.save_park(&Park::new("yose")).await.unwrap();

        let ctx = test_context(store.clone(), &server.uri());
        let summary = refresh_alerts(&ctx).await.unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.failures, 1);
    }
}
