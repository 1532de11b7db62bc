//! Recurring park sync.
//!
//! The returned [`JobScheduler`] must be kept alive for the lifetime of the
//! process; dropping it stops the job.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::services::pipeline::{ParkSyncOutcome, Pipeline};

/// Build and start the scheduler with the park sync on `cron`
/// (six fields, seconds first, e.g. `0 0 0 * * Sun`).
pub async fn build_scheduler(
    pipeline: Pipeline,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = pipeline.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting park sync");
            match pipeline.sync_parks().await {
                Ok(ParkSyncOutcome::Completed(summary)) => {
                    tracing::info!("scheduler: park sync complete: {}", summary)
                }
                Ok(ParkSyncOutcome::AlreadyRunning) => {
                    tracing::info!("scheduler: park sync already in progress, skipping")
                }
                Err(e) => tracing::error!(error = %e, "scheduler: park sync failed"),
            }
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    tracing::info!("Park sync scheduled with cron '{}'", cron);
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::db::store::RecordStore;
    use crate::services::pipeline::tests::test_context;
    use std::sync::Arc;

    fn pipeline() -> Pipeline {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        Pipeline::new(test_context(store, "http://127.0.0.1:9"))
    }

    #[tokio::test]
    async fn test_rejects_invalid_cron() {
        assert!(build_scheduler(pipeline(), "every sunday").await.is_err());
    }

    #[tokio::test]
    async fn test_weekly_cron_is_accepted() {
        let mut scheduler = build_scheduler(pipeline(), "0 0 0 * * Sun").await.unwrap();
        scheduler.shutdown().await.unwrap();
    }
}
