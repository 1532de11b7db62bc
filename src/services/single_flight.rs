//! Single-flight guard: at most one run of a job at a time, process-wide.
//!
//! A caller that finds the job already running gets `None` back immediately;
//! it neither waits nor queues. The flag is released when the permit drops,
//! so a failing or panicking run cannot leave the job locked.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct SingleFlight {
    running: AtomicBool,
}

/// Proof that the holder owns the in-flight slot. Releases it on drop.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    running: &'a AtomicBool,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` if a run is already in flight.
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| FlightPermit {
                running: &self.running,
            })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run `job` if nothing else is in flight. `None` means it was skipped.
    pub async fn run<F, Fut, T>(&self, job: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _permit = self.try_acquire()?;
        Some(job().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::Notify;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let flight = SingleFlight::new();
        let permit = flight.try_acquire().expect("first acquire");
        assert!(flight.is_running());
        assert!(flight.try_acquire().is_none());
        drop(permit);
        assert!(!flight.is_running());
        assert!(flight.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_runs_execute_once() {
        let flight = Arc::new(SingleFlight::new());
        let executions = Arc::new(AtomicUsize::new(0));
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());

        let first = {
            let flight = flight.clone();
            let executions = executions.clone();
            let entered = entered.clone();
            let release = release.clone();
            tokio::spawn(async move {
                flight
                    .run(|| async {
                        executions.fetch_add(1, Ordering::SeqCst);
                        entered.notify_one();
                        release.notified().await;
                    })
                    .await
            })
        };

        entered.notified().await;

        let second = flight
            .run(|| async {
                executions.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert!(second.is_none(), "second call is a no-op while the first runs");

        release.notify_one();
        assert!(first.await.unwrap().is_some());
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(!flight.is_running());
    }

    #[tokio::test]
    async fn test_released_after_failed_run() {
        let flight = SingleFlight::new();
        let result: Option<Result<(), String>> =
            flight.run(|| async { Err("catalog down".to_string()) }).await;
        assert_eq!(result, Some(Err("catalog down".to_string())));
        assert!(!flight.is_running());
    }
}
