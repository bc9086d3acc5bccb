use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::schedule::DailySchedule;
use crate::config::AppConfig;
use crate::digest::DigestRecord;
use crate::pipeline::DigestPipeline;
use crate::Result;

/// Snapshot of the scheduler for status endpoints
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub next_run: Option<DateTime<Local>>,
    pub schedule: String,
}

/// Background service that runs the digest pipeline once a day
pub struct SchedulerService {
    pipeline: Arc<DigestPipeline>,
    schedule: DailySchedule,
    enabled: bool,
    running: AtomicBool,
}

impl SchedulerService {
    pub fn new(pipeline: Arc<DigestPipeline>, schedule: DailySchedule, enabled: bool) -> Self {
        Self {
            pipeline,
            schedule,
            enabled,
            running: AtomicBool::new(false),
        }
    }

    pub fn from_config(pipeline: Arc<DigestPipeline>, config: &AppConfig) -> Result<Self> {
        let schedule = DailySchedule::from_config(&config.schedule)?;
        Ok(Self::new(pipeline, schedule, config.schedule.enabled))
    }

    pub fn pipeline(&self) -> &Arc<DigestPipeline> {
        &self.pipeline
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// When the timer will next fire, if it is enabled
    pub fn next_run_time(&self) -> Option<DateTime<Local>> {
        self.enabled.then(|| self.schedule.next_after(&Local::now()))
    }

    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.is_running(),
            next_run: self.next_run_time(),
            schedule: self.schedule.describe(),
        }
    }

    /// Run the pipeline immediately, outside the daily timer
    pub async fn run_now(&self) -> DigestRecord {
        info!("Running digest generation on demand");
        let record = self.pipeline.run().await;
        Self::log_outcome(&record);
        record
    }

    /// Run the daily timer until shutdown signal
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if !self.enabled {
            info!("Daily digest scheduler disabled");
            // Still wait for shutdown
            let _ = shutdown.changed().await;
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        info!("Scheduler started: {}", self.schedule.describe());

        loop {
            let now = Local::now();
            let next = self.schedule.next_after(&now);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!("Next digest run at {}", next.to_rfc3339());

            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                _ = tokio::time::sleep(wait) => {
                    debug!("Running scheduled digest generation");
                    let record = self.pipeline.run().await;
                    Self::log_outcome(&record);
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("Scheduler stopped");
    }

    fn log_outcome(record: &DigestRecord) {
        match &record.error {
            None => info!("Digest generated with {} articles", record.article_count),
            Some(e) if record.article_count == 0 => warn!("Digest run produced nothing: {}", e),
            Some(e) => error!("Digest run failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::pipeline;
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn service(enabled: bool, dir: &std::path::Path) -> Arc<SchedulerService> {
        let pipeline = Arc::new(pipeline(&[], None, dir));
        let schedule = DailySchedule::new(3, 0).unwrap();
        Arc::new(SchedulerService::new(pipeline, schedule, enabled))
    }

    #[tokio::test]
    async fn test_scheduler_shutdown() {
        let tmp = TempDir::new().unwrap();
        let service = service(true, tmp.path());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = {
            let service = service.clone();
            tokio::spawn(async move { service.run(shutdown_rx).await })
        };

        // Give the loop a chance to start
        for _ in 0..50 {
            if service.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(service.is_running());

        shutdown_tx.send(true).unwrap();
        let result = timeout(Duration::from_secs(1), task).await;
        assert!(result.is_ok());
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_disabled_scheduler_waits_for_shutdown() {
        let tmp = TempDir::new().unwrap();
        let service = service(false, tmp.path());
        assert_eq!(service.next_run_time(), None);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = {
            let service = service.clone();
            tokio::spawn(async move { service.run(shutdown_rx).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());
        assert!(!service.is_running());

        shutdown_tx.send(true).unwrap();
        assert!(timeout(Duration::from_secs(1), task).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_and_run_now() {
        let tmp = TempDir::new().unwrap();
        let service = service(true, tmp.path());

        let status = service.status();
        assert!(!status.running);
        assert_eq!(status.schedule, "03:00 daily");
        assert!(status.next_run.unwrap() > Local::now());

        // No sources configured, so the run reports an empty fetch
        let record = service.run_now().await;
        assert_eq!(record.error.as_deref(), Some("No articles fetched"));
    }
}
