//! Background job lifecycle: `queued -> running -> completed | failed`.
//!
//! Jobs are plain rows in `sync_jobs`. Every status change is committed in
//! its own transaction, so a poller always observes a consistent state.

pub mod queue;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    db,
    error::{AppError, AppResult},
    models::{Job, JobKind, JobStatus, NewLogEntry},
    services::{
        event_log::{log_event, EventLog},
        library, TropeEngine,
    },
};

pub use queue::{JobQueue, JobWorkerHandle};

/// Log source used for job lifecycle events
const LOG_SOURCE: &str = "job-runner";

/// Creates, executes and reports on background jobs
#[derive(Clone)]
pub struct JobRunner {
    pool: SqlitePool,
    tropes: TropeEngine,
    events: Arc<dyn EventLog>,
    sync_delay: Duration,
}

impl JobRunner {
    pub fn new(pool: SqlitePool, tropes: TropeEngine, events: Arc<dyn EventLog>) -> Self {
        Self {
            pool,
            tropes,
            events,
            sync_delay: Duration::ZERO,
        }
    }

    /// Simulated latency of the external library sync
    pub fn with_sync_delay(mut self, sync_delay: Duration) -> Self {
        self.sync_delay = sync_delay;
        self
    }

    /// Persists a new job in `queued` state and returns it without running it
    pub async fn start(&self, kind: JobKind) -> AppResult<Job> {
        let mut tx = self.pool.begin().await?;
        let job = db::jobs::insert(
            &mut *tx,
            kind,
            JobStatus::Queued,
            Some(kind.queued_message()),
            Utc::now(),
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(job_id = job.id, job_type = %kind, "Job queued");
        Ok(job)
    }

    /// Executes a queued job to completion.
    ///
    /// A job that no longer exists is skipped silently. If the work fails the
    /// job is marked `failed` and the error is returned.
    #[instrument(skip(self, job), fields(job_id = job.id, job_type = %job.job_type))]
    pub async fn run(&self, job: &Job) -> AppResult<()> {
        log_event(
            self.events.as_ref(),
            NewLogEntry::new("INFO", format!("Starting {} job", job.job_type), LOG_SOURCE)
                .with_context(json!({ "job_id": job.id })),
        )
        .await;

        if self.transition(job.id, JobStatus::Running, None).await?.is_none() {
            tracing::debug!("Job no longer exists, skipping");
            return Ok(());
        }

        match self.perform(job.job_type).await {
            Ok(message) => {
                if self
                    .transition(job.id, JobStatus::Completed, Some(message))
                    .await?
                    .is_none()
                {
                    tracing::debug!("Job removed while running, result dropped");
                    return Ok(());
                }

                log_event(
                    self.events.as_ref(),
                    NewLogEntry::new("INFO", format!("{} job completed", job.job_type), LOG_SOURCE)
                        .with_context(json!({ "job_id": job.id })),
                )
                .await;
                Ok(())
            }
            Err(e) => {
                if let Err(mark_err) = self
                    .transition(job.id, JobStatus::Failed, Some(e.to_string()))
                    .await
                {
                    tracing::warn!(error = %mark_err, "Could not mark job as failed");
                }

                log_event(
                    self.events.as_ref(),
                    NewLogEntry::new("ERROR", format!("{} job failed", job.job_type), LOG_SOURCE)
                        .with_context(json!({ "job_id": job.id, "error": e.to_string() })),
                )
                .await;
                Err(e)
            }
        }
    }

    /// Most recently started job of any of `kinds`
    pub async fn last(&self, kinds: &[JobKind]) -> AppResult<Option<Job>> {
        let mut conn = self.pool.acquire().await?;
        let job = db::jobs::latest(&mut conn, kinds).await?;
        Ok(job)
    }

    pub async fn get(&self, id: i64) -> AppResult<Option<Job>> {
        let mut conn = self.pool.acquire().await?;
        let job = db::jobs::get(&mut conn, id).await?;
        Ok(job)
    }

    /// Drops a queued job that will never be handed to a worker
    pub async fn discard(&self, id: i64) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        if db::jobs::delete(&mut conn, id).await? {
            tracing::debug!(job_id = id, "Discarded unscheduled job");
        }
        Ok(())
    }

    /// Task-specific work, returning the completion message
    async fn perform(&self, kind: JobKind) -> AppResult<String> {
        match kind {
            JobKind::LibrarySync => {
                tokio::time::sleep(self.sync_delay).await;
                let seeded = library::seed_if_empty(&self.pool).await?;
                Ok(if seeded > 0 {
                    "Demo sync populated seed titles".to_string()
                } else {
                    "Demo sync found an existing library".to_string()
                })
            }
            JobKind::TropeExtraction => {
                let processed = self.tropes.extract(false).await?;
                Ok(format!("Trope extraction added {processed} assignments"))
            }
            JobKind::TropeRefresh => {
                let processed = self.tropes.extract(true).await?;
                Ok(format!("Trope refresh rebuilt {processed} assignments"))
            }
        }
    }

    /// Moves a stored job to `next`, returning `None` when it does not exist
    async fn transition(
        &self,
        job_id: i64,
        next: JobStatus,
        message: Option<String>,
    ) -> AppResult<Option<Job>> {
        let mut tx = self.pool.begin().await?;

        let Some(mut job) = db::jobs::get(&mut *tx, job_id).await? else {
            return Ok(None);
        };

        if !job.status.can_transition_to(next) {
            return Err(AppError::Internal(format!(
                "job {} cannot move from {:?} to {:?}",
                job_id, job.status, next
            )));
        }

        job.status = next;
        if message.is_some() {
            job.message = message;
        }
        if next.is_terminal() {
            job.finished_at = Some(Utc::now());
        }

        db::jobs::update(&mut *tx, &job).await?;
        tx.commit().await?;

        tracing::debug!(status = ?next, "Job status updated");
        Ok(Some(job))
    }
}
