use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{
    error::{AppError, AppResult},
    models::{Job, JobKind},
};

use super::JobRunner;

/// Fire-and-forget job submission backed by a single worker task
///
/// `submit` persists the job and hands it to the worker over a channel, so
/// the caller gets the queued job back before any work happens. Jobs run
/// one at a time, in submission order.
#[derive(Clone)]
pub struct JobQueue {
    runner: JobRunner,
    job_tx: mpsc::UnboundedSender<Job>,
}

/// Handle for gracefully shutting down the job worker
pub struct JobWorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
    worker: JoinHandle<()>,
}

impl JobWorkerHandle {
    /// Stops the worker after it has run every job already submitted
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Job worker shutdown signal sent");
        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Job worker task panicked");
        }
    }
}

impl JobQueue {
    /// Creates the queue and spawns its worker task
    pub fn new(runner: JobRunner) -> (Self, JobWorkerHandle) {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker_runner = runner.clone();
        let worker = tokio::spawn(async move {
            Self::worker_task(worker_runner, job_rx, shutdown_rx).await;
        });

        (
            Self { runner, job_tx },
            JobWorkerHandle {
                shutdown_tx,
                worker,
            },
        )
    }

    /// Creates a queued job of `kind` and schedules it on the worker.
    ///
    /// Fails without leaving a job row behind when the worker has stopped.
    pub async fn submit(&self, kind: JobKind) -> AppResult<Job> {
        if self.job_tx.is_closed() {
            tracing::error!(job_type = %kind, "Job worker is not running");
            return Err(worker_stopped());
        }

        let job = self.runner.start(kind).await?;

        if self.job_tx.send(job.clone()).is_err() {
            tracing::error!(job_id = job.id, "Job worker stopped before the job was scheduled");
            if let Err(e) = self.runner.discard(job.id).await {
                tracing::warn!(job_id = job.id, error = %e, "Could not discard unscheduled job");
            }
            return Err(worker_stopped());
        }

        Ok(job)
    }

    pub fn runner(&self) -> &JobRunner {
        &self.runner
    }

    /// Runs jobs as they arrive; on shutdown, drains what is left then exits
    async fn worker_task(
        runner: JobRunner,
        mut job_rx: mpsc::UnboundedReceiver<Job>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Job worker started");

        loop {
            tokio::select! {
                Some(job) = job_rx.recv() => {
                    Self::execute(&runner, job).await;
                }
                Some(()) = shutdown_rx.recv() => {
                    let mut drained = 0;
                    while let Ok(job) = job_rx.try_recv() {
                        Self::execute(&runner, job).await;
                        drained += 1;
                    }
                    tracing::info!(drained, "Job worker drained pending jobs");
                    break;
                }
                else => break,
            }
        }

        tracing::info!("Job worker stopped");
    }

    async fn execute(runner: &JobRunner, job: Job) {
        if let Err(e) = runner.run(&job).await {
            tracing::error!(job_id = job.id, job_type = %job.job_type, error = %e, "Job failed");
        }
    }
}

fn worker_stopped() -> AppError {
    AppError::Internal("job worker is not running".to_string())
}
