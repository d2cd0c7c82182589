use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::jobs::{JobQueue, JobRunner, JobWorkerHandle};
use crate::services::{EventLog, SharedRng, SqliteEventLog, TropeEngine};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub events: Arc<dyn EventLog>,
    pub rng: SharedRng,
    pub tropes: TropeEngine,
    pub jobs: JobQueue,
}

impl AppState {
    /// Wires the services around `pool` and starts the job worker.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(pool: SqlitePool, rng: SharedRng, sync_delay: Duration) -> (Self, JobWorkerHandle) {
        let events: Arc<dyn EventLog> = Arc::new(SqliteEventLog::new(pool.clone()));
        let tropes = TropeEngine::new(pool.clone(), rng.clone(), events.clone());
        let runner = JobRunner::new(pool.clone(), tropes.clone(), events.clone())
            .with_sync_delay(sync_delay);
        let (jobs, worker) = JobQueue::new(runner);

        let state = Self {
            pool,
            events,
            rng,
            tropes,
            jobs,
        };

        (state, worker)
    }
}
