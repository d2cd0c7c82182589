use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppResult,
    models::{LogEntry, NewLogEntry},
};

/// Sink for structured application events
///
/// Backend components report notable events (job progress, extraction
/// results, settings changes) through this trait so they can be listed
/// later from the logs endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Persist an event
    async fn record(&self, entry: NewLogEntry) -> AppResult<LogEntry>;
}

/// Records `entry` without letting a failure reach the caller
///
/// Logging must never abort the operation that emits it: errors are only
/// reported through `tracing`.
pub async fn log_event(sink: &dyn EventLog, entry: NewLogEntry) {
    if let Err(e) = sink.record(entry).await {
        tracing::warn!(error = %e, "Failed to record log event");
    }
}

/// Event log stored in the `log_entries` table and mirrored to `tracing`
#[derive(Clone)]
pub struct SqliteEventLog {
    pool: SqlitePool,
}

impl SqliteEventLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn trace(entry: &NewLogEntry) {
        let context = entry
            .context
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default();

        match entry.level.as_str() {
            "ERROR" | "CRITICAL" => {
                tracing::error!(source = %entry.source, context = %context, "{}", entry.message)
            }
            "WARN" | "WARNING" => {
                tracing::warn!(source = %entry.source, context = %context, "{}", entry.message)
            }
            "DEBUG" => {
                tracing::debug!(source = %entry.source, context = %context, "{}", entry.message)
            }
            _ => tracing::info!(source = %entry.source, context = %context, "{}", entry.message),
        }
    }
}

#[async_trait]
impl EventLog for SqliteEventLog {
    async fn record(&self, entry: NewLogEntry) -> AppResult<LogEntry> {
        Self::trace(&entry);
        let mut conn = self.pool.acquire().await?;
        let stored = db::logs::insert(&mut conn, &entry).await?;
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;

    #[tokio::test]
    async fn test_sqlite_event_log_persists_entries() {
        let pool = db::connect_in_memory().await.unwrap();
        let sink = SqliteEventLog::new(pool.clone());

        let stored = sink
            .record(
                NewLogEntry::new("info", "Settings updated", "backend")
                    .with_context(json!({"demo_mode": true})),
            )
            .await
            .unwrap();
        assert_eq!(stored.level, "INFO");
        assert_eq!(stored.context.as_ref().map(|c| c.0.clone()), Some(json!({"demo_mode": true})));

        let mut conn = pool.acquire().await.unwrap();
        let listed = db::logs::list(&mut conn, Some("INFO"), None, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].message, "Settings updated");
    }

    #[tokio::test]
    async fn test_log_event_swallows_sink_failures() {
        let mut sink = MockEventLog::new();
        sink.expect_record()
            .times(1)
            .returning(|_| Err(AppError::Internal("log store offline".into())));

        // Must return normally.
        log_event(&sink, NewLogEntry::new("INFO", "hello", "backend")).await;
    }
}
