//! Client logs and reader feedback.

use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{
    db,
    error::{AppError, AppResult},
    models::{Feedback, LogEntry, NewFeedback, NewLogEntry},
    services::event_log::{log_event, EventLog},
};

/// Default page size when listing logs
pub const DEFAULT_LOG_LIMIT: i64 = 100;

/// Default page size when listing feedback
pub const DEFAULT_FEEDBACK_LIMIT: i64 = 50;

/// Log event reported by a frontend
#[derive(Debug, Clone, Deserialize)]
pub struct ClientLogEntry {
    #[serde(default = "default_client_level")]
    pub level: String,
    #[serde(default = "default_client_source")]
    pub source: String,
    pub message: String,
    pub context: Option<Value>,
}

fn default_client_level() -> String {
    "ERROR".to_string()
}

fn default_client_source() -> String {
    "frontend".to_string()
}

/// Stores a client log. Unlike backend events this write must succeed.
pub async fn record_client_log(events: &dyn EventLog, entry: ClientLogEntry) -> AppResult<LogEntry> {
    let mut new_entry = NewLogEntry::new(&entry.level, entry.message, entry.source);
    if let Some(context) = entry.context {
        new_entry = new_entry.with_context(context);
    }
    events.record(new_entry).await
}

pub async fn fetch_logs(
    pool: &SqlitePool,
    level: Option<&str>,
    source: Option<&str>,
    limit: Option<i64>,
) -> AppResult<Vec<LogEntry>> {
    let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT);
    if limit < 1 {
        return Err(AppError::InvalidInput("limit must be positive".to_string()));
    }

    let mut conn = pool.acquire().await?;
    let entries = db::logs::list(&mut conn, level, source, limit).await?;
    Ok(entries)
}

pub async fn record_feedback(
    pool: &SqlitePool,
    events: &dyn EventLog,
    feedback: NewFeedback,
) -> AppResult<Feedback> {
    let stored = {
        let mut tx = pool.begin().await?;
        if db::books::get(&mut *tx, feedback.book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("book {}", feedback.book_id)));
        }
        let stored = db::feedback::insert(&mut *tx, &feedback).await?;
        tx.commit().await?;
        stored
    };

    log_event(
        events,
        NewLogEntry::new("INFO", "Feedback captured", "backend").with_context(json!({
            "book_id": stored.book_id,
            "reaction": stored.reaction,
        })),
    )
    .await;

    Ok(stored)
}

pub async fn fetch_feedback(pool: &SqlitePool, limit: Option<i64>) -> AppResult<Vec<Feedback>> {
    let limit = limit.unwrap_or(DEFAULT_FEEDBACK_LIMIT);
    if limit < 1 {
        return Err(AppError::InvalidInput("limit must be positive".to_string()));
    }

    let mut conn = pool.acquire().await?;
    let feedback = db::feedback::list(&mut conn, limit).await?;
    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use crate::services::event_log::SqliteEventLog;

    #[tokio::test]
    async fn test_client_log_defaults() {
        let pool = db::connect_in_memory().await.unwrap();
        let events = SqliteEventLog::new(pool.clone());

        let entry: ClientLogEntry =
            serde_json::from_value(json!({"message": "render failed"})).unwrap();
        let stored = record_client_log(&events, entry).await.unwrap();
        assert_eq!(stored.level, "ERROR");
        assert_eq!(stored.source, "frontend");

        let errors = fetch_logs(&pool, Some("error"), Some("frontend"), None)
            .await
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(fetch_logs(&pool, Some("INFO"), None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logs_are_listed_newest_first() {
        let pool = db::connect_in_memory().await.unwrap();
        let events = SqliteEventLog::new(pool.clone());
        for message in ["first", "second", "third"] {
            events
                .record(NewLogEntry::new("INFO", message, "backend"))
                .await
                .unwrap();
        }

        let logs = fetch_logs(&pool, None, None, Some(2)).await.unwrap();
        let messages: Vec<&str> = logs.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second"]);
    }

    #[tokio::test]
    async fn test_feedback_round_trip() {
        let pool = db::connect_in_memory().await.unwrap();
        let events = SqliteEventLog::new(pool.clone());
        let book = {
            let mut conn = pool.acquire().await.unwrap();
            db::books::insert(&mut conn, &NewBook::new("Moonlit Oath", "Isla Fenwick"))
                .await
                .unwrap()
        };

        let feedback = NewFeedback {
            book_id: book.id,
            reaction: "love".into(),
            note: Some("More witches please".into()),
        };
        let stored = record_feedback(&pool, &events, feedback).await.unwrap();
        assert_eq!(stored.reaction, "love");

        let listed = fetch_feedback(&pool, None).await.unwrap();
        assert_eq!(listed, vec![stored]);

        let logs = fetch_logs(&pool, None, Some("backend"), None).await.unwrap();
        assert_eq!(logs[0].message, "Feedback captured");
    }

    #[tokio::test]
    async fn test_feedback_for_unknown_book_is_rejected() {
        let pool = db::connect_in_memory().await.unwrap();
        let events = SqliteEventLog::new(pool.clone());

        let result = record_feedback(
            &pool,
            &events,
            NewFeedback {
                book_id: 404,
                reaction: "meh".into(),
                note: None,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
