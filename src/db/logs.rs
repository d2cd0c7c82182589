use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::models::{LogEntry, NewLogEntry};

pub async fn insert(
    conn: &mut SqliteConnection,
    entry: &NewLogEntry,
) -> Result<LogEntry, sqlx::Error> {
    sqlx::query_as::<_, LogEntry>(
        r#"
        INSERT INTO log_entries (level, source, message, context, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, level, source, message, context, created_at
        "#,
    )
    .bind(&entry.level)
    .bind(&entry.source)
    .bind(&entry.message)
    .bind(entry.context.as_ref().map(Json))
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

/// Newest entries first, optionally filtered by level and source
pub async fn list(
    conn: &mut SqliteConnection,
    level: Option<&str>,
    source: Option<&str>,
    limit: i64,
) -> Result<Vec<LogEntry>, sqlx::Error> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, level, source, message, context, created_at FROM log_entries WHERE 1 = 1",
    );
    if let Some(level) = level {
        query.push(" AND level = ").push_bind(level.to_uppercase());
    }
    if let Some(source) = source {
        query.push(" AND source = ").push_bind(source.to_string());
    }
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(limit);

    query.build_query_as::<LogEntry>().fetch_all(conn).await
}
