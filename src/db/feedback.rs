use chrono::Utc;
use sqlx::SqliteConnection;

use crate::models::{Feedback, NewFeedback};

pub async fn insert(
    conn: &mut SqliteConnection,
    feedback: &NewFeedback,
) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        r#"
        INSERT INTO feedback (book_id, reaction, note, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, book_id, reaction, note, created_at
        "#,
    )
    .bind(feedback.book_id)
    .bind(&feedback.reaction)
    .bind(&feedback.note)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

/// Newest feedback first
pub async fn list(conn: &mut SqliteConnection, limit: i64) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        r#"
        SELECT id, book_id, reaction, note, created_at
        FROM feedback
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(conn)
    .await
}
