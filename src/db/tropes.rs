use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::models::TropeAssignment;

/// Inserts an assignment unless `(book_id, trope)` is already stored.
///
/// Returns `true` when a row was written. The unique constraint decides,
/// so concurrent extractions cannot produce duplicates.
pub async fn insert_if_absent(
    conn: &mut SqliteConnection,
    book_id: i64,
    trope: &str,
    source: &str,
    confidence: f64,
    extracted_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO book_tropes (book_id, trope, source, confidence, extracted_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (book_id, trope) DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(trope)
    .bind(source)
    .bind(confidence)
    .bind(extracted_at)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn exists(
    conn: &mut SqliteConnection,
    book_id: i64,
    trope: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_tropes WHERE book_id = ? AND trope = ?)")
        .bind(book_id)
        .bind(trope)
        .fetch_one(conn)
        .await
}

/// True when at least one assignment is stored
pub async fn any(conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_tropes)")
        .fetch_one(conn)
        .await
}

/// True when `book_id` already has at least one assignment
pub async fn any_for_book(
    conn: &mut SqliteConnection,
    book_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_tropes WHERE book_id = ?)")
        .bind(book_id)
        .fetch_one(conn)
        .await
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<TropeAssignment>, sqlx::Error> {
    sqlx::query_as::<_, TropeAssignment>(
        r#"
        SELECT id, book_id, trope, source, confidence, extracted_at
        FROM book_tropes
        ORDER BY id
        "#,
    )
    .fetch_all(conn)
    .await
}

pub async fn list_for_book(
    conn: &mut SqliteConnection,
    book_id: i64,
) -> Result<Vec<TropeAssignment>, sqlx::Error> {
    sqlx::query_as::<_, TropeAssignment>(
        r#"
        SELECT id, book_id, trope, source, confidence, extracted_at
        FROM book_tropes
        WHERE book_id = ?
        ORDER BY id
        "#,
    )
    .bind(book_id)
    .fetch_all(conn)
    .await
}

/// `(trope, occurrences)` over every stored assignment
pub async fn counts(conn: &mut SqliteConnection) -> Result<Vec<(String, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (String, i64)>(
        "SELECT trope, COUNT(*) FROM book_tropes GROUP BY trope ORDER BY trope",
    )
    .fetch_all(conn)
    .await
}

/// Removes every assignment for every book, returning the number purged
pub async fn delete_all(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM book_tropes").execute(conn).await?;
    Ok(result.rows_affected())
}
