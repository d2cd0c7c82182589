use sqlx::SqliteConnection;

use crate::models::{Book, NewBook};

pub async fn insert(conn: &mut SqliteConnection, book: &NewBook) -> Result<Book, sqlx::Error> {
    sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO books (title, author, description, cover_url, reason)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, title, author, description, cover_url, reason
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.description)
    .bind(&book.cover_url)
    .bind(&book.reason)
    .fetch_one(conn)
    .await
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Option<Book>, sqlx::Error> {
    sqlx::query_as::<_, Book>(
        "SELECT id, title, author, description, cover_url, reason FROM books WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Books in insertion order, optionally capped
pub async fn list(
    conn: &mut SqliteConnection,
    limit: Option<i64>,
) -> Result<Vec<Book>, sqlx::Error> {
    sqlx::query_as::<_, Book>(
        r#"
        SELECT id, title, author, description, cover_url, reason
        FROM books
        ORDER BY id
        LIMIT ?
        "#,
    )
    // SQLite treats a negative LIMIT as "no limit"
    .bind(limit.unwrap_or(-1))
    .fetch_all(conn)
    .await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(conn)
        .await
}
