use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::models::{Job, JobKind, JobStatus};

const JOB_COLUMNS: &str = "id, job_type, status, message, started_at, finished_at";

pub async fn insert(
    conn: &mut SqliteConnection,
    kind: JobKind,
    status: JobStatus,
    message: Option<&str>,
    started_at: DateTime<Utc>,
) -> Result<Job, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!(
        "INSERT INTO sync_jobs (job_type, status, message, started_at) VALUES (?, ?, ?, ?) RETURNING {JOB_COLUMNS}"
    ))
    .bind(kind)
    .bind(status)
    .bind(message)
    .bind(started_at)
    .fetch_one(conn)
    .await
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM sync_jobs WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Writes the new status, message and finish time of a job
pub async fn update(conn: &mut SqliteConnection, job: &Job) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE sync_jobs SET status = ?, message = ?, finished_at = ? WHERE id = ?")
        .bind(job.status)
        .bind(&job.message)
        .bind(job.finished_at)
        .bind(job.id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Removes a job row, returning whether one existed
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sync_jobs WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Most recently started job among `kinds`
pub async fn latest(
    conn: &mut SqliteConnection,
    kinds: &[JobKind],
) -> Result<Option<Job>, sqlx::Error> {
    if kinds.is_empty() {
        return Ok(None);
    }

    let placeholders = vec!["?"; kinds.len()].join(", ");
    let sql = format!(
        "SELECT {JOB_COLUMNS} FROM sync_jobs WHERE job_type IN ({placeholders}) ORDER BY started_at DESC, id DESC LIMIT 1"
    );

    let mut query = sqlx::query_as::<_, Job>(&sql);
    for kind in kinds {
        query = query.bind(*kind);
    }
    query.fetch_optional(conn).await
}
