use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppResult,
    models::{AppSettings, NewLogEntry, SettingsUpdate},
    services::event_log::{log_event, EventLog},
};

/// Current settings, created with defaults on first access
pub async fn get_settings_snapshot(pool: &SqlitePool) -> AppResult<AppSettings> {
    let mut tx = pool.begin().await?;
    let settings = db::settings::get_or_create(&mut *tx).await?;
    tx.commit().await?;
    Ok(settings)
}

/// Applies a partial update and returns the resulting settings
pub async fn update_settings(
    pool: &SqlitePool,
    events: &dyn EventLog,
    update: SettingsUpdate,
) -> AppResult<AppSettings> {
    let mut tx = pool.begin().await?;
    let mut settings = db::settings::get_or_create(&mut *tx).await?;
    settings.apply(update);
    db::settings::update(&mut *tx, &settings).await?;
    tx.commit().await?;

    log_event(
        events,
        NewLogEntry::new("INFO", "Settings updated", "backend").with_context(json!({
            "abs_url": settings.abs_url.is_some(),
            "demo_mode": settings.demo_mode,
        })),
    )
    .await;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::event_log::SqliteEventLog;

    #[tokio::test]
    async fn test_snapshot_starts_from_defaults() {
        let pool = db::connect_in_memory().await.unwrap();
        let settings = get_settings_snapshot(&pool).await.unwrap();
        assert_eq!(settings.abs_url, None);
        assert!(settings.open_library_enabled);
        assert_eq!(settings.embedding_model, "text-embedding-3-small");
        assert_eq!(settings.llm_model, "gpt-4o-mini");
        assert!(settings.demo_mode);

        // A second read reuses the same row.
        let again = get_settings_snapshot(&pool).await.unwrap();
        assert_eq!(again.id, settings.id);
    }

    #[tokio::test]
    async fn test_update_persists_and_logs() {
        let pool = db::connect_in_memory().await.unwrap();
        let events = SqliteEventLog::new(pool.clone());

        let update = SettingsUpdate {
            abs_url: Some("http://localhost:1337".into()),
            abs_token: Some("token".into()),
            demo_mode: Some(false),
            ..Default::default()
        };
        let updated = update_settings(&pool, &events, update).await.unwrap();
        assert_eq!(updated.abs_url.as_deref(), Some("http://localhost:1337"));
        assert!(!updated.demo_mode);

        let stored = get_settings_snapshot(&pool).await.unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.abs_token.as_deref(), Some("token"));

        let mut conn = pool.acquire().await.unwrap();
        let logs = db::logs::list(&mut conn, None, Some("backend"), 10).await.unwrap();
        assert_eq!(logs[0].message, "Settings updated");
    }
}
