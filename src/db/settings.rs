use sqlx::SqliteConnection;

use crate::models::AppSettings;

const SETTINGS_COLUMNS: &str = "id, abs_url, abs_token, google_books_api_key, open_library_enabled, \
     embedding_provider, embedding_model, llm_provider, llm_model, demo_mode";

/// Returns the settings row, inserting the column defaults on first use
pub async fn get_or_create(conn: &mut SqliteConnection) -> Result<AppSettings, sqlx::Error> {
    let existing = sqlx::query_as::<_, AppSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM app_settings ORDER BY id LIMIT 1"
    ))
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(settings) = existing {
        return Ok(settings);
    }

    sqlx::query_as::<_, AppSettings>(&format!(
        "INSERT INTO app_settings DEFAULT VALUES RETURNING {SETTINGS_COLUMNS}"
    ))
    .fetch_one(conn)
    .await
}

pub async fn update(conn: &mut SqliteConnection, settings: &AppSettings) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE app_settings
        SET abs_url = ?, abs_token = ?, google_books_api_key = ?, open_library_enabled = ?,
            embedding_provider = ?, embedding_model = ?, llm_provider = ?, llm_model = ?,
            demo_mode = ?
        WHERE id = ?
        "#,
    )
    .bind(&settings.abs_url)
    .bind(&settings.abs_token)
    .bind(&settings.google_books_api_key)
    .bind(settings.open_library_enabled)
    .bind(&settings.embedding_provider)
    .bind(&settings.embedding_model)
    .bind(&settings.llm_provider)
    .bind(&settings.llm_model)
    .bind(settings.demo_mode)
    .bind(settings.id)
    .execute(conn)
    .await?;
    Ok(())
}
