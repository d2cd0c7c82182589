use serde::{Deserialize, Serialize};

/// Single-row application settings
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AppSettings {
    #[serde(skip)]
    pub id: i64,
    /// Audiobookshelf base URL
    pub abs_url: Option<String>,
    /// Audiobookshelf API token, write-only
    #[serde(skip)]
    pub abs_token: Option<String>,
    pub google_books_api_key: Option<String>,
    pub open_library_enabled: bool,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub llm_provider: String,
    pub llm_model: String,
    pub demo_mode: bool,
}

/// Partial settings update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsUpdate {
    pub abs_url: Option<String>,
    pub abs_token: Option<String>,
    pub google_books_api_key: Option<String>,
    pub open_library_enabled: Option<bool>,
    pub embedding_provider: Option<String>,
    pub embedding_model: Option<String>,
    pub llm_provider: Option<String>,
    pub llm_model: Option<String>,
    pub demo_mode: Option<bool>,
}

impl AppSettings {
    /// Overwrites every field the update carries
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(abs_url) = update.abs_url {
            self.abs_url = Some(abs_url);
        }
        if let Some(abs_token) = update.abs_token {
            self.abs_token = Some(abs_token);
        }
        if let Some(key) = update.google_books_api_key {
            self.google_books_api_key = Some(key);
        }
        if let Some(enabled) = update.open_library_enabled {
            self.open_library_enabled = enabled;
        }
        if let Some(provider) = update.embedding_provider {
            self.embedding_provider = provider;
        }
        if let Some(model) = update.embedding_model {
            self.embedding_model = model;
        }
        if let Some(provider) = update.llm_provider {
            self.llm_provider = provider;
        }
        if let Some(model) = update.llm_model {
            self.llm_model = model;
        }
        if let Some(demo_mode) = update.demo_mode {
            self.demo_mode = demo_mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> AppSettings {
        AppSettings {
            id: 1,
            abs_url: None,
            abs_token: None,
            google_books_api_key: None,
            open_library_enabled: true,
            embedding_provider: "openai".into(),
            embedding_model: "text-embedding-3-small".into(),
            llm_provider: "openai".into(),
            llm_model: "gpt-4o-mini".into(),
            demo_mode: true,
        }
    }

    #[test]
    fn test_apply_only_touches_provided_fields() {
        let mut settings = defaults();
        settings.apply(SettingsUpdate {
            abs_url: Some("http://localhost:1337".into()),
            demo_mode: Some(false),
            ..Default::default()
        });
        assert_eq!(settings.abs_url.as_deref(), Some("http://localhost:1337"));
        assert!(!settings.demo_mode);
        assert_eq!(settings.llm_model, "gpt-4o-mini");
        assert!(settings.open_library_enabled);
    }

    #[test]
    fn test_token_is_never_serialized() {
        let mut settings = defaults();
        settings.abs_token = Some("secret".into());
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("abs_token").is_none());
        assert!(json.get("id").is_none());
        assert_eq!(json["embedding_provider"], "openai");
    }
}
