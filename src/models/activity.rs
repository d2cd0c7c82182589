use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;

/// Persisted log event, from the backend or a client
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LogEntry {
    pub id: i64,
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<Value>,
}

impl NewLogEntry {
    /// Levels are stored upper-case
    pub fn new(level: &str, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            level: level.to_uppercase(),
            source: source.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }
}

/// A reaction a user left on a book
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Feedback {
    pub id: i64,
    pub book_id: i64,
    pub reaction: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewFeedback {
    pub book_id: i64,
    #[serde(default = "default_reaction")]
    pub reaction: String,
    pub note: Option<String>,
}

fn default_reaction() -> String {
    "neutral".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_is_normalized() {
        let entry = NewLogEntry::new("warning", "disk almost full", "backend")
            .with_context(json!({"free_mb": 12}));
        assert_eq!(entry.level, "WARNING");
        assert_eq!(entry.context, Some(json!({"free_mb": 12})));
    }

    #[test]
    fn test_feedback_reaction_defaults_to_neutral() {
        let feedback: NewFeedback = serde_json::from_value(json!({"book_id": 3})).unwrap();
        assert_eq!(feedback.reaction, "neutral");
        assert_eq!(feedback.note, None);
    }
}
