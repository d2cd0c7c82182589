use serde::{Deserialize, Serialize};

/// A book in the user's library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    /// Free-text reason the book was added (seeded titles carry one)
    pub reason: Option<String>,
}

/// Fields needed to insert a book; the id is assigned by storage
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub reason: Option<String>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: None,
            cover_url: None,
            reason: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// A stored book suggested back to the user with a jittered score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryRecommendation {
    pub id: i64,
    pub book: Book,
    pub score: f64,
    pub explanation: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}
