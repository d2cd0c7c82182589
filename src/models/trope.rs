use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A trope attached to a stored book. `(book_id, trope)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TropeAssignment {
    pub id: i64,
    pub book_id: i64,
    pub trope: String,
    /// Label of whatever produced the assignment (e.g. "demo-llm")
    pub source: String,
    pub confidence: Option<f64>,
    pub extracted_at: DateTime<Utc>,
}

/// Entry of the static, in-memory pool of recommendable books
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateBook {
    pub id: &'static str,
    pub title: &'static str,
    pub author: &'static str,
    pub description: &'static str,
    pub cover_url: &'static str,
    pub tropes: &'static [&'static str],
    pub explanation: &'static str,
}

/// Frequency of every trope across the stored assignments.
///
/// Rebuilt from storage on every request and never cached, so the count
/// for a trope always equals the number of `(book, trope)` rows stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasteProfile {
    counts: HashMap<String, u64>,
}

impl TasteProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts each occurrence of a trope once
    pub fn from_tropes<I, S>(tropes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut profile = Self::new();
        for trope in tropes {
            *profile.counts.entry(trope.into()).or_insert(0) += 1;
        }
        profile
    }

    /// Number of assignments carrying `trope`, if any
    pub fn count(&self, trope: &str) -> Option<u64> {
        self.counts.get(trope).copied()
    }

    pub fn contains(&self, trope: &str) -> bool {
        self.counts.contains_key(trope)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct tropes
    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

impl FromIterator<(String, u64)> for TasteProfile {
    fn from_iter<T: IntoIterator<Item = (String, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// A candidate ranked against the current taste profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TropeRecommendation {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    /// Candidate tropes present in the profile, in candidate order
    pub matched_tropes: Vec<String>,
    pub all_tropes: Vec<String>,
    /// 0-99 scale, two decimals
    pub score: f64,
    pub explanation: String,
}

impl TropeRecommendation {
    pub fn from_candidate(candidate: &CandidateBook, matched: Vec<String>, score: f64) -> Self {
        Self {
            id: candidate.id.to_string(),
            title: candidate.title.to_string(),
            author: candidate.author.to_string(),
            description: Some(candidate.description.to_string()),
            cover_url: Some(candidate.cover_url.to_string()),
            matched_tropes: matched,
            all_tropes: candidate.tropes.iter().map(|t| t.to_string()).collect(),
            score,
            explanation: candidate.explanation.to_string(),
        }
    }
}
