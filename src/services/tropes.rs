use std::sync::Arc;

use chrono::Utc;
use rand::{seq::SliceRandom, Rng};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::{
    db,
    error::AppResult,
    models::{CandidateBook, NewLogEntry, TasteProfile, TropeRecommendation},
    services::{
        catalog::{self, SYNTHESIZED_TROPE_COUNT, TROPE_CANDIDATES, TROPE_LIBRARY},
        event_log::{log_event, EventLog},
        scoring, SharedRng,
    },
};

/// Source label stored on extracted assignments
pub const EXTRACTION_SOURCE: &str = "demo-llm";

/// Log source used for engine events
const LOG_SOURCE: &str = "trope-engine";

/// Trope extraction and trope-based recommendations
#[derive(Clone)]
pub struct TropeEngine {
    pool: SqlitePool,
    rng: SharedRng,
    events: Arc<dyn EventLog>,
    catalog: &'static [CandidateBook],
}

impl TropeEngine {
    pub fn new(pool: SqlitePool, rng: SharedRng, events: Arc<dyn EventLog>) -> Self {
        Self {
            pool,
            rng,
            events,
            catalog: TROPE_CANDIDATES,
        }
    }

    /// Assigns tropes to every stored book, returning how many rows were added.
    ///
    /// With `force`, every existing assignment is purged first. Otherwise only
    /// missing `(book, trope)` pairs are written, and books outside the fixed
    /// table that already carry tropes are left alone. Runs in one transaction.
    #[instrument(skip(self))]
    pub async fn extract(&self, force: bool) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        if force {
            let purged = db::tropes::delete_all(&mut *tx).await?;
            tracing::debug!(purged, "Purged existing trope assignments");
        }

        let books = db::books::list(&mut *tx, None).await?;
        let mut processed = 0u64;

        for book in &books {
            let tropes = match catalog::assigned_tropes(&book.title) {
                Some(tropes) => tropes.to_vec(),
                None => {
                    // A synthesized sample is only drawn for books with no tropes yet
                    if db::tropes::any_for_book(&mut *tx, book.id).await? {
                        continue;
                    }
                    self.sample_tropes().await
                }
            };
            for trope in tropes {
                if db::tropes::exists(&mut *tx, book.id, trope).await? {
                    continue;
                }

                let confidence = self.draw_confidence().await;
                let inserted = db::tropes::insert_if_absent(
                    &mut *tx,
                    book.id,
                    trope,
                    EXTRACTION_SOURCE,
                    confidence,
                    Utc::now(),
                )
                .await?;
                if inserted {
                    processed += 1;
                }
            }
        }

        tx.commit().await?;

        log_event(
            self.events.as_ref(),
            NewLogEntry::new("INFO", "Trope extraction completed", LOG_SOURCE)
                .with_context(json!({ "force": force, "processed": processed })),
        )
        .await;

        Ok(processed)
    }

    /// Current trope frequencies across all stored assignments
    pub async fn build_profile(&self) -> AppResult<TasteProfile> {
        let mut conn = self.pool.acquire().await?;
        let counts = db::tropes::counts(&mut conn).await?;
        Ok(counts
            .into_iter()
            .map(|(trope, count)| (trope, count.max(0) as u64))
            .collect())
    }

    /// Candidates ranked against the current taste profile.
    ///
    /// A store without any assignment is populated by a non-forced extraction
    /// before the profile is built.
    #[instrument(skip(self))]
    pub async fn recommendations(&self, limit: usize) -> AppResult<Vec<TropeRecommendation>> {
        let has_assignments = {
            let mut conn = self.pool.acquire().await?;
            db::tropes::any(&mut conn).await?
        };
        if !has_assignments {
            tracing::info!("No trope assignments stored, running extraction first");
            self.extract(false).await?;
        }

        let profile = self.build_profile().await?;
        if profile.is_empty() {
            tracing::debug!("Taste profile is empty, nothing to rank");
            return Ok(Vec::new());
        }

        let ranked = scoring::rank_candidates(&profile, self.catalog, limit);

        log_event(
            self.events.as_ref(),
            NewLogEntry::new("INFO", "Generated trope-based recommendations", LOG_SOURCE)
                .with_context(json!({ "results": ranked.len() })),
        )
        .await;

        Ok(ranked)
    }

    /// Random sample of the trope vocabulary for titles without fixed tropes
    async fn sample_tropes(&self) -> Vec<&'static str> {
        let mut rng = self.rng.lock().await;
        TROPE_LIBRARY
            .choose_multiple(&mut *rng, SYNTHESIZED_TROPE_COUNT)
            .copied()
            .collect()
    }

    async fn draw_confidence(&self) -> f64 {
        let mut rng = self.rng.lock().await;
        let confidence: f64 = rng.gen_range(0.6..=0.95);
        (confidence * 1000.0).round() / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::AppError;
    use crate::models::NewBook;
    use crate::services::event_log::{MockEventLog, SqliteEventLog};
    use crate::services::{catalog::SEED_BOOKS, seeded_rng};

    async fn engine_with_books(titles: &[&str]) -> (TropeEngine, SqlitePool) {
        let pool = db::connect_in_memory().await.unwrap();
        {
            let mut conn = pool.acquire().await.unwrap();
            for title in titles {
                db::books::insert(&mut conn, &NewBook::new(*title, "Author"))
                    .await
                    .unwrap();
            }
        }
        let events = Arc::new(SqliteEventLog::new(pool.clone()));
        (TropeEngine::new(pool.clone(), seeded_rng(7), events), pool)
    }

    async fn tropes_of(pool: &SqlitePool, book_id: i64) -> HashSet<String> {
        let mut conn = pool.acquire().await.unwrap();
        db::tropes::list_for_book(&mut conn, book_id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.trope)
            .collect()
    }

    #[tokio::test]
    async fn test_extraction_is_idempotent() {
        let mut titles: Vec<&str> = SEED_BOOKS.iter().map(|b| b.title).collect();
        titles.push("An Untagged Novel");
        let (engine, pool) = engine_with_books(&titles).await;

        assert_eq!(engine.extract(false).await.unwrap(), 15);
        assert_eq!(engine.extract(false).await.unwrap(), 0);

        let mut conn = pool.acquire().await.unwrap();
        let all = db::tropes::list(&mut conn).await.unwrap();
        assert_eq!(all.len(), 15);
        let pairs: HashSet<(i64, String)> =
            all.iter().map(|a| (a.book_id, a.trope.clone())).collect();
        assert_eq!(pairs.len(), 15);
    }

    #[tokio::test]
    async fn test_synthesized_tropes_are_not_redrawn() {
        let (engine, pool) = engine_with_books(&["Nothing Like It"]).await;
        assert_eq!(engine.extract(false).await.unwrap(), 3);
        let first = tropes_of(&pool, 1).await;

        for _ in 0..5 {
            assert_eq!(engine.extract(false).await.unwrap(), 0);
        }
        assert_eq!(tropes_of(&pool, 1).await, first);
    }

    #[tokio::test]
    async fn test_manually_tagged_unknown_title_is_left_alone() {
        let (engine, pool) = engine_with_books(&["Nothing Like It"]).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            db::tropes::insert_if_absent(
                &mut conn,
                1,
                "royal intrigue",
                "manual",
                0.8,
                Utc::now(),
            )
            .await
            .unwrap();
        }

        assert_eq!(engine.extract(false).await.unwrap(), 0);
        let expected: HashSet<String> = ["royal intrigue".to_string()].into_iter().collect();
        assert_eq!(tropes_of(&pool, 1).await, expected);
    }

    #[tokio::test]
    async fn test_forced_extraction_replaces_stale_assignments() {
        let (engine, pool) = engine_with_books(&["Dragon's Embrace"]).await;
        {
            let mut conn = pool.acquire().await.unwrap();
            db::tropes::insert_if_absent(&mut conn, 1, "slow burn", "manual", 0.9, Utc::now())
                .await
                .unwrap();
        }

        assert_eq!(engine.extract(true).await.unwrap(), 3);

        let tropes = tropes_of(&pool, 1).await;
        let expected: HashSet<String> = ["mates bond", "morally gray hero", "forbidden romance"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tropes, expected);
    }

    #[tokio::test]
    async fn test_unknown_titles_get_three_distinct_library_tropes() {
        let (engine, pool) = engine_with_books(&["Nothing Like It"]).await;
        assert_eq!(engine.extract(false).await.unwrap(), 3);

        let mut conn = pool.acquire().await.unwrap();
        let assignments = db::tropes::list_for_book(&mut conn, 1).await.unwrap();
        assert_eq!(assignments.len(), 3);
        for assignment in &assignments {
            assert!(TROPE_LIBRARY.contains(&assignment.trope.as_str()));
            assert_eq!(assignment.source, EXTRACTION_SOURCE);
            let confidence = assignment.confidence.unwrap();
            assert!((0.6..=0.95).contains(&confidence), "confidence {confidence}");
        }
    }

    #[tokio::test]
    async fn test_same_seed_synthesizes_same_tropes() {
        let (first, first_pool) = engine_with_books(&["Nothing Like It"]).await;
        let (second, second_pool) = engine_with_books(&["Nothing Like It"]).await;
        first.extract(false).await.unwrap();
        second.extract(false).await.unwrap();

        assert_eq!(tropes_of(&first_pool, 1).await, tropes_of(&second_pool, 1).await);
    }

    #[tokio::test]
    async fn test_profile_counts_match_stored_rows() {
        let titles: Vec<&str> = SEED_BOOKS.iter().map(|b| b.title).collect();
        let (engine, _pool) = engine_with_books(&titles).await;
        engine.extract(false).await.unwrap();

        let profile = engine.build_profile().await.unwrap();
        assert_eq!(profile.len(), 10);
        assert_eq!(profile.count("slow burn"), Some(2));
        assert_eq!(profile.count("forbidden romance"), Some(2));
        assert_eq!(profile.count("mates bond"), Some(1));
    }

    #[tokio::test]
    async fn test_dragons_embrace_scenario() {
        let (engine, pool) = engine_with_books(&["Dragon's Embrace"]).await;
        assert_eq!(engine.extract(false).await.unwrap(), 3);

        let expected: HashSet<String> = ["mates bond", "morally gray hero", "forbidden romance"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tropes_of(&pool, 1).await, expected);

        let recommendations = engine.recommendations(5).await.unwrap();
        assert!(!recommendations.is_empty());
        assert!(recommendations.len() <= 5);
        assert!(recommendations.iter().any(|r| {
            r.score >= 55.0 && r.matched_tropes.iter().any(|t| expected.contains(t))
        }));
    }

    #[tokio::test]
    async fn test_recommendations_bootstrap_extraction() {
        let (engine, pool) = engine_with_books(&["Moonlit Oath"]).await;

        let recommendations = engine.recommendations(10).await.unwrap();
        assert!(!recommendations.is_empty());

        let mut conn = pool.acquire().await.unwrap();
        assert!(db::tropes::any(&mut conn).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_library_yields_no_recommendations() {
        let (engine, pool) = engine_with_books(&[]).await;

        let recommendations = engine.recommendations(10).await.unwrap();
        assert!(recommendations.is_empty());

        let mut conn = pool.acquire().await.unwrap();
        assert!(!db::tropes::any(&mut conn).await.unwrap());
    }

    #[tokio::test]
    async fn test_log_failures_do_not_abort_extraction() {
        let pool = db::connect_in_memory().await.unwrap();
        {
            let mut conn = pool.acquire().await.unwrap();
            db::books::insert(&mut conn, &NewBook::new("Academy of Thorns", "C. J. Rowen"))
                .await
                .unwrap();
        }

        let mut events = MockEventLog::new();
        events
            .expect_record()
            .withf(|entry| entry.source == LOG_SOURCE && entry.context.is_some())
            .times(1)
            .returning(|_| Err(AppError::Internal("log store offline".into())));

        let engine = TropeEngine::new(pool, seeded_rng(1), Arc::new(events));
        assert_eq!(engine.extract(false).await.unwrap(), 3);
    }
}
