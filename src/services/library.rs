use chrono::Utc;
use rand::{seq::SliceRandom, Rng};
use sqlx::SqlitePool;

use crate::{
    db,
    error::AppResult,
    models::LibraryRecommendation,
    services::{
        catalog::{CANNED_EXPLANATIONS, SEED_BOOKS},
        SharedRng,
    },
};

/// Seeds the demo titles when the library is empty.
///
/// Returns the number of books inserted, zero when books already exist.
pub async fn seed_if_empty(pool: &SqlitePool) -> AppResult<usize> {
    let mut tx = pool.begin().await?;

    if db::books::count(&mut *tx).await? > 0 {
        return Ok(0);
    }

    for seed in SEED_BOOKS {
        db::books::insert(&mut *tx, &seed.to_new_book()).await?;
    }
    tx.commit().await?;

    tracing::info!(seeded = SEED_BOOKS.len(), "Seeded demo library");
    Ok(SEED_BOOKS.len())
}

/// Up to `limit` stored books with a jittered score and an explanation.
///
/// An empty library is seeded first.
pub async fn library_recommendations(
    pool: &SqlitePool,
    rng: &SharedRng,
    limit: usize,
) -> AppResult<Vec<LibraryRecommendation>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let mut books = {
        let mut conn = pool.acquire().await?;
        db::books::list(&mut conn, Some(limit)).await?
    };
    if books.is_empty() {
        seed_if_empty(pool).await?;
        let mut conn = pool.acquire().await?;
        books = db::books::list(&mut conn, Some(limit)).await?;
    }

    let mut rng = rng.lock().await;
    let generated_at = Utc::now();

    let recommendations = books
        .into_iter()
        .map(|book| {
            let explanation = match &book.reason {
                Some(reason) => reason.clone(),
                None => CANNED_EXPLANATIONS
                    .choose(&mut *rng)
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
            };
            let score: f64 = rng.gen_range(0.7..=0.99);

            LibraryRecommendation {
                id: book.id,
                book,
                score: (score * 1000.0).round() / 1000.0,
                explanation,
                generated_at,
            }
        })
        .collect();

    Ok(recommendations)
}
