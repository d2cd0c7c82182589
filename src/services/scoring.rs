//! Tag-overlap ranking of candidate books against a taste profile.
//!
//! Each matched trope contributes `1 / (count + 1)`, so tropes the user
//! already owns many books for add less than rare ones. The sum is averaged
//! over the matches and mapped onto `[0.55, 0.99]`, then shown on a 0-99
//! scale with two decimals.

use crate::models::{CandidateBook, TasteProfile, TropeRecommendation};

/// Lowest normalized score a surfaced candidate can have
pub const SCORE_FLOOR: f64 = 0.55;

/// Highest normalized score a surfaced candidate can have
pub const SCORE_CEILING: f64 = 0.99;

/// Candidate tropes present in the profile, in candidate order
pub fn matched_tropes(candidate: &CandidateBook, profile: &TasteProfile) -> Vec<String> {
    candidate
        .tropes
        .iter()
        .filter(|trope| profile.contains(trope))
        .map(|trope| trope.to_string())
        .collect()
}

/// Displayed score for a non-empty overlap, or `None` when nothing matched
pub fn score_overlap(overlap: &[String], profile: &TasteProfile) -> Option<f64> {
    if overlap.is_empty() {
        return None;
    }

    let raw: f64 = overlap
        .iter()
        .filter_map(|trope| profile.count(trope))
        .map(|count| 1.0 / (count as f64 + 1.0))
        .sum();

    let normalized = (SCORE_FLOOR + raw / (overlap.len() as f64 * 2.0)).min(SCORE_CEILING);
    Some(round_to_hundredths(normalized * 100.0))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ranks `catalog` against `profile`, best first, keeping at most `limit`.
///
/// Candidates without any matched trope are left out. Equal scores keep
/// their catalog order. An empty profile yields an empty ranking.
pub fn rank_candidates(
    profile: &TasteProfile,
    catalog: &[CandidateBook],
    limit: usize,
) -> Vec<TropeRecommendation> {
    if profile.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<TropeRecommendation> = catalog
        .iter()
        .filter_map(|candidate| {
            let overlap = matched_tropes(candidate, profile);
            let score = score_overlap(&overlap, profile)?;
            Some(TropeRecommendation::from_candidate(candidate, overlap, score))
        })
        .collect();

    // `sort_by` is stable, which keeps ties in catalog order.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}
