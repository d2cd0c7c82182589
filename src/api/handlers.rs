use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{
        AppSettings, Feedback, Job, JobKind, LibraryRecommendation, LogEntry, NewFeedback,
        SettingsUpdate, TropeRecommendation,
    },
    services::{
        activity::{self, ClientLogEntry},
        library, settings,
    },
};

use super::AppState;

/// Bounds of the `limit` parameter on recommendation endpoints
pub const MIN_FEED_LIMIT: usize = 1;
pub const MAX_FEED_LIMIT: usize = 25;
pub const DEFAULT_FEED_LIMIT: usize = 10;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

impl FeedQuery {
    fn validated_limit(&self) -> AppResult<usize> {
        let limit = self.limit.unwrap_or(DEFAULT_FEED_LIMIT);
        if !(MIN_FEED_LIMIT..=MAX_FEED_LIMIT).contains(&limit) {
            return Err(AppError::InvalidInput(format!(
                "limit must be between {MIN_FEED_LIMIT} and {MAX_FEED_LIMIT}"
            )));
        }
        Ok(limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub level: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub limit: Option<i64>,
}

/// List responses are wrapped so fields can be added later
#[derive(Debug, Serialize)]
pub struct ItemsPayload<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ItemsPayload<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Serialize)]
pub struct TropeExtractionResponse {
    pub status: String,
    pub scheduled: bool,
    pub processed: u64,
    pub message: String,
    pub job_id: i64,
}

impl From<&Job> for TropeExtractionResponse {
    fn from(job: &Job) -> Self {
        Self {
            status: "queued".to_string(),
            scheduled: true,
            processed: 0,
            message: job.job_type.queued_message().to_string(),
            job_id: job.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientLogResponse {
    pub status: &'static str,
    pub log: LogEntry,
}

// Handlers

/// Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn read_settings(State(state): State<AppState>) -> AppResult<Json<AppSettings>> {
    let snapshot = settings::get_settings_snapshot(&state.pool).await?;
    Ok(Json(snapshot))
}

pub async fn write_settings(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> AppResult<Json<AppSettings>> {
    let updated = settings::update_settings(&state.pool, state.events.as_ref(), update).await?;
    Ok(Json(updated))
}

/// Queues a demo library sync and returns the job in its initial state
pub async fn trigger_sync(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<Job>> {
    let job = state.jobs.submit(JobKind::LibrarySync).await?;
    tracing::info!(request_id = %request_id, job_id = job.id, "Library sync queued");
    Ok(Json(job))
}

/// Last sync job, or `null` when none ever ran
pub async fn sync_status(State(state): State<AppState>) -> AppResult<Json<Option<Job>>> {
    let job = state.jobs.runner().last(&[JobKind::LibrarySync]).await?;
    Ok(Json(job))
}

pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ItemsPayload<LibraryRecommendation>>> {
    let limit = query.validated_limit()?;
    let items = library::library_recommendations(&state.pool, &state.rng, limit).await?;
    Ok(Json(items.into()))
}

pub async fn read_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> AppResult<Json<ItemsPayload<LogEntry>>> {
    let items = activity::fetch_logs(
        &state.pool,
        query.level.as_deref(),
        query.source.as_deref(),
        query.limit,
    )
    .await?;
    Ok(Json(items.into()))
}

pub async fn write_client_log(
    State(state): State<AppState>,
    Json(entry): Json<ClientLogEntry>,
) -> AppResult<Json<ClientLogResponse>> {
    let log = activity::record_client_log(state.events.as_ref(), entry).await?;
    Ok(Json(ClientLogResponse {
        status: "recorded",
        log,
    }))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(feedback): Json<NewFeedback>,
) -> AppResult<Json<Feedback>> {
    let stored = activity::record_feedback(&state.pool, state.events.as_ref(), feedback).await?;
    Ok(Json(stored))
}

pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<FeedbackQuery>,
) -> AppResult<Json<ItemsPayload<Feedback>>> {
    let items = activity::fetch_feedback(&state.pool, query.limit).await?;
    Ok(Json(items.into()))
}

/// Queues an extraction that only fills missing trope assignments
pub async fn trigger_trope_extraction(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<TropeExtractionResponse>> {
    let job = state.jobs.submit(JobKind::TropeExtraction).await?;
    tracing::info!(request_id = %request_id, job_id = job.id, force = false, "Trope extraction queued");
    Ok(Json(TropeExtractionResponse::from(&job)))
}

/// Queues an extraction that rebuilds every trope assignment
pub async fn refresh_tropes(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<TropeExtractionResponse>> {
    let job = state.jobs.submit(JobKind::TropeRefresh).await?;
    tracing::info!(request_id = %request_id, job_id = job.id, force = true, "Trope refresh queued");
    Ok(Json(TropeExtractionResponse::from(&job)))
}

/// Last extraction job of either kind
pub async fn trope_status(State(state): State<AppState>) -> AppResult<Json<Option<Job>>> {
    let job = state
        .jobs
        .runner()
        .last(&[JobKind::TropeExtraction, JobKind::TropeRefresh])
        .await?;
    Ok(Json(job))
}

pub async fn trope_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ItemsPayload<TropeRecommendation>>> {
    let limit = query.validated_limit()?;
    let items = state.tropes.recommendations(limit).await?;
    tracing::info!(request_id = %request_id, results = items.len(), "Trope feed served");
    Ok(Json(items.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_bounds() {
        assert_eq!(FeedQuery { limit: None }.validated_limit().unwrap(), 10);
        assert_eq!(FeedQuery { limit: Some(1) }.validated_limit().unwrap(), 1);
        assert_eq!(FeedQuery { limit: Some(25) }.validated_limit().unwrap(), 25);
        assert!(FeedQuery { limit: Some(0) }.validated_limit().is_err());
        assert!(FeedQuery { limit: Some(26) }.validated_limit().is_err());
    }
}
