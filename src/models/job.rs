use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of background work a job performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum JobKind {
    /// Demo library sync: seeds the catalog when it is empty
    #[serde(rename = "abs_sync")]
    #[sqlx(rename = "abs_sync")]
    LibrarySync,
    /// Trope extraction that only fills gaps
    #[serde(rename = "trope_extract")]
    #[sqlx(rename = "trope_extract")]
    TropeExtraction,
    /// Trope extraction that purges every assignment first
    #[serde(rename = "trope_refresh")]
    #[sqlx(rename = "trope_refresh")]
    TropeRefresh,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::LibrarySync => "abs_sync",
            JobKind::TropeExtraction => "trope_extract",
            JobKind::TropeRefresh => "trope_refresh",
        }
    }

    /// Message stored on the job while it waits in the queue
    pub fn queued_message(&self) -> &'static str {
        match self {
            JobKind::LibrarySync => "Sync scheduled",
            JobKind::TropeExtraction => "Trope extraction job queued",
            JobKind::TropeRefresh => "Trope extraction refresh queued",
        }
    }
}

impl Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Allowed moves: queued -> running -> completed | failed
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Persisted record of one background job run
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub job_type: JobKind,
    pub status: JobStatus,
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
