pub mod activity;
pub mod book;
pub mod job;
pub mod settings;
pub mod trope;

pub use activity::{Feedback, LogEntry, NewFeedback, NewLogEntry};
pub use book::{Book, LibraryRecommendation, NewBook};
pub use job::{Job, JobKind, JobStatus};
pub use settings::{AppSettings, SettingsUpdate};
pub use trope::{CandidateBook, TasteProfile, TropeAssignment, TropeRecommendation};
