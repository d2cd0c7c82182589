pub mod activity;
pub mod catalog;
pub mod event_log;
pub mod library;
pub mod scoring;
pub mod settings;
pub mod tropes;

use std::sync::Arc;

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::Mutex;

pub use event_log::{log_event, EventLog, SqliteEventLog};
pub use tropes::TropeEngine;

/// Random source shared by every component that needs jitter.
///
/// Injected rather than ambient so a fixed seed reproduces a whole run.
pub type SharedRng = Arc<Mutex<StdRng>>;

/// Seeded when `seed` is set, otherwise seeded from OS entropy
pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Arc::new(Mutex::new(rng))
}

pub fn seeded_rng(seed: u64) -> SharedRng {
    shared_rng(Some(seed))
}
