use std::sync::Arc;
use std::time::{Instant, SystemTime};

use sqlx::SqlitePool;

use crate::services::mastery::MasteryService;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    mastery: Arc<MasteryService>,
    db: Option<SqlitePool>,
    api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        mastery: Arc<MasteryService>,
        db: Option<SqlitePool>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            mastery,
            db,
            api_key: api_key.map(Arc::from),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn mastery(&self) -> Arc<MasteryService> {
        Arc::clone(&self.mastery)
    }

    pub fn db(&self) -> Option<&SqlitePool> {
        self.db.as_ref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
