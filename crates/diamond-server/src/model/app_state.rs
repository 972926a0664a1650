//! Application state shared across all handlers

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use sea_orm::DatabaseConnection;

use crate::model::config::Configuration;
use crate::session::SessionStore;

pub struct AppState {
    pub configuration: Configuration,
    pub db: DatabaseConnection,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(configuration: Configuration, db: DatabaseConnection) -> Self {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            configuration.session_idle_age_secs(),
        )));
        Self {
            configuration,
            db,
            sessions,
        }
    }

    /// Wall-clock time in the configured zone. The process TZ is pinned
    /// at startup, so naive local time is the storage form throughout.
    pub fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("db", &"<DatabaseConnection>")
            .field("sessions", &"<SessionStore>")
            .finish()
    }
}
