//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the two store handles and the map of live funnel sessions. Each
//! session sits behind its own async mutex so one visitor's transitions run
//! one at a time while other sessions proceed.
//!
//! SESSION LIFETIME
//! ================
//! Every lookup refreshes a session's `last_touched`. A session idle for
//! longer than `session_ttl` is gone: lookups treat it as missing, and the
//! background sweep in `services::sweeper` drops it from the map.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::db;
use crate::services::funnel::{FunnelController, OutcomeRecording};
use crate::services::recorder::Recorder;
use crate::store::memory::MemoryStore;
use crate::store::postgres::PgStore;
use crate::store::rest::RestStore;
use crate::store::{CampaignStore, ParticipationStore, StoreError};

pub type SessionHandle = Arc<Mutex<FunnelController>>;

struct SessionEntry {
    handle: SessionHandle,
    last_touched: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store client init failed: {0}")]
    Store(#[from] StoreError),
}

/// Shared application state. Clone is required by Axum; every field is
/// `Arc`-wrapped or `Copy`.
#[derive(Clone)]
pub struct AppState {
    pub campaigns: Arc<dyn CampaignStore>,
    pub participations: Arc<dyn ParticipationStore>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    pub session_ttl: Duration,
    pub outcome_recording: OutcomeRecording,
}

impl AppState {
    #[must_use]
    pub fn new(
        participations: Arc<dyn ParticipationStore>,
        campaigns: Arc<dyn CampaignStore>,
        outcome_recording: OutcomeRecording,
    ) -> Self {
        Self {
            campaigns,
            participations,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            session_ttl: Duration::from_secs(crate::config::DEFAULT_SESSION_TTL_SECS),
            outcome_recording,
        }
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Build state for the configured store backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the database pool or HTTP client cannot be created.
    pub async fn connect(config: &Config) -> Result<Self, StartupError> {
        let state = match &config.store {
            StoreBackend::Postgres { database_url, max_connections } => {
                let pool = db::init_pool(database_url, *max_connections).await?;
                let store = Arc::new(PgStore::new(pool));
                Self::new(store.clone(), store, config.outcome_recording)
            }
            StoreBackend::Rest(rest) => {
                let store = Arc::new(RestStore::new(rest)?);
                Self::new(store.clone(), store, config.outcome_recording)
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; participations are lost on restart");
                let store = Arc::new(MemoryStore::new());
                Self::new(store.clone(), store, config.outcome_recording)
            }
        };
        Ok(state.with_session_ttl(Duration::from_secs(config.sessions.ttl_secs)))
    }

    /// A recorder with its own error slot, for one request or one session.
    #[must_use]
    pub fn recorder(&self) -> Recorder {
        Recorder::new(Arc::clone(&self.participations))
    }

    pub async fn insert_session(&self, id: Uuid, controller: FunnelController) {
        let entry = SessionEntry { handle: Arc::new(Mutex::new(controller)), last_touched: Instant::now() };
        self.sessions.write().await.insert(id, entry);
    }

    /// Look up a live session and mark it as used.
    pub async fn session(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        let now = Instant::now();
        if now.duration_since(entry.last_touched) > self.session_ttl {
            sessions.remove(&id);
            tracing::debug!(session_id = %id, "session expired on lookup");
            return None;
        }
        entry.last_touched = now;
        Some(Arc::clone(&entry.handle))
    }

    pub async fn remove_session(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop every session idle for longer than the TTL. Returns how many went.
    pub async fn sweep_sessions(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_touched) <= self.session_ttl);
        before - sessions.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use serde_json::Value;

    use super::*;
    use crate::store::CampaignRecord;

    /// `AppState` over a fresh in-memory store.
    #[must_use]
    pub fn test_app_state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        AppState::new(store.clone(), store, OutcomeRecording::Linked)
    }

    /// Save a campaign config and return its id.
    pub async fn seed_campaign(state: &AppState, name: &str, config: Value) -> Uuid {
        let id = Uuid::new_v4();
        state
            .campaigns
            .save_campaign(&CampaignRecord { id, name: name.into(), config, created_at: 0 })
            .await
            .expect("memory store save should not fail");
        id
    }
}
