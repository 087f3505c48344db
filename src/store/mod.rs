//! Store contract for campaigns and participations.
//!
//! ARCHITECTURE
//! ============
//! The data store is external. Services reach it only through the two traits
//! below, so the same recorder and funnel code runs against Postgres, a
//! PostgREST-compatible HTTP endpoint, or the in-memory store used by tests
//! and local demos.
//!
//! Participations are append-only. There is deliberately no update or delete
//! method on [`ParticipationStore`].

pub mod memory;
pub mod postgres;
pub mod rest;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// A participation about to be written. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewParticipation {
    pub campaign_id: Uuid,
    pub form_data: Map<String, Value>,
    pub user_email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

/// A stored, immutable participation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub form_data: Map<String, Value>,
    pub user_email: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl Participation {
    /// Stamp a new participation with an id and creation time.
    #[must_use]
    pub fn stamp(new: NewParticipation, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id: new.campaign_id,
            form_data: new.form_data,
            user_email: new.user_email,
            ip_address: new.ip_address,
            user_agent: new.user_agent,
            utm_source: new.utm_source,
            utm_medium: new.utm_medium,
            utm_campaign: new.utm_campaign,
            created_at,
        }
    }
}

/// A campaign row: raw editor config plus identity. Validation happens in
/// [`crate::campaign::Campaign::from_value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: Uuid,
    pub name: String,
    pub config: Value,
    pub created_at: i64,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("campaign not found: {0}")]
    CampaignNotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store responded with status {status}")]
    Response { status: u16, body: String },
    #[error("store returned an unreadable payload: {0}")]
    Payload(String),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CampaignNotFound(_) => "E_CAMPAIGN_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
            Self::Request(_) => "E_STORE_REQUEST",
            Self::Response { .. } => "E_STORE_RESPONSE",
            Self::Payload(_) => "E_STORE_PAYLOAD",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::CampaignNotFound(_) => axum::http::StatusCode::NOT_FOUND,
            _ => axum::http::StatusCode::BAD_GATEWAY,
        }
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// Append-only participation storage.
#[async_trait::async_trait]
pub trait ParticipationStore: Send + Sync {
    /// Persist a participation and return the stored row.
    async fn create(&self, new: NewParticipation) -> Result<Participation, StoreError>;

    /// All participations for a campaign, newest first.
    async fn list(&self, campaign_id: Uuid) -> Result<Vec<Participation>, StoreError>;
}

/// Campaign configuration storage.
#[async_trait::async_trait]
pub trait CampaignStore: Send + Sync {
    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError>;

    async fn save_campaign(&self, record: &CampaignRecord) -> Result<(), StoreError>;
}

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Order newest first. The sort is stable, so equal timestamps keep store order.
pub(crate) fn sort_newest_first(rows: &mut [Participation]) {
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
