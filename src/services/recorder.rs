//! Participation recorder.
//!
//! DESIGN
//! ======
//! The recorder turns a form payload plus visitor context into a stored
//! participation. The email column is derived from the payload's `email` key
//! and only falls back to an explicit email when the form has none. UTM values
//! come from the visitor's page URL, with caller-supplied values filling gaps.
//!
//! ERROR HANDLING
//! ==============
//! Store failures come back as `RecorderError` and are also written to the
//! recorder's `last_error` slot. Each session or request builds its own
//! recorder, so the slot only ever reports that caller's last write. It is
//! cleared by the next successful write. Nothing here panics or retries.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::store::{NewParticipation, Participation, ParticipationStore, StoreError};

// =============================================================================
// TYPES
// =============================================================================

/// What the server knows about the visitor making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorContext {
    pub user_agent: Option<String>,
    /// The page the funnel is embedded in, used for UTM extraction.
    pub page_url: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utm {
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
}

impl Utm {
    /// Fill each missing value from `fallback`.
    #[must_use]
    pub fn or(self, fallback: &Utm) -> Utm {
        Utm {
            source: self.source.or_else(|| fallback.source.clone()),
            medium: self.medium.or_else(|| fallback.medium.clone()),
            campaign: self.campaign.or_else(|| fallback.campaign.clone()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("failed to save participation: {0}")]
    Persistence(#[from] StoreError),
}

impl ErrorCode for RecorderError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Persistence(inner) => inner.error_code(),
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        match self {
            Self::Persistence(inner) => inner.status(),
        }
    }
}

// =============================================================================
// RECORDER
// =============================================================================

pub struct Recorder {
    store: Arc<dyn ParticipationStore>,
    last_error: Mutex<Option<String>>,
}

impl Recorder {
    #[must_use]
    pub fn new(store: Arc<dyn ParticipationStore>) -> Self {
        Self { store, last_error: Mutex::new(None) }
    }

    /// Persist one participation.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError::Persistence` when the store rejects the write.
    /// The message is also kept in [`Recorder::last_error`].
    pub async fn create(
        &self,
        campaign_id: Uuid,
        form_data: Map<String, Value>,
        explicit_email: Option<&str>,
        visitor: &VisitorContext,
        fallback_utm: &Utm,
    ) -> Result<Participation, RecorderError> {
        let user_email = derive_email(&form_data, explicit_email);
        let utm = visitor.page_url.as_deref().map(parse_utm).unwrap_or_default().or(fallback_utm);

        let new = NewParticipation {
            campaign_id,
            form_data,
            user_email,
            ip_address: visitor.ip_address.clone(),
            user_agent: visitor.user_agent.clone(),
            utm_source: utm.source,
            utm_medium: utm.medium,
            utm_campaign: utm.campaign,
        };

        match self.store.create(new).await {
            Ok(row) => {
                self.set_last_error(None);
                info!(%campaign_id, participation_id = %row.id, "participation recorded");
                Ok(row)
            }
            Err(e) => {
                error!(%campaign_id, error = %e, "participation write failed");
                self.set_last_error(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// All participations for a campaign, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError::Persistence` when the store cannot be read.
    pub async fn list(&self, campaign_id: Uuid) -> Result<Vec<Participation>, RecorderError> {
        match self.store.list(campaign_id).await {
            Ok(rows) => {
                self.set_last_error(None);
                Ok(rows)
            }
            Err(e) => {
                error!(%campaign_id, error = %e, "participation list failed");
                self.set_last_error(Some(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// Message from the most recent failed store call, if the last call failed.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set_last_error(&self, message: Option<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// `form_data.email` when it is a non-blank string, else the explicit email.
#[must_use]
pub fn derive_email(form_data: &Map<String, Value>, explicit: Option<&str>) -> Option<String> {
    form_data
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| explicit.map(str::trim).filter(|s| !s.is_empty()))
        .map(ToString::to_string)
}

/// Read `utm_source`, `utm_medium` and `utm_campaign` from a URL's query string.
/// Unparseable URLs and empty values yield `None`.
#[must_use]
pub fn parse_utm(page_url: &str) -> Utm {
    let Ok(url) = reqwest::Url::parse(page_url) else {
        return Utm::default();
    };
    let mut utm = Utm::default();
    for (key, value) in url.query_pairs() {
        if value.is_empty() {
            continue;
        }
        let slot = match key.as_ref() {
            "utm_source" => &mut utm.source,
            "utm_medium" => &mut utm.medium,
            "utm_campaign" => &mut utm.campaign,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    utm
}

#[cfg(test)]
#[path = "recorder_test.rs"]
mod tests;
