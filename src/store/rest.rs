//! PostgREST-compatible store backend.
//!
//! Thin HTTP wrapper over `/participations` and `/campaigns`. Rows are stamped
//! locally and sent whole, so the endpoint only has to insert them. Pure
//! parsing lives in `parse_rows` / `parse_single` for testability.

use std::time::Duration;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::{CampaignRecord, CampaignStore, NewParticipation, Participation, ParticipationStore, StoreError, now_ms};
use crate::config::RestConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// # Errors
    ///
    /// Returns `StoreError::Request` if the HTTP client cannot be built.
    pub fn new(config: &RestConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| StoreError::Request(format!("http client build: {e}")))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string(), api_key: config.api_key.clone() })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<String, StoreError> {
        let response = self
            .authed(builder)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| StoreError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(StoreError::Response { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl ParticipationStore for RestStore {
    async fn create(&self, new: NewParticipation) -> Result<Participation, StoreError> {
        let row = Participation::stamp(new, now_ms());
        let request = self
            .http
            .post(self.table_url("participations"))
            .header("Prefer", "return=representation")
            .json(&row);

        match self.send(request).await {
            Ok(text) => parse_single(&text).map(|stored: Option<Participation>| stored.unwrap_or(row)),
            Err(StoreError::Response { status: 409, body }) if is_foreign_key_violation(&body) => {
                Err(StoreError::CampaignNotFound(row.campaign_id))
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, campaign_id: Uuid) -> Result<Vec<Participation>, StoreError> {
        let request = self
            .http
            .get(self.table_url("participations"))
            .query(&[("campaign_id", format!("eq.{campaign_id}")), ("order", "created_at.desc".into())]);
        let text = self.send(request).await?;
        let mut rows: Vec<Participation> = parse_rows(&text)?;
        // Endpoints may ignore `order`.
        super::sort_newest_first(&mut rows);
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl CampaignStore for RestStore {
    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError> {
        let request = self.http.get(self.table_url("campaigns")).query(&[("id", format!("eq.{id}"))]);
        let text = self.send(request).await?;
        parse_single(&text)
    }

    async fn save_campaign(&self, record: &CampaignRecord) -> Result<(), StoreError> {
        let request = self
            .http
            .post(self.table_url("campaigns"))
            .header("Prefer", "resolution=merge-duplicates")
            .json(record);
        self.send(request).await?;
        Ok(())
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_rows<T: DeserializeOwned>(json: &str) -> Result<Vec<T>, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::Payload(e.to_string()))
}

/// First row of an array response. An empty body or empty array is `None`.
fn parse_single<T: DeserializeOwned>(json: &str) -> Result<Option<T>, StoreError> {
    if json.trim().is_empty() {
        return Ok(None);
    }
    Ok(parse_rows::<T>(json)?.into_iter().next())
}

/// PostgREST reports constraint failures as `{ "code": "23503", ... }`.
fn is_foreign_key_violation(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(|c| c.as_str()).map(|c| c == "23503"))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "rest_test.rs"]
mod tests;
