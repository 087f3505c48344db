//! In-memory store backend.
//!
//! Used by tests and by `STORE_BACKEND=memory` for local demos. It enforces the
//! same contract as Postgres: a participation must reference a saved campaign,
//! and listing is newest-first.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CampaignRecord, CampaignStore, NewParticipation, Participation, ParticipationStore, StoreError, now_ms,
    sort_newest_first,
};

#[derive(Default)]
pub struct MemoryStore {
    campaigns: RwLock<HashMap<Uuid, CampaignRecord>>,
    participations: RwLock<Vec<Participation>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ParticipationStore for MemoryStore {
    async fn create(&self, new: NewParticipation) -> Result<Participation, StoreError> {
        if !self.campaigns.read().await.contains_key(&new.campaign_id) {
            return Err(StoreError::CampaignNotFound(new.campaign_id));
        }
        let mut rows = self.participations.write().await;
        // Keep creation times strictly increasing so newest-first is stable.
        let floor = rows.last().map_or(0, |last| last.created_at + 1);
        let row = Participation::stamp(new, now_ms().max(floor));
        rows.push(row.clone());
        Ok(row)
    }

    async fn list(&self, campaign_id: Uuid) -> Result<Vec<Participation>, StoreError> {
        let mut rows: Vec<Participation> = self
            .participations
            .read()
            .await
            .iter()
            .filter(|p| p.campaign_id == campaign_id)
            .cloned()
            .collect();
        sort_newest_first(&mut rows);
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl CampaignStore for MemoryStore {
    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError> {
        Ok(self.campaigns.read().await.get(&id).cloned())
    }

    async fn save_campaign(&self, record: &CampaignRecord) -> Result<(), StoreError> {
        self.campaigns.write().await.insert(record.id, record.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
