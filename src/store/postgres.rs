//! Postgres store backend.
//!
//! `form_data` is written as JSON text rather than JSONB: JSONB reorders
//! object keys, and CSV export depends on the order visitors filled fields in.
//! The campaign foreign key turns an unknown campaign id into
//! `StoreError::CampaignNotFound` instead of a generic database error.

use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use super::{CampaignRecord, CampaignStore, NewParticipation, Participation, ParticipationStore, StoreError, now_ms};

const FOREIGN_KEY_VIOLATION: &str = "23503";

type ParticipationRow = (
    Uuid,
    Uuid,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    i64,
);

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ParticipationStore for PgStore {
    async fn create(&self, new: NewParticipation) -> Result<Participation, StoreError> {
        let row = Participation::stamp(new, now_ms());
        let form_data =
            serde_json::to_string(&row.form_data).map_err(|e| StoreError::Payload(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO participations
                (id, campaign_id, form_data, user_email, ip_address, user_agent,
                 utm_source, utm_medium, utm_campaign, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(row.id)
        .bind(row.campaign_id)
        .bind(&form_data)
        .bind(&row.user_email)
        .bind(&row.ip_address)
        .bind(&row.user_agent)
        .bind(&row.utm_source)
        .bind(&row.utm_medium)
        .bind(&row.utm_campaign)
        .bind(row.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(row),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) => {
                Err(StoreError::CampaignNotFound(row.campaign_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, campaign_id: Uuid) -> Result<Vec<Participation>, StoreError> {
        let rows = sqlx::query_as::<_, ParticipationRow>(
            "SELECT id, campaign_id, form_data, user_email, ip_address, user_agent,
                    utm_source, utm_medium, utm_campaign, created_at
             FROM participations
             WHERE campaign_id = $1
             ORDER BY created_at DESC",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_participation).collect()
    }
}

fn row_to_participation(row: ParticipationRow) -> Result<Participation, StoreError> {
    let (id, campaign_id, form_data, user_email, ip_address, user_agent, utm_source, utm_medium, utm_campaign, created_at) =
        row;
    let form_data: Map<String, Value> =
        serde_json::from_str(&form_data).map_err(|e| StoreError::Payload(format!("participation {id}: {e}")))?;
    Ok(Participation {
        id,
        campaign_id,
        form_data,
        user_email,
        ip_address,
        user_agent,
        utm_source,
        utm_medium,
        utm_campaign,
        created_at,
    })
}

#[async_trait::async_trait]
impl CampaignStore for PgStore {
    async fn fetch_campaign(&self, id: Uuid) -> Result<Option<CampaignRecord>, StoreError> {
        let row = sqlx::query_as::<_, (Uuid, String, Value, i64)>(
            "SELECT id, name, config, created_at FROM campaigns WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, name, config, created_at)| CampaignRecord { id, name, config, created_at }))
    }

    async fn save_campaign(&self, record: &CampaignRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO campaigns (id, name, config, created_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, config = EXCLUDED.config",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.config)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
