//! Participation recording, listing and CSV export routes.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::campaign::CampaignError;
use crate::error::ApiError;
use crate::routes::visitor_from_headers;
use crate::services::export;
use crate::services::recorder::Utm;
use crate::state::AppState;
use crate::store::Participation;

#[derive(Deserialize)]
pub struct CreateParticipationBody {
    #[serde(default)]
    pub form_data: Map<String, Value>,
    #[serde(default)]
    pub email: Option<String>,
    /// Page the funnel is embedded in. Overrides `Referer` for UTM parsing.
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
}

/// `POST /api/campaigns/:id/participations` — record one participation.
pub async fn create_participation(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<CreateParticipationBody>,
) -> Result<(StatusCode, Json<Participation>), ApiError> {
    let visitor = visitor_from_headers(&headers, body.page_url);
    let fallback = Utm { source: body.utm_source, medium: body.utm_medium, campaign: body.utm_campaign };
    let row = state
        .recorder()
        .create(campaign_id, body.form_data, body.email.as_deref(), &visitor, &fallback)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// `GET /api/campaigns/:id/participations` — newest first.
pub async fn list_participations(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<Vec<Participation>>, ApiError> {
    Ok(Json(state.recorder().list(campaign_id).await?))
}

/// `GET /api/campaigns/:id/participations.csv` — CSV download.
pub async fn export_csv(State(state): State<AppState>, Path(campaign_id): Path<Uuid>) -> Result<Response, ApiError> {
    let record = state
        .campaigns
        .fetch_campaign(campaign_id)
        .await?
        .ok_or(CampaignError::NotFound(campaign_id))?;
    let rows = state.recorder().list(campaign_id).await?;
    let export::CsvExport { filename, records, rows: count } = export::export_csv(&rows, &record.name)?;

    tracing::info!(%campaign_id, rows = count, "participations exported");

    let stream = futures::stream::iter(
        records
            .into_iter()
            .map(|record| Ok::<axum::body::Bytes, std::convert::Infallible>(axum::body::Bytes::from(record))),
    );
    let body = axum::body::Body::from_stream(stream);

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, &format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
#[path = "participations_test.rs"]
mod tests;
