//! Campaign configuration routes.
//!
//! Configs are validated into a `Campaign` before they are stored, so every
//! stored config loads again. The render endpoint resolves layout for one
//! preview device.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use layout::device::{self, Device};
use layout::geom::{Rect, Size};

use crate::campaign::{Campaign, CampaignError, FormField, Presentation, Screen};
use crate::dispatch::{self, Route};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{CampaignRecord, now_ms};

#[derive(Deserialize)]
pub struct CreateCampaignBody {
    /// Reuse an id to overwrite an existing campaign.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub config: Value,
}

#[derive(Debug, Serialize)]
pub struct CampaignCreated {
    pub id: Uuid,
    pub name: String,
    pub route: Route,
}

/// Load and validate a stored campaign.
pub(crate) async fn load_campaign(state: &AppState, id: Uuid) -> Result<Campaign, ApiError> {
    let record = state.campaigns.fetch_campaign(id).await?.ok_or(CampaignError::NotFound(id))?;
    Ok(Campaign::from_value(record.id, record.name, &record.config)?)
}

/// `POST /api/campaigns` — validate and store a campaign config.
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(body): Json<CreateCampaignBody>,
) -> Result<(StatusCode, Json<CampaignCreated>), ApiError> {
    let id = body.id.unwrap_or_else(Uuid::new_v4);
    let campaign = Campaign::from_value(id, body.name.clone(), &body.config)?;
    let route = dispatch::route(&campaign.declared_type, campaign.funnel);

    state
        .campaigns
        .save_campaign(&CampaignRecord { id, name: body.name.clone(), config: body.config, created_at: now_ms() })
        .await?;

    tracing::info!(campaign_id = %id, kind = ?campaign.declared_type, funnel = ?route.funnel, "campaign saved");
    Ok((StatusCode::CREATED, Json(CampaignCreated { id, name: body.name, route })))
}

/// `GET /api/campaigns/:id` — validated campaign.
pub async fn get_campaign(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Campaign>, ApiError> {
    Ok(Json(load_campaign(&state, id).await?))
}

// =============================================================================
// RENDER
// =============================================================================

#[derive(Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResolvedElement {
    pub id: String,
    #[serde(flatten)]
    pub rect: Rect,
}

/// Everything a client needs to draw one campaign on one device.
#[derive(Debug, Serialize)]
pub struct RenderView {
    pub campaign_id: Uuid,
    pub name: String,
    pub device: Device,
    pub route: Route,
    pub background_image: Option<String>,
    pub presentation: Presentation,
    pub container: Size,
    pub game_area: Option<Rect>,
    pub elements: Vec<ResolvedElement>,
    pub screens: Vec<Screen>,
    pub form_fields: Vec<FormField>,
}

/// Resolve a campaign's layout for `device`.
#[must_use]
pub fn render(campaign: &Campaign, device: Device) -> RenderView {
    let design = &campaign.design;
    let container = design.container;
    let elements = design
        .elements
        .iter()
        .map(|el| ResolvedElement { id: el.id.clone(), rect: device::fit_within(device::resolve(el, device), container) })
        .collect();

    RenderView {
        campaign_id: campaign.id,
        name: campaign.name.clone(),
        device,
        route: dispatch::route(&campaign.declared_type, campaign.funnel),
        background_image: device::select_background(
            device,
            design.background_image.as_deref(),
            design.mobile_background_image.as_deref(),
        )
        .map(String::from),
        presentation: device::apply_mobile_config(device, &design.presentation, design.mobile_config.as_ref()).clone(),
        container,
        game_area: design.game_area,
        elements,
        screens: campaign.screens.clone(),
        form_fields: campaign.form_fields.clone(),
    }
}

/// `GET /api/campaigns/:id/render?device=mobile` — layout for a preview device.
pub async fn render_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RenderQuery>,
) -> Result<Json<RenderView>, ApiError> {
    let campaign = load_campaign(&state, id).await?;
    let device = query.device.as_deref().map(Device::parse).unwrap_or_default();
    Ok(Json(render(&campaign, device)))
}

#[cfg(test)]
#[path = "campaigns_test.rs"]
mod tests;
