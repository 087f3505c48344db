//! Funnel session routes.
//!
//! A session is one visitor's pass through one campaign. The server holds
//! the `FunnelController`; clients post actions and render the returned
//! snapshot. Every action response carries the result view once the funnel
//! reaches its terminal screen.
//!
//! The session lock is never held across a store call: `submit` marks the
//! write in flight, releases the lock while the participation is saved, then
//! re-locks to apply the result.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::campaigns::load_campaign;
use crate::routes::visitor_from_headers;
use crate::services::funnel::{FunnelContext, FunnelController, FunnelSnapshot, Outcome};
use crate::services::outcome::Draw;
use crate::services::recorder::Utm;
use crate::campaign::Screen;
use crate::services::result::{self, ResultView};
use crate::state::{AppState, SessionHandle};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub snapshot: FunnelSnapshot,
    /// Configured copy for the screen that is showing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy: Option<Screen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<Draw>,
}

fn respond(session_id: Uuid, controller: &FunnelController, draw: Option<Draw>) -> Json<SessionResponse> {
    let snapshot = controller.snapshot();
    Json(SessionResponse {
        session_id,
        copy: controller.campaign().screen(snapshot.screen).cloned(),
        snapshot,
        result: result::present_for(controller),
        draw,
    })
}

async fn session(state: &AppState, sid: Uuid) -> Result<SessionHandle, ApiError> {
    state.session(sid).await.ok_or_else(|| ApiError::not_found("session"))
}

// =============================================================================
// LIFECYCLE
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct StartSessionBody {
    #[serde(default)]
    pub page_url: Option<String>,
    #[serde(default)]
    pub utm_source: Option<String>,
    #[serde(default)]
    pub utm_medium: Option<String>,
    #[serde(default)]
    pub utm_campaign: Option<String>,
}

/// `POST /api/campaigns/:id/sessions` — start a visitor session.
pub async fn start_session(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<StartSessionBody>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let campaign = Arc::new(load_campaign(&state, campaign_id).await?);
    let visitor = visitor_from_headers(&headers, body.page_url);
    let utm = Utm { source: body.utm_source, medium: body.utm_medium, campaign: body.utm_campaign };
    let controller = FunnelController::new(
        campaign,
        Arc::new(state.recorder()),
        state.outcome_recording,
        FunnelContext::new(visitor, utm),
    );

    let session_id = Uuid::new_v4();
    let response = respond(session_id, &controller, None);
    state.insert_session(session_id, controller).await;

    tracing::info!(%session_id, %campaign_id, state = ?response.snapshot.state, "session started");
    Ok((StatusCode::CREATED, response))
}

/// `GET /api/sessions/:sid`
pub async fn get_session(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let controller = handle.lock().await;
    Ok(respond(sid, &controller, None))
}

/// `DELETE /api/sessions/:sid`
pub async fn end_session(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if state.remove_session(sid).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("session"))
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// `POST /api/sessions/:sid/click` — open the gated game.
pub async fn click(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let mut controller = handle.lock().await;
    controller.click_game()?;
    Ok(respond(sid, &controller, None))
}

/// `POST /api/sessions/:sid/close` — dismiss the lead-capture overlay.
pub async fn close(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let mut controller = handle.lock().await;
    controller.close_gate()?;
    Ok(respond(sid, &controller, None))
}

/// `POST /api/sessions/:sid/advance` — leave the start screen.
pub async fn advance(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let mut controller = handle.lock().await;
    controller.advance()?;
    Ok(respond(sid, &controller, None))
}

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
    #[serde(default)]
    pub form_data: Map<String, Value>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `POST /api/sessions/:sid/submit` — submit the lead-capture form.
pub async fn submit(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(body): Json<SubmitBody>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let pending = handle.lock().await.begin_submit(body.form_data, body.email.as_deref())?;
    let written = pending.send().await;
    let mut controller = handle.lock().await;
    controller.complete_submit(written)?;
    Ok(respond(sid, &controller, None))
}

#[derive(Debug, Deserialize)]
pub struct FinishBody {
    pub outcome: Outcome,
}

/// `POST /api/sessions/:sid/finish` — report a client-decided outcome.
pub async fn finish(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(body): Json<FinishBody>,
) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let mut controller = handle.lock().await;
    // The outcome write completes in the background.
    let _write = controller.finish(body.outcome)?;
    Ok(respond(sid, &controller, None))
}

/// `POST /api/sessions/:sid/play` — let the server draw the outcome.
pub async fn play(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let mut controller = handle.lock().await;
    let (drawn, _write) = controller.play(&mut rand::rng())?;
    Ok(respond(sid, &controller, Some(drawn)))
}

/// `POST /api/sessions/:sid/reset` — the result screen's replay action.
pub async fn reset(State(state): State<AppState>, Path(sid): Path<Uuid>) -> Result<Json<SessionResponse>, ApiError> {
    let handle = session(&state, sid).await?;
    let mut controller = handle.lock().await;
    result::replay(&mut controller)?;
    Ok(respond(sid, &controller, None))
}

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;
