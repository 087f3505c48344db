//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the campaign API, participation recording and
//! export, and server-held funnel sessions. Handlers translate HTTP into
//! service calls and render service errors through `ApiError`.

pub mod campaigns;
pub mod participations;
pub mod sessions;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::recorder::VisitorContext;
use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/campaigns", post(campaigns::create_campaign))
        .route("/api/campaigns/{id}", get(campaigns::get_campaign))
        .route("/api/campaigns/{id}/render", get(campaigns::render_campaign))
        .route(
            "/api/campaigns/{id}/participations",
            get(participations::list_participations).post(participations::create_participation),
        )
        .route("/api/campaigns/{id}/participations.csv", get(participations::export_csv))
        .route("/api/campaigns/{id}/sessions", post(sessions::start_session))
        .route("/api/sessions/{sid}", get(sessions::get_session).delete(sessions::end_session))
        .route("/api/sessions/{sid}/click", post(sessions::click))
        .route("/api/sessions/{sid}/close", post(sessions::close))
        .route("/api/sessions/{sid}/advance", post(sessions::advance))
        .route("/api/sessions/{sid}/submit", post(sessions::submit))
        .route("/api/sessions/{sid}/finish", post(sessions::finish))
        .route("/api/sessions/{sid}/play", post(sessions::play))
        .route("/api/sessions/{sid}/reset", post(sessions::reset))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Visitor details from request headers. An explicit `page_url` wins over
/// `Referer`; the client IP is the first `X-Forwarded-For` hop.
pub(crate) fn visitor_from_headers(headers: &HeaderMap, page_url: Option<String>) -> VisitorContext {
    let text = |name: header::HeaderName| {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|s| !s.is_empty()).map(String::from)
    };
    let ip_address = text(header::HeaderName::from_static("x-forwarded-for"))
        .and_then(|raw| raw.split(',').next().map(|hop| hop.trim().to_string()))
        .filter(|hop| !hop.is_empty());

    VisitorContext {
        user_agent: text(header::USER_AGENT),
        page_url: page_url.filter(|url| !url.trim().is_empty()).or_else(|| text(header::REFERER)),
        ip_address,
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
