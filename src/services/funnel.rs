//! Funnel controller: sequences one visitor through a campaign.
//!
//! DESIGN
//! ======
//! Two funnels exist. The unlocked funnel shows the game behind a lead-capture
//! overlay:
//!
//! ```text
//! Locked --click--> FormGate --submit ok--> GameActive --finish--> Resolved
//!    |                 |                                              |
//!    +--click (already validated)--> GameActive      Locked <--reset--+
//! ```
//!
//! The standard funnel is strictly linear: `Start -> Form -> Game -> Result`.
//! Form campaigns, and campaigns whose game slot shows a fallback, go from
//! `Form` straight to `Result`.
//!
//! Every controller owns a `FunnelContext` created when its session starts.
//! Nothing about a visitor lives in module or process globals.
//!
//! PERSISTENCE
//! ===========
//! The form submit writes a participation and blocks on it: a failure keeps
//! the visitor on the form. The write runs in three steps (`begin_submit`,
//! `PendingSubmit::send`, `complete_submit`) so a caller holding the session
//! lock can release it while the store call is in flight; readers then see
//! `submitting: true`. The outcome write on finish is spawned and never
//! awaited; a failure there is logged and the visitor still sees a result.
//! Under `OutcomeRecording::Linked` the outcome row carries the id of the
//! form row as `participation_id`.

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::campaign::{Campaign, CampaignKind, FormField, FunnelKind, ScreenSlot};
use crate::dispatch::{self, Route};
use crate::error::ErrorCode;
use crate::services::outcome::{self, Draw};
use crate::services::recorder::{Recorder, RecorderError, Utm, VisitorContext};
use crate::store::Participation;

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockedState {
    Locked,
    FormGate,
    GameActive,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardStep {
    Start,
    Form,
    Game,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "funnel", content = "state", rename_all = "lowercase")]
pub enum FunnelState {
    Unlocked(UnlockedState),
    Standard(StandardStep),
}

impl FunnelState {
    #[must_use]
    pub fn initial(funnel: FunnelKind) -> Self {
        match funnel {
            FunnelKind::Unlocked => Self::Unlocked(UnlockedState::Locked),
            FunnelKind::Standard => Self::Standard(StandardStep::Start),
        }
    }

    fn accepts_form(self) -> bool {
        matches!(self, Self::Unlocked(UnlockedState::FormGate) | Self::Standard(StandardStep::Form))
    }

    fn in_game(self) -> bool {
        matches!(self, Self::Unlocked(UnlockedState::GameActive) | Self::Standard(StandardStep::Game))
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Unlocked(UnlockedState::Resolved) | Self::Standard(StandardStep::Result))
    }

    /// The screen whose copy is showing. A locked game shows its own screen.
    #[must_use]
    pub fn screen(self) -> ScreenSlot {
        match self {
            Self::Standard(StandardStep::Start) => ScreenSlot::Start,
            Self::Unlocked(UnlockedState::FormGate) | Self::Standard(StandardStep::Form) => ScreenSlot::Form,
            Self::Unlocked(UnlockedState::Locked | UnlockedState::GameActive) | Self::Standard(StandardStep::Game) => {
                ScreenSlot::Game
            }
            Self::Unlocked(UnlockedState::Resolved) | Self::Standard(StandardStep::Result) => ScreenSlot::Result,
        }
    }
}

/// How the outcome write relates to the form write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeRecording {
    /// Outcome row carries `participation_id` of the form row.
    #[default]
    Linked,
    /// Outcome row carries only `game_result`.
    Separate,
}

impl OutcomeRecording {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "linked" => Some(Self::Linked),
            "separate" => Some(Self::Separate),
            _ => None,
        }
    }
}

/// Per-session visitor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunnelContext {
    /// A form was accepted this session.
    pub validated: bool,
    /// A form write is in flight.
    pub submitting: bool,
    pub outcome: Option<Outcome>,
    /// Id of the participation written by the form step.
    pub participation_id: Option<Uuid>,
    /// Email from the accepted form, reused for the outcome write.
    pub email: Option<String>,
    /// Last error the visitor should see.
    pub error: Option<String>,
    pub visitor: VisitorContext,
    pub utm: Utm,
}

impl FunnelContext {
    #[must_use]
    pub fn new(visitor: VisitorContext, utm: Utm) -> Self {
        Self { visitor, utm, ..Self::default() }
    }

    fn clear_progress(&mut self) {
        self.validated = false;
        self.submitting = false;
        self.outcome = None;
        self.participation_id = None;
        self.email = None;
        self.error = None;
    }
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunnelSnapshot {
    pub campaign_id: Uuid,
    pub route: Route,
    pub state: FunnelState,
    pub screen: ScreenSlot,
    pub validated: bool,
    pub submitting: bool,
    pub outcome: Option<Outcome>,
    pub participation_id: Option<Uuid>,
    pub error: Option<String>,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FunnelError {
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },
    #[error(transparent)]
    Persistence(#[from] RecorderError),
    #[error("cannot {action} from {state:?}")]
    InvalidTransition { action: &'static str, state: FunnelState },
    #[error("{}", dispatch::INCOMPATIBLE_MESSAGE)]
    Incompatible,
    #[error("{0} outcomes are not drawn by the server")]
    NotDrawable(&'static str),
    #[error("a form submission is already in progress")]
    SubmitInFlight,
}

impl ErrorCode for FunnelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "E_VALIDATION",
            Self::Persistence(inner) => inner.error_code(),
            Self::InvalidTransition { .. } => "E_INVALID_TRANSITION",
            Self::Incompatible => "E_INCOMPATIBLE_GAME",
            Self::NotDrawable(_) => "E_NOT_DRAWABLE",
            Self::SubmitInFlight => "E_SUBMIT_IN_FLIGHT",
        }
    }

    fn status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Persistence(inner) => inner.status(),
            Self::InvalidTransition { .. } | Self::Incompatible | Self::SubmitInFlight => StatusCode::CONFLICT,
            Self::NotDrawable(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// A validated form write, detached from the controller so it can run
/// without the session lock.
pub struct PendingSubmit {
    recorder: Arc<Recorder>,
    campaign_id: Uuid,
    form_data: Map<String, Value>,
    explicit_email: Option<String>,
    visitor: VisitorContext,
    utm: Utm,
}

impl PendingSubmit {
    /// # Errors
    ///
    /// Returns `RecorderError` when the store rejects the write.
    pub async fn send(self) -> Result<Participation, RecorderError> {
        self.recorder
            .create(self.campaign_id, self.form_data, self.explicit_email.as_deref(), &self.visitor, &self.utm)
            .await
    }
}

pub struct FunnelController {
    campaign: Arc<Campaign>,
    recorder: Arc<Recorder>,
    recording: OutcomeRecording,
    route: Route,
    state: FunnelState,
    ctx: FunnelContext,
}

impl FunnelController {
    #[must_use]
    pub fn new(
        campaign: Arc<Campaign>,
        recorder: Arc<Recorder>,
        recording: OutcomeRecording,
        ctx: FunnelContext,
    ) -> Self {
        let route = dispatch::route(&campaign.declared_type, campaign.funnel);
        let state = FunnelState::initial(route.funnel);
        Self { campaign, recorder, recording, route, state, ctx }
    }

    #[must_use]
    pub fn state(&self) -> FunnelState {
        self.state
    }

    #[must_use]
    pub fn context(&self) -> &FunnelContext {
        &self.ctx
    }

    #[must_use]
    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    #[must_use]
    pub fn snapshot(&self) -> FunnelSnapshot {
        FunnelSnapshot {
            campaign_id: self.campaign.id,
            route: self.route.clone(),
            state: self.state,
            screen: self.state.screen(),
            validated: self.ctx.validated,
            submitting: self.ctx.submitting,
            outcome: self.ctx.outcome,
            participation_id: self.ctx.participation_id,
            error: self.ctx.error.clone(),
        }
    }

    /// Visitor clicked the gated game surface.
    ///
    /// # Errors
    ///
    /// `Incompatible` when the surface is a fallback, `InvalidTransition`
    /// outside `Locked`.
    pub fn click_game(&mut self) -> Result<FunnelState, FunnelError> {
        if self.state != FunnelState::Unlocked(UnlockedState::Locked) {
            return Err(self.invalid("open the game"));
        }
        if self.route.surface.game().is_none() {
            return Err(FunnelError::Incompatible);
        }
        self.state = if self.ctx.validated {
            FunnelState::Unlocked(UnlockedState::GameActive)
        } else {
            FunnelState::Unlocked(UnlockedState::FormGate)
        };
        Ok(self.state)
    }

    /// Visitor dismissed the lead-capture overlay.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside `FormGate`.
    pub fn close_gate(&mut self) -> Result<FunnelState, FunnelError> {
        if self.state != FunnelState::Unlocked(UnlockedState::FormGate) {
            return Err(self.invalid("close the form"));
        }
        if self.ctx.submitting {
            return Err(FunnelError::SubmitInFlight);
        }
        self.state = FunnelState::Unlocked(UnlockedState::Locked);
        self.ctx.error = None;
        Ok(self.state)
    }

    /// Move the standard funnel off its start screen.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` anywhere but `Start`. The form and game steps
    /// advance through [`Self::submit_form`] and [`Self::finish`].
    pub fn advance(&mut self) -> Result<FunnelState, FunnelError> {
        if self.state != FunnelState::Standard(StandardStep::Start) {
            return Err(self.invalid("advance"));
        }
        self.state = FunnelState::Standard(StandardStep::Form);
        Ok(self.state)
    }

    /// Validate and record the lead-capture form.
    ///
    /// # Errors
    ///
    /// Everything [`Self::begin_submit`] and [`Self::complete_submit`] return.
    pub async fn submit_form(
        &mut self,
        form_data: Map<String, Value>,
        explicit_email: Option<&str>,
    ) -> Result<FunnelState, FunnelError> {
        let pending = self.begin_submit(form_data, explicit_email)?;
        let written = pending.send().await;
        self.complete_submit(written)
    }

    /// Validate the form and mark a write as in flight.
    ///
    /// # Errors
    ///
    /// `Validation` when required fields are missing (nothing is written),
    /// `SubmitInFlight` while an earlier write is pending, `InvalidTransition`
    /// when no form is showing.
    pub fn begin_submit(
        &mut self,
        form_data: Map<String, Value>,
        explicit_email: Option<&str>,
    ) -> Result<PendingSubmit, FunnelError> {
        if self.ctx.submitting {
            return Err(FunnelError::SubmitInFlight);
        }
        if !self.state.accepts_form() {
            return Err(self.invalid("submit the form"));
        }

        let missing = missing_required(&self.campaign.form_fields, &form_data);
        if !missing.is_empty() {
            let err = FunnelError::Validation { missing };
            self.ctx.error = Some(err.to_string());
            return Err(err);
        }

        self.ctx.submitting = true;
        self.ctx.error = None;
        Ok(PendingSubmit {
            recorder: Arc::clone(&self.recorder),
            campaign_id: self.campaign.id,
            form_data,
            explicit_email: explicit_email.map(ToString::to_string),
            visitor: self.ctx.visitor.clone(),
            utm: self.ctx.utm.clone(),
        })
    }

    /// Apply the outcome of a [`PendingSubmit`].
    ///
    /// # Errors
    ///
    /// `Persistence` when the write failed (the form stays open),
    /// `InvalidTransition` when no write was pending.
    pub fn complete_submit(&mut self, written: Result<Participation, RecorderError>) -> Result<FunnelState, FunnelError> {
        if !self.ctx.submitting {
            return Err(self.invalid("complete a form write"));
        }
        self.ctx.submitting = false;

        let row = match written {
            Ok(row) => row,
            Err(e) => {
                self.ctx.error = self.recorder.last_error().or_else(|| Some(e.to_string()));
                return Err(e.into());
            }
        };

        self.ctx.validated = true;
        self.ctx.participation_id = Some(row.id);
        self.ctx.email = row.user_email;
        self.ctx.error = None;
        self.state = match self.state {
            FunnelState::Unlocked(_) => FunnelState::Unlocked(UnlockedState::GameActive),
            FunnelState::Standard(_) if self.has_playable_game() => FunnelState::Standard(StandardStep::Game),
            FunnelState::Standard(_) => FunnelState::Standard(StandardStep::Result),
        };
        info!(campaign_id = %self.campaign.id, state = ?self.state, "form accepted");
        Ok(self.state)
    }

    /// Record the game outcome and move to the result screen.
    ///
    /// The outcome write runs in the background. The returned handle is only
    /// useful to callers that want to wait for it.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` when no game is in progress.
    pub fn finish(&mut self, outcome: Outcome) -> Result<JoinHandle<()>, FunnelError> {
        if !self.state.in_game() {
            return Err(self.invalid("finish the game"));
        }
        self.ctx.outcome = Some(outcome);
        self.state = match self.state {
            FunnelState::Unlocked(_) => FunnelState::Unlocked(UnlockedState::Resolved),
            FunnelState::Standard(_) => FunnelState::Standard(StandardStep::Result),
        };

        let mut form_data = Map::new();
        form_data.insert("game_result".into(), json!(outcome.as_str()));
        if self.recording == OutcomeRecording::Linked {
            if let Some(id) = self.ctx.participation_id {
                form_data.insert("participation_id".into(), json!(id));
            }
        }

        let recorder = Arc::clone(&self.recorder);
        let campaign_id = self.campaign.id;
        let email = self.ctx.email.clone();
        let visitor = self.ctx.visitor.clone();
        let utm = self.ctx.utm.clone();
        Ok(tokio::spawn(async move {
            if let Err(e) = recorder.create(campaign_id, form_data, email.as_deref(), &visitor, &utm).await {
                warn!(%campaign_id, outcome = outcome.as_str(), error = %e, "outcome write failed");
            }
        }))
    }

    /// Draw the outcome server-side, then [`Self::finish`] with it.
    ///
    /// # Errors
    ///
    /// `NotDrawable` for skill games and forms, plus everything `finish` returns.
    pub fn play<R: Rng>(&mut self, rng: &mut R) -> Result<(Draw, JoinHandle<()>), FunnelError> {
        if !self.state.in_game() {
            return Err(self.invalid("play"));
        }
        let Some(game) = self.campaign.game.as_ref() else {
            return Err(FunnelError::Incompatible);
        };
        let drawn = outcome::draw(game, rng).ok_or(FunnelError::NotDrawable(game.kind().as_str()))?;
        let handle = self.finish(drawn.outcome)?;
        Ok((drawn, handle))
    }

    /// Return to the first screen and forget this visitor's progress.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` before a result is showing.
    pub fn reset(&mut self) -> Result<FunnelState, FunnelError> {
        if !self.state.is_terminal() {
            return Err(self.invalid("reset"));
        }
        self.ctx.clear_progress();
        self.state = FunnelState::initial(self.route.funnel);
        Ok(self.state)
    }

    fn has_playable_game(&self) -> bool {
        matches!(self.route.surface.game(), Some(kind) if kind != CampaignKind::Form)
    }

    fn invalid(&self, action: &'static str) -> FunnelError {
        FunnelError::InvalidTransition { action, state: self.state }
    }
}

/// Ids of required fields that are absent, null, blank or unchecked.
#[must_use]
pub fn missing_required(fields: &[FormField], form_data: &Map<String, Value>) -> Vec<String> {
    fields
        .iter()
        .filter(|field| field.required)
        .filter(|field| match form_data.get(&field.id) {
            None | Some(Value::Null | Value::Bool(false)) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        })
        .map(|field| field.id.clone())
        .collect()
}

#[cfg(test)]
#[path = "funnel_test.rs"]
mod tests;
