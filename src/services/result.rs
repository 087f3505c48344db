//! Result screen presentation.
//!
//! Copy comes from the campaign's result screen (`screens[3]`) and falls back
//! to fixed defaults when a message is missing or blank. The claim-prize
//! button only appears on a win with a configured link. A replay action is
//! always present.

use serde::Serialize;

use crate::campaign::{Campaign, Screen, ScreenSlot};
use crate::services::funnel::{FunnelController, FunnelError, FunnelState, Outcome};

pub const DEFAULT_WIN_MESSAGE: &str = "Congratulations, you won!";
pub const DEFAULT_LOSE_MESSAGE: &str = "Not this time. Thanks for playing!";
pub const DEFAULT_THANK_YOU_MESSAGE: &str = "Thank you for taking part!";
pub const DEFAULT_CTA_TEXT: &str = "Claim my prize";
pub const DEFAULT_REPLAY_TEXT: &str = "Play again";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallToAction {
    pub text: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayAction {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    /// `None` for campaigns without a game, such as forms.
    pub outcome: Option<Outcome>,
    pub title: Option<String>,
    pub message: String,
    pub cta: Option<CallToAction>,
    pub replay: ReplayAction,
}

/// Build the result screen for `outcome`.
#[must_use]
pub fn present(campaign: &Campaign, outcome: Option<Outcome>) -> ResultView {
    let screen = campaign.screen(ScreenSlot::Result);

    let message = match outcome {
        Some(Outcome::Win) => field(screen, |s| &s.win_message).unwrap_or(DEFAULT_WIN_MESSAGE),
        Some(Outcome::Lose) => field(screen, |s| &s.lose_message).unwrap_or(DEFAULT_LOSE_MESSAGE),
        None => field(screen, |s| &s.description).unwrap_or(DEFAULT_THANK_YOU_MESSAGE),
    };

    let cta = match (outcome, field(screen, |s| &s.cta_link)) {
        (Some(Outcome::Win), Some(link)) => Some(CallToAction {
            text: field(screen, |s| &s.cta_text).unwrap_or(DEFAULT_CTA_TEXT).to_string(),
            link: link.to_string(),
        }),
        _ => None,
    };

    ResultView {
        outcome,
        title: field(screen, |s| &s.title).map(ToString::to_string),
        message: message.to_string(),
        cta,
        replay: ReplayAction { label: field(screen, |s| &s.replay_button_text).unwrap_or(DEFAULT_REPLAY_TEXT).to_string() },
    }
}

/// Result screen for a session that has reached its terminal state.
#[must_use]
pub fn present_for(controller: &FunnelController) -> Option<ResultView> {
    controller
        .state()
        .is_terminal()
        .then(|| present(controller.campaign(), controller.context().outcome))
}

/// The replay action: send the visitor back to the first screen.
///
/// # Errors
///
/// Propagates `FunnelError::InvalidTransition` when no result is showing.
pub fn replay(controller: &mut FunnelController) -> Result<FunnelState, FunnelError> {
    controller.reset()
}

/// A screen text, treating blank strings as unset.
fn field<'a>(screen: Option<&'a Screen>, pick: fn(&Screen) -> &Option<String>) -> Option<&'a str> {
    screen.and_then(|s| pick(s).as_deref()).map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "result_test.rs"]
mod tests;
