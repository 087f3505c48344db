//! Game dispatch: which funnel a campaign runs and what its game slot shows.
//!
//! An explicit `funnel` override always wins. Otherwise chance games (wheel,
//! scratch, jackpot, dice) run behind the lead-capture gate and everything
//! else runs the linear funnel. The gated funnel can only render chance
//! games; anything it cannot render, and every unknown type, gets a textual
//! fallback instead of a game. Dispatch is total and never fails.

use serde::Serialize;

use crate::campaign::{CampaignKind, DeclaredType, FunnelKind};

/// Copy shown in the game slot when the type cannot be rendered.
pub const INCOMPATIBLE_MESSAGE: &str = "This game is not compatible with this funnel.";

/// What the game slot renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum GameSurface {
    Game(CampaignKind),
    Fallback(String),
}

impl GameSurface {
    #[must_use]
    pub fn game(&self) -> Option<CampaignKind> {
        match self {
            Self::Game(kind) => Some(*kind),
            Self::Fallback(_) => None,
        }
    }
}

/// Rendering path for one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub funnel: FunnelKind,
    pub surface: GameSurface,
}

/// Default funnel for a declared type when no override is set.
#[must_use]
pub fn default_funnel(declared: &DeclaredType) -> FunnelKind {
    match declared.kind() {
        Some(kind) if kind.is_chance_game() => FunnelKind::Unlocked,
        _ => FunnelKind::Standard,
    }
}

/// Whether `funnel` knows how to render `kind`.
#[must_use]
pub fn supports(funnel: FunnelKind, kind: CampaignKind) -> bool {
    match funnel {
        FunnelKind::Unlocked => kind.is_chance_game(),
        FunnelKind::Standard => true,
    }
}

/// Resolve the rendering path for a campaign.
#[must_use]
pub fn route(declared: &DeclaredType, funnel_override: Option<FunnelKind>) -> Route {
    let funnel = funnel_override.unwrap_or_else(|| default_funnel(declared));
    let surface = match declared.kind() {
        Some(kind) if supports(funnel, kind) => GameSurface::Game(kind),
        _ => {
            tracing::debug!(declared = ?declared, ?funnel, "game type has no renderer on this funnel");
            GameSurface::Fallback(INCOMPATIBLE_MESSAGE.to_string())
        }
    };
    Route { funnel, surface }
}

#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;
