//! Background expiry for idle funnel sessions.
//!
//! Visitors rarely end their sessions explicitly; they close the tab. The
//! sweep removes sessions whose last request is older than the configured
//! TTL so the session map stays bounded by recent traffic.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::SessionLimits;
use crate::state::AppState;

/// Spawn the sweep loop. Returns a handle for shutdown.
pub fn spawn_session_sweeper(state: AppState, limits: SessionLimits) -> JoinHandle<()> {
    info!(ttl_secs = limits.ttl_secs, sweep_secs = limits.sweep_secs, "session expiry configured");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(limits.sweep_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            sweep_once(&state).await;
        }
    })
}

pub(crate) async fn sweep_once(state: &AppState) -> usize {
    let expired = state.sweep_sessions().await;
    if expired > 0 {
        let remaining = state.session_count().await;
        info!(expired, remaining, "idle sessions expired");
    } else {
        debug!("no idle sessions");
    }
    expired
}

#[cfg(test)]
#[path = "sweeper_test.rs"]
mod tests;
