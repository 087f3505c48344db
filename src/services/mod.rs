//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own funnel logic and persistence calls so route handlers
//! stay focused on request parsing and response shaping.

pub mod export;
pub mod funnel;
pub mod outcome;
pub mod recorder;
pub mod result;
pub mod sweeper;
