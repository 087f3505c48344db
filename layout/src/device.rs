//! Per-device layout resolution.
//!
//! An element carries a base position/size plus sparse per-device overrides
//! (`deviceConfig`). Resolution picks, axis by axis, the device value, then the
//! base value, then a hard default. Background images follow the same
//! "specific beats generic" rule. Everything here is pure: the same inputs
//! always produce the same output.

#[cfg(test)]
#[path = "device_test.rs"]
mod device_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_X, DEFAULT_Y};
use crate::geom::{Rect, Size, clamp_origin};

/// Preview / runtime breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Device {
    pub const ALL: [Self; 3] = [Self::Desktop, Self::Tablet, Self::Mobile];

    /// Parse a query-string device name. Unknown names fall back to desktop.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tablet" => Self::Tablet,
            "mobile" => Self::Mobile,
            _ => Self::Desktop,
        }
    }
}

/// Sparse box values. Any axis may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Base position of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BasePosition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

/// Base size of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseSize {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A free-form text or image element placed on a campaign screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceableElement {
    pub id: String,
    #[serde(default)]
    pub position: BasePosition,
    #[serde(default)]
    pub size: BaseSize,
    #[serde(default)]
    pub device_config: BTreeMap<Device, BoxOverride>,
}

/// Resolve the effective box of `element` on `device`.
///
/// Each axis is resolved independently: device override, then base value,
/// then the crate default.
#[must_use]
pub fn resolve(element: &PlaceableElement, device: Device) -> Rect {
    let over = element.device_config.get(&device).copied().unwrap_or_default();
    Rect {
        x: over.x.or(element.position.x).unwrap_or(DEFAULT_X),
        y: over.y.or(element.position.y).unwrap_or(DEFAULT_Y),
        width: over.width.or(element.size.width).unwrap_or(DEFAULT_WIDTH),
        height: over.height.or(element.size.height).unwrap_or(DEFAULT_HEIGHT),
    }
}

/// Pick the background image for `device`.
///
/// Mobile prefers its own image when one is configured; every other case uses
/// the generic image. Empty strings count as unset.
#[must_use]
pub fn select_background<'a>(device: Device, generic: Option<&'a str>, mobile: Option<&'a str>) -> Option<&'a str> {
    let non_empty = |s: &&str| !s.trim().is_empty();
    if device == Device::Mobile {
        if let Some(url) = mobile.filter(non_empty) {
            return Some(url);
        }
    }
    generic.filter(non_empty)
}

/// Return the mobile overlay for any non-desktop device, the base otherwise.
#[must_use]
pub fn apply_mobile_config<'a, T>(device: Device, base: &'a T, mobile: Option<&'a T>) -> &'a T {
    match (device, mobile) {
        (Device::Desktop, _) | (_, None) => base,
        (_, Some(overlay)) => overlay,
    }
}

/// Shrink and shift `rect` until it lies inside `container`.
///
/// Size is capped first so the subsequent origin clamp always has room.
#[must_use]
pub fn fit_within(rect: Rect, container: Size) -> Rect {
    let size = Size::new(rect.width.clamp(0.0, container.width.max(0.0)), rect.height.clamp(0.0, container.height.max(0.0)));
    Rect::from_parts(clamp_origin(rect.origin(), size, container), size)
}

/// First device on which `element`, fitted to `container`, touches `game_area`.
#[must_use]
pub fn game_area_conflict(element: &PlaceableElement, container: Size, game_area: &Rect) -> Option<Device> {
    Device::ALL
        .into_iter()
        .find(|device| fit_within(resolve(element, *device), container).overlaps(game_area))
}
