#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn element(value: serde_json::Value) -> PlaceableElement {
    serde_json::from_value(value).unwrap()
}

// =============================================================
// resolve
// =============================================================

#[test]
fn resolve_uses_hard_defaults_for_bare_element() {
    let el = element(json!({ "id": "logo" }));
    assert_eq!(resolve(&el, Device::Desktop), Rect::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn resolve_uses_base_values_without_override() {
    let el = element(json!({
        "id": "title",
        "position": { "x": 12.0, "y": 34.0 },
        "size": { "width": 200.0, "height": 80.0 }
    }));
    assert_eq!(resolve(&el, Device::Tablet), Rect::new(12.0, 34.0, 200.0, 80.0));
}

#[test]
fn resolve_prefers_device_values_per_axis() {
    let el = element(json!({
        "id": "title",
        "position": { "x": 12.0, "y": 34.0 },
        "size": { "width": 200.0, "height": 80.0 },
        "deviceConfig": { "mobile": { "x": 5.0, "height": 40.0 } }
    }));
    assert_eq!(resolve(&el, Device::Mobile), Rect::new(5.0, 34.0, 200.0, 40.0));
    assert_eq!(resolve(&el, Device::Desktop), Rect::new(12.0, 34.0, 200.0, 80.0));
}

#[test]
fn resolve_mixes_override_base_and_default() {
    let el = element(json!({
        "id": "badge",
        "position": { "y": 7.0 },
        "deviceConfig": { "tablet": { "width": 60.0 } }
    }));
    assert_eq!(resolve(&el, Device::Tablet), Rect::new(0.0, 7.0, 60.0, 100.0));
}

#[test]
fn resolve_is_idempotent() {
    let el = element(json!({
        "id": "cta",
        "position": { "x": 1.0, "y": 2.0 },
        "deviceConfig": { "mobile": { "width": 3.0 } }
    }));
    for device in [Device::Desktop, Device::Tablet, Device::Mobile] {
        let first = resolve(&el, device);
        let second = resolve(&el, device);
        assert_eq!(first, second);
    }
}

// =============================================================
// Device
// =============================================================

#[test]
fn device_parse_falls_back_to_desktop() {
    assert_eq!(Device::parse("mobile"), Device::Mobile);
    assert_eq!(Device::parse(" Tablet "), Device::Tablet);
    assert_eq!(Device::parse("watch"), Device::Desktop);
}

#[test]
fn device_serializes_lowercase() {
    assert_eq!(serde_json::to_value(Device::Mobile).unwrap(), json!("mobile"));
}

// =============================================================
// select_background
// =============================================================

#[test]
fn mobile_prefers_mobile_background() {
    assert_eq!(select_background(Device::Mobile, Some("desk.png"), Some("phone.png")), Some("phone.png"));
}

#[test]
fn mobile_without_mobile_background_uses_generic() {
    assert_eq!(select_background(Device::Mobile, Some("desk.png"), None), Some("desk.png"));
    assert_eq!(select_background(Device::Mobile, Some("desk.png"), Some("  ")), Some("desk.png"));
}

#[test]
fn tablet_ignores_mobile_background() {
    assert_eq!(select_background(Device::Tablet, Some("desk.png"), Some("phone.png")), Some("desk.png"));
}

#[test]
fn no_background_configured() {
    assert_eq!(select_background(Device::Desktop, None, Some("phone.png")), None);
    assert_eq!(select_background(Device::Desktop, Some(""), None), None);
}

// =============================================================
// apply_mobile_config
// =============================================================

#[test]
fn mobile_config_only_applies_off_desktop() {
    let base = "base";
    let mobile = "mobile";
    assert_eq!(*apply_mobile_config(Device::Desktop, &base, Some(&mobile)), "base");
    assert_eq!(*apply_mobile_config(Device::Tablet, &base, Some(&mobile)), "mobile");
    assert_eq!(*apply_mobile_config(Device::Mobile, &base, Some(&mobile)), "mobile");
    assert_eq!(*apply_mobile_config(Device::Mobile, &base, None), "base");
}

// =============================================================
// fit_within
// =============================================================

#[test]
fn fit_within_shifts_overflowing_box() {
    let fitted = fit_within(Rect::new(350.0, 590.0, 200.0, 80.0), Size::new(400.0, 600.0));
    assert_eq!(fitted, Rect::new(200.0, 520.0, 200.0, 80.0));
}

#[test]
fn fit_within_shrinks_oversized_box() {
    let fitted = fit_within(Rect::new(10.0, 10.0, 900.0, 50.0), Size::new(400.0, 600.0));
    assert_eq!(fitted, Rect::new(0.0, 10.0, 400.0, 50.0));
    assert!(fitted.is_within(Size::new(400.0, 600.0)));
}

#[test]
fn fit_within_leaves_valid_box_untouched() {
    let rect = Rect::new(20.0, 20.0, 200.0, 80.0);
    assert_eq!(fit_within(rect, Size::new(400.0, 600.0)), rect);
}

// =============================================================
// game_area_conflict
// =============================================================

#[test]
fn game_area_conflict_checks_every_device() {
    let game = Rect::new(50.0, 200.0, 300.0, 300.0);
    let container = Size::new(400.0, 600.0);
    let clear = element(json!({ "id": "logo", "position": { "x": 10.0, "y": 10.0 }, "size": { "width": 120.0, "height": 40.0 } }));
    assert_eq!(game_area_conflict(&clear, container, &game), None);

    let mobile_only = element(json!({
        "id": "logo",
        "position": { "x": 10.0, "y": 10.0 },
        "size": { "width": 120.0, "height": 40.0 },
        "deviceConfig": { "mobile": { "y": 250.0 } }
    }));
    assert_eq!(game_area_conflict(&mobile_only, container, &game), Some(Device::Mobile));
}

#[test]
fn game_area_conflict_counts_touching_edges() {
    let game = Rect::new(50.0, 200.0, 300.0, 300.0);
    let touching = element(json!({ "id": "cta", "position": { "x": 10.0, "y": 160.0 }, "size": { "width": 120.0, "height": 40.0 } }));
    assert_eq!(game_area_conflict(&touching, Size::new(400.0, 600.0), &game), Some(Device::Desktop));
}
