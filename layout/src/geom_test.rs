#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// Point / Rect basics
// =============================================================

#[test]
fn point_sub_is_component_wise() {
    let p = Point::new(50.0, 40.0).sub(Point::new(20.0, 15.0));
    assert_eq!(p, Point::new(30.0, 25.0));
}

#[test]
fn rect_edges() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0);
    assert_eq!(r.right(), 40.0);
    assert_eq!(r.bottom(), 60.0);
    assert_eq!(r.origin(), Point::new(10.0, 20.0));
    assert_eq!(r.size(), Size::new(30.0, 40.0));
}

#[test]
fn rect_from_parts_round_trips_origin_and_size() {
    let r = Rect::from_parts(Point::new(1.0, 2.0), Size::new(3.0, 4.0));
    assert_eq!(r, Rect::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn rect_contains_includes_edges() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(!r.contains(Point::new(10.1, 5.0)));
}

// =============================================================
// overlaps
// =============================================================

#[test]
fn overlaps_when_intersecting() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(50.0, 50.0, 100.0, 100.0);
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
}

#[test]
fn overlaps_when_contained() {
    let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
    let inner = Rect::new(25.0, 25.0, 10.0, 10.0);
    assert!(outer.overlaps(&inner));
    assert!(inner.overlaps(&outer));
}

#[test]
fn touching_edges_count_as_overlap() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    let b = Rect::new(100.0, 0.0, 50.0, 50.0);
    assert!(a.overlaps(&b));
}

#[test]
fn separated_boxes_do_not_overlap() {
    let a = Rect::new(0.0, 0.0, 100.0, 100.0);
    assert!(!a.overlaps(&Rect::new(100.5, 0.0, 10.0, 10.0)));
    assert!(!a.overlaps(&Rect::new(-20.0, 0.0, 10.0, 10.0)));
    assert!(!a.overlaps(&Rect::new(0.0, 101.0, 10.0, 10.0)));
    assert!(!a.overlaps(&Rect::new(0.0, -11.0, 10.0, 10.0)));
}

// =============================================================
// clamping
// =============================================================

#[test]
fn clamp_axis_bounds() {
    assert_eq!(clamp_axis(-5.0, 100.0), 0.0);
    assert_eq!(clamp_axis(150.0, 100.0), 100.0);
    assert_eq!(clamp_axis(42.0, 100.0), 42.0);
}

#[test]
fn clamp_axis_negative_limit_pins_to_zero() {
    assert_eq!(clamp_axis(30.0, -10.0), 0.0);
}

#[test]
fn clamp_origin_keeps_box_inside() {
    let origin = clamp_origin(Point::new(1000.0, -50.0), Size::new(200.0, 80.0), Size::new(400.0, 600.0));
    assert_eq!(origin, Point::new(200.0, 0.0));
    assert!(Rect::from_parts(origin, Size::new(200.0, 80.0)).is_within(Size::new(400.0, 600.0)));
}

#[test]
fn is_within_rejects_overflow() {
    let container = Size::new(100.0, 100.0);
    assert!(Rect::new(0.0, 0.0, 100.0, 100.0).is_within(container));
    assert!(!Rect::new(1.0, 0.0, 100.0, 100.0).is_within(container));
    assert!(!Rect::new(-1.0, 0.0, 10.0, 10.0).is_within(container));
}
