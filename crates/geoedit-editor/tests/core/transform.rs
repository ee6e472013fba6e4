use geoedit_editor::geometry::coord;
use geoedit_editor::primitives::rectangle;
use geoedit_editor::transform::{mirror, offset, rotate, scale, skew};
use geoedit_editor::{Geometry, GeometryValue, MirrorAxis};
use geo::Coord;
use proptest::prelude::*;

fn shape(x: f64, y: f64, w: f64, h: f64) -> GeometryValue {
    GeometryValue::new(Geometry::Polygon(rectangle(coord(x, y), coord(x + w, y + h))))
}

fn coords(value: &GeometryValue) -> Vec<Coord> {
    value.coords().collect()
}

fn assert_same(a: &GeometryValue, b: &GeometryValue, tolerance: f64) {
    let (ca, cb) = (coords(a), coords(b));
    assert_eq!(ca.len(), cb.len());
    for (p, q) in ca.iter().zip(&cb) {
        assert!(
            (p.x - q.x).abs() <= tolerance && (p.y - q.y).abs() <= tolerance,
            "{:?} != {:?}",
            p,
            q
        );
    }
}

#[test]
fn test_rotate_quarter_turn_counter_clockwise() {
    let value = GeometryValue::new(Geometry::Point(coord(1.0, 0.0)));
    let rotated = rotate(&value, 90.0, coord(0.0, 0.0));
    let p = coords(&rotated)[0];
    assert!(p.x.abs() < 1e-9);
    assert!((p.y - 1.0).abs() < 1e-9);
}

#[test]
fn test_mirror_twice_is_identity() {
    let value = shape(1.0, 2.0, 3.0, 4.0);
    let back = mirror(&mirror(&value, MirrorAxis::Y, coord(0.5, 0.0)), MirrorAxis::Y, coord(0.5, 0.0));
    assert_same(&value, &back, 1e-9);
}

#[test]
fn test_mirror_x_flips_vertically() {
    let value = GeometryValue::new(Geometry::Point(coord(2.0, 3.0)));
    let p = coords(&mirror(&value, MirrorAxis::X, coord(0.0, 1.0)))[0];
    assert!((p.x - 2.0).abs() < 1e-9);
    assert!((p.y + 1.0).abs() < 1e-9);
}

#[test]
fn test_skew_keeps_origin_fixed() {
    let value = shape(0.0, 0.0, 1.0, 1.0);
    let skewed = skew(&value, 30.0, 0.0, coord(0.0, 0.0));
    assert!(coords(&skewed).contains(&coord(0.0, 0.0)));
}

#[test]
fn test_transforms_keep_utility_flag() {
    let preview = GeometryValue::utility(Geometry::Point(coord(1.0, 1.0)));
    assert!(offset(&preview, 1.0, 1.0).is_utility);
    assert!(scale(&preview, 2.0, None, coord(0.0, 0.0)).is_utility);
}

proptest! {
    #[test]
    fn prop_offset_then_inverse(
        x in -50.0f64..50.0,
        y in -50.0f64..50.0,
        dx in -100.0f64..100.0,
        dy in -100.0f64..100.0,
    ) {
        let value = shape(x, y, 2.0, 1.0);
        let back = offset(&offset(&value, dx, dy), -dx, -dy);
        assert_same(&value, &back, 1e-9);
    }

    #[test]
    fn prop_scale_then_reciprocal(
        x in -50.0f64..50.0,
        y in -50.0f64..50.0,
        factor in 0.1f64..10.0,
    ) {
        let value = shape(x, y, 3.0, 2.0);
        let origin = coord(1.0, -1.0);
        let back = scale(&scale(&value, factor, None, origin), 1.0 / factor, None, origin);
        assert_same(&value, &back, 1e-6);
    }

    #[test]
    fn prop_rotate_then_inverse(angle in -360.0f64..360.0) {
        let value = shape(-1.0, 2.0, 4.0, 1.5);
        let origin = coord(3.0, 3.0);
        let back = rotate(&rotate(&value, angle, origin), -angle, origin);
        assert_same(&value, &back, 1e-6);
    }
}
