use geoedit_core::EditorError;
use geoedit_editor::geometry::coord;
use geoedit_editor::ops::{buffer_exterior, buffer_full, buffer_interior, intersection, subtract, union};
use geoedit_editor::primitives::rectangle;
use geoedit_editor::{Geometry, GeometryValue};
use geoedit_settings::JoinStyle;

fn square(x: f64, y: f64, side: f64) -> GeometryValue {
    GeometryValue::new(Geometry::Polygon(rectangle(
        coord(x, y),
        coord(x + side, y + side),
    )))
}

#[test]
fn test_interior_buffer_of_square() {
    let result = buffer_interior(&[square(0.0, 0.0, 2.0)], 0.5, JoinStyle::Round, 64).unwrap();
    assert_eq!(result.len(), 1);
    let rect = result[0].bounding_rect().unwrap();
    assert!((rect.width() - 1.0).abs() < 1e-6);
    assert!((rect.height() - 1.0).abs() < 1e-6);
    assert!((rect.center().x - 1.0).abs() < 1e-6);
    assert!((rect.center().y - 1.0).abs() < 1e-6);
}

#[test]
fn test_exterior_buffer_grows_outline() {
    let result = buffer_exterior(&[square(0.0, 0.0, 2.0)], 0.5, JoinStyle::Mitre, 64).unwrap();
    let rect = result[0].bounding_rect().unwrap();
    assert!((rect.width() - 3.0).abs() < 1e-6);
}

#[test]
fn test_full_buffer_rejects_negative_distance() {
    assert!(matches!(
        buffer_full(&[square(0.0, 0.0, 1.0)], -1.0, JoinStyle::Round, 64),
        Err(EditorError::InvalidParameter { .. })
    ));
}

#[test]
fn test_union_merges_overlap() {
    let merged = union(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]).unwrap();
    assert!(matches!(merged, Geometry::Polygon(_)));
    assert!((merged.area() - 7.0).abs() < 1e-9);
}

#[test]
fn test_intersection_of_disjoint_shapes_is_empty() {
    assert!(matches!(
        intersection(&[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]),
        Err(EditorError::EmptyResult { .. })
    ));
}

#[test]
fn test_intersection_needs_two_shapes() {
    assert!(matches!(
        intersection(&[square(0.0, 0.0, 1.0)]),
        Err(EditorError::InsufficientSelection { .. })
    ));
}

#[test]
fn test_subtract_punches_hole() {
    let result = subtract(&square(0.0, 0.0, 4.0), &[square(1.0, 1.0, 1.0)]).unwrap();
    assert!((result.area() - 15.0).abs() < 1e-9);
}

#[test]
fn test_subtract_of_line_target_is_unsupported() {
    let line = GeometryValue::new(Geometry::LineString(geo::LineString::from(vec![
        (0.0, 0.0),
        (1.0, 1.0),
    ])));
    assert!(matches!(
        subtract(&line, &[square(0.0, 0.0, 1.0)]),
        Err(EditorError::UnsupportedShapeKind { .. })
    ));
}
