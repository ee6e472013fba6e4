//! # Boolean and offset operations
//!
//! Set operations run on the areal content of the inputs (polygons, multi
//! polygons and linear rings). Every operation computes its complete result
//! before returning; callers apply it to the store in one step.

pub mod buffer;
pub mod clearing;
pub mod cut;
pub mod paint;

use crate::geometry::{Geometry, GeometryValue};
use geo::{BooleanOps, MultiPolygon, Polygon};
use geoedit_core::{EditorError, EditorResult};

pub use buffer::{buffer_exterior, buffer_full, buffer_interior, BOUNDARY_EPSILON};
pub use clearing::{kernel_for, ClearingKernel, LinesClearing, SeedClearing, StandardClearing};
pub use cut::cut_along_path;
pub use paint::{paint, PaintParams};

/// Union of arbitrarily many polygons.
pub(crate) fn union_all(polygons: impl IntoIterator<Item = Polygon>) -> MultiPolygon {
    polygons
        .into_iter()
        .fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
            acc.union(&MultiPolygon::new(vec![polygon]))
        })
}

/// Union of all inputs.
///
/// Areal content is merged; open lines and points are carried along, so a
/// single areal shape comes back normalized and a mixed selection comes
/// back as a collection.
pub fn union(shapes: &[GeometryValue]) -> EditorResult<Geometry> {
    if shapes.is_empty() {
        return Err(EditorError::insufficient_selection("union", 1, 0));
    }

    let areal = union_all(shapes.iter().flat_map(|s| s.geometry.polygons()));
    let mut parts = Vec::new();
    parts.extend(Geometry::from_polygons(areal.0));
    parts.extend(Geometry::from_lines(
        shapes.iter().flat_map(|s| s.geometry.open_lines()).collect(),
    ));
    parts.extend(
        shapes
            .iter()
            .flat_map(|s| s.geometry.points())
            .map(Geometry::Point),
    );

    Geometry::from_parts(parts).ok_or_else(|| EditorError::empty_result("union"))
}

/// Area common to every input. Needs at least two shapes, each with areal
/// content.
pub fn intersection(shapes: &[GeometryValue]) -> EditorResult<Geometry> {
    if shapes.len() < 2 {
        return Err(EditorError::insufficient_selection(
            "intersection",
            2,
            shapes.len(),
        ));
    }

    let mut acc: Option<MultiPolygon> = None;
    for shape in shapes {
        let area = union_all(shape.geometry.polygons());
        if area.0.is_empty() {
            return Err(EditorError::unsupported(
                "intersection",
                shape.kind().to_string(),
            ));
        }
        acc = Some(match acc {
            None => area,
            Some(prev) => prev.intersection(&area),
        });
    }

    acc.and_then(|mp| Geometry::from_polygons(mp.0))
        .ok_or_else(|| EditorError::empty_result("intersection"))
}

/// Area of `target` not covered by any of `tools`.
pub fn subtract(target: &GeometryValue, tools: &[GeometryValue]) -> EditorResult<Geometry> {
    if tools.is_empty() {
        return Err(EditorError::insufficient_selection("subtract", 2, 1));
    }

    let area = union_all(target.geometry.polygons());
    if area.0.is_empty() {
        return Err(EditorError::unsupported("subtract", target.kind().to_string()));
    }
    let mask = union_all(tools.iter().flat_map(|t| t.geometry.polygons()));
    let result = area.difference(&mask);

    Geometry::from_polygons(result.0).ok_or_else(|| EditorError::empty_result("subtract"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::coord;
    use crate::primitives::rectangle;
    use geo::LineString;

    fn square(x: f64, y: f64, side: f64) -> GeometryValue {
        GeometryValue::new(Geometry::Polygon(rectangle(
            coord(x, y),
            coord(x + side, y + side),
        )))
    }

    #[test]
    fn test_union_of_single_shape_keeps_area() {
        let result = union(&[square(0.0, 0.0, 1.0)]).unwrap();
        assert!(matches!(result, Geometry::Polygon(_)));
        assert!((result.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_merges_overlaps() {
        let result = union(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]).unwrap();
        assert!(matches!(result, Geometry::Polygon(_)));
        assert!((result.area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_keeps_lines_apart() {
        let line = GeometryValue::new(Geometry::LineString(LineString::from(vec![
            (5.0, 5.0),
            (6.0, 6.0),
        ])));
        let result = union(&[square(0.0, 0.0, 1.0), line]).unwrap();
        match result {
            Geometry::Collection(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1].kind(), crate::geometry::ShapeKind::LineString);
            }
            other => panic!("expected collection, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_intersection_requires_two_shapes() {
        let err = intersection(&[square(0.0, 0.0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            EditorError::InsufficientSelection { required: 2, selected: 1, .. }
        ));
    }

    #[test]
    fn test_intersection_of_overlapping_squares() {
        let result = intersection(&[square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]).unwrap();
        assert!((result.area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_intersection_is_empty_result() {
        let err = intersection(&[square(0.0, 0.0, 1.0), square(5.0, 5.0, 1.0)]).unwrap_err();
        assert!(matches!(err, EditorError::EmptyResult { .. }));
    }

    #[test]
    fn test_subtract_cuts_a_hole() {
        let result = subtract(&square(0.0, 0.0, 4.0), &[square(1.0, 1.0, 2.0)]).unwrap();
        match &result {
            Geometry::Polygon(p) => assert_eq!(p.interiors().len(), 1),
            other => panic!("expected polygon, got {:?}", other.kind()),
        }
        assert!((result.area() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_subtract_needs_tools() {
        assert!(matches!(
            subtract(&square(0.0, 0.0, 1.0), &[]),
            Err(EditorError::InsufficientSelection { .. })
        ));
    }
}
