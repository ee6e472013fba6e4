//! # Transform engine
//!
//! Pure affine operations over [`GeometryValue`]. Each returns a new value;
//! collections are rebuilt element by element and keep their nesting.
//!
//! Angles are in degrees. [`rotate`] is counter-clockwise positive.
//!
//! When a transform would produce non-finite coordinates (a NaN or infinite
//! parameter) the input is returned unchanged and a warning is logged; a
//! value is never partially transformed.

use crate::geometry::GeometryValue;
use geo::{AffineTransform, Coord};
use serde::{Deserialize, Serialize};

/// Axis to mirror across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorAxis {
    /// Flip across the horizontal line through the reference point.
    X,
    /// Flip across the vertical line through the reference point.
    Y,
}

fn apply(value: &GeometryValue, transform: &AffineTransform, operation: &str) -> GeometryValue {
    let geometry = value.geometry.map_coords(|c| transform.apply(c));
    if geometry.coords().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        tracing::warn!("{} produced non-finite coordinates; shape left unchanged", operation);
        return value.clone();
    }
    value.with_geometry(geometry)
}

/// Rotates by `angle_degrees` about `origin`, counter-clockwise positive.
pub fn rotate(value: &GeometryValue, angle_degrees: f64, origin: Coord) -> GeometryValue {
    apply(value, &AffineTransform::rotate(angle_degrees, origin), "rotate")
}

/// Skews by the given angles about `origin`.
pub fn skew(value: &GeometryValue, angle_x: f64, angle_y: f64, origin: Coord) -> GeometryValue {
    apply(value, &AffineTransform::skew(angle_x, angle_y, origin), "skew")
}

/// Scales about `origin`. `y_factor` defaults to `x_factor`.
pub fn scale(
    value: &GeometryValue,
    x_factor: f64,
    y_factor: Option<f64>,
    origin: Coord,
) -> GeometryValue {
    let y_factor = y_factor.unwrap_or(x_factor);
    apply(value, &AffineTransform::scale(x_factor, y_factor, origin), "scale")
}

/// Translates by `(dx, dy)`.
pub fn offset(value: &GeometryValue, dx: f64, dy: f64) -> GeometryValue {
    apply(value, &AffineTransform::translate(dx, dy), "offset")
}

/// Mirrors about the line through `point` selected by `axis`.
pub fn mirror(value: &GeometryValue, axis: MirrorAxis, point: Coord) -> GeometryValue {
    let (sx, sy) = match axis {
        MirrorAxis::X => (1.0, -1.0),
        MirrorAxis::Y => (-1.0, 1.0),
    };
    apply(value, &AffineTransform::scale(sx, sy, point), "mirror")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{coord, Geometry};
    use geo::LineString;

    fn segment() -> GeometryValue {
        GeometryValue::new(Geometry::LineString(LineString::from(vec![
            (1.0, 0.0),
            (2.0, 0.0),
        ])))
    }

    fn assert_close(a: Coord, b: Coord) {
        assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_rotate_is_counter_clockwise() {
        let rotated = rotate(&segment(), 90.0, coord(0.0, 0.0));
        let coords: Vec<_> = rotated.coords().collect();
        assert_close(coords[0], coord(0.0, 1.0));
        assert_close(coords[1], coord(0.0, 2.0));
    }

    #[test]
    fn test_scale_defaults_y_to_x() {
        let scaled = scale(&segment(), 2.0, None, coord(0.0, 0.0));
        let coords: Vec<_> = scaled.coords().collect();
        assert_close(coords[1], coord(4.0, 0.0));
    }

    #[test]
    fn test_mirror_about_point() {
        let value = GeometryValue::new(Geometry::Point(coord(1.0, 3.0)));
        let mirrored = mirror(&value, MirrorAxis::X, coord(0.0, 1.0));
        assert_close(mirrored.coords().next().unwrap(), coord(1.0, -1.0));
        let mirrored = mirror(&value, MirrorAxis::Y, coord(2.0, 0.0));
        assert_close(mirrored.coords().next().unwrap(), coord(3.0, 3.0));
    }

    #[test]
    fn test_collection_structure_is_preserved() {
        let value = GeometryValue::new(Geometry::Collection(vec![
            Geometry::Point(coord(0.0, 0.0)),
            Geometry::Collection(vec![Geometry::Point(coord(1.0, 1.0))]),
        ]));
        let moved = offset(&value, 1.0, 2.0);
        match &moved.geometry {
            Geometry::Collection(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(&items[1], Geometry::Collection(inner) if inner.len() == 1));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_close(moved.coords().nth(1).unwrap(), coord(2.0, 3.0));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let original = segment();
        let _ = offset(&original, 5.0, 5.0);
        assert_eq!(original, segment());
    }

    #[test]
    fn test_non_finite_result_leaves_value_unchanged() {
        let original = segment();
        let broken = offset(&original, f64::NAN, 0.0);
        assert_eq!(broken, original);
    }

    #[test]
    fn test_skew_x_shears_along_x() {
        let value = GeometryValue::new(Geometry::Point(coord(0.0, 1.0)));
        let skewed = skew(&value, 45.0, 0.0, coord(0.0, 0.0));
        assert_close(skewed.coords().next().unwrap(), coord(1.0, 1.0));
    }

    #[test]
    fn test_utility_flag_survives() {
        let value = GeometryValue::utility(Geometry::Point(coord(0.0, 0.0)));
        assert!(offset(&value, 1.0, 1.0).is_utility);
    }
}
