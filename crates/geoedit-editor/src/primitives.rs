//! Shape construction helpers shared by the drawing tools.

use crate::geometry::{coord, distance, Geometry};
use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// Sweep direction of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArcDirection {
    #[default]
    Cw,
    Ccw,
}

impl ArcDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
        }
    }

    fn sign(self) -> f64 {
        match self {
            Self::Cw => -1.0,
            Self::Ccw => 1.0,
        }
    }
}

impl fmt::Display for ArcDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cw => write!(f, "cw"),
            Self::Ccw => write!(f, "ccw"),
        }
    }
}

/// Points along a circle of `radius` around `center`, starting at angle 0.
/// The returned ring is closed.
pub fn circle_points(center: Coord, radius: f64, steps_per_circle: u32) -> Vec<Coord> {
    let steps = steps_per_circle.max(4);
    let mut points: Vec<Coord> = (0..steps)
        .map(|i| {
            let a = TAU * i as f64 / steps as f64;
            coord(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect();
    if let Some(first) = points.first().copied() {
        points.push(first);
    }
    points
}

/// Circle approximated by a polygon with `steps_per_circle` segments
/// (`steps_per_circle / 4` per quadrant).
pub fn circle_polygon(center: Coord, radius: f64, steps_per_circle: u32) -> Polygon {
    Polygon::new(LineString::new(circle_points(center, radius, steps_per_circle)), vec![])
}

/// Points of an arc from `start` to `stop` (radians) in `direction`.
///
/// `stop` is moved by a full turn when needed so the sweep follows the
/// requested direction. Both end points are included.
pub fn arc_points(
    center: Coord,
    radius: f64,
    start: f64,
    stop: f64,
    direction: ArcDirection,
    steps_per_circle: u32,
) -> Vec<Coord> {
    let mut stop = stop;
    match direction {
        ArcDirection::Ccw if stop <= start => stop += TAU,
        ArcDirection::Cw if stop >= start => stop -= TAU,
        _ => {}
    }

    let sweep = (stop - start).abs();
    let steps = ((sweep / TAU * steps_per_circle as f64).ceil() as usize).max(2);
    let delta = direction.sign() * sweep / steps as f64;

    (0..=steps)
        .map(|i| {
            let a = start + delta * i as f64;
            coord(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

/// Angle of `p` as seen from `center`.
pub fn angle_from(center: Coord, p: Coord) -> f64 {
    (p.y - center.y).atan2(p.x - center.x)
}

/// Axis-aligned rectangle through two opposite corners.
pub fn rectangle(a: Coord, b: Coord) -> Polygon {
    let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
    let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
    Polygon::new(
        LineString::new(vec![
            coord(min_x, min_y),
            coord(max_x, min_y),
            coord(max_x, max_y),
            coord(min_x, max_y),
        ]),
        vec![],
    )
}

/// Circle through three points as `(center, radius)`, or `None` when the
/// points are collinear.
pub fn circle_through(p1: Coord, p2: Coord, p3: Coord) -> Option<(Coord, f64)> {
    let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let s1 = p1.x * p1.x + p1.y * p1.y;
    let s2 = p2.x * p2.x + p2.y * p2.y;
    let s3 = p3.x * p3.x + p3.y * p3.y;
    let center = coord(
        (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d,
        (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d,
    );
    Some((center, distance(center, p1)))
}

/// Orientation of the turn `a -> b -> c`: positive for counter-clockwise.
pub fn orientation(a: Coord, b: Coord, c: Coord) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// A "+" made of two segments spanning `diameter`, centered on `center`.
pub fn drill_cross(center: Coord, diameter: f64) -> Geometry {
    let r = diameter / 2.0;
    Geometry::MultiLineString(geo::MultiLineString::new(vec![
        LineString::new(vec![coord(center.x - r, center.y), coord(center.x + r, center.y)]),
        LineString::new(vec![coord(center.x, center.y - r), coord(center.x, center.y + r)]),
    ]))
}

/// Normalizes an angle into `(-PI, PI]`.
pub fn normalize_angle(a: f64) -> f64 {
    let mut a = a % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_polygon_segment_count() {
        let circle = circle_polygon(coord(0.0, 0.0), 1.0, 64);
        // closed ring: 64 segments, 65 coordinates
        assert_eq!(circle.exterior().0.len(), 65);
        for c in circle.exterior().coords() {
            assert!((distance(*c, coord(0.0, 0.0)) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_arc_points_quarter_ccw() {
        let pts = arc_points(coord(0.0, 0.0), 1.0, 0.0, PI / 2.0, ArcDirection::Ccw, 64);
        assert_eq!(pts.len(), 17);
        let last = pts[pts.len() - 1];
        assert!(last.x.abs() < 1e-12 && (last.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_arc_points_cw_goes_the_long_way() {
        // CW from 0 to +90 degrees sweeps 270 degrees
        let pts = arc_points(coord(0.0, 0.0), 1.0, 0.0, PI / 2.0, ArcDirection::Cw, 64);
        assert_eq!(pts.len(), 49);
        assert!(pts[1].y < 0.0);
    }

    #[test]
    fn test_rectangle_normalizes_corners() {
        let rect = rectangle(coord(2.0, 3.0), coord(0.0, 1.0));
        assert_eq!(rect.exterior().0[0], coord(0.0, 1.0));
        assert_eq!(rect.exterior().0[2], coord(2.0, 3.0));
    }

    #[test]
    fn test_circle_through_points() {
        let (center, radius) =
            circle_through(coord(1.0, 0.0), coord(0.0, 1.0), coord(-1.0, 0.0)).unwrap();
        assert!(center.x.abs() < 1e-12 && center.y.abs() < 1e-12);
        assert!((radius - 1.0).abs() < 1e-12);
        assert!(circle_through(coord(0.0, 0.0), coord(1.0, 1.0), coord(2.0, 2.0)).is_none());
    }

    #[test]
    fn test_drill_cross_spans_diameter() {
        let cross = drill_cross(coord(1.0, 1.0), 0.8);
        let rect = cross.bounding_rect().unwrap();
        assert!((rect.width() - 0.8).abs() < 1e-12);
        assert!((rect.height() - 0.8).abs() < 1e-12);
    }
}
