//! Polygon offsetting.
//!
//! Closed rings are offset with cavalier_contours after normalizing them to
//! clockwise orientation; the arcs it emits at outward corners are then
//! resolved according to the requested [`JoinStyle`]. Open lines and points
//! are buffered by unioning per-segment rectangles and joint fills.

use super::union_all;
use crate::geometry::{coord, distance, Geometry, GeometryValue};
use crate::primitives::{angle_from, circle_polygon};
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use geo::{BooleanOps, ConvexHull, Coord, LineString, Polygon};
use geoedit_core::{EditorError, EditorResult};
use geoedit_settings::JoinStyle;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::panic;

/// Amount shaved off interior/exterior offsets so the result does not
/// touch the source boundary.
pub const BOUNDARY_EPSILON: f64 = 1e-10;

/// Largest mitre length, relative to the offset distance, before a mitre
/// join is cut back to a bevel.
const MITRE_LIMIT: f64 = 5.0;

const DUPLICATE_TOLERANCE: f64 = 1e-9;

/// Full buffer of all `shapes` at `distance >= 0`, merged into one
/// geometry. A distance of zero returns the normalized union of the input.
pub fn buffer_full(
    shapes: &[GeometryValue],
    distance: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> EditorResult<Geometry> {
    if !(distance >= 0.0 && distance.is_finite()) {
        return Err(EditorError::invalid_parameter(
            "distance",
            "must be >= 0; use the interior buffer to offset inward",
        ));
    }
    if distance == 0.0 {
        return super::union(shapes).map_err(|_| EditorError::empty_result("buffer"));
    }

    let polygons = shapes
        .iter()
        .flat_map(|s| buffer_geometry(&s.geometry, distance, join, steps_per_circle));
    let merged = union_all(polygons);
    Geometry::from_polygons(merged.0).ok_or_else(|| EditorError::empty_result("buffer"))
}

/// Inward offset of the areal content by `distance`. Each resulting part's
/// exterior ring becomes a separate shape.
pub fn buffer_interior(
    shapes: &[GeometryValue],
    distance: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> EditorResult<Vec<Geometry>> {
    check_distance(distance)?;
    let parts = offset_areal(shapes, -(distance - BOUNDARY_EPSILON), join, steps_per_circle);
    let rings: Vec<Geometry> = parts
        .iter()
        .map(|p| Geometry::LinearRing(p.exterior().clone()))
        .collect();
    if rings.is_empty() {
        return Err(EditorError::empty_result("interior buffer"));
    }
    Ok(rings)
}

/// Outward offset of the areal content by `distance`. Every ring of every
/// resulting part, holes included, becomes a separate shape.
pub fn buffer_exterior(
    shapes: &[GeometryValue],
    distance: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> EditorResult<Vec<Geometry>> {
    check_distance(distance)?;
    let parts = offset_areal(shapes, distance - BOUNDARY_EPSILON, join, steps_per_circle);
    let rings: Vec<Geometry> = parts
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .map(|r| Geometry::LinearRing(r.clone()))
        .collect();
    if rings.is_empty() {
        return Err(EditorError::empty_result("exterior buffer"));
    }
    Ok(rings)
}

fn check_distance(distance: f64) -> EditorResult<()> {
    if distance >= 0.0 && distance.is_finite() {
        Ok(())
    } else {
        Err(EditorError::invalid_parameter("distance", "must be >= 0"))
    }
}

fn offset_areal(
    shapes: &[GeometryValue],
    signed_distance: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> Vec<Polygon> {
    let polygons = shapes.iter().flat_map(|s| s.geometry.polygons()).flat_map(|p| {
        offset_polygon(&p, signed_distance, join, steps_per_circle)
    });
    union_all(polygons).0
}

/// Buffers any geometry by a non-negative distance.
pub(crate) fn buffer_geometry(
    geometry: &Geometry,
    distance: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> Vec<Polygon> {
    match geometry {
        Geometry::Point(c) => vec![circle_polygon(*c, distance, steps_per_circle)],
        Geometry::LineString(ls) => buffer_line(ls, false, distance, join, steps_per_circle),
        Geometry::LinearRing(ls) => buffer_line(ls, true, distance, join, steps_per_circle),
        Geometry::Polygon(p) => offset_polygon(p, distance, join, steps_per_circle),
        Geometry::MultiLineString(mls) => mls
            .0
            .iter()
            .flat_map(|ls| buffer_line(ls, false, distance, join, steps_per_circle))
            .collect(),
        Geometry::MultiPolygon(mp) => mp
            .0
            .iter()
            .flat_map(|p| offset_polygon(p, distance, join, steps_per_circle))
            .collect(),
        Geometry::Collection(items) => items
            .iter()
            .flat_map(|g| buffer_geometry(g, distance, join, steps_per_circle))
            .collect(),
    }
}

/// Offsets a polygon with holes. Positive distances grow the polygon (and
/// shrink its holes), negative distances shrink it.
pub(crate) fn offset_polygon(
    polygon: &Polygon,
    signed_distance: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> Vec<Polygon> {
    if signed_distance == 0.0 {
        return vec![polygon.clone()];
    }

    let shells = union_all(offset_ring(
        polygon.exterior(),
        signed_distance,
        join,
        steps_per_circle,
    ));
    let holes = union_all(
        polygon
            .interiors()
            .iter()
            .flat_map(|r| offset_ring(r, -signed_distance, join, steps_per_circle)),
    );

    if holes.0.is_empty() {
        shells.0
    } else {
        shells.difference(&holes).0
    }
}

/// Offsets the region enclosed by `ring`; positive grows.
fn offset_ring(
    ring: &LineString,
    grow: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> Vec<Polygon> {
    let Some(pline) = prepare_ring(ring) else {
        return Vec::new();
    };

    // Left of a clockwise ring is outside, so a positive offset grows it.
    let offsets = match panic::catch_unwind(panic::AssertUnwindSafe(|| pline.parallel_offset(grow)))
    {
        Ok(offsets) => offsets,
        Err(_) => {
            tracing::warn!("Offset of a {}-vertex ring failed", pline.vertex_count());
            return Vec::new();
        }
    };

    offsets
        .iter()
        .filter(|p| p.vertex_count() >= 2)
        .map(|p| flatten_closed(p, join, steps_per_circle))
        .filter(|coords| coords.len() >= 4)
        .map(|coords| Polygon::new(LineString::new(coords), vec![]))
        .collect()
}

/// Removes duplicate and closing vertices and enforces CW orientation.
fn prepare_ring(ring: &LineString) -> Option<Polyline> {
    let mut clean: Vec<Coord> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        if clean
            .last()
            .map_or(true, |last| distance(*last, *c) > DUPLICATE_TOLERANCE)
        {
            clean.push(*c);
        }
    }
    while clean.len() > 1
        && distance(clean[0], clean[clean.len() - 1]) <= DUPLICATE_TOLERANCE
    {
        clean.pop();
    }
    if clean.len() < 3 {
        return None;
    }

    let mut polyline = Polyline::new();
    for c in clean {
        polyline.add_vertex(PlineVertex::new(c.x, c.y, 0.0));
    }
    polyline.set_is_closed(true);
    if polyline.area() > 0.0 {
        polyline.invert_direction_mut();
    }
    Some(polyline)
}

/// Converts a closed polyline with bulges into a closed coordinate ring.
fn flatten_closed(pline: &Polyline, join: JoinStyle, steps_per_circle: u32) -> Vec<Coord> {
    let vertices = &pline.vertex_data;
    let mut out = Vec::with_capacity(vertices.len() + 1);
    for (i, v) in vertices.iter().enumerate() {
        let next = &vertices[(i + 1) % vertices.len()];
        let p0 = coord(v.x, v.y);
        out.push(p0);
        if v.bulge.abs() > 1e-12 {
            out.extend(resolve_arc(
                p0,
                coord(next.x, next.y),
                v.bulge,
                join,
                steps_per_circle,
            ));
        }
    }
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

/// Points strictly between `p0` and `p1` that replace the bulge arc.
fn resolve_arc(
    p0: Coord,
    p1: Coord,
    bulge: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> Vec<Coord> {
    let chord = distance(p0, p1);
    if chord < DUPLICATE_TOLERANCE {
        return Vec::new();
    }
    let sweep = 4.0 * bulge.atan();
    let side = bulge.signum();
    let dir = coord((p1.x - p0.x) / chord, (p1.y - p0.y) / chord);
    let left = coord(-dir.y, dir.x);
    let mid = coord((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);

    match join {
        JoinStyle::Bevel => Vec::new(),
        JoinStyle::Mitre => {
            let half = sweep.abs() / 2.0;
            if half >= FRAC_PI_2 - 1e-9 || 1.0 / half.cos() > MITRE_LIMIT {
                return Vec::new();
            }
            let reach = chord / 2.0 * half.tan();
            vec![coord(mid.x - left.x * side * reach, mid.y - left.y * side * reach)]
        }
        JoinStyle::Round => {
            let b = bulge.abs();
            let radius = chord * (1.0 + b * b) / (4.0 * b);
            let sagitta = b * chord / 2.0;
            let center = coord(
                mid.x + left.x * side * (radius - sagitta),
                mid.y + left.y * side * (radius - sagitta),
            );
            let start = angle_from(center, p0);
            let segments = ((sweep.abs() / TAU * steps_per_circle as f64).ceil() as usize).max(1);
            (1..segments)
                .map(|k| {
                    let a = start + sweep * k as f64 / segments as f64;
                    coord(center.x + radius * a.cos(), center.y + radius * a.sin())
                })
                .collect()
        }
    }
}

/// Fills the outer corner between two segment offsets up to the point
/// where the offset edges meet. `n0` and `n1` are the left normals of the
/// incoming and outgoing segments, scaled to `width`. Returns `None` for a
/// straight joint or when the mitre exceeds [`MITRE_LIMIT`], leaving the
/// bevel.
fn mitre_corner(p: Coord, n0: Coord, n1: Coord, width: f64) -> Option<Polygon> {
    // left turn when the outgoing normal is rotated counter-clockwise
    let turn = n0.x * n1.y - n0.y * n1.x;
    if turn.abs() < 1e-12 * width * width {
        return None;
    }
    let sum = coord(n0.x + n1.x, n0.y + n1.y);
    let sum_sq = sum.x * sum.x + sum.y * sum.y;
    // |n0 + n1| = 2 w cos(half angle)
    if sum_sq <= 0.0 || 2.0 * width / sum_sq.sqrt() > MITRE_LIMIT {
        return None;
    }
    let side = if turn > 0.0 { -1.0 } else { 1.0 };
    let k = side * 2.0 * width * width / sum_sq;
    Some(Polygon::new(
        LineString::new(vec![
            p,
            coord(p.x + side * n0.x, p.y + side * n0.y),
            coord(p.x + k * sum.x, p.y + k * sum.y),
            coord(p.x + side * n1.x, p.y + side * n1.y),
        ]),
        vec![],
    ))
}

/// Buffers an open (or closed) line by unioning segment rectangles and
/// joint fills.
fn buffer_line(
    line: &LineString,
    closed: bool,
    width: f64,
    join: JoinStyle,
    steps_per_circle: u32,
) -> Vec<Polygon> {
    if width <= 0.0 {
        return Vec::new();
    }

    let mut pts: Vec<Coord> = Vec::with_capacity(line.0.len());
    for c in &line.0 {
        if pts
            .last()
            .map_or(true, |last| distance(*last, *c) > DUPLICATE_TOLERANCE)
        {
            pts.push(*c);
        }
    }
    match pts.len() {
        0 => return Vec::new(),
        1 => return vec![circle_polygon(pts[0], width, steps_per_circle)],
        _ => {}
    }

    let mut parts: Vec<Polygon> = Vec::new();
    let mut normals = Vec::with_capacity(pts.len() - 1);
    for w in pts.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = distance(a, b);
        let n = coord(-(b.y - a.y) / len * width, (b.x - a.x) / len * width);
        normals.push(n);
        parts.push(Polygon::new(
            LineString::new(vec![
                coord(a.x + n.x, a.y + n.y),
                coord(b.x + n.x, b.y + n.y),
                coord(b.x - n.x, b.y - n.y),
                coord(a.x - n.x, a.y - n.y),
            ]),
            vec![],
        ));
    }

    match join {
        JoinStyle::Round => {
            parts.extend(
                pts.iter()
                    .map(|p| circle_polygon(*p, width, steps_per_circle)),
            );
        }
        JoinStyle::Mitre | JoinStyle::Bevel => {
            let mut joint = |p: Coord, n0: Coord, n1: Coord| {
                let hull = LineString::new(vec![
                    p,
                    coord(p.x + n0.x, p.y + n0.y),
                    coord(p.x - n0.x, p.y - n0.y),
                    coord(p.x + n1.x, p.y + n1.y),
                    coord(p.x - n1.x, p.y - n1.y),
                ])
                .convex_hull();
                parts.push(hull);
                if join == JoinStyle::Mitre {
                    parts.extend(mitre_corner(p, n0, n1, width));
                }
            };
            for i in 1..normals.len() {
                joint(pts[i], normals[i - 1], normals[i]);
            }
            if closed && normals.len() > 1 {
                joint(pts[0], normals[normals.len() - 1], normals[0]);
            }
        }
    }

    union_all(parts).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::rectangle;

    fn square(side: f64) -> GeometryValue {
        GeometryValue::new(Geometry::Polygon(rectangle(
            coord(0.0, 0.0),
            coord(side, side),
        )))
    }

    #[test]
    fn test_negative_distance_is_rejected() {
        let err = buffer_full(&[square(1.0)], -1.0, JoinStyle::Round, 64).unwrap_err();
        assert!(matches!(err, EditorError::InvalidParameter { ref param, .. } if param == "distance"));
        assert!(buffer_interior(&[square(1.0)], -1.0, JoinStyle::Round, 64).is_err());
        assert!(buffer_exterior(&[square(1.0)], -1.0, JoinStyle::Round, 64).is_err());
    }

    #[test]
    fn test_interior_of_square() {
        let rings = buffer_interior(&[square(2.0)], 0.5, JoinStyle::Round, 64).unwrap();
        assert_eq!(rings.len(), 1);
        let rect = rings[0].bounding_rect().unwrap();
        assert!((rect.min().x - 0.5).abs() < 1e-6);
        assert!((rect.min().y - 0.5).abs() < 1e-6);
        assert!((rect.max().x - 1.5).abs() < 1e-6);
        assert!((rect.max().y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_full_buffer_join_styles() {
        let round = buffer_full(&[square(2.0)], 1.0, JoinStyle::Round, 64).unwrap();
        let mitre = buffer_full(&[square(2.0)], 1.0, JoinStyle::Mitre, 64).unwrap();
        let bevel = buffer_full(&[square(2.0)], 1.0, JoinStyle::Bevel, 64).unwrap();

        // square grown by 1 with sharp corners is 4x4
        assert!((mitre.area() - 16.0).abs() < 1e-6);
        // round corners: 4 + 4*2 + PI (approximately)
        assert!((round.area() - (12.0 + std::f64::consts::PI)).abs() < 0.05);
        // bevel corners: 4 + 8 + 4 * 0.5
        assert!((bevel.area() - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_hole_shrinks_when_growing() {
        let ring = rectangle(coord(0.0, 0.0), coord(10.0, 10.0));
        let hole = rectangle(coord(4.0, 4.0), coord(6.0, 6.0));
        let donut = GeometryValue::new(Geometry::Polygon(Polygon::new(
            ring.exterior().clone(),
            vec![hole.exterior().clone()],
        )));
        let grown = buffer_full(&[donut], 0.5, JoinStyle::Mitre, 64).unwrap();
        // 11x11 outside minus 1x1 hole
        assert!((grown.area() - 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_hole_vanishes() {
        let ring = rectangle(coord(0.0, 0.0), coord(10.0, 10.0));
        let hole = rectangle(coord(4.0, 4.0), coord(6.0, 6.0));
        let donut = GeometryValue::new(Geometry::Polygon(Polygon::new(
            ring.exterior().clone(),
            vec![hole.exterior().clone()],
        )));
        let grown = buffer_full(&[donut], 2.0, JoinStyle::Mitre, 64).unwrap();
        match grown {
            Geometry::Polygon(p) => assert!(p.interiors().is_empty()),
            other => panic!("expected polygon, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_point_and_line_buffers() {
        let point = GeometryValue::new(Geometry::Point(coord(0.0, 0.0)));
        let disk = buffer_full(&[point], 1.0, JoinStyle::Round, 256).unwrap();
        assert!((disk.area() - std::f64::consts::PI).abs() < 0.01);

        let line = GeometryValue::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (4.0, 0.0),
        ])));
        let flat = buffer_full(&[line.clone()], 0.5, JoinStyle::Bevel, 64).unwrap();
        assert!((flat.area() - 4.0).abs() < 1e-6);
        let capsule = buffer_full(&[line], 0.5, JoinStyle::Round, 256).unwrap();
        assert!((capsule.area() - (4.0 + std::f64::consts::PI * 0.25)).abs() < 0.01);
    }

    #[test]
    fn test_line_mitre_corner() {
        let corner = GeometryValue::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
        ])));
        let mitre = buffer_full(&[corner.clone()], 1.0, JoinStyle::Mitre, 64).unwrap();
        let bevel = buffer_full(&[corner], 1.0, JoinStyle::Bevel, 64).unwrap();
        assert!((mitre.area() - 16.0).abs() < 1e-6);
        assert!((bevel.area() - 15.5).abs() < 1e-6);
        let rect = mitre.bounding_rect().unwrap();
        assert!((rect.max().x - 5.0).abs() < 1e-9);
        assert!((rect.min().y + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sharp_line_corner_falls_back_to_bevel() {
        let spike = GeometryValue::new(Geometry::LineString(LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 0.2),
        ])));
        let mitre = buffer_full(&[spike.clone()], 1.0, JoinStyle::Mitre, 64).unwrap();
        let bevel = buffer_full(&[spike], 1.0, JoinStyle::Bevel, 64).unwrap();
        assert!((mitre.area() - bevel.area()).abs() < 1e-9);
    }

    #[test]
    fn test_exterior_emits_all_rings() {
        let ring = rectangle(coord(0.0, 0.0), coord(10.0, 10.0));
        let hole = rectangle(coord(3.0, 3.0), coord(7.0, 7.0));
        let donut = GeometryValue::new(Geometry::Polygon(Polygon::new(
            ring.exterior().clone(),
            vec![hole.exterior().clone()],
        )));
        let rings = buffer_exterior(&[donut], 0.5, JoinStyle::Mitre, 64).unwrap();
        assert_eq!(rings.len(), 2);
        assert!(rings
            .iter()
            .all(|r| r.kind() == crate::geometry::ShapeKind::LinearRing));
    }

    #[test]
    fn test_interior_multi_part_emits_each_exterior() {
        // dumbbell: two squares joined by a thin bridge that vanishes
        let a = rectangle(coord(0.0, 0.0), coord(4.0, 4.0));
        let b = rectangle(coord(6.0, 0.0), coord(10.0, 4.0));
        let bridge = rectangle(coord(3.0, 1.8), coord(7.0, 2.2));
        let shape = GeometryValue::new(
            crate::ops::union(&[
                GeometryValue::new(Geometry::Polygon(a)),
                GeometryValue::new(Geometry::Polygon(b)),
                GeometryValue::new(Geometry::Polygon(bridge)),
            ])
            .unwrap(),
        );
        let rings = buffer_interior(&[shape], 0.5, JoinStyle::Round, 64).unwrap();
        assert_eq!(rings.len(), 2);
    }

    #[test]
    fn test_zero_distance_is_idempotent() {
        let once = buffer_full(&[square(3.0)], 0.0, JoinStyle::Round, 64).unwrap();
        let twice =
            buffer_full(&[GeometryValue::new(once.clone())], 0.0, JoinStyle::Round, 64).unwrap();
        assert!((once.area() - twice.area()).abs() < 1e-12);
        assert_eq!(once.bounding_rect(), twice.bounding_rect());
        assert!((once.area() - 9.0).abs() < 1e-12);
    }
}
