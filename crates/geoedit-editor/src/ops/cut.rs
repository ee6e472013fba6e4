//! Cutting linework along a path.

use super::buffer::buffer_geometry;
use super::union_all;
use crate::geometry::{Geometry, GeometryValue};
use geo::{BooleanOps, Intersects, LineString, MultiLineString, MultiPolygon};
use geoedit_core::{EditorError, EditorResult};
use geoedit_settings::JoinStyle;

/// Width given to linear cutting tools so they have area to cut with.
const PATH_CUT_WIDTH: f64 = 1e-6;

/// Cuts `target` wherever it crosses any of `tools`.
///
/// The tools are merged into one mask. Polygons are cut along each of their
/// boundary rings, line strings and rings directly, and multi line strings
/// component by component with untouched components kept as they are.
/// Returns the shapes that replace `target`.
pub fn cut_along_path(target: &GeometryValue, tools: &[GeometryValue]) -> EditorResult<Vec<Geometry>> {
    if tools.is_empty() {
        return Err(EditorError::insufficient_selection("cut", 2, 1));
    }

    let mask = cutting_mask(tools);
    if mask.0.is_empty() {
        return Err(EditorError::empty_result("cut mask"));
    }

    let lines: Vec<LineString> = match &target.geometry {
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) => target
            .geometry
            .boundary_lines()
            .into_iter()
            .flat_map(|ring| clip_outside(&mask, ring))
            .collect(),
        Geometry::LineString(ls) | Geometry::LinearRing(ls) => clip_outside(&mask, ls.clone()),
        Geometry::MultiLineString(mls) => mls
            .0
            .iter()
            .flat_map(|component| {
                if crosses(&mask, component) {
                    clip_outside(&mask, component.clone())
                } else {
                    vec![component.clone()]
                }
            })
            .collect(),
        Geometry::Point(_) | Geometry::Collection(_) => {
            return Err(EditorError::unsupported("cut", target.kind().to_string()));
        }
    };

    let pieces: Vec<Geometry> = lines
        .into_iter()
        .filter(|l| l.0.len() >= 2)
        .map(Geometry::LineString)
        .collect();
    if pieces.is_empty() {
        return Err(EditorError::empty_result("cut"));
    }
    tracing::debug!("Cut {} into {} pieces", target.kind(), pieces.len());
    Ok(pieces)
}

fn cutting_mask(tools: &[GeometryValue]) -> MultiPolygon {
    let areal = tools.iter().flat_map(|t| t.geometry.polygons());
    let linear = tools.iter().flat_map(|t| {
        t.geometry
            .open_lines()
            .into_iter()
            .flat_map(|l| buffer_geometry(&Geometry::LineString(l), PATH_CUT_WIDTH, JoinStyle::Bevel, 8))
    });
    union_all(areal.chain(linear))
}

fn crosses(mask: &MultiPolygon, line: &LineString) -> bool {
    mask.0.iter().any(|p| p.intersects(line))
}

fn clip_outside(mask: &MultiPolygon, line: LineString) -> Vec<LineString> {
    mask.clip(&MultiLineString::new(vec![line]), true).0
}
