//! Pointer snapping against the grid and existing shape vertices.

use crate::geometry::{coord, distance};
use crate::shape_store::SpatialShapeStore;
use geo::Coord;
use geoedit_settings::SnapSettings;

/// Rounds `point` to the nearest grid intersection. Axes with a zero step
/// are left untouched.
pub fn snap_to_grid(point: Coord, settings: &SnapSettings) -> Coord {
    let round = |v: f64, step: f64| {
        if step > 0.0 {
            (v / step).round() * step
        } else {
            v
        }
    };
    coord(round(point.x, settings.grid_x), round(point.y, settings.grid_y))
}

/// Nearest vertex over all `stores` within `snap_max` of `point`.
pub fn snap_to_corner<'a>(
    point: Coord,
    settings: &SnapSettings,
    stores: impl IntoIterator<Item = &'a SpatialShapeStore>,
) -> Option<Coord> {
    stores
        .into_iter()
        .filter_map(|store| store.nearest(point).ok())
        .map(|(vertex, _)| vertex)
        .filter(|vertex| distance(*vertex, point) <= settings.snap_max)
        .min_by(|a, b| distance(*a, point).total_cmp(&distance(*b, point)))
}

/// Applies grid snap then corner snap. With both enabled, whichever of the
/// grid point and the vertex within `snap_max` lies nearer the raw pointer
/// is used.
pub fn snap<'a>(
    point: Coord,
    settings: &SnapSettings,
    stores: impl IntoIterator<Item = &'a SpatialShapeStore>,
) -> Coord {
    let mut snapped = point;
    if settings.grid_snap {
        snapped = snap_to_grid(point, settings);
    }
    if settings.corner_snap {
        if let Some(vertex) = snap_to_corner(point, settings, stores) {
            if !settings.grid_snap || distance(vertex, point) <= distance(snapped, point) {
                tracing::trace!("Corner snap to ({}, {})", vertex.x, vertex.y);
                snapped = vertex;
            }
        }
    }
    snapped
}
