//! Pocket-clearing kernels.
//!
//! A kernel turns one polygon into the tool-center paths that cover its
//! interior. All three kernels share the [`ClearingKernel`] signature and
//! work inside the polygon shrunk by the tool radius, so no path gouges the
//! boundary.

use super::buffer::offset_polygon;
use super::union_all;
use crate::geometry::{coord, distance, Geometry};
use crate::primitives::circle_points;
use geo::{BooleanOps, Centroid, Contains, Coord, LineString, MultiLineString, MultiPolygon, Polygon};
use geoedit_settings::{JoinStyle, PaintMethod};

/// Fills a polygon with tool-center paths.
pub trait ClearingKernel: Send + Sync {
    /// Returns the clearing paths as a multi line string, or `None` when the
    /// tool does not fit inside `polygon`.
    fn clear_polygon(
        &self,
        polygon: &Polygon,
        tool_diameter: f64,
        steps_per_circle: u32,
        overlap: f64,
        contour: bool,
        connect: bool,
    ) -> Option<Geometry>;
}

/// Contour-parallel passes: repeated inward offsets of the boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardClearing;

/// Concentric rings grown outward from the polygon centroid.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedClearing;

/// Horizontal raster lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinesClearing;

/// Kernel implementing `method`.
pub fn kernel_for(method: PaintMethod) -> &'static dyn ClearingKernel {
    match method {
        PaintMethod::Standard => &StandardClearing,
        PaintMethod::Seed => &SeedClearing,
        PaintMethod::Lines => &LinesClearing,
    }
}

const MAX_PASSES: usize = 10_000;
const LINK_TOLERANCE: f64 = 1e-6;

fn step_over(tool_diameter: f64, overlap: f64) -> f64 {
    tool_diameter * (1.0 - overlap)
}

/// Region reachable by the tool center.
fn reachable(polygon: &Polygon, tool_diameter: f64, steps_per_circle: u32) -> MultiPolygon {
    union_all(offset_polygon(
        polygon,
        -tool_diameter / 2.0,
        JoinStyle::Round,
        steps_per_circle,
    ))
}

fn rings_of(region: &MultiPolygon) -> Vec<LineString> {
    region
        .0
        .iter()
        .flat_map(|p| std::iter::once(p.exterior().clone()).chain(p.interiors().iter().cloned()))
        .collect()
}

impl ClearingKernel for StandardClearing {
    fn clear_polygon(
        &self,
        polygon: &Polygon,
        tool_diameter: f64,
        steps_per_circle: u32,
        overlap: f64,
        contour: bool,
        connect: bool,
    ) -> Option<Geometry> {
        let region = reachable(polygon, tool_diameter, steps_per_circle);
        if region.0.is_empty() {
            return None;
        }

        let step = step_over(tool_diameter, overlap);
        let mut passes: Vec<Vec<LineString>> = Vec::new();
        let mut current = region.clone();
        for _ in 0..MAX_PASSES {
            if current.0.is_empty() {
                break;
            }
            passes.push(rings_of(&current));
            current = union_all(
                current
                    .0
                    .iter()
                    .flat_map(|p| offset_polygon(p, -step, JoinStyle::Round, steps_per_circle)),
            );
        }
        // The outermost pass follows the boundary and is the contour pass.
        // A pocket only one pass wide keeps it regardless.
        if !contour && passes.len() > 1 {
            passes.remove(0);
        }

        finish(passes.into_iter().flatten().collect(), &region, connect)
    }
}

impl ClearingKernel for SeedClearing {
    fn clear_polygon(
        &self,
        polygon: &Polygon,
        tool_diameter: f64,
        steps_per_circle: u32,
        overlap: f64,
        contour: bool,
        connect: bool,
    ) -> Option<Geometry> {
        let region = reachable(polygon, tool_diameter, steps_per_circle);
        let seed = region.centroid()?.0;
        let reach = region
            .0
            .iter()
            .flat_map(|p| p.exterior().0.iter())
            .map(|c| distance(seed, *c))
            .fold(0.0, f64::max);

        let step = step_over(tool_diameter, overlap);
        let mut paths = Vec::new();
        let mut radius = step;
        while radius <= reach + step && paths.len() < MAX_PASSES {
            let ring = LineString::new(circle_points(seed, radius, steps_per_circle));
            paths.extend(region.clip(&MultiLineString::new(vec![ring]), false).0);
            radius += step;
        }
        if contour {
            paths.extend(rings_of(&region));
        }

        finish(paths, &region, connect)
    }
}

impl ClearingKernel for LinesClearing {
    fn clear_polygon(
        &self,
        polygon: &Polygon,
        tool_diameter: f64,
        steps_per_circle: u32,
        overlap: f64,
        contour: bool,
        connect: bool,
    ) -> Option<Geometry> {
        let region = reachable(polygon, tool_diameter, steps_per_circle);
        let bounds = Geometry::MultiPolygon(region.clone()).bounding_rect()?;

        let step = step_over(tool_diameter, overlap);
        let (min, max) = (bounds.min(), bounds.max());
        let mut paths = Vec::new();
        let mut y = min.y + step / 2.0;
        let mut row = 0usize;
        while y < max.y && row < MAX_PASSES {
            let mut scan = vec![coord(min.x - 1.0, y), coord(max.x + 1.0, y)];
            // alternate direction so successive rows link up end to start
            if row % 2 == 1 {
                scan.reverse();
            }
            let mut pieces = region
                .clip(&MultiLineString::new(vec![LineString::new(scan)]), false)
                .0;
            for piece in pieces.iter_mut() {
                let forward = first_x(piece) <= last_x(piece);
                if forward == (row % 2 == 1) {
                    piece.0.reverse();
                }
            }
            if row % 2 == 1 {
                pieces.sort_by(|a, b| first_x(b).total_cmp(&first_x(a)));
            } else {
                pieces.sort_by(|a, b| first_x(a).total_cmp(&first_x(b)));
            }
            paths.extend(pieces);
            y += step;
            row += 1;
        }
        if contour {
            paths.extend(rings_of(&region));
        }

        finish(paths, &region, connect)
    }
}

fn first_x(line: &LineString) -> f64 {
    line.0.first().map_or(0.0, |c| c.x)
}

fn last_x(line: &LineString) -> f64 {
    line.0.last().map_or(0.0, |c| c.x)
}

/// Drops degenerate paths, optionally links consecutive ones, and wraps
/// the result.
fn finish(paths: Vec<LineString>, region: &MultiPolygon, connect: bool) -> Option<Geometry> {
    let paths: Vec<LineString> = paths.into_iter().filter(|p| p.0.len() >= 2).collect();
    if paths.is_empty() {
        return None;
    }
    let paths = if connect {
        // links may run along the region boundary, so test against a
        // hair-wider region
        let widened = union_all(
            region
                .0
                .iter()
                .flat_map(|p| offset_polygon(p, LINK_TOLERANCE, JoinStyle::Bevel, 8)),
        );
        link_paths(paths, &widened)
    } else {
        paths
    };
    Some(Geometry::MultiLineString(MultiLineString::new(paths)))
}

/// Joins each path to the next when the straight link stays inside the
/// reachable region.
fn link_paths(paths: Vec<LineString>, region: &MultiPolygon) -> Vec<LineString> {
    let mut out: Vec<LineString> = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(last) = out.last_mut() else {
            out.push(path);
            continue;
        };
        let (Some(end), Some(start)) = (last.0.last().copied(), path.0.first().copied()) else {
            out.push(path);
            continue;
        };
        if link_is_inside(end, start, region) {
            last.0.extend(path.0.into_iter().skip(usize::from(end == start)));
        } else {
            out.push(path);
        }
    }
    out
}

fn link_is_inside(a: Coord, b: Coord, region: &MultiPolygon) -> bool {
    if a == b {
        return true;
    }
    let link = LineString::new(vec![a, b]);
    region.0.iter().any(|p| p.contains(&link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::rectangle;

    fn square() -> Polygon {
        rectangle(coord(0.0, 0.0), coord(10.0, 10.0))
    }

    fn inside(g: &Geometry, lo: f64, hi: f64) -> bool {
        g.coords()
            .all(|c| c.x >= lo - 1e-6 && c.x <= hi + 1e-6 && c.y >= lo - 1e-6 && c.y <= hi + 1e-6)
    }

    #[test]
    fn test_standard_passes_stay_inside() {
        let result = StandardClearing
            .clear_polygon(&square(), 1.0, 32, 0.1, true, false)
            .unwrap();
        assert!(inside(&result, 0.5, 9.5));
        match result {
            Geometry::MultiLineString(mls) => assert!(mls.0.len() >= 5),
            other => panic!("expected lines, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_standard_contour_pass_is_optional() {
        let with = StandardClearing
            .clear_polygon(&square(), 1.0, 32, 0.2, true, false)
            .unwrap();
        let without = StandardClearing
            .clear_polygon(&square(), 1.0, 32, 0.2, false, false)
            .unwrap();
        assert_ne!(with, without);
        let (Geometry::MultiLineString(with), Geometry::MultiLineString(without)) = (with, without)
        else {
            panic!("expected lines");
        };
        assert_eq!(with.0.len(), without.0.len() + 1);
        // without the contour pass nothing touches the reachable boundary
        let touches = |mls: &MultiLineString| {
            mls.0
                .iter()
                .flat_map(|l| l.0.iter())
                .any(|c| (c.x - 0.5).abs() < 1e-6 || (c.x - 9.5).abs() < 1e-6)
        };
        assert!(touches(&with));
        assert!(!touches(&without));
    }

    #[test]
    fn test_tool_too_large_yields_none() {
        assert!(StandardClearing
            .clear_polygon(&square(), 20.0, 32, 0.1, true, true)
            .is_none());
    }

    #[test]
    fn test_lines_connect_into_one_zigzag() {
        let result = LinesClearing
            .clear_polygon(&square(), 1.0, 32, 0.0, false, true)
            .unwrap();
        assert!(inside(&result, 0.5, 9.5));
        match result {
            Geometry::MultiLineString(mls) => assert_eq!(mls.0.len(), 1),
            other => panic!("expected lines, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_seed_rings_are_clipped() {
        let result = SeedClearing
            .clear_polygon(&square(), 1.0, 32, 0.2, true, false)
            .unwrap();
        assert!(inside(&result, 0.5, 9.5));
    }

    #[test]
    fn test_kernel_for_each_method() {
        for method in [PaintMethod::Standard, PaintMethod::Seed, PaintMethod::Lines] {
            assert!(kernel_for(method)
                .clear_polygon(&square(), 1.0, 32, 0.1, true, true)
                .is_some());
        }
    }
}
