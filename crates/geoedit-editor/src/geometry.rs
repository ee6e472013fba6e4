//! # Geometry values
//!
//! [`Geometry`] is the closed set of 2D shape kinds the editor works with,
//! including an arbitrarily nested [`Geometry::Collection`].
//! [`GeometryValue`] pairs a geometry with the utility flag that marks
//! preview-only shapes.
//!
//! Every traversal here is an explicit recursive match over the enum, so
//! adding a kind forces every consumer to decide how to handle it.

use geo::{
    Area, Centroid, Coord, GeometryCollection, LineString, MapCoords,
    MultiLineString, MultiPolygon, Polygon, Rect, Simplify,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience constructor for a coordinate.
#[inline]
pub fn coord(x: f64, y: f64) -> Coord {
    Coord { x, y }
}

/// Euclidean distance between two coordinates.
#[inline]
pub fn distance(a: Coord, b: Coord) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Discriminant of [`Geometry`], used in messages and dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Point,
    LineString,
    LinearRing,
    Polygon,
    MultiLineString,
    MultiPolygon,
    Collection,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Point => "point",
            Self::LineString => "line string",
            Self::LinearRing => "linear ring",
            Self::Polygon => "polygon",
            Self::MultiLineString => "multi line string",
            Self::MultiPolygon => "multi polygon",
            Self::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// A single 2D shape or a nested collection of shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Coord),
    LineString(LineString),
    /// Closed line string; the first and last coordinates are equal.
    LinearRing(LineString),
    Polygon(Polygon),
    MultiLineString(MultiLineString),
    MultiPolygon(MultiPolygon),
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Builds a closed ring from `coords`, closing it if needed.
    pub fn ring(coords: Vec<Coord>) -> Self {
        let mut ring = LineString::new(coords);
        ring.close();
        Self::LinearRing(ring)
    }

    /// Collapses a list of polygons into the narrowest areal kind.
    pub fn from_polygons(mut polygons: Vec<Polygon>) -> Option<Self> {
        match polygons.len() {
            0 => None,
            1 => polygons.pop().map(Self::Polygon),
            _ => Some(Self::MultiPolygon(MultiPolygon::new(polygons))),
        }
    }

    /// Collapses a list of line strings into the narrowest linear kind.
    pub fn from_lines(mut lines: Vec<LineString>) -> Option<Self> {
        lines.retain(|l| l.0.len() >= 2);
        match lines.len() {
            0 => None,
            1 => lines.pop().map(Self::LineString),
            _ => Some(Self::MultiLineString(MultiLineString::new(lines))),
        }
    }

    /// Collapses a list of geometries, unwrapping single-element lists.
    pub fn from_parts(mut parts: Vec<Geometry>) -> Option<Self> {
        parts.retain(|p| !p.is_empty());
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Self::Collection(parts)),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Point(_) => ShapeKind::Point,
            Self::LineString(_) => ShapeKind::LineString,
            Self::LinearRing(_) => ShapeKind::LinearRing,
            Self::Polygon(_) => ShapeKind::Polygon,
            Self::MultiLineString(_) => ShapeKind::MultiLineString,
            Self::MultiPolygon(_) => ShapeKind::MultiPolygon,
            Self::Collection(_) => ShapeKind::Collection,
        }
    }

    /// True when the geometry has no coordinates at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Point(_) => false,
            Self::LineString(ls) | Self::LinearRing(ls) => ls.0.is_empty(),
            Self::Polygon(p) => p.exterior().0.is_empty(),
            Self::MultiLineString(mls) => mls.0.iter().all(|l| l.0.is_empty()),
            Self::MultiPolygon(mp) => mp.0.iter().all(|p| p.exterior().0.is_empty()),
            Self::Collection(items) => items.iter().all(Geometry::is_empty),
        }
    }

    /// Lazily visits every coordinate: exteriors before interiors, parts in
    /// order, collections depth-first.
    pub fn coords(&self) -> Box<dyn Iterator<Item = Coord> + '_> {
        match self {
            Self::Point(c) => Box::new(std::iter::once(*c)),
            Self::LineString(ls) | Self::LinearRing(ls) => Box::new(ls.0.iter().copied()),
            Self::Polygon(p) => Box::new(polygon_coords(p)),
            Self::MultiLineString(mls) => {
                Box::new(mls.0.iter().flat_map(|l| l.0.iter().copied()))
            }
            Self::MultiPolygon(mp) => Box::new(mp.0.iter().flat_map(polygon_coords)),
            Self::Collection(items) => Box::new(items.iter().flat_map(|g| g.coords())),
        }
    }

    /// Areal content. Linear rings count as hole-free polygons.
    pub fn polygons(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_polygons(&mut out);
        out
    }

    fn collect_polygons(&self, out: &mut Vec<Polygon>) {
        match self {
            Self::LinearRing(ring) if ring.0.len() >= 4 => {
                out.push(Polygon::new(ring.clone(), vec![]))
            }
            Self::Polygon(p) => out.push(p.clone()),
            Self::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
            Self::Collection(items) => items.iter().for_each(|g| g.collect_polygons(out)),
            _ => {}
        }
    }

    /// Open linear content (line strings and multi line string components).
    pub fn open_lines(&self) -> Vec<LineString> {
        let mut out = Vec::new();
        self.collect_open_lines(&mut out);
        out
    }

    fn collect_open_lines(&self, out: &mut Vec<LineString>) {
        match self {
            Self::LineString(ls) => out.push(ls.clone()),
            Self::MultiLineString(mls) => out.extend(mls.0.iter().cloned()),
            Self::Collection(items) => items.iter().for_each(|g| g.collect_open_lines(out)),
            _ => {}
        }
    }

    /// Every piece of linework, including ring and polygon boundaries.
    pub fn boundary_lines(&self) -> Vec<LineString> {
        let mut out = Vec::new();
        self.collect_boundary_lines(&mut out);
        out
    }

    fn collect_boundary_lines(&self, out: &mut Vec<LineString>) {
        match self {
            Self::Point(_) => {}
            Self::LineString(ls) | Self::LinearRing(ls) => out.push(ls.clone()),
            Self::Polygon(p) => push_rings(p, out),
            Self::MultiLineString(mls) => out.extend(mls.0.iter().cloned()),
            Self::MultiPolygon(mp) => mp.0.iter().for_each(|p| push_rings(p, out)),
            Self::Collection(items) => items.iter().for_each(|g| g.collect_boundary_lines(out)),
        }
    }

    /// Isolated points.
    pub fn points(&self) -> Vec<Coord> {
        match self {
            Self::Point(c) => vec![*c],
            Self::Collection(items) => items.iter().flat_map(Geometry::points).collect(),
            _ => Vec::new(),
        }
    }

    /// Applies `func` to every coordinate, returning a new geometry of the
    /// same shape. Collections are rebuilt element-wise.
    pub fn map_coords(&self, func: impl Fn(Coord) -> Coord + Copy) -> Geometry {
        match self {
            Self::Point(c) => Self::Point(func(*c)),
            Self::LineString(ls) => Self::LineString(ls.map_coords(func)),
            Self::LinearRing(ls) => Self::LinearRing(ls.map_coords(func)),
            Self::Polygon(p) => Self::Polygon(p.map_coords(func)),
            Self::MultiLineString(mls) => Self::MultiLineString(mls.map_coords(func)),
            Self::MultiPolygon(mp) => Self::MultiPolygon(mp.map_coords(func)),
            Self::Collection(items) => {
                Self::Collection(items.iter().map(|g| g.map_coords(func)).collect())
            }
        }
    }

    /// Douglas-Peucker simplification of every linear component.
    pub fn simplified(&self, tolerance: f64) -> Geometry {
        match self {
            Self::Point(c) => Self::Point(*c),
            Self::LineString(ls) => Self::LineString(ls.simplify(&tolerance)),
            Self::LinearRing(ls) => Self::LinearRing(ls.simplify(&tolerance)),
            Self::Polygon(p) => Self::Polygon(p.simplify(&tolerance)),
            Self::MultiLineString(mls) => Self::MultiLineString(mls.simplify(&tolerance)),
            Self::MultiPolygon(mp) => Self::MultiPolygon(mp.simplify(&tolerance)),
            Self::Collection(items) => {
                Self::Collection(items.iter().map(|g| g.simplified(tolerance)).collect())
            }
        }
    }

    /// Converts into the `geo` geometry model.
    pub fn to_geo(&self) -> geo::Geometry {
        match self {
            Self::Point(c) => geo::Geometry::Point((*c).into()),
            Self::LineString(ls) | Self::LinearRing(ls) => geo::Geometry::LineString(ls.clone()),
            Self::Polygon(p) => geo::Geometry::Polygon(p.clone()),
            Self::MultiLineString(mls) => geo::Geometry::MultiLineString(mls.clone()),
            Self::MultiPolygon(mp) => geo::Geometry::MultiPolygon(mp.clone()),
            Self::Collection(items) => geo::Geometry::GeometryCollection(GeometryCollection::new_from(
                items.iter().map(Geometry::to_geo).collect(),
            )),
        }
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut coords = self.coords();
        let first = coords.next()?;
        let (min, max) = coords.fold((first, first), |(min, max), c| {
            (
                Coord {
                    x: min.x.min(c.x),
                    y: min.y.min(c.y),
                },
                Coord {
                    x: max.x.max(c.x),
                    y: max.y.max(c.y),
                },
            )
        });
        Some(Rect::new(min, max))
    }

    /// Geometric centroid, falling back to the bounding box center for
    /// degenerate shapes.
    pub fn centroid(&self) -> Option<Coord> {
        self.to_geo()
            .centroid()
            .map(|p| p.0)
            .or_else(|| self.bounding_rect().map(|r| r.center()))
    }

    /// Total unsigned area of the areal content.
    pub fn area(&self) -> f64 {
        self.polygons().iter().map(|p| p.unsigned_area()).sum()
    }
}

fn polygon_coords(p: &Polygon) -> impl Iterator<Item = Coord> + '_ {
    p.exterior()
        .0
        .iter()
        .copied()
        .chain(p.interiors().iter().flat_map(|r| r.0.iter().copied()))
}

fn push_rings(p: &Polygon, out: &mut Vec<LineString>) {
    out.push(p.exterior().clone());
    out.extend(p.interiors().iter().cloned());
}

/// A geometry plus its utility (preview-only) flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryValue {
    pub geometry: Geometry,
    pub is_utility: bool,
}

impl GeometryValue {
    /// A persistent shape.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            is_utility: false,
        }
    }

    /// A preview shape; never inserted into a store.
    pub fn utility(geometry: Geometry) -> Self {
        Self {
            geometry,
            is_utility: true,
        }
    }

    /// Returns a copy carrying `geometry` instead, keeping the utility flag.
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            is_utility: self.is_utility,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn coords(&self) -> Box<dyn Iterator<Item = Coord> + '_> {
        self.geometry.coords()
    }
}

impl From<Geometry> for GeometryValue {
    fn from(geometry: Geometry) -> Self {
        Self::new(geometry)
    }
}
