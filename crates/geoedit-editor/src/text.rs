//! Text to polygons.
//!
//! Glyph outlines are flattened into closed contours (quadratic and cubic
//! curves approximated by line segments) and then assembled into polygons
//! with holes: a contour nested inside an odd number of other contours is a
//! hole of the innermost contour enclosing it.
//!
//! Fonts come from the system font directories via `fontdb`. A family that
//! is not installed resolves to the generic sans-serif face, then to the
//! monospace face.

use crate::geometry::{coord, Geometry};
use fontdb::{Database, Family, Query};
use geo::{Area, Contains, Coord, LineString, Point, Polygon};
use geoedit_core::{EditorError, EditorResult};
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Segments used per curve.
const CURVE_STEPS: usize = 8;

/// Collects glyph contours in font units with y pointing up.
#[derive(Debug, Default)]
pub struct ContourBuilder {
    contours: Vec<Vec<Coord>>,
    current: Vec<Coord>,
    offset: Coord,
}

impl ContourBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translation applied to every following point.
    pub fn set_offset(&mut self, offset: Coord) {
        self.offset = offset;
    }

    fn point(&self, x: f32, y: f32) -> Coord {
        // rusttype's layout has y growing downward
        coord(self.offset.x + x as f64, self.offset.y - y as f64)
    }

    fn last(&self) -> Coord {
        self.current.last().copied().unwrap_or(self.offset)
    }

    fn flush(&mut self) {
        if self.current.len() >= 3 {
            let mut contour = std::mem::take(&mut self.current);
            if contour.first() != contour.last() {
                if let Some(first) = contour.first().copied() {
                    contour.push(first);
                }
            }
            self.contours.push(contour);
        } else {
            self.current.clear();
        }
    }

    /// Finished contours assembled into polygons.
    pub fn into_polygons(mut self) -> Vec<Polygon> {
        self.flush();
        assemble(self.contours)
    }
}

impl OutlineBuilder for ContourBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        let p = self.point(x, y);
        self.current.push(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.current.push(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c = self.point(x1, y1);
        let p = self.point(x, y);
        for i in 1..=CURVE_STEPS {
            let t = i as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            self.current.push(coord(
                mt * mt * p0.x + 2.0 * mt * t * c.x + t * t * p.x,
                mt * mt * p0.y + 2.0 * mt * t * c.y + t * t * p.y,
            ));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.last();
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        let p = self.point(x, y);
        for i in 1..=CURVE_STEPS {
            let t = i as f64 / CURVE_STEPS as f64;
            let mt = 1.0 - t;
            let (a, b, c, d) = (mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t);
            self.current.push(coord(
                a * p0.x + b * c1.x + c * c2.x + d * p.x,
                a * p0.y + b * c1.y + c * c2.y + d * p.y,
            ));
        }
    }

    fn close(&mut self) {
        self.flush();
    }
}

/// Assigns each contour as a shell or as a hole of its innermost enclosing
/// shell, by containment depth parity.
fn assemble(contours: Vec<Vec<Coord>>) -> Vec<Polygon> {
    let rings: Vec<LineString> = contours.into_iter().map(LineString::new).collect();
    let areas: Vec<f64> = rings
        .iter()
        .map(|r| Polygon::new(r.clone(), vec![]).unsigned_area())
        .collect();
    let probes: Vec<Point> = rings.iter().filter_map(|r| r.0.first().map(|c| Point::from(*c))).collect();
    if probes.len() != rings.len() {
        return Vec::new();
    }

    // parents[i]: every contour strictly enclosing contour i
    let parents: Vec<Vec<usize>> = (0..rings.len())
        .map(|i| {
            (0..rings.len())
                .filter(|&j| {
                    j != i
                        && areas[j] > areas[i]
                        && Polygon::new(rings[j].clone(), vec![]).contains(&probes[i])
                })
                .collect()
        })
        .collect();

    let mut shells: Vec<(usize, Vec<LineString>)> = Vec::new();
    for (i, enclosing) in parents.iter().enumerate() {
        if enclosing.len() % 2 == 0 {
            shells.push((i, Vec::new()));
        }
    }
    for (i, enclosing) in parents.iter().enumerate() {
        if enclosing.len() % 2 == 1 {
            // innermost enclosing contour is the smallest one
            let owner = enclosing
                .iter()
                .copied()
                .min_by(|a, b| areas[*a].total_cmp(&areas[*b]));
            if let Some(slot) = owner.and_then(|o| shells.iter_mut().find(|(s, _)| *s == o)) {
                slot.1.push(rings[i].clone());
            }
        }
    }

    shells
        .into_iter()
        .map(|(i, holes)| Polygon::new(rings[i].clone(), holes))
        .collect()
}

/// Outlines of `text` set in `font` at `size`, with the baseline of the
/// first line starting at `origin`.
pub fn text_geometry(font: &Font<'_>, text: &str, origin: Coord, size: f64) -> Option<Geometry> {
    let scale = Scale::uniform(size as f32);
    let mut builder = ContourBuilder::new();
    for glyph in font.layout(text, scale, rt_point(0.0, 0.0)) {
        let pos = glyph.position();
        builder.set_offset(coord(origin.x + pos.x as f64, origin.y - pos.y as f64));
        glyph.unpositioned().build_outline(&mut builder);
        builder.flush();
    }
    Geometry::from_polygons(builder.into_polygons())
}

type ResolvedFont = Option<&'static Font<'static>>;

fn font_db() -> &'static Database {
    static DB: OnceLock<Database> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Indexed {} system font faces", db.len());
        db
    })
}

/// Maps a text tool family name to a `fontdb` family.
fn family_of(name: &str) -> Family<'_> {
    match name.trim() {
        "" | "Sans" | "sans-serif" => Family::SansSerif,
        "Serif" | "serif" => Family::Serif,
        "Monospace" | "monospace" => Family::Monospace,
        other => Family::Name(other),
    }
}

fn load_face(family: Family<'_>) -> Option<Font<'static>> {
    let db = font_db();
    let id = db.query(&Query {
        families: &[family],
        ..Query::default()
    })?;
    db.with_face_data(id, |data, index| {
        Font::try_from_vec_and_index(data.to_vec(), index)
    })
    .flatten()
}

/// Font the text tool sets `family` in. Each family is loaded once; a
/// family with no usable face, not even a fallback, stays unresolved.
pub fn resolve_font(family: &str) -> EditorResult<&'static Font<'static>> {
    static RESOLVED: OnceLock<Mutex<HashMap<String, ResolvedFont>>> = OnceLock::new();
    let resolved = RESOLVED.get_or_init(|| Mutex::new(HashMap::new()));

    let cached = resolved
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .get(family)
        .copied();
    let font = match cached {
        Some(font) => font,
        None => {
            let font = load_face(family_of(family))
                .or_else(|| load_face(Family::SansSerif))
                .or_else(|| load_face(Family::Monospace))
                .map(|f| &*Box::leak(Box::new(f)));
            if font.is_none() {
                tracing::warn!("No usable font for family '{}'", family);
            }
            resolved
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .insert(family.to_string(), font);
            font
        }
    };
    font.ok_or_else(|| {
        EditorError::invalid_parameter("font", format!("no usable font for '{}'", family))
    })
}
