//! Drawing tools: circle, arc, rectangle, polygon and path.
//!
//! All of them collect clicked points; the circle, arc and rectangle finish
//! on their last click, polygon and path on Enter. Once finished they re-arm
//! so the next shape can be drawn right away.

use super::{Edit, GeometryToolKind, Tool, ToolContext, ToolKey, ToolState, ToolStep};
use crate::geometry::{coord, distance, Geometry, GeometryValue};
use crate::primitives::{
    angle_from, arc_points, circle_points, circle_polygon, circle_through, orientation, rectangle,
    ArcDirection,
};
use crate::shape_store::SpatialShapeStore;
use geo::{Coord, LineString, Polygon};
use geoedit_core::{EditorError, EditorResult, StatusMessage};
use serde::{Deserialize, Serialize};
use std::fmt;

type Ctx<'a> = ToolContext<'a, SpatialShapeStore>;
type Step = ToolStep<SpatialShapeStore>;

const MIN_EXTENT: f64 = 1e-12;

fn finished(kind: &str, value: GeometryValue) -> Step {
    ToolStep::Complete(
        Edit::new(StatusMessage::success(format!("{} added", kind))).adding([value]),
    )
}

/// Records the point, or discards it again if building the shape fails.
fn push_and_make<T: Tool<SpatialShapeStore>>(
    tool: &mut T,
    points: impl Fn(&mut T) -> &mut Vec<Coord>,
    point: Coord,
    ctx: &Ctx<'_>,
) -> EditorResult<Step> {
    points(tool).push(point);
    let made = tool.make(ctx);
    if made.is_err() {
        points(tool).pop();
    }
    made
}

// ---------------------------------------------------------------------------
// Circle
// ---------------------------------------------------------------------------

/// Center click then perimeter click.
#[derive(Debug, Default)]
pub struct CircleTool {
    points: Vec<Coord>,
    done: bool,
}

impl CircleTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool<SpatialShapeStore> for CircleTool {
    fn name(&self) -> &'static str {
        "circle"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(self.points.len())
        }
    }

    fn click(&mut self, point: Coord, ctx: &Ctx<'_>) -> EditorResult<Step> {
        if self.points.is_empty() {
            self.points.push(point);
            return Ok(ToolStep::Pending(StatusMessage::info(
                "Click on perimeter point to complete",
            )));
        }
        push_and_make(self, |t| &mut t.points, point, ctx)
    }

    fn utility_geometry(&self, cursor: Coord, ctx: &Ctx<'_>) -> Option<GeometryValue> {
        let center = *self.points.first()?;
        let radius = distance(center, cursor);
        (radius > MIN_EXTENT).then(|| {
            GeometryValue::utility(Geometry::LinearRing(LineString::new(circle_points(
                center,
                radius,
                ctx.settings.steps_per_circle,
            ))))
        })
    }

    fn make(&mut self, ctx: &Ctx<'_>) -> EditorResult<Step> {
        let [center, perimeter] = self.points[..] else {
            return Err(EditorError::invalid_parameter(
                "points",
                "a circle needs a center and a perimeter point",
            ));
        };
        let radius = distance(center, perimeter);
        if radius <= MIN_EXTENT {
            return Err(EditorError::invalid_parameter("radius", "must be > 0"));
        }
        self.done = true;
        Ok(finished(
            "Circle",
            GeometryValue::new(Geometry::Polygon(circle_polygon(
                center,
                radius,
                ctx.settings.steps_per_circle,
            ))),
        ))
    }

    fn next_tool(&self) -> GeometryToolKind {
        GeometryToolKind::Circle
    }
}

// ---------------------------------------------------------------------------
// Arc
// ---------------------------------------------------------------------------

/// Order in which the arc's defining points are clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArcMode {
    /// Center, start point, end point.
    #[serde(rename = "c12")]
    CenterStartEnd,
    /// Start point, end point, then a point locating the center.
    #[default]
    #[serde(rename = "12c")]
    StartEndCenter,
    /// Start point, a point on the arc, end point. The direction follows
    /// from the clicks.
    #[serde(rename = "132")]
    StartMidEnd,
}

impl ArcMode {
    fn next(self) -> Self {
        match self {
            Self::CenterStartEnd => Self::StartEndCenter,
            Self::StartEndCenter => Self::StartMidEnd,
            Self::StartMidEnd => Self::CenterStartEnd,
        }
    }

    fn prompt(self, clicked: usize) -> &'static str {
        match (self, clicked) {
            (Self::CenterStartEnd, 0) => "Click on center point",
            (Self::CenterStartEnd, 1) => "Click on start point",
            (Self::CenterStartEnd, _) => "Click on end point to complete",
            (Self::StartEndCenter, 0) | (Self::StartMidEnd, 0) => "Click on start point",
            (Self::StartEndCenter, 1) => "Click on end point",
            (Self::StartEndCenter, _) => "Click on center point to complete",
            (Self::StartMidEnd, 1) => "Click on a point of the arc",
            (Self::StartMidEnd, _) => "Click on end point to complete",
        }
    }
}

impl fmt::Display for ArcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CenterStartEnd => write!(f, "c12"),
            Self::StartEndCenter => write!(f, "12c"),
            Self::StartMidEnd => write!(f, "132"),
        }
    }
}

/// Three-click arc. `m` cycles the click order, `d` flips the direction.
#[derive(Debug, Default)]
pub struct ArcTool {
    points: Vec<Coord>,
    mode: ArcMode,
    direction: ArcDirection,
    done: bool,
}

impl ArcTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ArcMode {
        self.mode
    }

    pub fn direction(&self) -> ArcDirection {
        self.direction
    }

    /// Arc points for three defining clicks in the current mode.
    fn arc(&self, p: [Coord; 3], steps: u32) -> EditorResult<Vec<Coord>> {
        let (center, radius, start, stop, direction) = match self.mode {
            ArcMode::CenterStartEnd => {
                let [center, a, b] = p;
                (center, distance(center, a), a, b, self.direction)
            }
            ArcMode::StartEndCenter => {
                let [a, b, c] = p;
                let center = bisector_projection(a, b, c);
                (center, distance(center, a), a, b, self.direction)
            }
            ArcMode::StartMidEnd => {
                let [a, mid, b] = p;
                let (center, radius) = circle_through(a, mid, b).ok_or_else(|| {
                    EditorError::invalid_parameter("points", "arc points are collinear")
                })?;
                let direction = if orientation(a, mid, b) > 0.0 {
                    ArcDirection::Ccw
                } else {
                    ArcDirection::Cw
                };
                (center, radius, a, b, direction)
            }
        };
        if !(radius > MIN_EXTENT) {
            return Err(EditorError::invalid_parameter("radius", "must be > 0"));
        }
        Ok(arc_points(
            center,
            radius,
            angle_from(center, start),
            angle_from(center, stop),
            direction,
            steps,
        ))
    }
}

/// Projection of `c` onto the perpendicular bisector of `a`-`b`.
fn bisector_projection(a: Coord, b: Coord, c: Coord) -> Coord {
    let mid = coord((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    let len = distance(a, b);
    if len <= MIN_EXTENT {
        return mid;
    }
    let normal = coord(-(b.y - a.y) / len, (b.x - a.x) / len);
    let t = (c.x - mid.x) * normal.x + (c.y - mid.y) * normal.y;
    coord(mid.x + normal.x * t, mid.y + normal.y * t)
}

impl Tool<SpatialShapeStore> for ArcTool {
    fn name(&self) -> &'static str {
        "arc"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(self.points.len())
        }
    }

    fn click(&mut self, point: Coord, ctx: &Ctx<'_>) -> EditorResult<Step> {
        if self.points.len() < 2 {
            self.points.push(point);
            return Ok(ToolStep::Pending(StatusMessage::info(
                self.mode.prompt(self.points.len()),
            )));
        }
        push_and_make(self, |t| &mut t.points, point, ctx)
    }

    fn on_key(&mut self, key: ToolKey, ctx: &Ctx<'_>) -> EditorResult<Option<Step>> {
        match key {
            ToolKey::Char('m') | ToolKey::Char('M') => {
                self.mode = self.mode.next();
                self.points.clear();
                Ok(Some(ToolStep::Pending(StatusMessage::info(format!(
                    "Mode: {}. {}",
                    self.mode,
                    self.mode.prompt(0)
                )))))
            }
            ToolKey::Char('d') | ToolKey::Char('D') => {
                if self.mode == ArcMode::StartMidEnd {
                    return Ok(Some(ToolStep::Pending(StatusMessage::warning(
                        "Direction follows the clicked points in 132 mode",
                    ))));
                }
                self.direction = self.direction.toggled();
                Ok(Some(ToolStep::Pending(StatusMessage::info(format!(
                    "Direction: {}",
                    self.direction
                )))))
            }
            ToolKey::Enter => self.make(ctx).map(Some),
            _ => Ok(None),
        }
    }

    fn utility_geometry(&self, cursor: Coord, ctx: &Ctx<'_>) -> Option<GeometryValue> {
        match self.points[..] {
            [first] => Some(GeometryValue::utility(Geometry::LineString(LineString::new(
                vec![first, cursor],
            )))),
            [a, b] => self
                .arc([a, b, cursor], ctx.settings.steps_per_circle)
                .ok()
                .map(|pts| GeometryValue::utility(Geometry::LineString(LineString::new(pts)))),
            _ => None,
        }
    }

    fn make(&mut self, ctx: &Ctx<'_>) -> EditorResult<Step> {
        let [a, b, c] = self.points[..] else {
            return Err(EditorError::invalid_parameter(
                "points",
                "an arc needs three points",
            ));
        };
        let points = self.arc([a, b, c], ctx.settings.steps_per_circle)?;
        self.done = true;
        Ok(finished(
            "Arc",
            GeometryValue::new(Geometry::LineString(LineString::new(points))),
        ))
    }

    fn next_tool(&self) -> GeometryToolKind {
        GeometryToolKind::Arc
    }
}

// ---------------------------------------------------------------------------
// Rectangle
// ---------------------------------------------------------------------------

/// Two opposite corners.
#[derive(Debug, Default)]
pub struct RectangleTool {
    points: Vec<Coord>,
    done: bool,
}

impl RectangleTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool<SpatialShapeStore> for RectangleTool {
    fn name(&self) -> &'static str {
        "rectangle"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(self.points.len())
        }
    }

    fn click(&mut self, point: Coord, ctx: &Ctx<'_>) -> EditorResult<Step> {
        if self.points.is_empty() {
            self.points.push(point);
            return Ok(ToolStep::Pending(StatusMessage::info(
                "Click on opposite corner to complete",
            )));
        }
        push_and_make(self, |t| &mut t.points, point, ctx)
    }

    fn utility_geometry(&self, cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        let first = *self.points.first()?;
        Some(GeometryValue::utility(Geometry::LinearRing(
            rectangle(first, cursor).exterior().clone(),
        )))
    }

    fn make(&mut self, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        let [a, b] = self.points[..] else {
            return Err(EditorError::invalid_parameter(
                "points",
                "a rectangle needs two corners",
            ));
        };
        if (a.x - b.x).abs() <= MIN_EXTENT || (a.y - b.y).abs() <= MIN_EXTENT {
            return Err(EditorError::invalid_parameter(
                "rectangle",
                "corners must differ in both x and y",
            ));
        }
        self.done = true;
        Ok(finished(
            "Rectangle",
            GeometryValue::new(Geometry::Polygon(rectangle(a, b))),
        ))
    }

    fn next_tool(&self) -> GeometryToolKind {
        GeometryToolKind::Rectangle
    }
}

// ---------------------------------------------------------------------------
// Polygon / path
// ---------------------------------------------------------------------------

/// Free-form polygon or open path. Backspace drops the last point, Enter
/// finishes.
#[derive(Debug)]
pub struct PolyTool {
    points: Vec<Coord>,
    closed: bool,
    done: bool,
}

impl PolyTool {
    pub fn polygon() -> Self {
        Self {
            points: Vec::new(),
            closed: true,
            done: false,
        }
    }

    pub fn path() -> Self {
        Self {
            closed: false,
            ..Self::polygon()
        }
    }

    fn min_points(&self) -> usize {
        if self.closed {
            3
        } else {
            2
        }
    }

    fn preview(&self, cursor: Coord) -> Vec<Coord> {
        let mut points = self.points.clone();
        points.push(cursor);
        if self.closed {
            if let Some(first) = points.first().copied() {
                points.push(first);
            }
        }
        points
    }
}

impl Tool<SpatialShapeStore> for PolyTool {
    fn name(&self) -> &'static str {
        if self.closed {
            "polygon"
        } else {
            "path"
        }
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(self.points.len())
        }
    }

    fn click(&mut self, point: Coord, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        if self.points.last().is_some_and(|last| distance(*last, point) <= MIN_EXTENT) {
            return Ok(ToolStep::Pending(StatusMessage::info(
                "Point already added",
            )));
        }
        self.points.push(point);
        let text = if self.points.len() < self.min_points() {
            "Click on next point"
        } else {
            "Click on next point or press Enter to complete"
        };
        Ok(ToolStep::Pending(StatusMessage::info(text)))
    }

    fn on_key(&mut self, key: ToolKey, ctx: &Ctx<'_>) -> EditorResult<Option<Step>> {
        match key {
            ToolKey::Backspace => {
                if self.points.pop().is_none() {
                    return Ok(Some(ToolStep::Pending(StatusMessage::warning(
                        "No point to remove",
                    ))));
                }
                Ok(Some(ToolStep::Pending(StatusMessage::info(format!(
                    "Removed last point, {} left",
                    self.points.len()
                )))))
            }
            ToolKey::Enter => self.make(ctx).map(Some),
            _ => Ok(None),
        }
    }

    fn utility_geometry(&self, cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        if self.points.is_empty() {
            return None;
        }
        Some(GeometryValue::utility(Geometry::LineString(LineString::new(
            self.preview(cursor),
        ))))
    }

    fn make(&mut self, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        if self.points.len() < self.min_points() {
            return Err(EditorError::invalid_parameter(
                "points",
                format!(
                    "a {} needs at least {} points, got {}",
                    self.name(),
                    self.min_points(),
                    self.points.len()
                ),
            ));
        }
        let line = LineString::new(self.points.clone());
        let (kind, geometry) = if self.closed {
            ("Polygon", Geometry::Polygon(Polygon::new(line, vec![])))
        } else {
            ("Path", Geometry::LineString(line))
        };
        self.done = true;
        Ok(finished(kind, GeometryValue::new(geometry)))
    }

    fn next_tool(&self) -> GeometryToolKind {
        if self.closed {
            GeometryToolKind::Polygon
        } else {
            GeometryToolKind::Path
        }
    }
}
