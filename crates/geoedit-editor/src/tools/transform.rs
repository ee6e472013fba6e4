//! Transform tool: rotate, skew, scale, offset or mirror the selection.
//!
//! Values are typed as comma separated numbers (`"30"`, `"2, 0.5"`) and
//! applied on Enter. The reference point is the center or the lower-left
//! corner of the selection's bounds, or a point set by clicking.
//!
//! Rotation angles are entered clockwise positive, the way the canvas
//! presents them; the transform engine itself rotates counter-clockwise.

use super::{Edit, Entry, Tool, ToolContext, ToolKey, ToolState, ToolStep};
use crate::geometry::{coord, GeometryValue};
use crate::shape_store::SpatialShapeStore;
use crate::transform::{self, MirrorAxis};
use geo::{Coord, Rect};
use geoedit_core::{EditorError, EditorResult, StatusMessage};
use serde::{Deserialize, Serialize};

type Ctx<'a> = ToolContext<'a, SpatialShapeStore>;
type Step = ToolStep<SpatialShapeStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    /// Angle in degrees, clockwise positive.
    Rotate,
    /// `angle_x[, angle_y]` in degrees.
    Skew,
    /// `factor` or `x_factor, y_factor`.
    Scale,
    /// `dx[, dy]`.
    Offset,
    Mirror(MirrorAxis),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePoint {
    /// Center of the selection bounds.
    #[default]
    Center,
    /// Lower-left corner of the selection bounds.
    MinCorner,
    Point { x: f64, y: f64 },
}

pub struct TransformTool {
    op: TransformOp,
    reference: ReferencePoint,
    entry: Entry,
}

impl TransformTool {
    /// Fails when the selection is empty.
    pub fn new(op: TransformOp, reference: ReferencePoint, ctx: &Ctx<'_>) -> EditorResult<Self> {
        ctx.require_selection("transform")?;
        Ok(Self {
            op,
            reference,
            entry: Entry::default(),
        })
    }

    fn origin(&self, shapes: &[GeometryValue]) -> EditorResult<Coord> {
        if let ReferencePoint::Point { x, y } = self.reference {
            return Ok(coord(x, y));
        }
        let bounds = shapes
            .iter()
            .filter_map(|s| s.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    coord(a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    coord(a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
            .ok_or(EditorError::EmptyGeometry)?;
        Ok(match self.reference {
            ReferencePoint::MinCorner => bounds.min(),
            _ => bounds.center(),
        })
    }

    /// Typed values, with at least `min` and at most `max` of them.
    fn values(&self, ctx: &Ctx<'_>, min: usize, max: usize) -> EditorResult<Vec<f64>> {
        let param = match self.op {
            TransformOp::Rotate => "angle",
            TransformOp::Skew => "skew",
            TransformOp::Scale => "factor",
            TransformOp::Offset => "offset",
            TransformOp::Mirror(_) => "mirror",
        };
        let values = self.entry.values(param, ctx.settings)?;
        if values.len() < min || values.len() > max {
            return Err(EditorError::invalid_parameter(
                param,
                format!("expected {} to {} values, got {}", min, max, values.len()),
            ));
        }
        Ok(values)
    }

    /// Builds the per-shape transform from the typed values.
    fn operation(
        &self,
        ctx: &Ctx<'_>,
        origin: Coord,
    ) -> EditorResult<Box<dyn Fn(&GeometryValue) -> GeometryValue + Send>> {
        Ok(match self.op {
            TransformOp::Rotate => {
                let angle = self.values(ctx, 1, 1)?[0];
                Box::new(move |v: &GeometryValue| transform::rotate(v, -angle, origin))
            }
            TransformOp::Skew => {
                let values = self.values(ctx, 1, 2)?;
                let (ax, ay) = (values[0], values.get(1).copied().unwrap_or(0.0));
                Box::new(move |v: &GeometryValue| transform::skew(v, ax, ay, origin))
            }
            TransformOp::Scale => {
                let values = self.values(ctx, 1, 2)?;
                let fx = nonzero_factor(values[0]);
                let fy = nonzero_factor(values.get(1).copied().unwrap_or(values[0]));
                Box::new(move |v: &GeometryValue| transform::scale(v, fx, Some(fy), origin))
            }
            TransformOp::Offset => {
                let values = self.values(ctx, 1, 2)?;
                let (dx, dy) = (values[0], values.get(1).copied().unwrap_or(0.0));
                Box::new(move |v: &GeometryValue| transform::offset(v, dx, dy))
            }
            TransformOp::Mirror(axis) => {
                Box::new(move |v: &GeometryValue| transform::mirror(v, axis, origin))
            }
        })
    }
}

/// A zero scale factor would collapse the shape; it is treated as 1.
fn nonzero_factor(factor: f64) -> f64 {
    if factor == 0.0 {
        tracing::warn!("Scale factor 0 replaced by 1");
        1.0
    } else {
        factor
    }
}

impl Tool<SpatialShapeStore> for TransformTool {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn state(&self) -> ToolState {
        ToolState::AwaitingInput(usize::from(matches!(
            self.reference,
            ReferencePoint::Point { .. }
        )))
    }

    fn click(&mut self, point: Coord, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        self.reference = ReferencePoint::Point {
            x: point.x,
            y: point.y,
        };
        Ok(ToolStep::Pending(StatusMessage::info(format!(
            "Reference point set to ({:.4}, {:.4})",
            point.x, point.y
        ))))
    }

    fn on_key(&mut self, key: ToolKey, ctx: &Ctx<'_>) -> EditorResult<Option<Step>> {
        if key == ToolKey::Enter {
            return self.make(ctx).map(Some);
        }
        if self.entry.feed(key) {
            return Ok(Some(ToolStep::Pending(StatusMessage::info(
                self.entry.as_str().to_string(),
            ))));
        }
        Ok(None)
    }

    fn utility_geometry(&self, _cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        None
    }

    fn make(&mut self, ctx: &Ctx<'_>) -> EditorResult<Step> {
        ctx.require_selection("transform")?;
        let selected = ctx.selected_values();
        let shapes: Vec<GeometryValue> = selected.iter().map(|(_, v)| v.clone()).collect();
        let origin = self.origin(&shapes)?;
        let operation = self.operation(ctx, origin)?;
        let refs: Vec<_> = selected.into_iter().map(|(r, _)| r).collect();
        tracing::info!(
            "Transform {:?} of {} shapes about ({}, {})",
            self.op,
            refs.len(),
            origin.x,
            origin.y
        );

        Ok(ToolStep::Deferred {
            message: StatusMessage::info("Transforming..."),
            job: Box::new(move || {
                let count = refs.len();
                let replaced = refs.into_iter().zip(shapes.iter().map(|s| operation(s)));
                Ok(Edit::new(StatusMessage::success(format!("Transformed {} shapes", count)))
                    .replacing(replaced))
            }),
        })
    }
}
