//! Buffer tool: offsets the selection and adds the result as new shapes.
//!
//! The distance can be typed while the tool is engaged; Enter runs the
//! buffer on the worker queue.

use super::{Edit, Entry, SelectionChange, Tool, ToolContext, ToolKey, ToolState, ToolStep};
use crate::geometry::GeometryValue;
use crate::ops::{buffer_exterior, buffer_full, buffer_interior};
use crate::shape_store::SpatialShapeStore;
use geo::Coord;
use geoedit_core::{EditorResult, StatusMessage};
use geoedit_settings::JoinStyle;
use serde::{Deserialize, Serialize};

type Ctx<'a> = ToolContext<'a, SpatialShapeStore>;
type Step = ToolStep<SpatialShapeStore>;

/// Which side of the boundary is offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BufferKind {
    /// Grow outward; the result is one merged area.
    #[default]
    Full,
    /// Inward offset; each ring becomes its own shape.
    Interior,
    /// Outward offset; each ring becomes its own shape.
    Exterior,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BufferParams {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub kind: BufferKind,
    /// Corner style; the configured default when `None`.
    #[serde(default)]
    pub join: Option<JoinStyle>,
}

pub struct BufferTool {
    params: BufferParams,
    entry: Entry,
}

impl BufferTool {
    /// Fails when the selection is empty.
    pub fn new(params: BufferParams, ctx: &Ctx<'_>) -> EditorResult<Self> {
        ctx.require_selection("buffer")?;
        Ok(Self {
            params,
            entry: Entry::default(),
        })
    }
}

impl Tool<SpatialShapeStore> for BufferTool {
    fn name(&self) -> &'static str {
        "buffer"
    }

    fn state(&self) -> ToolState {
        ToolState::AwaitingInput(0)
    }

    fn click(&mut self, _point: Coord, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        Ok(ToolStep::Pending(StatusMessage::info(
            "Type a distance and press Enter to buffer the selection",
        )))
    }

    fn on_key(&mut self, key: ToolKey, ctx: &Ctx<'_>) -> EditorResult<Option<Step>> {
        if key == ToolKey::Enter {
            return self.make(ctx).map(Some);
        }
        if self.entry.feed(key) {
            return Ok(Some(ToolStep::Pending(StatusMessage::info(format!(
                "Distance: {}",
                self.entry.as_str()
            )))));
        }
        Ok(None)
    }

    fn utility_geometry(&self, _cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        None
    }

    fn make(&mut self, ctx: &Ctx<'_>) -> EditorResult<Step> {
        ctx.require_selection("buffer")?;
        let distance = if self.entry.is_empty() {
            self.params.distance
        } else {
            match self.entry.values("distance", ctx.settings)?[..] {
                [d] => d,
                _ => {
                    return Err(geoedit_core::EditorError::invalid_parameter(
                        "distance",
                        "expected a single value",
                    ))
                }
            }
        };

        let kind = self.params.kind;
        let join = self.params.join.unwrap_or(ctx.settings.buffer_join);
        let steps = ctx.settings.steps_per_circle;
        let shapes: Vec<GeometryValue> = ctx.selected_values().into_iter().map(|(_, v)| v).collect();
        tracing::info!(
            "Buffering {} shapes by {} ({:?}, {:?} join)",
            shapes.len(),
            distance,
            kind,
            join
        );

        Ok(ToolStep::Deferred {
            message: StatusMessage::info("Buffering..."),
            job: Box::new(move || {
                let results = match kind {
                    BufferKind::Full => vec![buffer_full(&shapes, distance, join, steps)?],
                    BufferKind::Interior => buffer_interior(&shapes, distance, join, steps)?,
                    BufferKind::Exterior => buffer_exterior(&shapes, distance, join, steps)?,
                };
                Ok(Edit::new(StatusMessage::success("Buffer done"))
                    .adding(results.into_iter().map(GeometryValue::new))
                    .with_selection(SelectionChange::SelectAdded))
            }),
        })
    }
}
