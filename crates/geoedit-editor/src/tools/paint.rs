//! Paint tool: fills the selected shapes with clearing paths.
//!
//! Parameters come from the paint settings; a tool diameter typed while the
//! tool is engaged overrides the configured one.

use super::{Edit, Entry, SelectionChange, Tool, ToolContext, ToolKey, ToolState, ToolStep};
use crate::geometry::GeometryValue;
use crate::ops::{paint, PaintParams};
use crate::shape_store::SpatialShapeStore;
use geo::Coord;
use geoedit_core::{EditorError, EditorResult, StatusMessage};

type Ctx<'a> = ToolContext<'a, SpatialShapeStore>;
type Step = ToolStep<SpatialShapeStore>;

pub struct PaintTool {
    entry: Entry,
}

impl PaintTool {
    /// Fails when the selection is empty.
    pub fn new(ctx: &Ctx<'_>) -> EditorResult<Self> {
        ctx.require_selection("paint")?;
        Ok(Self {
            entry: Entry::default(),
        })
    }

    fn params(&self, ctx: &Ctx<'_>) -> EditorResult<PaintParams> {
        let mut params = PaintParams::from_settings(&ctx.settings.paint, ctx.settings.steps_per_circle);
        if !self.entry.is_empty() {
            params.tool_diameter = match self.entry.values("tool_diameter", ctx.settings)?[..] {
                [d] => d,
                _ => {
                    return Err(EditorError::invalid_parameter(
                        "tool_diameter",
                        "expected a single value",
                    ))
                }
            };
        }
        params.validate()?;
        Ok(params)
    }
}

impl Tool<SpatialShapeStore> for PaintTool {
    fn name(&self) -> &'static str {
        "paint"
    }

    fn state(&self) -> ToolState {
        ToolState::AwaitingInput(0)
    }

    fn click(&mut self, _point: Coord, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        Ok(ToolStep::Pending(StatusMessage::info(
            "Press Enter to paint the selection",
        )))
    }

    fn on_key(&mut self, key: ToolKey, ctx: &Ctx<'_>) -> EditorResult<Option<Step>> {
        if key == ToolKey::Enter {
            return self.make(ctx).map(Some);
        }
        if self.entry.feed(key) {
            return Ok(Some(ToolStep::Pending(StatusMessage::info(format!(
                "Tool diameter: {}",
                self.entry.as_str()
            )))));
        }
        Ok(None)
    }

    fn utility_geometry(&self, _cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        None
    }

    fn make(&mut self, ctx: &Ctx<'_>) -> EditorResult<Step> {
        ctx.require_selection("paint")?;
        let params = self.params(ctx)?;
        let shapes: Vec<GeometryValue> = ctx.selected_values().into_iter().map(|(_, v)| v).collect();
        tracing::info!(
            "Painting {} shapes ({:?}, tool {})",
            shapes.len(),
            params.method,
            params.tool_diameter
        );

        Ok(ToolStep::Deferred {
            message: StatusMessage::info("Painting..."),
            job: Box::new(move || {
                let results = paint(&shapes, &params)?;
                Ok(Edit::new(StatusMessage::success("Paint done"))
                    .adding(results.into_iter().map(GeometryValue::new))
                    .with_selection(SelectionChange::SelectAdded))
            }),
        })
    }
}
