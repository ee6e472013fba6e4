//! Text tool: click the insertion point, type, press Enter.

use super::{Edit, GeometryToolKind, Tool, ToolContext, ToolKey, ToolState, ToolStep};
use crate::geometry::GeometryValue;
use crate::shape_store::SpatialShapeStore;
use crate::text::{resolve_font, text_geometry};
use geo::Coord;
use geoedit_core::{EditorError, EditorResult, StatusMessage};

type Ctx<'a> = ToolContext<'a, SpatialShapeStore>;
type Step = ToolStep<SpatialShapeStore>;

const DEFAULT_FAMILY: &str = "Sans";
const DEFAULT_SIZE: f64 = 10.0;

pub struct TextTool {
    origin: Option<Coord>,
    text: String,
    family: String,
    size: f64,
    done: bool,
}

impl TextTool {
    pub fn new() -> Self {
        Self::with_font(DEFAULT_FAMILY, DEFAULT_SIZE)
    }

    pub fn with_font(family: impl Into<String>, size: f64) -> Self {
        Self {
            origin: None,
            text: String::new(),
            family: family.into(),
            size,
            done: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool<SpatialShapeStore> for TextTool {
    fn name(&self) -> &'static str {
        "text"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(usize::from(self.origin.is_some()))
        }
    }

    fn click(&mut self, point: Coord, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        self.origin = Some(point);
        Ok(ToolStep::Pending(StatusMessage::info(
            "Type the text and press Enter",
        )))
    }

    fn on_key(&mut self, key: ToolKey, ctx: &Ctx<'_>) -> EditorResult<Option<Step>> {
        if self.origin.is_none() {
            return Ok(Some(ToolStep::Pending(StatusMessage::warning(
                "Click to place the text first",
            ))));
        }
        match key {
            ToolKey::Char(c) if !c.is_control() => {
                self.text.push(c);
                Ok(Some(ToolStep::Pending(StatusMessage::info(self.text.clone()))))
            }
            ToolKey::Backspace => {
                self.text.pop();
                Ok(Some(ToolStep::Pending(StatusMessage::info(self.text.clone()))))
            }
            ToolKey::Enter => self.make(ctx).map(Some),
            _ => Ok(None),
        }
    }

    fn utility_geometry(&self, _cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        let origin = self.origin?;
        if self.text.is_empty() {
            return None;
        }
        let font = resolve_font(&self.family).ok()?;
        text_geometry(font, &self.text, origin, self.size).map(GeometryValue::utility)
    }

    fn make(&mut self, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        let origin = self.origin.ok_or_else(|| {
            EditorError::invalid_parameter("origin", "click to place the text first")
        })?;
        if self.text.trim().is_empty() {
            return Err(EditorError::invalid_parameter("text", "value is empty"));
        }
        let font = resolve_font(&self.family)?;
        let geometry = text_geometry(font, &self.text, origin, self.size)
            .ok_or_else(|| EditorError::empty_result("text"))?;

        self.done = true;
        Ok(ToolStep::Complete(
            Edit::new(StatusMessage::success(format!("Text '{}' added", self.text)))
                .adding([GeometryValue::new(geometry)]),
        ))
    }

    fn next_tool(&self) -> GeometryToolKind {
        GeometryToolKind::Text
    }
}
