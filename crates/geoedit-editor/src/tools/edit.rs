//! Move and copy of the selection by a clicked displacement.

use super::{Edit, SelectionChange, Tool, ToolContext, ToolState, ToolStep};
use crate::geometry::{Geometry, GeometryValue};
use crate::transform::offset;
use crate::workspace::Workspace;
use geo::Coord;
use geoedit_core::{EditorError, EditorResult, StatusMessage};
use serde::{Deserialize, Serialize};

/// Whether the originals are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveMode {
    Move,
    Copy,
}

/// Reference click, then destination click. Works on whatever the
/// selection held when the tool was engaged.
pub struct MoveTool<W: Workspace> {
    mode: MoveMode,
    targets: Vec<W::Ref>,
    origin: Option<Coord>,
    done: bool,
}

impl<W: Workspace> MoveTool<W> {
    /// Fails when the selection is empty.
    pub fn new(mode: MoveMode, ctx: &ToolContext<'_, W>) -> EditorResult<Self> {
        ctx.require_selection(match mode {
            MoveMode::Move => "move",
            MoveMode::Copy => "copy",
        })?;
        Ok(Self {
            mode,
            targets: ctx.selection.iter().collect(),
            origin: None,
            done: false,
        })
    }

    fn translated(&self, dx: f64, dy: f64, ctx: &ToolContext<'_, W>) -> Vec<(W::Ref, W::Value)> {
        self.targets
            .iter()
            .filter_map(|r| {
                ctx.workspace
                    .transformed(*r, &|v: &GeometryValue| offset(v, dx, dy))
                    .map(|value| (*r, value))
            })
            .collect()
    }
}

impl<W: Workspace> Tool<W> for MoveTool<W> {
    fn name(&self) -> &'static str {
        match self.mode {
            MoveMode::Move => "move",
            MoveMode::Copy => "copy",
        }
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(usize::from(self.origin.is_some()))
        }
    }

    fn click(&mut self, point: Coord, ctx: &ToolContext<'_, W>) -> EditorResult<ToolStep<W>> {
        let Some(origin) = self.origin else {
            self.origin = Some(point);
            return Ok(ToolStep::Pending(StatusMessage::info(
                "Click on the destination point",
            )));
        };

        let moved = self.translated(point.x - origin.x, point.y - origin.y, ctx);
        if moved.is_empty() {
            return Err(EditorError::insufficient_selection(self.name(), 1, 0));
        }
        let count = moved.len();
        let (refs, values): (Vec<W::Ref>, Vec<W::Value>) = moved.into_iter().unzip();

        let mut edit = Edit::new(StatusMessage::success(match self.mode {
            MoveMode::Move => format!("Moved {} shapes", count),
            MoveMode::Copy => format!("Copied {} shapes", count),
        }))
        .adding(values)
        .with_selection(SelectionChange::SelectAdded);
        if self.mode == MoveMode::Move {
            edit = edit.removing(refs);
        }
        self.done = true;
        Ok(ToolStep::Complete(edit))
    }

    fn utility_geometry(&self, cursor: Coord, ctx: &ToolContext<'_, W>) -> Option<GeometryValue> {
        let origin = self.origin?;
        let (dx, dy) = (cursor.x - origin.x, cursor.y - origin.y);
        let parts: Vec<Geometry> = self
            .targets
            .iter()
            .filter_map(|r| ctx.workspace.geometry(*r))
            .map(|v| offset(v, dx, dy).geometry)
            .collect();
        Geometry::from_parts(parts).map(GeometryValue::utility)
    }

    fn make(&mut self, _ctx: &ToolContext<'_, W>) -> EditorResult<ToolStep<W>> {
        Ok(ToolStep::Pending(StatusMessage::info(if self.origin.is_some() {
            "Click on the destination point"
        } else {
            "Click on the reference point"
        })))
    }
}
