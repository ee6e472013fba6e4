//! # Interactive tools
//!
//! A tool turns a stream of snapped clicks, releases and key presses into
//! edits. Each input returns a [`ToolStep`]: more input is needed, an
//! [`Edit`] is ready to apply, or a job must run on the worker queue first.
//!
//! Tools never mutate the workspace; they read it through [`ToolContext`]
//! and the session applies the edits they hand back. A failed step returns
//! an error and leaves the tool engaged with its accumulated points intact.

use crate::geometry::GeometryValue;
use crate::workspace::Workspace;
use crate::selection::Selection;
use crate::shape_store::SpatialShapeStore;
use geo::Coord;
use geoedit_core::{EditorError, EditorResult, Job, StatusMessage};
use geoedit_settings::EditorSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod buffer;
pub mod edit;
pub mod paint;
pub mod select;
pub mod shapes;
pub mod text;
pub mod transform;

pub use buffer::{BufferKind, BufferParams, BufferTool};
pub use edit::{MoveMode, MoveTool};
pub use paint::PaintTool;
pub use select::SelectTool;
pub use shapes::{ArcMode, ArcTool, CircleTool, PolyTool, RectangleTool};
pub use text::TextTool;
pub use transform::{ReferencePoint, TransformOp, TransformTool};

/// Progress of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolState {
    /// Engaged; holds this many accumulated points.
    AwaitingInput(usize),
    /// Finished; the session replaces the tool.
    Complete,
}

/// Key delivered to the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKey {
    Char(char),
    Backspace,
    Enter,
    Escape,
}

/// Keyboard modifiers held during an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub shift: bool,
}

/// Read-only view handed to a tool.
pub struct ToolContext<'a, W: Workspace> {
    pub workspace: &'a W,
    pub selection: &'a Selection<W::Ref>,
    pub settings: &'a EditorSettings,
    pub modifiers: Modifiers,
}

impl<W: Workspace> ToolContext<'_, W> {
    /// Geometry of the selected shapes, in selection order.
    pub fn selected_values(&self) -> Vec<(W::Ref, GeometryValue)> {
        self.selection
            .iter()
            .filter_map(|r| self.workspace.geometry(r).map(|v| (r, v.clone())))
            .collect()
    }

    /// Whether the multi-select modifier from settings is held.
    pub fn additive(&self) -> bool {
        match self.settings.multi_select_key {
            geoedit_settings::MultiSelectKey::Control => self.modifiers.control,
            geoedit_settings::MultiSelectKey::Shift => self.modifiers.shift,
        }
    }

    pub fn stores(&self) -> Vec<&SpatialShapeStore> {
        self.workspace.stores()
    }

    /// Fails with [`EditorError::InsufficientSelection`] when nothing is selected.
    pub fn require_selection(&self, operation: &str) -> EditorResult<()> {
        if self.selection.is_empty() {
            return Err(EditorError::insufficient_selection(operation, 1, 0));
        }
        Ok(())
    }
}

/// How an edit changes the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange<R> {
    /// Keep the current selection, minus removed shapes.
    Keep,
    /// Select exactly these shapes.
    Replace(Vec<R>),
    /// Select the shapes the edit adds.
    SelectAdded,
}

/// A change to apply to the workspace.
///
/// Removals run first, then replacements, then additions.
pub struct Edit<W: Workspace> {
    pub remove: Vec<W::Ref>,
    pub replace: Vec<(W::Ref, W::Value)>,
    pub add: Vec<W::Value>,
    pub selection: SelectionChange<W::Ref>,
    pub message: StatusMessage,
}

impl<W: Workspace> Edit<W> {
    pub fn new(message: StatusMessage) -> Self {
        Self {
            remove: Vec::new(),
            replace: Vec::new(),
            add: Vec::new(),
            selection: SelectionChange::Keep,
            message,
        }
    }

    /// An edit that only changes the selection.
    pub fn select(refs: Vec<W::Ref>, message: StatusMessage) -> Self {
        Self::new(message).with_selection(SelectionChange::Replace(refs))
    }

    pub fn adding(mut self, values: impl IntoIterator<Item = W::Value>) -> Self {
        self.add.extend(values);
        self
    }

    pub fn removing(mut self, refs: impl IntoIterator<Item = W::Ref>) -> Self {
        self.remove.extend(refs);
        self
    }

    pub fn replacing(mut self, pairs: impl IntoIterator<Item = (W::Ref, W::Value)>) -> Self {
        self.replace.extend(pairs);
        self
    }

    pub fn with_selection(mut self, selection: SelectionChange<W::Ref>) -> Self {
        self.selection = selection;
        self
    }
}

impl<W: Workspace> fmt::Debug for Edit<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edit")
            .field("remove", &self.remove)
            .field("replace", &self.replace)
            .field("add", &self.add)
            .field("selection", &self.selection)
            .field("message", &self.message)
            .finish()
    }
}

/// Result of feeding one input to a tool.
pub enum ToolStep<W: Workspace> {
    /// Input accepted; more is needed.
    Pending(StatusMessage),
    /// Apply the edit and keep the tool engaged.
    Apply(Edit<W>),
    /// Apply the edit; the tool is finished.
    Complete(Edit<W>),
    /// Run `job` on the worker queue; the tool is finished once its edit
    /// is applied.
    Deferred {
        message: StatusMessage,
        job: Job<EditorResult<Edit<W>>>,
    },
}

impl<W: Workspace> fmt::Debug for ToolStep<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(msg) => f.debug_tuple("Pending").field(msg).finish(),
            Self::Apply(edit) => f.debug_tuple("Apply").field(edit).finish(),
            Self::Complete(edit) => f.debug_tuple("Complete").field(edit).finish(),
            Self::Deferred { message, .. } => {
                f.debug_struct("Deferred").field("message", message).finish_non_exhaustive()
            }
        }
    }
}

/// An interactive tool.
pub trait Tool<W: Workspace> {
    fn name(&self) -> &'static str;

    fn state(&self) -> ToolState;

    /// Consumes a snapped click.
    fn click(&mut self, point: Coord, ctx: &ToolContext<'_, W>) -> EditorResult<ToolStep<W>>;

    /// Consumes a button release. Only tools that track drags care.
    fn click_release(
        &mut self,
        _point: Coord,
        _ctx: &ToolContext<'_, W>,
    ) -> EditorResult<Option<ToolStep<W>>> {
        Ok(None)
    }

    /// Consumes a key. Enter finishes the tool by default.
    fn on_key(&mut self, key: ToolKey, ctx: &ToolContext<'_, W>) -> EditorResult<Option<ToolStep<W>>> {
        match key {
            ToolKey::Enter => self.make(ctx).map(Some),
            _ => Ok(None),
        }
    }

    /// Preview of what the tool would produce with the cursor at `cursor`.
    fn utility_geometry(&self, cursor: Coord, ctx: &ToolContext<'_, W>) -> Option<GeometryValue>;

    /// Builds the final result from the accumulated input.
    fn make(&mut self, ctx: &ToolContext<'_, W>) -> EditorResult<ToolStep<W>>;

    /// Tool to engage once this one completes.
    fn next_tool(&self) -> W::ToolKind {
        W::select_kind()
    }
}

/// Tools of the geometry editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryToolKind {
    Select,
    Circle,
    Arc,
    Rectangle,
    Polygon,
    Path,
    Move,
    Copy,
    Text,
    Buffer(BufferParams),
    Paint,
    Transform {
        op: TransformOp,
        #[serde(default)]
        reference: ReferencePoint,
    },
}

/// Engages a geometry editor tool.
pub fn build_geometry_tool(
    kind: &GeometryToolKind,
    ctx: &ToolContext<'_, SpatialShapeStore>,
) -> EditorResult<Box<dyn Tool<SpatialShapeStore>>> {
    let tool: Box<dyn Tool<SpatialShapeStore>> = match kind {
        GeometryToolKind::Select => Box::new(SelectTool::new()),
        GeometryToolKind::Circle => Box::new(CircleTool::new()),
        GeometryToolKind::Arc => Box::new(ArcTool::new()),
        GeometryToolKind::Rectangle => Box::new(RectangleTool::new()),
        GeometryToolKind::Polygon => Box::new(PolyTool::polygon()),
        GeometryToolKind::Path => Box::new(PolyTool::path()),
        GeometryToolKind::Move => Box::new(MoveTool::new(MoveMode::Move, ctx)?),
        GeometryToolKind::Copy => Box::new(MoveTool::new(MoveMode::Copy, ctx)?),
        GeometryToolKind::Text => Box::new(TextTool::new()),
        GeometryToolKind::Buffer(params) => Box::new(BufferTool::new(*params, ctx)?),
        GeometryToolKind::Paint => Box::new(PaintTool::new(ctx)?),
        GeometryToolKind::Transform { op, reference } => {
            Box::new(TransformTool::new(*op, *reference, ctx)?)
        }
    };
    tracing::debug!("Engaged {} tool", tool.name());
    Ok(tool)
}

/// Shared text entry for tools that take a typed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Entry {
    text: String,
}

impl Entry {
    /// Feeds a key. Returns `true` if the key edited the entry.
    pub(crate) fn feed(&mut self, key: ToolKey) -> bool {
        match key {
            ToolKey::Char(c) if !c.is_control() => {
                self.text.push(c);
                true
            }
            ToolKey::Backspace => self.text.pop().is_some(),
            _ => false,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Comma separated values parsed in the configured unit system.
    pub(crate) fn values(&self, param: &str, settings: &EditorSettings) -> EditorResult<Vec<f64>> {
        self.text
            .split(',')
            .map(|part| geoedit_core::parse_value(param, part, settings.units))
            .collect()
    }
}
