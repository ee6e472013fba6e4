//! # Editor session
//!
//! Owns the workspace, the selection, the active tool and the utility
//! (preview) geometry, and turns pointer/key events into tool steps. Tool
//! steps come back as [`Edit`]s which the session applies atomically: a
//! failing step leaves workspace and selection untouched and is reported
//! as a status message.
//!
//! Long-running steps (buffer, paint, transform) are handed to a
//! [`WorkerQueue`]. At most one job per tool invocation is in flight; while
//! it runs further tool input is rejected with [`EditorError::Busy`].
//! Each job is tagged with the session generation, which advances whenever
//! the tool or the selection changes; results of an older generation are
//! dropped when polled.

use crate::drill::{Diameter, DrillShape, DrillStores, DrillToolKind};
use crate::geometry::{Geometry, GeometryValue};
use crate::ops;
use crate::primitives::drill_cross;
use crate::render::{Canvas, Layer, Palette};
use crate::selection::Selection;
use crate::shape_store::SpatialShapeStore;
use crate::snap::snap;
use crate::tools::{
    Edit, Modifiers, SelectTool, SelectionChange, Tool, ToolContext, ToolKey, ToolState, ToolStep,
};
use crate::workspace::Workspace;
use geo::Coord;
use geoedit_core::{
    Completion, EditorError, EditorResult, InlineWorker, MessageLevel, StatusMessage, WorkerQueue,
};
use geoedit_settings::EditorSettings;

/// Queue running deferred tool steps.
pub type EditQueue<W> = Box<dyn WorkerQueue<EditorResult<Edit<W>>>>;

/// Session of the geometry editor.
pub type EditorSession = Session<SpatialShapeStore>;

/// Session of the drill editor.
pub type DrillSession = Session<DrillStores>;

macro_rules! context {
    ($session:ident) => {
        ToolContext {
            workspace: &$session.workspace,
            selection: &$session.selection,
            settings: &$session.settings,
            modifiers: $session.modifiers,
        }
    };
}

pub struct Session<W: Workspace> {
    workspace: W,
    selection: Selection<W::Ref>,
    settings: EditorSettings,
    palette: Palette,
    modifiers: Modifiers,
    tool: Box<dyn Tool<W>>,
    tool_kind: W::ToolKind,
    utility: Option<GeometryValue>,
    generation: u64,
    in_flight: Option<u64>,
    worker: EditQueue<W>,
    last_message: Option<StatusMessage>,
}

impl<W: Workspace + Default> Session<W> {
    /// Session running deferred steps inline.
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_worker(W::default(), settings, Box::new(InlineWorker::new()))
    }
}

impl<W: Workspace> Session<W> {
    pub fn with_worker(mut workspace: W, settings: EditorSettings, worker: EditQueue<W>) -> Self {
        workspace.set_tolerance(settings.index_tolerance);
        Self {
            workspace,
            selection: Selection::new(),
            palette: Palette::from_settings(&settings.colors),
            settings,
            modifiers: Modifiers::default(),
            tool: Box::new(SelectTool::new()),
            tool_kind: W::select_kind(),
            utility: None,
            generation: 0,
            in_flight: None,
            worker,
            last_message: None,
        }
    }

    pub fn workspace(&self) -> &W {
        &self.workspace
    }

    pub fn selection(&self) -> &Selection<W::Ref> {
        &self.selection
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn tool_name(&self) -> &'static str {
        self.tool.name()
    }

    pub fn tool_kind(&self) -> &W::ToolKind {
        &self.tool_kind
    }

    pub fn tool_state(&self) -> ToolState {
        self.tool.state()
    }

    /// Current preview geometry, if the active tool shows one.
    pub fn utility(&self) -> Option<&GeometryValue> {
        self.utility.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a deferred step is still running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_message(&self) -> Option<&StatusMessage> {
        self.last_message.as_ref()
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Validates and installs new settings.
    pub fn apply_settings(&mut self, settings: EditorSettings) -> EditorResult<()> {
        settings
            .validate()
            .map_err(|e| EditorError::invalid_parameter("settings", e.to_string()))?;
        if settings.index_tolerance != self.settings.index_tolerance {
            self.workspace.set_tolerance(settings.index_tolerance);
        }
        self.palette = Palette::from_settings(&settings.colors);
        self.settings = settings;
        tracing::debug!("Editor settings updated");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Tools
    // -----------------------------------------------------------------

    /// Engages `kind`. When its preconditions fail, the select tool is
    /// engaged instead and the failure reported.
    pub fn select_tool(&mut self, kind: W::ToolKind) -> StatusMessage {
        match self.engage(kind) {
            Ok(()) => self.report(StatusMessage::info(format!("{} tool", self.tool.name()))),
            Err(e) => {
                tracing::warn!("Cannot engage tool: {}", e);
                self.report((&e).into())
            }
        }
    }

    /// Abandons the active tool and its accumulated input and returns to
    /// the select tool.
    pub fn escape(&mut self) -> StatusMessage {
        self.reset_tool();
        self.report(StatusMessage::info("Cancelled"))
    }

    fn engage(&mut self, kind: W::ToolKind) -> EditorResult<()> {
        self.generation += 1;
        self.in_flight = None;
        self.utility = None;
        match W::build_tool(&kind, &context!(self)) {
            Ok(tool) => {
                tracing::info!("Engaged {} tool", tool.name());
                self.tool = tool;
                self.tool_kind = kind;
                Ok(())
            }
            Err(e) => {
                self.reset_tool();
                Err(e)
            }
        }
    }

    fn reset_tool(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.utility = None;
        self.tool = Box::new(SelectTool::new());
        self.tool_kind = W::select_kind();
    }

    /// Replaces a finished tool with the one it asks for.
    fn finish_tool(&mut self) {
        let next = self.tool.next_tool();
        if let Err(e) = self.engage(next) {
            tracing::debug!("Follow-up tool unavailable: {}", e);
        }
    }

    fn ensure_idle(&self) -> EditorResult<()> {
        if self.in_flight.is_some() {
            return Err(EditorError::Busy {
                operation: self.tool.name().to_string(),
            });
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    fn snapped(&self, raw: Coord) -> Coord {
        snap(raw, &self.settings.snap, self.workspace.stores())
    }

    /// Feeds a click at the raw pointer position to the active tool.
    pub fn on_click(&mut self, raw: Coord) -> StatusMessage {
        if let Err(e) = self.ensure_idle() {
            return self.report((&e).into());
        }
        let point = self.snapped(raw);
        let step = self.tool.click(point, &context!(self));
        self.handle(step)
    }

    /// Feeds a button release; only drag-aware tools respond.
    pub fn on_click_release(&mut self, raw: Coord) -> Option<StatusMessage> {
        if self.ensure_idle().is_err() {
            return None;
        }
        let point = self.snapped(raw);
        match self.tool.click_release(point, &context!(self)) {
            Ok(None) => None,
            Ok(Some(step)) => Some(self.handle(Ok(step))),
            Err(e) => Some(self.handle(Err(e))),
        }
    }

    /// Refreshes the utility geometry for the pointer at `raw`.
    pub fn on_move(&mut self, raw: Coord) -> Option<&GeometryValue> {
        let point = self.snapped(raw);
        self.utility = self.tool.utility_geometry(point, &context!(self));
        self.utility.as_ref()
    }

    /// Feeds a key. Escape always returns to the select tool.
    pub fn on_key(&mut self, key: ToolKey) -> Option<StatusMessage> {
        if key == ToolKey::Escape {
            return Some(self.escape());
        }
        if let Err(e) = self.ensure_idle() {
            return Some(self.report((&e).into()));
        }
        match self.tool.on_key(key, &context!(self)) {
            Ok(None) => None,
            Ok(Some(step)) => Some(self.handle(Ok(step))),
            Err(e) => Some(self.handle(Err(e))),
        }
    }

    fn handle(&mut self, step: EditorResult<ToolStep<W>>) -> StatusMessage {
        match step {
            Err(e) => {
                tracing::warn!("{} tool: {}", self.tool.name(), e);
                self.report((&e).into())
            }
            Ok(ToolStep::Pending(message)) => self.report(message),
            Ok(ToolStep::Apply(edit)) => {
                let message = self.apply_edit(edit);
                self.report(message)
            }
            Ok(ToolStep::Complete(edit)) => {
                let message = self.apply_edit(edit);
                if !message.is_failure() {
                    self.finish_tool();
                }
                self.utility = None;
                self.report(message)
            }
            Ok(ToolStep::Deferred { message, job }) => {
                tracing::debug!("Queued {} job for generation {}", self.tool.name(), self.generation);
                self.in_flight = Some(self.generation);
                self.worker.enqueue(self.generation, job);
                let started = self.report(message);
                self.poll_worker().pop().unwrap_or(started)
            }
        }
    }

    /// Applies finished deferred steps. Results whose generation is stale
    /// are dropped.
    pub fn poll_worker(&mut self) -> Vec<StatusMessage> {
        let mut messages = Vec::new();
        while let Some(Completion { generation, result }) = self.worker.try_next() {
            if self.in_flight == Some(generation) {
                self.in_flight = None;
            }
            if generation != self.generation {
                tracing::debug!(
                    "Dropping result of generation {} (current {})",
                    generation,
                    self.generation
                );
                continue;
            }
            let message = match result {
                Ok(edit) => {
                    let message = self.apply_edit(edit);
                    if !message.is_failure() {
                        self.finish_tool();
                    }
                    message
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}", self.tool.name(), e);
                    (&e).into()
                }
            };
            messages.push(self.report(message));
        }
        messages
    }

    // -----------------------------------------------------------------
    // Edits and selection
    // -----------------------------------------------------------------

    /// Applies `edit` as a unit. Every new value is checked before anything
    /// is touched.
    fn apply_edit(&mut self, edit: Edit<W>) -> StatusMessage {
        let incoming = edit.add.iter().chain(edit.replace.iter().map(|(_, v)| v));
        for value in incoming {
            if let Err(e) = self.workspace.check(value) {
                tracing::warn!("Edit rejected: {}", e);
                return (&e).into();
            }
        }

        let before: Vec<W::Ref> = self.selection.iter().collect();
        let (removed, replaced, added_count) = (edit.remove.len(), edit.replace.len(), edit.add.len());

        for r in &edit.remove {
            if self.workspace.remove(*r).is_none() {
                tracing::debug!("{} already removed", r);
            }
        }

        let mut renamed = Vec::new();
        for (r, value) in edit.replace {
            match self.workspace.replace(r, value) {
                Ok(new) if new != r => renamed.push((r, new)),
                Ok(_) => {}
                Err(e) => tracing::warn!("Could not replace {}: {}", r, e),
            }
        }

        let mut added = Vec::new();
        for value in edit.add {
            match self.workspace.add(value) {
                Ok(r) => added.push(r),
                Err(e) => tracing::warn!("Could not add shape: {}", e),
            }
        }

        match edit.selection {
            SelectionChange::Keep => {}
            SelectionChange::Replace(refs) => self.selection.replace(refs),
            SelectionChange::SelectAdded => self.selection.replace(added),
        }
        for (old, new) in renamed {
            if self.selection.contains(old) {
                self.selection.deselect(old);
                self.selection.select(new);
            }
        }
        let workspace = &self.workspace;
        self.selection.retain(|r| workspace.contains(*r));

        if self.selection.as_slice() != before.as_slice() {
            self.generation += 1;
        }
        tracing::debug!(
            "Applied edit: {} removed, {} replaced, {} added",
            removed,
            replaced,
            added_count
        );
        edit.message
    }

    pub fn select_all(&mut self) -> StatusMessage {
        let refs = self.workspace.refs();
        let count = refs.len();
        self.set_selection(refs);
        self.report(StatusMessage::info(format!("Selected {} shapes", count)))
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Vec::new());
    }

    fn set_selection(&mut self, refs: Vec<W::Ref>) {
        if self.selection.as_slice() != refs.as_slice() {
            self.selection.replace(refs);
            self.generation += 1;
        }
    }

    /// Removes every selected shape.
    pub fn delete_selected(&mut self) -> StatusMessage {
        if let Err(e) = self.ensure_idle() {
            return self.report((&e).into());
        }
        if self.selection.is_empty() {
            let e = EditorError::insufficient_selection("delete", 1, 0);
            return self.report((&e).into());
        }
        let refs: Vec<W::Ref> = self.selection.iter().collect();
        let count = refs.len();
        let edit = Edit::new(StatusMessage::success(format!("Deleted {} shapes", count)))
            .removing(refs)
            .with_selection(SelectionChange::Replace(Vec::new()));
        let message = self.apply_edit(edit);
        self.report(message)
    }

    /// Applies the outcome of a session-level operation.
    fn apply_operation(&mut self, operation: &str, result: EditorResult<Edit<W>>) -> StatusMessage {
        if let Err(e) = self.ensure_idle() {
            return self.report((&e).into());
        }
        match result {
            Ok(edit) => {
                tracing::info!("{} applied", operation);
                let message = self.apply_edit(edit);
                self.report(message)
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", operation, e);
                self.report((&e).into())
            }
        }
    }

    // -----------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------

    /// Pushes every shape, the selection and the utility geometry to
    /// `canvas`.
    pub fn replot(&self, canvas: &mut dyn Canvas) {
        canvas.clear();
        for r in self.workspace.refs() {
            let Some(value) = self.workspace.geometry(r) else {
                continue;
            };
            let layer = if self.selection.contains(r) {
                Layer::Selection
            } else {
                Layer::Shapes
            };
            canvas.draw(&value.geometry, self.palette.color_for(layer), layer);
        }
        if let Some(utility) = &self.utility {
            canvas.draw(
                &utility.geometry,
                self.palette.color_for(Layer::Utility),
                Layer::Utility,
            );
        }
    }

    fn report(&mut self, message: StatusMessage) -> StatusMessage {
        match message.level {
            MessageLevel::Warning | MessageLevel::Error => tracing::debug!("{}", message),
            _ => tracing::trace!("{}", message),
        }
        self.last_message = Some(message.clone());
        message
    }
}

// ---------------------------------------------------------------------------
// Geometry editor
// ---------------------------------------------------------------------------

/// Splits multi-part geometry into single shapes.
fn explode(geometry: Geometry) -> Vec<Geometry> {
    match geometry {
        Geometry::MultiPolygon(mp) => mp.0.into_iter().map(Geometry::Polygon).collect(),
        Geometry::MultiLineString(ml) => ml.0.into_iter().map(Geometry::LineString).collect(),
        Geometry::Collection(parts) => parts.into_iter().flat_map(explode).collect(),
        other => vec![other],
    }
}

impl Session<SpatialShapeStore> {
    fn selected_shapes(&self) -> Vec<GeometryValue> {
        self.selection
            .iter()
            .filter_map(|id| self.workspace.get(id).cloned())
            .collect()
    }

    /// Replaces the selected shapes by their union.
    pub fn union_selected(&mut self) -> StatusMessage {
        let result = ops::union(&self.selected_shapes()).map(|geometry| {
            Edit::new(StatusMessage::success("Union done"))
                .removing(self.selection.iter())
                .adding([GeometryValue::new(geometry)])
                .with_selection(SelectionChange::SelectAdded)
        });
        self.apply_operation("union", result)
    }

    /// Replaces the selected shapes by their common area.
    pub fn intersection_selected(&mut self) -> StatusMessage {
        let result = ops::intersection(&self.selected_shapes()).map(|geometry| {
            Edit::new(StatusMessage::success("Intersection done"))
                .removing(self.selection.iter())
                .adding([GeometryValue::new(geometry)])
                .with_selection(SelectionChange::SelectAdded)
        });
        self.apply_operation("intersection", result)
    }

    /// Subtracts the other selected shapes from the first one selected.
    pub fn subtract_selected(&mut self) -> StatusMessage {
        let shapes = self.selected_shapes();
        let result = match (self.selection.first(), shapes.split_first()) {
            (Some(target_id), Some((target, tools))) => {
                ops::subtract(target, tools).map(|geometry| {
                    Edit::new(StatusMessage::success("Subtraction done"))
                        .removing([target_id])
                        .adding([GeometryValue::new(geometry)])
                        .with_selection(SelectionChange::SelectAdded)
                })
            }
            _ => Err(EditorError::insufficient_selection("subtract", 2, 0)),
        };
        self.apply_operation("subtract", result)
    }

    /// Cuts the first selected shape along the other selected shapes.
    pub fn cut_selected(&mut self) -> StatusMessage {
        let shapes = self.selected_shapes();
        let result = match (self.selection.first(), shapes.split_first()) {
            (Some(target_id), Some((target, tools))) => {
                ops::cut_along_path(target, tools).map(|pieces| {
                    Edit::new(StatusMessage::success(format!("Cut into {} pieces", pieces.len())))
                        .removing([target_id])
                        .adding(pieces.into_iter().map(GeometryValue::new))
                        .with_selection(SelectionChange::SelectAdded)
                })
            }
            _ => Err(EditorError::insufficient_selection("cut", 2, 0)),
        };
        self.apply_operation("cut", result)
    }

    /// Geometry of every stored shape, in insertion order.
    pub fn commit(&self) -> Vec<Geometry> {
        self.workspace
            .enumerate()
            .filter(|(_, v)| !v.is_utility)
            .map(|(_, v)| v.geometry.clone())
            .collect()
    }

    /// Replaces the session content. Multi-part geometry is split so each
    /// polygon and line becomes its own editable shape; empty parts are
    /// skipped. Returns the number of shapes loaded.
    pub fn load(&mut self, geometries: impl IntoIterator<Item = Geometry>) -> usize {
        self.workspace.clear();
        self.selection.clear();
        self.reset_tool();

        let mut loaded = 0;
        for geometry in geometries.into_iter().flat_map(explode) {
            match self.workspace.insert(GeometryValue::new(geometry)) {
                Ok(_) => loaded += 1,
                Err(e) => tracing::warn!("Skipping shape on load: {}", e),
            }
        }
        tracing::info!("Loaded {} shapes into the geometry editor", loaded);
        loaded
    }
}

// ---------------------------------------------------------------------------
// Drill editor
// ---------------------------------------------------------------------------

impl Session<DrillStores> {
    /// Registers a drill diameter and makes it the active one.
    pub fn add_diameter(&mut self, value: f64) -> EditorResult<Diameter> {
        let diameter = Diameter::new(value)?;
        if !self.workspace.add_diameter(diameter) {
            tracing::debug!("Diameter {} already present", diameter);
        }
        self.workspace.set_active(Some(diameter));
        Ok(diameter)
    }

    /// Drops a diameter together with its drills.
    pub fn remove_diameter(&mut self, diameter: Diameter) -> EditorResult<usize> {
        self.ensure_idle()?;
        let store = self.workspace.remove_diameter(diameter).ok_or_else(|| {
            EditorError::invalid_parameter("diameter", format!("{} is not in use", diameter))
        })?;
        let before = self.selection.len();
        self.selection.retain(|r| r.diameter != diameter);
        if self.selection.len() != before {
            self.generation += 1;
        }
        Ok(store.len())
    }

    /// Selects the diameter new drills are added with.
    pub fn set_active_diameter(&mut self, diameter: Diameter) -> EditorResult<()> {
        if self.workspace.store(diameter).is_none() {
            return Err(EditorError::invalid_parameter(
                "diameter",
                format!("{} is not in use", diameter),
            ));
        }
        self.workspace.set_active(Some(diameter));
        Ok(())
    }

    /// Rescales every drill of the `from` diameters to `to`.
    pub fn resize_drills(&mut self, from: Vec<Diameter>, to: Diameter) -> StatusMessage {
        let active = self.workspace.active();
        let engaged = self.select_tool(DrillToolKind::Resize {
            from: from.clone(),
            to,
        });
        if engaged.is_failure() {
            return engaged;
        }
        let message = self
            .on_key(ToolKey::Enter)
            .unwrap_or_else(|| StatusMessage::info("Nothing to resize"));
        if !message.is_failure() && active.is_some_and(|a| from.contains(&a)) {
            self.workspace.set_active(Some(to));
        }
        message
    }

    /// Drill centers grouped by diameter, smallest diameter first.
    pub fn commit_drills(&self) -> Vec<(Diameter, Vec<Coord>)> {
        self.workspace
            .diameters()
            .filter_map(|d| {
                let store = self.workspace.store(d)?;
                let centers: Vec<Coord> = store
                    .enumerate()
                    .filter_map(|(_, v)| v.geometry.centroid())
                    .collect();
                (!centers.is_empty()).then_some((d, centers))
            })
            .collect()
    }

    /// Replaces the session content with drills at the given centers.
    pub fn load_drills(
        &mut self,
        drills: impl IntoIterator<Item = (Diameter, Vec<Coord>)>,
    ) -> usize {
        self.workspace.clear();
        self.workspace.set_active(None);
        self.selection.clear();
        self.reset_tool();

        let mut loaded = 0;
        for (diameter, centers) in drills {
            self.workspace.add_diameter(diameter);
            for center in centers {
                let shape = DrillShape {
                    diameter,
                    value: GeometryValue::new(drill_cross(center, diameter.value())),
                };
                match self.workspace.add(shape) {
                    Ok(_) => loaded += 1,
                    Err(e) => tracing::warn!("Skipping drill on load: {}", e),
                }
            }
        }
        tracing::info!("Loaded {} drills into the drill editor", loaded);
        loaded
    }
}
