//! Drill editor tools.
//!
//! Adding drills needs an active diameter. Selection, move and copy are the
//! generic tools working across every diameter bucket.

use super::array::{ArrayGenerator, ArrayParams};
use super::{Diameter, DrillRef, DrillShape, DrillStores};
use crate::geometry::{Geometry, GeometryValue};
use crate::primitives::drill_cross;
use crate::tools::{
    Edit, MoveMode, MoveTool, SelectTool, SelectionChange, Tool, ToolContext, ToolState, ToolStep,
};
use crate::transform::scale;
use geo::Coord;
use geoedit_core::{EditorError, EditorResult, StatusMessage};
use serde::{Deserialize, Serialize};

type Ctx<'a> = ToolContext<'a, DrillStores>;
type Step = ToolStep<DrillStores>;

/// Tools of the drill editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillToolKind {
    Select,
    Add,
    Array(ArrayParams),
    /// Rescale every drill of the `from` diameters to `to`.
    Resize { from: Vec<Diameter>, to: Diameter },
    Move,
    Copy,
}

/// Engages a drill editor tool.
pub fn build_drill_tool(
    kind: &DrillToolKind,
    ctx: &Ctx<'_>,
) -> EditorResult<Box<dyn Tool<DrillStores>>> {
    let tool: Box<dyn Tool<DrillStores>> = match kind {
        DrillToolKind::Select => Box::new(SelectTool::new()),
        DrillToolKind::Add => Box::new(DrillAddTool::new(ctx)?),
        DrillToolKind::Array(params) => Box::new(DrillArrayTool::new(*params, ctx)?),
        DrillToolKind::Resize { from, to } => {
            Box::new(DrillResizeTool::new(from.clone(), *to, ctx)?)
        }
        DrillToolKind::Move => Box::new(MoveTool::new(MoveMode::Move, ctx)?),
        DrillToolKind::Copy => Box::new(MoveTool::new(MoveMode::Copy, ctx)?),
    };
    tracing::debug!("Engaged drill {} tool", tool.name());
    Ok(tool)
}

fn active_diameter(ctx: &Ctx<'_>) -> EditorResult<Diameter> {
    ctx.workspace.active().ok_or(EditorError::NoToolSelected)
}

fn marker(diameter: Diameter, at: Coord) -> DrillShape {
    DrillShape {
        diameter,
        value: GeometryValue::new(drill_cross(at, diameter.value())),
    }
}

/// Adds one drill of the active diameter per click.
pub struct DrillAddTool {
    diameter: Diameter,
    done: bool,
}

impl DrillAddTool {
    /// Fails with [`EditorError::NoToolSelected`] when no diameter is active.
    pub fn new(ctx: &Ctx<'_>) -> EditorResult<Self> {
        Ok(Self {
            diameter: active_diameter(ctx)?,
            done: false,
        })
    }
}

impl Tool<DrillStores> for DrillAddTool {
    fn name(&self) -> &'static str {
        "drill add"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(0)
        }
    }

    fn click(&mut self, point: Coord, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        self.done = true;
        Ok(ToolStep::Complete(
            Edit::new(StatusMessage::success(format!(
                "Drill D{} added",
                self.diameter
            )))
            .adding([marker(self.diameter, point)]),
        ))
    }

    fn utility_geometry(&self, cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        Some(GeometryValue::utility(drill_cross(cursor, self.diameter.value())))
    }

    fn make(&mut self, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        Ok(ToolStep::Pending(StatusMessage::info(
            "Click to place a drill",
        )))
    }

    fn next_tool(&self) -> DrillToolKind {
        DrillToolKind::Add
    }
}

/// Linear array: one click at the first drill. Circular array: the center,
/// then the first drill.
pub struct DrillArrayTool {
    params: ArrayParams,
    diameter: Diameter,
    points: Vec<Coord>,
    done: bool,
}

impl DrillArrayTool {
    /// Fails when no diameter is active or the parameters are invalid.
    pub fn new(params: ArrayParams, ctx: &Ctx<'_>) -> EditorResult<Self> {
        let diameter = active_diameter(ctx)?;
        params.validate()?;
        Ok(Self {
            params,
            diameter,
            points: Vec::new(),
            done: false,
        })
    }
}

impl Tool<DrillStores> for DrillArrayTool {
    fn name(&self) -> &'static str {
        "drill array"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(self.points.len())
        }
    }

    fn click(&mut self, point: Coord, ctx: &Ctx<'_>) -> EditorResult<Step> {
        self.points.push(point);
        if self.points.len() < self.params.clicks() {
            return Ok(ToolStep::Pending(StatusMessage::info(
                "Click on the first drill position",
            )));
        }
        let made = self.make(ctx);
        if made.is_err() {
            self.points.pop();
        }
        made
    }

    fn utility_geometry(&self, cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        let mut clicks = self.points.clone();
        clicks.push(cursor);
        let positions = ArrayGenerator::generate(&self.params, &clicks).ok()?;
        let parts = positions
            .into_iter()
            .map(|p| drill_cross(p, self.diameter.value()))
            .collect();
        Geometry::from_parts(parts).map(GeometryValue::utility)
    }

    fn make(&mut self, _ctx: &Ctx<'_>) -> EditorResult<Step> {
        let positions = ArrayGenerator::generate(&self.params, &self.points)?;
        tracing::info!("Drill array of {} at D{}", positions.len(), self.diameter);
        self.done = true;
        Ok(ToolStep::Complete(
            Edit::new(StatusMessage::success(format!(
                "Added {} drills",
                positions.len()
            )))
            .adding(positions.into_iter().map(|p| marker(self.diameter, p))),
        ))
    }

    fn next_tool(&self) -> DrillToolKind {
        DrillToolKind::Array(self.params)
    }
}

/// Moves every drill of the source diameters into the target bucket,
/// scaling each marker about its centroid.
pub struct DrillResizeTool {
    from: Vec<Diameter>,
    to: Diameter,
    done: bool,
}

impl DrillResizeTool {
    /// Fails when no source diameter is given or one of them does not exist.
    pub fn new(from: Vec<Diameter>, to: Diameter, ctx: &Ctx<'_>) -> EditorResult<Self> {
        if from.is_empty() {
            return Err(EditorError::insufficient_selection("resize", 1, 0));
        }
        if let Some(missing) = from.iter().find(|d| ctx.workspace.store(**d).is_none()) {
            return Err(EditorError::invalid_parameter(
                "diameter",
                format!("no drills of diameter {}", missing),
            ));
        }
        Ok(Self {
            from,
            to,
            done: false,
        })
    }
}

impl Tool<DrillStores> for DrillResizeTool {
    fn name(&self) -> &'static str {
        "drill resize"
    }

    fn state(&self) -> ToolState {
        if self.done {
            ToolState::Complete
        } else {
            ToolState::AwaitingInput(0)
        }
    }

    fn click(&mut self, _point: Coord, ctx: &Ctx<'_>) -> EditorResult<Step> {
        self.make(ctx)
    }

    fn utility_geometry(&self, _cursor: Coord, _ctx: &Ctx<'_>) -> Option<GeometryValue> {
        None
    }

    fn make(&mut self, ctx: &Ctx<'_>) -> EditorResult<Step> {
        let mut edit = Edit::new(StatusMessage::info(String::new()))
            .with_selection(SelectionChange::SelectAdded);
        for diameter in self.from.iter().copied().filter(|d| *d != self.to) {
            let Some(store) = ctx.workspace.store(diameter) else {
                continue;
            };
            let factor = self.to.value() / diameter.value();
            for (id, value) in store.enumerate() {
                let origin = value.geometry.centroid().ok_or(EditorError::EmptyGeometry)?;
                edit = edit
                    .removing([DrillRef { diameter, id }])
                    .adding([DrillShape {
                        diameter: self.to,
                        value: scale(value, factor, None, origin),
                    }]);
            }
        }
        if edit.add.is_empty() {
            return Err(EditorError::empty_result("resize"));
        }

        tracing::info!("Resized {} drills to D{}", edit.add.len(), self.to);
        edit.message = StatusMessage::success(format!(
            "Resized {} drills to {}",
            edit.add.len(),
            self.to
        ));
        self.done = true;
        Ok(ToolStep::Complete(edit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::{ArrayLayout, LinearAxis};
    use crate::geometry::coord;
    use crate::selection::Selection;
    use crate::workspace::Workspace;
    use geoedit_settings::EditorSettings;

    fn ctx_for<'a>(
        stores: &'a DrillStores,
        selection: &'a Selection<DrillRef>,
        settings: &'a EditorSettings,
    ) -> Ctx<'a> {
        ToolContext {
            workspace: stores,
            selection,
            settings,
            modifiers: Default::default(),
        }
    }

    #[test]
    fn test_add_requires_active_diameter() {
        let stores = DrillStores::new();
        let selection = Selection::new();
        let settings = EditorSettings::default();
        let ctx = ctx_for(&stores, &selection, &settings);
        assert!(matches!(
            build_drill_tool(&DrillToolKind::Add, &ctx),
            Err(EditorError::NoToolSelected)
        ));
    }

    #[test]
    fn test_linear_array_markers() {
        let mut stores = DrillStores::new();
        stores.set_active(Some(Diameter::new(0.8).unwrap()));
        let selection = Selection::new();
        let settings = EditorSettings::default();
        let ctx = ctx_for(&stores, &selection, &settings);

        let params = ArrayParams::new(
            3,
            ArrayLayout::Linear {
                axis: LinearAxis::X,
                pitch: 2.0,
            },
        );
        let mut tool = DrillArrayTool::new(params, &ctx).unwrap();
        let ToolStep::Complete(edit) = tool.click(coord(0.0, 0.0), &ctx).unwrap() else {
            panic!("linear array completes on one click");
        };
        assert_eq!(edit.add.len(), 3);
        let last = edit.add[2].value.geometry.centroid().unwrap();
        assert!((last.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_scales_about_centroid() {
        let mut stores = DrillStores::new();
        let small = Diameter::new(1.0).unwrap();
        let big = Diameter::new(2.0).unwrap();
        stores.add(marker(small, coord(5.0, 5.0))).unwrap();
        let selection = Selection::new();
        let settings = EditorSettings::default();
        let ctx = ctx_for(&stores, &selection, &settings);

        let mut tool = DrillResizeTool::new(vec![small], big, &ctx).unwrap();
        let ToolStep::Complete(edit) = tool.make(&ctx).unwrap() else {
            panic!("resize completes immediately");
        };
        assert_eq!(edit.remove.len(), 1);
        let shape = &edit.add[0];
        assert_eq!(shape.diameter, big);
        let rect = shape.value.geometry.bounding_rect().unwrap();
        assert!((rect.width() - 2.0).abs() < 1e-9);
        assert!((rect.center().x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_unknown_diameter() {
        let stores = DrillStores::new();
        let selection = Selection::new();
        let settings = EditorSettings::default();
        let ctx = ctx_for(&stores, &selection, &settings);
        let d = Diameter::new(1.0).unwrap();
        assert!(DrillResizeTool::new(vec![d], d, &ctx).is_err());
        assert!(DrillResizeTool::new(vec![], d, &ctx).is_err());
    }
}
