//! The shape container a session edits.
//!
//! The geometry editor edits a single [`SpatialShapeStore`]; the drill
//! editor edits one store per drill diameter. [`Workspace`] is the seam that
//! lets the selection/move tools and the session orchestration serve both.

use crate::geometry::GeometryValue;
use crate::shape_store::{ShapeId, SpatialShapeStore};
use crate::tools::{GeometryToolKind, Tool, ToolContext};
use geo::Coord;
use geoedit_core::EditorResult;
use std::fmt;

/// Shape container edited by a session.
pub trait Workspace: Sized + 'static {
    /// Handle of one stored shape.
    type Ref: Copy + PartialEq + fmt::Debug + fmt::Display + Send + 'static;
    /// What a tool hands over to be stored.
    type Value: Clone + fmt::Debug + Send + 'static;
    /// Identifies a tool that can be engaged on this workspace.
    type ToolKind: Clone + fmt::Debug + PartialEq;

    /// The tool the session falls back to.
    fn select_kind() -> Self::ToolKind;

    /// Creates a tool, checking its engagement preconditions.
    fn build_tool(
        kind: &Self::ToolKind,
        ctx: &ToolContext<'_, Self>,
    ) -> EditorResult<Box<dyn Tool<Self>>>;

    /// Fails if `value` could not be stored.
    fn check(&self, value: &Self::Value) -> EditorResult<()>;
    fn add(&mut self, value: Self::Value) -> EditorResult<Self::Ref>;
    fn remove(&mut self, r: Self::Ref) -> Option<Self::Value>;
    /// Replaces the shape under `r`; returns its (possibly new) handle.
    fn replace(&mut self, r: Self::Ref, value: Self::Value) -> EditorResult<Self::Ref>;
    fn contains(&self, r: Self::Ref) -> bool;
    fn geometry(&self, r: Self::Ref) -> Option<&GeometryValue>;
    /// Stored value of `r` with `f` applied to its geometry.
    fn transformed(
        &self,
        r: Self::Ref,
        f: &dyn Fn(&GeometryValue) -> GeometryValue,
    ) -> Option<Self::Value>;
    /// Every handle, in stable order.
    fn refs(&self) -> Vec<Self::Ref>;
    /// Underlying stores, for snapping.
    fn stores(&self) -> Vec<&SpatialShapeStore>;
    fn nearest(&self, point: Coord) -> EditorResult<(Coord, Self::Ref)>;
    /// Shapes owning a vertex within `radius` of `point`, nearest first.
    fn refs_near(&self, point: Coord, radius: f64) -> Vec<Self::Ref>;
    fn set_tolerance(&mut self, tolerance: Option<f64>);
}

impl Workspace for SpatialShapeStore {
    type Ref = ShapeId;
    type Value = GeometryValue;
    type ToolKind = GeometryToolKind;

    fn select_kind() -> GeometryToolKind {
        GeometryToolKind::Select
    }

    fn build_tool(
        kind: &GeometryToolKind,
        ctx: &ToolContext<'_, Self>,
    ) -> EditorResult<Box<dyn Tool<Self>>> {
        crate::tools::build_geometry_tool(kind, ctx)
    }

    fn check(&self, value: &GeometryValue) -> EditorResult<()> {
        SpatialShapeStore::check(value)
    }

    fn add(&mut self, value: GeometryValue) -> EditorResult<ShapeId> {
        self.insert(value)
    }

    fn remove(&mut self, r: ShapeId) -> Option<GeometryValue> {
        SpatialShapeStore::remove(self, r)
    }

    fn replace(&mut self, r: ShapeId, value: GeometryValue) -> EditorResult<ShapeId> {
        SpatialShapeStore::replace(self, r, value).map(|_| r)
    }

    fn contains(&self, r: ShapeId) -> bool {
        SpatialShapeStore::contains(self, r)
    }

    fn geometry(&self, r: ShapeId) -> Option<&GeometryValue> {
        self.get(r)
    }

    fn transformed(
        &self,
        r: ShapeId,
        f: &dyn Fn(&GeometryValue) -> GeometryValue,
    ) -> Option<GeometryValue> {
        self.get(r).map(f)
    }

    fn refs(&self) -> Vec<ShapeId> {
        self.ids().collect()
    }

    fn stores(&self) -> Vec<&SpatialShapeStore> {
        vec![self]
    }

    fn nearest(&self, point: Coord) -> EditorResult<(Coord, ShapeId)> {
        SpatialShapeStore::nearest(self, point)
    }

    fn refs_near(&self, point: Coord, radius: f64) -> Vec<ShapeId> {
        self.shapes_near(point, radius)
    }

    fn set_tolerance(&mut self, tolerance: Option<f64>) {
        SpatialShapeStore::set_tolerance(self, tolerance)
    }
}
