//! # geoedit editor
//!
//! The interactive editing engine behind the geometry editor and the drill
//! editor. It holds shapes in a spatially indexed store, applies affine
//! transforms and boolean operations to them, and drives a set of
//! interaction tools that turn clicks and keys into edits.
//!
//! ## Components
//!
//! - **Geometry**: [`Geometry`] and [`GeometryValue`], the shape values
//! - **Store**: [`SpatialShapeStore`], shapes plus an R-tree of their vertices
//! - **Transforms**: rotate, skew, scale, offset and mirror
//! - **Operations**: union, intersection, subtraction, cut, buffer and paint
//! - **Tools**: the per-click state machines of both editors
//! - **Session**: [`Session`], binding store, selection, tools and canvas
//!
//! ## Architecture
//!
//! ```text
//! Session (events, selection, worker queue)
//!   ├── Tool (select, draw, edit, drill tools)
//!   │     └── Edit (remove / replace / add)
//!   └── Workspace
//!         ├── SpatialShapeStore        (geometry editor)
//!         └── DrillStores              (one store per diameter)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geoedit_editor::{EditorSession, GeometryToolKind};
//! use geoedit_editor::geometry::coord;
//!
//! let mut session = EditorSession::new(Default::default());
//! session.select_tool(GeometryToolKind::Rectangle);
//! session.on_click(coord(0.0, 0.0));
//! session.on_click(coord(10.0, 5.0));
//! let shapes = session.commit();
//! ```

pub mod drill;
pub mod geometry;
pub mod ops;
pub mod primitives;
pub mod render;
pub mod selection;
pub mod session;
pub mod shape_store;
pub mod snap;
pub mod text;
pub mod tools;
pub mod transform;
pub mod workspace;

pub use drill::{
    ArrayLayout, ArrayParams, Diameter, DrillRef, DrillShape, DrillStores, DrillToolKind,
    LinearAxis,
};
pub use geometry::{Geometry, GeometryValue, ShapeKind};
pub use primitives::ArcDirection;
pub use render::{Canvas, Color, Layer, Palette, RecordingCanvas, RenderItem};
pub use selection::Selection;
pub use session::{DrillSession, EditorSession, Session};
pub use shape_store::{ShapeId, SpatialShapeStore};
pub use tools::{
    BufferKind, BufferParams, Edit, GeometryToolKind, Modifiers, ReferencePoint, SelectionChange,
    Tool, ToolContext, ToolKey, ToolState, ToolStep, TransformOp,
};
pub use transform::MirrorAxis;
pub use workspace::Workspace;
