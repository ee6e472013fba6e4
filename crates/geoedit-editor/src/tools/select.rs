//! Click and drag selection.
//!
//! A click selects the shape owning the vertex nearest to the pointer.
//! When several shapes share that vertex, repeated clicks on the same spot
//! cycle through them. Holding the multi-select modifier toggles the hit in
//! and out of the selection instead of replacing it.
//!
//! A drag selects by rectangle: dragged left to right it picks shapes lying
//! entirely inside, right to left any shape the rectangle touches.

use super::{Edit, Tool, ToolContext, ToolState, ToolStep};
use crate::geometry::{distance, Geometry, GeometryValue};
use crate::primitives::rectangle;
use crate::workspace::Workspace;
use geo::{Coord, Intersects, Point, Polygon, Rect};
use geoedit_core::{EditorError, EditorResult, StatusMessage};
use smallvec::SmallVec;

/// Shapes whose nearest vertices lie this close together count as
/// overlapping candidates for one click.
const COINCIDENT_TOLERANCE: f64 = 1e-9;

/// Pointer travel below which a press and release is a click, not a drag.
const DRAG_THRESHOLD: f64 = 1e-6;

struct Cycle<R> {
    point: Coord,
    candidates: SmallVec<[R; 4]>,
    index: usize,
}

pub struct SelectTool<W: Workspace> {
    cycle: Option<Cycle<W::Ref>>,
    drag_start: Option<Coord>,
}

impl<W: Workspace> SelectTool<W> {
    pub fn new() -> Self {
        Self {
            cycle: None,
            drag_start: None,
        }
    }

    /// Next of `candidates`, advancing the cycle on repeated clicks.
    fn pick(&mut self, click: Coord, candidates: SmallVec<[W::Ref; 4]>) -> Option<W::Ref> {
        let index = match &self.cycle {
            Some(c)
                if distance(c.point, click) <= DRAG_THRESHOLD && c.candidates == candidates =>
            {
                (c.index + 1) % candidates.len().max(1)
            }
            _ => 0,
        };
        let chosen = candidates.get(index).copied();
        self.cycle = Some(Cycle {
            point: click,
            candidates,
            index,
        });
        chosen
    }

    fn select_in_rect(&self, start: Coord, end: Coord, ctx: &ToolContext<'_, W>) -> ToolStep<W> {
        let rect = Rect::new(start, end);
        let window = rectangle(start, end);
        let enclosing = end.x >= start.x;

        let hits: Vec<W::Ref> = ctx
            .workspace
            .refs()
            .into_iter()
            .filter(|r| {
                ctx.workspace.geometry(*r).is_some_and(|v| {
                    if enclosing {
                        inside(&v.geometry, &rect)
                    } else {
                        touches(&v.geometry, &window)
                    }
                })
            })
            .collect();

        let mut refs: Vec<W::Ref> = if ctx.additive() {
            ctx.selection.iter().collect()
        } else {
            Vec::new()
        };
        for r in &hits {
            if !refs.contains(r) {
                refs.push(*r);
            }
        }
        tracing::debug!("Rectangle selection hit {} shapes", hits.len());
        ToolStep::Apply(Edit::select(
            refs,
            StatusMessage::info(format!("Selected {} shapes", hits.len())),
        ))
    }
}

impl<W: Workspace> Default for SelectTool<W> {
    fn default() -> Self {
        Self::new()
    }
}

fn inside(geometry: &Geometry, rect: &Rect) -> bool {
    geometry.bounding_rect().is_some_and(|b| {
        b.min().x >= rect.min().x
            && b.min().y >= rect.min().y
            && b.max().x <= rect.max().x
            && b.max().y <= rect.max().y
    })
}

fn touches(geometry: &Geometry, window: &Polygon) -> bool {
    geometry.polygons().iter().any(|p| window.intersects(p))
        || geometry.boundary_lines().iter().any(|l| window.intersects(l))
        || geometry.points().into_iter().any(|c| window.intersects(&Point::from(c)))
}

impl<W: Workspace> Tool<W> for SelectTool<W> {
    fn name(&self) -> &'static str {
        "select"
    }

    fn state(&self) -> ToolState {
        ToolState::AwaitingInput(self.drag_start.map_or(0, |_| 1))
    }

    fn click(&mut self, point: Coord, ctx: &ToolContext<'_, W>) -> EditorResult<ToolStep<W>> {
        self.drag_start = Some(point);

        let vertex = match ctx.workspace.nearest(point) {
            Ok((vertex, _)) => vertex,
            Err(EditorError::EmptyStore) => {
                return Ok(ToolStep::Pending(StatusMessage::info("Nothing to select")))
            }
            Err(e) => return Err(e),
        };
        let candidates: SmallVec<[W::Ref; 4]> = ctx
            .workspace
            .refs_near(vertex, COINCIDENT_TOLERANCE)
            .into_iter()
            .collect();
        let Some(chosen) = self.pick(point, candidates) else {
            return Ok(ToolStep::Pending(StatusMessage::info("Nothing to select")));
        };

        let refs: Vec<W::Ref> = if ctx.additive() {
            let mut refs: Vec<W::Ref> = ctx.selection.iter().filter(|r| *r != chosen).collect();
            if !ctx.selection.contains(chosen) {
                refs.push(chosen);
            }
            refs
        } else {
            vec![chosen]
        };

        let text = if refs.contains(&chosen) {
            format!("Selected {}", chosen)
        } else {
            format!("Deselected {}", chosen)
        };
        Ok(ToolStep::Apply(Edit::select(refs, StatusMessage::info(text))))
    }

    fn click_release(
        &mut self,
        point: Coord,
        ctx: &ToolContext<'_, W>,
    ) -> EditorResult<Option<ToolStep<W>>> {
        let Some(start) = self.drag_start.take() else {
            return Ok(None);
        };
        if distance(start, point) <= DRAG_THRESHOLD {
            return Ok(None);
        }
        self.cycle = None;
        Ok(Some(self.select_in_rect(start, point, ctx)))
    }

    fn utility_geometry(&self, cursor: Coord, _ctx: &ToolContext<'_, W>) -> Option<GeometryValue> {
        let start = self.drag_start?;
        if distance(start, cursor) <= DRAG_THRESHOLD {
            return None;
        }
        Some(GeometryValue::utility(Geometry::LinearRing(
            rectangle(start, cursor).exterior().clone(),
        )))
    }

    fn make(&mut self, _ctx: &ToolContext<'_, W>) -> EditorResult<ToolStep<W>> {
        Ok(ToolStep::Pending(StatusMessage::info(
            "Click on a shape to select it",
        )))
    }
}
