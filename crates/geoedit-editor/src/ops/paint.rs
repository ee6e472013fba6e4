//! Paint: fill the interior of shapes with pocket-clearing paths.

use super::buffer::offset_polygon;
use super::clearing::kernel_for;
use crate::geometry::{Geometry, GeometryValue};
use geo::MultiLineString;
use geoedit_core::{EditorError, EditorResult};
use geoedit_settings::{JoinStyle, PaintMethod, PaintSettings};
use serde::{Deserialize, Serialize};

/// Smallest distance between successive clearing passes.
pub const MIN_STEP_OVER: f64 = 1e-3;

/// Parameters of a paint run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintParams {
    pub tool_diameter: f64,
    /// Fraction of the tool diameter shared by successive passes, `[0, 1)`.
    pub overlap: f64,
    /// Distance kept from the shape boundary.
    pub margin: f64,
    pub connect: bool,
    pub contour: bool,
    pub method: PaintMethod,
    pub steps_per_circle: u32,
}

impl PaintParams {
    pub fn from_settings(settings: &PaintSettings, steps_per_circle: u32) -> Self {
        Self {
            tool_diameter: settings.tool_diameter,
            overlap: settings.overlap,
            margin: settings.margin,
            connect: settings.connect,
            contour: settings.contour,
            method: settings.method,
            steps_per_circle,
        }
    }

    pub fn validate(&self) -> EditorResult<()> {
        if !(self.tool_diameter > 0.0 && self.tool_diameter.is_finite()) {
            return Err(EditorError::invalid_parameter("tool_diameter", "must be > 0"));
        }
        if !(self.overlap >= 0.0 && self.overlap < 1.0) {
            return Err(EditorError::invalid_parameter(
                "overlap",
                "must be in the range [0, 1)",
            ));
        }
        let step_over = self.tool_diameter * (1.0 - self.overlap);
        if step_over < MIN_STEP_OVER {
            return Err(EditorError::invalid_parameter(
                "overlap",
                format!("step-over {} is below {}", step_over, MIN_STEP_OVER),
            ));
        }
        if !(self.margin >= 0.0 && self.margin.is_finite()) {
            return Err(EditorError::invalid_parameter("margin", "must be >= 0"));
        }
        Ok(())
    }
}

/// Paints every shape, producing one multi line string per shape that has
/// paintable area.
///
/// Each shape is flattened to its polygons (holes kept), shrunk by the
/// margin, and handed to the clearing kernel for `params.method`; the
/// partial results of one shape are merged into a single geometry.
pub fn paint(shapes: &[GeometryValue], params: &PaintParams) -> EditorResult<Vec<Geometry>> {
    params.validate()?;
    if shapes.is_empty() {
        return Err(EditorError::insufficient_selection("paint", 1, 0));
    }

    let kernel = kernel_for(params.method);
    let mut results = Vec::new();
    for shape in shapes {
        let polygons = shape.geometry.polygons();
        if polygons.is_empty() {
            tracing::warn!("Skipping {} in paint: no area to fill", shape.kind());
            continue;
        }

        let mut lines = Vec::new();
        for polygon in &polygons {
            for inner in offset_polygon(
                polygon,
                -params.margin,
                JoinStyle::Round,
                params.steps_per_circle,
            ) {
                let cleared = kernel.clear_polygon(
                    &inner,
                    params.tool_diameter,
                    params.steps_per_circle,
                    params.overlap,
                    params.contour,
                    params.connect,
                );
                if let Some(cleared) = cleared {
                    lines.extend(cleared.boundary_lines());
                }
            }
        }

        if !lines.is_empty() {
            results.push(Geometry::MultiLineString(MultiLineString::new(lines)));
        }
    }

    if results.is_empty() {
        return Err(EditorError::empty_result("paint"));
    }
    tracing::debug!("Painted {} of {} shapes", results.len(), shapes.len());
    Ok(results)
}
