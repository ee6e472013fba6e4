//! # Drill Array Module
//!
//! Computes drill positions for linear and circular arrays.
//!
//! - Linear arrays step `pitch` apart from the clicked start point along the
//!   X axis, the Y axis, or an arbitrary angle.
//! - Circular arrays place drills `angle_step` degrees apart on the circle
//!   through the clicked start point, around the clicked center. The array
//!   may not wrap past a full turn.

use crate::geometry::{coord, distance};
use crate::primitives::ArcDirection;
use geo::Coord;
use geoedit_core::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Direction of a linear array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearAxis {
    X,
    Y,
    /// Angle in degrees from the X axis, counter-clockwise positive
    Angle(f64),
}

impl LinearAxis {
    fn degrees(self) -> f64 {
        match self {
            Self::X => 0.0,
            Self::Y => 90.0,
            Self::Angle(a) => a,
        }
    }
}

/// Shape of a drill array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayLayout {
    Linear {
        axis: LinearAxis,
        /// Distance between neighbouring drills (mm)
        pitch: f64,
    },
    Circular {
        /// Angle between neighbouring drills in degrees
        angle_step: f64,
        direction: ArcDirection,
    },
}

/// Parameters of a drill array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayParams {
    /// Number of drills, including the first
    pub count: u32,
    pub layout: ArrayLayout,
}

impl ArrayParams {
    pub fn new(count: u32, layout: ArrayLayout) -> Self {
        Self { count, layout }
    }

    /// Number of clicks needed to place the array
    pub fn clicks(&self) -> usize {
        match self.layout {
            ArrayLayout::Linear { .. } => 1,
            ArrayLayout::Circular { .. } => 2,
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> EditorResult<()> {
        if self.count == 0 {
            return Err(EditorError::invalid_parameter("count", "must be > 0"));
        }
        match self.layout {
            ArrayLayout::Linear { axis, pitch } => {
                if !pitch.is_finite() || !axis.degrees().is_finite() {
                    return Err(EditorError::invalid_parameter("pitch", "must be finite"));
                }
            }
            ArrayLayout::Circular { angle_step, .. } => {
                if !(angle_step.is_finite() && angle_step > 0.0) {
                    return Err(EditorError::invalid_parameter("angle_step", "must be > 0"));
                }
                if angle_step * self.count as f64 > 360.0 {
                    return Err(EditorError::invalid_parameter(
                        "angle_step",
                        format!(
                            "{} drills {} degrees apart exceed a full circle",
                            self.count, angle_step
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Generator for drill array positions
pub struct ArrayGenerator;

impl ArrayGenerator {
    /// Drill positions of a linear array starting at `start`
    pub fn generate_linear(params: &ArrayParams, start: Coord) -> EditorResult<Vec<Coord>> {
        params.validate()?;
        let ArrayLayout::Linear { axis, pitch } = params.layout else {
            return Err(EditorError::invalid_parameter("layout", "not a linear array"));
        };

        let angle = axis.degrees().to_radians();
        let (dx, dy) = (pitch * angle.cos(), pitch * angle.sin());
        Ok((0..params.count)
            .map(|i| coord(start.x + dx * i as f64, start.y + dy * i as f64))
            .collect())
    }

    /// Drill positions of a circular array around `center`, beginning at
    /// `start`
    pub fn generate_circular(
        params: &ArrayParams,
        center: Coord,
        start: Coord,
    ) -> EditorResult<Vec<Coord>> {
        params.validate()?;
        let ArrayLayout::Circular {
            angle_step,
            direction,
        } = params.layout
        else {
            return Err(EditorError::invalid_parameter("layout", "not a circular array"));
        };

        let radius = distance(center, start);
        if radius <= 0.0 {
            return Err(EditorError::invalid_parameter(
                "radius",
                "start point must differ from the center",
            ));
        }

        let (dx, dy) = (start.x - center.x, start.y - center.y);
        let mut start_angle = (dy / radius).clamp(-1.0, 1.0).asin();
        if dx < 0.0 {
            start_angle = PI - start_angle;
        }

        let step = match direction {
            ArcDirection::Ccw => angle_step.to_radians(),
            ArcDirection::Cw => -angle_step.to_radians(),
        };
        Ok((0..params.count)
            .map(|i| {
                let a = start_angle + step * i as f64;
                coord(center.x + radius * a.cos(), center.y + radius * a.sin())
            })
            .collect())
    }

    /// Drill positions for the clicked points
    pub fn generate(params: &ArrayParams, clicks: &[Coord]) -> EditorResult<Vec<Coord>> {
        match (params.layout, clicks) {
            (ArrayLayout::Linear { .. }, [start, ..]) => Self::generate_linear(params, *start),
            (ArrayLayout::Circular { .. }, [center, start, ..]) => {
                Self::generate_circular(params, *center, *start)
            }
            _ => Err(EditorError::invalid_parameter(
                "points",
                format!("the array needs {} points", params.clicks()),
            )),
        }
    }
}
