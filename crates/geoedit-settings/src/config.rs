//! Configuration for the geometry and drill editors
//!
//! Configuration is organized into logical sections:
//! - Snap settings (grid steps, snap distance, corner/grid snap switches)
//! - Selection behaviour (multi-select modifier key)
//! - Geometry resolution (segments per circle, vertex index tolerance)
//! - Buffer, paint and drill-array defaults
//! - Colors pushed to the rendering collaborator
//!
//! Every click and move handler reads these values at the start of the
//! handler; they change only through this surface.

use crate::error::{SettingsError, SettingsResult};
pub use geoedit_core::units::MeasurementSystem;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Grid and corner snapping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapSettings {
    /// Grid step along X
    pub grid_x: f64,
    /// Grid step along Y
    pub grid_y: f64,
    /// Maximum distance at which a pointer snaps to an existing vertex
    pub snap_max: f64,
    /// Snap to vertices of existing shapes
    pub corner_snap: bool,
    /// Snap to grid intersections
    pub grid_snap: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            grid_x: 0.1,
            grid_y: 0.1,
            snap_max: 0.05,
            corner_snap: false,
            grid_snap: true,
        }
    }
}

/// Modifier key that turns a selection click into "add to selection"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MultiSelectKey {
    #[default]
    Control,
    Shift,
}

impl fmt::Display for MultiSelectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Control => write!(f, "Control"),
            Self::Shift => write!(f, "Shift"),
        }
    }
}

/// Corner treatment when offsetting outward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStyle {
    #[default]
    Round,
    Mitre,
    Bevel,
}

impl fmt::Display for JoinStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Round => write!(f, "round"),
            Self::Mitre => write!(f, "mitre"),
            Self::Bevel => write!(f, "bevel"),
        }
    }
}

/// Pocket-clearing strategy used by the paint tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMethod {
    /// Contour-parallel inward offsets
    #[default]
    Standard,
    /// Concentric rings grown from a seed point
    Seed,
    /// Straight raster lines
    Lines,
}

impl fmt::Display for PaintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Seed => write!(f, "seed"),
            Self::Lines => write!(f, "lines"),
        }
    }
}

/// Defaults offered by the paint tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintSettings {
    pub tool_diameter: f64,
    /// Fraction of the tool diameter that successive passes overlap, in `[0, 1)`
    pub overlap: f64,
    /// Distance kept from the polygon boundary
    pub margin: f64,
    pub method: PaintMethod,
    pub connect: bool,
    pub contour: bool,
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            tool_diameter: 1.0,
            overlap: 0.15,
            margin: 0.0,
            method: PaintMethod::Standard,
            connect: true,
            contour: true,
        }
    }
}

/// Defaults offered by the drill array tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillArraySettings {
    pub count: u32,
    /// Distance between drills of a linear array
    pub pitch: f64,
    /// Angle of a linear array measured from the X axis (degrees)
    pub linear_angle: f64,
    /// Angle between drills of a circular array (degrees)
    pub angle_step: f64,
}

impl Default for DrillArraySettings {
    fn default() -> Self {
        Self {
            count: 5,
            pitch: 2.54,
            linear_angle: 0.0,
            angle_step: 12.0,
        }
    }
}

/// Colors pushed to the canvas, as `#RRGGBB` or `#RRGGBBAA`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSettings {
    pub shape: String,
    pub selection: String,
    pub utility: String,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            shape: "#000000FF".to_string(),
            selection: "#0000FFFF".to_string(),
            utility: "#00000080".to_string(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub units: MeasurementSystem,
    #[serde(default)]
    pub snap: SnapSettings,
    #[serde(default)]
    pub multi_select_key: MultiSelectKey,
    /// Segments used to approximate a full circle
    pub steps_per_circle: u32,
    /// When set, shapes are simplified with this tolerance before their
    /// vertices are indexed for snapping and selection
    #[serde(default)]
    pub index_tolerance: Option<f64>,
    #[serde(default)]
    pub buffer_join: JoinStyle,
    #[serde(default)]
    pub paint: PaintSettings,
    #[serde(default)]
    pub drill_array: DrillArraySettings,
    #[serde(default)]
    pub colors: ColorSettings,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            units: MeasurementSystem::Metric,
            snap: SnapSettings::default(),
            multi_select_key: MultiSelectKey::Control,
            steps_per_circle: 64,
            index_tolerance: None,
            buffer_join: JoinStyle::Round,
            paint: PaintSettings::default(),
            drill_array: DrillArraySettings::default(),
            colors: ColorSettings::default(),
        }
    }
}

impl EditorSettings {
    /// Create new settings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(SettingsError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if !(self.snap.grid_x >= 0.0 && self.snap.grid_x.is_finite()) {
            return Err(SettingsError::invalid("snap.grid_x", "must be >= 0"));
        }
        if !(self.snap.grid_y >= 0.0 && self.snap.grid_y.is_finite()) {
            return Err(SettingsError::invalid("snap.grid_y", "must be >= 0"));
        }
        if !(self.snap.snap_max >= 0.0 && self.snap.snap_max.is_finite()) {
            return Err(SettingsError::invalid("snap.snap_max", "must be >= 0"));
        }
        if self.steps_per_circle < 4 {
            return Err(SettingsError::invalid(
                "steps_per_circle",
                "must be at least 4",
            ));
        }
        if let Some(tolerance) = self.index_tolerance {
            if !(tolerance > 0.0 && tolerance.is_finite()) {
                return Err(SettingsError::invalid("index_tolerance", "must be > 0"));
            }
        }
        if !(self.paint.tool_diameter > 0.0) {
            return Err(SettingsError::invalid("paint.tool_diameter", "must be > 0"));
        }
        if !(0.0..1.0).contains(&self.paint.overlap) {
            return Err(SettingsError::invalid(
                "paint.overlap",
                "must be in the range [0, 1)",
            ));
        }
        if self.paint.margin < 0.0 {
            return Err(SettingsError::invalid("paint.margin", "must be >= 0"));
        }
        if self.drill_array.count == 0 {
            return Err(SettingsError::invalid("drill_array.count", "must be > 0"));
        }
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
