//! geoedit Settings Crate
//!
//! Handles editor configuration: snapping, selection modifiers, geometry
//! resolution, tool defaults and colors, plus their persistence.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{
    ColorSettings, DrillArraySettings, EditorSettings, JoinStyle, MeasurementSystem,
    MultiSelectKey, PaintMethod, PaintSettings, SnapSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;
