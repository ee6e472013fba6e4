//! Rendering boundary.
//!
//! The editor never reads pixels; it pushes `(shape, color, layer)` items
//! into a [`Canvas`] supplied by the host.

use crate::geometry::Geometry;
use geoedit_core::{EditorError, EditorResult};
use geoedit_settings::ColorSettings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Draw layer of a pushed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Persisted shapes.
    Shapes,
    /// Selected shapes, drawn over [`Layer::Shapes`].
    Selection,
    /// Tool preview geometry.
    Utility,
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl FromStr for Color {
    type Err = EditorError;

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    fn from_str(s: &str) -> EditorResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || EditorError::invalid_parameter("color", format!("'{}' is not #RRGGBB[AA]", s));
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { byte(6)? } else { 0xFF };
        Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

/// Colors used for each layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub shape: Color,
    pub selection: Color,
    pub utility: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            shape: Color::rgba(0x00, 0x00, 0x00, 0xFF),
            selection: Color::rgba(0x00, 0x00, 0xFF, 0xFF),
            utility: Color::rgba(0x00, 0x00, 0x00, 0x80),
        }
    }
}

impl Palette {
    /// Builds a palette from settings. Unparseable entries keep their
    /// default color.
    pub fn from_settings(colors: &ColorSettings) -> Self {
        let defaults = Self::default();
        let parse = |value: &str, fallback: Color| {
            value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                fallback
            })
        };
        Self {
            shape: parse(&colors.shape, defaults.shape),
            selection: parse(&colors.selection, defaults.selection),
            utility: parse(&colors.utility, defaults.utility),
        }
    }

    pub fn color_for(&self, layer: Layer) -> Color {
        match layer {
            Layer::Shapes => self.shape,
            Layer::Selection => self.selection,
            Layer::Utility => self.utility,
        }
    }
}

/// Vector drawing surface provided by the host.
pub trait Canvas {
    /// Removes everything previously drawn.
    fn clear(&mut self);
    fn draw(&mut self, shape: &Geometry, color: Color, layer: Layer);
}

/// One pushed draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderItem {
    pub geometry: Geometry,
    pub color: Color,
    pub layer: Layer,
}

/// Canvas that records draw calls; used by headless drivers and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub items: Vec<RenderItem>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_layer(&self, layer: Layer) -> impl Iterator<Item = &RenderItem> + '_ {
        self.items.iter().filter(move |i| i.layer == layer)
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self) {
        self.items.clear();
    }

    fn draw(&mut self, shape: &Geometry, color: Color, layer: Layer) {
        self.items.push(RenderItem {
            geometry: shape.clone(),
            color,
            layer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("#0000FF".parse::<Color>().unwrap(), Color::rgba(0, 0, 255, 255));
        assert_eq!("#00000080".parse::<Color>().unwrap(), Color::rgba(0, 0, 0, 128));
        assert!("blue".parse::<Color>().is_err());
        assert!("#12345G".parse::<Color>().is_err());
    }

    #[test]
    fn test_palette_falls_back_per_entry() {
        let colors = ColorSettings {
            shape: "#FF0000".to_string(),
            selection: "nope".to_string(),
            utility: "#00FF0040".to_string(),
        };
        let palette = Palette::from_settings(&colors);
        assert_eq!(palette.shape, Color::rgba(255, 0, 0, 255));
        assert_eq!(palette.selection, Palette::default().selection);
        assert_eq!(palette.color_for(Layer::Utility), Color::rgba(0, 255, 0, 64));
    }
}
