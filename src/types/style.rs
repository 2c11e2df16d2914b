use serde::{Deserialize, Serialize};

use super::Align;
use crate::error::Result;

/// A CSS color string (e.g., "#FF0000", "rgba(255, 0, 0, 0.5)")
pub type CssColor = String;

/// Grid style configuration. Every option has a default; omitted JSON keys
/// fall back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridStyle {
    pub font: String,
    pub font_style: String,
    /// Font size in logical pixels
    pub font_size: f64,
    pub font_color: CssColor,
    pub header_font: String,
    pub header_font_style: String,
    pub header_font_size: f64,
    pub header_font_color: CssColor,
    pub header_draw_sort_arrow: bool,
    pub header_draw_sort_arrow_color: CssColor,
    pub header_background_color: CssColor,
    pub background_color: CssColor,
    /// Every second row is drawn with this background
    pub alternate_background_color: CssColor,
    /// Row background under the pointer when hover tracking is on
    pub hover_background_color: CssColor,
    pub line_color: CssColor,
    pub select_line_color: CssColor,
    pub scrollbar: ScrollbarStyle,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            font: "arial".to_string(),
            font_style: String::new(),
            font_size: 16.0,
            font_color: "black".to_string(),
            header_font: "arial".to_string(),
            header_font_style: "bold".to_string(),
            header_font_size: 16.0,
            header_font_color: "black".to_string(),
            header_draw_sort_arrow: true,
            header_draw_sort_arrow_color: "#5f6163".to_string(),
            header_background_color: "#ecf1f5".to_string(),
            background_color: "white".to_string(),
            alternate_background_color: "#faf9fb".to_string(),
            hover_background_color: "#f0f4ff".to_string(),
            line_color: "#e1e4e8".to_string(),
            select_line_color: "#1c1cfc".to_string(),
            scrollbar: ScrollbarStyle::default(),
        }
    }
}

impl GridStyle {
    /// Parse a (possibly partial) style object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// CSS font shorthand for body cells at the given pixel ratio.
    pub fn body_font(&self, ratio: f64) -> String {
        css_font(&self.font_style, self.font_size * ratio, &self.font)
    }

    /// CSS font shorthand for the header row at the given pixel ratio.
    pub fn header_font(&self, ratio: f64) -> String {
        css_font(
            &self.header_font_style,
            self.header_font_size * ratio,
            &self.header_font,
        )
    }
}

/// Build a CSS font shorthand, e.g. `bold 16px arial`.
pub fn css_font(style: &str, size_px: f64, family: &str) -> String {
    if style.is_empty() {
        format!("{size_px}px {family}")
    } else {
        format!("{style} {size_px}px {family}")
    }
}

/// Scrollbar colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrollbarStyle {
    pub background_color: CssColor,
    pub button_color: CssColor,
    pub button_hover_color: CssColor,
}

impl Default for ScrollbarStyle {
    fn default() -> Self {
        Self {
            background_color: "#f0f0f0".to_string(),
            button_color: "#b0b0b0".to_string(),
            button_hover_color: "#808080".to_string(),
        }
    }
}

/// Fixed metrics of the grid, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridMetrics {
    pub row_height: f64,
    pub header_height: f64,
    /// Horizontal padding on both sides of cell text
    pub cell_padding: f64,
    /// Distance from the bottom of a row to the text baseline
    pub baseline_offset: f64,
    pub min_column_width: f64,
    /// Distance from a column edge that still grabs the resize handle
    pub resize_tolerance: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            row_height: 36.0,
            header_height: 36.0,
            cell_padding: 14.0,
            baseline_offset: 14.0,
            min_column_width: 10.0,
            resize_tolerance: 3.0,
        }
    }
}

/// Optional per-cell style override returned by a row style callback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<CssColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<CssColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

impl CellStyle {
    /// True when the override changes the font.
    pub fn overrides_font(&self) -> bool {
        self.font.is_some() || self.font_style.is_some() || self.font_size.is_some()
    }
}

/// Options for one grid instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    pub style: GridStyle,
    pub metrics: GridMetrics,
    /// Highlight the row under the pointer
    pub hover_tracking: bool,
    /// Allow opening the edit overlay
    pub allow_edit: bool,
}
