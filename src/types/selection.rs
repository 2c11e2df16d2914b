use serde::{Deserialize, Serialize};

/// The single selected cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Position in the row-order index
    pub position: usize,
    /// Row id at that position
    pub row: usize,
    /// Visible column index
    pub column: usize,
}

/// Result of mapping a y coordinate to a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowHit {
    pub position: usize,
    pub row: usize,
}

/// Placement of a cell in logical pixels relative to the surface, used to
/// position the edit overlay.
///
/// `clip_*` insets are set when part of the cell is hidden under the header
/// or past the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub cell_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_bottom: Option<f64>,
}

/// Pointer cursor shapes the grid asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    #[default]
    Default,
    ColResize,
}

impl CursorStyle {
    /// CSS `cursor` value.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ColResize => "col-resize",
        }
    }
}

/// Where pointer move/up events are captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    /// Only events over the surface
    #[default]
    Surface,
    /// Events anywhere on the input device, used while dragging
    Global,
}

/// Keys the grid reacts to, decoded from DOM `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyCode {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Enter,
    Other,
}

impl KeyCode {
    pub fn from_dom_code(code: &str) -> Self {
        match code {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Enter" | "NumpadEnter" => Self::Enter,
            _ => Self::Other,
        }
    }
}

/// Wheel delta unit, matching DOM `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    pub fn from_dom(mode: u32) -> Option<Self> {
        match mode {
            0 => Some(Self::Pixel),
            1 => Some(Self::Line),
            2 => Some(Self::Page),
            _ => None,
        }
    }
}

/// What the edit overlay asks for after it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditNavigation {
    #[default]
    None,
    MoveNext,
    MovePrev,
}
