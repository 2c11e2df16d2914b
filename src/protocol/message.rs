//! Messages exchanged between the control side and the render side.

use serde::{Deserialize, Serialize};

use crate::grid::EditOutcome;
use crate::types::{
    CellRect, CellValue, ColumnConfig, CursorStyle, DeltaMode, GridOptions, KeyCode, Record,
    SortColumn,
};

/// Identifies one grid instance on a shared transport.
pub type GridId = u32;

/// A message addressed to one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<M> {
    pub grid_id: GridId,
    pub message: M,
}

impl<M> Envelope<M> {
    pub fn new(grid_id: GridId, message: M) -> Self {
        Self { grid_id, message }
    }
}

/// Control side to render side. Sizes and pointer positions are logical
/// pixels relative to the surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ControlMessage {
    /// The surface itself travels in the transport's transfer list.
    Create {
        width: f64,
        height: f64,
        pixel_ratio: f64,
    },
    Resize {
        width: f64,
        height: f64,
        pixel_ratio: f64,
    },
    Focus { focused: bool },
    Scroll { mode: DeltaMode, dx: f64, dy: f64 },
    MouseDown { x: f64, y: f64 },
    MouseMove { x: f64, y: f64 },
    MouseUp { x: f64, y: f64 },
    MouseDblClick { x: f64, y: f64 },
    /// Captured anywhere on the page during a drag
    MouseMoveExtended { x: f64, y: f64 },
    MouseUpExtended { x: f64, y: f64 },
    MouseLeave,
    KeyDown { code: KeyCode },
    EditRemoved(EditOutcome),
    Columns { columns: Vec<ColumnConfig> },
    Data { rows: Option<Vec<Record>> },
    Sort { sort: Vec<SortColumn> },
    Options { options: GridOptions },
    AllowEdit { allow_edit: bool },
    EditedValue {
        row: usize,
        field: String,
        value: CellValue,
    },
}

/// Render side to control side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RenderMessage {
    SetCursor { cursor: CursorStyle },
    /// Listen for pointer move/up on the whole page
    AskForExtendedCapture,
    /// Listen for pointer move/up on the surface only
    AskForNormalCapture,
    UpdateForEdit {
        column: usize,
        field: String,
        row: usize,
        value: String,
        cell_height: f64,
        rect: CellRect,
    },
    LocationForEdit { rect: CellRect },
    RemoveUpdateForEdit,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn control_messages_are_tagged() {
        let json = serde_json::to_string(&Envelope::new(
            3,
            ControlMessage::MouseDown { x: 1.0, y: 2.0 },
        ))
        .unwrap();
        assert_eq!(
            json,
            r#"{"gridId":3,"message":{"type":"mouseDown","x":1.0,"y":2.0}}"#
        );
    }

    #[test]
    fn create_uses_camel_case_fields() {
        let msg: ControlMessage = serde_json::from_str(
            r#"{"type":"create","width":300,"height":200,"pixelRatio":2}"#,
        )
        .unwrap();
        assert!(matches!(
            msg,
            ControlMessage::Create { width, height, pixel_ratio }
                if width == 300.0 && height == 200.0 && pixel_ratio == 2.0
        ));
    }

    #[test]
    fn edit_outcome_is_inlined() {
        let msg: ControlMessage = serde_json::from_str(
            r#"{"type":"editRemoved","cancel":false,"newValue":"x","column":1,"field":"name","row":4,"action":"moveNext"}"#,
        )
        .unwrap();
        let ControlMessage::EditRemoved(outcome) = msg else {
            panic!("wrong variant");
        };
        assert_eq!(outcome.row, Some(4));
        assert_eq!(outcome.new_value, "x");
    }

    #[test]
    fn unit_variants_round_trip() {
        let json = serde_json::to_string(&RenderMessage::AskForExtendedCapture).unwrap();
        assert_eq!(json, r#"{"type":"askForExtendedCapture"}"#);
    }
}
