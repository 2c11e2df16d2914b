//! Per-instance mutable state of a grid.
//!
//! Everything the input handlers and the drawing pass mutate lives here, so
//! the invariants can be checked in one place: the selection always points
//! into the current row-order index, and a pending frame is tracked by a
//! single token.

use std::collections::{BTreeSet, HashMap};

use crate::host::FrameToken;
use crate::layout::{ColumnLayout, RowIndex};
use crate::render::FrameStats;
use crate::types::{CellValue, CursorStyle, Record, Selection, SortColumn};

/// Pending values that shadow the row collection for display and sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditShadow {
    rows: HashMap<usize, HashMap<String, CellValue>>,
}

impl EditShadow {
    pub fn set(&mut self, row: usize, field: impl Into<String>, value: CellValue) {
        self.rows.entry(row).or_default().insert(field.into(), value);
    }

    pub fn get(&self, row: usize, field: &str) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|fields| fields.get(field))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Active column-resize drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnResize {
    /// Pointer x (logical) matching the current column edge
    pub x: f64,
    pub column: usize,
}

/// The cell the edit overlay is open on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub column: usize,
    pub field: String,
    pub row: usize,
}

/// Redraw bookkeeping. A pending frame with `rows == None` is a full pass.
#[derive(Debug, Clone, Default)]
pub struct RedrawPlan {
    pub frame: Option<FrameToken>,
    pub rows: Option<BTreeSet<usize>>,
}

/// Min and max glyph advance of one font, for the clip pre-check.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphWidths {
    pub font: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct GridState {
    pub ratio: f64,
    /// Surface size in device pixels
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub rows: Vec<Record>,
    pub edits: EditShadow,
    pub columns: ColumnLayout,
    /// `None` until data is first assigned
    pub index: Option<RowIndex>,
    pub sort: Vec<SortColumn>,
    pub selection: Option<Selection>,
    pub resize: Option<ColumnResize>,
    pub editing: Option<EditTarget>,
    pub focused: bool,
    /// Row-order position under the pointer
    pub hover_row: Option<usize>,
    pub cursor: CursorStyle,
    pub redraw: RedrawPlan,
    pub body_glyphs: Option<GlyphWidths>,
    pub header_glyphs: Option<GlyphWidths>,
    pub last_stats: FrameStats,
}

impl Default for GridState {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            canvas_width: 0.0,
            canvas_height: 0.0,
            rows: Vec::new(),
            edits: EditShadow::default(),
            columns: ColumnLayout::new(),
            index: None,
            sort: Vec::new(),
            selection: None,
            resize: None,
            editing: None,
            focused: false,
            hover_row: None,
            cursor: CursorStyle::Default,
            redraw: RedrawPlan::default(),
            body_glyphs: None,
            header_glyphs: None,
            last_stats: FrameStats::default(),
        }
    }
}

impl GridState {
    /// Field of a row, the edit shadow taking precedence over the source.
    pub fn value(&self, row: usize, field: &str) -> Option<&CellValue> {
        self.edits
            .get(row, field)
            .or_else(|| self.rows.get(row).and_then(|r| r.get(field)))
    }

    pub fn row_count(&self) -> usize {
        self.index.as_ref().map_or(0, RowIndex::len)
    }

    /// Point the selection back into the index after a rebuild or a column
    /// change; drop it when its row or column is gone.
    pub fn resolve_selection(&mut self) {
        let Some(selection) = self.selection else {
            return;
        };
        let position = self
            .index
            .as_ref()
            .and_then(|index| index.position_of(selection.row));
        self.selection = match position {
            Some(position) if selection.column < self.columns.len() => Some(Selection {
                position,
                ..selection
            }),
            _ => None,
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::ColumnConfig;

    fn state_with_rows(values: &[&str]) -> GridState {
        let mut state = GridState::default();
        state.rows = values
            .iter()
            .map(|v| Record::from([("name".to_string(), CellValue::from(*v))]))
            .collect();
        state.index = Some(RowIndex::identity(values.len()));
        state.columns.configure(&[ColumnConfig::new("Name", "name")]);
        state
    }

    #[test]
    fn shadow_wins_over_source() {
        let mut state = state_with_rows(&["a", "b"]);
        state.edits.set(1, "name", CellValue::from("edited"));
        assert_eq!(state.value(1, "name"), Some(&CellValue::from("edited")));
        assert_eq!(state.value(0, "name"), Some(&CellValue::from("a")));
        assert_eq!(state.value(5, "name"), None);
    }

    #[test]
    fn selection_follows_its_row() {
        let mut state = state_with_rows(&["a", "b", "c"]);
        state.selection = Some(Selection {
            position: 0,
            row: 0,
            column: 0,
        });
        state.index = Some(RowIndex::sorted(3, &[SortColumn::descending("__rownum__")], |_, _| None));
        state.resolve_selection();
        assert_eq!(state.selection.unwrap().position, 2);

        state.index = Some(RowIndex::identity(0));
        state.resolve_selection();
        assert_eq!(state.selection, None);
    }
}
