//! Edit overlay requests and the commit flow.

use serde::{Deserialize, Serialize};

use super::state::EditTarget;
use super::{GridEvent, GridRenderer};
use crate::host::EditRequest;
use crate::types::{CellValue, EditNavigation};

/// How an edit overlay closed, as reported by the control side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditOutcome {
    pub cancel: bool,
    pub new_value: String,
    /// Visible column index the overlay was opened on
    pub column: Option<usize>,
    /// Field at that column when the overlay opened
    pub field: Option<String>,
    pub row: Option<usize>,
    pub action: EditNavigation,
}

impl GridRenderer {
    /// Ask the host to open the overlay on a cell. Returns `false` when the
    /// column is unknown or read-only, or the row is not in the index.
    pub fn open_editor(&mut self, column: usize, row: usize) -> bool {
        let Some(col) = self.state.columns.get(column).filter(|c| c.allow_edit) else {
            return false;
        };
        let field = col.field.clone();
        let Some(rect) = self.cell_rect(column, row) else {
            return false;
        };
        let value = self
            .state
            .value(row, &field)
            .map(CellValue::display_text)
            .unwrap_or_default();
        tracing::debug!(column, row, field = %field, "opening editor");
        self.host.open_editor(EditRequest {
            column,
            field: field.clone(),
            row,
            value,
            cell_height: self.options.metrics.row_height,
            rect,
        });
        self.state.editing = Some(EditTarget { column, field, row });
        true
    }

    /// The overlay closed. Commits a changed value into the edit shadow and
    /// follows the requested navigation.
    pub fn on_edit_removed(&mut self, outcome: EditOutcome) {
        // A replaced overlay reports after its successor opened.
        let current = self.state.editing.as_ref().is_some_and(|target| {
            Some(target.column) == outcome.column && Some(target.row) == outcome.row
        });
        if current || outcome.column.is_none() {
            self.state.editing = None;
        }
        if outcome.cancel {
            return;
        }
        let (Some(column), Some(row)) = (outcome.column, outcome.row) else {
            return;
        };
        let Some(field) = self.state.columns.get(column).map(|c| c.field.clone()) else {
            return;
        };
        if outcome.field.as_deref().is_some_and(|f| f != field) {
            tracing::debug!(column, expected = ?outcome.field, found = %field, "stale edit dropped");
            return;
        }

        let current = self
            .state
            .value(row, &field)
            .map(CellValue::display_text)
            .unwrap_or_default();
        if current != outcome.new_value {
            let value = CellValue::Text(outcome.new_value);
            self.set_edited_value(row, &field, value.clone());
            self.observers.emit(&GridEvent::EditCommitted { row, field, value });
        }

        let next = match outcome.action {
            EditNavigation::None => None,
            EditNavigation::MoveNext => self.editable_column_after(column),
            EditNavigation::MovePrev => self.editable_column_before(column),
        };
        if let Some(next) = next {
            self.open_editor(next, row);
        }
    }

    fn editable_column_after(&self, column: usize) -> Option<usize> {
        self.state
            .columns
            .iter()
            .skip(column + 1)
            .find(|c| c.allow_edit)
            .map(|c| c.index)
    }

    fn editable_column_before(&self, column: usize) -> Option<usize> {
        self.state
            .columns
            .iter()
            .take(column)
            .rev()
            .find(|c| c.allow_edit)
            .map(|c| c.index)
    }

    /// The cell the overlay is open on, if any.
    pub fn editing(&self) -> Option<&EditTarget> {
        self.state.editing.as_ref()
    }
}
