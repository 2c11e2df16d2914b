//! Pointer, wheel, keyboard and timer input.
//!
//! Pointer coordinates are logical pixels relative to the surface. Every
//! handler ends by draining the scrollbar signals so scroll changes reach
//! subscribers and the scheduler in the order the input arrived.

use super::state::ColumnResize;
use super::{GridEvent, GridRenderer};
use crate::host::TimerToken;
use crate::types::{CaptureMode, CursorStyle, DeltaMode, KeyCode, Selection, SortColumn, SortDirection};

impl GridRenderer {
    pub fn on_mouse_down(&mut self, x: f64, y: f64) {
        if self.state.index.is_none() {
            return;
        }
        if self.scroll.on_mouse_down(x, y, self.scheduler.as_mut()) {
            self.apply_scroll_signals();
            return;
        }

        if y <= self.options.metrics.header_height {
            if let Some(column) = self.column_split_at(x) {
                self.state.resize = Some(ColumnResize { x, column });
                self.host.capture_pointer(CaptureMode::Global);
            } else if let Some(column) = self.column_at(x) {
                self.click_on_header(column);
            }
            return;
        }

        let (Some(column), Some(hit)) = (self.column_at(x), self.row_at(y)) else {
            return;
        };
        let selection = Selection {
            position: hit.position,
            row: hit.row,
            column,
        };
        if self.state.selection != Some(selection) {
            self.state.selection = Some(selection);
            self.request_redraw();
        }
        self.observers.emit(&GridEvent::Click {
            position: hit.position,
            row: hit.row,
            column,
        });
    }

    /// Header press: sort ascending by the column, or descending when it is
    /// already the sole ascending key.
    fn click_on_header(&mut self, column: usize) {
        let Some(field) = self.state.columns.get(column).map(|c| c.field.clone()) else {
            return;
        };
        self.observers.emit(&GridEvent::HeaderClick {
            column,
            field: field.clone(),
        });
        let sole_ascending = matches!(
            self.state.sort.as_slice(),
            [key] if key.field == field && key.direction == SortDirection::Ascending
        );
        let key = if sole_ascending {
            SortColumn::descending(field)
        } else {
            SortColumn::ascending(field)
        };
        self.set_sort(vec![key]);
    }

    pub fn on_mouse_move(&mut self, x: f64, y: f64) {
        if self.resize_column_if_needed(x) {
            return;
        }
        if self.scroll.on_mouse_move(x, y) {
            self.set_cursor(CursorStyle::Default);
            self.set_hover_row(None);
            self.apply_scroll_signals();
            return;
        }
        self.apply_scroll_signals();

        let over_split =
            y < self.options.metrics.header_height && self.column_split_at(x).is_some();
        self.set_cursor(if over_split {
            CursorStyle::ColResize
        } else {
            CursorStyle::Default
        });

        if self.options.hover_tracking {
            let hover = self.row_at(y).map(|hit| hit.position);
            self.set_hover_row(hover);
        }
    }

    pub fn on_mouse_up(&mut self, _x: f64, _y: f64) {
        if self.state.resize.take().is_some() {
            self.host.capture_pointer(CaptureMode::Surface);
        }
        self.scroll.on_mouse_up(self.scheduler.as_mut());
        self.apply_scroll_signals();
    }

    /// Pointer moved anywhere while a drag holds global capture.
    pub fn on_mouse_move_extended(&mut self, x: f64, y: f64) {
        if self.resize_column_if_needed(x) {
            return;
        }
        self.scroll.on_extended_mouse_move(x, y);
        self.apply_scroll_signals();
    }

    /// Pointer released anywhere while a drag holds global capture.
    pub fn on_mouse_up_extended(&mut self, x: f64, y: f64) {
        if self.state.resize.take().is_some() {
            self.host.capture_pointer(CaptureMode::Surface);
        }
        self.scroll.on_extended_mouse_up(x, y);
        self.apply_scroll_signals();
    }

    /// Pointer left the surface.
    pub fn on_mouse_leave(&mut self) {
        self.set_hover_row(None);
    }

    pub fn on_double_click(&mut self, x: f64, y: f64) {
        if y <= self.options.metrics.header_height {
            return;
        }
        let (Some(column), Some(hit)) = (self.column_at(x), self.row_at(y)) else {
            return;
        };
        self.observers.emit(&GridEvent::DoubleClick {
            position: hit.position,
            row: hit.row,
            column,
        });
        if self.options.allow_edit {
            self.open_editor(column, hit.row);
        }
    }

    pub fn on_wheel(&mut self, mode: DeltaMode, dx: f64, dy: f64) {
        self.scroll.on_scroll(mode, dx, dy);
        self.apply_scroll_signals();
    }

    /// Timer callback from the scheduler.
    pub fn on_timer(&mut self, token: TimerToken) {
        if self.scroll.on_timer(token) {
            self.apply_scroll_signals();
        }
    }

    /// Arrows move the selection and scroll just enough to keep it in view;
    /// Enter opens the editor. Without a selection the keys scroll.
    pub fn on_key_down(&mut self, key: KeyCode) {
        let Some(selection) = self.state.selection else {
            self.scroll.on_key_down(key);
            self.apply_scroll_signals();
            return;
        };
        match key {
            KeyCode::ArrowDown => self.move_selection_down(selection),
            KeyCode::ArrowUp => self.move_selection_up(selection),
            KeyCode::ArrowLeft => self.move_selection_left(selection),
            KeyCode::ArrowRight => self.move_selection_right(selection),
            KeyCode::Enter => {
                if self.options.allow_edit {
                    self.open_editor(selection.column, selection.row);
                }
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                self.scroll.on_key_down(key);
            }
            KeyCode::Other => {}
        }
        self.apply_scroll_signals();
    }

    fn move_selection_down(&mut self, selection: Selection) {
        self.move_selection_to(selection, selection.position + 1);
    }

    fn move_selection_up(&mut self, selection: Selection) {
        if let Some(position) = selection.position.checked_sub(1) {
            self.move_selection_to(selection, position);
        }
    }

    fn move_selection_to(&mut self, selection: Selection, position: usize) {
        let Some(row) = self.state.index.as_ref().and_then(|i| i.get(position)) else {
            return;
        };
        self.state.selection = Some(Selection {
            position,
            row,
            ..selection
        });
        self.scroll_position_into_view(position);
        self.request_redraw();
    }

    fn move_selection_left(&mut self, selection: Selection) {
        if let Some(column) = selection.column.checked_sub(1) {
            self.move_selection_to_column(selection, column);
        }
    }

    fn move_selection_right(&mut self, selection: Selection) {
        self.move_selection_to_column(selection, selection.column + 1);
    }

    fn move_selection_to_column(&mut self, selection: Selection, column: usize) {
        let Some((left, right)) = self.state.columns.get(column).map(|c| (c.left_pos, c.right_pos))
        else {
            return;
        };
        self.state.selection = Some(Selection {
            column,
            ..selection
        });
        let bar = if self.scroll.has_y() { self.scroll.size() } else { 0.0 };
        let visible = self.state.canvas_width - bar * self.state.ratio;
        let pos_x = self.scroll.pos_x();
        if left < pos_x {
            self.scroll.set_pos_x(left);
        } else if right > pos_x + visible {
            self.scroll.set_pos_x(right - visible);
        }
        self.request_redraw();
    }

    /// Scroll vertically by the least amount that shows the whole row at
    /// `position`. The row top wins when the row is taller than the body.
    #[allow(clippy::cast_precision_loss)]
    fn scroll_position_into_view(&mut self, position: usize) {
        let r = self.state.ratio;
        let metrics = &self.options.metrics;
        let bar = if self.scroll.has_x() { self.scroll.size() } else { 0.0 };
        let top = position as f64 * metrics.row_height * r;
        let bottom = top + metrics.row_height * r;
        let visible = self.state.canvas_height - (metrics.header_height + bar) * r;
        let pos_y = self.scroll.pos_y();
        if top < pos_y {
            self.scroll.set_pos_y(top);
        } else if bottom > pos_y + visible {
            self.scroll.set_pos_y(bottom - visible);
        }
    }

    /// Apply a pending column-resize drag. Returns `true` while a resize is
    /// active, whether or not the width changed.
    #[allow(clippy::float_cmp)]
    fn resize_column_if_needed(&mut self, x: f64) -> bool {
        let Some(resize) = self.state.resize else {
            return false;
        };
        let delta = x - resize.x;
        if delta == 0.0 {
            return true;
        }
        let applied =
            self.state
                .columns
                .resize_by(resize.column, delta, self.options.metrics.min_column_width);
        if applied != 0.0 {
            self.state.resize = Some(ColumnResize {
                x: resize.x + applied,
                ..resize
            });
            tracing::debug!(column = resize.column, delta = applied, "column resized");
            self.update_scroll_size();
            self.request_redraw();
        }
        true
    }

    /// Forward a cursor change to the host; repeats are dropped.
    fn set_cursor(&mut self, cursor: CursorStyle) {
        if self.state.cursor != cursor {
            self.state.cursor = cursor;
            self.host.set_cursor(cursor);
        }
    }

    fn set_hover_row(&mut self, hover: Option<usize>) {
        if self.state.hover_row != hover {
            self.state.hover_row = hover;
            if self.options.hover_tracking {
                self.request_redraw();
            }
        }
    }
}
