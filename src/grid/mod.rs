//! Virtualized grid renderer.
//!
//! `GridRenderer` owns the column layout, the row-order index, the
//! selection and the scrollbar, and paints only the rows that intersect
//! the viewport. It touches its surroundings only through the `Scheduler`
//! and `GridHost` traits and draws through a `DrawContext` handed to
//! `draw_frame`, so the same renderer runs in a worker, on the main thread
//! or under test.
//!
//! Coordinates: pointer input is logical pixels; layout, scroll positions
//! and drawing are device pixels (logical × pixel ratio).

mod draw;
mod edit;
mod events;
mod hit;
mod observers;
mod state;

use std::collections::BTreeSet;
use std::rc::Rc;

pub use edit::EditOutcome;
pub use observers::{GridEvent, Observers, SubscriptionId};
pub use state::{ColumnResize, EditShadow, EditTarget, GridState, RedrawPlan};

use crate::error::{GridError, Result};
use crate::host::{default_log_hook, GridHost, LogHook, Scheduler};
use crate::layout::{ColumnLayout, RowIndex};
use crate::render::FrameStats;
use crate::scrollbar::ScrollView;
use crate::types::{
    CellStyle, CellValue, ColumnConfig, GridOptions, Record, Selection, SortColumn,
};

/// Arguments handed to the row style callback.
pub struct RowStyleArgs<'a> {
    pub row: Option<&'a Record>,
    pub row_id: usize,
    pub column: &'a ColumnConfig,
    /// Row is painted with the alternate background
    pub alternate: bool,
    /// Text that will be drawn
    pub text: &'a str,
}

/// Per-cell style override. An `Err` is logged and the default style used.
pub type RowStyleFn = Rc<dyn Fn(&RowStyleArgs<'_>) -> Result<Option<CellStyle>>>;

pub struct GridRenderer {
    options: GridOptions,
    state: GridState,
    scroll: ScrollView,
    scheduler: Box<dyn Scheduler>,
    host: Box<dyn GridHost>,
    observers: Observers,
    row_style: Option<RowStyleFn>,
    log_hook: LogHook,
}

impl std::fmt::Debug for GridRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridRenderer")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("scroll", &self.scroll)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl GridRenderer {
    pub fn new(
        options: GridOptions,
        scheduler: Box<dyn Scheduler>,
        host: Box<dyn GridHost>,
    ) -> Self {
        let scroll = ScrollView::new(options.style.scrollbar.clone(), options.metrics.row_height);
        Self {
            options,
            state: GridState::default(),
            scroll,
            scheduler,
            host,
            observers: Observers::default(),
            row_style: None,
            log_hook: default_log_hook(),
        }
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Replace style and behavior options and redraw.
    pub fn set_options(&mut self, options: GridOptions) {
        self.scroll.set_style(options.style.scrollbar.clone());
        self.scroll.set_line_height(options.metrics.row_height);
        self.options = options;
        self.state.body_glyphs = None;
        self.state.header_glyphs = None;
        self.update_scroll_size();
        self.request_redraw();
    }

    pub fn set_allow_edit(&mut self, allow_edit: bool) {
        self.options.allow_edit = allow_edit;
        self.request_redraw();
    }

    pub fn set_row_style(&mut self, row_style: Option<RowStyleFn>) {
        self.row_style = row_style;
        self.request_redraw();
    }

    /// Route callback errors somewhere other than `tracing::warn!`.
    pub fn set_log_hook(&mut self, hook: LogHook) {
        self.log_hook = hook;
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GridEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn columns(&self) -> &ColumnLayout {
        &self.state.columns
    }

    pub fn row_index(&self) -> Option<&RowIndex> {
        self.state.index.as_ref()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.state.selection
    }

    pub fn sort(&self) -> &[SortColumn] {
        &self.state.sort
    }

    pub fn scroll(&self) -> &ScrollView {
        &self.scroll
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.state.ratio
    }

    /// Counters of the most recent drawing pass.
    pub fn last_frame_stats(&self) -> FrameStats {
        self.state.last_stats
    }

    /// Field of a row as displayed: edit shadow first, then the source.
    pub fn value(&self, row: usize, field: &str) -> Option<&CellValue> {
        self.state.value(row, field)
    }

    /// Replace the column set. Hidden columns are dropped and the layout is
    /// recomputed at once; an open editor is closed.
    pub fn configure_columns(&mut self, columns: &[ColumnConfig]) {
        self.state.columns.configure(columns);
        self.state.columns.recalc(self.state.ratio);
        self.state.resize = None;
        if self.state.editing.take().is_some() {
            self.host.close_editor();
        }
        self.state.resolve_selection();
        tracing::debug!(columns = self.state.columns.len(), "columns configured");
        self.update_scroll_size();
        self.request_redraw();
    }

    /// Replace the rows when given, then rebuild the index and redraw.
    /// New rows clear the edit shadow.
    pub fn set_data(&mut self, rows: Option<Vec<Record>>) {
        if let Some(rows) = rows {
            self.state.rows = rows;
            self.state.edits.clear();
        }
        self.request_reindex_and_redraw();
    }

    /// Set the sort keys; an empty list restores natural order.
    pub fn set_sort(&mut self, sort: Vec<SortColumn>) {
        self.state.sort = sort;
        self.request_reindex_and_redraw();
    }

    /// Shadow a field of a row without touching the source collection.
    pub fn set_edited_value(&mut self, row: usize, field: &str, value: CellValue) {
        self.state.edits.set(row, field, value);
        if self.sorts_by(field) {
            self.request_reindex_and_redraw();
        } else {
            self.request_row_redraw(row);
        }
    }

    fn sorts_by(&self, field: &str) -> bool {
        self.state.sort.iter().any(|key| key.field == field)
    }

    /// Resize the surface. Width and height are logical pixels.
    #[allow(clippy::float_cmp)]
    pub fn resize(&mut self, width: f64, height: f64, ratio: f64) {
        if ratio != self.state.ratio {
            self.state.ratio = ratio;
            self.state.columns.invalidate();
            self.state.body_glyphs = None;
            self.state.header_glyphs = None;
        }
        self.state.canvas_width = width * ratio;
        self.state.canvas_height = height * ratio;
        if self.state.columns.is_dirty() {
            self.state.columns.recalc(ratio);
        }
        self.update_scroll_size();
        self.request_redraw();
    }

    /// Surface size in device pixels.
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.state.canvas_width, self.state.canvas_height)
    }

    pub fn set_focus(&mut self, focused: bool) {
        if self.state.focused != focused {
            self.state.focused = focused;
            if self.options.allow_edit {
                self.request_redraw();
            }
        }
    }

    pub fn is_focused(&self) -> bool {
        self.state.focused
    }

    /// Scroll to a position in device pixels, clamped to the valid range.
    pub fn scroll_to(&mut self, pos_x: f64, pos_y: f64) {
        self.scroll.set_pos_x(pos_x);
        self.scroll.set_pos_y(pos_y);
        self.apply_scroll_signals();
    }

    /// True while a drawing pass is scheduled.
    pub fn is_plan_to_redraw(&self) -> bool {
        self.state.redraw.frame.is_some()
    }

    /// Schedule a full drawing pass. Calls before the pass collapse into one.
    pub fn request_redraw(&mut self) {
        self.state.redraw.rows = None;
        if self.state.redraw.frame.is_none() {
            self.state.redraw.frame = Some(self.scheduler.request_frame());
        }
    }

    /// Schedule a pass that repaints only the given row. A full pass already
    /// pending wins.
    pub fn request_row_redraw(&mut self, row: usize) {
        let plan = &mut self.state.redraw;
        if plan.frame.is_none() {
            plan.rows = Some(BTreeSet::from([row]));
            plan.frame = Some(self.scheduler.request_frame());
        } else if let Some(rows) = &mut plan.rows {
            rows.insert(row);
        }
    }

    /// Drop a scheduled pass without drawing, e.g. when no surface is
    /// attached yet. A frame still pending with the scheduler is cancelled;
    /// the next request schedules a fresh one.
    pub fn discard_frame(&mut self) {
        if let Some(token) = std::mem::take(&mut self.state.redraw).frame {
            self.scheduler.cancel_frame(token);
        }
    }

    pub fn request_reindex_and_redraw(&mut self) {
        self.reindex();
        self.request_redraw();
    }

    fn reindex(&mut self) {
        let state = &self.state;
        let index = RowIndex::sorted(state.rows.len(), &state.sort, |row, field| {
            state.value(row, field)
        });
        tracing::debug!(rows = index.len(), keys = state.sort.len(), "row index rebuilt");
        self.state.index = Some(index);
        self.state.hover_row = None;
        self.state.resolve_selection();
        self.update_scroll_size();
    }

    /// Feed content and viewport sizes to the scrollbar.
    fn update_scroll_size(&mut self) {
        let r = self.state.ratio;
        let content = self.state.index.as_ref().map(|index| {
            #[allow(clippy::cast_precision_loss)]
            let rows = index.len() as f64;
            (
                self.state.columns.content_width() * r,
                self.options.metrics.row_height * rows * r,
            )
        });
        self.scroll.set_size(
            r,
            self.state.canvas_width,
            self.state.canvas_height,
            self.options.metrics.header_height,
            content,
        );
        self.apply_scroll_signals();
    }

    /// Act on what the scrollbar asked for since the last call.
    fn apply_scroll_signals(&mut self) {
        let signals = self.scroll.take_signals();
        if signals.scrolled {
            let event = GridEvent::ScrollGeometryChanged {
                pos_x: self.scroll.pos_x(),
                pos_y: self.scroll.pos_y(),
                max_x: self.scroll.max_x(),
                max_y: self.scroll.max_y(),
            };
            self.observers.emit(&event);
            if let Some(target) = &self.state.editing {
                if let Some(rect) = self.cell_rect(target.column, target.row) {
                    self.host.move_editor(rect);
                }
            }
        }
        if signals.repaint {
            self.request_redraw();
        }
        if let Some(mode) = signals.capture {
            self.host.capture_pointer(mode);
        }
    }

    fn log(&self, err: &GridError) {
        (self.log_hook)(err);
    }
}
