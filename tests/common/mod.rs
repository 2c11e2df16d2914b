//! Common test utilities for grid integration tests.
//!
//! Provides a recording host, a shared recording surface, and builders for
//! rows and ready-to-draw grids.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::cell::RefCell;
use std::rc::Rc;

use canvas_table::host::{EditRequest, GridHost, ManualScheduler};
use canvas_table::render::{DrawContext, FrameStats, RecordingContext, TextAlign};
use canvas_table::{
    CaptureMode, CellRect, CellValue, ColumnConfig, CursorStyle, GridOptions, GridRenderer, Record,
};

// ============================================================================
// Host
// ============================================================================

/// One request the grid made of its host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Cursor(CursorStyle),
    Capture(CaptureMode),
    Open(EditRequest),
    Move(CellRect),
    Close,
}

/// Host that records every request. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn take(&self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn cursors(&self) -> Vec<CursorStyle> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HostCall::Cursor(cursor) => Some(*cursor),
                _ => None,
            })
            .collect()
    }

    pub fn opened(&self) -> Vec<EditRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                HostCall::Open(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }
}

impl GridHost for RecordingHost {
    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.calls.borrow_mut().push(HostCall::Cursor(cursor));
    }

    fn capture_pointer(&mut self, mode: CaptureMode) {
        self.calls.borrow_mut().push(HostCall::Capture(mode));
    }

    fn open_editor(&mut self, request: EditRequest) {
        self.calls.borrow_mut().push(HostCall::Open(request));
    }

    fn move_editor(&mut self, rect: CellRect) {
        self.calls.borrow_mut().push(HostCall::Move(rect));
    }

    fn close_editor(&mut self) {
        self.calls.borrow_mut().push(HostCall::Close);
    }
}

// ============================================================================
// Surface
// ============================================================================

/// `RecordingContext` behind a shared handle, so a test can inspect what
/// an owner drew.
#[derive(Debug, Clone, Default)]
pub struct SharedSurface {
    inner: Rc<RefCell<RecordingContext>>,
}

impl SharedSurface {
    pub fn borrow(&self) -> std::cell::Ref<'_, RecordingContext> {
        self.inner.borrow()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }
}

impl DrawContext for SharedSurface {
    fn save(&mut self) {
        self.inner.borrow_mut().save();
    }

    fn restore(&mut self) {
        self.inner.borrow_mut().restore();
    }

    fn set_fill_style(&mut self, color: &str) {
        self.inner.borrow_mut().set_fill_style(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.inner.borrow_mut().set_stroke_style(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.inner.borrow_mut().set_line_width(width);
    }

    fn set_font(&mut self, font: &str) {
        self.inner.borrow_mut().set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.inner.borrow_mut().set_text_align(align);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.inner.borrow_mut().fill_rect(x, y, w, h);
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.inner.borrow_mut().clear_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.inner.borrow_mut().stroke_rect(x, y, w, h);
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.inner.borrow_mut().stroke_line(x1, y1, x2, y2);
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        self.inner.borrow_mut().fill_polygon(points);
    }

    fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.inner.borrow_mut().clip_rect(x, y, w, h);
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        self.inner.borrow_mut().measure_text(text)
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.inner.borrow_mut().fill_text(text, x, y);
    }

    fn set_surface_size(&mut self, width: u32, height: u32) {
        self.inner.borrow_mut().set_surface_size(width, height);
    }
}

// ============================================================================
// Rows
// ============================================================================

/// One row with a single text field `name`.
pub fn name_row(name: &str) -> Record {
    Record::from([("name".to_string(), CellValue::from(name))])
}

/// Rows `{ id, name }` where `name` is `"row {id}"`.
pub fn numbered_rows(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| {
            Record::from([
                ("id".to_string(), CellValue::from(i as f64)),
                ("name".to_string(), CellValue::from(format!("row {i}").as_str())),
            ])
        })
        .collect()
}

/// `id` (100 px) and `name` (200 px) columns.
pub fn id_name_columns() -> Vec<ColumnConfig> {
    vec![
        ColumnConfig::new("Id", "id").width(100.0),
        ColumnConfig::new("Name", "name").width(200.0),
    ]
}

// ============================================================================
// Grid
// ============================================================================

/// A grid wired to a manual scheduler and a recording host.
pub struct Harness {
    pub grid: GridRenderer,
    pub scheduler: ManualScheduler,
    pub host: RecordingHost,
    pub surface: RecordingContext,
}

impl Harness {
    pub fn new(options: GridOptions) -> Self {
        let scheduler = ManualScheduler::new();
        let host = RecordingHost::default();
        let grid = GridRenderer::new(options, Box::new(scheduler.clone()), Box::new(host.clone()));
        Self {
            grid,
            scheduler,
            host,
            surface: RecordingContext::new(),
        }
    }

    /// 400x396 logical surface (10 body rows of 36 px under a 36 px
    /// header), ratio 1, `id`/`name` columns and `rows` numbered rows.
    pub fn with_rows(rows: usize) -> Self {
        let mut h = Self::new(GridOptions::default());
        h.grid.resize(400.0, 396.0, 1.0);
        h.grid.configure_columns(&id_name_columns());
        h.grid.set_data(Some(numbered_rows(rows)));
        h
    }

    /// Run the pending frame, if any, against a fresh recording.
    pub fn frame(&mut self) -> Option<FrameStats> {
        if self.scheduler.take_frames().is_empty() {
            return None;
        }
        self.surface.clear();
        Some(self.grid.draw_frame(&mut self.surface))
    }

    /// Fire every pending timer.
    pub fn fire_timers(&mut self) {
        for token in self.scheduler.take_timers() {
            self.grid.on_timer(token);
        }
    }
}
