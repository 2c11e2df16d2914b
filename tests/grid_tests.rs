//! Grid renderer behavior tests
//!
//! Drives a `GridRenderer` through a manual scheduler and a recording host
//! and checks ordering, scheduling, scrolling, input and drawing.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use canvas_table::render::DrawOp;
use canvas_table::{
    CaptureMode, CellStyle, CellValue, ColumnConfig, CursorStyle, DeltaMode, EditNavigation,
    EditOutcome, GridError, GridEvent, GridOptions, KeyCode, Record, RowStyleArgs, SortColumn,
    ROWNUM_FIELD,
};
use common::{id_name_columns, name_row, numbered_rows, Harness, HostCall};
use test_case::test_case;

/// Collect every event the grid emits.
fn record_events(h: &mut Harness) -> Rc<RefCell<Vec<GridEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    h.grid.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

fn order(h: &Harness) -> Vec<usize> {
    h.grid.row_index().unwrap().as_slice().to_vec()
}

fn edit_options() -> GridOptions {
    GridOptions {
        allow_edit: true,
        ..GridOptions::default()
    }
}

/// Body y (logical) at the middle of a row-order position, unscrolled.
fn band(position: usize) -> f64 {
    36.0 + position as f64 * 36.0 + 18.0
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_sort_is_stable() {
    let mut h = Harness::with_rows(0);
    let rows: Vec<Record> = ["b", "a", "b", "a", "c"].iter().map(|s| name_row(s)).collect();
    h.grid.set_data(Some(rows));

    h.grid.set_sort(vec![SortColumn::ascending("name")]);
    assert_eq!(order(&h), vec![1, 3, 0, 2, 4]);

    h.grid.set_sort(vec![SortColumn::descending("name")]);
    assert_eq!(order(&h), vec![4, 0, 2, 1, 3]);
}

#[test]
fn test_empty_sort_restores_natural_order() {
    let mut h = Harness::with_rows(5);
    h.grid.set_sort(vec![SortColumn::descending(ROWNUM_FIELD)]);
    assert_eq!(order(&h), vec![4, 3, 2, 1, 0]);
    h.grid.set_sort(Vec::new());
    assert_eq!(order(&h), vec![0, 1, 2, 3, 4]);
}

fn mixed_rows() -> Vec<Record> {
    vec![
        name_row("b"),
        name_row(""),
        name_row("a"),
        Record::from([("name".to_string(), CellValue::Null)]),
    ]
}

#[test]
fn test_ascending_puts_empty_then_null_last() {
    let mut h = Harness::with_rows(0);
    h.grid.set_data(Some(mixed_rows()));
    h.grid.set_sort(vec![SortColumn::ascending("name")]);
    assert_eq!(order(&h), vec![2, 0, 1, 3]);
}

#[test]
fn test_descending_keeps_empty_and_null_at_tail() {
    let mut h = Harness::with_rows(0);
    let mut rows = mixed_rows();
    rows.push(Record::new());
    h.grid.set_data(Some(rows));
    h.grid.set_sort(vec![SortColumn::descending("name")]);
    assert_eq!(order(&h), vec![0, 2, 1, 3, 4]);
}

#[test]
fn test_second_key_breaks_ties() {
    let mut h = Harness::with_rows(0);
    let rows = vec![
        Record::from([("g".to_string(), CellValue::from("x")), ("n".to_string(), CellValue::from(2.0))]),
        Record::from([("g".to_string(), CellValue::from("x")), ("n".to_string(), CellValue::from(1.0))]),
        Record::from([("g".to_string(), CellValue::from("a")), ("n".to_string(), CellValue::from(3.0))]),
    ];
    h.grid.set_data(Some(rows));
    h.grid
        .set_sort(vec![SortColumn::ascending("g"), SortColumn::descending("n")]);
    assert_eq!(order(&h), vec![2, 0, 1]);
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_redraw_requests_collapse_into_one_frame() {
    let mut h = Harness::with_rows(20);
    assert_eq!(h.scheduler.frame_requests(), 1);

    for _ in 0..5 {
        h.grid.request_redraw();
    }
    assert_eq!(h.scheduler.frame_requests(), 1);
    assert!(h.grid.is_plan_to_redraw());

    assert!(h.frame().is_some());
    assert!(!h.grid.is_plan_to_redraw());
    assert!(h.frame().is_none());

    h.grid.request_redraw();
    assert_eq!(h.scheduler.frame_requests(), 2);
}

#[test]
fn test_discarded_frame_is_cancelled_with_the_scheduler() {
    let mut h = Harness::with_rows(20);
    assert_eq!(h.scheduler.pending_frames(), 1);

    h.grid.discard_frame();
    assert_eq!(h.scheduler.pending_frames(), 0);
    assert!(!h.grid.is_plan_to_redraw());

    h.grid.request_redraw();
    assert_eq!(h.scheduler.pending_frames(), 1);
    assert!(h.frame().is_some());
}

#[test]
fn test_frame_without_data_is_skipped() {
    let mut h = Harness::new(GridOptions::default());
    h.grid.resize(200.0, 200.0, 1.0);
    let stats = h.frame().unwrap();
    assert!(stats.skipped);
    assert!(h.surface.ops().is_empty());
}

#[test]
fn test_row_redraw_is_partial() {
    let mut h = Harness::with_rows(20);
    h.frame();

    h.grid.set_edited_value(3, "name", CellValue::from("changed"));
    let stats = h.frame().unwrap();
    assert!(stats.partial);
    assert_eq!(stats.rows_drawn, 1);
    assert!(h.surface.texts().contains(&"changed"));
    assert!(matches!(h.surface.ops().first(), Some(DrawOp::Save)));
    assert!(matches!(
        h.surface.ops().get(1),
        Some(DrawOp::Clip { y, .. }) if *y == 36.0
    ));
}

#[test]
fn test_full_redraw_wins_over_partial() {
    let mut h = Harness::with_rows(20);
    h.frame();

    h.grid.set_edited_value(3, "name", CellValue::from("changed"));
    h.grid.request_redraw();
    h.grid.request_row_redraw(4);
    let stats = h.frame().unwrap();
    assert!(!stats.partial);
    assert_eq!(stats.rows_drawn, 10);
}

#[test]
fn test_edit_on_sorted_field_reindexes() {
    let mut h = Harness::with_rows(3);
    h.grid.set_sort(vec![SortColumn::ascending("name")]);
    h.frame();

    h.grid.set_edited_value(2, "name", CellValue::from("a first"));
    assert_eq!(order(&h), vec![2, 0, 1]);
    let stats = h.frame().unwrap();
    assert!(!stats.partial);
}

// ============================================================================
// Scrolling
// ============================================================================

#[test]
fn test_scroll_is_clamped() {
    let mut h = Harness::with_rows(100);
    assert!(h.grid.scroll().has_y());
    assert!(!h.grid.scroll().has_x());
    assert_eq!(h.grid.scroll().max_y(), 3600.0 - 360.0);

    h.grid.scroll_to(0.0, 1e9);
    assert_eq!(h.grid.scroll().pos_y(), 3240.0);
    h.grid.scroll_to(-5.0, -5.0);
    assert_eq!(h.grid.scroll().pos_y(), 0.0);
}

#[test]
fn test_shrinking_data_resets_scroll() {
    let mut h = Harness::with_rows(100);
    h.grid.scroll_to(0.0, 1000.0);
    h.grid.set_data(Some(numbered_rows(3)));
    assert!(!h.grid.scroll().has_y());
    assert_eq!(h.grid.scroll().pos_y(), 0.0);
}

#[test]
fn test_wheel_reports_scroll_geometry() {
    let mut h = Harness::with_rows(100);
    let events = record_events(&mut h);

    h.grid.on_wheel(DeltaMode::Line, 0.0, 2.0);
    assert_eq!(h.grid.scroll().pos_y(), 72.0);
    assert_eq!(
        events.borrow().last(),
        Some(&GridEvent::ScrollGeometryChanged {
            pos_x: 0.0,
            pos_y: 72.0,
            max_x: 0.0,
            max_y: 3240.0,
        })
    );

    // A repeated position emits nothing.
    let before = events.borrow().len();
    h.grid.scroll_to(0.0, 0.0);
    h.grid.scroll_to(0.0, 0.0);
    assert_eq!(events.borrow().len(), before + 1);
}

#[test]
fn test_held_arrow_repeats_until_release() {
    let mut h = Harness::with_rows(100);
    h.frame();

    // Bottom arrow of the vertical bar.
    h.grid.on_mouse_down(395.0, 390.0);
    assert_eq!(h.grid.scroll().pos_y(), 36.0);
    h.frame();
    assert_eq!(h.scheduler.pending_timers().len(), 1);

    h.fire_timers();
    h.frame();
    assert_eq!(h.grid.scroll().pos_y(), 43.0);
    h.frame();
    assert_eq!(h.grid.scroll().pos_y(), 50.0);

    h.grid.on_mouse_up(395.0, 390.0);
    h.frame();
    assert_eq!(h.grid.scroll().pos_y(), 50.0);
    assert_eq!(h.scheduler.pending_frames(), 0);
}

#[test]
fn test_thumb_drag_switches_capture() {
    let mut h = Harness::with_rows(100);
    h.grid.on_mouse_down(395.0, 12.0);
    assert!(h.grid.scroll().is_dragging());
    assert_eq!(h.host.calls(), vec![HostCall::Capture(CaptureMode::Global)]);

    h.grid.on_mouse_move_extended(0.0, 8.0 + (396.0 - 16.0) / 2.0);
    assert_eq!(h.grid.scroll().pos_y(), 3240.0 / 2.0);

    h.grid.on_mouse_up_extended(0.0, 0.0);
    assert!(!h.grid.scroll().is_dragging());
    assert_eq!(
        h.host.calls().last(),
        Some(&HostCall::Capture(CaptureMode::Surface))
    );
}

// ============================================================================
// Hit testing
// ============================================================================

#[test]
fn test_row_at_second_band() {
    let h = Harness::with_rows(3);
    let hit = h.grid.row_at(band(1)).unwrap();
    assert_eq!(hit.position, 1);
    assert_eq!(hit.row, 1);
}

#[test]
fn test_row_at_outside_body() {
    let h = Harness::with_rows(3);
    assert_eq!(h.grid.row_at(10.0), None);
    assert_eq!(h.grid.row_at(band(3)), None);
}

#[test]
fn test_row_at_follows_scroll_and_sort() {
    let mut h = Harness::with_rows(100);
    h.grid.scroll_to(0.0, 360.0);
    assert_eq!(h.grid.row_at(40.0).unwrap().position, 10);

    h.grid.set_sort(vec![SortColumn::descending(ROWNUM_FIELD)]);
    let hit = h.grid.row_at(40.0).unwrap();
    assert_eq!(hit.position, 10);
    assert_eq!(hit.row, 89);
}

#[test]
fn test_cell_rect_clips_under_header() {
    let mut h = Harness::with_rows(100);
    h.grid.scroll_to(0.0, 18.0);
    let rect = h.grid.cell_rect(1, 0).unwrap();
    assert_eq!(rect.x, 101.0);
    assert_eq!(rect.y, 18.0);
    assert_eq!(rect.width, 200.0);
    assert_eq!(rect.clip_top, Some(18.0));
    assert_eq!(rect.clip_left, None);
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_only_visible_rows_are_drawn() {
    let mut h = Harness::with_rows(100);
    let stats = h.frame().unwrap();
    assert_eq!(stats.rows_drawn, 10);
    assert_eq!(stats.cells_drawn, 20);

    h.grid.scroll_to(0.0, 18.0);
    let stats = h.frame().unwrap();
    assert!(stats.rows_drawn >= 10 && stats.rows_drawn <= 12);
    assert!(h.surface.texts().contains(&"row 0"));
    assert!(h.surface.texts().contains(&"row 10"));
    assert!(!h.surface.texts().contains(&"row 11"));
}

#[test]
fn test_header_draws_sort_arrow() {
    let mut h = Harness::with_rows(5);
    h.frame();
    let polygons = |h: &Harness| {
        h.surface
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Polygon { .. }))
            .count()
    };
    assert_eq!(polygons(&h), 0);

    h.grid.set_sort(vec![SortColumn::ascending("name")]);
    h.frame();
    assert_eq!(polygons(&h), 1);
    assert!(h.surface.texts().contains(&"Name"));
}

#[test]
fn test_long_text_is_clipped() {
    let mut h = Harness::with_rows(0);
    h.grid.set_data(Some(vec![name_row(&"w".repeat(40)), name_row("ok")]));
    let stats = h.frame().unwrap();
    assert_eq!(stats.clipped_cells, 1);
}

#[test]
fn test_alternate_rows_use_alternate_background() {
    let mut h = Harness::with_rows(4);
    h.frame();
    let alternate = h.grid.options().style.alternate_background_color.clone();
    // positions 0 and 2, two columns each
    assert_eq!(h.surface.fills_with(&alternate), 4);
}

#[test]
fn test_hover_row_is_highlighted() {
    let mut h = Harness::new(GridOptions {
        hover_tracking: true,
        ..GridOptions::default()
    });
    h.grid.resize(400.0, 396.0, 1.0);
    h.grid.configure_columns(&id_name_columns());
    h.grid.set_data(Some(numbered_rows(5)));
    h.frame();

    h.grid.on_mouse_move(50.0, band(2));
    let stats = h.frame().unwrap();
    assert!(!stats.partial);
    let hover = h.grid.options().style.hover_background_color.clone();
    assert_eq!(h.surface.fills_with(&hover), 2);

    h.grid.on_mouse_leave();
    h.frame();
    assert_eq!(h.surface.fills_with(&hover), 0);
}

#[test]
fn test_selection_box_needs_focus_and_edit() {
    let mut h = Harness::new(edit_options());
    h.grid.resize(400.0, 396.0, 1.0);
    h.grid.configure_columns(&id_name_columns());
    h.grid.set_data(Some(numbered_rows(5)));
    h.grid.on_mouse_down(50.0, band(1));
    h.frame();
    let select = h.grid.options().style.select_line_color.clone();
    let boxes = |h: &Harness| {
        h.surface
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::StrokeRect { color, .. } if *color == select))
            .count()
    };
    assert_eq!(boxes(&h), 0);

    h.grid.set_focus(true);
    h.frame();
    assert_eq!(boxes(&h), 1);
}

#[test]
fn test_pixel_ratio_scales_drawing() {
    let mut h = Harness::with_rows(100);
    h.grid.resize(400.0, 396.0, 2.0);
    assert_eq!(h.grid.canvas_size(), (800.0, 792.0));
    assert_eq!(h.grid.columns().get(1).unwrap().left_pos, 201.0);
    let stats = h.frame().unwrap();
    assert_eq!(stats.rows_drawn, 10);
    assert!(h
        .surface
        .ops()
        .iter()
        .any(|op| matches!(op, DrawOp::Text { font, .. } if font == "32px arial")));
}

// ============================================================================
// Callbacks
// ============================================================================

#[test]
fn test_formatter_failure_is_logged() {
    let mut h = Harness::with_rows(3);
    let logged = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&logged);
    h.grid
        .set_log_hook(Box::new(move |e| sink.borrow_mut().push(e.to_string())));
    h.grid.configure_columns(&[ColumnConfig::new("Name", "name")
        .width(200.0)
        .formatter(|args| {
            if args.row_id == 1 {
                Err(GridError::from("boom"))
            } else {
                Ok(args.text.to_uppercase())
            }
        })]);
    h.frame();

    let texts = h.surface.texts();
    assert!(texts.contains(&"ROW 0"));
    assert!(texts.contains(&"row 1"));
    assert_eq!(logged.borrow().len(), 1);
    assert!(logged.borrow()[0].contains("formatter"));
}

fn highlight_first_row(args: &RowStyleArgs<'_>) -> canvas_table::Result<Option<CellStyle>> {
    if args.row_id != 0 {
        return Ok(None);
    }
    Ok(Some(CellStyle {
        background_color: Some("red".to_string()),
        font_color: Some("white".to_string()),
        ..CellStyle::default()
    }))
}

fn failing_style(_args: &RowStyleArgs<'_>) -> canvas_table::Result<Option<CellStyle>> {
    Err(GridError::from("bad style"))
}

#[test]
fn test_row_style_overrides_background() {
    let mut h = Harness::with_rows(3);
    h.grid.set_row_style(Some(Rc::new(highlight_first_row)));
    h.frame();
    assert_eq!(h.surface.fills_with("red"), 2);
    assert!(h
        .surface
        .ops()
        .iter()
        .any(|op| matches!(op, DrawOp::Text { text, color, .. } if text == "row 0" && color == "white")));
}

#[test]
fn test_row_style_failure_falls_back() {
    let mut h = Harness::with_rows(2);
    let logged = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&logged);
    h.grid.set_log_hook(Box::new(move |_| *sink.borrow_mut() += 1));
    h.grid.set_row_style(Some(Rc::new(failing_style)));
    let stats = h.frame().unwrap();
    assert_eq!(stats.cells_drawn, 4);
    assert_eq!(*logged.borrow(), 4);
}

// ============================================================================
// Pointer input
// ============================================================================

#[test]
fn test_click_selects_and_notifies() {
    let mut h = Harness::with_rows(5);
    let events = record_events(&mut h);
    h.grid.on_mouse_down(150.0, band(2));
    let selection = h.grid.selection().unwrap();
    assert_eq!((selection.position, selection.row, selection.column), (2, 2, 1));
    assert_eq!(
        events.borrow().as_slice(),
        &[GridEvent::Click {
            position: 2,
            row: 2,
            column: 1
        }]
    );
}

#[test]
fn test_header_click_toggles_sort() {
    let mut h = Harness::with_rows(12);
    let events = record_events(&mut h);

    h.grid.on_mouse_down(150.0, 10.0);
    assert_eq!(h.grid.sort(), &[SortColumn::ascending("name")]);
    assert_eq!(&order(&h)[..4], &[0, 1, 10, 11]);

    h.grid.on_mouse_down(150.0, 10.0);
    assert_eq!(h.grid.sort(), &[SortColumn::descending("name")]);
    assert_eq!(&order(&h)[..2], &[9, 8]);

    h.grid.on_mouse_down(150.0, 10.0);
    assert_eq!(h.grid.sort(), &[SortColumn::ascending("name")]);

    assert_eq!(
        events.borrow()[0],
        GridEvent::HeaderClick {
            column: 1,
            field: "name".to_string()
        }
    );
}

#[test]
fn test_selection_follows_row_through_sort() {
    let mut h = Harness::with_rows(5);
    h.grid.on_mouse_down(50.0, band(0));
    h.grid.set_sort(vec![SortColumn::descending(ROWNUM_FIELD)]);
    let selection = h.grid.selection().unwrap();
    assert_eq!(selection.row, 0);
    assert_eq!(selection.position, 4);
}

#[test]
fn test_column_resize_drag_stops_at_floor() {
    let mut h = Harness::with_rows(5);
    h.grid.on_mouse_down(101.0, 10.0);
    assert!(h.grid.state().resize.is_some());
    assert_eq!(h.host.calls(), vec![HostCall::Capture(CaptureMode::Global)]);
    // A press on the handle does not sort.
    assert!(h.grid.sort().is_empty());

    h.grid.on_mouse_move_extended(131.0, 10.0);
    assert_eq!(h.grid.columns().get(0).unwrap().width, 130.0);

    h.grid.on_mouse_move_extended(-200.0, 10.0);
    assert_eq!(h.grid.columns().get(0).unwrap().width, 10.0);
    assert_eq!(h.grid.columns().get(1).unwrap().left_pos, 11.0);

    // Anchor moved by the applied delta only.
    h.grid.on_mouse_move_extended(-180.0, 10.0);
    assert_eq!(h.grid.columns().get(0).unwrap().width, 10.0);
    h.grid.on_mouse_move_extended(21.0, 10.0);
    assert_eq!(h.grid.columns().get(0).unwrap().width, 20.0);

    h.grid.on_mouse_up_extended(21.0, 10.0);
    assert!(h.grid.state().resize.is_none());
    assert_eq!(
        h.host.calls().last(),
        Some(&HostCall::Capture(CaptureMode::Surface))
    );
}

#[test]
fn test_cursor_changes_over_resize_handle() {
    let mut h = Harness::with_rows(5);
    h.grid.on_mouse_move(101.0, 10.0);
    h.grid.on_mouse_move(100.0, 10.0);
    h.grid.on_mouse_move(50.0, band(1));
    h.grid.on_mouse_move(60.0, band(1));
    assert_eq!(
        h.host.cursors(),
        vec![CursorStyle::ColResize, CursorStyle::Default]
    );
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn test_arrow_down_scrolls_selection_into_view() {
    let mut h = Harness::with_rows(100);
    h.grid.on_mouse_down(50.0, band(0));
    for _ in 0..9 {
        h.grid.on_key_down(KeyCode::ArrowDown);
    }
    assert_eq!(h.grid.selection().unwrap().position, 9);
    assert_eq!(h.grid.scroll().pos_y(), 0.0);

    h.grid.on_key_down(KeyCode::ArrowDown);
    assert_eq!(h.grid.selection().unwrap().row, 10);
    assert_eq!(h.grid.scroll().pos_y(), 36.0);

    for _ in 0..10 {
        h.grid.on_key_down(KeyCode::ArrowUp);
    }
    assert_eq!(h.grid.selection().unwrap().position, 0);
    assert_eq!(h.grid.scroll().pos_y(), 0.0);

    // Already at the top.
    h.grid.on_key_down(KeyCode::ArrowUp);
    assert_eq!(h.grid.selection().unwrap().position, 0);
}

#[test]
fn test_arrow_left_right_stay_in_columns() {
    let mut h = Harness::with_rows(5);
    h.grid.on_mouse_down(50.0, band(0));
    h.grid.on_key_down(KeyCode::ArrowRight);
    assert_eq!(h.grid.selection().unwrap().column, 1);
    h.grid.on_key_down(KeyCode::ArrowRight);
    assert_eq!(h.grid.selection().unwrap().column, 1);
    h.grid.on_key_down(KeyCode::ArrowLeft);
    h.grid.on_key_down(KeyCode::ArrowLeft);
    assert_eq!(h.grid.selection().unwrap().column, 0);
}

#[test]
fn test_arrow_brings_selection_back_from_either_side() {
    let mut h = Harness::with_rows(100);
    h.grid.on_mouse_down(50.0, band(0));

    // Selection above the viewport: Down scrolls back to it.
    h.grid.scroll_to(0.0, 1800.0);
    h.grid.on_key_down(KeyCode::ArrowDown);
    assert_eq!(h.grid.selection().unwrap().position, 1);
    assert_eq!(h.grid.scroll().pos_y(), 36.0);

    // Selection below the viewport: Up scrolls forward to it.
    h.grid.scroll_to(0.0, 1800.0);
    h.grid.on_mouse_down(50.0, band(0));
    assert_eq!(h.grid.selection().unwrap().position, 50);
    h.grid.scroll_to(0.0, 0.0);
    h.grid.on_key_down(KeyCode::ArrowUp);
    assert_eq!(h.grid.selection().unwrap().position, 49);
    assert_eq!(h.grid.scroll().pos_y(), 1440.0);
}

#[test]
fn test_arrow_brings_column_back_from_either_side() {
    let mut h = Harness::with_rows(100);
    h.grid.configure_columns(&[
        ColumnConfig::new("Id", "id").width(300.0),
        ColumnConfig::new("Name", "name").width(300.0),
        ColumnConfig::new("Note", "note").width(300.0),
    ]);
    h.grid.on_mouse_down(50.0, band(0));
    assert_eq!(h.grid.selection().unwrap().column, 0);

    // Column left of the viewport: Right scrolls back to its left edge.
    h.grid.scroll_to(10_000.0, 0.0);
    h.grid.on_key_down(KeyCode::ArrowRight);
    assert_eq!(h.grid.selection().unwrap().column, 1);
    assert_eq!(h.grid.scroll().pos_x(), 301.0);

    // Column right of the viewport: Left scrolls forward to its right edge.
    h.grid.on_key_down(KeyCode::ArrowRight);
    h.grid.scroll_to(0.0, 0.0);
    h.grid.on_key_down(KeyCode::ArrowLeft);
    assert_eq!(h.grid.selection().unwrap().column, 1);
    // 601 right edge, 400 wide surface minus the 10 px vertical bar.
    assert_eq!(h.grid.scroll().pos_x(), 211.0);
}

#[test_case(KeyCode::ArrowDown, 36.0 ; "arrow down scrolls a line")]
#[test_case(KeyCode::PageDown, 396.0 ; "page down scrolls the surface height")]
#[test_case(KeyCode::Enter, 0.0 ; "enter does nothing without a selection")]
fn test_keys_scroll_without_selection(key: KeyCode, expected: f64) {
    let mut h = Harness::with_rows(100);
    h.grid.on_key_down(key);
    assert_eq!(h.grid.scroll().pos_y(), expected);
}

#[test]
fn test_enter_opens_editor_on_selection() {
    let mut h = Harness::new(edit_options());
    h.grid.resize(400.0, 396.0, 1.0);
    h.grid.configure_columns(&id_name_columns());
    h.grid.set_data(Some(numbered_rows(5)));
    h.grid.on_mouse_down(150.0, band(2));
    h.grid.on_key_down(KeyCode::Enter);
    let opened = h.host.opened();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].row, 2);
    assert_eq!(opened[0].value, "row 2");
}

// ============================================================================
// Editing
// ============================================================================

fn edit_harness(columns: &[ColumnConfig]) -> Harness {
    let mut h = Harness::new(edit_options());
    h.grid.resize(400.0, 396.0, 1.0);
    h.grid.configure_columns(columns);
    h.grid.set_data(Some(numbered_rows(5)));
    h.frame();
    h
}

fn commit(column: usize, field: &str, row: usize, value: &str, action: EditNavigation) -> EditOutcome {
    EditOutcome {
        cancel: false,
        new_value: value.to_string(),
        column: Some(column),
        field: Some(field.to_string()),
        row: Some(row),
        action,
    }
}

#[test]
fn test_double_click_opens_editor_with_cell_rect() {
    let mut h = edit_harness(&id_name_columns());
    let events = record_events(&mut h);
    h.grid.on_double_click(150.0, band(1));

    let opened = h.host.opened();
    assert_eq!(opened.len(), 1);
    let request = &opened[0];
    assert_eq!((request.column, request.row), (1, 1));
    assert_eq!(request.field, "name");
    assert_eq!(request.value, "row 1");
    assert_eq!(request.cell_height, 36.0);
    assert_eq!((request.rect.x, request.rect.y), (101.0, 72.0));
    assert_eq!(request.rect.clip_top, None);
    assert!(h.grid.editing().is_some());
    assert!(matches!(events.borrow()[0], GridEvent::DoubleClick { row: 1, .. }));
}

#[test]
fn test_double_click_without_edit_only_notifies() {
    let mut h = Harness::with_rows(5);
    let events = record_events(&mut h);
    h.grid.on_double_click(150.0, band(1));
    assert!(h.host.opened().is_empty());
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn test_commit_shadows_value_and_notifies() {
    let mut h = edit_harness(&id_name_columns());
    let events = record_events(&mut h);
    h.grid.on_double_click(150.0, band(1));
    h.frame();

    h.grid
        .on_edit_removed(commit(1, "name", 1, "renamed", EditNavigation::None));
    assert_eq!(h.grid.value(1, "name"), Some(&CellValue::from("renamed")));
    assert!(h.grid.editing().is_none());
    assert_eq!(
        events.borrow().last(),
        Some(&GridEvent::EditCommitted {
            row: 1,
            field: "name".to_string(),
            value: CellValue::from("renamed"),
        })
    );

    let stats = h.frame().unwrap();
    assert!(stats.partial);
    assert!(h.surface.texts().contains(&"renamed"));

    // New rows drop the shadow.
    h.grid.set_data(Some(numbered_rows(5)));
    assert_eq!(h.grid.value(1, "name"), Some(&CellValue::from("row 1")));
}

#[test]
fn test_unchanged_or_cancelled_edit_commits_nothing() {
    let mut h = edit_harness(&id_name_columns());
    let events = record_events(&mut h);
    h.grid.on_double_click(150.0, band(1));
    h.grid
        .on_edit_removed(commit(1, "name", 1, "row 1", EditNavigation::None));
    assert!(h.grid.state().edits.is_empty());

    h.grid.on_double_click(150.0, band(1));
    h.grid.on_edit_removed(EditOutcome {
        cancel: true,
        ..commit(1, "name", 1, "other", EditNavigation::MoveNext)
    });
    assert!(h.grid.state().edits.is_empty());
    assert!(h.grid.editing().is_none());
    assert_eq!(h.host.opened().len(), 2);
    assert!(!events
        .borrow()
        .iter()
        .any(|e| matches!(e, GridEvent::EditCommitted { .. })));
}

#[test]
fn test_stale_field_is_dropped() {
    let mut h = edit_harness(&id_name_columns());
    h.grid.on_double_click(150.0, band(1));
    h.grid
        .on_edit_removed(commit(1, "id", 1, "x", EditNavigation::None));
    assert!(h.grid.state().edits.is_empty());
}

#[test]
fn test_tab_moves_to_next_editable_column() {
    let columns = vec![
        ColumnConfig::new("Id", "id").width(80.0),
        ColumnConfig::new("#", ROWNUM_FIELD).width(40.0),
        ColumnConfig::new("Name", "name").width(150.0),
    ];
    let mut h = edit_harness(&columns);
    assert!(h.grid.open_editor(0, 2));
    assert!(!h.grid.open_editor(1, 2));

    h.grid
        .on_edit_removed(commit(0, "id", 2, "2", EditNavigation::MoveNext));
    let opened = h.host.opened();
    assert_eq!(opened.len(), 2);
    assert_eq!(opened[1].column, 2);
    assert_eq!(h.grid.editing().unwrap().field, "name");

    h.grid
        .on_edit_removed(commit(2, "name", 2, "row 2", EditNavigation::MovePrev));
    assert_eq!(h.host.opened()[2].column, 0);

    h.grid
        .on_edit_removed(commit(0, "id", 2, "2", EditNavigation::MovePrev));
    assert_eq!(h.host.opened().len(), 3);
    assert!(h.grid.editing().is_none());
}

#[test]
fn test_replaced_overlay_keeps_new_target() {
    let mut h = edit_harness(&id_name_columns());
    h.grid.open_editor(1, 0);
    h.grid.open_editor(1, 3);
    h.grid.on_edit_removed(EditOutcome {
        cancel: true,
        ..commit(1, "name", 0, "", EditNavigation::None)
    });
    assert_eq!(h.grid.editing().unwrap().row, 3);
}

#[test]
fn test_scrolling_moves_open_editor() {
    let mut h = Harness::new(edit_options());
    h.grid.resize(400.0, 396.0, 1.0);
    h.grid.configure_columns(&id_name_columns());
    h.grid.set_data(Some(numbered_rows(100)));
    h.grid.open_editor(1, 5);
    h.host.take();

    h.grid.on_wheel(DeltaMode::Pixel, 0.0, 36.0);
    let moved: Vec<_> = h
        .host
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            HostCall::Move(rect) => Some(rect),
            _ => None,
        })
        .collect();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].y, 36.0 + 5.0 * 36.0 - 36.0);
}

#[test]
fn test_reconfiguring_columns_closes_editor() {
    let mut h = edit_harness(&id_name_columns());
    h.grid.open_editor(1, 0);
    h.grid.configure_columns(&id_name_columns());
    assert!(h.grid.editing().is_none());
    assert_eq!(h.host.calls().last(), Some(&HostCall::Close));
}
