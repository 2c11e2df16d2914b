//! Two-axis scrollbar controller.
//!
//! Tracks the scroll position of both axes, the thumb geometry, hover and
//! drag state, and the press-and-hold auto-repeat. It knows nothing about
//! rows or columns: the owner feeds it sizes and pointer events, and drains
//! `ScrollSignals` afterwards to learn whether to repaint, notify
//! listeners, or change pointer capture.
//!
//! Sizes and positions are device pixels; pointer coordinates are logical.

mod draw;

use crate::host::{Scheduler, TimerToken};
use crate::types::{CaptureMode, DeltaMode, KeyCode, ScrollbarStyle};

/// Scrollbar thickness in logical pixels.
pub const SCROLLBAR_SIZE: f64 = 10.0;
/// Arrow button length in logical pixels.
pub const ARROW_SIZE: f64 = 8.0;
/// Minimum thumb length in logical pixels.
pub const MIN_THUMB_SIZE: f64 = 18.0;
/// Hold time before a pressed button starts repeating.
pub const REPEAT_DELAY_MS: u32 = 500;

const ARROW_SPEED: f64 = 7.0;
const TRACK_SPEED: f64 = 14.0;
/// Overlap kept visible when jumping a page from the track.
const PAGE_OVERLAP: f64 = 20.0;
/// Extra hit slop around the arrow buttons.
const ARROW_SLOP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Interactive part of one scrollbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPart {
    StartArrow,
    Thumb,
    EndArrow,
}

/// What lies under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Content,
    Corner,
    Part(Axis, ScrollPart),
    TrackBefore(Axis),
    TrackAfter(Axis),
}

/// Requests accumulated since the last `take_signals`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollSignals {
    /// A position changed
    pub scrolled: bool,
    /// The owner should redraw
    pub repaint: bool,
    /// The owner should switch pointer capture
    pub capture: Option<CaptureMode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Repeat {
    axis: Axis,
    /// Logical pixels per frame, signed
    step: f64,
}

/// State of one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisState {
    visible: bool,
    pos: f64,
    max: f64,
    /// Content size over viewport size
    page: f64,
}

#[derive(Debug, Clone)]
pub struct ScrollView {
    style: ScrollbarStyle,
    ratio: f64,
    canvas_width: f64,
    canvas_height: f64,
    content: Option<(f64, f64)>,
    line_height: f64,
    x: AxisState,
    y: AxisState,
    hover: Option<(Axis, ScrollPart)>,
    dragging: Option<Axis>,
    pending: Option<(TimerToken, Repeat)>,
    running: Option<Repeat>,
    signals: ScrollSignals,
}

impl ScrollView {
    pub fn new(style: ScrollbarStyle, line_height: f64) -> Self {
        Self {
            style,
            ratio: 1.0,
            canvas_width: 0.0,
            canvas_height: 0.0,
            content: None,
            line_height,
            x: AxisState::default(),
            y: AxisState::default(),
            hover: None,
            dragging: None,
            pending: None,
            running: None,
            signals: ScrollSignals::default(),
        }
    }

    pub fn set_style(&mut self, style: ScrollbarStyle) {
        self.style = style;
    }

    /// Line step in logical pixels for arrows, keys and line-mode wheel.
    pub fn set_line_height(&mut self, line_height: f64) {
        self.line_height = line_height;
    }

    pub fn pos_x(&self) -> f64 {
        self.x.pos
    }

    pub fn pos_y(&self) -> f64 {
        self.y.pos
    }

    pub fn max_x(&self) -> f64 {
        self.x.max
    }

    pub fn max_y(&self) -> f64 {
        self.y.max
    }

    pub fn has_x(&self) -> bool {
        self.x.visible
    }

    pub fn has_y(&self) -> bool {
        self.y.visible
    }

    /// Scrollbar thickness in logical pixels.
    pub fn size(&self) -> f64 {
        SCROLLBAR_SIZE
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn hover(&self) -> Option<(Axis, ScrollPart)> {
        self.hover
    }

    /// True while a held button scrolls continuously.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Drain the accumulated owner requests.
    pub fn take_signals(&mut self) -> ScrollSignals {
        std::mem::take(&mut self.signals)
    }

    /// Recompute which axes scroll and their range, then clamp positions.
    ///
    /// `header_height` is logical; canvas and content sizes are device
    /// pixels. Without a content size neither axis scrolls.
    pub fn set_size(
        &mut self,
        ratio: f64,
        canvas_width: f64,
        canvas_height: f64,
        header_height: f64,
        content: Option<(f64, f64)>,
    ) {
        self.ratio = ratio;
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.content = content;

        let Some((width, height)) = content else {
            self.x = AxisState {
                pos: self.x.pos,
                ..AxisState::default()
            };
            self.y = AxisState {
                pos: self.y.pos,
                ..AxisState::default()
            };
            self.clamp();
            return;
        };

        let bar = SCROLLBAR_SIZE * ratio;
        let view_h_both = canvas_height - header_height * ratio - bar;
        let view_w_both = canvas_width - bar;
        if height > view_h_both && width > view_w_both {
            self.y.visible = true;
            self.y.page = height / view_h_both;
            self.y.max = height - view_h_both;
            self.x.visible = true;
            self.x.page = width / view_w_both;
            self.x.max = width - view_w_both;
        } else {
            let view_h = canvas_height - header_height * ratio;
            self.y.page = height / view_h;
            self.y.visible = self.y.page >= 1.0;
            self.y.max = if self.y.visible { height - view_h } else { 0.0 };

            self.x.page = width / canvas_width;
            self.x.visible = self.x.page >= 1.0;
            self.x.max = if self.x.visible { width - canvas_width } else { 0.0 };
        }
        self.clamp();
    }

    fn clamp(&mut self) {
        if self.y.pos > self.y.max {
            self.set_pos_y(self.y.max);
        }
        if self.x.pos > self.x.max {
            self.set_pos_x(self.x.max);
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn set_pos_y(&mut self, value: f64) {
        let value = Self::clamped(&self.y, value);
        if value != self.y.pos {
            self.y.pos = value;
            self.signals.scrolled = true;
            self.signals.repaint = true;
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn set_pos_x(&mut self, value: f64) {
        let value = Self::clamped(&self.x, value);
        if value != self.x.pos {
            self.x.pos = value;
            self.signals.scrolled = true;
            self.signals.repaint = true;
        }
    }

    fn clamped(axis: &AxisState, value: f64) -> f64 {
        if !axis.visible || value.is_nan() || value <= 0.0 {
            0.0
        } else {
            value.min(axis.max)
        }
    }

    fn set_pos(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.set_pos_x(value),
            Axis::Y => self.set_pos_y(value),
        }
    }

    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Advance a running auto-repeat. Call once at the start of every
    /// drawing pass; `true` means another frame is needed.
    pub fn before_draw(&mut self) -> bool {
        let Some(repeat) = self.running else {
            return false;
        };
        let pos = self.axis(repeat.axis).pos;
        self.set_pos(repeat.axis, pos + repeat.step * self.ratio);
        true
    }

    /// Line and page keys. Returns `true` when the key was used.
    pub fn on_key_down(&mut self, key: KeyCode) -> bool {
        let line = self.line_height * self.ratio;
        let pos = self.y.pos;
        match key {
            KeyCode::PageUp => self.set_pos_y(pos - self.canvas_height),
            KeyCode::PageDown => self.set_pos_y(pos + self.canvas_height),
            KeyCode::ArrowUp => self.set_pos_y(pos - line),
            KeyCode::ArrowDown => self.set_pos_y(pos + line),
            _ => return false,
        }
        true
    }

    /// Wheel deltas in the given unit.
    pub fn on_scroll(&mut self, mode: DeltaMode, dx: f64, dy: f64) {
        let (unit_x, unit_y) = match mode {
            DeltaMode::Pixel => (1.0, 1.0),
            DeltaMode::Line => {
                let line = self.line_height * self.ratio;
                (line, line)
            }
            DeltaMode::Page => (self.canvas_width, self.canvas_height),
        };
        self.set_pos_y(self.y.pos + dy * unit_y);
        self.set_pos_x(self.x.pos + dx * unit_x);
    }

    /// Thumb extent along its axis in device pixels: `(start, length)`.
    #[allow(clippy::float_cmp)]
    fn thumb(&self, axis: Axis) -> (f64, f64) {
        let r = self.ratio;
        let (state, extent, other_visible) = match axis {
            Axis::Y => (&self.y, self.canvas_height, self.x.visible),
            Axis::X => (&self.x, self.canvas_width, self.y.visible),
        };
        let extent = extent - if other_visible { SCROLLBAR_SIZE * r } else { 0.0 };
        let track = extent - r * ARROW_SIZE * 2.0 - r * 8.0;
        let ratio = if state.max == 0.0 { 1.0 } else { state.pos / state.max };
        let length = (MIN_THUMB_SIZE * r).max(track / state.page);
        (ARROW_SIZE * r + ratio * (track - length), length)
    }

    fn locate(&self, x: f64, y: f64) -> Zone {
        let (has_x, has_y) = (self.x.visible, self.y.visible);
        if !has_x && !has_y {
            return Zone::Content;
        }
        let width = self.canvas_width / self.ratio;
        let height = self.canvas_height / self.ratio;
        let in_y_bar = has_y && x >= width - SCROLLBAR_SIZE;
        let in_x_bar = has_x && y >= height - SCROLLBAR_SIZE;
        if in_x_bar && in_y_bar {
            return Zone::Corner;
        }
        if in_y_bar {
            let end = height - ARROW_SIZE - ARROW_SLOP - if has_x { SCROLLBAR_SIZE } else { 0.0 };
            return Self::zone_along(Axis::Y, y, end, self.thumb(Axis::Y), self.ratio);
        }
        if in_x_bar {
            let end = width - ARROW_SIZE - ARROW_SLOP - if has_y { SCROLLBAR_SIZE } else { 0.0 };
            return Self::zone_along(Axis::X, x, end, self.thumb(Axis::X), self.ratio);
        }
        Zone::Content
    }

    fn zone_along(axis: Axis, v: f64, end: f64, (start, length): (f64, f64), r: f64) -> Zone {
        if v < ARROW_SIZE + ARROW_SLOP {
            Zone::Part(axis, ScrollPart::StartArrow)
        } else if v > end {
            Zone::Part(axis, ScrollPart::EndArrow)
        } else if v < start / r {
            Zone::TrackBefore(axis)
        } else if v > (start + length) / r {
            Zone::TrackAfter(axis)
        } else {
            Zone::Part(axis, ScrollPart::Thumb)
        }
    }

    fn set_hover(&mut self, hover: Option<(Axis, ScrollPart)>) {
        if self.hover != hover {
            self.hover = hover;
            self.signals.repaint = true;
        }
    }

    /// Pointer moved over the surface. Returns `true` when the pointer is
    /// over a scrollbar.
    pub fn on_mouse_move(&mut self, x: f64, y: f64) -> bool {
        match self.locate(x, y) {
            Zone::Content => {
                self.set_hover(None);
                false
            }
            Zone::Part(axis, part) => {
                self.set_hover(Some((axis, part)));
                true
            }
            Zone::Corner => {
                self.set_hover(None);
                true
            }
            Zone::TrackBefore(_) | Zone::TrackAfter(_) => true,
        }
    }

    /// Pointer pressed. Returns `true` when a scrollbar took the press.
    #[allow(clippy::float_cmp)]
    pub fn on_mouse_down(&mut self, x: f64, y: f64, scheduler: &mut dyn Scheduler) -> bool {
        let line = self.line_height * self.ratio;
        match self.locate(x, y) {
            Zone::Content => false,
            Zone::Corner => true,
            Zone::Part(axis, ScrollPart::StartArrow) => {
                let pos = self.axis(axis).pos;
                if pos != 0.0 {
                    self.set_pos(axis, pos - line);
                    self.arm(axis, -ARROW_SPEED, scheduler);
                }
                true
            }
            Zone::Part(axis, ScrollPart::EndArrow) => {
                let state = *self.axis(axis);
                if state.pos != state.max {
                    self.set_pos(axis, state.pos + line);
                    self.arm(axis, ARROW_SPEED, scheduler);
                }
                true
            }
            Zone::TrackBefore(axis) => {
                let pos = self.axis(axis).pos;
                self.set_pos(axis, pos - self.page_jump(axis));
                self.arm(axis, -TRACK_SPEED, scheduler);
                true
            }
            Zone::TrackAfter(axis) => {
                let pos = self.axis(axis).pos;
                self.set_pos(axis, pos + self.page_jump(axis));
                self.arm(axis, TRACK_SPEED, scheduler);
                true
            }
            Zone::Part(axis, ScrollPart::Thumb) => {
                self.dragging = Some(axis);
                self.signals.capture = Some(CaptureMode::Global);
                true
            }
        }
    }

    fn page_jump(&self, axis: Axis) -> f64 {
        let extent = match axis {
            Axis::X => self.canvas_width,
            Axis::Y => self.canvas_height,
        };
        extent - PAGE_OVERLAP * self.ratio
    }

    fn arm(&mut self, axis: Axis, step: f64, scheduler: &mut dyn Scheduler) {
        if let Some((token, _)) = self.pending.take() {
            scheduler.cancel_timer(token);
        }
        let token = scheduler.start_timer(REPEAT_DELAY_MS);
        self.pending = Some((token, Repeat { axis, step }));
    }

    /// A timer fired. Returns `true` when it was the auto-repeat timer,
    /// which switches the held button into continuous scrolling.
    pub fn on_timer(&mut self, token: TimerToken) -> bool {
        match self.pending {
            Some((pending, repeat)) if pending == token => {
                self.pending = None;
                self.running = Some(repeat);
                self.signals.repaint = true;
                true
            }
            _ => false,
        }
    }

    /// Pointer released over the surface. Cancels any auto-repeat before
    /// anything else can move the position. Always returns `false`.
    pub fn on_mouse_up(&mut self, scheduler: &mut dyn Scheduler) -> bool {
        if let Some((token, _)) = self.pending.take() {
            scheduler.cancel_timer(token);
        }
        self.running = None;
        self.end_drag();
        false
    }

    fn end_drag(&mut self) {
        self.dragging = None;
        if matches!(self.hover, Some((_, ScrollPart::Thumb))) {
            self.hover = None;
        }
        self.signals.repaint = true;
    }

    /// Pointer moved anywhere while the thumb is dragged.
    pub fn on_extended_mouse_move(&mut self, x: f64, y: f64) -> bool {
        let r = self.ratio;
        match self.dragging {
            Some(Axis::Y) => {
                let track = self.canvas_height / r - ARROW_SIZE * 2.0;
                self.set_pos_y(self.y.max * ((y - ARROW_SIZE) / track));
            }
            Some(Axis::X) => {
                let track = self.canvas_width / r - ARROW_SIZE * 2.0;
                self.set_pos_x(self.x.max * ((x - ARROW_SIZE) / track));
            }
            None => {}
        }
        true
    }

    /// Pointer released anywhere after a thumb drag. Always returns `false`.
    pub fn on_extended_mouse_up(&mut self, _x: f64, _y: f64) -> bool {
        self.signals.capture = Some(CaptureMode::Surface);
        self.end_drag();
        false
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::host::ManualScheduler;

    /// 200x300 canvas, 36 px header, ratio 1.
    fn view(content_w: f64, content_h: f64) -> ScrollView {
        let mut view = ScrollView::new(ScrollbarStyle::default(), 36.0);
        view.set_size(1.0, 200.0, 300.0, 36.0, Some((content_w, content_h)));
        view.take_signals();
        view
    }

    #[test]
    fn no_content_means_no_scrollbars() {
        let mut view = ScrollView::new(ScrollbarStyle::default(), 36.0);
        view.set_size(1.0, 200.0, 300.0, 36.0, None);
        assert!(!view.has_x() && !view.has_y());
        view.set_pos_y(50.0);
        assert_eq!(view.pos_y(), 0.0);
    }

    #[test]
    fn single_axis_overflow() {
        let view = view(100.0, 1000.0);
        assert!(view.has_y());
        assert!(!view.has_x());
        assert_eq!(view.max_y(), 1000.0 - 264.0);
    }

    #[test]
    fn both_axes_account_for_each_other() {
        let view = view(500.0, 1000.0);
        assert!(view.has_x() && view.has_y());
        assert_eq!(view.max_y(), 1000.0 - (300.0 - 36.0 - 10.0));
        assert_eq!(view.max_x(), 500.0 - 190.0);
    }

    #[test]
    fn positions_are_clamped() {
        let mut view = view(100.0, 1000.0);
        view.set_pos_y(-5.0);
        assert_eq!(view.pos_y(), 0.0);
        view.set_pos_y(1e9);
        assert_eq!(view.pos_y(), view.max_y());
        view.set_pos_y(f64::NAN);
        assert_eq!(view.pos_y(), 0.0);
    }

    #[test]
    fn unchanged_position_emits_nothing() {
        let mut view = view(100.0, 1000.0);
        view.set_pos_y(100.0);
        assert!(view.take_signals().scrolled);
        view.set_pos_y(100.0);
        assert_eq!(view.take_signals(), ScrollSignals::default());
    }

    #[test]
    fn shrinking_content_resets_position() {
        let mut view = view(100.0, 1000.0);
        view.set_pos_y(500.0);
        view.set_size(1.0, 200.0, 300.0, 36.0, Some((100.0, 100.0)));
        assert!(!view.has_y());
        assert_eq!(view.pos_y(), 0.0);
        assert!(view.take_signals().scrolled);
    }

    #[test]
    fn arrow_press_steps_then_repeats() {
        let mut sched = ManualScheduler::new();
        let mut view = view(100.0, 1000.0);
        // bottom arrow of the vertical bar
        assert!(view.on_mouse_down(195.0, 295.0, &mut sched));
        assert_eq!(view.pos_y(), 36.0);
        let timers = sched.pending_timers();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].1, REPEAT_DELAY_MS);

        assert!(view.on_timer(timers[0].0));
        assert!(view.is_running());
        assert!(view.before_draw());
        assert_eq!(view.pos_y(), 43.0);

        view.on_mouse_up(&mut sched);
        assert!(!view.before_draw());
        assert_eq!(view.pos_y(), 43.0);
    }

    #[test]
    fn release_cancels_pending_repeat() {
        let mut sched = ManualScheduler::new();
        let mut view = view(100.0, 1000.0);
        view.on_mouse_down(195.0, 295.0, &mut sched);
        let token = sched.pending_timers()[0].0;
        view.on_mouse_up(&mut sched);
        assert!(sched.pending_timers().is_empty());
        assert!(!view.on_timer(token));
        assert!(!view.is_running());
    }

    #[test]
    fn track_press_jumps_a_page() {
        let mut sched = ManualScheduler::new();
        let mut view = view(100.0, 1000.0);
        assert!(view.on_mouse_down(195.0, 200.0, &mut sched));
        assert_eq!(view.pos_y(), 280.0);
    }

    #[test]
    fn thumb_drag_requests_global_capture() {
        let mut sched = ManualScheduler::new();
        let mut view = view(100.0, 1000.0);
        assert!(view.on_mouse_down(195.0, 12.0, &mut sched));
        assert!(view.is_dragging());
        assert_eq!(view.take_signals().capture, Some(CaptureMode::Global));

        view.on_extended_mouse_move(0.0, 8.0 + (300.0 - 16.0) / 2.0);
        assert_eq!(view.pos_y(), view.max_y() / 2.0);

        assert!(!view.on_extended_mouse_up(0.0, 0.0));
        assert!(!view.is_dragging());
        assert_eq!(view.take_signals().capture, Some(CaptureMode::Surface));
    }

    #[test]
    fn content_clicks_are_not_consumed() {
        let mut sched = ManualScheduler::new();
        let mut view = view(100.0, 1000.0);
        assert!(!view.on_mouse_down(50.0, 50.0, &mut sched));
        assert!(!view.on_mouse_move(50.0, 50.0));
        assert!(view.on_mouse_move(195.0, 4.0));
        assert_eq!(view.hover(), Some((Axis::Y, ScrollPart::StartArrow)));
    }

    #[test]
    fn wheel_and_keys_use_line_height() {
        let mut view = view(100.0, 1000.0);
        view.on_scroll(DeltaMode::Line, 0.0, 2.0);
        assert_eq!(view.pos_y(), 72.0);
        view.on_scroll(DeltaMode::Pixel, 0.0, -10.0);
        assert_eq!(view.pos_y(), 62.0);
        assert!(view.on_key_down(KeyCode::PageDown));
        assert_eq!(view.pos_y(), 362.0);
        assert!(view.on_key_down(KeyCode::ArrowUp));
        assert_eq!(view.pos_y(), 326.0);
        assert!(!view.on_key_down(KeyCode::Enter));
    }
}
