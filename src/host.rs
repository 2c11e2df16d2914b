//! Host environment hooks.
//!
//! The grid never calls a browser facility directly. Frame scheduling,
//! delayed timers, cursor/capture changes and the edit overlay all go
//! through the traits below, so a worker, the main thread or a test can
//! drive the same renderer.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::GridError;
use crate::types::{CaptureMode, CellRect, CursorStyle};

/// Handle of a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Handle of a started timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Run-before-next-repaint and delayed callbacks.
///
/// The host answers a frame request by calling `GridRenderer::draw_frame`
/// once, and an expired timer by calling `GridRenderer::on_timer` with the
/// token returned here.
pub trait Scheduler {
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a frame request. Cancelling a frame that already fired is a
    /// no-op.
    fn cancel_frame(&mut self, token: FrameToken);

    fn start_timer(&mut self, delay_ms: u32) -> TimerToken;

    fn cancel_timer(&mut self, token: TimerToken);
}

/// Everything needed to open the edit overlay on a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    /// Visible column index
    pub column: usize,
    pub field: String,
    /// Row id
    pub row: usize,
    /// Current text of the cell
    pub value: String,
    /// Row height in logical pixels
    pub cell_height: f64,
    pub rect: CellRect,
}

/// Side effects the grid asks of its surroundings.
pub trait GridHost {
    fn set_cursor(&mut self, cursor: CursorStyle);

    /// Move pointer move/up listening between the surface and the whole
    /// input device.
    fn capture_pointer(&mut self, mode: CaptureMode);

    fn open_editor(&mut self, request: EditRequest);

    /// Reposition the open editor without reopening it.
    fn move_editor(&mut self, rect: CellRect);

    /// Force-close the open editor.
    fn close_editor(&mut self);
}

/// Receives errors raised by caller-supplied callbacks.
pub type LogHook = Box<dyn Fn(&GridError)>;

/// Log hook used until one is injected.
pub fn default_log_hook() -> LogHook {
    Box::new(|err| tracing::warn!(error = %err, "grid callback failed"))
}

/// Host that ignores every request. Useful for headless rendering.
#[derive(Debug, Default)]
pub struct NullHost;

impl GridHost for NullHost {
    fn set_cursor(&mut self, _cursor: CursorStyle) {}

    fn capture_pointer(&mut self, _mode: CaptureMode) {}

    fn open_editor(&mut self, _request: EditRequest) {}

    fn move_editor(&mut self, _rect: CellRect) {}

    fn close_editor(&mut self) {}
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    frames: Vec<FrameToken>,
    timers: Vec<(TimerToken, u32)>,
    frame_requests: usize,
}

impl ManualState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Scheduler that only records requests. The owner steps frames and fires
/// timers by hand, which makes frame-by-frame behavior deterministic.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and not yet taken or cancelled.
    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    /// Total number of `request_frame` calls.
    pub fn frame_requests(&self) -> usize {
        self.state.borrow().frame_requests
    }

    /// Remove and return the pending frame requests.
    pub fn take_frames(&self) -> Vec<FrameToken> {
        std::mem::take(&mut self.state.borrow_mut().frames)
    }

    /// Timers started and not yet fired or cancelled, with their delays.
    pub fn pending_timers(&self) -> Vec<(TimerToken, u32)> {
        self.state.borrow().timers.clone()
    }

    /// Remove and return the pending timers, as if they all expired.
    pub fn take_timers(&self) -> Vec<TimerToken> {
        let timers = std::mem::take(&mut self.state.borrow_mut().timers);
        timers.into_iter().map(|(token, _)| token).collect()
    }
}

impl Scheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameToken {
        let mut state = self.state.borrow_mut();
        state.frame_requests += 1;
        let token = FrameToken(state.next_id());
        state.frames.push(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.state.borrow_mut().frames.retain(|t| *t != token);
    }

    fn start_timer(&mut self, delay_ms: u32) -> TimerToken {
        let mut state = self.state.borrow_mut();
        let token = TimerToken(state.next_id());
        state.timers.push((token, delay_ms));
        token
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        self.state.borrow_mut().timers.retain(|(t, _)| *t != token);
    }
}
