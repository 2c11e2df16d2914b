//! Render side of the split: owns the grid and the drawing surface.
//!
//! Inbound messages map one-to-one onto renderer handlers, processed in
//! arrival order. Everything the renderer would do to the page (cursor,
//! pointer capture, edit overlay) goes back out as a `RenderMessage`.

use super::channel::MessageSink;
use super::message::{ControlMessage, Envelope, GridId, RenderMessage};
use crate::error::GridError;
use crate::grid::GridRenderer;
use crate::host::{EditRequest, FrameToken, GridHost, Scheduler, TimerToken};
use crate::render::{DrawContext, FrameStats};
use crate::types::{CaptureMode, CellRect, CursorStyle, GridOptions};

/// `GridHost` that turns host requests into outbound messages.
pub struct ChannelHost<S> {
    grid_id: GridId,
    sink: S,
}

impl<S: MessageSink<Envelope<RenderMessage>>> ChannelHost<S> {
    pub fn new(grid_id: GridId, sink: S) -> Self {
        Self { grid_id, sink }
    }

    fn post(&mut self, message: RenderMessage) {
        if let Err(err) = self.sink.send(&Envelope::new(self.grid_id, message)) {
            tracing::warn!(grid = self.grid_id, error = %err, "render message not sent");
        }
    }
}

impl<S: MessageSink<Envelope<RenderMessage>>> GridHost for ChannelHost<S> {
    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.post(RenderMessage::SetCursor { cursor });
    }

    fn capture_pointer(&mut self, mode: CaptureMode) {
        self.post(match mode {
            CaptureMode::Global => RenderMessage::AskForExtendedCapture,
            CaptureMode::Surface => RenderMessage::AskForNormalCapture,
        });
    }

    fn open_editor(&mut self, request: EditRequest) {
        self.post(RenderMessage::UpdateForEdit {
            column: request.column,
            field: request.field,
            row: request.row,
            value: request.value,
            cell_height: request.cell_height,
            rect: request.rect,
        });
    }

    fn move_editor(&mut self, rect: CellRect) {
        self.post(RenderMessage::LocationForEdit { rect });
    }

    fn close_editor(&mut self) {
        self.post(RenderMessage::RemoveUpdateForEdit);
    }
}

/// One grid living behind a message transport.
pub struct RenderEndpoint {
    grid_id: GridId,
    grid: GridRenderer,
    surface: Option<Box<dyn DrawContext>>,
}

impl std::fmt::Debug for RenderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEndpoint")
            .field("grid_id", &self.grid_id)
            .field("grid", &self.grid)
            .field("has_surface", &self.surface.is_some())
            .finish()
    }
}

impl RenderEndpoint {
    pub fn new<S>(
        grid_id: GridId,
        options: GridOptions,
        scheduler: Box<dyn Scheduler>,
        sink: S,
    ) -> Self
    where
        S: MessageSink<Envelope<RenderMessage>> + 'static,
    {
        let host = Box::new(ChannelHost::new(grid_id, sink));
        Self {
            grid_id,
            grid: GridRenderer::new(options, scheduler, host),
            surface: None,
        }
    }

    pub fn grid_id(&self) -> GridId {
        self.grid_id
    }

    pub fn grid(&self) -> &GridRenderer {
        &self.grid
    }

    /// Direct access for configuration that cannot travel as a message,
    /// such as formatters and style callbacks.
    pub fn grid_mut(&mut self) -> &mut GridRenderer {
        &mut self.grid
    }

    /// Attach the surface that arrived with `Create`.
    pub fn attach_surface(&mut self, surface: Box<dyn DrawContext>) {
        self.surface = Some(surface);
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Decode and dispatch one message from the wire. Undecodable text is
    /// dropped.
    pub fn handle_json(&mut self, text: &str) {
        match serde_json::from_str::<Envelope<ControlMessage>>(text) {
            Ok(envelope) => self.handle(envelope),
            Err(err) => {
                let err = GridError::from(err);
                tracing::debug!(grid = self.grid_id, error = %err, "dropping message");
            }
        }
    }

    /// Dispatch one message. Messages for another grid are dropped.
    pub fn handle(&mut self, envelope: Envelope<ControlMessage>) {
        if envelope.grid_id != self.grid_id {
            tracing::trace!(
                grid = self.grid_id,
                target = envelope.grid_id,
                "message for another grid"
            );
            return;
        }
        let grid = &mut self.grid;
        match envelope.message {
            ControlMessage::Create {
                width,
                height,
                pixel_ratio,
            }
            | ControlMessage::Resize {
                width,
                height,
                pixel_ratio,
            } => {
                grid.resize(width, height, pixel_ratio);
                let (w, h) = grid.canvas_size();
                if let Some(surface) = &mut self.surface {
                    surface.set_surface_size(to_pixels(w), to_pixels(h));
                }
            }
            ControlMessage::Focus { focused } => grid.set_focus(focused),
            ControlMessage::Scroll { mode, dx, dy } => grid.on_wheel(mode, dx, dy),
            ControlMessage::MouseDown { x, y } => grid.on_mouse_down(x, y),
            ControlMessage::MouseMove { x, y } => grid.on_mouse_move(x, y),
            ControlMessage::MouseUp { x, y } => grid.on_mouse_up(x, y),
            ControlMessage::MouseDblClick { x, y } => grid.on_double_click(x, y),
            ControlMessage::MouseMoveExtended { x, y } => grid.on_mouse_move_extended(x, y),
            ControlMessage::MouseUpExtended { x, y } => grid.on_mouse_up_extended(x, y),
            ControlMessage::MouseLeave => grid.on_mouse_leave(),
            ControlMessage::KeyDown { code } => grid.on_key_down(code),
            ControlMessage::EditRemoved(outcome) => grid.on_edit_removed(outcome),
            ControlMessage::Columns { columns } => grid.configure_columns(&columns),
            ControlMessage::Data { rows } => grid.set_data(rows),
            ControlMessage::Sort { sort } => grid.set_sort(sort),
            ControlMessage::Options { options } => grid.set_options(options),
            ControlMessage::AllowEdit { allow_edit } => grid.set_allow_edit(allow_edit),
            ControlMessage::EditedValue { row, field, value } => {
                grid.set_edited_value(row, &field, value);
            }
        }
    }

    /// The scheduler's frame fired.
    pub fn on_frame(&mut self, _token: FrameToken) -> FrameStats {
        match &mut self.surface {
            Some(surface) => self.grid.draw_frame(surface.as_mut()),
            None => {
                self.grid.discard_frame();
                FrameStats {
                    skipped: true,
                    ..FrameStats::default()
                }
            }
        }
    }

    /// The scheduler's timer fired.
    pub fn on_timer(&mut self, token: TimerToken) {
        self.grid.on_timer(token);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(v: f64) -> u32 {
    v.round().max(0.0) as u32
}
