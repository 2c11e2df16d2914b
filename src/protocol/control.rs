//! Control side of the split: lives next to the visible surface.
//!
//! Raw input becomes exactly one outbound message each, in order. Inbound
//! requests from the render side are applied to the page through a
//! `ControlSurface`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::channel::MessageSink;
use super::message::{ControlMessage, Envelope, GridId, RenderMessage};
use super::overlay::{EditInput, EditSession, OverlayPlacement};
use crate::error::Result;
use crate::host::EditRequest;
use crate::types::{CaptureMode, CursorStyle, EditNavigation};

/// Page-side effects the control endpoint needs.
pub trait ControlSurface {
    type Input: EditInput;

    fn set_cursor(&mut self, cursor: CursorStyle);

    /// Move pointer move/up listening between the surface and the page.
    fn set_capture(&mut self, mode: CaptureMode);

    /// Surface origin in page coordinates, logical pixels.
    fn origin(&self) -> (f64, f64);

    /// Build the input widget for an edit overlay.
    fn create_input(&mut self, request: &EditRequest) -> Result<Self::Input>;

    /// Give keyboard focus back to the surface.
    fn focus(&mut self) {}
}

pub struct ControlEndpoint<S, C: ControlSurface> {
    grid_id: GridId,
    sink: Rc<RefCell<S>>,
    surface: C,
    session: Option<EditSession<C::Input>>,
}

impl<S, C: ControlSurface> std::fmt::Debug for ControlEndpoint<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlEndpoint")
            .field("grid_id", &self.grid_id)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<S, C> ControlEndpoint<S, C>
where
    S: MessageSink<Envelope<ControlMessage>> + 'static,
    C: ControlSurface,
{
    pub fn new(grid_id: GridId, sink: S, surface: C) -> Self {
        Self {
            grid_id,
            sink: Rc::new(RefCell::new(sink)),
            surface,
            session: None,
        }
    }

    pub fn grid_id(&self) -> GridId {
        self.grid_id
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut C {
        &mut self.surface
    }

    pub fn session(&self) -> Option<&EditSession<C::Input>> {
        self.session.as_ref()
    }

    /// Forward one input event to the render side.
    pub fn post(&mut self, message: ControlMessage) -> Result<()> {
        self.sink
            .borrow_mut()
            .send(&Envelope::new(self.grid_id, message))
    }

    /// Apply one request from the render side. Requests for another grid
    /// are dropped.
    pub fn handle(&mut self, envelope: Envelope<RenderMessage>) -> Result<()> {
        if envelope.grid_id != self.grid_id {
            return Ok(());
        }
        match envelope.message {
            RenderMessage::SetCursor { cursor } => self.surface.set_cursor(cursor),
            RenderMessage::AskForExtendedCapture => self.surface.set_capture(CaptureMode::Global),
            RenderMessage::AskForNormalCapture => self.surface.set_capture(CaptureMode::Surface),
            RenderMessage::UpdateForEdit {
                column,
                field,
                row,
                value,
                cell_height,
                rect,
            } => {
                self.close_session(true, EditNavigation::None)?;
                let request = EditRequest {
                    column,
                    field,
                    row,
                    value,
                    cell_height,
                    rect,
                };
                self.open_session(&request)?;
            }
            RenderMessage::LocationForEdit { rect } => {
                let placement = OverlayPlacement::from_rect(&rect, self.surface.origin());
                if let Some(session) = &mut self.session {
                    session.update_location(&placement);
                }
            }
            RenderMessage::RemoveUpdateForEdit => {
                self.close_session(true, EditNavigation::None)?;
            }
        }
        Ok(())
    }

    fn open_session(&mut self, request: &EditRequest) -> Result<()> {
        let input = self.surface.create_input(request)?;
        let sink = Rc::clone(&self.sink);
        let grid_id = self.grid_id;
        let mut session = EditSession::new(
            request.column,
            request.field.as_str(),
            request.row,
            input,
            move |outcome| {
                sink.borrow_mut()
                    .send(&Envelope::new(grid_id, ControlMessage::EditRemoved(outcome)))
            },
        );
        session.update_location(&OverlayPlacement::from_rect(
            &request.rect,
            self.surface.origin(),
        ));
        self.session = Some(session);
        Ok(())
    }

    /// The input asked to close: Enter, Escape, Tab or focus loss.
    pub fn finish_edit(&mut self, cancel: bool, action: EditNavigation) -> Result<()> {
        let had_session = self.session.is_some();
        let result = self.close_session(cancel, action);
        if had_session {
            self.surface.focus();
        }
        result
    }

    fn close_session(&mut self, cancel: bool, action: EditNavigation) -> Result<()> {
        match self.session.take() {
            Some(mut session) => session.remove(cancel, action),
            None => Ok(()),
        }
    }
}

/// A `ControlEndpoint` shared by several event listeners.
///
/// A listener can fire while the endpoint is already borrowed further up
/// the stack, e.g. the focus event raised synchronously by
/// `ControlSurface::focus` during `finish_edit`. Its message is queued and
/// sent, in arrival order, before that outer borrow is released.
pub struct SharedControl<S, C: ControlSurface> {
    endpoint: RefCell<ControlEndpoint<S, C>>,
    queued: RefCell<VecDeque<ControlMessage>>,
}

impl<S, C> SharedControl<S, C>
where
    S: MessageSink<Envelope<ControlMessage>> + 'static,
    C: ControlSurface,
{
    pub fn new(endpoint: ControlEndpoint<S, C>) -> Self {
        Self {
            endpoint: RefCell::new(endpoint),
            queued: RefCell::new(VecDeque::new()),
        }
    }

    /// Forward one input event. Never dropped: if the endpoint is busy the
    /// message waits for the current holder to flush it.
    pub fn post(&self, message: ControlMessage) {
        self.queued.borrow_mut().push_back(message);
        let _ = self.with(|_| Ok(()));
    }

    /// Run `f` on the endpoint, then flush queued messages. `None` when the
    /// endpoint is already borrowed.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&mut ControlEndpoint<S, C>) -> Result<T>,
    ) -> Option<Result<T>> {
        let Ok(mut endpoint) = self.endpoint.try_borrow_mut() else {
            return None;
        };
        let result = f(&mut endpoint);
        loop {
            let Some(message) = self.queued.borrow_mut().pop_front() else {
                break;
            };
            if let Err(err) = endpoint.post(message) {
                tracing::warn!(error = %err, "control message not sent");
            }
        }
        Some(result)
    }

    /// Messages waiting for the endpoint.
    pub fn queued(&self) -> usize {
        self.queued.borrow().len()
    }
}
