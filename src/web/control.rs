//! Page side: forwards canvas input to the worker and applies its replies.

use std::rc::{Rc, Weak};

use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, FocusEvent, HtmlCanvasElement, KeyboardEvent, MessageEvent, MouseEvent, WheelEvent,
    Window, Worker,
};

use super::input::{CloseRequest, DomInput};
use super::worker::CANVAS_KEY;
use super::{from_js, to_js};
use crate::error::{GridError, Result};
use crate::host::EditRequest;
use crate::protocol::{
    ControlEndpoint, ControlMessage, ControlSurface, Envelope, GridId, MessageSink, RenderMessage,
    SharedControl,
};
use crate::types::{CaptureMode, CursorStyle, DeltaMode, EditNavigation, KeyCode};

type Control = SharedControl<WorkerPort, DomSurface>;
type MouseListener = Closure<dyn FnMut(MouseEvent)>;

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| GridError::Other("no window".into()))
}

fn js_error(e: &JsValue) -> GridError {
    GridError::Protocol(format!("{e:?}"))
}

/// Posts envelopes to the worker.
pub struct WorkerPort {
    worker: Worker,
}

impl<M: Serialize> MessageSink<M> for WorkerPort {
    fn send(&mut self, message: &M) -> Result<()> {
        let value = to_js(message)?;
        self.worker.post_message(&value).map_err(|e| js_error(&e))
    }
}

/// Pointer move/up listeners for both capture modes.
struct CaptureListeners {
    surface_move: MouseListener,
    surface_up: MouseListener,
    page_move: MouseListener,
    page_up: MouseListener,
}

pub struct DomSurface {
    canvas: HtmlCanvasElement,
    window: Window,
    document: Document,
    capture: CaptureMode,
    listeners: Option<CaptureListeners>,
    control: Weak<Control>,
}

impl DomSurface {
    fn swap_listeners(&self, mode: CaptureMode) -> std::result::Result<(), JsValue> {
        let Some(l) = &self.listeners else {
            return Ok(());
        };
        let canvas: &web_sys::EventTarget = &self.canvas;
        let window: &web_sys::EventTarget = &self.window;
        let (off, on) = match mode {
            CaptureMode::Global => (canvas, window),
            CaptureMode::Surface => (window, canvas),
        };
        let (off_move, off_up, on_move, on_up) = match mode {
            CaptureMode::Global => (&l.surface_move, &l.surface_up, &l.page_move, &l.page_up),
            CaptureMode::Surface => (&l.page_move, &l.page_up, &l.surface_move, &l.surface_up),
        };
        off.remove_event_listener_with_callback("mousemove", off_move.as_ref().unchecked_ref())?;
        off.remove_event_listener_with_callback("mouseup", off_up.as_ref().unchecked_ref())?;
        on.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
        on.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())?;
        Ok(())
    }
}

impl ControlSurface for DomSurface {
    type Input = DomInput;

    fn set_cursor(&mut self, cursor: CursorStyle) {
        let _ = self.canvas.style().set_property("cursor", cursor.as_css());
    }

    fn set_capture(&mut self, mode: CaptureMode) {
        if self.capture == mode {
            return;
        }
        if let Err(err) = self.swap_listeners(mode) {
            tracing::warn!(error = ?err, "pointer capture not switched");
            return;
        }
        self.capture = mode;
    }

    fn origin(&self) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let scroll_x = self.window.scroll_x().unwrap_or(0.0);
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        (rect.left() + scroll_x, rect.top() + scroll_y)
    }

    fn create_input(&mut self, request: &EditRequest) -> Result<DomInput> {
        let control = self.control.clone();
        let on_close: CloseRequest = Rc::new(move |cancel, action| {
            let Some(control) = control.upgrade() else {
                return;
            };
            // Busy means the session is already closing.
            if let Some(Err(err)) = control.with(|endpoint| endpoint.finish_edit(cancel, action)) {
                tracing::warn!(error = %err, "closing the editor failed");
            }
        });
        DomInput::new(&self.document, &request.value, on_close)
    }

    fn focus(&mut self) {
        let _ = self.canvas.focus();
    }
}

/// Pointer position relative to the canvas, logical pixels.
fn local_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    )
}

fn post(control: &Weak<Control>, message: ControlMessage) {
    if let Some(control) = control.upgrade() {
        control.post(message);
    }
}

fn mouse_listener(
    control: &Weak<Control>,
    canvas: &HtmlCanvasElement,
    build: fn(f64, f64) -> ControlMessage,
) -> MouseListener {
    let control = control.clone();
    let canvas = canvas.clone();
    Closure::wrap(Box::new(move |event: MouseEvent| {
        event.prevent_default();
        let (x, y) = local_point(&canvas, &event);
        post(&control, build(x, y));
    }) as Box<dyn FnMut(MouseEvent)>)
}

/// Page half of a split grid.
#[wasm_bindgen]
pub struct GridControl {
    control: Rc<Control>,
    canvas: HtmlCanvasElement,
    window: Window,
    #[allow(dead_code)]
    mouse_closures: Vec<MouseListener>,
    #[allow(dead_code)]
    wheel_closure: Closure<dyn FnMut(WheelEvent)>,
    #[allow(dead_code)]
    key_closure: Closure<dyn FnMut(KeyboardEvent)>,
    #[allow(dead_code)]
    focus_closures: Vec<Closure<dyn FnMut(FocusEvent)>>,
    #[allow(dead_code)]
    resize_closure: Closure<dyn FnMut()>,
    #[allow(dead_code)]
    message_closure: Closure<dyn FnMut(MessageEvent)>,
}

#[wasm_bindgen]
impl GridControl {
    /// Hand the canvas to `worker` and start forwarding input.
    pub fn attach(
        grid_id: GridId,
        canvas: HtmlCanvasElement,
        worker: Worker,
    ) -> std::result::Result<GridControl, JsValue> {
        console_error_panic_hook::set_once();
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| GridError::Other("no document".into()))?;
        // Keyboard input needs a focusable canvas.
        canvas.set_tab_index(0);

        let control = Rc::new_cyclic(|weak: &Weak<Control>| {
            let surface = DomSurface {
                canvas: canvas.clone(),
                window: window.clone(),
                document,
                capture: CaptureMode::Surface,
                listeners: None,
                control: weak.clone(),
            };
            let port = WorkerPort {
                worker: worker.clone(),
            };
            SharedControl::new(ControlEndpoint::new(grid_id, port, surface))
        });
        let weak = Rc::downgrade(&control);

        // Create travels with the canvas in the transfer list.
        let offscreen = canvas.transfer_control_to_offscreen()?;
        let create = to_js(&Envelope::new(
            grid_id,
            ControlMessage::Create {
                width: f64::from(canvas.client_width()),
                height: f64::from(canvas.client_height()),
                pixel_ratio: window.device_pixel_ratio(),
            },
        ))?;
        js_sys::Reflect::set(&create, &JsValue::from_str(CANVAS_KEY), &offscreen)?;
        worker.post_message_with_transfer(&create, &js_sys::Array::of1(&offscreen))?;

        let capture = CaptureListeners {
            surface_move: mouse_listener(&weak, &canvas, |x, y| ControlMessage::MouseMove { x, y }),
            surface_up: mouse_listener(&weak, &canvas, |x, y| ControlMessage::MouseUp { x, y }),
            page_move: mouse_listener(&weak, &canvas, |x, y| {
                ControlMessage::MouseMoveExtended { x, y }
            }),
            page_up: mouse_listener(&weak, &canvas, |x, y| ControlMessage::MouseUpExtended { x, y }),
        };
        canvas.add_event_listener_with_callback(
            "mousemove",
            capture.surface_move.as_ref().unchecked_ref(),
        )?;
        canvas
            .add_event_listener_with_callback("mouseup", capture.surface_up.as_ref().unchecked_ref())?;
        control
            .with(|endpoint| {
                endpoint.surface_mut().listeners = Some(capture);
                Ok(())
            })
            .transpose()?;

        let mut mouse_closures = Vec::new();
        {
            let weak = weak.clone();
            let target = canvas.clone();
            let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
                event.prevent_default();
                let _ = target.focus();
                let (x, y) = local_point(&target, &event);
                post(&weak, ControlMessage::MouseDown { x, y });
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            mouse_closures.push(closure);
        }
        {
            let closure =
                mouse_listener(&weak, &canvas, |x, y| ControlMessage::MouseDblClick { x, y });
            canvas.add_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref())?;
            mouse_closures.push(closure);
        }
        {
            let weak = weak.clone();
            let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
                post(&weak, ControlMessage::MouseLeave);
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref())?;
            mouse_closures.push(closure);
        }

        let wheel_closure = {
            let weak = weak.clone();
            let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
                event.prevent_default();
                let mode = DeltaMode::from_dom(event.delta_mode()).unwrap_or_default();
                post(
                    &weak,
                    ControlMessage::Scroll {
                        mode,
                        dx: event.delta_x(),
                        dy: event.delta_y(),
                    },
                );
            }) as Box<dyn FnMut(WheelEvent)>);
            canvas.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())?;
            closure
        };

        let key_closure = {
            let weak = weak.clone();
            let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                let code = KeyCode::from_dom_code(&event.code());
                if code != KeyCode::Other {
                    event.prevent_default();
                }
                post(&weak, ControlMessage::KeyDown { code });
            }) as Box<dyn FnMut(KeyboardEvent)>);
            canvas.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure
        };

        let mut focus_closures = Vec::new();
        for (name, focused) in [("focus", true), ("blur", false)] {
            let weak = weak.clone();
            let closure = Closure::wrap(Box::new(move |_event: FocusEvent| {
                post(&weak, ControlMessage::Focus { focused });
            }) as Box<dyn FnMut(FocusEvent)>);
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            focus_closures.push(closure);
        }

        let resize_closure = {
            let weak = weak.clone();
            let canvas = canvas.clone();
            let window_ref = window.clone();
            let closure = Closure::wrap(Box::new(move || {
                post(&weak, resize_message(&canvas, &window_ref));
            }) as Box<dyn FnMut()>);
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure
        };

        let message_closure = {
            let weak = weak.clone();
            let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
                let Ok(envelope) = from_js::<Envelope<RenderMessage>>(event.data()) else {
                    return;
                };
                let Some(control) = weak.upgrade() else {
                    return;
                };
                if let Some(Err(err)) = control.with(|endpoint| endpoint.handle(envelope)) {
                    tracing::warn!(error = %err, "render request failed");
                }
            }) as Box<dyn FnMut(MessageEvent)>);
            worker.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())?;
            closure
        };

        tracing::debug!(grid = grid_id, "grid control attached");
        Ok(GridControl {
            control,
            canvas,
            window,
            mouse_closures,
            wheel_closure,
            key_closure,
            focus_closures,
            resize_closure,
            message_closure,
        })
    }

    /// Re-send the surface size, e.g. after a layout change the window
    /// resize event does not cover.
    pub fn resize(&self) {
        self.control.post(resize_message(&self.canvas, &self.window));
    }

    /// Send any control message given as a plain object, e.g.
    /// `{ type: "data", rows }`.
    pub fn post_message(&self, message: JsValue) -> std::result::Result<(), JsValue> {
        let message: ControlMessage = from_js(message)?;
        self.control.post(message);
        Ok(())
    }

    /// Close an open editor, keeping its text.
    pub fn commit_edit(&self) -> std::result::Result<(), JsValue> {
        self.control
            .with(|endpoint| endpoint.finish_edit(false, EditNavigation::None))
            .transpose()?;
        Ok(())
    }
}

fn resize_message(canvas: &HtmlCanvasElement, window: &Window) -> ControlMessage {
    ControlMessage::Resize {
        width: f64::from(canvas.client_width()),
        height: f64::from(canvas.client_height()),
        pixel_ratio: window.device_pixel_ratio(),
    }
}
