//! Worker side: a `RenderEndpoint` driven by `postMessage` and timers.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{DedicatedWorkerGlobalScope, OffscreenCanvas, OffscreenCanvasRenderingContext2d};

use super::{from_js, to_js};
use crate::error::{GridError, Result};
use crate::host::{FrameToken, Scheduler, TimerToken};
use crate::protocol::{ControlMessage, Envelope, GridId, MessageSink, RenderEndpoint};
use crate::types::{CellValue, ColumnConfig, GridOptions, Record, SortColumn};

/// Delay between a frame request and the drawing pass.
const FRAME_INTERVAL_MS: i32 = 16;

/// Key under which the transferred `OffscreenCanvas` rides along with
/// the `create` message.
pub(crate) const CANVAS_KEY: &str = "canvas";

fn worker_scope() -> Result<DedicatedWorkerGlobalScope> {
    js_sys::global()
        .dyn_into::<DedicatedWorkerGlobalScope>()
        .map_err(|_| GridError::Protocol("not running in a dedicated worker".into()))
}

/// Posts envelopes back to the page.
struct WorkerSink {
    scope: DedicatedWorkerGlobalScope,
}

impl<M: Serialize> MessageSink<M> for WorkerSink {
    fn send(&mut self, message: &M) -> Result<()> {
        let value = to_js(message)?;
        self.scope
            .post_message(&value)
            .map_err(|e| GridError::Protocol(format!("{e:?}")))
    }
}

/// Frames and timers on the worker's `setTimeout`.
struct WorkerScheduler {
    scope: DedicatedWorkerGlobalScope,
    endpoint: Weak<RefCell<RenderEndpoint>>,
}

impl WorkerScheduler {
    fn schedule(&self, delay_ms: i32, fire: impl FnOnce(&mut RenderEndpoint, u64) + 'static) -> u64 {
        let endpoint = self.endpoint.clone();
        let handle = Rc::new(RefCell::new(0_u64));
        let fired = Rc::clone(&handle);
        let callback = Closure::once_into_js(move || {
            let Some(endpoint) = endpoint.upgrade() else {
                return;
            };
            let token = *fired.borrow();
            if let Ok(mut endpoint) = endpoint.try_borrow_mut() {
                fire(&mut endpoint, token);
            }
        });
        let id = self
            .scope
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay_ms,
            )
            .unwrap_or_default();
        let token = u64::try_from(id).unwrap_or_default();
        *handle.borrow_mut() = token;
        token
    }

    fn clear(&self, token: u64) {
        if let Ok(id) = i32::try_from(token) {
            self.scope.clear_timeout_with_handle(id);
        }
    }
}

impl Scheduler for WorkerScheduler {
    fn request_frame(&mut self) -> FrameToken {
        FrameToken(self.schedule(FRAME_INTERVAL_MS, |endpoint, token| {
            endpoint.on_frame(FrameToken(token));
        }))
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.clear(token.0);
    }

    fn start_timer(&mut self, delay_ms: u32) -> TimerToken {
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        TimerToken(self.schedule(delay, |endpoint, token| {
            endpoint.on_timer(TimerToken(token));
        }))
    }

    fn cancel_timer(&mut self, token: TimerToken) {
        self.clear(token.0);
    }
}

/// A grid rendered inside a dedicated worker.
#[wasm_bindgen]
pub struct WorkerGrid {
    endpoint: Rc<RefCell<RenderEndpoint>>,
}

#[wasm_bindgen]
impl WorkerGrid {
    #[wasm_bindgen(constructor)]
    pub fn new(grid_id: GridId, options: JsValue) -> std::result::Result<WorkerGrid, JsValue> {
        console_error_panic_hook::set_once();
        let options: GridOptions = if options.is_undefined() || options.is_null() {
            GridOptions::default()
        } else {
            from_js(options)?
        };
        let scope = worker_scope()?;
        let endpoint = Rc::new_cyclic(|weak| {
            let scheduler = WorkerScheduler {
                scope: scope.clone(),
                endpoint: weak.clone(),
            };
            let sink = WorkerSink {
                scope: scope.clone(),
            };
            RefCell::new(RenderEndpoint::new(grid_id, options, Box::new(scheduler), sink))
        });
        tracing::debug!(grid = grid_id, "worker grid created");
        Ok(WorkerGrid { endpoint })
    }

    /// Feed one `MessageEvent.data` from the page. Messages for another
    /// grid and undecodable messages are dropped.
    pub fn handle_message(&self, data: JsValue) -> std::result::Result<(), JsValue> {
        let envelope: Envelope<ControlMessage> = match from_js(data.clone()) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(error = %err, "dropping message");
                return Ok(());
            }
        };
        let mut endpoint = self.endpoint.borrow_mut();
        if envelope.grid_id != endpoint.grid_id() {
            return Ok(());
        }
        if matches!(envelope.message, ControlMessage::Create { .. }) {
            let canvas = js_sys::Reflect::get(&data, &JsValue::from_str(CANVAS_KEY))?
                .dyn_into::<OffscreenCanvas>()
                .map_err(|_| GridError::Protocol("create without a canvas".into()))?;
            let context = canvas
                .get_context("2d")?
                .ok_or_else(|| GridError::Render("2d context unavailable".into()))?
                .dyn_into::<OffscreenCanvasRenderingContext2d>()
                .map_err(|_| GridError::Render("unexpected context type".into()))?;
            endpoint.attach_surface(Box::new(context));
        }
        endpoint.handle(envelope);
        Ok(())
    }

    pub fn set_columns(&self, columns: JsValue) -> std::result::Result<(), JsValue> {
        let columns: Vec<ColumnConfig> = from_js(columns)?;
        self.endpoint
            .borrow_mut()
            .grid_mut()
            .configure_columns(&columns);
        Ok(())
    }

    /// Replace the rows; `undefined` keeps them and only rebuilds the index.
    pub fn set_data(&self, rows: JsValue) -> std::result::Result<(), JsValue> {
        let rows: Option<Vec<Record>> = if rows.is_undefined() || rows.is_null() {
            None
        } else {
            Some(from_js(rows)?)
        };
        self.endpoint.borrow_mut().grid_mut().set_data(rows);
        Ok(())
    }

    pub fn set_sort(&self, sort: JsValue) -> std::result::Result<(), JsValue> {
        let sort: Vec<SortColumn> = if sort.is_undefined() || sort.is_null() {
            Vec::new()
        } else {
            from_js(sort)?
        };
        self.endpoint.borrow_mut().grid_mut().set_sort(sort);
        Ok(())
    }

    pub fn set_options(&self, options: JsValue) -> std::result::Result<(), JsValue> {
        let options: GridOptions = from_js(options)?;
        self.endpoint.borrow_mut().grid_mut().set_options(options);
        Ok(())
    }

    pub fn set_allow_edit(&self, allow_edit: bool) {
        self.endpoint.borrow_mut().grid_mut().set_allow_edit(allow_edit);
    }

    pub fn set_edited_value(
        &self,
        row: usize,
        field: &str,
        value: JsValue,
    ) -> std::result::Result<(), JsValue> {
        let value: CellValue = from_js(value)?;
        self.endpoint
            .borrow_mut()
            .grid_mut()
            .set_edited_value(row, field, value);
        Ok(())
    }

    /// Call `callback` with every grid event as a plain object.
    pub fn subscribe(&self, callback: js_sys::Function) {
        self.endpoint
            .borrow_mut()
            .grid_mut()
            .subscribe(move |event| match to_js(event) {
                Ok(value) => {
                    if let Err(err) = callback.call1(&JsValue::NULL, &value) {
                        tracing::warn!(error = ?err, "event subscriber threw");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "event not serializable"),
            });
    }

    /// Counters of the most recent drawing pass.
    pub fn frame_stats(&self) -> std::result::Result<JsValue, JsValue> {
        let stats = self.endpoint.borrow().grid().last_frame_stats();
        Ok(to_js(&stats)?)
    }
}
