//! Browser bindings: a worker-side grid and the page-side control glue.
//!
//! The page calls `GridControl::attach` with its canvas and a `Worker`;
//! the worker creates a `WorkerGrid` and feeds it every `MessageEvent`.

mod control;
mod input;
mod worker;

pub use control::{DomSurface, GridControl, WorkerPort};
pub use input::DomInput;
pub use worker::WorkerGrid;

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::error::{GridError, Result};

/// Plain JS objects (not `Map`s) so envelopes survive structured clone
/// and read naturally on the JS side.
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| GridError::Protocol(e.to_string()))
}

pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|e| GridError::Protocol(e.to_string()))
}
