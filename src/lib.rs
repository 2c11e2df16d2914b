//! canvas-table - virtualized data grid drawn on a 2D canvas
//!
//! Draws large row collections at steady frame rates by painting only the
//! rows that intersect the viewport:
//! - Column layout, live column resize, stable multi-column sort
//! - Two-axis scrollbar with thumb drag, arrow repeat and page jumps
//! - Cell selection, keyboard navigation and an edit overlay
//! - Optional split: input on the page, rendering in a worker
//!
//! # Usage (JavaScript, worker split)
//!
//! ```javascript
//! // page
//! import init, { GridControl } from 'canvas-table';
//! await init();
//! const control = GridControl.attach(1, canvas, worker);
//!
//! // worker
//! import init, { WorkerGrid } from 'canvas-table';
//! await init();
//! const grid = new WorkerGrid(1);
//! self.onmessage = (ev) => grid.handle_message(ev.data);
//! grid.set_columns([{ header: "Name", field: "name", width: 120 }]);
//! grid.set_data(rows);
//! ```

pub mod error;
pub mod host;
pub mod types;

// Engine
pub mod grid;
pub mod layout;
pub mod render;
pub mod scrollbar;

// Split between input and rendering contexts
pub mod protocol;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use error::{GridError, Result};
pub use grid::{EditOutcome, GridEvent, GridRenderer, RowStyleArgs, RowStyleFn};
pub use host::{GridHost, Scheduler};
pub use render::{DrawContext, FrameStats, RecordingContext};
pub use types::*;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
