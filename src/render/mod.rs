//! Rendering surfaces.
//!
//! This module provides:
//! - The `DrawContext` capability trait and the scoped `ClipGuard`
//! - `RecordingContext`, an in-memory backend for tests and headless use
//! - Canvas 2D backends (wasm32 only)
//! - Per-frame `FrameStats`

pub mod backend;
#[cfg(target_arch = "wasm32")]
pub mod canvas;
mod recording;
mod stats;

pub use backend::{ClipGuard, DrawContext, TextAlign};
pub use recording::{DrawOp, RecordingContext};
pub use stats::FrameStats;
