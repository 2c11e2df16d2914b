//! Drawing capability trait for pluggable surfaces.
//!
//! The grid and the scrollbar draw only through `DrawContext`, so the same
//! code paints a browser canvas, an offscreen canvas in a worker, or the
//! in-memory `RecordingContext` used by tests.

use std::ops::{Deref, DerefMut};

use crate::types::Align;

/// Horizontal anchor of `fill_text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// CSS `textAlign` value.
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl From<Align> for TextAlign {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => Self::Left,
            Align::Center => Self::Center,
            Align::Right => Self::Right,
        }
    }
}

/// A 2D drawing surface. Coordinates are device pixels.
pub trait DrawContext {
    /// Push the current paint and clip state.
    fn save(&mut self);

    /// Pop the state pushed by the matching `save`.
    fn restore(&mut self);

    fn set_fill_style(&mut self, color: &str);

    fn set_stroke_style(&mut self, color: &str);

    fn set_line_width(&mut self, width: f64);

    /// CSS font shorthand, e.g. `bold 16px arial`
    fn set_font(&mut self, font: &str);

    fn set_text_align(&mut self, align: TextAlign);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Reset a rectangle to transparent.
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);

    /// Fill a closed polygon with the current fill style.
    fn fill_polygon(&mut self, points: &[(f64, f64)]);

    /// Intersect the clip region with a rectangle.
    fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64);

    /// Width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;

    /// Draw text on the alphabetic baseline at `y`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    /// Resize the backing surface in device pixels. Surfaces without a
    /// backing store ignore it.
    fn set_surface_size(&mut self, _width: u32, _height: u32) {}
}

/// Scoped clip region. Saves on creation and restores on drop, so the
/// clip never leaks past the scope that set it.
pub struct ClipGuard<'a, C: DrawContext + ?Sized> {
    ctx: &'a mut C,
}

impl<'a, C: DrawContext + ?Sized> ClipGuard<'a, C> {
    pub fn new(ctx: &'a mut C, x: f64, y: f64, w: f64, h: f64) -> Self {
        ctx.save();
        ctx.clip_rect(x, y, w, h);
        Self { ctx }
    }
}

impl<C: DrawContext + ?Sized> Deref for ClipGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.ctx
    }
}

impl<C: DrawContext + ?Sized> DerefMut for ClipGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.ctx
    }
}

impl<C: DrawContext + ?Sized> Drop for ClipGuard<'_, C> {
    fn drop(&mut self) {
        self.ctx.restore();
    }
}
