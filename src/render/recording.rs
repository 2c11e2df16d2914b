//! In-memory drawing surface that records every operation.

use super::backend::{DrawContext, TextAlign};

/// Default advance of one character in `RecordingContext::measure_text`.
const DEFAULT_CHAR_WIDTH: f64 = 8.0;

/// A recorded drawing operation with the paint state it used.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Save,
    Restore,
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: String,
    },
    ClearRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    StrokeRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: String,
        line_width: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: String,
    },
    Polygon {
        points: Vec<(f64, f64)>,
        color: String,
    },
    Clip {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        font: String,
        color: String,
        align: TextAlign,
    },
}

#[derive(Debug, Clone)]
struct PaintState {
    fill: String,
    stroke: String,
    line_width: f64,
    font: String,
    align: TextAlign,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: "black".to_string(),
            stroke: "black".to_string(),
            line_width: 1.0,
            font: "10px sans-serif".to_string(),
            align: TextAlign::Left,
        }
    }
}

/// Fake backend for tests and headless use. Text is measured as a fixed
/// advance per character.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    ops: Vec<DrawOp>,
    state: PaintState,
    stack: Vec<PaintState>,
    char_width: f64,
    measure_calls: usize,
    surface_size: Option<(u32, u32)>,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::with_char_width(DEFAULT_CHAR_WIDTH)
    }

    pub fn with_char_width(char_width: f64) -> Self {
        Self {
            ops: Vec::new(),
            state: PaintState::default(),
            stack: Vec::new(),
            char_width,
            measure_calls: 0,
            surface_size: None,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Forget recorded operations; paint state is kept.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.measure_calls = 0;
    }

    /// Number of `save` calls without a matching `restore`.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn measure_calls(&self) -> usize {
        self.measure_calls
    }

    /// Last size passed to `set_surface_size`.
    pub fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface_size
    }

    /// All drawn strings in order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Filled rectangles painted with `color`.
    pub fn fills_with(&self, color: &str) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { color: c, .. } if c == color))
            .count()
    }
}

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.ops.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.ops.push(DrawOp::Restore);
    }

    fn set_fill_style(&mut self, color: &str) {
        color.clone_into(&mut self.state.fill);
    }

    fn set_stroke_style(&mut self, color: &str) {
        color.clone_into(&mut self.state.stroke);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.state.font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::FillRect {
            x,
            y,
            w,
            h,
            color: self.state.fill.clone(),
        });
    }

    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::ClearRect { x, y, w, h });
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::StrokeRect {
            x,
            y,
            w,
            h,
            color: self.state.stroke.clone(),
            line_width: self.state.line_width,
        });
    }

    fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ops.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color: self.state.stroke.clone(),
        });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            color: self.state.fill.clone(),
        });
    }

    fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(DrawOp::Clip { x, y, w, h });
    }

    #[allow(clippy::cast_precision_loss)]
    fn measure_text(&mut self, text: &str) -> f64 {
        self.measure_calls += 1;
        text.chars().count() as f64 * self.char_width
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            font: self.state.font.clone(),
            color: self.state.fill.clone(),
            align: self.state.align,
        });
    }

    fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface_size = Some((width, height));
    }
}
