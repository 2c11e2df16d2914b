//! Canvas 2D drawing backends.
//!
//! `DrawContext` over the browser canvas API via web-sys, for both the
//! on-page `CanvasRenderingContext2d` and the worker-side
//! `OffscreenCanvasRenderingContext2d`. The two APIs are identical for the
//! calls the grid makes, so one macro implements both.

use web_sys::{CanvasRenderingContext2d, OffscreenCanvasRenderingContext2d};

use super::backend::{DrawContext, TextAlign};

fn resize_canvas(ctx: &CanvasRenderingContext2d, width: u32, height: u32) {
    if let Some(canvas) = ctx.canvas() {
        canvas.set_width(width);
        canvas.set_height(height);
    }
}

fn resize_offscreen(ctx: &OffscreenCanvasRenderingContext2d, width: u32, height: u32) {
    let canvas = ctx.canvas();
    canvas.set_width(width);
    canvas.set_height(height);
}

macro_rules! impl_draw_context {
    ($ctx:ty, $resize:path) => {
        impl DrawContext for $ctx {
            fn save(&mut self) {
                <$ctx>::save(self);
            }

            fn restore(&mut self) {
                <$ctx>::restore(self);
            }

            fn set_fill_style(&mut self, color: &str) {
                self.set_fill_style_str(color);
            }

            fn set_stroke_style(&mut self, color: &str) {
                self.set_stroke_style_str(color);
            }

            fn set_line_width(&mut self, width: f64) {
                <$ctx>::set_line_width(self, width);
            }

            fn set_font(&mut self, font: &str) {
                <$ctx>::set_font(self, font);
            }

            fn set_text_align(&mut self, align: TextAlign) {
                <$ctx>::set_text_align(self, align.as_css());
            }

            fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
                <$ctx>::fill_rect(self, x, y, w, h);
            }

            fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
                <$ctx>::clear_rect(self, x, y, w, h);
            }

            fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
                <$ctx>::stroke_rect(self, x, y, w, h);
            }

            fn stroke_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
                self.begin_path();
                self.move_to(x1, y1);
                self.line_to(x2, y2);
                self.stroke();
            }

            fn fill_polygon(&mut self, points: &[(f64, f64)]) {
                let Some((&(x0, y0), rest)) = points.split_first() else {
                    return;
                };
                self.begin_path();
                self.move_to(x0, y0);
                for &(x, y) in rest {
                    self.line_to(x, y);
                }
                self.close_path();
                self.fill();
            }

            fn clip_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
                self.begin_path();
                self.rect(x, y, w, h);
                self.clip();
            }

            fn measure_text(&mut self, text: &str) -> f64 {
                <$ctx>::measure_text(self, text)
                    .map(|m| m.width())
                    .unwrap_or(0.0)
            }

            fn fill_text(&mut self, text: &str, x: f64, y: f64) {
                let _ = <$ctx>::fill_text(self, text, x, y);
            }

            fn set_surface_size(&mut self, width: u32, height: u32) {
                $resize(self, width, height);
            }
        }
    };
}

impl_draw_context!(CanvasRenderingContext2d, resize_canvas);
impl_draw_context!(OffscreenCanvasRenderingContext2d, resize_offscreen);
