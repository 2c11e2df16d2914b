//! The drawing pass.

use std::borrow::Cow;
use std::collections::BTreeSet;

use super::state::GlyphWidths;
use super::{GridRenderer, RowStyleArgs};
use crate::error::GridError;
use crate::render::{ClipGuard, DrawContext, FrameStats, TextAlign};
use crate::types::{css_font, Align, CellStyle, Column, FormatArgs, SortDirection};

/// Narrowest and widest glyphs used for the clip pre-check.
const NARROW_GLYPH: &str = "i";
const WIDE_GLYPH: &str = "Æ";

/// Per-pass geometry in device pixels.
struct Frame {
    r: f64,
    width: f64,
    height: f64,
    header: f64,
    row_height: f64,
    padding: f64,
    baseline: f64,
    pos_x: f64,
    pos_y: f64,
    body: (f64, f64),
    header_font: String,
    header_glyphs: (f64, f64),
}

fn glyph_widths(slot: &mut Option<GlyphWidths>, ctx: &mut dyn DrawContext, font: &str) -> (f64, f64) {
    match slot {
        Some(g) if g.font == font => (g.min, g.max),
        _ => {
            let min = ctx.measure_text(NARROW_GLYPH);
            let max = ctx.measure_text(WIDE_GLYPH);
            *slot = Some(GlyphWidths {
                font: font.to_string(),
                min,
                max,
            });
            (min, max)
        }
    }
}

/// Whether `text` overflows `available`. Exact measurement only runs when
/// the glyph bounds can't decide.
#[allow(clippy::cast_precision_loss)]
fn needs_clip(
    ctx: &mut dyn DrawContext,
    text: &str,
    available: f64,
    (min, max): (f64, f64),
    stats: &mut FrameStats,
) -> bool {
    let len = text.chars().count() as f64;
    if available > len * max {
        false
    } else if available < len * min {
        true
    } else {
        stats.measured_cells += 1;
        available < ctx.measure_text(text)
    }
}

impl GridRenderer {
    /// Run one scheduled drawing pass. The pending flag is cleared first,
    /// so a redraw requested while drawing gets its own pass.
    pub fn draw_frame(&mut self, ctx: &mut dyn DrawContext) -> FrameStats {
        self.state.redraw.frame = None;
        let mut partial = self.state.redraw.rows.take();
        if self.scroll.before_draw() {
            partial = None;
            self.request_redraw();
        }
        self.apply_scroll_signals();

        if self.state.index.is_none() {
            self.state.last_stats = FrameStats {
                skipped: true,
                ..FrameStats::default()
            };
            return self.state.last_stats;
        }
        if self.state.columns.is_dirty() {
            self.state.columns.recalc(self.state.ratio);
        }

        let r = self.state.ratio;
        let style = &self.options.style;
        let body_font = style.body_font(r);
        ctx.set_font(&body_font);
        let body = glyph_widths(&mut self.state.body_glyphs, ctx, &body_font);

        let header_font = style.header_font(r);
        ctx.set_font(&header_font);
        let header_glyphs = glyph_widths(&mut self.state.header_glyphs, ctx, &header_font);
        ctx.set_font(&body_font);

        let metrics = &self.options.metrics;
        let frame = Frame {
            r,
            width: self.state.canvas_width,
            height: self.state.canvas_height,
            header: metrics.header_height * r,
            row_height: metrics.row_height * r,
            padding: metrics.cell_padding * r,
            baseline: metrics.baseline_offset * r,
            pos_x: self.scroll.pos_x(),
            pos_y: self.scroll.pos_y(),
            body,
            header_font,
            header_glyphs,
        };

        let stats = match partial {
            Some(rows) => self.draw_rows_partial(ctx, &frame, &body_font, &rows),
            None => self.draw_full(ctx, &frame, &body_font),
        };
        tracing::trace!(rows = stats.rows_drawn, partial = stats.partial, "frame drawn");
        self.state.last_stats = stats;
        stats
    }

    /// First row-order position whose band reaches below the header.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn first_visible(frame: &Frame) -> usize {
        (frame.pos_y / frame.row_height).floor().max(0.0) as usize
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_full(&self, ctx: &mut dyn DrawContext, frame: &Frame, body_font: &str) -> FrameStats {
        let mut stats = FrameStats::default();
        let style = &self.options.style;
        ctx.clear_rect(0.0, 0.0, frame.width, frame.height);
        ctx.set_stroke_style(&style.line_color);
        ctx.set_line_width(1.0);

        let rows = self.state.row_count();
        let mut position = Self::first_visible(frame);
        let mut bottom = -frame.pos_y + frame.header + (position + 1) as f64 * frame.row_height;
        while position < rows && bottom - frame.row_height < frame.height {
            if let Some(row) = self.state.index.as_ref().and_then(|i| i.get(position)) {
                self.draw_row(ctx, frame, body_font, position, row, bottom, &mut stats);
            }
            bottom += frame.row_height;
            position += 1;
        }

        let end = bottom - frame.row_height;
        self.draw_column_lines(ctx, frame, frame.header, end);
        self.draw_header(ctx, frame, &mut stats);
        self.scroll.draw(ctx);
        stats
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_rows_partial(
        &self,
        ctx: &mut dyn DrawContext,
        frame: &Frame,
        body_font: &str,
        rows: &BTreeSet<usize>,
    ) -> FrameStats {
        let mut stats = FrameStats {
            partial: true,
            ..FrameStats::default()
        };
        let style = &self.options.style;
        let Some(index) = self.state.index.as_ref() else {
            return stats;
        };
        {
            let mut body = ClipGuard::new(
                &mut *ctx,
                0.0,
                frame.header,
                frame.width,
                frame.height - frame.header,
            );
            body.set_stroke_style(&style.line_color);
            body.set_line_width(1.0);
            let mut position = Self::first_visible(frame);
            let mut bottom =
                -frame.pos_y + frame.header + (position + 1) as f64 * frame.row_height;
            while position < index.len() && bottom - frame.row_height < frame.height {
                if let Some(row) = index.get(position).filter(|row| rows.contains(row)) {
                    self.draw_row(&mut *body, frame, body_font, position, row, bottom, &mut stats);
                    self.draw_column_lines(&mut *body, frame, bottom - frame.row_height, bottom);
                }
                bottom += frame.row_height;
                position += 1;
            }
        }
        self.scroll.draw(ctx);
        stats
    }

    fn draw_column_lines(&self, ctx: &mut dyn DrawContext, frame: &Frame, top: f64, bottom: f64) {
        let columns = &self.state.columns;
        if let Some(first) = columns.get(0) {
            let x = first.left_pos - frame.pos_x;
            ctx.stroke_line(x, top, x, bottom);
        }
        for column in columns.iter() {
            let x = column.right_pos - frame.pos_x;
            if (0.0..=frame.width).contains(&x) {
                ctx.stroke_line(x, top, x, bottom);
            }
        }
    }

    fn is_off_screen(column: &Column, frame: &Frame) -> bool {
        column.right_pos - frame.pos_x < 0.0 || column.left_pos - frame.pos_x > frame.width
    }

    /// Text for a cell, formatter applied. A failing formatter is logged
    /// and the raw text kept.
    pub(crate) fn cell_text(&self, column: &Column, row: usize, position: usize) -> String {
        let raw = column.raw_text(self.state.value(row, &column.field), row, position);
        let Some(formatter) = &column.original.formatter else {
            return raw;
        };
        let args = FormatArgs {
            text: &raw,
            row: self.state.rows.get(row),
            row_id: row,
            column: &column.original,
        };
        match formatter(&args) {
            Ok(text) => text,
            Err(err) => {
                self.log(&GridError::callback("formatter", err.to_string()));
                raw
            }
        }
    }

    fn cell_style(&self, column: &Column, row: usize, alternate: bool, text: &str) -> CellStyle {
        let Some(row_style) = &self.row_style else {
            return CellStyle::default();
        };
        let args = RowStyleArgs {
            row: self.state.rows.get(row),
            row_id: row,
            column: &column.original,
            alternate,
            text,
        };
        match row_style(&args) {
            Ok(style) => style.unwrap_or_default(),
            Err(err) => {
                self.log(&GridError::callback("row style", err.to_string()));
                CellStyle::default()
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row(
        &self,
        ctx: &mut dyn DrawContext,
        frame: &Frame,
        body_font: &str,
        position: usize,
        row: usize,
        bottom: f64,
        stats: &mut FrameStats,
    ) {
        let style = &self.options.style;
        let alternate = position % 2 == 0;
        let hovered = self.options.hover_tracking && self.state.hover_row == Some(position);
        let top = bottom - frame.row_height;
        stats.rows_drawn += 1;

        for column in self.state.columns.iter() {
            if Self::is_off_screen(column, frame) {
                continue;
            }
            let text = self.cell_text(column, row, position);
            let cell = self.cell_style(column, row, alternate, &text);
            let cell_width = column.width * frame.r;
            let available = cell_width - frame.padding * 2.0;

            let font: Cow<'_, str> = if cell.overrides_font() {
                Cow::Owned(css_font(
                    cell.font_style.as_deref().unwrap_or(&style.font_style),
                    cell.font_size.unwrap_or(style.font_size) * frame.r,
                    cell.font.as_deref().unwrap_or(&style.font),
                ))
            } else {
                Cow::Borrowed(body_font)
            };
            if cell.overrides_font() {
                ctx.set_font(&font);
            }
            let clip = if cell.overrides_font() {
                stats.measured_cells += 1;
                available < ctx.measure_text(&text)
            } else {
                needs_clip(ctx, &text, available, frame.body, stats)
            };

            let align = cell.align.unwrap_or(column.align);
            let x = match align {
                Align::Left => column.left_pos + frame.padding,
                Align::Right => column.right_pos - frame.padding,
                Align::Center => column.left_pos + frame.padding + available * 0.5,
            } - frame.pos_x;
            ctx.set_text_align(TextAlign::from(align));

            let background: &str = match &cell.background_color {
                Some(color) => color.as_str(),
                None if hovered => &style.hover_background_color,
                None if alternate => &style.alternate_background_color,
                None => &style.background_color,
            };
            let rect_x = column.left_pos - frame.pos_x;
            ctx.set_fill_style(background);
            ctx.fill_rect(rect_x, top, cell_width, frame.row_height);

            let color = cell.font_color.as_deref().unwrap_or(&style.font_color);
            let baseline = bottom - frame.baseline;
            if clip {
                stats.clipped_cells += 1;
                let mut clipped = ClipGuard::new(
                    &mut *ctx,
                    rect_x + frame.padding,
                    top,
                    available,
                    frame.row_height,
                );
                clipped.set_fill_style(color);
                clipped.fill_text(&text, x, baseline);
            } else {
                ctx.set_fill_style(color);
                ctx.fill_text(&text, x, baseline);
            }
            if cell.overrides_font() {
                ctx.set_font(body_font);
            }
            stats.cells_drawn += 1;
        }

        if let Some(last) = self.state.columns.last() {
            let right = (last.right_pos - frame.pos_x).min(frame.width);
            ctx.stroke_line(0.0, bottom, right, bottom);
        }

        self.draw_selection(ctx, frame, row, bottom);
    }

    fn draw_selection(&self, ctx: &mut dyn DrawContext, frame: &Frame, row: usize, bottom: f64) {
        if !(self.options.allow_edit && self.state.focused) {
            return;
        }
        let Some(selection) = self.state.selection.filter(|s| s.row == row) else {
            return;
        };
        let Some(column) = self.state.columns.get(selection.column) else {
            return;
        };
        let r = frame.r;
        ctx.save();
        ctx.set_stroke_style(&self.options.style.select_line_color);
        ctx.set_line_width(3.0);
        ctx.stroke_rect(
            column.left_pos - frame.pos_x + 2.0 * r,
            bottom - frame.row_height + 2.0 * r,
            column.width * r - 4.0 * r,
            frame.row_height - 4.0 * r,
        );
        ctx.restore();
    }

    fn sort_direction(&self, field: &str) -> Option<SortDirection> {
        self.state
            .sort
            .iter()
            .find(|key| key.field == field)
            .map(|key| key.direction)
    }

    fn draw_header(&self, ctx: &mut dyn DrawContext, frame: &Frame, stats: &mut FrameStats) {
        let style = &self.options.style;
        let glyphs = frame.header_glyphs;
        ctx.set_font(&frame.header_font);
        ctx.clear_rect(0.0, 0.0, frame.width, frame.header);
        ctx.set_text_align(TextAlign::Left);

        for column in self.state.columns.iter() {
            if Self::is_off_screen(column, frame) {
                continue;
            }
            let cell_width = column.width * frame.r;
            let available = cell_width - frame.padding * 2.0;
            let clip = needs_clip(ctx, &column.header, available, glyphs, stats);
            let rect_x = column.left_pos - frame.pos_x;
            let baseline = frame.header - frame.baseline;

            ctx.set_fill_style(&style.header_background_color);
            ctx.fill_rect(rect_x, 0.0, cell_width, frame.header);
            if clip {
                let mut clipped =
                    ClipGuard::new(&mut *ctx, rect_x + frame.padding, 0.0, available, frame.header);
                clipped.set_fill_style(&style.header_font_color);
                clipped.fill_text(&column.header, rect_x + frame.padding, baseline);
            } else {
                ctx.set_fill_style(&style.header_font_color);
                ctx.fill_text(&column.header, rect_x + frame.padding, baseline);
            }

            if style.header_draw_sort_arrow {
                if let Some(direction) = self.sort_direction(&column.field) {
                    let r = frame.r;
                    let x = column.right_pos - frame.pos_x;
                    ctx.set_fill_style(&style.header_draw_sort_arrow_color);
                    let points = match direction {
                        SortDirection::Ascending => [
                            (x - 20.0 * r, 14.0 * r),
                            (x - 10.0 * r, 14.0 * r),
                            (x - 15.0 * r, 20.0 * r),
                        ],
                        SortDirection::Descending => [
                            (x - 15.0 * r, 14.0 * r),
                            (x - 20.0 * r, 20.0 * r),
                            (x - 10.0 * r, 20.0 * r),
                        ],
                    };
                    ctx.fill_polygon(&points);
                }
            }
        }

        ctx.set_stroke_style(&style.line_color);
        self.draw_column_lines(ctx, frame, 0.0, frame.header);
    }
}
