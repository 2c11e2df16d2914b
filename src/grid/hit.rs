//! Hit testing between logical pointer coordinates and grid cells.

use super::GridRenderer;
use crate::types::{CellRect, RowHit};

impl GridRenderer {
    /// Visible column under logical x.
    pub fn column_at(&self, x: f64) -> Option<usize> {
        self.state
            .columns
            .column_at(x, self.scroll.pos_x(), self.state.ratio)
    }

    /// Column whose right edge is within the resize tolerance of logical x.
    pub fn column_split_at(&self, x: f64) -> Option<usize> {
        self.state.columns.split_at(
            x,
            self.scroll.pos_x(),
            self.state.ratio,
            self.options.metrics.resize_tolerance,
        )
    }

    /// Data row under logical y. `None` over the header or past the last row.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn row_at(&self, y: f64) -> Option<RowHit> {
        let index = self.state.index.as_ref()?;
        let metrics = &self.options.metrics;
        if y < metrics.header_height {
            return None;
        }
        let top = -self.scroll.pos_y() / self.state.ratio + metrics.header_height;
        let offset = y - top;
        if offset < 0.0 {
            return None;
        }
        let position = (offset / metrics.row_height).trunc() as usize;
        let row = index.get(position)?;
        Some(RowHit { position, row })
    }

    /// Top of a row-order position in device pixels, content coordinates
    /// with the header included.
    #[allow(clippy::cast_precision_loss)]
    pub fn top_pixel_of_position(&self, position: usize) -> Option<f64> {
        if position >= self.state.row_count() {
            return None;
        }
        let metrics = &self.options.metrics;
        let r = self.state.ratio;
        Some(metrics.header_height * r + position as f64 * metrics.row_height * r)
    }

    /// Top of a row id. Linear scan of the index.
    pub fn top_pixel_of_row(&self, row: usize) -> Option<f64> {
        let position = self.state.index.as_ref()?.position_of(row)?;
        self.top_pixel_of_position(position)
    }

    /// Placement of a cell relative to the surface in logical pixels, with
    /// clip insets for the part hidden under the header or past the left
    /// edge.
    pub fn cell_rect(&self, column: usize, row: usize) -> Option<CellRect> {
        let col = self.state.columns.get(column)?;
        let top = self.top_pixel_of_row(row)?;
        let r = self.state.ratio;
        let header = self.options.metrics.header_height;
        let y = (top - self.scroll.pos_y()) / r;
        let x = (col.left_pos - self.scroll.pos_x()) / r;
        Some(CellRect {
            x,
            y,
            width: col.width,
            cell_height: self.options.metrics.row_height,
            clip_top: (y < header).then(|| header - y),
            clip_left: (x < 0.0).then(|| -x),
            clip_right: None,
            clip_bottom: None,
        })
    }
}
