//! Column layout: derived edges, hit testing and live resize.

use crate::types::{Column, ColumnConfig};

/// Left edge of the first column in device pixels (room for the outer line).
const FIRST_COLUMN_LEFT: f64 = 1.0;

/// Visible columns with their left/right edges.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    columns: Vec<Column>,
    ratio: f64,
    dirty: bool,
}

impl ColumnLayout {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            ratio: 1.0,
            dirty: true,
        }
    }

    /// Replace all columns. Hidden columns are dropped and the layout is
    /// recomputed immediately.
    pub fn configure(&mut self, configs: &[ColumnConfig]) {
        self.columns = configs
            .iter()
            .filter(|c| c.visible != Some(false))
            .enumerate()
            .map(|(index, config)| Column::from_config(config, index))
            .collect();
        self.dirty = true;
        let ratio = self.ratio;
        self.recalc(ratio);
    }

    /// Mark the layout stale, e.g. after the pixel ratio changed.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Recompute `left_pos`/`right_pos` for every column at the given ratio.
    pub fn recalc(&mut self, ratio: f64) {
        self.ratio = ratio;
        self.dirty = false;
        let mut left = FIRST_COLUMN_LEFT;
        for column in &mut self.columns {
            column.left_pos = left;
            left += column.width * ratio;
            column.right_pos = left;
        }
    }

    /// Total content width in logical pixels, including the outer line.
    pub fn content_width(&self) -> f64 {
        FIRST_COLUMN_LEFT + self.columns.iter().map(|c| c.width).sum::<f64>()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn last(&self) -> Option<&Column> {
        self.columns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn index_of_field(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// Column under logical x, given the horizontal scroll in device pixels.
    pub fn column_at(&self, x: f64, pos_x: f64, ratio: f64) -> Option<usize> {
        if x < 0.0 {
            return None;
        }
        let pos = pos_x / ratio + x;
        let mut right = 0.0;
        for (i, column) in self.columns.iter().enumerate() {
            right += column.width;
            if right >= pos {
                return Some(i);
            }
        }
        None
    }

    /// Column whose right edge lies within `tolerance` logical pixels of x.
    pub fn split_at(&self, x: f64, pos_x: f64, ratio: f64, tolerance: f64) -> Option<usize> {
        self.columns.iter().position(|column| {
            let d = (column.right_pos - pos_x) / ratio - x;
            (-tolerance..=tolerance).contains(&d)
        })
    }

    /// Grow or shrink a column by `delta` logical pixels, never below
    /// `min_width`. Returns the delta actually applied.
    pub fn resize_by(&mut self, index: usize, delta: f64, min_width: f64) -> f64 {
        let ratio = self.ratio;
        let Some(column) = self.columns.get_mut(index) else {
            return 0.0;
        };
        let old = column.width;
        let new = (old + delta).max(min_width);
        column.width = new;
        column.original.width = Some(new);
        self.recalc(ratio);
        new - old
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    fn layout(widths: &[f64]) -> ColumnLayout {
        let configs: Vec<ColumnConfig> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| ColumnConfig::new(format!("C{i}"), format!("f{i}")).width(*w))
            .collect();
        let mut layout = ColumnLayout::new();
        layout.configure(&configs);
        layout
    }

    #[test]
    fn edges_accumulate_from_one() {
        let mut l = layout(&[100.0, 50.0]);
        assert_eq!(l.get(0).unwrap().left_pos, 1.0);
        assert_eq!(l.get(0).unwrap().right_pos, 101.0);
        assert_eq!(l.get(1).unwrap().right_pos, 151.0);
        l.recalc(2.0);
        assert_eq!(l.get(1).unwrap().left_pos, 201.0);
        assert_eq!(l.get(1).unwrap().right_pos, 301.0);
        assert_eq!(l.content_width(), 151.0);
    }

    #[test]
    fn hidden_columns_are_dropped() {
        let mut l = ColumnLayout::new();
        l.configure(&[
            ColumnConfig::new("A", "a"),
            ColumnConfig::new("B", "b").hidden(),
            ColumnConfig::new("C", "c"),
        ]);
        assert_eq!(l.len(), 2);
        assert_eq!(l.get(1).unwrap().field, "c");
        assert_eq!(l.get(1).unwrap().index, 1);
    }

    #[test]
    fn column_at_uses_scroll_offset() {
        let l = layout(&[100.0, 100.0, 100.0]);
        assert_eq!(l.column_at(50.0, 0.0, 1.0), Some(0));
        assert_eq!(l.column_at(150.0, 0.0, 1.0), Some(1));
        assert_eq!(l.column_at(50.0, 200.0, 1.0), Some(2));
        assert_eq!(l.column_at(350.0, 0.0, 1.0), None);
    }

    #[test]
    fn split_at_respects_tolerance() {
        let l = layout(&[100.0, 100.0]);
        assert_eq!(l.split_at(101.0, 0.0, 1.0, 3.0), Some(0));
        assert_eq!(l.split_at(98.5, 0.0, 1.0, 3.0), Some(0));
        assert_eq!(l.split_at(110.0, 0.0, 1.0, 3.0), None);
        assert_eq!(l.split_at(199.0, 0.0, 1.0, 3.0), Some(1));
    }

    #[test]
    fn resize_never_goes_below_floor() {
        let mut l = layout(&[40.0, 100.0]);
        let applied = l.resize_by(0, -100.0, 10.0);
        assert_eq!(applied, -30.0);
        assert_eq!(l.get(0).unwrap().width, 10.0);
        assert_eq!(l.get(1).unwrap().left_pos, 11.0);
        assert_eq!(l.resize_by(5, 10.0, 10.0), 0.0);
    }
}
