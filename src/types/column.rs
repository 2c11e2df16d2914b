use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

use super::{CellValue, Record};
use crate::error::Result;

/// Synthetic field showing the row id (index into the source collection).
pub const ROWNUM_FIELD: &str = "__rownum__";
/// Synthetic field showing the row-order position.
pub const IDXNUM_FIELD: &str = "__idxnum__";

/// Width used when a column config leaves it out.
pub const DEFAULT_COLUMN_WIDTH: f64 = 50.0;

/// Horizontal text alignment inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Arguments handed to a column formatter.
pub struct FormatArgs<'a> {
    /// Default text (value display or synthetic number)
    pub text: &'a str,
    /// Source row, `None` when the row id is out of range
    pub row: Option<&'a Record>,
    pub row_id: usize,
    pub column: &'a ColumnConfig,
}

/// Per-cell text formatter. An `Err` is logged and the default text is used.
pub type Formatter = Rc<dyn Fn(&FormatArgs<'_>) -> Result<String>>;

/// Column configuration as supplied by the caller.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    /// Text in the header
    pub header: String,
    /// Field name in each row (or a synthetic field)
    pub field: String,
    /// Width in logical pixels, default 50
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    /// Hidden columns are dropped at configuration time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip)]
    pub formatter: Option<Formatter>,
}

impl fmt::Debug for ColumnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnConfig")
            .field("header", &self.header)
            .field("field", &self.field)
            .field("width", &self.width)
            .field("align", &self.align)
            .field("visible", &self.visible)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl ColumnConfig {
    pub fn new(header: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            field: field.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = Some(false);
        self
    }

    #[must_use]
    pub fn formatter(
        mut self,
        formatter: impl Fn(&FormatArgs<'_>) -> Result<String> + 'static,
    ) -> Self {
        self.formatter = Some(Rc::new(formatter));
        self
    }

    /// Parse a JSON array of column configs.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A visible column with its derived layout.
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub field: String,
    /// Width in logical pixels
    pub width: f64,
    pub align: Align,
    pub allow_edit: bool,
    /// Left edge in device pixels, content coordinates
    pub left_pos: f64,
    /// Right edge in device pixels, content coordinates
    pub right_pos: f64,
    /// Position among the visible columns
    pub index: usize,
    pub original: ColumnConfig,
}

impl Column {
    pub(crate) fn from_config(config: &ColumnConfig, index: usize) -> Self {
        Self {
            header: config.header.clone(),
            field: config.field.clone(),
            width: config.width.unwrap_or(DEFAULT_COLUMN_WIDTH),
            align: config.align.unwrap_or_default(),
            allow_edit: !is_synthetic_field(&config.field),
            left_pos: 0.0,
            right_pos: 0.0,
            index,
            original: config.clone(),
        }
    }

    /// Text for this column in the given row, before the formatter runs.
    pub(crate) fn raw_text(&self, value: Option<&CellValue>, row_id: usize, position: usize) -> String {
        match self.field.as_str() {
            ROWNUM_FIELD => row_id.to_string(),
            IDXNUM_FIELD => position.to_string(),
            _ => value.map(CellValue::display_text).unwrap_or_default(),
        }
    }
}

/// Synthetic fields are computed, never stored or edited.
pub fn is_synthetic_field(field: &str) -> bool {
    field == ROWNUM_FIELD || field == IDXNUM_FIELD
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

    #[test]
    fn configs_load_from_json_with_defaults() {
        let cols = ColumnConfig::list_from_json(
            r#"[{"header":"ID","field":"__rownum__","width":100},
                {"header":"Name","field":"name","align":"right","visible":false}]"#,
        )
        .unwrap();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].width, Some(100.0));
        assert_eq!(cols[1].align, Some(Align::Right));
        assert_eq!(cols[1].visible, Some(false));
    }

    #[test]
    fn synthetic_columns_are_read_only() {
        let col = Column::from_config(&ColumnConfig::new("ID", ROWNUM_FIELD), 0);
        assert!(!col.allow_edit);
        let col = Column::from_config(&ColumnConfig::new("Name", "name"), 1);
        assert!(col.allow_edit);
        assert!((col.width - DEFAULT_COLUMN_WIDTH).abs() < f64::EPSILON);
    }
}
