//! Layout engine for column positions and row order.
//!
//! This module handles:
//! - Deriving column edges from widths and the device pixel ratio
//! - Column hit testing and the resize handle
//! - Building the stable, multi-key sorted row-order index

mod columns;
mod row_index;

pub use columns::ColumnLayout;
pub use row_index::{collate, compare_cells, RowIndex};
