//! Row-order index: the display permutation of row ids.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::{CellValue, SortColumn, SortDirection, ROWNUM_FIELD};

/// Display order of the row collection. Rebuilt wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndex {
    order: Vec<usize>,
}

impl RowIndex {
    /// Natural order `0..len`.
    pub fn identity(len: usize) -> Self {
        Self {
            order: (0..len).collect(),
        }
    }

    /// Stable multi-key sort of `0..len`. `value` reads a field of a row,
    /// returning `None` for a missing field.
    pub fn sorted<'a, F>(len: usize, keys: &[SortColumn], value: F) -> Self
    where
        F: Fn(usize, &str) -> Option<&'a CellValue>,
    {
        let mut index = Self::identity(len);
        if keys.is_empty() {
            return index;
        }
        index.order.sort_by(|&a, &b| {
            for key in keys {
                let ord = if key.field == ROWNUM_FIELD {
                    key.direction.apply(a.cmp(&b))
                } else {
                    compare_cells(value(a, &key.field), value(b, &key.field), key.direction)
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        index
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Row id at a display position.
    pub fn get(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    /// Display position of a row id. Linear scan.
    pub fn position_of(&self, row: usize) -> Option<usize> {
        self.order.iter().position(|&r| r == row)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }
}

/// Tail rank: defined values first, then empty strings, then nulls.
fn rank(value: Option<&CellValue>) -> u8 {
    match value {
        None | Some(CellValue::Null) => 2,
        Some(v) if v.is_empty_text() => 1,
        Some(_) => 0,
    }
}

/// Compare two cells of one sort key. The direction applies only when both
/// sides hold a defined, non-empty value.
pub fn compare_cells(
    a: Option<&CellValue>,
    b: Option<&CellValue>,
    direction: SortDirection,
) -> Ordering {
    let (ra, rb) = (rank(a), rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Some(a), Some(b)) if ra == 0 => direction.apply(compare_defined(a, b)),
        _ => Ordering::Equal,
    }
}

fn type_order(value: &CellValue) -> u8 {
    match value {
        CellValue::Bool(_) => 0,
        CellValue::Number(_) => 1,
        CellValue::Text(_) => 2,
        CellValue::Null => 3,
    }
}

fn compare_defined(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.total_cmp(y),
        (CellValue::Text(x), CellValue::Text(y)) => collate(x, y),
        (CellValue::Bool(x), CellValue::Bool(y)) => x.cmp(y),
        _ => type_order(a).cmp(&type_order(b)),
    }
}

/// Root-locale style string ordering in three levels: base letters
/// ignoring case and accents, then accents (unaccented first), then case
/// (lowercase first).
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.nfd().cmp(a.nfd()))
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    folded(s).filter(|c| !is_combining_mark(*c))
}
