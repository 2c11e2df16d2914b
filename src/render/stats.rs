use serde::Serialize;

/// Counters for one drawing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameStats {
    /// Data rows painted
    pub rows_drawn: u32,
    /// Body cells painted
    pub cells_drawn: u32,
    /// Cells drawn through a clip region
    pub clipped_cells: u32,
    /// Cells whose text needed an exact measurement
    pub measured_cells: u32,
    /// Only a set of rows was repainted
    pub partial: bool,
    /// No surface was attached, nothing was painted
    pub skipped: bool,
}
