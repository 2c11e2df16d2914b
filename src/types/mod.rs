//! Data types shared by the grid, the scrollbar and the protocol.

mod column;
mod selection;
mod sort;
mod style;
mod value;

pub use column::*;
pub use selection::*;
pub use sort::*;
pub use style::*;
pub use value::*;
