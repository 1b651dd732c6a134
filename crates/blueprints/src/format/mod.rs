//! Line-oriented `.blueprint` text format.
//!
//! One directive or record per line. Directives start with `#`; records are
//! `;`-separated positional fields whose meaning depends on the current
//! section (`#Pieces`, `#Terrain`, `#SnapPoints`). Decoding is lenient: a
//! record never fails, malformed numbers read as zero.

pub mod parse;
pub mod write;

#[cfg(test)]
mod tests;

pub use parse::*;
pub use write::*;

/// Record section a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Pieces,
    Terrain,
    SnapPoints,
}
