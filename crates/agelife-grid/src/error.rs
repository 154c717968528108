//! Error types for the `agelife-grid` crate.
//!
//! All fallible grid operations return [`GridError`]. Both variants are
//! caller contract violations, never transient conditions.

/// Errors that can occur during grid construction or cell access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A grid was requested with a negative or unrepresentable size.
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimension {
        /// Requested row count.
        rows: i32,
        /// Requested column count.
        cols: i32,
    },

    /// A cell coordinate lies outside the grid extent.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        /// Requested row.
        row: i32,
        /// Requested column.
        col: i32,
        /// Grid row count.
        rows: i32,
        /// Grid column count.
        cols: i32,
    },
}
