//! Finite cell-age grid for the Agelife simulation.
//!
//! The grid is the leaf of the workspace: a fixed-size rectangle of cell
//! ages where `0` means dead and any positive value is the number of
//! generations the cell has been alive.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction and cell access.
//! - [`grid`] -- The [`Grid`] container, bounds checks, and the
//!   8-neighbour occupancy query.

pub mod error;
pub mod grid;

// Re-export primary types at crate root.
pub use error::GridError;
pub use grid::{Age, DEAD, Grid, age_glyph};
