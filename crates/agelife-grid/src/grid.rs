//! The cell-age grid.
//!
//! A [`Grid`] has fixed dimensions for its whole life (short of an explicit
//! [`Grid::resize`]) and stores one [`Age`] per cell in row-major order.
//!
//! # Topology
//!
//! Edges do not wrap. A coordinate outside `[0, rows) x [0, cols)` is
//! rejected by [`Grid::get`] and [`Grid::set`], and treated as a dead cell
//! by the neighbour query, so corner cells have 3 in-bounds neighbours and
//! edge cells have 5.

use std::fmt;

use crate::error::GridError;

/// Age of a single cell. `0` is dead; a positive value is the number of
/// generations the cell has been alive.
pub type Age = u32;

/// Age of an empty cell.
pub const DEAD: Age = 0;

/// Offsets of the 8 surrounding cells: N, S, W, E, NW, NE, SW, SE.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Glyph drawn for a dead cell.
const DEAD_GLYPH: char = '-';

/// Glyph drawn for ages beyond the base-36 digit range.
const ANCIENT_GLYPH: char = '#';

/// A finite two-dimensional grid of cell ages.
///
/// Dimensions are signed so that a negative request can be represented and
/// rejected with [`GridError::InvalidDimension`]. A `0x0` grid is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    /// Number of rows.
    rows: i32,
    /// Number of columns.
    cols: i32,
    /// Cell ages, row-major, `rows * cols` entries.
    cells: Vec<Age>,
}

impl Grid {
    /// Create a `rows x cols` grid with every cell dead.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if either dimension is
    /// negative, the storage size overflows `isize`, or the allocation
    /// fails.
    pub fn new(rows: i32, cols: i32) -> Result<Self, GridError> {
        let len = checked_cell_count(rows, cols)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_alloc_err| GridError::InvalidDimension { rows, cols })?;
        cells.resize(len, DEAD);
        Ok(Self { rows, cols, cells })
    }

    /// Build a grid from explicit rows of ages.
    ///
    /// Every row must have the same length.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] if the rows are ragged or
    /// there are more rows or columns than fit in an `i32`.
    pub fn from_rows<R: AsRef<[Age]>>(rows: &[R]) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let row_count = i32::try_from(rows.len()).unwrap_or(i32::MAX);
        let col_count = i32::try_from(width).unwrap_or(i32::MAX);
        let invalid = GridError::InvalidDimension {
            rows: row_count,
            cols: col_count,
        };

        if row_count == i32::MAX || col_count == i32::MAX {
            return Err(invalid);
        }
        if rows.iter().any(|row| row.as_ref().len() != width) {
            return Err(invalid);
        }

        let cells = rows
            .iter()
            .flat_map(|row| row.as_ref().iter().copied())
            .collect();
        Ok(Self {
            rows: row_count,
            cols: col_count,
            cells,
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> i32 {
        self.cols
    }

    /// Return `(rows, cols)`.
    pub const fn dimensions(&self) -> (i32, i32) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `(row, col)` lies inside the grid. Never fails.
    pub const fn in_bounds(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.rows && col >= 0 && col < self.cols
    }

    /// Read the age at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinate is outside the grid.
    pub fn get(&self, row: i32, col: i32) -> Result<Age, GridError> {
        self.index(row, col)
            .and_then(|i| self.cells.get(i).copied())
            .ok_or(GridError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
    }

    /// Write `age` at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if the coordinate is outside the grid.
    pub fn set(&mut self, row: i32, col: i32, age: Age) -> Result<(), GridError> {
        let (rows, cols) = self.dimensions();
        let Some(slot) = self.index(row, col).and_then(|i| self.cells.get_mut(i)) else {
            return Err(GridError::OutOfBounds {
                row,
                col,
                rows,
                cols,
            });
        };
        *slot = age;
        Ok(())
    }

    /// Whether the cell at `(row, col)` is alive. Out-of-bounds cells are dead.
    pub fn is_alive(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_ok_and(|age| age > DEAD)
    }

    /// Count the live cells among the 8 positions surrounding `(row, col)`.
    ///
    /// Positions outside the grid contribute nothing. The centre cell
    /// itself is never counted.
    pub fn live_neighbours(&self, row: i32, col: i32) -> u8 {
        let mut count: u8 = 0;
        for (dr, dc) in NEIGHBOUR_OFFSETS {
            let (Some(r), Some(c)) = (row.checked_add(dr), col.checked_add(dc)) else {
                continue;
            };
            if self.is_alive(r, c) {
                count = count.saturating_add(1);
            }
        }
        count
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&age| age > DEAD).count()
    }

    /// Age of the oldest live cell, or [`DEAD`] for an empty grid.
    pub fn oldest(&self) -> Age {
        self.cells.iter().copied().max().unwrap_or(DEAD)
    }

    /// Iterate over every cell as `(row, col, age)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Age)> + '_ {
        let width = usize::try_from(self.cols).unwrap_or(0).max(1);
        (0..self.rows)
            .zip(self.cells.chunks(width))
            .flat_map(move |(row, chunk)| {
                (0..self.cols)
                    .zip(chunk.iter().copied())
                    .map(move |(col, age)| (row, col, age))
            })
    }

    /// The ages of one row, or `None` if `row` is out of range.
    pub fn row(&self, row: i32) -> Option<&[Age]> {
        if row < 0 || row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.cols).ok()?;
        let start = usize::try_from(row).ok()?.checked_mul(width)?;
        self.cells.get(start..start.checked_add(width)?)
    }

    /// Change the dimensions to `rows x cols`, clearing every cell.
    ///
    /// The backing allocation is reused where possible.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimension`] under the same conditions as
    /// [`Grid::new`]; the grid is left unchanged in that case.
    pub fn resize(&mut self, rows: i32, cols: i32) -> Result<(), GridError> {
        let len = checked_cell_count(rows, cols)?;
        self.cells
            .try_reserve_exact(len.saturating_sub(self.cells.len()))
            .map_err(|_alloc_err| GridError::InvalidDimension { rows, cols })?;
        self.cells.clear();
        self.cells.resize(len, DEAD);
        self.rows = rows;
        self.cols = cols;
        Ok(())
    }

    /// Whether the backing storage matches the recorded dimensions.
    pub fn is_consistent(&self) -> bool {
        checked_cell_count(self.rows, self.cols).is_ok_and(|len| len == self.cells.len())
    }

    /// Row-major storage index of an in-bounds coordinate.
    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if !self.in_bounds(row, col) {
            return None;
        }
        let r = usize::try_from(row).ok()?;
        let c = usize::try_from(col).ok()?;
        let width = usize::try_from(self.cols).ok()?;
        r.checked_mul(width)?.checked_add(c)
    }
}

impl fmt::Display for Grid {
    /// One line per row: `-` for a dead cell, a base-36 digit for ages
    /// `1..=35`, `#` beyond that.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let Some(ages) = self.row(row) else {
                break;
            };
            let line: String = ages.iter().copied().map(age_glyph).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// The character used to draw a cell of the given age.
pub fn age_glyph(age: Age) -> char {
    if age == DEAD {
        return DEAD_GLYPH;
    }
    char::from_digit(age, 36).unwrap_or(ANCIENT_GLYPH)
}

/// Largest backing allocation a `Vec` may hold, in bytes.
const MAX_STORAGE_BYTES: usize = isize::MAX.unsigned_abs();

/// Validate dimensions and return the cell count.
///
/// The count must fit in `usize` and its storage in `isize::MAX` bytes.
fn checked_cell_count(rows: i32, cols: i32) -> Result<usize, GridError> {
    let invalid = GridError::InvalidDimension { rows, cols };
    let r = usize::try_from(rows).map_err(|_err| invalid.clone())?;
    let c = usize::try_from(cols).map_err(|_err| invalid.clone())?;
    r.checked_mul(c)
        .filter(|len| {
            len.checked_mul(size_of::<Age>())
                .is_some_and(|bytes| bytes <= MAX_STORAGE_BYTES)
        })
        .ok_or(invalid)
}
