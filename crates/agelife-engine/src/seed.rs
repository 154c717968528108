//! Initial generation: colony files and random seeding.
//!
//! A colony file starts with two whitespace-separated integers, the row
//! and column counts, followed by one whitespace-separated token per row.
//! Each token must hold at least `cols` characters; `-` marks a dead cell
//! and any other character a newborn cell. Extra characters and trailing
//! tokens are ignored.
//!
//! ```text
//! 3 5
//! -----
//! -XXX-
//! -----
//! ```

use std::path::{Path, PathBuf};

use agelife_core::Rules;
use agelife_core::config::{RandomSeedConfig, SeedConfig};
use agelife_core::rules::NEWBORN_AGE;
use agelife_grid::{DEAD, Grid, GridError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Glyph for a dead cell in a colony file.
const DEAD_GLYPH: char = '-';

/// Extension tried when a colony path without one does not exist.
const COLONY_EXTENSION: &str = "txt";

/// Errors that can occur while building the initial generation.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The colony file could not be read.
    #[error("failed to read colony file {}: {source}", path.display())]
    Io {
        /// The path that was tried.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The colony file ended before the row and column counts.
    #[error("colony file is missing its row and column counts")]
    MissingHeader,

    /// A row or column count is not an integer.
    #[error("invalid colony {field} count: {token:?}")]
    InvalidHeader {
        /// Which count was malformed.
        field: &'static str,
        /// The offending token.
        token: String,
    },

    /// The colony file has fewer rows than its header declares.
    #[error("colony file declares {rows} rows but row {row} is missing")]
    MissingRow {
        /// Zero-based index of the first missing row.
        row: i32,
        /// Declared row count.
        rows: i32,
    },

    /// A row token is shorter than the declared column count.
    #[error("colony row {row} has {len} cells, expected at least {cols}")]
    ShortRow {
        /// Zero-based row index.
        row: i32,
        /// Characters present.
        len: usize,
        /// Declared column count.
        cols: i32,
    },

    /// A random extent range is empty.
    #[error("random seeding {field} range {min}..={max} is empty")]
    EmptyRange {
        /// Which extent was misconfigured.
        field: &'static str,
        /// Lower bound.
        min: i32,
        /// Upper bound.
        max: i32,
    },

    /// The grid rejected the dimensions or a cell.
    #[error("grid error: {source}")]
    Grid {
        /// The underlying grid error.
        #[from]
        source: GridError,
    },
}

/// Build the initial generation described by `config`.
///
/// Loads the colony file when one is configured, otherwise seeds randomly,
/// reproducibly when `rng_seed` is set.
///
/// # Errors
///
/// Returns a [`SeedError`] if the colony file cannot be loaded or the
/// random parameters are unusable.
pub fn seed_grid(config: &SeedConfig, rules: &Rules) -> Result<Grid, SeedError> {
    let grid = if let Some(path) = &config.colony_file {
        let grid = load_colony(path)?;
        info!(path = %path.display(), "Colony file loaded");
        grid
    } else {
        let mut rng = config
            .random
            .rng_seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let grid = random_grid(&config.random, rules, &mut rng)?;
        info!(rng_seed = ?config.random.rng_seed, "Random colony seeded");
        grid
    };

    info!(
        rows = grid.rows(),
        cols = grid.cols(),
        population = grid.population(),
        "Initial generation ready"
    );
    Ok(grid)
}

/// Read and parse a colony file.
///
/// A path without an extension that does not exist is retried with
/// `.txt` appended.
///
/// # Errors
///
/// Returns [`SeedError::Io`] if the file cannot be read, or a parse error
/// from [`parse_colony`].
pub fn load_colony(path: &Path) -> Result<Grid, SeedError> {
    let resolved = if !path.exists() && path.extension().is_none() {
        path.with_extension(COLONY_EXTENSION)
    } else {
        path.to_path_buf()
    };

    let text = std::fs::read_to_string(&resolved).map_err(|source| SeedError::Io {
        path: resolved.clone(),
        source,
    })?;
    parse_colony(&text)
}

/// Parse colony file text into a grid of newborn and dead cells.
///
/// # Errors
///
/// Returns [`SeedError::MissingHeader`] or [`SeedError::InvalidHeader`]
/// for a bad header, [`SeedError::MissingRow`] or [`SeedError::ShortRow`]
/// for missing cells, and [`SeedError::Grid`] for negative dimensions or
/// a grid too large to allocate.
pub fn parse_colony(text: &str) -> Result<Grid, SeedError> {
    let mut tokens = text.split_whitespace();
    let rows = parse_count(tokens.next(), "row")?;
    let cols = parse_count(tokens.next(), "column")?;
    let mut grid = Grid::new(rows, cols)?;

    if cols == 0 {
        return Ok(grid);
    }
    let width = usize::try_from(cols)
        .map_err(|_conversion| GridError::InvalidDimension { rows, cols })?;

    for row in 0..rows {
        let line = tokens.next().ok_or(SeedError::MissingRow { row, rows })?;
        let len = line.chars().count();
        if len < width {
            return Err(SeedError::ShortRow { row, len, cols });
        }
        for (col, glyph) in (0..cols).zip(line.chars()) {
            if glyph != DEAD_GLYPH {
                grid.set(row, col, NEWBORN_AGE)?;
            }
        }
    }
    Ok(grid)
}

fn parse_count(token: Option<&str>, field: &'static str) -> Result<i32, SeedError> {
    let token = token.ok_or(SeedError::MissingHeader)?;
    token.parse().map_err(|_parse_err| SeedError::InvalidHeader {
        field,
        token: token.to_owned(),
    })
}

/// Build a random grid.
///
/// Dimensions are drawn uniformly from the configured ranges. Each cell is
/// alive with probability `alive_percent`%, and live cells get an age
/// drawn uniformly from `1..=max_age`.
///
/// # Errors
///
/// Returns [`SeedError::EmptyRange`] if a dimension range is empty, or
/// [`SeedError::Grid`] if it admits negative sizes.
pub fn random_grid<R: Rng + ?Sized>(
    config: &RandomSeedConfig,
    rules: &Rules,
    rng: &mut R,
) -> Result<Grid, SeedError> {
    let rows = draw_extent(rng, "rows", config.min_rows, config.max_rows)?;
    let cols = draw_extent(rng, "cols", config.min_cols, config.max_cols)?;
    let mut grid = Grid::new(rows, cols)?;

    for row in 0..rows {
        for col in 0..cols {
            let roll: u8 = rng.random_range(0..100);
            let age = if roll < config.alive_percent {
                rng.random_range(1..=rules.max_age())
            } else {
                DEAD
            };
            grid.set(row, col, age)?;
        }
    }
    Ok(grid)
}

fn draw_extent<R: Rng + ?Sized>(
    rng: &mut R,
    field: &'static str,
    min: i32,
    max: i32,
) -> Result<i32, SeedError> {
    if min > max {
        return Err(SeedError::EmptyRange { field, min, max });
    }
    Ok(rng.random_range(min..=max))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn small_random(alive_percent: u8) -> RandomSeedConfig {
        RandomSeedConfig {
            min_rows: 4,
            max_rows: 6,
            min_cols: 5,
            max_cols: 5,
            alive_percent,
            rng_seed: None,
        }
    }

    #[test]
    fn parses_colony_with_any_live_glyph() {
        let grid = parse_colony("3 5\n-----\n-XoX-\n-----\n").unwrap();
        assert_eq!(grid.dimensions(), (3, 5));
        assert_eq!(grid.population(), 3);
        assert_eq!(grid.get(1, 1).unwrap(), NEWBORN_AGE);
        assert_eq!(grid.get(1, 2).unwrap(), NEWBORN_AGE);
        assert_eq!(grid.get(0, 0).unwrap(), DEAD);
    }

    #[test]
    fn header_may_share_a_line_and_extra_cells_are_ignored() {
        let grid = parse_colony("2 2 X-X ---\ntrailing").unwrap();
        assert_eq!(grid.dimensions(), (2, 2));
        assert_eq!(grid.population(), 1);
        assert!(grid.is_alive(0, 0));
        assert!(!grid.is_alive(0, 1));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(parse_colony(""), Err(SeedError::MissingHeader)));
        assert!(matches!(parse_colony("4"), Err(SeedError::MissingHeader)));
    }

    #[test]
    fn malformed_header_is_rejected() {
        let err = parse_colony("four 4").unwrap_err();
        assert!(matches!(
            err,
            SeedError::InvalidHeader { field: "row", ref token } if token == "four"
        ));
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        assert!(matches!(
            parse_colony("-1 3"),
            Err(SeedError::Grid {
                source: GridError::InvalidDimension { .. }
            })
        ));
    }

    #[test]
    fn header_too_large_to_allocate_is_rejected() {
        assert!(matches!(
            parse_colony("2147483647 2147483647"),
            Err(SeedError::Grid {
                source: GridError::InvalidDimension {
                    rows: i32::MAX,
                    cols: i32::MAX
                }
            })
        ));
    }

    #[test]
    fn missing_and_short_rows_are_rejected() {
        assert!(matches!(
            parse_colony("3 3\n---\nXXX\n"),
            Err(SeedError::MissingRow { row: 2, rows: 3 })
        ));
        assert!(matches!(
            parse_colony("2 3\n---\nXX\n"),
            Err(SeedError::ShortRow {
                row: 1,
                len: 2,
                cols: 3
            })
        ));
    }

    #[test]
    fn bundled_colonies_parse() {
        let glider = parse_colony(include_str!("../../../colonies/glider.txt")).unwrap();
        assert_eq!(glider.dimensions(), (10, 10));
        assert_eq!(glider.population(), 5);

        let pulsar = parse_colony(include_str!("../../../colonies/pulsar.txt")).unwrap();
        assert_eq!(pulsar.population(), 48);

        let gun = parse_colony(include_str!("../../../colonies/glider-gun.txt")).unwrap();
        assert_eq!(gun.dimensions(), (20, 40));
        assert_eq!(gun.population(), 36);
    }

    #[test]
    fn zero_column_colony_needs_no_rows() {
        let grid = parse_colony("3 0").unwrap();
        assert_eq!(grid.dimensions(), (3, 0));
    }

    #[test]
    fn random_grid_respects_ranges_and_age_cap() {
        let rules = Rules::new(4).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let grid = random_grid(&small_random(50), &rules, &mut rng).unwrap();
            assert!((4..=6).contains(&grid.rows()));
            assert_eq!(grid.cols(), 5);
            assert!(grid.oldest() <= 4);
        }
    }

    #[test]
    fn random_grid_extremes_of_alive_percent() {
        let rules = Rules::default();
        let mut rng = StdRng::seed_from_u64(7);
        let empty = random_grid(&small_random(0), &rules, &mut rng).unwrap();
        assert_eq!(empty.population(), 0);

        let full = random_grid(&small_random(100), &rules, &mut rng).unwrap();
        assert_eq!(full.population(), full.cell_count());
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let rules = Rules::default();
        let config = SeedConfig {
            colony_file: None,
            random: RandomSeedConfig {
                rng_seed: Some(1234),
                ..small_random(50)
            },
        };
        assert_eq!(
            seed_grid(&config, &rules).unwrap(),
            seed_grid(&config, &rules).unwrap()
        );
    }

    #[test]
    fn empty_range_is_rejected() {
        let config = RandomSeedConfig {
            min_cols: 9,
            max_cols: 3,
            ..small_random(50)
        };
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            random_grid(&config, &Rules::default(), &mut rng),
            Err(SeedError::EmptyRange { field: "cols", .. })
        ));
    }

    #[test]
    fn missing_colony_file_reports_path() {
        let err = load_colony(Path::new("definitely/not/here")).unwrap_err();
        assert!(matches!(
            err,
            SeedError::Io { ref path, .. } if path == Path::new("definitely/not/here.txt")
        ));
    }
}
