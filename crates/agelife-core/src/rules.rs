//! Generation transition engine.
//!
//! Computes the next generation of a [`Grid`] from the 8-neighbour
//! occupancy of every cell:
//!
//! | live neighbours | dead cell      | live cell of age `a`          |
//! |-----------------|----------------|-------------------------------|
//! | 0 or 1          | stays dead     | dies (loneliness)             |
//! | 2               | stays dead     | survives, age `min(a + 1, max)` |
//! | 3               | born, age 1    | survives, age `min(a + 1, max)` |
//! | 4 or more       | stays dead     | dies (overcrowding)           |
//!
//! Every neighbour count is read from the current generation and every
//! result is written into a separate output grid, so births and deaths
//! take effect simultaneously regardless of evaluation order.

use agelife_grid::{Age, DEAD, Grid};

/// Age cap used when no explicit configuration is given.
pub const DEFAULT_MAX_AGE: Age = 12;

/// Age of a newly born cell.
pub const NEWBORN_AGE: Age = 1;

/// Errors that can occur when building a rule set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The age cap must leave room for a newborn cell.
    #[error("max_age must be at least {NEWBORN_AGE}, got {max_age}")]
    InvalidMaxAge {
        /// The rejected cap.
        max_age: Age,
    },
}

/// Errors that can occur while computing a generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// A grid's storage no longer matches its recorded dimensions.
    #[error("grid storage holds {cells} cells, inconsistent with {rows}x{cols}")]
    DimensionMismatch {
        /// Recorded row count.
        rows: i32,
        /// Recorded column count.
        cols: i32,
        /// Actual number of stored cells.
        cells: usize,
    },
}

/// The fixed rule table, parameterised only by the age cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Ages saturate at this value.
    max_age: Age,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

impl Rules {
    /// Create a rule set with the given age cap.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidMaxAge`] if `max_age` is 0.
    pub const fn new(max_age: Age) -> Result<Self, RulesError> {
        if max_age < NEWBORN_AGE {
            return Err(RulesError::InvalidMaxAge { max_age });
        }
        Ok(Self { max_age })
    }

    /// The age cap.
    pub const fn max_age(&self) -> Age {
        self.max_age
    }

    /// Next age of a cell currently aged `age` with `live_neighbours`
    /// live cells around it.
    pub const fn next_age(&self, age: Age, live_neighbours: u8) -> Age {
        let alive = age > DEAD;
        match live_neighbours {
            2 | 3 if alive => self.survive(age),
            3 => NEWBORN_AGE,
            _ => DEAD,
        }
    }

    /// Age after surviving one more generation, saturating at the cap.
    const fn survive(&self, age: Age) -> Age {
        let next = age.saturating_add(1);
        if next > self.max_age {
            self.max_age
        } else {
            next
        }
    }
}

/// Per-generation statistics gathered while computing a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Live cells in the new generation.
    pub population: usize,
    /// Cells that were dead and are now alive.
    pub births: usize,
    /// Cells that were alive and are now dead.
    pub deaths: usize,
    /// Oldest age in the new generation, 0 if none alive.
    pub oldest: Age,
}

impl GenerationStats {
    fn record(&mut self, before: Age, after: Age) {
        if after > DEAD {
            self.population = self.population.saturating_add(1);
            self.oldest = self.oldest.max(after);
            if before == DEAD {
                self.births = self.births.saturating_add(1);
            }
        } else if before > DEAD {
            self.deaths = self.deaths.saturating_add(1);
        }
    }
}

/// Compute the next generation of `current` into a freshly allocated grid.
///
/// # Errors
///
/// Returns [`TransitionError::DimensionMismatch`] if `current` is corrupt.
pub fn compute_next(current: &Grid, rules: &Rules) -> Result<Grid, TransitionError> {
    let mut next = Grid::default();
    compute_next_into(current, &mut next, rules)?;
    Ok(next)
}

/// Compute the next generation of `current` into `next`.
///
/// `next` is a scratch buffer: it is resized to the dimensions of `current`
/// when they differ, otherwise its allocation is reused and every cell is
/// overwritten. `current` is only read.
///
/// # Errors
///
/// Returns [`TransitionError::DimensionMismatch`] if either grid's storage
/// disagrees with its dimensions.
pub fn compute_next_into(
    current: &Grid,
    next: &mut Grid,
    rules: &Rules,
) -> Result<GenerationStats, TransitionError> {
    let (rows, cols) = current.dimensions();
    let mismatch = |grid: &Grid| TransitionError::DimensionMismatch {
        rows: grid.rows(),
        cols: grid.cols(),
        cells: grid.cell_count(),
    };

    if !current.is_consistent() {
        return Err(mismatch(current));
    }
    if next.dimensions() != (rows, cols) {
        next.resize(rows, cols).map_err(|_err| mismatch(current))?;
    }

    let mut stats = GenerationStats::default();
    for (row, col, age) in current.iter() {
        let after = rules.next_age(age, current.live_neighbours(row, col));
        next.set(row, col, after).map_err(|_err| mismatch(next))?;
        stats.record(age, after);
    }
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Positions around the centre of a 3x3 grid, in fill order.
    const RING: [(i32, i32); 8] = [
        (0, 0),
        (0, 1),
        (0, 2),
        (1, 0),
        (1, 2),
        (2, 0),
        (2, 1),
        (2, 2),
    ];

    fn grid(rows: &[&[Age]]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    /// A 3x3 grid with `centre` in the middle and `n` live neighbours.
    fn ring_fixture(centre: Age, n: usize) -> Grid {
        let mut fixture = Grid::new(3, 3).unwrap();
        fixture.set(1, 1, centre).unwrap();
        for &(r, c) in RING.iter().take(n) {
            fixture.set(r, c, 1).unwrap();
        }
        fixture
    }

    fn centre_after(centre: Age, n: usize) -> Age {
        let current = ring_fixture(centre, n);
        assert_eq!(usize::from(current.live_neighbours(1, 1)), n);
        compute_next(&current, &Rules::default())
            .unwrap()
            .get(1, 1)
            .unwrap()
    }

    #[test]
    fn rule_table_for_dead_centre() {
        let expected = [0, 0, 0, 1, 0, 0, 0, 0, 0];
        for (n, want) in expected.into_iter().enumerate() {
            assert_eq!(centre_after(DEAD, n), want, "dead centre, {n} neighbours");
        }
    }

    #[test]
    fn rule_table_for_live_centre() {
        let expected = [0, 0, 5, 5, 0, 0, 0, 0, 0];
        for (n, want) in expected.into_iter().enumerate() {
            assert_eq!(centre_after(4, n), want, "live centre, {n} neighbours");
        }
    }

    #[test]
    fn survivors_saturate_at_max_age() {
        let rules = Rules::new(3).unwrap();
        assert_eq!(rules.next_age(2, 2), 3);
        assert_eq!(rules.next_age(3, 2), 3);
        assert_eq!(rules.next_age(3, 3), 3);
        // Ages seeded above the cap are pulled back to it.
        assert_eq!(rules.next_age(40, 3), 3);
        assert_eq!(rules.next_age(Age::MAX, 2), 3);
    }

    #[test]
    fn zero_max_age_is_rejected() {
        assert_eq!(Rules::new(0), Err(RulesError::InvalidMaxAge { max_age: 0 }));
        assert_eq!(Rules::new(1).unwrap().max_age(), 1);
    }

    #[test]
    fn lone_cell_on_one_by_one_grid_dies() {
        let current = grid(&[&[1]]);
        let next = compute_next(&current, &Rules::default()).unwrap();
        assert_eq!(next, grid(&[&[0]]));
    }

    #[test]
    fn empty_and_degenerate_grids_are_valid() {
        let rules = Rules::default();
        let empty = Grid::new(0, 0).unwrap();
        assert_eq!(compute_next(&empty, &rules).unwrap(), empty);

        let line = grid(&[&[1, 1, 1]]);
        assert_eq!(compute_next(&line, &rules).unwrap(), grid(&[&[0, 2, 0]]));

        let column = grid(&[&[1], &[1], &[1]]);
        assert_eq!(
            compute_next(&column, &rules).unwrap(),
            grid(&[&[0], &[2], &[0]])
        );
    }

    #[test]
    fn corner_cells_never_count_outside_positions() {
        // Every in-bounds neighbour of the corner is alive: 3 neighbours.
        let current = grid(&[&[0, 1], &[1, 1]]);
        let next = compute_next(&current, &Rules::default()).unwrap();
        assert_eq!(next.get(0, 0).unwrap(), NEWBORN_AGE);
    }

    #[test]
    fn block_is_a_still_life_that_ages() {
        let current = grid(&[
            &[0, 0, 0, 0],
            &[0, 1, 1, 0],
            &[0, 1, 1, 0],
            &[0, 0, 0, 0],
        ]);
        let next = compute_next(&current, &Rules::default()).unwrap();
        assert_eq!(
            next,
            grid(&[
                &[0, 0, 0, 0],
                &[0, 2, 2, 0],
                &[0, 2, 2, 0],
                &[0, 0, 0, 0],
            ])
        );
    }

    #[test]
    fn blinker_oscillates_with_births_and_deaths() {
        let rules = Rules::default();
        let horizontal = grid(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 0]]);
        let mut next = Grid::default();
        let stats = compute_next_into(&horizontal, &mut next, &rules).unwrap();
        assert_eq!(next, grid(&[&[0, 1, 0], &[0, 2, 0], &[0, 1, 0]]));
        assert_eq!(
            stats,
            GenerationStats {
                population: 3,
                births: 2,
                deaths: 2,
                oldest: 2,
            }
        );
    }

    #[test]
    fn scratch_buffer_is_resized_and_fully_overwritten() {
        let rules = Rules::default();
        let current = grid(&[&[1, 1], &[1, 0]]);
        let mut scratch = grid(&[&[9, 9, 9]]);
        compute_next_into(&current, &mut scratch, &rules).unwrap();
        assert_eq!(scratch, grid(&[&[2, 2], &[2, 1]]));

        // Same dimensions: stale contents are overwritten, not merged.
        let quiet = Grid::new(2, 2).unwrap();
        compute_next_into(&quiet, &mut scratch, &rules).unwrap();
        assert_eq!(scratch, quiet);
    }
}
