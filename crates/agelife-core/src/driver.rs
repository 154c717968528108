//! Simulation driver: repeated generation transitions under operator control.
//!
//! The [`Driver`] owns the current generation and a scratch grid. Each
//! [`step`](Driver::step) computes the next generation into the scratch
//! grid and swaps the two, so the current grid is only ever replaced as a
//! whole.
//!
//! [`run`](Driver::run) adds the control plane around `step`:
//!
//! - **Cadence**: immediate, fixed delay, or manual advance
//! - **Pause/resume**: suspend a timed cadence; advance still single-steps
//! - **Cancellation**: checked at loop boundaries, never mid-step
//! - **Bounds**: optional generation limit and stop on extinction
//!
//! # States
//!
//! ```text
//!   Idle --run--> Running <--pause/resume--> Paused
//!                    |                          |
//!                    +--cancel / bound / error--+--> Stopped
//! ```

use std::sync::Arc;

use agelife_grid::{Age, Grid};
use tracing::{debug, info, warn};

use crate::cadence::Cadence;
use crate::config::SimulationBoundsConfig;
use crate::control::Controller;
use crate::observer::GenerationObserver;
use crate::rules::{self, GenerationStats, Rules, TransitionError};

/// Errors that can occur while driving the simulation.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A generation transition failed. The driver is now stopped.
    #[error("transition error: {source}")]
    Transition {
        /// The underlying transition error.
        #[from]
        source: TransitionError,
    },

    /// The driver has already stopped and cannot step again.
    #[error("driver is stopped")]
    Stopped,
}

/// Lifecycle state of a [`Driver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No run has started yet.
    Idle,
    /// Stepping on a timed cadence.
    Running,
    /// Waiting for an explicit advance signal (manual cadence or paused).
    Paused,
    /// Terminal: no further steps.
    Stopped,
}

/// Reason a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The controller was cancelled.
    Cancelled,
    /// The configured `max_generations` limit was reached.
    MaxGenerationsReached,
    /// A generation had no live cells and `stop_on_extinction` is set.
    Extinction,
}

/// Summary of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    /// Generation number; the initial grid is generation 0.
    pub generation: u64,
    /// Live cells.
    pub population: usize,
    /// Cells born in this generation.
    pub births: usize,
    /// Cells that died in this generation.
    pub deaths: usize,
    /// Oldest live age, 0 if none alive.
    pub oldest: Age,
}

impl GenerationSummary {
    fn from_stats(generation: u64, stats: GenerationStats) -> Self {
        Self {
            generation,
            population: stats.population,
            births: stats.births,
            deaths: stats.deaths,
            oldest: stats.oldest,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: EndReason,
    /// Steps performed during this run.
    pub generations_run: u64,
    /// Summary of the last generation computed, if any.
    pub final_summary: Option<GenerationSummary>,
}

/// What woke the run loop.
enum Wake {
    /// Perform a step.
    Step,
    /// Re-evaluate the loop without stepping (pause state changed).
    Recheck,
    /// Stop.
    Cancelled,
}

/// Drives the generation transition engine.
#[derive(Debug)]
pub struct Driver {
    /// The latest complete generation.
    current: Grid,
    /// Reused output buffer; allocated on the first step.
    scratch: Option<Grid>,
    /// The rule table.
    rules: Rules,
    /// Optional end conditions for [`Driver::run`].
    bounds: SimulationBoundsConfig,
    /// Number of the current generation.
    generation: u64,
    /// Lifecycle state.
    state: DriverState,
}

impl Driver {
    /// Create an idle driver starting from `initial` as generation 0.
    pub fn new(initial: Grid, rules: Rules) -> Self {
        Self {
            current: initial,
            scratch: None,
            rules,
            bounds: SimulationBoundsConfig::default(),
            generation: 0,
            state: DriverState::Idle,
        }
    }

    /// Set end conditions applied by [`Driver::run`].
    #[must_use]
    pub fn with_bounds(mut self, bounds: SimulationBoundsConfig) -> Self {
        self.bounds = bounds;
        self
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> DriverState {
        self.state
    }

    /// Number of the current generation.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The current generation.
    pub const fn current(&self) -> &Grid {
        &self.current
    }

    /// The rule table in use.
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Summarize the current generation without stepping.
    ///
    /// Births and deaths are not known for a grid that was not computed
    /// by a step, so they are reported as 0.
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            generation: self.generation,
            population: self.current.population(),
            births: 0,
            deaths: 0,
            oldest: self.current.oldest(),
        }
    }

    /// Compute one generation and make it current.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Stopped`] if the driver has stopped, or
    /// [`DriverError::Transition`] if the engine fails, after which the
    /// driver is stopped.
    pub fn step(&mut self) -> Result<GenerationSummary, DriverError> {
        if self.state == DriverState::Stopped {
            return Err(DriverError::Stopped);
        }

        let scratch = self.scratch.get_or_insert_with(Grid::default);
        match rules::compute_next_into(&self.current, scratch, &self.rules) {
            Ok(stats) => {
                std::mem::swap(&mut self.current, scratch);
                self.generation = self.generation.saturating_add(1);
                Ok(GenerationSummary::from_stats(self.generation, stats))
            }
            Err(e) => {
                warn!(generation = self.generation, error = %e, "Step failed, stopping driver");
                self.state = DriverState::Stopped;
                Err(e.into())
            }
        }
    }

    /// Step repeatedly at `cadence` until cancelled or a bound is reached.
    ///
    /// `observer` is called once after every successful step. Once the
    /// controller is cancelled, no further step starts and no further
    /// notification is delivered. The driver is stopped when this returns,
    /// whether with a result or an error.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Stopped`] if the driver had already stopped,
    /// or [`DriverError::Transition`] if a step fails.
    pub async fn run(
        &mut self,
        cadence: Cadence,
        control: &Arc<Controller>,
        observer: &mut dyn GenerationObserver,
    ) -> Result<RunResult, DriverError> {
        if self.state == DriverState::Stopped {
            return Err(DriverError::Stopped);
        }

        info!(
            %cadence,
            rows = self.current.rows(),
            cols = self.current.cols(),
            max_age = self.rules.max_age(),
            generation = self.generation,
            max_generations = self.bounds.max_generations,
            stop_on_extinction = self.bounds.stop_on_extinction,
            "Simulation starting"
        );

        let mut generations_run: u64 = 0;
        let mut final_summary: Option<GenerationSummary> = None;

        let end_reason = loop {
            if control.is_cancelled() {
                break EndReason::Cancelled;
            }

            match self.wait_for_step(cadence, control).await {
                Wake::Cancelled => break EndReason::Cancelled,
                Wake::Recheck => continue,
                Wake::Step => {}
            }
            // A cancel that raced the wake-up still wins.
            if control.is_cancelled() {
                break EndReason::Cancelled;
            }

            let summary = self.step()?;
            generations_run = generations_run.saturating_add(1);
            debug!(
                generation = summary.generation,
                population = summary.population,
                births = summary.births,
                deaths = summary.deaths,
                oldest = summary.oldest,
                "Generation computed"
            );

            observer.on_generation(&summary, &self.current);

            let extinct = summary.population == 0;
            final_summary = Some(summary);

            if self.bounds.stop_on_extinction && extinct {
                info!(generation = self.generation, "No live cells left");
                break EndReason::Extinction;
            }
            if self.bounds.max_generations > 0 && generations_run >= self.bounds.max_generations {
                info!(
                    generation = self.generation,
                    max_generations = self.bounds.max_generations,
                    "Generation limit reached"
                );
                break EndReason::MaxGenerationsReached;
            }
        };

        self.state = DriverState::Stopped;
        Ok(RunResult {
            end_reason,
            generations_run,
            final_summary,
        })
    }

    /// Suspend until the next step is due, updating the state to match.
    async fn wait_for_step(&mut self, cadence: Cadence, control: &Controller) -> Wake {
        let manual = cadence.is_manual();
        if manual || control.is_paused() {
            if self.state != DriverState::Paused {
                info!(generation = self.generation, "Waiting for advance signal");
            }
            self.state = DriverState::Paused;
            return tokio::select! {
                biased;
                () = control.cancelled() => Wake::Cancelled,
                () = control.advanced() => Wake::Step,
                () = control.resumed(), if !manual => Wake::Recheck,
            };
        }

        if self.state == DriverState::Paused {
            info!(generation = self.generation, "Resumed");
        }
        self.state = DriverState::Running;

        match cadence.delay() {
            Some(delay) => {
                tokio::select! {
                    biased;
                    () = control.cancelled() => return Wake::Cancelled,
                    () = tokio::time::sleep(delay) => {}
                }
            }
            None => tokio::task::yield_now().await,
        }

        if control.is_paused() {
            Wake::Recheck
        } else {
            Wake::Step
        }
    }
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        generations_run = result.generations_run,
        final_generation = result.final_summary.as_ref().map(|s| s.generation),
        final_population = result.final_summary.as_ref().map(|s| s.population),
        "Simulation ended"
    );

    if result.final_summary.is_none() {
        warn!("Simulation ended with no generations computed");
    }
}
