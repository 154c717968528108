//! Generation transition engine and simulation driver for Agelife.
//!
//! Agelife is Conway's Game of Life with aging: each live cell records how
//! many generations it has survived, saturating at a configured maximum.
//!
//! # Modules
//!
//! - [`cadence`] -- Step pacing: immediate, fixed delay, or manual.
//! - [`config`] -- Configuration loading from `agelife-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- [`Controller`], the shared cancel / advance / pause
//!   signals.
//! - [`driver`] -- [`Driver`], which repeatedly applies the transition
//!   engine under a cadence until cancelled.
//! - [`observer`] -- [`GenerationObserver`] trait and stock observers.
//! - [`rules`] -- The rule table and the pure transition functions.
//!
//! [`Controller`]: control::Controller
//! [`Driver`]: driver::Driver
//! [`GenerationObserver`]: observer::GenerationObserver

pub mod cadence;
pub mod config;
pub mod control;
pub mod driver;
pub mod observer;
pub mod rules;

pub use cadence::Cadence;
pub use control::Controller;
pub use driver::{Driver, DriverError, DriverState, EndReason, GenerationSummary, RunResult};
pub use observer::{GenerationObserver, NoOpObserver, Snapshot, WatchObserver};
pub use rules::{Rules, compute_next, compute_next_into};
