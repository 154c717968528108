//! Error types for the Agelife engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the run itself.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: agelife_core::config::ConfigError,
    },

    /// The initial generation could not be built.
    #[error("seed error: {source}")]
    Seed {
        /// The underlying seeding error.
        #[from]
        source: crate::seed::SeedError,
    },

    /// The simulation driver failed.
    #[error("driver error: {source}")]
    Driver {
        /// The underlying driver error.
        #[from]
        source: agelife_core::DriverError,
    },

    /// The operator input thread could not be started, or the run-again
    /// prompt could not be written.
    #[error("input error: {source}")]
    Input {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
