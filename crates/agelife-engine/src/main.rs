//! Terminal binary for Agelife, Conway's Game of Life with aging cells.
//!
//! Wires configuration, the initial generation, operator input and
//! rendering around the simulation driver. After each run the operator is
//! asked whether to run another, which starts over from a fresh seed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `agelife-config.yaml` (or `AGELIFE_CONFIG`)
//! 2. Initialize structured logging (tracing) on stderr
//! 3. Start Ctrl-C and stdin listeners for the whole session
//! 4. Build the initial generation from a colony file or randomly
//! 5. Run the driver with an inline or decoupled renderer
//! 6. Log the result and ask whether to run again

mod error;
mod input;
mod render;
mod seed;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use agelife_core::config::SimulationConfig;
use agelife_core::driver::log_run_end;
use agelife_core::{Controller, Driver, GenerationObserver, RunResult, WatchObserver};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::render::{FrameStyle, TerminalObserver};

/// Environment variable naming the configuration file.
const CONFIG_PATH_ENV: &str = "AGELIFE_CONFIG";

/// Configuration file used when `AGELIFE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "agelife-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, seeding or the run itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so the source is
    //    reported once it is.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. Frames go to stdout.
    let fallback_level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level)),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    info!("agelife-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        max_age = config.rules.max_age,
        cadence = %config.cadence,
        max_generations = config.simulation.max_generations,
        stop_on_extinction = config.simulation.stop_on_extinction,
        decoupled_render = config.render.decoupled,
        "Simulation configured"
    );

    // 3. Session-wide control. Ctrl-C ends the session without prompting.
    let session = Arc::new(Controller::new());
    let _ctrl_c = input::spawn_ctrl_c(Arc::clone(&session));
    let (_stdin, mut lines) =
        input::spawn_stdin_reader().map_err(|source| EngineError::Input { source })?;
    let mut stdout = tokio::io::stdout();

    let mut runs: u32 = 0;
    loop {
        // 4-5. Seed and run.
        let result = run(&config, &session, &mut lines).await?;
        runs = runs.saturating_add(1);

        // 6. Log results, then offer another run.
        log_run_end(&result);
        info!(
            run = runs,
            end_reason = ?result.end_reason,
            generations_run = result.generations_run,
            "Run complete"
        );

        if session.is_cancelled() {
            break;
        }
        let again = input::ask_restart(&mut lines, &session, &mut stdout)
            .await
            .map_err(|source| EngineError::Input { source })?;
        if !again {
            break;
        }
    }

    info!(runs, "agelife-engine shutdown complete");
    Ok(())
}

/// Load the configuration from `AGELIFE_CONFIG`, or from
/// `agelife-config.yaml` in the working directory.
///
/// Returns the path that was read, or `None` when defaults are used. A
/// path named explicitly by `AGELIFE_CONFIG` must exist.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
        let path = PathBuf::from(explicit);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((SimulationConfig::parse("")?, None))
    }
}

/// Seed a fresh initial generation and drive it to its end.
///
/// Each run gets its own controller. Operator lines are applied to it until
/// the run ends, and cancelling `session` cancels it too.
async fn run(
    config: &SimulationConfig,
    session: &Controller,
    lines: &mut mpsc::Receiver<String>,
) -> Result<RunResult, EngineError> {
    let rules = config.rules()?;
    let initial = seed::seed_grid(&config.seed, &rules)?;

    let control = Arc::new(Controller::new());
    let mut driver = Driver::new(initial, rules).with_bounds(config.simulation.clone());
    let style = FrameStyle {
        clear_screen: true,
        footer: Some(input::hint(config.cadence)),
    };

    let drive = async {
        let result = if config.render.decoupled {
            let (mut observer, receiver) = WatchObserver::new();
            observer.publish(&driver.summary(), driver.current());
            let renderer =
                tokio::spawn(render::render_latest(receiver, tokio::io::stdout(), style));

            let result = driver.run(config.cadence, &control, &mut observer).await;

            // Closing the channel lets the renderer draw the last frame and exit.
            drop(observer);
            match renderer.await {
                Ok(Ok(frames)) => debug!(frames, "Renderer joined"),
                Ok(Err(e)) => warn!(error = %e, "Renderer failed"),
                Err(e) => warn!(error = %e, "Renderer task panicked or was cancelled"),
            }
            result
        } else {
            let mut observer = TerminalObserver::new(io::stdout(), style);
            observer.on_generation(&driver.summary(), driver.current());
            driver.run(config.cadence, &control, &mut observer).await
        };
        // Releases the input pump and the session watcher.
        control.cancel();
        result
    };

    let (result, (), ()) = tokio::join!(
        drive,
        input::pump_lines(lines, config.cadence, &control),
        input::forward_cancel(session, &control),
    );
    Ok(result?)
}
