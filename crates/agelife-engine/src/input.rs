//! Operator input: stdin lines and Ctrl-C mapped onto the [`Controller`].
//!
//! Under the manual cadence every line advances one generation except
//! `quit`, which ends the run. Under a timed cadence `pause`, `resume` and
//! `step` control the loop and any other line ends the run. Between runs
//! the same lines answer the run-again prompt.
//!
//! Stdin is read on a dedicated OS thread rather than a runtime task so
//! that a pending read never holds up runtime shutdown. Lines reach the
//! async side through a bounded channel.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use agelife_core::{Cadence, Controller};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lines buffered between the reader thread and the async side.
const LINE_BUFFER: usize = 16;

/// Question asked after each run.
const RESTART_PROMPT: &str = "Would you like to run another? (yes/no) ";

/// Reply to anything other than yes or no.
const RESTART_REPROMPT: &str = "Please enter \"yes\" or \"no\".\n";

/// An operator request decoded from one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Compute one generation.
    Advance,
    /// Suspend a timed cadence.
    Pause,
    /// Resume a paused timed cadence.
    Resume,
    /// End the run.
    Cancel,
}

/// Decode an input line for the given cadence.
pub fn interpret_line(line: &str, cadence: Cadence) -> ControlCommand {
    let word = line.trim();
    if cadence.is_manual() {
        if word.eq_ignore_ascii_case("quit") {
            ControlCommand::Cancel
        } else {
            ControlCommand::Advance
        }
    } else if word.eq_ignore_ascii_case("pause") {
        ControlCommand::Pause
    } else if word.eq_ignore_ascii_case("resume") {
        ControlCommand::Resume
    } else if word.eq_ignore_ascii_case("step") {
        ControlCommand::Advance
    } else {
        ControlCommand::Cancel
    }
}

/// Apply a command to the controller.
pub fn apply(command: ControlCommand, control: &Controller) {
    match command {
        ControlCommand::Advance => control.advance(),
        ControlCommand::Pause => control.pause(),
        ControlCommand::Resume => control.resume(),
        ControlCommand::Cancel => control.cancel(),
    }
    debug!(?command, "Operator command applied");
}

/// Footer hint describing the available input for a cadence.
pub fn hint(cadence: Cadence) -> String {
    if cadence.is_manual() {
        String::from("Press return to advance [or type \"quit\" to end]")
    } else {
        String::from("Type pause, resume or step, or press return to end")
    }
}

/// Start the stdin reader thread and return the receiving end of its
/// line channel.
///
/// # Errors
///
/// Returns an I/O error if the thread cannot be spawned.
pub fn spawn_stdin_reader() -> io::Result<(thread::JoinHandle<()>, mpsc::Receiver<String>)> {
    let (sender, receiver) = mpsc::channel(LINE_BUFFER);
    let handle = thread::Builder::new()
        .name(String::from("agelife-stdin"))
        .spawn(move || forward_lines(io::stdin().lock(), &sender))?;
    Ok((handle, receiver))
}

/// Send each line of `reader` into the channel until end of input, a read
/// error, or the receiver going away. Must not run on a runtime thread.
pub fn forward_lines<B: BufRead>(reader: B, sender: &mpsc::Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if sender.blocking_send(line).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read operator input");
                return;
            }
        }
    }
    debug!("Operator input closed");
}

/// Apply operator lines to `control` until the run is cancelled.
///
/// End of input cancels a manual run, which could otherwise never advance
/// again. A timed run keeps going until another signal stops it.
pub async fn pump_lines(lines: &mut mpsc::Receiver<String>, cadence: Cadence, control: &Controller) {
    loop {
        let line = tokio::select! {
            biased;
            () = control.cancelled() => return,
            line = lines.recv() => line,
        };

        let Some(line) = line else {
            if cadence.is_manual() {
                info!("Operator input closed, cancelling manual run");
                control.cancel();
            }
            control.cancelled().await;
            return;
        };

        let command = interpret_line(&line, cadence);
        apply(command, control);
        if command == ControlCommand::Cancel {
            return;
        }
    }
}

/// Cancel `run` once `session` is cancelled. Returns as soon as either is.
pub async fn forward_cancel(session: &Controller, run: &Controller) {
    tokio::select! {
        biased;
        () = session.cancelled() => run.cancel(),
        () = run.cancelled() => {}
    }
}

/// Decode an answer to the run-again prompt.
pub fn parse_restart_answer(line: &str) -> Option<bool> {
    let word = line.trim();
    if word.eq_ignore_ascii_case("yes") || word.eq_ignore_ascii_case("y") {
        Some(true)
    } else if word.eq_ignore_ascii_case("no") || word.eq_ignore_ascii_case("n") {
        Some(false)
    } else {
        None
    }
}

/// Ask whether to run again, repeating the question until the operator
/// answers yes or no.
///
/// End of input and a cancelled session both count as no.
///
/// # Errors
///
/// Returns any I/O error from writing the prompt.
pub async fn ask_restart<W: AsyncWrite + Unpin>(
    lines: &mut mpsc::Receiver<String>,
    session: &Controller,
    out: &mut W,
) -> io::Result<bool> {
    loop {
        out.write_all(RESTART_PROMPT.as_bytes()).await?;
        out.flush().await?;

        let line = tokio::select! {
            biased;
            () = session.cancelled() => return Ok(false),
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            return Ok(false);
        };

        if let Some(answer) = parse_restart_answer(&line) {
            return Ok(answer);
        }
        out.write_all(RESTART_REPROMPT.as_bytes()).await?;
    }
}

/// Cancel the session when Ctrl-C is received.
pub fn spawn_ctrl_c(session: Arc<Controller>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, cancelling");
                session.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
