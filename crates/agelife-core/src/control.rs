//! Shared control signals for a running simulation.
//!
//! A [`Controller`] is wrapped in [`Arc`](std::sync::Arc) and shared
//! between the driver loop and whatever produces operator input (a
//! terminal reader, a signal handler, a test). It carries three signals:
//!
//! - **cancel** -- terminal; the driver stops at its next loop boundary
//! - **advance** -- one step in manual cadence or while paused
//! - **pause / resume** -- suspend a timed cadence without stopping
//!
//! Flags are atomics so the driver can poll them without locking; the
//! matching [`Notify`] wakes a driver that is suspended waiting on them.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Operator control state shared with the driver loop.
#[derive(Debug, Default)]
pub struct Controller {
    /// Whether cancellation has been requested. Never reset.
    cancelled: AtomicBool,

    /// Wakes every task waiting in [`Controller::cancelled`].
    cancel_notify: Notify,

    /// Holds at most one pending advance permit.
    advance_notify: Notify,

    /// Whether a timed cadence is currently suspended.
    paused: AtomicBool,

    /// Wakes the driver when paused is cleared.
    resume_notify: Notify,
}

impl Controller {
    /// Create a controller with no pending signals.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Cancel
    // -----------------------------------------------------------------------

    /// Request that the driver stop. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.cancel_notify.notify_waiters();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Wait until cancellation is requested.
    ///
    /// Returns immediately if it already has been.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.cancel_notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel
            // between the check and the await is not lost.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    // -----------------------------------------------------------------------
    // Advance
    // -----------------------------------------------------------------------

    /// Signal the driver to perform one step.
    ///
    /// If the driver is not currently waiting, the signal is kept until it
    /// next waits. Signals sent while one is already pending collapse into
    /// that one.
    pub fn advance(&self) {
        self.advance_notify.notify_one();
    }

    /// Wait for the next advance signal, consuming it.
    pub async fn advanced(&self) {
        self.advance_notify.notified().await;
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Suspend a timed cadence. The driver waits for resume, advance or
    /// cancel before its next step.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume a paused cadence and wake the driver.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_waiters();
    }

    /// Whether the cadence is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Wait until the controller is no longer paused.
    ///
    /// Returns immediately if not paused.
    pub async fn resumed(&self) {
        loop {
            let notified = self.resume_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if !self.is_paused() {
                return;
            }
            notified.await;
        }
    }
}
