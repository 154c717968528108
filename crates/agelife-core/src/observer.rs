//! Generation observers.
//!
//! The driver calls [`GenerationObserver::on_generation`] once after every
//! successful step, with the summary and the complete new grid. This is the
//! only point where the core communicates outward.
//!
//! The call is synchronous: a slow observer delays the next step. Use
//! [`WatchObserver`] to decouple a slow consumer, which then sees only the
//! latest generation.

use agelife_grid::Grid;
use tokio::sync::watch;

use crate::driver::GenerationSummary;

/// Callback invoked after each generation is computed.
pub trait GenerationObserver: Send {
    /// Called after a step completes successfully.
    fn on_generation(&mut self, summary: &GenerationSummary, grid: &Grid);
}

/// An observer that ignores every generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl GenerationObserver for NoOpObserver {
    fn on_generation(&mut self, _summary: &GenerationSummary, _grid: &Grid) {}
}

/// A generation as seen by a decoupled consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Statistics for the generation.
    pub summary: GenerationSummary,
    /// The full grid of the generation.
    pub grid: Grid,
}

/// Publishes each generation into a [`watch`] channel.
///
/// Publishing never blocks and never fails, even with no receivers. A
/// receiver that falls behind skips straight to the newest snapshot.
#[derive(Debug)]
pub struct WatchObserver {
    sender: watch::Sender<Option<Snapshot>>,
}

impl WatchObserver {
    /// Create an observer and the receiver that consumes its snapshots.
    ///
    /// The receiver starts at `None` and sees `Some` once the first
    /// generation is published. It observes a closed channel once the
    /// observer is dropped.
    pub fn new() -> (Self, watch::Receiver<Option<Snapshot>>) {
        let (sender, receiver) = watch::channel(None);
        (Self { sender }, receiver)
    }

    /// Publish an arbitrary snapshot, e.g. the initial generation.
    pub fn publish(&self, summary: &GenerationSummary, grid: &Grid) {
        self.sender.send_replace(Some(Snapshot {
            summary: summary.clone(),
            grid: grid.clone(),
        }));
    }
}

impl GenerationObserver for WatchObserver {
    fn on_generation(&mut self, summary: &GenerationSummary, grid: &Grid) {
        self.publish(summary, grid);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn summary(generation: u64) -> GenerationSummary {
        GenerationSummary {
            generation,
            population: 1,
            births: 0,
            deaths: 0,
            oldest: 1,
        }
    }

    #[test]
    fn watch_receiver_sees_latest_generation_only() {
        let (mut observer, receiver) = WatchObserver::new();
        assert!(receiver.borrow().is_none());

        let grid = Grid::new(1, 1).unwrap();
        observer.on_generation(&summary(1), &grid);
        observer.on_generation(&summary(2), &grid);

        let latest = receiver.borrow().clone().unwrap();
        assert_eq!(latest.summary.generation, 2);
        assert_eq!(latest.grid, grid);
    }

    #[test]
    fn publishing_without_receivers_does_not_fail() {
        let (mut observer, receiver) = WatchObserver::new();
        drop(receiver);
        observer.on_generation(&summary(1), &Grid::default());
    }

    #[tokio::test]
    async fn receiver_sees_close_after_observer_drops() {
        let (observer, mut receiver) = WatchObserver::new();
        drop(observer);
        assert!(receiver.changed().await.is_err());
    }
}
