//! Terminal rendering of generations.
//!
//! Frames are the grid's text form (one line per row, `-` for dead cells,
//! a base-36 age digit for live ones) followed by a status line. Rendering
//! runs either inline as a [`TerminalObserver`] or from a separate task fed
//! by a [`WatchObserver`](agelife_core::WatchObserver) receiver, in which
//! case a slow terminal drops intermediate frames instead of slowing the
//! simulation.

use std::io::{self, Write};

use agelife_core::{GenerationObserver, GenerationSummary, Snapshot};
use agelife_grid::Grid;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, warn};

/// ANSI sequence: clear the screen and move the cursor home.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// How frames are laid out.
#[derive(Debug, Clone, Default)]
pub struct FrameStyle {
    /// Clear the terminal before each frame.
    pub clear_screen: bool,
    /// Hint printed under the status line.
    pub footer: Option<String>,
}

/// Write one frame: the grid, a status line, and the optional footer.
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn render_frame<W: Write + ?Sized>(
    out: &mut W,
    summary: &GenerationSummary,
    grid: &Grid,
    style: &FrameStyle,
) -> io::Result<()> {
    if style.clear_screen {
        out.write_all(CLEAR_SCREEN.as_bytes())?;
    }
    write!(out, "{grid}")?;
    writeln!(
        out,
        "generation {} | population {} | births {} | deaths {} | oldest {}",
        summary.generation, summary.population, summary.births, summary.deaths, summary.oldest
    )?;
    if let Some(footer) = &style.footer {
        writeln!(out, "{footer}")?;
    }
    out.flush()
}

/// Observer that draws every generation inline, between steps.
#[derive(Debug)]
pub struct TerminalObserver<W> {
    out: W,
    style: FrameStyle,
}

impl<W: Write + Send> TerminalObserver<W> {
    /// Create an observer writing to `out`.
    pub const fn new(out: W, style: FrameStyle) -> Self {
        Self { out, style }
    }
}

impl<W: Write + Send> GenerationObserver for TerminalObserver<W> {
    fn on_generation(&mut self, summary: &GenerationSummary, grid: &Grid) {
        // A broken terminal must not stop the simulation.
        if let Err(e) = render_frame(&mut self.out, summary, grid, &self.style) {
            warn!(error = %e, generation = summary.generation, "Failed to render frame");
        }
    }
}

/// Render the latest snapshot each time the channel changes, until the
/// publishing observer is dropped. Returns the number of frames drawn.
///
/// Frames are formatted into a reused buffer and written asynchronously,
/// so a slow terminal never blocks a runtime worker.
///
/// # Errors
///
/// Returns the first I/O error from the writer.
pub async fn render_latest<W: AsyncWrite + Unpin + Send>(
    mut receiver: watch::Receiver<Option<Snapshot>>,
    mut out: W,
    style: FrameStyle,
) -> io::Result<u64> {
    let mut frames: u64 = 0;
    let mut buffer = Vec::new();

    // The initial value may already be set before the task starts.
    let initial = receiver.borrow_and_update().clone();
    if let Some(snapshot) = initial {
        write_snapshot(&mut out, &mut buffer, &snapshot, &style).await?;
        frames = frames.saturating_add(1);
    }

    while receiver.changed().await.is_ok() {
        let latest = receiver.borrow_and_update().clone();
        if let Some(snapshot) = latest {
            write_snapshot(&mut out, &mut buffer, &snapshot, &style).await?;
            frames = frames.saturating_add(1);
        }
    }

    debug!(frames, "Renderer finished");
    Ok(frames)
}

async fn write_snapshot<W: AsyncWrite + Unpin>(
    out: &mut W,
    buffer: &mut Vec<u8>,
    snapshot: &Snapshot,
    style: &FrameStyle,
) -> io::Result<()> {
    buffer.clear();
    render_frame(buffer, &snapshot.summary, &snapshot.grid, style)?;
    out.write_all(buffer).await?;
    out.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agelife_core::WatchObserver;
    use agelife_grid::Age;

    use super::*;

    fn summary(generation: u64) -> GenerationSummary {
        GenerationSummary {
            generation,
            population: 3,
            births: 2,
            deaths: 2,
            oldest: 2,
        }
    }

    fn blinker() -> Grid {
        let rows: [[Age; 3]; 3] = [[0, 0, 0], [2, 1, 2], [0, 0, 0]];
        Grid::from_rows(&rows).unwrap()
    }

    #[test]
    fn frame_contains_grid_and_status() {
        let mut out = Vec::new();
        render_frame(&mut out, &summary(4), &blinker(), &FrameStyle::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "---\n212\n---\n\
             generation 4 | population 3 | births 2 | deaths 2 | oldest 2\n"
        );
    }

    #[test]
    fn style_adds_clear_and_footer() {
        let style = FrameStyle {
            clear_screen: true,
            footer: Some(String::from("press return")),
        };
        let mut out = Vec::new();
        render_frame(&mut out, &summary(0), &blinker(), &style).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(CLEAR_SCREEN));
        assert!(text.ends_with("press return\n"));
    }

    #[test]
    fn terminal_observer_writes_each_generation() {
        let mut out = Vec::new();
        let mut observer = TerminalObserver::new(&mut out, FrameStyle::default());
        observer.on_generation(&summary(1), &blinker());
        observer.on_generation(&summary(2), &blinker());
        drop(observer);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("generation ").count(), 2);
    }

    #[tokio::test]
    async fn render_latest_stops_when_observer_drops() {
        let (observer, receiver) = WatchObserver::new();
        observer.publish(&summary(0), &blinker());
        drop(observer);

        let mut out = Vec::new();
        let frames = render_latest(receiver, &mut out, FrameStyle::default())
            .await
            .unwrap();
        assert_eq!(frames, 1);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "---\n212\n---\n\
             generation 0 | population 3 | births 2 | deaths 2 | oldest 2\n"
        );
    }

    #[tokio::test]
    async fn render_latest_runs_alongside_the_publisher() {
        let (observer, receiver) = WatchObserver::new();
        let renderer = tokio::spawn(render_latest(receiver, Vec::new(), FrameStyle::default()));

        observer.publish(&summary(0), &blinker());
        tokio::task::yield_now().await;
        observer.publish(&summary(1), &blinker());
        drop(observer);

        let frames = renderer.await.unwrap().unwrap();
        assert!((1..=2).contains(&frames));
    }

    #[tokio::test]
    async fn render_latest_with_nothing_published_draws_nothing() {
        let (observer, receiver) = WatchObserver::new();
        drop(observer);
        let frames = render_latest(receiver, Vec::new(), FrameStyle::default())
            .await
            .unwrap();
        assert_eq!(frames, 0);
    }
}
