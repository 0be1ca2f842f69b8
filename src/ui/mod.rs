//! Run reporting
//!
//! Provides a simple API for displaying pipeline state:
//! - Current phase (Drop, Create, Load, Transform)
//! - Progress (current/total with optional details)
//! - Activity log (scrollable history)
//!
//! `UiApp` draws a terminal UI with ratatui, `LogUi` forwards everything to
//! `tracing`, `SilentUi` discards it.

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;

pub use crate::pipeline::Phase;
use components::{LogPanel, ProgressPanel, StatusPanel};

/// Progress information for the current operation
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Trait for UI implementations - allows both real TUI and log/test modes
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
}

type Backend = CrosstermBackend<Stdout>;

/// Raw mode plus alternate screen, undone on drop
struct Screen {
    terminal: Terminal<Backend>,
    active: bool,
}

impl Screen {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;

        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout))?,
            active: true,
        })
    }

    fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.leave().ok();
    }
}

/// Terminal view of a run: phase track, copy progress, statement log
pub struct UiApp {
    screen: Screen,
    status: StatusPanel,
    progress: ProgressPanel,
    log: LogPanel,
}

impl UiApp {
    pub fn new() -> Result<Self> {
        Ok(Self {
            screen: Screen::enter()?,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            log: LogPanel::new(),
        })
    }

    fn draw(&mut self) -> Result<()> {
        let Self {
            screen,
            status,
            progress,
            log,
        } = self;

        screen.terminal.draw(|frame| {
            let [top, middle, bottom] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(5),
                    Constraint::Length(3),
                    Constraint::Min(5),
                ])
                .areas(frame.area());

            status.render(frame, top);
            progress.render(frame, middle);
            log.render(frame, bottom);
        })?;

        Ok(())
    }

    /// A failed frame is not worth aborting a run over
    fn redraw(&mut self) {
        if let Err(e) = self.draw() {
            tracing::debug!(error = %e, "terminal redraw failed");
        }
    }

    /// Show the summary and keep it on screen until a key is pressed
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.status.set_phase(Phase::Complete);
        self.progress.clear();
        self.log.add(summary);
        self.log.add("Press any key to exit...");
        self.draw()?;

        while !matches!(wait_for_event()?, CrosstermEvent::Key(_)) {}

        self.restore()
    }

    /// Give the terminal back without waiting
    pub fn restore(mut self) -> Result<()> {
        self.screen.leave()?;
        Ok(())
    }
}

fn wait_for_event() -> io::Result<CrosstermEvent> {
    loop {
        if event::poll(Duration::from_millis(100))? {
            return event::read();
        }
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.redraw();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.redraw();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.redraw();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.redraw();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(message);
        self.redraw();
    }
}

/// Reports through `tracing`; the default for non-interactive runs
#[derive(Default)]
pub struct LogUi {
    last_logged: u64,
}

/// Progress is logged at most once per this many units
const PROGRESS_LOG_STEP: u64 = 10_000;

impl LogUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for LogUi {
    fn set_phase(&mut self, phase: Phase) {
        tracing::info!(%phase, "phase started");
    }

    fn set_info(&mut self, info: impl Into<String>) {
        tracing::debug!("{}", info.into());
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        if current >= self.last_logged + PROGRESS_LOG_STEP || (total > 0 && current == total) {
            self.last_logged = current;
            tracing::debug!(current, total, "{}", label.into());
        }
    }

    fn clear_progress(&mut self) {
        self.last_logged = 0;
    }

    // The pipeline emits its own structured event per statement
    fn log(&mut self, message: impl Into<String>) {
        tracing::debug!("{}", message.into());
    }
}

/// Silent UI implementation for testing
#[derive(Default)]
pub struct SilentUi;

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
}
