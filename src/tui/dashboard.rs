//! Live monitoring screen.

use crate::dns::{Monitor, MonitorStats};
use crate::tui::selector::is_ctrl_c;
use crate::tui::view;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;

/// How a monitoring session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardExit {
    /// Leave the program.
    Quit,
    /// Go back to provider selection.
    SwitchProvider,
}

/// What the UI loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAction {
    /// Nothing to do.
    Continue,
    /// Probe now.
    Refresh,
    /// Session is over.
    Exit(DashboardExit),
}

/// Monitoring session bound to one [`Monitor`].
///
/// The monitor runs from [`Dashboard::start`] until [`Dashboard::stop`]
/// or drop.
pub struct Dashboard {
    monitor: Monitor,
    warnings: Vec<String>,
}

impl Dashboard {
    /// Wrap a stopped monitor.
    #[must_use]
    pub fn new(monitor: Monitor) -> Self {
        Self {
            monitor,
            warnings: Vec::new(),
        }
    }

    /// Keep `warnings` on screen for the whole session.
    #[must_use]
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Warnings shown under the statistics.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Start the periodic probe.
    pub fn start(&mut self) {
        self.monitor.start();
    }

    /// Stop the periodic probe. Idempotent.
    pub fn stop(&mut self) {
        self.monitor.stop();
    }

    /// Probe once, now.
    pub async fn refresh(&self) {
        self.monitor.refresh().await;
    }

    /// Copy of the current counters.
    #[must_use]
    pub fn stats(&self) -> MonitorStats {
        self.monitor.snapshot()
    }

    /// Check if the periodic probe is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// Map a key press to an action.
    #[must_use]
    pub fn handle_key(&self, key: KeyEvent) -> DashboardAction {
        if is_ctrl_c(&key) {
            return DashboardAction::Exit(DashboardExit::Quit);
        }

        match key.code {
            KeyCode::Char('q') => DashboardAction::Exit(DashboardExit::Quit),
            KeyCode::Char('r') => DashboardAction::Refresh,
            KeyCode::Char('c') => DashboardAction::Exit(DashboardExit::SwitchProvider),
            _ => DashboardAction::Continue,
        }
    }

    /// Render the dashboard from a fresh snapshot.
    pub fn draw(&self, f: &mut Frame) {
        view::draw_dashboard(f, &self.stats(), &self.warnings);
    }
}
