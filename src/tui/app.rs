//! Terminal session drivers.
//!
//! Each screen takes over the terminal for its own lifetime and gives it
//! back before returning, so the caller can print reports between screens.

#![allow(clippy::missing_errors_doc)]

use crate::dns::ProviderCatalog;
use crate::error::{Error, Result};
use crate::tui::dashboard::{Dashboard, DashboardAction, DashboardExit};
use crate::tui::selector::{Selector, SelectorExit};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn enter_terminal() -> Result<DefaultTerminal> {
    ratatui::try_init().map_err(|e| Error::tui(format!("terminal setup failed: {e}")))
}

/// Next key press, if one arrives within the poll interval.
fn next_key() -> Result<Option<KeyEvent>> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(None);
    }
    match event::read()? {
        // Windows also reports releases.
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Let the user pick a provider from `catalog`.
///
/// A confirmed custom entry is appended to `catalog` and its index returned.
/// `banner` is shown under the title, typically the last apply error.
pub fn run_selector(
    catalog: &mut ProviderCatalog,
    banner: Option<String>,
) -> Result<SelectorExit> {
    let mut terminal = enter_terminal()?;
    let res = selector_loop(&mut terminal, Selector::new(catalog).with_banner(banner));
    ratatui::restore();
    res
}

fn selector_loop(terminal: &mut DefaultTerminal, mut selector: Selector<'_>) -> Result<SelectorExit> {
    loop {
        terminal.draw(|f| selector.draw(f))?;

        if let Some(key) = next_key()? {
            if let Some(exit) = selector.handle_key(key) {
                return Ok(exit);
            }
        }
    }
}

/// Show live statistics until the user quits or asks to switch.
///
/// The monitor is started on entry and always stopped before returning.
pub async fn run_dashboard(dashboard: &mut Dashboard) -> Result<DashboardExit> {
    let mut terminal = enter_terminal()?;
    dashboard.start();

    let res = dashboard_loop(&mut terminal, dashboard).await;

    dashboard.stop();
    ratatui::restore();
    res
}

async fn dashboard_loop(
    terminal: &mut DefaultTerminal,
    dashboard: &Dashboard,
) -> Result<DashboardExit> {
    loop {
        terminal.draw(|f| dashboard.draw(f))?;

        let Some(key) = next_key()? else {
            continue;
        };
        match dashboard.handle_key(key) {
            DashboardAction::Continue => {}
            DashboardAction::Refresh => dashboard.refresh().await,
            DashboardAction::Exit(exit) => return Ok(exit),
        }
    }
}
